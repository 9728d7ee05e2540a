// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Closed set of node variants.
//!
//! The variant set is fixed (group, data, symbolic), so the model uses a
//! tagged enum over shared handles instead of runtime type inspection:
//! exactly one type predicate is true for any value, by construction.
use std::sync::Arc;

use crate::attribute::Attributes;
use crate::data::DataNode;
use crate::error::NodeType;
use crate::group::GroupNode;
use crate::ident::ObjectId;
use crate::symbolic::SymbolicNode;

/// Any addressable element of the tree.
///
/// Cheap to clone: variants hold shared handles. Two `Node` values denote
/// the same tree element iff [`Node::ptr_eq`] holds.
#[derive(Debug, Clone)]
pub enum Node {
    /// Container node holding named links to children.
    Group(Arc<GroupNode>),
    /// Node holding (or lazily referencing) an array payload.
    Data(Arc<DataNode>),
    /// Indirection to another node in this tree or an external resource.
    Symbolic(Arc<SymbolicNode>),
}

impl Node {
    /// Object identifier of the underlying node.
    #[must_use]
    pub fn id(&self) -> ObjectId {
        match self {
            Self::Group(g) => g.id(),
            Self::Data(d) => d.id(),
            Self::Symbolic(s) => s.id(),
        }
    }

    /// Kind discriminator of the underlying node.
    #[must_use]
    pub fn node_type(&self) -> NodeType {
        match self {
            Self::Group(_) => NodeType::Group,
            Self::Data(_) => NodeType::Data,
            Self::Symbolic(_) => NodeType::Symbolic,
        }
    }

    /// True when this is a group node.
    #[must_use]
    pub fn is_group(&self) -> bool {
        matches!(self, Self::Group(_))
    }

    /// True when this is a data node.
    #[must_use]
    pub fn is_data(&self) -> bool {
        matches!(self, Self::Data(_))
    }

    /// True when this is a symbolic node.
    #[must_use]
    pub fn is_symbolic(&self) -> bool {
        matches!(self, Self::Symbolic(_))
    }

    /// Attribute store of the underlying node.
    #[must_use]
    pub fn attributes(&self) -> &Attributes {
        match self {
            Self::Group(g) => g.attributes(),
            Self::Data(d) => d.attributes(),
            Self::Symbolic(s) => s.attributes(),
        }
    }

    /// The group handle, when this is a group node.
    #[must_use]
    pub fn as_group(&self) -> Option<&Arc<GroupNode>> {
        match self {
            Self::Group(g) => Some(g),
            _ => None,
        }
    }

    /// The data handle, when this is a data node.
    #[must_use]
    pub fn as_data(&self) -> Option<&Arc<DataNode>> {
        match self {
            Self::Data(d) => Some(d),
            _ => None,
        }
    }

    /// The symbolic handle, when this is a symbolic node.
    #[must_use]
    pub fn as_symbolic(&self) -> Option<&Arc<SymbolicNode>> {
        match self {
            Self::Symbolic(s) => Some(s),
            _ => None,
        }
    }

    /// Identity comparison: true iff both values denote the same node object.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Group(a), Self::Group(b)) => Arc::ptr_eq(a, b),
            (Self::Data(a), Self::Data(b)) => Arc::ptr_eq(a, b),
            (Self::Symbolic(a), Self::Symbolic(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl From<Arc<GroupNode>> for Node {
    fn from(group: Arc<GroupNode>) -> Self {
        Self::Group(group)
    }
}

impl From<Arc<DataNode>> for Node {
    fn from(data: Arc<DataNode>) -> Self {
        Self::Data(data)
    }
}

impl From<Arc<SymbolicNode>> for Node {
    fn from(symbolic: Arc<SymbolicNode>) -> Self {
        Self::Symbolic(symbolic)
    }
}

// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Symbolic nodes: indirections resolved through the owning tree.
use std::sync::{Arc, Weak};

use crate::attribute::Attributes;
use crate::ident::ObjectId;
use crate::link::NodeLink;
use crate::node::Node;
use crate::tree::Tree;

/// A node whose destination is resolved indirectly: either a path within
/// the owning tree, or a path inside an external resource.
///
/// The tree handle is non-owning; a symbolic node never keeps its tree
/// alive. External links (`source_uri` set) are placeholders for the
/// storage layer and never resolve in-memory.
#[derive(Debug)]
pub struct SymbolicNode {
    id: ObjectId,
    attributes: Attributes,
    tree: Weak<Tree>,
    source_uri: Option<String>,
    path: String,
}

impl PartialEq for SymbolicNode {
    /// Identity comparison: two handles are equal iff they denote the
    /// same node object, matching [`crate::node::Node::ptr_eq`].
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self, other)
    }
}

impl SymbolicNode {
    /// Creates a link to `path` within `tree`.
    pub fn new(id: ObjectId, tree: &Arc<Tree>, path: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            id,
            attributes: Attributes::default(),
            tree: Arc::downgrade(tree),
            source_uri: None,
            path: path.into(),
        })
    }

    /// Creates a link into an external resource identified by `source_uri`.
    pub fn external(
        id: ObjectId,
        source_uri: impl Into<String>,
        path: impl Into<String>,
    ) -> Arc<Self> {
        Arc::new(Self {
            id,
            attributes: Attributes::default(),
            tree: Weak::new(),
            source_uri: Some(source_uri.into()),
            path: path.into(),
        })
    }

    /// Object identifier, stable for the node's lifetime.
    #[must_use]
    pub fn id(&self) -> ObjectId {
        self.id
    }

    /// Attribute store of this node.
    #[must_use]
    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    /// Destination path, relative to the tree root or the external resource.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// URI of the external resource, when the destination lives elsewhere.
    #[must_use]
    pub fn source_uri(&self) -> Option<&str> {
        self.source_uri.as_deref()
    }

    /// True when the destination lives in another resource.
    #[must_use]
    pub fn is_external(&self) -> bool {
        self.source_uri.is_some()
    }

    /// Resolves to the link this node denotes.
    ///
    /// `None` when the link is external, the tree is gone, or the target
    /// path no longer resolves — a dangling link.
    #[must_use]
    pub fn node_link(&self) -> Option<Arc<NodeLink>> {
        if self.source_uri.is_some() {
            return None;
        }
        let tree = self.tree.upgrade()?;
        tree.find_node_link(&self.path).ok().flatten()
    }

    /// Resolves to the destination node, when the link is resolvable.
    #[must_use]
    pub fn node(&self) -> Option<Node> {
        self.node_link().map(|link| link.destination().clone())
    }
}

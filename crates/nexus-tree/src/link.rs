// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Named edges from a group to its children.
use std::sync::{Arc, Weak};

use crate::group::GroupNode;
use crate::node::Node;
use crate::path::ROOT_NAME;

/// A named, directed edge from a [`GroupNode`] to a destination [`Node`].
///
/// Immutable once constructed; re-linking a name replaces the link
/// wholesale. The back-reference to the source group is non-owning, so a
/// link never keeps its parent alive.
#[derive(Debug, Clone)]
pub struct NodeLink {
    name: String,
    source: Weak<GroupNode>,
    destination: Node,
}

impl NodeLink {
    pub(crate) fn new(name: impl Into<String>, source: &Arc<GroupNode>, destination: Node) -> Self {
        Self {
            name: name.into(),
            source: Arc::downgrade(source),
            destination,
        }
    }

    /// Synthetic root link: reserved name, no source group.
    pub(crate) fn root(destination: Arc<GroupNode>) -> Self {
        Self {
            name: ROOT_NAME.to_string(),
            source: Weak::new(),
            destination: Node::Group(destination),
        }
    }

    /// The edge label, unique within the owning group.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Owning group, when alive. `None` for the synthetic root link.
    #[must_use]
    pub fn source(&self) -> Option<Arc<GroupNode>> {
        self.source.upgrade()
    }

    /// The target node of this edge.
    #[must_use]
    pub fn destination(&self) -> &Node {
        &self.destination
    }

    /// True when the destination is a group node.
    #[must_use]
    pub fn is_destination_group(&self) -> bool {
        self.destination.is_group()
    }

    /// True when the destination is a data node.
    #[must_use]
    pub fn is_destination_data(&self) -> bool {
        self.destination.is_data()
    }

    /// True when the destination is a symbolic node.
    #[must_use]
    pub fn is_destination_symbolic(&self) -> bool {
        self.destination.is_symbolic()
    }
}

// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Tree: the root container, with provenance and tree-level lookup.
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use rustc_hash::FxHashMap;

use crate::error::TreeError;
use crate::group::{GlobalPool, GroupNode};
use crate::ident::ObjectId;
use crate::link::NodeLink;
use crate::node::Node;
use crate::path::{self, ROOT_NAME, SEPARATOR};

#[derive(Debug, Clone)]
struct Root {
    group: Arc<GroupNode>,
    link: Arc<NodeLink>,
}

/// The root container of a node hierarchy.
///
/// Owns exactly one root link (reserved name, no source group) to the top
/// group, carries the source URI of the backing resource for provenance,
/// and creates the object-id pool shared by every group in the tree.
#[derive(Debug)]
pub struct Tree {
    source_uri: Option<String>,
    host: RwLock<Option<String>>,
    root: RwLock<Root>,
    pool: GlobalPool,
}

impl Tree {
    /// Creates a tree over `root`, deriving the host from `source_uri` and
    /// injecting a fresh shared object-id pool into the whole hierarchy.
    #[must_use]
    pub fn new(source_uri: Option<&str>, root: Arc<GroupNode>) -> Arc<Self> {
        let pool: GlobalPool = Arc::new(Mutex::new(FxHashMap::default()));
        root.set_global_pool(&pool);
        let host = source_uri.and_then(host_from_uri);
        Arc::new(Self {
            source_uri: source_uri.map(ToString::to_string),
            host: RwLock::new(host),
            root: RwLock::new(Root {
                link: Arc::new(NodeLink::root(root.clone())),
                group: root,
            }),
            pool,
        })
    }

    /// URI identifying the backing resource, when known.
    #[must_use]
    pub fn source_uri(&self) -> Option<&str> {
        self.source_uri.as_deref()
    }

    /// Hostname derived from the source URI, unless overridden.
    #[must_use]
    pub fn host(&self) -> Option<String> {
        self.host
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Overrides the derived hostname.
    pub fn set_host(&self, host: impl Into<String>) {
        *self.host.write().unwrap_or_else(PoisonError::into_inner) = Some(host.into());
    }

    fn root_snapshot(&self) -> Root {
        self.root
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// The synthetic root link.
    #[must_use]
    pub fn root_link(&self) -> Arc<NodeLink> {
        self.root_snapshot().link
    }

    /// The top group of the tree.
    #[must_use]
    pub fn root_group(&self) -> Arc<GroupNode> {
        self.root_snapshot().group
    }

    /// Replaces the root group, rebuilding the root link wholesale and
    /// sharing the tree's object-id pool with the new hierarchy.
    pub fn set_group_node(&self, group: Arc<GroupNode>) {
        group.set_global_pool(&self.pool);
        let mut root = self.root.write().unwrap_or_else(PoisonError::into_inner);
        *root = Root {
            link: Arc::new(NodeLink::root(group.clone())),
            group,
        };
    }

    /// The object-id pool shared across this tree.
    #[must_use]
    pub fn global_pool(&self) -> GlobalPool {
        self.pool.clone()
    }

    /// Looks up a node anywhere in the tree by its numeric object id.
    #[must_use]
    pub fn node_for_id(&self, id: ObjectId) -> Option<Node> {
        self.pool
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&id.value())
            .cloned()
    }

    /// Resolves an absolute `pathname` to a link.
    ///
    /// The path is canonicalized first; non-absolute paths resolve to
    /// `Ok(None)`. The root path returns the root link; a root-level
    /// attribute path (`/@name`) returns the root link only when the root
    /// group carries that attribute. Everything else delegates into the
    /// root group's recursive resolution.
    ///
    /// # Errors
    ///
    /// [`TreeError::AttributeOnlyPath`] when a non-root path holds an
    /// attribute marker with no node path before it.
    pub fn find_node_link(&self, pathname: &str) -> Result<Option<Arc<NodeLink>>, TreeError> {
        let canonical = path::canonicalize_path(pathname);
        if !canonical.starts_with(SEPARATOR) {
            return Ok(None);
        }
        let root = self.root_snapshot();
        let (body, attr) = path::split_attribute(&canonical);
        if body == ROOT_NAME {
            return Ok(match attr {
                None => Some(root.link),
                Some(attr) => root.group.attributes().contains(attr).then_some(root.link),
            });
        }
        root.group.find_node_link(&canonical)
    }

    /// Resolves an absolute `pathname` to its destination node. Same
    /// semantics as [`Tree::find_node_link`].
    ///
    /// # Errors
    ///
    /// Same conditions as [`Tree::find_node_link`].
    pub fn find_node(&self, pathname: &str) -> Result<Option<Node>, TreeError> {
        Ok(self
            .find_node_link(pathname)?
            .map(|link| link.destination().clone()))
    }
}

fn host_from_uri(uri: &str) -> Option<String> {
    let (_, rest) = uri.split_once("://")?;
    let authority = rest.split_once(SEPARATOR).map_or(rest, |(a, _)| a);
    let host = authority.rsplit_once('@').map_or(authority, |(_, h)| h);
    let host = host.split_once(':').map_or(host, |(h, _)| h);
    if host.is_empty() {
        None
    } else {
        Some(host.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn host_is_derived_from_uri() {
        assert_eq!(
            host_from_uri("hdf5://data.diamond.ac.uk:8080/scan/i22.nxs"),
            Some("data.diamond.ac.uk".to_string())
        );
        assert_eq!(host_from_uri("file:///tmp/scan.nxs"), None);
        assert_eq!(host_from_uri("/tmp/scan.nxs"), None);
    }

    #[test]
    fn host_override_wins() {
        let tree = Tree::new(
            Some("hdf5://beamline/a.nxs"),
            GroupNode::new(ObjectId::from_u64_truncate(1)),
        );
        assert_eq!(tree.host(), Some("beamline".to_string()));
        tree.set_host("archive");
        assert_eq!(tree.host(), Some("archive".to_string()));
    }

    #[test]
    fn relative_paths_resolve_to_none() {
        let tree = Tree::new(None, GroupNode::new(ObjectId::from_u64_truncate(1)));
        assert!(tree.find_node_link("relative/path").unwrap().is_none());
    }
}

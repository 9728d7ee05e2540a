// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Group nodes: named children, child counters, recursive path resolution.
//!
//! Each group guards its child map and counters with one mutex; every
//! structural mutation runs its whole read-modify-write sequence under
//! that lock. Lookups clone the link handle out and resolve symbolic
//! chains with no lock held, so resolution through the owning tree cannot
//! deadlock against a group on the resolved path.
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use rustc_hash::FxHashMap;

use crate::attribute::Attributes;
use crate::data::DataNode;
use crate::dataset::DatasetRef;
use crate::error::{NodeType, TreeError};
use crate::ident::ObjectId;
use crate::link::NodeLink;
use crate::node::Node;
use crate::path::{self, SEPARATOR};
use crate::symbolic::SymbolicNode;

/// Upper bound on symbolic-link dereference hops.
///
/// A chain longer than this (including any cycle) is treated as
/// unresolvable instead of spinning.
pub const MAX_LINK_HOPS: usize = 32;

/// Shared object-id pool mapping numeric ids to nodes across one tree.
///
/// Injected into every group of a tree at construction time; writes from
/// different groups serialize on the pool's own mutex.
pub type GlobalPool = Arc<Mutex<FxHashMap<u32, Node>>>;

#[derive(Debug)]
struct ChildEntry {
    link: Arc<NodeLink>,
    // Which counter this entry incremented; symbolic links are counted by
    // the trailing-separator naming convention, not by resolving them.
    counts_as_group: bool,
}

#[derive(Debug, Default)]
struct Children {
    order: Vec<String>,
    by_name: FxHashMap<String, ChildEntry>,
    groups: usize,
    datas: usize,
}

/// A container node holding named links to child nodes.
#[derive(Debug)]
pub struct GroupNode {
    id: ObjectId,
    attributes: Attributes,
    children: Mutex<Children>,
    pool: Mutex<Option<GlobalPool>>,
}

impl PartialEq for GroupNode {
    /// Identity comparison: two handles are equal iff they denote the
    /// same node object, matching [`crate::node::Node::ptr_eq`].
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self, other)
    }
}

impl GroupNode {
    /// Creates an empty group with the given object id.
    #[must_use]
    pub fn new(id: ObjectId) -> Arc<Self> {
        Arc::new(Self {
            id,
            attributes: Attributes::default(),
            children: Mutex::new(Children::default()),
            pool: Mutex::new(None),
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

    fn lock(&self) -> MutexGuard<'_, Children> {
        self.children.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // ── Global object-id pool ──────────────────────────────────────

    /// Shares `pool` with this group and, recursively, every child group.
    ///
    /// Registers this group and all current children by numeric object id.
    /// Re-sharing the same pool is a no-op, which also bounds recursion
    /// when a group is reachable from itself through its own children.
    pub fn set_global_pool(self: &Arc<Self>, pool: &GlobalPool) {
        {
            let mut slot = self.pool.lock().unwrap_or_else(PoisonError::into_inner);
            if slot.as_ref().is_some_and(|p| Arc::ptr_eq(p, pool)) {
                return;
            }
            *slot = Some(pool.clone());
        }
        Self::register_in_pool(pool, &Node::Group(self.clone()));
        for link in self.node_links() {
            let node = link.destination().clone();
            Self::register_in_pool(pool, &node);
            if let Node::Group(child) = node {
                child.set_global_pool(pool);
            }
        }
    }

    /// The pool shared with this group, when one was injected.
    #[must_use]
    pub fn global_pool(&self) -> Option<GlobalPool> {
        self.pool
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn register_in_pool(pool: &GlobalPool, node: &Node) {
        let mut entries = pool.lock().unwrap_or_else(PoisonError::into_inner);
        let previous = entries.insert(node.id().value(), node.clone());
        if previous.is_some_and(|prev| !prev.ptr_eq(node)) {
            tracing::debug!(id = node.id().value(), "object id remapped in global pool");
        }
    }

    // ── Adding children ────────────────────────────────────────────

    /// Adds `node` under `name`, dispatching on its variant.
    ///
    /// # Errors
    ///
    /// [`TreeError::TypeMismatch`] when `name` is already bound to a node
    /// of a different kind; the existing link is left untouched.
    pub fn add_node(self: &Arc<Self>, name: &str, node: impl Into<Node>) -> Result<(), TreeError> {
        match node.into() {
            Node::Group(group) => self.add_group_node(name, group),
            Node::Data(data) => self.add_data_node(name, data),
            Node::Symbolic(symbolic) => self.add_symbolic_node(name, symbolic),
        }
    }

    /// Adds a child group under `name`.
    ///
    /// Re-adding a group under a name already bound to a group replaces
    /// the link without touching the counters, so merge-style builders can
    /// re-register idempotently.
    ///
    /// # Errors
    ///
    /// [`TreeError::TypeMismatch`] when `name` is bound to a non-group.
    pub fn add_group_node(
        self: &Arc<Self>,
        name: &str,
        group: Arc<GroupNode>,
    ) -> Result<(), TreeError> {
        self.insert_child(name, Node::Group(group), true)
    }

    /// Adds a child data node under `name`.
    ///
    /// # Errors
    ///
    /// [`TreeError::TypeMismatch`] when `name` is bound to a non-data node.
    pub fn add_data_node(
        self: &Arc<Self>,
        name: &str,
        data: Arc<DataNode>,
    ) -> Result<(), TreeError> {
        self.insert_child(name, Node::Data(data), false)
    }

    /// Adds a symbolic child under `name`.
    ///
    /// Counting convention from the NeXus writers: a supplied name ending
    /// in the separator counts the link as a group child and the stored
    /// name drops the separator; any other name counts it as a data child.
    /// The counters are derived from the name, not from resolving the
    /// link, so callers must spell names consistently with their targets.
    ///
    /// # Errors
    ///
    /// [`TreeError::TypeMismatch`] when the stored name is bound to a
    /// non-symbolic node.
    pub fn add_symbolic_node(
        self: &Arc<Self>,
        name: &str,
        symbolic: Arc<SymbolicNode>,
    ) -> Result<(), TreeError> {
        let counts_as_group = name.ends_with(SEPARATOR);
        let stored = name.strip_suffix(SEPARATOR).unwrap_or(name);
        self.insert_child(stored, Node::Symbolic(symbolic), counts_as_group)
    }

    fn insert_child(
        self: &Arc<Self>,
        name: &str,
        node: Node,
        counts_as_group: bool,
    ) -> Result<(), TreeError> {
        {
            let mut children = self.lock();
            if let Some(existing) = children.by_name.get(name) {
                let found = existing.link.destination().node_type();
                if found != node.node_type() {
                    return Err(TreeError::TypeMismatch {
                        name: name.to_string(),
                        expected: node.node_type(),
                        found,
                    });
                }
                // Same-kind re-registration: replace the link, keep the
                // counter contribution of the original entry.
                let counts_as_group = existing.counts_as_group;
                let link = Arc::new(NodeLink::new(name, self, node.clone()));
                children.by_name.insert(
                    name.to_string(),
                    ChildEntry {
                        link,
                        counts_as_group,
                    },
                );
            } else {
                let link = Arc::new(NodeLink::new(name, self, node.clone()));
                children.order.push(name.to_string());
                children.by_name.insert(
                    name.to_string(),
                    ChildEntry {
                        link,
                        counts_as_group,
                    },
                );
                if counts_as_group {
                    children.groups += 1;
                } else {
                    children.datas += 1;
                }
            }
        }
        if let Some(pool) = self.global_pool() {
            Self::register_in_pool(&pool, &node);
            if let Node::Group(child) = &node {
                child.set_global_pool(&pool);
            }
        }
        Ok(())
    }

    // ── Direct lookups (no dereferencing) ──────────────────────────

    /// The link stored under `name`, without dereferencing symbolic links.
    #[must_use]
    pub fn node_link(&self, name: &str) -> Option<Arc<NodeLink>> {
        self.lock().by_name.get(name).map(|e| e.link.clone())
    }

    /// The direct destination stored under `name`.
    #[must_use]
    pub fn node(&self, name: &str) -> Option<Node> {
        self.node_link(name).map(|l| l.destination().clone())
    }

    /// True when any child is stored under `name`.
    #[must_use]
    pub fn contains_node(&self, name: &str) -> bool {
        self.lock().by_name.contains_key(name)
    }

    /// True when `name` directly holds a group node.
    #[must_use]
    pub fn contains_group_node(&self, name: &str) -> bool {
        self.node_link(name).is_some_and(|l| l.is_destination_group())
    }

    /// True when `name` directly holds a data node.
    #[must_use]
    pub fn contains_data_node(&self, name: &str) -> bool {
        self.node_link(name).is_some_and(|l| l.is_destination_data())
    }

    /// True when `name` directly holds a symbolic node.
    #[must_use]
    pub fn contains_symbolic_node(&self, name: &str) -> bool {
        self.node_link(name)
            .is_some_and(|l| l.is_destination_symbolic())
    }

    // ── Typed lookups (symbolic links dereferenced) ────────────────

    /// Dereferences a chain of symbolic links to its final link.
    ///
    /// `None` when any hop dangles or the hop cap is exceeded.
    fn resolve_link(link: Arc<NodeLink>) -> Option<Arc<NodeLink>> {
        let mut current = link;
        let mut hops = 0;
        loop {
            let symbolic = match current.destination() {
                Node::Symbolic(s) => s.clone(),
                _ => return Some(current),
            };
            hops += 1;
            if hops > MAX_LINK_HOPS {
                return None;
            }
            current = symbolic.node_link()?;
        }
    }

    /// The group stored under `name`, following symbolic links.
    ///
    /// `Ok(None)` when no child is stored under `name`.
    ///
    /// # Errors
    ///
    /// [`TreeError::UnresolvableLink`] when a symbolic chain under `name`
    /// dangles; [`TreeError::TypeMismatch`] when the final destination is
    /// not a group.
    pub fn get_group_node(&self, name: &str) -> Result<Option<Arc<GroupNode>>, TreeError> {
        let Some(link) = self.node_link(name) else {
            return Ok(None);
        };
        let resolved = Self::resolve_link(link).ok_or_else(|| TreeError::UnresolvableLink {
            name: name.to_string(),
        })?;
        match resolved.destination() {
            Node::Group(group) => Ok(Some(group.clone())),
            other => Err(TreeError::TypeMismatch {
                name: name.to_string(),
                expected: NodeType::Group,
                found: other.node_type(),
            }),
        }
    }

    /// The data node stored under `name`, following symbolic links.
    ///
    /// `Ok(None)` when no child is stored under `name`.
    ///
    /// # Errors
    ///
    /// Same conditions as [`GroupNode::get_group_node`], expecting a data
    /// node instead.
    pub fn get_data_node(&self, name: &str) -> Result<Option<Arc<DataNode>>, TreeError> {
        let Some(link) = self.node_link(name) else {
            return Ok(None);
        };
        let resolved = Self::resolve_link(link).ok_or_else(|| TreeError::UnresolvableLink {
            name: name.to_string(),
        })?;
        match resolved.destination() {
            Node::Data(data) => Ok(Some(data.clone())),
            other => Err(TreeError::TypeMismatch {
                name: name.to_string(),
                expected: NodeType::Data,
                found: other.node_type(),
            }),
        }
    }

    /// The symbolic node stored under `name`, *not* dereferenced.
    ///
    /// `Ok(None)` when no child is stored under `name`.
    ///
    /// # Errors
    ///
    /// [`TreeError::TypeMismatch`] when the direct destination is not
    /// symbolic.
    pub fn get_symbolic_node(&self, name: &str) -> Result<Option<Arc<SymbolicNode>>, TreeError> {
        let Some(link) = self.node_link(name) else {
            return Ok(None);
        };
        match link.destination() {
            Node::Symbolic(symbolic) => Ok(Some(symbolic.clone())),
            other => Err(TreeError::TypeMismatch {
                name: name.to_string(),
                expected: NodeType::Symbolic,
                found: other.node_type(),
            }),
        }
    }

    // ── Removal ────────────────────────────────────────────────────

    /// Removes the group stored under `name`, following symbolic links for
    /// the type check.
    ///
    /// # Errors
    ///
    /// [`TreeError::NodeNotFound`] when `name` is absent;
    /// [`TreeError::UnresolvableLink`] / [`TreeError::TypeMismatch`] under
    /// the same conditions as [`GroupNode::get_group_node`].
    pub fn remove_group_node(&self, name: &str) -> Result<(), TreeError> {
        let link = self.require_link(name)?;
        let resolved =
            Self::resolve_link(link.clone()).ok_or_else(|| TreeError::UnresolvableLink {
                name: name.to_string(),
            })?;
        if !resolved.destination().is_group() {
            return Err(TreeError::TypeMismatch {
                name: name.to_string(),
                expected: NodeType::Group,
                found: resolved.destination().node_type(),
            });
        }
        self.remove_entry(name, &link)
    }

    /// Removes the data node stored under `name`, following symbolic links
    /// for the type check.
    ///
    /// # Errors
    ///
    /// Same conditions as [`GroupNode::remove_group_node`], expecting a
    /// data node instead.
    pub fn remove_data_node(&self, name: &str) -> Result<(), TreeError> {
        let link = self.require_link(name)?;
        let resolved =
            Self::resolve_link(link.clone()).ok_or_else(|| TreeError::UnresolvableLink {
                name: name.to_string(),
            })?;
        if !resolved.destination().is_data() {
            return Err(TreeError::TypeMismatch {
                name: name.to_string(),
                expected: NodeType::Data,
                found: resolved.destination().node_type(),
            });
        }
        self.remove_entry(name, &link)
    }

    /// Removes the symbolic node stored under `name` (not dereferenced).
    ///
    /// # Errors
    ///
    /// [`TreeError::NodeNotFound`] when `name` is absent;
    /// [`TreeError::TypeMismatch`] when the direct destination is not
    /// symbolic.
    pub fn remove_symbolic_node(&self, name: &str) -> Result<(), TreeError> {
        let link = self.require_link(name)?;
        if !link.is_destination_symbolic() {
            return Err(TreeError::TypeMismatch {
                name: name.to_string(),
                expected: NodeType::Symbolic,
                found: link.destination().node_type(),
            });
        }
        self.remove_entry(name, &link)
    }

    /// Removes the first link whose destination is `group`.
    ///
    /// # Errors
    ///
    /// [`TreeError::NodeNotFound`] when no link points at `group`.
    pub fn remove_group_node_ref(&self, group: &Arc<GroupNode>) -> Result<(), TreeError> {
        self.remove_by_node(&Node::Group(group.clone()))
    }

    /// Removes the first link whose destination is `data`.
    ///
    /// # Errors
    ///
    /// [`TreeError::NodeNotFound`] when no link points at `data`.
    pub fn remove_data_node_ref(&self, data: &Arc<DataNode>) -> Result<(), TreeError> {
        self.remove_by_node(&Node::Data(data.clone()))
    }

    /// Removes the first link whose destination is `symbolic`.
    ///
    /// # Errors
    ///
    /// [`TreeError::NodeNotFound`] when no link points at `symbolic`.
    pub fn remove_symbolic_node_ref(&self, symbolic: &Arc<SymbolicNode>) -> Result<(), TreeError> {
        self.remove_by_node(&Node::Symbolic(symbolic.clone()))
    }

    fn require_link(&self, name: &str) -> Result<Arc<NodeLink>, TreeError> {
        self.node_link(name).ok_or_else(|| TreeError::NodeNotFound {
            name: name.to_string(),
        })
    }

    fn remove_entry(&self, name: &str, expected: &Arc<NodeLink>) -> Result<(), TreeError> {
        let mut children = self.lock();
        match children.by_name.get(name) {
            Some(entry) if Arc::ptr_eq(&entry.link, expected) => {
                let counts_as_group = entry.counts_as_group;
                children.by_name.remove(name);
                children.order.retain(|n| n != name);
                if counts_as_group {
                    children.groups -= 1;
                } else {
                    children.datas -= 1;
                }
                Ok(())
            }
            _ => Err(TreeError::NodeNotFound {
                name: name.to_string(),
            }),
        }
    }

    fn remove_by_node(&self, node: &Node) -> Result<(), TreeError> {
        let mut children = self.lock();
        let Some(name) = children
            .order
            .iter()
            .find(|n| {
                children
                    .by_name
                    .get(n.as_str())
                    .is_some_and(|e| e.link.destination().ptr_eq(node))
            })
            .cloned()
        else {
            return Err(TreeError::NodeNotFound {
                name: format!("id:{}", node.id().value()),
            });
        };
        if let Some(entry) = children.by_name.remove(&name) {
            children.order.retain(|n| n != &name);
            if entry.counts_as_group {
                children.groups -= 1;
            } else {
                children.datas -= 1;
            }
        }
        Ok(())
    }

    // ── Counters and snapshots ─────────────────────────────────────

    /// Number of links currently stored.
    #[must_use]
    pub fn number_of_node_links(&self) -> usize {
        self.lock().by_name.len()
    }

    /// Number of children counted as groups.
    #[must_use]
    pub fn number_of_group_nodes(&self) -> usize {
        self.lock().groups
    }

    /// Number of children counted as data nodes.
    #[must_use]
    pub fn number_of_data_nodes(&self) -> usize {
        self.lock().datas
    }

    /// True once at least one child exists.
    #[must_use]
    pub fn is_populated(&self) -> bool {
        self.number_of_node_links() > 0
    }

    /// Point-in-time snapshot of child names in insertion order.
    ///
    /// Safe to iterate while the group is concurrently mutated.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.lock().order.clone()
    }

    /// Point-in-time snapshot of child links in insertion order.
    #[must_use]
    pub fn node_links(&self) -> Vec<Arc<NodeLink>> {
        let children = self.lock();
        children
            .order
            .iter()
            .filter_map(|n| children.by_name.get(n).map(|e| e.link.clone()))
            .collect()
    }

    // ── Path resolution ────────────────────────────────────────────

    /// Resolves `path` relative to this group, following symbolic links.
    ///
    /// An unknown segment, a dangling chain, or a non-group in the middle
    /// of the path all yield `Ok(None)`. A trailing `@attr` suffix filters
    /// the result: the link is returned only when its destination carries
    /// that attribute.
    ///
    /// # Errors
    ///
    /// [`TreeError::AttributeOnlyPath`] when the path holds an attribute
    /// marker with no node path before it.
    pub fn find_node_link(
        self: &Arc<Self>,
        pathname: &str,
    ) -> Result<Option<Arc<NodeLink>>, TreeError> {
        let (body, attr) = path::split_attribute(pathname);
        let trimmed = body.strip_prefix(SEPARATOR).unwrap_or(body);
        if trimmed.is_empty() {
            return if attr.is_some() {
                Err(TreeError::AttributeOnlyPath {
                    path: pathname.to_string(),
                })
            } else {
                Ok(None)
            };
        }
        Ok(self.find_link_inner(trimmed, attr))
    }

    fn find_link_inner(self: &Arc<Self>, body: &str, attr: Option<&str>) -> Option<Arc<NodeLink>> {
        let body = body.strip_prefix(SEPARATOR).unwrap_or(body);
        let (head, rest) = match body.split_once(SEPARATOR) {
            Some((h, r)) => (h, Some(r)),
            None => (body, None),
        };
        let link = self.node_link(head)?;
        let resolved = Self::resolve_link(link)?;
        match rest {
            None | Some("") => match attr {
                None => Some(resolved),
                Some(attr) => {
                    let present = resolved.destination().attributes().contains(attr);
                    present.then_some(resolved)
                }
            },
            Some(rest) => match resolved.destination() {
                Node::Group(group) => group.find_link_inner(rest, attr),
                _ => None,
            },
        }
    }

    /// Resolves `path` to its destination node. Same semantics as
    /// [`GroupNode::find_node_link`].
    ///
    /// # Errors
    ///
    /// Same conditions as [`GroupNode::find_node_link`].
    pub fn find_node(self: &Arc<Self>, pathname: &str) -> Result<Option<Node>, TreeError> {
        Ok(self
            .find_node_link(pathname)?
            .map(|link| link.destination().clone()))
    }

    // ── Dataset collection ─────────────────────────────────────────

    /// Collects the payload of every data node in this subtree whose own
    /// link name equals `name`, following symbolic links and
    /// de-duplicating by payload identity.
    pub fn collect_datasets(self: &Arc<Self>, name: &str) -> Vec<DatasetRef> {
        let mut found = Vec::new();
        let mut visited = Vec::new();
        self.collect_into(name, &mut found, &mut visited);
        found
    }

    fn collect_into(
        self: &Arc<Self>,
        name: &str,
        found: &mut Vec<DatasetRef>,
        visited: &mut Vec<*const GroupNode>,
    ) {
        let marker = Arc::as_ptr(self);
        if visited.contains(&marker) {
            return;
        }
        visited.push(marker);
        for link in self.node_links() {
            let Some(resolved) = Self::resolve_link(link) else {
                continue;
            };
            match resolved.destination() {
                Node::Data(data) => {
                    if resolved.name() == name {
                        if let Some(dataset) = data.dataset() {
                            if !found.iter().any(|d| Arc::ptr_eq(d, &dataset)) {
                                found.push(dataset);
                            }
                        }
                    }
                }
                Node::Group(group) => group.collect_into(name, found, visited),
                Node::Symbolic(_) => {}
            }
        }
    }
}

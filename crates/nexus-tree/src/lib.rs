// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! nexus-tree: in-memory NeXus/HDF5-style hierarchical tree model.
//!
//! Groups, data nodes, and symbolic links wired together by named
//! [`NodeLink`]s, with canonical path resolution, per-node attributes,
//! and a shared object-id pool addressing nodes independent of tree
//! position. File I/O and array arithmetic live in collaborating crates;
//! this one is the structural backbone they populate and traverse.
#![forbid(unsafe_code)]
#![deny(missing_docs, rust_2018_idioms, unused_must_use)]
#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    clippy::cargo,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::dbg_macro,
    clippy::print_stdout,
    clippy::print_stderr
)]
#![allow(
    clippy::must_use_candidate,
    clippy::return_self_not_must_use,
    clippy::unreadable_literal,
    clippy::missing_const_for_fn,
    clippy::redundant_pub_crate,
    clippy::module_name_repetitions,
    clippy::use_self,
    clippy::cognitive_complexity,
    clippy::option_if_let_else,
    clippy::significant_drop_tightening,
    clippy::doc_markdown,
    clippy::too_many_lines
)]

mod attribute;
mod data;
mod dataset;
mod error;
mod group;
mod ident;
mod link;
mod node;
/// Reserved path tokens and canonicalization.
pub mod path;
/// Dimension-size conversion between 64-bit and native 32-bit forms.
pub mod shape;
mod symbolic;
mod tree;

// Re-exports for stable public API
/// Per-node attribute values and the insertion-ordered store.
pub use attribute::{AttrValue, Attribute, Attributes};
/// Data nodes holding (possibly lazy) array payloads.
pub use data::DataNode;
/// Lazy-dataset collaborator boundary and the in-memory implementation.
pub use dataset::{DatasetError, DatasetRef, ElementKind, LazyDataset, MemoryDataset, MemoryValues};
/// Error taxonomy and node-kind discriminator.
pub use error::{NodeType, TreeError};
/// Group nodes, the per-tree object-id pool, and the dereference hop cap.
pub use group::{GlobalPool, GroupNode, MAX_LINK_HOPS};
/// Fixed-width object identifiers.
pub use ident::{ObjectId, OBJECT_ID_LEN};
/// Named edges from groups to their children.
pub use link::NodeLink;
/// The closed node variant set.
pub use node::Node;
/// Symbolic (link) nodes.
pub use symbolic::SymbolicNode;
/// The root container.
pub use tree::Tree;

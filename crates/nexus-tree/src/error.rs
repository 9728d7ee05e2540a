// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Error taxonomy for tree mutations and typed lookups.
//!
//! Absence is not an error: lookups for a name that was never registered
//! return `Ok(None)`. The variants here cover the hard failures — caller
//! logic bugs (type mismatches), dangling symbolic links, and shape
//! metadata violations — which are reported synchronously and leave the
//! tree unchanged.
use std::fmt;

use thiserror::Error;

/// Discriminates the three concrete node variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeType {
    /// Container node holding named links to children.
    Group,
    /// Node holding (or lazily referencing) an array payload.
    Data,
    /// Indirection to another node or an external resource.
    Symbolic,
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Group => f.write_str("a group node"),
            Self::Data => f.write_str("a data node"),
            Self::Symbolic => f.write_str("a symbolic node"),
        }
    }
}

/// Error reported by tree mutations and typed lookups.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    /// A name is already bound to a node of a different kind, or a lookup
    /// resolved to a node of the wrong kind.
    #[error("node `{name}` is {found}, expected {expected}")]
    TypeMismatch {
        /// Link name under which the conflict occurred.
        name: String,
        /// Kind the caller asked for or tried to register.
        expected: NodeType,
        /// Kind actually bound to the name.
        found: NodeType,
    },
    /// A symbolic link was present but its chain dereferenced to nothing.
    ///
    /// Distinct from plain not-found: the name *is* registered, its
    /// destination is dangling.
    #[error("symbolic link `{name}` cannot be resolved")]
    UnresolvableLink {
        /// Link name whose chain dead-ended.
        name: String,
    },
    /// Removal target does not exist in the group.
    #[error("node `{name}` not found")]
    NodeNotFound {
        /// Name (or rendered id, for by-reference removal) of the missing node.
        name: String,
    },
    /// A finite dimension does not fit the native 32-bit representation.
    #[error("dimension {value} exceeds the native representable range")]
    DimensionOverflow {
        /// The offending dimension size.
        value: i64,
    },
    /// Shape metadata length disagrees with the dataset rank.
    #[error("shape has {found} dimensions, dataset rank is {expected}")]
    RankMismatch {
        /// Rank of the attached dataset.
        expected: usize,
        /// Length of the supplied shape.
        found: usize,
    },
    /// A path consisting solely of an attribute name is not addressable.
    #[error("path `{path}` contains only an attribute name")]
    AttributeOnlyPath {
        /// The rejected path.
        path: String,
    },
}

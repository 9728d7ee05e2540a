// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Per-node attribute storage.
//!
//! Every node variant carries one [`Attributes`] store: an
//! insertion-ordered name→value map with last-write-wins overwrite and
//! idempotent removal. The store is interior-locked so attribute edits
//! never require a structural lock on the owning group.
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use rustc_hash::FxHashMap;

/// Value payload of an attribute.
///
/// Enough of the array library's value space to support attribute-filtered
/// path lookups and NeXus metadata (`units`, `signal`, axis indices)
/// without pulling the full array stack into the tree model.
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    /// A single text value.
    Text(String),
    /// An array of text values.
    TextArray(Vec<String>),
    /// A single signed integer.
    Int(i64),
    /// An array of signed integers.
    IntArray(Vec<i64>),
    /// A single floating-point value.
    Float(f64),
    /// An array of floating-point values.
    FloatArray(Vec<f64>),
}

impl AttrValue {
    /// Number of elements carried by the value.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Text(_) | Self::Int(_) | Self::Float(_) => 1,
            Self::TextArray(v) => v.len(),
            Self::IntArray(v) => v.len(),
            Self::FloatArray(v) => v.len(),
        }
    }

    /// True when the value carries no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// First element rendered as text, when one exists.
    #[must_use]
    pub fn first_as_text(&self) -> Option<String> {
        match self {
            Self::Text(s) => Some(s.clone()),
            Self::TextArray(v) => v.first().cloned(),
            Self::Int(i) => Some(i.to_string()),
            Self::IntArray(v) => v.first().map(ToString::to_string),
            Self::Float(f) => Some(f.to_string()),
            Self::FloatArray(v) => v.first().map(ToString::to_string),
        }
    }
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for AttrValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for AttrValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

/// A named attribute attached to a node.
#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    name: String,
    value: AttrValue,
}

impl Attribute {
    /// Creates an attribute from a name and any supported value.
    pub fn new(name: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Attribute name, unique within its owning node.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Attribute value payload.
    #[must_use]
    pub fn value(&self) -> &AttrValue {
        &self.value
    }
}

#[derive(Debug, Default)]
struct Store {
    order: Vec<String>,
    by_name: FxHashMap<String, Attribute>,
}

/// Insertion-ordered attribute store shared by every node variant.
///
/// Overwriting an existing name keeps its original position; iteration
/// follows first-insertion order.
#[derive(Debug, Default)]
pub struct Attributes {
    inner: RwLock<Store>,
}

impl Attributes {
    fn read(&self) -> RwLockReadGuard<'_, Store> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Store> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Inserts or overwrites by attribute name. Always succeeds.
    pub fn add(&self, attribute: Attribute) {
        let mut store = self.write();
        if !store.by_name.contains_key(attribute.name()) {
            store.order.push(attribute.name().to_string());
        }
        store
            .by_name
            .insert(attribute.name().to_string(), attribute);
    }

    /// Removes by name; removing an absent name is a no-op.
    ///
    /// Returns `true` when an attribute was actually removed.
    pub fn remove(&self, name: &str) -> bool {
        let mut store = self.write();
        if store.by_name.remove(name).is_none() {
            return false;
        }
        store.order.retain(|n| n != name);
        true
    }

    /// True when an attribute with `name` exists.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.read().by_name.contains_key(name)
    }

    /// The attribute named `name`, when present.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Attribute> {
        self.read().by_name.get(name).cloned()
    }

    /// Point-in-time snapshot of attribute names in insertion order.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.read().order.clone()
    }

    /// Number of attributes currently stored.
    #[must_use]
    pub fn len(&self) -> usize {
        self.read().by_name.len()
    }

    /// True when no attributes are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.read().by_name.is_empty()
    }
}

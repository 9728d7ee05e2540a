// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Data nodes: array payload holders with shape metadata.
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::attribute::Attributes;
use crate::dataset::{DatasetRef, ElementKind, MemoryDataset};
use crate::error::TreeError;
use crate::ident::ObjectId;
use crate::shape;

#[derive(Debug, Clone)]
struct CachedText {
    value: String,
    byte_len: usize,
}

#[derive(Debug, Default)]
struct DataState {
    dataset: Option<DatasetRef>,
    supported: bool,
    text: bool,
    unsigned: bool,
    type_name: Option<String>,
    rank: usize,
    // Shapes are stored in native 32-bit form; accessors widen back into
    // the 64-bit domain via the shape module.
    max_shape: Option<Vec<i32>>,
    chunk_shape: Option<Vec<i32>>,
    max_string_length: Option<usize>,
    cached: Option<CachedText>,
}

/// A node holding (or lazily referencing) a multidimensional payload.
///
/// A fresh node is *unsupported* until either [`DataNode::set_dataset`] or
/// [`DataNode::set_empty`] is called. String-ness is auto-detected from
/// the assigned dataset's element kind.
#[derive(Debug)]
pub struct DataNode {
    id: ObjectId,
    attributes: Attributes,
    state: RwLock<DataState>,
}

impl PartialEq for DataNode {
    /// Identity comparison: two handles are equal iff they denote the
    /// same node object, matching [`crate::node::Node::ptr_eq`].
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self, other)
    }
}

impl DataNode {
    /// Creates an unsupported data node with the given object id.
    #[must_use]
    pub fn new(id: ObjectId) -> Arc<Self> {
        Arc::new(Self {
            id,
            attributes: Attributes::default(),
            state: RwLock::new(DataState::default()),
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

    fn read(&self) -> RwLockReadGuard<'_, DataState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, DataState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Replaces the payload.
    ///
    /// Recomputes the rank and the string flag from the dataset, clears any
    /// cached string value, and marks the node supported. Previously stored
    /// max/chunk shapes are re-validated against the new dataset's rank.
    ///
    /// # Errors
    ///
    /// [`TreeError::RankMismatch`] when a previously stored max or chunk
    /// shape disagrees with the new dataset's rank; the node is left
    /// unchanged.
    pub fn set_dataset(&self, dataset: DatasetRef) -> Result<(), TreeError> {
        let rank = dataset.rank();
        let mut state = self.write();
        for stored in [&state.max_shape, &state.chunk_shape].into_iter().flatten() {
            if stored.len() != rank {
                return Err(TreeError::RankMismatch {
                    expected: rank,
                    found: stored.len(),
                });
            }
        }
        state.text = dataset.element_kind() == ElementKind::Text;
        state.rank = rank;
        state.dataset = Some(dataset);
        state.supported = true;
        state.cached = None;
        Ok(())
    }

    /// Clears the payload and marks the node supported with no data.
    ///
    /// Distinct from the unsupported (never initialized) state.
    pub fn set_empty(&self) {
        let mut state = self.write();
        state.dataset = None;
        state.supported = true;
        state.cached = None;
    }

    /// Clears the payload and records an explicit rank for the empty node.
    ///
    /// Used by file builders that know the dataspace rank before any data
    /// exists.
    pub fn set_empty_with_rank(&self, rank: usize) {
        let mut state = self.write();
        state.dataset = None;
        state.supported = true;
        state.cached = None;
        state.rank = rank;
    }

    /// True once either a dataset or the empty marker has been set.
    #[must_use]
    pub fn is_supported(&self) -> bool {
        self.read().supported
    }

    /// The current payload handle, if any.
    #[must_use]
    pub fn dataset(&self) -> Option<DatasetRef> {
        self.read().dataset.clone()
    }

    /// Rank derived from the dataset, or the stored rank when empty.
    #[must_use]
    pub fn rank(&self) -> usize {
        self.read().rank
    }

    /// True iff the payload element kind is textual.
    #[must_use]
    pub fn is_string(&self) -> bool {
        self.read().text
    }

    /// True when the payload elements are unsigned integers.
    #[must_use]
    pub fn is_unsigned(&self) -> bool {
        self.read().unsigned
    }

    /// Records whether the payload elements are unsigned integers.
    pub fn set_unsigned(&self, unsigned: bool) {
        self.write().unsigned = unsigned;
    }

    /// Free-form type name recorded by the storage layer.
    #[must_use]
    pub fn type_name(&self) -> Option<String> {
        self.read().type_name.clone()
    }

    /// Records the storage layer's type name.
    pub fn set_type_name(&self, type_name: impl Into<String>) {
        self.write().type_name = Some(type_name.into());
    }

    /// Maximum string length hint for textual payloads.
    #[must_use]
    pub fn max_string_length(&self) -> Option<usize> {
        self.read().max_string_length
    }

    /// Records the maximum string length hint.
    pub fn set_max_string_length(&self, length: usize) {
        self.write().max_string_length = Some(length);
    }

    /// Textual value of a string dataset.
    ///
    /// Returns `None` when the node is not flagged textual. The value is
    /// memoized; the cache is invalidated by [`DataNode::set_dataset`] and
    /// refreshed by [`DataNode::set_string`]. If the payload is lazy, this
    /// forces materialization — a blocking call — and on failure returns a
    /// diagnostic placeholder rather than an error.
    #[must_use]
    pub fn string_value(&self) -> Option<String> {
        let dataset = {
            let state = self.read();
            if !state.text {
                return None;
            }
            if let Some(cached) = &state.cached {
                return Some(cached.value.clone());
            }
            state.dataset.clone()?
        };
        // Materialize without holding the node lock; reads may block on I/O.
        match dataset.read_strings() {
            Ok(values) => {
                let text = render_text(&values);
                let mut state = self.write();
                // Only cache if the payload was not swapped mid-read.
                if state
                    .dataset
                    .as_ref()
                    .is_some_and(|current| Arc::ptr_eq(current, &dataset))
                {
                    state.cached = Some(CachedText {
                        byte_len: text.len(),
                        value: text.clone(),
                    });
                }
                Some(text)
            }
            Err(err) => {
                tracing::warn!(id = self.id.value(), error = %err, "string materialization failed");
                Some(format!("<{err}>"))
            }
        }
    }

    /// UTF-8 byte length of the memoized string value, when computed.
    #[must_use]
    pub fn string_byte_length(&self) -> Option<usize> {
        self.read().cached.as_ref().map(|c| c.byte_len)
    }

    /// Replaces the payload with a single-element textual dataset.
    ///
    /// Sets the string flag, marks the node supported, and primes the
    /// string cache in one step.
    pub fn set_string(&self, value: impl Into<String>) {
        let value = value.into();
        let dataset: DatasetRef = Arc::new(MemoryDataset::scalar_text(value.clone()));
        let mut state = self.write();
        state.rank = dataset.rank();
        state.dataset = Some(dataset);
        state.text = true;
        state.supported = true;
        state.cached = Some(CachedText {
            byte_len: value.len(),
            value,
        });
    }

    /// Records the maximum shape, one entry per rank.
    ///
    /// [`shape::UNLIMITED`] marks an unbounded dimension. When the payload
    /// is resizable the shape is propagated down to it.
    ///
    /// # Errors
    ///
    /// [`TreeError::RankMismatch`] when a dataset is attached and the shape
    /// length differs from its rank; [`TreeError::DimensionOverflow`] when
    /// a finite dimension exceeds the native range.
    pub fn set_max_shape(&self, max_shape: &[i64]) -> Result<(), TreeError> {
        let native = shape::to_native(max_shape)?;
        let mut state = self.write();
        if let Some(dataset) = &state.dataset {
            if max_shape.len() != dataset.rank() {
                return Err(TreeError::RankMismatch {
                    expected: dataset.rank(),
                    found: max_shape.len(),
                });
            }
            dataset.apply_max_shape(max_shape);
        }
        state.max_shape = Some(native);
        Ok(())
    }

    /// The maximum shape widened back into the 64-bit domain.
    #[must_use]
    pub fn max_shape(&self) -> Option<Vec<i64>> {
        self.read().max_shape.as_deref().map(shape::from_native)
    }

    /// Records the chunk shape, one entry per rank.
    ///
    /// # Errors
    ///
    /// Same conditions as [`DataNode::set_max_shape`].
    pub fn set_chunk_shape(&self, chunk_shape: &[i64]) -> Result<(), TreeError> {
        let native = shape::to_native(chunk_shape)?;
        let mut state = self.write();
        if let Some(dataset) = &state.dataset {
            if chunk_shape.len() != dataset.rank() {
                return Err(TreeError::RankMismatch {
                    expected: dataset.rank(),
                    found: chunk_shape.len(),
                });
            }
            dataset.apply_chunk_shape(chunk_shape);
        }
        state.chunk_shape = Some(native);
        Ok(())
    }

    /// The chunk shape widened back into the 64-bit domain.
    #[must_use]
    pub fn chunk_shape(&self) -> Option<Vec<i64>> {
        self.read().chunk_shape.as_deref().map(shape::from_native)
    }
}

fn render_text(values: &[String]) -> String {
    match values {
        [] => String::new(),
        [single] => single.clone(),
        many => format!("[{}]", many.join(", ")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::MemoryValues;

    #[test]
    fn fresh_node_is_unsupported() {
        let node = DataNode::new(ObjectId::from_u64_truncate(1));
        assert!(!node.is_supported());
        assert!(node.dataset().is_none());
        assert!(node.string_value().is_none());
    }

    #[test]
    fn set_empty_marks_supported_without_payload() {
        let node = DataNode::new(ObjectId::from_u64_truncate(2));
        node.set_empty();
        assert!(node.is_supported());
        assert!(node.dataset().is_none());
    }

    #[test]
    fn multi_element_strings_render_as_list() {
        let node = DataNode::new(ObjectId::from_u64_truncate(3));
        let ds = Arc::new(MemoryDataset::text(vec![
            "a".to_string(),
            "b".to_string(),
        ]));
        node.set_dataset(ds).unwrap();
        assert!(node.is_string());
        assert_eq!(node.string_value(), Some("[a, b]".to_string()));
    }

    #[test]
    fn empty_text_dataset_renders_empty_string() {
        let node = DataNode::new(ObjectId::from_u64_truncate(4));
        node.set_dataset(Arc::new(MemoryDataset::new(
            vec![0],
            MemoryValues::Text(Vec::new()),
        )))
        .unwrap();
        assert_eq!(node.string_value(), Some(String::new()));
    }
}

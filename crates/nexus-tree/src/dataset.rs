// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Lazy-dataset collaborator boundary.
//!
//! The tree model never owns bulk array data. Data nodes hold a
//! [`DatasetRef`] — a shared handle whose payload may still live on disk.
//! Materialization is an explicit, potentially blocking, potentially
//! failing call; callers needing timeouts wrap it themselves.
use std::fmt;
use std::sync::Arc;

use thiserror::Error;

/// Failure to materialize a lazily loaded payload.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("could not read data: {reason}")]
pub struct DatasetError {
    /// Human-readable cause reported by the storage layer.
    pub reason: String,
}

impl DatasetError {
    /// Creates an error from a storage-layer cause.
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Element kind of a dataset payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    /// Integer elements.
    Integer,
    /// Floating-point elements.
    Float,
    /// Textual elements.
    Text,
}

/// Handle to a possibly lazily materialized multidimensional payload.
///
/// Implemented by the array/storage layer; the tree model consumes only
/// this narrow surface. `apply_max_shape`/`apply_chunk_shape` are hints
/// for dynamically resizable payloads and default to no-ops.
pub trait LazyDataset: fmt::Debug + Send + Sync {
    /// Number of dimensions of the payload.
    fn rank(&self) -> usize;

    /// Current dimension sizes, one entry per rank.
    fn shape(&self) -> Vec<u64>;

    /// Element kind of the payload.
    fn element_kind(&self) -> ElementKind;

    /// Materializes the payload and renders its elements as text, in
    /// row-major order.
    ///
    /// May block on external I/O.
    ///
    /// # Errors
    ///
    /// [`DatasetError`] when the backing storage cannot be read.
    fn read_strings(&self) -> Result<Vec<String>, DatasetError>;

    /// Propagates a new maximum shape to a resizable payload.
    fn apply_max_shape(&self, _max_shape: &[i64]) {}

    /// Propagates a chunk shape to a resizable payload.
    fn apply_chunk_shape(&self, _chunk_shape: &[i64]) {}
}

/// Shared dataset handle. Handle identity (`Arc::ptr_eq`) is the
/// de-duplication key used when collecting datasets across a tree.
pub type DatasetRef = Arc<dyn LazyDataset>;

/// Element storage for [`MemoryDataset`].
#[derive(Debug, Clone, PartialEq)]
pub enum MemoryValues {
    /// Textual elements.
    Text(Vec<String>),
    /// Integer elements.
    Int(Vec<i64>),
    /// Floating-point elements.
    Float(Vec<f64>),
}

impl MemoryValues {
    fn kind(&self) -> ElementKind {
        match self {
            Self::Text(_) => ElementKind::Text,
            Self::Int(_) => ElementKind::Integer,
            Self::Float(_) => ElementKind::Float,
        }
    }

    fn render(&self) -> Vec<String> {
        match self {
            Self::Text(v) => v.clone(),
            Self::Int(v) => v.iter().map(ToString::to_string).collect(),
            Self::Float(v) => v.iter().map(ToString::to_string).collect(),
        }
    }
}

/// Fully realized in-memory dataset.
///
/// Backs `DataNode::set_string` and gives builders/tests a payload without
/// the real array library. Not resizable: the shape hints are ignored.
#[derive(Debug, Clone, PartialEq)]
pub struct MemoryDataset {
    shape: Vec<u64>,
    values: MemoryValues,
}

impl MemoryDataset {
    /// Creates a dataset with an explicit shape.
    #[must_use]
    pub fn new(shape: Vec<u64>, values: MemoryValues) -> Self {
        Self { shape, values }
    }

    /// Rank-0 (scalar) text dataset.
    pub fn scalar_text(value: impl Into<String>) -> Self {
        Self {
            shape: Vec::new(),
            values: MemoryValues::Text(vec![value.into()]),
        }
    }

    /// One-dimensional text dataset.
    #[must_use]
    pub fn text(values: Vec<String>) -> Self {
        Self {
            shape: vec![values.len() as u64],
            values: MemoryValues::Text(values),
        }
    }

    /// One-dimensional integer dataset.
    #[must_use]
    pub fn ints(values: Vec<i64>) -> Self {
        Self {
            shape: vec![values.len() as u64],
            values: MemoryValues::Int(values),
        }
    }

    /// One-dimensional floating-point dataset.
    #[must_use]
    pub fn floats(values: Vec<f64>) -> Self {
        Self {
            shape: vec![values.len() as u64],
            values: MemoryValues::Float(values),
        }
    }
}

impl LazyDataset for MemoryDataset {
    fn rank(&self) -> usize {
        self.shape.len()
    }

    fn shape(&self) -> Vec<u64> {
        self.shape.clone()
    }

    fn element_kind(&self) -> ElementKind {
        self.values.kind()
    }

    fn read_strings(&self) -> Result<Vec<String>, DatasetError> {
        Ok(self.values.render())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_text_has_rank_zero() {
        let ds = MemoryDataset::scalar_text("counts");
        assert_eq!(ds.rank(), 0);
        assert_eq!(ds.element_kind(), ElementKind::Text);
        assert_eq!(ds.read_strings(), Ok(vec!["counts".to_string()]));
    }

    #[test]
    fn numeric_values_render_as_text() {
        let ds = MemoryDataset::ints(vec![1, 2, 3]);
        assert_eq!(ds.shape(), vec![3]);
        assert_eq!(
            ds.read_strings(),
            Ok(vec!["1".to_string(), "2".to_string(), "3".to_string()])
        );
    }
}

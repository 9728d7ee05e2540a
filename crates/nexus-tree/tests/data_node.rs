// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Data-node payload lifecycle: shape metadata, string caching, and
//! graceful materialization failure.

use std::sync::{Arc, Mutex};

use nexus_tree::{
    shape, DataNode, DatasetError, ElementKind, LazyDataset, MemoryDataset, MemoryValues,
    ObjectId, TreeError,
};

fn oid(v: u64) -> ObjectId {
    ObjectId::from_u64_truncate(v)
}

fn rank2_ints() -> Arc<MemoryDataset> {
    Arc::new(MemoryDataset::new(
        vec![3, 10],
        MemoryValues::Int((0..30).collect()),
    ))
}

/// A resizable payload that records the shape hints pushed down to it.
#[derive(Debug, Default)]
struct ResizableDataset {
    applied_max: Mutex<Option<Vec<i64>>>,
    applied_chunk: Mutex<Option<Vec<i64>>>,
}

impl LazyDataset for ResizableDataset {
    fn rank(&self) -> usize {
        2
    }

    fn shape(&self) -> Vec<u64> {
        vec![3, 10]
    }

    fn element_kind(&self) -> ElementKind {
        ElementKind::Integer
    }

    fn read_strings(&self) -> Result<Vec<String>, DatasetError> {
        Ok(Vec::new())
    }

    fn apply_max_shape(&self, max_shape: &[i64]) {
        *self.applied_max.lock().unwrap() = Some(max_shape.to_vec());
    }

    fn apply_chunk_shape(&self, chunk_shape: &[i64]) {
        *self.applied_chunk.lock().unwrap() = Some(chunk_shape.to_vec());
    }
}

/// A lazy payload whose materialization always fails.
#[derive(Debug)]
struct BrokenDataset;

impl LazyDataset for BrokenDataset {
    fn rank(&self) -> usize {
        1
    }

    fn shape(&self) -> Vec<u64> {
        vec![4]
    }

    fn element_kind(&self) -> ElementKind {
        ElementKind::Text
    }

    fn read_strings(&self) -> Result<Vec<String>, DatasetError> {
        Err(DatasetError::new("checksum failure in chunk 0"))
    }
}

#[test]
fn unlimited_max_shape_round_trips() {
    let node = DataNode::new(oid(1));
    node.set_dataset(rank2_ints()).unwrap();

    node.set_max_shape(&[shape::UNLIMITED, 10]).unwrap();
    assert_eq!(node.max_shape(), Some(vec![shape::UNLIMITED, 10]));
}

#[test]
fn max_shape_rank_must_match_the_dataset() {
    let node = DataNode::new(oid(1));
    node.set_dataset(rank2_ints()).unwrap();

    assert_eq!(
        node.set_max_shape(&[10]),
        Err(TreeError::RankMismatch {
            expected: 2,
            found: 1
        })
    );
    assert_eq!(node.max_shape(), None);
}

#[test]
fn oversized_finite_dimension_is_a_hard_error() {
    let node = DataNode::new(oid(1));
    let too_big = i64::from(i32::MAX) + 1;
    assert_eq!(
        node.set_max_shape(&[too_big, 10]),
        Err(TreeError::DimensionOverflow { value: too_big })
    );
}

#[test]
fn replacing_the_dataset_revalidates_stored_shapes() {
    let node = DataNode::new(oid(1));
    node.set_max_shape(&[shape::UNLIMITED, 10]).unwrap();

    // Rank-1 payload conflicts with the stored rank-2 max shape.
    let err = node
        .set_dataset(Arc::new(MemoryDataset::ints(vec![1, 2, 3])))
        .unwrap_err();
    assert_eq!(
        err,
        TreeError::RankMismatch {
            expected: 1,
            found: 2
        }
    );
    // Failed replacement leaves the node untouched.
    assert!(!node.is_supported());
    assert!(node.dataset().is_none());

    node.set_dataset(rank2_ints()).unwrap();
    assert!(node.is_supported());
    assert_eq!(node.rank(), 2);
}

#[test]
fn shape_hints_propagate_to_resizable_payloads() {
    let node = DataNode::new(oid(1));
    let payload = Arc::new(ResizableDataset::default());
    node.set_dataset(payload.clone()).unwrap();

    node.set_max_shape(&[shape::UNLIMITED, 10]).unwrap();
    node.set_chunk_shape(&[1, 10]).unwrap();

    assert_eq!(
        *payload.applied_max.lock().unwrap(),
        Some(vec![shape::UNLIMITED, 10])
    );
    assert_eq!(*payload.applied_chunk.lock().unwrap(), Some(vec![1, 10]));
    assert_eq!(node.chunk_shape(), Some(vec![1, 10]));
}

#[test]
fn set_string_primes_the_cache() {
    let node = DataNode::new(oid(1));
    node.set_string("Kelvin °");
    assert!(node.is_supported());
    assert!(node.is_string());
    assert_eq!(node.string_value(), Some("Kelvin °".to_string()));
    assert_eq!(node.string_byte_length(), Some("Kelvin °".len()));
}

#[test]
fn replacing_the_dataset_invalidates_the_string_cache() {
    let node = DataNode::new(oid(1));
    node.set_string("old");
    assert_eq!(node.string_value(), Some("old".to_string()));

    node.set_dataset(Arc::new(MemoryDataset::scalar_text("new")))
        .unwrap();
    assert_eq!(node.string_byte_length(), None);
    assert_eq!(node.string_value(), Some("new".to_string()));
    assert_eq!(node.string_byte_length(), Some(3));
}

#[test]
fn non_string_payloads_have_no_string_value() {
    let node = DataNode::new(oid(1));
    node.set_dataset(rank2_ints()).unwrap();
    assert!(!node.is_string());
    assert_eq!(node.string_value(), None);
}

#[test]
fn failed_materialization_yields_a_placeholder() {
    let node = DataNode::new(oid(1));
    node.set_dataset(Arc::new(BrokenDataset)).unwrap();

    let value = node.string_value().unwrap();
    assert!(value.contains("could not read data"));
    assert!(value.contains("checksum failure"));
    // Failures are not memoized.
    assert_eq!(node.string_byte_length(), None);
}

#[test]
fn auxiliary_metadata_round_trips() {
    let node = DataNode::new(oid(1));
    node.set_unsigned(true);
    node.set_type_name("NX_UINT32");
    node.set_max_string_length(64);
    assert!(node.is_unsigned());
    assert_eq!(node.type_name(), Some("NX_UINT32".to_string()));
    assert_eq!(node.max_string_length(), Some(64));
}

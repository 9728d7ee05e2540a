// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Symbolic-link dereferencing: chains, danglers, cycles, and the
//! trailing-separator counting convention.
//!
//! A dangling chain hit by a typed getter is `UnresolvableLink` — the
//! name *was* registered — while plain path resolution reports `None`.

use std::sync::Arc;

use nexus_tree::{
    DataNode, GroupNode, MemoryDataset, Node, NodeType, ObjectId, SymbolicNode, Tree, TreeError,
};

fn oid(v: u64) -> ObjectId {
    ObjectId::from_u64_truncate(v)
}

/// `/instrument/temperature` plus a symbolic `link1` under the root
/// pointing at the data node.
fn linked_tree() -> (Arc<Tree>, Arc<GroupNode>, Arc<GroupNode>, Arc<DataNode>) {
    let root = GroupNode::new(oid(1));
    let tree = Tree::new(None, root.clone());
    let instrument = GroupNode::new(oid(2));
    root.add_group_node("instrument", instrument.clone()).unwrap();
    let temperature = DataNode::new(oid(3));
    temperature.set_string("295.4");
    instrument
        .add_data_node("temperature", temperature.clone())
        .unwrap();
    let link1 = SymbolicNode::new(oid(4), &tree, "/instrument/temperature");
    root.add_symbolic_node("link1", link1).unwrap();
    (tree, root, instrument, temperature)
}

#[test]
fn getter_dereferences_to_the_same_identity() {
    let (_, root, _, temperature) = linked_tree();
    let via_link = root.get_data_node("link1").unwrap().unwrap();
    assert!(Arc::ptr_eq(&via_link, &temperature));
}

#[test]
fn dangling_link_is_unresolvable_not_not_found() {
    let (_, root, instrument, _) = linked_tree();
    instrument.remove_data_node("temperature").unwrap();

    assert_eq!(
        root.get_data_node("link1"),
        Err(TreeError::UnresolvableLink {
            name: "link1".to_string()
        })
    );
    // A name that was never registered stays plain not-found.
    assert!(root.get_data_node("never").unwrap().is_none());
}

#[test]
fn dangling_link_during_path_resolution_is_none() {
    let (tree, _, instrument, _) = linked_tree();
    instrument.remove_data_node("temperature").unwrap();
    assert!(tree.find_node("/link1").unwrap().is_none());
}

#[test]
fn chains_resolve_through_multiple_hops() {
    let (tree, root, _, temperature) = linked_tree();
    let link2 = SymbolicNode::new(oid(5), &tree, "/link1");
    root.add_symbolic_node("link2", link2).unwrap();

    let via_chain = root.get_data_node("link2").unwrap().unwrap();
    assert!(Arc::ptr_eq(&via_chain, &temperature));

    let found = tree.find_node("/link2").unwrap().unwrap();
    assert!(found.ptr_eq(&Node::Data(temperature)));
}

#[test]
fn wrong_final_type_is_a_type_mismatch_not_unresolvable() {
    let (_, root, ..) = linked_tree();
    assert_eq!(
        root.get_group_node("link1"),
        Err(TreeError::TypeMismatch {
            name: "link1".to_string(),
            expected: NodeType::Group,
            found: NodeType::Data,
        })
    );
}

#[test]
fn cyclic_chains_fail_instead_of_spinning() {
    let root = GroupNode::new(oid(1));
    let tree = Tree::new(None, root.clone());
    root.add_symbolic_node("a", SymbolicNode::new(oid(2), &tree, "/b"))
        .unwrap();
    root.add_symbolic_node("b", SymbolicNode::new(oid(3), &tree, "/a"))
        .unwrap();

    assert_eq!(
        root.get_data_node("a"),
        Err(TreeError::UnresolvableLink {
            name: "a".to_string()
        })
    );
    assert!(tree.find_node("/a").unwrap().is_none());
}

#[test]
fn symbolic_getter_does_not_dereference() {
    let (_, root, ..) = linked_tree();
    let symbolic = root.get_symbolic_node("link1").unwrap().unwrap();
    assert_eq!(symbolic.path(), "/instrument/temperature");

    assert_eq!(
        root.get_symbolic_node("instrument"),
        Err(TreeError::TypeMismatch {
            name: "instrument".to_string(),
            expected: NodeType::Symbolic,
            found: NodeType::Group,
        })
    );
}

#[test]
fn external_links_never_resolve_in_memory() {
    let (_, root, ..) = linked_tree();
    let external = SymbolicNode::external(oid(6), "hdf5://other/calib.nxs", "/calibration/gain");
    assert!(external.is_external());
    root.add_symbolic_node("calib", external).unwrap();

    assert_eq!(
        root.get_data_node("calib"),
        Err(TreeError::UnresolvableLink {
            name: "calib".to_string()
        })
    );
}

#[test]
fn paths_resolve_through_symbolic_groups_mid_path() {
    let (tree, root, _, temperature) = linked_tree();
    let to_instrument = SymbolicNode::new(oid(7), &tree, "/instrument");
    root.add_symbolic_node("via/", to_instrument).unwrap();

    let found = tree.find_node("/via/temperature").unwrap().unwrap();
    assert!(found.ptr_eq(&Node::Data(temperature)));
}

#[test]
fn trailing_separator_counts_symbolic_links_as_groups() {
    let root = GroupNode::new(oid(1));
    let tree = Tree::new(None, root.clone());

    root.add_symbolic_node("as_group/", SymbolicNode::new(oid(2), &tree, "/x"))
        .unwrap();
    root.add_symbolic_node("as_data", SymbolicNode::new(oid(3), &tree, "/y"))
        .unwrap();

    assert_eq!(root.number_of_group_nodes(), 1);
    assert_eq!(root.number_of_data_nodes(), 1);
    // The stored name drops the separator.
    assert!(root.contains_node("as_group"));
    assert!(!root.contains_node("as_group/"));

    // Removal decrements the same counter the add incremented.
    root.remove_symbolic_node("as_group").unwrap();
    assert_eq!(root.number_of_group_nodes(), 0);
    assert_eq!(root.number_of_data_nodes(), 1);
}

#[test]
fn collect_datasets_follows_links_and_deduplicates() {
    let (tree, root, instrument, temperature) = linked_tree();
    let detector = GroupNode::new(oid(10));
    root.add_group_node("detector", detector.clone()).unwrap();

    let other = DataNode::new(oid(11));
    other
        .set_dataset(Arc::new(MemoryDataset::ints(vec![1, 2, 3])))
        .unwrap();
    detector.add_data_node("temperature", other).unwrap();

    // A second route to the same payload must not duplicate it.
    let shortcut = SymbolicNode::new(oid(12), &tree, "/instrument/temperature");
    detector.add_symbolic_node("temperature2", shortcut).unwrap();
    let _ = instrument;

    let datasets = root.collect_datasets("temperature");
    assert_eq!(datasets.len(), 2);
    assert!(datasets
        .iter()
        .any(|d| temperature.dataset().is_some_and(|t| Arc::ptr_eq(d, &t))));
}

#![cfg(feature = "serde")]

use entity_store::{DenseStore, GroupedStore, SharedStore, SparseSet};

#[test]
fn sparse_set_round_trips_through_json() {
    let mut set = SparseSet::new();
    for id in [2u64, 9, 4, 1_000] {
        set.insert(id).unwrap();
    }

    let json = serde_json::to_string(&set).unwrap();
    let restored: SparseSet = serde_json::from_str(&json).unwrap();
    restored.validate();

    assert_eq!(restored, set);
    assert_eq!(restored.as_slice(), set.as_slice());
}

#[test]
fn sparse_set_rejects_invalid_ids() {
    assert!(serde_json::from_str::<SparseSet>("[0]").is_err());
    assert!(serde_json::from_str::<SparseSet>("[3, 3]").is_err());
}

#[test]
fn dense_store_round_trips_through_json() {
    let mut store = DenseStore::new();
    store.set(1, "a".to_string()).unwrap();
    store.set(5, "b".to_string()).unwrap();

    let json = serde_json::to_string(&store).unwrap();
    let restored: DenseStore<String> = serde_json::from_str(&json).unwrap();
    restored.indices().validate();

    assert_eq!(restored, store);
    assert_eq!(restored.entities(), store.entities());
}

#[test]
fn dense_store_rejects_misaligned_columns() {
    let json = r#"[[1, 2], ["only one value"]]"#;
    assert!(serde_json::from_str::<DenseStore<String>>(json).is_err());
}

#[test]
fn shared_store_round_trips_preserving_interning() {
    let mut store = SharedStore::new();
    store.set(1, "x".to_string()).unwrap();
    store.set(2, "x".to_string()).unwrap();
    store.set(3, "y".to_string()).unwrap();

    let json = serde_json::to_string(&store).unwrap();
    let restored: SharedStore<String> = serde_json::from_str(&json).unwrap();
    restored.indices().validate();

    assert_eq!(restored, store);
    assert_eq!(restored.shared_len(), 2);
}

#[test]
fn shared_store_rejects_dangling_indices_and_duplicates() {
    // Index 5 points past a two-entry table.
    let dangling = r#"[[1], [5], ["x", "y"]]"#;
    assert!(serde_json::from_str::<SharedStore<String>>(dangling).is_err());

    // Two equal interned values defeat the point of the table.
    let duplicated = r#"[[1, 2], [0, 1], ["x", "x"]]"#;
    assert!(serde_json::from_str::<SharedStore<String>>(duplicated).is_err());
}

#[test]
fn grouped_store_round_trips_preserving_groups() {
    let mut store = GroupedStore::new();
    store.set(1, 10u32).unwrap();
    store.link(2, 1).unwrap();
    store.set(3, 30u32).unwrap();

    let json = serde_json::to_string(&store).unwrap();
    let restored: GroupedStore<u32> = serde_json::from_str(&json).unwrap();
    restored.indices().validate();

    assert_eq!(restored, store);
    assert_eq!(restored.group_count(), 2);
    assert_eq!(restored.group_of(1), restored.group_of(2));
}

#[test]
fn grouped_store_rejects_inconsistent_group_tables() {
    // Sizes claim three members, column holds two.
    let wrong_sizes = r#"[[1, 2], [0, 0], [3], [7]]"#;
    assert!(serde_json::from_str::<GroupedStore<u32>>(wrong_sizes).is_err());

    // Group id outside the table.
    let dangling = r#"[[1], [4], [1], [7]]"#;
    assert!(serde_json::from_str::<GroupedStore<u32>>(dangling).is_err());

    // An empty group must have been reclaimed before serialization.
    let empty_group = r#"[[1], [1], [0, 1], [7, 8]]"#;
    assert!(serde_json::from_str::<GroupedStore<u32>>(empty_group).is_err());
}

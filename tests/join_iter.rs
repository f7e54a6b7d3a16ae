use entity_store::{all_of, any_of, not, with, DenseStore, SharedStore, SparseSet};

fn dense_with(ids: &[u64]) -> DenseStore<u32> {
    let mut store = DenseStore::new();
    for &id in ids {
        store.set(id, id as u32).unwrap();
    }
    store
}

#[test]
fn conjunction_intersects_memberships() {
    let a = dense_with(&[1, 2, 3, 4]);
    let b = dense_with(&[2, 3]);

    let matched: Vec<_> = all_of(vec![with(&a), with(&b)]).into_iter().collect();
    assert_eq!(matched, vec![2, 3]);
}

#[test]
fn driver_is_the_shortest_conjunct() {
    let a = dense_with(&[1, 2, 3, 4]);
    // Shorter store, deliberately out of ascending order: its packed order
    // must define the yield order.
    let b = dense_with(&[3, 2]);

    let matched: Vec<_> = all_of(vec![with(&a), with(&b)]).into_iter().collect();
    assert_eq!(matched, vec![3, 2]);
}

#[test]
fn boolean_mix_yields_expected_entities() {
    let a = dense_with(&[1, 2, 3, 4]);
    let b = dense_with(&[2, 3]);
    let c = dense_with(&[3, 4]);

    // A ∧ (B ∨ C) ∧ ¬(B ∧ C)
    let filter = all_of(vec![
        with(&a),
        any_of(vec![with(&b), with(&c)]),
        not(all_of(vec![with(&b), with(&c)])),
    ]);

    let matched: Vec<_> = filter.into_iter().collect();
    // Driven by A, so A's packed order.
    assert_eq!(matched, vec![2, 4]);
}

#[test]
fn disjunction_without_conjuncts_drives_from_the_union() {
    let b = dense_with(&[5, 2]);
    let c = dense_with(&[2, 9]);

    let matched: Vec<_> = any_of(vec![with(&b), with(&c)]).into_iter().collect();
    // Union keeps the first driver's packed order, then new ids from the next.
    assert_eq!(matched, vec![5, 2, 9]);
}

#[test]
fn negation_filters_the_driver() {
    let a = dense_with(&[1, 2, 3, 4]);
    let b = dense_with(&[2, 4]);

    let matched: Vec<_> = all_of(vec![with(&a), not(with(&b))]).into_iter().collect();
    assert_eq!(matched, vec![1, 3]);
}

#[test]
fn pure_negation_yields_nothing() {
    let b = dense_with(&[1, 2]);

    let matched: Vec<_> = not(with(&b)).into_iter().collect();
    assert!(matched.is_empty());
}

#[test]
fn and_or_chaining_matches_nested_constructors() {
    let a = dense_with(&[1, 2, 3, 4, 5]);
    let b = dense_with(&[2, 3]);
    let c = dense_with(&[4]);

    let chained: Vec<_> = with(&a).and(with(&b).or(with(&c))).into_iter().collect();
    assert_eq!(chained, vec![2, 3, 4]);
}

#[test]
fn matches_evaluates_without_iteration() {
    let a = dense_with(&[1, 2]);
    let b = dense_with(&[2]);

    let filter = all_of(vec![with(&a), with(&b)]);
    assert!(!filter.matches(1));
    assert!(filter.matches(2));
    assert!(!filter.matches(99));
}

#[test]
fn joins_mix_store_shapes_and_raw_sets() {
    let mut names = SharedStore::new();
    names.set(1, "troll".to_string()).unwrap();
    names.set(2, "troll".to_string()).unwrap();
    names.set(3, "elf".to_string()).unwrap();

    let positions = dense_with(&[2, 3, 4]);

    let mut tagged = SparseSet::new();
    for id in [3, 4, 5] {
        tagged.insert(id).unwrap();
    }

    let matched: Vec<_> =
        all_of(vec![with(&names), with(&positions), with(&tagged)]).into_iter().collect();
    assert_eq!(matched, vec![3]);
}

#[test]
fn join_is_lazy_and_resumable() {
    let a = dense_with(&[1, 2, 3, 4, 5, 6]);
    let b = dense_with(&[2, 4, 6]);

    let mut iter = all_of(vec![with(&a), with(&b)]).into_iter();
    assert_eq!(iter.next(), Some(2));

    let rest: Vec<_> = iter.collect();
    assert_eq!(rest, vec![4, 6]);
}

#[test]
fn empty_driver_yields_nothing() {
    let a: DenseStore<u32> = DenseStore::new();
    let b = dense_with(&[1, 2]);

    let matched: Vec<_> = all_of(vec![with(&a), with(&b)]).into_iter().collect();
    assert!(matched.is_empty());
}

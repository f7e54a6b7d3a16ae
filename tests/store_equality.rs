use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use entity_store::{
    all_of, empty_store, with, Component, ComponentDesc, DenseStore, ErasedStore, GroupedStore,
    SharedStore, StorageKind,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
struct Mass(u32);

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct Material(String);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
struct Team(u8);

impl Component for Mass {
    const KIND: StorageKind = StorageKind::Dense;
    type Store = DenseStore<Mass>;
}

impl Component for Material {
    const KIND: StorageKind = StorageKind::Shared;
    type Store = SharedStore<Material>;
}

impl Component for Team {
    const KIND: StorageKind = StorageKind::Grouped;
    type Store = GroupedStore<Team>;
}

fn hash_of<T: Hash>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

#[test]
fn component_desc_reports_declared_kind() {
    let mass = ComponentDesc::of::<Mass>();
    assert_eq!(mass.kind, StorageKind::Dense);
    assert!(mass.matches_type::<Mass>());
    assert!(!mass.matches_type::<Team>());
    assert!(mass.name.contains("Mass"));

    assert_eq!(ComponentDesc::of::<Material>().kind, StorageKind::Shared);
    assert_eq!(ComponentDesc::of::<Team>().kind, StorageKind::Grouped);
    assert_eq!(ComponentDesc::of::<Team>().kind.name(), "grouped");
    assert!(format!("{}", ComponentDesc::of::<Mass>()).contains("dense"));
}

#[test]
fn empty_store_builds_the_declared_shape() {
    let mut masses = empty_store::<Mass>();
    masses.set(1, Mass(5)).unwrap();
    assert_eq!(masses.get(1), Some(&Mass(5)));

    let materials = empty_store::<Material>();
    assert_eq!(materials.shared_len(), 0);

    let teams = empty_store::<Team>();
    assert_eq!(teams.group_count(), 0);
}

#[test]
fn equal_stores_hash_alike() {
    let mut a = DenseStore::new();
    let mut b = DenseStore::new();
    for id in [1u64, 2, 3] {
        a.set(id, Mass(id as u32)).unwrap();
    }
    for id in [3u64, 1, 2] {
        b.set(id, Mass(id as u32)).unwrap();
    }

    assert_eq!(a, b);
    assert_eq!(hash_of(&a), hash_of(&b));
    assert_eq!(a.content_hash(), b.content_hash());

    b.set(3, Mass(99)).unwrap();
    assert_ne!(a.content_hash(), b.content_hash());
}

#[test]
fn erased_stores_compare_by_element_type_and_contents() {
    let mut masses = DenseStore::new();
    masses.set(1, Mass(1)).unwrap();

    let mut more_masses = DenseStore::new();
    more_masses.set(1, Mass(1)).unwrap();

    let mut teams = GroupedStore::new();
    teams.set(1, Team(1)).unwrap();

    let erased_a: &dyn ErasedStore = &masses;
    let erased_b: &dyn ErasedStore = &more_masses;
    let erased_c: &dyn ErasedStore = &teams;

    assert!(erased_a.erased_eq(erased_b));
    // Different element types never compare equal.
    assert!(!erased_a.erased_eq(erased_c));

    assert_eq!(erased_a.element_type_id(), erased_b.element_type_id());
    assert_ne!(erased_a.element_type_id(), erased_c.element_type_id());
}

#[test]
fn hash_shortcut_agrees_with_full_comparison_on_large_stores() {
    // Past the shortcut threshold the erased path compares hashes first;
    // both outcomes must match the direct walk.
    let mut a = DenseStore::new();
    let mut b = DenseStore::new();
    for id in 1..=64u64 {
        a.set(id, Mass(id as u32)).unwrap();
        b.set(65 - id, Mass(65 - id as u32)).unwrap();
    }

    let erased_a: &dyn ErasedStore = &a;
    let erased_b: &dyn ErasedStore = &b;
    assert!(erased_a.erased_eq(erased_b));

    b.set(40, Mass(0)).unwrap();
    let erased_b: &dyn ErasedStore = &b;
    assert!(!erased_a.erased_eq(erased_b));
}

#[test]
fn erased_surface_supports_lifecycle_and_joins() {
    let mut masses = empty_store::<Mass>();
    masses.set(1, Mass(1)).unwrap();
    masses.set(2, Mass(2)).unwrap();

    let mut teams = empty_store::<Team>();
    teams.set(2, Team(0)).unwrap();

    let mut stores: Vec<Box<dyn ErasedStore>> = vec![Box::new(masses), Box::new(teams)];

    assert_eq!(stores[0].kind(), StorageKind::Dense);
    assert_eq!(stores[1].kind(), StorageKind::Grouped);
    assert_eq!(stores[0].len(), 2);
    assert!(stores[0].contains(1));
    assert!(stores[1].element_type_name().contains("Team"));

    // Erased stores join like typed ones.
    let matched: Vec<_> = all_of(stores.iter().map(|store| with(store.as_ref())).collect())
        .into_iter()
        .collect();
    assert_eq!(matched, vec![2]);

    // A world despawning an entity discards it from every store.
    for store in stores.iter_mut() {
        store.discard(2);
    }
    assert_eq!(stores[0].len(), 1);
    assert!(stores[1].is_empty());

    for store in stores.iter_mut() {
        store.clear();
    }
    assert!(stores.iter().all(|store| store.is_empty()));
}

#[test]
fn typed_access_through_downcast() {
    let mut masses = empty_store::<Mass>();
    masses.set(7, Mass(70)).unwrap();
    let mut erased: Box<dyn ErasedStore> = Box::new(masses);

    let typed = erased.as_any().downcast_ref::<DenseStore<Mass>>().unwrap();
    assert_eq!(typed.get(7), Some(&Mass(70)));

    let typed = erased.as_any_mut().downcast_mut::<DenseStore<Mass>>().unwrap();
    typed.set(7, Mass(71)).unwrap();
    assert_eq!(typed.get(7), Some(&Mass(71)));

    assert!(erased.as_any().downcast_ref::<GroupedStore<Team>>().is_none());
}

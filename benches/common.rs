#![allow(dead_code)]

use entity_store::{DenseStore, EntityId, SparseSet};

pub const ENTITIES_SMALL: usize = 10_000;
pub const ENTITIES_MED: usize = 100_000;
pub const ENTITIES_LARGE: usize = 1_000_000;

#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    pub x: i64,
    pub y: i64,
}

/// Sequential ids 1..=count.
pub fn make_set(count: usize) -> SparseSet {
    let mut set = SparseSet::new();
    for id in 1..=count as EntityId {
        set.insert(id).unwrap();
    }
    set
}

/// Ids spread `stride` apart, touching a fresh page every few inserts.
pub fn make_strided_set(count: usize, stride: u64) -> SparseSet {
    let mut set = SparseSet::new();
    for n in 0..count as EntityId {
        set.insert(n * stride + 1).unwrap();
    }
    set
}

pub fn make_positions(count: usize) -> DenseStore<Position> {
    let mut store = DenseStore::new();
    for id in 1..=count as EntityId {
        let coordinate = id as i64;
        store.set(id, Position { x: coordinate, y: -coordinate }).unwrap();
    }
    store
}

/// Every `step`-th id from 1..=count.
pub fn make_sparse_positions(count: usize, step: usize) -> DenseStore<Position> {
    let mut store = DenseStore::new();
    for id in (1..=count as EntityId).step_by(step) {
        let coordinate = id as i64;
        store.set(id, Position { x: coordinate, y: coordinate }).unwrap();
    }
    store
}

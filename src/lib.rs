//! # Entity Store
//!
//! Paged sparse-set entity-component storage.
//!
//! Entities are opaque positive integer identities; components are typed
//! payloads attached to entities. Every storage shape in this crate is built
//! on the same paged sparse-set index, which supplies O(1) membership,
//! insertion, removal, and position lookup while keeping live data packed
//! for memory-bandwidth iteration.
//!
//! ## Design Goals
//! - O(1) entity membership, insertion, removal, and lookup
//! - Dense packed storage that iterates at memory-bandwidth speed
//! - Joined iteration over boolean predicates on component presence
//! - Specialized storage shapes: dense, shared (value-deduplicated), and
//!   grouped (parent-linked equivalence classes)
//!
//! ## Storage shapes
//! - [`DenseStore`] keeps one value per entity in a packed column.
//! - [`SharedStore`] interns equal values so heavy payloads are stored once.
//! - [`GroupedStore`] links entities into equivalence classes that share a
//!   single value slot.
//!
//! All three expose the same membership surface and can participate in joins
//! through the [`Joinable`] capability trait.
//!
//! ## Concurrency
//! Storages are single-owner: all mutation is `&mut self` and completes
//! synchronously. Sharing across threads requires external synchronization.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(dead_code)]

pub mod store;

// ─────────────────────────────────────────────────────────────────────────────
// Re-exports (Public API)
// ─────────────────────────────────────────────────────────────────────────────

// Core storage types

pub use store::sparse::{Page, SparseSet};
pub use store::dense::DenseStore;
pub use store::shared::SharedStore;
pub use store::grouped::GroupedStore;

pub use store::join::{all_of, any_of, not, with, Filter, JoinIter, Joinable};

pub use store::component::{
    empty_store,
    Component,
    ComponentDesc,
    ErasedStore,
    StorageKind,
};

pub use store::error::{
    EmptySetError,
    InvalidIdError,
    InvalidPermutationError,
    NotPresentError,
    StoreError,
    StoreResult,
};

pub use store::types::{EntityId, PAGE_LEN};

// ─────────────────────────────────────────────────────────────────────────────
// Prelude (Optional but recommended)
// ─────────────────────────────────────────────────────────────────────────────

/// Commonly used storage types.
///
/// Import with:
/// ```rust
/// use entity_store::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        all_of,
        any_of,
        not,
        with,
        Component,
        DenseStore,
        EntityId,
        Filter,
        GroupedStore,
        Joinable,
        SharedStore,
        SparseSet,
        StorageKind,
        StoreError,
        StoreResult,
    };
}

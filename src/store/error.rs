//! Error types for the sparse-set index and component stores.
//!
//! This module declares focused, composable error types used across the
//! storage engine. Each error carries enough context to make failures
//! actionable while remaining small and cheap to pass around or convert into
//! the aggregate [`StoreError`].
//!
//! ## Goals
//! * **Specificity:** Each error type models a single failure mode (invalid
//!   identifiers, absent entities, empty sets, malformed permutations).
//! * **Ergonomics:** All errors implement [`std::error::Error`] and
//!   [`fmt::Display`], and provide `From<T>` conversions into [`StoreError`].
//! * **Actionability:** Structured fields (the offending id, the expected
//!   permutation length) make logs useful without reproducing the issue.
//!
//! ## Policy
//! Errors are caused by caller misuse and are surfaced immediately, before
//! any mutation. A store never enters a partially-modified state on error:
//! every operation validates first and mutates second, and the mutations are
//! infallible once validation passes.
//!
//! Iterator invalidation has no error type here. Iterators borrow the store
//! they traverse, so mutating a storage mid-iteration is rejected by the
//! borrow checker at compile time; a runtime variant would be
//! unconstructible.
//!
//! ## Display vs. Debug
//! * [`fmt::Display`] is optimized for operator logs (short, imperative
//!   phrasing).
//! * [`fmt::Debug`] (derived) retains full structure for diagnostics.

use std::fmt;

use crate::store::types::EntityId;


/// Returned when an operation is handed an identifier outside the valid
/// entity space.
///
/// Valid entity identifiers are `>= 1`; the value `0` is reserved as the
/// absent-slot marker inside sparse pages and can never name an entity.
///
/// ### Fields
/// * `id` — The offending identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidIdError {
    /// Identifier that was rejected.
    pub id: EntityId,
}

impl fmt::Display for InvalidIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid entity id {} (ids start at 1)", self.id)
    }
}

impl std::error::Error for InvalidIdError {}

/// Returned when a removal or lookup names an entity that is not in the
/// store.
///
/// ### Fields
/// * `id` — The entity that was expected to be present.
///
/// ### Notes
/// Presence-tolerant call sites should prefer the `Option`-returning
/// accessors (`get`, `position_of`) or the boolean `discard` variant instead
/// of matching on this error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotPresentError {
    /// Entity that was absent from the store.
    pub id: EntityId,
}

impl fmt::Display for NotPresentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "entity {} is not present in the store", self.id)
    }
}

impl std::error::Error for NotPresentError {}

/// Returned when `pop_last` is called on an empty set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmptySetError;

impl fmt::Display for EmptySetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("cannot pop from an empty set")
    }
}

impl std::error::Error for EmptySetError {}

/// Returned when `permute` is handed a sequence that is not a permutation of
/// `0..len`.
///
/// ### Fields
/// * `len` — Length of the supplied sequence.
/// * `expected` — Number of packed entries; a valid input is a permutation
///   of `0..expected`.
///
/// ### Notes
/// The same error covers wrong length, out-of-range positions, and repeated
/// positions; all three mean the input cannot reorder the packed column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidPermutationError {
    /// Length of the rejected input.
    pub len: usize,

    /// Required domain: inputs must permute `0..expected`.
    pub expected: usize,
}

impl fmt::Display for InvalidPermutationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid permutation of length {} (expected a permutation of 0..{})",
            self.len, self.expected
        )
    }
}

impl std::error::Error for InvalidPermutationError {}

/// Aggregate error for storage operations.
///
/// Wraps the precise, low-level failures that can occur when mutating or
/// querying a store. `From<T>` conversions are implemented for every
/// low-level error so call sites can use `?` and still return a single,
/// expressive type.
///
/// ### Variants
/// * `InvalidId` — an identifier outside the valid entity space.
/// * `NotPresent` — removal or lookup of an absent entity.
/// * `Empty` — `pop_last` on an empty set.
/// * `ParentMissing` — a group link named an absent parent entity. The
///   payload is the same shape as `NotPresent`, but the distinct variant
///   tells the caller *which* argument was at fault.
/// * `InvalidPermutation` — a malformed `permute` input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreError {
    /// An identifier outside the valid entity space was supplied.
    InvalidId(InvalidIdError),

    /// A removal or lookup named an absent entity.
    NotPresent(NotPresentError),

    /// `pop_last` was called on an empty set.
    Empty(EmptySetError),

    /// A group link named an absent parent entity.
    ParentMissing(NotPresentError),

    /// A `permute` input was not a permutation of the packed positions.
    InvalidPermutation(InvalidPermutationError),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::InvalidId(e) => write!(f, "{e}"),
            StoreError::NotPresent(e) => write!(f, "{e}"),
            StoreError::Empty(e) => write!(f, "{e}"),
            StoreError::ParentMissing(e) => write!(f, "parent entity missing: {e}"),
            StoreError::InvalidPermutation(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<InvalidIdError> for StoreError {
    fn from(e: InvalidIdError) -> Self { StoreError::InvalidId(e) }
}

impl From<NotPresentError> for StoreError {
    fn from(e: NotPresentError) -> Self { StoreError::NotPresent(e) }
}

impl From<EmptySetError> for StoreError {
    fn from(e: EmptySetError) -> Self { StoreError::Empty(e) }
}

impl From<InvalidPermutationError> for StoreError {
    fn from(e: InvalidPermutationError) -> Self { StoreError::InvalidPermutation(e) }
}

/// Crate-wide result alias for storage operations.
pub type StoreResult<T> = Result<T, StoreError>;

//! Core Identifier Types and Page Geometry
//!
//! This module defines the **fundamental types, constants, and index math**
//! shared by every storage shape in the crate. These definitions form the
//! semantic backbone of the engine and are used by the sparse-set index, the
//! component stores, and the join layer alike.
//!
//! ## Entity Representation
//!
//! Entities are opaque positive integers (`id >= 1`). The value `0` is
//! reserved: inside a sparse page, a slot holding `0` means *absent*, and a
//! slot holding `k` means the entity sits at packed position `k - 1`. Keeping
//! the zero value out of the identifier space lets a freshly zero-filled page
//! represent "no members" without any extra bookkeeping.
//!
//! ## Page Geometry
//!
//! The reverse index is split into fixed-length pages of [`PAGE_LEN`] slots.
//! `PAGE_LEN` is a power of two (one 4096-byte OS page divided by the 8-byte
//! machine word), so page and offset are computed with a shift and a mask
//! rather than division. The same constant is used by every sparse set in the
//! process; compile-time assertions below pin the properties the index math
//! relies on.
//!
//! ## Safety and Performance
//!
//! This module contains no unsafe code, allocates nothing, and every function
//! is a handful of integer operations suitable for the hottest paths.

/// Opaque entity identity. Valid identifiers are `>= 1`.
pub type EntityId = u64;

/// Number of reverse-index slots per page.
///
/// One 4096-byte OS page divided by the 8-byte machine word. Must be a power
/// of two so that page/offset math reduces to shift and mask.
pub const PAGE_LEN: usize = 4096 / 8;

/// Shift applied to a zero-based id to obtain its page index.
pub const PAGE_SHIFT: u32 = PAGE_LEN.trailing_zeros();

/// Mask applied to a zero-based id to obtain its in-page offset.
pub const PAGE_MASK: u64 = (PAGE_LEN as u64) - 1;

/// Store lengths above this threshold compare hashes before contents.
pub const HASH_EQ_THRESHOLD: usize = 20;

const _: [(); 1] = [(); PAGE_LEN.is_power_of_two() as usize];
const _: [(); 1] = [(); (PAGE_LEN > 0) as usize];
const _: [(); 1] = [(); ((1u64 << PAGE_SHIFT) == PAGE_LEN as u64) as usize];

/// Returns the page index holding `id`'s reverse slot.
///
/// Callers must have validated `id >= 1`; the subtraction maps the identifier
/// space onto zero-based slots.
#[inline]
pub(crate) fn page_of(id: EntityId) -> usize {
    ((id - 1) >> PAGE_SHIFT) as usize
}

/// Returns the in-page offset of `id`'s reverse slot.
#[inline]
pub(crate) fn offset_of(id: EntityId) -> usize {
    ((id - 1) & PAGE_MASK) as usize
}

/// Returns `(page, offset)` for `id` in one call.
#[inline]
pub(crate) fn split_id(id: EntityId) -> (usize, usize) {
    (page_of(id), offset_of(id))
}

/// Hash of a single `(entity, value)` entry.
///
/// Store hashes combine entry hashes with a wrapping sum so the result is
/// insensitive to packed order, which is an implementation detail.
pub(crate) fn entry_hash<T: std::hash::Hash>(id: EntityId, value: &T) -> u64 {
    use std::hash::Hasher;

    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    std::hash::Hash::hash(&id, &mut hasher);
    std::hash::Hash::hash(value, &mut hasher);
    hasher.finish()
}

/// Hash of a store's element type tag.
pub(crate) fn type_tag_hash<T: 'static>() -> u64 {
    use std::hash::Hasher;

    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    std::hash::Hash::hash(&std::any::TypeId::of::<T>(), &mut hasher);
    hasher.finish()
}

//! # Paged Sparse-Set Index
//!
//! This module implements the index every component store in the crate is
//! built on: a sparse set whose reverse lookup is split into fixed-length
//! pages.
//!
//! ## Layout
//! A [`SparseSet`] maintains three parallel structures:
//!
//! - `packed` — the dense vector of present ids, in insertion order.
//! - `reverse` — one [`Page`] per id range of [`PAGE_LEN`]. A page is either
//!   the [`Page::Null`] sentinel (no members in that range) or an owned,
//!   zero-filled slot array. A live slot stores `packed_position + 1`, with
//!   `0` meaning absent.
//! - `counters` — one live-slot count per page, driving page reclamation.
//!
//! ## Invariants
//! At every public call boundary:
//!
//! - `packed.len() == counters.iter().sum()`
//! - an id is a member iff its page is live and its slot is non-zero
//! - `slot(packed[k]) == k + 1` for every packed position `k`
//! - `counters[p] == 0` iff `reverse[p]` is the null page
//!
//! [`SparseSet::validate`] walks these invariants and is exercised by the
//! test suite after every mutation batch.
//!
//! ## Memory policy
//! Pages are allocated on first live use and eagerly reclaimed to the null
//! sentinel when their counter drops to zero, bounding memory at
//! O(live pages × [`PAGE_LEN`]).

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use crate::store::error::{
    EmptySetError, InvalidIdError, InvalidPermutationError, NotPresentError, StoreResult,
};
use crate::store::join::Joinable;
use crate::store::types::{split_id, EntityId, PAGE_LEN};


/// One fixed-length slice of the reverse index.
///
/// ## Purpose
/// Models the two page states the index distinguishes: a range of ids with
/// no members, and a range with at least one member. The tagged variant
/// makes the "never write the sentinel" discipline structural: there is no
/// slot array to write through unless the page is live.
///
/// ## States
/// - `Null` — the sentinel; every id in the range is absent.
/// - `Live` — an owned, zero-filled array of [`PAGE_LEN`] slots, each holding
///   `0` (absent) or `packed_position + 1`.
///
/// Transitions: a missing or null page becomes live on insert; a live page
/// returns to `Null` when its last member is removed.
#[derive(Clone, Debug)]
pub enum Page {
    /// Sentinel page: no live slots in this id range.
    Null,

    /// Owned slot array; each entry is `0` or `packed_position + 1`.
    Live(Box<[usize; PAGE_LEN]>),
}

impl Page {
    /// Returns `true` if this page is the null sentinel.
    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Page::Null)
    }

    /// Reads a slot; the null page reports every slot as absent.
    #[inline]
    fn slot(&self, offset: usize) -> usize {
        match self {
            Page::Null => 0,
            Page::Live(slots) => slots[offset],
        }
    }

    /// Promotes the page to `Live` if needed and returns its slot array.
    #[inline]
    fn make_live(&mut self) -> &mut [usize; PAGE_LEN] {
        if self.is_null() {
            *self = Page::Live(Box::new([0; PAGE_LEN]));
        }
        match self {
            Page::Live(slots) => slots,
            Page::Null => unreachable!("page was just made live"),
        }
    }
}

/// Paged sparse set over positive integer ids.
///
/// ## Purpose
/// Supplies O(1) `contains`, `insert`, `remove`, and `position_of`, plus
/// iteration over present ids in insertion order. Component stores pair this
/// index with parallel value columns; the packed position returned by
/// [`position_of`](SparseSet::position_of) is the row into those columns.
///
/// ## Removal semantics
/// Removal is swap-remove: the last packed id takes the vacated position so
/// the packed column stays dense. Callers keeping parallel columns must
/// mirror the same swap.
#[derive(Clone, Debug, Default)]
pub struct SparseSet {
    packed: Vec<EntityId>,
    reverse: Vec<Page>,
    counters: Vec<usize>,
}

impl SparseSet {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self { packed: Vec::new(), reverse: Vec::new(), counters: Vec::new() }
    }

    /// Number of present ids.
    #[inline]
    pub fn len(&self) -> usize {
        self.packed.len()
    }

    /// Returns `true` if no ids are present.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.packed.is_empty()
    }

    /// Reads the reverse slot for `id`; `0` means absent.
    ///
    /// `id` must be `>= 1`. Ids past the last allocated page read as absent.
    #[inline]
    fn slot(&self, id: EntityId) -> usize {
        let (page, offset) = split_id(id);
        match self.reverse.get(page) {
            Some(p) => p.slot(offset),
            None => 0,
        }
    }

    /// Writes the reverse slot for `id`.
    ///
    /// The page must already exist in `reverse`; present ids always satisfy
    /// this.
    #[inline]
    fn write_slot(&mut self, id: EntityId, value: usize) {
        let (page, offset) = split_id(id);
        self.reverse[page].make_live()[offset] = value;
    }

    /// Returns `true` iff `id` is present. Never fails; `0` is never present.
    #[inline]
    pub fn contains(&self, id: EntityId) -> bool {
        id != 0 && self.slot(id) != 0
    }

    /// Returns the packed position of `id`, or `None` if absent.
    #[inline]
    pub fn position_of(&self, id: EntityId) -> Option<usize> {
        if id == 0 {
            return None;
        }
        self.slot(id).checked_sub(1)
    }

    /// Returns the packed position of `id`, or `NotPresent` if absent.
    ///
    /// ## Errors
    /// [`NotPresentError`] when `id` is not a member (including `id == 0`).
    #[inline]
    pub fn require_position(&self, id: EntityId) -> StoreResult<usize> {
        self.position_of(id).ok_or_else(|| NotPresentError { id }.into())
    }

    /// Inserts `id`, returning `true` if it was newly added.
    ///
    /// Idempotent: inserting a present id is a no-op returning `false`. The
    /// reverse index grows with null pages up to `id`'s page, which is then
    /// allocated zero-filled.
    ///
    /// ## Errors
    /// [`InvalidIdError`] when `id == 0`; the set is untouched.
    pub fn insert(&mut self, id: EntityId) -> StoreResult<bool> {
        if id == 0 {
            return Err(InvalidIdError { id }.into());
        }
        Ok(self.insert_valid(id))
    }

    /// Insertion for pre-validated ids (`id >= 1`).
    pub(crate) fn insert_valid(&mut self, id: EntityId) -> bool {
        let (page, offset) = split_id(id);

        if page >= self.reverse.len() {
            self.reverse.resize_with(page + 1, || Page::Null);
            self.counters.resize(page + 1, 0);
        } else if self.reverse[page].slot(offset) != 0 {
            return false;
        }

        self.packed.push(id);
        let slot_value = self.packed.len();
        self.reverse[page].make_live()[offset] = slot_value;
        self.counters[page] += 1;
        true
    }

    /// Removes `id`.
    ///
    /// Swap-remove: the last packed id takes `id`'s position, `id`'s slot is
    /// zeroed, and the page is reclaimed to the null sentinel if it held no
    /// other member.
    ///
    /// ## Errors
    /// [`InvalidIdError`] when `id == 0`; [`NotPresentError`] when absent.
    /// The set is untouched on error.
    pub fn remove(&mut self, id: EntityId) -> StoreResult<()> {
        if id == 0 {
            return Err(InvalidIdError { id }.into());
        }
        let position = self.require_position(id)?;
        self.remove_at(id, position);
        Ok(())
    }

    /// Removes `id` if present, returning whether anything was removed.
    ///
    /// The tolerant counterpart of [`remove`](SparseSet::remove): absent ids
    /// (including `0`) are a no-op.
    pub fn discard(&mut self, id: EntityId) -> bool {
        match self.position_of(id) {
            Some(position) => {
                self.remove_at(id, position);
                true
            }
            None => false,
        }
    }

    /// Swap-remove of a present `id` at known packed `position`.
    pub(crate) fn remove_at(&mut self, id: EntityId, position: usize) {
        let last = self.packed.len() - 1;
        let tail = self.packed[last];

        self.packed[position] = tail;
        self.write_slot(tail, position + 1);
        // When removing the tail itself this overwrites the line above.
        self.write_slot(id, 0);

        let (page, _) = split_id(id);
        self.counters[page] -= 1;
        self.packed.pop();

        if self.counters[page] == 0 {
            self.reverse[page] = Page::Null;
        }
    }

    /// Removes and returns the most recently packed id.
    ///
    /// ## Errors
    /// [`EmptySetError`] when the set is empty.
    pub fn pop_last(&mut self) -> StoreResult<EntityId> {
        let Some(&id) = self.packed.last() else {
            return Err(EmptySetError.into());
        };
        let position = self.packed.len() - 1;
        self.remove_at(id, position);
        Ok(id)
    }

    /// Iterates present ids in packed (insertion) order.
    pub fn iter(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.packed.iter().copied()
    }

    /// The packed ids as a slice, in insertion order.
    #[inline]
    pub fn as_slice(&self) -> &[EntityId] {
        &self.packed
    }

    /// Exchanges the packed positions of two present ids.
    ///
    /// Used to co-sort parallel value columns; the caller mirrors the swap on
    /// its own storage.
    ///
    /// ## Errors
    /// [`NotPresentError`] for whichever id is absent; nothing is swapped.
    pub fn swap_positions(&mut self, a: EntityId, b: EntityId) -> StoreResult<()> {
        let position_a = self.require_position(a)?;
        let position_b = self.require_position(b)?;

        self.packed.swap(position_a, position_b);
        self.write_slot(a, position_b + 1);
        self.write_slot(b, position_a + 1);
        Ok(())
    }

    /// Reorders the packed column so that `packed[k]` becomes the id
    /// previously at `packed[perm[k]]`, repairing every reverse slot.
    ///
    /// ## Errors
    /// [`InvalidPermutationError`] unless `perm` is a permutation of
    /// `0..len`; the set is untouched on error.
    pub fn permute(&mut self, perm: &[usize]) -> StoreResult<()> {
        let n = self.packed.len();
        let reject = InvalidPermutationError { len: perm.len(), expected: n };
        if perm.len() != n {
            return Err(reject.into());
        }
        let mut seen = vec![false; n];
        for &position in perm {
            if position >= n || seen[position] {
                return Err(reject.into());
            }
            seen[position] = true;
        }

        self.packed = perm.iter().map(|&position| self.packed[position]).collect();
        for k in 0..n {
            let id = self.packed[k];
            self.write_slot(id, k + 1);
        }
        Ok(())
    }

    /// Removes every id and releases all pages.
    pub fn clear(&mut self) {
        self.packed.clear();
        self.reverse.clear();
        self.counters.clear();
    }

    // ── Set algebra ──────────────────────────────────────────────────────

    /// Ids present in `self` or `other`; `self`'s insertion order first.
    pub fn union(&self, other: &SparseSet) -> SparseSet {
        let mut out = self.clone();
        for &id in other.as_slice() {
            out.insert_valid(id);
        }
        out
    }

    /// Ids present in both sets, in `self`'s packed order.
    pub fn intersect(&self, other: &SparseSet) -> SparseSet {
        let mut out = SparseSet::new();
        for &id in self.as_slice() {
            if other.contains(id) {
                out.insert_valid(id);
            }
        }
        out
    }

    /// Ids present in `self` but not `other`, in `self`'s packed order.
    pub fn difference(&self, other: &SparseSet) -> SparseSet {
        let mut out = SparseSet::new();
        for &id in self.as_slice() {
            if !other.contains(id) {
                out.insert_valid(id);
            }
        }
        out
    }

    /// Returns `true` iff every member of `self` is a member of `other`.
    ///
    /// Equivalent to `self == self.intersect(other)` without allocating.
    pub fn is_subset(&self, other: &SparseSet) -> bool {
        self.len() <= other.len() && self.iter().all(|id| other.contains(id))
    }

    // ── Diagnostics ──────────────────────────────────────────────────────

    /// The reverse-index pages, for inspection and diagnostics.
    ///
    /// Index `p` covers ids `p * PAGE_LEN + 1 ..= (p + 1) * PAGE_LEN`.
    #[inline]
    pub fn pages(&self) -> &[Page] {
        &self.reverse
    }

    /// Checks every structural invariant, panicking with a description of
    /// the first violation.
    ///
    /// Intended for tests and debugging sessions; cost is proportional to
    /// the number of allocated pages plus the packed length.
    pub fn validate(&self) {
        assert_eq!(
            self.reverse.len(),
            self.counters.len(),
            "page list and counter list lengths diverge"
        );

        let total: usize = self.counters.iter().sum();
        assert_eq!(
            self.packed.len(),
            total,
            "packed length {} does not match live-slot total {}",
            self.packed.len(),
            total
        );

        for (page_index, page) in self.reverse.iter().enumerate() {
            match page {
                Page::Null => assert_eq!(
                    self.counters[page_index], 0,
                    "null page {page_index} has a non-zero counter"
                ),
                Page::Live(slots) => {
                    let live = slots.iter().filter(|&&slot| slot != 0).count();
                    assert!(live > 0, "live page {page_index} holds no members and was not reclaimed");
                    assert_eq!(
                        live, self.counters[page_index],
                        "page {page_index} counter does not match its live slots"
                    );
                }
            }
        }

        for (position, &id) in self.packed.iter().enumerate() {
            assert_eq!(
                self.slot(id),
                position + 1,
                "packed id {id} at position {position} has a stale reverse slot"
            );
        }
    }
}

impl Joinable for SparseSet {
    #[inline]
    fn indices(&self) -> &SparseSet {
        self
    }
}

/// Membership equality: same ids, regardless of packed order.
impl PartialEq for SparseSet {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|id| other.contains(id))
    }
}

impl Eq for SparseSet {}

/// Order-insensitive over membership, consistent with `PartialEq`.
impl Hash for SparseSet {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_usize(self.len());
        let mut combined: u64 = 0;
        for &id in &self.packed {
            let mut hasher = DefaultHasher::new();
            id.hash(&mut hasher);
            combined = combined.wrapping_add(hasher.finish());
        }
        state.write_u64(combined);
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Serde (feature = "serde")
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(feature = "serde")]
impl serde::Serialize for SparseSet {
    /// Serializes as the packed id sequence; pages are derived state.
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.packed.iter())
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for SparseSet {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        use serde::de::Error;

        let ids = Vec::<EntityId>::deserialize(deserializer)?;
        let mut set = SparseSet::new();
        for id in ids {
            if id == 0 {
                return Err(D::Error::custom("entity id 0 is outside the id space"));
            }
            if !set.insert_valid(id) {
                return Err(D::Error::custom(format!("duplicate entity id {id}")));
            }
        }
        Ok(set)
    }
}

//! Shared component storage: equal values are interned and stored once.

use std::fmt;

use crate::store::error::{InvalidIdError, NotPresentError, StoreResult};
use crate::store::join::Joinable;
use crate::store::sparse::SparseSet;
use crate::store::types::{entry_hash, type_tag_hash, EntityId};


/// Value-deduplicated per-entity storage.
///
/// ## Purpose
/// Pairs a [`SparseSet`] with a packed column of indices into a table of
/// distinct values. Entities carrying equal values point at the same table
/// entry, so a heavy payload is stored once no matter how many entities
/// share it.
///
/// ## Interning
/// Assignment scans the table linearly for an equal value. The scan is
/// O(distinct values) per write; this store is meant for small value
/// cardinalities, and a large table is a sign the caller wants
/// [`DenseStore`](crate::store::dense::DenseStore) instead.
///
/// ## Invariants
/// - `data.len() == indices.len()`, co-ordered.
/// - Every entry of `data` indexes an allocated slot of `shared`.
/// - After a successful `remove`, `shared` holds no entry that no `data`
///   index reaches.
pub struct SharedStore<T> {
    indices: SparseSet,
    data: Vec<usize>,
    shared: Vec<T>,
}

impl<T> SharedStore<T> {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self { indices: SparseSet::new(), data: Vec::new(), shared: Vec::new() }
    }

    /// Number of entities with a value.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if no entity has a value.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Number of distinct values currently interned.
    #[inline]
    pub fn shared_len(&self) -> usize {
        self.shared.len()
    }

    /// Returns `true` iff `id` has a value.
    #[inline]
    pub fn contains(&self, id: EntityId) -> bool {
        self.indices.contains(id)
    }

    /// The underlying membership index.
    #[inline]
    pub fn indices(&self) -> &SparseSet {
        &self.indices
    }

    /// Returns `id`'s value, or `None` if absent.
    #[inline]
    pub fn get(&self, id: EntityId) -> Option<&T> {
        self.indices
            .position_of(id)
            .map(|position| &self.shared[self.data[position]])
    }

    /// The distinct values, in interning order.
    #[inline]
    pub fn shared_values(&self) -> &[T] {
        &self.shared
    }

    /// Iterates `(entity, value)` pairs in packed order.
    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &T)> {
        self.indices
            .as_slice()
            .iter()
            .zip(self.data.iter())
            .map(|(&id, &index)| (id, &self.shared[index]))
    }

    /// The present entities in packed order.
    #[inline]
    pub fn entities(&self) -> &[EntityId] {
        self.indices.as_slice()
    }

    /// Exchanges the packed positions of two present entities.
    ///
    /// ## Errors
    /// [`NotPresentError`] for whichever id is absent; nothing moves.
    pub fn swap_positions(&mut self, a: EntityId, b: EntityId) -> StoreResult<()> {
        let position_a = self.indices.require_position(a)?;
        let position_b = self.indices.require_position(b)?;
        self.indices.swap_positions(a, b)?;
        self.data.swap(position_a, position_b);
        Ok(())
    }

    /// Reorders entities and their value indices by the same permutation.
    ///
    /// The interned table is untouched; only the packed columns move.
    ///
    /// ## Errors
    /// [`InvalidPermutationError`](crate::store::error::InvalidPermutationError)
    /// unless `perm` permutes `0..len`; the store is untouched on error.
    pub fn permute(&mut self, perm: &[usize]) -> StoreResult<()> {
        self.indices.permute(perm)?;
        self.data = perm.iter().map(|&position| self.data[position]).collect();
        Ok(())
    }

    /// Removes every entity and every interned value.
    pub fn clear(&mut self) {
        self.indices.clear();
        self.data.clear();
        self.shared.clear();
    }

    /// Removes the interned entry at `index` and shifts later indices down.
    fn compact_shared(&mut self, index: usize) -> T {
        let value = self.shared.remove(index);
        for entry in self.data.iter_mut() {
            if *entry > index {
                *entry -= 1;
            }
        }
        value
    }
}

impl<T: PartialEq> SharedStore<T> {
    /// Assigns `value` to `id`, interning it against the existing table.
    ///
    /// An equal value already in the table is reused; otherwise the value is
    /// appended. Overwriting an entity's previous value does not compact the
    /// table; compaction happens on removal.
    ///
    /// ## Errors
    /// [`InvalidIdError`] when `id == 0`; the store is untouched.
    pub fn set(&mut self, id: EntityId, value: T) -> StoreResult<()> {
        if id == 0 {
            return Err(InvalidIdError { id }.into());
        }

        let index = match self.shared.iter().position(|existing| *existing == value) {
            Some(index) => index,
            None => {
                self.shared.push(value);
                self.shared.len() - 1
            }
        };

        match self.indices.position_of(id) {
            Some(position) => self.data[position] = index,
            None => {
                self.indices.insert_valid(id);
                self.data.push(index);
            }
        }
        Ok(())
    }

    /// Removes `id` and returns its value.
    ///
    /// If no remaining entity references the same interned entry, the entry
    /// is deleted and later indices shift down, so the table never holds
    /// orphans past this call. The value is cloned only when other entities
    /// still share it.
    ///
    /// ## Errors
    /// [`InvalidIdError`] when `id == 0`; [`NotPresentError`] when absent.
    pub fn remove(&mut self, id: EntityId) -> StoreResult<T>
    where
        T: Clone,
    {
        if id == 0 {
            return Err(InvalidIdError { id }.into());
        }
        let position = self
            .indices
            .position_of(id)
            .ok_or(NotPresentError { id })?;

        let index = self.data.swap_remove(position);
        self.indices.remove_at(id, position);

        if self.data.iter().any(|&other| other == index) {
            Ok(self.shared[index].clone())
        } else {
            Ok(self.compact_shared(index))
        }
    }

    /// Removes `id` if present, dropping its value.
    ///
    /// Same orphan compaction as [`remove`](SharedStore::remove), without
    /// the `Clone` bound.
    pub fn discard(&mut self, id: EntityId) -> bool {
        let Some(position) = self.indices.position_of(id) else {
            return false;
        };

        let index = self.data.swap_remove(position);
        self.indices.remove_at(id, position);

        if !self.data.iter().any(|&other| other == index) {
            self.compact_shared(index);
        }
        true
    }
}

impl<T> Default for SharedStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: fmt::Debug> fmt::Debug for SharedStore<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<T> Joinable for SharedStore<T> {
    #[inline]
    fn indices(&self) -> &SparseSet {
        &self.indices
    }
}

/// Membership-and-value equality, insensitive to packed order and to how
/// values happen to be interned.
impl<T: PartialEq> PartialEq for SharedStore<T> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self.iter().all(|(id, value)| other.get(id) == Some(value))
    }
}

impl<T: Eq> Eq for SharedStore<T> {}

impl<T: std::hash::Hash + 'static> SharedStore<T> {
    /// Hash over (element type tag, contents), insensitive to packed order.
    pub fn content_hash(&self) -> u64 {
        let mut combined = type_tag_hash::<T>();
        for (id, value) in self.iter() {
            combined = combined.wrapping_add(entry_hash(id, value));
        }
        combined
    }
}

impl<T: std::hash::Hash + 'static> std::hash::Hash for SharedStore<T> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        state.write_usize(self.len());
        state.write_u64(self.content_hash());
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Serde (feature = "serde")
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(feature = "serde")]
impl<T: serde::Serialize> serde::Serialize for SharedStore<T> {
    /// Serializes as `(entities, value indices, interned table)`.
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        (self.indices.as_slice(), &self.data, &self.shared).serialize(serializer)
    }
}

#[cfg(feature = "serde")]
impl<'de, T> serde::Deserialize<'de> for SharedStore<T>
where
    T: serde::Deserialize<'de> + PartialEq,
{
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        use serde::de::Error;

        let (indices, data, shared): (SparseSet, Vec<usize>, Vec<T>) =
            serde::Deserialize::deserialize(deserializer)?;

        if indices.len() != data.len() {
            return Err(D::Error::custom(format!(
                "entity and index column lengths diverge ({} vs {})",
                indices.len(),
                data.len()
            )));
        }
        if let Some(&out_of_range) = data.iter().find(|&&index| index >= shared.len()) {
            return Err(D::Error::custom(format!(
                "value index {out_of_range} is outside the interned table"
            )));
        }
        for (first, value) in shared.iter().enumerate() {
            if shared[first + 1..].contains(value) {
                return Err(D::Error::custom("interned table contains duplicate values"));
            }
        }

        Ok(Self { indices, data, shared })
    }
}

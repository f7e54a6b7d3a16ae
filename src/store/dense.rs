//! Dense component storage: one value per entity in a packed column.

use std::fmt;

use crate::store::error::{InvalidIdError, NotPresentError, StoreResult};
use crate::store::join::Joinable;
use crate::store::sparse::SparseSet;
use crate::store::types::{entry_hash, type_tag_hash, EntityId};


/// Packed per-entity storage.
///
/// ## Purpose
/// Pairs a [`SparseSet`] with a parallel value column: an entity's packed
/// position is the row of its value. Iteration walks the column linearly, so
/// throughput is bounded by memory bandwidth rather than pointer chasing.
///
/// ## Invariants
/// After every public operation `data.len() == indices.len()` and the two
/// are co-ordered: `data[indices.position_of(e)]` is `e`'s value.
pub struct DenseStore<T> {
    indices: SparseSet,
    data: Vec<T>,
}

impl<T> DenseStore<T> {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self { indices: SparseSet::new(), data: Vec::new() }
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

    /// Assigns `value` to `id`, overwriting any previous value.
    ///
    /// New entities append to the packed column so their position equals the
    /// previous length.
    ///
    /// ## Errors
    /// [`InvalidIdError`] when `id == 0`; the store is untouched.
    pub fn set(&mut self, id: EntityId, value: T) -> StoreResult<()> {
        if id == 0 {
            return Err(InvalidIdError { id }.into());
        }
        match self.indices.position_of(id) {
            Some(position) => self.data[position] = value,
            None => {
                self.indices.insert_valid(id);
                self.data.push(value);
            }
        }
        Ok(())
    }

    /// Returns `id`'s value, or `None` if absent.
    #[inline]
    pub fn get(&self, id: EntityId) -> Option<&T> {
        self.indices.position_of(id).map(|position| &self.data[position])
    }

    /// Returns `id`'s value mutably, or `None` if absent.
    #[inline]
    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut T> {
        self.indices.position_of(id).map(|position| &mut self.data[position])
    }

    /// Removes `id` and returns its value.
    ///
    /// Swap-remove on the value column, mirroring the index: the last value
    /// moves into the vacated row.
    ///
    /// ## Errors
    /// [`InvalidIdError`] when `id == 0`; [`NotPresentError`] when absent.
    pub fn remove(&mut self, id: EntityId) -> StoreResult<T> {
        if id == 0 {
            return Err(InvalidIdError { id }.into());
        }
        let position = self
            .indices
            .position_of(id)
            .ok_or(NotPresentError { id })?;
        let value = self.data.swap_remove(position);
        self.indices.remove_at(id, position);
        Ok(value)
    }

    /// Removes `id` if present, dropping its value.
    pub fn discard(&mut self, id: EntityId) -> bool {
        match self.indices.position_of(id) {
            Some(position) => {
                self.data.swap_remove(position);
                self.indices.remove_at(id, position);
                true
            }
            None => false,
        }
    }

    /// Removes and returns the most recently packed entity and its value.
    ///
    /// ## Errors
    /// [`EmptySetError`](crate::store::error::EmptySetError) when empty.
    pub fn pop(&mut self) -> StoreResult<(EntityId, T)> {
        let id = self.indices.pop_last()?;
        let value = self.data.swap_remove(self.data.len() - 1);
        Ok((id, value))
    }

    /// Iterates `(entity, value)` pairs in packed order.
    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &T)> {
        self.indices.as_slice().iter().copied().zip(self.data.iter())
    }

    /// The present entities in packed order.
    #[inline]
    pub fn entities(&self) -> &[EntityId] {
        self.indices.as_slice()
    }

    /// The value column in packed order.
    #[inline]
    pub fn values(&self) -> &[T] {
        &self.data
    }

    /// The value column in packed order, mutably.
    #[inline]
    pub fn values_mut(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// Exchanges the packed positions of two present entities, values
    /// included.
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

    /// Reorders entities and values by the same permutation.
    ///
    /// ## Errors
    /// [`InvalidPermutationError`](crate::store::error::InvalidPermutationError)
    /// unless `perm` permutes `0..len`; the store is untouched on error.
    pub fn permute(&mut self, perm: &[usize]) -> StoreResult<()> {
        self.indices.permute(perm)?;

        let mut drained: Vec<Option<T>> = self.data.drain(..).map(Some).collect();
        for &position in perm {
            if let Some(value) = drained[position].take() {
                self.data.push(value);
            }
        }
        debug_assert_eq!(self.data.len(), drained.len());
        Ok(())
    }

    /// Removes every entity and value.
    pub fn clear(&mut self) {
        self.indices.clear();
        self.data.clear();
    }
}

impl<T> Default for DenseStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: fmt::Debug> fmt::Debug for DenseStore<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<T> Joinable for DenseStore<T> {
    #[inline]
    fn indices(&self) -> &SparseSet {
        &self.indices
    }
}

/// Membership-and-value equality, insensitive to packed order.
impl<T: PartialEq> PartialEq for DenseStore<T> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self.iter().all(|(id, value)| other.get(id) == Some(value))
    }
}

impl<T: Eq> Eq for DenseStore<T> {}

impl<T: std::hash::Hash + 'static> DenseStore<T> {
    /// Hash over (element type tag, contents), insensitive to packed order.
    ///
    /// Used by the erased equality path to reject unequal stores before the
    /// full membership walk.
    pub fn content_hash(&self) -> u64 {
        let mut combined = type_tag_hash::<T>();
        for (id, value) in self.iter() {
            combined = combined.wrapping_add(entry_hash(id, value));
        }
        combined
    }
}

impl<T: std::hash::Hash + 'static> std::hash::Hash for DenseStore<T> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        state.write_usize(self.len());
        state.write_u64(self.content_hash());
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Serde (feature = "serde")
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(feature = "serde")]
impl<T: serde::Serialize> serde::Serialize for DenseStore<T> {
    /// Serializes as `(entities, values)`, both in packed order.
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        (self.indices.as_slice(), &self.data).serialize(serializer)
    }
}

#[cfg(feature = "serde")]
impl<'de, T: serde::Deserialize<'de>> serde::Deserialize<'de> for DenseStore<T> {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        use serde::de::Error;

        let (indices, data): (SparseSet, Vec<T>) = serde::Deserialize::deserialize(deserializer)?;
        if indices.len() != data.len() {
            return Err(D::Error::custom(format!(
                "entity and value column lengths diverge ({} vs {})",
                indices.len(),
                data.len()
            )));
        }
        Ok(Self { indices, data })
    }
}

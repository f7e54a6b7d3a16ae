//! Grouped component storage: parent-linked equivalence classes sharing one
//! value slot.

use std::fmt;

use crate::store::error::{InvalidIdError, NotPresentError, StoreError, StoreResult};
use crate::store::join::Joinable;
use crate::store::sparse::SparseSet;
use crate::store::types::{entry_hash, type_tag_hash, EntityId};


/// Per-group storage with parent linking.
///
/// ## Purpose
/// Entities form equivalence classes ("groups") that share a single value.
/// Linking an entity to a parent places it in the parent's group by
/// reference: the value is not copied, and a later
/// [`set_group`](GroupedStore::set_group) write is seen by every member.
///
/// ## Layout
/// - `group` — packed column parallel to the index; `group[p]` is the group
///   id of the entity at position `p`.
/// - `group_size` — member count per group, driving group reclamation.
/// - `data` — one value per group; `data[g]` is the value shared by group
///   `g`.
///
/// ## Invariants
/// - `group.len() == indices.len()`, co-ordered.
/// - `group_size[g]` equals the number of `group` entries holding `g`, and
///   is positive for every live group.
/// - `data` and `group_size` are in lockstep.
/// - Equal values across distinct groups may exist only transiently, until
///   [`make_unique`](GroupedStore::make_unique).
pub struct GroupedStore<T> {
    indices: SparseSet,
    group: Vec<usize>,
    group_size: Vec<usize>,
    data: Vec<T>,
}

impl<T> GroupedStore<T> {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self {
            indices: SparseSet::new(),
            group: Vec::new(),
            group_size: Vec::new(),
            data: Vec::new(),
        }
    }

    /// Number of entities with a value.
    #[inline]
    pub fn len(&self) -> usize {
        self.group.len()
    }

    /// Returns `true` if no entity has a value.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.group.is_empty()
    }

    /// Number of live groups.
    #[inline]
    pub fn group_count(&self) -> usize {
        self.data.len()
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

    /// Returns the group id of `id`, or `None` if absent.
    #[inline]
    pub fn group_of(&self, id: EntityId) -> Option<usize> {
        self.indices.position_of(id).map(|position| self.group[position])
    }

    /// Returns the member count of group `g`, or `None` for a dead id.
    #[inline]
    pub fn group_len(&self, g: usize) -> Option<usize> {
        self.group_size.get(g).copied()
    }

    /// Returns `id`'s value, or `None` if absent.
    #[inline]
    pub fn get(&self, id: EntityId) -> Option<&T> {
        self.indices
            .position_of(id)
            .map(|position| &self.data[self.group[position]])
    }

    /// Assigns `value` to `id` alone.
    ///
    /// An absent entity starts a fresh singleton group. A present entity
    /// whose group has no other members overwrites its value in place; a
    /// member of a larger group detaches into a new singleton, leaving the
    /// old group's value untouched for the remaining members.
    ///
    /// ## Errors
    /// [`InvalidIdError`] when `id == 0`; the store is untouched.
    pub fn set(&mut self, id: EntityId, value: T) -> StoreResult<()> {
        if id == 0 {
            return Err(InvalidIdError { id }.into());
        }

        match self.indices.position_of(id) {
            None => {
                self.indices.insert_valid(id);
                self.group.push(self.data.len());
                self.group_size.push(1);
                self.data.push(value);
            }
            Some(position) => {
                let g = self.group[position];
                if self.group_size[g] == 1 {
                    self.data[g] = value;
                } else {
                    // Detach into a fresh singleton.
                    self.group_size[g] -= 1;
                    self.group[position] = self.data.len();
                    self.group_size.push(1);
                    self.data.push(value);
                }
            }
        }
        Ok(())
    }

    /// Places `id` in `parent`'s group.
    ///
    /// The parent must already have a value. If `id` was the last member of
    /// another group, that group is reclaimed. Linking an entity to a member
    /// of its own group is a no-op on the group structure.
    ///
    /// ## Errors
    /// [`InvalidIdError`] when `id == 0`;
    /// [`StoreError::ParentMissing`] when `parent` has no value.
    /// The store is untouched on error.
    pub fn link(&mut self, id: EntityId, parent: EntityId) -> StoreResult<()> {
        if id == 0 {
            return Err(InvalidIdError { id }.into());
        }
        let parent_position = self
            .indices
            .position_of(parent)
            .ok_or(StoreError::ParentMissing(NotPresentError { id: parent }))?;
        let mut parent_group = self.group[parent_position];

        match self.indices.position_of(id) {
            None => {
                self.indices.insert_valid(id);
                self.group.push(parent_group);
                self.group_size[parent_group] += 1;
            }
            Some(position) => {
                let old_group = self.group[position];
                if old_group == parent_group {
                    return Ok(());
                }
                if self.group_size[old_group] == 1 {
                    // The vacated singleton is reclaimed; reclamation shifts
                    // group ids above it down by one, the parent's included.
                    self.drop_group(old_group);
                    if parent_group > old_group {
                        parent_group -= 1;
                    }
                } else {
                    self.group_size[old_group] -= 1;
                }
                self.group[position] = parent_group;
                self.group_size[parent_group] += 1;
            }
        }
        Ok(())
    }

    /// Overwrites the value shared by `id`'s group, affecting every member.
    ///
    /// ## Errors
    /// [`InvalidIdError`] when `id == 0`; [`NotPresentError`] when absent.
    pub fn set_group(&mut self, id: EntityId, value: T) -> StoreResult<()> {
        if id == 0 {
            return Err(InvalidIdError { id }.into());
        }
        let position = self
            .indices
            .position_of(id)
            .ok_or(NotPresentError { id })?;
        self.data[self.group[position]] = value;
        Ok(())
    }

    /// Removes `id` and returns its former value.
    ///
    /// The group's member count drops by one; a group left empty is
    /// reclaimed and later group ids shift down. The value is cloned only
    /// when other members remain.
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

        let g = self.group.swap_remove(position);
        self.group_size[g] -= 1;
        self.indices.remove_at(id, position);

        if self.group_size[g] == 0 {
            Ok(self.drop_group(g))
        } else {
            Ok(self.data[g].clone())
        }
    }

    /// Removes `id` if present, dropping its value.
    ///
    /// Same group reclamation as [`remove`](GroupedStore::remove), without
    /// the `Clone` bound.
    pub fn discard(&mut self, id: EntityId) -> bool {
        let Some(position) = self.indices.position_of(id) else {
            return false;
        };

        let g = self.group.swap_remove(position);
        self.group_size[g] -= 1;
        self.indices.remove_at(id, position);

        if self.group_size[g] == 0 {
            self.drop_group(g);
        }
        true
    }

    /// Iterates the members of group `g` in packed order.
    pub fn iter_group(&self, g: usize) -> impl Iterator<Item = EntityId> + '_ {
        self.indices
            .as_slice()
            .iter()
            .zip(self.group.iter())
            .filter(move |&(_, &entry)| entry == g)
            .map(|(&id, _)| id)
    }

    /// Iterates `(entity, value)` pairs in packed order.
    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &T)> {
        self.indices
            .as_slice()
            .iter()
            .zip(self.group.iter())
            .map(|(&id, &g)| (id, &self.data[g]))
    }

    /// The present entities in packed order.
    #[inline]
    pub fn entities(&self) -> &[EntityId] {
        self.indices.as_slice()
    }

    /// Exchanges the packed positions of two present entities.
    ///
    /// Group membership travels with the entities; values do not move.
    ///
    /// ## Errors
    /// [`NotPresentError`] for whichever id is absent; nothing moves.
    pub fn swap_positions(&mut self, a: EntityId, b: EntityId) -> StoreResult<()> {
        let position_a = self.indices.require_position(a)?;
        let position_b = self.indices.require_position(b)?;
        self.indices.swap_positions(a, b)?;
        self.group.swap(position_a, position_b);
        Ok(())
    }

    /// Reorders entities and their group column by the same permutation.
    ///
    /// ## Errors
    /// [`InvalidPermutationError`](crate::store::error::InvalidPermutationError)
    /// unless `perm` permutes `0..len`; the store is untouched on error.
    pub fn permute(&mut self, perm: &[usize]) -> StoreResult<()> {
        self.indices.permute(perm)?;
        self.group = perm.iter().map(|&position| self.group[position]).collect();
        Ok(())
    }

    /// Removes every entity, group, and value.
    pub fn clear(&mut self) {
        self.indices.clear();
        self.group.clear();
        self.group_size.clear();
        self.data.clear();
    }

    /// Reclaims group `g`, shifting every later group id down by one.
    ///
    /// Callers must have brought `group_size[g]` to zero or retargeted the
    /// members first.
    fn drop_group(&mut self, g: usize) -> T {
        let value = self.data.remove(g);
        self.group_size.remove(g);
        for entry in self.group.iter_mut() {
            if *entry > g {
                *entry -= 1;
            }
        }
        value
    }
}

impl<T: PartialEq> GroupedStore<T> {
    /// Merges groups holding equal values, then compacts dead groups.
    ///
    /// Pass 1 folds every later group whose value equals an earlier group's
    /// into the earlier one. Pass 2 removes emptied groups and rewrites the
    /// group column against the compacted ids. Idempotent, and `get` returns
    /// the same value for every entity before and after.
    pub fn make_unique(&mut self) {
        // Pass 1: fold equal-valued groups into the earliest occurrence.
        for first in 0..self.data.len() {
            if self.group_size[first] == 0 {
                continue;
            }
            for g in (first + 1)..self.data.len() {
                if self.group_size[g] != 0 && self.data[g] == self.data[first] {
                    self.group_size[first] += self.group_size[g];
                    self.group_size[g] = 0;
                    for entry in self.group.iter_mut() {
                        if *entry == g {
                            *entry = first;
                        }
                    }
                }
            }
        }

        // Pass 2: compact dead groups and remap the group column.
        let mut remap = vec![0usize; self.data.len()];
        let mut kept = 0;
        for (g, slot) in remap.iter_mut().enumerate() {
            *slot = kept;
            if self.group_size[g] != 0 {
                kept += 1;
            }
        }

        let sizes = &self.group_size;
        let mut cursor = 0;
        self.data.retain(|_| {
            let keep = sizes[cursor] != 0;
            cursor += 1;
            keep
        });
        self.group_size.retain(|&size| size != 0);
        for entry in self.group.iter_mut() {
            *entry = remap[*entry];
        }
    }
}

impl<T> Default for GroupedStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: fmt::Debug> fmt::Debug for GroupedStore<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<T> Joinable for GroupedStore<T> {
    #[inline]
    fn indices(&self) -> &SparseSet {
        &self.indices
    }
}

/// Membership-and-value equality, insensitive to packed order and to how
/// entities are partitioned into groups.
impl<T: PartialEq> PartialEq for GroupedStore<T> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self.iter().all(|(id, value)| other.get(id) == Some(value))
    }
}

impl<T: Eq> Eq for GroupedStore<T> {}

impl<T: std::hash::Hash + 'static> GroupedStore<T> {
    /// Hash over (element type tag, contents), insensitive to packed order.
    pub fn content_hash(&self) -> u64 {
        let mut combined = type_tag_hash::<T>();
        for (id, value) in self.iter() {
            combined = combined.wrapping_add(entry_hash(id, value));
        }
        combined
    }
}

impl<T: std::hash::Hash + 'static> std::hash::Hash for GroupedStore<T> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        state.write_usize(self.len());
        state.write_u64(self.content_hash());
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Serde (feature = "serde")
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(feature = "serde")]
impl<T: serde::Serialize> serde::Serialize for GroupedStore<T> {
    /// Serializes as `(entities, group column, group sizes, group values)`.
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        (self.indices.as_slice(), &self.group, &self.group_size, &self.data)
            .serialize(serializer)
    }
}

#[cfg(feature = "serde")]
impl<'de, T: serde::Deserialize<'de>> serde::Deserialize<'de> for GroupedStore<T> {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        use serde::de::Error;

        let (indices, group, group_size, data): (SparseSet, Vec<usize>, Vec<usize>, Vec<T>) =
            serde::Deserialize::deserialize(deserializer)?;

        if indices.len() != group.len() {
            return Err(D::Error::custom(format!(
                "entity and group column lengths diverge ({} vs {})",
                indices.len(),
                group.len()
            )));
        }
        if group_size.len() != data.len() {
            return Err(D::Error::custom(format!(
                "group size and value column lengths diverge ({} vs {})",
                group_size.len(),
                data.len()
            )));
        }

        let mut counted = vec![0usize; data.len()];
        for &g in &group {
            if g >= data.len() {
                return Err(D::Error::custom(format!("group id {g} is outside the group table")));
            }
            counted[g] += 1;
        }
        if counted != group_size {
            return Err(D::Error::custom("group sizes do not match the group column"));
        }
        if group_size.contains(&0) {
            return Err(D::Error::custom("group table contains an empty group"));
        }

        Ok(Self { indices, group, group_size, data })
    }
}

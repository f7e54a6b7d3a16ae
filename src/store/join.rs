//! Joined iteration over boolean membership predicates.
//!
//! This module turns a predicate such as `(A ∧ C) ∨ D ∧ ¬B` over component
//! presence into a lazy iterator of entities.
//!
//! ## Execution model
//! A [`Filter`] is the declarative form of the predicate; building one does
//! no work. Turning it into a [`JoinIter`] picks a *driver*:
//!
//! 1. If the predicate has positive conjuncts (stores that must contain
//!    every yielded entity), the driver is the shortest conjunct's index.
//! 2. Otherwise the driver is the union of the predicate's positive
//!    disjuncts. This is the only allocating path.
//!
//! Iteration walks the driver's packed column in order and evaluates the
//! full predicate per candidate with O(1) membership tests, so total work is
//! O(|driver|) with no further allocation.
//!
//! Negations never drive selection: an entity present in no positive store
//! mentioned by the predicate is never yielded.
//!
//! ## Consumers
//! Any object offering a [`SparseSet`] of present entities can participate
//! by implementing [`Joinable`]; every store in this crate does.

use crate::store::sparse::SparseSet;
use crate::store::types::EntityId;


/// Capability required to take part in a join.
///
/// Implementors expose their membership index; `contains_id` is derived
/// from it and must stay O(1).
pub trait Joinable {
    /// The membership index of this store.
    fn indices(&self) -> &SparseSet;

    /// Returns `true` iff `id` is a member.
    #[inline]
    fn contains_id(&self, id: EntityId) -> bool {
        self.indices().contains(id)
    }
}

/// Boolean predicate over component membership.
///
/// Built with [`with`], [`all_of`], [`any_of`], and [`not`], or chained with
/// [`and`](Filter::and) / [`or`](Filter::or). Consumed by a `for` loop or
/// [`into_iter`](IntoIterator::into_iter).
///
/// ## Example
/// ```ignore
/// // A ∧ (B ∨ C) ∧ ¬(B ∧ C)
/// let filter = all_of(vec![
///     with(&a),
///     any_of(vec![with(&b), with(&c)]),
///     not(all_of(vec![with(&b), with(&c)])),
/// ]);
/// for entity in filter {
///     // ...
/// }
/// ```
pub enum Filter<'a> {
    /// Satisfied when the store contains the candidate.
    With(&'a dyn Joinable),

    /// Satisfied when every child is satisfied.
    All(Vec<Filter<'a>>),

    /// Satisfied when at least one child is satisfied.
    Any(Vec<Filter<'a>>),

    /// Satisfied when the child is not.
    Not(Box<Filter<'a>>),
}

/// Presence of a single store.
pub fn with(store: &dyn Joinable) -> Filter<'_> {
    Filter::With(store)
}

/// Conjunction: every child must hold.
pub fn all_of(filters: Vec<Filter<'_>>) -> Filter<'_> {
    Filter::All(filters)
}

/// Disjunction: at least one child must hold.
pub fn any_of(filters: Vec<Filter<'_>>) -> Filter<'_> {
    Filter::Any(filters)
}

/// Negation of a predicate.
pub fn not(filter: Filter<'_>) -> Filter<'_> {
    Filter::Not(Box::new(filter))
}

impl<'a> Filter<'a> {
    /// Conjoins `other` onto this predicate.
    pub fn and(self, other: Filter<'a>) -> Filter<'a> {
        match self {
            Filter::All(mut filters) => {
                filters.push(other);
                Filter::All(filters)
            }
            first => Filter::All(vec![first, other]),
        }
    }

    /// Disjoins `other` onto this predicate.
    pub fn or(self, other: Filter<'a>) -> Filter<'a> {
        match self {
            Filter::Any(mut filters) => {
                filters.push(other);
                Filter::Any(filters)
            }
            first => Filter::Any(vec![first, other]),
        }
    }

    /// Evaluates the predicate for one candidate.
    pub fn matches(&self, id: EntityId) -> bool {
        match self {
            Filter::With(store) => store.contains_id(id),
            Filter::All(filters) => filters.iter().all(|filter| filter.matches(id)),
            Filter::Any(filters) => filters.iter().any(|filter| filter.matches(id)),
            Filter::Not(filter) => !filter.matches(id),
        }
    }

    /// Stores that must contain every satisfying entity: `With` terms
    /// reachable through conjunctions only.
    fn collect_conjuncts(&self, out: &mut Vec<&'a dyn Joinable>) {
        match self {
            Filter::With(store) => out.push(*store),
            Filter::All(filters) => {
                for filter in filters {
                    filter.collect_conjuncts(out);
                }
            }
            Filter::Any(_) | Filter::Not(_) => {}
        }
    }

    /// Positive terms, one of which must contain any satisfying entity:
    /// every `With` not under a negation.
    fn collect_disjuncts(&self, out: &mut Vec<&'a dyn Joinable>) {
        match self {
            Filter::With(store) => out.push(*store),
            Filter::All(filters) | Filter::Any(filters) => {
                for filter in filters {
                    filter.collect_disjuncts(out);
                }
            }
            Filter::Not(_) => {}
        }
    }

}

/// Consuming the predicate yields a lazy entity iterator.
///
/// Entities come in the driver's packed order. A predicate with no positive
/// term (pure negation) has nothing to drive iteration and yields no
/// entities.
impl<'a> IntoIterator for Filter<'a> {
    type Item = EntityId;
    type IntoIter = JoinIter<'a>;

    fn into_iter(self) -> JoinIter<'a> {
        JoinIter::new(self)
    }
}

/// The index a join walks: borrowed from the shortest conjunct, or an owned
/// union of the disjuncts.
enum Driver<'a> {
    Borrowed(&'a SparseSet),
    Owned(SparseSet),
}

impl Driver<'_> {
    #[inline]
    fn packed(&self) -> &[EntityId] {
        match self {
            Driver::Borrowed(set) => set.as_slice(),
            Driver::Owned(set) => set.as_slice(),
        }
    }
}

/// Lazy join iterator.
///
/// Single-pass, stable order (the driver's packed order), O(1) membership
/// tests per step. Mutating any joined store mid-iteration is rejected by
/// the borrow checker, since the iterator borrows every store the filter
/// mentions.
pub struct JoinIter<'a> {
    filter: Filter<'a>,
    driver: Driver<'a>,
    cursor: usize,
}

impl<'a> JoinIter<'a> {
    fn new(filter: Filter<'a>) -> Self {
        let mut conjuncts: Vec<&'a dyn Joinable> = Vec::new();
        filter.collect_conjuncts(&mut conjuncts);

        let driver = match conjuncts
            .iter()
            .map(|store| store.indices())
            .min_by_key(|indices| indices.len())
        {
            Some(shortest) => Driver::Borrowed(shortest),
            None => {
                let mut disjuncts: Vec<&'a dyn Joinable> = Vec::new();
                filter.collect_disjuncts(&mut disjuncts);
                let mut union = SparseSet::new();
                for store in &disjuncts {
                    for &id in store.indices().as_slice() {
                        union.insert_valid(id);
                    }
                }
                Driver::Owned(union)
            }
        };

        Self { filter, driver, cursor: 0 }
    }
}

impl Iterator for JoinIter<'_> {
    type Item = EntityId;

    fn next(&mut self) -> Option<EntityId> {
        while self.cursor < self.driver.packed().len() {
            let id = self.driver.packed()[self.cursor];
            self.cursor += 1;
            if self.filter.matches(id) {
                return Some(id);
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.driver.packed().len() - self.cursor))
    }
}

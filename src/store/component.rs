//! # Component Kind Registration
//!
//! This module binds component types to their storage shape and exposes the
//! type-erased surface a world object uses to hold heterogeneous stores
//! behind one trait object.
//!
//! ## Purpose
//! The [`Component`] trait is the compile-time mapping from a component type
//! to the store that holds it: implementing it once per type picks dense,
//! shared, or grouped storage. [`ComponentDesc`] carries the runtime
//! metadata (name, `TypeId`, kind) used for diagnostics, and [`ErasedStore`]
//! is the uniform membership/lifecycle surface every store offers once its
//! element type is erased.
//!
//! ## Equality across erased stores
//! Two erased stores are equal iff their element types match, their lengths
//! match, and every entity in one is present in the other with an equal
//! value. For stores longer than [`HASH_EQ_THRESHOLD`] the comparison first
//! checks the order-insensitive content hashes, rejecting unequal stores
//! without walking them.

use std::any::{type_name, Any, TypeId};
use std::hash::Hash;

use crate::store::dense::DenseStore;
use crate::store::grouped::GroupedStore;
use crate::store::join::Joinable;
use crate::store::shared::SharedStore;
use crate::store::types::{EntityId, HASH_EQ_THRESHOLD};


/// Storage shape of a component type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StorageKind {
    /// One value per entity in a packed column.
    Dense,

    /// Values interned; equal payloads stored once.
    Shared,

    /// Parent-linked equivalence classes sharing one value slot.
    Grouped,
}

impl StorageKind {
    /// Short lowercase name for logs and diagnostics.
    pub fn name(self) -> &'static str {
        match self {
            StorageKind::Dense => "dense",
            StorageKind::Shared => "shared",
            StorageKind::Grouped => "grouped",
        }
    }
}

/// Declares the storage shape of a component type.
///
/// Implemented once per component type; the associated `Store` must agree
/// with `KIND`:
///
/// ```ignore
/// struct Velocity { x: f32, y: f32 }
///
/// impl Component for Velocity {
///     const KIND: StorageKind = StorageKind::Dense;
///     type Store = DenseStore<Velocity>;
/// }
/// ```
pub trait Component: Send + Sync + Sized + PartialEq + Hash + 'static {
    /// Storage shape holding this component.
    const KIND: StorageKind;

    /// Concrete store type for this component.
    type Store: ErasedStore + Default;
}

/// Creates an empty store of the shape declared for `C`.
pub fn empty_store<C: Component>() -> C::Store {
    C::Store::default()
}

/// Describes a registered component type.
///
/// ## Purpose
/// Metadata for debugging, validation, and tooling: the Rust type name, the
/// runtime `TypeId`, and the declared storage shape.
///
/// ## Notes
/// `ComponentDesc` is `Copy` and safe to clone freely for reporting.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ComponentDesc {
    /// Rust type name for diagnostics.
    pub name: &'static str,

    /// Runtime `TypeId` of the component.
    pub type_id: TypeId,

    /// Declared storage shape.
    pub kind: StorageKind,
}

impl ComponentDesc {
    /// Constructs the descriptor for component type `C`.
    #[inline]
    pub fn of<C: Component>() -> Self {
        Self {
            name: type_name::<C>(),
            type_id: TypeId::of::<C>(),
            kind: C::KIND,
        }
    }

    /// Returns `true` if this descriptor refers to type `T`.
    #[inline]
    pub fn matches_type<T: 'static>(&self) -> bool {
        self.type_id == TypeId::of::<T>()
    }
}

impl std::fmt::Display for ComponentDesc {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ComponentDesc {{ name: {}, kind: {} }}", self.name, self.kind.name())
    }
}

/// Type-erased store surface.
///
/// ## Purpose
/// Lets a world object own a heterogeneous collection of stores behind one
/// trait object: membership, lifecycle, and equality without knowing the
/// element type. Typed access goes through `as_any`/`as_any_mut` downcasts.
///
/// Every erased store is also [`Joinable`], so erased stores participate in
/// joins directly.
pub trait ErasedStore: Any + Send + Sync + Joinable {
    /// Storage shape of this store.
    fn kind(&self) -> StorageKind;

    /// Number of entities with a value.
    fn len(&self) -> usize;

    /// Returns `true` if no entity has a value.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns `true` iff `id` has a value.
    fn contains(&self, id: EntityId) -> bool;

    /// Removes `id` if present, dropping its value.
    fn discard(&mut self, id: EntityId) -> bool;

    /// Removes every entity.
    fn clear(&mut self);

    /// Runtime identifier of the element type.
    fn element_type_id(&self) -> TypeId;

    /// Rust name of the element type, for diagnostics.
    fn element_type_name(&self) -> &'static str;

    /// Upcast for typed downcasting.
    fn as_any(&self) -> &dyn Any;

    /// Mutable upcast for typed downcasting.
    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// Hash over (element type tag, contents), insensitive to packed order.
    fn content_hash(&self) -> u64;

    /// Equality across erased stores: element types, lengths, and per-entity
    /// values must all match. Applies the hash shortcut above
    /// [`HASH_EQ_THRESHOLD`].
    fn erased_eq(&self, other: &dyn ErasedStore) -> bool;
}

/// Hash-shortcut equality shared by the store impls below.
macro_rules! erased_store_impl {
    ($store:ident, $kind:expr) => {
        impl<T> ErasedStore for $store<T>
        where
            T: Send + Sync + PartialEq + Hash + 'static,
        {
            fn kind(&self) -> StorageKind {
                $kind
            }

            fn len(&self) -> usize {
                $store::len(self)
            }

            fn contains(&self, id: EntityId) -> bool {
                $store::contains(self, id)
            }

            fn discard(&mut self, id: EntityId) -> bool {
                $store::discard(self, id)
            }

            fn clear(&mut self) {
                $store::clear(self)
            }

            fn element_type_id(&self) -> TypeId {
                TypeId::of::<T>()
            }

            fn element_type_name(&self) -> &'static str {
                type_name::<T>()
            }

            fn as_any(&self) -> &dyn Any {
                self
            }

            fn as_any_mut(&mut self) -> &mut dyn Any {
                self
            }

            fn content_hash(&self) -> u64 {
                $store::content_hash(self)
            }

            fn erased_eq(&self, other: &dyn ErasedStore) -> bool {
                let Some(other) = other.as_any().downcast_ref::<$store<T>>() else {
                    return false;
                };
                if $store::len(self) != $store::len(other) {
                    return false;
                }
                if $store::len(self) > HASH_EQ_THRESHOLD
                    && $store::content_hash(self) != $store::content_hash(other)
                {
                    return false;
                }
                self == other
            }
        }
    };
}

erased_store_impl!(DenseStore, StorageKind::Dense);
erased_store_impl!(SharedStore, StorageKind::Shared);
erased_store_impl!(GroupedStore, StorageKind::Grouped);

// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Identity handles.
//!
//! [`PropertyId`] names a registered property at runtime, [`Property<T>`]
//! adds the value type at compile time, and [`ListenerId`] names a
//! subscription so that it can be removed later.

use core::fmt;
use core::hash::{Hash, Hasher};
use core::marker::PhantomData;

/// A runtime property identifier.
///
/// A compact (u16) handle handed out by
/// [`PropertyRegistry::register`](crate::PropertyRegistry::register).
/// Two ids compare equal only if they refer to the same registration.
///
/// ```rust
/// use understory_property_engine::PropertyId;
///
/// let id = PropertyId::new(42);
/// assert_eq!(id.index(), 42);
/// ```
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PropertyId(u16);

impl PropertyId {
    /// Creates a property ID from a registry index.
    #[must_use]
    #[inline]
    pub const fn new(index: u16) -> Self {
        Self(index)
    }

    /// Returns the registry index of this property.
    #[must_use]
    #[inline]
    pub const fn index(self) -> u16 {
        self.0
    }
}

impl fmt::Debug for PropertyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PropertyId").field(&self.0).finish()
    }
}

impl fmt::Display for PropertyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A typed property key.
///
/// Wraps a [`PropertyId`] with the property's value type so the typed engine
/// API can check values at compile time:
///
/// ```rust
/// use understory_property_engine::{Property, PropertyMetadataBuilder, PropertyRegistry};
///
/// let mut registry = PropertyRegistry::new();
/// let width: Property<f64> = registry
///     .register("Width", PropertyMetadataBuilder::new(0.0_f64).build())
///     .unwrap();
///
/// // engine.set_value(1, width, BindingPriority::LocalValue, "wide"); // does not compile
/// # let _ = width;
/// ```
///
/// A handle rebuilt with [`Property::from_id`] under the wrong `T` is still
/// caught at runtime: the engine compares the type against the registration
/// and reports [`PropertyError::TypeMismatch`](crate::PropertyError::TypeMismatch).
pub struct Property<T> {
    id: PropertyId,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Property<T> {
    /// Creates a typed handle from a property ID.
    #[must_use]
    #[inline]
    pub const fn from_id(id: PropertyId) -> Self {
        Self {
            id,
            _marker: PhantomData,
        }
    }

    /// Returns the underlying property ID.
    #[must_use]
    #[inline]
    pub const fn id(self) -> PropertyId {
        self.id
    }
}

// Manual impls so that `T` needs none of these traits.

impl<T> Copy for Property<T> {}

impl<T> Clone for Property<T> {
    #[inline]
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> PartialEq for Property<T> {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<T> Eq for Property<T> {}

impl<T> Hash for Property<T> {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl<T> From<Property<T>> for PropertyId {
    #[inline]
    fn from(property: Property<T>) -> Self {
        property.id
    }
}

impl<T> fmt::Debug for Property<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Property")
            .field("id", &self.id)
            .field("type", &core::any::type_name::<T>())
            .finish()
    }
}

/// Handle for a registered change listener.
///
/// Returned by [`PropertyEngine::subscribe`](crate::PropertyEngine::subscribe)
/// and [`PropertyEngine::subscribe_global`](crate::PropertyEngine::subscribe_global).
/// Ids are never reused, so a stale id can be passed to
/// [`PropertyEngine::unsubscribe`](crate::PropertyEngine::unsubscribe) safely.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ListenerId(u64);

impl ListenerId {
    #[inline]
    pub(crate) const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw id.
    #[must_use]
    #[inline]
    pub const fn get(self) -> u64 {
        self.0
    }
}

// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Type-erased property values.
//!
//! [`ErasedValue`] lets one store hold values of every property type while
//! keeping enough type information to check, compare, and downcast them.
//!
//! An absent contribution is spelled `Option::<ErasedValue>::None` throughout
//! the crate. It is distinct from every real value, including a property
//! whose own type is an `Option` holding `None`.

use alloc::boxed::Box;
use core::any::{Any, TypeId};
use core::fmt;

/// Bound shared by every property value type.
///
/// Values are cloned when they are reported in notifications and compared
/// with [`PartialEq`] to decide whether anything observable changed.
pub trait PropertyValue: Any + Clone + PartialEq {}

impl<T: Any + Clone + PartialEq> PropertyValue for T {}

/// A type-erased property value.
///
/// ```rust
/// use understory_property_engine::ErasedValue;
///
/// let value = ErasedValue::new(42_i32);
/// assert!(value.is::<i32>());
/// assert_eq!(value.downcast_ref::<i32>(), Some(&42));
/// assert!(value.value_eq(&ErasedValue::new(42_i32)));
/// assert!(!value.value_eq(&ErasedValue::new(42_i64)));
/// ```
pub struct ErasedValue {
    inner: Box<dyn DynValue>,
    type_id: TypeId,
    type_name: &'static str,
}

impl ErasedValue {
    /// Erases a concrete value.
    #[must_use]
    pub fn new<T: PropertyValue>(value: T) -> Self {
        Self {
            inner: Box::new(value),
            type_id: TypeId::of::<T>(),
            type_name: core::any::type_name::<T>(),
        }
    }

    /// Returns the [`TypeId`] of the contained value.
    #[must_use]
    #[inline]
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Returns the type name of the contained value, for diagnostics.
    #[must_use]
    #[inline]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Returns `true` if the contained value is a `T`.
    #[must_use]
    #[inline]
    pub fn is<T: 'static>(&self) -> bool {
        self.type_id == TypeId::of::<T>()
    }

    /// Downcasts to `&T`, or `None` if the value is another type.
    #[must_use]
    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        if self.is::<T>() {
            self.inner.as_any().downcast_ref()
        } else {
            None
        }
    }

    /// Compares two erased values with the contained type's `PartialEq`.
    ///
    /// Values of different types are never equal.
    #[must_use]
    pub fn value_eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id && self.inner.eq_dyn(other.inner.as_any())
    }
}

impl Clone for ErasedValue {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone_boxed(),
            type_id: self.type_id,
            type_name: self.type_name,
        }
    }
}

impl PartialEq for ErasedValue {
    fn eq(&self, other: &Self) -> bool {
        self.value_eq(other)
    }
}

impl fmt::Debug for ErasedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErasedValue")
            .field("type", &self.type_name)
            .finish_non_exhaustive()
    }
}

/// Compares two optional contributions, where `None` means unset.
pub(crate) fn same_contribution(a: Option<&ErasedValue>, b: Option<&ErasedValue>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => a.value_eq(b),
        _ => false,
    }
}

trait DynValue: Any {
    fn as_any(&self) -> &dyn Any;
    fn clone_boxed(&self) -> Box<dyn DynValue>;
    fn eq_dyn(&self, other: &dyn Any) -> bool;
}

impl<T: PropertyValue> DynValue for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn clone_boxed(&self) -> Box<dyn DynValue> {
        Box::new(self.clone())
    }

    fn eq_dyn(&self, other: &dyn Any) -> bool {
        other.downcast_ref::<T>().is_some_and(|other| self == other)
    }
}

// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Change notification records.
//!
//! A [`ChangeNotification`] is built once per observable mutation and then
//! handed to every listener. Everything except the outdated bit is fixed at
//! construction.
//!
//! ## Effective and source changes
//!
//! When [`is_effective_value_change`](ChangeNotification::is_effective_value_change)
//! is `true`, [`old_erased`](ChangeNotification::old_erased) and
//! [`new_erased`](ChangeNotification::new_erased) are the effective values
//! immediately before and after the mutation: what `get_value` returned just
//! before and returns just after.
//!
//! When it is `false`, a source hidden behind a higher priority changed.
//! The old value is then unset (`None`) and the new value is the source's
//! new raw value, or unset if the source was cleared or removed.
//!
//! ## Outdated notifications
//!
//! A listener may change the effective value of the same property while a
//! notification is still being delivered. The engine then marks the earlier
//! notification [outdated](ChangeNotification::is_outdated) before delivering
//! the new one. Changes to hidden sources do not mark anything.
//! Outdated notifications are still delivered; listeners that care should
//! skip side effects or read the current value instead of trusting the new
//! value.

use core::cell::Cell;

use crate::id::{Property, PropertyId};
use crate::priority::BindingPriority;
use crate::store::StoreChange;
use crate::value::{ErasedValue, PropertyValue};

/// One observed property change.
#[derive(Debug)]
pub struct ChangeNotification<K> {
    sender: K,
    property: PropertyId,
    priority: BindingPriority,
    old: Option<ErasedValue>,
    new: Option<ErasedValue>,
    is_effective_value_change: bool,
    outdated: Cell<bool>,
}

impl<K: Copy> ChangeNotification<K> {
    /// Builds a record for an effective value change.
    #[must_use]
    pub fn effective(
        sender: K,
        property: PropertyId,
        priority: BindingPriority,
        old: ErasedValue,
        new: ErasedValue,
    ) -> Self {
        Self {
            sender,
            property,
            priority,
            old: Some(old),
            new: Some(new),
            is_effective_value_change: true,
            outdated: Cell::new(false),
        }
    }

    /// Builds a record for a change to a source that does not win.
    #[must_use]
    pub fn source(
        sender: K,
        property: PropertyId,
        priority: BindingPriority,
        new: Option<ErasedValue>,
    ) -> Self {
        Self {
            sender,
            property,
            priority,
            old: None,
            new,
            is_effective_value_change: false,
            outdated: Cell::new(false),
        }
    }

    /// Builds the record matching a store mutation, if it warrants one.
    #[must_use]
    pub fn from_change(
        sender: K,
        property: PropertyId,
        priority: BindingPriority,
        change: StoreChange,
    ) -> Option<Self> {
        match change {
            StoreChange::Unchanged => None,
            StoreChange::Source { value } => Some(Self::source(sender, property, priority, value)),
            StoreChange::Effective { old, new } => {
                Some(Self::effective(sender, property, priority, old, new))
            }
        }
    }

    /// Returns the object whose property changed.
    #[must_use]
    #[inline]
    pub fn sender(&self) -> K {
        self.sender
    }

    /// Returns the property that changed.
    #[must_use]
    #[inline]
    pub fn property(&self) -> PropertyId {
        self.property
    }

    /// Returns `true` if this record is about `property`.
    #[must_use]
    #[inline]
    pub fn is<T>(&self, property: Property<T>) -> bool {
        self.property == property.id()
    }

    /// Returns the priority of the source that changed.
    ///
    /// For a source change this need not be the priority of the effective value.
    #[must_use]
    #[inline]
    pub fn priority(&self) -> BindingPriority {
        self.priority
    }

    /// Returns the old value, or `None` for unset.
    #[must_use]
    #[inline]
    pub fn old_erased(&self) -> Option<&ErasedValue> {
        self.old.as_ref()
    }

    /// Returns the new value, or `None` for unset.
    #[must_use]
    #[inline]
    pub fn new_erased(&self) -> Option<&ErasedValue> {
        self.new.as_ref()
    }

    /// Returns the old value as a `T`.
    ///
    /// `None` if the old value is unset or is not a `T`.
    #[must_use]
    pub fn old_value<T: PropertyValue>(&self) -> Option<&T> {
        self.old.as_ref().and_then(ErasedValue::downcast_ref)
    }

    /// Returns the new value as a `T`.
    ///
    /// `None` if the new value is unset or is not a `T`.
    #[must_use]
    pub fn new_value<T: PropertyValue>(&self) -> Option<&T> {
        self.new.as_ref().and_then(ErasedValue::downcast_ref)
    }

    /// Returns `true` if the effective value changed.
    #[must_use]
    #[inline]
    pub fn is_effective_value_change(&self) -> bool {
        self.is_effective_value_change
    }

    /// Returns `true` if the effective value changed again on the sender
    /// while this record was still being delivered.
    #[must_use]
    #[inline]
    pub fn is_outdated(&self) -> bool {
        self.outdated.get()
    }

    #[inline]
    pub(crate) fn mark_outdated(&self) {
        self.outdated.set(true);
    }

    /// Returns `true` if both records are about the same sender and property.
    #[must_use]
    #[inline]
    pub fn same_target(&self, other: &Self) -> bool
    where
        K: PartialEq,
    {
        self.sender == other.sender && self.property == other.property
    }
}

// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! In-flight notification tracking.
//!
//! [`DeliveryQueue`] records every notification whose delivery has started
//! but not finished. Delivery is synchronous, so the queue is a stack: a
//! listener that mutates a property pushes the nested notification on top,
//! and it is popped again before the outer delivery resumes.
//!
//! Starting delivery of an effective value change marks every queued
//! notification for the same sender and property as outdated. A change to a
//! hidden source leaves the effective value alone, so it marks nothing.
//! Marking is advisory; the outer deliveries still run to completion.

use alloc::rc::Rc;
use alloc::vec::Vec;

use crate::id::PropertyId;
use crate::notification::ChangeNotification;

/// Stack of notifications currently being delivered.
///
/// ```rust
/// use std::rc::Rc;
/// use understory_property_engine::{
///     BindingPriority, ChangeNotification, DeliveryQueue, ErasedValue, PropertyId,
/// };
///
/// const TEXT: PropertyId = PropertyId::new(0);
/// let mut queue = DeliveryQueue::new();
///
/// let first = Rc::new(ChangeNotification::effective(
///     1_u32, TEXT, BindingPriority::Style, ErasedValue::new(0_i32), ErasedValue::new(1_i32),
/// ));
/// queue.begin(first.clone());
///
/// // A listener changes the same property again before `first` is done.
/// let second = Rc::new(ChangeNotification::effective(
///     1_u32, TEXT, BindingPriority::LocalValue, ErasedValue::new(1_i32), ErasedValue::new(2_i32),
/// ));
/// assert_eq!(queue.begin(second.clone()), 1);
/// assert!(first.is_outdated());
/// assert!(!second.is_outdated());
///
/// queue.finish(&second);
/// queue.finish(&first);
/// assert!(queue.is_empty());
/// ```
#[derive(Debug)]
pub struct DeliveryQueue<K> {
    in_flight: Vec<Rc<ChangeNotification<K>>>,
}

impl<K> Default for DeliveryQueue<K> {
    fn default() -> Self {
        Self {
            in_flight: Vec::new(),
        }
    }
}

impl<K: Copy + Eq> DeliveryQueue<K> {
    /// Creates an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of notifications being delivered.
    #[must_use]
    #[inline]
    pub fn len(&self) -> usize {
        self.in_flight.len()
    }

    /// Returns `true` if no delivery is in progress.
    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.in_flight.is_empty()
    }

    /// Registers the start of a delivery.
    ///
    /// If `notification` is an effective value change, marks every queued
    /// notification for the same sender and property as outdated. Returns
    /// how many were newly marked.
    pub fn begin(&mut self, notification: Rc<ChangeNotification<K>>) -> usize {
        let mut marked = 0;
        if notification.is_effective_value_change() {
            for pending in &self.in_flight {
                if pending.same_target(&notification) && !pending.is_outdated() {
                    pending.mark_outdated();
                    marked += 1;
                }
            }
        }
        if marked > 0 {
            tracing::debug!(
                property = notification.property().index(),
                marked,
                "marked in-flight notifications outdated"
            );
        }
        self.in_flight.push(notification);
        marked
    }

    /// Registers the end of a delivery.
    ///
    /// Returns `false` if the notification was not queued.
    pub fn finish(&mut self, notification: &Rc<ChangeNotification<K>>) -> bool {
        // Nested deliveries finish first, so the match is almost always on top.
        match self
            .in_flight
            .iter()
            .rposition(|pending| Rc::ptr_eq(pending, notification))
        {
            Some(idx) => {
                self.in_flight.remove(idx);
                true
            }
            None => false,
        }
    }

    /// Returns the queued notifications for `sender` and `property`, oldest first.
    pub fn pending(
        &self,
        sender: K,
        property: PropertyId,
    ) -> impl Iterator<Item = &ChangeNotification<K>> + '_ {
        self.in_flight
            .iter()
            .map(|pending| &**pending)
            .filter(move |pending| pending.sender() == sender && pending.property() == property)
    }

    /// Returns all queued notifications, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &ChangeNotification<K>> + '_ {
        self.in_flight.iter().map(|pending| &**pending)
    }
}

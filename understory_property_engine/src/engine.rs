// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The property engine.
//!
//! [`PropertyEngine`] ties the frozen [`PropertyRegistry`], the per-object
//! [`ValueStore`]s and the [`Dispatcher`] together. Every mutation goes
//! through one path: the store is updated, the effective value is recomputed,
//! and if anything observable changed a [`ChangeNotification`] is delivered
//! before the call returns.
//!
//! Listeners receive `&mut PropertyEngine` and may mutate any property,
//! including the one they were notified about. Such nested mutations are
//! delivered in full before the outer delivery resumes, and the outer
//! notification is marked [outdated](ChangeNotification::is_outdated) when
//! the nested one is about the same object and property.

use alloc::rc::Rc;
use core::fmt;
use core::hash::Hash;
use hashbrown::HashMap;

use crate::dispatch::{Dispatcher, Listener};
use crate::error::PropertyError;
use crate::id::{ListenerId, Property, PropertyId};
use crate::notification::ChangeNotification;
use crate::object::ObjectValues;
use crate::priority::BindingPriority;
use crate::registry::{PropertyRegistration, PropertyRegistry};
use crate::store::{RevalidateHook, StoreChange, ValueEntry, ValueStore};
use crate::value::{ErasedValue, PropertyValue};

/// A store mutation, applied by [`PropertyEngine::mutate`].
enum Op {
    Set(ErasedValue),
    Bind(Option<ErasedValue>, RevalidateHook),
    Refresh(Option<ErasedValue>),
    Clear,
    Remove,
}

impl Op {
    fn creates_slot(&self) -> bool {
        matches!(self, Self::Set(_) | Self::Bind(..))
    }
}

/// Property values for a set of objects keyed by `K`, plus their listeners.
///
/// ```rust
/// use std::cell::RefCell;
/// use std::rc::Rc;
/// use understory_property_engine::{
///     BindingPriority, PropertyEngine, PropertyMetadataBuilder, PropertyRegistry,
/// };
///
/// let mut registry = PropertyRegistry::new();
/// let width = registry
///     .register("Width", PropertyMetadataBuilder::new(0.0_f64).build())
///     .unwrap();
///
/// let mut engine = PropertyEngine::<u32>::new(registry);
/// let seen = Rc::new(RefCell::new(Vec::new()));
/// let log = seen.clone();
/// engine
///     .subscribe(1, width, move |_, n| {
///         log.borrow_mut().push((n.old_value::<f64>().copied(), n.new_value::<f64>().copied()));
///     })
///     .unwrap();
///
/// engine.set_value(1, width, BindingPriority::Style, 10.0).unwrap();
/// engine.set_value(1, width, BindingPriority::LocalValue, 20.0).unwrap();
/// assert_eq!(engine.get_value(1, width), Ok(20.0));
///
/// engine.clear_value(1, width, BindingPriority::LocalValue).unwrap();
/// assert_eq!(engine.get_value(1, width), Ok(10.0));
/// assert_eq!(
///     *seen.borrow(),
///     [(Some(0.0), Some(10.0)), (Some(10.0), Some(20.0)), (Some(20.0), Some(10.0))]
/// );
/// ```
pub struct PropertyEngine<K> {
    registry: PropertyRegistry,
    objects: HashMap<K, ObjectValues>,
    dispatcher: Dispatcher<K>,
}

impl<K: Copy + Eq + Hash + fmt::Debug> PropertyEngine<K> {
    /// Creates an engine over a fully built registry.
    ///
    /// The registry cannot be changed afterwards.
    #[must_use]
    pub fn new(registry: PropertyRegistry) -> Self {
        Self {
            registry,
            objects: HashMap::new(),
            dispatcher: Dispatcher::new(),
        }
    }

    /// Returns the registry.
    #[must_use]
    #[inline]
    pub fn registry(&self) -> &PropertyRegistry {
        &self.registry
    }

    /// Returns the dispatcher, for inspecting listeners and in-flight deliveries.
    #[must_use]
    #[inline]
    pub fn dispatcher(&self) -> &Dispatcher<K> {
        &self.dispatcher
    }

    /// Returns the number of objects holding at least one value.
    #[must_use]
    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    /// Returns the stored values of `object`, if it has any.
    #[must_use]
    pub fn object_values(&self, object: K) -> Option<&ObjectValues> {
        self.objects.get(&object)
    }

    /// Returns the value store for one property on one object.
    #[must_use]
    pub fn value_store(&self, object: K, property: impl Into<PropertyId>) -> Option<&ValueStore> {
        let id = property.into();
        self.objects.get(&object).and_then(|values| values.get(id))
    }

    // --- reads ---

    /// Returns the effective value of `property` on `object`.
    pub fn get_value<T: PropertyValue>(
        &self,
        object: K,
        property: Property<T>,
    ) -> Result<T, PropertyError> {
        self.get_value_ref(object, property).cloned()
    }

    /// Returns a reference to the effective value of `property` on `object`.
    pub fn get_value_ref<T: PropertyValue>(
        &self,
        object: K,
        property: Property<T>,
    ) -> Result<&T, PropertyError> {
        let id = property.id();
        let registration = self.registry.registration(id)?;
        registration.check_handle::<T>(id)?;
        let value = self.resolve(object, id, registration);
        value
            .downcast_ref()
            .ok_or_else(|| PropertyError::TypeMismatch {
                property: id,
                expected: core::any::type_name::<T>(),
                found: value.type_name(),
            })
    }

    /// Returns the effective value of `property` on `object`, type-erased.
    pub fn get_erased(
        &self,
        object: K,
        property: impl Into<PropertyId>,
    ) -> Result<&ErasedValue, PropertyError> {
        let id = property.into();
        let registration = self.registry.registration(id)?;
        Ok(self.resolve(object, id, registration))
    }

    /// Returns the priority backing the effective value.
    ///
    /// `None` when the default is in effect.
    #[must_use]
    pub fn effective_priority(
        &self,
        object: K,
        property: impl Into<PropertyId>,
    ) -> Option<BindingPriority> {
        self.value_store(object, property)
            .and_then(ValueStore::effective_priority)
    }

    /// Returns the raw value contributed at `priority`, whether or not it wins.
    ///
    /// `Ok(None)` if nothing is contributed at that priority.
    pub fn get_base_value<T: PropertyValue>(
        &self,
        object: K,
        property: Property<T>,
        priority: BindingPriority,
    ) -> Result<Option<&T>, PropertyError> {
        let id = property.id();
        self.registry.registration(id)?.check_handle::<T>(id)?;
        Ok(self
            .value_store(object, id)
            .and_then(|store| store.entry(priority))
            .and_then(ValueEntry::value)
            .and_then(ErasedValue::downcast_ref))
    }

    /// Returns `true` if a value is contributed at `priority`.
    #[must_use]
    pub fn is_set(&self, object: K, property: impl Into<PropertyId>, priority: BindingPriority) -> bool {
        self.value_store(object, property)
            .and_then(|store| store.entry(priority))
            .is_some_and(|entry| !entry.is_unset())
    }

    fn resolve<'a>(
        &'a self,
        object: K,
        id: PropertyId,
        registration: &'a PropertyRegistration,
    ) -> &'a ErasedValue {
        let default = registration.default_value();
        match self.value_store(object, id) {
            Some(store) => store.effective_or(default),
            None => default,
        }
    }

    // --- writes ---

    /// Sets the value contributed at `priority`.
    ///
    /// Returns `true` if the effective value changed.
    pub fn set_value<T: PropertyValue>(
        &mut self,
        object: K,
        property: Property<T>,
        priority: BindingPriority,
        value: T,
    ) -> Result<bool, PropertyError> {
        self.set_erased(object, property.id(), priority, ErasedValue::new(value))
    }

    /// Sets a type-erased value at `priority`.
    ///
    /// Fails with [`PropertyError::TypeMismatch`] if `value` is not of the
    /// property's type, leaving the store untouched.
    pub fn set_erased(
        &mut self,
        object: K,
        property: PropertyId,
        priority: BindingPriority,
        value: ErasedValue,
    ) -> Result<bool, PropertyError> {
        let registration = self.registry.registration(property)?;
        if let Err(err) = registration.check_type(property, &value) {
            tracing::debug!(%err, "rejected property value");
            return Err(err);
        }
        let value = registration.coerce(value);
        Ok(self.mutate(object, property, priority, Op::Set(value)))
    }

    /// Marks the value at `priority` unset, keeping its slot.
    ///
    /// Clearing an unset or missing value does nothing.
    pub fn clear_value<T: PropertyValue>(
        &mut self,
        object: K,
        property: Property<T>,
        priority: BindingPriority,
    ) -> Result<bool, PropertyError> {
        self.clear_erased(object, property.id(), priority)
    }

    /// Type-erased form of [`clear_value`](Self::clear_value).
    pub fn clear_erased(
        &mut self,
        object: K,
        property: PropertyId,
        priority: BindingPriority,
    ) -> Result<bool, PropertyError> {
        self.registry.registration(property)?;
        Ok(self.mutate(object, property, priority, Op::Clear))
    }

    /// Removes the source at `priority` entirely.
    ///
    /// Notifies exactly like [`clear_value`](Self::clear_value); the slot and
    /// any revalidation hook are dropped as well.
    pub fn detach(
        &mut self,
        object: K,
        property: impl Into<PropertyId>,
        priority: BindingPriority,
    ) -> Result<bool, PropertyError> {
        let id = property.into();
        self.registry.registration(id)?;
        Ok(self.mutate(object, id, priority, Op::Remove))
    }

    /// Installs a lazily evaluated source at `priority`.
    ///
    /// `source` runs now and again on every [`revalidate`](Self::revalidate).
    /// Returning `None` leaves the source unset. A later
    /// [`set_value`](Self::set_value) at the same priority replaces the binding.
    pub fn bind<T, F>(
        &mut self,
        object: K,
        property: Property<T>,
        priority: BindingPriority,
        source: F,
    ) -> Result<bool, PropertyError>
    where
        T: PropertyValue,
        F: Fn() -> Option<T> + 'static,
    {
        let id = property.id();
        let registration = self.registry.registration(id)?;
        registration.check_handle::<T>(id)?;
        let hook: RevalidateHook = Rc::new(move || source().map(ErasedValue::new));
        let value = hook().map(|value| registration.coerce(value));
        Ok(self.mutate(object, id, priority, Op::Bind(value, hook)))
    }

    /// Re-runs the source bound at `priority` and applies its result.
    ///
    /// Fails with [`PropertyError::NotBound`] if no source is bound there.
    pub fn revalidate(
        &mut self,
        object: K,
        property: impl Into<PropertyId>,
        priority: BindingPriority,
    ) -> Result<bool, PropertyError> {
        let id = property.into();
        let registration = self.registry.registration(id)?;
        let hook = self
            .value_store(object, id)
            .and_then(|store| store.hook(priority))
            .ok_or(PropertyError::NotBound {
                property: id,
                priority,
            })?;
        let value = match hook() {
            Some(value) => {
                registration.check_type(id, &value)?;
                Some(registration.coerce(value))
            }
            None => None,
        };
        Ok(self.mutate(object, id, priority, Op::Refresh(value)))
    }

    /// Drops every value and object-scoped listener of `object`.
    ///
    /// No notifications are sent. Returns `true` if anything was dropped.
    pub fn remove_object(&mut self, object: K) -> bool {
        let had_values = self.objects.remove(&object).is_some();
        let listeners = self.dispatcher.remove_sender(object);
        tracing::trace!(?object, had_values, listeners, "removed object");
        had_values || listeners > 0
    }

    // --- listeners ---

    /// Subscribes to changes of `property` on `object`.
    pub fn subscribe<F>(
        &mut self,
        object: K,
        property: impl Into<PropertyId>,
        listener: F,
    ) -> Result<ListenerId, PropertyError>
    where
        F: Fn(&mut Self, &ChangeNotification<K>) + 'static,
    {
        let id = property.into();
        self.registry.registration(id)?;
        let listener: Listener<K> = Rc::new(listener);
        Ok(self.dispatcher.subscribe(object, id, listener))
    }

    /// Subscribes to changes of `property` on every object.
    ///
    /// Global listeners run after the object's own listeners.
    pub fn subscribe_global<F>(
        &mut self,
        property: impl Into<PropertyId>,
        listener: F,
    ) -> Result<ListenerId, PropertyError>
    where
        F: Fn(&mut Self, &ChangeNotification<K>) + 'static,
    {
        let id = property.into();
        self.registry.registration(id)?;
        let listener: Listener<K> = Rc::new(listener);
        Ok(self.dispatcher.subscribe_global(id, listener))
    }

    /// Removes a listener.
    ///
    /// Safe to call from inside a listener: the removed listener gets no
    /// further deliveries, including ones already in progress. Returns
    /// `false` if it was already removed.
    pub fn unsubscribe(&mut self, listener: ListenerId) -> bool {
        self.dispatcher.unsubscribe(listener)
    }

    // --- internals ---

    /// Applies `op` and delivers the resulting notification.
    ///
    /// Returns `true` if the effective value changed.
    fn mutate(&mut self, object: K, id: PropertyId, priority: BindingPriority, op: Op) -> bool {
        let Some(registration) = self.registry.get(id) else {
            return false;
        };
        let default = registration.default_value();

        let values = if op.creates_slot() {
            self.objects.entry(object).or_default()
        } else {
            match self.objects.get_mut(&object) {
                Some(values) => values,
                None => return false,
            }
        };
        let Some(store) = (if op.creates_slot() {
            Some(values.get_or_insert(id))
        } else {
            values.get_mut(id)
        }) else {
            return false;
        };

        let change = match op {
            Op::Set(value) => store.set(priority, Some(value), default),
            Op::Bind(value, hook) => store.bind(priority, value, hook, default),
            Op::Refresh(value) => store.refresh(priority, value, default),
            Op::Clear => store.clear(priority, default),
            Op::Remove => store.remove(priority, default),
        };
        values.compact(id);
        if values.is_empty() {
            self.objects.remove(&object);
        }

        tracing::trace!(
            ?object,
            property = id.index(),
            %priority,
            ?change,
            "property mutated"
        );

        let effective = matches!(change, StoreChange::Effective { .. });
        if let Some(notification) = ChangeNotification::from_change(object, id, priority, change) {
            self.raise(notification);
        }
        effective
    }

    fn raise(&mut self, notification: ChangeNotification<K>) {
        let notification = Rc::new(notification);
        let listeners = self.dispatcher.begin(notification.clone());
        tracing::trace!(
            sender = ?notification.sender(),
            property = notification.property().index(),
            effective = notification.is_effective_value_change(),
            listeners = listeners.len(),
            depth = self.dispatcher.queue().len(),
            "delivering change notification"
        );
        for (id, listener) in listeners {
            // Listeners removed by an earlier listener are skipped.
            if self.dispatcher.is_subscribed(id) {
                listener(&mut *self, &*notification);
            }
        }
        self.dispatcher.finish(&notification);
    }
}

impl<K: fmt::Debug> fmt::Debug for PropertyEngine<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyEngine")
            .field("registry", &self.registry)
            .field("objects", &self.objects)
            .field("dispatcher", &self.dispatcher)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::PropertyMetadataBuilder;
    use alloc::string::String;
    use alloc::vec::Vec;
    use core::cell::{Cell, RefCell};

    use BindingPriority::{Animation, LocalValue, Style};

    struct Fixture {
        engine: PropertyEngine<u32>,
        width: Property<f64>,
        text: Property<String>,
        opacity: Property<f64>,
    }

    fn fixture() -> Fixture {
        let mut registry = PropertyRegistry::new();
        let width = registry
            .register("Width", PropertyMetadataBuilder::new(0.0_f64).build())
            .unwrap();
        let text = registry
            .register("Text", PropertyMetadataBuilder::new(String::new()).build())
            .unwrap();
        let opacity = registry
            .register(
                "Opacity",
                PropertyMetadataBuilder::new(1.0_f64)
                    .coerce(|v| v.clamp(0.0, 1.0))
                    .build(),
            )
            .unwrap();
        Fixture {
            engine: PropertyEngine::new(registry),
            width,
            text,
            opacity,
        }
    }

    fn count_notifications(engine: &mut PropertyEngine<u32>, property: PropertyId) -> Rc<Cell<u32>> {
        let count = Rc::new(Cell::new(0));
        let counter = count.clone();
        engine
            .subscribe_global(property, move |_, _| counter.set(counter.get() + 1))
            .unwrap();
        count
    }

    #[test]
    fn untouched_property_reads_default() {
        let Fixture { engine, width, .. } = fixture();
        assert_eq!(engine.get_value(7, width), Ok(0.0));
        assert_eq!(engine.effective_priority(7, width), None);
        assert_eq!(engine.object_count(), 0);
    }

    #[test]
    fn set_value_reports_effective_change() {
        let Fixture { mut engine, width, .. } = fixture();
        assert_eq!(engine.set_value(1, width, Style, 10.0), Ok(true));
        assert_eq!(engine.set_value(1, width, Animation, 30.0), Ok(true));
        // Hidden behind the animation.
        assert_eq!(engine.set_value(1, width, LocalValue, 20.0), Ok(false));
        assert_eq!(engine.get_value(1, width), Ok(30.0));
        assert_eq!(engine.effective_priority(1, width), Some(Animation));
        assert_eq!(engine.get_base_value(1, width, LocalValue), Ok(Some(&20.0)));
    }

    #[test]
    fn objects_are_independent() {
        let Fixture { mut engine, width, .. } = fixture();
        engine.set_value(1, width, LocalValue, 5.0).unwrap();
        assert_eq!(engine.get_value(2, width), Ok(0.0));
        assert_eq!(engine.object_count(), 1);
    }

    #[test]
    fn coerce_runs_before_storing() {
        let Fixture {
            mut engine, opacity, ..
        } = fixture();
        engine.set_value(1, opacity, LocalValue, 4.0).unwrap();
        assert_eq!(engine.get_value(1, opacity), Ok(1.0));
        assert_eq!(engine.get_base_value(1, opacity, LocalValue), Ok(Some(&1.0)));

        // Coerced onto the default: a source change, not an effective one.
        let effective = Rc::new(Cell::new(None));
        let seen = effective.clone();
        engine
            .subscribe(2, opacity, move |_, n| seen.set(Some(n.is_effective_value_change())))
            .unwrap();
        assert_eq!(engine.set_value(2, opacity, LocalValue, 2.0), Ok(false));
        assert_eq!(engine.get_value(2, opacity), Ok(1.0));
        assert_eq!(effective.get(), Some(false));
        assert_eq!(engine.effective_priority(2, opacity), Some(LocalValue));
    }

    #[test]
    fn set_erased_rejects_wrong_type_atomically() {
        let Fixture { mut engine, width, .. } = fixture();
        engine.set_value(1, width, LocalValue, 5.0).unwrap();
        let count = count_notifications(&mut engine, width.id());

        let err = engine
            .set_erased(1, width.id(), LocalValue, ErasedValue::new(String::from("wide")))
            .unwrap_err();
        assert!(matches!(err, PropertyError::TypeMismatch { .. }));
        assert_eq!(engine.get_value(1, width), Ok(5.0));
        assert_eq!(count.get(), 0);
    }

    #[test]
    fn forged_handle_is_a_type_mismatch() {
        let Fixture { mut engine, width, .. } = fixture();
        let forged: Property<i32> = Property::from_id(width.id());
        assert!(matches!(
            engine.set_value(1, forged, LocalValue, 3),
            Err(PropertyError::TypeMismatch { .. })
        ));
        assert!(matches!(
            engine.get_value(1, forged),
            Err(PropertyError::TypeMismatch { .. })
        ));
        assert!(engine.object_values(1).is_none());
    }

    #[test]
    fn unregistered_property_is_rejected() {
        let Fixture { mut engine, .. } = fixture();
        let stray: Property<f64> = Property::from_id(PropertyId::new(99));
        let expected = Err(PropertyError::UnregisteredProperty(stray.id()));
        assert_eq!(engine.get_value(1, stray), expected);
        assert_eq!(engine.set_value(1, stray, LocalValue, 1.0), expected.map(|_| false));
        assert!(engine.subscribe(1, stray, |_, _| {}).is_err());
        assert!(engine.subscribe_global(stray, |_, _| {}).is_err());
        assert!(engine.get_erased(1, stray).is_err());
    }

    #[test]
    fn clear_keeps_slot_while_other_values_remain() {
        let Fixture { mut engine, width, .. } = fixture();
        engine.set_value(1, width, Style, 1.0).unwrap();
        engine.set_value(1, width, LocalValue, 5.0).unwrap();

        assert_eq!(engine.clear_value(1, width, LocalValue), Ok(true));
        assert!(!engine.is_set(1, width, LocalValue));
        let store = engine.value_store(1, width).unwrap();
        assert!(store.entry(LocalValue).unwrap().is_unset());

        assert_eq!(engine.detach(1, width, LocalValue), Ok(false));
        assert!(engine.value_store(1, width).unwrap().entry(LocalValue).is_none());
    }

    #[test]
    fn clearing_every_value_reclaims_storage() {
        let Fixture {
            mut engine, width, text, ..
        } = fixture();
        for object in 0..100 {
            engine.set_value(object, width, LocalValue, 5.0).unwrap();
            engine.set_value(object, text, Style, String::from("x")).unwrap();
        }
        for object in 0..100 {
            engine.clear_value(object, width, LocalValue).unwrap();
            assert!(engine.value_store(object, width).is_none());
            engine.detach(object, text, Style).unwrap();
        }
        assert_eq!(engine.object_count(), 0);
        assert_eq!(engine.get_value(3, width), Ok(0.0));
    }

    #[test]
    fn unset_binding_keeps_its_store() {
        let Fixture { mut engine, width, .. } = fixture();
        engine.bind(1, width, Style, || None).unwrap();
        assert!(engine.value_store(1, width).is_some());
        assert_eq!(engine.object_count(), 1);

        engine.set_value(1, width, LocalValue, 2.0).unwrap();
        engine.clear_value(1, width, LocalValue).unwrap();
        assert!(matches!(engine.revalidate(1, width, Style), Ok(false)));
        assert_eq!(engine.object_count(), 1);
    }

    #[test]
    fn clearing_missing_object_is_silent() {
        let Fixture { mut engine, width, .. } = fixture();
        let count = count_notifications(&mut engine, width.id());
        assert_eq!(engine.clear_value(3, width, Style), Ok(false));
        assert_eq!(engine.detach(3, width, Style), Ok(false));
        assert_eq!(count.get(), 0);
        assert_eq!(engine.object_count(), 0);
    }

    #[test]
    fn bind_and_revalidate() {
        let Fixture {
            mut engine, opacity, ..
        } = fixture();
        let source = Rc::new(Cell::new(Some(0.5)));
        let feed = source.clone();
        assert_eq!(engine.bind(1, opacity, Style, move || feed.get()), Ok(true));
        assert_eq!(engine.get_value(1, opacity), Ok(0.5));

        source.set(Some(7.0));
        assert_eq!(engine.revalidate(1, opacity, Style), Ok(true));
        assert_eq!(engine.get_value(1, opacity), Ok(1.0));

        source.set(None);
        assert_eq!(engine.revalidate(1, opacity, Style), Ok(false));
        assert!(!engine.is_set(1, opacity, Style));
        assert!(engine.value_store(1, opacity).unwrap().entry(Style).unwrap().is_bound());
    }

    #[test]
    fn revalidate_without_binding_fails() {
        let Fixture { mut engine, width, .. } = fixture();
        let not_bound = Err(PropertyError::NotBound {
            property: width.id(),
            priority: Style,
        });
        assert_eq!(engine.revalidate(1, width, Style), not_bound);

        engine.set_value(1, width, Style, 1.0).unwrap();
        assert_eq!(engine.revalidate(1, width, Style), not_bound);
    }

    #[test]
    fn set_value_replaces_binding() {
        let Fixture { mut engine, width, .. } = fixture();
        engine.bind(1, width, Style, || Some(2.0)).unwrap();
        engine.set_value(1, width, Style, 3.0).unwrap();
        assert!(matches!(
            engine.revalidate(1, width, Style),
            Err(PropertyError::NotBound { .. })
        ));
        assert_eq!(engine.get_value(1, width), Ok(3.0));
    }

    #[test]
    fn remove_object_drops_values_and_scoped_listeners() {
        let Fixture { mut engine, width, .. } = fixture();
        engine.set_value(1, width, LocalValue, 5.0).unwrap();
        let scoped = engine.subscribe(1, width, |_, _| {}).unwrap();
        let global = engine.subscribe_global(width, |_, _| {}).unwrap();

        assert!(engine.remove_object(1));
        assert_eq!(engine.get_value(1, width), Ok(0.0));
        assert!(!engine.dispatcher().is_subscribed(scoped));
        assert!(engine.dispatcher().is_subscribed(global));
        assert!(!engine.remove_object(1));
    }

    #[test]
    fn listener_sees_committed_value() {
        let Fixture { mut engine, text, .. } = fixture();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let log = seen.clone();
        engine
            .subscribe(1, text, move |engine, n| {
                log.borrow_mut().push(engine.get_value(n.sender(), text).unwrap());
            })
            .unwrap();

        engine.set_value(1, text, Style, String::from("a")).unwrap();
        assert_eq!(*seen.borrow(), [String::from("a")]);
    }

    #[test]
    fn queue_is_empty_after_delivery() {
        let Fixture { mut engine, width, .. } = fixture();
        let depth = Rc::new(Cell::new(0));
        let observed = depth.clone();
        engine
            .subscribe_global(width, move |engine, _| {
                observed.set(engine.dispatcher().queue().len());
            })
            .unwrap();

        engine.set_value(1, width, LocalValue, 1.0).unwrap();
        assert_eq!(depth.get(), 1);
        assert!(engine.dispatcher().queue().is_empty());
    }

    #[test]
    fn engine_debug() {
        let Fixture { engine, .. } = fixture();
        let debug = alloc::format!("{engine:?}");
        assert!(debug.contains("PropertyEngine"));
        assert!(debug.contains("Width"));
    }
}

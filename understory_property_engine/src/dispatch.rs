// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Listener bookkeeping and delivery order.
//!
//! [`Dispatcher`] owns the listener tables and the [`DeliveryQueue`]. It does
//! not invoke listeners itself: listeners receive `&mut PropertyEngine`, so the
//! engine drives the loop and asks the dispatcher which listeners to call.
//!
//! For a notification about `(sender, property)` the order is:
//!
//! 1. listeners subscribed to `(sender, property)`, in subscription order;
//! 2. listeners subscribed to `property` on every object, in subscription order.
//!
//! The listener list is captured when delivery starts. Listeners added during
//! delivery see only later notifications; listeners removed during delivery
//! are skipped from then on.

use alloc::rc::Rc;
use alloc::vec::Vec;
use core::fmt;
use core::hash::Hash;
use hashbrown::HashMap;
use smallvec::SmallVec;

use crate::engine::PropertyEngine;
use crate::id::{ListenerId, PropertyId};
use crate::notification::ChangeNotification;
use crate::queue::DeliveryQueue;

/// A change listener.
///
/// Listeners get mutable access to the engine and may read or write any
/// property, including the one being reported.
pub type Listener<K> = Rc<dyn Fn(&mut PropertyEngine<K>, &ChangeNotification<K>)>;

/// Listeners captured for one delivery, in call order.
pub(crate) type Snapshot<K> = SmallVec<[(ListenerId, Listener<K>); 4]>;

#[derive(Copy, Clone, Debug)]
enum Scope<K> {
    Object(K, PropertyId),
    Global(PropertyId),
}

type ListenerList<K> = Vec<(ListenerId, Listener<K>)>;

/// Listener tables plus the in-flight queue.
pub struct Dispatcher<K> {
    next_id: u64,
    by_object: HashMap<(K, PropertyId), ListenerList<K>>,
    global: HashMap<PropertyId, ListenerList<K>>,
    scopes: HashMap<ListenerId, Scope<K>>,
    queue: DeliveryQueue<K>,
}

impl<K> Default for Dispatcher<K> {
    fn default() -> Self {
        Self {
            next_id: 0,
            by_object: HashMap::new(),
            global: HashMap::new(),
            scopes: HashMap::new(),
            queue: DeliveryQueue::default(),
        }
    }
}

impl<K: Copy + Eq + Hash> Dispatcher<K> {
    /// Creates a dispatcher with no listeners.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn allocate_id(&mut self) -> ListenerId {
        self.next_id += 1;
        ListenerId::new(self.next_id)
    }

    /// Adds a listener for one property on one object.
    pub fn subscribe(&mut self, sender: K, property: PropertyId, listener: Listener<K>) -> ListenerId {
        let id = self.allocate_id();
        self.by_object
            .entry((sender, property))
            .or_default()
            .push((id, listener));
        self.scopes.insert(id, Scope::Object(sender, property));
        id
    }

    /// Adds a listener for one property on every object.
    pub fn subscribe_global(&mut self, property: PropertyId, listener: Listener<K>) -> ListenerId {
        let id = self.allocate_id();
        self.global.entry(property).or_default().push((id, listener));
        self.scopes.insert(id, Scope::Global(property));
        id
    }

    /// Removes a listener. Returns `false` if it was already gone.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let Some(scope) = self.scopes.remove(&id) else {
            return false;
        };
        match scope {
            Scope::Object(sender, property) => {
                remove_from(&mut self.by_object, &(sender, property), id);
            }
            Scope::Global(property) => remove_from(&mut self.global, &property, id),
        }
        true
    }

    /// Returns `true` if `id` is still subscribed.
    #[must_use]
    #[inline]
    pub fn is_subscribed(&self, id: ListenerId) -> bool {
        self.scopes.contains_key(&id)
    }

    /// Returns the number of live listeners.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.scopes.len()
    }

    /// Drops every listener scoped to `sender`.
    ///
    /// Global listeners are kept. Returns the number removed.
    pub fn remove_sender(&mut self, sender: K) -> usize {
        let before = self.scopes.len();
        self.scopes
            .retain(|_, scope| !matches!(scope, Scope::Object(s, _) if *s == sender));
        self.by_object.retain(|(s, _), _| *s != sender);
        before - self.scopes.len()
    }

    /// Returns the in-flight queue.
    #[must_use]
    #[inline]
    pub fn queue(&self) -> &DeliveryQueue<K> {
        &self.queue
    }

    /// Starts delivering `notification` and returns the listeners to call.
    pub(crate) fn begin(&mut self, notification: Rc<ChangeNotification<K>>) -> Snapshot<K> {
        let key = (notification.sender(), notification.property());
        let mut snapshot = Snapshot::new();
        if let Some(list) = self.by_object.get(&key) {
            snapshot.extend(list.iter().cloned());
        }
        if let Some(list) = self.global.get(&key.1) {
            snapshot.extend(list.iter().cloned());
        }
        self.queue.begin(notification);
        snapshot
    }

    /// Ends the delivery of `notification`.
    pub(crate) fn finish(&mut self, notification: &Rc<ChangeNotification<K>>) {
        let finished = self.queue.finish(notification);
        debug_assert!(finished, "finished a delivery that was never started");
    }
}

fn remove_from<Q: Eq + Hash, K>(table: &mut HashMap<Q, ListenerList<K>>, key: &Q, id: ListenerId) {
    if let Some(list) = table.get_mut(key) {
        // Keep subscription order for the remaining listeners.
        list.retain(|(listener, _)| *listener != id);
        if list.is_empty() {
            table.remove(key);
        }
    }
}

impl<K: fmt::Debug> fmt::Debug for Dispatcher<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("listeners", &self.scopes.len())
            .field("queue", &self.queue)
            .finish_non_exhaustive()
    }
}

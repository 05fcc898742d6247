// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-object sparse property storage.
//!
//! [`ObjectValues`] maps the properties an object has touched to their
//! [`ValueStore`]s. Properties that were never given a value have no entry
//! and resolve to the registered default.
//!
//! Following the `WinUI` `vector_map` approach, entries live in a sorted
//! `SmallVec` searched with binary search rather than a hash map: objects
//! typically touch few properties, and contiguous storage keeps lookups cheap.

use smallvec::SmallVec;

use crate::id::PropertyId;
use crate::store::ValueStore;

/// Most UI objects touch only a handful of properties.
const INLINE_CAPACITY: usize = 4;

/// The value stores of one object, sorted by [`PropertyId`].
#[derive(Clone, Debug, Default)]
pub struct ObjectValues {
    stores: SmallVec<[(PropertyId, ValueStore); INLINE_CAPACITY]>,
}

impl ObjectValues {
    /// Creates an object with no stores.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if the object has no stores.
    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.stores.is_empty()
    }

    /// Returns the number of properties with a store.
    #[must_use]
    #[inline]
    pub fn len(&self) -> usize {
        self.stores.len()
    }

    /// Returns the properties with a store, in id order.
    pub fn property_ids(&self) -> impl Iterator<Item = PropertyId> + '_ {
        self.stores.iter().map(|(id, _)| *id)
    }

    #[inline]
    fn find(&self, id: PropertyId) -> Result<usize, usize> {
        self.stores.binary_search_by_key(&id, |(pid, _)| *pid)
    }

    /// Returns the store for `id`, if the property was touched.
    #[must_use]
    pub fn get(&self, id: PropertyId) -> Option<&ValueStore> {
        self.find(id).ok().map(|idx| &self.stores[idx].1)
    }

    /// Returns the store for `id` mutably, if the property was touched.
    pub fn get_mut(&mut self, id: PropertyId) -> Option<&mut ValueStore> {
        self.find(id).ok().map(|idx| &mut self.stores[idx].1)
    }

    /// Returns the store for `id`, creating an empty one if needed.
    pub fn get_or_insert(&mut self, id: PropertyId) -> &mut ValueStore {
        let idx = match self.find(id) {
            Ok(idx) => idx,
            Err(idx) => {
                self.stores.insert(idx, (id, ValueStore::new()));
                idx
            }
        };
        &mut self.stores[idx].1
    }

    /// Drops the store for `id` if it no longer holds anything, see
    /// [`ValueStore::is_vacant`].
    ///
    /// Returns `true` if a store was dropped.
    pub fn compact(&mut self, id: PropertyId) -> bool {
        match self.find(id) {
            Ok(idx) if self.stores[idx].1.is_vacant() => {
                self.stores.remove(idx);
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::priority::BindingPriority;
    use crate::value::ErasedValue;
    use alloc::vec::Vec;

    #[test]
    fn stores_are_created_lazily() {
        let mut values = ObjectValues::new();
        assert!(values.is_empty());
        assert!(values.get(PropertyId::new(3)).is_none());

        values.get_or_insert(PropertyId::new(3));
        assert_eq!(values.len(), 1);
        assert!(values.get(PropertyId::new(3)).is_some());
    }

    #[test]
    fn stores_stay_sorted() {
        let mut values = ObjectValues::new();
        for index in [5, 1, 9, 3, 7, 0] {
            values.get_or_insert(PropertyId::new(index));
        }
        let ids: Vec<_> = values.property_ids().map(PropertyId::index).collect();
        assert_eq!(ids, [0, 1, 3, 5, 7, 9]);
    }

    #[test]
    fn get_or_insert_returns_existing_store() {
        let default = ErasedValue::new(0_i32);
        let mut values = ObjectValues::new();
        values
            .get_or_insert(PropertyId::new(1))
            .set(BindingPriority::LocalValue, Some(ErasedValue::new(4_i32)), &default);

        let store = values.get_or_insert(PropertyId::new(1));
        assert_eq!(store.effective().and_then(ErasedValue::downcast_ref::<i32>), Some(&4));
        assert_eq!(values.len(), 1);
    }

    #[test]
    fn compact_only_drops_vacant_stores() {
        let default = ErasedValue::new(0_i32);
        let mut values = ObjectValues::new();
        let id = PropertyId::new(2);
        values
            .get_or_insert(id)
            .set(BindingPriority::Style, Some(ErasedValue::new(1_i32)), &default);

        assert!(!values.compact(id));
        values.get_mut(id).unwrap().clear(BindingPriority::Style, &default);
        assert!(values.compact(id));
        assert!(values.is_empty());
        assert!(!values.compact(id));
    }

    #[test]
    fn compact_keeps_bound_stores() {
        let default = ErasedValue::new(0_i32);
        let mut values = ObjectValues::new();
        let id = PropertyId::new(0);
        let hook: crate::store::RevalidateHook = alloc::rc::Rc::new(|| None);
        values
            .get_or_insert(id)
            .bind(BindingPriority::Style, None, hook, &default);

        assert!(!values.compact(id));
        assert_eq!(values.len(), 1);
    }

    #[test]
    fn many_properties_spill_to_heap() {
        let mut values = ObjectValues::new();
        for index in 0..32 {
            values.get_or_insert(PropertyId::new(index));
        }
        for index in 0..32 {
            assert!(values.get(PropertyId::new(index)).is_some());
        }
        assert!(values.get(PropertyId::new(32)).is_none());
    }
}

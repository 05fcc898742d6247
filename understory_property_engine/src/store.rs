// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-property value resolution.
//!
//! A [`ValueStore`] holds every [`ValueEntry`] contributed to one property on
//! one object, sorted by [`BindingPriority`]. The effective value is the value
//! of the first entry that is not unset, or the registered default when all
//! entries are unset.
//!
//! The store never holds the default itself: callers pass the registry's
//! shared default into each operation, so objects only pay for the values
//! they actually have.
//!
//! Each mutation reports a [`StoreChange`], which says whether the effective
//! value moved, whether only a hidden source moved, or whether nothing
//! observable happened at all.

use alloc::rc::Rc;
use core::fmt;
use smallvec::SmallVec;

use crate::priority::BindingPriority;
use crate::value::{ErasedValue, same_contribution};

/// Hook that recomputes a lazily evaluated source.
///
/// Returns `None` when the source currently contributes nothing.
pub type RevalidateHook = Rc<dyn Fn() -> Option<ErasedValue>>;

/// Most properties see at most a local value and one style value.
const INLINE_ENTRIES: usize = 2;

/// One contributed value for one property on one object.
#[derive(Clone)]
pub struct ValueEntry {
    priority: BindingPriority,
    value: Option<ErasedValue>,
    revalidate: Option<RevalidateHook>,
}

impl ValueEntry {
    /// Returns the priority of the source.
    #[must_use]
    #[inline]
    pub fn priority(&self) -> BindingPriority {
        self.priority
    }

    /// Returns the contributed value, or `None` if the source is unset.
    #[must_use]
    #[inline]
    pub fn value(&self) -> Option<&ErasedValue> {
        self.value.as_ref()
    }

    /// Returns `true` if the source currently contributes nothing.
    #[must_use]
    #[inline]
    pub fn is_unset(&self) -> bool {
        self.value.is_none()
    }

    /// Returns `true` if the entry carries a revalidation hook.
    #[must_use]
    #[inline]
    pub fn is_bound(&self) -> bool {
        self.revalidate.is_some()
    }
}

impl fmt::Debug for ValueEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValueEntry")
            .field("priority", &self.priority)
            .field("value", &self.value)
            .field("bound", &self.revalidate.is_some())
            .finish()
    }
}

/// What a single store mutation did.
#[derive(Clone, Debug, PartialEq)]
pub enum StoreChange {
    /// Nothing observable changed.
    Unchanged,
    /// A source changed but the effective value did not.
    Source {
        /// The source's new raw value; `None` if it was unset or removed.
        value: Option<ErasedValue>,
    },
    /// The effective value changed.
    Effective {
        /// The effective value before the mutation.
        old: ErasedValue,
        /// The effective value after the mutation.
        new: ErasedValue,
    },
}

impl StoreChange {
    /// Returns `true` unless this is [`StoreChange::Unchanged`].
    #[must_use]
    #[inline]
    pub fn is_changed(&self) -> bool {
        !matches!(self, Self::Unchanged)
    }
}

enum Edit {
    Set {
        value: Option<ErasedValue>,
        revalidate: Option<RevalidateHook>,
    },
    Refresh(Option<ErasedValue>),
    Unset,
    Remove,
}

/// Priority-ordered entries for one property on one object.
///
/// ```rust
/// use understory_property_engine::{BindingPriority, ErasedValue, StoreChange, ValueStore};
///
/// let default = ErasedValue::new(0_i32);
/// let mut store = ValueStore::new();
///
/// store.set(BindingPriority::Style, Some(ErasedValue::new(1_i32)), &default);
/// store.set(BindingPriority::LocalValue, Some(ErasedValue::new(2_i32)), &default);
/// assert_eq!(store.effective_or(&default).downcast_ref::<i32>(), Some(&2));
///
/// // Clearing the winner exposes the style value.
/// let change = store.clear(BindingPriority::LocalValue, &default);
/// assert_eq!(
///     change,
///     StoreChange::Effective { old: ErasedValue::new(2_i32), new: ErasedValue::new(1_i32) }
/// );
/// ```
#[derive(Clone, Default)]
pub struct ValueStore {
    /// Sorted by priority, highest precedence first.
    entries: SmallVec<[ValueEntry; INLINE_ENTRIES]>,
    /// Index of the winning entry, `None` when the default is in effect.
    effective: Option<usize>,
}

impl ValueStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if the store has no entries at all, set or unset.
    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns `true` if every entry is unset and none carries a
    /// revalidation hook.
    ///
    /// Such a store resolves to the default and can be dropped without
    /// losing anything a later `revalidate` would need.
    #[must_use]
    pub fn is_vacant(&self) -> bool {
        self.entries
            .iter()
            .all(|e| e.value.is_none() && e.revalidate.is_none())
    }

    /// Returns the entries, highest precedence first.
    #[must_use]
    #[inline]
    pub fn entries(&self) -> &[ValueEntry] {
        &self.entries
    }

    /// Returns the entry at `priority`, if a slot exists.
    #[must_use]
    pub fn entry(&self, priority: BindingPriority) -> Option<&ValueEntry> {
        self.find(priority).ok().map(|idx| &self.entries[idx])
    }

    /// Returns the effective value, or `None` if the default is in effect.
    #[must_use]
    #[inline]
    pub fn effective(&self) -> Option<&ErasedValue> {
        self.effective.and_then(|idx| self.entries[idx].value.as_ref())
    }

    /// Returns the effective value, falling back to `default`.
    #[must_use]
    #[inline]
    pub fn effective_or<'a>(&'a self, default: &'a ErasedValue) -> &'a ErasedValue {
        self.effective().unwrap_or(default)
    }

    /// Returns the priority backing the effective value.
    #[must_use]
    #[inline]
    pub fn effective_priority(&self) -> Option<BindingPriority> {
        self.effective.map(|idx| self.entries[idx].priority)
    }

    /// Upserts the entry at `priority`.
    ///
    /// `None` marks the source unset while keeping its slot. Any revalidation
    /// hook previously attached to the slot is dropped.
    pub fn set(
        &mut self,
        priority: BindingPriority,
        value: Option<ErasedValue>,
        default: &ErasedValue,
    ) -> StoreChange {
        self.update(
            priority,
            default,
            Edit::Set {
                value,
                revalidate: None,
            },
        )
    }

    /// Installs a revalidation hook at `priority` together with its first
    /// evaluated value.
    pub fn bind(
        &mut self,
        priority: BindingPriority,
        value: Option<ErasedValue>,
        revalidate: RevalidateHook,
        default: &ErasedValue,
    ) -> StoreChange {
        self.update(
            priority,
            default,
            Edit::Set {
                value,
                revalidate: Some(revalidate),
            },
        )
    }

    /// Returns the revalidation hook at `priority`, if any.
    #[must_use]
    pub fn hook(&self, priority: BindingPriority) -> Option<RevalidateHook> {
        self.entry(priority).and_then(|e| e.revalidate.clone())
    }

    /// Stores a freshly recomputed value at `priority`, keeping its hook.
    ///
    /// Does nothing if there is no slot at `priority`.
    pub fn refresh(
        &mut self,
        priority: BindingPriority,
        value: Option<ErasedValue>,
        default: &ErasedValue,
    ) -> StoreChange {
        self.update(priority, default, Edit::Refresh(value))
    }

    /// Marks the entry at `priority` unset, keeping its slot.
    ///
    /// Clearing a missing or already unset entry is a no-op.
    pub fn clear(&mut self, priority: BindingPriority, default: &ErasedValue) -> StoreChange {
        self.update(priority, default, Edit::Unset)
    }

    /// Removes the slot at `priority` entirely.
    pub fn remove(&mut self, priority: BindingPriority, default: &ErasedValue) -> StoreChange {
        self.update(priority, default, Edit::Remove)
    }

    #[inline]
    fn find(&self, priority: BindingPriority) -> Result<usize, usize> {
        self.entries.binary_search_by_key(&priority, |e| e.priority)
    }

    fn update(&mut self, priority: BindingPriority, default: &ErasedValue, edit: Edit) -> StoreChange {
        // A source hidden behind the current winner cannot move the effective
        // value, so only snapshot it when it might change.
        let hidden = self
            .effective_priority()
            .is_some_and(|winner| winner.overrides(priority));
        let old = (!hidden).then(|| self.effective_or(default).clone());

        let changed = self.edit(priority, edit);
        self.recompute();
        if !changed {
            return StoreChange::Unchanged;
        }

        if let Some(old) = old {
            let new = self.effective_or(default);
            if !old.value_eq(new) {
                return StoreChange::Effective {
                    old,
                    new: new.clone(),
                };
            }
        }
        StoreChange::Source {
            value: self.entry(priority).and_then(|e| e.value.clone()),
        }
    }

    /// Applies `edit` and returns whether the raw contribution changed.
    fn edit(&mut self, priority: BindingPriority, edit: Edit) -> bool {
        match (edit, self.find(priority)) {
            (Edit::Set { value, revalidate }, Ok(idx)) => {
                let entry = &mut self.entries[idx];
                entry.revalidate = revalidate;
                let changed = !same_contribution(entry.value.as_ref(), value.as_ref());
                entry.value = value;
                changed
            }
            (Edit::Set { value, revalidate }, Err(idx)) => {
                let changed = value.is_some();
                self.entries.insert(
                    idx,
                    ValueEntry {
                        priority,
                        value,
                        revalidate,
                    },
                );
                changed
            }
            (Edit::Refresh(value), Ok(idx)) => {
                let entry = &mut self.entries[idx];
                let changed = !same_contribution(entry.value.as_ref(), value.as_ref());
                entry.value = value;
                changed
            }
            (Edit::Unset, Ok(idx)) => self.entries[idx].value.take().is_some(),
            (Edit::Remove, Ok(idx)) => self.entries.remove(idx).value.is_some(),
            (Edit::Refresh(_) | Edit::Unset | Edit::Remove, Err(_)) => false,
        }
    }

    fn recompute(&mut self) {
        self.effective = self.entries.iter().position(|e| e.value.is_some());
    }
}

impl fmt::Debug for ValueStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValueStore")
            .field("entries", &self.entries)
            .field("effective", &self.effective_priority())
            .finish()
    }
}

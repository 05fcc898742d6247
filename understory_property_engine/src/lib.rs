// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Understory Property Engine: priority-resolved properties with change notification.
//!
//! This crate resolves the *effective value* of a property on an object from
//! several competing sources (animations, local assignment, style triggers,
//! templates, styles and inherited values), each tagged with a
//! [`BindingPriority`], and notifies listeners when the effective value or
//! any contributing source changes.
//!
//! ## Core Concepts
//!
//! ### Registration
//!
//! Properties are registered once in a [`PropertyRegistry`], which hands out
//! typed [`Property<T>`] handles. Each property has a default value, optional
//! [`PropertyFlags`] and an optional coerce callback, configured through
//! [`PropertyMetadataBuilder`]. The registry is frozen when it is moved into
//! a [`PropertyEngine`].
//!
//! ### Resolution
//!
//! Each touched property on each object has a [`ValueStore`] with at most one
//! [`ValueEntry`] per priority. The effective value is the value of the
//! highest-precedence entry that is not unset, or the registered default:
//!
//! ```text
//! Animation → LocalValue → StyleTrigger → Template → Style → Inherited → default
//! ```
//!
//! ### Notification
//!
//! Every observable mutation produces one [`ChangeNotification`], delivered
//! synchronously to the object's listeners and then to global listeners.
//! A notification is either an *effective* change (old and new effective
//! values) or a *source* change (a hidden source moved; old is unset and new
//! is the source's raw value).
//!
//! ### Reentrancy
//!
//! Listeners get `&mut PropertyEngine` and may mutate properties. If a
//! listener changes the property it is being notified about, the nested
//! notification is delivered first and the outer one is marked
//! [outdated](ChangeNotification::is_outdated): its new value no longer
//! matches what [`PropertyEngine::get_value`] returns. Outdated notifications
//! are still delivered.
//!
//! ## Quick Start
//!
//! ```rust
//! use std::cell::RefCell;
//! use std::rc::Rc;
//! use understory_property_engine::{
//!     BindingPriority, PropertyEngine, PropertyMetadataBuilder, PropertyRegistry,
//! };
//!
//! let mut registry = PropertyRegistry::new();
//! let text = registry
//!     .register("Text", PropertyMetadataBuilder::new(String::new()).build())
//!     .unwrap();
//! let mut engine = PropertyEngine::<u32>::new(registry);
//!
//! // Whenever a style sets "A", a local value overrides it with "B".
//! engine
//!     .subscribe(1, text, move |engine, n| {
//!         if n.priority() == BindingPriority::Style && n.new_value::<String>().is_some_and(|s| s == "A") {
//!             engine
//!                 .set_value(n.sender(), text, BindingPriority::LocalValue, "B".to_string())
//!                 .unwrap();
//!         }
//!     })
//!     .unwrap();
//!
//! let log = Rc::new(RefCell::new(Vec::new()));
//! let seen = log.clone();
//! engine
//!     .subscribe(1, text, move |engine, n| {
//!         let current = engine.get_value(n.sender(), text).unwrap();
//!         seen.borrow_mut().push((n.new_value::<String>().cloned(), n.is_outdated(), current));
//!     })
//!     .unwrap();
//!
//! engine.set_value(1, text, BindingPriority::Style, "A".to_string()).unwrap();
//!
//! // The nested change is delivered first; the style change arrives outdated.
//! assert_eq!(
//!     *log.borrow(),
//!     [
//!         (Some("B".to_string()), false, "B".to_string()),
//!         (Some("A".to_string()), true, "B".to_string()),
//!     ]
//! );
//! ```
//!
//! ## Memory Optimizations
//!
//! | Optimization | Description |
//! |--------------|-------------|
//! | **Sparse storage** | Objects only hold stores for properties they touched |
//! | **Shared defaults** | Default values live in the registry, not per object |
//! | **Inline storage** | `SmallVec` for entries and per-object stores |
//! | **`PropertyId` as u16** | Compact property identification |
//!
//! ## Diagnostics
//!
//! Mutations, deliveries and outdated marking are reported through
//! [`tracing`](https://docs.rs/tracing) at `trace` and `debug` level. The
//! crate never installs a subscriber.
//!
//! ## `no_std` Support
//!
//! This crate is `no_std` and uses `alloc`. It does not depend on `std`.

#![no_std]

extern crate alloc;

mod dispatch;
mod engine;
mod error;
mod id;
mod metadata;
mod notification;
mod object;
mod priority;
mod queue;
mod registry;
mod store;
mod value;

pub use dispatch::{Dispatcher, Listener};
pub use engine::PropertyEngine;
pub use error::PropertyError;
pub use id::{ListenerId, Property, PropertyId};
pub use metadata::{CoerceValueCallback, PropertyFlags, PropertyMetadata, PropertyMetadataBuilder};
pub use notification::ChangeNotification;
pub use object::ObjectValues;
pub use priority::BindingPriority;
pub use queue::DeliveryQueue;
pub use registry::{PropertyRegistration, PropertyRegistry};
pub use store::{RevalidateHook, StoreChange, ValueEntry, ValueStore};
pub use value::{ErasedValue, PropertyValue};

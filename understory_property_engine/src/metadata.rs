// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Property metadata definitions.
//!
//! [`PropertyMetadata`] is the immutable description of one property, built
//! with [`PropertyMetadataBuilder`] and handed to the registry once.

use alloc::boxed::Box;

use crate::value::PropertyValue;

/// Callback for coercing a property value before it's stored.
///
/// Receives the proposed value and returns the value to store.
pub type CoerceValueCallback<T> = Box<dyn Fn(T) -> T + Send + Sync>;

bitflags::bitflags! {
    /// Behavioural flags describing how a property is consumed.
    ///
    /// The engine records these for external collaborators (layout,
    /// rendering, inheritance propagation); value resolution itself does not
    /// depend on them.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct PropertyFlags: u8 {
        /// Values flow from parent to child objects.
        const INHERITS        = 0b0000_0001;
        /// A change invalidates measurement.
        const AFFECTS_MEASURE = 0b0000_0010;
        /// A change invalidates arrangement.
        const AFFECTS_ARRANGE = 0b0000_0100;
        /// A change invalidates rendering.
        const AFFECTS_RENDER  = 0b0000_1000;
    }
}

/// Metadata for a property.
///
/// ```rust
/// use understory_property_engine::{PropertyFlags, PropertyMetadataBuilder};
///
/// let metadata = PropertyMetadataBuilder::new(100.0_f64)
///     .flags(PropertyFlags::AFFECTS_MEASURE | PropertyFlags::AFFECTS_RENDER)
///     .coerce(|v: f64| v.max(0.0))
///     .build();
///
/// assert_eq!(metadata.default_value(), &100.0);
/// assert!(metadata.flags().contains(PropertyFlags::AFFECTS_MEASURE));
/// assert_eq!(metadata.coerce(-5.0), 0.0);
/// ```
pub struct PropertyMetadata<T: PropertyValue> {
    default_value: T,
    flags: PropertyFlags,
    coerce_callback: Option<CoerceValueCallback<T>>,
}

impl<T: PropertyValue> PropertyMetadata<T> {
    /// Creates metadata with the given default, no flags and no coercion.
    #[must_use]
    pub fn new(default_value: T) -> Self {
        Self {
            default_value,
            flags: PropertyFlags::empty(),
            coerce_callback: None,
        }
    }

    /// Returns the default value.
    #[must_use]
    #[inline]
    pub fn default_value(&self) -> &T {
        &self.default_value
    }

    /// Returns the behavioural flags.
    #[must_use]
    #[inline]
    pub fn flags(&self) -> PropertyFlags {
        self.flags
    }

    /// Returns whether this property inherits from parent objects.
    #[must_use]
    #[inline]
    pub fn inherits(&self) -> bool {
        self.flags.contains(PropertyFlags::INHERITS)
    }

    /// Coerces a value using the coerce callback if one is set.
    #[inline]
    pub fn coerce(&self, value: T) -> T {
        match &self.coerce_callback {
            Some(callback) => callback(value),
            None => value,
        }
    }

    /// Returns whether a coerce callback is set.
    #[must_use]
    #[inline]
    pub fn has_coerce_callback(&self) -> bool {
        self.coerce_callback.is_some()
    }
}

impl<T: PropertyValue + core::fmt::Debug> core::fmt::Debug for PropertyMetadata<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PropertyMetadata")
            .field("default_value", &self.default_value)
            .field("flags", &self.flags)
            .field("has_coerce_callback", &self.coerce_callback.is_some())
            .finish()
    }
}

/// Builder for [`PropertyMetadata`].
pub struct PropertyMetadataBuilder<T: PropertyValue> {
    metadata: PropertyMetadata<T>,
}

impl<T: PropertyValue + core::fmt::Debug> core::fmt::Debug for PropertyMetadataBuilder<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PropertyMetadataBuilder")
            .field("metadata", &self.metadata)
            .finish()
    }
}

impl<T: PropertyValue> PropertyMetadataBuilder<T> {
    /// Creates a builder with the given default value.
    #[must_use]
    pub fn new(default_value: T) -> Self {
        Self {
            metadata: PropertyMetadata::new(default_value),
        }
    }

    /// Replaces the behavioural flags.
    #[must_use]
    pub fn flags(mut self, flags: PropertyFlags) -> Self {
        self.metadata.flags = flags;
        self
    }

    /// Sets or clears [`PropertyFlags::INHERITS`].
    #[must_use]
    pub fn inherits(mut self, inherits: bool) -> Self {
        self.metadata.flags.set(PropertyFlags::INHERITS, inherits);
        self
    }

    /// Sets a callback to coerce values before they are stored.
    ///
    /// The callback runs on every typed contribution, at any priority.
    #[must_use]
    pub fn coerce<F>(mut self, callback: F) -> Self
    where
        F: Fn(T) -> T + Send + Sync + 'static,
    {
        self.metadata.coerce_callback = Some(Box::new(callback));
        self
    }

    /// Builds the [`PropertyMetadata`].
    #[must_use]
    pub fn build(self) -> PropertyMetadata<T> {
        self.metadata
    }
}

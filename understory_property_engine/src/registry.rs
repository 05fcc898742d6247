// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Property registry.
//!
//! [`PropertyRegistry`] is append-only while it is being built. Once it is
//! moved into a [`PropertyEngine`](crate::PropertyEngine) it can only be read,
//! so every registration is immutable for the rest of the engine's life.

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::any::{Any, TypeId};
use hashbrown::HashMap;

use crate::error::PropertyError;
use crate::id::{Property, PropertyId};
use crate::metadata::{PropertyFlags, PropertyMetadata};
use crate::value::{ErasedValue, PropertyValue};

/// A registration entry for a property.
pub struct PropertyRegistration {
    name: &'static str,
    type_id: TypeId,
    type_name: &'static str,
    default_value: ErasedValue,
    metadata: Box<dyn ErasedMetadata>,
}

impl PropertyRegistration {
    /// Returns the property name.
    #[must_use]
    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Returns the [`TypeId`] of the property's value type.
    #[must_use]
    #[inline]
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Returns the name of the property's value type.
    #[must_use]
    #[inline]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Returns the default value, type-erased.
    #[must_use]
    #[inline]
    pub fn default_value(&self) -> &ErasedValue {
        &self.default_value
    }

    /// Returns the behavioural flags.
    #[must_use]
    #[inline]
    pub fn flags(&self) -> PropertyFlags {
        self.metadata.flags()
    }

    /// Checks that an erased value has this property's type.
    pub(crate) fn check_type(&self, id: PropertyId, value: &ErasedValue) -> Result<(), PropertyError> {
        if value.type_id() == self.type_id {
            Ok(())
        } else {
            Err(PropertyError::TypeMismatch {
                property: id,
                expected: self.type_name,
                found: value.type_name(),
            })
        }
    }

    /// Checks that a typed handle was built for this property's type.
    pub(crate) fn check_handle<T: 'static>(&self, id: PropertyId) -> Result<(), PropertyError> {
        if TypeId::of::<T>() == self.type_id {
            Ok(())
        } else {
            Err(PropertyError::TypeMismatch {
                property: id,
                expected: self.type_name,
                found: core::any::type_name::<T>(),
            })
        }
    }

    /// Runs the property's coerce callback on an erased value.
    ///
    /// Values of another type are returned untouched; callers check the type
    /// first.
    pub(crate) fn coerce(&self, value: ErasedValue) -> ErasedValue {
        self.metadata.coerce(value)
    }

    fn metadata<T: PropertyValue>(&self) -> Option<&PropertyMetadata<T>> {
        self.metadata.as_any().downcast_ref()
    }
}

impl core::fmt::Debug for PropertyRegistration {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PropertyRegistration")
            .field("name", &self.name)
            .field("type", &self.type_name)
            .field("flags", &self.flags())
            .finish_non_exhaustive()
    }
}

/// A registry of properties.
///
/// ```rust
/// use understory_property_engine::{PropertyError, PropertyMetadataBuilder, PropertyRegistry};
///
/// let mut registry = PropertyRegistry::new();
/// let width = registry
///     .register("Width", PropertyMetadataBuilder::new(0.0_f64).build())
///     .unwrap();
///
/// assert_eq!(registry.name(width.id()), Some("Width"));
/// assert_eq!(registry.by_name("Width"), Some(width.id()));
///
/// let again = registry.register("Width", PropertyMetadataBuilder::new(1.0_f64).build());
/// assert_eq!(again, Err(PropertyError::AlreadyRegistered("Width")));
/// ```
#[derive(Default)]
pub struct PropertyRegistry {
    properties: Vec<PropertyRegistration>,
    by_name: HashMap<&'static str, PropertyId>,
}

impl PropertyRegistry {
    /// Creates a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a property and returns its typed handle.
    ///
    /// Fails with [`PropertyError::AlreadyRegistered`] if the name is taken
    /// and with [`PropertyError::RegistryFull`] once every id is in use. The
    /// registry is unchanged on failure.
    pub fn register<T: PropertyValue>(
        &mut self,
        name: &'static str,
        metadata: PropertyMetadata<T>,
    ) -> Result<Property<T>, PropertyError> {
        if self.by_name.contains_key(name) {
            tracing::debug!(name, "rejected duplicate property registration");
            return Err(PropertyError::AlreadyRegistered(name));
        }
        let id = u16::try_from(self.properties.len())
            .map(PropertyId::new)
            .map_err(|_| PropertyError::RegistryFull {
                max: usize::from(u16::MAX) + 1,
            })?;

        self.properties.push(PropertyRegistration {
            name,
            type_id: TypeId::of::<T>(),
            type_name: core::any::type_name::<T>(),
            default_value: ErasedValue::new(metadata.default_value().clone()),
            metadata: Box::new(metadata),
        });
        self.by_name.insert(name, id);
        tracing::debug!(name, id = id.index(), ty = core::any::type_name::<T>(), "registered property");

        Ok(Property::from_id(id))
    }

    /// Returns the number of registered properties.
    #[must_use]
    #[inline]
    pub fn len(&self) -> usize {
        self.properties.len()
    }

    /// Returns `true` if no properties are registered.
    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    /// Looks up a property by name.
    #[must_use]
    pub fn by_name(&self, name: &str) -> Option<PropertyId> {
        self.by_name.get(name).copied()
    }

    /// Returns the name of a property.
    #[must_use]
    pub fn name(&self, id: PropertyId) -> Option<&'static str> {
        self.get(id).map(PropertyRegistration::name)
    }

    /// Returns the registration for a property.
    #[must_use]
    pub fn get(&self, id: PropertyId) -> Option<&PropertyRegistration> {
        self.properties.get(usize::from(id.index()))
    }

    /// Returns the registration for a property, or
    /// [`PropertyError::UnregisteredProperty`].
    pub fn registration(&self, id: PropertyId) -> Result<&PropertyRegistration, PropertyError> {
        self.get(id).ok_or(PropertyError::UnregisteredProperty(id))
    }

    /// Returns the behavioural flags of a property, empty if unregistered.
    #[must_use]
    pub fn flags(&self, id: PropertyId) -> PropertyFlags {
        self.get(id).map(PropertyRegistration::flags).unwrap_or_default()
    }

    /// Returns the metadata for a typed property.
    ///
    /// Returns `None` if the property is not registered or the type doesn't match.
    #[must_use]
    pub fn get_metadata<T: PropertyValue>(&self, property: Property<T>) -> Option<&PropertyMetadata<T>> {
        self.get(property.id()).and_then(PropertyRegistration::metadata)
    }

    /// Returns an iterator over all registered properties.
    pub fn iter(&self) -> impl Iterator<Item = (PropertyId, &PropertyRegistration)> {
        self.properties.iter().enumerate().map(|(i, r)| {
            #[expect(clippy::cast_possible_truncation, reason = "index < len <= u16::MAX + 1")]
            let id = PropertyId::new(i as u16);
            (id, r)
        })
    }
}

impl core::fmt::Debug for PropertyRegistry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PropertyRegistry")
            .field("count", &self.properties.len())
            .field("properties", &self.by_name.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Type-erased metadata for heterogeneous storage.
trait ErasedMetadata: Any {
    fn as_any(&self) -> &dyn Any;
    fn flags(&self) -> PropertyFlags;
    fn coerce(&self, value: ErasedValue) -> ErasedValue;
}

impl<T: PropertyValue> ErasedMetadata for PropertyMetadata<T> {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn flags(&self) -> PropertyFlags {
        Self::flags(self)
    }

    fn coerce(&self, value: ErasedValue) -> ErasedValue {
        if !self.has_coerce_callback() {
            return value;
        }
        match value.downcast_ref::<T>() {
            Some(typed) => ErasedValue::new(Self::coerce(self, typed.clone())),
            None => value,
        }
    }
}

// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Errors reported by the registry and the engine.
//!
//! Every failure is reported synchronously at the call site and leaves the
//! engine exactly as it was before the call.

use crate::id::PropertyId;
use crate::priority::BindingPriority;

/// An error from a registry or engine operation.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum PropertyError {
    /// A value's type does not match the property's declared type.
    #[error("property {property} expects `{expected}`, got `{found}`")]
    TypeMismatch {
        /// The property the value was offered to.
        property: PropertyId,
        /// The declared value type.
        expected: &'static str,
        /// The type that was offered.
        found: &'static str,
    },
    /// The property handle is not known to the registry.
    #[error("property {0} is not registered")]
    UnregisteredProperty(PropertyId),
    /// A property with this name has already been registered.
    #[error("property `{0}` is already registered")]
    AlreadyRegistered(&'static str),
    /// The registry cannot hand out any more property ids.
    #[error("too many properties registered (max {max})")]
    RegistryFull {
        /// The maximum number of properties.
        max: usize,
    },
    /// Revalidation was requested for an entry without a revalidation hook.
    #[error("property {property} has no bound source at {priority}")]
    NotBound {
        /// The property that was revalidated.
        property: PropertyId,
        /// The priority that has no hook.
        priority: BindingPriority,
    },
}

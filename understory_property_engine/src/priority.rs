// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Value source priorities.

use core::fmt;

/// The priority of a value source.
///
/// Lower ordinals win: an [`Animation`](Self::Animation) value hides a
/// [`LocalValue`](Self::LocalValue), which hides a style value, and so on.
/// When no source contributes, the registered default is used.
///
/// ```rust
/// use understory_property_engine::BindingPriority;
///
/// assert!(BindingPriority::Animation.overrides(BindingPriority::LocalValue));
/// assert!(BindingPriority::LocalValue < BindingPriority::Style);
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum BindingPriority {
    /// A running animation.
    Animation = 0,
    /// A value assigned directly on the object.
    LocalValue = 1,
    /// A style setter that is active because a trigger matched.
    StyleTrigger = 2,
    /// A value coming from the object's control template.
    Template = 3,
    /// A plain style setter.
    Style = 4,
    /// A value propagated from an ancestor.
    Inherited = 5,
}

impl BindingPriority {
    /// All priorities, highest precedence first.
    pub const ALL: [Self; 6] = [
        Self::Animation,
        Self::LocalValue,
        Self::StyleTrigger,
        Self::Template,
        Self::Style,
        Self::Inherited,
    ];

    /// Returns the ordinal; lower is higher precedence.
    #[must_use]
    #[inline]
    pub const fn ordinal(self) -> u8 {
        self as u8
    }

    /// Returns `true` if a value at `self` hides a value at `other`.
    #[must_use]
    #[inline]
    pub const fn overrides(self, other: Self) -> bool {
        self.ordinal() < other.ordinal()
    }

    /// Returns a short name for diagnostics.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Animation => "Animation",
            Self::LocalValue => "LocalValue",
            Self::StyleTrigger => "StyleTrigger",
            Self::Template => "Template",
            Self::Style => "Style",
            Self::Inherited => "Inherited",
        }
    }
}

impl fmt::Display for BindingPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

//! Builder protocol shared by every query kind.
//!
//! A builder accumulates optional configuration for exactly one target type
//! and validates it in [`Builder::build`]. Setters consume and return the
//! builder so calls chain; builders never touch the wire format.

use crate::error::Result;

/// A validated constructor for one query, suggestion or score function.
pub trait Builder {
    /// The immutable value this builder produces.
    type Output;

    /// Validate required fields and produce the value. Fails with the first
    /// missing required field, checked in the documented order.
    fn build(self) -> Result<Self::Output>;
}

/// Generates consuming setters that store `Some(value.into())`.
macro_rules! setters {
    ($( $(#[$meta:meta])* $name:ident: $ty:ty ),* $(,)?) => {
        $(
            $(#[$meta])*
            pub fn $name(mut self, $name: impl Into<$ty>) -> Self {
                self.$name = Some($name.into());
                self
            }
        )*
    };
}

pub(crate) use setters;

/// Generates consuming setters for decimal fields, accepting anything that
/// converts into a base-10 decimal.
macro_rules! decimal_setters {
    ($( $(#[$meta:meta])* $name:ident ),* $(,)?) => {
        $(
            $(#[$meta])*
            pub fn $name(mut self, $name: impl $crate::codec::IntoDecimal) -> Self {
                self.$name = Some($crate::codec::IntoDecimal::into_decimal($name));
                self
            }
        )*
    };
}

pub(crate) use decimal_setters;

/// Unwraps a required builder field or fails naming it.
macro_rules! required {
    ($builder:ident . $field:ident) => {
        $builder
            .$field
            .ok_or_else(|| $crate::error::QueryDslError::missing_field(stringify!($field)))?
    };
    ($builder:ident . $field:ident, $wire:literal) => {
        $builder
            .$field
            .ok_or_else(|| $crate::error::QueryDslError::missing_field($wire))?
    };
}

pub(crate) use required;

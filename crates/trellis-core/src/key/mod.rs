//! Module: key
//! Responsibility: normalization of application values into index key components.
//! Does not own: index storage or arity rules.
//!
//! Invariants:
//! - Every integer width normalizes to one `Int` variant, so `5u8` and `5i64`
//!   address the same entry.
//! - Floats are finite only. Whole-number floats fold into `Int`, so `5.0`
//!   and `5` address the same entry; non-finite floats become unset parts.
//! - Component ordering is total: Bool < Int < Float < Text < Id, then
//!   natural order within a variant.


use crate::types::{Float64, Id};
use derive_more::Display;
use serde::{Deserialize, Serialize};

/// An unset key component, for use with `key![..]`.
pub const UNDEFINED: Option<KeyComponent> = None;

///
/// KeyComponent
///
/// One normalized value within a lookup key.
///

#[derive(
    Clone, Debug, Deserialize, Display, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
pub enum KeyComponent {
    #[display("{_0}")]
    Bool(bool),

    #[display("{_0}")]
    Int(i128),

    /// Never a whole number when built through the conversion traits.
    #[display("{_0}")]
    Float(Float64),

    #[display("{_0:?}")]
    Text(String),

    #[display("{_0}")]
    Id(Id),
}

impl KeyComponent {
    /// Normalized numeric component; `None` for NaN and infinities.
    #[must_use]
    pub fn float(value: f64) -> Option<Self> {
        Float64::try_new(value).map(IntoKeyComponent::into_key_component)
    }

    #[must_use]
    pub const fn as_id(&self) -> Option<Id> {
        match self {
            Self::Id(id) => Some(*id),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }
}

///
/// IntoKeyComponent
///
/// Explicit projection of a value onto its primitive key form.
/// Application types that are stored as index keys implement this instead
/// of relying on implicit coercion.
///

pub trait IntoKeyComponent {
    fn into_key_component(self) -> KeyComponent;
}

impl IntoKeyComponent for KeyComponent {
    fn into_key_component(self) -> KeyComponent {
        self
    }
}

impl IntoKeyComponent for &KeyComponent {
    fn into_key_component(self) -> KeyComponent {
        self.clone()
    }
}

impl IntoKeyComponent for bool {
    fn into_key_component(self) -> KeyComponent {
        KeyComponent::Bool(self)
    }
}

impl IntoKeyComponent for Id {
    fn into_key_component(self) -> KeyComponent {
        KeyComponent::Id(self)
    }
}

impl IntoKeyComponent for &Id {
    fn into_key_component(self) -> KeyComponent {
        KeyComponent::Id(*self)
    }
}

impl IntoKeyComponent for &str {
    fn into_key_component(self) -> KeyComponent {
        KeyComponent::Text(self.to_string())
    }
}

impl IntoKeyComponent for String {
    fn into_key_component(self) -> KeyComponent {
        KeyComponent::Text(self)
    }
}

impl IntoKeyComponent for &String {
    fn into_key_component(self) -> KeyComponent {
        KeyComponent::Text(self.clone())
    }
}

impl IntoKeyComponent for char {
    fn into_key_component(self) -> KeyComponent {
        KeyComponent::Text(self.to_string())
    }
}

macro_rules! impl_int_key_component {
    ($($ty:ty),* $(,)?) => {
        $(
            impl IntoKeyComponent for $ty {
                fn into_key_component(self) -> KeyComponent {
                    KeyComponent::Int(i128::from(self))
                }
            }
        )*
    };
}

impl_int_key_component!(i8, i16, i32, i64, i128, u8, u16, u32, u64);

impl IntoKeyComponent for isize {
    fn into_key_component(self) -> KeyComponent {
        // isize is at most 64 bits on every supported target
        KeyComponent::Int(self as i128)
    }
}

impl IntoKeyComponent for usize {
    fn into_key_component(self) -> KeyComponent {
        KeyComponent::Int(self as i128)
    }
}

impl IntoKeyComponent for Float64 {
    fn into_key_component(self) -> KeyComponent {
        self.to_whole().map_or(KeyComponent::Float(self), KeyComponent::Int)
    }
}

///
/// IntoKeyPart
///
/// One component slot of a composite key: a value, or unset.
///

pub trait IntoKeyPart {
    fn into_key_part(self) -> Option<KeyComponent>;
}

macro_rules! impl_defined_key_part {
    ($($ty:ty),* $(,)?) => {
        $(
            impl IntoKeyPart for $ty {
                fn into_key_part(self) -> Option<KeyComponent> {
                    Some(self.into_key_component())
                }
            }
        )*
    };
}

impl_defined_key_part!(
    KeyComponent,
    &KeyComponent,
    bool,
    Id,
    &Id,
    &str,
    String,
    &String,
    char,
    i8,
    i16,
    i32,
    i64,
    i128,
    isize,
    u8,
    u16,
    u32,
    u64,
    usize,
    Float64,
);

// non-finite floats cannot be keyed and read as unset
impl IntoKeyPart for f64 {
    fn into_key_part(self) -> Option<KeyComponent> {
        KeyComponent::float(self)
    }
}

impl IntoKeyPart for f32 {
    fn into_key_part(self) -> Option<KeyComponent> {
        KeyComponent::float(f64::from(self))
    }
}

impl<T: IntoKeyComponent> IntoKeyPart for Option<T> {
    fn into_key_part(self) -> Option<KeyComponent> {
        self.map(IntoKeyComponent::into_key_component)
    }
}

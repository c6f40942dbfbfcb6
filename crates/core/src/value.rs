//! Runtime field values as seen by the validators.
//!
//! Fields are reduced to one of two validated families (integers and text).
//! Everything else is [`FieldValue::Unsupported`] and bypasses validation.

use std::borrow::Cow;
use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

/// Value family a directive operates on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueFamily {
    /// Signed or unsigned integer primitives.
    Integer,
    /// Textual values.
    Text,
}

impl fmt::Display for ValueFamily {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer => formatter.write_str("int"),
            Self::Text => formatter.write_str("string"),
        }
    }
}

/// Borrowed runtime value of a single field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldValue<'a> {
    /// Any integer primitive, widened to `i128`.
    Integer(i128),
    /// Borrowed text.
    Text(&'a str),
    /// A kind no directive applies to. Validation is skipped.
    Unsupported,
}

impl FieldValue<'_> {
    /// Returns the value family, or `None` for unsupported values.
    #[must_use]
    pub const fn family(&self) -> Option<ValueFamily> {
        match self {
            Self::Integer(_) => Some(ValueFamily::Integer),
            Self::Text(_) => Some(ValueFamily::Text),
            Self::Unsupported => None,
        }
    }

    /// Returns true when validation should skip this value.
    #[must_use]
    pub const fn is_unsupported(&self) -> bool {
        matches!(self, Self::Unsupported)
    }
}

impl fmt::Display for FieldValue<'_> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(value) => write!(formatter, "{value}"),
            Self::Text(value) => formatter.write_str(value),
            Self::Unsupported => formatter.write_str("<unsupported>"),
        }
    }
}

/// Conversion of a field into its [`FieldValue`].
///
/// Implemented for integer primitives, string types, `Option<T>`, and smart
/// pointers. Floats, booleans, and chars report [`FieldValue::Unsupported`].
pub trait AsFieldValue {
    /// Borrow the field as a validator input.
    fn as_field_value(&self) -> FieldValue<'_>;
}

macro_rules! impl_lossless_integer {
    ($($ty:ty),* $(,)?) => {
        $(
            impl AsFieldValue for $ty {
                fn as_field_value(&self) -> FieldValue<'_> {
                    FieldValue::Integer(i128::from(*self))
                }
            }
        )*
    };
}

macro_rules! impl_checked_integer {
    ($($ty:ty),* $(,)?) => {
        $(
            impl AsFieldValue for $ty {
                fn as_field_value(&self) -> FieldValue<'_> {
                    i128::try_from(*self).map_or(FieldValue::Unsupported, FieldValue::Integer)
                }
            }
        )*
    };
}

macro_rules! impl_unsupported {
    ($($ty:ty),* $(,)?) => {
        $(
            impl AsFieldValue for $ty {
                fn as_field_value(&self) -> FieldValue<'_> {
                    FieldValue::Unsupported
                }
            }
        )*
    };
}

impl_lossless_integer!(i8, i16, i32, i64, i128, u8, u16, u32, u64);
impl_checked_integer!(isize, usize, u128);
impl_unsupported!(f32, f64, bool, char, ());

impl AsFieldValue for str {
    fn as_field_value(&self) -> FieldValue<'_> {
        FieldValue::Text(self)
    }
}

impl AsFieldValue for String {
    fn as_field_value(&self) -> FieldValue<'_> {
        FieldValue::Text(self.as_str())
    }
}

impl AsFieldValue for Cow<'_, str> {
    fn as_field_value(&self) -> FieldValue<'_> {
        FieldValue::Text(self)
    }
}

impl<T: AsFieldValue> AsFieldValue for Option<T> {
    fn as_field_value(&self) -> FieldValue<'_> {
        self.as_ref()
            .map_or(FieldValue::Unsupported, AsFieldValue::as_field_value)
    }
}

impl<T: AsFieldValue + ?Sized> AsFieldValue for &T {
    fn as_field_value(&self) -> FieldValue<'_> {
        (**self).as_field_value()
    }
}

impl<T: AsFieldValue + ?Sized> AsFieldValue for Box<T> {
    fn as_field_value(&self) -> FieldValue<'_> {
        (**self).as_field_value()
    }
}

impl<T: AsFieldValue + ?Sized> AsFieldValue for Rc<T> {
    fn as_field_value(&self) -> FieldValue<'_> {
        (**self).as_field_value()
    }
}

impl<T: AsFieldValue + ?Sized> AsFieldValue for Arc<T> {
    fn as_field_value(&self) -> FieldValue<'_> {
        (**self).as_field_value()
    }
}

impl<T> AsFieldValue for Vec<T> {
    fn as_field_value(&self) -> FieldValue<'_> {
        FieldValue::Unsupported
    }
}

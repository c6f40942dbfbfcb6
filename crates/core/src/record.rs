//! Record capability and shape resolution.
//!
//! A type opts into validation by describing its fields as an ordered list of
//! [`FieldDescriptor`]s (usually via `#[derive(Validate)]`). The entry point
//! inspects values through [`Validatable::shape`] to decide whether there is a
//! record to walk at all.

use crate::value::FieldValue;
use std::rc::Rc;
use std::sync::Arc;

/// One field as handed to the struct walker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDescriptor<'a> {
    /// Field name used to qualify error messages.
    pub name: &'a str,
    /// Raw directive string (empty when the field carries none).
    pub directives: &'a str,
    /// Runtime value of the field.
    pub value: FieldValue<'a>,
}

impl<'a> FieldDescriptor<'a> {
    /// Create a descriptor from its parts.
    #[must_use]
    pub const fn new(name: &'a str, directives: &'a str, value: FieldValue<'a>) -> Self {
        Self {
            name,
            directives,
            value,
        }
    }
}

/// Record-shaped data: an ordered list of annotated fields.
pub trait Record {
    /// Fields in declaration order.
    fn fields(&self) -> Vec<FieldDescriptor<'_>>;
}

/// Shape of a value presented to the entry point.
#[derive(Clone, Copy)]
pub enum Shape<'a> {
    /// The value itself is a record.
    Record(&'a dyn Record),
    /// One level of indirection (reference or smart pointer) to another value.
    Indirect(&'a dyn Validatable),
    /// Anything else. Never validated.
    Opaque,
}

impl Shape<'_> {
    /// Short label used in trace output.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Record(_) => "record",
            Self::Indirect(_) => "indirect",
            Self::Opaque => "opaque",
        }
    }
}

impl std::fmt::Debug for Shape<'_> {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.label())
    }
}

/// Values the entry point accepts.
pub trait Validatable {
    /// Describe how this value should be treated by the entry point.
    fn shape(&self) -> Shape<'_>;
}

macro_rules! impl_opaque {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Validatable for $ty {
                fn shape(&self) -> Shape<'_> {
                    Shape::Opaque
                }
            }
        )*
    };
}

impl_opaque!(
    i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64, bool, char, (), str,
    String,
);

impl<T> Validatable for Option<T> {
    fn shape(&self) -> Shape<'_> {
        Shape::Opaque
    }
}

impl<T> Validatable for Vec<T> {
    fn shape(&self) -> Shape<'_> {
        Shape::Opaque
    }
}

impl<T: Validatable> Validatable for &T {
    fn shape(&self) -> Shape<'_> {
        Shape::Indirect(*self)
    }
}

impl<T: Validatable> Validatable for &mut T {
    fn shape(&self) -> Shape<'_> {
        Shape::Indirect(&**self)
    }
}

impl<T: Validatable> Validatable for Box<T> {
    fn shape(&self) -> Shape<'_> {
        Shape::Indirect(&**self)
    }
}

impl<T: Validatable> Validatable for Rc<T> {
    fn shape(&self) -> Shape<'_> {
        Shape::Indirect(&**self)
    }
}

impl<T: Validatable> Validatable for Arc<T> {
    fn shape(&self) -> Shape<'_> {
        Shape::Indirect(&**self)
    }
}

/// Hand-built record for hosts that assemble (name, directives, value)
/// triples themselves instead of deriving [`Record`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldSet<'a> {
    fields: Vec<FieldDescriptor<'a>>,
}

impl<'a> FieldSet<'a> {
    /// Create an empty field set.
    #[must_use]
    pub const fn new() -> Self {
        Self { fields: Vec::new() }
    }

    /// Append a field, builder style.
    #[must_use]
    pub fn with_field(
        mut self,
        name: &'a str,
        directives: &'a str,
        value: FieldValue<'a>,
    ) -> Self {
        self.push(FieldDescriptor::new(name, directives, value));
        self
    }

    /// Append a field descriptor.
    pub fn push(&mut self, field: FieldDescriptor<'a>) {
        self.fields.push(field);
    }

    /// Number of fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true when no fields were added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<'a> FromIterator<FieldDescriptor<'a>> for FieldSet<'a> {
    fn from_iter<I: IntoIterator<Item = FieldDescriptor<'a>>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

impl Record for FieldSet<'_> {
    fn fields(&self) -> Vec<FieldDescriptor<'_>> {
        self.fields.clone()
    }
}

impl Validatable for FieldSet<'_> {
    fn shape(&self) -> Shape<'_> {
        Shape::Record(self)
    }
}

//! Declarative description of configuration record types.
//!
//! A record type describes itself through the [`Schema`] trait, usually via
//! `#[derive(Schema)]`. The description is a [`Shape`] tree: records list
//! their fields in declaration order together with each field's annotation
//! string, leaves carry a primitive [`Kind`], and wrapper types such as
//! `Option<T>` appear as [`Shape::Indirect`].
//!
//! ```rust,ignore
//! use smartconfig::Schema;
//!
//! #[derive(Schema)]
//! struct ServerConfig {
//!     #[flag("H|127.0.0.1|Listen {IP}")]
//!     ip: String,
//!
//!     #[flag("p|8080|Listen {Port}")]
//!     port: u16,
//! }
//! ```
//!
//! The derive expands to the equivalent of:
//!
//! ```rust,ignore
//! impl smartconfig::Schema for ServerConfig {
//!     fn shape() -> smartconfig::Shape {
//!         smartconfig::Shape::Record(vec![
//!             smartconfig::FieldShape::new("ip", "H|127.0.0.1|Listen {IP}", <String as Schema>::shape),
//!             smartconfig::FieldShape::new("port", "p|8080|Listen {Port}", <u16 as Schema>::shape),
//!         ])
//!     }
//! }
//! ```

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use crate::duration::Duration;

/// Primitive type tag of a leaf field.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Kind {
    /// `bool`
    Bool,
    /// `i8`
    I8,
    /// `i16`
    I16,
    /// `i32`
    I32,
    /// `i64`
    I64,
    /// `isize`
    Isize,
    /// `u8`
    U8,
    /// `u16`
    U16,
    /// `u32`
    U32,
    /// `u64`
    U64,
    /// `usize`
    Usize,
    /// `f32`
    F32,
    /// `f64`
    F64,
    /// `String`
    String,
    /// [`smartconfig::Duration`](crate::Duration)
    Duration,
    /// A leaf with no flag representation (sequences, maps).
    ///
    /// The payload names the type for debugging output.
    Unsupported(&'static str),
}

impl Kind {
    /// Type name shown as the flag's value name when the help text carries
    /// no `{placeholder}`.
    #[must_use]
    pub const fn type_name(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::I8 => "int8",
            Self::I16 => "int16",
            Self::I32 => "int32",
            Self::I64 => "int64",
            Self::Isize => "int",
            Self::U8 => "uint8",
            Self::U16 => "uint16",
            Self::U32 => "uint32",
            Self::U64 => "uint64",
            Self::Usize => "uint",
            Self::F32 => "float32",
            Self::F64 => "float64",
            Self::String => "string",
            Self::Duration => "duration",
            Self::Unsupported(name) => name,
        }
    }

    /// Whether the flag materializer can register this kind.
    #[must_use]
    pub const fn is_supported(self) -> bool {
        !matches!(self, Self::Unsupported(_))
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

/// Shape of a type as seen by the schema walker.
#[derive(Clone, Debug)]
pub enum Shape {
    /// Terminal field of a primitive kind.
    Leaf(Kind),

    /// Transparent wrapper (`Option<T>`, `Box<T>`); the walker continues on
    /// the inner shape with the same path and annotation.
    Indirect(Box<Shape>),

    /// Structured record whose fields are expanded in declaration order.
    Record(Vec<FieldShape>),
}

/// One declared field of a record.
#[derive(Clone)]
pub struct FieldShape {
    /// Field name as declared. The walker lower-cases it.
    pub name: &'static str,

    /// Raw annotation string (`short|default|help`), empty when absent.
    pub annotation: &'static str,

    /// Shape of the field's type, computed on demand.
    pub shape: fn() -> Shape,
}

impl FieldShape {
    /// Describe a field.
    #[must_use]
    pub const fn new(name: &'static str, annotation: &'static str, shape: fn() -> Shape) -> Self {
        Self {
            name,
            annotation,
            shape,
        }
    }
}

impl fmt::Debug for FieldShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldShape")
            .field("name", &self.name)
            .field("annotation", &self.annotation)
            .finish_non_exhaustive()
    }
}

/// Types that can describe their own configuration shape.
///
/// Implemented for the supported primitives, [`Duration`], `Option<T>`,
/// `Box<T>` and collections; derive it for records with
/// `#[derive(Schema)]`.
pub trait Schema {
    /// Describe this type.
    fn shape() -> Shape;
}

macro_rules! leaf_schema {
    ($($ty:ty => $kind:ident),* $(,)?) => {
        $(
            impl Schema for $ty {
                fn shape() -> Shape {
                    Shape::Leaf(Kind::$kind)
                }
            }
        )*
    };
}

leaf_schema! {
    bool => Bool,
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    isize => Isize,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    usize => Usize,
    f32 => F32,
    f64 => F64,
    String => String,
    Duration => Duration,
}

impl<T: Schema> Schema for Option<T> {
    fn shape() -> Shape {
        Shape::Indirect(Box::new(T::shape()))
    }
}

impl<T: Schema> Schema for Box<T> {
    fn shape() -> Shape {
        Shape::Indirect(Box::new(T::shape()))
    }
}

impl<T> Schema for Vec<T> {
    fn shape() -> Shape {
        Shape::Leaf(Kind::Unsupported("sequence"))
    }
}

impl<K, V, S> Schema for HashMap<K, V, S> {
    fn shape() -> Shape {
        Shape::Leaf(Kind::Unsupported("map"))
    }
}

impl<K, V> Schema for BTreeMap<K, V> {
    fn shape() -> Shape {
        Shape::Leaf(Kind::Unsupported("map"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primitive_shapes() {
        assert!(matches!(<bool as Schema>::shape(), Shape::Leaf(Kind::Bool)));
        assert!(matches!(<u16 as Schema>::shape(), Shape::Leaf(Kind::U16)));
        assert!(matches!(
            <String as Schema>::shape(),
            Shape::Leaf(Kind::String)
        ));
        assert!(matches!(
            <Duration as Schema>::shape(),
            Shape::Leaf(Kind::Duration)
        ));
    }

    #[test]
    fn test_wrappers_are_indirect() {
        match <Option<Box<i32>> as Schema>::shape() {
            Shape::Indirect(inner) => match *inner {
                Shape::Indirect(leaf) => assert!(matches!(*leaf, Shape::Leaf(Kind::I32))),
                other => panic!("expected nested indirection, got {other:?}"),
            },
            other => panic!("expected indirection, got {other:?}"),
        }
    }

    #[test]
    fn test_collections_are_unsupported() {
        match <Vec<String> as Schema>::shape() {
            Shape::Leaf(kind) => assert!(!kind.is_supported()),
            other => panic!("expected leaf, got {other:?}"),
        }
    }

    #[test]
    fn test_kind_type_names() {
        assert_eq!(Kind::Isize.type_name(), "int");
        assert_eq!(Kind::Duration.to_string(), "duration");
        assert_eq!(Kind::Unsupported("map").type_name(), "map");
    }
}

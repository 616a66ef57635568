//! Language-neutral descriptions of the values an operation accepts or returns.

use std::collections::HashMap;

use bytes::Bytes;
use serde_json::{Map, Value};

use crate::record::RecordType;

/// Scalar kinds with a fixed schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    String,
    Integer,
    Number,
    Boolean,
    /// Raw bytes, carried over JSON as standard base64 text.
    Binary,
}

/// The shape of a value expected by a parameter or produced by an operation.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeDescriptor {
    Null,
    Primitive(PrimitiveKind),
    /// Equivalent to `Union([inner, Null])`.
    Optional(Box<TypeDescriptor>),
    Union(Vec<TypeDescriptor>),
    /// An `Unknown` element means the sequence is unparameterized.
    Sequence(Box<TypeDescriptor>),
    /// An untyped JSON object.
    Mapping,
    Record(RecordType),
    /// Fallback for anything unrecognized; treated as a string.
    Unknown,
}

impl TypeDescriptor {
    pub fn string() -> Self {
        Self::Primitive(PrimitiveKind::String)
    }

    pub fn integer() -> Self {
        Self::Primitive(PrimitiveKind::Integer)
    }

    pub fn number() -> Self {
        Self::Primitive(PrimitiveKind::Number)
    }

    pub fn boolean() -> Self {
        Self::Primitive(PrimitiveKind::Boolean)
    }

    pub fn binary() -> Self {
        Self::Primitive(PrimitiveKind::Binary)
    }

    pub fn optional(inner: TypeDescriptor) -> Self {
        Self::Optional(Box::new(inner))
    }

    pub fn sequence(element: TypeDescriptor) -> Self {
        Self::Sequence(Box::new(element))
    }

    /// Non-null branches of an `Optional`/`Union`, with nested unions flattened.
    ///
    /// Any other descriptor is its own single alternative.
    pub fn non_null_alternatives(&self) -> Vec<&TypeDescriptor> {
        let mut out = Vec::new();
        self.collect_alternatives(&mut out);
        out
    }

    fn collect_alternatives<'a>(&'a self, out: &mut Vec<&'a TypeDescriptor>) {
        match self {
            Self::Null => {}
            Self::Optional(inner) => inner.collect_alternatives(out),
            Self::Union(alternatives) => {
                for alternative in alternatives {
                    alternative.collect_alternatives(out);
                }
            }
            other => out.push(other),
        }
    }

    /// `true` for `Optional(_)` and for any union admitting null.
    pub fn is_optional(&self) -> bool {
        match self {
            Self::Optional(_) => true,
            Self::Union(alternatives) => alternatives
                .iter()
                .any(|alternative| matches!(alternative, Self::Null) || alternative.is_optional()),
            _ => false,
        }
    }

    /// The single non-null branch of an optional or one-armed union, or `self`.
    pub fn collapsed(&self) -> &TypeDescriptor {
        match self {
            Self::Optional(_) | Self::Union(_) => match self.non_null_alternatives().as_slice() {
                [only] => only,
                _ => self,
            },
            _ => self,
        }
    }
}

/// Static mapping from a Rust type to its [`TypeDescriptor`].
///
/// Record types get an implementation from `#[derive(Record)]`.
pub trait Describe {
    fn describe() -> TypeDescriptor;
}

macro_rules! describe_as {
    ($descriptor:expr => $($ty:ty),+ $(,)?) => {
        $(
            impl Describe for $ty {
                fn describe() -> TypeDescriptor {
                    $descriptor
                }
            }
        )+
    };
}

describe_as!(TypeDescriptor::string() => String);
describe_as!(TypeDescriptor::integer() => i8, i16, i32, i64, u8, u16, u32, u64, usize, isize);
describe_as!(TypeDescriptor::number() => f32, f64);
describe_as!(TypeDescriptor::boolean() => bool);
describe_as!(TypeDescriptor::binary() => Bytes);
describe_as!(TypeDescriptor::Mapping => Map<String, Value>);
describe_as!(TypeDescriptor::Unknown => Value);
describe_as!(TypeDescriptor::Null => ());

impl<V> Describe for HashMap<String, V> {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::Mapping
    }
}

impl<T: Describe> Describe for Option<T> {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::optional(T::describe())
    }
}

impl<T: Describe> Describe for Vec<T> {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::sequence(T::describe())
    }
}

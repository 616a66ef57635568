//! Typed values exchanged between the marshaling layer and operations.

use std::any::type_name;
use std::collections::HashMap;

use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::decode::{json_kind, DecodeError};
use crate::record::Record;

/// A decoded argument or an operation's return value.
#[derive(Debug)]
pub enum TypedValue {
    Null,
    Bytes(Bytes),
    Record(Box<dyn Record>),
    Sequence(Vec<TypedValue>),
    /// A native JSON value passed through untouched.
    Json(Value),
}

impl TypedValue {
    pub fn is_null(&self) -> bool {
        matches!(self, TypedValue::Null | TypedValue::Json(Value::Null))
    }

    fn kind(&self) -> &'static str {
        match self {
            TypedValue::Null => "null",
            TypedValue::Bytes(_) => "bytes",
            TypedValue::Record(_) => "record",
            TypedValue::Sequence(_) => "sequence",
            TypedValue::Json(value) => json_kind(value),
        }
    }
}

/// Errors raised while an operation runs.
#[derive(Debug, Error)]
pub enum InvocationError {
    #[error("missing required argument `{0}`")]
    MissingArgument(String),

    #[error("argument `{name}`: {source}")]
    InvalidArgument {
        name: String,
        #[source]
        source: DecodeError,
    },

    /// A failure reported by the operation itself, tagged with its kind name.
    #[error("{message}")]
    Failed { kind: String, message: String },
}

impl InvocationError {
    pub fn failed(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Failed {
            kind: kind.into(),
            message: message.into(),
        }
    }

    pub fn kind(&self) -> &str {
        match self {
            Self::MissingArgument(_) => "MissingArgument",
            Self::InvalidArgument { .. } => "DecodeError",
            Self::Failed { kind, .. } => kind,
        }
    }
}

/// Extraction of a concrete Rust value from a [`TypedValue`].
pub trait FromTypedValue: Sized {
    fn from_typed_value(value: TypedValue) -> Result<Self, DecodeError>;

    /// Value to use when the caller did not supply the argument at all.
    fn missing() -> Option<Self> {
        None
    }
}

/// Conversion of an operation's return value into a [`TypedValue`].
pub trait IntoTypedValue {
    fn into_typed_value(self) -> TypedValue;
}

fn mismatch<T>(found: &TypedValue) -> DecodeError {
    DecodeError::Mismatch {
        expected: type_name::<T>(),
        found: found.kind(),
    }
}

fn from_json<T: DeserializeOwned>(value: TypedValue) -> Result<T, DecodeError> {
    match value {
        TypedValue::Json(raw) => serde_json::from_value(raw).map_err(|source| DecodeError::Json {
            expected: type_name::<T>(),
            source,
        }),
        TypedValue::Null => serde_json::from_value(Value::Null).map_err(|_| mismatch::<T>(&TypedValue::Null)),
        other => Err(mismatch::<T>(&other)),
    }
}

macro_rules! json_backed {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl FromTypedValue for $ty {
                fn from_typed_value(value: TypedValue) -> Result<Self, DecodeError> {
                    from_json(value)
                }
            }

            impl IntoTypedValue for $ty {
                fn into_typed_value(self) -> TypedValue {
                    TypedValue::Json(Value::from(self))
                }
            }
        )+
    };
}

json_backed!(String, bool, i8, i16, i32, i64, u8, u16, u32, u64, usize, isize, f32, f64);

impl FromTypedValue for Value {
    fn from_typed_value(value: TypedValue) -> Result<Self, DecodeError> {
        match value {
            TypedValue::Null => Ok(Value::Null),
            other => from_json(other),
        }
    }
}

impl IntoTypedValue for Value {
    fn into_typed_value(self) -> TypedValue {
        match self {
            Value::Null => TypedValue::Null,
            other => TypedValue::Json(other),
        }
    }
}

impl FromTypedValue for Map<String, Value> {
    fn from_typed_value(value: TypedValue) -> Result<Self, DecodeError> {
        from_json(value)
    }
}

impl IntoTypedValue for Map<String, Value> {
    fn into_typed_value(self) -> TypedValue {
        TypedValue::Json(Value::Object(self))
    }
}

impl<V: DeserializeOwned> FromTypedValue for HashMap<String, V> {
    fn from_typed_value(value: TypedValue) -> Result<Self, DecodeError> {
        from_json(value)
    }
}

impl FromTypedValue for Bytes {
    fn from_typed_value(value: TypedValue) -> Result<Self, DecodeError> {
        match value {
            TypedValue::Bytes(bytes) => Ok(bytes),
            other => Err(mismatch::<Bytes>(&other)),
        }
    }
}

impl IntoTypedValue for Bytes {
    fn into_typed_value(self) -> TypedValue {
        TypedValue::Bytes(self)
    }
}

impl IntoTypedValue for () {
    fn into_typed_value(self) -> TypedValue {
        TypedValue::Null
    }
}

impl<T: FromTypedValue> FromTypedValue for Option<T> {
    fn from_typed_value(value: TypedValue) -> Result<Self, DecodeError> {
        if value.is_null() {
            Ok(None)
        } else {
            T::from_typed_value(value).map(Some)
        }
    }

    fn missing() -> Option<Self> {
        Some(None)
    }
}

impl<T: IntoTypedValue> IntoTypedValue for Option<T> {
    fn into_typed_value(self) -> TypedValue {
        match self {
            Some(value) => value.into_typed_value(),
            None => TypedValue::Null,
        }
    }
}

impl<T: FromTypedValue> FromTypedValue for Vec<T> {
    fn from_typed_value(value: TypedValue) -> Result<Self, DecodeError> {
        match value {
            TypedValue::Sequence(items) => items.into_iter().map(T::from_typed_value).collect(),
            TypedValue::Json(Value::Array(items)) => items
                .into_iter()
                .map(|item| T::from_typed_value(TypedValue::Json(item)))
                .collect(),
            other => Err(mismatch::<Vec<T>>(&other)),
        }
    }
}

impl<T: IntoTypedValue> IntoTypedValue for Vec<T> {
    fn into_typed_value(self) -> TypedValue {
        TypedValue::Sequence(self.into_iter().map(IntoTypedValue::into_typed_value).collect())
    }
}

/// Recover a record of type `T`, either already constructed or still raw JSON.
pub fn record_from_typed_value<T>(value: TypedValue) -> Result<T, DecodeError>
where
    T: DeserializeOwned + Record,
{
    match value {
        TypedValue::Record(record) => {
            let found = record.record_name();
            record
                .into_any()
                .downcast::<T>()
                .map(|record| *record)
                .map_err(|_| DecodeError::Mismatch {
                    expected: type_name::<T>(),
                    found,
                })
        }
        TypedValue::Json(raw) => {
            serde_json::from_value(raw).map_err(|source| DecodeError::InvalidRecord {
                record: type_name::<T>(),
                source,
            })
        }
        other => Err(mismatch::<T>(&other)),
    }
}

/// Decoded arguments of one invocation, keyed by parameter name.
#[derive(Debug, Default)]
pub struct Arguments {
    values: HashMap<String, TypedValue>,
}

impl Arguments {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: TypedValue) {
        self.values.insert(name.into(), value);
    }

    pub fn with(mut self, name: impl Into<String>, value: impl IntoTypedValue) -> Self {
        self.insert(name, value.into_typed_value());
        self
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Remove and convert an argument.
    ///
    /// An absent argument is an error unless `T` is optional.
    pub fn take<T: FromTypedValue>(&mut self, name: &str) -> Result<T, InvocationError> {
        match self.values.remove(name) {
            Some(value) => convert(name, value),
            None => T::missing().ok_or_else(|| InvocationError::MissingArgument(name.to_string())),
        }
    }

    /// Remove and convert an argument, falling back to `default` when it is
    /// absent or null.
    pub fn take_or_else<T, F>(&mut self, name: &str, default: F) -> Result<T, InvocationError>
    where
        T: FromTypedValue,
        F: FnOnce() -> T,
    {
        match self.values.remove(name) {
            Some(value) if !value.is_null() => convert(name, value),
            _ => Ok(default()),
        }
    }
}

fn convert<T: FromTypedValue>(name: &str, value: TypedValue) -> Result<T, InvocationError> {
    T::from_typed_value(value).map_err(|source| InvocationError::InvalidArgument {
        name: name.to_string(),
        source,
    })
}

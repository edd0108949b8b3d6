use crate::{
    Blob, Value,
    error::{Error, Result},
    parse::parse_datetime,
};
use std::any;
use time::{OffsetDateTime, UtcOffset, macros::format_description};
use uuid::Uuid;

/// Bidirectional conversion between a host primitive and an SQLite storage
/// value. Decoding is total: it either produces the host value or a
/// [`Error::TypeMismatch`]; out-of-range and non-exact conversions are
/// rejected, never wrapped.
pub trait AsValue {
    fn as_value(self) -> Value;
    fn try_from_value(value: Value) -> Result<Self>
    where
        Self: Sized;
}

pub(crate) fn mismatch<T>(value: &Value) -> Error {
    Error::TypeMismatch {
        target: any::type_name::<T>(),
        found: value.storage_class(),
    }
}

/// A REAL coerces to an integer only when it is integral and exactly
/// representable in an i64. The upper bound is exclusive: 2^63 is a valid
/// f64 but one past i64::MAX.
fn real_to_integer(v: f64) -> Option<i64> {
    if v.fract() == 0.0 && v >= i64::MIN as f64 && v < i64::MAX as f64 {
        Some(v as i64)
    } else {
        None
    }
}

impl AsValue for bool {
    fn as_value(self) -> Value {
        Value::Integer(self as i64)
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match value {
            Value::Integer(v) => Ok(v != 0),
            other => Err(mismatch::<Self>(&other)),
        }
    }
}

macro_rules! impl_integer_as_value {
    ($($source:ty),+ $(,)?) => {$(
        impl AsValue for $source {
            fn as_value(self) -> Value {
                Value::Integer(self as i64)
            }
            fn try_from_value(value: Value) -> Result<Self> {
                match &value {
                    Value::Integer(v) => Some(*v),
                    Value::Real(v) => real_to_integer(*v),
                    _ => None,
                }
                .and_then(|v| <$source>::try_from(v).ok())
                .ok_or_else(|| mismatch::<Self>(&value))
            }
        }
    )+};
}

impl_integer_as_value!(i8, i16, i32, i64, u8, u16, u32);

impl AsValue for f64 {
    fn as_value(self) -> Value {
        Value::Real(self)
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match value {
            Value::Real(v) => Ok(v),
            Value::Integer(v) => Ok(v as f64),
            other => Err(mismatch::<Self>(&other)),
        }
    }
}

impl AsValue for f32 {
    fn as_value(self) -> Value {
        Value::Real(self as f64)
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match value {
            Value::Real(v) => Ok(v as f32),
            Value::Integer(v) => Ok(v as f32),
            other => Err(mismatch::<Self>(&other)),
        }
    }
}

impl AsValue for String {
    fn as_value(self) -> Value {
        Value::Text(self)
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match value {
            Value::Text(v) => Ok(v),
            other => Err(mismatch::<Self>(&other)),
        }
    }
}

impl AsValue for Blob {
    fn as_value(self) -> Value {
        Value::Blob(self)
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match value {
            Value::Blob(v) => Ok(v),
            other => Err(mismatch::<Self>(&other)),
        }
    }
}

impl AsValue for Vec<u8> {
    fn as_value(self) -> Value {
        Value::Blob(self.into())
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match value {
            Value::Blob(Blob::Empty) => Ok(Vec::new()),
            Value::Blob(Blob::Loaded(v)) => Ok(v.into_vec()),
            other => Err(mismatch::<Self>(&other)),
        }
    }
}

impl AsValue for Box<[u8]> {
    fn as_value(self) -> Value {
        Value::Blob(self.into_vec().into())
    }
    fn try_from_value(value: Value) -> Result<Self> {
        Vec::<u8>::try_from_value(value).map(Vec::into_boxed_slice)
    }
}

impl AsValue for OffsetDateTime {
    fn as_value(self) -> Value {
        let text = self
            .to_offset(UtcOffset::UTC)
            .format(format_description!(
                "[year]-[month]-[day] [hour]:[minute]:[second].[subsecond digits:3]Z"
            ))
            .expect("formatting a UTC datetime cannot fail");
        Value::Text(text)
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match &value {
            // whole seconds since the Unix epoch
            Value::Integer(v) => {
                OffsetDateTime::from_unix_timestamp(*v).map_err(|_| mismatch::<Self>(&value))
            }
            // fractional epoch seconds, millisecond resolution
            Value::Real(v) => {
                let millis = (v * 1000.0).round();
                if !millis.is_finite() {
                    return Err(mismatch::<Self>(&value));
                }
                OffsetDateTime::from_unix_timestamp_nanos(millis as i128 * 1_000_000)
                    .map_err(|_| mismatch::<Self>(&value))
            }
            Value::Text(v) => parse_datetime(v),
            _ => Err(mismatch::<Self>(&value)),
        }
    }
}

impl AsValue for Uuid {
    fn as_value(self) -> Value {
        Value::Text(self.hyphenated().to_string())
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match &value {
            Value::Text(v) => Uuid::parse_str(v).map_err(|_| mismatch::<Self>(&value)),
            Value::Blob(v) => Uuid::from_slice(v.as_bytes()).map_err(|_| mismatch::<Self>(&value)),
            _ => Err(mismatch::<Self>(&value)),
        }
    }
}

impl AsValue for Value {
    fn as_value(self) -> Value {
        self
    }
    fn try_from_value(value: Value) -> Result<Self> {
        Ok(value)
    }
}

impl<T: AsValue> AsValue for Option<T> {
    fn as_value(self) -> Value {
        match self {
            Some(v) => v.as_value(),
            None => Value::Null,
        }
    }
    fn try_from_value(value: Value) -> Result<Self> {
        if value.is_null() {
            Ok(None)
        } else {
            T::try_from_value(value).map(Some)
        }
    }
}

macro_rules! impl_value_from {
    ($($source:ty),+ $(,)?) => {$(
        impl From<$source> for Value {
            fn from(value: $source) -> Self {
                value.as_value()
            }
        }
    )+};
}

impl_value_from!(
    bool,
    i8,
    i16,
    i32,
    i64,
    u8,
    u16,
    u32,
    f32,
    f64,
    String,
    Blob,
    Vec<u8>,
    Box<[u8]>,
    OffsetDateTime,
    Uuid,
);

impl<T: AsValue> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.as_value()
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.into())
    }
}

impl From<&[u8]> for Value {
    fn from(value: &[u8]) -> Self {
        Value::Blob(value.into())
    }
}

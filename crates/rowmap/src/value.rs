//! Driver-level values and conversions between them and Rust types.
//!
//! Every argument bound to a statement and every column read back from a row
//! travels as a [`Value`]. [`ToValue`] and [`FromValue`] connect record fields
//! to that representation; text and byte payloads are parsed with the target
//! type's standard grammar, which is how text-protocol drivers hand numbers back.

use crate::error::{OrmError, OrmResult};
use chrono::{DateTime, NaiveDateTime, Utc};

/// A single positional argument or column value.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Int(i64),
    UInt(u64),
    Float(f64),
    Bool(bool),
    Text(String),
    Bytes(Vec<u8>),
    Time(DateTime<Utc>),
}

impl Value {
    /// Short name of the variant, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Int(_) => "int",
            Value::UInt(_) => "uint",
            Value::Float(_) => "float",
            Value::Bool(_) => "bool",
            Value::Text(_) => "text",
            Value::Bytes(_) => "bytes",
            Value::Time(_) => "time",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Whether the value equals the zero value of its kind.
    ///
    /// A primary key holding a zero value is left out of inserts so the
    /// database can assign one.
    pub fn is_zero(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Int(v) => *v == 0,
            Value::UInt(v) => *v == 0,
            Value::Float(v) => *v == 0.0,
            Value::Bool(v) => !*v,
            Value::Text(v) => v.is_empty(),
            Value::Bytes(v) => v.is_empty(),
            Value::Time(v) => *v == DateTime::<Utc>::default(),
        }
    }
}

/// Convert a Rust value into a [`Value`] argument.
pub trait ToValue {
    fn to_value(&self) -> Value;
}

/// Build a Rust value out of a [`Value`] read from a row.
pub trait FromValue: Sized {
    fn from_value(value: Value) -> OrmResult<Self>;
}

/// Build a `Vec<Value>` from a list of expressions implementing [`ToValue`].
///
/// ```ignore
/// let args = rowmap::args![5, "foo", true];
/// ```
#[macro_export]
macro_rules! args {
    () => { ::std::vec::Vec::<$crate::Value>::new() };
    ($($arg:expr),+ $(,)?) => {
        ::std::vec![$($crate::ToValue::to_value(&$arg)),+]
    };
}

fn mismatch(expected: &str, found: &Value) -> OrmError {
    OrmError::decode("", format!("expected {expected}, found {}", found.kind()))
}

fn out_of_range(expected: &str, found: impl std::fmt::Display) -> OrmError {
    OrmError::decode("", format!("{found} is out of range for {expected}"))
}

fn bytes_to_text(kind: &'static str, bytes: Vec<u8>) -> OrmResult<String> {
    String::from_utf8(bytes).map_err(|e| OrmError::parse(kind, "<bytes>", e))
}

// ==================== Identity ====================

impl ToValue for Value {
    fn to_value(&self) -> Value {
        self.clone()
    }
}

impl FromValue for Value {
    fn from_value(value: Value) -> OrmResult<Self> {
        Ok(value)
    }
}

impl<T: ToValue + ?Sized> ToValue for &T {
    fn to_value(&self) -> Value {
        (**self).to_value()
    }
}

// ==================== Integers ====================

macro_rules! impl_signed {
    ($($ty:ty),*) => {$(
        impl ToValue for $ty {
            fn to_value(&self) -> Value {
                Value::Int(*self as i64)
            }
        }

        impl FromValue for $ty {
            fn from_value(value: Value) -> OrmResult<Self> {
                match value {
                    Value::Int(v) => <$ty>::try_from(v).map_err(|_| out_of_range(stringify!($ty), v)),
                    Value::UInt(v) => <$ty>::try_from(v).map_err(|_| out_of_range(stringify!($ty), v)),
                    Value::Text(s) => parse_text(stringify!($ty), &s),
                    Value::Bytes(b) => parse_text(stringify!($ty), &bytes_to_text(stringify!($ty), b)?),
                    other => Err(mismatch(stringify!($ty), &other)),
                }
            }
        }
    )*};
}

macro_rules! impl_unsigned {
    ($($ty:ty),*) => {$(
        impl ToValue for $ty {
            fn to_value(&self) -> Value {
                Value::UInt(*self as u64)
            }
        }

        impl FromValue for $ty {
            fn from_value(value: Value) -> OrmResult<Self> {
                match value {
                    Value::Int(v) => <$ty>::try_from(v).map_err(|_| out_of_range(stringify!($ty), v)),
                    Value::UInt(v) => <$ty>::try_from(v).map_err(|_| out_of_range(stringify!($ty), v)),
                    Value::Text(s) => parse_text(stringify!($ty), &s),
                    Value::Bytes(b) => parse_text(stringify!($ty), &bytes_to_text(stringify!($ty), b)?),
                    other => Err(mismatch(stringify!($ty), &other)),
                }
            }
        }
    )*};
}

impl_signed!(i8, i16, i32, i64, isize);
impl_unsigned!(u8, u16, u32, u64, usize);

fn parse_text<T>(kind: &'static str, text: &str) -> OrmResult<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    text.trim()
        .parse::<T>()
        .map_err(|e| OrmError::parse(kind, text, e))
}

// ==================== Floats ====================

macro_rules! impl_float {
    ($($ty:ty),*) => {$(
        impl ToValue for $ty {
            fn to_value(&self) -> Value {
                Value::Float(*self as f64)
            }
        }

        impl FromValue for $ty {
            fn from_value(value: Value) -> OrmResult<Self> {
                match value {
                    Value::Float(v) => Ok(v as $ty),
                    Value::Int(v) => Ok(v as $ty),
                    Value::UInt(v) => Ok(v as $ty),
                    Value::Text(s) => parse_text(stringify!($ty), &s),
                    Value::Bytes(b) => parse_text(stringify!($ty), &bytes_to_text(stringify!($ty), b)?),
                    other => Err(mismatch(stringify!($ty), &other)),
                }
            }
        }
    )*};
}

impl_float!(f32, f64);

// ==================== Bool ====================

impl ToValue for bool {
    fn to_value(&self) -> Value {
        Value::Bool(*self)
    }
}

impl FromValue for bool {
    fn from_value(value: Value) -> OrmResult<Self> {
        match value {
            Value::Bool(v) => Ok(v),
            Value::Int(v) => Ok(v != 0),
            Value::UInt(v) => Ok(v != 0),
            Value::Text(s) => parse_bool(&s),
            Value::Bytes(b) => parse_bool(&bytes_to_text("bool", b)?),
            other => Err(mismatch("bool", &other)),
        }
    }
}

fn parse_bool(text: &str) -> OrmResult<bool> {
    match text.trim() {
        "1" | "t" | "T" | "true" | "TRUE" | "True" => Ok(true),
        "0" | "f" | "F" | "false" | "FALSE" | "False" => Ok(false),
        _ => Err(OrmError::parse("bool", text, "invalid syntax")),
    }
}

// ==================== Text & bytes ====================

impl ToValue for str {
    fn to_value(&self) -> Value {
        Value::Text(self.to_string())
    }
}

impl ToValue for String {
    fn to_value(&self) -> Value {
        Value::Text(self.clone())
    }
}

impl FromValue for String {
    fn from_value(value: Value) -> OrmResult<Self> {
        match value {
            Value::Text(s) => Ok(s),
            Value::Bytes(b) => bytes_to_text("string", b),
            other => Err(mismatch("string", &other)),
        }
    }
}

impl ToValue for Vec<u8> {
    fn to_value(&self) -> Value {
        Value::Bytes(self.clone())
    }
}

impl ToValue for [u8] {
    fn to_value(&self) -> Value {
        Value::Bytes(self.to_vec())
    }
}

impl FromValue for Vec<u8> {
    fn from_value(value: Value) -> OrmResult<Self> {
        match value {
            Value::Bytes(b) => Ok(b),
            Value::Text(s) => Ok(s.into_bytes()),
            other => Err(mismatch("bytes", &other)),
        }
    }
}

// ==================== Time ====================

const TIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

pub(crate) fn parse_time(text: &str) -> OrmResult<DateTime<Utc>> {
    let trimmed = text.trim();
    if let Ok(t) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(t.with_timezone(&Utc));
    }
    for format in TIME_FORMATS {
        if let Ok(t) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(t.and_utc());
        }
    }
    Err(OrmError::parse("time", text, "expected RFC 3339 or YYYY-MM-DD HH:MM:SS"))
}

impl ToValue for DateTime<Utc> {
    fn to_value(&self) -> Value {
        Value::Time(*self)
    }
}

impl FromValue for DateTime<Utc> {
    fn from_value(value: Value) -> OrmResult<Self> {
        match value {
            Value::Time(t) => Ok(t),
            Value::Text(s) => parse_time(&s),
            Value::Bytes(b) => parse_time(&bytes_to_text("time", b)?),
            other => Err(mismatch("time", &other)),
        }
    }
}

impl ToValue for NaiveDateTime {
    fn to_value(&self) -> Value {
        Value::Time(self.and_utc())
    }
}

impl FromValue for NaiveDateTime {
    fn from_value(value: Value) -> OrmResult<Self> {
        DateTime::<Utc>::from_value(value).map(|t| t.naive_utc())
    }
}

// ==================== Option ====================

impl<T: ToValue> ToValue for Option<T> {
    fn to_value(&self) -> Value {
        match self {
            Some(v) => v.to_value(),
            None => Value::Null,
        }
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: Value) -> OrmResult<Self> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

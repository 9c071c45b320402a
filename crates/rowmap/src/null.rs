//! Nullable scalar adapters.
//!
//! [`Null<T>`] pairs a validity flag with a payload. It scans from the wire
//! (`NULL` clears it, a native value is stored, text is parsed), turns back
//! into a wire [`Value`], and (de)serializes as JSON `null` or the literal.
//!
//! ```ignore
//! let mut age = NullInt64::null();
//! age.scan(Value::Text("42".into()))?;
//! assert_eq!(age.value(), Value::Int(42));
//! ```

use crate::error::OrmResult;
use crate::value::{FromValue, ToValue, Value};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// An optional scalar that knows how to cross the driver boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Null<T>(Option<T>);

pub type NullInt = Null<isize>;
pub type NullInt32 = Null<i32>;
pub type NullInt64 = Null<i64>;
pub type NullUint = Null<usize>;
pub type NullUint32 = Null<u32>;
pub type NullUint64 = Null<u64>;
pub type NullFloat32 = Null<f32>;
pub type NullFloat64 = Null<f64>;
pub type NullBool = Null<bool>;
pub type NullString = Null<String>;
pub type NullTime = Null<DateTime<Utc>>;
pub type NullBytes = Null<Vec<u8>>;

impl<T> Null<T> {
    /// A valid adapter holding `value`.
    pub fn new(value: T) -> Self {
        Self(Some(value))
    }

    /// An invalid (absent) adapter.
    pub fn null() -> Self {
        Self(None)
    }

    pub fn is_valid(&self) -> bool {
        self.0.is_some()
    }

    pub fn get(&self) -> Option<&T> {
        self.0.as_ref()
    }

    pub fn set(&mut self, value: T) {
        self.0 = Some(value);
    }

    pub fn clear(&mut self) {
        self.0 = None;
    }

    pub fn into_option(self) -> Option<T> {
        self.0
    }
}

impl<T: FromValue> Null<T> {
    /// Load the adapter from a wire value.
    ///
    /// `NULL` marks it invalid and drops any previous payload. Malformed text
    /// leaves the adapter untouched and returns a parse error.
    pub fn scan(&mut self, value: Value) -> OrmResult<()> {
        self.0 = match value {
            Value::Null => None,
            other => Some(T::from_value(other)?),
        };
        Ok(())
    }
}

impl<T: ToValue> Null<T> {
    /// The wire value: `NULL` when invalid, the native payload otherwise.
    pub fn value(&self) -> Value {
        match &self.0 {
            Some(v) => v.to_value(),
            None => Value::Null,
        }
    }
}

impl<T> From<Option<T>> for Null<T> {
    fn from(value: Option<T>) -> Self {
        Self(value)
    }
}

impl<T> From<Null<T>> for Option<T> {
    fn from(value: Null<T>) -> Self {
        value.0
    }
}

impl<T: ToValue> ToValue for Null<T> {
    fn to_value(&self) -> Value {
        self.value()
    }
}

impl<T: FromValue> FromValue for Null<T> {
    fn from_value(value: Value) -> OrmResult<Self> {
        let mut out = Self::null();
        out.scan(value)?;
        Ok(out)
    }
}

impl<T: Serialize> Serialize for Null<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Null<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Option::<T>::deserialize(deserializer).map(Self)
    }
}

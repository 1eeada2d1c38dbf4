//! Model value types.
//!
//! The [`Value`] enum is the currency of formbind: raw form input arrives as
//! `Value::String`, normalized values carry their domain type, and models
//! expose their properties as `Value`s. [`FromValue`] converts back into the
//! concrete Rust types of a model's fields.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;

use crate::error::DbError;
use crate::key::Key;

/// Property name to value, ordered by name.
pub type ValueMap = BTreeMap<String, Value>;

/// A dynamically typed property value.
///
/// # Examples
///
/// ```
/// use formbind_db::value::Value;
///
/// assert_eq!(Value::from(42_i64), Value::Int(42));
/// assert_eq!(Value::from("hello"), Value::String("hello".to_string()));
/// assert!(Value::from("").is_empty());
/// assert!(Value::from(None::<i64>).is_null());
/// ```
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum Value {
    /// No value.
    Null,
    /// A boolean value.
    Bool(bool),
    /// A 64-bit signed integer.
    Int(i64),
    /// A 64-bit floating-point number.
    Float(f64),
    /// An exact decimal number.
    Decimal(Decimal),
    /// A UTF-8 string.
    String(String),
    /// A date without time.
    Date(NaiveDate),
    /// A date and time without timezone, by convention in UTC.
    DateTime(NaiveDateTime),
    /// A reference to another entity.
    Key(Key),
    /// The values of a repeated property.
    List(Vec<Value>),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "None"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Decimal(d) => write!(f, "{d}"),
            Self::String(s) => write!(f, "{s}"),
            Self::Date(d) => write!(f, "{d}"),
            Self::DateTime(dt) => write!(f, "{dt}"),
            Self::Key(k) => write!(f, "{k}"),
            Self::List(vals) => {
                write!(f, "[")?;
                for (i, v) in vals.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{v}")?;
                }
                write!(f, "]")
            }
        }
    }
}

// ── From implementations ───────────────────────────────────────────────

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<Decimal> for Value {
    fn from(v: Decimal) -> Self {
        Self::Decimal(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<NaiveDate> for Value {
    fn from(v: NaiveDate) -> Self {
        Self::Date(v)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(v: NaiveDateTime) -> Self {
        Self::DateTime(v)
    }
}

impl From<Key> for Value {
    fn from(v: Key) -> Self {
        Self::Key(v)
    }
}

impl<T: Into<Self>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Self::List(v.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Self>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(inner) => inner.into(),
            None => Self::Null,
        }
    }
}

impl Value {
    /// Returns `true` if this value is `Null`.
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns `true` for `Null` and the empty string, the two spellings of
    /// "nothing was entered".
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Null => true,
            Self::String(s) => s.is_empty(),
            _ => false,
        }
    }

    /// Returns `true` for values that count as false: `Null`, `false`, zero,
    /// empty strings and empty lists.
    pub fn is_falsy(&self) -> bool {
        match self {
            Self::Null => true,
            Self::Bool(b) => !b,
            Self::Int(i) => *i == 0,
            Self::Float(f) => *f == 0.0,
            Self::Decimal(d) => d.is_zero(),
            Self::String(s) => s.is_empty(),
            Self::List(l) => l.is_empty(),
            Self::Date(_) | Self::DateTime(_) | Self::Key(_) => false,
        }
    }

    /// A short name of the variant, used in error messages.
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Decimal(_) => "decimal",
            Self::String(_) => "string",
            Self::Date(_) => "date",
            Self::DateTime(_) => "datetime",
            Self::Key(_) => "key",
            Self::List(_) => "list",
        }
    }

    /// The boolean, if this is one.
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// The integer, if this is one. Floats and decimals are not converted.
    pub const fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub const fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// The text of a `String` value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub const fn as_key(&self) -> Option<&Key> {
        match self {
            Self::Key(k) => Some(k),
            _ => None,
        }
    }

    /// The elements of a `List` value.
    pub fn as_list(&self) -> Option<&[Self]> {
        match self {
            Self::List(l) => Some(l),
            _ => None,
        }
    }

    /// Converts a numeric value (or a numeric string) to an exact decimal.
    pub fn to_decimal(&self) -> Option<Decimal> {
        match self {
            Self::Int(i) => Some(Decimal::from(*i)),
            Self::Float(f) => Decimal::from_str(&f.to_string())
                .ok()
                .or_else(|| Decimal::from_f64(*f)),
            Self::Decimal(d) => Some(*d),
            Self::String(s) => Decimal::from_str(s.trim()).ok(),
            _ => None,
        }
    }

    /// Orders two numeric values regardless of their numeric variant.
    ///
    /// Returns `None` when either side is not a number.
    pub fn compare_numeric(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Self::Int(a), Self::Int(b)) => Some(a.cmp(b)),
            (Self::Float(a), Self::Float(b)) => a.partial_cmp(b),
            #[allow(clippy::cast_precision_loss)]
            (Self::Float(a), Self::Int(b)) => a.partial_cmp(&(*b as f64)),
            #[allow(clippy::cast_precision_loss)]
            (Self::Int(a), Self::Float(b)) => (*a as f64).partial_cmp(b),
            (Self::Int(_) | Self::Float(_) | Self::Decimal(_), Self::Decimal(_))
            | (Self::Decimal(_), Self::Int(_) | Self::Float(_)) => {
                Some(self.to_decimal()?.cmp(&other.to_decimal()?))
            }
            _ => None,
        }
    }

    /// Equality that treats numbers of different variants as equal when
    /// they hold the same amount: `Int(1)`, `Float(1.0)` and `Decimal(1.00)`.
    pub fn loose_eq(&self, other: &Self) -> bool {
        self.compare_numeric(other)
            .map_or_else(|| self == other, Ordering::is_eq)
    }
}

// ── FromValue ──────────────────────────────────────────────────────────

/// Conversion from a [`Value`] into a concrete field type.
///
/// Implemented for the field types `#[derive(Model)]` supports. `Option<T>`
/// maps `Null` to `None`, `Vec<T>` maps `Null` to an empty vector.
pub trait FromValue: Sized {
    /// Converts `value`, failing with [`DbError::TypeMismatch`].
    fn from_value(value: Value) -> Result<Self, DbError>;
}

fn mismatch(expected: &'static str, found: &Value) -> DbError {
    DbError::TypeMismatch {
        expected,
        found: format!("{} {found}", found.type_name()),
    }
}

impl FromValue for Value {
    fn from_value(value: Value) -> Result<Self, DbError> {
        Ok(value)
    }
}

impl FromValue for bool {
    fn from_value(value: Value) -> Result<Self, DbError> {
        value.as_bool().ok_or_else(|| mismatch("bool", &value))
    }
}

impl FromValue for i64 {
    fn from_value(value: Value) -> Result<Self, DbError> {
        value.as_int().ok_or_else(|| mismatch("int", &value))
    }
}

impl FromValue for f64 {
    fn from_value(value: Value) -> Result<Self, DbError> {
        match value {
            Value::Float(f) => Ok(f),
            #[allow(clippy::cast_precision_loss)]
            Value::Int(i) => Ok(i as f64),
            other => Err(mismatch("float", &other)),
        }
    }
}

impl FromValue for Decimal {
    fn from_value(value: Value) -> Result<Self, DbError> {
        match value {
            Value::Int(_) | Value::Float(_) | Value::Decimal(_) => {
                value.to_decimal().ok_or_else(|| mismatch("decimal", &value))
            }
            other => Err(mismatch("decimal", &other)),
        }
    }
}

impl FromValue for String {
    fn from_value(value: Value) -> Result<Self, DbError> {
        match value {
            Value::String(s) => Ok(s),
            other => Err(mismatch("string", &other)),
        }
    }
}

impl FromValue for NaiveDate {
    fn from_value(value: Value) -> Result<Self, DbError> {
        match value {
            Value::Date(d) => Ok(d),
            Value::DateTime(dt) => Ok(dt.date()),
            other => Err(mismatch("date", &other)),
        }
    }
}

impl FromValue for NaiveDateTime {
    fn from_value(value: Value) -> Result<Self, DbError> {
        match value {
            Value::DateTime(dt) => Ok(dt),
            other => Err(mismatch("datetime", &other)),
        }
    }
}

impl FromValue for Key {
    fn from_value(value: Value) -> Result<Self, DbError> {
        match value {
            Value::Key(k) => Ok(k),
            other => Err(mismatch("key", &other)),
        }
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: Value) -> Result<Self, DbError> {
        if value.is_null() {
            Ok(None)
        } else {
            T::from_value(value).map(Some)
        }
    }
}

impl<T: FromValue> FromValue for Vec<T> {
    fn from_value(value: Value) -> Result<Self, DbError> {
        match value {
            Value::Null => Ok(Vec::new()),
            Value::List(items) => items.into_iter().map(T::from_value).collect(),
            other => Err(mismatch("list", &other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Value::Int(1), Value::Float(1.0), true)]
    #[case(Value::Float(1.0), Value::Int(1), true)]
    #[case(Value::Int(1), Value::Decimal(Decimal::new(100, 2)), true)]
    #[case(Value::Decimal(Decimal::new(15, 1)), Value::Float(1.5), true)]
    #[case(Value::Int(1), Value::Float(1.5), false)]
    #[case(Value::Int(1), Value::from("1"), false)]
    #[case(Value::from("a"), Value::from("a"), true)]
    #[case(Value::Null, Value::Null, true)]
    fn test_loose_eq(#[case] left: Value, #[case] right: Value, #[case] expected: bool) {
        assert_eq!(left.loose_eq(&right), expected);
    }

    #[test]
    fn test_accessors() {
        let key = Key::new("Note", 7).unwrap();
        assert_eq!(Value::Bool(true).as_bool(), Some(true));
        assert_eq!(Value::Int(3).as_int(), Some(3));
        assert_eq!(Value::Float(3.0).as_int(), None);
        assert_eq!(Value::Float(2.5).as_float(), Some(2.5));
        assert_eq!(Value::from("a").as_str(), Some("a"));
        assert_eq!(Value::Key(key.clone()).as_key(), Some(&key));
        assert_eq!(Value::from(vec!["a"]).as_list().map(<[Value]>::len), Some(1));
        assert_eq!(Value::Null.as_list(), None);
    }

    #[test]
    fn test_from_conversions() {
        assert_eq!(Value::from(true), Value::Bool(true));
        assert_eq!(Value::from(42_i32), Value::Int(42));
        assert_eq!(Value::from(1.5_f64), Value::Float(1.5));
        assert_eq!(
            Value::from(vec![1_i64, 2]),
            Value::List(vec![Value::Int(1), Value::Int(2)])
        );
        assert_eq!(Value::from(Some("x")), Value::String("x".into()));
    }

    #[rstest]
    #[case(Value::Null, true)]
    #[case(Value::String(String::new()), true)]
    #[case(Value::Int(0), false)]
    #[case(Value::Bool(false), false)]
    #[case(Value::List(vec![]), false)]
    fn test_is_empty(#[case] value: Value, #[case] expected: bool) {
        assert_eq!(value.is_empty(), expected);
    }

    #[rstest]
    #[case(Value::Int(0), true)]
    #[case(Value::Float(0.0), true)]
    #[case(Value::Decimal(Decimal::ZERO), true)]
    #[case(Value::List(vec![]), true)]
    #[case(Value::Bool(true), false)]
    #[case(Value::String("0".into()), false)]
    fn test_is_falsy(#[case] value: Value, #[case] expected: bool) {
        assert_eq!(value.is_falsy(), expected);
    }

    #[test]
    fn test_display() {
        assert_eq!(Value::Null.to_string(), "None");
        assert_eq!(Value::Decimal(Decimal::new(134, 2)).to_string(), "1.34");
        assert_eq!(
            Value::List(vec![Value::Int(1), Value::from("a")]).to_string(),
            "[1, a]"
        );
    }

    #[test]
    fn test_to_decimal() {
        assert_eq!(Value::Int(3).to_decimal(), Some(Decimal::from(3)));
        assert_eq!(
            Value::Float(1.117).to_decimal(),
            Some(Decimal::from_str("1.117").unwrap())
        );
        assert_eq!(
            Value::from("0.001").to_decimal(),
            Some(Decimal::from_str("0.001").unwrap())
        );
        assert_eq!(Value::Bool(true).to_decimal(), None);
    }

    #[test]
    fn test_compare_numeric_across_variants() {
        assert_eq!(
            Value::Int(1).compare_numeric(&Value::Float(1.5)),
            Some(Ordering::Less)
        );
        assert_eq!(
            Value::Decimal(Decimal::new(100, 2)).compare_numeric(&Value::Int(1)),
            Some(Ordering::Equal)
        );
        assert_eq!(Value::from("1").compare_numeric(&Value::Int(1)), None);
    }

    #[test]
    fn test_from_value_scalars() {
        assert_eq!(i64::from_value(Value::Int(5)).unwrap(), 5);
        assert!((f64::from_value(Value::Int(2)).unwrap() - 2.0).abs() < f64::EPSILON);
        assert_eq!(String::from_value(Value::from("a")).unwrap(), "a");
        assert!(i64::from_value(Value::from("5")).is_err());
    }

    #[test]
    fn test_from_value_containers() {
        assert_eq!(Option::<i64>::from_value(Value::Null).unwrap(), None);
        assert_eq!(Option::<i64>::from_value(Value::Int(1)).unwrap(), Some(1));
        assert!(Vec::<i64>::from_value(Value::Null).unwrap().is_empty());
        assert_eq!(
            Vec::<i64>::from_value(Value::from(vec![1_i64, 2])).unwrap(),
            vec![1, 2]
        );
        let err = Vec::<i64>::from_value(Value::Int(1)).unwrap_err();
        assert!(matches!(err, DbError::TypeMismatch { expected: "list", .. }));
    }

    #[test]
    fn test_date_from_datetime() {
        let dt = NaiveDate::from_ymd_opt(2014, 2, 1)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap();
        assert_eq!(NaiveDate::from_value(Value::DateTime(dt)).unwrap(), dt.date());
    }
}

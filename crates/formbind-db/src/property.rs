//! Property declarations.
//!
//! A [`PropertyDef`] describes one attribute of a model: its storage type,
//! the options every property shares (required, default, repeated, choices)
//! and the type-specific ones (bounds, decimal places, referenced kind,
//! string lengths). Model forms read these declarations to generate their
//! fields; [`PropertyDef::validate`] guards assignments on the model itself.

use std::cmp::Ordering;
use std::fmt;

use rust_decimal::{Decimal, RoundingStrategy};

use crate::error::DbError;
use crate::value::Value;

/// The storage type of a property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropertyType {
    /// A 64-bit integer.
    Integer,
    /// An integer restricted to `[lower, upper]`.
    IntegerBounded,
    /// A float.
    Float,
    /// A float restricted to `[lower, upper]`.
    FloatBounded,
    /// A decimal with a fixed number of places, stored scaled as an integer.
    SimpleDecimal,
    /// A [`SimpleDecimal`](Self::SimpleDecimal) that is never negative.
    SimpleCurrency,
    /// A short, indexed string.
    String,
    /// A long, unindexed string.
    Text,
    /// A string holding an email address.
    Email,
    /// A boolean.
    Boolean,
    /// A calendar date.
    Date,
    /// A naive UTC datetime.
    DateTime,
    /// A reference to another entity.
    Key,
    /// A string-backed property with its own form field, registered by name
    /// (for example `"cep"`).
    Custom(&'static str),
}

impl PropertyType {
    /// The name of the type, as used in diagnostics and the form registry.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Integer => "integer",
            Self::IntegerBounded => "integer_bounded",
            Self::Float => "float",
            Self::FloatBounded => "float_bounded",
            Self::SimpleDecimal => "simple_decimal",
            Self::SimpleCurrency => "simple_currency",
            Self::String => "string",
            Self::Text => "text",
            Self::Email => "email",
            Self::Boolean => "boolean",
            Self::Date => "date",
            Self::DateTime => "datetime",
            Self::Key => "key",
            Self::Custom(name) => *name,
        }
    }

    /// Parses the built-in names produced by [`name`](Self::name).
    /// Custom names are not recognized.
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "integer" => Self::Integer,
            "integer_bounded" => Self::IntegerBounded,
            "float" => Self::Float,
            "float_bounded" => Self::FloatBounded,
            "simple_decimal" => Self::SimpleDecimal,
            "simple_currency" => Self::SimpleCurrency,
            "string" => Self::String,
            "text" => Self::Text,
            "email" => Self::Email,
            "boolean" => Self::Boolean,
            "date" => Self::Date,
            "datetime" => Self::DateTime,
            "key" => Self::Key,
            _ => return None,
        })
    }

    const fn is_decimal(self) -> bool {
        matches!(self, Self::SimpleDecimal | Self::SimpleCurrency)
    }

    const fn is_string(self) -> bool {
        matches!(self, Self::String | Self::Text | Self::Email | Self::Custom(_))
    }
}

impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The declaration of a single model property.
///
/// # Examples
///
/// ```
/// use formbind_db::property::{PropertyDef, PropertyType};
/// use formbind_db::value::Value;
///
/// let prop = PropertyDef::new("quantity", PropertyType::IntegerBounded)
///     .required()
///     .lower(1)
///     .upper(10);
/// assert!(prop.validate(Value::Int(5)).is_ok());
/// assert!(prop.validate(Value::Int(0)).is_err());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyDef {
    /// The property name.
    pub name: String,
    /// The storage type.
    pub property_type: PropertyType,
    /// Whether an empty value is rejected.
    pub required: bool,
    /// The value used when none was assigned.
    pub default: Option<Value>,
    /// Whether the property holds a list.
    pub repeated: bool,
    /// The allowed values, if restricted.
    pub choices: Option<Vec<Value>>,
    /// Whether the property is indexed. Unindexed strings have no length cap.
    pub indexed: bool,
    /// Inclusive lower bound for numeric types.
    pub lower: Option<Value>,
    /// Inclusive upper bound for numeric types.
    pub upper: Option<Value>,
    /// Places kept by decimal types.
    pub decimal_places: u32,
    /// The kind a key property must reference.
    pub kind: Option<String>,
    /// Maximum string length.
    pub max_len: Option<usize>,
    /// Minimum string length.
    pub min_len: Option<usize>,
    /// Exact string length.
    pub exactly_len: Option<usize>,
}

impl PropertyDef {
    /// Declares a property with the defaults of its type.
    ///
    /// Text properties are unindexed; currencies get a lower bound of zero.
    pub fn new(name: impl Into<String>, property_type: PropertyType) -> Self {
        Self {
            name: name.into(),
            property_type,
            required: false,
            default: None,
            repeated: false,
            choices: None,
            indexed: property_type != PropertyType::Text,
            lower: (property_type == PropertyType::SimpleCurrency)
                .then(|| Value::Decimal(Decimal::ZERO)),
            upper: None,
            decimal_places: 2,
            kind: None,
            max_len: None,
            min_len: None,
            exactly_len: None,
        }
    }

    /// Marks the property as required.
    #[must_use]
    pub const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Sets the default value.
    #[must_use]
    pub fn default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Marks the property as repeated.
    #[must_use]
    pub const fn repeated(mut self) -> Self {
        self.repeated = true;
        self
    }

    /// Restricts the property to the given values.
    #[must_use]
    pub fn choices<V: Into<Value>>(mut self, choices: impl IntoIterator<Item = V>) -> Self {
        self.choices = Some(choices.into_iter().map(Into::into).collect());
        self
    }

    /// Sets whether the property is indexed.
    #[must_use]
    pub const fn indexed(mut self, indexed: bool) -> Self {
        self.indexed = indexed;
        self
    }

    /// Sets the inclusive lower bound. A null value removes the bound.
    #[must_use]
    pub fn lower(mut self, value: impl Into<Value>) -> Self {
        self.lower = Some(value.into()).filter(|v| !v.is_null());
        self
    }

    /// Sets the inclusive upper bound.
    #[must_use]
    pub fn upper(mut self, value: impl Into<Value>) -> Self {
        self.upper = Some(value.into()).filter(|v| !v.is_null());
        self
    }

    /// Sets the number of decimal places.
    #[must_use]
    pub const fn decimal_places(mut self, places: u32) -> Self {
        self.decimal_places = places;
        self
    }

    /// Restricts a key property to one kind.
    #[must_use]
    pub fn kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }

    /// Sets the maximum string length.
    #[must_use]
    pub const fn max_len(mut self, len: usize) -> Self {
        self.max_len = Some(len);
        self
    }

    /// Sets the minimum string length.
    #[must_use]
    pub const fn min_len(mut self, len: usize) -> Self {
        self.min_len = Some(len);
        self
    }

    /// Sets the exact string length.
    #[must_use]
    pub const fn exactly_len(mut self, len: usize) -> Self {
        self.exactly_len = Some(len);
        self
    }

    /// Rounds a decimal to this property's places, half away from zero.
    pub fn round_decimal(&self, value: Decimal) -> Decimal {
        value
            .round_dp_with_strategy(self.decimal_places, RoundingStrategy::MidpointAwayFromZero)
            .normalize()
    }

    /// The lower bound, rounded like values for decimal types.
    pub fn lower_bound(&self) -> Option<Value> {
        self.lower.as_ref().map(|v| self.coerce_bound(v))
    }

    /// The upper bound, rounded like values for decimal types.
    pub fn upper_bound(&self) -> Option<Value> {
        self.upper.as_ref().map(|v| self.coerce_bound(v))
    }

    fn coerce_bound(&self, bound: &Value) -> Value {
        if self.property_type.is_decimal() {
            if let Some(d) = bound.to_decimal() {
                return Value::Decimal(self.round_decimal(d));
            }
        }
        bound.clone()
    }

    /// Checks a value before it is assigned to a model and returns the
    /// value as it will be stored.
    ///
    /// `Null` is always accepted (a repeated property stores it as an empty
    /// list). Decimal types are rounded to their places.
    pub fn validate(&self, value: Value) -> Result<Value, DbError> {
        if self.repeated {
            return match value {
                Value::Null => Ok(Value::List(Vec::new())),
                Value::List(items) => items
                    .into_iter()
                    .map(|item| self.validate_one(item))
                    .collect::<Result<Vec<_>, _>>()
                    .map(Value::List),
                other => Err(DbError::TypeMismatch {
                    expected: "list",
                    found: format!("{} {other}", other.type_name()),
                }),
            };
        }
        self.validate_one(value)
    }

    fn validate_one(&self, value: Value) -> Result<Value, DbError> {
        if value.is_null() {
            return Ok(value);
        }
        let value = self.coerce(value)?;
        self.check_bounds(&value)?;
        self.check_length(&value)?;
        self.check_choices(&value)?;
        Ok(value)
    }

    fn coerce(&self, value: Value) -> Result<Value, DbError> {
        let mismatch = |expected: &'static str, found: &Value| DbError::TypeMismatch {
            expected,
            found: format!("{} {found} for '{}'", found.type_name(), self.name),
        };

        match (self.property_type, value) {
            (PropertyType::Integer | PropertyType::IntegerBounded, v @ Value::Int(_))
            | (PropertyType::Float | PropertyType::FloatBounded, v @ Value::Float(_))
            | (PropertyType::Boolean, v @ Value::Bool(_))
            | (PropertyType::Date, v @ Value::Date(_))
            | (PropertyType::DateTime, v @ Value::DateTime(_)) => Ok(v),
            #[allow(clippy::cast_precision_loss)]
            (PropertyType::Float | PropertyType::FloatBounded, Value::Int(i)) => {
                Ok(Value::Float(i as f64))
            }
            (PropertyType::Date, Value::DateTime(dt)) => Ok(Value::Date(dt.date())),
            (ty, v) if ty.is_decimal() => match &v {
                Value::Int(_) | Value::Float(_) | Value::Decimal(_) | Value::String(_) => v
                    .to_decimal()
                    .map(|d| Value::Decimal(self.round_decimal(d)))
                    .ok_or_else(|| mismatch("decimal", &v)),
                _ => Err(mismatch("decimal", &v)),
            },
            (ty, v @ Value::String(_)) if ty.is_string() => Ok(v),
            (PropertyType::Key, Value::Key(key)) => match &self.kind {
                Some(kind) if kind != key.kind() => Err(DbError::TypeMismatch {
                    expected: "key of the declared kind",
                    found: format!("{key} for '{}', expected kind {kind}", self.name),
                }),
                _ => Ok(Value::Key(key)),
            },
            (ty, v) => Err(mismatch(ty.name(), &v)),
        }
    }

    fn check_bounds(&self, value: &Value) -> Result<(), DbError> {
        if let Some(lower) = self.lower_bound() {
            if value.compare_numeric(&lower) == Some(Ordering::Less) {
                return Err(self.boundary(format!("{value} is less than {lower}")));
            }
        }
        if let Some(upper) = self.upper_bound() {
            if value.compare_numeric(&upper) == Some(Ordering::Greater) {
                return Err(self.boundary(format!("{value} is greater than {upper}")));
            }
        }
        Ok(())
    }

    fn check_length(&self, value: &Value) -> Result<(), DbError> {
        let Value::String(s) = value else {
            return Ok(());
        };
        let len = s.chars().count();
        if let Some(exact) = self.exactly_len {
            if len != exact {
                return Err(self.boundary(format!(
                    "{s:?} has {len} characters, expected exactly {exact}"
                )));
            }
        }
        if let Some(max) = self.max_len {
            if len > max {
                return Err(self.boundary(format!("{s:?} has {len} characters, max is {max}")));
            }
        }
        if let Some(min) = self.min_len {
            if len < min {
                return Err(self.boundary(format!("{s:?} has {len} characters, min is {min}")));
            }
        }
        Ok(())
    }

    fn check_choices(&self, value: &Value) -> Result<(), DbError> {
        match &self.choices {
            Some(choices) if !choices.iter().any(|c| c.loose_eq(value)) => Err(DbError::InvalidChoice {
                property: self.name.clone(),
                value: value.to_string(),
            }),
            _ => Ok(()),
        }
    }

    fn boundary(&self, message: String) -> DbError {
        DbError::BoundaryError {
            property: self.name.clone(),
            message,
        }
    }
}

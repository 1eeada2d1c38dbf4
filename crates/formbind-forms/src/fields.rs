//! Form field descriptors.
//!
//! A field descriptor knows three things about one attribute:
//!
//! - how to **validate** raw input, returning a translated message when it is
//!   not acceptable ([`FormField::validate`]),
//! - how to **normalize** raw input into the value stored on a model
//!   ([`FormField::normalize`]),
//! - how to **localize** a stored value back into what a user reads and
//!   edits ([`FormField::localize`]).
//!
//! Every descriptor shares the [`FieldOptions`] (required, default, repeated,
//! choices). Concrete types override the `*_field` hooks, which work on a
//! single value; the provided entry points map them over lists for repeated
//! fields.
//!
//! ```
//! use formbind_db::Value;
//! use formbind_forms::fields::{FormField, IntegerField};
//!
//! let field = IntegerField::new().required().lower(1);
//! assert_eq!(field.validate(&Value::from("")).as_deref(), Some("Required field"));
//! assert_eq!(field.validate(&Value::from("0")).as_deref(), Some("Must be greater than 1"));
//! assert_eq!(field.normalize(Value::from("1,000.0")).unwrap(), Value::Int(1000));
//! ```

use std::fmt;
use std::sync::OnceLock;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use chrono_tz::Tz;
use formbind_core::i18n::{gettext, gettext_with, timezone};
use formbind_core::{settings, Locale};
use formbind_db::{Key, PropertyDef, Value};
use regex::Regex;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::error::FieldError;
use crate::l10n;

/// Options every field descriptor has.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldOptions {
    /// Whether an empty value is rejected.
    pub required: bool,
    /// The value used in place of an empty one.
    pub default: Option<Value>,
    /// Whether the field holds a list of values.
    pub repeated: bool,
    /// The only values accepted, compared after normalization.
    pub choices: Option<Vec<Value>>,
}

impl FieldOptions {
    /// Copies the shared options of a model property.
    pub fn from_property(property: &PropertyDef) -> Self {
        Self {
            required: property.required,
            default: property.default.clone(),
            repeated: property.repeated,
            choices: property.choices.clone(),
        }
    }

    /// Replaces `Null` and `""` with the default, if there is one.
    pub fn apply_default(&self, value: Value) -> Value {
        match &self.default {
            Some(default) if value.is_empty() => default.clone(),
            _ => value,
        }
    }
}

/// The behavior of a form field descriptor.
pub trait FormField: Send + Sync + fmt::Debug {
    /// The shared options.
    fn options(&self) -> &FieldOptions;

    /// Mutable access to the shared options.
    fn options_mut(&mut self) -> &mut FieldOptions;

    /// Configures the field from a model property declaration.
    ///
    /// Fields with type-specific options override this and call
    /// [`FieldOptions::from_property`] themselves.
    fn set_options(&mut self, property: &PropertyDef) {
        *self.options_mut() = FieldOptions::from_property(property);
    }

    /// Validates a single value. Returns the error message, if any.
    fn validate_field(&self, value: &Value) -> Option<String> {
        self.validate_options(value)
    }

    /// Normalizes a single value.
    fn normalize_field(&self, value: Value) -> Result<Value, FieldError> {
        Ok(self.options().apply_default(value))
    }

    /// Localizes a single value. Values that count as false become `""`.
    fn localize_field(&self, value: Value) -> Value {
        let value = self.options().apply_default(value);
        if value.is_falsy() {
            Value::String(String::new())
        } else {
            value
        }
    }

    /// The checks every field shares: choices, then required.
    ///
    /// With choices, the normalized value must be one of them and nothing
    /// else is checked.
    fn validate_options(&self, value: &Value) -> Option<String> {
        let options = self.options();
        if let Some(choices) = options.choices.as_ref().filter(|c| !c.is_empty()) {
            let member = self
                .normalize_field(value.clone())
                .is_ok_and(|normalized| choices.iter().any(|c| c.loose_eq(&normalized)));
            if member {
                return None;
            }
            let listed: Vec<String> = choices.iter().map(ToString::to_string).collect();
            return Some(gettext_with(
                "Must be one of: %(choices)s",
                &[("choices", listed.join("; "))],
            ));
        }

        let empty = value.is_empty() && options.default.as_ref().map_or(true, Value::is_empty);
        (options.required && empty).then(|| gettext("Required field"))
    }

    /// Validates a value. A repeated field reports the result for the last
    /// element of the list; an empty list is validated as `Null`.
    fn validate(&self, value: &Value) -> Option<String> {
        if self.options().repeated {
            return match items(value) {
                Some(items) => items.iter().map(|item| self.validate_field(item)).last().flatten(),
                None => self.validate_field(&Value::Null),
            };
        }
        self.validate_field(value)
    }

    /// Normalizes a value. A repeated field always yields a list.
    fn normalize(&self, value: Value) -> Result<Value, FieldError> {
        if self.options().repeated {
            return match value {
                Value::List(list) => list
                    .into_iter()
                    .map(|item| self.normalize_field(item))
                    .collect::<Result<Vec<_>, _>>()
                    .map(Value::List),
                v if v.is_empty() => Ok(Value::List(Vec::new())),
                v => Ok(Value::List(vec![self.normalize_field(v)?])),
            };
        }
        self.normalize_field(value)
    }

    /// Localizes a value. A repeated field always yields a list.
    fn localize(&self, value: Value) -> Value {
        if self.options().repeated {
            return match value {
                Value::List(list) => {
                    Value::List(list.into_iter().map(|item| self.localize_field(item)).collect())
                }
                v if v.is_empty() => Value::List(Vec::new()),
                v => Value::List(vec![self.localize_field(v)]),
            };
        }
        self.localize_field(value)
    }
}

/// The elements of a non-empty repeated value. A scalar counts as a list of
/// one.
fn items(value: &Value) -> Option<&[Value]> {
    match value {
        Value::List(list) if !list.is_empty() => Some(list.as_slice()),
        Value::List(_) => None,
        v if v.is_empty() => None,
        v => Some(std::slice::from_ref(v)),
    }
}

fn active_locale() -> Locale {
    settings::get_locale().unwrap_or_else(|err| {
        tracing::warn!(error = %err, "Falling back to the default locale");
        Locale::default()
    })
}

fn active_timezone() -> Tz {
    settings::get_timezone().unwrap_or_else(|err| {
        tracing::warn!(error = %err, "Falling back to UTC");
        Tz::UTC
    })
}

/// Generates the builder methods for the shared options.
///
/// The `default` builder shadows `Default::default`, so constructors call
/// `<Self as Default>::default()`.
macro_rules! option_builders {
    ($ty:ty) => {
        impl $ty {
            /// Marks the field as required.
            #[must_use]
            pub fn required(mut self) -> Self {
                self.options_mut().required = true;
                self
            }

            /// Sets the value used in place of an empty one.
            #[must_use]
            pub fn default(mut self, value: impl Into<Value>) -> Self {
                self.options_mut().default = Some(value.into());
                self
            }

            /// Makes the field hold a list of values.
            #[must_use]
            pub fn repeated(mut self) -> Self {
                self.options_mut().repeated = true;
                self
            }

            /// Restricts the field to the given values.
            #[must_use]
            pub fn choices<V: Into<Value>>(mut self, choices: impl IntoIterator<Item = V>) -> Self {
                self.options_mut().choices = Some(choices.into_iter().map(Into::into).collect());
                self
            }
        }
    };
}

pub(crate) use option_builders;

// ── BaseField ────────────────────────────────────────────────────────────

/// A field with only the shared checks. Values pass through unchanged.
#[derive(Debug, Clone, Default)]
pub struct BaseField {
    options: FieldOptions,
}

impl BaseField {
    /// Creates a field with no options set.
    pub fn new() -> Self {
        <Self as Default>::default()
    }
}

option_builders!(BaseField);

impl FormField for BaseField {
    fn options(&self) -> &FieldOptions {
        &self.options
    }

    fn options_mut(&mut self) -> &mut FieldOptions {
        &mut self.options
    }
}

// ── StringField ──────────────────────────────────────────────────────────

/// A text field with length limits.
///
/// The maximum length defaults to the configured
/// [`max_string_length`](settings::max_string_length) (1500).
#[derive(Debug, Clone)]
pub struct StringField {
    options: FieldOptions,
    max_len: Option<usize>,
    exactly_len: Option<usize>,
    min_len: Option<usize>,
}

impl Default for StringField {
    fn default() -> Self {
        Self {
            options: FieldOptions::default(),
            max_len: Some(settings::max_string_length()),
            exactly_len: None,
            min_len: None,
        }
    }
}

impl StringField {
    /// Creates a field with the default maximum length.
    pub fn new() -> Self {
        <Self as Default>::default()
    }

    /// Sets the maximum length. `None` removes the limit.
    #[must_use]
    pub const fn max_len(mut self, max_len: Option<usize>) -> Self {
        self.max_len = max_len;
        self
    }

    /// Requires exactly this many characters.
    #[must_use]
    pub const fn exactly_len(mut self, len: usize) -> Self {
        self.exactly_len = Some(len);
        self
    }

    /// Requires at least this many characters.
    #[must_use]
    pub const fn min_len(mut self, len: usize) -> Self {
        self.min_len = Some(len);
        self
    }

    /// The effective maximum length.
    pub const fn max_length(&self) -> Option<usize> {
        self.max_len
    }

    fn check_length(&self, value: &Value) -> Option<String> {
        let Value::String(s) = value else {
            return None;
        };
        let len = s.chars().count();
        let message = |template: &str, name: &str, limit: usize| {
            gettext_with(
                template,
                &[("len", len.to_string()), (name, limit.to_string())],
            )
        };

        if let Some(exact) = self.exactly_len.filter(|exact| len != *exact) {
            return Some(message(
                "Has %(len)s characters and it must have exactly %(exactly_len)s",
                "exactly_len",
                exact,
            ));
        }
        if let Some(max) = self.max_len.filter(|max| *max > 0 && len > *max) {
            return Some(message(
                "Has %(len)s characters and it must have %(max_len)s or less",
                "max_len",
                max,
            ));
        }
        if let Some(min) = self.min_len.filter(|min| *min > 0 && len < *min) {
            return Some(message(
                "Has %(len)s characters and it must have %(min_len)s or more",
                "min_len",
                min,
            ));
        }
        None
    }
}

option_builders!(StringField);

impl FormField for StringField {
    fn options(&self) -> &FieldOptions {
        &self.options
    }

    fn options_mut(&mut self) -> &mut FieldOptions {
        &mut self.options
    }

    /// Unindexed properties without an explicit `max_len` get no limit.
    fn set_options(&mut self, property: &PropertyDef) {
        self.options = FieldOptions::from_property(property);
        self.max_len = property
            .max_len
            .or_else(|| property.indexed.then(settings::max_string_length));
        self.exactly_len = property.exactly_len;
        self.min_len = property.min_len;
    }

    fn validate_field(&self, value: &Value) -> Option<String> {
        self.check_length(value)
            .or_else(|| self.validate_options(value))
    }
}

// ── EmailField ───────────────────────────────────────────────────────────

/// A [`StringField`] that must look like an email address.
#[derive(Debug, Clone, Default)]
pub struct EmailField {
    string: StringField,
}

impl EmailField {
    /// Creates a field with the default maximum length.
    pub fn new() -> Self {
        <Self as Default>::default()
    }
}

option_builders!(EmailField);

fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| Regex::new(r"^[^@]+@[^@]+\.[^@]+").expect("valid regex"))
}

impl FormField for EmailField {
    fn options(&self) -> &FieldOptions {
        self.string.options()
    }

    fn options_mut(&mut self) -> &mut FieldOptions {
        self.string.options_mut()
    }

    fn set_options(&mut self, property: &PropertyDef) {
        self.string.set_options(property);
    }

    fn validate_field(&self, value: &Value) -> Option<String> {
        match value {
            Value::String(s) if !s.is_empty() && !email_regex().is_match(s) => {
                Some(gettext("Invalid email"))
            }
            _ => self.string.validate_field(value),
        }
    }
}

// ── KeyField ─────────────────────────────────────────────────────────────

/// A reference to another entity, typed as its numeric id or url-safe key.
///
/// A numeric id needs the field's kind to become a key. Localizing gives
/// back the id.
#[derive(Debug, Clone, Default)]
pub struct KeyField {
    options: FieldOptions,
    kind: Option<String>,
}

impl KeyField {
    /// Creates a field without a kind; only url-safe keys are accepted.
    pub fn new() -> Self {
        <Self as Default>::default()
    }

    /// Sets the kind numeric ids are resolved against.
    #[must_use]
    pub fn kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }
}

option_builders!(KeyField);

impl FormField for KeyField {
    fn options(&self) -> &FieldOptions {
        &self.options
    }

    fn options_mut(&mut self) -> &mut FieldOptions {
        &mut self.options
    }

    fn set_options(&mut self, property: &PropertyDef) {
        self.options = FieldOptions::from_property(property);
        self.kind.clone_from(&property.kind);
    }

    fn validate_field(&self, value: &Value) -> Option<String> {
        match self.normalize_field(value.clone()) {
            Ok(key) => self.validate_options(&key),
            Err(FieldError::KindNotDefined(_)) => Some(gettext("Key's kind should be defined")),
            Err(_) => Some(gettext("Invalid key")),
        }
    }

    fn normalize_field(&self, value: Value) -> Result<Value, FieldError> {
        match value {
            Value::String(s) if s.is_empty() => Ok(self.options.apply_default(Value::Null)),
            Value::String(s) => {
                if let Ok(id) = s.trim().parse::<i64>() {
                    let kind = self
                        .kind
                        .as_deref()
                        .ok_or_else(|| FieldError::KindNotDefined(s.clone()))?;
                    return Key::new(kind, id)
                        .map(Value::Key)
                        .map_err(|_| FieldError::Key(s));
                }
                Key::from_urlsafe(&s)
                    .map(Value::Key)
                    .map_err(|_| FieldError::Key(s))
            }
            v @ (Value::Key(_) | Value::Null) => Ok(self.options.apply_default(v)),
            other => Err(FieldError::unexpected("key", &other)),
        }
    }

    fn localize_field(&self, value: Value) -> Value {
        match self.options.apply_default(value) {
            Value::Key(key) => Value::Int(key.id()),
            v if v.is_falsy() => Value::String(String::new()),
            v => v,
        }
    }
}

// ── IntegerField ─────────────────────────────────────────────────────────

/// A whole number, typed with the locale's separators.
///
/// Fractions are truncated: `1,000.9` becomes `1000` in `en_US`.
#[derive(Debug, Clone, Default)]
pub struct IntegerField {
    options: FieldOptions,
    lower: Option<i64>,
    upper: Option<i64>,
}

impl IntegerField {
    /// Creates an unbounded field.
    pub fn new() -> Self {
        <Self as Default>::default()
    }

    /// Sets the inclusive lower bound.
    #[must_use]
    pub const fn lower(mut self, lower: i64) -> Self {
        self.lower = Some(lower);
        self
    }

    /// Sets the inclusive upper bound.
    #[must_use]
    pub const fn upper(mut self, upper: i64) -> Self {
        self.upper = Some(upper);
        self
    }
}

option_builders!(IntegerField);

impl FormField for IntegerField {
    fn options(&self) -> &FieldOptions {
        &self.options
    }

    fn options_mut(&mut self) -> &mut FieldOptions {
        &mut self.options
    }

    fn set_options(&mut self, property: &PropertyDef) {
        self.options = FieldOptions::from_property(property);
        self.lower = property.lower_bound().and_then(|v| v.as_int());
        self.upper = property.upper_bound().and_then(|v| v.as_int());
    }

    fn validate_field(&self, value: &Value) -> Option<String> {
        let Ok(value) = self.normalize_field(value.clone()) else {
            return Some(gettext("Must be integer"));
        };
        if let Value::Int(n) = value {
            if let Some(lower) = self.lower.filter(|lower| *lower > n) {
                return Some(gettext_with(
                    "Must be greater than %(lower)s",
                    &[("lower", lower.to_string())],
                ));
            }
            if let Some(upper) = self.upper.filter(|upper| *upper < n) {
                return Some(gettext_with(
                    "Must be less than %(upper)s",
                    &[("upper", upper.to_string())],
                ));
            }
        }
        self.validate_options(&value)
    }

    fn normalize_field(&self, value: Value) -> Result<Value, FieldError> {
        match value {
            Value::String(s) if s.is_empty() => Ok(self.options.apply_default(Value::Null)),
            Value::String(s) => {
                let number = l10n::parse_decimal(&s, &settings::get_locale()?)?;
                number
                    .trunc()
                    .to_i64()
                    .map(Value::Int)
                    .ok_or_else(|| FieldError::unexpected("integer", &Value::String(s)))
            }
            v @ (Value::Int(_) | Value::Null) => Ok(self.options.apply_default(v)),
            other => Err(FieldError::unexpected("integer", &other)),
        }
    }

    /// Integers are rendered without grouping, so they read back unchanged.
    fn localize_field(&self, value: Value) -> Value {
        match self.options.apply_default(value) {
            Value::Int(n) => Value::String(n.to_string()),
            Value::Null => Value::String(String::new()),
            other => other,
        }
    }
}

// ── BooleanField ─────────────────────────────────────────────────────────

/// `true` or `false`, in any letter case.
#[derive(Debug, Clone, Default)]
pub struct BooleanField {
    options: FieldOptions,
}

impl BooleanField {
    /// Creates a field with no options set.
    pub fn new() -> Self {
        <Self as Default>::default()
    }
}

option_builders!(BooleanField);

impl FormField for BooleanField {
    fn options(&self) -> &FieldOptions {
        &self.options
    }

    fn options_mut(&mut self) -> &mut FieldOptions {
        &mut self.options
    }

    fn validate_field(&self, value: &Value) -> Option<String> {
        match self.normalize_field(value.clone()) {
            Ok(value) => self.validate_options(&value),
            Err(_) => Some(gettext("Must be true or false")),
        }
    }

    fn normalize_field(&self, value: Value) -> Result<Value, FieldError> {
        match value {
            Value::String(s) if s.is_empty() => Ok(self.options.apply_default(Value::Null)),
            Value::String(s) => match s.to_uppercase().as_str() {
                "TRUE" => Ok(Value::Bool(true)),
                "FALSE" => Ok(Value::Bool(false)),
                _ => Err(FieldError::Boolean(s)),
            },
            v @ (Value::Bool(_) | Value::Null) => Ok(self.options.apply_default(v)),
            other => Err(FieldError::unexpected("boolean", &other)),
        }
    }

    /// Booleans are shown as they are stored.
    fn localize(&self, value: Value) -> Value {
        value
    }
}

// ── FloatField ───────────────────────────────────────────────────────────

/// A floating point number, typed with the locale's separators.
#[derive(Debug, Clone, Default)]
pub struct FloatField {
    options: FieldOptions,
    lower: Option<f64>,
    upper: Option<f64>,
}

impl FloatField {
    /// Creates an unbounded field.
    pub fn new() -> Self {
        <Self as Default>::default()
    }

    /// Sets the inclusive lower bound.
    #[must_use]
    pub const fn lower(mut self, lower: f64) -> Self {
        self.lower = Some(lower);
        self
    }

    /// Sets the inclusive upper bound.
    #[must_use]
    pub const fn upper(mut self, upper: f64) -> Self {
        self.upper = Some(upper);
        self
    }
}

option_builders!(FloatField);

fn as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Float(f) => Some(*f),
        #[allow(clippy::cast_precision_loss)]
        Value::Int(i) => Some(*i as f64),
        Value::Decimal(d) => d.to_f64(),
        _ => None,
    }
}

impl FormField for FloatField {
    fn options(&self) -> &FieldOptions {
        &self.options
    }

    fn options_mut(&mut self) -> &mut FieldOptions {
        &mut self.options
    }

    fn set_options(&mut self, property: &PropertyDef) {
        self.options = FieldOptions::from_property(property);
        self.lower = property.lower_bound().as_ref().and_then(as_f64);
        self.upper = property.upper_bound().as_ref().and_then(as_f64);
    }

    fn validate_field(&self, value: &Value) -> Option<String> {
        let Ok(value) = self.normalize_field(value.clone()) else {
            return Some(gettext("Must be a number"));
        };
        if let Value::Float(n) = value {
            if let Some(lower) = self.lower.filter(|lower| *lower > n) {
                return Some(gettext_with(
                    "Must be greater than %(lower)s",
                    &[("lower", lower.to_string())],
                ));
            }
            if let Some(upper) = self.upper.filter(|upper| *upper < n) {
                return Some(gettext_with(
                    "Must be less than %(upper)s",
                    &[("upper", upper.to_string())],
                ));
            }
        }
        self.validate_options(&value)
    }

    fn normalize_field(&self, value: Value) -> Result<Value, FieldError> {
        match value {
            Value::String(s) if s.is_empty() => Ok(self.options.apply_default(Value::Null)),
            Value::String(s) => {
                let number = l10n::parse_decimal(&s, &settings::get_locale()?)?;
                number
                    .to_string()
                    .parse::<f64>()
                    .map(Value::Float)
                    .map_err(|_| FieldError::unexpected("number", &Value::String(s)))
            }
            Value::Null => Ok(self.options.apply_default(Value::Null)),
            other => as_f64(&other)
                .map(Value::Float)
                .ok_or_else(|| FieldError::unexpected("number", &other)),
        }
    }

    fn localize_field(&self, value: Value) -> Value {
        match self.options.apply_default(value) {
            v @ (Value::Float(_) | Value::Int(_) | Value::Decimal(_)) => match v.to_decimal() {
                Some(number) => Value::String(l10n::format_decimal(number, &active_locale())),
                None => v,
            },
            v if v.is_falsy() => Value::String(String::new()),
            v => v,
        }
    }
}

// ── DecimalField ─────────────────────────────────────────────────────────

/// An exact decimal rounded to a number of places (2 by default), half
/// away from zero.
#[derive(Debug, Clone)]
pub struct DecimalField {
    options: FieldOptions,
    decimal_places: u32,
    lower: Option<Decimal>,
    upper: Option<Decimal>,
}

impl Default for DecimalField {
    fn default() -> Self {
        Self {
            options: FieldOptions::default(),
            decimal_places: 2,
            lower: None,
            upper: None,
        }
    }
}

impl DecimalField {
    /// Creates an unbounded field with two decimal places.
    pub fn new() -> Self {
        <Self as Default>::default()
    }

    /// Sets the number of decimal places kept.
    #[must_use]
    pub const fn decimal_places(mut self, places: u32) -> Self {
        self.decimal_places = places;
        self
    }

    /// Sets the inclusive lower bound, rounded like values.
    #[must_use]
    pub const fn lower(mut self, lower: Decimal) -> Self {
        self.lower = Some(lower);
        self
    }

    /// Sets the inclusive upper bound, rounded like values.
    #[must_use]
    pub const fn upper(mut self, upper: Decimal) -> Self {
        self.upper = Some(upper);
        self
    }

    /// Rounds `value` to this field's places.
    pub fn round(&self, value: Decimal) -> Decimal {
        value
            .round_dp_with_strategy(self.decimal_places, RoundingStrategy::MidpointAwayFromZero)
            .normalize()
    }
}

option_builders!(DecimalField);

impl FormField for DecimalField {
    fn options(&self) -> &FieldOptions {
        &self.options
    }

    fn options_mut(&mut self) -> &mut FieldOptions {
        &mut self.options
    }

    fn set_options(&mut self, property: &PropertyDef) {
        self.options = FieldOptions::from_property(property);
        self.decimal_places = property.decimal_places;
        self.lower = property.lower.as_ref().and_then(Value::to_decimal);
        self.upper = property.upper.as_ref().and_then(Value::to_decimal);
    }

    fn validate_field(&self, value: &Value) -> Option<String> {
        let Ok(value) = self.normalize_field(value.clone()) else {
            return Some(gettext("Must be a number"));
        };
        if let Value::Decimal(n) = value {
            if let Some(lower) = self.lower.map(|l| self.round(l)).filter(|l| *l > n) {
                return Some(gettext_with(
                    "Must be greater than %(lower)s",
                    &[("lower", lower.to_string())],
                ));
            }
            if let Some(upper) = self.upper.map(|u| self.round(u)).filter(|u| *u < n) {
                return Some(gettext_with(
                    "Must be less than %(upper)s",
                    &[("upper", upper.to_string())],
                ));
            }
        }
        self.validate_options(&value)
    }

    fn normalize_field(&self, value: Value) -> Result<Value, FieldError> {
        match value {
            Value::String(s) if s.is_empty() => Ok(self.options.apply_default(Value::Null)),
            Value::String(s) => {
                let number = l10n::parse_decimal(&s, &settings::get_locale()?)?;
                Ok(Value::Decimal(self.round(number)))
            }
            v @ (Value::Decimal(_) | Value::Null) => Ok(self.options.apply_default(v)),
            other @ (Value::Int(_) | Value::Float(_)) => other
                .to_decimal()
                .map(|d| Value::Decimal(self.round(d)))
                .ok_or_else(|| FieldError::unexpected("decimal", &other)),
            other => Err(FieldError::unexpected("decimal", &other)),
        }
    }

    fn localize_field(&self, value: Value) -> Value {
        let value = self.options.apply_default(value);
        match value.to_decimal() {
            Some(number) if !value.is_empty() => {
                Value::String(l10n::format_decimal(number, &active_locale()))
            }
            _ if value.is_falsy() => Value::String(String::new()),
            _ => value,
        }
    }
}

// ── DateField ────────────────────────────────────────────────────────────

/// A calendar date in the locale's short format, with every field padded:
/// `MM/dd/yyyy` for `en_US`, `dd/MM/yyyy` for `pt_BR`.
#[derive(Debug, Clone, Default)]
pub struct DateField {
    options: FieldOptions,
}

impl DateField {
    /// Creates a field with no options set.
    pub fn new() -> Self {
        <Self as Default>::default()
    }
}

option_builders!(DateField);

/// The date used in "valid example" messages.
fn example_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2016, 12, 25).unwrap_or_default()
}

fn localize_date(date: NaiveDate) -> String {
    let pattern = l10n::short_date_pattern(&active_locale());
    l10n::format_pattern(&date.and_time(NaiveTime::MIN), &pattern)
}

impl FormField for DateField {
    fn options(&self) -> &FieldOptions {
        &self.options
    }

    fn options_mut(&mut self) -> &mut FieldOptions {
        &mut self.options
    }

    fn validate_field(&self, value: &Value) -> Option<String> {
        match self.normalize_field(value.clone()) {
            Ok(value) => self.validate_options(&value),
            Err(_) => Some(gettext_with(
                "Invalid date. Valid example: %(date)s",
                &[("date", localize_date(example_date()))],
            )),
        }
    }

    fn normalize_field(&self, value: Value) -> Result<Value, FieldError> {
        match value {
            Value::String(s) if s.is_empty() => Ok(self.options.apply_default(Value::Null)),
            Value::String(s) => l10n::parse_date(&s, &settings::get_locale()?)
                .map(Value::Date)
                .ok_or(FieldError::Date(s)),
            Value::DateTime(dt) => Ok(Value::Date(dt.date())),
            v @ (Value::Date(_) | Value::Null) => Ok(self.options.apply_default(v)),
            other => Err(FieldError::unexpected("date", &other)),
        }
    }

    fn localize_field(&self, value: Value) -> Value {
        match self.options.apply_default(value) {
            Value::Date(date) => Value::String(localize_date(date)),
            Value::DateTime(dt) => Value::String(localize_date(dt.date())),
            v if v.is_falsy() => Value::String(String::new()),
            v => v,
        }
    }
}

// ── DateTimeField ────────────────────────────────────────────────────────

/// A date and a time separated by one space, typed in the configured
/// timezone and stored as naive UTC.
///
/// The date part follows the locale's short pattern, the time part is read
/// as hour, minute and second.
#[derive(Debug, Clone, Default)]
pub struct DateTimeField {
    options: FieldOptions,
}

impl DateTimeField {
    /// Creates a field with no options set.
    pub fn new() -> Self {
        <Self as Default>::default()
    }
}

option_builders!(DateTimeField);

fn localize_datetime(utc: &NaiveDateTime) -> String {
    let local = timezone::from_utc(utc, active_timezone());
    let pattern = format!(
        "{} {}",
        l10n::short_date_pattern(&active_locale()),
        l10n::TIME_PATTERN
    );
    l10n::format_pattern(&local, &pattern)
}

impl FormField for DateTimeField {
    fn options(&self) -> &FieldOptions {
        &self.options
    }

    fn options_mut(&mut self) -> &mut FieldOptions {
        &mut self.options
    }

    fn validate_field(&self, value: &Value) -> Option<String> {
        match self.normalize_field(value.clone()) {
            Ok(value) => self.validate_options(&value),
            Err(_) => {
                let example = example_date().and_hms_opt(18, 0, 0).unwrap_or_default();
                Some(gettext_with(
                    "Invalid datetime. Valid example: %(datetime)s",
                    &[("datetime", localize_datetime(&example))],
                ))
            }
        }
    }

    fn normalize_field(&self, value: Value) -> Result<Value, FieldError> {
        match value {
            Value::String(s) if s.is_empty() => Ok(self.options.apply_default(Value::Null)),
            Value::String(s) => {
                let locale = settings::get_locale()?;
                let tz = settings::get_timezone()?;
                let parsed = match s.split(' ').collect::<Vec<_>>().as_slice() {
                    [date, time] => l10n::parse_date(date, &locale)
                        .zip(l10n::parse_time(time))
                        .map(|(date, time)| NaiveDateTime::new(date, time)),
                    _ => None,
                };
                parsed
                    .map(|local| Value::DateTime(timezone::to_utc(&local, tz)))
                    .ok_or(FieldError::DateTime(s))
            }
            Value::Date(date) => Ok(Value::DateTime(date.and_time(NaiveTime::MIN))),
            v @ (Value::DateTime(_) | Value::Null) => Ok(self.options.apply_default(v)),
            other => Err(FieldError::unexpected("datetime", &other)),
        }
    }

    fn localize_field(&self, value: Value) -> Value {
        match self.options.apply_default(value) {
            Value::DateTime(dt) => Value::String(localize_datetime(&dt)),
            Value::Date(date) => Value::String(localize_datetime(&date.and_time(NaiveTime::MIN))),
            v if v.is_falsy() => Value::String(String::new()),
            v => v,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use formbind_db::PropertyType;
    use rstest::rstest;
    use serial_test::serial;
    use std::str::FromStr;

    fn s(text: &str) -> Value {
        Value::from(text)
    }

    fn dec(text: &str) -> Value {
        Value::Decimal(Decimal::from_str(text).unwrap())
    }

    /// The timezone most datetime cases are written against.
    fn sao_paulo() {
        settings::reset_factories();
        settings::set_tz_factory(|| "America/Sao_Paulo".to_string());
    }

    // ── BaseField ────────────────────────────────────────────────────

    #[test]
    fn test_base_required() {
        let optional = BaseField::new();
        assert_eq!(optional.validate(&s("")), None);
        assert_eq!(optional.validate(&Value::Null), None);

        let required = BaseField::new().required();
        assert_eq!(required.validate(&s("")).as_deref(), Some("Required field"));
        assert_eq!(required.validate(&Value::Null).as_deref(), Some("Required field"));
        assert_eq!(required.validate(&s("Foo")), None);
    }

    #[test]
    fn test_base_default() {
        let field = BaseField::new().default("default").required();
        assert_eq!(field.normalize(s("")).unwrap(), s("default"));
        assert_eq!(field.normalize(Value::Null).unwrap(), s("default"));
        assert_eq!(field.normalize(s("X")).unwrap(), s("X"));
        assert_eq!(field.validate(&s("")), None);
        assert_eq!(field.localize(Value::Null), s("default"));
    }

    #[test]
    fn test_new_is_unconfigured_and_default_sets_a_value() {
        assert_eq!(IntegerField::new().options(), &FieldOptions::default());
        assert_eq!(DateTimeField::new().options(), &FieldOptions::default());
        assert_eq!(
            IntegerField::new().default(7).options().default,
            Some(Value::Int(7))
        );
        assert_eq!(DecimalField::new().round(Decimal::new(1005, 3)), Decimal::new(101, 2));
    }

    #[test]
    fn test_base_choices() {
        let field = BaseField::new().choices(["1", "2"]);
        assert_eq!(field.validate(&s("1")), None);
        assert_eq!(field.validate(&s("2")), None);
        assert_eq!(
            field.validate(&Value::Null).as_deref(),
            Some("Must be one of: 1; 2")
        );
    }

    #[test]
    fn test_base_repeated() {
        let field = BaseField::new().repeated();
        assert_eq!(field.validate(&Value::List(vec![])), None);
        assert_eq!(field.validate(&Value::from(vec!["1", "2"])), None);
        assert_eq!(field.validate(&Value::Null), None);
        assert_eq!(field.normalize(Value::Null).unwrap(), Value::List(vec![]));
        assert_eq!(
            field.localize(Value::List(vec![Value::Null])),
            Value::List(vec![s("")])
        );
    }

    #[test]
    fn test_base_repeated_required_reports_last_element() {
        let field = BaseField::new().repeated().required();
        assert_eq!(field.validate(&Value::from(vec!["1"])), None);
        assert_eq!(field.validate(&Value::Null).as_deref(), Some("Required field"));
        assert_eq!(field.validate(&Value::List(vec![])).as_deref(), Some("Required field"));
        assert_eq!(
            field.validate(&Value::List(vec![s("1,"), Value::Null])).as_deref(),
            Some("Required field")
        );
        assert_eq!(field.validate(&Value::List(vec![Value::Null, s("1")])), None);
    }

    #[test]
    fn test_base_localize_falsy() {
        let field = BaseField::new();
        assert_eq!(field.localize(Value::Null), s(""));
        assert_eq!(field.localize(Value::Int(0)), s(""));
        assert_eq!(field.localize(s("x")), s("x"));
    }

    // ── StringField / EmailField ─────────────────────────────────────

    #[test]
    fn test_string_default_max_len() {
        let field = StringField::new();
        assert_eq!(
            field.validate_field(&s(&"a".repeat(1501))).as_deref(),
            Some("Has 1501 characters and it must have 1500 or less")
        );
        assert_eq!(StringField::new().max_len(None).validate(&s(&"a".repeat(1501))), None);
    }

    #[test]
    fn test_string_lengths() {
        let field = StringField::new().max_len(Some(10));
        assert_eq!(
            field.validate(&s(&"a".repeat(11))).as_deref(),
            Some("Has 11 characters and it must have 10 or less")
        );

        let field = StringField::new().min_len(2);
        assert_eq!(
            field.validate(&s("a")).as_deref(),
            Some("Has 1 characters and it must have 2 or more")
        );
        assert_eq!(field.validate(&s("aa")), None);

        let field = StringField::new().exactly_len(10);
        assert_eq!(
            field.validate(&s(&"a".repeat(9))).as_deref(),
            Some("Has 9 characters and it must have exactly 10")
        );
        assert_eq!(field.validate(&s(&"a".repeat(10))), None);
    }

    #[test]
    fn test_string_counts_characters() {
        let field = StringField::new().max_len(Some(3));
        assert_eq!(field.validate(&s("ção")), None);
    }

    #[test]
    fn test_string_set_options() {
        let mut field = StringField::new();
        field.set_options(&PropertyDef::new("txt", PropertyType::Text).required());
        assert!(field.options().required);
        assert_eq!(field.max_length(), None);

        field.set_options(&PropertyDef::new("s", PropertyType::String));
        assert_eq!(field.max_length(), Some(1500));

        field.set_options(&PropertyDef::new("s", PropertyType::String).max_len(5));
        assert_eq!(field.max_length(), Some(5));
    }

    #[rstest]
    #[case("aa", Some("Invalid email"))]
    #[case("a@", Some("Invalid email"))]
    #[case("a@com", Some("Invalid email"))]
    #[case("a@google.com", None)]
    #[case("", None)]
    fn test_email(#[case] input: &str, #[case] expected: Option<&str>) {
        assert_eq!(EmailField::new().validate(&s(input)).as_deref(), expected);
    }

    // ── KeyField ─────────────────────────────────────────────────────

    #[test]
    fn test_key_without_kind() {
        let key = Key::new("Stub", 1).unwrap();
        let field = KeyField::new();
        assert_eq!(field.normalize(Value::Null).unwrap(), Value::Null);
        assert_eq!(field.normalize(s("")).unwrap(), Value::Null);
        assert_eq!(field.normalize(Value::Key(key.clone())).unwrap(), Value::Key(key.clone()));
        assert_eq!(field.normalize(s(&key.urlsafe())).unwrap(), Value::Key(key.clone()));
        assert!(matches!(field.normalize(s("1")), Err(FieldError::KindNotDefined(_))));
        assert!(matches!(field.normalize(s("abcd")), Err(FieldError::Key(_))));

        assert_eq!(field.validate(&s(&key.urlsafe())), None);
        assert_eq!(
            field.validate(&s("1")).as_deref(),
            Some("Key's kind should be defined")
        );
        assert_eq!(field.validate(&s("abcd")).as_deref(), Some("Invalid key"));
    }

    #[test]
    fn test_key_with_kind() {
        let key = Key::new("Stub", 1).unwrap();
        let field = KeyField::new().kind("Stub");
        assert_eq!(field.normalize(s("1")).unwrap(), Value::Key(key.clone()));
        assert_eq!(field.validate(&s("1")), None);
        assert_eq!(field.validate(&s("abcd")).as_deref(), Some("Invalid key"));
        assert_eq!(field.localize(Value::Key(key)), Value::Int(1));
        assert_eq!(field.localize(Value::Null), s(""));
    }

    // ── IntegerField ─────────────────────────────────────────────────

    #[rstest]
    #[case("0", Value::Int(0))]
    #[case("0.0", Value::Int(0))]
    #[case("1,000.0", Value::Int(1000))]
    #[case("1,111,000.0", Value::Int(1_111_000))]
    #[case("1.9", Value::Int(1))]
    #[case("", Value::Null)]
    #[serial]
    fn test_integer_normalize(#[case] input: &str, #[case] expected: Value) {
        settings::reset_factories();
        assert_eq!(IntegerField::new().normalize(s(input)).unwrap(), expected);
    }

    #[test]
    #[serial]
    fn test_integer_default() {
        settings::reset_factories();
        let field = IntegerField::new().default(1);
        assert_eq!(field.normalize(Value::Null).unwrap(), Value::Int(1));
        assert_eq!(field.normalize(s("")).unwrap(), Value::Int(1));
        assert_eq!(field.normalize(s("0")).unwrap(), Value::Int(0));
    }

    #[rstest]
    #[case("foo")]
    #[case("123h")]
    #[case("0x456")]
    #[serial]
    fn test_integer_invalid(#[case] input: &str) {
        settings::reset_factories();
        assert_eq!(
            IntegerField::new().validate(&s(input)).as_deref(),
            Some("Must be integer")
        );
    }

    #[test]
    #[serial]
    fn test_integer_bounds() {
        settings::reset_factories();
        let field = IntegerField::new().lower(1);
        assert_eq!(field.validate(&s("1")), None);
        assert_eq!(field.validate(&s("0")).as_deref(), Some("Must be greater than 1"));

        let field = IntegerField::new().upper(1);
        assert_eq!(field.validate(&Value::Int(1)), None);
        assert_eq!(field.validate(&s("2")).as_deref(), Some("Must be less than 1"));
    }

    #[test]
    fn test_integer_localize() {
        let field = IntegerField::new().repeated();
        assert_eq!(
            field.localize(Value::from(vec![1000_i64, 3])),
            Value::from(vec!["1000", "3"])
        );
        assert_eq!(field.localize(Value::List(vec![Value::Null])), Value::from(vec![""]));
        assert_eq!(IntegerField::new().localize(Value::Int(0)), s("0"));
    }

    #[test]
    fn test_integer_set_options() {
        let mut field = IntegerField::new();
        field.set_options(
            &PropertyDef::new("n", PropertyType::IntegerBounded)
                .lower(1)
                .upper(2)
                .choices([1_i64, 2])
                .default(1),
        );
        assert_eq!(field.lower, Some(1));
        assert_eq!(field.upper, Some(2));
        assert_eq!(field.options().default, Some(Value::Int(1)));
        assert_eq!(
            field.options().choices,
            Some(vec![Value::Int(1), Value::Int(2)])
        );
    }

    // ── BooleanField ─────────────────────────────────────────────────

    #[rstest]
    #[case("true", Value::Bool(true))]
    #[case("True", Value::Bool(true))]
    #[case("TRUE", Value::Bool(true))]
    #[case("false", Value::Bool(false))]
    #[case("FALSE", Value::Bool(false))]
    #[case("", Value::Null)]
    fn test_boolean_normalize(#[case] input: &str, #[case] expected: Value) {
        assert_eq!(BooleanField::new().normalize(s(input)).unwrap(), expected);
    }

    #[test]
    fn test_boolean_validate_and_localize() {
        let field = BooleanField::new();
        assert_eq!(field.validate(&Value::Bool(false)), None);
        assert_eq!(field.validate(&s("")), None);
        for bad in ["foo", "not false", "not true"] {
            assert_eq!(field.validate(&s(bad)).as_deref(), Some("Must be true or false"));
        }
        assert_eq!(field.localize(Value::Bool(false)), Value::Bool(false));
        assert_eq!(field.localize(Value::Null), Value::Null);
    }

    // ── FloatField ───────────────────────────────────────────────────

    #[test]
    #[serial]
    fn test_float_normalize() {
        settings::reset_factories();
        let field = FloatField::new();
        assert_eq!(field.normalize(s("")).unwrap(), Value::Null);
        assert_eq!(field.normalize(Value::Int(1)).unwrap(), Value::Float(1.0));
        assert_eq!(field.normalize(s("1,000.34")).unwrap(), Value::Float(1000.34));
        assert_eq!(field.normalize(s("1.339999999")).unwrap(), Value::Float(1.339_999_999));
    }

    #[test]
    #[serial]
    fn test_float_localize() {
        settings::reset_factories();
        let field = FloatField::new();
        assert_eq!(field.localize(Value::Null), s(""));
        assert_eq!(field.localize(s("")), s(""));
        assert_eq!(field.localize(Value::Float(0.0)), s("0"));
        assert_eq!(field.localize(Value::Int(0)), s("0"));
        assert_eq!(field.localize(Value::Float(1.34)), s("1.34"));
        assert_eq!(field.localize(Value::Float(1_111_000.33)), s("1,111,000.33"));
    }

    #[test]
    #[serial]
    fn test_float_validate() {
        settings::reset_factories();
        let field = FloatField::new();
        assert_eq!(field.validate(&s("1,090,898.00")), None);
        assert_eq!(field.validate(&Value::Float(1.34)), None);
        assert_eq!(field.validate(&s("123h")).as_deref(), Some("Must be a number"));

        let field = FloatField::new().lower(1.2).upper(1.3);
        assert_eq!(field.validate(&s("1.21")), None);
        assert_eq!(field.validate(&s("0")).as_deref(), Some("Must be greater than 1.2"));
        assert_eq!(field.validate(&s("2")).as_deref(), Some("Must be less than 1.3"));
    }

    // ── DecimalField ─────────────────────────────────────────────────

    #[rstest]
    #[case("1.339999999", "1.34")]
    #[case("0", "0")]
    #[case("1,000.34", "1000.34")]
    #[case("1,111,000.3399999", "1111000.34")]
    #[case("0.005", "0.01")]
    #[serial]
    fn test_decimal_normalize(#[case] input: &str, #[case] expected: &str) {
        settings::reset_factories();
        assert_eq!(DecimalField::new().normalize(s(input)).unwrap(), dec(expected));
    }

    #[test]
    #[serial]
    fn test_decimal_places() {
        settings::reset_factories();
        let field = DecimalField::new().decimal_places(3);
        assert_eq!(field.normalize(s("1.339999999")).unwrap(), dec("1.34"));
        assert_eq!(field.normalize(s("0.0014")).unwrap(), dec("0.001"));
    }

    #[test]
    #[serial]
    fn test_decimal_validate() {
        settings::reset_factories();
        let field = DecimalField::new();
        assert_eq!(field.validate(&s("")), None);
        assert_eq!(field.validate(&dec("1.32")), None);
        assert_eq!(field.validate(&s("foo")).as_deref(), Some("Must be a number"));

        let field = DecimalField::new().lower(Decimal::ONE).upper(Decimal::TEN);
        assert_eq!(field.validate(&s("1")), None);
        assert_eq!(field.validate(&s("0")).as_deref(), Some("Must be greater than 1"));
        assert_eq!(field.validate(&s("11")).as_deref(), Some("Must be less than 10"));
    }

    #[test]
    #[serial]
    fn test_decimal_set_options_rounds_bounds() {
        settings::reset_factories();
        let mut field = DecimalField::new();
        field.set_options(
            &PropertyDef::new("d", PropertyType::SimpleDecimal)
                .decimal_places(3)
                .lower("0.001"),
        );
        assert_eq!(field.validate(&s("0.001")), None);
        assert_eq!(
            field.validate(&s("0.0001")).as_deref(),
            Some("Must be greater than 0.001")
        );

        let mut currency = DecimalField::new();
        currency.set_options(&PropertyDef::new("c", PropertyType::SimpleCurrency));
        assert_eq!(
            currency.validate(&s("-0.01")).as_deref(),
            Some("Must be greater than 0")
        );
    }

    #[test]
    #[serial]
    fn test_decimal_localize() {
        settings::reset_factories();
        let field = DecimalField::new();
        assert_eq!(field.localize(Value::Null), s(""));
        assert_eq!(field.localize(dec("0.0")), s("0"));
        assert_eq!(field.localize(dec("1111000.34")), s("1,111,000.34"));
    }

    // ── DateField / DateTimeField ────────────────────────────────────

    #[test]
    #[serial]
    fn test_date() {
        settings::reset_factories();
        let field = DateField::new();
        let date = NaiveDate::from_ymd_opt(2000, 9, 30).unwrap();
        assert_eq!(field.normalize(s("09/30/2000")).unwrap(), Value::Date(date));
        assert_eq!(field.normalize(Value::Date(date)).unwrap(), Value::Date(date));
        assert_eq!(field.localize(Value::Date(date)), s("09/30/2000"));
        assert_eq!(field.validate(&s("09/30/2000")), None);
        assert_eq!(
            field.validate(&s("09/30/a")).as_deref(),
            Some("Invalid date. Valid example: 12/25/2016")
        );
    }

    #[test]
    #[serial]
    fn test_numeric_fields_accept_choices_of_another_variant() {
        settings::reset_factories();
        let float = FloatField::new().choices([1_i64, 2]);
        assert_eq!(float.validate(&s("1")), None);
        assert_eq!(float.validate(&s("2.0")), None);
        assert_eq!(float.validate(&s("1.5")).as_deref(), Some("Must be one of: 1; 2"));

        let decimal = DecimalField::new().choices([1_i64, 2]);
        assert_eq!(decimal.validate(&s("1.00")), None);
        assert_eq!(decimal.validate(&s("2.5")).as_deref(), Some("Must be one of: 1; 2"));

        let integer = IntegerField::new().choices([Decimal::ONE, Decimal::TWO]);
        assert_eq!(integer.validate(&s("2")), None);
        assert!(integer.validate(&s("3")).is_some());
    }

    #[rstest]
    #[case("en_US", "01/02/0999")]
    #[case("pt_BR", "02/01/0999")]
    #[serial]
    fn test_date_round_trip_keeps_short_years(#[case] loc: &'static str, #[case] text: &str) {
        settings::reset_factories();
        settings::set_locale_factory(move || loc.to_string());
        let field = DateField::new();
        let date = Value::Date(NaiveDate::from_ymd_opt(999, 1, 2).unwrap());
        assert_eq!(field.localize(date.clone()), s(text));
        assert_eq!(field.normalize(s(text)).unwrap(), date);
        settings::reset_factories();
    }

    #[test]
    #[serial]
    fn test_datetime_round_trip_keeps_short_years() {
        settings::reset_factories();
        let field = DateTimeField::new();
        let utc = Value::DateTime(
            NaiveDate::from_ymd_opt(999, 1, 2)
                .unwrap()
                .and_hms_opt(3, 4, 5)
                .unwrap(),
        );
        let localized = field.localize(utc.clone());
        assert_eq!(localized, s("01/02/0999 03:04:05"));
        assert_eq!(field.normalize(localized).unwrap(), utc);
    }

    #[test]
    #[serial]
    fn test_datetime_normalize() {
        sao_paulo();
        let field = DateTimeField::new();
        let expected = NaiveDate::from_ymd_opt(2000, 10, 1)
            .unwrap()
            .and_hms_opt(2, 0, 0)
            .unwrap();
        assert_eq!(
            field.normalize(s("09/30/2000 23:00:00")).unwrap(),
            Value::DateTime(expected)
        );
        assert_eq!(
            field.normalize(s("09/30/2016, 12:00:00")).unwrap(),
            Value::DateTime(
                NaiveDate::from_ymd_opt(2016, 9, 30)
                    .unwrap()
                    .and_hms_opt(15, 0, 0)
                    .unwrap()
            )
        );
        assert_eq!(
            field.normalize(Value::DateTime(expected)).unwrap(),
            Value::DateTime(expected)
        );
        assert!(field.normalize(s("09/30/2000")).is_err());
        settings::reset_factories();
    }

    #[test]
    #[serial]
    fn test_datetime_localize() {
        sao_paulo();
        let field = DateTimeField::new();
        let utc = NaiveDate::from_ymd_opt(2000, 10, 1)
            .unwrap()
            .and_hms_opt(2, 0, 0)
            .unwrap();
        assert_eq!(field.localize(Value::DateTime(utc)), s("09/30/2000 23:00:00"));
        settings::reset_factories();
    }

    #[test]
    #[serial]
    fn test_datetime_validate() {
        sao_paulo();
        let field = DateTimeField::new();
        assert_eq!(field.validate(&s("09/30/2000 23:59:00")), None);
        assert_eq!(
            field.validate(&s("09/30/2000 23:59:a")).as_deref(),
            Some("Invalid datetime. Valid example: 12/25/2016 16:00:00")
        );
        settings::reset_factories();
    }
}

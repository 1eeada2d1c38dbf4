//! Form trait and `BaseForm` implementation.
//!
//! A form is an ordered set of named field descriptors plus the raw values
//! filled into it. [`Form::validate`] collects one message per failing field,
//! [`Form::normalize`] converts the filled values for storage, and
//! [`Form::localize`] goes the other way, turning stored values into what a
//! user edits.
//!
//! ```
//! use formbind_db::Value;
//! use formbind_forms::fields::{IntegerField, StringField};
//! use formbind_forms::form::{BaseForm, Form};
//!
//! let mut form = BaseForm::new("Person")
//!     .field("name", StringField::new().required())
//!     .field("age", IntegerField::new());
//! form.fill([("age", "32"), ("nickname", "ignored")]);
//!
//! let errors = form.validate();
//! assert_eq!(errors["name"], "Required field");
//! assert_eq!(form.normalize().unwrap()["age"], Value::Int(32));
//! ```

use std::collections::BTreeMap;
use std::fmt;

use formbind_core::logging::form_span;
use formbind_db::{Value, ValueMap};

use crate::error::{FormError, FormResult};
use crate::fields::FormField;

/// Field name to validation message.
pub type ErrorMap = BTreeMap<String, String>;

/// The core form trait.
///
/// Implementations only provide access to their [`BaseForm`]; wrappers
/// override [`clean`](Form::clean) to add errors that involve more than one
/// field.
pub trait Form: Send + Sync {
    /// The fields and filled values.
    fn base(&self) -> &BaseForm;

    /// Mutable access to the fields and filled values.
    fn base_mut(&mut self) -> &mut BaseForm;

    /// Cross-field validation hook. The returned errors are merged into
    /// [`validate`](Form::validate)'s result, replacing field errors with
    /// the same name.
    fn clean(&self) -> Result<(), ErrorMap> {
        Ok(())
    }

    /// Sets the values whose names are fields. Other names are ignored.
    fn fill<I, K, V>(&mut self, pairs: I)
    where
        Self: Sized,
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Value>,
    {
        self.base_mut().fill(pairs);
    }

    /// Validates every field, then runs [`clean`](Form::clean).
    fn validate(&self) -> ErrorMap {
        let mut errors = self.base().validate_fields();
        if let Err(extra) = self.clean() {
            errors.extend(extra);
        }
        errors
    }

    /// Normalizes every field. Fields never filled yield their default, or
    /// `Null`.
    fn normalize(&self) -> FormResult<ValueMap> {
        self.base().normalize_fields()
    }

    /// Localizes `fields` (every field when empty) from `values`, stores the
    /// results as the filled values and returns them.
    fn localize(&mut self, fields: &[&str], values: &ValueMap) -> FormResult<ValueMap> {
        self.base_mut().localize_fields(fields, values)
    }
}

/// A general-purpose form built from a list of field descriptors.
pub struct BaseForm {
    name: String,
    fields: Vec<(String, Box<dyn FormField>)>,
    values: ValueMap,
}

impl fmt::Debug for BaseForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BaseForm")
            .field("name", &self.name)
            .field("fields", &self.field_names().collect::<Vec<_>>())
            .field("values", &self.values)
            .finish()
    }
}

impl BaseForm {
    /// Creates a form without fields. The name only shows up in logs.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
            values: ValueMap::new(),
        }
    }

    /// Adds a field, replacing any field with the same name.
    #[must_use]
    pub fn field(mut self, name: impl Into<String>, field: impl FormField + 'static) -> Self {
        self.insert_field(name, Box::new(field));
        self
    }

    /// Adds a boxed field, replacing any field with the same name in place.
    pub fn insert_field(&mut self, name: impl Into<String>, field: Box<dyn FormField>) {
        let name = name.into();
        match self.fields.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = field,
            None => self.fields.push((name, field)),
        }
    }

    /// The form's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The field names in declaration order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    /// Looks up a field descriptor.
    pub fn get_field(&self, name: &str) -> Option<&dyn FormField> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, field)| field.as_ref())
    }

    /// Returns `true` if `name` is one of the fields.
    pub fn has_field(&self, name: &str) -> bool {
        self.get_field(name).is_some()
    }

    /// The filled value of a field.
    pub fn value(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// The filled values.
    pub const fn values(&self) -> &ValueMap {
        &self.values
    }

    /// Sets the values whose names are fields. Other names are ignored.
    pub fn fill<I, K, V>(&mut self, pairs: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Value>,
    {
        for (name, value) in pairs {
            let name = name.as_ref();
            if self.has_field(name) {
                self.values.insert(name.to_string(), value.into());
            } else {
                tracing::trace!(form = %self.name, field = name, "Ignoring value for unknown field");
            }
        }
    }

    /// Builder form of [`fill`](Self::fill).
    #[must_use]
    pub fn with_values<I, K, V>(mut self, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Value>,
    {
        self.fill(pairs);
        self
    }

    /// Runs every field's validation on its filled value (`Null` when not
    /// filled).
    pub fn validate_fields(&self) -> ErrorMap {
        let _span = form_span(&self.name, "validate").entered();
        self.fields
            .iter()
            .filter_map(|(name, field)| {
                let value = self.values.get(name).unwrap_or(&Value::Null);
                let message = field.validate(value)?;
                tracing::trace!(field = %name, %message, "Field is invalid");
                Some((name.clone(), message))
            })
            .collect()
    }

    /// Normalizes every field's filled value.
    pub fn normalize_fields(&self) -> FormResult<ValueMap> {
        let _span = form_span(&self.name, "normalize").entered();
        self.fields
            .iter()
            .map(|(name, field)| {
                let normalized = match self.values.get(name) {
                    Some(value) => field.normalize(value.clone()),
                    None => Ok(field.options().default.clone().unwrap_or(Value::Null)),
                };
                normalized
                    .map(|value| (name.clone(), value))
                    .map_err(|source| FormError::Field {
                        field: name.clone(),
                        source,
                    })
            })
            .collect()
    }

    /// Localizes `fields` (every field when empty) from `values` and stores
    /// the results as the filled values.
    pub fn localize_fields(&mut self, fields: &[&str], values: &ValueMap) -> FormResult<ValueMap> {
        let _span = form_span(&self.name, "localize").entered();
        let names: Vec<String> = if fields.is_empty() {
            self.field_names().map(str::to_string).collect()
        } else {
            fields.iter().map(|name| (*name).to_string()).collect()
        };

        let mut localized = ValueMap::new();
        for name in names {
            let field = self
                .get_field(&name)
                .ok_or_else(|| FormError::UnknownField(name.clone()))?;
            let value = field.localize(values.get(&name).cloned().unwrap_or(Value::Null));
            localized.insert(name, value);
        }
        self.values
            .extend(localized.iter().map(|(k, v)| (k.clone(), v.clone())));
        Ok(localized)
    }
}

impl Form for BaseForm {
    fn base(&self) -> &BaseForm {
        self
    }

    fn base_mut(&mut self) -> &mut BaseForm {
        self
    }
}

//! Error types for field descriptors and forms.
//!
//! Validation failures are not errors: [`FormField::validate`] returns the
//! message to show to the user. The types here cover what `normalize` does
//! when it is handed input that never validated, and the ways a form can be
//! declared or used incorrectly.
//!
//! [`FormField::validate`]: crate::fields::FormField::validate

use formbind_core::FormbindError;
use formbind_db::DbError;
use thiserror::Error;

/// A raw value could not be turned into the field's domain type.
#[derive(Error, Debug)]
pub enum FieldError {
    /// The input is not a number in the active locale.
    #[error(transparent)]
    Number(#[from] crate::l10n::NumberFormatError),

    /// The input is neither `true` nor `false`.
    #[error("Should be true or false, got {0:?}")]
    Boolean(String),

    /// The input does not hold a date in the active locale.
    #[error("Invalid date: {0:?}")]
    Date(String),

    /// The input does not hold a date and a time separated by one space.
    #[error("Invalid datetime: {0:?}")]
    DateTime(String),

    /// A numeric id was given to a key field that has no kind.
    #[error("Key's kind should be defined to convert id {0:?}")]
    KindNotDefined(String),

    /// The input is neither an id nor an url-safe key.
    #[error("Invalid key: {0:?}")]
    Key(String),

    /// The value has a type the field does not accept.
    #[error("Expected {expected}, got {found}")]
    UnexpectedType {
        /// What the field accepts.
        expected: &'static str,
        /// What was handed in.
        found: String,
    },

    /// The locale or the timezone could not be resolved.
    #[error(transparent)]
    Core(#[from] FormbindError),
}

impl FieldError {
    pub(crate) fn unexpected(expected: &'static str, found: &formbind_db::Value) -> Self {
        Self::UnexpectedType {
            expected,
            found: format!("{} {found}", found.type_name()),
        }
    }
}

/// Errors raised while building or using a form.
#[derive(Error, Debug)]
pub enum FormError {
    /// `include` and `exclude` were both given to a model form.
    #[error("Invalid params: {0}")]
    InvalidParams(String),

    /// A model property has a type with no registered form field.
    #[error("The {property} attribute from {model} has a property not registered: {property_type}")]
    NotRegisteredProperty {
        /// The property name.
        property: String,
        /// The model kind.
        model: String,
        /// The name of the property type.
        property_type: String,
    },

    /// A name that is not one of the form's fields.
    #[error("Unknown field: {0}")]
    UnknownField(String),

    /// A field could not normalize its value.
    #[error("Field '{field}': {source}")]
    Field {
        /// The field name.
        field: String,
        /// The underlying failure.
        #[source]
        source: FieldError,
    },

    /// The model rejected a normalized value.
    #[error(transparent)]
    Model(#[from] DbError),

    /// Settings, locale or timezone failure.
    #[error(transparent)]
    Core(#[from] FormbindError),
}

/// A convenience result alias for form operations.
pub type FormResult<T> = Result<T, FormError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_error_display() {
        assert_eq!(
            FieldError::Boolean("foo".into()).to_string(),
            "Should be true or false, got \"foo\""
        );
        let err = FieldError::unexpected("string", &formbind_db::Value::Int(1));
        assert_eq!(err.to_string(), "Expected string, got int 1");
    }

    #[test]
    fn test_form_error_display() {
        let err = FormError::NotRegisteredProperty {
            property: "blob".into(),
            model: "Upload".into(),
            property_type: "bytes".into(),
        };
        assert_eq!(
            err.to_string(),
            "The blob attribute from Upload has a property not registered: bytes"
        );

        let err = FormError::Field {
            field: "age".into(),
            source: FieldError::Boolean("x".into()),
        };
        assert!(err.to_string().starts_with("Field 'age':"));
    }

    #[test]
    fn test_from_db_error() {
        let err: FormError = DbError::RequiredProperty("name".into()).into();
        assert!(matches!(err, FormError::Model(_)));
    }
}

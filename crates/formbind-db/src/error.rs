//! Errors raised by the model layer.

use thiserror::Error;

/// Errors raised when assigning, converting or storing model values.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DbError {
    /// A value falls outside the bounds or length a property declares.
    #[error("Boundary error on '{property}': {message}")]
    BoundaryError {
        /// The property being assigned.
        property: String,
        /// What was violated, e.g. "0 is less than 1".
        message: String,
    },

    /// A value is not one of the property's choices.
    #[error("Invalid choice for '{property}': {value}")]
    InvalidChoice {
        /// The property being assigned.
        property: String,
        /// The rejected value.
        value: String,
    },

    /// A required property was empty when the model was stored.
    #[error("Property '{0}' is required")]
    RequiredProperty(String),

    /// The model has no property with this name.
    #[error("{kind} has no property named '{name}'")]
    UnknownProperty {
        /// The model kind.
        kind: String,
        /// The requested name.
        name: String,
    },

    /// A value has the wrong type for the target.
    #[error("Expected {expected}, found {found}")]
    TypeMismatch {
        /// The expected type.
        expected: &'static str,
        /// The type (and value) actually received.
        found: String,
    },

    /// A key could not be built or decoded.
    #[error("Invalid key: {0}")]
    InvalidKey(String),
}

/// A convenience result alias for model operations.
pub type DbResult<T> = Result<T, DbError>;

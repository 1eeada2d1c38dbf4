//! Core error types for formbind.
//!
//! [`FormbindError`] covers the failures that can happen outside of a single
//! form: bad configuration, unknown locales or timezones, and broken
//! translation catalogs. Field-level problems are reported as messages, not
//! errors, and live in `formbind-forms`.

use thiserror::Error;

/// The primary error type of the core crate.
#[derive(Error, Debug)]
pub enum FormbindError {
    /// Settings could not be loaded or are inconsistent.
    #[error("Improperly configured: {0}")]
    ConfigurationError(String),

    /// A locale identifier could not be parsed.
    #[error("Unknown locale: {0}")]
    UnknownLocale(String),

    /// A timezone name is not part of the tz database.
    #[error("Unknown timezone: {0}")]
    UnknownTimezone(String),

    /// A translation catalog could not be loaded.
    #[error("Translation catalog error: {0}")]
    CatalogError(String),
}

/// A convenience result alias for core operations.
pub type FormbindResult<T> = Result<T, FormbindError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = FormbindError::UnknownTimezone("Mars/Olympus".into());
        assert_eq!(err.to_string(), "Unknown timezone: Mars/Olympus");

        let err = FormbindError::UnknownLocale("x-".into());
        assert_eq!(err.to_string(), "Unknown locale: x-");

        let err = FormbindError::ConfigurationError("bad".into());
        assert_eq!(err.to_string(), "Improperly configured: bad");
    }
}

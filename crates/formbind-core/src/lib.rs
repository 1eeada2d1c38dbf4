//! # formbind-core
//!
//! Core types shared by every formbind crate.
//!
//! ## Modules
//!
//! - [`error`] - Error types and result aliases
//! - [`settings`] - Settings plus the locale and timezone factories
//! - [`settings_loader`] - Loading settings from TOML, JSON and the environment
//! - [`locale`] - Locale identifiers
//! - [`i18n`] - Message translation and timezone conversion
//! - [`logging`] - Tracing-based logging integration

pub mod error;
pub mod i18n;
pub mod locale;
pub mod logging;
pub mod settings;
pub mod settings_loader;

// Re-export the most commonly used types at the crate root.
pub use error::{FormbindError, FormbindResult};
pub use locale::Locale;
pub use settings::{Settings, SETTINGS};

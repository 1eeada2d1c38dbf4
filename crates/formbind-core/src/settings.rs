//! Settings and the locale/timezone factories.
//!
//! [`Settings`] holds the configuration of an application using formbind and
//! [`LazySettings`] makes it globally reachable once configured.
//!
//! Field descriptors never read the settings directly. They ask
//! [`get_locale`] and [`get_timezone`], which consult, in order:
//!
//! 1. a factory installed with [`set_locale_factory`] / [`set_tz_factory`]
//!    (typically reading the current user's preferences),
//! 2. the globally configured [`SETTINGS`],
//! 3. the defaults `en_US` and `UTC`.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock, PoisonError, RwLock};

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::FormbindResult;
use crate::i18n::timezone::parse_timezone;
use crate::locale::Locale;

/// The default locale when neither a factory nor settings provide one.
pub const DEFAULT_LOCALE: &str = "en_US";

/// The default timezone when neither a factory nor settings provide one.
pub const DEFAULT_TIME_ZONE: &str = "UTC";

/// The default maximum length of an indexed string field.
pub const DEFAULT_MAX_STRING_LENGTH: usize = 1500;

/// Output format of the tracing subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable, multi-line output.
    Pretty,
    /// One JSON object per event.
    #[default]
    Json,
}

/// Application configuration. Keys missing from a loaded document keep
/// their defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // ── Core ─────────────────────────────────────────────────────────

    /// Enables debug behaviour (pretty logs).
    pub debug: bool,

    // ── Internationalization ─────────────────────────────────────────

    /// The locale used for number and date conventions (e.g. "`en_US`").
    pub language_code: String,
    /// The IANA timezone user input is interpreted in (e.g. "UTC").
    pub time_zone: String,

    // ── Forms ────────────────────────────────────────────────────────

    /// The maximum length generated string fields accept for indexed
    /// string properties.
    pub max_string_length: usize,

    // ── Logging ──────────────────────────────────────────────────────

    /// The log level filter (e.g. "info", "formbind_forms=debug").
    pub log_level: String,
    /// The log output format used outside of debug mode.
    pub log_format: LogFormat,

    // ── Escape hatch ─────────────────────────────────────────────────

    /// Custom settings that don't fit into the above categories.
    pub extra: HashMap<String, serde_json::Value>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            debug: true,
            language_code: DEFAULT_LOCALE.to_string(),
            time_zone: DEFAULT_TIME_ZONE.to_string(),
            max_string_length: DEFAULT_MAX_STRING_LENGTH,
            log_level: "info".to_string(),
            log_format: LogFormat::Json,
            extra: HashMap::new(),
        }
    }
}

/// A lazily-initialized, globally-accessible settings container.
pub struct LazySettings {
    inner: OnceLock<Settings>,
}

impl Default for LazySettings {
    fn default() -> Self {
        Self::new()
    }
}

impl LazySettings {
    /// Creates a new, unconfigured `LazySettings`.
    pub const fn new() -> Self {
        Self {
            inner: OnceLock::new(),
        }
    }

    /// Configures the settings. Returns the rejected settings if they were
    /// already configured.
    pub fn configure(&self, settings: Settings) -> Result<(), Settings> {
        self.inner.set(settings)
    }

    /// Returns the configured settings, if any.
    pub fn try_get(&self) -> Option<&Settings> {
        self.inner.get()
    }

    /// Returns `true` if settings have been configured.
    pub fn is_configured(&self) -> bool {
        self.inner.get().is_some()
    }
}

/// The global settings instance.
pub static SETTINGS: LazySettings = LazySettings::new();

// ── Factories ────────────────────────────────────────────────────────────

type Factory = Arc<dyn Fn() -> String + Send + Sync>;

fn locale_factory() -> &'static RwLock<Option<Factory>> {
    static FACTORY: OnceLock<RwLock<Option<Factory>>> = OnceLock::new();
    FACTORY.get_or_init(|| RwLock::new(None))
}

fn tz_factory() -> &'static RwLock<Option<Factory>> {
    static FACTORY: OnceLock<RwLock<Option<Factory>>> = OnceLock::new();
    FACTORY.get_or_init(|| RwLock::new(None))
}

/// Installs the function that decides the locale of every field descriptor.
///
/// ```
/// use formbind_core::settings;
///
/// settings::set_locale_factory(|| "pt_BR".to_string());
/// assert_eq!(settings::get_locale().unwrap().to_string(), "pt_BR");
/// settings::reset_factories();
/// ```
pub fn set_locale_factory<F>(factory: F)
where
    F: Fn() -> String + Send + Sync + 'static,
{
    *locale_factory()
        .write()
        .unwrap_or_else(PoisonError::into_inner) = Some(Arc::new(factory));
}

/// Installs the function that decides the timezone user input is read in.
pub fn set_tz_factory<F>(factory: F)
where
    F: Fn() -> String + Send + Sync + 'static,
{
    *tz_factory().write().unwrap_or_else(PoisonError::into_inner) = Some(Arc::new(factory));
}

/// Removes both factories, falling back to settings and defaults.
pub fn reset_factories() {
    *locale_factory()
        .write()
        .unwrap_or_else(PoisonError::into_inner) = None;
    *tz_factory().write().unwrap_or_else(PoisonError::into_inner) = None;
}

fn call_factory(slot: &RwLock<Option<Factory>>) -> Option<String> {
    let factory = slot
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone();
    factory.map(|f| f())
}

/// Returns the identifier of the current locale without parsing it.
pub fn locale_name() -> String {
    call_factory(locale_factory())
        .or_else(|| SETTINGS.try_get().map(|s| s.language_code.clone()))
        .unwrap_or_else(|| DEFAULT_LOCALE.to_string())
}

/// Returns the name of the current timezone without parsing it.
pub fn timezone_name() -> String {
    call_factory(tz_factory())
        .or_else(|| SETTINGS.try_get().map(|s| s.time_zone.clone()))
        .unwrap_or_else(|| DEFAULT_TIME_ZONE.to_string())
}

/// Builds the current [`Locale`].
pub fn get_locale() -> FormbindResult<Locale> {
    Locale::parse(&locale_name())
}

/// Builds the current timezone.
pub fn get_timezone() -> FormbindResult<Tz> {
    parse_timezone(&timezone_name())
}

/// Returns the configured maximum length for indexed string fields.
pub fn max_string_length() -> usize {
    SETTINGS
        .try_get()
        .map_or(DEFAULT_MAX_STRING_LENGTH, |s| s.max_string_length)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_default_settings() {
        let s = Settings::default();
        assert!(s.debug);
        assert_eq!(s.language_code, "en_US");
        assert_eq!(s.time_zone, "UTC");
        assert_eq!(s.max_string_length, 1500);
        assert_eq!(s.log_level, "info");
        assert_eq!(s.log_format, LogFormat::Json);
        assert!(s.extra.is_empty());
    }

    #[test]
    fn test_lazy_settings_configure_once() {
        let lazy = LazySettings::new();
        assert!(!lazy.is_configured());
        assert!(lazy.try_get().is_none());

        let settings = Settings {
            language_code: "pt_BR".into(),
            ..Settings::default()
        };
        assert!(lazy.configure(settings).is_ok());
        assert_eq!(lazy.try_get().unwrap().language_code, "pt_BR");

        let rejected = lazy.configure(Settings::default()).unwrap_err();
        assert_eq!(rejected.language_code, "en_US");
    }

    #[test]
    #[serial]
    fn test_defaults_without_factories() {
        reset_factories();
        assert_eq!(get_locale().unwrap().to_string(), "en_US");
        assert_eq!(get_timezone().unwrap(), Tz::UTC);
    }

    #[test]
    #[serial]
    fn test_factories_override_defaults() {
        set_locale_factory(|| "pt_BR".to_string());
        set_tz_factory(|| "America/Sao_Paulo".to_string());
        assert_eq!(get_locale().unwrap().to_string(), "pt_BR");
        assert_eq!(get_timezone().unwrap(), Tz::America__Sao_Paulo);
        reset_factories();
        assert_eq!(locale_name(), "en_US");
    }

    #[test]
    #[serial]
    fn test_bad_factory_values_surface_as_errors() {
        set_tz_factory(|| "Mars/Olympus".to_string());
        assert!(get_timezone().is_err());
        set_locale_factory(|| "not a locale".to_string());
        assert!(get_locale().is_err());
        reset_factories();
    }
}

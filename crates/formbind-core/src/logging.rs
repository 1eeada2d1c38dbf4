//! Logging integration.
//!
//! Provides [`setup_logging`] to install a [`tracing`] subscriber from
//! [`Settings`] and [`form_span`] to group the events of one form operation.

use crate::settings::{LogFormat, Settings};

/// The output format [`setup_logging`] installs: pretty in debug mode,
/// `settings.log_format` (JSON unless configured) otherwise.
pub const fn output_format(settings: &Settings) -> LogFormat {
    if settings.debug {
        LogFormat::Pretty
    } else {
        settings.log_format
    }
}

/// Sets up the global tracing subscriber based on the given settings.
///
/// The filter is read from `settings.log_level` (e.g. "debug",
/// "`formbind_forms=trace`") and the format from [`output_format`].
/// Installing a second subscriber is a no-op.
pub fn setup_logging(settings: &Settings) {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_new(&settings.log_level).unwrap_or_else(|_| EnvFilter::new("info"));

    if output_format(settings) == LogFormat::Pretty {
        fmt::Subscriber::builder()
            .with_env_filter(filter)
            .with_target(true)
            .with_thread_ids(false)
            .with_file(true)
            .with_line_number(true)
            .pretty()
            .try_init()
            .ok();
    } else {
        fmt::Subscriber::builder()
            .with_env_filter(filter)
            .with_target(true)
            .json()
            .try_init()
            .ok();
    }
}

/// Creates a tracing span for one operation on a form.
///
/// ```
/// use formbind_core::logging::form_span;
///
/// let span = form_span("UserForm", "validate");
/// let _guard = span.enter();
/// tracing::debug!("validating");
/// ```
pub fn form_span(form: &str, operation: &str) -> tracing::Span {
    tracing::debug_span!("form", name = form, op = operation)
}

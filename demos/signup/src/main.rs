//! # formbind signup demo
//!
//! Fills a model form from `name=value` pairs, prints the validation errors
//! or stores the customer, then localizes the stored customer back into a
//! form the way an edit page would.
//!
//! ```bash
//! cargo run -p signup-demo -- --settings demos/signup/signup.toml \
//!     -f name=Renzo -f email=renzo@example.com -f cpf=067.687.258-15 \
//!     -f cep_declared=true -f cep=01310-100 -f birth_date=25/12/1990 \
//!     -f credit_limit=1.500,50
//! ```

mod models;

use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::Parser;
use formbind::core::{i18n, logging, settings_loader};
use formbind::prelude::*;

use models::SignupForm;

/// Command-line arguments.
#[derive(Parser, Debug)]
#[command(name = "signup", about = "Validate, store and localize a customer signup")]
struct Cli {
    /// TOML settings file. Defaults to `signup.toml` when it exists.
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Overrides the configured locale (e.g. `en_US`).
    #[arg(long)]
    locale: Option<String>,

    /// A form value as `name=value`. May be repeated.
    #[arg(short = 'f', long = "field", value_parser = parse_pair)]
    fields: Vec<(String, String)>,
}

fn parse_pair(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(name, value)| (name.trim().to_string(), value.to_string()))
        .ok_or_else(|| format!("expected name=value, got {raw:?}"))
}

fn load_settings(cli: &Cli) -> anyhow::Result<Settings> {
    let mut settings = match &cli.settings {
        Some(path) => settings_loader::from_toml_file_with_env(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None if Path::new("signup.toml").exists() => {
            settings_loader::from_toml_file_with_env("signup.toml")?
        }
        None => settings_loader::from_env(),
    };
    if let Some(locale) = &cli.locale {
        settings.language_code.clone_from(locale);
    }
    Ok(settings)
}

fn sample_fields() -> Vec<(String, String)> {
    [
        ("name", "Renzo Nuccitelli"),
        ("email", "renzo@example.com"),
        ("cpf", "067.687.258-15"),
        ("cep_declared", "true"),
        ("cep", "01310-100"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let settings = load_settings(&cli)?;

    logging::setup_logging(&settings);
    i18n::activate(&settings.language_code);
    tracing::info!(
        locale = %settings.language_code,
        time_zone = %settings.time_zone,
        "Signup demo configured"
    );
    if formbind::core::SETTINGS.configure(settings).is_err() {
        tracing::warn!("Settings were already configured");
    }

    let fields = if cli.fields.is_empty() {
        sample_fields()
    } else {
        cli.fields
    };

    let mut form = SignupForm::new()?;
    form.fill(fields);
    let errors = form.validate();
    if !errors.is_empty() {
        for (field, message) in &errors {
            println!("{field}: {message}");
        }
        bail!("{} field(s) failed validation", errors.len());
    }

    let store = MemoryStore::new();
    let mut customer = form.inner.fill_model()?;
    let key = store.put(&mut customer)?;
    tracing::info!(key = %key, "Stored customer");

    let mut edit = SignupForm::new()?;
    let localized = edit.inner.fill_with_model(&customer, &[])?;
    println!("Stored {} as:", key.urlsafe());
    for (field, value) in &localized {
        println!("  {field} = {value}");
    }
    Ok(())
}

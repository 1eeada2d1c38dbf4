//! # formbind
//!
//! Declarative form fields bound to model properties.
//!
//! This is the meta-crate that re-exports the sub-crates. Depend on
//! `formbind` to get everything, or on the individual crates for finer
//! control.
//!
//! ```
//! use formbind::prelude::*;
//!
//! let mut form = BaseForm::new("Signup")
//!     .field("email", EmailField::new().required())
//!     .field("cpf", CpfField::new());
//! form.fill([("email", "foo@bar"), ("cpf", "067.687.258-15")]);
//!
//! let errors = form.validate();
//! assert_eq!(errors["email"], "Invalid email");
//! assert!(!errors.contains_key("cpf"));
//! ```

/// Settings, locale and timezone factories, i18n, logging and errors.
pub use formbind_core as core;

/// Values, keys, property declarations, the `Model` trait and the store.
#[cfg(feature = "db")]
pub use formbind_db as db;

/// `#[derive(Model)]`.
#[cfg(feature = "macros")]
pub use formbind_macros as macros;

/// Field descriptors, forms and model forms.
#[cfg(feature = "forms")]
pub use formbind_forms as forms;

/// Re-exports of the third-party crates that appear in public signatures.
pub mod deps {
    pub use chrono;
    pub use rust_decimal;
    pub use tracing;
}

/// The names most programs need.
pub mod prelude {
    pub use formbind_core::{settings, FormbindError, FormbindResult, Locale, Settings};

    #[cfg(feature = "db")]
    pub use formbind_db::{DbError, Key, MemoryStore, Model, PropertyDef, PropertyType, Value, ValueMap};

    #[cfg(feature = "macros")]
    pub use formbind_macros::Model;

    #[cfg(feature = "forms")]
    pub use formbind_forms::br::{CepField, CnpjField, CpfField};
    #[cfg(feature = "forms")]
    pub use formbind_forms::{
        BaseField, BaseForm, BooleanField, DateField, DateTimeField, DecimalField, EmailField,
        ErrorMap, FloatField, Form, FormError, FormField, IntegerField, KeyField, ModelForm,
        StringField,
    };
}

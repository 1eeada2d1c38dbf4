//! # formbind-forms
//!
//! Form fields that validate raw user input, normalize it for storage and
//! localize stored values back for display, plus forms built by hand or
//! generated from model declarations.
//!
//! ## Modules
//!
//! - [`fields`] - The `FormField` trait and the built-in field types
//! - [`br`] - CEP, CPF and CNPJ fields
//! - [`form`] - The `Form` trait and `BaseForm`
//! - [`model_form`] - `ModelForm`, its builder and the property registry
//! - [`l10n`] - Locale-aware number and date parsing and formatting
//! - [`error`] - `FieldError` and `FormError`

pub mod br;
pub mod error;
pub mod fields;
pub mod form;
pub mod l10n;
pub mod model_form;

pub use error::{FieldError, FormError, FormResult};
pub use fields::{
    BaseField, BooleanField, DateField, DateTimeField, DecimalField, EmailField, FieldOptions,
    FloatField, FormField, IntegerField, KeyField, StringField,
};
pub use form::{BaseForm, ErrorMap, Form};
pub use model_form::{ModelForm, ModelFormBuilder, PropertyRegistry};

//! # formbind-macros
//!
//! `#[derive(Model)]` for formbind. The derive reads `#[model(...)]` on the
//! struct and `#[property(...)]` on its fields and implements
//! `formbind_db::model::Model`.
//!
//! This crate is independent of the other formbind crates because proc-macro
//! crates cannot depend on crates that use them. Generated code refers to
//! `::formbind_db`, which must be a dependency of the deriving crate.
//!
//! ```ignore
//! use formbind_db::Key;
//! use formbind_macros::Model;
//!
//! #[derive(Debug, Default, Model)]
//! #[model(kind = "Address")]
//! struct Address {
//!     #[property(key)]
//!     key: Option<Key>,
//!     #[property(required, max_len = 120)]
//!     street: Option<String>,
//!     #[property(custom = "cep", exactly_len = 8)]
//!     cep: Option<String>,
//!     #[property(default = false)]
//!     cep_declared: Option<bool>,
//! }
//! ```

mod attr;
mod model;

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput};

/// Derives `formbind_db::model::Model`.
///
/// Struct attributes (`#[model(...)]`):
/// - `kind = "Name"`: the key kind, defaults to the struct name.
///
/// Field attributes (`#[property(...)]`):
/// - `key`: the `Option<Key>` field holding the entity key (not a property)
/// - `skip`: not a property
/// - `name = "..."`: the property name, defaults to the field name
/// - `property_type = "email"`: overrides the type inferred from the Rust type
/// - `custom = "cep"`: a custom string-backed property type
/// - `required`, `repeated`, `indexed = false`
/// - `default = <expr>`, `choices = [<expr>, ...]`
/// - `lower = <expr>`, `upper = <expr>`, `decimal_places = 3`
/// - `kind = "Other"`: the kind a key property references
/// - `max_len = 10`, `min_len = 1`, `exactly_len = 8`
#[proc_macro_derive(Model, attributes(model, property))]
pub fn derive_model(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    model::derive_model_impl(input).into()
}

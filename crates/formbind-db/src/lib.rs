//! # formbind-db
//!
//! The model layer formbind binds forms to: dynamically typed [`Value`]s,
//! entity [`Key`]s, property declarations with boundary validation, the
//! [`Model`] trait and an in-memory [`MemoryStore`].
//!
//! ## Modules
//!
//! - [`value`] - `Value`, `ValueMap` and `FromValue`
//! - [`key`] - Entity keys and their url-safe encoding
//! - [`property`] - `PropertyDef` and `PropertyType`
//! - [`model`] - The `Model` trait and `ModelMeta`
//! - [`store`] - The in-memory store
//! - [`error`] - `DbError`

pub mod error;
pub mod key;
pub mod model;
pub mod property;
pub mod store;
pub mod value;

pub use error::{DbError, DbResult};
pub use key::Key;
pub use model::{Model, ModelMeta};
pub use property::{PropertyDef, PropertyType};
pub use store::MemoryStore;
pub use value::{FromValue, Value, ValueMap};

//! Model trait and metadata.
//!
//! The [`Model`] trait is what model forms reflect over. An implementation
//! exposes its property declarations through [`ModelMeta`] and reads and
//! writes property values as [`Value`]s. In practice it is derived with
//! `#[derive(Model)]` from `formbind-macros`, but it can also be written by
//! hand.

use crate::error::DbError;
use crate::key::Key;
use crate::property::PropertyDef;
use crate::value::{Value, ValueMap};

/// The property declarations of a model type.
#[derive(Debug, Clone)]
pub struct ModelMeta {
    /// The kind keys of this model carry (usually the struct name).
    pub kind: &'static str,
    /// Property declarations, in declaration order.
    pub properties: Vec<PropertyDef>,
}

impl ModelMeta {
    /// Creates metadata for `kind` with the given properties.
    pub const fn new(kind: &'static str, properties: Vec<PropertyDef>) -> Self {
        Self { kind, properties }
    }

    /// Looks up a property by name.
    pub fn property(&self, name: &str) -> Option<&PropertyDef> {
        self.properties.iter().find(|p| p.name == name)
    }

    /// Iterates over the property names in declaration order.
    pub fn property_names(&self) -> impl Iterator<Item = &str> {
        self.properties.iter().map(|p| p.name.as_str())
    }
}

/// The core trait for all models.
///
/// # Examples
///
/// ```
/// use std::sync::LazyLock;
/// use formbind_db::error::DbError;
/// use formbind_db::key::Key;
/// use formbind_db::model::{Model, ModelMeta};
/// use formbind_db::property::{PropertyDef, PropertyType};
/// use formbind_db::value::{FromValue, Value};
///
/// #[derive(Default)]
/// struct User {
///     key: Option<Key>,
///     name: Option<String>,
/// }
///
/// impl Model for User {
///     fn meta() -> &'static ModelMeta {
///         static META: LazyLock<ModelMeta> = LazyLock::new(|| {
///             ModelMeta::new("User", vec![PropertyDef::new("name", PropertyType::String).required()])
///         });
///         &META
///     }
///     fn key(&self) -> Option<&Key> { self.key.as_ref() }
///     fn set_key(&mut self, key: Key) { self.key = Some(key); }
///     fn get(&self, name: &str) -> Option<Value> {
///         match name {
///             "name" => Some(Value::from(self.name.clone())),
///             _ => None,
///         }
///     }
///     fn set_raw(&mut self, name: &str, value: Value) -> Result<(), DbError> {
///         match name {
///             "name" => self.name = FromValue::from_value(value)?,
///             _ => return Err(Self::unknown_property(name)),
///         }
///         Ok(())
///     }
/// }
///
/// let mut user = User::default();
/// user.set("name", Value::from("Renzo")).unwrap();
/// assert_eq!(user.to_dict(None)["name"], Value::from("Renzo"));
/// ```
pub trait Model: Send + Sync + 'static {
    /// Returns the static metadata for this model type.
    fn meta() -> &'static ModelMeta;

    /// The key of a stored model, `None` before it is first stored.
    fn key(&self) -> Option<&Key>;

    /// Assigns the key. Called by the store.
    fn set_key(&mut self, key: Key);

    /// Reads a property as stored, without applying defaults. Returns `None`
    /// for names that are not properties.
    fn get(&self, name: &str) -> Option<Value>;

    /// Writes an already validated value into the field backing `name`.
    fn set_raw(&mut self, name: &str, value: Value) -> Result<(), DbError>;

    /// Validates `value` against the property declaration and assigns it.
    fn set(&mut self, name: &str, value: Value) -> Result<(), DbError> {
        let property = Self::meta()
            .property(name)
            .ok_or_else(|| Self::unknown_property(name))?;
        let value = property.validate(value)?;
        self.set_raw(name, value)
    }

    /// Assigns several properties. Stops at the first failure.
    fn populate(&mut self, values: ValueMap) -> Result<(), DbError> {
        for (name, value) in values {
            self.set(&name, value)?;
        }
        Ok(())
    }

    /// Builds a new model from property values.
    fn from_values(values: ValueMap) -> Result<Self, DbError>
    where
        Self: Default,
    {
        let mut model = Self::default();
        model.populate(values)?;
        Ok(model)
    }

    /// Returns the property values, defaults applied, restricted to
    /// `include` when given. Names in `include` that are not properties are
    /// ignored.
    fn to_dict(&self, include: Option<&[&str]>) -> ValueMap {
        Self::meta()
            .properties
            .iter()
            .filter(|p| include.map_or(true, |names| names.contains(&p.name.as_str())))
            .map(|p| {
                let mut value = self.get(&p.name).unwrap_or(Value::Null);
                if value.is_null() {
                    value = p.default.clone().unwrap_or_else(|| {
                        if p.repeated {
                            Value::List(Vec::new())
                        } else {
                            Value::Null
                        }
                    });
                }
                (p.name.clone(), value)
            })
            .collect()
    }

    /// Checks that every required property holds a value.
    fn check_required(&self) -> Result<(), DbError> {
        let values = self.to_dict(None);
        for property in Self::meta().properties.iter().filter(|p| p.required) {
            let empty = match values.get(&property.name) {
                None | Some(Value::Null) => true,
                Some(Value::List(items)) => items.is_empty(),
                Some(_) => false,
            };
            if empty {
                return Err(DbError::RequiredProperty(property.name.clone()));
            }
        }
        Ok(())
    }

    /// The error returned for names that are not properties.
    fn unknown_property(name: &str) -> DbError {
        DbError::UnknownProperty {
            kind: Self::meta().kind.to_string(),
            name: name.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::property::PropertyType;
    use crate::value::FromValue;
    use std::sync::LazyLock;

    #[derive(Debug, Default)]
    struct Product {
        key: Option<Key>,
        name: Option<String>,
        quantity: Option<i64>,
        tags: Vec<String>,
    }

    impl Model for Product {
        fn meta() -> &'static ModelMeta {
            static META: LazyLock<ModelMeta> = LazyLock::new(|| {
                ModelMeta::new(
                    "Product",
                    vec![
                        PropertyDef::new("name", PropertyType::String).required(),
                        PropertyDef::new("quantity", PropertyType::IntegerBounded)
                            .lower(0)
                            .default(1),
                        PropertyDef::new("tags", PropertyType::String).repeated(),
                    ],
                )
            });
            &META
        }

        fn key(&self) -> Option<&Key> {
            self.key.as_ref()
        }

        fn set_key(&mut self, key: Key) {
            self.key = Some(key);
        }

        fn get(&self, name: &str) -> Option<Value> {
            match name {
                "name" => Some(Value::from(self.name.clone())),
                "quantity" => Some(Value::from(self.quantity)),
                "tags" => Some(Value::from(self.tags.clone())),
                _ => None,
            }
        }

        fn set_raw(&mut self, name: &str, value: Value) -> Result<(), DbError> {
            match name {
                "name" => self.name = FromValue::from_value(value)?,
                "quantity" => self.quantity = FromValue::from_value(value)?,
                "tags" => self.tags = FromValue::from_value(value)?,
                _ => return Err(Self::unknown_property(name)),
            }
            Ok(())
        }
    }

    #[test]
    fn test_meta_lookup() {
        let meta = Product::meta();
        assert_eq!(meta.kind, "Product");
        assert_eq!(
            meta.property_names().collect::<Vec<_>>(),
            vec!["name", "quantity", "tags"]
        );
        assert!(meta.property("missing").is_none());
    }

    #[test]
    fn test_to_dict_applies_defaults() {
        let product = Product::default();
        let dict = product.to_dict(None);
        assert_eq!(dict["name"], Value::Null);
        assert_eq!(dict["quantity"], Value::Int(1));
        assert_eq!(dict["tags"], Value::List(vec![]));
    }

    #[test]
    fn test_to_dict_include() {
        let product = Product::default();
        let dict = product.to_dict(Some(&["name", "not_a_property"]));
        assert_eq!(dict.len(), 1);
        assert!(dict.contains_key("name"));
    }

    #[test]
    fn test_set_validates() {
        let mut product = Product::default();
        assert!(matches!(
            product.set("quantity", Value::Int(-1)),
            Err(DbError::BoundaryError { .. })
        ));
        assert!(matches!(
            product.set("color", Value::from("red")),
            Err(DbError::UnknownProperty { .. })
        ));
        product.set("quantity", Value::Int(3)).unwrap();
        assert_eq!(product.quantity, Some(3));
    }

    #[test]
    fn test_from_values() {
        let mut values = ValueMap::new();
        values.insert("name".into(), Value::from("Pen"));
        values.insert("tags".into(), Value::from(vec!["office"]));
        let product = Product::from_values(values).unwrap();
        assert_eq!(product.name.as_deref(), Some("Pen"));
        assert_eq!(product.tags, vec!["office".to_string()]);
        assert!(product.key().is_none());
    }

    #[test]
    fn test_check_required() {
        let mut product = Product::default();
        assert_eq!(
            product.check_required(),
            Err(DbError::RequiredProperty("name".into()))
        );
        product.set("name", Value::from("Pen")).unwrap();
        assert!(product.check_required().is_ok());
    }
}

//! Forms generated from model declarations.
//!
//! [`ModelForm`] reads the [`PropertyDef`]s of a [`Model`] and creates one
//! field per property through the [`PropertyRegistry`], configured with
//! [`FormField::set_options`]. Fields declared on the builder take the place
//! of generated ones.
//!
//! ```
//! use std::sync::LazyLock;
//! use formbind_db::{DbError, FromValue, Key, Model, ModelMeta, PropertyDef, PropertyType, Value};
//! use formbind_forms::form::Form;
//! use formbind_forms::model_form::ModelForm;
//!
//! #[derive(Default)]
//! struct User {
//!     key: Option<Key>,
//!     name: Option<String>,
//! }
//!
//! impl Model for User {
//!     fn meta() -> &'static ModelMeta {
//!         static META: LazyLock<ModelMeta> = LazyLock::new(|| {
//!             ModelMeta::new("User", vec![PropertyDef::new("name", PropertyType::String).required()])
//!         });
//!         &META
//!     }
//!     fn key(&self) -> Option<&Key> { self.key.as_ref() }
//!     fn set_key(&mut self, key: Key) { self.key = Some(key); }
//!     fn get(&self, name: &str) -> Option<Value> {
//!         (name == "name").then(|| Value::from(self.name.clone()))
//!     }
//!     fn set_raw(&mut self, name: &str, value: Value) -> Result<(), DbError> {
//!         match name {
//!             "name" => self.name = FromValue::from_value(value)?,
//!             _ => return Err(Self::unknown_property(name)),
//!         }
//!         Ok(())
//!     }
//! }
//!
//! let mut form = ModelForm::<User>::new().unwrap();
//! assert_eq!(form.validate()["name"], "Required field");
//!
//! form.fill([("name", "Renzo")]);
//! let user = form.fill_model().unwrap();
//! assert_eq!(user.name.as_deref(), Some("Renzo"));
//! ```

use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;
use std::sync::{OnceLock, PoisonError, RwLock};

use formbind_db::{Model, PropertyDef, PropertyType, Value, ValueMap};

use crate::br::{CepField, CnpjField, CpfField, CEP, CNPJ, CPF};
use crate::error::{FormError, FormResult};
use crate::fields::{
    BooleanField, DateField, DateTimeField, DecimalField, EmailField, FloatField, FormField,
    IntegerField, KeyField, StringField,
};
use crate::form::{BaseForm, Form};

/// Creates an unconfigured field for a property type.
pub type FieldFactory = fn() -> Box<dyn FormField>;

fn boxed<F: FormField + Default + 'static>() -> Box<dyn FormField> {
    Box::new(F::default())
}

/// Maps property types to the fields model forms generate for them.
#[derive(Clone)]
pub struct PropertyRegistry {
    factories: HashMap<PropertyType, FieldFactory>,
}

impl fmt::Debug for PropertyRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyRegistry")
            .field("registered", &self.registered_types())
            .finish()
    }
}

impl Default for PropertyRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register(PropertyType::Integer, boxed::<IntegerField>);
        registry.register(PropertyType::IntegerBounded, boxed::<IntegerField>);
        registry.register(PropertyType::SimpleDecimal, boxed::<DecimalField>);
        registry.register(PropertyType::SimpleCurrency, boxed::<DecimalField>);
        registry.register(PropertyType::String, boxed::<StringField>);
        registry.register(PropertyType::Text, boxed::<StringField>);
        registry.register(PropertyType::DateTime, boxed::<DateTimeField>);
        registry.register(PropertyType::Date, boxed::<DateField>);
        registry.register(PropertyType::Float, boxed::<FloatField>);
        registry.register(PropertyType::FloatBounded, boxed::<FloatField>);
        registry.register(PropertyType::Email, boxed::<EmailField>);
        registry.register(PropertyType::Boolean, boxed::<BooleanField>);
        registry.register(PropertyType::Key, boxed::<KeyField>);
        registry.register(PropertyType::Custom(CEP), boxed::<CepField>);
        registry.register(PropertyType::Custom(CPF), boxed::<CpfField>);
        registry.register(PropertyType::Custom(CNPJ), boxed::<CnpjField>);
        registry
    }
}

impl PropertyRegistry {
    /// A registry with every built-in property type.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with nothing registered.
    pub fn empty() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Registers (or replaces) the field created for `property_type`.
    pub fn register(&mut self, property_type: PropertyType, factory: FieldFactory) {
        self.factories.insert(property_type, factory);
    }

    /// Returns `true` if `property_type` has a field.
    pub fn contains(&self, property_type: PropertyType) -> bool {
        self.factories.contains_key(&property_type)
    }

    /// The names of the registered property types, sorted.
    pub fn registered_types(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self.factories.keys().map(PropertyType::name).collect();
        names.sort_unstable();
        names
    }

    /// Creates the field for `property`, configured from it.
    pub fn field_for(&self, property: &PropertyDef) -> Option<Box<dyn FormField>> {
        let factory = self.factories.get(&property.property_type)?;
        let mut field = factory();
        field.set_options(property);
        Some(field)
    }
}

fn global() -> &'static RwLock<PropertyRegistry> {
    static REGISTRY: OnceLock<RwLock<PropertyRegistry>> = OnceLock::new();
    REGISTRY.get_or_init(|| RwLock::new(PropertyRegistry::new()))
}

/// Registers a field for a property type in the registry every model form
/// uses.
///
/// ```
/// use formbind_db::PropertyType;
/// use formbind_forms::fields::{FormField, StringField};
/// use formbind_forms::model_form;
///
/// model_form::register(PropertyType::Custom("phone"), || {
///     Box::new(StringField::new().max_len(Some(20))) as Box<dyn FormField>
/// });
/// assert!(model_form::is_registered(PropertyType::Custom("phone")));
/// ```
pub fn register(property_type: PropertyType, factory: FieldFactory) {
    tracing::debug!(property_type = property_type.name(), "Registering form field");
    global()
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .register(property_type, factory);
}

/// Returns `true` if model forms can generate a field for `property_type`.
pub fn is_registered(property_type: PropertyType) -> bool {
    global()
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .contains(property_type)
}

// ── Builder ──────────────────────────────────────────────────────────────

/// Configures which properties of `M` become fields.
pub struct ModelFormBuilder<M> {
    name: Option<String>,
    include: Option<Vec<String>>,
    exclude: Option<Vec<String>>,
    declared: Vec<(String, Box<dyn FormField>)>,
    _model: PhantomData<fn() -> M>,
}

impl<M: Model> Default for ModelFormBuilder<M> {
    fn default() -> Self {
        Self {
            name: None,
            include: None,
            exclude: None,
            declared: Vec::new(),
            _model: PhantomData,
        }
    }
}

impl<M: Model> ModelFormBuilder<M> {
    /// Names the form in logs and errors. Defaults to `<kind>Form`.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Only generates fields for these properties.
    #[must_use]
    pub fn include<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.include = Some(names.into_iter().map(Into::into).collect());
        self
    }

    /// Generates fields for every property except these.
    #[must_use]
    pub fn exclude<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude = Some(names.into_iter().map(Into::into).collect());
        self
    }

    /// Declares a field. It is kept as given, even when a property has the
    /// same name or `include`/`exclude` would leave that property out.
    #[must_use]
    pub fn field(mut self, name: impl Into<String>, field: impl FormField + 'static) -> Self {
        self.declared.push((name.into(), Box::new(field)));
        self
    }

    /// Builds the form with a snapshot of the global registry, so factories
    /// may call [`register`].
    pub fn build(self) -> FormResult<ModelForm<M>> {
        let registry = global()
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        self.build_with(&registry)
    }

    /// Builds the form with `registry`.
    pub fn build_with(self, registry: &PropertyRegistry) -> FormResult<ModelForm<M>> {
        let meta = M::meta();
        let name = self.name.unwrap_or_else(|| format!("{}Form", meta.kind));

        let should_include: Box<dyn Fn(&str) -> bool> = match (self.include, self.exclude) {
            (Some(_), Some(_)) => {
                return Err(FormError::InvalidParams(
                    "include and exclude can not be used at the same time".to_string(),
                ))
            }
            (Some(include), None) => Box::new(move |p: &str| include.iter().any(|n| n == p)),
            (None, Some(exclude)) => Box::new(move |p: &str| !exclude.iter().any(|n| n == p)),
            (None, None) => Box::new(|_: &str| true),
        };

        let mut base = BaseForm::new(name);
        for property in &meta.properties {
            let declared = self.declared.iter().any(|(n, _)| *n == property.name);
            if declared || !should_include(&property.name) {
                continue;
            }
            let field = registry.field_for(property).ok_or_else(|| {
                FormError::NotRegisteredProperty {
                    property: property.name.clone(),
                    model: meta.kind.to_string(),
                    property_type: property.property_type.name().to_string(),
                }
            })?;
            base.insert_field(property.name.clone(), field);
        }
        for (field_name, field) in self.declared {
            base.insert_field(field_name, field);
        }

        tracing::debug!(
            form = base.name(),
            model = meta.kind,
            fields = ?base.field_names().collect::<Vec<_>>(),
            "Built model form"
        );
        Ok(ModelForm {
            base,
            _model: PhantomData,
        })
    }
}

// ── ModelForm ────────────────────────────────────────────────────────────

/// A form whose fields are generated from the properties of `M`.
pub struct ModelForm<M> {
    base: BaseForm,
    _model: PhantomData<fn() -> M>,
}

impl<M> fmt::Debug for ModelForm<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ModelForm").field(&self.base).finish()
    }
}

impl<M: Model> Form for ModelForm<M> {
    fn base(&self) -> &BaseForm {
        &self.base
    }

    fn base_mut(&mut self) -> &mut BaseForm {
        &mut self.base
    }
}

impl<M: Model> ModelForm<M> {
    /// Starts configuring a form for `M`.
    pub fn builder() -> ModelFormBuilder<M> {
        ModelFormBuilder::default()
    }

    /// A form with a field for every property of `M`.
    pub fn new() -> FormResult<Self> {
        Self::builder().build()
    }

    /// The normalized values of fields that are properties of `M`.
    fn model_values(&self) -> FormResult<ValueMap> {
        let meta = M::meta();
        let mut values = self.normalize().map_err(|err| {
            tracing::warn!(form = self.base.name(), error = %err, "Could not normalize form values");
            err
        })?;
        values.retain(|name, _| meta.property(name).is_some());
        Ok(values)
    }

    /// Creates a model from the normalized values.
    pub fn fill_model(&self) -> FormResult<M>
    where
        M: Default,
    {
        let values = self.model_values()?;
        M::from_values(values).map_err(|err| {
            tracing::warn!(form = self.base.name(), error = %err, "Could not fill model");
            err.into()
        })
    }

    /// Assigns the normalized values to an existing model.
    pub fn fill_existing(&self, model: &mut M) -> FormResult<()> {
        let values = self.model_values()?;
        model.populate(values).map_err(|err| {
            tracing::warn!(form = self.base.name(), error = %err, "Could not fill model");
            err.into()
        })
    }

    /// Localizes the model's values for `fields` (every field when empty),
    /// stores them as the filled values and returns them. When the model is
    /// stored, its id is added under `"id"`.
    pub fn fill_with_model(&mut self, model: &M, fields: &[&str]) -> FormResult<ValueMap> {
        let names: Vec<&str> = if fields.is_empty() {
            self.base.field_names().collect()
        } else {
            fields.to_vec()
        };
        let values = model.to_dict(Some(names.as_slice()));
        let mut localized = self.localize(fields, &values)?;
        if let Some(key) = model.key() {
            localized.insert("id".to_string(), Value::Int(key.id()));
        }
        Ok(localized)
    }
}

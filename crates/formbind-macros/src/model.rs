//! `#[derive(Model)]` implementation.
//!
//! Generates an implementation of `formbind_db::model::Model` for a struct:
//! the `ModelMeta` with one `PropertyDef` per field, key accessors, and
//! `get`/`set_raw` dispatching on the property name.

use darling::{FromDeriveInput, FromField};
use proc_macro2::TokenStream;
use quote::quote;
use syn::{DeriveInput, Type};

use crate::attr::{ExprList, ValueExpr};

/// Struct-level attributes parsed from `#[model(...)]`.
#[derive(Debug, FromDeriveInput)]
#[darling(attributes(model), supports(struct_named))]
pub struct ModelOpts {
    pub ident: syn::Ident,
    pub data: darling::ast::Data<(), FieldOpts>,

    /// The key kind; defaults to the struct name.
    #[darling(default)]
    pub kind: Option<String>,
}

/// Per-field attributes parsed from `#[property(...)]`.
#[derive(Debug, FromField)]
#[darling(attributes(property))]
pub struct FieldOpts {
    pub ident: Option<syn::Ident>,
    pub ty: syn::Type,

    #[darling(default)]
    pub key: bool,
    #[darling(default)]
    pub skip: bool,
    #[darling(default)]
    pub name: Option<String>,
    #[darling(default)]
    pub property_type: Option<String>,
    #[darling(default)]
    pub custom: Option<String>,

    #[darling(default)]
    pub required: bool,
    #[darling(default)]
    pub repeated: bool,
    #[darling(default)]
    pub indexed: Option<bool>,
    #[darling(default)]
    pub default: Option<ValueExpr>,
    #[darling(default)]
    pub choices: Option<ExprList>,

    #[darling(default)]
    pub lower: Option<ValueExpr>,
    #[darling(default)]
    pub upper: Option<ValueExpr>,
    #[darling(default)]
    pub decimal_places: Option<u32>,
    #[darling(default)]
    pub kind: Option<String>,

    #[darling(default)]
    pub max_len: Option<usize>,
    #[darling(default)]
    pub min_len: Option<usize>,
    #[darling(default)]
    pub exactly_len: Option<usize>,
}

impl FieldOpts {
    fn property_name(&self) -> String {
        self.name.clone().unwrap_or_else(|| {
            self.ident
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_default()
        })
    }
}

/// Generates the `Model` trait implementation for the given derive input.
pub fn derive_model_impl(input: DeriveInput) -> TokenStream {
    let opts = match ModelOpts::from_derive_input(&input) {
        Ok(o) => o,
        Err(e) => return e.write_errors(),
    };

    let struct_name = &opts.ident;
    let kind = opts
        .kind
        .clone()
        .unwrap_or_else(|| struct_name.to_string());

    let Some(fields) = opts.data.as_ref().take_struct() else {
        return syn::Error::new_spanned(struct_name, "#[derive(Model)] only supports named structs")
            .to_compile_error();
    };
    let fields = fields.fields;

    let key_fields: Vec<&&FieldOpts> = fields.iter().filter(|f| f.key).collect();
    if key_fields.len() > 1 {
        return syn::Error::new_spanned(
            struct_name,
            "only one field can be marked #[property(key)]",
        )
        .to_compile_error();
    }

    let properties: Vec<&&FieldOpts> = fields.iter().filter(|f| !f.key && !f.skip).collect();

    let mut property_defs = Vec::with_capacity(properties.len());
    for f in &properties {
        match generate_property_def(f) {
            Ok(tokens) => property_defs.push(tokens),
            Err(e) => return e.to_compile_error(),
        }
    }

    let get_arms: Vec<TokenStream> = properties
        .iter()
        .map(|f| {
            let ident = f.ident.as_ref();
            let name = f.property_name();
            quote! {
                #name => ::std::option::Option::Some(
                    ::formbind_db::value::Value::from(self.#ident.clone())
                ),
            }
        })
        .collect();

    let set_arms: Vec<TokenStream> = properties
        .iter()
        .map(|f| {
            let ident = f.ident.as_ref();
            let name = f.property_name();
            quote! {
                #name => {
                    self.#ident = ::formbind_db::value::FromValue::from_value(value)?;
                }
            }
        })
        .collect();

    let key_tokens = if let Some(key_field) = key_fields.first() {
        let ident = key_field.ident.as_ref();
        quote! {
            fn key(&self) -> ::std::option::Option<&::formbind_db::key::Key> {
                self.#ident.as_ref()
            }

            fn set_key(&mut self, key: ::formbind_db::key::Key) {
                self.#ident = ::std::option::Option::Some(key);
            }
        }
    } else {
        quote! {
            fn key(&self) -> ::std::option::Option<&::formbind_db::key::Key> {
                ::std::option::Option::None
            }

            fn set_key(&mut self, _key: ::formbind_db::key::Key) {}
        }
    };

    quote! {
        impl ::formbind_db::model::Model for #struct_name {
            fn meta() -> &'static ::formbind_db::model::ModelMeta {
                static META: ::std::sync::LazyLock<::formbind_db::model::ModelMeta> =
                    ::std::sync::LazyLock::new(|| {
                        ::formbind_db::model::ModelMeta::new(
                            #kind,
                            ::std::vec![#(#property_defs),*],
                        )
                    });
                &META
            }

            #key_tokens

            fn get(&self, name: &str) -> ::std::option::Option<::formbind_db::value::Value> {
                match name {
                    #(#get_arms)*
                    _ => ::std::option::Option::None,
                }
            }

            fn set_raw(
                &mut self,
                name: &str,
                value: ::formbind_db::value::Value,
            ) -> ::std::result::Result<(), ::formbind_db::error::DbError> {
                match name {
                    #(#set_arms)*
                    _ => {
                        return ::std::result::Result::Err(
                            <Self as ::formbind_db::model::Model>::unknown_property(name),
                        )
                    }
                }
                ::std::result::Result::Ok(())
            }
        }
    }
}

/// Generates a `PropertyDef` construction expression for one field.
fn generate_property_def(f: &FieldOpts) -> syn::Result<TokenStream> {
    let name = f.property_name();
    let property_type = infer_property_type(f)?;

    let mut chain = Vec::new();

    if f.required {
        chain.push(quote! { .required() });
    }
    if f.repeated || unwrap_generic(&f.ty, "Vec").is_some() {
        chain.push(quote! { .repeated() });
    }
    if let Some(indexed) = f.indexed {
        chain.push(quote! { .indexed(#indexed) });
    }
    if let Some(ValueExpr(ref def)) = f.default {
        chain.push(quote! { .default(#def) });
    }
    if let Some(ExprList(ref choices)) = f.choices {
        chain.push(quote! {
            .choices(::std::vec![#(::formbind_db::value::Value::from(#choices)),*])
        });
    }
    if let Some(ValueExpr(ref lower)) = f.lower {
        chain.push(quote! { .lower(#lower) });
    }
    if let Some(ValueExpr(ref upper)) = f.upper {
        chain.push(quote! { .upper(#upper) });
    }
    if let Some(places) = f.decimal_places {
        chain.push(quote! { .decimal_places(#places) });
    }
    if let Some(ref kind) = f.kind {
        chain.push(quote! { .kind(#kind) });
    }
    if let Some(len) = f.max_len {
        chain.push(quote! { .max_len(#len) });
    }
    if let Some(len) = f.min_len {
        chain.push(quote! { .min_len(#len) });
    }
    if let Some(len) = f.exactly_len {
        chain.push(quote! { .exactly_len(#len) });
    }

    Ok(quote! {
        ::formbind_db::property::PropertyDef::new(#name, #property_type)
            #(#chain)*
    })
}

/// Infers the `PropertyType` variant from the Rust type and field attributes.
fn infer_property_type(f: &FieldOpts) -> syn::Result<TokenStream> {
    if let Some(ref custom) = f.custom {
        return Ok(quote! { ::formbind_db::property::PropertyType::Custom(#custom) });
    }

    let bounded = f.lower.is_some() || f.upper.is_some();
    let variant = if let Some(ref explicit) = f.property_type {
        variant_for_name(explicit).ok_or_else(|| {
            syn::Error::new_spanned(
                &f.ty,
                format!("unknown property_type {explicit:?}; use custom = \"...\" for custom types"),
            )
        })?
    } else {
        let inner = innermost_type(&f.ty);
        match type_to_string(inner).as_str() {
            "i64" if bounded => "IntegerBounded",
            "i64" => "Integer",
            "f64" if bounded => "FloatBounded",
            "f64" => "Float",
            "bool" => "Boolean",
            "String" => "String",
            s if s.ends_with("Decimal") => "SimpleDecimal",
            s if s.ends_with("NaiveDateTime") => "DateTime",
            s if s.ends_with("NaiveDate") => "Date",
            s if s.ends_with("Key") => "Key",
            other => {
                return Err(syn::Error::new_spanned(
                    &f.ty,
                    format!("cannot infer a property type for `{other}`; add property_type = \"...\""),
                ))
            }
        }
    };

    let variant = syn::Ident::new(variant, proc_macro2::Span::call_site());
    Ok(quote! { ::formbind_db::property::PropertyType::#variant })
}

/// Maps the names accepted by `property_type = "..."` to enum variants.
fn variant_for_name(name: &str) -> Option<&'static str> {
    Some(match name {
        "integer" => "Integer",
        "integer_bounded" => "IntegerBounded",
        "float" => "Float",
        "float_bounded" => "FloatBounded",
        "simple_decimal" => "SimpleDecimal",
        "simple_currency" => "SimpleCurrency",
        "string" => "String",
        "text" => "Text",
        "email" => "Email",
        "boolean" => "Boolean",
        "date" => "Date",
        "datetime" => "DateTime",
        "key" => "Key",
        _ => return None,
    })
}

/// Strips `Option<...>` and `Vec<...>` wrappers.
fn innermost_type(ty: &Type) -> &Type {
    unwrap_generic(ty, "Option")
        .or_else(|| unwrap_generic(ty, "Vec"))
        .map_or(ty, innermost_type)
}

/// If the type is `wrapper<T>`, returns `Some(&T)`. Otherwise `None`.
pub(crate) fn unwrap_generic<'a>(ty: &'a Type, wrapper: &str) -> Option<&'a Type> {
    if let Type::Path(type_path) = ty {
        let segment = type_path.path.segments.last()?;
        if segment.ident == wrapper {
            if let syn::PathArguments::AngleBracketed(ref args) = segment.arguments {
                if let Some(syn::GenericArgument::Type(inner)) = args.args.first() {
                    return Some(inner);
                }
            }
        }
    }
    None
}

/// Converts a `syn::Type` to a string for matching.
pub(crate) fn type_to_string(ty: &Type) -> String {
    quote!(#ty).to_string().replace(' ', "")
}

#[cfg(test)]
mod tests {
    use super::*;
    use syn::parse_quote;

    fn field(tokens: syn::Field) -> FieldOpts {
        FieldOpts::from_field(&tokens).unwrap()
    }

    #[test]
    fn test_unwrap_generic() {
        let ty: Type = parse_quote!(Option<i64>);
        let inner = unwrap_generic(&ty, "Option").unwrap();
        assert_eq!(type_to_string(inner), "i64");
        assert!(unwrap_generic(&ty, "Vec").is_none());
    }

    #[test]
    fn test_innermost_type() {
        let ty: Type = parse_quote!(Option<Vec<chrono::NaiveDate>>);
        assert_eq!(type_to_string(innermost_type(&ty)), "chrono::NaiveDate");
    }

    #[test]
    fn test_infer_types() {
        let cases: Vec<(syn::Field, &str)> = vec![
            (parse_quote!(a: Option<i64>), "Integer"),
            (parse_quote!(#[property(lower = 1)] a: Option<i64>), "IntegerBounded"),
            (parse_quote!(a: Vec<String>), "String"),
            (parse_quote!(a: Option<rust_decimal::Decimal>), "SimpleDecimal"),
            (parse_quote!(a: Option<NaiveDateTime>), "DateTime"),
            (parse_quote!(a: Option<Key>), "Key"),
            (parse_quote!(#[property(property_type = "email")] a: Option<String>), "Email"),
        ];
        for (tokens, expected) in cases {
            let tokens = infer_property_type(&field(tokens)).unwrap().to_string();
            assert!(tokens.ends_with(expected), "{tokens} should end with {expected}");
        }
    }

    #[test]
    fn test_custom_type() {
        let f = field(parse_quote!(#[property(custom = "cep")] cep: Option<String>));
        let tokens = infer_property_type(&f).unwrap().to_string();
        assert!(tokens.contains("Custom"));
        assert!(tokens.contains("\"cep\""));
    }

    #[test]
    fn test_unknown_types_are_errors() {
        let f = field(parse_quote!(a: Option<u8>));
        assert!(infer_property_type(&f).is_err());
        let f = field(parse_quote!(#[property(property_type = "blob")] a: Option<String>));
        assert!(infer_property_type(&f).is_err());
    }

    #[test]
    fn test_property_name_override() {
        let f = field(parse_quote!(#[property(name = "zip")] cep: Option<String>));
        assert_eq!(f.property_name(), "zip");
    }
}

//! Helper types for parsing expressions out of darling attributes.
//!
//! Darling's `FromMeta` for `syn::Expr` re-parses string literals as code,
//! so `default = "abc"` would become the path `abc`. These wrappers keep the
//! expression exactly as written:
//! - `#[property(default = "abc")]` / `lower = -1` ([`ValueExpr`])
//! - `#[property(choices = ["a", "b"])]` / `choices("a", "b")` ([`ExprList`])

use darling::FromMeta;

/// An attribute value kept verbatim as an expression.
#[derive(Debug, Clone)]
pub struct ValueExpr(pub syn::Expr);

impl FromMeta for ValueExpr {
    fn from_expr(expr: &syn::Expr) -> darling::Result<Self> {
        Ok(Self(expr.clone()))
    }

    fn from_value(value: &syn::Lit) -> darling::Result<Self> {
        Ok(Self(syn::Expr::Lit(syn::ExprLit {
            attrs: Vec::new(),
            lit: value.clone(),
        })))
    }
}

/// A list of expressions.
#[derive(Debug, Clone, Default)]
pub struct ExprList(pub Vec<syn::Expr>);

impl FromMeta for ExprList {
    /// Handles parenthesized list syntax: `choices("a", "b")`
    fn from_list(items: &[darling::ast::NestedMeta]) -> darling::Result<Self> {
        items
            .iter()
            .map(|item| match item {
                darling::ast::NestedMeta::Lit(lit) => Ok(syn::Expr::Lit(syn::ExprLit {
                    attrs: Vec::new(),
                    lit: lit.clone(),
                })),
                darling::ast::NestedMeta::Meta(_) => {
                    Err(darling::Error::unexpected_type("non-literal in list"))
                }
            })
            .collect::<darling::Result<Vec<_>>>()
            .map(ExprList)
    }

    /// Handles array expression syntax: `choices = ["a", "b"]`
    fn from_expr(expr: &syn::Expr) -> darling::Result<Self> {
        match expr {
            syn::Expr::Array(arr) => Ok(Self(arr.elems.iter().cloned().collect())),
            _ => Err(darling::Error::unexpected_expr_type(expr)),
        }
    }
}

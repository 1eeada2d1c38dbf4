//! Brazilian document fields: CEP (postal code), CPF (individual taxpayer
//! number) and CNPJ (company registry number).
//!
//! Each field accepts the punctuated form a user types and stores digits
//! only. Localizing puts the punctuation back.
//!
//! ```
//! use formbind_db::Value;
//! use formbind_forms::br::CpfField;
//! use formbind_forms::fields::FormField;
//!
//! let cpf = CpfField::new();
//! assert_eq!(cpf.validate(&Value::from("067.687.258-15")), None);
//! assert_eq!(cpf.normalize(Value::from("067.687.258-15")).unwrap(), Value::from("06768725815"));
//! assert_eq!(cpf.localize(Value::from("06768725815")), Value::from("067.687.258-15"));
//! ```

use formbind_core::i18n::gettext;
use formbind_db::{PropertyDef, PropertyType, Value};

use crate::error::FieldError;
use crate::fields::{option_builders, FieldOptions, FormField};

/// Property type name of postal codes.
pub const CEP: &str = "cep";
/// Property type name of individual taxpayer numbers.
pub const CPF: &str = "cpf";
/// Property type name of company registry numbers.
pub const CNPJ: &str = "cnpj";

/// A model property holding a CEP.
pub fn cep_property(name: impl Into<String>) -> PropertyDef {
    PropertyDef::new(name, PropertyType::Custom(CEP)).exactly_len(8)
}

/// A model property holding a CPF.
pub fn cpf_property(name: impl Into<String>) -> PropertyDef {
    PropertyDef::new(name, PropertyType::Custom(CPF)).exactly_len(11)
}

/// A model property holding a CNPJ.
pub fn cnpj_property(name: impl Into<String>) -> PropertyDef {
    PropertyDef::new(name, PropertyType::Custom(CNPJ)).exactly_len(14)
}

/// The mod 11 check digit of `digits`: weights run from `len + 1` down to 2.
fn mod11(digits: &[u32]) -> u32 {
    let sum: u32 = digits
        .iter()
        .rev()
        .zip(2..)
        .map(|(digit, weight)| digit * weight)
        .sum();
    match 11 - sum % 11 {
        d if d >= 10 => 0,
        d => d,
    }
}

fn cnpj_check_digit(digits: &[u32], weights: &[u32]) -> u32 {
    let total: u32 = digits.iter().zip(weights).map(|(d, w)| d * w).sum();
    match total % 11 {
        rest if rest < 2 => 0,
        rest => 11 - rest,
    }
}

/// The digits of `text`, or `None` when anything else is in it.
fn digits(text: &str) -> Option<Vec<u32>> {
    text.chars().map(|c| c.to_digit(10)).collect()
}

/// Strips `separators` from a string; `""` becomes `Null`.
fn strip(
    options: &FieldOptions,
    value: Value,
    separators: &[char],
) -> Result<Value, FieldError> {
    match value {
        Value::String(s) if s.is_empty() => Ok(options.apply_default(Value::Null)),
        Value::String(s) => Ok(Value::String(s.replace(separators, ""))),
        Value::Null => Ok(options.apply_default(Value::Null)),
        other => Err(FieldError::unexpected("string", &other)),
    }
}

/// Inserts `separators` before the char positions they are paired with.
fn punctuate(value: Value, separators: &[(usize, char)]) -> Value {
    match value {
        Value::String(s) if !s.is_empty() => {
            let mut out = String::with_capacity(s.len() + separators.len());
            for (i, c) in s.chars().enumerate() {
                if let Some((_, sep)) = separators.iter().find(|(at, _)| *at == i) {
                    out.push(*sep);
                }
                out.push(c);
            }
            Value::String(out)
        }
        Value::Null => Value::String(String::new()),
        other => other,
    }
}

/// Length and digits checks shared by the three fields. Returns the digits
/// of a well-formed document.
fn check_document(
    normalized: &Value,
    len: usize,
    wrong_len: &str,
    not_digits: &str,
) -> Result<Option<Vec<u32>>, String> {
    let Value::String(s) = normalized else {
        return Ok(None);
    };
    if s.chars().count() != len {
        return Err(gettext(wrong_len));
    }
    digits(s).map(Some).ok_or_else(|| gettext(not_digits))
}

// ── CepField ─────────────────────────────────────────────────────────────

/// A postal code, typed as `12345-678`.
#[derive(Debug, Clone, Default)]
pub struct CepField {
    options: FieldOptions,
}

impl CepField {
    /// Creates a field with no options set.
    pub fn new() -> Self {
        <Self as Default>::default()
    }
}

option_builders!(CepField);

impl FormField for CepField {
    fn options(&self) -> &FieldOptions {
        &self.options
    }

    fn options_mut(&mut self) -> &mut FieldOptions {
        &mut self.options
    }

    fn validate_field(&self, value: &Value) -> Option<String> {
        let Ok(normalized) = self.normalize_field(value.clone()) else {
            return Some(gettext("CEP must contain only numbers"));
        };
        if let Err(message) = check_document(
            &normalized,
            8,
            "CEP must have exactly 8 characters",
            "CEP must contain only numbers",
        ) {
            return Some(message);
        }
        self.validate_options(&normalized)
    }

    fn normalize_field(&self, value: Value) -> Result<Value, FieldError> {
        strip(&self.options, value, &['-'])
    }

    fn localize_field(&self, value: Value) -> Value {
        punctuate(self.options.apply_default(value), &[(5, '-')])
    }
}

// ── CpfField ─────────────────────────────────────────────────────────────

/// An individual taxpayer number, typed as `067.687.258-15`. The last two
/// digits are mod 11 check digits.
#[derive(Debug, Clone, Default)]
pub struct CpfField {
    options: FieldOptions,
}

impl CpfField {
    /// Creates a field with no options set.
    pub fn new() -> Self {
        <Self as Default>::default()
    }

    fn check_digits(base: &[u32]) -> [u32; 2] {
        let first = mod11(base);
        let mut extended = base.to_vec();
        extended.push(first);
        [first, mod11(&extended)]
    }
}

option_builders!(CpfField);

impl FormField for CpfField {
    fn options(&self) -> &FieldOptions {
        &self.options
    }

    fn options_mut(&mut self) -> &mut FieldOptions {
        &mut self.options
    }

    fn validate_field(&self, value: &Value) -> Option<String> {
        let Ok(normalized) = self.normalize_field(value.clone()) else {
            return Some(gettext("CPF must contain only numbers"));
        };
        match check_document(
            &normalized,
            11,
            "CPF must have exactly 11 characters",
            "CPF must contain only numbers",
        ) {
            Err(message) => Some(message),
            Ok(Some(digits)) if digits[9..] != Self::check_digits(&digits[..9]) => {
                Some(gettext("Invalid CPF"))
            }
            Ok(_) => self.validate_options(&normalized),
        }
    }

    fn normalize_field(&self, value: Value) -> Result<Value, FieldError> {
        strip(&self.options, value, &['-', '.'])
    }

    fn localize_field(&self, value: Value) -> Value {
        punctuate(
            self.options.apply_default(value),
            &[(3, '.'), (6, '.'), (9, '-')],
        )
    }
}

// ── CnpjField ────────────────────────────────────────────────────────────

const CNPJ_FIRST_WEIGHTS: [u32; 12] = [5, 4, 3, 2, 9, 8, 7, 6, 5, 4, 3, 2];
const CNPJ_SECOND_WEIGHTS: [u32; 13] = [6, 5, 4, 3, 2, 9, 8, 7, 6, 5, 4, 3, 2];

/// A company registry number, typed as `69.435.154/0001-02`.
///
/// A number whose check digits match is accepted without the shared checks.
#[derive(Debug, Clone, Default)]
pub struct CnpjField {
    options: FieldOptions,
}

impl CnpjField {
    /// Creates a field with no options set.
    pub fn new() -> Self {
        <Self as Default>::default()
    }
}

option_builders!(CnpjField);

impl FormField for CnpjField {
    fn options(&self) -> &FieldOptions {
        &self.options
    }

    fn options_mut(&mut self) -> &mut FieldOptions {
        &mut self.options
    }

    fn validate_field(&self, value: &Value) -> Option<String> {
        let Ok(normalized) = self.normalize_field(value.clone()) else {
            return Some(gettext("CNPJ must contain only numbers"));
        };
        match check_document(
            &normalized,
            14,
            "CNPJ must have exactly 14 characters",
            "CNPJ must contain only numbers",
        ) {
            Err(message) => Some(message),
            Ok(Some(digits)) => {
                let valid = digits[12] == cnpj_check_digit(&digits[..12], &CNPJ_FIRST_WEIGHTS)
                    && digits[13] == cnpj_check_digit(&digits[..13], &CNPJ_SECOND_WEIGHTS);
                (!valid).then(|| gettext("Invalid CNPJ"))
            }
            Ok(None) => self.validate_options(value),
        }
    }

    fn normalize_field(&self, value: Value) -> Result<Value, FieldError> {
        strip(&self.options, value, &['-', '.', '/'])
    }

    fn localize_field(&self, value: Value) -> Value {
        punctuate(
            self.options.apply_default(value),
            &[(2, '.'), (5, '.'), (8, '/'), (12, '-')],
        )
    }
}

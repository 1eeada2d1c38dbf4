//! Translation catalog for validation messages.
//!
//! Catalogs live in a global, thread-safe registry keyed by normalized
//! language code (`pt_BR`, `de`, ...). A Brazilian Portuguese catalog for
//! every built-in message is installed the first time the registry is used.
//!
//! ## JSON Format
//!
//! ```json
//! {
//!   "messages": {
//!     "Required field": "Pflichtfeld"
//!   }
//! }
//! ```

use std::collections::HashMap;
use std::sync::{OnceLock, RwLock};

use serde::Deserialize;

use crate::error::{FormbindError, FormbindResult};

/// A translation catalog for a single language.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TranslationCatalog {
    /// msgid -> translated string.
    #[serde(default)]
    messages: HashMap<String, String>,
}

impl TranslationCatalog {
    /// Returns the translation of `msgid`, if present.
    pub fn get(&self, msgid: &str) -> Option<&str> {
        self.messages.get(msgid).map(String::as_str)
    }

    /// Returns the number of messages in this catalog.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Returns `true` when the catalog holds no messages.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

const PT_BR: &[(&str, &str)] = &[
    ("Must be one of: %(choices)s", "Deve ser um de: %(choices)s"),
    ("Required field", "Campo obrigatório"),
    (
        "Has %(len)s characters and it must have exactly %(exactly_len)s",
        "Possui %(len)s caracteres e deve ter exatamente %(exactly_len)s",
    ),
    (
        "Has %(len)s characters and it must have %(max_len)s or less",
        "Possui %(len)s caracteres e deve ter %(max_len)s ou menos",
    ),
    (
        "Has %(len)s characters and it must have %(min_len)s or more",
        "Possui %(len)s caracteres e deve ter %(min_len)s ou mais",
    ),
    ("Invalid email", "Email inválido"),
    ("Key's kind should be defined", "O tipo da chave deve ser definido"),
    ("Invalid key", "Chave inválida"),
    ("Must be greater than %(lower)s", "Deve ser maior que %(lower)s"),
    ("Must be less than %(upper)s", "Deve ser menor que %(upper)s"),
    ("Must be integer", "Deve ser inteiro"),
    ("Must be true or false", "Deve ser verdadeiro ou falso"),
    ("Must be a number", "Deve ser um número"),
    (
        "Invalid date. Valid example: %(date)s",
        "Data inválida. Exemplo válido: %(date)s",
    ),
    (
        "Invalid datetime. Valid example: %(datetime)s",
        "Data e hora inválidas. Exemplo válido: %(datetime)s",
    ),
    ("CEP must have exactly 8 characters", "CEP deve ter exatamente 8 caracteres"),
    ("CEP must contain only numbers", "CEP deve conter apenas números"),
    ("CPF must have exactly 11 characters", "CPF deve ter exatamente 11 caracteres"),
    ("CPF must contain only numbers", "CPF deve conter apenas números"),
    ("Invalid CPF", "CPF inválido"),
    ("CNPJ must have exactly 14 characters", "CNPJ deve ter exatamente 14 caracteres"),
    ("CNPJ must contain only numbers", "CNPJ deve conter apenas números"),
    ("Invalid CNPJ", "CNPJ inválido"),
    (
        "If CEP is declared it should not be empty",
        "Se o CEP foi declarado ele não deve estar vazio",
    ),
];

/// The global translation catalog registry, keyed by language code.
fn global_catalogs() -> &'static RwLock<HashMap<String, TranslationCatalog>> {
    static CATALOGS: OnceLock<RwLock<HashMap<String, TranslationCatalog>>> = OnceLock::new();
    CATALOGS.get_or_init(|| {
        let mut catalogs = HashMap::new();
        catalogs.insert(
            "pt_BR".to_string(),
            TranslationCatalog {
                messages: PT_BR
                    .iter()
                    .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                    .collect(),
            },
        );
        RwLock::new(catalogs)
    })
}

/// Normalizes a language code: `pt-br` and `pt_BR` both become `pt_BR`.
pub fn normalize_language(code: &str) -> String {
    let code = code.trim().replace('-', "_");
    match code.split_once('_') {
        Some((lang, territory)) => {
            format!("{}_{}", lang.to_lowercase(), territory.to_uppercase())
        }
        None => code.to_lowercase(),
    }
}

fn with_catalog_mut<F>(language: &str, f: F)
where
    F: FnOnce(&mut TranslationCatalog),
{
    let mut catalogs = global_catalogs()
        .write()
        .unwrap_or_else(std::sync::PoisonError::into_inner);
    let catalog = catalogs.entry(normalize_language(language)).or_default();
    f(catalog);
}

// ── Registration API ─────────────────────────────────────────────────────

/// Registers message translations for a language.
///
/// Entries are merged into any existing catalog, overwriting duplicates.
///
/// ```
/// use formbind_core::i18n::catalog;
///
/// catalog::register_translations("de", vec![("Required field", "Pflichtfeld")]);
/// assert_eq!(catalog::translate("de", "Required field").as_deref(), Some("Pflichtfeld"));
/// ```
pub fn register_translations(language: &str, entries: Vec<(&str, &str)>) {
    with_catalog_mut(language, |catalog| {
        for (msgid, translated) in entries {
            catalog
                .messages
                .insert(msgid.to_string(), translated.to_string());
        }
    });
}

/// Loads translations for `language` from a JSON document.
pub fn load_from_json_str(language: &str, json: &str) -> FormbindResult<()> {
    let loaded: TranslationCatalog = serde_json::from_str(json)
        .map_err(|e| FormbindError::CatalogError(format!("Failed to parse catalog: {e}")))?;
    tracing::debug!(
        language,
        messages = loaded.len(),
        "Loaded translation catalog"
    );
    with_catalog_mut(language, |catalog| {
        catalog.messages.extend(loaded.messages);
    });
    Ok(())
}

/// Looks up `msgid` for `language`, falling back from `pt_PT` to `pt`
/// and then to any catalog of the same language (`pt_BR`).
pub fn translate(language: &str, msgid: &str) -> Option<String> {
    let language = normalize_language(language);
    let catalogs = global_catalogs()
        .read()
        .unwrap_or_else(std::sync::PoisonError::into_inner);

    if let Some(found) = catalogs.get(&language).and_then(|c| c.get(msgid)) {
        return Some(found.to_string());
    }

    let prefix = language.split('_').next().unwrap_or(&language);
    if let Some(found) = catalogs.get(prefix).and_then(|c| c.get(msgid)) {
        return Some(found.to_string());
    }

    let mut siblings: Vec<_> = catalogs
        .iter()
        .filter(|(code, _)| code.split('_').next() == Some(prefix))
        .collect();
    siblings.sort_by(|a, b| a.0.cmp(b.0));
    siblings
        .into_iter()
        .find_map(|(_, c)| c.get(msgid))
        .map(ToString::to_string)
}

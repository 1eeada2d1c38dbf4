//! Locale identifiers.
//!
//! A [`Locale`] is a language plus an optional territory, parsed from the
//! usual `en_US` / `pt-BR` spellings. Number and date conventions for a
//! locale live in `formbind_forms::l10n`.

use std::fmt;
use std::str::FromStr;

use crate::error::FormbindError;

/// A parsed locale identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Locale {
    /// Lowercase ISO 639 language code (e.g. "pt").
    pub language: String,
    /// Uppercase ISO 3166 territory code (e.g. "BR"), if any.
    pub territory: Option<String>,
}

impl Locale {
    /// Parses a locale identifier such as `en_US`, `pt-BR` or `de`.
    ///
    /// An encoding suffix (`en_US.UTF-8`) is ignored.
    ///
    /// ```
    /// use formbind_core::locale::Locale;
    ///
    /// let locale = Locale::parse("pt-BR").unwrap();
    /// assert_eq!(locale.language, "pt");
    /// assert_eq!(locale.territory.as_deref(), Some("BR"));
    /// assert_eq!(locale.to_string(), "pt_BR");
    /// ```
    pub fn parse(identifier: &str) -> Result<Self, FormbindError> {
        let trimmed = identifier.trim();
        let base = trimmed.split('.').next().unwrap_or_default();
        let mut parts = base.split(['_', '-']);

        let language = parts.next().unwrap_or_default();
        if !(2..=3).contains(&language.len()) || !language.chars().all(|c| c.is_ascii_alphabetic())
        {
            return Err(FormbindError::UnknownLocale(identifier.to_string()));
        }

        let territory = match parts.next() {
            Some(t) if t.len() == 2 && t.chars().all(|c| c.is_ascii_alphabetic()) => {
                Some(t.to_ascii_uppercase())
            }
            Some(t) if t.len() == 3 && t.chars().all(|c| c.is_ascii_digit()) => Some(t.to_string()),
            Some(_) => return Err(FormbindError::UnknownLocale(identifier.to_string())),
            None => None,
        };

        if parts.next().is_some() {
            return Err(FormbindError::UnknownLocale(identifier.to_string()));
        }

        Ok(Self {
            language: language.to_ascii_lowercase(),
            territory,
        })
    }

    /// Returns `true` if this locale uses the given language.
    pub fn is_language(&self, language: &str) -> bool {
        self.language.eq_ignore_ascii_case(language)
    }
}

impl Default for Locale {
    fn default() -> Self {
        Self {
            language: "en".to_string(),
            territory: Some("US".to_string()),
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.territory {
            Some(t) => write!(f, "{}_{t}", self.language),
            None => f.write_str(&self.language),
        }
    }
}

impl FromStr for Locale {
    type Err = FormbindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

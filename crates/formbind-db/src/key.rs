//! Entity keys.
//!
//! A [`Key`] identifies one stored entity by its kind (the model name) and a
//! positive integer id. Keys travel through web pages in their url-safe
//! form, produced by [`Key::urlsafe`] and read back with
//! [`Key::from_urlsafe`].

use std::fmt;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::error::DbError;

const SEPARATOR: char = '\u{1f}';

/// The identity of a stored entity.
///
/// # Examples
///
/// ```
/// use formbind_db::key::Key;
///
/// let key = Key::new("Address", 42).unwrap();
/// let encoded = key.urlsafe();
/// assert_eq!(Key::from_urlsafe(&encoded).unwrap(), key);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Key {
    kind: String,
    id: i64,
}

impl Key {
    /// Builds a key. The kind must be non-empty and the id positive.
    pub fn new(kind: impl Into<String>, id: i64) -> Result<Self, DbError> {
        let kind = kind.into();
        if kind.is_empty() || kind.contains(SEPARATOR) {
            return Err(DbError::InvalidKey(format!("invalid kind {kind:?}")));
        }
        if id <= 0 {
            return Err(DbError::InvalidKey(format!("id must be positive, got {id}")));
        }
        Ok(Self { kind, id })
    }

    /// The model kind this key belongs to.
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// The numeric id.
    pub const fn id(&self) -> i64 {
        self.id
    }

    /// Encodes the key as a url-safe string.
    pub fn urlsafe(&self) -> String {
        URL_SAFE_NO_PAD.encode(format!("{}{SEPARATOR}{}", self.kind, self.id))
    }

    /// Decodes a key produced by [`Key::urlsafe`].
    pub fn from_urlsafe(encoded: &str) -> Result<Self, DbError> {
        let bytes = URL_SAFE_NO_PAD
            .decode(encoded.trim_end_matches('='))
            .map_err(|e| DbError::InvalidKey(format!("{encoded:?} is not url-safe base64: {e}")))?;
        let text = String::from_utf8(bytes)
            .map_err(|_| DbError::InvalidKey(format!("{encoded:?} is not utf-8")))?;
        let (kind, id) = text
            .split_once(SEPARATOR)
            .ok_or_else(|| DbError::InvalidKey(format!("{encoded:?} has no id")))?;
        let id = id
            .parse::<i64>()
            .map_err(|_| DbError::InvalidKey(format!("{encoded:?} has a non-numeric id")))?;
        Self::new(kind, id)
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Key('{}', {})", self.kind, self.id)
    }
}

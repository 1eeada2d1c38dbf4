//! Translation of validation messages.
//!
//! Every message a field descriptor returns goes through [`gettext`], which
//! looks the message up in the [`catalog`] of the language active on the
//! current thread. Messages carry `%(name)s` placeholders that are filled in
//! *after* translation by [`interpolate`], so translators see the template.
//!
//! ```
//! use formbind_core::i18n;
//!
//! i18n::activate("pt_BR");
//! assert_eq!(i18n::gettext("Required field"), "Campo obrigatório");
//! i18n::deactivate();
//! assert_eq!(i18n::gettext("Required field"), "Required field");
//! ```

pub mod catalog;
pub mod timezone;

use std::cell::RefCell;

thread_local! {
    static CURRENT_LANGUAGE: RefCell<Option<String>> = const { RefCell::new(None) };
}

/// Sets the language messages are translated to on this thread.
///
/// Both `pt_BR` and `pt-BR` spellings are accepted.
pub fn activate(language_code: &str) {
    CURRENT_LANGUAGE.with(|cell| {
        *cell.borrow_mut() = Some(catalog::normalize_language(language_code));
    });
}

/// Clears this thread's language. Messages stay in English.
pub fn deactivate() {
    CURRENT_LANGUAGE.with(|cell| {
        *cell.borrow_mut() = None;
    });
}

/// This thread's language, `en` when none was activated.
pub fn get_language() -> String {
    CURRENT_LANGUAGE.with(|cell| cell.borrow().clone().unwrap_or_else(|| "en".to_string()))
}

/// Translates `msgid` to this thread's language. Messages without a
/// translation come back unchanged.
pub fn gettext(msgid: &str) -> String {
    catalog::translate(&get_language(), msgid).unwrap_or_else(|| msgid.to_owned())
}

/// Substitutes `%(name)s` placeholders in `template`.
///
/// Unknown placeholders are left untouched.
///
/// ```
/// use formbind_core::i18n::interpolate;
///
/// let msg = interpolate(
///     "Has %(len)s characters and it must have %(max_len)s or less",
///     &[("len", 5.to_string()), ("max_len", 4.to_string())],
/// );
/// assert_eq!(msg, "Has 5 characters and it must have 4 or less");
/// ```
pub fn interpolate<S: AsRef<str>>(template: &str, params: &[(&str, S)]) -> String {
    let mut out = template.to_string();
    for (name, value) in params {
        out = out.replace(&format!("%({name})s"), value.as_ref());
    }
    out
}

/// Translates `msgid` and fills in its placeholders.
pub fn gettext_with<S: AsRef<str>>(msgid: &str, params: &[(&str, S)]) -> String {
    interpolate(&gettext(msgid), params)
}

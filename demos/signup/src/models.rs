//! The customer model and its signup form.

use formbind::deps::chrono::NaiveDate;
use formbind::deps::rust_decimal::Decimal;
use formbind::prelude::*;

/// A customer as stored after signing up.
#[derive(Debug, Default, Model)]
pub struct Customer {
    #[property(key)]
    pub key: Option<Key>,
    #[property(required, max_len = 60)]
    pub name: Option<String>,
    #[property(required, property_type = "email")]
    pub email: Option<String>,
    #[property(custom = "cpf", exactly_len = 11)]
    pub cpf: Option<String>,
    #[property(default = false)]
    pub cep_declared: Option<bool>,
    #[property(custom = "cep", exactly_len = 8)]
    pub cep: Option<String>,
    pub birth_date: Option<NaiveDate>,
    #[property(property_type = "simple_currency")]
    pub credit_limit: Option<Decimal>,
}

/// The signup form: every customer property, plus a rule tying the CEP to
/// the `cep_declared` flag.
pub struct SignupForm {
    pub inner: ModelForm<Customer>,
}

impl SignupForm {
    pub fn new() -> Result<Self, FormError> {
        Ok(Self {
            inner: ModelForm::builder().name("SignupForm").build()?,
        })
    }
}

impl Form for SignupForm {
    fn base(&self) -> &BaseForm {
        self.inner.base()
    }

    fn base_mut(&mut self) -> &mut BaseForm {
        self.inner.base_mut()
    }

    fn clean(&self) -> Result<(), ErrorMap> {
        let declared = self
            .normalize()
            .is_ok_and(|values| values.get("cep_declared") == Some(&Value::Bool(true)));
        let cep_empty = self.base().value("cep").map_or(true, Value::is_empty);
        if declared && cep_empty {
            let message = formbind::core::i18n::gettext("If CEP is declared it should not be empty");
            return Err(ErrorMap::from([("cep".to_string(), message)]));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_declared_cep_is_required() {
        let mut form = SignupForm::new().unwrap();
        form.fill([
            ("name", "Renzo"),
            ("email", "renzo@example.com"),
            ("cep_declared", "true"),
        ]);
        let errors = form.validate();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors["cep"], "If CEP is declared it should not be empty");

        form.fill([("cep", "01310-100")]);
        assert!(form.validate().is_empty());
    }

    #[test]
    fn test_round_trip() {
        let mut form = SignupForm::new().unwrap();
        form.fill([
            ("name", "Renzo"),
            ("email", "renzo@example.com"),
            ("cpf", "067.687.258-15"),
        ]);
        let mut customer = form.inner.fill_model().unwrap();
        let key = MemoryStore::new().put(&mut customer).unwrap();

        let mut edit = SignupForm::new().unwrap();
        let localized = edit.inner.fill_with_model(&customer, &["cpf"]).unwrap();
        assert_eq!(localized["cpf"], Value::from("067.687.258-15"));
        assert_eq!(localized["id"], Value::Int(key.id()));
    }
}

//! Customer validation and normalization.

mod service;

pub use service::CustomerService;

use serde::Deserialize;
use serde_json::Value;
use store::{CustomerChanges, NewCustomer};

use crate::error::Result;
use crate::normalize;
use crate::validation::{self, EMAIL_RE, PHONE_RE, TextRule, Violations};

const NAME: TextRule = TextRule::new("name", 2, 100);
const PHONE: TextRule = TextRule::new("phone", 7, 20);
const EMAIL_MAX: usize = 100;

/// Customer fields as received from a caller.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CustomerInput {
    #[serde(deserialize_with = "validation::deserialize_present")]
    pub name: Option<Value>,
    #[serde(deserialize_with = "validation::deserialize_present")]
    pub phone: Option<Value>,
    #[serde(deserialize_with = "validation::deserialize_present")]
    pub email: Option<Value>,
}

impl CustomerInput {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.phone.is_none() && self.email.is_none()
    }
}

/// Validates customer fields. In partial mode only present fields are checked.
pub fn validate_customer(input: &CustomerInput, partial: bool) -> Result<()> {
    let mut violations = Violations::new();

    NAME.check(&mut violations, input.name.as_ref(), !partial);

    if let Some(phone) = PHONE.check(&mut violations, input.phone.as_ref(), !partial)
        && !PHONE_RE.is_match(phone)
    {
        violations.push("phone may only contain digits, spaces and the characters -()+");
    }

    check_email(&mut violations, input.email.as_ref());

    violations.into_result()
}

fn check_email(violations: &mut Violations, value: Option<&Value>) {
    let Some(value) = value.filter(|v| !v.is_null()) else {
        return;
    };
    let Some(email) = validation::text(value) else {
        violations.push("email must be a string");
        return;
    };
    let email = email.trim();
    if email.is_empty() {
        return;
    }
    if validation::char_len(email) > EMAIL_MAX {
        violations.push(format!("email must be at most {EMAIL_MAX} characters"));
    } else if !EMAIL_RE.is_match(email) {
        violations.push("email must be a valid email address");
    }
}

/// Builds a complete customer record from validated input.
pub fn normalize_customer(input: &CustomerInput) -> Result<NewCustomer> {
    Ok(NewCustomer {
        name: normalize::text(normalize::required(input.name.as_ref(), "name")?),
        phone: normalize::text(normalize::required(input.phone.as_ref(), "phone")?),
        email: input.email.as_ref().and_then(normalize::email),
    })
}

/// Builds a partial update from validated input.
pub fn normalize_customer_changes(input: &CustomerInput) -> CustomerChanges {
    CustomerChanges {
        name: input.name.as_ref().map(normalize::text),
        phone: input.phone.as_ref().map(normalize::text),
        email: input.email.as_ref().map(normalize::email),
    }
}

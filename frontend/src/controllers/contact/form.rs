use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

pub const MIN_NAME_LEN: usize = 2;
pub const MIN_MESSAGE_LEN: usize = 10;

// The HTML `type=email` rule.
static EMAIL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$",
    )
    .unwrap()
});

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("name needs at least 2 characters")]
    NameTooShort,
    #[error("email address is not valid")]
    InvalidEmail,
    #[error("message needs at least 10 characters")]
    MessageTooShort,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    pub message: String,
}

// `minlength` counts UTF-16 code units.
fn length(value: &str) -> usize {
    value.encode_utf16().count()
}

impl ContactForm {
    /// Checks fields in document order and reports the first failure.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if length(&self.name) < MIN_NAME_LEN {
            return Err(ValidationError::NameTooShort);
        }
        // Browsers strip surrounding whitespace from email inputs.
        if !EMAIL.is_match(self.email.trim()) {
            return Err(ValidationError::InvalidEmail);
        }
        if length(&self.message) < MIN_MESSAGE_LEN {
            return Err(ValidationError::MessageTooShort);
        }
        Ok(())
    }
}

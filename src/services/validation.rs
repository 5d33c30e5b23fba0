use std::collections::HashMap;

use super::ServiceError;

pub const INVALID_INPUTS: &str = "Invalid inputs passed, please check your data.";
pub const MIN_PASSWORD_LENGTH: usize = 4;

/// Collects per-field problems and turns them into a single 422.
#[derive(Debug, Default)]
pub struct Validator {
    field_errors: HashMap<String, String>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn not_empty(&mut self, field: &str, value: &str) -> &mut Self {
        if value.trim().is_empty() {
            self.reject(field, "must not be empty");
        }
        self
    }

    pub fn email(&mut self, field: &str, value: &str) -> &mut Self {
        if let Err(msg) = validate_email(value) {
            self.reject(field, msg);
        }
        self
    }

    pub fn min_length(&mut self, field: &str, value: &str, min: usize) -> &mut Self {
        if value.chars().count() < min {
            self.reject(field, &format!("must be at least {} characters", min));
        }
        self
    }

    pub fn present<T>(&mut self, field: &str, value: Option<&T>) -> &mut Self {
        if value.is_none() {
            self.reject(field, "is required");
        }
        self
    }

    pub fn finish(&mut self) -> Result<(), ServiceError> {
        if self.field_errors.is_empty() {
            Ok(())
        } else {
            Err(ServiceError::validation(INVALID_INPUTS, std::mem::take(&mut self.field_errors)))
        }
    }

    fn reject(&mut self, field: &str, message: &str) {
        self.field_errors
            .entry(field.to_string())
            .or_insert_with(|| message.to_string());
    }
}

/// Canonical form used for storage and lookup
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub fn validate_email(email: &str) -> Result<(), &'static str> {
    let email = email.trim();

    if email.is_empty() {
        return Err("must not be empty");
    }
    if email.chars().any(char::is_whitespace) {
        return Err("must not contain whitespace");
    }

    let (local, domain) = email.split_once('@').ok_or("must be a valid email address")?;
    if local.is_empty() || domain.contains('@') {
        return Err("must be a valid email address");
    }

    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 || labels.iter().any(|label| label.is_empty()) {
        return Err("must be a valid email address");
    }

    Ok(())
}

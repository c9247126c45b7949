//! Mocked sign-in forms. Nothing is checked against a backend; these only
//! enforce the form rules before the store is asked to sign a user in.

use crate::error::StoreError;
use once_cell::sync::Lazy;
use regex::Regex;

/// Email used by the "Continue with Google" shortcut
pub const PROVIDER_EMAIL: &str = "john@example.com";

const EMAIL_PATTERN: &str = r"^[^@\s]+@[^@\s]+\.[^@\s]+$";

static EMAIL_RE: Lazy<Result<Regex, regex::Error>> = Lazy::new(|| Regex::new(EMAIL_PATTERN));

fn fill_all_fields(field: &str) -> StoreError {
    StoreError::validation(field, "Please fill in all fields")
}

fn check_email(email: &str) -> Result<(), StoreError> {
    let re = EMAIL_RE
        .as_ref()
        .map_err(|e| StoreError::validation("email", format!("Invalid email pattern: {}", e)))?;
    if re.is_match(email) {
        Ok(())
    } else {
        Err(StoreError::validation(
            "email",
            format!("'{}' is not a valid email address", email),
        ))
    }
}

/// Validate the login form and return the trimmed email
pub fn validate_login(email: &str, password: &str) -> Result<String, StoreError> {
    let email = email.trim();
    if email.is_empty() {
        return Err(fill_all_fields("email"));
    }
    if password.is_empty() {
        return Err(fill_all_fields("password"));
    }
    check_email(email)?;
    Ok(email.to_string())
}

/// Validate the signup form and return the trimmed email
pub fn validate_signup(email: &str, password: &str, confirm: &str) -> Result<String, StoreError> {
    let email = email.trim();
    if email.is_empty() || password.is_empty() || confirm.is_empty() {
        let field = if email.is_empty() {
            "email"
        } else if password.is_empty() {
            "password"
        } else {
            "confirm_password"
        };
        return Err(fill_all_fields(field));
    }
    if password != confirm {
        return Err(StoreError::validation(
            "confirm_password",
            "Passwords do not match",
        ));
    }
    check_email(email)?;
    Ok(email.to_string())
}

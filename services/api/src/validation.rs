//! Input validation utilities

use regex::Regex;
use std::sync::OnceLock;

use crate::models::InternshipInput;

/// Minimum accepted password length, in characters
pub const MIN_PASSWORD_LEN: usize = 6;

/// Validate email
pub fn validate_email(email: &str) -> Result<(), String> {
    if email.is_empty() {
        return Err("email is required".to_string());
    }

    if email.len() > 254 {
        return Err("email must be at most 254 characters long".to_string());
    }

    static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = EMAIL_REGEX.get_or_init(|| {
        Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
            .expect("Failed to compile email regex")
    });

    if !regex.is_match(email) {
        return Err("invalid email format".to_string());
    }

    Ok(())
}

/// Validate a password chosen at registration
pub fn validate_password(password: &str) -> Result<(), String> {
    if password.is_empty() {
        return Err("password is required".to_string());
    }

    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(format!(
            "password must be at least {} characters long",
            MIN_PASSWORD_LEN
        ));
    }

    Ok(())
}

/// Validate the required fields of an internship payload
pub fn validate_internship(input: &InternshipInput) -> Result<(), String> {
    let required = [
        ("title", &input.title),
        ("organization", &input.organization),
        ("location", &input.location),
        ("apply_url", &input.apply_url),
    ];

    for (field, value) in required {
        if value.trim().is_empty() {
            return Err(format!("{} is required", field));
        }
    }

    if input.stipend_inr < 0 {
        return Err("stipend_inr must not be negative".to_string());
    }

    Ok(())
}

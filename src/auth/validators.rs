// src/auth/validators.rs

use regex::Regex;
use std::sync::OnceLock;

use super::models::*;
use crate::common::{ValidationResult, Validator};

/// Minimum accepted password length
pub const MIN_PASSWORD_LENGTH: usize = 6;

fn email_regex() -> &'static Regex {
    static EMAIL_RE: OnceLock<Regex> = OnceLock::new();
    EMAIL_RE.get_or_init(|| {
        Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email regex is valid")
    })
}

pub fn is_valid_email(email: &str) -> bool {
    email_regex().is_match(email.trim())
}

fn check_password(result: &mut ValidationResult, field: &str, password: &str) {
    if password.is_empty() {
        result.add_error(field, "is required");
    } else if password.chars().count() < MIN_PASSWORD_LENGTH {
        result.add_error(field, "must be at least 6 characters");
    } else if password.len() > 72 {
        // bcrypt only looks at the first 72 bytes
        result.add_error(field, "must not exceed 72 bytes");
    }
}

fn check_optional(result: &mut ValidationResult, field: &str, value: &Option<String>) {
    if let Some(value) = value {
        result.max_length(field, value);
    }
}

// ============================================================================
// Auth Validators
// ============================================================================

pub struct RegisterValidator;

impl Validator<RegisterRequest> for RegisterValidator {
    fn validate(&self, data: &RegisterRequest) -> ValidationResult {
        let mut result = ValidationResult::new();

        result.require("fname", &data.fname);
        result.max_length("fname", &data.fname);
        result.require("lname", &data.lname);
        result.max_length("lname", &data.lname);

        if data.email.trim().is_empty() {
            result.add_error("email", "is required");
        } else if !is_valid_email(&data.email) {
            result.add_error("email", "must be a valid email address");
        } else {
            result.max_length("email", &data.email);
        }

        check_password(&mut result, "password", &data.password);

        check_optional(&mut result, "phone", &data.phone);
        check_optional(&mut result, "city", &data.city);
        check_optional(&mut result, "country", &data.country);
        check_optional(&mut result, "image", &data.image);

        result
    }
}

/// Only checks presence: format rules on login would tell a caller which
/// emails can't exist, and the response must not differ from a wrong password.
pub struct LoginValidator;

impl Validator<LoginRequest> for LoginValidator {
    fn validate(&self, data: &LoginRequest) -> ValidationResult {
        let mut result = ValidationResult::new();
        result.require("email", &data.email);
        if data.password.is_empty() {
            result.add_error("password", "is required");
        }
        result
    }
}

pub struct GoogleAuthValidator;

impl Validator<GoogleAuthRequest> for GoogleAuthValidator {
    fn validate(&self, data: &GoogleAuthRequest) -> ValidationResult {
        let mut result = ValidationResult::new();
        result.require("access_token", &data.access_token);
        result
    }
}

pub struct UpdateProfileValidator;

impl Validator<UpdateProfileRequest> for UpdateProfileValidator {
    fn validate(&self, data: &UpdateProfileRequest) -> ValidationResult {
        let mut result = ValidationResult::new();

        // names may be omitted but not blanked
        if let Some(fname) = &data.fname {
            result.require("fname", fname);
        }
        if let Some(lname) = &data.lname {
            result.require("lname", lname);
        }

        check_optional(&mut result, "fname", &data.fname);
        check_optional(&mut result, "lname", &data.lname);
        check_optional(&mut result, "phone", &data.phone);
        check_optional(&mut result, "city", &data.city);
        check_optional(&mut result, "country", &data.country);
        check_optional(&mut result, "image", &data.image);

        result
    }
}

pub struct ChangePasswordValidator;

impl Validator<ChangePasswordRequest> for ChangePasswordValidator {
    fn validate(&self, data: &ChangePasswordRequest) -> ValidationResult {
        let mut result = ValidationResult::new();
        if data.current_password.is_empty() {
            result.add_error("current_password", "is required");
        }
        check_password(&mut result, "new_password", &data.new_password);
        result
    }
}

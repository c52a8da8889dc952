// Common validation types and traits

/// Upper bound for free-text fields stored on the user record
pub const MAX_FIELD_LENGTH: usize = 255;

#[derive(Debug)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

#[derive(Debug)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<ValidationError>,
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self::new()
    }
}

impl ValidationResult {
    pub fn new() -> Self {
        Self {
            is_valid: true,
            errors: Vec::new(),
        }
    }

    pub fn add_error(&mut self, field: &str, message: &str) {
        self.is_valid = false;
        self.errors.push(ValidationError {
            field: field.to_string(),
            message: message.to_string(),
        });
    }

    /// Records an error when `value` is blank
    pub fn require(&mut self, field: &str, value: &str) {
        if value.trim().is_empty() {
            self.add_error(field, "is required");
        }
    }

    /// Records an error when `value` exceeds [`MAX_FIELD_LENGTH`] characters
    pub fn max_length(&mut self, field: &str, value: &str) {
        if value.chars().count() > MAX_FIELD_LENGTH {
            self.add_error(field, "must not exceed 255 characters");
        }
    }
}

pub trait Validator<T> {
    fn validate(&self, data: &T) -> ValidationResult;
}

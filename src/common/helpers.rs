// Helper functions for safe logging

use serde_json::Value;

/// Field names whose values never reach the logs
pub const SENSITIVE_FIELDS: &[&str] = &[
    "password",
    "current_password",
    "new_password",
    "token",
    "access_token",
];

/// Masks email addresses for safe logging
/// Prevents sensitive data exposure while preserving debugging utility
///
/// # Example
/// ```
/// use carbonlens_auth::common::safe_email_log;
///
/// let masked = safe_email_log("user@example.com");
/// assert_eq!(masked, "u***@example.com");
/// ```
pub fn safe_email_log(email: &str) -> String {
    if email.len() > 3 {
        let parts: Vec<&str> = email.split('@').collect();
        if parts.len() == 2 && !parts[0].is_empty() {
            let first: String = parts[0].chars().take(1).collect();
            format!("{}***@{}", first, parts[1])
        } else {
            "***@***.***".to_string()
        }
    } else {
        "***@***.***".to_string()
    }
}

/// Replaces the values of sensitive fields, at any depth, with `"***"`
pub fn redact_sensitive_fields(value: &mut Value) {
    match value {
        Value::Object(map) => {
            for (key, field) in map.iter_mut() {
                if SENSITIVE_FIELDS.contains(&key.as_str()) {
                    *field = Value::String("***".to_string());
                } else {
                    redact_sensitive_fields(field);
                }
            }
        }
        Value::Array(items) => items.iter_mut().for_each(redact_sensitive_fields),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_safe_email_log_masks_local_part() {
        assert_eq!(safe_email_log("user@example.com"), "u***@example.com");
        assert_eq!(safe_email_log("a@b"), "***@***.***");
        assert_eq!(safe_email_log("not-an-email"), "***@***.***");
    }

    #[test]
    fn test_redact_sensitive_fields_nested() {
        let mut body = json!({
            "email": "a@b.com",
            "password": "secret",
            "nested": { "access_token": "ya29.x", "city": "Pune" },
            "list": [{ "token": "jwt" }]
        });

        redact_sensitive_fields(&mut body);

        assert_eq!(body["email"], "a@b.com");
        assert_eq!(body["password"], "***");
        assert_eq!(body["nested"]["access_token"], "***");
        assert_eq!(body["nested"]["city"], "Pune");
        assert_eq!(body["list"][0]["token"], "***");
    }
}

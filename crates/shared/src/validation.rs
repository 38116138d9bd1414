//! Common validation utilities.

use serde_json::Value;
use validator::ValidationError;

/// Validates that a string contains something other than whitespace.
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("Value must not be blank".into());
        Err(err)
    } else {
        Ok(())
    }
}

/// Validates that a JSON value is an object (config and credential blobs).
pub fn validate_json_object(value: &Value) -> Result<(), ValidationError> {
    if value.is_object() {
        Ok(())
    } else {
        let mut err = ValidationError::new("json_object");
        err.message = Some("Value must be a JSON object".into());
        Err(err)
    }
}

/// Validates that a score is a percentage (0 to 100).
pub fn validate_percentage(value: f64) -> Result<(), ValidationError> {
    if (0.0..=100.0).contains(&value) {
        Ok(())
    } else {
        let mut err = ValidationError::new("percentage_range");
        err.message = Some("Value must be between 0 and 100".into());
        Err(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_validate_not_blank() {
        assert!(validate_not_blank("Xero").is_ok());
        assert!(validate_not_blank("").is_err());
        assert!(validate_not_blank("   \t").is_err());
    }

    #[test]
    fn test_validate_not_blank_error_message() {
        let err = validate_not_blank(" ").unwrap_err();
        assert_eq!(err.message.unwrap().to_string(), "Value must not be blank");
    }

    #[test]
    fn test_validate_json_object() {
        assert!(validate_json_object(&json!({})).is_ok());
        assert!(validate_json_object(&json!({"apiUrl": "https://x"})).is_ok());
        assert!(validate_json_object(&json!([1, 2])).is_err());
        assert!(validate_json_object(&json!("text")).is_err());
        assert!(validate_json_object(&Value::Null).is_err());
    }

    #[test]
    fn test_validate_percentage() {
        assert!(validate_percentage(0.0).is_ok());
        assert!(validate_percentage(100.0).is_ok());
        assert!(validate_percentage(87.5).is_ok());
        assert!(validate_percentage(-0.1).is_err());
        assert!(validate_percentage(100.1).is_err());
    }
}

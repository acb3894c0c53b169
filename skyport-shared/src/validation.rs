use serde::Serialize;

/// Caller-correctable input error, scoped to the offending field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

pub fn require_non_blank(field: &str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new(field, "must not be blank"));
    }
    Ok(())
}

pub fn require_positive(field: &str, value: i32) -> Result<(), ValidationError> {
    if value < 1 {
        return Err(ValidationError::new(
            field,
            format!("must be a positive integer, got {}", value),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_values_rejected() {
        assert!(require_non_blank("name", "Boeing 737").is_ok());

        let err = require_non_blank("name", "   ").unwrap_err();
        assert_eq!(err.field, "name");
        assert_eq!(err.message, "must not be blank");
    }

    #[test]
    fn test_positive_bound() {
        assert!(require_positive("rows", 1).is_ok());
        assert_eq!(require_positive("rows", 0).unwrap_err().field, "rows");
        assert!(require_positive("distance", -40).is_err());
    }

    #[test]
    fn test_display_includes_field() {
        let err = ValidationError::new("arrival_time", "too early");
        assert_eq!(err.to_string(), "arrival_time: too early");
    }
}

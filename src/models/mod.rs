// src/models/mod.rs

pub mod analytics;
pub mod curriculum;
pub mod material;
pub mod question;
pub mod quiz_result;
pub mod student;
pub mod user;

/// Rejects text that is empty once surrounding whitespace is trimmed.
pub fn validate_not_blank(value: &str) -> Result<(), validator::ValidationError> {
    if value.trim().is_empty() {
        return Err(validator::ValidationError::new("cannot_be_blank"));
    }
    Ok(())
}

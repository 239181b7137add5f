//! Per-field validation.
//!
//! Each function checks a single field against its constraint and returns the accepted value, or a
//! [`ValidationError`] naming the field. Both the full record and partial updates run their inputs
//! through these, so the two can never disagree about what a valid field is.

use crate::constants::MAX_AGE_EXCLUSIVE;
use crate::ValidationError;

/// Validates a patient identifier, which is the collection key and so cannot be empty.
pub fn validate_id(id: &str) -> Result<(), ValidationError> {
    if id.is_empty() {
        return Err(ValidationError::new("id", "cannot be empty"));
    }
    Ok(())
}

/// Validates an age in whole years, which must lie strictly between 0 and 100.
pub fn validate_age(age: i64) -> Result<u8, ValidationError> {
    if age <= 0 || age >= MAX_AGE_EXCLUSIVE {
        return Err(ValidationError::new(
            "age",
            format!("must be greater than 0 and less than {MAX_AGE_EXCLUSIVE}"),
        ));
    }
    // Range checked above.
    Ok(age as u8)
}

/// Validates a measurement that must be strictly positive (`height`, `weight`).
pub fn validate_positive(field: &str, value: f64) -> Result<f64, ValidationError> {
    // NaN and infinities are not finite.
    if !value.is_finite() || value <= 0.0 {
        return Err(ValidationError::new(field, "must be greater than 0"));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_id_rejects_only_empty() {
        assert!(validate_id("P001").is_ok());
        assert!(validate_id("  ").is_ok());
        let err = validate_id("").expect_err("empty id should fail");
        assert_eq!(err.field, "id");
    }

    #[test]
    fn test_validate_age_bounds_are_exclusive() {
        assert!(validate_age(0).is_err());
        assert!(validate_age(-5).is_err());
        assert!(validate_age(100).is_err());
        assert_eq!(validate_age(1).unwrap(), 1);
        assert_eq!(validate_age(99).unwrap(), 99);
    }

    #[test]
    fn test_validate_positive_rejects_zero_negative_and_nan() {
        assert!(validate_positive("height", 0.0).is_err());
        assert!(validate_positive("height", -1.2).is_err());
        assert!(validate_positive("weight", f64::NAN).is_err());
        assert!(validate_positive("weight", f64::INFINITY).is_err());
        assert_eq!(validate_positive("weight", 70.2).unwrap(), 70.2);
    }
}

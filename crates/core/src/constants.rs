//! Constants used throughout the PMS core crate.

/// Default data file when no explicit location is configured.
pub const DEFAULT_PATIENT_DATA_FILE: &str = "patients.json";

/// Exclusive upper bound for a patient's age in years.
pub const MAX_AGE_EXCLUSIVE: i64 = 100;

/// BMI values at which the verdict moves up a band.
pub const BMI_NORMAL_FROM: f64 = 18.5;
pub const BMI_OVERWEIGHT_FROM: f64 = 25.0;
pub const BMI_OBESE_FROM: f64 = 30.0;

/// Fields accepted by the sort operation, in the order reported to callers.
pub const SORTABLE_FIELDS: &[&str] = &["height", "weight", "age", "bmi"];

/// Acknowledgements returned by the mutating operations.
pub const PATIENT_CREATED_MESSAGE: &str = "Patient created successfully";
pub const PATIENT_UPDATED_MESSAGE: &str = "Patient updated successfully";
pub const PATIENT_DELETED_MESSAGE: &str = "Patient deleted successfully";

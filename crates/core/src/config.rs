//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup and then passed into core services. Request
//! handling never reads environment variables, which keeps behaviour consistent across
//! multi-threaded runtimes and test harnesses.

use crate::constants::DEFAULT_PATIENT_DATA_FILE;
use crate::{PatientError, PatientResult};
use std::path::{Path, PathBuf};

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    patient_data_file: PathBuf,
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    ///
    /// # Errors
    ///
    /// Returns `PatientError::InvalidInput` if the path is empty or names an existing directory.
    pub fn new(patient_data_file: PathBuf) -> PatientResult<Self> {
        if patient_data_file.as_os_str().is_empty() {
            return Err(PatientError::InvalidInput(
                "patient data file path cannot be empty".into(),
            ));
        }

        if patient_data_file.is_dir() {
            return Err(PatientError::InvalidInput(format!(
                "patient data file path is a directory: {}",
                patient_data_file.display()
            )));
        }

        Ok(Self { patient_data_file })
    }

    pub fn patient_data_file(&self) -> &Path {
        &self.patient_data_file
    }
}

/// Resolve the data file location from an optional (environment) value.
///
/// `None` or an empty/whitespace value falls back to [`DEFAULT_PATIENT_DATA_FILE`].
pub fn patient_data_file_from_env_value(value: Option<String>) -> PathBuf {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_PATIENT_DATA_FILE))
}

//! Patient collection storage.
//!
//! The whole collection is one JSON object on disk, keyed by patient id:
//!
//! ```text
//! {
//!   "P001": { "name": "John Doe", "city": "Pune", "age": 30, "gender": "Male",
//!             "height": 1.75, "weight": 70.2 }
//! }
//! ```
//!
//! There is no partial access: callers load everything, change it in memory, and save everything.
//! A missing file is an empty collection. Saves go through a sibling temporary file which is
//! renamed into place, so a reader never sees a half-written document.

use crate::config::CoreConfig;
use crate::record::PatientFields;
use crate::{PatientError, PatientResult};
use std::collections::BTreeMap;
use std::ffi::OsString;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

/// All stored patients, keyed by id.
pub type PatientCollection = BTreeMap<String, PatientFields>;

/// Reads and writes the patient collection file.
#[derive(Clone, Debug)]
pub struct PatientStore {
    path: PathBuf,
}

impl PatientStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn from_config(cfg: &CoreConfig) -> Self {
        Self::new(cfg.patient_data_file())
    }

    /// Loads the full collection.
    ///
    /// # Errors
    ///
    /// Returns `PatientError::FileRead` if the file exists but cannot be read, or
    /// `PatientError::Deserialization` if it is not a valid collection document.
    pub fn load(&self) -> PatientResult<PatientCollection> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!("no patient file at {}, starting empty", self.path.display());
                return Ok(PatientCollection::new());
            }
            Err(e) => return Err(PatientError::FileRead(e)),
        };

        if contents.trim().is_empty() {
            return Ok(PatientCollection::new());
        }

        serde_json::from_str(&contents).map_err(PatientError::Deserialization)
    }

    /// Replaces the stored collection with `patients`, creating the parent directory if needed.
    ///
    /// # Errors
    ///
    /// Returns `PatientError` if:
    /// - the parent directory cannot be created,
    /// - serialisation fails,
    /// - the temporary file cannot be written or renamed over the data file.
    pub fn save(&self, patients: &PatientCollection) -> PatientResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(PatientError::StorageDirCreation)?;
        }

        let json = serde_json::to_string_pretty(patients).map_err(PatientError::Serialization)?;

        let temp_path = self.temp_path()?;
        fs::write(&temp_path, json).map_err(PatientError::FileWrite)?;

        if let Err(e) = fs::rename(&temp_path, &self.path) {
            if let Err(cleanup) = fs::remove_file(&temp_path) {
                tracing::warn!(
                    "failed to remove temporary file {}: {}",
                    temp_path.display(),
                    cleanup
                );
            }
            return Err(PatientError::FileWrite(e));
        }

        Ok(())
    }

    fn temp_path(&self) -> PatientResult<PathBuf> {
        let file_name = self.path.file_name().ok_or_else(|| {
            PatientError::InvalidInput(format!(
                "patient data path has no file name: {}",
                self.path.display()
            ))
        })?;
        let mut temp_name = OsString::from(".");
        temp_name.push(file_name);
        temp_name.push(".tmp");
        Ok(self.path.with_file_name(temp_name))
    }
}

//! # PMS Core
//!
//! Core business logic for the PMS patient record service.
//!
//! This crate contains pure data operations:
//! - The patient record model with its field constraints and derived `bmi`/`verdict`
//! - Partial updates with presence-aware fields
//! - The JSON collection store
//! - `PatientService`, which composes the above into list/get/sort/create/update/delete
//!
//! **No API concerns**: HTTP servers, routing and status codes belong in `api-rest`.

pub mod config;
pub mod constants;
pub mod error;
pub mod patient;
pub mod record;
pub mod sort;
pub mod storage;
pub mod update;
pub mod validation;

pub use config::CoreConfig;
pub use constants::DEFAULT_PATIENT_DATA_FILE;
pub use error::{PatientError, PatientResult, ValidationError};
pub use patient::PatientService;
pub use record::{Gender, Patient, PatientFields, PatientView, PatientWire, Verdict, WholeYears};
pub use sort::{SortKey, SortOrder};
pub use storage::{PatientCollection, PatientStore};
pub use update::{ChangeSet, FieldChange, FieldUpdate, PatientUpdate};

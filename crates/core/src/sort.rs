//! Sort keys and ordering for the sort operation.

use crate::constants::SORTABLE_FIELDS;
use crate::record::PatientView;
use crate::PatientError;
use std::str::FromStr;

/// Numeric field a patient list can be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Height,
    Weight,
    Age,
    Bmi,
}

impl SortKey {
    pub fn value(&self, patient: &PatientView) -> f64 {
        match self {
            SortKey::Height => patient.height,
            SortKey::Weight => patient.weight,
            SortKey::Age => f64::from(patient.age),
            SortKey::Bmi => patient.bmi,
        }
    }
}

impl FromStr for SortKey {
    type Err = PatientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "height" => Ok(SortKey::Height),
            "weight" => Ok(SortKey::Weight),
            "age" => Ok(SortKey::Age),
            "bmi" => Ok(SortKey::Bmi),
            _ => Err(PatientError::InvalidArgument(format!(
                "Invalid sort_by field. Choose from [{}]",
                SORTABLE_FIELDS.join(", ")
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl FromStr for SortOrder {
    type Err = PatientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            _ => Err(PatientError::InvalidArgument(
                "Invalid order. Choose 'asc' or 'desc'".into(),
            )),
        }
    }
}

/// Stable in-place sort. Patients with equal keys keep their relative order in both directions.
pub fn sort_patients(patients: &mut [PatientView], key: SortKey, order: SortOrder) {
    match order {
        SortOrder::Asc => patients.sort_by(|a, b| key.value(a).total_cmp(&key.value(b))),
        SortOrder::Desc => patients.sort_by(|a, b| key.value(b).total_cmp(&key.value(a))),
    }
}

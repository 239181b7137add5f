//! Partial updates.
//!
//! An update body may carry any subset of the mutable fields. Each field is tracked with a
//! [`FieldUpdate`] so that a field that was not sent is distinguishable from one sent as `null`
//! or as a falsy value such as `0`.

use crate::record::{deserialize_named, Gender, Patient, PatientFields, WholeYears};
use crate::validation::{validate_age, validate_positive};
use crate::ValidationError;
use serde::{Deserialize, Deserializer};
use utoipa::ToSchema;

/// Presence-aware wrapper for a single field of an update body.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldUpdate<T> {
    /// The key was absent: leave the stored value alone.
    Unchanged,
    /// The key was sent as `null`.
    Cleared,
    Set(T),
}

impl<T> Default for FieldUpdate<T> {
    fn default() -> Self {
        FieldUpdate::Unchanged
    }
}

impl<'de, T> Deserialize<'de> for FieldUpdate<T>
where
    T: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        // Only called when the key is present; absent keys take the serde default.
        Ok(match Option::<T>::deserialize(deserializer)? {
            Some(value) => FieldUpdate::Set(value),
            None => FieldUpdate::Cleared,
        })
    }
}

/// Update request body. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, ToSchema)]
pub struct PatientUpdate {
    #[serde(default)]
    #[schema(value_type = Option<String>, example = "John Doe")]
    pub name: FieldUpdate<String>,
    #[serde(default)]
    #[schema(value_type = Option<String>, example = "Pune")]
    pub city: FieldUpdate<String>,
    #[serde(default)]
    #[schema(value_type = Option<i64>, example = 30)]
    pub age: FieldUpdate<WholeYears>,
    #[serde(default)]
    #[schema(value_type = Option<Gender>)]
    pub gender: FieldUpdate<Gender>,
    #[serde(default)]
    #[schema(value_type = Option<f64>, example = 1.75)]
    pub height: FieldUpdate<f64>,
    #[serde(default)]
    #[schema(value_type = Option<f64>, example = 70.2)]
    pub weight: FieldUpdate<f64>,
}

impl PatientUpdate {
    /// Parses an update body, reporting type mismatches against the offending field.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] if the body is not an object or a field has the wrong type.
    pub fn from_json(value: serde_json::Value) -> Result<Self, ValidationError> {
        deserialize_named(value)
    }

    /// Validates every provided value and collects the change-set.
    ///
    /// Fields that were not provided are left out entirely. Provided values must satisfy the same
    /// constraint as on a full record, so `age: 0` is rejected here even though `0` looks like
    /// "nothing".
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] for the first provided value that breaks its constraint.
    pub fn into_changes(self) -> Result<ChangeSet, ValidationError> {
        let mut changes = Vec::new();

        match self.name {
            FieldUpdate::Unchanged => {}
            FieldUpdate::Cleared => changes.push(FieldChange::Name(None)),
            FieldUpdate::Set(name) => changes.push(FieldChange::Name(Some(name))),
        }

        match self.city {
            FieldUpdate::Unchanged => {}
            FieldUpdate::Cleared => changes.push(FieldChange::City(None)),
            FieldUpdate::Set(city) => changes.push(FieldChange::City(Some(city))),
        }

        match self.age {
            FieldUpdate::Unchanged => {}
            FieldUpdate::Cleared => changes.push(FieldChange::Age(None)),
            FieldUpdate::Set(age) => changes.push(FieldChange::Age(Some(validate_age(age.0)?))),
        }

        match self.gender {
            FieldUpdate::Unchanged => {}
            FieldUpdate::Cleared => changes.push(FieldChange::Gender(None)),
            FieldUpdate::Set(gender) => changes.push(FieldChange::Gender(Some(gender))),
        }

        match self.height {
            FieldUpdate::Unchanged => {}
            FieldUpdate::Cleared => changes.push(FieldChange::Height(None)),
            FieldUpdate::Set(height) => {
                let height = validate_positive("height", height)?;
                changes.push(FieldChange::Height(Some(height)));
            }
        }

        match self.weight {
            FieldUpdate::Unchanged => {}
            FieldUpdate::Cleared => changes.push(FieldChange::Weight(None)),
            FieldUpdate::Set(weight) => {
                let weight = validate_positive("weight", weight)?;
                changes.push(FieldChange::Weight(Some(weight)));
            }
        }

        Ok(ChangeSet(changes))
    }
}

/// One field overwrite. `None` means the field was explicitly cleared.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldChange {
    Name(Option<String>),
    City(Option<String>),
    Age(Option<u8>),
    Gender(Option<Gender>),
    Height(Option<f64>),
    Weight(Option<f64>),
}

impl FieldChange {
    pub fn field_name(&self) -> &'static str {
        match self {
            FieldChange::Name(_) => "name",
            FieldChange::City(_) => "city",
            FieldChange::Age(_) => "age",
            FieldChange::Gender(_) => "gender",
            FieldChange::Height(_) => "height",
            FieldChange::Weight(_) => "weight",
        }
    }
}

/// The validated set of field overwrites produced by a [`PatientUpdate`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChangeSet(Vec<FieldChange>);

impl ChangeSet {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Names of the fields this change-set touches, in application order.
    pub fn field_names(&self) -> Vec<&'static str> {
        self.0.iter().map(FieldChange::field_name).collect()
    }

    /// Overwrites `existing` field by field and re-validates the merged record.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] if a required field was cleared or the merged record fails
    /// any record constraint.
    pub fn apply(self, id: &str, existing: PatientFields) -> Result<Patient, ValidationError> {
        let mut merged = existing;

        for change in self.0 {
            let field = change.field_name();
            let required = || ValidationError::new(field, "field required");
            match change {
                FieldChange::Name(v) => merged.name = v.ok_or_else(required)?,
                FieldChange::City(v) => merged.city = v.ok_or_else(required)?,
                FieldChange::Age(v) => merged.age = v.ok_or_else(required)?,
                FieldChange::Gender(v) => merged.gender = v.ok_or_else(required)?,
                FieldChange::Height(v) => merged.height = v.ok_or_else(required)?,
                FieldChange::Weight(v) => merged.weight = v.ok_or_else(required)?,
            }
        }

        Patient::new(id, merged)
    }
}

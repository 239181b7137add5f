//! Patient record model.
//!
//! A record exists in three shapes:
//!
//! - [`PatientFields`]: the stored fields, exactly what is persisted under the patient id
//! - [`Patient`]: a validated record (id plus fields), the only way new data enters the store
//! - [`PatientView`]: what callers read back, the stored fields plus `id`, `bmi` and `verdict`
//!
//! `bmi` and `verdict` are computed from `height` and `weight` every time they are asked for and
//! are never persisted.

use crate::constants::{BMI_NORMAL_FROM, BMI_OBESE_FROM, BMI_OVERWEIGHT_FROM};
use crate::validation::{validate_age, validate_id, validate_positive};
use crate::ValidationError;
use serde::{de, Deserialize, Deserializer, Serialize};
use std::str::FromStr;
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl FromStr for Gender {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Male" => Ok(Gender::Male),
            "Female" => Ok(Gender::Female),
            "Other" => Ok(Gender::Other),
            _ => Err(ValidationError::new(
                "gender",
                "must be one of Male, Female, Other",
            )),
        }
    }
}

/// BMI classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum Verdict {
    Underweight,
    Normal,
    Overweight,
    Obese,
}

impl Verdict {
    /// Classifies a (rounded) BMI value. Bands are half-open: a value on a boundary belongs to
    /// the higher band.
    pub fn from_bmi(bmi: f64) -> Self {
        if bmi < BMI_NORMAL_FROM {
            Verdict::Underweight
        } else if bmi < BMI_OVERWEIGHT_FROM {
            Verdict::Normal
        } else if bmi < BMI_OBESE_FROM {
            Verdict::Overweight
        } else {
            Verdict::Obese
        }
    }
}

/// Body-mass index, `weight / height²`, rounded to two decimal places.
pub fn bmi(height_m: f64, weight_kg: f64) -> f64 {
    let raw = weight_kg / (height_m * height_m);
    (raw * 100.0).round() / 100.0
}

/// The persisted fields of a patient. The id is the collection key and is not repeated here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PatientFields {
    pub name: String,
    pub city: String,
    pub age: u8,
    pub gender: Gender,
    /// Height in meters.
    pub height: f64,
    /// Weight in kilograms.
    pub weight: f64,
}

impl PatientFields {
    pub fn bmi(&self) -> f64 {
        bmi(self.height, self.weight)
    }

    pub fn verdict(&self) -> Verdict {
        Verdict::from_bmi(self.bmi())
    }

    /// Runs every field constraint, failing on the first violation.
    ///
    /// `name` and `city` only have to be present, so any string (even `""`) passes.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_age(i64::from(self.age))?;
        validate_positive("height", self.height)?;
        validate_positive("weight", self.weight)?;
        Ok(())
    }

    /// Builds the read-side representation, computing the derived fields.
    pub fn view(&self, id: &str) -> PatientView {
        PatientView {
            id: id.to_string(),
            name: self.name.clone(),
            city: self.city.clone(),
            age: self.age,
            gender: self.gender,
            height: self.height,
            weight: self.weight,
            bmi: self.bmi(),
            verdict: self.verdict(),
        }
    }
}

/// A validated patient record.
///
/// Constructing one always runs the full set of field constraints, so holding a `Patient` means
/// the data is safe to persist.
#[derive(Debug, Clone, PartialEq)]
pub struct Patient {
    id: String,
    fields: PatientFields,
}

impl Patient {
    /// Validates `id` and `fields` and builds a record.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] naming the first field that breaks its constraint.
    pub fn new(id: impl Into<String>, fields: PatientFields) -> Result<Self, ValidationError> {
        let id = id.into();
        validate_id(&id)?;
        fields.validate()?;
        Ok(Self { id, fields })
    }

    /// Parses and validates a create request body.
    ///
    /// This uses `serde_path_to_error` so type mismatches (e.g. an unknown gender or a string
    /// age) are reported against the field they occurred in. Unknown keys, including any `bmi`
    /// or `verdict` sent by the client, are ignored.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] if the body does not have the record shape or any field
    /// breaks its constraint.
    pub fn from_json(value: serde_json::Value) -> Result<Self, ValidationError> {
        let wire: PatientWire = deserialize_named(value)?;
        let age = validate_age(wire.age.0)?;

        Self::new(
            wire.id,
            PatientFields {
                name: wire.name,
                city: wire.city,
                age,
                gender: wire.gender,
                height: wire.height,
                weight: wire.weight,
            },
        )
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn fields(&self) -> &PatientFields {
        &self.fields
    }

    pub fn bmi(&self) -> f64 {
        self.fields.bmi()
    }

    pub fn verdict(&self) -> Verdict {
        self.fields.verdict()
    }

    /// Splits the record into its collection key and stored fields.
    pub fn into_parts(self) -> (String, PatientFields) {
        (self.id, self.fields)
    }
}

/// A whole number of years as sent by a client.
///
/// Integers and integral floats (`30.0`) are accepted; `30.5` and strings are not. The value is
/// read as `i64` so out-of-range ages reach [`validate_age`] instead of failing as a type error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WholeYears(pub i64);

impl<'de> Deserialize<'de> for WholeYears {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let number = serde_json::Number::deserialize(deserializer)?;
        if let Some(years) = number.as_i64() {
            return Ok(Self(years));
        }
        match number.as_f64() {
            // `as` saturates, and anything that large fails the range check anyway.
            Some(years) if years.is_finite() && years.fract() == 0.0 => Ok(Self(years as i64)),
            _ => Err(de::Error::custom(format!(
                "expected a whole number, got {number}"
            ))),
        }
    }
}

/// Request shape for creating a patient.
#[derive(Debug, Deserialize, ToSchema)]
pub struct PatientWire {
    #[schema(example = "P001")]
    pub id: String,
    #[schema(example = "John Doe")]
    pub name: String,
    #[schema(example = "Pune")]
    pub city: String,
    #[schema(value_type = i64, example = 30)]
    pub age: WholeYears,
    pub gender: Gender,
    #[schema(example = 1.75)]
    pub height: f64,
    #[schema(example = 70.2)]
    pub weight: f64,
}

/// A patient as returned by every read operation.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct PatientView {
    pub id: String,
    pub name: String,
    pub city: String,
    pub age: u8,
    pub gender: Gender,
    pub height: f64,
    pub weight: f64,
    pub bmi: f64,
    pub verdict: Verdict,
}

/// Deserializes a JSON value, turning serde errors into a [`ValidationError`] whose field is
/// the path at which deserialization failed.
pub(crate) fn deserialize_named<T>(value: serde_json::Value) -> Result<T, ValidationError>
where
    T: serde::de::DeserializeOwned,
{
    serde_path_to_error::deserialize::<_, T>(value).map_err(|err| {
        let path = err.path().to_string();
        let source = err.into_inner();
        // Missing fields and non-object bodies fail at the root.
        let field = if path.is_empty() || path == "." {
            "body".to_string()
        } else {
            path
        };
        ValidationError::new(field, source.to_string())
    })
}

//! Patient service.
//!
//! Every operation reloads the collection from the [`PatientStore`], works on that fresh copy and,
//! for mutations, saves the whole collection back. Nothing is cached between calls.
//!
//! All operations on one service (and its clones) run under a single mutex, so two requests in the
//! same process cannot interleave a load-modify-save cycle and lose an update. Separate processes
//! sharing one data file are not coordinated.

use crate::record::{Patient, PatientView};
use crate::sort::{sort_patients, SortKey, SortOrder};
use crate::storage::{PatientCollection, PatientStore};
use crate::update::ChangeSet;
use crate::{CoreConfig, PatientError, PatientResult};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Pure patient data operations - no API concerns
#[derive(Clone, Debug)]
pub struct PatientService {
    cfg: Arc<CoreConfig>,
    store: PatientStore,
    lock: Arc<Mutex<()>>,
}

impl PatientService {
    /// Creates a new instance of PatientService.
    ///
    /// Create one service per data file and clone it; clones share the same lock.
    pub fn new(cfg: Arc<CoreConfig>) -> Self {
        let store = PatientStore::from_config(&cfg);
        Self {
            cfg,
            store,
            lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn config(&self) -> &CoreConfig {
        &self.cfg
    }

    // A panic while holding the guard cannot leave the file half-written, so a poisoned lock is
    // still usable.
    fn guard(&self) -> MutexGuard<'_, ()> {
        self.lock.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns every patient keyed by id, with derived fields.
    ///
    /// # Errors
    ///
    /// Returns `PatientError` if the collection cannot be loaded.
    pub fn list_patients(&self) -> PatientResult<BTreeMap<String, PatientView>> {
        let _guard = self.guard();
        let patients = self.store.load()?;

        Ok(patients
            .iter()
            .map(|(id, fields)| (id.clone(), fields.view(id)))
            .collect())
    }

    /// Returns a single patient.
    ///
    /// # Errors
    ///
    /// Returns `PatientError::NotFound` if no patient has this id, or a storage error.
    pub fn get_patient(&self, id: &str) -> PatientResult<PatientView> {
        let _guard = self.guard();
        let patients = self.store.load()?;

        patients
            .get(id)
            .map(|fields| fields.view(id))
            .ok_or_else(|| PatientError::NotFound(id.to_string()))
    }

    /// Returns all patients ordered by `sort_by`.
    ///
    /// `sort_by` must be one of `height`, `weight`, `age`, `bmi`; `order` is `asc` (the default
    /// when `None`) or `desc`. Both are checked before the collection is read.
    ///
    /// # Errors
    ///
    /// Returns `PatientError::InvalidArgument` for any other `sort_by` or `order`, or a storage
    /// error.
    pub fn sort_patients(
        &self,
        sort_by: &str,
        order: Option<&str>,
    ) -> PatientResult<Vec<PatientView>> {
        let key: SortKey = sort_by.parse()?;
        let order = order
            .map(str::parse::<SortOrder>)
            .transpose()?
            .unwrap_or_default();

        let _guard = self.guard();
        let patients = self.store.load()?;

        let mut views: Vec<PatientView> = patients
            .iter()
            .map(|(id, fields)| fields.view(id))
            .collect();
        sort_patients(&mut views, key, order);

        Ok(views)
    }

    /// Stores a new patient.
    ///
    /// # Errors
    ///
    /// Returns `PatientError::AlreadyExists` if the id is taken (the collection is left untouched),
    /// or a storage error.
    pub fn create_patient(&self, patient: Patient) -> PatientResult<()> {
        let _guard = self.guard();
        let mut patients = self.store.load()?;

        if patients.contains_key(patient.id()) {
            return Err(PatientError::AlreadyExists(patient.id().to_string()));
        }

        let (id, fields) = patient.into_parts();
        patients.insert(id.clone(), fields);
        self.store.save(&patients)?;

        tracing::info!("created patient {}", id);
        Ok(())
    }

    /// Applies a change-set to an existing patient.
    ///
    /// The merged record is fully re-validated before anything is written.
    ///
    /// # Errors
    ///
    /// Returns `PatientError` if:
    /// - no patient has this id (`NotFound`),
    /// - the merged record breaks a field constraint (`Validation`),
    /// - the collection cannot be loaded or saved.
    pub fn update_patient(&self, id: &str, changes: ChangeSet) -> PatientResult<()> {
        let _guard = self.guard();
        let mut patients: PatientCollection = self.store.load()?;

        let existing = patients
            .get(id)
            .cloned()
            .ok_or_else(|| PatientError::NotFound(id.to_string()))?;

        let changed_fields = changes.field_names();
        let updated = changes.apply(id, existing)?;

        let (id, fields) = updated.into_parts();
        patients.insert(id.clone(), fields);
        self.store.save(&patients)?;

        tracing::info!("updated patient {} ({:?})", id, changed_fields);
        Ok(())
    }

    /// Removes a patient.
    ///
    /// # Errors
    ///
    /// Returns `PatientError::NotFound` if no patient has this id, or a storage error.
    pub fn delete_patient(&self, id: &str) -> PatientResult<()> {
        let _guard = self.guard();
        let mut patients = self.store.load()?;

        if patients.remove(id).is_none() {
            return Err(PatientError::NotFound(id.to_string()));
        }
        self.store.save(&patients)?;

        tracing::info!("deleted patient {}", id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{Gender, PatientFields, Verdict};
    use crate::update::PatientUpdate;
    use serde_json::json;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn test_service(dir: &Path) -> PatientService {
        let cfg =
            CoreConfig::new(dir.join("patients.json")).expect("CoreConfig::new should succeed");
        PatientService::new(Arc::new(cfg))
    }

    fn patient(id: &str, age: u8, height: f64, weight: f64) -> Patient {
        Patient::new(
            id,
            PatientFields {
                name: format!("Patient {id}"),
                city: "Pune".into(),
                age,
                gender: Gender::Female,
                height,
                weight,
            },
        )
        .expect("valid patient")
    }

    fn john_doe() -> Patient {
        Patient::from_json(json!({
            "id": "P001",
            "name": "John Doe",
            "city": "Pune",
            "age": 30,
            "gender": "Male",
            "height": 1.75,
            "weight": 70.2
        }))
        .expect("valid patient")
    }

    fn changes(body: serde_json::Value) -> ChangeSet {
        PatientUpdate::from_json(body)
            .expect("update parses")
            .into_changes()
            .expect("update is valid")
    }

    fn raw_file(service: &PatientService) -> String {
        fs::read_to_string(service.config().patient_data_file()).unwrap_or_default()
    }

    #[test]
    fn test_create_then_get_returns_derived_fields() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let service = test_service(temp_dir.path());

        service.create_patient(john_doe()).expect("create should succeed");

        let view = service.get_patient("P001").expect("patient should exist");
        assert_eq!(view.name, "John Doe");
        assert_eq!(view.city, "Pune");
        assert_eq!(view.age, 30);
        assert_eq!(view.gender, Gender::Male);
        assert_eq!(view.height, 1.75);
        assert_eq!(view.weight, 70.2);
        assert_eq!(view.bmi, 22.92);
        assert_eq!(view.verdict, Verdict::Normal);
    }

    #[test]
    fn test_create_duplicate_fails_and_leaves_file_unchanged() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let service = test_service(temp_dir.path());

        service.create_patient(john_doe()).expect("create should succeed");
        let before = raw_file(&service);

        let err = service
            .create_patient(patient("P001", 50, 1.6, 50.0))
            .expect_err("duplicate id should fail");
        assert!(matches!(err, PatientError::AlreadyExists(_)));
        assert_eq!(raw_file(&service), before);
    }

    #[test]
    fn test_get_missing_patient_is_not_found() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let service = test_service(temp_dir.path());

        let err = service.get_patient("nobody").expect_err("should be missing");
        assert!(matches!(err, PatientError::NotFound(_)));
    }

    #[test]
    fn test_list_returns_every_patient_with_views() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let service = test_service(temp_dir.path());
        assert!(service.list_patients().expect("list").is_empty());

        service.create_patient(john_doe()).expect("create");
        service
            .create_patient(patient("P002", 50, 1.6, 80.0))
            .expect("create");

        let all = service.list_patients().expect("list");
        assert_eq!(all.len(), 2);
        assert_eq!(all["P001"].verdict, Verdict::Normal);
        assert_eq!(all["P002"].verdict, Verdict::Obese);
        assert_eq!(all["P002"].id, "P002");
    }

    #[test]
    fn test_update_weight_only_changes_weight_and_derived_fields() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let service = test_service(temp_dir.path());
        service.create_patient(john_doe()).expect("create");

        service
            .update_patient("P001", changes(json!({ "weight": 95.0 })))
            .expect("update should succeed");

        let view = service.get_patient("P001").expect("patient exists");
        assert_eq!(view.weight, 95.0);
        assert_eq!(view.bmi, 31.02);
        assert_eq!(view.verdict, Verdict::Obese);
        assert_eq!(view.name, "John Doe");
        assert_eq!(view.city, "Pune");
        assert_eq!(view.age, 30);
        assert_eq!(view.height, 1.75);
    }

    #[test]
    fn test_update_missing_patient_is_not_found_and_writes_nothing() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let service = test_service(temp_dir.path());
        service.create_patient(john_doe()).expect("create");
        let before = raw_file(&service);

        let err = service
            .update_patient("P404", changes(json!({ "age": 41 })))
            .expect_err("missing id should fail");
        assert!(matches!(err, PatientError::NotFound(_)));
        assert_eq!(raw_file(&service), before);
    }

    #[test]
    fn test_update_that_clears_required_field_is_rejected() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let service = test_service(temp_dir.path());
        service.create_patient(john_doe()).expect("create");
        let before = raw_file(&service);

        let err = service
            .update_patient("P001", changes(json!({ "height": null })))
            .expect_err("clearing height should fail");
        match err {
            PatientError::Validation(v) => assert_eq!(v.field, "height"),
            other => panic!("expected validation error, got {other:?}"),
        }
        assert_eq!(raw_file(&service), before);
    }

    #[test]
    fn test_delete_then_get_is_not_found() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let service = test_service(temp_dir.path());
        service.create_patient(john_doe()).expect("create");

        service.delete_patient("P001").expect("delete should succeed");

        assert!(matches!(
            service.get_patient("P001"),
            Err(PatientError::NotFound(_))
        ));
        assert!(matches!(
            service.delete_patient("P001"),
            Err(PatientError::NotFound(_))
        ));
    }

    #[test]
    fn test_sort_by_age_desc_is_non_increasing() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let service = test_service(temp_dir.path());
        for (id, age) in [("A", 33), ("B", 71), ("C", 18), ("D", 54)] {
            service
                .create_patient(patient(id, age, 1.7, 65.0))
                .expect("create");
        }

        let sorted = service
            .sort_patients("age", Some("desc"))
            .expect("sort should succeed");
        let ages: Vec<u8> = sorted.iter().map(|p| p.age).collect();
        assert_eq!(ages, vec![71, 54, 33, 18]);

        let sorted = service.sort_patients("age", None).expect("default is asc");
        let ages: Vec<u8> = sorted.iter().map(|p| p.age).collect();
        assert_eq!(ages, vec![18, 33, 54, 71]);
    }

    #[test]
    fn test_sort_rejects_invalid_arguments() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let service = test_service(temp_dir.path());

        assert!(matches!(
            service.sort_patients("name", None),
            Err(PatientError::InvalidArgument(_))
        ));
        assert!(matches!(
            service.sort_patients("age", Some("sideways")),
            Err(PatientError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_clones_share_one_lock_across_threads() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let service = test_service(temp_dir.path());

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let service = service.clone();
                std::thread::spawn(move || {
                    service
                        .create_patient(patient(&format!("T{i}"), 20 + i, 1.7, 60.0))
                        .expect("create should succeed");
                })
            })
            .collect();
        for handle in handles {
            handle.join().expect("thread should not panic");
        }

        assert_eq!(service.list_patients().expect("list").len(), 8);
    }
}

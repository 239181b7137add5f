use clap::{Parser, Subcommand};
use pms_core::config::patient_data_file_from_env_value;
use pms_core::constants::{
    PATIENT_CREATED_MESSAGE, PATIENT_DELETED_MESSAGE, PATIENT_UPDATED_MESSAGE,
};
use pms_core::{
    CoreConfig, FieldUpdate, Gender, Patient, PatientFields, PatientService, PatientUpdate,
    WholeYears,
};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "pms")]
#[command(about = "PMS patient record CLI")]
struct Cli {
    /// Patient collection file
    #[arg(long, global = true, env = "PMS_DATA_FILE")]
    data_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List all patients
    List,
    /// Show one patient
    Get {
        /// Patient ID
        id: String,
    },
    /// List patients ordered by height, weight, age or bmi
    Sort {
        /// Field to sort by
        sort_by: String,
        /// asc or desc
        #[arg(long)]
        order: Option<String>,
    },
    /// Create a patient
    Create {
        #[arg(long)]
        id: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        city: String,
        #[arg(long, allow_negative_numbers = true)]
        age: i64,
        /// Male, Female or Other
        #[arg(long)]
        gender: Gender,
        /// Height in meters
        #[arg(long, allow_negative_numbers = true)]
        height: f64,
        /// Weight in kilograms
        #[arg(long, allow_negative_numbers = true)]
        weight: f64,
    },
    /// Change some fields of a patient
    Edit {
        /// Patient ID
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        city: Option<String>,
        #[arg(long, allow_negative_numbers = true)]
        age: Option<i64>,
        #[arg(long)]
        gender: Option<Gender>,
        #[arg(long, allow_negative_numbers = true)]
        height: Option<f64>,
        #[arg(long, allow_negative_numbers = true)]
        weight: Option<f64>,
    },
    /// Delete a patient
    Delete {
        /// Patient ID
        id: String,
    },
}

fn set_if_given<T>(value: Option<T>) -> FieldUpdate<T> {
    value.map_or(FieldUpdate::Unchanged, FieldUpdate::Set)
}

/// Runs one command and returns what should be printed on stdout.
fn run(cli: Cli) -> anyhow::Result<String> {
    let Some(command) = cli.command else {
        return Ok("Use 'pms --help' for commands".into());
    };

    let data_file =
        patient_data_file_from_env_value(cli.data_file.map(|p| p.to_string_lossy().into_owned()));
    tracing::debug!("using patient data file {}", data_file.display());
    let service = PatientService::new(Arc::new(CoreConfig::new(data_file)?));

    let output = match command {
        Commands::List => serde_json::to_string_pretty(&service.list_patients()?)?,
        Commands::Get { id } => serde_json::to_string_pretty(&service.get_patient(&id)?)?,
        Commands::Sort { sort_by, order } => {
            serde_json::to_string_pretty(&service.sort_patients(&sort_by, order.as_deref())?)?
        }
        Commands::Create {
            id,
            name,
            city,
            age,
            gender,
            height,
            weight,
        } => {
            let age = pms_core::validation::validate_age(age)?;
            let patient = Patient::new(
                id,
                PatientFields {
                    name,
                    city,
                    age,
                    gender,
                    height,
                    weight,
                },
            )?;
            service.create_patient(patient)?;
            PATIENT_CREATED_MESSAGE.to_string()
        }
        Commands::Edit {
            id,
            name,
            city,
            age,
            gender,
            height,
            weight,
        } => {
            let update = PatientUpdate {
                name: set_if_given(name),
                city: set_if_given(city),
                age: set_if_given(age.map(WholeYears)),
                gender: set_if_given(gender),
                height: set_if_given(height),
                weight: set_if_given(weight),
            };
            service.update_patient(&id, update.into_changes()?)?;
            PATIENT_UPDATED_MESSAGE.to_string()
        }
        Commands::Delete { id } => {
            service.delete_patient(&id)?;
            PATIENT_DELETED_MESSAGE.to_string()
        }
    };

    Ok(output)
}

fn main() -> anyhow::Result<()> {
    if std::env::var_os("RUST_LOG").is_some() {
        tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_writer(std::io::stderr)
            .init();
    }

    let output = run(Cli::parse())?;
    println!("{output}");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pms_core::PatientError;
    use tempfile::TempDir;

    fn run_args(data_file: &std::path::Path, args: &[&str]) -> anyhow::Result<String> {
        let mut argv = vec!["pms", "--data-file"];
        let data_file = data_file.to_str().expect("utf-8 temp path");
        argv.push(data_file);
        argv.extend_from_slice(args);
        run(Cli::try_parse_from(argv).expect("arguments should parse"))
    }

    const CREATE_JOHN: &[&str] = &[
        "create", "--id", "P001", "--name", "John Doe", "--city", "Pune", "--age", "30",
        "--gender", "Male", "--height", "1.75", "--weight", "70.2",
    ];

    #[test]
    fn test_create_get_edit_delete() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let data_file = temp_dir.path().join("patients.json");

        let out = run_args(&data_file, CREATE_JOHN).expect("create should succeed");
        assert_eq!(out, PATIENT_CREATED_MESSAGE);

        let out = run_args(&data_file, &["get", "P001"]).expect("get should succeed");
        let value: serde_json::Value = serde_json::from_str(&out).expect("json output");
        assert_eq!(value["bmi"], 22.92);
        assert_eq!(value["verdict"], "Normal");

        run_args(&data_file, &["edit", "P001", "--weight", "95"]).expect("edit should succeed");
        let out = run_args(&data_file, &["get", "P001"]).expect("get should succeed");
        let value: serde_json::Value = serde_json::from_str(&out).expect("json output");
        assert_eq!(value["verdict"], "Obese");
        assert_eq!(value["city"], "Pune");

        run_args(&data_file, &["delete", "P001"]).expect("delete should succeed");
        let err = run_args(&data_file, &["get", "P001"]).expect_err("patient is gone");
        assert!(matches!(
            err.downcast_ref::<PatientError>(),
            Some(PatientError::NotFound(_))
        ));
    }

    #[test]
    fn test_create_rejects_out_of_range_age() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let data_file = temp_dir.path().join("patients.json");

        let mut args = CREATE_JOHN.to_vec();
        args[8] = "-4";
        let err = run_args(&data_file, &args).expect_err("negative age should fail");
        assert!(err.to_string().starts_with("age"));
        assert!(!data_file.exists(), "nothing should be written");
    }

    #[test]
    fn test_sort_rejects_unknown_field() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let data_file = temp_dir.path().join("patients.json");

        let err = run_args(&data_file, &["sort", "name"]).expect_err("name is not sortable");
        assert!(matches!(
            err.downcast_ref::<PatientError>(),
            Some(PatientError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_gender_must_be_known() {
        let result = Cli::try_parse_from([
            "pms", "create", "--id", "P1", "--name", "A", "--city", "B", "--age", "20",
            "--gender", "Robot", "--height", "1.7", "--weight", "60",
        ]);
        assert!(result.is_err());
    }
}

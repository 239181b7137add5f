/// A single field constraint violation.
///
/// `field` is the name (or path, for nested wire errors) of the offending input and `message`
/// describes the constraint it broke.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PatientError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("Patient not found")]
    NotFound(String),
    #[error("Patient already exists")]
    AlreadyExists(String),
    #[error("{0}")]
    InvalidArgument(String),

    #[error("failed to create storage directory: {0}")]
    StorageDirCreation(std::io::Error),
    #[error("failed to write patient file: {0}")]
    FileWrite(std::io::Error),
    #[error("failed to read patient file: {0}")]
    FileRead(std::io::Error),
    #[error("failed to serialize patients: {0}")]
    Serialization(serde_json::Error),
    #[error("failed to deserialize patients: {0}")]
    Deserialization(serde_json::Error),
}

impl PatientError {
    /// True for errors caused by the caller's input rather than by storage.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            PatientError::InvalidInput(_)
                | PatientError::Validation(_)
                | PatientError::NotFound(_)
                | PatientError::AlreadyExists(_)
                | PatientError::InvalidArgument(_)
        )
    }
}

pub type PatientResult<T> = std::result::Result<T, PatientError>;

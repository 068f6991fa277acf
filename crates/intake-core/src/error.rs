use thiserror::Error;

use crate::steps::StepId;
use crate::validation::ValidationResult;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Step {requested} is out of range (1-{total})")]
    StepOutOfRange { requested: usize, total: usize },
    #[error("Step {step} has {} unresolved field error(s)", .errors.len())]
    StepBlocked {
        step: usize,
        errors: ValidationResult,
    },
    #[error("Step '{0}' is not shown for the selected role")]
    StepHidden(StepId),
    #[error("A submission is already in progress")]
    SubmissionInProgress,
    #[error("Form has already been submitted")]
    AlreadySubmitted,
    #[error("Submission is only available from the final step")]
    NotOnFinalStep,
    #[error("Form has {} unresolved field error(s), first on step {step}", .errors.len())]
    IncompleteForm {
        step: usize,
        errors: ValidationResult,
    },
    #[error("Transformation failed: {0}")]
    Transformation(String),
    #[error(transparent)]
    Gateway(#[from] GatewayError),
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Serialization error: {0}")]
    Serde(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        CoreError::Serde(err.to_string())
    }
}

/// Failures reported by the external record/document/email collaborators.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GatewayError {
    #[error("Network failure: {0}")]
    Transport(String),
    #[error("Remote service rejected the request ({status}): {message}")]
    Remote { status: u16, message: String },
    #[error("Unexpected response: {0}")]
    Decode(String),
    #[error("Missing credential: {0}")]
    MissingCredential(String),
}

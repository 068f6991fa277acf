use thiserror::Error;

use intake_config::ConfigError;
use intake_core::{CoreError, GatewayError, ValidationResult};

/// Unified error for library callers.
#[derive(Debug, Error)]
pub enum IntakeError {
    #[error(transparent)]
    Core(#[from] CoreError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

impl From<GatewayError> for IntakeError {
    fn from(err: GatewayError) -> Self {
        IntakeError::Core(CoreError::Gateway(err))
    }
}

impl IntakeError {
    /// Field errors carried by a blocked step or an incomplete submission.
    pub fn field_errors(&self) -> Option<&ValidationResult> {
        match self {
            IntakeError::Core(CoreError::StepBlocked { errors, .. })
            | IntakeError::Core(CoreError::IncompleteForm { errors, .. }) => Some(errors),
            _ => None,
        }
    }
}

/// Errors surfaced by the command-line front end.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Intake(#[from] IntakeError),
    #[error(transparent)]
    Prompt(#[from] dialoguer::Error),
    #[error("{0}")]
    InvalidArguments(String),
    #[error("input ended before the wizard finished")]
    InputClosed,
}

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        CliError::Intake(err.into())
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        CliError::Intake(err.into())
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        CliError::Intake(err.into())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(err: serde_json::Error) -> Self {
        CliError::Intake(err.into())
    }
}

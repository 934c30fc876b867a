use thiserror::Error;

/// Programmer errors detected while a form is being defined or wired up.
///
/// These never reach the person filling in the form; a form whose definition
/// fails this check is not constructed at all.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    #[error("field descriptor name must not be empty")]
    EmptyName,
    #[error("field `{0}` is declared more than once")]
    DuplicateField(String),
    #[error("field `{0}` has no entry in the default value table")]
    MissingDefault(String),
    #[error("field `{0}` has no rule in the validation schema")]
    MissingRule(String),
    #[error("unknown field `{0}`")]
    UnknownField(String),
    #[error("field `{field}` has an invalid constraint: {reason}")]
    InvalidConstraint { field: String, reason: String },
    #[error("submission context is missing `{0}`")]
    MissingContext(&'static str),
}

/// Failures reported by the external services a form submits to.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("rejected by server: {0}")]
    Rejected(String),
    #[error("service unavailable: {0}")]
    Unavailable(String),
}

/// A submit attempt that passed validation but did not complete.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmissionError {
    #[error(transparent)]
    Backend(#[from] BackendError),
    #[error("cannot build payload from `{field}`: {reason}")]
    Payload { field: String, reason: String },
}

/// Top-level error used by the configuration layer and the terminal front-end.
#[derive(Debug, Error)]
pub enum FormError {
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),
    #[error("Submission failed: {0}")]
    Submission(#[from] SubmissionError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("Prompt error: {0}")]
    Prompt(#[from] dialoguer::Error),
    #[error("Invalid input: {0}")]
    Input(String),
}

pub type Result<T> = std::result::Result<T, FormError>;

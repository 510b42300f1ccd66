use thiserror::Error;

use crate::submit::SubmissionStep;

/// Errors reported by a repository host backend
#[derive(Error, Debug)]
pub enum HostError {
    #[error("Authentication failed")]
    Unauthorized,

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("IO error: {0}")]
    Io(String),
}

impl HostError {
    /// True when the remote side answered and refused the request,
    /// as opposed to the request never reaching it.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            HostError::Unauthorized | HostError::NotFound(_) | HostError::Api { .. }
        )
    }
}

pub type HostResult<T> = std::result::Result<T, HostError>;

/// Errors surfaced by the session and submission flows
#[derive(Error, Debug)]
pub enum ShowcaseError {
    #[error("You must be logged in to submit (run 'showcase auth login')")]
    NotAuthenticated,

    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Failed to retrieve token after {attempts} attempts")]
    TokenPollExhausted { attempts: u32 },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error(transparent)]
    Host(#[from] HostError),

    #[error("Submission failed at step '{step}': {source}")]
    StepFailed {
        step: SubmissionStep,
        #[source]
        source: HostError,
    },
}

impl From<serde_json::Error> for ShowcaseError {
    fn from(err: serde_json::Error) -> Self {
        ShowcaseError::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ShowcaseError>;

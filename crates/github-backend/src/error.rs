use showcase_core::HostError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GitHubError {
    #[error("HTTP error: {0}")]
    Http(#[from] ureq::Error),

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Content decode error: {0}")]
    Decode(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Authentication failed")]
    Unauthorized,

    #[error("Rate limited")]
    RateLimited,

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },
}

pub type Result<T> = std::result::Result<T, GitHubError>;

impl From<GitHubError> for HostError {
    fn from(err: GitHubError) -> Self {
        match err {
            GitHubError::Http(e) => HostError::Http(e.to_string()),
            GitHubError::Parse(e) => HostError::Parse(e.to_string()),
            GitHubError::Io(e) => HostError::Io(e.to_string()),
            GitHubError::Decode(msg) => HostError::Parse(msg),
            GitHubError::NotFound(what) => HostError::NotFound(what),
            GitHubError::Unauthorized => HostError::Unauthorized,
            GitHubError::RateLimited => HostError::Api {
                status: 429,
                message: "GitHub API rate limit exceeded".to_string(),
            },
            GitHubError::Api { status, message } => HostError::Api { status, message },
        }
    }
}

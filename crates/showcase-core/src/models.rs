use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque access token. Stored and forwarded, never parsed.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Credential(String);

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

/// The authenticated user as reported by the identity provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: u64,
    pub login: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub avatar_url: String,
}

impl Identity {
    /// Name shown to the user: the profile name when set, otherwise the login
    pub fn display_name(&self) -> &str {
        match self.name.as_deref() {
            Some(name) if !name.trim().is_empty() => name,
            _ => &self.login,
        }
    }
}

/// A repository addressed as owner/name
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepoId {
    pub owner: String,
    pub name: String,
}

impl RepoId {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }

    /// Parse "owner/name"
    pub fn parse(full_name: &str) -> Option<Self> {
        let (owner, name) = full_name.split_once('/')?;
        if owner.is_empty() || name.is_empty() || name.contains('/') {
            return None;
        }
        Some(Self::new(owner, name))
    }
}

impl fmt::Display for RepoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// A repository returned by the host (fork lookups, fork creation)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoRef {
    pub id: RepoId,
    pub default_branch: Option<String>,
    pub html_url: Option<String>,
}

/// A created issue
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueRef {
    pub number: u64,
    pub html_url: String,
}

/// A created pull request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PullRequestRef {
    pub number: u64,
    pub html_url: String,
}

/// Content of a file already present in a repository
#[derive(Debug, Clone)]
pub struct RemoteFile {
    /// Blob sha, required to update the file
    pub sha: String,
    pub content: Vec<u8>,
}

/// A single-file commit through the contents API
#[derive(Debug, Clone)]
pub struct FileWrite {
    pub path: String,
    pub message: String,
    pub content: Vec<u8>,
    pub branch: String,
    /// Sha of the existing blob; `Some` turns the write into an update
    pub sha: Option<String>,
}

/// Request to open a pull request
#[derive(Debug, Clone, Serialize)]
pub struct PullRequestDraft {
    pub title: String,
    /// Source branch, "login:branch" for cross-repository requests
    pub head: String,
    pub base: String,
    pub body: String,
}

/// A project submitted through the issue-based path
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectSubmission {
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub timestamp: DateTime<Utc>,
    /// Login of the submitting user
    pub user: String,
}

/// A file taken from the selected directory
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolFile {
    pub name: String,
    pub size: u64,
    #[serde(skip)]
    pub content: Vec<u8>,
}

impl ToolFile {
    pub fn new(name: impl Into<String>, content: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            size: content.len() as u64,
            content,
        }
    }

    /// A file known only by its size; its content was never read
    pub fn size_only(name: impl Into<String>, size: u64) -> Self {
        Self {
            name: name.into(),
            size,
            content: Vec::new(),
        }
    }
}

/// A tool submitted through the fork and pull request path
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolSubmission {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub timestamp: DateTime<Utc>,
    pub user: String,
    /// Name of the selected folder
    pub folder: String,
    #[serde(default)]
    pub files: Vec<ToolFile>,
}

//! Fixture parsing
//!
//! A fixture describes the remote state a [`RecordingHost`](crate::RecordingHost)
//! starts from: who is logged in, whether a fork exists, which files are
//! already present and which call should fail.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FixtureError {
    #[error("Failed to read fixture file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse fixture: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostFixture {
    #[serde(default)]
    pub user: FixtureUser,

    /// Default branch of every repository
    #[serde(default = "default_branch")]
    pub default_branch: String,

    /// Commit the default branch points to
    #[serde(default = "default_head")]
    pub head_sha: String,

    /// The user already owns a fork of the target
    #[serde(default)]
    pub fork_exists: bool,

    /// Files visible on every repository and branch
    #[serde(default)]
    pub files: Vec<FixtureFile>,

    #[serde(default)]
    pub failures: Vec<FailureRule>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixtureUser {
    pub id: u64,
    pub login: String,
    #[serde(default)]
    pub name: Option<String>,
    /// Only this token is accepted when set; any non-empty token otherwise
    #[serde(default)]
    pub token: Option<String>,
}

impl Default for FixtureUser {
    fn default() -> Self {
        Self {
            id: 1,
            login: "octocat".to_string(),
            name: Some("The Octocat".to_string()),
            token: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixtureFile {
    pub path: String,
    pub sha: String,
    #[serde(default)]
    pub content: String,
}

/// Make a host method fail with an API error
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailureRule {
    /// RepoHost method name, e.g. "create_fork" or "put_file"
    pub method: String,

    /// Only fail for this file path (contents calls)
    #[serde(default)]
    pub path: Option<String>,

    #[serde(default = "default_status")]
    pub status: u16,

    #[serde(default = "default_message")]
    pub message: String,
}

impl FailureRule {
    pub fn matches(&self, method: &str, path: Option<&str>) -> bool {
        if self.method != method {
            return false;
        }
        match (&self.path, path) {
            (None, _) => true,
            (Some(expected), Some(actual)) => expected == actual,
            (Some(_), None) => false,
        }
    }
}

fn default_branch() -> String {
    "main".to_string()
}

fn default_head() -> String {
    "0000000000000000000000000000000000000001".to_string()
}

fn default_status() -> u16 {
    500
}

fn default_message() -> String {
    "Injected failure".to_string()
}

impl Default for HostFixture {
    fn default() -> Self {
        Self {
            user: FixtureUser::default(),
            default_branch: default_branch(),
            head_sha: default_head(),
            fork_exists: false,
            files: Vec::new(),
            failures: Vec::new(),
        }
    }
}

impl HostFixture {
    /// Load a fixture from a TOML file
    pub fn load(path: &Path) -> Result<Self, FixtureError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self, FixtureError> {
        Ok(toml::from_str(content)?)
    }

    pub fn with_fork(mut self) -> Self {
        self.fork_exists = true;
        self
    }

    pub fn with_file(mut self, path: &str, sha: &str, content: &str) -> Self {
        self.files.push(FixtureFile {
            path: path.to_string(),
            sha: sha.to_string(),
            content: content.to_string(),
        });
        self
    }

    pub fn failing(mut self, method: &str, path: Option<&str>) -> Self {
        self.failures.push(FailureRule {
            method: method.to_string(),
            path: path.map(str::to_string),
            status: default_status(),
            message: default_message(),
        });
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_full_fixture() {
        let fixture = HostFixture::parse(
            r#"
default_branch = "trunk"
fork_exists = true

[user]
id = 7
login = "hubot"
token = "gho_mock"

[[files]]
path = "data/projects.json"
sha = "s1"
content = "[]"

[[failures]]
method = "put_file"
path = "tools/x/a.txt"
status = 422
"#,
        )
        .unwrap();

        assert_eq!(fixture.default_branch, "trunk");
        assert!(fixture.fork_exists);
        assert_eq!(fixture.user.login, "hubot");
        assert_eq!(fixture.user.token.as_deref(), Some("gho_mock"));
        assert_eq!(fixture.files[0].path, "data/projects.json");
        assert_eq!(fixture.failures[0].status, 422);
        assert_eq!(fixture.failures[0].message, "Injected failure");
    }

    #[test]
    fn empty_fixture_uses_defaults() {
        let fixture = HostFixture::parse("").unwrap();
        assert_eq!(fixture.user.login, "octocat");
        assert_eq!(fixture.default_branch, "main");
        assert!(!fixture.fork_exists);
    }

    #[test]
    fn failure_rule_path_matching() {
        let rule = FailureRule {
            method: "put_file".into(),
            path: Some("a".into()),
            status: 500,
            message: "x".into(),
        };
        assert!(rule.matches("put_file", Some("a")));
        assert!(!rule.matches("put_file", Some("b")));
        assert!(!rule.matches("put_file", None));
        assert!(!rule.matches("get_file", Some("a")));
    }
}

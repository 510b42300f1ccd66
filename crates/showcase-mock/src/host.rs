//! Recording host implementing the RepoHost trait
//!
//! Keeps repository state in memory, seeded from a [`HostFixture`], and logs
//! every call so tests can assert on order and arguments.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use showcase_core::{
    Credential, FileWrite, HostError, HostResult, Identity, IdentityProvider, IssueRef,
    PullRequestDraft, PullRequestRef, RemoteFile, RepoHost, RepoId, RepoRef, Result,
    ShowcaseError, TokenExchange,
};
use std::collections::BTreeMap;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::Mutex;

use crate::fixture::HostFixture;

/// A single call log entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallLogEntry {
    pub timestamp: DateTime<Utc>,

    /// RepoHost method name
    pub method: String,

    #[serde(default)]
    pub args: BTreeMap<String, serde_json::Value>,

    /// Error message (if call failed)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CallLogEntry {
    pub fn arg(&self, name: &str) -> Option<&str> {
        self.args.get(name).and_then(|v| v.as_str())
    }
}

#[derive(Default)]
struct HostState {
    calls: Vec<CallLogEntry>,
    fork_exists: bool,
    files: BTreeMap<String, RemoteFile>,
    branches: BTreeMap<String, String>,
    writes: Vec<FileWrite>,
    issues: Vec<(String, String)>,
    pull_requests: Vec<PullRequestDraft>,
    next_sha: u64,
}

pub struct RecordingHost {
    fixture: HostFixture,
    state: Mutex<HostState>,
    log_writer: Mutex<Option<BufWriter<File>>>,
}

impl RecordingHost {
    pub fn new(fixture: HostFixture) -> Self {
        let files = fixture
            .files
            .iter()
            .map(|f| {
                (
                    f.path.clone(),
                    RemoteFile {
                        sha: f.sha.clone(),
                        content: f.content.clone().into_bytes(),
                    },
                )
            })
            .collect();

        let state = HostState {
            fork_exists: fixture.fork_exists,
            files,
            ..HostState::default()
        };

        Self {
            fixture,
            state: Mutex::new(state),
            log_writer: Mutex::new(None),
        }
    }

    /// Also append every call to a JSON lines file
    pub fn with_call_log(self, path: &Path) -> Self {
        let writer = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .ok()
            .map(BufWriter::new);
        if let Ok(mut slot) = self.log_writer.lock() {
            *slot = writer;
        }
        self
    }

    pub fn identity(&self) -> Identity {
        Identity {
            id: self.fixture.user.id,
            login: self.fixture.user.login.clone(),
            name: self.fixture.user.name.clone(),
            avatar_url: format!(
                "https://avatars.githubusercontent.com/u/{}",
                self.fixture.user.id
            ),
        }
    }

    /// Token the fixture accepts, handed out by [`StaticExchange`] in mock mode
    pub fn accepted_token(&self) -> String {
        self.fixture
            .user
            .token
            .clone()
            .unwrap_or_else(|| "gho_mock".to_string())
    }

    pub fn calls(&self) -> Vec<CallLogEntry> {
        self.state.lock().unwrap().calls.clone()
    }

    /// Method names in call order
    pub fn methods(&self) -> Vec<String> {
        self.state
            .lock()
            .unwrap()
            .calls
            .iter()
            .map(|c| c.method.clone())
            .collect()
    }

    pub fn call_count(&self) -> usize {
        self.state.lock().unwrap().calls.len()
    }

    /// Successful file writes in commit order
    pub fn writes(&self) -> Vec<FileWrite> {
        self.state.lock().unwrap().writes.clone()
    }

    /// Created issues as (title, body)
    pub fn issues(&self) -> Vec<(String, String)> {
        self.state.lock().unwrap().issues.clone()
    }

    pub fn pull_requests(&self) -> Vec<PullRequestDraft> {
        self.state.lock().unwrap().pull_requests.clone()
    }

    /// Read a call log written by [`with_call_log`](Self::with_call_log)
    pub fn read_call_log(path: &Path) -> Vec<CallLogEntry> {
        let content = std::fs::read_to_string(path).unwrap_or_default();
        content
            .lines()
            .filter_map(|line| serde_json::from_str(line).ok())
            .collect()
    }

    fn fork_of(&self, upstream: &RepoId) -> RepoRef {
        let id = RepoId::new(self.fixture.user.login.clone(), upstream.name.clone());
        RepoRef {
            html_url: Some(format!("https://github.com/{}", id)),
            default_branch: Some(self.fixture.default_branch.clone()),
            id,
        }
    }

    /// Log the call and apply any matching failure rule
    fn record(
        &self,
        method: &str,
        args: &[(&str, &str)],
        path: Option<&str>,
    ) -> HostResult<std::sync::MutexGuard<'_, HostState>> {
        let failure = self
            .fixture
            .failures
            .iter()
            .find(|rule| rule.matches(method, path));

        let entry = CallLogEntry {
            timestamp: Utc::now(),
            method: method.to_string(),
            args: args
                .iter()
                .map(|(k, v)| (k.to_string(), serde_json::Value::String(v.to_string())))
                .collect(),
            error: failure.map(|rule| rule.message.clone()),
        };
        self.log_call(&entry);

        let mut state = self.state.lock().unwrap();
        state.calls.push(entry);

        if let Some(rule) = failure {
            return Err(HostError::Api {
                status: rule.status,
                message: rule.message.clone(),
            });
        }
        Ok(state)
    }

    fn log_call(&self, entry: &CallLogEntry) {
        if let Ok(mut writer) = self.log_writer.lock() {
            if let Some(w) = writer.as_mut() {
                if let Ok(json) = serde_json::to_string(entry) {
                    let _ = writeln!(w, "{}", json);
                    let _ = w.flush();
                }
            }
        }
    }
}

impl RepoHost for RecordingHost {
    fn create_issue(&self, repo: &RepoId, title: &str, body: &str) -> HostResult<IssueRef> {
        let repo_name = repo.to_string();
        let mut state = self.record(
            "create_issue",
            &[("repo", &repo_name), ("title", title)],
            None,
        )?;
        state.issues.push((title.to_string(), body.to_string()));
        let number = state.issues.len() as u64;
        Ok(IssueRef {
            number,
            html_url: format!("https://github.com/{}/issues/{}", repo, number),
        })
    }

    fn find_fork(&self, upstream: &RepoId, login: &str) -> HostResult<Option<RepoRef>> {
        let repo_name = upstream.to_string();
        let state = self.record("find_fork", &[("repo", &repo_name), ("login", login)], None)?;
        let owned = login.eq_ignore_ascii_case(&self.fixture.user.login);
        Ok((state.fork_exists && owned).then(|| self.fork_of(upstream)))
    }

    fn create_fork(&self, upstream: &RepoId) -> HostResult<RepoRef> {
        let repo_name = upstream.to_string();
        let mut state = self.record("create_fork", &[("repo", &repo_name)], None)?;
        state.fork_exists = true;
        Ok(self.fork_of(upstream))
    }

    fn default_branch(&self, repo: &RepoId) -> HostResult<String> {
        let repo_name = repo.to_string();
        self.record("default_branch", &[("repo", &repo_name)], None)?;
        Ok(self.fixture.default_branch.clone())
    }

    fn branch_head(&self, repo: &RepoId, branch: &str) -> HostResult<String> {
        let repo_name = repo.to_string();
        let state = self.record(
            "branch_head",
            &[("repo", &repo_name), ("branch", branch)],
            None,
        )?;
        if branch == self.fixture.default_branch {
            return Ok(self.fixture.head_sha.clone());
        }
        state
            .branches
            .get(branch)
            .cloned()
            .ok_or_else(|| HostError::NotFound(format!("branch {}", branch)))
    }

    fn create_branch(&self, repo: &RepoId, branch: &str, sha: &str) -> HostResult<()> {
        let repo_name = repo.to_string();
        let mut state = self.record(
            "create_branch",
            &[("repo", &repo_name), ("branch", branch), ("sha", sha)],
            None,
        )?;
        if state.branches.contains_key(branch) {
            return Err(HostError::Api {
                status: 422,
                message: "Reference already exists".to_string(),
            });
        }
        state.branches.insert(branch.to_string(), sha.to_string());
        Ok(())
    }

    fn get_file(
        &self,
        repo: &RepoId,
        path: &str,
        git_ref: &str,
    ) -> HostResult<Option<RemoteFile>> {
        let repo_name = repo.to_string();
        let state = self.record(
            "get_file",
            &[("repo", &repo_name), ("path", path), ("ref", git_ref)],
            Some(path),
        )?;
        Ok(state.files.get(path).cloned())
    }

    fn put_file(&self, repo: &RepoId, write: &FileWrite) -> HostResult<()> {
        let repo_name = repo.to_string();
        let sha_arg = write.sha.clone().unwrap_or_default();
        let mut state = self.record(
            "put_file",
            &[
                ("repo", &repo_name),
                ("path", &write.path),
                ("branch", &write.branch),
                ("message", &write.message),
                ("sha", &sha_arg),
            ],
            Some(&write.path),
        )?;

        let current = state.files.get(&write.path).map(|f| f.sha.clone());
        if current != write.sha {
            return Err(HostError::Api {
                status: 409,
                message: format!("{} does not match the current sha", write.path),
            });
        }

        state.next_sha += 1;
        let sha = format!("mock-sha-{}", state.next_sha);
        state.files.insert(
            write.path.clone(),
            RemoteFile {
                sha,
                content: write.content.clone(),
            },
        );
        state.writes.push(write.clone());
        Ok(())
    }

    fn create_pull_request(
        &self,
        repo: &RepoId,
        draft: &PullRequestDraft,
    ) -> HostResult<PullRequestRef> {
        let repo_name = repo.to_string();
        let mut state = self.record(
            "create_pull_request",
            &[
                ("repo", &repo_name),
                ("head", &draft.head),
                ("base", &draft.base),
                ("title", &draft.title),
            ],
            None,
        )?;
        state.pull_requests.push(draft.clone());
        let number = state.pull_requests.len() as u64;
        Ok(PullRequestRef {
            number,
            html_url: format!("https://github.com/{}/pull/{}", repo, number),
        })
    }
}

impl IdentityProvider for RecordingHost {
    fn fetch_identity(&self, credential: &Credential) -> HostResult<Identity> {
        self.record("fetch_identity", &[], None)?;
        let accepted = match self.fixture.user.token.as_deref() {
            Some(token) => credential.expose() == token,
            None => !credential.is_empty(),
        };
        if accepted {
            Ok(self.identity())
        } else {
            Err(HostError::Unauthorized)
        }
    }
}

/// Exchange that hands out a fixed token for any code
pub struct StaticExchange {
    token: Option<String>,
}

impl StaticExchange {
    pub fn new(token: &str) -> Self {
        Self {
            token: Some(token.to_string()),
        }
    }

    /// Exchange whose workflow never publishes a token
    pub fn exhausted() -> Self {
        Self { token: None }
    }
}

impl TokenExchange for StaticExchange {
    fn exchange(&self, _code: &str, _callback_id: &str) -> Result<Credential> {
        self.token
            .clone()
            .map(Credential::new)
            .ok_or(ShowcaseError::TokenPollExhausted { attempts: 10 })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upstream() -> RepoId {
        RepoId::new("julieisbaka", "github-authentication-sample")
    }

    #[test]
    fn fork_is_found_only_after_creation() {
        let host = RecordingHost::new(HostFixture::default());

        assert!(host.find_fork(&upstream(), "octocat").unwrap().is_none());
        let fork = host.create_fork(&upstream()).unwrap();
        assert_eq!(fork.id.to_string(), "octocat/github-authentication-sample");
        assert!(host.find_fork(&upstream(), "OctoCat").unwrap().is_some());
        assert_eq!(host.methods(), vec!["find_fork", "create_fork", "find_fork"]);
    }

    #[test]
    fn put_requires_current_sha() {
        let host = RecordingHost::new(HostFixture::default().with_file("a.txt", "s1", "old"));
        let mut write = FileWrite {
            path: "a.txt".into(),
            message: "Update a".into(),
            content: b"new".to_vec(),
            branch: "b".into(),
            sha: None,
        };

        let err = host.put_file(&upstream(), &write).unwrap_err();
        assert!(matches!(err, HostError::Api { status: 409, .. }));

        write.sha = Some("s1".into());
        host.put_file(&upstream(), &write).unwrap();
        let stored = host.get_file(&upstream(), "a.txt", "b").unwrap().unwrap();
        assert_eq!(stored.content, b"new");
        assert_ne!(stored.sha, "s1");
    }

    #[test]
    fn failure_rule_is_logged() {
        let host = RecordingHost::new(HostFixture::default().failing("create_fork", None));
        let err = host.create_fork(&upstream()).unwrap_err();
        assert!(matches!(err, HostError::Api { status: 500, .. }));

        let calls = host.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].error.as_deref(), Some("Injected failure"));
    }

    #[test]
    fn identity_requires_fixture_token() {
        let mut fixture = HostFixture::default();
        fixture.user.token = Some("gho_ok".into());
        let host = RecordingHost::new(fixture);

        assert!(host.fetch_identity(&Credential::new("gho_ok")).is_ok());
        assert!(matches!(
            host.fetch_identity(&Credential::new("gho_bad")),
            Err(HostError::Unauthorized)
        ));
    }

    #[test]
    fn call_log_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join("call_log.jsonl");
        let host = RecordingHost::new(HostFixture::default()).with_call_log(&log);

        host.default_branch(&upstream()).unwrap();
        let entries = RecordingHost::read_call_log(&log);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].method, "default_branch");
        assert_eq!(
            entries[0].arg("repo"),
            Some("julieisbaka/github-authentication-sample")
        );
    }
}

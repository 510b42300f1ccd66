use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use showcase_core::RepoId;
use std::collections::BTreeMap;
use std::time::Duration;
use ureq::{Agent, RequestBuilder};

use crate::error::{GitHubError, Result};
use crate::models::*;

pub const GITHUB_API_URL: &str = "https://api.github.com";

/// GitHub REST API client
///
/// Calls are authorized with the client's token when it has one. The OAuth
/// exchange runs before any token exists, so an anonymous client is valid.
pub struct GitHubClient {
    agent: Agent,
    base_url: String,
    token: Option<String>,
}

impl GitHubClient {
    /// Create a new GitHub client targeting api.github.com
    pub fn new(token: &str) -> Self {
        Self::with_base_url(GITHUB_API_URL, Some(token))
    }

    /// Create a new GitHub client with a custom base URL (for GitHub Enterprise or testing)
    pub fn with_base_url(base_url: &str, token: Option<&str>) -> Self {
        let agent = Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(30)))
            .http_status_as_error(false)
            .build()
            .into();

        Self {
            agent,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.map(str::to_string),
        }
    }

    /// Client without credentials
    pub fn anonymous(base_url: &str) -> Self {
        Self::with_base_url(base_url, None)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build a repo-scoped URL
    fn repo_url(&self, repo: &RepoId, path: &str) -> String {
        format!(
            "{}/repos/{}/{}{}",
            self.base_url,
            urlencoding::encode(&repo.owner),
            urlencoding::encode(&repo.name),
            path
        )
    }

    /// Standard headers plus the Authorization header for `token`
    fn authorize<B>(&self, request: RequestBuilder<B>, token: Option<&str>) -> RequestBuilder<B> {
        let request = request
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", "2022-11-28");

        match token {
            Some(token) => request.header("Authorization", &format!("Bearer {}", token)),
            None => request,
        }
    }

    fn with_token<B>(&self, request: RequestBuilder<B>) -> RequestBuilder<B> {
        self.authorize(request, self.token.as_deref())
    }

    /// Check response status and return error if not successful
    fn check_response(
        &self,
        mut response: ureq::http::Response<ureq::Body>,
    ) -> Result<ureq::http::Response<ureq::Body>> {
        let status = response.status().as_u16();

        if (200..300).contains(&status) {
            return Ok(response);
        }

        // Detect rate limiting: 403 with x-ratelimit-remaining: 0
        if status == 403 {
            if let Some(remaining) = response.headers().get("x-ratelimit-remaining") {
                if remaining.to_str().unwrap_or("") == "0" {
                    return Err(GitHubError::RateLimited);
                }
            }
        }

        let body = response
            .body_mut()
            .read_to_string()
            .unwrap_or_else(|_| String::new());

        let message = if let Ok(error_response) = serde_json::from_str::<serde_json::Value>(&body) {
            error_response
                .get("message")
                .and_then(|m| m.as_str())
                .unwrap_or(&body)
                .to_string()
        } else if body.is_empty() {
            format!("HTTP {}", status)
        } else {
            body
        };

        match status {
            401 => Err(GitHubError::Unauthorized),
            404 => Err(GitHubError::NotFound(message)),
            _ => Err(GitHubError::Api { status, message }),
        }
    }

    // ==================== User Operations ====================

    /// Get the user a token belongs to
    pub fn get_user(&self, token: Option<&str>) -> Result<GitHubUser> {
        let url = format!("{}/user", self.base_url);

        let response = self
            .authorize(self.agent.get(&url), token)
            .call()
            .map_err(GitHubError::Http)?;

        let mut response = self.check_response(response)?;
        let user: GitHubUser = response.body_mut().read_json()?;
        Ok(user)
    }

    // ==================== Issue Operations ====================

    /// Create a new issue
    pub fn create_issue(&self, repo: &RepoId, issue: &CreateGitHubIssue) -> Result<GitHubIssue> {
        let url = self.repo_url(repo, "/issues");

        let response = self
            .with_token(self.agent.post(&url))
            .header("Content-Type", "application/json")
            .send_json(issue)
            .map_err(GitHubError::Http)?;

        let mut response = self.check_response(response)?;
        let created: GitHubIssue = response.body_mut().read_json()?;
        Ok(created)
    }

    // ==================== Repository Operations ====================

    /// Get a specific repository
    pub fn get_repo(&self, repo: &RepoId) -> Result<GitHubRepo> {
        let url = self.repo_url(repo, "");

        let response = self
            .with_token(self.agent.get(&url))
            .call()
            .map_err(GitHubError::Http)?;

        let mut response = self.check_response(response)?;
        let repo: GitHubRepo = response.body_mut().read_json()?;
        Ok(repo)
    }

    /// List one page of a repository's forks, newest first
    pub fn list_forks(
        &self,
        repo: &RepoId,
        per_page: usize,
        page: usize,
    ) -> Result<Vec<GitHubRepo>> {
        let url = format!(
            "{}?sort=newest&per_page={}&page={}",
            self.repo_url(repo, "/forks"),
            per_page,
            page
        );

        let response = self
            .with_token(self.agent.get(&url))
            .call()
            .map_err(GitHubError::Http)?;

        let mut response = self.check_response(response)?;
        let forks: Vec<GitHubRepo> = response.body_mut().read_json()?;
        Ok(forks)
    }

    /// Request a fork into the authenticated account
    ///
    /// GitHub answers 202 and finishes the copy asynchronously.
    pub fn create_fork(&self, repo: &RepoId) -> Result<GitHubRepo> {
        let url = self.repo_url(repo, "/forks");

        let response = self
            .with_token(self.agent.post(&url))
            .header("Content-Type", "application/json")
            .send_json(serde_json::json!({}))
            .map_err(GitHubError::Http)?;

        let mut response = self.check_response(response)?;
        let fork: GitHubRepo = response.body_mut().read_json()?;
        Ok(fork)
    }

    // ==================== Git Reference Operations ====================

    /// Get the reference of a branch
    pub fn get_branch_ref(&self, repo: &RepoId, branch: &str) -> Result<GitRef> {
        let url = self.repo_url(repo, &format!("/git/ref/heads/{}", encode_path(branch)));

        let response = self
            .with_token(self.agent.get(&url))
            .call()
            .map_err(GitHubError::Http)?;

        let mut response = self.check_response(response)?;
        let git_ref: GitRef = response.body_mut().read_json()?;
        Ok(git_ref)
    }

    /// Create a branch pointing at `sha`
    pub fn create_branch_ref(&self, repo: &RepoId, branch: &str, sha: &str) -> Result<GitRef> {
        let url = self.repo_url(repo, "/git/refs");

        let body = CreateGitRef {
            name: format!("refs/heads/{}", branch),
            sha: sha.to_string(),
        };

        let response = self
            .with_token(self.agent.post(&url))
            .header("Content-Type", "application/json")
            .send_json(&body)
            .map_err(GitHubError::Http)?;

        let mut response = self.check_response(response)?;
        let created: GitRef = response.body_mut().read_json()?;
        Ok(created)
    }

    // ==================== Contents Operations ====================

    /// Get a file at `git_ref`, `None` when the path does not exist
    pub fn get_content(
        &self,
        repo: &RepoId,
        path: &str,
        git_ref: &str,
    ) -> Result<Option<GitHubContent>> {
        let url = format!(
            "{}?ref={}",
            self.repo_url(repo, &format!("/contents/{}", encode_path(path))),
            urlencoding::encode(git_ref)
        );

        let response = self
            .with_token(self.agent.get(&url))
            .call()
            .map_err(GitHubError::Http)?;

        if response.status().as_u16() == 404 {
            return Ok(None);
        }

        let mut response = self.check_response(response)?;
        let content: GitHubContent = response.body_mut().read_json()?;
        Ok(Some(content))
    }

    /// Create or update one file as a single commit
    pub fn put_content(&self, repo: &RepoId, path: &str, body: &PutGitHubContent) -> Result<()> {
        let url = self.repo_url(repo, &format!("/contents/{}", encode_path(path)));

        let response = self
            .with_token(self.agent.put(&url))
            .header("Content-Type", "application/json")
            .send_json(body)
            .map_err(GitHubError::Http)?;

        self.check_response(response)?;
        Ok(())
    }

    // ==================== Pull Request Operations ====================

    /// Open a pull request
    pub fn create_pull_request(
        &self,
        repo: &RepoId,
        pull: &CreateGitHubPullRequest,
    ) -> Result<GitHubPullRequest> {
        let url = self.repo_url(repo, "/pulls");

        let response = self
            .with_token(self.agent.post(&url))
            .header("Content-Type", "application/json")
            .send_json(pull)
            .map_err(GitHubError::Http)?;

        let mut response = self.check_response(response)?;
        let created: GitHubPullRequest = response.body_mut().read_json()?;
        Ok(created)
    }

    // ==================== Actions & Gists ====================

    /// Trigger a `workflow_dispatch` run
    pub fn dispatch_workflow(
        &self,
        repo: &RepoId,
        workflow_file: &str,
        git_ref: &str,
        inputs: BTreeMap<String, String>,
    ) -> Result<()> {
        let url = self.repo_url(
            repo,
            &format!(
                "/actions/workflows/{}/dispatches",
                urlencoding::encode(workflow_file)
            ),
        );

        let body = WorkflowDispatch {
            git_ref: git_ref.to_string(),
            inputs,
        };

        let response = self
            .with_token(self.agent.post(&url))
            .header("Content-Type", "application/json")
            .send_json(&body)
            .map_err(GitHubError::Http)?;

        self.check_response(response)?;
        Ok(())
    }

    /// List public gists visible to the client
    pub fn list_gists(&self, per_page: usize) -> Result<Vec<GitHubGist>> {
        let url = format!("{}/gists?per_page={}", self.base_url, per_page);

        let response = self
            .with_token(self.agent.get(&url))
            .call()
            .map_err(GitHubError::Http)?;

        let mut response = self.check_response(response)?;
        let gists: Vec<GitHubGist> = response.body_mut().read_json()?;
        Ok(gists)
    }

    /// Fetch and decode a raw JSON document from an absolute URL
    pub fn fetch_raw_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T> {
        let response = self.agent.get(url).call().map_err(GitHubError::Http)?;

        let mut response = self.check_response(response)?;
        let value: T = response.body_mut().read_json()?;
        Ok(value)
    }

    /// Delete a gist
    pub fn delete_gist(&self, id: &str) -> Result<()> {
        let url = format!("{}/gists/{}", self.base_url, urlencoding::encode(id));

        let response = self
            .with_token(self.agent.delete(&url))
            .call()
            .map_err(GitHubError::Http)?;

        self.check_response(response)?;
        Ok(())
    }
}

/// Percent-encode each segment of a slash-separated path
pub(crate) fn encode_path(path: &str) -> String {
    path.split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

/// Decode the base64 payload of the contents API, which wraps lines
pub(crate) fn decode_content(content: &GitHubContent) -> Result<Vec<u8>> {
    let Some(raw) = content.content.as_deref() else {
        return Ok(Vec::new());
    };

    match content.encoding.as_deref() {
        Some("base64") | None => {
            let compact: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
            STANDARD
                .decode(compact)
                .map_err(|e| GitHubError::Decode(format!("{}: {}", content.path, e)))
        }
        Some(other) => Err(GitHubError::Decode(format!(
            "{}: unsupported encoding '{}'",
            content.path, other
        ))),
    }
}

/// Base64 payload for the contents API
pub(crate) fn encode_content(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

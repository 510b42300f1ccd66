//! Authorization-code exchange strategies
//!
//! GitHub only exchanges a code when given the app's client secret, which a
//! public client cannot hold. Two strategies get around that:
//!
//! * [`WorkflowGistExchange`] triggers a repository workflow that performs
//!   the exchange and publishes the token in a gist, then polls for it.
//! * [`BackendExchange`] posts the code to a confidential backend that
//!   answers with the token synchronously.

use serde::Deserialize;
use showcase_core::{
    poll_until, Credential, PollPolicy, RepoId, Result, ShowcaseError, TokenExchange,
};
use std::collections::BTreeMap;
use std::time::Duration;
use ureq::Agent;

use crate::client::GitHubClient;
use crate::models::TokenDocument;

pub const DEFAULT_WORKFLOW_FILE: &str = "project-submission.yml";
pub const DEFAULT_WORKFLOW_REF: &str = "main";

/// Exchange through `workflow_dispatch` plus gist polling
pub struct WorkflowGistExchange {
    client: GitHubClient,
    repo: RepoId,
    workflow_file: String,
    workflow_ref: String,
    policy: PollPolicy,
}

impl WorkflowGistExchange {
    pub fn new(api_url: &str, repo: RepoId) -> Self {
        Self {
            client: GitHubClient::anonymous(api_url),
            repo,
            workflow_file: DEFAULT_WORKFLOW_FILE.to_string(),
            workflow_ref: DEFAULT_WORKFLOW_REF.to_string(),
            policy: PollPolicy::default(),
        }
    }

    pub fn with_workflow(mut self, file: &str, git_ref: &str) -> Self {
        self.workflow_file = file.to_string();
        self.workflow_ref = git_ref.to_string();
        self
    }

    pub fn with_policy(mut self, policy: PollPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// One poll attempt: find the callback's gist and read its token
    fn find_token(&self, callback_id: &str) -> crate::Result<Option<(String, String)>> {
        let needle = format!("token-{}.json", callback_id);
        let gists = self.client.list_gists(100)?;

        let Some((gist_id, file)) = gists
            .iter()
            .find_map(|gist| gist.file_containing(&needle).map(|f| (&gist.id, f)))
        else {
            return Ok(None);
        };

        let document: TokenDocument = self.client.fetch_raw_json(&file.raw_url)?;
        Ok(Some((gist_id.clone(), document.token)))
    }

    /// The gist holds a live token; remove it once read
    fn discard_gist(&self, gist_id: &str, token: &str) {
        let owner_client = GitHubClient::with_base_url(self.client.base_url(), Some(token));
        if let Err(e) = owner_client.delete_gist(gist_id) {
            tracing::warn!(gist = gist_id, error = %e, "could not delete token gist");
        }
    }
}

impl TokenExchange for WorkflowGistExchange {
    fn exchange(&self, code: &str, callback_id: &str) -> Result<Credential> {
        let inputs = BTreeMap::from([
            ("action".to_string(), "handle_oauth".to_string()),
            ("code".to_string(), code.to_string()),
            ("callback_id".to_string(), callback_id.to_string()),
        ]);

        self.client
            .dispatch_workflow(&self.repo, &self.workflow_file, &self.workflow_ref, inputs)
            .map_err(|e| {
                ShowcaseError::Authentication(format!(
                    "could not trigger the token exchange workflow: {}",
                    e
                ))
            })?;
        tracing::info!(callback_id, workflow = %self.workflow_file, "token exchange workflow triggered");

        let found = poll_until(&self.policy, |_| self.find_token(callback_id));
        let Some((gist_id, token)) = found else {
            return Err(ShowcaseError::TokenPollExhausted {
                attempts: self.policy.attempts,
            });
        };

        self.discard_gist(&gist_id, &token);
        Ok(Credential::new(token))
    }
}

#[derive(Debug, Deserialize)]
struct BackendTokenResponse {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    token: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Exchange through a confidential backend holding the client secret
pub struct BackendExchange {
    agent: Agent,
    url: String,
}

impl BackendExchange {
    pub fn new(url: &str) -> Self {
        let agent = Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(30)))
            .http_status_as_error(false)
            .build()
            .into();

        Self {
            agent,
            url: url.to_string(),
        }
    }
}

impl TokenExchange for BackendExchange {
    fn exchange(&self, code: &str, callback_id: &str) -> Result<Credential> {
        let fail = |message: String| ShowcaseError::Authentication(message);

        let mut response = self
            .agent
            .post(&self.url)
            .header("Accept", "application/json")
            .header("Content-Type", "application/json")
            .send_json(serde_json::json!({ "code": code, "state": callback_id }))
            .map_err(|e| fail(format!("token exchange request failed: {}", e)))?;

        let status = response.status().as_u16();
        let body: BackendTokenResponse = response
            .body_mut()
            .read_json()
            .map_err(|e| fail(format!("invalid token exchange response: {}", e)))?;

        if !(200..300).contains(&status) || body.error.is_some() {
            return Err(fail(format!(
                "token exchange rejected ({}): {}",
                status,
                body.error.as_deref().unwrap_or("no details")
            )));
        }

        body.access_token
            .or(body.token)
            .filter(|t| !t.is_empty())
            .map(Credential::new)
            .ok_or_else(|| fail("token exchange response had no token".to_string()))
    }
}

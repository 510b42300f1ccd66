use serde::{Deserialize, Serialize};

/// GitHub pull request
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GitHubPullRequest {
    pub id: u64,
    pub number: u64,
    pub html_url: String,
    #[serde(default)]
    pub state: String,
}

/// Request body for opening a pull request
#[derive(Debug, Clone, Serialize)]
pub struct CreateGitHubPullRequest {
    pub title: String,
    pub head: String,
    pub base: String,
    pub body: String,
}

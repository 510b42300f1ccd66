use serde::{Deserialize, Serialize};

/// GitHub issue (fields the submission flow reads back)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GitHubIssue {
    pub id: u64,
    pub number: u64,
    pub title: String,
    pub html_url: String,
    #[serde(default)]
    pub state: String,
}

/// Request body for creating a GitHub issue
#[derive(Debug, Clone, Serialize)]
pub struct CreateGitHubIssue {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<Vec<String>>,
}

use serde::{Deserialize, Serialize};

/// File entry from the contents API
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GitHubContent {
    pub sha: String,
    pub path: String,
    /// Base64 with embedded newlines when `encoding` is "base64"
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub encoding: Option<String>,
}

/// Request body for `PUT /repos/{owner}/{repo}/contents/{path}`
#[derive(Debug, Clone, Serialize)]
pub struct PutGitHubContent {
    pub message: String,
    /// Base64-encoded file content
    pub content: String,
    pub branch: String,
    /// Required when replacing an existing file
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha: Option<String>,
}

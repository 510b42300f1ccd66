use serde::{Deserialize, Serialize};

/// Object a git reference points to
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GitObject {
    pub sha: String,
    #[serde(rename = "type", default)]
    pub kind: String,
}

/// Git reference (`GET /repos/{owner}/{repo}/git/ref/heads/{branch}`)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GitRef {
    #[serde(rename = "ref")]
    pub name: String,
    pub object: GitObject,
}

/// Request body for creating a reference
#[derive(Debug, Clone, Serialize)]
pub struct CreateGitRef {
    /// Fully qualified, e.g. `refs/heads/tool/x-20240101`
    #[serde(rename = "ref")]
    pub name: String,
    pub sha: String,
}

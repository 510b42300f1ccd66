use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// File inside a gist
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GistFile {
    pub filename: String,
    pub raw_url: String,
}

/// Gist as listed by `GET /gists`
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GitHubGist {
    pub id: String,
    #[serde(default)]
    pub files: BTreeMap<String, GistFile>,
}

impl GitHubGist {
    /// First file whose name contains `needle`
    pub fn file_containing(&self, needle: &str) -> Option<&GistFile> {
        self.files
            .iter()
            .find(|(name, _)| name.contains(needle))
            .map(|(_, file)| file)
    }
}

/// Token document written by the exchange workflow
#[derive(Debug, Clone, Deserialize)]
pub struct TokenDocument {
    pub token: String,
}

/// Request body for `POST .../actions/workflows/{file}/dispatches`
#[derive(Debug, Clone, Serialize)]
pub struct WorkflowDispatch {
    #[serde(rename = "ref")]
    pub git_ref: String,
    pub inputs: BTreeMap<String, String>,
}

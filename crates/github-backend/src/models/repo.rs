use serde::{Deserialize, Serialize};

use super::user::GitHubUser;

/// GitHub repository
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GitHubRepo {
    pub id: u64,
    pub name: String,
    pub full_name: String,
    pub owner: GitHubUser,
    #[serde(default)]
    pub default_branch: Option<String>,
    #[serde(default)]
    pub html_url: Option<String>,
    /// True when this repository is itself a fork
    #[serde(default)]
    pub fork: bool,
}

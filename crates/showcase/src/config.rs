use anyhow::{anyhow, Result};
use directories::{BaseDirs, ProjectDirs};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use github_backend::GITHUB_API_URL;
use serde::{Deserialize, Serialize};
use showcase_core::session::GITHUB_AUTHORIZE_URL;
use showcase_core::{OAuthApp, PollPolicy, RepoId, WorkflowOptions};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable overriding where the session store lives
pub const DATA_DIR_ENV: &str = "SHOWCASE_DATA_DIR";

/// How an authorization code becomes a token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExchangeKind {
    /// Dispatch the repository workflow and poll gists for the token
    Workflow,
    /// POST the code to `backend_url`
    Backend,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// OAuth app client id
    pub client_id: String,
    /// Where GitHub sends the user back after authorizing
    pub redirect_uri: String,
    pub authorize_url: String,
    pub api_url: String,
    /// Owner of the showcase repository
    pub owner: String,
    /// Name of the showcase repository
    pub repo: String,
    pub exchange: ExchangeKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backend_url: Option<String>,
    pub workflow_file: String,
    pub workflow_ref: String,
    pub poll_attempts: u32,
    pub poll_interval_secs: u64,
    pub fork_settle_secs: u64,
    pub max_file_bytes: u64,
    /// Re-check the stored token with GitHub before using it
    pub revalidate: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            client_id: "Ov23liYJv9yGDtXz1DDK".to_string(),
            redirect_uri: "https://julieisbaka.github.io/github-authentication-sample/"
                .to_string(),
            authorize_url: GITHUB_AUTHORIZE_URL.to_string(),
            api_url: GITHUB_API_URL.to_string(),
            owner: "julieisbaka".to_string(),
            repo: "github-authentication-sample".to_string(),
            exchange: ExchangeKind::Workflow,
            backend_url: None,
            workflow_file: github_backend::oauth::DEFAULT_WORKFLOW_FILE.to_string(),
            workflow_ref: github_backend::oauth::DEFAULT_WORKFLOW_REF.to_string(),
            poll_attempts: 10,
            poll_interval_secs: 3,
            fork_settle_secs: 5,
            max_file_bytes: showcase_core::submit::DEFAULT_MAX_FILE_BYTES,
            revalidate: true,
        }
    }
}

impl Config {
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));

        if let Some(path) = config_path {
            if !path.exists() {
                return Err(anyhow!("Config file not found: {}", path.display()));
            }
        }

        for path in config_paths(config_path) {
            if path.exists() {
                figment = figment.merge(Toml::file(path));
            }
        }

        // Other SHOWCASE_* variables configure the process, not this struct
        figment = figment.merge(Env::prefixed("SHOWCASE_").ignore(&[
            "config",
            "log",
            "data_dir",
            "mock_dir",
            "color_scheme",
        ]));

        let config: Config = figment
            .extract()
            .map_err(|e| anyhow!("Failed to load config: {}", e))?;
        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.client_id.trim().is_empty() {
            return Err(anyhow!(
                "client_id is empty. Set it in the config file or via SHOWCASE_CLIENT_ID"
            ));
        }
        if self.owner.trim().is_empty() || self.repo.trim().is_empty() {
            return Err(anyhow!("owner and repo must name the showcase repository"));
        }
        if self.exchange == ExchangeKind::Backend && self.backend_url.is_none() {
            return Err(anyhow!(
                "exchange = \"backend\" requires backend_url. Set it in the config file or via SHOWCASE_BACKEND_URL"
            ));
        }
        if self.poll_attempts == 0 {
            return Err(anyhow!("poll_attempts must be at least 1"));
        }
        Ok(())
    }

    pub fn target(&self) -> RepoId {
        RepoId::new(self.owner.clone(), self.repo.clone())
    }

    pub fn oauth_app(&self) -> OAuthApp {
        OAuthApp {
            client_id: self.client_id.clone(),
            redirect_uri: self.redirect_uri.clone(),
            authorize_url: self.authorize_url.clone(),
        }
    }

    pub fn poll_policy(&self) -> PollPolicy {
        PollPolicy {
            attempts: self.poll_attempts,
            interval: Duration::from_secs(self.poll_interval_secs),
        }
    }

    pub fn workflow_options(&self) -> WorkflowOptions {
        WorkflowOptions {
            fork_settle_delay: Duration::from_secs(self.fork_settle_secs),
            max_file_bytes: self.max_file_bytes,
        }
    }
}

/// Config files in merge order; an explicit path replaces the search
pub fn config_paths(explicit: Option<&Path>) -> Vec<PathBuf> {
    let mut paths = Vec::new();

    if let Some(path) = explicit {
        paths.push(path.to_path_buf());
        return paths;
    }

    if let Some(path) = get_project_config_path() {
        push_unique(&mut paths, path);
    }
    if let Some(path) = get_xdg_config_path() {
        push_unique(&mut paths, path);
    }
    if let Some(path) = get_local_config_path() {
        push_unique(&mut paths, path);
    }

    paths
}

/// Directory holding `store.json`
pub fn data_dir() -> Result<PathBuf> {
    if let Some(dir) = std::env::var_os(DATA_DIR_ENV) {
        return Ok(PathBuf::from(dir));
    }

    ProjectDirs::from("", "", "showcase")
        .map(|d| d.data_dir().to_path_buf())
        .ok_or_else(|| anyhow!("Could not determine a data directory; set {}", DATA_DIR_ENV))
}

pub fn store_path() -> Result<PathBuf> {
    Ok(data_dir()?.join("store.json"))
}

fn push_unique(paths: &mut Vec<PathBuf>, path: PathBuf) {
    if !paths.contains(&path) {
        paths.push(path);
    }
}

fn get_project_config_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "showcase").map(|d| d.config_dir().join("config.toml"))
}

fn get_xdg_config_path() -> Option<PathBuf> {
    if let Some(dir) = std::env::var_os("XDG_CONFIG_HOME") {
        return Some(PathBuf::from(dir).join("showcase").join("config.toml"));
    }

    BaseDirs::new().map(|dirs| {
        dirs.home_dir()
            .join(".config")
            .join("showcase")
            .join("config.toml")
    })
}

fn get_local_config_path() -> Option<PathBuf> {
    std::env::current_dir()
        .ok()
        .map(|dir| dir.join("showcase.toml"))
}

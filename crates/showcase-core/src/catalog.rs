//! Projects already accepted into the showcase

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::RepoId;
use crate::traits::RepoHost;

pub const CATALOG_PATH: &str = "data/projects.json";
pub const CATALOG_REF: &str = "main";

/// One published project.
///
/// Entries curated by hand carry only the display fields, so the submitter
/// and submission time are optional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
}

/// Read the catalog from the target repository.
///
/// A missing file, a failed request or content that is not a JSON array all
/// read as an empty catalog. Entries that do not parse are skipped one by one.
pub fn load_catalog(host: &dyn RepoHost, repo: &RepoId) -> Vec<CatalogEntry> {
    let file = match host.get_file(repo, CATALOG_PATH, CATALOG_REF) {
        Ok(Some(file)) => file,
        Ok(None) => {
            tracing::info!(path = CATALOG_PATH, "no project catalog yet");
            return Vec::new();
        }
        Err(e) => {
            tracing::warn!(error = %e, "could not fetch project catalog");
            return Vec::new();
        }
    };

    let raw: Vec<serde_json::Value> = match serde_json::from_slice(&file.content) {
        Ok(raw) => raw,
        Err(e) => {
            tracing::warn!(error = %e, "project catalog is not a JSON array");
            return Vec::new();
        }
    };

    raw.into_iter()
        .enumerate()
        .filter_map(|(index, value)| match serde_json::from_value(value) {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::warn!(index, error = %e, "skipping malformed catalog entry");
                None
            }
        })
        .collect()
}

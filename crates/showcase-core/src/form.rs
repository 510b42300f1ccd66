//! Form input and the names derived from it

use chrono::{DateTime, Utc};

use crate::error::{Result, ShowcaseError};
use crate::models::{ProjectSubmission, ToolFile, ToolSubmission};

/// Raw fields of the project form
#[derive(Debug, Clone, Default)]
pub struct ProjectForm {
    pub name: String,
    pub url: String,
    pub description: String,
    /// Comma-separated
    pub tags: String,
}

impl ProjectForm {
    pub fn into_submission(self, user: &str, now: DateTime<Utc>) -> Result<ProjectSubmission> {
        let name = required("name", &self.name)?;
        let url = required("url", &self.url)?;

        Ok(ProjectSubmission {
            name,
            url,
            description: self.description.trim().to_string(),
            tags: parse_tags(&self.tags),
            timestamp: now,
            user: user.to_string(),
        })
    }
}

/// Raw fields of the tool form plus the enumerated directory
#[derive(Debug, Clone, Default)]
pub struct ToolForm {
    pub name: String,
    pub description: String,
    pub tags: String,
    pub folder: String,
    pub files: Vec<ToolFile>,
}

impl ToolForm {
    pub fn into_submission(self, user: &str, now: DateTime<Utc>) -> Result<ToolSubmission> {
        let name = required("name", &self.name)?;

        Ok(ToolSubmission {
            name,
            description: self.description.trim().to_string(),
            tags: parse_tags(&self.tags),
            timestamp: now,
            user: user.to_string(),
            folder: self.folder.trim().to_string(),
            files: self.files,
        })
    }
}

fn required(field: &str, value: &str) -> Result<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ShowcaseError::InvalidInput(format!("'{}' is required", field)));
    }
    Ok(value.to_string())
}

/// Split a comma-separated tag list. Blank entries and repeats are dropped,
/// first occurrence order is kept.
pub fn parse_tags(raw: &str) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();
    for tag in raw.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        if !tags.iter().any(|t| t == tag) {
            tags.push(tag.to_string());
        }
    }
    tags
}

/// Lowercase ASCII alphanumerics joined by single dashes
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;

    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }

    if slug.is_empty() {
        "submission".to_string()
    } else {
        slug
    }
}

/// Branch for a tool submission. The timestamp suffix keeps repeated
/// submissions of the same name apart.
pub fn branch_name(name: &str, at: DateTime<Utc>) -> String {
    format!("tool/{}-{}", slugify(name), at.format("%Y%m%d%H%M%S%3f"))
}

/// Directory holding everything submitted for a tool
pub fn tool_dir(name: &str) -> String {
    format!("tools/{}", slugify(name))
}

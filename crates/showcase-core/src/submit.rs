//! Remote submission workflows
//!
//! Projects become a single issue. Tools go through fork, branch, one commit
//! per file, then a pull request. Steps run strictly in order and the first
//! failure aborts the rest; completed steps are left in place.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::thread;
use std::time::Duration;

use crate::error::{HostResult, Result, ShowcaseError};
use crate::form::{branch_name, tool_dir, ProjectForm, ToolForm};
use crate::models::*;
use crate::session::SessionManager;
use crate::traits::RepoHost;

pub const DEFAULT_FORK_SETTLE_DELAY: Duration = Duration::from_secs(5);
pub const DEFAULT_MAX_FILE_BYTES: u64 = 1024 * 1024;

/// Named steps, used to report where a submission stopped
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionStep {
    CreateIssue,
    CheckFork,
    CreateFork,
    ReadDefaultBranch,
    ReadBranchHead,
    CreateBranch,
    WriteMetadata,
    WriteSummary,
    WriteFile(String),
    OpenPullRequest,
}

impl fmt::Display for SubmissionStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubmissionStep::CreateIssue => f.write_str("create issue"),
            SubmissionStep::CheckFork => f.write_str("check for existing fork"),
            SubmissionStep::CreateFork => f.write_str("create fork"),
            SubmissionStep::ReadDefaultBranch => f.write_str("read default branch"),
            SubmissionStep::ReadBranchHead => f.write_str("read branch head"),
            SubmissionStep::CreateBranch => f.write_str("create branch"),
            SubmissionStep::WriteMetadata => f.write_str("write metadata"),
            SubmissionStep::WriteSummary => f.write_str("write summary"),
            SubmissionStep::WriteFile(name) => write!(f, "write file {}", name),
            SubmissionStep::OpenPullRequest => f.write_str("open pull request"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkflowOptions {
    /// Wait after requesting a fork. The fork is not polled for readiness.
    pub fork_settle_delay: Duration,
    /// Files larger than this are skipped
    pub max_file_bytes: u64,
}

impl Default for WorkflowOptions {
    fn default() -> Self {
        Self {
            fork_settle_delay: DEFAULT_FORK_SETTLE_DELAY,
            max_file_bytes: DEFAULT_MAX_FILE_BYTES,
        }
    }
}

/// Outcome of the issue-based path
#[derive(Debug, Clone, Serialize)]
pub struct ProjectReceipt {
    pub submission: ProjectSubmission,
    pub issue: IssueRef,
}

/// Names written by the workflow itself inside the tool directory
pub const GENERATED_FILES: [&str; 2] = ["metadata.json", "README.md"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    OverSizeLimit,
    /// Would replace a generated document
    ReservedName,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::OverSizeLimit => f.write_str("over size limit"),
            SkipReason::ReservedName => f.write_str("name reserved for a generated file"),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SkippedFile {
    pub name: String,
    pub size: u64,
    pub reason: SkipReason,
}

/// Why a file will not be uploaded, if it will not
pub fn skip_reason(file: &ToolFile, max_file_bytes: u64) -> Option<SkipReason> {
    if GENERATED_FILES
        .iter()
        .any(|reserved| reserved.eq_ignore_ascii_case(&file.name))
    {
        Some(SkipReason::ReservedName)
    } else if file.size > max_file_bytes {
        Some(SkipReason::OverSizeLimit)
    } else {
        None
    }
}

/// Outcome of the fork and pull request path
#[derive(Debug, Clone, Serialize)]
pub struct ToolReport {
    pub submission: ToolSubmission,
    pub fork: RepoRef,
    pub fork_created: bool,
    pub branch: String,
    pub base_branch: String,
    /// Repository paths committed, in commit order
    pub written: Vec<String>,
    pub skipped: Vec<SkippedFile>,
    pub pull_request: PullRequestRef,
}

pub struct Submitter<'a> {
    session: &'a SessionManager<'a>,
    host: &'a dyn RepoHost,
    target: RepoId,
    options: WorkflowOptions,
}

impl<'a> Submitter<'a> {
    pub fn new(session: &'a SessionManager<'a>, host: &'a dyn RepoHost, target: RepoId) -> Self {
        Self {
            session,
            host,
            target,
            options: WorkflowOptions::default(),
        }
    }

    pub fn with_options(mut self, options: WorkflowOptions) -> Self {
        self.options = options;
        self
    }

    /// Submit a project as one issue on the target repository
    pub fn submit_project(&self, form: ProjectForm, now: DateTime<Utc>) -> Result<ProjectReceipt> {
        let (_, identity) = self.session.require()?;
        let submission = form.into_submission(&identity.login, now)?;

        let title = format!("[Project Submission] {}", submission.name);
        let body = serde_json::to_string_pretty(&submission)?;

        let issue = self.step(SubmissionStep::CreateIssue, || {
            self.host.create_issue(&self.target, &title, &body)
        })?;

        tracing::info!(issue = issue.number, "project submitted");
        Ok(ProjectReceipt { submission, issue })
    }

    /// Submit a tool through fork, branch, per-file commits and a pull request
    pub fn submit_tool(&self, form: ToolForm, now: DateTime<Utc>) -> Result<ToolReport> {
        let (_, identity) = self.session.require()?;
        let submission = form.into_submission(&identity.login, now)?;

        let existing = self.step(SubmissionStep::CheckFork, || {
            self.host.find_fork(&self.target, &identity.login)
        })?;

        let (fork, fork_created) = match existing {
            Some(fork) => {
                tracing::info!(fork = %fork.id, "reusing existing fork");
                (fork, false)
            }
            None => {
                let fork = self.step(SubmissionStep::CreateFork, || {
                    self.host.create_fork(&self.target)
                })?;
                if !self.options.fork_settle_delay.is_zero() {
                    tracing::info!(
                        delay_ms = self.options.fork_settle_delay.as_millis() as u64,
                        "waiting for fork to settle"
                    );
                    thread::sleep(self.options.fork_settle_delay);
                }
                (fork, true)
            }
        };

        let base_branch = self.step(SubmissionStep::ReadDefaultBranch, || {
            self.host.default_branch(&self.target)
        })?;

        let head = self.step(SubmissionStep::ReadBranchHead, || {
            self.host.branch_head(&fork.id, &base_branch)
        })?;

        let branch = branch_name(&submission.name, submission.timestamp);
        self.step(SubmissionStep::CreateBranch, || {
            self.host.create_branch(&fork.id, &branch, &head)
        })?;

        let dir = tool_dir(&submission.name);
        let mut written = Vec::new();

        let metadata_path = format!("{}/metadata.json", dir);
        let metadata = serde_json::to_string_pretty(&submission)?;
        self.step(SubmissionStep::WriteMetadata, || {
            self.write(
                &fork.id,
                &branch,
                &metadata_path,
                metadata.into_bytes(),
                &format!("metadata for {}", submission.name),
            )
        })?;
        written.push(metadata_path);

        let summary_path = format!("{}/README.md", dir);
        let summary = render_summary(&submission, self.options.max_file_bytes);
        self.step(SubmissionStep::WriteSummary, || {
            self.write(
                &fork.id,
                &branch,
                &summary_path,
                summary.into_bytes(),
                &format!("summary for {}", submission.name),
            )
        })?;
        written.push(summary_path);

        let mut skipped = Vec::new();
        for file in &submission.files {
            if let Some(reason) = skip_reason(file, self.options.max_file_bytes) {
                tracing::warn!(
                    file = %file.name,
                    size = file.size,
                    limit = self.options.max_file_bytes,
                    reason = %reason,
                    "skipping file"
                );
                skipped.push(SkippedFile {
                    name: file.name.clone(),
                    size: file.size,
                    reason,
                });
                continue;
            }

            let path = format!("{}/{}", dir, file.name);
            self.step(SubmissionStep::WriteFile(file.name.clone()), || {
                self.write(
                    &fork.id,
                    &branch,
                    &path,
                    file.content.clone(),
                    &format!("{} for {}", file.name, submission.name),
                )
            })?;
            written.push(path);
        }

        let draft = PullRequestDraft {
            title: format!("[Tool Submission] {}", submission.name),
            head: format!("{}:{}", fork.id.owner, branch),
            base: base_branch.clone(),
            body: render_pull_request_body(&submission, &written, &skipped),
        };
        let pull_request = self.step(SubmissionStep::OpenPullRequest, || {
            self.host.create_pull_request(&self.target, &draft)
        })?;

        tracing::info!(pull_request = pull_request.number, "tool submitted");
        Ok(ToolReport {
            submission,
            fork,
            fork_created,
            branch,
            base_branch,
            written,
            skipped,
            pull_request,
        })
    }

    /// Probe the path first so an existing file is updated with its sha
    fn write(
        &self,
        repo: &RepoId,
        branch: &str,
        path: &str,
        content: Vec<u8>,
        what: &str,
    ) -> HostResult<()> {
        let existing = self.host.get_file(repo, path, branch)?;
        let (verb, sha) = match existing {
            Some(file) => ("Update", Some(file.sha)),
            None => ("Add", None),
        };
        tracing::debug!(path, update = sha.is_some(), "writing file");

        self.host.put_file(
            repo,
            &FileWrite {
                path: path.to_string(),
                message: format!("{} {}", verb, what),
                content,
                branch: branch.to_string(),
                sha,
            },
        )
    }

    fn step<T>(&self, step: SubmissionStep, run: impl FnOnce() -> HostResult<T>) -> Result<T> {
        tracing::info!(step = %step, "submission step");
        run().map_err(|source| {
            tracing::error!(step = %step, error = %source, "submission step failed");
            ShowcaseError::StepFailed { step, source }
        })
    }
}

/// Human-readable summary committed next to the metadata
pub fn render_summary(submission: &ToolSubmission, max_file_bytes: u64) -> String {
    let mut out = format!("# {}\n\n", submission.name);
    if !submission.description.is_empty() {
        out.push_str(&submission.description);
        out.push_str("\n\n");
    }

    out.push_str(&format!("- **Submitted by:** @{}\n", submission.user));
    out.push_str(&format!(
        "- **Submitted at:** {}\n",
        submission.timestamp.to_rfc3339()
    ));
    if !submission.folder.is_empty() {
        out.push_str(&format!("- **Folder:** {}\n", submission.folder));
    }
    if !submission.tags.is_empty() {
        out.push_str(&format!("- **Tags:** {}\n", submission.tags.join(", ")));
    }

    out.push_str("\n## Files\n\n");
    if submission.files.is_empty() {
        out.push_str("_No files were included._\n");
    }
    for file in &submission.files {
        match skip_reason(file, max_file_bytes) {
            Some(reason) => out.push_str(&format!(
                "- `{}` ({} bytes) (not uploaded, {})\n",
                file.name, file.size, reason
            )),
            None => out.push_str(&format!("- `{}` ({} bytes)\n", file.name, file.size)),
        }
    }
    out
}

fn render_pull_request_body(
    submission: &ToolSubmission,
    written: &[String],
    skipped: &[SkippedFile],
) -> String {
    let mut out = format!("## Tool submission: {}\n\n", submission.name);
    if !submission.description.is_empty() {
        out.push_str(&format!("{}\n\n", submission.description));
    }

    out.push_str("### Metadata\n\n");
    out.push_str(&format!("- **Name:** {}\n", submission.name));
    out.push_str(&format!("- **Submitted by:** @{}\n", submission.user));
    out.push_str(&format!(
        "- **Submitted at:** {}\n",
        submission.timestamp.to_rfc3339()
    ));
    if !submission.folder.is_empty() {
        out.push_str(&format!("- **Folder:** {}\n", submission.folder));
    }
    if !submission.tags.is_empty() {
        out.push_str(&format!("- **Tags:** {}\n", submission.tags.join(", ")));
    }

    out.push_str("\n### Files\n\n");
    for path in written {
        out.push_str(&format!("- `{}`\n", path));
    }
    if !skipped.is_empty() {
        out.push_str("\nSkipped:\n\n");
        for file in skipped {
            out.push_str(&format!(
                "- `{}` ({} bytes, {})\n",
                file.name, file.size, file.reason
            ));
        }
    }
    out
}

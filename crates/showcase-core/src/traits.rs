use crate::error::{HostResult, Result};
use crate::models::*;

/// Operations the submission workflow needs from a repository host
///
/// All calls are made with the credential the host was built with. Each
/// backend (GitHub today) provides its own implementation; tests use a
/// recording in-memory host.
pub trait RepoHost: Send + Sync {
    // ========== Issues ==========

    /// Open an issue on a repository
    fn create_issue(&self, repo: &RepoId, title: &str, body: &str) -> HostResult<IssueRef>;

    // ========== Repositories ==========

    /// Find a fork of `upstream` owned by `login`
    fn find_fork(&self, upstream: &RepoId, login: &str) -> HostResult<Option<RepoRef>>;

    /// Request a fork of `upstream` into the authenticated account
    ///
    /// The host may answer before the fork is usable.
    fn create_fork(&self, upstream: &RepoId) -> HostResult<RepoRef>;

    /// Name of the repository's default branch
    fn default_branch(&self, repo: &RepoId) -> HostResult<String>;

    // ========== Git references ==========

    /// Commit sha the branch points to
    fn branch_head(&self, repo: &RepoId, branch: &str) -> HostResult<String>;

    /// Create `branch` pointing at `sha`
    fn create_branch(&self, repo: &RepoId, branch: &str, sha: &str) -> HostResult<()>;

    // ========== Contents ==========

    /// Read a file at `git_ref`; `None` when the path does not exist
    fn get_file(&self, repo: &RepoId, path: &str, git_ref: &str)
        -> HostResult<Option<RemoteFile>>;

    /// Create or update a single file as one commit
    fn put_file(&self, repo: &RepoId, write: &FileWrite) -> HostResult<()>;

    // ========== Pull requests ==========

    /// Open a pull request against `repo`
    fn create_pull_request(
        &self,
        repo: &RepoId,
        draft: &PullRequestDraft,
    ) -> HostResult<PullRequestRef>;
}

/// Looks up the identity behind an arbitrary credential
///
/// Separate from [`RepoHost`] because it runs before a session exists and
/// whenever a cached credential is revalidated.
pub trait IdentityProvider {
    fn fetch_identity(&self, credential: &Credential) -> HostResult<Identity>;
}

/// Turns an OAuth authorization code into a credential
pub trait TokenExchange {
    /// * `code` - Authorization code from the provider's redirect
    /// * `callback_id` - Anti-forgery state scoping this exchange
    fn exchange(&self, code: &str, callback_id: &str) -> Result<Credential>;
}

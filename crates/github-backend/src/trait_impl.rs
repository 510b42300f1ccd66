//! Implementation of showcase-core traits for GitHubClient

use showcase_core::{
    Credential, FileWrite, HostError, HostResult, Identity, IdentityProvider, IssueRef,
    PullRequestDraft, PullRequestRef, RemoteFile, RepoHost, RepoId, RepoRef,
};

use crate::client::{decode_content, encode_content, GitHubClient};
use crate::models::*;

const FORK_PAGE_SIZE: usize = 100;

impl RepoHost for GitHubClient {
    fn create_issue(&self, repo: &RepoId, title: &str, body: &str) -> HostResult<IssueRef> {
        let issue = CreateGitHubIssue {
            title: title.to_string(),
            body: Some(body.to_string()),
            labels: None,
        };
        Ok(GitHubClient::create_issue(self, repo, &issue)?.into())
    }

    fn find_fork(&self, upstream: &RepoId, login: &str) -> HostResult<Option<RepoRef>> {
        let mut page = 1;
        loop {
            let forks = self.list_forks(upstream, FORK_PAGE_SIZE, page)?;
            let last_page = forks.len() < FORK_PAGE_SIZE;

            if let Some(fork) = forks
                .into_iter()
                .find(|fork| fork.owner.login.eq_ignore_ascii_case(login))
            {
                return Ok(Some(fork.into()));
            }
            if last_page {
                return Ok(None);
            }
            page += 1;
        }
    }

    fn create_fork(&self, upstream: &RepoId) -> HostResult<RepoRef> {
        Ok(GitHubClient::create_fork(self, upstream)?.into())
    }

    fn default_branch(&self, repo: &RepoId) -> HostResult<String> {
        let repo_info = self.get_repo(repo)?;
        repo_info
            .default_branch
            .filter(|b| !b.is_empty())
            .ok_or_else(|| HostError::Parse(format!("{} has no default branch", repo)))
    }

    fn branch_head(&self, repo: &RepoId, branch: &str) -> HostResult<String> {
        Ok(self.get_branch_ref(repo, branch)?.object.sha)
    }

    fn create_branch(&self, repo: &RepoId, branch: &str, sha: &str) -> HostResult<()> {
        self.create_branch_ref(repo, branch, sha)?;
        Ok(())
    }

    fn get_file(
        &self,
        repo: &RepoId,
        path: &str,
        git_ref: &str,
    ) -> HostResult<Option<RemoteFile>> {
        let Some(content) = self.get_content(repo, path, git_ref)? else {
            return Ok(None);
        };

        let bytes = decode_content(&content)?;
        Ok(Some(RemoteFile {
            sha: content.sha,
            content: bytes,
        }))
    }

    fn put_file(&self, repo: &RepoId, write: &FileWrite) -> HostResult<()> {
        let body = PutGitHubContent {
            message: write.message.clone(),
            content: encode_content(&write.content),
            branch: write.branch.clone(),
            sha: write.sha.clone(),
        };
        self.put_content(repo, &write.path, &body)?;
        Ok(())
    }

    fn create_pull_request(
        &self,
        repo: &RepoId,
        draft: &PullRequestDraft,
    ) -> HostResult<PullRequestRef> {
        let pull = CreateGitHubPullRequest {
            title: draft.title.clone(),
            head: draft.head.clone(),
            base: draft.base.clone(),
            body: draft.body.clone(),
        };
        Ok(GitHubClient::create_pull_request(self, repo, &pull)?.into())
    }
}

impl IdentityProvider for GitHubClient {
    fn fetch_identity(&self, credential: &Credential) -> HostResult<Identity> {
        Ok(self.get_user(Some(credential.expose()))?.into())
    }
}

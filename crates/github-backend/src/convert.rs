//! Model conversions from GitHub types to showcase-core types

use showcase_core::{Identity, IssueRef, PullRequestRef, RepoId, RepoRef};

use crate::models::*;

impl From<GitHubUser> for Identity {
    fn from(user: GitHubUser) -> Self {
        Self {
            id: user.id,
            login: user.login,
            name: user.name.filter(|n| !n.is_empty()),
            avatar_url: user.avatar_url.unwrap_or_default(),
        }
    }
}

impl From<GitHubRepo> for RepoRef {
    fn from(repo: GitHubRepo) -> Self {
        // full_name is authoritative; owner.login + name is the fallback
        let id = RepoId::parse(&repo.full_name)
            .unwrap_or_else(|| RepoId::new(repo.owner.login.clone(), repo.name.clone()));

        Self {
            id,
            default_branch: repo.default_branch,
            html_url: repo.html_url,
        }
    }
}

impl From<GitHubIssue> for IssueRef {
    fn from(issue: GitHubIssue) -> Self {
        Self {
            number: issue.number,
            html_url: issue.html_url,
        }
    }
}

impl From<GitHubPullRequest> for PullRequestRef {
    fn from(pull: GitHubPullRequest) -> Self {
        Self {
            number: pull.number,
            html_url: pull.html_url,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(login: &str) -> GitHubUser {
        GitHubUser {
            login: login.to_string(),
            id: 5,
            name: Some(String::new()),
            avatar_url: None,
        }
    }

    #[test]
    fn empty_profile_name_becomes_none() {
        let identity = Identity::from(user("octocat"));
        assert_eq!(identity.name, None);
        assert_eq!(identity.display_name(), "octocat");
        assert_eq!(identity.avatar_url, "");
    }

    #[test]
    fn repo_ref_prefers_full_name() {
        let repo = GitHubRepo {
            id: 1,
            name: "showcase".into(),
            full_name: "octocat/showcase".into(),
            owner: user("someone-else"),
            default_branch: Some("main".into()),
            html_url: None,
            fork: true,
        };

        let repo_ref = RepoRef::from(repo);
        assert_eq!(repo_ref.id, RepoId::new("octocat", "showcase"));
        assert_eq!(repo_ref.default_branch.as_deref(), Some("main"));
    }
}

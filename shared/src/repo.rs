use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::ConfigError;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RepoId {
    pub owner: String,
    pub repo: String,
}

impl RepoId {
    pub fn new(owner: impl Into<String>, repo: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
        }
    }

    pub fn full_id(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }
}

impl fmt::Display for RepoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

impl FromStr for RepoId {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().split('/').collect::<Vec<_>>().as_slice() {
            [owner, repo] if is_valid_owner(owner) && is_valid_repo(repo) => {
                Ok(Self::new(*owner, *repo))
            }
            _ => Err(ConfigError::InvalidRepository(s.to_string())),
        }
    }
}

/// Accounts and organizations: ASCII letters, digits and inner single hyphens.
fn is_valid_owner(owner: &str) -> bool {
    !owner.is_empty()
        && !owner.starts_with('-')
        && !owner.ends_with('-')
        && !owner.contains("--")
        && owner.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
}

/// Repositories: ASCII letters, digits, `-`, `_` and `.`, but not `.` or `..`.
fn is_valid_repo(repo: &str) -> bool {
    !repo.is_empty()
        && repo != "."
        && repo != ".."
        && repo
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}

#[cfg(test)]
mod tests {
    use super::RepoId;

    #[test]
    fn parses_owner_and_repo() {
        let repo: RepoId = "oss2024hnu/reposcore-js".parse().unwrap();
        assert_eq!(repo.owner, "oss2024hnu");
        assert_eq!(repo.repo, "reposcore-js");
        assert_eq!(repo.to_string(), "oss2024hnu/reposcore-js");
    }

    #[test]
    fn rejects_malformed_identifiers() {
        for input in ["", "owner", "owner/", "/repo", "a/b/c"] {
            assert!(input.parse::<RepoId>().is_err(), "{input} should be rejected");
        }
    }

    #[test]
    fn rejects_names_github_does_not_allow() {
        for input in [
            "a/..",
            "a/.",
            "../repo",
            "my org/repo",
            "owner/my repo",
            "-owner/repo",
            "owner-/repo",
            "own--er/repo",
            "own_er/repo",
            "owner/re%po",
            "owner/ré",
        ] {
            assert!(input.parse::<RepoId>().is_err(), "{input} should be rejected");
        }
    }

    #[test]
    fn accepts_dots_and_underscores_in_repository_names() {
        for input in ["near/near-sdk-rs", "rust-lang/rust.vim", "a1/.github", "o/my_repo"] {
            assert!(input.parse::<RepoId>().is_ok(), "{input} should be accepted");
        }
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{ActivityItem, GithubHandle, ItemKind, SourceError, StateReason};

/// Login GitHub shows for content of deleted accounts.
pub const GHOST_LOGIN: &str = "ghost";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Author {
    pub login: GithubHandle,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Label {
    pub name: String,
}

/// Present on issue-listing entries that are pull requests.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PullRequestLink {
    #[serde(default)]
    pub merged_at: Option<DateTime<Utc>>,
}

/// One entry of `GET /repos/{owner}/{repo}/issues`.
///
/// Only the fields the scoring needs are kept. octocrab's `Issue` model does not
/// carry `pull_request.merged_at`, so the listing is decoded into this type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueListItem {
    pub number: u64,
    pub user: Option<Author>,
    #[serde(default)]
    pub pull_request: Option<PullRequestLink>,
    #[serde(default)]
    pub state_reason: Option<StateReason>,
    #[serde(default)]
    pub labels: Vec<Label>,
}

impl From<IssueListItem> for ActivityItem {
    fn from(item: IssueListItem) -> Self {
        let author = item
            .user
            .map(|user| user.login)
            .unwrap_or_else(|| GHOST_LOGIN.to_string());
        let kind = match item.pull_request {
            Some(pr) => ItemKind::PullRequest {
                merged_at: pr.merged_at,
            },
            None => ItemKind::Issue {
                state_reason: item.state_reason,
            },
        };

        ActivityItem {
            author,
            kind,
            labels: item.labels.into_iter().map(|label| label.name).collect(),
        }
    }
}

/// Classifies a GitHub error response by status code and message.
pub fn error_from_status(status: u16, message: String) -> SourceError {
    match status {
        404 => SourceError::NotFound,
        401 => SourceError::AuthFailure,
        403 | 429 if message.to_lowercase().contains("rate limit") => SourceError::RateLimited,
        _ => SourceError::UnexpectedUpstream { status, message },
    }
}

impl From<octocrab::Error> for SourceError {
    fn from(error: octocrab::Error) -> Self {
        match error {
            octocrab::Error::GitHub { source, .. } => {
                error_from_status(source.status_code.as_u16(), source.message.clone())
            }
            other => SourceError::TransportFailure(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merged_pull_request_entry() {
        let item: IssueListItem = serde_json::from_str(
            r#"{
                "number": 12,
                "user": {"login": "alice"},
                "state": "closed",
                "state_reason": null,
                "labels": [{"name": "bug"}, {"name": "documentation"}],
                "pull_request": {
                    "url": "https://api.github.com/repos/o/r/pulls/12",
                    "merged_at": "2024-05-01T10:00:00Z"
                }
            }"#,
        )
        .unwrap();

        let item = ActivityItem::from(item);
        assert_eq!(item.author, "alice");
        assert!(item.is_pull_request());
        assert!(matches!(
            item.kind,
            ItemKind::PullRequest {
                merged_at: Some(_)
            }
        ));
        assert_eq!(item.labels, vec!["bug", "documentation"]);
    }

    #[test]
    fn plain_issue_entry() {
        let item: IssueListItem = serde_json::from_str(
            r#"{
                "number": 3,
                "user": {"login": "bob"},
                "state": "closed",
                "state_reason": "not_planned",
                "labels": []
            }"#,
        )
        .unwrap();

        let item = ActivityItem::from(item);
        assert_eq!(
            item.kind,
            ItemKind::Issue {
                state_reason: Some(StateReason::NotPlanned)
            }
        );
    }

    #[test]
    fn unknown_state_reason_is_kept_as_unknown() {
        let item: IssueListItem = serde_json::from_str(
            r#"{"number": 3, "user": {"login": "bob"}, "state_reason": "something_new"}"#,
        )
        .unwrap();
        assert_eq!(item.state_reason, Some(StateReason::Unknown));
    }

    #[test]
    fn entry_without_author_belongs_to_ghost() {
        let item: IssueListItem = serde_json::from_str(r#"{"number": 1, "user": null}"#).unwrap();
        assert_eq!(ActivityItem::from(item).author, GHOST_LOGIN);
    }

    #[test]
    fn status_classification() {
        assert_eq!(error_from_status(404, "Not Found".into()), SourceError::NotFound);
        assert_eq!(error_from_status(401, "Bad credentials".into()), SourceError::AuthFailure);
        assert_eq!(
            error_from_status(403, "API rate limit exceeded for 1.2.3.4".into()),
            SourceError::RateLimited
        );
        assert_eq!(
            error_from_status(429, "You have exceeded a secondary rate limit".into()),
            SourceError::RateLimited
        );
        assert_eq!(
            error_from_status(403, "Resource not accessible".into()),
            SourceError::UnexpectedUpstream {
                status: 403,
                message: "Resource not accessible".into()
            }
        );
        assert!(matches!(
            error_from_status(502, "Bad Gateway".into()),
            SourceError::UnexpectedUpstream { status: 502, .. }
        ));
    }
}

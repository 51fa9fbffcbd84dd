use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::Display;

use super::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum LabelClass {
    FeatureBug,
    Doc,
    Typo,
    Ignored,
}

/// Label names recognised for each class. Anything else is ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelVocabulary {
    pub feature_bug: Vec<String>,
    pub documentation: Vec<String>,
    pub typo: Vec<String>,
}

impl Default for LabelVocabulary {
    fn default() -> Self {
        Self {
            feature_bug: vec!["bug".to_string(), "enhancement".to_string()],
            documentation: vec!["documentation".to_string()],
            typo: vec!["typo".to_string()],
        }
    }
}

impl LabelVocabulary {
    /// Only the first label counts. `["invalid", "bug"]` is ignored.
    pub fn classify<S: AsRef<str>>(&self, labels: &[S]) -> LabelClass {
        let Some(first) = labels.first() else {
            return LabelClass::Ignored;
        };
        let first = first.as_ref();
        let matches = |names: &[String]| names.iter().any(|name| name == first);

        if matches(&self.documentation) {
            LabelClass::Doc
        } else if matches(&self.typo) {
            LabelClass::Typo
        } else if matches(&self.feature_bug) {
            LabelClass::FeatureBug
        } else {
            LabelClass::Ignored
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StateReason {
    Completed,
    Reopened,
    NotPlanned,
    Duplicate,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemKind {
    PullRequest {
        merged_at: Option<DateTime<Utc>>,
    },
    Issue {
        /// `None` while the issue is still open.
        state_reason: Option<StateReason>,
    },
}

/// One entry of a repository's issue listing: either a pull request or a plain issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityItem {
    pub author: GithubHandle,
    pub kind: ItemKind,
    pub labels: Vec<String>,
}

impl ActivityItem {
    pub fn is_pull_request(&self) -> bool {
        matches!(self.kind, ItemKind::PullRequest { .. })
    }

    /// Counter this item contributes to, if any.
    pub fn bucket(&self, vocabulary: &LabelVocabulary) -> Option<Bucket> {
        match &self.kind {
            ItemKind::PullRequest { merged_at } => {
                if merged_at.is_none() {
                    return None;
                }
                match vocabulary.classify(self.labels.as_slice()) {
                    LabelClass::FeatureBug => Some(Bucket::PrFeatureBug),
                    LabelClass::Doc => Some(Bucket::PrDoc),
                    LabelClass::Typo => Some(Bucket::PrTypo),
                    LabelClass::Ignored => None,
                }
            }
            ItemKind::Issue { state_reason } => {
                if !matches!(
                    state_reason,
                    None | Some(StateReason::Completed) | Some(StateReason::Reopened)
                ) {
                    return None;
                }
                match vocabulary.classify(self.labels.as_slice()) {
                    LabelClass::FeatureBug => Some(Bucket::IssueFeatureBug),
                    LabelClass::Doc => Some(Bucket::IssueDoc),
                    LabelClass::Typo | LabelClass::Ignored => None,
                }
            }
        }
    }
}

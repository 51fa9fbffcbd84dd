use serde::{Deserialize, Serialize};

use super::*;

pub const PR_FEATURE_BUG_WEIGHT: u32 = 3;
pub const PR_DOC_WEIGHT: u32 = 2;
pub const PR_TYPO_WEIGHT: u32 = 1;
pub const ISSUE_FEATURE_BUG_WEIGHT: u32 = 2;
pub const ISSUE_DOC_WEIGHT: u32 = 1;

/// Doc and typo PRs allowed per feature/bug PR.
pub const DOC_PR_CAP_RATIO: u32 = 3;
/// Issues allowed per valid PR.
pub const ISSUE_CAP_RATIO: u32 = 4;

/// Raw counts after the anti-gaming caps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AdjustedCounts {
    pub pr_feature: u32,
    pub pr_doc: u32,
    pub pr_typo: u32,
    pub issue_feature: u32,
    pub issue_doc: u32,
}

impl AdjustedCounts {
    pub fn compute(record: &ActivityRecord) -> Self {
        let pr_feature = record.pull_requests.bug_and_feat;
        let pr_doc = record.pull_requests.doc;
        let pr_typo = record.pull_requests.typo;
        let issue_feature = record.issues.bug_and_feat;
        let issue_doc = record.issues.doc;

        let total_pr = record.pull_requests.total();
        let total_issue = record.issues.total();

        if total_pr == 0 && total_issue == 0 {
            return Self::default();
        }

        if total_pr > 0 && (total_pr > 1 || total_issue > 1) {
            // A participant with doc PRs but no feature PR is credited with exactly one
            // virtual feature PR, so their doc work is capped instead of wiped out.
            let effective_feature = if pr_feature == 0 && pr_doc > 0 {
                1
            } else {
                pr_feature
            };
            let pr_cap = effective_feature.saturating_mul(DOC_PR_CAP_RATIO);
            let adjusted_doc = pr_doc.min(pr_cap);
            let adjusted_typo = pr_typo.min(pr_cap);

            let valid_pr = effective_feature
                .saturating_add(adjusted_doc)
                .saturating_add(adjusted_typo);
            let valid_issue = total_issue.min(valid_pr.saturating_mul(ISSUE_CAP_RATIO));
            let adjusted_issue_feature = issue_feature.min(valid_issue);

            return Self {
                pr_feature,
                pr_doc: adjusted_doc,
                pr_typo: adjusted_typo,
                issue_feature: adjusted_issue_feature,
                issue_doc: valid_issue - adjusted_issue_feature,
            };
        }

        Self {
            pr_feature,
            pr_doc,
            pr_typo,
            issue_feature,
            issue_doc,
        }
    }
}

/// Weighted score of one participant, per bucket and in total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub participant: GithubHandle,
    pub pr_feature: u32,
    pub pr_doc: u32,
    pub pr_typo: u32,
    pub issue_feature: u32,
    pub issue_doc: u32,
    pub total: u32,
}

impl ScoreBreakdown {
    pub fn from_counts(participant: GithubHandle, counts: AdjustedCounts) -> Self {
        let pr_feature = counts.pr_feature.saturating_mul(PR_FEATURE_BUG_WEIGHT);
        let pr_doc = counts.pr_doc.saturating_mul(PR_DOC_WEIGHT);
        let pr_typo = counts.pr_typo.saturating_mul(PR_TYPO_WEIGHT);
        let issue_feature = counts.issue_feature.saturating_mul(ISSUE_FEATURE_BUG_WEIGHT);
        let issue_doc = counts.issue_doc.saturating_mul(ISSUE_DOC_WEIGHT);
        let total = [pr_feature, pr_doc, pr_typo, issue_feature, issue_doc]
            .into_iter()
            .fold(0u32, u32::saturating_add);

        Self {
            participant,
            pr_feature,
            pr_doc,
            pr_typo,
            issue_feature,
            issue_doc,
            total,
        }
    }
}

pub fn adjust(participant: impl Into<GithubHandle>, record: &ActivityRecord) -> ScoreBreakdown {
    ScoreBreakdown::from_counts(participant.into(), AdjustedCounts::compute(record))
}

/// Breakdowns for every participant of a map, in map order.
pub fn score_repository(activity: &RepositoryActivity) -> Vec<ScoreBreakdown> {
    activity
        .iter()
        .map(|(login, record)| adjust(login.clone(), record))
        .collect()
}

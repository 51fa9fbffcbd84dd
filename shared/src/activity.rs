use std::{
    collections::BTreeMap,
    sync::{Mutex, PoisonError},
};

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

use super::*;

/// Counter a classified item increments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
pub enum Bucket {
    PrFeatureBug,
    PrDoc,
    PrTypo,
    IssueFeatureBug,
    IssueDoc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PullRequestCounts {
    pub bug_and_feat: u32,
    pub doc: u32,
    pub typo: u32,
}

impl PullRequestCounts {
    pub fn total(&self) -> u32 {
        self.bug_and_feat
            .saturating_add(self.doc)
            .saturating_add(self.typo)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct IssueCounts {
    pub bug_and_feat: u32,
    pub doc: u32,
}

impl IssueCounts {
    pub fn total(&self) -> u32 {
        self.bug_and_feat.saturating_add(self.doc)
    }
}

/// Raw counts of one participant in one repository.
///
/// Counts only grow: the record has no way to decrement or reset a bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ActivityRecord {
    pub pull_requests: PullRequestCounts,
    pub issues: IssueCounts,
}

impl ActivityRecord {
    pub fn record(&mut self, bucket: Bucket) {
        let counter = match bucket {
            Bucket::PrFeatureBug => &mut self.pull_requests.bug_and_feat,
            Bucket::PrDoc => &mut self.pull_requests.doc,
            Bucket::PrTypo => &mut self.pull_requests.typo,
            Bucket::IssueFeatureBug => &mut self.issues.bug_and_feat,
            Bucket::IssueDoc => &mut self.issues.doc,
        };
        *counter = counter.saturating_add(1);
    }

    pub fn count(&self, bucket: Bucket) -> u32 {
        match bucket {
            Bucket::PrFeatureBug => self.pull_requests.bug_and_feat,
            Bucket::PrDoc => self.pull_requests.doc,
            Bucket::PrTypo => self.pull_requests.typo,
            Bucket::IssueFeatureBug => self.issues.bug_and_feat,
            Bucket::IssueDoc => self.issues.doc,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.pull_requests.total() == 0 && self.issues.total() == 0
    }

    pub fn merge(&mut self, other: &ActivityRecord) {
        let pairs = [
            (&mut self.pull_requests.bug_and_feat, other.pull_requests.bug_and_feat),
            (&mut self.pull_requests.doc, other.pull_requests.doc),
            (&mut self.pull_requests.typo, other.pull_requests.typo),
            (&mut self.issues.bug_and_feat, other.issues.bug_and_feat),
            (&mut self.issues.doc, other.issues.doc),
        ];
        for (counter, added) in pairs {
            *counter = counter.saturating_add(added);
        }
    }
}

/// Participant login to raw counts, for one repository (or the run total).
pub type RepositoryActivity = BTreeMap<GithubHandle, ActivityRecord>;

/// Cross-repository accumulator shared by concurrent ingestion tasks.
///
/// Every mutation holds the lock for a single increment, so two repositories
/// bumping the same participant never lose an update.
#[derive(Debug, Default)]
pub struct ActivityTotals {
    inner: Mutex<RepositoryActivity>,
}

impl ActivityTotals {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ensure_participant(&self, login: &str) {
        let mut map = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        if !map.contains_key(login) {
            map.insert(login.to_string(), ActivityRecord::default());
        }
    }

    pub fn record(&self, login: &str, bucket: Bucket) {
        let mut map = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        map.entry(login.to_string()).or_default().record(bucket);
    }

    pub fn into_inner(self) -> RepositoryActivity {
        self.inner
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn record_increments_only_the_given_bucket() {
        for bucket in Bucket::iter() {
            let mut record = ActivityRecord::default();
            record.record(bucket);
            record.record(bucket);

            for other in Bucket::iter() {
                let expected = if other == bucket { 2 } else { 0 };
                assert_eq!(record.count(other), expected, "{bucket} -> {other}");
            }
        }
    }

    #[test]
    fn merge_adds_every_bucket() {
        let mut record = ActivityRecord::default();
        record.record(Bucket::PrDoc);
        let mut other = ActivityRecord::default();
        other.record(Bucket::PrDoc);
        other.record(Bucket::IssueFeatureBug);

        record.merge(&other);
        assert_eq!(record.count(Bucket::PrDoc), 2);
        assert_eq!(record.count(Bucket::IssueFeatureBug), 1);
        assert_eq!(record.count(Bucket::PrTypo), 0);
    }

    #[test]
    fn totals_keep_existing_counts_when_reinitialized() {
        let totals = ActivityTotals::new();
        totals.ensure_participant("alice");
        totals.record("alice", Bucket::PrDoc);
        totals.ensure_participant("alice");
        totals.ensure_participant("bob");

        let map = totals.into_inner();
        assert_eq!(map.len(), 2);
        assert_eq!(map["alice"].pull_requests.doc, 1);
        assert!(map["bob"].is_empty());
    }
}

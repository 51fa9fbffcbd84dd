use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use anyhow::{bail, Context};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::{ActivityReport, RepoId, RepositoryActivity, ScoringConfig};
use tracing::info;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct CachedActivity {
    saved_at: Option<DateTime<Utc>>,
    /// Keyed by `owner/repo`.
    repositories: BTreeMap<String, RepositoryActivity>,
}

/// Raw activity of earlier runs, so a rate-limited run can still be reported.
///
/// Each successful collection replaces the entries of the repositories it read
/// and keeps the others.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActivityCache {
    path: PathBuf,
    contents: CachedActivity,
}

impl ActivityCache {
    /// A missing file gives an empty cache.
    pub fn load(path: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let path = path.into();
        let contents = if path.exists() {
            let content = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse {}", path.display()))?
        } else {
            CachedActivity::default()
        };

        Ok(Self { path, contents })
    }

    pub fn save(&self) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(&self.contents)?;
        fs::write(&self.path, content)
            .with_context(|| format!("Failed to write {}", self.path.display()))?;
        info!("Saved collected activity to {}", self.path.display());
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn saved_at(&self) -> Option<DateTime<Utc>> {
        self.contents.saved_at
    }

    pub fn store(&mut self, report: &ActivityReport, saved_at: DateTime<Utc>) {
        for (repo, activity) in &report.repositories {
            self.contents
                .repositories
                .insert(repo.full_id(), activity.clone());
        }
        self.contents.saved_at = Some(saved_at);
    }

    /// Rebuilds the report of `repositories` from the cache.
    ///
    /// Participants excluded by `config` are dropped again, since the exclusion
    /// list may have changed since the data was saved. Label changes cannot be
    /// applied to cached counts.
    pub fn report(
        &self,
        repositories: &[RepoId],
        config: &ScoringConfig,
    ) -> anyhow::Result<ActivityReport> {
        let mut collected = Vec::with_capacity(repositories.len());
        for repo in repositories {
            let Some(activity) = self.contents.repositories.get(&repo.full_id()) else {
                bail!(
                    "{repo} is not in the activity cache {}. Run once without --use-cache to collect it",
                    self.path.display()
                );
            };
            let activity: RepositoryActivity = activity
                .iter()
                .filter(|(login, _)| !config.is_excluded(login))
                .map(|(login, record)| (login.clone(), *record))
                .collect();
            collected.push((repo.clone(), activity));
        }

        Ok(ActivityReport::from_repositories(collected))
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use shared::{ActivityRecord, Bucket};

    use super::*;

    fn activity(entries: &[(&str, Bucket)]) -> RepositoryActivity {
        let mut activity = RepositoryActivity::new();
        for (login, bucket) in entries {
            activity
                .entry(login.to_string())
                .or_insert_with(ActivityRecord::default)
                .record(*bucket);
        }
        activity
    }

    fn collected() -> ActivityReport {
        ActivityReport::from_repositories(vec![
            (
                RepoId::new("org", "one"),
                activity(&[("alice", Bucket::PrFeatureBug), ("bob", Bucket::IssueDoc)]),
            ),
            (
                RepoId::new("org", "two"),
                activity(&[("alice", Bucket::PrDoc)]),
            ),
        ])
    }

    #[test]
    fn saved_report_is_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache").join("activity.json");
        let saved_at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();

        let mut cache = ActivityCache::load(&path).unwrap();
        cache.store(&collected(), saved_at);
        cache.save().unwrap();

        let cache = ActivityCache::load(&path).unwrap();
        assert_eq!(cache.saved_at(), Some(saved_at));

        let repositories = [RepoId::new("org", "one"), RepoId::new("org", "two")];
        let report = cache
            .report(&repositories, &ScoringConfig::default())
            .unwrap();
        assert_eq!(report, collected());
        assert_eq!(
            report.total.unwrap()["alice"].pull_requests.doc,
            1
        );
    }

    #[test]
    fn later_runs_keep_other_repositories() {
        let mut cache = ActivityCache::default();
        cache.store(&collected(), Utc::now());

        let rerun = ActivityReport::from_repositories(vec![(
            RepoId::new("org", "two"),
            activity(&[("carol", Bucket::PrTypo)]),
        )]);
        cache.store(&rerun, Utc::now());

        let report = cache
            .report(&[RepoId::new("org", "one")], &ScoringConfig::default())
            .unwrap();
        assert!(report.repositories[0].1.contains_key("bob"));
        assert!(report.total.is_none());

        let report = cache
            .report(&[RepoId::new("org", "two")], &ScoringConfig::default())
            .unwrap();
        assert!(report.repositories[0].1.contains_key("carol"));
        assert!(!report.repositories[0].1.contains_key("alice"));
    }

    #[test]
    fn uncached_repository_is_an_error() {
        let mut cache = ActivityCache::default();
        cache.store(&collected(), Utc::now());

        let error = cache
            .report(&[RepoId::new("org", "three")], &ScoringConfig::default())
            .unwrap_err();
        assert!(error.to_string().contains("org/three"));
    }

    #[test]
    fn current_exclusions_apply_to_cached_data() {
        let mut cache = ActivityCache::default();
        cache.store(&collected(), Utc::now());
        let config = ScoringConfig::from_toml_str(r#"exclude_users = ["bob"]"#).unwrap();

        let report = cache
            .report(&[RepoId::new("org", "one")], &config)
            .unwrap();
        assert!(!report.repositories[0].1.contains_key("bob"));
        assert!(report.repositories[0].1.contains_key("alice"));
    }
}

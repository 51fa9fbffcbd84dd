use futures::future::join_all;
use thiserror::Error;
use tracing::{debug, info, instrument};

use super::*;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IngestError {
    #[error("repository {repository} was not found")]
    NotFound { repository: RepoId },
    #[error("GitHub API rate limit exceeded while reading {repository}")]
    RateLimited { repository: RepoId },
    #[error("authentication failed while reading {repository}")]
    AuthFailure { repository: RepoId },
    #[error("network or GitHub server failure while reading {repository}: {message}")]
    TransportFailure { repository: RepoId, message: String },
    #[error("GitHub API returned status {status} while reading {repository}: {message}")]
    UnexpectedUpstream {
        repository: RepoId,
        status: u16,
        message: String,
    },
}

impl IngestError {
    pub fn repository(&self) -> &RepoId {
        match self {
            IngestError::NotFound { repository }
            | IngestError::RateLimited { repository }
            | IngestError::AuthFailure { repository }
            | IngestError::TransportFailure { repository, .. }
            | IngestError::UnexpectedUpstream { repository, .. } => repository,
        }
    }

    /// Hint on how the user can get past the failure.
    pub fn remedy(&self) -> &'static str {
        match self {
            IngestError::NotFound { .. } => "Check that the repository exists and is spelled as owner/repo.",
            IngestError::RateLimited { .. } => {
                "Run again with a GitHub token (--api-key or GITHUB_TOKEN), wait for the limit to reset, or reuse the last collected activity with --use-cache."
            }
            IngestError::AuthFailure { .. } => {
                "The token is invalid or expired. Issue a new one in the GitHub settings."
            }
            IngestError::TransportFailure { .. } => {
                "Check the network connection and try again later."
            }
            IngestError::UnexpectedUpstream { .. } => {
                "If the problem persists, check https://www.githubstatus.com."
            }
        }
    }
}

/// Counted items of one repository, reported in the debug log.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestStats {
    pub items: usize,
    pub feature_prs: u32,
    pub doc_prs: u32,
    pub feature_issues: u32,
    pub doc_issues: u32,
}

impl IngestStats {
    fn count(&mut self, bucket: Bucket) {
        match bucket {
            Bucket::PrFeatureBug => self.feature_prs += 1,
            Bucket::PrDoc | Bucket::PrTypo => self.doc_prs += 1,
            Bucket::IssueFeatureBug => self.feature_issues += 1,
            Bucket::IssueDoc => self.doc_issues += 1,
        }
    }
}

/// Raw activity of every analyzed repository.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActivityReport {
    /// In the order the repositories were requested.
    pub repositories: Vec<(RepoId, RepositoryActivity)>,
    /// Present only when two or more repositories were analyzed.
    pub total: Option<RepositoryActivity>,
}

impl ActivityReport {
    /// Builds a report from finished per-repository maps, summing the total when
    /// two or more repositories are given.
    pub fn from_repositories(repositories: Vec<(RepoId, RepositoryActivity)>) -> Self {
        let total = (repositories.len() >= 2).then(|| {
            let mut total = RepositoryActivity::new();
            for (_, activity) in &repositories {
                for (login, record) in activity {
                    total.entry(login.clone()).or_default().merge(record);
                }
            }
            total
        });

        Self {
            repositories,
            total,
        }
    }

    /// Every map with its display label: `owner/repo` or [`TOTAL_LABEL`].
    pub fn labelled(&self) -> impl Iterator<Item = (String, &RepositoryActivity)> {
        self.repositories
            .iter()
            .map(|(repo, activity)| (repo.full_id(), activity))
            .chain(
                self.total
                    .iter()
                    .map(|activity| (TOTAL_LABEL.to_string(), activity)),
            )
    }
}

pub struct Collector<S> {
    source: S,
    config: ScoringConfig,
}

impl<S: ActivitySource> Collector<S> {
    pub fn new(source: S, config: ScoringConfig) -> Self {
        Self { source, config }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Ingests every repository concurrently.
    ///
    /// All repositories run to completion before the result is decided; the first
    /// failure in request order is returned and no partial report is produced.
    #[instrument(skip(self, repositories), fields(repositories = repositories.len()))]
    pub async fn collect(&self, repositories: &[RepoId]) -> Result<ActivityReport, IngestError> {
        info!("Collecting PRs and issues...");
        let totals = (repositories.len() >= 2).then(ActivityTotals::new);

        let results = join_all(
            repositories
                .iter()
                .map(|repo| self.collect_repository(repo, totals.as_ref())),
        )
        .await;

        let mut collected = Vec::with_capacity(repositories.len());
        for (repo, result) in repositories.iter().zip(results) {
            collected.push((repo.clone(), result?));
        }

        Ok(ActivityReport {
            repositories: collected,
            total: totals.map(ActivityTotals::into_inner),
        })
    }

    #[instrument(skip(self, repository, totals), fields(repository = %repository))]
    pub async fn collect_repository(
        &self,
        repository: &RepoId,
        totals: Option<&ActivityTotals>,
    ) -> Result<RepositoryActivity, IngestError> {
        let mut activity = RepositoryActivity::new();
        let mut stats = IngestStats::default();
        let mut page = 1;

        loop {
            let items = self
                .source
                .list_activity(repository, page, PAGE_SIZE)
                .await
                .map_err(|e| e.for_repository(repository))?;

            for item in &items {
                self.ingest(item, &mut activity, totals, &mut stats);
            }

            if items.len() < PAGE_SIZE as usize {
                break;
            }
            page += 1;
        }

        debug!(
            "{repository}: {} items, {} bug/feat PRs, {} doc PRs, {} bug/feat issues, {} doc issues",
            stats.items, stats.feature_prs, stats.doc_prs, stats.feature_issues, stats.doc_issues
        );

        Ok(activity)
    }

    fn ingest(
        &self,
        item: &ActivityItem,
        activity: &mut RepositoryActivity,
        totals: Option<&ActivityTotals>,
        stats: &mut IngestStats,
    ) {
        stats.items += 1;
        if self.config.is_excluded(&item.author) {
            return;
        }

        let record = activity.entry(item.author.clone()).or_default();
        if let Some(totals) = totals {
            totals.ensure_participant(&item.author);
        }

        let Some(bucket) = item.bucket(&self.config.labels) else {
            return;
        };

        record.record(bucket);
        if let Some(totals) = totals {
            totals.record(&item.author, bucket);
        }
        stats.count(bucket);
    }
}

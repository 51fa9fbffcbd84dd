use std::sync::Arc;

use anyhow::Context;
use octocrab::models::RateLimit;
use serde::{Deserialize, Serialize};
use shared::{ActivityItem, ActivitySource, GithubHandle, RepoId, SourceError};
use tracing::{debug, info, instrument, warn};

pub use shared::github::*;

pub mod prometheus;

use prometheus::PrometheusClient;

/// Why the authenticated-user endpoint rejected the configured token.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("GitHub token is invalid or expired")]
    Invalid,
    #[error("GitHub API rate limit exceeded while validating the token")]
    RateLimited,
    #[error("GitHub user endpoint was not found")]
    EndpointNotFound,
    #[error("unexpected GitHub response while validating the token (status {status}): {message}")]
    Unexpected { status: u16, message: String },
}

pub fn token_error_from_status(status: u16, message: String) -> TokenError {
    match status {
        401 => TokenError::Invalid,
        403 => TokenError::RateLimited,
        404 => TokenError::EndpointNotFound,
        _ => TokenError::Unexpected { status, message },
    }
}

#[derive(Clone)]
pub struct GithubClient {
    octocrab: octocrab::Octocrab,
    prometheus: Arc<PrometheusClient>,
    authenticated: bool,
}

#[derive(Serialize)]
struct IssueListParams {
    state: &'static str,
    per_page: u32,
    page: u32,
}

#[derive(Deserialize)]
struct Profile {
    name: Option<String>,
}

impl GithubClient {
    pub fn new(
        github_token: Option<String>,
        prometheus: Arc<PrometheusClient>,
    ) -> anyhow::Result<Self> {
        let authenticated = github_token.is_some();
        let builder = octocrab::Octocrab::builder();
        let octocrab = match github_token {
            Some(token) => builder.personal_token(token).build()?,
            None => builder.build()?,
        };

        Ok(Self {
            octocrab,
            prometheus,
            authenticated,
        })
    }

    /// Checks the configured token against the authenticated-user endpoint.
    ///
    /// Returns the token owner's login, or `None` for an unauthenticated client.
    #[instrument(skip(self))]
    pub async fn validate_token(&self) -> anyhow::Result<Option<GithubHandle>> {
        if !self.authenticated {
            warn!("No GitHub token configured. Running unauthenticated with a reduced rate limit");
            return Ok(None);
        }

        self.prometheus.add_read_request();
        match self.octocrab.current().user().await {
            Ok(user) => {
                info!("Authenticated as {}", user.login);
                Ok(Some(user.login))
            }
            Err(octocrab::Error::GitHub { source, .. }) => Err(token_error_from_status(
                source.status_code.as_u16(),
                source.message.clone(),
            )
            .into()),
            Err(e) => Err(e).context("Failed to reach GitHub while validating the token"),
        }
    }

    /// Display name from the user's public profile.
    #[instrument(skip(self))]
    pub async fn get_user_name(&self, login: &str) -> Result<Option<String>, SourceError> {
        self.prometheus.add_read_request();
        let profile: Profile = self
            .octocrab
            .get(format!("/users/{login}"), None::<&()>)
            .await?;
        Ok(profile.name.filter(|name| !name.trim().is_empty()))
    }

    pub async fn get_rate_limits(&self) -> anyhow::Result<RateLimit> {
        Ok(self.octocrab.ratelimit().get().await?)
    }

    /// Logs the remaining core budget and updates the usage gauge.
    pub async fn report_rate_limit(&self) -> anyhow::Result<()> {
        let core = self.get_rate_limits().await?.resources.core;
        self.prometheus.set_rate_limit_used(core.used as i64);
        info!(
            "GitHub rate limit: {} of {} requests remaining",
            core.remaining, core.limit
        );
        Ok(())
    }
}

#[async_trait::async_trait]
impl ActivitySource for GithubClient {
    #[instrument(skip(self, repository), fields(repository = %repository))]
    async fn list_activity(
        &self,
        repository: &RepoId,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<ActivityItem>, SourceError> {
        let params = IssueListParams {
            state: "all",
            per_page,
            page,
        };

        self.prometheus.add_read_request();
        let entries: Vec<IssueListItem> = self
            .octocrab
            .get(
                format!("/repos/{}/{}/issues", repository.owner, repository.repo),
                Some(&params),
            )
            .await?;

        let items: Vec<ActivityItem> = entries.into_iter().map(ActivityItem::from).collect();
        debug!("Page {page}: received {} items", items.len());
        self.prometheus.record_items(repository, &items);

        Ok(items)
    }
}

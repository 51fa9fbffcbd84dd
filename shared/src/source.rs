use thiserror::Error;

use super::*;

/// Largest page GitHub serves for issue listings.
pub const PAGE_SIZE: u32 = 100;

/// Failure reported by an [`ActivitySource`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SourceError {
    #[error("not found")]
    NotFound,
    #[error("API rate limit exceeded")]
    RateLimited,
    #[error("authentication failed")]
    AuthFailure,
    #[error("network or server failure: {0}")]
    TransportFailure(String),
    #[error("unexpected response (status {status}): {message}")]
    UnexpectedUpstream { status: u16, message: String },
}

impl SourceError {
    pub fn for_repository(self, repository: &RepoId) -> IngestError {
        let repository = repository.clone();
        match self {
            SourceError::NotFound => IngestError::NotFound { repository },
            SourceError::RateLimited => IngestError::RateLimited { repository },
            SourceError::AuthFailure => IngestError::AuthFailure { repository },
            SourceError::TransportFailure(message) => IngestError::TransportFailure {
                repository,
                message,
            },
            SourceError::UnexpectedUpstream { status, message } => {
                IngestError::UnexpectedUpstream {
                    repository,
                    status,
                    message,
                }
            }
        }
    }
}

/// Paginated listing of a repository's pull requests and issues.
#[async_trait::async_trait]
pub trait ActivitySource: Send + Sync {
    /// `page` starts at 1. A page shorter than `per_page` is the last one.
    async fn list_activity(
        &self,
        repository: &RepoId,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<ActivityItem>, SourceError>;
}

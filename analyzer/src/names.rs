use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use anyhow::{bail, Context};
use shared::{GithubHandle, SourceError};
use tracing::{debug, info, warn};

use crate::api::GithubClient;

/// Stored for logins whose profile has no name or could not be read.
pub const UNKNOWN_NAME: &str = "*";

#[async_trait::async_trait]
pub trait NameLookup: Send + Sync {
    async fn user_name(&self, login: &str) -> Result<Option<String>, SourceError>;
}

#[async_trait::async_trait]
impl NameLookup for GithubClient {
    async fn user_name(&self, login: &str) -> Result<Option<String>, SourceError> {
        self.get_user_name(login).await
    }
}

/// Login to display name map persisted as pretty-printed JSON.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserNameCache {
    path: PathBuf,
    names: BTreeMap<GithubHandle, String>,
}

impl UserNameCache {
    /// A missing file gives an empty cache.
    pub fn load(path: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let path = path.into();
        let names = if path.exists() {
            let content = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse {}", path.display()))?
        } else {
            BTreeMap::new()
        };

        Ok(Self { path, names })
    }

    pub fn save(&self) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(&self.names)?;
        fs::write(&self.path, content)
            .with_context(|| format!("Failed to write {}", self.path.display()))?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self, login: &str) -> Option<&str> {
        self.names.get(login).map(String::as_str)
    }

    pub fn insert(&mut self, login: impl Into<GithubHandle>, name: impl Into<String>) {
        self.names.insert(login.into(), name.into());
    }

    /// `login (Name)` when a real name is cached, the bare login otherwise.
    pub fn display(&self, login: &str) -> String {
        match self.get(login) {
            Some(name) if name != UNKNOWN_NAME => format!("{login} ({name})"),
            _ => login.to_string(),
        }
    }

    /// Looks up every login not cached yet and returns how many were added.
    ///
    /// A rate-limited lookup aborts the resolution. Other failures cache the
    /// placeholder name so the login is not retried on later runs.
    pub async fn resolve<'a, L: NameLookup>(
        &mut self,
        lookup: &L,
        logins: impl IntoIterator<Item = &'a str>,
    ) -> anyhow::Result<usize> {
        let mut added = 0;
        for login in logins {
            if self.names.contains_key(login) {
                continue;
            }

            let name = match lookup.user_name(login).await {
                Ok(Some(name)) => name,
                Ok(None) => UNKNOWN_NAME.to_string(),
                Err(SourceError::RateLimited) => {
                    bail!("GitHub API rate limit exceeded while resolving the name of {login}")
                }
                Err(e) => {
                    warn!("Failed to get the name of {login}: {e}");
                    UNKNOWN_NAME.to_string()
                }
            };

            debug!("{login}: {name}");
            self.names.insert(login.to_string(), name);
            added += 1;
        }

        if added > 0 {
            info!("Resolved {added} user names");
        }
        Ok(added)
    }
}

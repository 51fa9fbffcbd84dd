use std::{
    collections::BTreeSet,
    fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::*;

pub const DEFAULT_EXCLUDED_USERS: [&str; 2] = ["kyagrd", "kyahnu"];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid repository identifier `{0}`, expected `owner/repo`")]
    InvalidRepository(String),
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Who is left out of the ranking and which labels count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub exclude_users: BTreeSet<GithubHandle>,
    pub labels: LabelVocabulary,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            exclude_users: DEFAULT_EXCLUDED_USERS
                .iter()
                .map(ToString::to_string)
                .collect(),
            labels: LabelVocabulary::default(),
        }
    }
}

impl ScoringConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn is_excluded(&self, login: &str) -> bool {
        self.exclude_users.contains(login)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = ScoringConfig::default();
        assert!(config.is_excluded("kyagrd"));
        assert!(config.is_excluded("kyahnu"));
        assert!(!config.is_excluded("alice"));
        assert_eq!(config.labels, LabelVocabulary::default());
    }

    #[test]
    fn partial_config_keeps_default_labels() {
        let config = ScoringConfig::from_toml_str(r#"exclude_users = ["prof"]"#).unwrap();
        assert!(config.is_excluded("prof"));
        assert!(!config.is_excluded("kyagrd"));
        assert_eq!(config.labels, LabelVocabulary::default());
    }

    #[test]
    fn label_overrides() {
        let config = ScoringConfig::from_toml_str(
            r#"
            [labels]
            feature_bug = ["feat", "fix"]
            "#,
        )
        .unwrap();
        assert_eq!(config.labels.feature_bug, vec!["feat", "fix"]);
        assert_eq!(config.labels.documentation, vec!["documentation"]);
        assert!(config.is_excluded("kyahnu"));
    }

    #[test]
    fn invalid_toml_is_reported() {
        assert!(matches!(
            ScoringConfig::from_toml_str("exclude_users = 5"),
            Err(ConfigError::Parse(_))
        ));
    }
}

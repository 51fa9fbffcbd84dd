use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use serde::Deserialize;
use shared::RepoId;

/// Scores contributors of GitHub repositories by their merged pull requests and
/// completed issues.
#[derive(Parser, Debug)]
#[command(name = "contribution-score", version, about)]
pub struct Args {
    /// Repositories to analyze, as `owner/repo`
    #[arg(required = true, value_parser = parse_repository)]
    pub repositories: Vec<RepoId>,

    /// GitHub token; overrides GITHUB_TOKEN
    #[arg(short = 'a', long = "api-key")]
    pub api_key: Option<String>,

    /// Directory the reports are written to
    #[arg(short, long, default_value = "results")]
    pub output: PathBuf,

    #[arg(short, long, value_enum, default_value_t = OutputFormat::All)]
    pub format: OutputFormat,

    /// TOML file with excluded users and label names
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Show display names next to logins
    #[arg(long)]
    pub user_names: bool,

    /// Cache of resolved display names
    #[arg(long, default_value = "user_info.json")]
    pub user_info: PathBuf,

    /// Collected activity, written after every successful run
    #[arg(long, default_value = "activity_cache.json")]
    pub cache: PathBuf,

    /// Report from the activity cache instead of reading GitHub
    #[arg(long)]
    pub use_cache: bool,

    /// Write API usage metrics in OpenMetrics text format
    #[arg(long)]
    pub metrics: Option<PathBuf>,

    /// Debug logging when RUST_LOG is unset
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Csv,
    All,
}

impl OutputFormat {
    pub fn includes_table(self) -> bool {
        matches!(self, OutputFormat::Table | OutputFormat::All)
    }

    pub fn includes_csv(self) -> bool {
        matches!(self, OutputFormat::Csv | OutputFormat::All)
    }
}

#[derive(Deserialize, Debug, Default)]
pub struct Env {
    pub github_token: Option<String>,
}

fn parse_repository(value: &str) -> Result<RepoId, String> {
    value.parse::<RepoId>().map_err(|e| e.to_string())
}

impl Args {
    /// The command-line key wins over the environment.
    pub fn token(&self, env: &Env) -> Option<String> {
        self.api_key
            .clone()
            .or_else(|| env.github_token.clone())
            .filter(|token| !token.trim().is_empty())
    }

    /// Repositories in the given order with repeats removed.
    pub fn unique_repositories(&self) -> (Vec<RepoId>, Vec<RepoId>) {
        let mut unique: Vec<RepoId> = Vec::with_capacity(self.repositories.len());
        let mut repeated = Vec::new();
        for repo in &self.repositories {
            if unique.contains(repo) {
                repeated.push(repo.clone());
            } else {
                unique.push(repo.clone());
            }
        }
        (unique, repeated)
    }
}

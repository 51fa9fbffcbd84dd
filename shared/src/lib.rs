mod activity;
mod collector;
mod config;
mod label;
mod ranking;
mod repo;
mod score;
mod source;

#[cfg(feature = "github")]
pub mod github;

pub use activity::*;
pub use collector::*;
pub use config::*;
pub use label::*;
pub use ranking::*;
pub use repo::*;
pub use score::*;
pub use source::*;

pub type GithubHandle = String;

/// Label of the synthetic map that sums every repository of a run.
pub const TOTAL_LABEL: &str = "total";

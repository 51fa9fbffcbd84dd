use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use contribution_score::{
    api::{prometheus::PrometheusClient, GithubClient},
    cache::ActivityCache,
    cli::{Args, Env},
    names::UserNameCache,
    report::ReportWriter,
};
use shared::{Collector, IngestError, RepositoryScoreTable, ScoringConfig};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let env = envy::from_env::<Env>()?;
    let args = Args::parse();

    let filter = match std::env::var(EnvFilter::DEFAULT_ENV) {
        Ok(_) => EnvFilter::from_default_env(),
        Err(_) if args.verbose => EnvFilter::new("debug"),
        Err(_) => EnvFilter::new("info"),
    };
    let subscriber = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer());
    tracing::subscriber::set_global_default(subscriber)?;

    let config = match &args.config {
        Some(path) => ScoringConfig::load(path)?,
        None => ScoringConfig::default(),
    };

    let (repositories, repeated) = args.unique_repositories();
    for repo in repeated {
        warn!("{repo} was given more than once. Analyzing it once");
    }

    let prometheus: Arc<PrometheusClient> = Default::default();
    let github_api = GithubClient::new(args.token(&env), prometheus.clone())?;

    let report = if args.use_cache {
        let cache = ActivityCache::load(&args.cache)?;
        match cache.saved_at() {
            Some(saved_at) => info!("Using activity cached at {saved_at}"),
            None => warn!("Activity cache {} is empty", cache.path().display()),
        }
        cache.report(&repositories, &config)?
    } else {
        github_api.validate_token().await?;
        if let Err(e) = github_api.report_rate_limit().await {
            warn!("Failed to get the rate limit: {e}");
        }

        let collector = Collector::new(github_api.clone(), config);
        let report = match collector.collect(&repositories).await {
            Ok(report) => report,
            Err(e) => {
                print_ingest_error(&e);
                write_metrics(&args, &prometheus)?;
                return Err(e.into());
            }
        };

        let mut cache = ActivityCache::load(&args.cache)?;
        cache.store(&report, chrono::Utc::now());
        cache.save()?;
        report
    };

    let tables = report
        .labelled()
        .map(|(label, activity)| {
            let scores = RepositoryScoreTable::from_activity(activity);
            match scores.average_score() {
                Some(average) => info!("{label}: average score {average:.2}"),
                None => info!("{label}: no contributions"),
            }
            (label, activity, scores)
        })
        .collect::<Vec<_>>();

    let names = if args.user_names {
        let mut names = UserNameCache::load(&args.user_info)?;
        let logins = tables
            .iter()
            .flat_map(|(_, activity, _)| activity.keys().map(String::as_str));
        let resolved = names.resolve(&github_api, logins).await;
        names
            .save()
            .with_context(|| format!("Failed to save {}", names.path().display()))?;
        resolved?;
        Some(names)
    } else {
        None
    };

    let writer = ReportWriter {
        output: &args.output,
        format: args.format,
        names: names.as_ref(),
        generated_at: chrono::Utc::now(),
    };
    for (label, activity, scores) in &tables {
        writer.write(label, activity, scores)?;
    }

    if !args.use_cache {
        if let Err(e) = github_api.report_rate_limit().await {
            warn!("Failed to get the rate limit: {e}");
        }
    }
    write_metrics(&args, &prometheus)?;

    info!("Done");
    Ok(())
}

fn print_ingest_error(e: &IngestError) {
    error!("Failed to analyze {}", e.repository());
    eprintln!("Hint: {}", e.remedy());
}

fn write_metrics(args: &Args, prometheus: &PrometheusClient) -> anyhow::Result<()> {
    if let Some(path) = &args.metrics {
        let body = prometheus.encode()?;
        std::fs::write(path, body)
            .with_context(|| format!("Failed to write metrics to {}", path.display()))?;
        info!("Saved metrics to {}", path.display());
    }
    Ok(())
}

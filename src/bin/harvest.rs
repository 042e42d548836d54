use clap::Parser;
use itertools::Itertools;
use octoharvest::config::{self, HarvestConfig};
use octoharvest::process::DEFAULT_REPO_CAP;
use octoharvest::rate_limit::DEFAULT_CALLS_PER_WINDOW;
use octoharvest::schedule::DEFAULT_CONCURRENCY;
use std::sync::Arc;
use std::time::Duration;

/// Exit status when the dataset was written but some users are missing from it
const PARTIAL_EXIT_CODE: i32 = 2;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let opts: Opts = Opts::parse();
    let _ = octoharvest::cli::init_logging(opts.verbose);

    let config = HarvestConfig {
        city: opts.city,
        min_followers: opts.min_followers,
        concurrency: opts.concurrency,
        repo_cap: opts.repo_cap,
        calls_per_window: opts.calls_per_minute,
        api_base: opts.api_base,
        ..HarvestConfig::default()
    };

    if opts.token.is_none() {
        log::warn!("No token provided; anonymous requests are heavily rate limited");
    }

    let client = Arc::new(octoharvest::init(&config, opts.token.as_deref())?);

    // Only a search that never succeeds is fatal, so it's the one thing worth retrying
    let stubs = tryhard::retry_fn(|| octoharvest::search(client.as_ref(), &config))
        .retries(opts.search_retries)
        .exponential_backoff(Duration::from_secs(2))
        .max_delay(Duration::from_secs(60))
        .await?;

    if stubs.is_empty() {
        log::warn!("No users found in {}", config.city);
    } else {
        log::info!(
            "Found {} users in {} with at least {} followers",
            stubs.len(),
            config.city,
            config.min_followers
        );
    }

    let total = stubs.len();
    let harvest = octoharvest::collect(client, &config, stubs).await;

    log::info!(
        "Saving {} users and {} repositories to {}",
        harvest.dataset.users.len(),
        harvest.dataset.repositories.len(),
        opts.output_dir
    );
    harvest.dataset.save(&opts.output_dir)?;

    if !harvest.degraded.is_empty() {
        log::warn!(
            "{} users have incomplete repository listings",
            harvest.degraded.len()
        );
    }

    let failures_by_kind = harvest
        .failures
        .iter()
        .map(|error| error.kind())
        .sorted()
        .group_by(|kind| *kind);

    for (kind, failures) in failures_by_kind.into_iter() {
        log::error!("{} of {} users failed: {}", failures.count(), total, kind);
    }

    if harvest.failures.is_empty() {
        Ok(())
    } else {
        std::process::exit(PARTIAL_EXIT_CODE)
    }
}

#[derive(Parser)]
#[clap(name = "harvest", version, author)]
/// Collect GitHub users in a city and their repositories as CSV
struct Opts {
    /// A GitHub personal access token
    #[clap(short, long, env = "GITHUB_TOKEN", hide_env_values = true)]
    token: Option<String>,
    #[clap(short, long, parse(from_occurrences))]
    /// Logging verbosity
    verbose: i32,
    /// The location to search for
    #[clap(long, default_value_t = String::from(config::DEFAULT_CITY))]
    city: String,
    /// Minimum number of followers
    #[clap(long, default_value_t = config::DEFAULT_MIN_FOLLOWERS)]
    min_followers: u32,
    /// Number of users processed at once
    #[clap(long, default_value_t = DEFAULT_CONCURRENCY)]
    concurrency: usize,
    /// Maximum number of repositories collected per user
    #[clap(long, default_value_t = DEFAULT_REPO_CAP)]
    repo_cap: usize,
    /// Maximum number of API calls per minute
    #[clap(long, default_value_t = DEFAULT_CALLS_PER_WINDOW)]
    calls_per_minute: u32,
    /// How many times to retry a search that fails on its first page
    #[clap(long, default_value_t = 3)]
    search_retries: u32,
    /// Directory for users.csv and repositories.csv
    #[clap(short, long, default_value = ".")]
    output_dir: String,
    #[clap(long, default_value_t = String::from(config::DEFAULT_API_BASE))]
    api_base: String,
}

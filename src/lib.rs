pub mod cli;
pub mod config;
pub mod fetch;
pub mod github;
pub mod models;
pub mod normalize;
pub mod output;
pub mod paginate;
pub mod process;
pub mod rate_limit;
pub mod schedule;

use config::HarvestConfig;
use fetch::{ClientError, FetchError, HttpFetcher};
use github::{Api, GitHubClient, SearchQuery};
use models::RawUserStub;
use process::UserProcessor;
use schedule::{FanOutScheduler, Harvest};
use std::sync::Arc;

pub use schedule::Dataset;

#[derive(Debug, thiserror::Error)]
pub enum HarvestError {
    #[error("search failed before any results: {0}")]
    Search(#[from] FetchError),
    #[error(transparent)]
    Client(#[from] ClientError),
    #[error("could not write dataset: {0}")]
    Csv(#[from] csv::Error),
}

/// Initialize a rate-limited client from the configuration
///
/// Requests are anonymous without a token. A token that can't be sent as a
/// header is an error rather than silently dropped.
pub fn init(config: &HarvestConfig, token: Option<&str>) -> Result<GitHubClient, HarvestError> {
    let fetcher = HttpFetcher::new(token, config.rate_limiter(), config.request_timeout)?;

    Ok(GitHubClient::new(&config.api_base, fetcher))
}

/// Find the users matching the configured city and follower threshold
pub async fn search<A: Api + ?Sized>(
    api: &A,
    config: &HarvestConfig,
) -> Result<Vec<RawUserStub>, HarvestError> {
    let query = SearchQuery::new(&config.city, config.min_followers);
    log::info!("Searching for users matching \"{}\"", query);

    Ok(github::search_users(api, &query).await?)
}

/// Process each user with the configured concurrency and repository cap
pub async fn collect<A: Api + ?Sized>(
    api: Arc<A>,
    config: &HarvestConfig,
    stubs: Vec<RawUserStub>,
) -> Harvest {
    let processor = UserProcessor::new(api, config.repo_cap);

    FanOutScheduler::new(processor, config.concurrency)
        .run(stubs)
        .await
}

/// Search, then collect every user found
pub async fn harvest<A: Api + ?Sized>(
    api: Arc<A>,
    config: &HarvestConfig,
) -> Result<Harvest, HarvestError> {
    let stubs = search(api.as_ref(), config).await?;
    log::info!("Found {} users", stubs.len());

    Ok(collect(api, config, stubs).await)
}

use crate::process::DEFAULT_REPO_CAP;
use crate::rate_limit::{RateLimiter, DEFAULT_CALLS_PER_WINDOW, DEFAULT_WINDOW};
use crate::schedule::DEFAULT_CONCURRENCY;
use std::time::Duration;

pub const DEFAULT_API_BASE: &str = "https://api.github.com";
pub const DEFAULT_CITY: &str = "Berlin";
pub const DEFAULT_MIN_FOLLOWERS: u32 = 200;
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Settings for one harvest run
#[derive(Clone, Debug, PartialEq)]
pub struct HarvestConfig {
    pub api_base: String,
    pub city: String,
    pub min_followers: u32,
    pub concurrency: usize,
    pub repo_cap: usize,
    pub calls_per_window: u32,
    pub window: Duration,
    pub request_timeout: Duration,
}

impl HarvestConfig {
    pub fn rate_limiter(&self) -> RateLimiter {
        RateLimiter::new(self.calls_per_window, self.window)
    }
}

impl Default for HarvestConfig {
    fn default() -> Self {
        HarvestConfig {
            api_base: DEFAULT_API_BASE.to_string(),
            city: DEFAULT_CITY.to_string(),
            min_followers: DEFAULT_MIN_FOLLOWERS,
            concurrency: DEFAULT_CONCURRENCY,
            repo_cap: DEFAULT_REPO_CAP,
            calls_per_window: DEFAULT_CALLS_PER_WINDOW,
            window: DEFAULT_WINDOW,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

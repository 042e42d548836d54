use crate::rate_limit::RateLimiter;
use reqwest::header::{
    HeaderMap, HeaderValue, InvalidHeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT,
};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;

const ACCEPT_VALUE: &str = "application/vnd.github.v3+json";
const USER_AGENT_VALUE: &str = concat!("octoharvest/", env!("CARGO_PKG_VERSION"));

/// Failure of a single outbound call
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("unexpected status: {0}")]
    Status(StatusCode),
    #[error("undecodable body: {0}")]
    Decode(#[from] serde_json::Error),
}

impl FetchError {
    pub fn kind(&self) -> &'static str {
        match self {
            FetchError::Transport(_) => "transport",
            FetchError::Status(_) => "status",
            FetchError::Decode(_) => "decode",
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(error: reqwest::Error) -> Self {
        FetchError::Transport(error.to_string())
    }
}

/// Failure to set up the fetcher
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("token is not a valid header value")]
    Credential(#[from] InvalidHeaderValue),
    #[error("could not build HTTP client: {0}")]
    Http(#[from] reqwest::Error),
}

/// Classify a completed response
pub fn decode_response<T: DeserializeOwned>(
    status: StatusCode,
    body: &[u8],
) -> Result<T, FetchError> {
    if status.is_success() {
        Ok(serde_json::from_slice(body)?)
    } else {
        Err(FetchError::Status(status))
    }
}

/// Issues single rate-limited GET requests
#[derive(Clone, Debug)]
pub struct HttpFetcher {
    client: Client,
    limiter: RateLimiter,
}

impl HttpFetcher {
    /// Build a fetcher whose requests carry the credential and API version headers
    pub fn new(
        token: Option<&str>,
        limiter: RateLimiter,
        timeout: Duration,
    ) -> Result<HttpFetcher, ClientError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_VALUE));
        headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));

        if let Some(token) = token {
            let mut value = HeaderValue::from_str(&format!("token {}", token))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let client = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        Ok(HttpFetcher { client, limiter })
    }

    pub fn limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    /// Wait for a rate limit slot, then issue one GET and decode the body
    ///
    /// The body of a non-success response is never read.
    pub async fn fetch<T: DeserializeOwned>(
        &self,
        url: &str,
        headers: HeaderMap,
        query: &[(&str, String)],
    ) -> Result<T, FetchError> {
        self.limiter.acquire().await;
        log::debug!("GET {} {:?}", url, query);

        let response = self
            .client
            .get(url)
            .headers(headers)
            .query(query)
            .send()
            .await?;
        let status = response.status();

        if !status.is_success() {
            return Err(FetchError::Status(status));
        }

        let body = response.bytes().await?;
        decode_response(status, &body)
    }
}

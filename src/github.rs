//! The three GitHub endpoints the harvest needs

use crate::fetch::{FetchError, HttpFetcher};
use crate::models::{RawRepository, RawUser, RawUserStub, SearchPage};
use crate::paginate::{Paginator, StopPolicy};
use async_trait::async_trait;
use reqwest::header::HeaderMap;
use std::fmt;

/// The largest page GitHub serves
pub const PAGE_SIZE: u8 = 100;

/// User search by location and minimum follower count
#[derive(Clone, Debug, PartialEq)]
pub struct SearchQuery {
    pub city: String,
    pub min_followers: u32,
}

impl SearchQuery {
    pub fn new(city: &str, min_followers: u32) -> Self {
        SearchQuery {
            city: city.to_string(),
            min_followers,
        }
    }
}

impl fmt::Display for SearchQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Multi-word locations have to be quoted to be matched as one term
        if self.city.contains(char::is_whitespace) {
            write!(f, "location:\"{}\"", self.city)?;
        } else {
            write!(f, "location:{}", self.city)?;
        }
        write!(f, " followers:>={}", self.min_followers)
    }
}

/// Remote operations used by the pipeline, one page or record per call
#[async_trait]
pub trait Api: Send + Sync {
    async fn search_users(
        &self,
        query: &SearchQuery,
        page: u32,
    ) -> Result<Vec<RawUserStub>, FetchError>;

    async fn user(&self, login: &str) -> Result<RawUser, FetchError>;

    /// Repositories most recently pushed first
    async fn user_repos(&self, login: &str, page: u32) -> Result<Vec<RawRepository>, FetchError>;
}

#[derive(Clone, Debug)]
pub struct GitHubClient {
    base_url: String,
    fetcher: HttpFetcher,
}

impl GitHubClient {
    pub fn new(base_url: &str, fetcher: HttpFetcher) -> Self {
        GitHubClient {
            base_url: base_url.trim_end_matches('/').to_string(),
            fetcher,
        }
    }
}

#[async_trait]
impl Api for GitHubClient {
    async fn search_users(
        &self,
        query: &SearchQuery,
        page: u32,
    ) -> Result<Vec<RawUserStub>, FetchError> {
        let url = format!("{}/search/users", self.base_url);
        let params = vec![
            ("q", query.to_string()),
            ("page", page.to_string()),
            ("per_page", PAGE_SIZE.to_string()),
        ];

        let result: SearchPage = self.fetcher.fetch(&url, HeaderMap::new(), &params).await?;
        Ok(result.items)
    }

    async fn user(&self, login: &str) -> Result<RawUser, FetchError> {
        let url = format!("{}/users/{}", self.base_url, login);

        self.fetcher.fetch(&url, HeaderMap::new(), &[]).await
    }

    async fn user_repos(&self, login: &str, page: u32) -> Result<Vec<RawRepository>, FetchError> {
        let url = format!("{}/users/{}/repos", self.base_url, login);
        let params = vec![
            ("sort", "pushed".to_string()),
            ("direction", "desc".to_string()),
            ("per_page", PAGE_SIZE.to_string()),
            ("page", page.to_string()),
        ];

        self.fetcher.fetch(&url, HeaderMap::new(), &params).await
    }
}

/// Collect every user stub the search returns
///
/// Only a search that fails on its first page is an error. Later failures
/// (GitHub stops serving search results after 1000 hits) end the search with
/// what was collected so far.
pub async fn search_users<A: Api + ?Sized>(
    api: &A,
    query: &SearchQuery,
) -> Result<Vec<RawUserStub>, FetchError> {
    let paginator = Paginator::new(|page| api.search_users(query, page), StopPolicy::Search);
    let paged = paginator.collect().await;

    match paged.failure {
        Some(error) if paged.items.is_empty() => Err(error),
        Some(error) => {
            log::warn!(
                "Search for \"{}\" ended early after {} users: {}",
                query,
                paged.items.len(),
                error
            );
            Ok(paged.items)
        }
        None => Ok(paged.items),
    }
}

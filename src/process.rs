use crate::fetch::FetchError;
use crate::github::{Api, PAGE_SIZE};
use crate::models::{RawUserStub, Repository, UserProfile};
use crate::normalize;
use crate::paginate::{Paginator, StopPolicy};
use std::sync::Arc;

pub const DEFAULT_REPO_CAP: usize = 500;

/// A user-level failure; the user is left out of the dataset
#[derive(Debug, thiserror::Error)]
pub enum ProcessError {
    #[error("details for {login} unavailable: {source}")]
    DetailUnavailable { login: String, source: FetchError },
    #[error("processing {login} panicked: {message}")]
    Panicked { login: String, message: String },
}

impl ProcessError {
    pub fn login(&self) -> &str {
        match self {
            ProcessError::DetailUnavailable { login, .. } => login,
            ProcessError::Panicked { login, .. } => login,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ProcessError::DetailUnavailable { source, .. } => match source {
                FetchError::Transport(_) => "detail unavailable (transport)",
                FetchError::Status(_) => "detail unavailable (status)",
                FetchError::Decode(_) => "detail unavailable (decode)",
            },
            ProcessError::Panicked { .. } => "panicked",
        }
    }
}

/// A processed user
///
/// `degraded` holds the failure that cut the repository listing short, in
/// which case `repositories` only has what was fetched before it.
#[derive(Debug)]
pub struct Processed {
    pub profile: UserProfile,
    pub repositories: Vec<Repository>,
    pub degraded: Option<FetchError>,
}

pub struct UserProcessor<A: ?Sized> {
    api: Arc<A>,
    repo_cap: usize,
}

impl<A: Api + ?Sized> UserProcessor<A> {
    pub fn new(api: Arc<A>, repo_cap: usize) -> Self {
        UserProcessor { api, repo_cap }
    }

    /// Fetch details, then repositories, for one user
    pub async fn process(&self, stub: RawUserStub) -> Result<Processed, ProcessError> {
        let login = stub.login;

        let raw_user = self
            .api
            .user(&login)
            .await
            .map_err(|source| ProcessError::DetailUnavailable {
                login: login.clone(),
                source,
            })?;

        let paginator = Paginator::new(
            |page| self.api.user_repos(&login, page),
            StopPolicy::Listing {
                page_size: PAGE_SIZE as usize,
                cap: self.repo_cap,
            },
        );
        let paged = paginator.collect().await;

        if let Some(error) = &paged.failure {
            log::warn!(
                "Repository listing for {} degraded after {} repositories: {}",
                login,
                paged.items.len(),
                error
            );
        }

        let profile = normalize::user_profile(raw_user);
        let repositories = paged
            .items
            .into_iter()
            .map(|raw| normalize::repository(&profile.login, raw))
            .collect();

        Ok(Processed {
            profile,
            repositories,
            degraded: paged.failure,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::github::SearchQuery;
    use crate::models::{RawRepository, RawUser};
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use reqwest::StatusCode;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct Fake {
        detail: Result<(), StatusCode>,
        repo_pages: Vec<Result<usize, StatusCode>>,
        repo_calls: AtomicU32,
    }

    impl Fake {
        fn new(detail: Result<(), StatusCode>, repo_pages: Vec<Result<usize, StatusCode>>) -> Self {
            Fake {
                detail,
                repo_pages,
                repo_calls: AtomicU32::new(0),
            }
        }
    }

    #[async_trait]
    impl Api for Fake {
        async fn search_users(
            &self,
            _query: &SearchQuery,
            _page: u32,
        ) -> Result<Vec<RawUserStub>, FetchError> {
            Ok(vec![])
        }

        async fn user(&self, login: &str) -> Result<RawUser, FetchError> {
            self.detail.map_err(FetchError::Status)?;

            Ok(RawUser {
                login: login.to_string(),
                name: None,
                company: Some(" @acme".to_string()),
                location: Some("Berlin".to_string()),
                email: None,
                hireable: Some(true),
                bio: None,
                public_repos: 3,
                followers: 250,
                following: 1,
                created_at: Utc.with_ymd_and_hms(2015, 3, 1, 12, 0, 0).unwrap(),
            })
        }

        async fn user_repos(
            &self,
            login: &str,
            page: u32,
        ) -> Result<Vec<RawRepository>, FetchError> {
            self.repo_calls.fetch_add(1, Ordering::SeqCst);

            match self.repo_pages.get(page as usize - 1) {
                Some(Ok(size)) => Ok((0..*size)
                    .map(|i| RawRepository {
                        full_name: format!("{}/repo-{}-{}", login, page, i),
                        created_at: Utc.with_ymd_and_hms(2016, 1, 1, 0, 0, 0).unwrap(),
                        stargazers_count: 1,
                        watchers_count: 1,
                        language: Some("Rust".to_string()),
                        has_projects: true,
                        has_wiki: true,
                        license: None,
                    })
                    .collect()),
                Some(Err(status)) => Err(FetchError::Status(*status)),
                None => Ok(vec![]),
            }
        }
    }

    fn stub(login: &str) -> RawUserStub {
        RawUserStub {
            login: login.to_string(),
        }
    }

    #[tokio::test]
    async fn failed_detail_excludes_user_without_listing_repos() {
        let api = Arc::new(Fake::new(Err(StatusCode::NOT_FOUND), vec![Ok(3)]));
        let processor = UserProcessor::new(api.clone(), DEFAULT_REPO_CAP);

        let result = processor.process(stub("gone")).await;

        match result {
            Err(ProcessError::DetailUnavailable { login, source }) => {
                assert_eq!(login, "gone");
                assert!(matches!(source, FetchError::Status(StatusCode::NOT_FOUND)));
            }
            other => panic!("Unexpected result: {:?}", other),
        }
        assert_eq!(api.repo_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn failed_listing_keeps_profile_without_repos() {
        let api = Arc::new(Fake::new(Ok(()), vec![Err(StatusCode::BAD_GATEWAY)]));
        let processor = UserProcessor::new(api, DEFAULT_REPO_CAP);

        let processed = processor.process(stub("alice")).await.unwrap();

        assert_eq!(processed.profile.login, "alice");
        assert_eq!(processed.profile.company, "ACME");
        assert!(processed.repositories.is_empty());
        assert!(matches!(
            processed.degraded,
            Some(FetchError::Status(StatusCode::BAD_GATEWAY))
        ));
    }

    #[tokio::test]
    async fn listing_failing_midway_keeps_earlier_pages() {
        let api = Arc::new(Fake::new(
            Ok(()),
            vec![Ok(100), Err(StatusCode::INTERNAL_SERVER_ERROR)],
        ));
        let processor = UserProcessor::new(api, DEFAULT_REPO_CAP);

        let processed = processor.process(stub("bob")).await.unwrap();

        assert_eq!(processed.repositories.len(), 100);
        assert!(processed.degraded.is_some());
    }

    #[tokio::test]
    async fn repositories_are_owned_by_the_profile() {
        let api = Arc::new(Fake::new(Ok(()), vec![Ok(100), Ok(100), Ok(37)]));
        let processor = UserProcessor::new(api.clone(), DEFAULT_REPO_CAP);

        let processed = processor.process(stub("carol")).await.unwrap();

        assert_eq!(processed.repositories.len(), 237);
        assert!(processed.degraded.is_none());
        assert!(processed
            .repositories
            .iter()
            .all(|repo| repo.login == "carol"));
        assert_eq!(api.repo_calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn repositories_are_capped() {
        let api = Arc::new(Fake::new(Ok(()), vec![Ok(100); 10]));
        let processor = UserProcessor::new(api.clone(), 250);

        let processed = processor.process(stub("dave")).await.unwrap();

        assert_eq!(processed.repositories.len(), 250);
        assert_eq!(api.repo_calls.load(Ordering::SeqCst), 3);
    }
}

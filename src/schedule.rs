use crate::github::Api;
use crate::models::{RawUserStub, Repository, UserProfile};
use crate::process::{ProcessError, Processed, UserProcessor};
use futures::stream::{self, StreamExt};
use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;

pub const DEFAULT_CONCURRENCY: usize = 5;

/// Profiles and the repositories they own
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Dataset {
    pub users: Vec<UserProfile>,
    pub repositories: Vec<Repository>,
}

impl Dataset {
    fn push(&mut self, processed: Processed) {
        self.users.push(processed.profile);
        self.repositories.extend(processed.repositories);
    }

    pub fn user(&self, login: &str) -> Option<&UserProfile> {
        self.users.iter().find(|user| user.login == login)
    }

    pub fn repositories_of<'a>(&'a self, login: &'a str) -> impl Iterator<Item = &'a Repository> {
        self.repositories
            .iter()
            .filter(move |repo| repo.login == login)
    }
}

/// Outcome of a batch: every stub ends up in exactly one of `dataset.users` or `failures`
#[derive(Debug, Default)]
pub struct Harvest {
    pub dataset: Dataset,
    pub failures: Vec<ProcessError>,
    /// Logins whose repository listing was cut short
    pub degraded: Vec<String>,
}

impl Harvest {
    pub fn accounted(&self) -> usize {
        self.dataset.users.len() + self.failures.len()
    }
}

/// Runs a `UserProcessor` over many users with bounded concurrency
pub struct FanOutScheduler<A: ?Sized> {
    processor: UserProcessor<A>,
    concurrency: usize,
}

impl<A: Api + ?Sized> FanOutScheduler<A> {
    pub fn new(processor: UserProcessor<A>, concurrency: usize) -> Self {
        FanOutScheduler {
            processor,
            concurrency: concurrency.max(1),
        }
    }

    pub async fn run(&self, stubs: Vec<RawUserStub>) -> Harvest {
        let total = stubs.len();
        let mut harvest = Harvest::default();

        let mut outcomes = stream::iter(stubs)
            .map(|stub| {
                let login = stub.login.clone();
                AssertUnwindSafe(self.processor.process(stub))
                    .catch_unwind()
                    .map(move |result| {
                        result.unwrap_or_else(|payload| {
                            Err(ProcessError::Panicked {
                                login,
                                message: panic_message(payload),
                            })
                        })
                    })
            })
            .buffer_unordered(self.concurrency);

        let mut completed = 0;

        while let Some(outcome) = outcomes.next().await {
            completed += 1;

            match outcome {
                Ok(processed) => {
                    log::info!(
                        "Processed {}/{}: {} ({} repositories)",
                        completed,
                        total,
                        processed.profile.login,
                        processed.repositories.len()
                    );
                    if processed.degraded.is_some() {
                        harvest.degraded.push(processed.profile.login.clone());
                    }
                    harvest.dataset.push(processed);
                }
                Err(error) => {
                    log::error!("Failed {}/{}: {}", completed, total, error);
                    harvest.failures.push(error);
                }
            }
        }

        harvest
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

use crate::fetch::FetchError;
use futures::future::{self, Future};
use futures::stream::{self, Stream, StreamExt, TryStreamExt};

/// When a paginated query is finished
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum StopPolicy {
    /// Stop at the first empty page
    Search,
    /// Stop at an empty or short page, or once `cap` items have been seen
    Listing { page_size: usize, cap: usize },
}

/// Items collected before the query ended, plus the failure that ended it early
#[derive(Debug)]
pub struct Paged<T> {
    pub items: Vec<T>,
    pub failure: Option<FetchError>,
}

pub struct Paginator<F> {
    fetch_page: F,
    policy: StopPolicy,
}

#[derive(Clone, Copy)]
struct Cursor {
    page: u32,
    seen: usize,
}

impl<F, Fut, T> Paginator<F>
where
    F: Fn(u32) -> Fut,
    Fut: Future<Output = Result<Vec<T>, FetchError>>,
{
    pub fn new(fetch_page: F, policy: StopPolicy) -> Self {
        Paginator { fetch_page, policy }
    }

    /// Lazily stream items from page 1 onwards
    ///
    /// A page failure is the last element of the stream.
    pub fn stream<'a>(&'a self) -> impl Stream<Item = Result<T, FetchError>> + 'a
    where
        T: 'a,
        Fut: 'a,
    {
        stream::try_unfold(Some(Cursor { page: 1, seen: 0 }), move |cursor| {
            self.next_page(cursor)
        })
        .and_then(|items| future::ok(stream::iter(items).map(Ok)))
        .try_flatten()
    }

    async fn next_page(
        &self,
        cursor: Option<Cursor>,
    ) -> Result<Option<(Vec<T>, Option<Cursor>)>, FetchError> {
        let cursor = match cursor {
            Some(cursor) => cursor,
            None => return Ok(None),
        };

        if let StopPolicy::Listing { cap, .. } = self.policy {
            if cursor.seen >= cap {
                return Ok(None);
            }
        }

        let mut items = (self.fetch_page)(cursor.page).await?;

        if items.is_empty() {
            return Ok(None);
        }

        let next = match self.policy {
            StopPolicy::Search => Some(Cursor {
                page: cursor.page + 1,
                seen: cursor.seen + items.len(),
            }),
            StopPolicy::Listing { page_size, cap } => {
                let short = items.len() < page_size;
                items.truncate(cap.saturating_sub(cursor.seen));
                let seen = cursor.seen + items.len();

                if short || seen >= cap {
                    None
                } else {
                    Some(Cursor {
                        page: cursor.page + 1,
                        seen,
                    })
                }
            }
        };

        Ok(Some((items, next)))
    }

    pub async fn collect(&self) -> Paged<T> {
        let mut items = vec![];
        let mut failure = None;
        let mut pages = Box::pin(self.stream());

        while let Some(result) = pages.next().await {
            match result {
                Ok(item) => items.push(item),
                Err(error) => failure = Some(error),
            }
        }

        Paged { items, failure }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Serve pages of the given sizes, numbering items across pages
    fn pages(sizes: &[usize]) -> Vec<Vec<usize>> {
        let mut next = 0;
        sizes
            .iter()
            .map(|&size| {
                let page = (next..next + size).collect();
                next += size;
                page
            })
            .collect()
    }

    fn serve<'a>(
        pages: &'a [Vec<usize>],
        calls: &'a AtomicU32,
    ) -> impl Fn(u32) -> future::Ready<Result<Vec<usize>, FetchError>> + 'a {
        move |page| {
            calls.fetch_add(1, Ordering::SeqCst);
            future::ready(Ok(pages
                .get(page as usize - 1)
                .cloned()
                .unwrap_or_default()))
        }
    }

    const LISTING_500: StopPolicy = StopPolicy::Listing {
        page_size: 100,
        cap: 500,
    };

    #[tokio::test]
    async fn listing_stops_at_short_page() {
        let pages = pages(&[100, 100, 37]);
        let calls = AtomicU32::new(0);
        let paged = Paginator::new(serve(&pages, &calls), LISTING_500)
            .collect()
            .await;

        assert_eq!(paged.items.len(), 237);
        assert!(paged.failure.is_none());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn listing_truncates_to_cap() {
        let pages = pages(&[100, 100, 100]);
        let calls = AtomicU32::new(0);
        let policy = StopPolicy::Listing {
            page_size: 100,
            cap: 150,
        };
        let paged = Paginator::new(serve(&pages, &calls), policy)
            .collect()
            .await;

        assert_eq!(paged.items, (0..150).collect::<Vec<_>>());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn listing_stops_at_empty_page() {
        let pages = pages(&[100, 100]);
        let calls = AtomicU32::new(0);
        let paged = Paginator::new(serve(&pages, &calls), LISTING_500)
            .collect()
            .await;

        assert_eq!(paged.items.len(), 200);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn listing_with_zero_cap_fetches_nothing() {
        let pages = pages(&[100, 100]);
        let calls = AtomicU32::new(0);
        let policy = StopPolicy::Listing {
            page_size: 100,
            cap: 0,
        };
        let paged = Paginator::new(serve(&pages, &calls), policy)
            .collect()
            .await;

        assert!(paged.items.is_empty());
        assert!(paged.failure.is_none());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn search_keeps_order_until_empty_page() {
        let pages = pages(&[100, 42, 100, 0, 100]);
        let calls = AtomicU32::new(0);
        let paged = Paginator::new(serve(&pages, &calls), StopPolicy::Search)
            .collect()
            .await;

        // Short pages don't end a search
        assert_eq!(paged.items, (0..242).collect::<Vec<_>>());
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn failure_keeps_earlier_items() {
        let paginator = Paginator::new(
            |page| {
                future::ready(if page < 3 {
                    Ok(vec![page; 100])
                } else {
                    Err(FetchError::Status(StatusCode::UNPROCESSABLE_ENTITY))
                })
            },
            StopPolicy::Search,
        );
        let paged = paginator.collect().await;

        assert_eq!(paged.items.len(), 200);
        assert!(matches!(
            paged.failure,
            Some(FetchError::Status(StatusCode::UNPROCESSABLE_ENTITY))
        ));
    }

    #[tokio::test]
    async fn stream_restarts_from_the_first_page() {
        let pages = pages(&[3, 2]);
        let calls = AtomicU32::new(0);
        let paginator = Paginator::new(
            serve(&pages, &calls),
            StopPolicy::Listing {
                page_size: 3,
                cap: 10,
            },
        );

        let first = paginator.stream().take(2).try_collect::<Vec<_>>().await.unwrap();
        let all = paginator.stream().try_collect::<Vec<_>>().await.unwrap();

        assert_eq!(first, vec![0, 1]);
        assert_eq!(all, vec![0, 1, 2, 3, 4]);
    }
}

//! Parallel fetching for paginated compatible-product requests
//!
//! The first page's pagination block tells us how many pages remain; the
//! rest are fetched concurrently with a concurrency cap.

use std::future::Future;
use std::pin::Pin;

use futures::stream::{FuturesUnordered, StreamExt};
use log::debug;

use crate::error::Result;

type PageFuture<T> = Pin<Box<dyn Future<Output = (usize, Result<Vec<T>>)> + Send>>;

/// Fetch all remaining pages concurrently after the first page.
///
/// `remaining_pages` comes from [`Pagination::remaining_pages`]; results
/// are returned in arrival order, which callers should sort if page order
/// matters. The first page error aborts the whole fetch.
///
/// [`Pagination::remaining_pages`]: super::models::Pagination::remaining_pages
pub async fn fetch_remaining_pages<T, F, Fut>(
    remaining_pages: Vec<usize>,
    fetch_page: F,
    max_concurrent: usize,
) -> Result<Vec<T>>
where
    T: Send + 'static,
    F: Fn(usize) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Vec<T>>> + Send + 'static,
{
    if remaining_pages.is_empty() {
        return Ok(Vec::new());
    }

    debug!(
        "Fetching {} remaining pages, {} concurrent",
        remaining_pages.len(),
        max_concurrent
    );

    let mut all_items = Vec::new();
    let mut futures: FuturesUnordered<PageFuture<T>> = FuturesUnordered::new();
    let mut pending_pages = remaining_pages.into_iter();

    let make_future = |page: usize, f: &F| -> PageFuture<T> {
        let fut = f(page);
        Box::pin(async move {
            let result = fut.await;
            (page, result)
        })
    };

    for page in pending_pages.by_ref().take(max_concurrent) {
        futures.push(make_future(page, &fetch_page));
    }

    // Refill as results arrive to hold concurrency at the cap
    while let Some((page, result)) = futures.next().await {
        let items = result?;
        debug!("Page {} returned {} items", page, items.len());
        all_items.extend(items);

        if let Some(next_page) = pending_pages.next() {
            futures.push(make_future(next_page, &fetch_page));
        }
    }

    Ok(all_items)
}

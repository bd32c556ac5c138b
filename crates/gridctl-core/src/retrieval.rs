//! Capped paging through a segmented remote query
//!
//! A log query can match millions of rows; the guard walks the continuation
//! chain but refuses to run away, enforcing both a row-count ceiling and a
//! wall-clock ceiling. Records are accumulated in arrival order and never
//! re-sorted. When either cap trips, the caller gets whatever arrived so far
//! with `truncated = true`; no completeness claim is made for a truncated
//! result.

use std::future::Future;
use std::time::{Duration, Instant};

use crate::error::{CoreError, Result};

/// Ceilings for one retrieval call
#[derive(Debug, Clone, Copy)]
pub struct FetchCaps {
    pub max_rows: usize,
    pub max_elapsed: Duration,
}

impl FetchCaps {
    pub const DEFAULT_MAX_ROWS: usize = 100_000;
    pub const DEFAULT_MAX_ELAPSED: Duration = Duration::from_secs(15 * 60);
}

impl Default for FetchCaps {
    fn default() -> Self {
        Self {
            max_rows: Self::DEFAULT_MAX_ROWS,
            max_elapsed: Self::DEFAULT_MAX_ELAPSED,
        }
    }
}

/// One page of a segmented result
#[derive(Debug)]
pub struct Page<R, C> {
    pub records: Vec<R>,
    pub next: Option<C>,
}

/// Everything a retrieval call produced
#[derive(Debug)]
pub struct Fetched<R> {
    pub records: Vec<R>,
    pub truncated: bool,
}

/// Drive `next_page` from the first page (no cursor) through the continuation
/// chain until the chain ends or a cap trips.
///
/// `on_page` fires after each page with the running row count and elapsed
/// time. Any transport error aborts the whole fetch; it is the caller's
/// decision whether to keep a partial set, same as for `truncated = true`.
pub async fn fetch_all<R, C, F, Fut, P>(
    mut next_page: F,
    caps: &FetchCaps,
    mut on_page: P,
) -> Result<Fetched<R>>
where
    F: FnMut(Option<C>) -> Fut,
    Fut: Future<Output = grid_api::Result<Page<R, C>>>,
    P: FnMut(usize, Duration),
{
    let started = Instant::now();
    let mut records: Vec<R> = Vec::new();
    let mut cursor: Option<C> = None;

    loop {
        let page = next_page(cursor.take()).await.map_err(CoreError::Api)?;
        records.extend(page.records);

        let elapsed = started.elapsed();
        on_page(records.len(), elapsed);

        if records.len() >= caps.max_rows || elapsed > caps.max_elapsed {
            return Ok(Fetched {
                records,
                truncated: true,
            });
        }

        match page.next {
            Some(next) => cursor = Some(next),
            None => {
                return Ok(Fetched {
                    records,
                    truncated: false,
                });
            }
        }
    }
}

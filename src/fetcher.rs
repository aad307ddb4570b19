use crate::models::{DailyCounts, MemoRecord};
use crate::state::AppState;
use chrono::{Datelike, Local, TimeZone};
use tracing::{debug, error};

/// The memos API is not year-scoped, so one request returns the newest
/// records across all years. Accounts with more than this many total posts
/// will undercount older years.
pub const FETCH_LIMIT: u32 = 1000;

/// Returns the per-date post counts for `year`, fetching from the remote
/// API at `domain` unless the (domain, year) pair is already cached.
/// Network and parse failures are logged and come back as an empty map, so
/// callers see "no data" and "fetch failed" identically. Failed fetches are
/// not cached; a later request retries.
pub async fn fetch_year_counts(state: &AppState, year: i32, domain: &str) -> DailyCounts {
    let key = cache_key(domain, year);
    if let Some(counts) = state.cached_counts(&key).await {
        return counts;
    }

    match fetch_memos(&state.client, domain).await {
        Ok(records) => {
            let counts = bucket_by_year(&records, year);
            state.store_counts(key, counts.clone()).await;
            counts
        }
        Err(err) => {
            error!("failed to fetch memos from {domain}: {err}");
            DailyCounts::new()
        }
    }
}

pub fn cache_key(domain: &str, year: i32) -> String {
    format!("{domain}-{year}")
}

/// Trims whitespace and strips one trailing slash.
pub fn normalize_domain(domain: &str) -> &str {
    let trimmed = domain.trim();
    trimmed.strip_suffix('/').unwrap_or(trimmed)
}

async fn fetch_memos(
    client: &reqwest::Client,
    domain: &str,
) -> Result<Vec<MemoRecord>, reqwest::Error> {
    let base = normalize_domain(domain);
    let url = format!("{base}/api/v1/memo?creatorId=1&limit={FETCH_LIMIT}");
    debug!("fetching {url}");
    client
        .get(url)
        .send()
        .await?
        .error_for_status()?
        .json()
        .await
}

/// Buckets records by local calendar date, keeping only dates in `year`.
/// Records with timestamps outside the representable range are skipped.
pub fn bucket_by_year(records: &[MemoRecord], year: i32) -> DailyCounts {
    let mut counts = DailyCounts::new();
    for record in records {
        let Some(created) = Local.timestamp_opt(record.created_ts, 0).single() else {
            continue;
        };
        let date = created.date_naive();
        if date.year() == year {
            *counts.entry(date.format("%Y-%m-%d").to_string()).or_insert(0) += 1;
        }
    }
    counts
}

//! # Arrival Aggregator
//!
//! Normalizes a stop's upstream departures into [`Arrival`]s ordered by how
//! soon they arrive, with optional time-window and count restrictions.

use tracing::{debug, info, warn};

use crate::model::{Arrival, ArrivalRecord};
use crate::provider::TransitProvider;
use crate::time::EpochMillis;
use crate::{Result, invalid_input};

/// One hour, the window applied by "next hour" filtering.
pub const DEFAULT_WINDOW_MS: i64 = 60 * 60 * 1000;

/// Parameters for [`query_arrivals`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArrivalQuery {
    pub stop_id: String,
    pub now: EpochMillis,
    pub limit: Option<usize>,
    pub window_ms: Option<i64>,
}

impl ArrivalQuery {
    #[must_use]
    pub fn new(stop_id: impl Into<String>, now: EpochMillis) -> Self {
        Self { stop_id: stop_id.into(), now, limit: None, window_ms: None }
    }

    /// Keep at most `limit` arrivals.
    #[must_use]
    pub const fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Keep only arrivals due within `window_ms` of `now`.
    #[must_use]
    pub const fn window_ms(mut self, window_ms: i64) -> Self {
        self.window_ms = Some(window_ms);
        self
    }
}

/// Arrivals for a stop, windowed and truncated as the query asks.
///
/// Windowing is applied after sorting, then the limit.
///
/// # Errors
///
/// Returns [`crate::Error::InvalidInput`] for a blank stop id, a zero limit or
/// a negative window, and propagates provider failures unchanged.
pub async fn query_arrivals(
    provider: &impl TransitProvider, query: &ArrivalQuery,
) -> Result<Vec<Arrival>> {
    if query.limit == Some(0) {
        return Err(invalid_input!("limit must be at least 1"));
    }
    if let Some(window_ms) = query.window_ms
        && window_ms < 0
    {
        return Err(invalid_input!("window must not be negative, got {window_ms}ms"));
    }

    let mut arrivals = get_arrivals(provider, &query.stop_id, query.now).await?;

    if let Some(window_ms) = query.window_ms {
        arrivals = restrict_to_window(arrivals, query.now, window_ms);
    }
    if let Some(limit) = query.limit {
        arrivals.truncate(limit);
    }

    Ok(arrivals)
}

/// All upcoming arrivals at `stop_id`, ascending by minutes until arrival.
///
/// # Errors
///
/// Returns [`crate::Error::InvalidInput`] for a blank stop id and propagates
/// provider failures unchanged. No synthetic arrivals are generated.
pub async fn get_arrivals(
    provider: &impl TransitProvider, stop_id: &str, now: EpochMillis,
) -> Result<Vec<Arrival>> {
    if stop_id.trim().is_empty() {
        return Err(invalid_input!("stop id must not be blank"));
    }

    let records = provider
        .arrivals_for_stop(stop_id)
        .await
        .inspect_err(|err| warn!(stop_id, error = %err, "arrival lookup failed"))?;

    let received = records.len();
    let arrivals = normalize_arrivals(records, now);

    info!(
        monotonic_counter.arrival_lookups = 1,
        stop_id,
        received,
        returned = arrivals.len(),
        "aggregated arrivals"
    );

    Ok(arrivals)
}

/// Drop departure-only entries, normalize the rest relative to `now`, and
/// sort by minutes until arrival. Ties keep upstream order.
#[must_use]
pub fn normalize_arrivals(records: Vec<ArrivalRecord>, now: EpochMillis) -> Vec<Arrival> {
    let mut arrivals = records
        .into_iter()
        .filter(|record| {
            if !record.arrival_enabled {
                debug!(route_id = %record.route_id, "skipping departure-only entry");
            }
            record.arrival_enabled
        })
        .map(|record| Arrival::from_record(record, now))
        .collect::<Vec<_>>();

    // stable
    arrivals.sort_by_key(|arrival| arrival.minutes_until_arrival);
    arrivals.retain(|arrival| arrival.minutes_until_arrival.is_some());

    arrivals
}

/// Keep arrivals whose effective time is no later than `now + window_ms`,
/// preserving order.
#[must_use]
pub fn restrict_to_window(
    arrivals: Vec<Arrival>, now: EpochMillis, window_ms: i64,
) -> Vec<Arrival> {
    let cutoff = now.saturating_add(window_ms);
    arrivals.into_iter().filter(|arrival| arrival.effective_time() <= cutoff).collect()
}

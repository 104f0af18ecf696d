use axum::{
    extract::{Query, State},
    response::sse::{Event, KeepAlive, Sse},
    Json,
};
use serde::Deserialize;
use std::convert::Infallible;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::debug;

use crate::tracking::{AggregateStat, Sample};
use crate::AppState;

use super::ApiError;

// ─── Query types ─────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageQuery {
    pub page_number: u32,
    pub page_size: i64,
}

/// Operation-name filter for the stats endpoints.
///
/// Both keys may repeat:
///   operationNames  comma-separated list, e.g. `find_all_students,find_student_by_id`
///   methodName      exactly one name, taken verbatim (commas included)
///
/// No names means "all operations".
#[derive(Debug, Default, PartialEq)]
pub struct StatsQuery {
    pub names: Vec<String>,
}

impl StatsQuery {
    /// Build the filter from raw query pairs; unknown keys are ignored.
    pub fn from_pairs(pairs: impl IntoIterator<Item = (String, String)>) -> Self {
        let mut names = Vec::new();
        for (key, value) in pairs {
            match key.as_str() {
                "operationNames" => names.extend(
                    value
                        .split(',')
                        .map(str::trim)
                        .filter(|name| !name.is_empty())
                        .map(str::to_owned),
                ),
                "methodName" if !value.trim().is_empty() => names.push(value.trim().to_owned()),
                _ => {}
            }
        }
        Self { names }
    }
}

// ─── GET /api/execution-times?pageNumber=&pageSize= ──────────────

pub async fn list_samples(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Vec<Sample>>, ApiError> {
    let page_number = NonZeroU32::new(query.page_number)
        .ok_or_else(|| ApiError::BadRequest("pageNumber must be at least 1".into()))?;
    Ok(Json(
        state.stats.list_page(page_number, query.page_size).await?,
    ))
}

// ─── GET /api/execution-times/stats?operationNames= ──────────────

pub async fn get_stats(
    State(state): State<Arc<AppState>>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Json<Vec<AggregateStat>>, ApiError> {
    let query = StatsQuery::from_pairs(pairs);
    Ok(Json(state.stats.compute_stats(&query.names).await?))
}

// ─── GET /api/execution-times/stats/stream ───────────────────────
/// Server-Sent Events endpoint.
/// Pushes the full aggregate list as JSON once per configured interval,
/// filtered the same way as the JSON endpoint.

pub async fn stats_stream(
    State(state): State<Arc<AppState>>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Sse<ReceiverStream<Result<Event, Infallible>>> {
    let (tx, rx) = mpsc::channel(4);
    let names = StatsQuery::from_pairs(pairs).names;
    let period = state.stats_stream_interval;

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        loop {
            ticker.tick().await;
            let event = match state.stats.compute_stats(&names).await {
                Ok(stats) => {
                    let json = serde_json::to_string(&stats).unwrap_or_default();
                    Event::default().data(json)
                }
                Err(e) => Event::default().event("error").data(e.to_string()),
            };
            // Client went away
            if tx.send(Ok(event)).await.is_err() {
                debug!("stats stream closed");
                break;
            }
        }
    });

    Sse::new(ReceiverStream::new(rx)).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}

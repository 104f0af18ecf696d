use axum::{
    extract::{MatchedPath, Request},
    http::{header, HeaderName, HeaderValue},
    middleware::Next,
    response::Response,
};
use std::time::Instant;
use tracing::{info, warn};

pub const RESPONSE_TIME_HEADER: HeaderName = HeaderName::from_static("x-response-time-us");
pub const SERVER_TIMING_HEADER: HeaderName = HeaderName::from_static("server-timing");

/// Stamps handler wall time on API responses (`X-Response-Time-Us`, plus the
/// same value as `Server-Timing`) and logs one line per request under its
/// route template, so `/api/students/7` and `/api/students/8` group together.
///
/// Event streams are left alone: their handler returns before the stream
/// ends, so the elapsed time says nothing about the request.
pub async fn timing_middleware(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let route = req
        .extensions()
        .get::<MatchedPath>()
        .map(|matched| matched.as_str().to_owned())
        .unwrap_or_else(|| req.uri().path().to_owned());

    let start = Instant::now();
    let mut response = next.run(req).await;
    let elapsed = start.elapsed();

    if is_event_stream(&response) {
        return response;
    }

    let us = u64::try_from(elapsed.as_micros()).unwrap_or(u64::MAX);
    let headers = response.headers_mut();
    headers.insert(RESPONSE_TIME_HEADER, HeaderValue::from(us));
    if let Ok(val) = HeaderValue::from_str(&format!(
        "total;dur={:.3}",
        elapsed.as_secs_f64() * 1000.0
    )) {
        headers.insert(SERVER_TIMING_HEADER, val);
    }

    let status = response.status();
    if status.is_server_error() {
        warn!(status = status.as_u16(), %method, %route, us, "request failed");
    } else {
        info!(status = status.as_u16(), %method, %route, us, "request handled");
    }

    response
}

fn is_event_stream(response: &Response) -> bool {
    response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|ct| ct.to_str().ok())
        .is_some_and(|ct| ct.starts_with("text/event-stream"))
}

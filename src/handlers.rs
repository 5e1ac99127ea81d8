// SPDX-FileCopyrightText: 2026 Contact Relay Contributors
// SPDX-License-Identifier: Apache-2.0

//! HTTP surface of the contact relay.
//!
//! Three routes on `/`: GET is a health check that bypasses everything,
//! OPTIONS answers the CORS preflight, POST runs the admission pipeline.

use crate::config::{Config, IdentitySource};
use crate::limiter;
use crate::pipeline::AdmissionPipeline;
use crate::response;
use axum::extract::{ConnectInfo, Query, State};
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use serde::Deserialize;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::debug;

/// Shared application state.
pub struct AppState {
    pub pipeline: AdmissionPipeline,
    pub config: Config,
}

/// Redirect targets a classic form post supplies on the query string.
#[derive(Debug, Deserialize)]
pub struct RedirectQuery {
    pub success: Option<String>,
    pub failure: Option<String>,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(health).post(submit).options(preflight))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check; independent of CORS and rate-limit state.
pub async fn health() -> &'static str {
    "Healthy"
}

/// CORS preflight. The origin guard decides only whether the allow-origin
/// header is granted; the response is 200 either way.
pub async fn preflight(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    let origin = origin_header(&headers);
    let mut response = (
        StatusCode::OK,
        [
            ("Access-Control-Request-Method", "POST"),
            ("Access-Control-Max-Age", "86400"),
            ("Access-Control-Allow-Headers", "Content-Type"),
            ("Content-Type", "application/json"),
        ],
    )
        .into_response();
    grant_cors(&state, origin, &mut response);
    response
}

/// Form submission.
pub async fn submit(
    State(state): State<Arc<AppState>>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    Query(query): Query<RedirectQuery>,
    headers: HeaderMap,
    body: String,
) -> Response {
    let origin = origin_header(&headers);
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok());

    let identity_source = state
        .config
        .rate_limit
        .as_ref()
        .map(|rate_limit| &rate_limit.identity_source)
        .unwrap_or(&IdentitySource::Default);
    let identity = limiter::identity_key(identity_source, &peer, &headers);

    debug!(
        origin = ?origin,
        identity = %identity,
        content_type = ?content_type,
        "processing submission"
    );

    let outcome = state
        .pipeline
        .admit(origin, &identity, content_type, &body)
        .await;

    let mut response = response::dispatch(
        origin,
        query.success.as_deref(),
        query.failure.as_deref(),
        &outcome,
    );
    grant_cors(&state, origin, &mut response);
    response
}

fn origin_header(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::ORIGIN)
        .and_then(|value| value.to_str().ok())
}

/// On an allowed origin the response carries the wildcard allow header,
/// whatever the dispatch mode was.
fn grant_cors(state: &AppState, origin: Option<&str>, response: &mut Response) {
    if state.pipeline.origin_guard().is_allowed(origin) {
        response.headers_mut().insert(
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("*"),
        );
    }
}

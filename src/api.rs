//! HTTP surface for the gateway.
//!
//! This module exposes a compact Axum router with a single resource-oriented
//! endpoint:
//!
//! - `GET /<rdn1>/<rdn2>/.../<rdnN>?filter=<filter>&scope=<0|1|2>` – Resolve
//!   the path into a distinguished name (most specific segment first, so the
//!   segments are reversed and joined with commas), run one directory search,
//!   and answer with a JSON array of `{dn, attributes}` objects.
//!
//! Directory-layer outcomes map onto HTTP statuses deterministically: a clean
//! search is `200`, a directory-reported failure, missing base, or referral is
//! `400` with a `{message}` body, and a protocol failure is `500`.

use crate::directory::{Aggregator, DirectorySearch, Outcome};
use crate::query::{DEFAULT_FILTER, QueryDescriptor, SearchScope, dn_from_path};
use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

/// Build the HTTP router exposing the directory search surface.
pub fn create_router<S>(service: Arc<S>) -> Router
where
    S: DirectorySearch + 'static,
{
    Router::new()
        .route("/", get(search_root::<S>))
        .route("/*path", get(search_at_path::<S>))
        .with_state(service)
}

/// Query parameters accepted by the search endpoint.
#[derive(Debug, Deserialize)]
struct SearchParams {
    /// Directory filter expression, used verbatim once URI-decoded.
    #[serde(default)]
    filter: Option<String>,
    /// Numeric scope code: `0` base, `1` one-level, `2` subtree.
    #[serde(default)]
    scope: Option<String>,
}

/// Search rooted at the directory root (empty distinguished name).
async fn search_root<S>(
    State(service): State<Arc<S>>,
    Query(params): Query<SearchParams>,
) -> Response
where
    S: DirectorySearch,
{
    run_search(service, String::new(), params).await
}

/// Search rooted at the distinguished name derived from the request path.
async fn search_at_path<S>(
    State(service): State<Arc<S>>,
    Path(path): Path<String>,
    Query(params): Query<SearchParams>,
) -> Response
where
    S: DirectorySearch,
{
    run_search(service, dn_from_path(&path), params).await
}

async fn run_search<S>(service: Arc<S>, location: String, params: SearchParams) -> Response
where
    S: DirectorySearch,
{
    let filter = params
        .filter
        .unwrap_or_else(|| DEFAULT_FILTER.to_string());
    let scope = SearchScope::from_code(params.scope.as_deref());
    let query = QueryDescriptor {
        base: location.clone(),
        filter,
        scope,
    };
    tracing::debug!(
        base = %query.base,
        filter = %query.filter,
        scope = ?query.scope,
        "Translated request into directory search"
    );

    match service.search(&query).await {
        Ok(mut events) => {
            let outcome = Aggregator::new(location).run(&mut events).await;
            outcome_response(outcome)
        }
        Err(err) => {
            tracing::error!(base = %query.base, error = %err, "Failed to issue directory search");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Map the terminal outcome of one search onto an HTTP response.
fn outcome_response(outcome: Outcome) -> Response {
    match outcome {
        Outcome::Success(entries) => {
            tracing::debug!(entries = entries.len(), "Search completed");
            (StatusCode::OK, Json(entries)).into_response()
        }
        Outcome::DirectoryError(status) => {
            tracing::warn!(status, "Directory reported a non-success result");
            message_response(
                StatusCode::BAD_REQUEST,
                format!("ldap status result was: {status}"),
            )
        }
        Outcome::NotFound(location) => {
            tracing::warn!(location = %location, "Search base does not exist");
            message_response(StatusCode::BAD_REQUEST, format!("not found: {location}"))
        }
        Outcome::ProtocolError(message) => {
            tracing::error!(message = %message, "Directory search failed");
            message_response(StatusCode::INTERNAL_SERVER_ERROR, message)
        }
        Outcome::ReferralRejected(uris) => {
            tracing::warn!(?uris, "Rejecting referral response");
            message_response(
                StatusCode::BAD_REQUEST,
                "referrals not supported".to_string(),
            )
        }
    }
}

fn message_response(status: StatusCode, message: String) -> Response {
    (status, Json(json!({ "message": message }))).into_response()
}

//! Telemetry ingestion endpoint
//!
//! `POST /v1/ingest` — bearer ingest token, JSON body with optional
//! `resourceSpans` and `resourceMetrics`. Responses: 200 with processed
//! counts, 401 for unknown or revoked tokens, 400 for undecodable or
//! structurally incomplete payloads, 429 with usage detail on quota
//! exhaustion, and an opaque 500 for everything else.

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::api::auth;
use crate::api::server::AppState;
use crate::api::types::{ErrorBody, IngestAccepted, QuotaExceededBody};
use crate::domain::ingest::{self, IngestError};
use crate::otlp::wire::ExportPayload;

pub async fn export(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let Some(token) = auth::bearer_token(&headers) else {
        return unauthorized();
    };

    let identity = match auth::authorize(&state.pool, &token).await {
        Ok(Some(identity)) => identity,
        Ok(None) => return unauthorized(),
        Err(e) => {
            tracing::error!(error = %e, "ingest token lookup failed");
            return internal_error();
        }
    };

    let payload: ExportPayload = match serde_json::from_slice(&body) {
        Ok(payload) => payload,
        Err(e) => {
            tracing::debug!(error = %e, "rejecting undecodable ingest payload");
            return bad_request("malformed payload: invalid JSON body".to_string());
        }
    };

    match ingest::ingest(&state.pool, &identity, &payload).await {
        Ok(report) => (
            StatusCode::OK,
            Json(IngestAccepted {
                message: "telemetry accepted",
                spans_processed: report.spans_processed,
                metrics_processed: report.metrics_processed,
            }),
        )
            .into_response(),
        Err(IngestError::QuotaExceeded(snapshot)) => (
            StatusCode::TOO_MANY_REQUESTS,
            Json(QuotaExceededBody {
                message: "monthly ingestion quota exceeded",
                quota_info: snapshot,
            }),
        )
            .into_response(),
        Err(e @ IngestError::MalformedPayload(_)) => bad_request(e.to_string()),
        Err(IngestError::Data(e)) => {
            tracing::error!(error = %e, user_id = %identity.user_id, "ingestion failed");
            internal_error()
        }
    }
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(ErrorBody {
            message: "missing or invalid ingest token".to_string(),
        }),
    )
        .into_response()
}

fn bad_request(message: String) -> Response {
    (StatusCode::BAD_REQUEST, Json(ErrorBody { message })).into_response()
}

fn internal_error() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorBody {
            message: "internal server error".to_string(),
        }),
    )
        .into_response()
}

//! Ingestion coordinator
//!
//! One database transaction per request: compute the batch's credits, run
//! the quota ledger first so an over-quota batch fails before any row is
//! written, then materialize spans and metrics, then commit. Any failure
//! rolls the entire batch back; there is no partial-success outcome.

pub mod metrics;
pub mod spans;

use sqlx::PgPool;
use thiserror::Error;

use crate::data::DataError;
use crate::data::types::TokenIdentity;
use crate::domain::credits;
use crate::domain::quota::{self, QuotaOutcome, UsageSnapshot};
use crate::otlp::wire::ExportPayload;

#[derive(Debug, Error)]
pub enum IngestError {
    /// The batch would overshoot the monthly quota; nothing was written.
    #[error("monthly ingestion quota exceeded")]
    QuotaExceeded(UsageSnapshot),

    /// A structurally required field is absent; the whole batch fails.
    #[error("malformed payload: {0}")]
    MalformedPayload(String),

    #[error(transparent)]
    Data(#[from] DataError),
}

/// Counts reported back to the client after a committed batch.
#[derive(Debug, Clone)]
pub struct IngestReport {
    pub spans_processed: usize,
    pub metrics_processed: usize,
}

/// Ingest one batch for the authenticated token.
pub async fn ingest(
    pool: &PgPool,
    identity: &TokenIdentity,
    payload: &ExportPayload,
) -> Result<IngestReport, IngestError> {
    let credits = credits::total_credits(payload);
    let now = chrono::Utc::now();
    let now_ms = now.timestamp_millis();

    let mut tx = pool.begin().await.map_err(DataError::from)?;

    let usage = match quota::check_and_consume(&mut tx, &identity.user_id, credits, now).await? {
        QuotaOutcome::Allowed(snapshot) => snapshot,
        QuotaOutcome::Exceeded(snapshot) => {
            // Nothing written yet; release the user row lock immediately.
            if let Err(e) = tx.rollback().await {
                tracing::warn!(error = %e, "rollback after quota rejection failed");
            }
            tracing::debug!(
                user_id = %identity.user_id,
                credits,
                current_usage = snapshot.current_usage,
                "batch rejected by quota ledger"
            );
            return Err(IngestError::QuotaExceeded(snapshot));
        }
    };

    // A failure below drops the transaction, rolling back the quota
    // consumption together with every row written so far.
    let spans_processed =
        spans::ingest_resource_spans(&mut tx, identity, &payload.resource_spans, now_ms).await?;
    let metrics_processed =
        metrics::ingest_resource_metrics(&mut tx, identity, &payload.resource_metrics, now_ms)
            .await?;

    tx.commit().await.map_err(DataError::from)?;

    tracing::debug!(
        user_id = %identity.user_id,
        spans = spans_processed,
        metrics = metrics_processed,
        credits,
        current_usage = usage.current_usage,
        "batch committed"
    );

    Ok(IngestReport {
        spans_processed,
        metrics_processed,
    })
}

//! Metric sample repository
//!
//! Samples are immutable rows; the only read is the dedup lookup for the
//! most recent sample with an identical scalar value.

use sqlx::PgConnection;
use uuid::Uuid;

use crate::data::error::DataError;
use crate::data::types::{HistogramBucketRow, NewMetric};
use crate::otlp::attribute::AttributeValue;

/// Most recent sample id for (resource, name) with an identical scalar
/// value, ignoring timestamps.
pub async fn find_latest_by_value(
    conn: &mut PgConnection,
    resource_id: &str,
    name: &str,
    value: f64,
) -> Result<Option<String>, DataError> {
    let row: Option<(String,)> = sqlx::query_as(
        "SELECT id FROM metrics
         WHERE resource_id = $1 AND name = $2 AND value = $3
         ORDER BY timestamp DESC, created_at DESC, id DESC
         LIMIT 1",
    )
    .bind(resource_id)
    .bind(name)
    .bind(value)
    .fetch_optional(&mut *conn)
    .await?;
    Ok(row.map(|(id,)| id))
}

/// Buckets of a histogram sample, ordered by bucket index.
pub async fn buckets(
    conn: &mut PgConnection,
    metric_id: &str,
) -> Result<Vec<HistogramBucketRow>, DataError> {
    let rows: Vec<(i32, Option<f64>, i64)> = sqlx::query_as(
        "SELECT bucket_index, explicit_bound, bucket_count
         FROM histogram_buckets
         WHERE metric_id = $1
         ORDER BY bucket_index",
    )
    .bind(metric_id)
    .fetch_all(&mut *conn)
    .await?;

    Ok(rows
        .into_iter()
        .map(
            |(bucket_index, explicit_bound, bucket_count)| HistogramBucketRow {
                bucket_index,
                explicit_bound,
                bucket_count,
            },
        )
        .collect())
}

/// Insert a metric sample row; returns its id.
pub async fn insert(
    conn: &mut PgConnection,
    metric: &NewMetric,
    now_ms: i64,
) -> Result<String, DataError> {
    let id = Uuid::new_v4().to_string();
    sqlx::query(
        r#"INSERT INTO metrics
               (id, resource_id, ingest_token_id, name, kind, timestamp, value,
                aggregation_temporality, is_monotonic, min, max, count, sum, created_at)
           VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)"#,
    )
    .bind(&id)
    .bind(&metric.resource_id)
    .bind(&metric.ingest_token_id)
    .bind(&metric.name)
    .bind(metric.kind.as_str())
    .bind(metric.timestamp)
    .bind(metric.value)
    .bind(metric.aggregation_temporality)
    .bind(metric.is_monotonic)
    .bind(metric.min)
    .bind(metric.max)
    .bind(metric.count)
    .bind(metric.sum)
    .bind(now_ms)
    .execute(&mut *conn)
    .await?;
    Ok(id)
}

pub async fn insert_attribute(
    conn: &mut PgConnection,
    metric_id: &str,
    key: &str,
    value: &AttributeValue,
) -> Result<(), DataError> {
    let parts = value.storage_parts();
    sqlx::query(
        r#"INSERT INTO metric_attributes
               (metric_id, key, kind, value_text, value_int, value_double, value_bool)
           VALUES ($1, $2, $3, $4, $5, $6, $7)"#,
    )
    .bind(metric_id)
    .bind(key)
    .bind(parts.kind.as_str())
    .bind(&parts.text)
    .bind(parts.int)
    .bind(parts.double)
    .bind(parts.boolean)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

pub async fn insert_bucket(
    conn: &mut PgConnection,
    metric_id: &str,
    bucket_index: i32,
    explicit_bound: Option<f64>,
    bucket_count: i64,
) -> Result<(), DataError> {
    sqlx::query(
        "INSERT INTO histogram_buckets (metric_id, bucket_index, explicit_bound, bucket_count)
         VALUES ($1, $2, $3, $4)",
    )
    .bind(metric_id)
    .bind(bucket_index)
    .bind(explicit_bound)
    .bind(bucket_count)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

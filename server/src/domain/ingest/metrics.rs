//! Metric sample materialization and cumulative dedup
//!
//! Each data point becomes one immutable sample row. Gauges always persist;
//! counters, histograms, and any cumulative series skip a data point whose
//! scalar value matches the most recent stored sample — a periodic
//! re-export of an unchanged running total — unless a histogram's buckets
//! changed underneath the same total.

use sqlx::PgConnection;

use super::IngestError;
use crate::data::DataError;
use crate::data::postgres::repositories::metric;
use crate::data::types::{
    AggregationTemporality, HistogramBucketRow, MetricKind, NewMetric, TokenIdentity,
};
use crate::domain::resources;
use crate::otlp::attribute::AttributeValue;
use crate::otlp::time::nanos_to_millis;
use crate::otlp::wire::{HistogramDataPoint, KeyValue, Metric, NumberDataPoint, ResourceMetrics};

/// Materialize every metric data point in the payload's resource metric
/// blocks. Returns the number of data points processed (written or
/// recognized as redundant re-exports).
pub async fn ingest_resource_metrics(
    conn: &mut PgConnection,
    identity: &TokenIdentity,
    blocks: &[ResourceMetrics],
    now_ms: i64,
) -> Result<usize, IngestError> {
    let mut processed = 0usize;

    for block in blocks {
        let resource =
            resources::resolve(conn, &identity.user_id, block.resource.as_ref(), now_ms).await?;
        for scope in &block.scope_metrics {
            for m in &scope.metrics {
                processed += ingest_metric(conn, identity, &resource.id, m, now_ms).await?;
            }
        }
    }

    Ok(processed)
}

async fn ingest_metric(
    conn: &mut PgConnection,
    identity: &TokenIdentity,
    resource_id: &str,
    m: &Metric,
    now_ms: i64,
) -> Result<usize, IngestError> {
    // Exactly one data shape per metric; a sum is stored as a counter.
    if let Some(gauge) = &m.gauge {
        let mut n = 0;
        for dp in &gauge.data_points {
            ingest_number_point(
                conn,
                identity,
                resource_id,
                m,
                dp,
                MetricKind::Gauge,
                0,
                None,
                now_ms,
            )
            .await?;
            n += 1;
        }
        Ok(n)
    } else if let Some(sum) = &m.sum {
        let mut n = 0;
        for dp in &sum.data_points {
            ingest_number_point(
                conn,
                identity,
                resource_id,
                m,
                dp,
                MetricKind::Counter,
                sum.aggregation_temporality,
                Some(sum.is_monotonic),
                now_ms,
            )
            .await?;
            n += 1;
        }
        Ok(n)
    } else if let Some(histogram) = &m.histogram {
        let mut n = 0;
        for dp in &histogram.data_points {
            ingest_histogram_point(
                conn,
                identity,
                resource_id,
                m,
                dp,
                histogram.aggregation_temporality,
                now_ms,
            )
            .await?;
            n += 1;
        }
        Ok(n)
    } else {
        Ok(0)
    }
}

#[allow(clippy::too_many_arguments)]
async fn ingest_number_point(
    conn: &mut PgConnection,
    identity: &TokenIdentity,
    resource_id: &str,
    m: &Metric,
    dp: &NumberDataPoint,
    kind: MetricKind,
    temporality_raw: i32,
    is_monotonic: Option<bool>,
    now_ms: i64,
) -> Result<(), IngestError> {
    let value = scalar_value(dp.as_double, dp.as_int, None, None);
    let temporality = AggregationTemporality::from_i32(temporality_raw);

    if dedup_applies(kind, temporality)
        && metric::find_latest_by_value(conn, resource_id, &m.name, value)
            .await?
            .is_some()
    {
        tracing::trace!(metric = %m.name, value, "skipping unchanged cumulative sample");
        return Ok(());
    }

    let metric_id = metric::insert(
        conn,
        &NewMetric {
            resource_id: resource_id.to_string(),
            ingest_token_id: identity.token_id.clone(),
            name: m.name.clone(),
            kind,
            timestamp: nanos_to_millis(dp.time_unix_nano.unwrap_or(0)),
            value,
            aggregation_temporality: (kind != MetricKind::Gauge).then_some(temporality_raw),
            is_monotonic,
            min: None,
            max: None,
            count: None,
            sum: None,
        },
        now_ms,
    )
    .await?;

    insert_point_attributes(conn, &metric_id, &dp.attributes).await?;
    Ok(())
}

async fn ingest_histogram_point(
    conn: &mut PgConnection,
    identity: &TokenIdentity,
    resource_id: &str,
    m: &Metric,
    dp: &HistogramDataPoint,
    temporality_raw: i32,
    now_ms: i64,
) -> Result<(), IngestError> {
    let value = scalar_value(None, None, dp.sum, dp.count);

    // Same scalar total: still a new sample if the bucket shape moved.
    if let Some(existing_id) = metric::find_latest_by_value(conn, resource_id, &m.name, value).await?
    {
        let existing = metric::buckets(conn, &existing_id).await?;
        if !buckets_changed(&existing, &dp.bucket_counts) {
            tracing::trace!(metric = %m.name, value, "skipping unchanged histogram sample");
            return Ok(());
        }
    }

    let metric_id = metric::insert(
        conn,
        &NewMetric {
            resource_id: resource_id.to_string(),
            ingest_token_id: identity.token_id.clone(),
            name: m.name.clone(),
            kind: MetricKind::Histogram,
            timestamp: nanos_to_millis(dp.time_unix_nano.unwrap_or(0)),
            value,
            aggregation_temporality: Some(temporality_raw),
            is_monotonic: None,
            min: dp.min,
            max: dp.max,
            count: dp.count.map(|c| c as i64),
            sum: dp.sum,
        },
        now_ms,
    )
    .await?;

    insert_point_attributes(conn, &metric_id, &dp.attributes).await?;

    for (i, bucket_count) in dp.bucket_counts.iter().enumerate() {
        metric::insert_bucket(
            conn,
            &metric_id,
            i as i32,
            dp.explicit_bounds.get(i).copied(),
            *bucket_count as i64,
        )
        .await?;
    }

    Ok(())
}

async fn insert_point_attributes(
    conn: &mut PgConnection,
    metric_id: &str,
    attributes: &[KeyValue],
) -> Result<(), DataError> {
    for kv in attributes {
        let value = AttributeValue::decode(kv.value.as_ref());
        metric::insert_attribute(conn, metric_id, &kv.key, &value).await?;
    }
    Ok(())
}

/// Ordered precedence for "the" scalar value of a sample:
/// asDouble, then asInt, then histogram sum, then count, else 0.
fn scalar_value(
    as_double: Option<f64>,
    as_int: Option<i64>,
    sum: Option<f64>,
    count: Option<u64>,
) -> f64 {
    if let Some(d) = as_double {
        d
    } else if let Some(i) = as_int {
        i as f64
    } else if let Some(s) = sum {
        s
    } else if let Some(c) = count {
        c as f64
    } else {
        0.0
    }
}

/// Whether the value-change dedup policy applies: gauges fluctuate
/// independently each export and always persist; counters and histograms
/// dedup, as does any cumulative series.
fn dedup_applies(kind: MetricKind, temporality: AggregationTemporality) -> bool {
    kind != MetricKind::Gauge || temporality == AggregationTemporality::Cumulative
}

/// Bucket comparison for the histogram dedup exception: a differing length
/// or any differing count means the sample changed.
fn buckets_changed(existing: &[HistogramBucketRow], incoming: &[u64]) -> bool {
    if existing.len() != incoming.len() {
        return true;
    }
    existing
        .iter()
        .zip(incoming)
        .any(|(row, count)| row.bucket_count != *count as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bucket(index: i32, count: i64) -> HistogramBucketRow {
        HistogramBucketRow {
            bucket_index: index,
            explicit_bound: None,
            bucket_count: count,
        }
    }

    #[test]
    fn test_scalar_value_precedence() {
        assert_eq!(scalar_value(Some(1.5), Some(2), Some(3.0), Some(4)), 1.5);
        assert_eq!(scalar_value(None, Some(2), Some(3.0), Some(4)), 2.0);
        assert_eq!(scalar_value(None, None, Some(3.0), Some(4)), 3.0);
        assert_eq!(scalar_value(None, None, None, Some(4)), 4.0);
        assert_eq!(scalar_value(None, None, None, None), 0.0);
    }

    #[test]
    fn test_dedup_applies_per_kind() {
        // Gauges never dedup unless explicitly cumulative.
        assert!(!dedup_applies(
            MetricKind::Gauge,
            AggregationTemporality::Unspecified
        ));
        assert!(!dedup_applies(
            MetricKind::Gauge,
            AggregationTemporality::Delta
        ));
        assert!(dedup_applies(
            MetricKind::Gauge,
            AggregationTemporality::Cumulative
        ));

        // Counters and histograms always dedup.
        assert!(dedup_applies(
            MetricKind::Counter,
            AggregationTemporality::Delta
        ));
        assert!(dedup_applies(
            MetricKind::Counter,
            AggregationTemporality::Cumulative
        ));
        assert!(dedup_applies(
            MetricKind::Histogram,
            AggregationTemporality::Unspecified
        ));
    }

    #[test]
    fn test_buckets_changed_detects_count_difference() {
        let existing = vec![bucket(0, 10), bucket(1, 20)];
        assert!(!buckets_changed(&existing, &[10, 20]));
        assert!(buckets_changed(&existing, &[10, 21]));
    }

    #[test]
    fn test_buckets_changed_detects_length_difference() {
        let existing = vec![bucket(0, 10)];
        assert!(buckets_changed(&existing, &[10, 0]));
        assert!(buckets_changed(&existing, &[]));
        assert!(!buckets_changed(&[], &[]));
    }
}

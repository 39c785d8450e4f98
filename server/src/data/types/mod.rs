//! Row types shared between the domain layer and repositories

pub mod enums;

pub use enums::{AggregationTemporality, AttrKind, MetricKind, TierKind, TokenStatus, TraceStatus};

/// Identity resolved from a live ingest token.
#[derive(Debug, Clone)]
pub struct TokenIdentity {
    pub token_id: String,
    pub user_id: String,
}

/// User quota state joined with the subscription tier, loaded under row lock.
#[derive(Debug, Clone)]
pub struct UserQuotaRow {
    pub monthly_counter: i64,
    /// Unix milliseconds of the last monthly counter reset.
    pub last_counter_reset: i64,
    /// `None` = unlimited tier.
    pub monthly_quota: Option<i64>,
    pub tier: TierKind,
}

/// A tenant-scoped service identity row.
#[derive(Debug, Clone)]
pub struct ResourceRow {
    pub id: String,
    pub service_name: String,
    pub first_seen: i64,
    pub last_seen: i64,
}

/// Column set for a new span row (create-only, never updated).
#[derive(Debug, Clone, Default)]
pub struct NewSpan {
    /// Owning trace row id.
    pub trace_id: String,
    /// Sibling span row id in the same trace, when the parent was found.
    pub parent_span_id: Option<String>,
    /// Wire-format identifiers, stored as opaque strings.
    pub otel_trace_id: String,
    pub otel_span_id: String,
    pub otel_parent_span_id: Option<String>,
    pub name: String,
    pub kind: i32,
    /// Denormalized from the resolved resource.
    pub service_name: String,
    pub status_code: Option<i32>,
    pub status_message: Option<String>,
    pub start_time: i64,
    pub end_time: Option<i64>,
    pub duration_ms: Option<i64>,
    pub dropped_attributes_count: i32,
    pub dropped_events_count: i32,
    pub dropped_links_count: i32,
    pub created_at: i64,
}

/// Column set for a new metric sample row. A sample is immutable once
/// written; an updated series value is always a new row.
#[derive(Debug, Clone, Default)]
pub struct NewMetric {
    pub resource_id: String,
    pub ingest_token_id: String,
    pub name: String,
    pub kind: MetricKind,
    pub timestamp: i64,
    /// Scalar value of the sample, per the documented precedence rule.
    pub value: f64,
    pub aggregation_temporality: Option<i32>,
    pub is_monotonic: Option<bool>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub count: Option<i64>,
    pub sum: Option<f64>,
}

/// One bucket of a histogram sample.
#[derive(Debug, Clone, PartialEq)]
pub struct HistogramBucketRow {
    pub bucket_index: i32,
    pub explicit_bound: Option<f64>,
    pub bucket_count: i64,
}

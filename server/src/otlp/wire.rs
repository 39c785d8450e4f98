//! Explicit serde model of the OTLP JSON subset accepted on ingest
//!
//! Only the shapes the ingestion pipeline consumes are modeled: resource
//! span/metric blocks with their scope blocks, spans with events and links,
//! and gauge/sum/histogram metric points. Proto3 JSON renders 64-bit integer
//! fields as decimal strings; the deserializers here accept both strings and
//! numbers. Unknown fields are ignored.

use serde::{Deserialize, Deserializer};

// ============================================================================
// INTEGER-AS-STRING DECODING
// ============================================================================

#[derive(Deserialize)]
#[serde(untagged)]
enum RawU64 {
    Num(u64),
    Str(String),
}

impl RawU64 {
    fn parse<E: serde::de::Error>(self) -> Result<u64, E> {
        match self {
            Self::Num(n) => Ok(n),
            Self::Str(s) => s.parse::<u64>().map_err(serde::de::Error::custom),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawI64 {
    Num(i64),
    Str(String),
}

fn opt_u64<'de, D: Deserializer<'de>>(de: D) -> Result<Option<u64>, D::Error> {
    match Option::<RawU64>::deserialize(de)? {
        None => Ok(None),
        Some(raw) => raw.parse().map(Some),
    }
}

fn opt_i64<'de, D: Deserializer<'de>>(de: D) -> Result<Option<i64>, D::Error> {
    match Option::<RawI64>::deserialize(de)? {
        None => Ok(None),
        Some(RawI64::Num(n)) => Ok(Some(n)),
        Some(RawI64::Str(s)) => s.parse::<i64>().map(Some).map_err(serde::de::Error::custom),
    }
}

fn u64_vec<'de, D: Deserializer<'de>>(de: D) -> Result<Vec<u64>, D::Error> {
    Vec::<RawU64>::deserialize(de)?
        .into_iter()
        .map(RawU64::parse)
        .collect()
}

// ============================================================================
// COMMON
// ============================================================================

/// Top-level ingest payload: optional trace and metric sections.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExportPayload {
    pub resource_spans: Vec<ResourceSpans>,
    pub resource_metrics: Vec<ResourceMetrics>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Resource {
    pub attributes: Vec<KeyValue>,
    pub dropped_attributes_count: u32,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Scope {
    pub name: String,
    pub version: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct KeyValue {
    pub key: String,
    pub value: Option<AnyValue>,
}

/// The OTLP typed-value union, modeled permissively: at most one field is
/// populated; a value where none are is handled by the attribute codec's
/// fallback rather than rejected here.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnyValue {
    pub string_value: Option<String>,
    #[serde(deserialize_with = "opt_i64")]
    pub int_value: Option<i64>,
    pub double_value: Option<f64>,
    pub bool_value: Option<bool>,
    pub array_value: Option<ArrayValue>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ArrayValue {
    pub values: Vec<AnyValue>,
}

// ============================================================================
// TRACES
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResourceSpans {
    pub resource: Option<Resource>,
    pub scope_spans: Vec<ScopeSpans>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScopeSpans {
    pub scope: Option<Scope>,
    pub spans: Vec<Span>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Span {
    pub trace_id: String,
    pub span_id: String,
    pub parent_span_id: String,
    pub name: String,
    pub kind: i32,
    #[serde(deserialize_with = "opt_u64")]
    pub start_time_unix_nano: Option<u64>,
    #[serde(deserialize_with = "opt_u64")]
    pub end_time_unix_nano: Option<u64>,
    pub attributes: Vec<KeyValue>,
    pub dropped_attributes_count: u32,
    pub events: Vec<SpanEvent>,
    pub dropped_events_count: u32,
    pub links: Vec<SpanLink>,
    pub dropped_links_count: u32,
    pub status: Option<Status>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SpanEvent {
    #[serde(deserialize_with = "opt_u64")]
    pub time_unix_nano: Option<u64>,
    pub name: String,
    pub attributes: Vec<KeyValue>,
    pub dropped_attributes_count: u32,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SpanLink {
    pub trace_id: String,
    pub span_id: String,
    pub trace_state: String,
    pub attributes: Vec<KeyValue>,
    pub dropped_attributes_count: u32,
}

/// Span status; code 2 signals an error.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Status {
    pub message: String,
    pub code: i32,
}

// ============================================================================
// METRICS
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResourceMetrics {
    pub resource: Option<Resource>,
    pub scope_metrics: Vec<ScopeMetrics>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScopeMetrics {
    pub scope: Option<Scope>,
    pub metrics: Vec<Metric>,
}

/// A metric carries exactly one of the three supported data shapes.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Metric {
    pub name: String,
    pub description: String,
    pub unit: String,
    pub gauge: Option<Gauge>,
    pub sum: Option<Sum>,
    pub histogram: Option<Histogram>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Gauge {
    pub data_points: Vec<NumberDataPoint>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Sum {
    pub data_points: Vec<NumberDataPoint>,
    pub aggregation_temporality: i32,
    pub is_monotonic: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Histogram {
    pub data_points: Vec<HistogramDataPoint>,
    pub aggregation_temporality: i32,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NumberDataPoint {
    pub attributes: Vec<KeyValue>,
    #[serde(deserialize_with = "opt_u64")]
    pub start_time_unix_nano: Option<u64>,
    #[serde(deserialize_with = "opt_u64")]
    pub time_unix_nano: Option<u64>,
    pub as_double: Option<f64>,
    #[serde(deserialize_with = "opt_i64")]
    pub as_int: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HistogramDataPoint {
    pub attributes: Vec<KeyValue>,
    #[serde(deserialize_with = "opt_u64")]
    pub start_time_unix_nano: Option<u64>,
    #[serde(deserialize_with = "opt_u64")]
    pub time_unix_nano: Option<u64>,
    #[serde(deserialize_with = "opt_u64")]
    pub count: Option<u64>,
    pub sum: Option<f64>,
    #[serde(deserialize_with = "u64_vec")]
    pub bucket_counts: Vec<u64>,
    pub explicit_bounds: Vec<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_empty_payload() {
        let payload: ExportPayload = serde_json::from_str("{}").unwrap();
        assert!(payload.resource_spans.is_empty());
        assert!(payload.resource_metrics.is_empty());
    }

    #[test]
    fn test_decode_span_with_string_nanos() {
        let json = r#"{
            "resourceSpans": [{
                "resource": {
                    "attributes": [
                        {"key": "service.name", "value": {"stringValue": "checkout"}}
                    ]
                },
                "scopeSpans": [{
                    "spans": [{
                        "traceId": "5b8efff798038103d269b633813fc60c",
                        "spanId": "eee19b7ec3c1b174",
                        "name": "GET /cart",
                        "startTimeUnixNano": "1704067200000000000",
                        "endTimeUnixNano": "1704067200250000000",
                        "status": {"code": 2, "message": "boom"}
                    }]
                }]
            }]
        }"#;

        let payload: ExportPayload = serde_json::from_str(json).unwrap();
        let span = &payload.resource_spans[0].scope_spans[0].spans[0];
        assert_eq!(span.name, "GET /cart");
        assert_eq!(span.start_time_unix_nano, Some(1_704_067_200_000_000_000));
        assert_eq!(span.end_time_unix_nano, Some(1_704_067_200_250_000_000));
        assert_eq!(span.status.as_ref().unwrap().code, 2);
        assert!(span.parent_span_id.is_empty());
    }

    #[test]
    fn test_decode_nanos_as_number() {
        let json = r#"{"spans": [{"spanId": "a", "startTimeUnixNano": 1500000000}]}"#;
        let scope: ScopeSpans = serde_json::from_str(json).unwrap();
        assert_eq!(scope.spans[0].start_time_unix_nano, Some(1_500_000_000));
    }

    #[test]
    fn test_decode_int_value_as_string() {
        let json = r#"{"key": "retries", "value": {"intValue": "42"}}"#;
        let kv: KeyValue = serde_json::from_str(json).unwrap();
        assert_eq!(kv.value.unwrap().int_value, Some(42));
    }

    #[test]
    fn test_decode_unknown_value_shape_yields_empty_union() {
        let json = r#"{"key": "blob", "value": {"bytesValue": "aGk="}}"#;
        let kv: KeyValue = serde_json::from_str(json).unwrap();
        let value = kv.value.unwrap();
        assert!(value.string_value.is_none());
        assert!(value.int_value.is_none());
        assert!(value.double_value.is_none());
        assert!(value.bool_value.is_none());
        assert!(value.array_value.is_none());
    }

    #[test]
    fn test_decode_histogram_bucket_count_strings() {
        let json = r#"{
            "timeUnixNano": "1704067200000000000",
            "count": "100",
            "sum": 500.0,
            "bucketCounts": ["10", "20", 70],
            "explicitBounds": [1.0, 5.0]
        }"#;
        let dp: HistogramDataPoint = serde_json::from_str(json).unwrap();
        assert_eq!(dp.count, Some(100));
        assert_eq!(dp.bucket_counts, vec![10, 20, 70]);
        assert_eq!(dp.explicit_bounds, vec![1.0, 5.0]);
    }

    #[test]
    fn test_decode_sum_metric() {
        let json = r#"{
            "name": "http.requests",
            "sum": {
                "aggregationTemporality": 2,
                "isMonotonic": true,
                "dataPoints": [{"timeUnixNano": "1", "asInt": "100"}]
            }
        }"#;
        let metric: Metric = serde_json::from_str(json).unwrap();
        let sum = metric.sum.unwrap();
        assert_eq!(sum.aggregation_temporality, 2);
        assert!(sum.is_monotonic);
        assert_eq!(sum.data_points[0].as_int, Some(100));
        assert!(metric.gauge.is_none());
        assert!(metric.histogram.is_none());
    }
}

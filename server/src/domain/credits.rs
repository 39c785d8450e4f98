//! Credit policy for ingested telemetry
//!
//! Spans are the only billed signal today. The per-signal constants keep
//! the policy in one place so other signal types can be priced later.

use crate::otlp::wire::ExportPayload;

/// Credits charged per ingested span.
pub const CREDITS_PER_SPAN: i64 = 1;

/// Credits charged per ingested metric data point.
pub const CREDITS_PER_METRIC_POINT: i64 = 0;

/// Total spans across all resource and scope blocks.
pub fn span_count(payload: &ExportPayload) -> usize {
    payload
        .resource_spans
        .iter()
        .flat_map(|block| &block.scope_spans)
        .map(|scope| scope.spans.len())
        .sum()
}

/// Total metric data points across all resource and scope blocks.
pub fn metric_point_count(payload: &ExportPayload) -> usize {
    payload
        .resource_metrics
        .iter()
        .flat_map(|block| &block.scope_metrics)
        .flat_map(|scope| &scope.metrics)
        .map(|metric| {
            metric
                .gauge
                .as_ref()
                .map(|g| g.data_points.len())
                .or_else(|| metric.sum.as_ref().map(|s| s.data_points.len()))
                .or_else(|| metric.histogram.as_ref().map(|h| h.data_points.len()))
                .unwrap_or(0)
        })
        .sum()
}

/// Credits consumed by the whole batch, computed before any row is written.
pub fn total_credits(payload: &ExportPayload) -> i64 {
    span_count(payload) as i64 * CREDITS_PER_SPAN
        + metric_point_count(payload) as i64 * CREDITS_PER_METRIC_POINT
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::otlp::wire::{
        Gauge, Metric, NumberDataPoint, ResourceMetrics, ResourceSpans, ScopeMetrics, ScopeSpans,
        Span,
    };

    fn payload_with_spans(per_scope: &[usize]) -> ExportPayload {
        ExportPayload {
            resource_spans: vec![ResourceSpans {
                scope_spans: per_scope
                    .iter()
                    .map(|n| ScopeSpans {
                        spans: (0..*n).map(|_| Span::default()).collect(),
                        ..Default::default()
                    })
                    .collect(),
                ..Default::default()
            }],
            ..Default::default()
        }
    }

    #[test]
    fn test_span_count_across_scopes() {
        assert_eq!(span_count(&payload_with_spans(&[2, 3])), 5);
        assert_eq!(span_count(&ExportPayload::default()), 0);
    }

    #[test]
    fn test_total_credits_charges_spans_only() {
        let mut payload = payload_with_spans(&[4]);
        payload.resource_metrics = vec![ResourceMetrics {
            scope_metrics: vec![ScopeMetrics {
                metrics: vec![Metric {
                    name: "cpu.usage".to_string(),
                    gauge: Some(Gauge {
                        data_points: vec![NumberDataPoint::default(), NumberDataPoint::default()],
                    }),
                    ..Default::default()
                }],
                ..Default::default()
            }],
            ..Default::default()
        }];

        assert_eq!(span_count(&payload), 4);
        assert_eq!(metric_point_count(&payload), 2);
        assert_eq!(total_credits(&payload), 4);
    }
}

//! Trace and span materialization
//!
//! Spans are grouped into traces by (resource, ingest token, start time).
//! Trace rows are find-or-create; span rows and their attribute, event, and
//! link children are create-only — re-ingesting a span produces fresh rows.

use sqlx::PgConnection;

use super::IngestError;
use crate::data::postgres::repositories::trace;
use crate::data::types::{NewSpan, ResourceRow, TokenIdentity, TraceStatus};
use crate::domain::resources;
use crate::otlp::attribute::AttributeValue;
use crate::otlp::time::nanos_to_millis;
use crate::otlp::wire::{ResourceSpans, Span};

/// Materialize every span in the payload's resource span blocks.
/// Returns the number of spans written.
pub async fn ingest_resource_spans(
    conn: &mut PgConnection,
    identity: &TokenIdentity,
    blocks: &[ResourceSpans],
    now_ms: i64,
) -> Result<usize, IngestError> {
    let mut processed = 0usize;

    for block in blocks {
        let resource =
            resources::resolve(conn, &identity.user_id, block.resource.as_ref(), now_ms).await?;
        for scope in &block.scope_spans {
            for span in &scope.spans {
                ingest_span(conn, identity, &resource, span, now_ms).await?;
                processed += 1;
            }
        }
    }

    Ok(processed)
}

/// Converted span timing; start is structurally required.
#[derive(Debug, PartialEq)]
struct SpanTimes {
    start_time: i64,
    end_time: Option<i64>,
    duration_ms: Option<i64>,
}

fn span_times(span: &Span) -> Result<SpanTimes, IngestError> {
    let start_nanos = span.start_time_unix_nano.ok_or_else(|| {
        IngestError::MalformedPayload(format!(
            "span {} is missing startTimeUnixNano",
            if span.span_id.is_empty() {
                "<no id>"
            } else {
                span.span_id.as_str()
            }
        ))
    })?;
    let start_time = nanos_to_millis(start_nanos);
    let end_time = span.end_time_unix_nano.map(nanos_to_millis);
    Ok(SpanTimes {
        start_time,
        end_time,
        duration_ms: end_time.map(|end| end - start_time),
    })
}

async fn ingest_span(
    conn: &mut PgConnection,
    identity: &TokenIdentity,
    resource: &ResourceRow,
    span: &Span,
    now_ms: i64,
) -> Result<(), IngestError> {
    let times = span_times(span)?;
    let status_code = span.status.as_ref().map(|s| s.code);
    let trace_status = TraceStatus::from_status_code(status_code.unwrap_or(0));

    let trace_id = trace::find_or_create(
        conn,
        &resource.id,
        &identity.token_id,
        times.start_time,
        &span.name,
        trace_status,
        times.end_time,
        now_ms,
    )
    .await?;

    // Ownership link to the parent span row; resolvable only when the
    // parent landed in the same trace, in this batch or an earlier one.
    let parent_row_id = if span.parent_span_id.is_empty() {
        None
    } else {
        trace::find_span_by_wire_id(conn, &trace_id, &span.parent_span_id).await?
    };

    let span_row_id = trace::insert_span(
        conn,
        &NewSpan {
            trace_id: trace_id.clone(),
            parent_span_id: parent_row_id,
            otel_trace_id: span.trace_id.clone(),
            otel_span_id: span.span_id.clone(),
            otel_parent_span_id: (!span.parent_span_id.is_empty())
                .then(|| span.parent_span_id.clone()),
            name: span.name.clone(),
            kind: span.kind,
            service_name: resource.service_name.clone(),
            status_code,
            status_message: span
                .status
                .as_ref()
                .and_then(|s| (!s.message.is_empty()).then(|| s.message.clone())),
            start_time: times.start_time,
            end_time: times.end_time,
            duration_ms: times.duration_ms,
            dropped_attributes_count: span.dropped_attributes_count as i32,
            dropped_events_count: span.dropped_events_count as i32,
            dropped_links_count: span.dropped_links_count as i32,
            created_at: now_ms,
        },
    )
    .await?;

    for kv in &span.attributes {
        let value = AttributeValue::decode(kv.value.as_ref());
        trace::insert_span_attribute(conn, &span_row_id, &kv.key, &value).await?;
    }

    for event in &span.events {
        let event_id = trace::insert_event(
            conn,
            &span_row_id,
            &event.name,
            nanos_to_millis(event.time_unix_nano.unwrap_or(0)),
            event.dropped_attributes_count as i32,
        )
        .await?;
        for kv in &event.attributes {
            let value = AttributeValue::decode(kv.value.as_ref());
            trace::insert_event_attribute(conn, &event_id, &kv.key, &value).await?;
        }
    }

    for link in &span.links {
        let link_id = trace::insert_link(
            conn,
            &span_row_id,
            &link.trace_id,
            &link.span_id,
            (!link.trace_state.is_empty()).then_some(link.trace_state.as_str()),
            link.dropped_attributes_count as i32,
        )
        .await?;
        for kv in &link.attributes {
            let value = AttributeValue::decode(kv.value.as_ref());
            trace::insert_link_attribute(conn, &link_id, &kv.key, &value).await?;
        }
    }

    trace::increment_span_count(conn, &trace_id).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_times_requires_start() {
        let span = Span {
            span_id: "eee19b7ec3c1b174".to_string(),
            ..Default::default()
        };
        let err = span_times(&span).unwrap_err();
        assert!(matches!(err, IngestError::MalformedPayload(_)));
        assert!(err.to_string().contains("eee19b7ec3c1b174"));
    }

    #[test]
    fn test_span_times_computes_duration() {
        let span = Span {
            start_time_unix_nano: Some(1_704_067_200_000_000_000),
            end_time_unix_nano: Some(1_704_067_200_250_000_000),
            ..Default::default()
        };
        assert_eq!(
            span_times(&span).unwrap(),
            SpanTimes {
                start_time: 1_704_067_200_000,
                end_time: Some(1_704_067_200_250),
                duration_ms: Some(250),
            }
        );
    }

    #[test]
    fn test_span_times_open_ended_span() {
        let span = Span {
            start_time_unix_nano: Some(1_500_000_000),
            ..Default::default()
        };
        let times = span_times(&span).unwrap();
        assert_eq!(times.start_time, 1_500);
        assert_eq!(times.end_time, None);
        assert_eq!(times.duration_ms, None);
    }
}

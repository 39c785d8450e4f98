//! Trace and span repository
//!
//! Traces are find-or-create by (resource, ingest token, start time); spans
//! and their attribute/event/link children are create-only, so re-ingesting
//! the same span always produces fresh rows.

use sqlx::PgConnection;
use uuid::Uuid;

use crate::data::error::DataError;
use crate::data::types::{NewSpan, TraceStatus};
use crate::otlp::attribute::AttributeValue;

/// Find the owning trace for a span, creating it with the span's own
/// start time, name, and status as defaults. Returns the trace row id.
#[allow(clippy::too_many_arguments)]
pub async fn find_or_create(
    conn: &mut PgConnection,
    resource_id: &str,
    ingest_token_id: &str,
    start_time: i64,
    name: &str,
    status: TraceStatus,
    end_time: Option<i64>,
    now_ms: i64,
) -> Result<String, DataError> {
    let existing: Option<(String,)> = sqlx::query_as(
        "SELECT id FROM traces
         WHERE resource_id = $1 AND ingest_token_id = $2 AND start_time = $3",
    )
    .bind(resource_id)
    .bind(ingest_token_id)
    .bind(start_time)
    .fetch_optional(&mut *conn)
    .await?;

    if let Some((id,)) = existing {
        return Ok(id);
    }

    let id = Uuid::new_v4().to_string();
    sqlx::query(
        r#"INSERT INTO traces
               (id, resource_id, ingest_token_id, name, status, start_time, end_time, span_count, created_at)
           VALUES ($1, $2, $3, $4, $5, $6, $7, 0, $8)"#,
    )
    .bind(&id)
    .bind(resource_id)
    .bind(ingest_token_id)
    .bind(name)
    .bind(status.as_str())
    .bind(start_time)
    .bind(end_time)
    .bind(now_ms)
    .execute(&mut *conn)
    .await?;

    Ok(id)
}

pub async fn increment_span_count(
    conn: &mut PgConnection,
    trace_id: &str,
) -> Result<(), DataError> {
    sqlx::query("UPDATE traces SET span_count = span_count + 1 WHERE id = $1")
        .bind(trace_id)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

/// Insert a span row; returns its id.
pub async fn insert_span(conn: &mut PgConnection, span: &NewSpan) -> Result<String, DataError> {
    let id = Uuid::new_v4().to_string();
    sqlx::query(
        r#"INSERT INTO spans
               (id, trace_id, parent_span_id, otel_trace_id, otel_span_id, otel_parent_span_id,
                name, kind, service_name, status_code, status_message,
                start_time, end_time, duration_ms,
                dropped_attributes_count, dropped_events_count, dropped_links_count, created_at)
           VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18)"#,
    )
    .bind(&id)
    .bind(&span.trace_id)
    .bind(&span.parent_span_id)
    .bind(&span.otel_trace_id)
    .bind(&span.otel_span_id)
    .bind(&span.otel_parent_span_id)
    .bind(&span.name)
    .bind(span.kind)
    .bind(&span.service_name)
    .bind(span.status_code)
    .bind(&span.status_message)
    .bind(span.start_time)
    .bind(span.end_time)
    .bind(span.duration_ms)
    .bind(span.dropped_attributes_count)
    .bind(span.dropped_events_count)
    .bind(span.dropped_links_count)
    .bind(span.created_at)
    .execute(&mut *conn)
    .await?;
    Ok(id)
}

/// Most recent span row in a trace carrying the given wire span id, used to
/// resolve parent links.
pub async fn find_span_by_wire_id(
    conn: &mut PgConnection,
    trace_id: &str,
    otel_span_id: &str,
) -> Result<Option<String>, DataError> {
    let row: Option<(String,)> = sqlx::query_as(
        "SELECT id FROM spans
         WHERE trace_id = $1 AND otel_span_id = $2
         ORDER BY created_at DESC, id DESC
         LIMIT 1",
    )
    .bind(trace_id)
    .bind(otel_span_id)
    .fetch_optional(&mut *conn)
    .await?;
    Ok(row.map(|(id,)| id))
}

pub async fn insert_span_attribute(
    conn: &mut PgConnection,
    span_id: &str,
    key: &str,
    value: &AttributeValue,
) -> Result<(), DataError> {
    let parts = value.storage_parts();
    sqlx::query(
        r#"INSERT INTO span_attributes
               (span_id, key, kind, value_text, value_int, value_double, value_bool)
           VALUES ($1, $2, $3, $4, $5, $6, $7)"#,
    )
    .bind(span_id)
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

/// Insert a span event; returns its id.
pub async fn insert_event(
    conn: &mut PgConnection,
    span_id: &str,
    name: &str,
    time_ms: i64,
    dropped_attributes_count: i32,
) -> Result<String, DataError> {
    let id = Uuid::new_v4().to_string();
    sqlx::query(
        "INSERT INTO span_events (id, span_id, name, time, dropped_attributes_count)
         VALUES ($1, $2, $3, $4, $5)",
    )
    .bind(&id)
    .bind(span_id)
    .bind(name)
    .bind(time_ms)
    .bind(dropped_attributes_count)
    .execute(&mut *conn)
    .await?;
    Ok(id)
}

pub async fn insert_event_attribute(
    conn: &mut PgConnection,
    event_id: &str,
    key: &str,
    value: &AttributeValue,
) -> Result<(), DataError> {
    let parts = value.storage_parts();
    sqlx::query(
        r#"INSERT INTO span_event_attributes
               (event_id, key, kind, value_text, value_int, value_double, value_bool)
           VALUES ($1, $2, $3, $4, $5, $6, $7)"#,
    )
    .bind(event_id)
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

/// Insert a span link; returns its id.
pub async fn insert_link(
    conn: &mut PgConnection,
    span_id: &str,
    linked_trace_id: &str,
    linked_span_id: &str,
    trace_state: Option<&str>,
    dropped_attributes_count: i32,
) -> Result<String, DataError> {
    let id = Uuid::new_v4().to_string();
    sqlx::query(
        r#"INSERT INTO span_links
               (id, span_id, linked_trace_id, linked_span_id, trace_state, dropped_attributes_count)
           VALUES ($1, $2, $3, $4, $5, $6)"#,
    )
    .bind(&id)
    .bind(span_id)
    .bind(linked_trace_id)
    .bind(linked_span_id)
    .bind(trace_state)
    .bind(dropped_attributes_count)
    .execute(&mut *conn)
    .await?;
    Ok(id)
}

pub async fn insert_link_attribute(
    conn: &mut PgConnection,
    link_id: &str,
    key: &str,
    value: &AttributeValue,
) -> Result<(), DataError> {
    let parts = value.storage_parts();
    sqlx::query(
        r#"INSERT INTO span_link_attributes
               (link_id, key, kind, value_text, value_int, value_double, value_bool)
           VALUES ($1, $2, $3, $4, $5, $6, $7)"#,
    )
    .bind(link_id)
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

//! Resource repository: tenant-scoped service identities
//!
//! Resources are find-or-create by (user, name, version, namespace) with a
//! touch of `last_seen` on every hit; `first_seen` is immutable once set.
//! Attributes are first-write-wins per key.

use sqlx::PgConnection;
use uuid::Uuid;

use crate::data::error::DataError;
use crate::data::types::ResourceRow;
use crate::otlp::attribute::AttributeValue;

/// Find the resource by its identity key, creating it on first sight.
/// `last_seen` advances on every call, including the creating one.
pub async fn find_or_create(
    conn: &mut PgConnection,
    user_id: &str,
    service_name: &str,
    service_version: Option<&str>,
    service_namespace: Option<&str>,
    now_ms: i64,
) -> Result<ResourceRow, DataError> {
    let existing = sqlx::query_as::<_, (String, String, i64)>(
        r#"SELECT id, service_name, first_seen
           FROM resources
           WHERE user_id = $1 AND service_name = $2
             AND service_version IS NOT DISTINCT FROM $3
             AND service_namespace IS NOT DISTINCT FROM $4"#,
    )
    .bind(user_id)
    .bind(service_name)
    .bind(service_version)
    .bind(service_namespace)
    .fetch_optional(&mut *conn)
    .await?;

    if let Some((id, service_name, first_seen)) = existing {
        sqlx::query("UPDATE resources SET last_seen = $1 WHERE id = $2")
            .bind(now_ms)
            .bind(&id)
            .execute(&mut *conn)
            .await?;
        return Ok(ResourceRow {
            id,
            service_name,
            first_seen,
            last_seen: now_ms,
        });
    }

    let id = Uuid::new_v4().to_string();
    sqlx::query(
        r#"INSERT INTO resources
               (id, user_id, service_name, service_version, service_namespace, first_seen, last_seen)
           VALUES ($1, $2, $3, $4, $5, $6, $6)"#,
    )
    .bind(&id)
    .bind(user_id)
    .bind(service_name)
    .bind(service_version)
    .bind(service_namespace)
    .bind(now_ms)
    .execute(&mut *conn)
    .await?;

    Ok(ResourceRow {
        id,
        service_name: service_name.to_string(),
        first_seen: now_ms,
        last_seen: now_ms,
    })
}

/// Insert a reported attribute unless the key already exists for this
/// resource; existing values are never overwritten.
pub async fn upsert_attribute(
    conn: &mut PgConnection,
    resource_id: &str,
    key: &str,
    value: &AttributeValue,
) -> Result<(), DataError> {
    let parts = value.storage_parts();
    sqlx::query(
        r#"INSERT INTO resource_attributes
               (resource_id, key, kind, value_text, value_int, value_double, value_bool)
           VALUES ($1, $2, $3, $4, $5, $6, $7)
           ON CONFLICT (resource_id, key) DO NOTHING"#,
    )
    .bind(resource_id)
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

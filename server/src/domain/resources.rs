//! Resource resolution
//!
//! A resource is a tenant-scoped service identity: (user, service.name,
//! service.version, service.namespace) — not a single process instance.
//! First sight creates the row; every ingestion touches `last_seen`.
//! Reported attributes are stored first-write-wins per key.

use sqlx::PgConnection;

use crate::data::DataError;
use crate::data::postgres::repositories::resource;
use crate::data::types::ResourceRow;
use crate::otlp::attribute::AttributeValue;
use crate::otlp::wire::Resource;

/// Fallback when a resource reports no `service.name`.
pub const UNKNOWN_SERVICE: &str = "unknown";

/// Well-known resource attribute keys
pub mod keys {
    pub const SERVICE_NAME: &str = "service.name";
    pub const SERVICE_VERSION: &str = "service.version";
    pub const SERVICE_NAMESPACE: &str = "service.namespace";
}

/// Service identity extracted from a reported resource block.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceIdentity {
    pub name: String,
    pub version: Option<String>,
    pub namespace: Option<String>,
}

/// Pull the service.* identity out of the attribute list.
pub fn service_identity(reported: Option<&Resource>) -> ServiceIdentity {
    let mut identity = ServiceIdentity {
        name: UNKNOWN_SERVICE.to_string(),
        version: None,
        namespace: None,
    };
    let Some(reported) = reported else {
        return identity;
    };

    for kv in &reported.attributes {
        if let AttributeValue::Str(value) = AttributeValue::decode(kv.value.as_ref()) {
            if value.is_empty() {
                continue;
            }
            match kv.key.as_str() {
                keys::SERVICE_NAME => identity.name = value,
                keys::SERVICE_VERSION => identity.version = Some(value),
                keys::SERVICE_NAMESPACE => identity.namespace = Some(value),
                _ => {}
            }
        }
    }
    identity
}

/// Map a reported resource to its stable row for this user, creating it on
/// first sight and touching `last_seen` otherwise. Idempotent under
/// repeated identical calls except for `last_seen` advancing.
pub async fn resolve(
    conn: &mut PgConnection,
    user_id: &str,
    reported: Option<&Resource>,
    now_ms: i64,
) -> Result<ResourceRow, DataError> {
    let identity = service_identity(reported);
    let row = resource::find_or_create(
        conn,
        user_id,
        &identity.name,
        identity.version.as_deref(),
        identity.namespace.as_deref(),
        now_ms,
    )
    .await?;

    if let Some(reported) = reported {
        for kv in &reported.attributes {
            let value = AttributeValue::decode(kv.value.as_ref());
            resource::upsert_attribute(conn, &row.id, &kv.key, &value).await?;
        }
    }

    Ok(row)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::otlp::wire::{AnyValue, KeyValue};

    fn attr(key: &str, value: &str) -> KeyValue {
        KeyValue {
            key: key.to_string(),
            value: Some(AnyValue {
                string_value: Some(value.to_string()),
                ..Default::default()
            }),
        }
    }

    #[test]
    fn test_identity_defaults_to_unknown() {
        assert_eq!(
            service_identity(None),
            ServiceIdentity {
                name: UNKNOWN_SERVICE.to_string(),
                version: None,
                namespace: None,
            }
        );
        assert_eq!(
            service_identity(Some(&Resource::default())).name,
            UNKNOWN_SERVICE
        );
    }

    #[test]
    fn test_identity_extracts_service_fields() {
        let reported = Resource {
            attributes: vec![
                attr(keys::SERVICE_NAME, "checkout"),
                attr(keys::SERVICE_VERSION, "1.4.2"),
                attr(keys::SERVICE_NAMESPACE, "shop"),
                attr("host.name", "web-1"),
            ],
            ..Default::default()
        };
        assert_eq!(
            service_identity(Some(&reported)),
            ServiceIdentity {
                name: "checkout".to_string(),
                version: Some("1.4.2".to_string()),
                namespace: Some("shop".to_string()),
            }
        );
    }

    #[test]
    fn test_identity_ignores_empty_and_non_string_values() {
        let reported = Resource {
            attributes: vec![
                attr(keys::SERVICE_NAME, ""),
                KeyValue {
                    key: keys::SERVICE_VERSION.to_string(),
                    value: Some(AnyValue {
                        int_value: Some(2),
                        ..Default::default()
                    }),
                },
            ],
            ..Default::default()
        };
        let identity = service_identity(Some(&reported));
        assert_eq!(identity.name, UNKNOWN_SERVICE);
        assert_eq!(identity.version, None);
    }
}

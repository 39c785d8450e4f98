//! tracegate server library
//!
//! Multi-tenant OTLP telemetry ingestion: token-scoped request acceptance,
//! per-span credit accounting against monthly subscription quotas, and
//! transactional materialization of traces, spans, and metric samples into
//! PostgreSQL.

pub mod api;
pub mod core;
pub mod data;
pub mod domain;
pub mod otlp;

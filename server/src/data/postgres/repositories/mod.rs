//! Per-entity repositories
//!
//! Narrow async functions per entity, executing against `&mut PgConnection`
//! so they compose under a caller-owned transaction. The ingestion
//! coordinator owns the transaction; nothing here begins or commits one,
//! except token lookup which runs pre-transaction against the pool.

pub mod ingest_token;
pub mod metric;
pub mod resource;
pub mod trace;
pub mod user;

//! PostgreSQL schema definitions
//!
//! Timestamps are Unix milliseconds (BIGINT); identifiers are uuid-v4
//! strings stored as TEXT.

/// Current schema version
pub const SCHEMA_VERSION: i32 = 1;

/// Complete schema SQL
pub const SCHEMA: &str = r#"
-- =============================================================================
-- Infrastructure: Schema version tracking
-- =============================================================================
CREATE TABLE IF NOT EXISTS schema_version (
    id INTEGER PRIMARY KEY CHECK (id = 1),
    version INTEGER NOT NULL,
    applied_at BIGINT NOT NULL,
    description TEXT
);

-- =============================================================================
-- 1. Subscription tiers (must be before users due to FK)
-- =============================================================================
CREATE TABLE IF NOT EXISTS subscription_tiers (
    id TEXT PRIMARY KEY,
    tier TEXT NOT NULL UNIQUE CHECK(tier IN ('free', 'growth', 'scale', 'unlimited')),
    -- NULL = unlimited
    monthly_quota BIGINT,
    created_at BIGINT NOT NULL
);

-- =============================================================================
-- 2. Users
-- =============================================================================
CREATE TABLE IF NOT EXISTS users (
    id TEXT PRIMARY KEY,
    email TEXT UNIQUE CHECK(email IS NULL OR length(email) >= 3),
    monthly_counter BIGINT NOT NULL DEFAULT 0 CHECK(monthly_counter >= 0),
    last_counter_reset BIGINT NOT NULL,
    subscription_tier_id TEXT NOT NULL REFERENCES subscription_tiers(id),
    created_at BIGINT NOT NULL,
    updated_at BIGINT NOT NULL
);

-- =============================================================================
-- 3. Ingest tokens (references users)
-- =============================================================================
CREATE TABLE IF NOT EXISTS ingest_tokens (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    token TEXT NOT NULL UNIQUE,
    status TEXT NOT NULL DEFAULT 'live' CHECK(status IN ('live', 'deprecated')),
    created_at BIGINT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_ingest_tokens_user ON ingest_tokens(user_id);

-- =============================================================================
-- 4. Resources: tenant-scoped service identities
-- =============================================================================
CREATE TABLE IF NOT EXISTS resources (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    service_name TEXT NOT NULL,
    service_version TEXT,
    service_namespace TEXT,
    first_seen BIGINT NOT NULL,
    last_seen BIGINT NOT NULL
);

-- Identity key; NULL version/namespace collapse to '' so the key is total.
CREATE UNIQUE INDEX IF NOT EXISTS idx_resources_identity
    ON resources(user_id, service_name,
                 COALESCE(service_version, ''), COALESCE(service_namespace, ''));

CREATE TABLE IF NOT EXISTS resource_attributes (
    resource_id TEXT NOT NULL REFERENCES resources(id) ON DELETE CASCADE,
    key TEXT NOT NULL,
    kind TEXT NOT NULL,
    value_text TEXT,
    value_int BIGINT,
    value_double DOUBLE PRECISION,
    value_bool BOOLEAN,
    PRIMARY KEY (resource_id, key)
);

-- =============================================================================
-- 5. Traces and spans
-- =============================================================================
CREATE TABLE IF NOT EXISTS traces (
    id TEXT PRIMARY KEY,
    resource_id TEXT NOT NULL REFERENCES resources(id) ON DELETE CASCADE,
    ingest_token_id TEXT NOT NULL REFERENCES ingest_tokens(id),
    name TEXT NOT NULL,
    status TEXT NOT NULL DEFAULT 'ok' CHECK(status IN ('ok', 'error', 'timeout')),
    start_time BIGINT NOT NULL,
    end_time BIGINT,
    span_count BIGINT NOT NULL DEFAULT 0,
    created_at BIGINT NOT NULL,
    UNIQUE (resource_id, ingest_token_id, start_time)
);

CREATE TABLE IF NOT EXISTS spans (
    id TEXT PRIMARY KEY,
    trace_id TEXT NOT NULL REFERENCES traces(id) ON DELETE CASCADE,
    parent_span_id TEXT REFERENCES spans(id),
    otel_trace_id TEXT NOT NULL,
    otel_span_id TEXT NOT NULL,
    otel_parent_span_id TEXT,
    name TEXT NOT NULL,
    kind INTEGER NOT NULL DEFAULT 0,
    service_name TEXT NOT NULL,
    status_code INTEGER,
    status_message TEXT,
    start_time BIGINT NOT NULL,
    end_time BIGINT,
    duration_ms BIGINT,
    dropped_attributes_count INTEGER NOT NULL DEFAULT 0,
    dropped_events_count INTEGER NOT NULL DEFAULT 0,
    dropped_links_count INTEGER NOT NULL DEFAULT 0,
    created_at BIGINT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_spans_trace ON spans(trace_id);
CREATE INDEX IF NOT EXISTS idx_spans_wire_id ON spans(trace_id, otel_span_id);

CREATE TABLE IF NOT EXISTS span_attributes (
    id BIGSERIAL PRIMARY KEY,
    span_id TEXT NOT NULL REFERENCES spans(id) ON DELETE CASCADE,
    key TEXT NOT NULL,
    kind TEXT NOT NULL,
    value_text TEXT,
    value_int BIGINT,
    value_double DOUBLE PRECISION,
    value_bool BOOLEAN
);

CREATE INDEX IF NOT EXISTS idx_span_attributes_span ON span_attributes(span_id);

CREATE TABLE IF NOT EXISTS span_events (
    id TEXT PRIMARY KEY,
    span_id TEXT NOT NULL REFERENCES spans(id) ON DELETE CASCADE,
    name TEXT NOT NULL,
    time BIGINT NOT NULL,
    dropped_attributes_count INTEGER NOT NULL DEFAULT 0
);

CREATE INDEX IF NOT EXISTS idx_span_events_span ON span_events(span_id);

CREATE TABLE IF NOT EXISTS span_event_attributes (
    id BIGSERIAL PRIMARY KEY,
    event_id TEXT NOT NULL REFERENCES span_events(id) ON DELETE CASCADE,
    key TEXT NOT NULL,
    kind TEXT NOT NULL,
    value_text TEXT,
    value_int BIGINT,
    value_double DOUBLE PRECISION,
    value_bool BOOLEAN
);

CREATE TABLE IF NOT EXISTS span_links (
    id TEXT PRIMARY KEY,
    span_id TEXT NOT NULL REFERENCES spans(id) ON DELETE CASCADE,
    linked_trace_id TEXT NOT NULL,
    linked_span_id TEXT NOT NULL,
    trace_state TEXT,
    dropped_attributes_count INTEGER NOT NULL DEFAULT 0
);

CREATE INDEX IF NOT EXISTS idx_span_links_span ON span_links(span_id);

CREATE TABLE IF NOT EXISTS span_link_attributes (
    id BIGSERIAL PRIMARY KEY,
    link_id TEXT NOT NULL REFERENCES span_links(id) ON DELETE CASCADE,
    key TEXT NOT NULL,
    kind TEXT NOT NULL,
    value_text TEXT,
    value_int BIGINT,
    value_double DOUBLE PRECISION,
    value_bool BOOLEAN
);

-- =============================================================================
-- 6. Metric samples
-- =============================================================================
CREATE TABLE IF NOT EXISTS metrics (
    id TEXT PRIMARY KEY,
    resource_id TEXT NOT NULL REFERENCES resources(id) ON DELETE CASCADE,
    ingest_token_id TEXT NOT NULL REFERENCES ingest_tokens(id),
    name TEXT NOT NULL,
    kind TEXT NOT NULL CHECK(kind IN ('counter', 'gauge', 'histogram')),
    timestamp BIGINT NOT NULL,
    value DOUBLE PRECISION NOT NULL,
    aggregation_temporality INTEGER,
    is_monotonic BOOLEAN,
    min DOUBLE PRECISION,
    max DOUBLE PRECISION,
    count BIGINT,
    sum DOUBLE PRECISION,
    created_at BIGINT NOT NULL
);

-- Serves the cumulative dedup lookup: latest sample by (resource, name, value).
CREATE INDEX IF NOT EXISTS idx_metrics_dedup
    ON metrics(resource_id, name, value, timestamp DESC);

CREATE TABLE IF NOT EXISTS metric_attributes (
    id BIGSERIAL PRIMARY KEY,
    metric_id TEXT NOT NULL REFERENCES metrics(id) ON DELETE CASCADE,
    key TEXT NOT NULL,
    kind TEXT NOT NULL,
    value_text TEXT,
    value_int BIGINT,
    value_double DOUBLE PRECISION,
    value_bool BOOLEAN
);

CREATE INDEX IF NOT EXISTS idx_metric_attributes_metric ON metric_attributes(metric_id);

CREATE TABLE IF NOT EXISTS histogram_buckets (
    metric_id TEXT NOT NULL REFERENCES metrics(id) ON DELETE CASCADE,
    bucket_index INTEGER NOT NULL,
    explicit_bound DOUBLE PRECISION,
    bucket_count BIGINT NOT NULL,
    PRIMARY KEY (metric_id, bucket_index)
);
"#;

/// Default data seeded on a fresh database
pub const DEFAULT_DATA: &str = r#"
INSERT INTO subscription_tiers (id, tier, monthly_quota, created_at) VALUES
    ('ae0f5202-0000-4000-8000-000000000001', 'free', 10000, (EXTRACT(EPOCH FROM now()) * 1000)::BIGINT),
    ('ae0f5202-0000-4000-8000-000000000002', 'growth', 100000, (EXTRACT(EPOCH FROM now()) * 1000)::BIGINT),
    ('ae0f5202-0000-4000-8000-000000000003', 'scale', 1000000, (EXTRACT(EPOCH FROM now()) * 1000)::BIGINT),
    ('ae0f5202-0000-4000-8000-000000000004', 'unlimited', NULL, (EXTRACT(EPOCH FROM now()) * 1000)::BIGINT)
ON CONFLICT (tier) DO NOTHING;
"#;

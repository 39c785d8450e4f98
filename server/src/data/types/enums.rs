//! Classification enums persisted as text columns
//!
//! Each enum round-trips through `as_str`/`parse` so the repositories can
//! store and reload it without stringly-typed drift.

use serde::{Deserialize, Serialize};

// ============================================================================
// ACCOUNT ENUMS
// ============================================================================

/// Subscription tier names; quota limits live on the tier row, not here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TierKind {
    #[default]
    Free,
    Growth,
    Scale,
    Unlimited,
}

impl TierKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Free => "free",
            Self::Growth => "growth",
            Self::Scale => "scale",
            Self::Unlimited => "unlimited",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "free" => Some(Self::Free),
            "growth" => Some(Self::Growth),
            "scale" => Some(Self::Scale),
            "unlimited" => Some(Self::Unlimited),
            _ => None,
        }
    }
}

/// Ingest token lifecycle. Revocation flips to `Deprecated`, never deletes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TokenStatus {
    #[default]
    Live,
    Deprecated,
}

impl TokenStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Live => "live",
            Self::Deprecated => "deprecated",
        }
    }
}

// ============================================================================
// TELEMETRY ENUMS
// ============================================================================

/// Trace status derived from span status codes at creation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TraceStatus {
    #[default]
    Ok,
    Error,
    Timeout,
}

impl TraceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Error => "error",
            Self::Timeout => "timeout",
        }
    }

    /// OTLP status code 2 signals an error; everything else is ok.
    pub fn from_status_code(code: i32) -> Self {
        if code == 2 { Self::Error } else { Self::Ok }
    }
}

/// Stored metric kind; an OTLP sum is stored as a counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MetricKind {
    Counter,
    #[default]
    Gauge,
    Histogram,
}

impl MetricKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Counter => "counter",
            Self::Gauge => "gauge",
            Self::Histogram => "histogram",
        }
    }
}

/// OTLP aggregation temporality
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum AggregationTemporality {
    #[default]
    Unspecified,
    Delta,
    Cumulative,
}

impl AggregationTemporality {
    pub fn from_i32(value: i32) -> Self {
        match value {
            1 => Self::Delta,
            2 => Self::Cumulative,
            _ => Self::Unspecified,
        }
    }
}

/// Attribute value kind tag, paired with the value columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AttrKind {
    #[default]
    String,
    Int,
    Double,
    Bool,
    Array,
}

impl AttrKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Int => "int",
            Self::Double => "double",
            Self::Bool => "bool",
            Self::Array => "array",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "string" => Some(Self::String),
            "int" => Some(Self::Int),
            "double" => Some(Self::Double),
            "bool" => Some(Self::Bool),
            "array" => Some(Self::Array),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_kind_roundtrip() {
        for tier in [
            TierKind::Free,
            TierKind::Growth,
            TierKind::Scale,
            TierKind::Unlimited,
        ] {
            assert_eq!(TierKind::parse(tier.as_str()), Some(tier));
        }
        assert_eq!(TierKind::parse("enterprise"), None);
    }

    #[test]
    fn test_trace_status_from_status_code() {
        assert_eq!(TraceStatus::from_status_code(0), TraceStatus::Ok);
        assert_eq!(TraceStatus::from_status_code(1), TraceStatus::Ok);
        assert_eq!(TraceStatus::from_status_code(2), TraceStatus::Error);
        assert_eq!(TraceStatus::from_status_code(3), TraceStatus::Ok);
    }

    #[test]
    fn test_aggregation_temporality_from_i32() {
        assert_eq!(
            AggregationTemporality::from_i32(0),
            AggregationTemporality::Unspecified
        );
        assert_eq!(
            AggregationTemporality::from_i32(1),
            AggregationTemporality::Delta
        );
        assert_eq!(
            AggregationTemporality::from_i32(2),
            AggregationTemporality::Cumulative
        );
        assert_eq!(
            AggregationTemporality::from_i32(99),
            AggregationTemporality::Unspecified
        );
    }

    #[test]
    fn test_attr_kind_roundtrip() {
        for kind in [
            AttrKind::String,
            AttrKind::Int,
            AttrKind::Double,
            AttrKind::Bool,
            AttrKind::Array,
        ] {
            assert_eq!(AttrKind::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(AttrKind::parse("bytes"), None);
    }

    #[test]
    fn test_tier_kind_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&TierKind::Growth).unwrap(),
            r#""growth""#
        );
    }
}

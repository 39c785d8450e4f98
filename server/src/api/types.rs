//! Response bodies for the ingestion API

use serde::Serialize;

use crate::domain::quota::UsageSnapshot;

/// 200: the batch landed and was billed.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestAccepted {
    pub message: &'static str,
    pub spans_processed: usize,
    pub metrics_processed: usize,
}

/// 429: nothing was written; usage detail lets clients prompt an upgrade.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuotaExceededBody {
    pub message: &'static str,
    pub quota_info: UsageSnapshot,
}

/// Generic error body; never carries internal detail.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::types::TierKind;

    #[test]
    fn test_quota_exceeded_body_shape() {
        let body = QuotaExceededBody {
            message: "monthly ingestion quota exceeded",
            quota_info: UsageSnapshot {
                current_usage: 998,
                monthly_quota: Some(1000),
                tier: TierKind::Growth,
            },
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["quotaInfo"]["currentUsage"], 998);
        assert_eq!(json["quotaInfo"]["monthlyQuota"], 1000);
        assert_eq!(json["quotaInfo"]["tier"], "growth");
    }

    #[test]
    fn test_unlimited_quota_serializes_as_null() {
        let snapshot = UsageSnapshot {
            current_usage: 12,
            monthly_quota: None,
            tier: TierKind::Unlimited,
        };
        let json = serde_json::to_value(&snapshot).unwrap();
        assert!(json["monthlyQuota"].is_null());
    }

    #[test]
    fn test_ingest_accepted_is_camel_case() {
        let body = IngestAccepted {
            message: "telemetry accepted",
            spans_processed: 3,
            metrics_processed: 1,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["spansProcessed"], 3);
        assert_eq!(json["metricsProcessed"], 1);
    }
}

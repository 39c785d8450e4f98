//! Quota ledger
//!
//! Decides whether an ingestion may proceed and applies the consumption to
//! the user's monthly counter, all under the caller's transaction. The user
//! row is locked `FOR UPDATE` so concurrent ingests for the same user
//! serialize on the counter instead of racing its read-modify-write; the
//! lock is released at commit or rollback.

use chrono::{DateTime, Months, Utc};
use serde::Serialize;
use sqlx::PgConnection;

use crate::data::DataError;
use crate::data::postgres::repositories::user;
use crate::data::types::TierKind;
use crate::otlp::time::millis_to_datetime;

/// Usage state reported back to the client.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageSnapshot {
    pub current_usage: i64,
    pub monthly_quota: Option<i64>,
    pub tier: TierKind,
}

#[derive(Debug)]
pub enum QuotaOutcome {
    /// Credits were consumed; the snapshot reflects the post-increment counter.
    Allowed(UsageSnapshot),
    /// Nothing was consumed; the snapshot reflects the pre-request counter.
    Exceeded(UsageSnapshot),
}

/// Atomically decide and apply credit consumption for one batch.
///
/// A calendar-month rollover resets the counter before the request is
/// evaluated. Unlimited tiers always consume; bounded tiers reject when the
/// batch would overshoot, with no partial consumption.
pub async fn check_and_consume(
    conn: &mut PgConnection,
    user_id: &str,
    credits: i64,
    now: DateTime<Utc>,
) -> Result<QuotaOutcome, DataError> {
    let row = user::lock_for_quota(conn, user_id)
        .await?
        .ok_or_else(|| DataError::Conflict(format!("no user {user_id} for live ingest token")))?;

    let mut counter = row.monthly_counter;
    if rollover_due(millis_to_datetime(row.last_counter_reset), now) {
        user::reset_monthly_counter(conn, user_id, now.timestamp_millis()).await?;
        tracing::debug!(user_id, "monthly quota counter rolled over");
        counter = 0;
    }

    match evaluate(counter, row.monthly_quota, credits) {
        Decision::Reject => Ok(QuotaOutcome::Exceeded(UsageSnapshot {
            current_usage: counter,
            monthly_quota: row.monthly_quota,
            tier: row.tier,
        })),
        Decision::Consume => {
            let current =
                user::add_consumed_credits(conn, user_id, credits, now.timestamp_millis()).await?;
            Ok(QuotaOutcome::Allowed(UsageSnapshot {
                current_usage: current,
                monthly_quota: row.monthly_quota,
                tier: row.tier,
            }))
        }
    }
}

/// A reset is due once the last reset is at least one calendar month old.
fn rollover_due(last_reset: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    match now.checked_sub_months(Months::new(1)) {
        Some(threshold) => last_reset <= threshold,
        None => false,
    }
}

#[derive(Debug, PartialEq)]
enum Decision {
    Consume,
    Reject,
}

/// Pure admission rule. The counter is kept for reporting even on
/// unlimited tiers, so those always consume.
fn evaluate(counter: i64, monthly_quota: Option<i64>, credits: i64) -> Decision {
    match monthly_quota {
        None => Decision::Consume,
        Some(quota) if counter + credits > quota => Decision::Reject,
        Some(_) => Decision::Consume,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn utc(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_rollover_not_due_within_month() {
        assert!(!rollover_due(utc(2026, 3, 20), utc(2026, 4, 10)));
        assert!(!rollover_due(utc(2026, 4, 10), utc(2026, 4, 10)));
    }

    #[test]
    fn test_rollover_due_at_month_boundary() {
        // Exactly one calendar month counts as due.
        assert!(rollover_due(utc(2026, 3, 10), utc(2026, 4, 10)));
        assert!(rollover_due(utc(2026, 1, 5), utc(2026, 4, 10)));
    }

    #[test]
    fn test_rollover_handles_month_length_differences() {
        // Mar 31 minus one month clamps to Feb 28.
        assert!(rollover_due(utc(2026, 2, 28), utc(2026, 3, 31)));
        assert!(!rollover_due(utc(2026, 3, 1), utc(2026, 3, 31)));
    }

    #[test]
    fn test_evaluate_unlimited_always_consumes() {
        assert_eq!(evaluate(i64::MAX / 2, None, 1_000), Decision::Consume);
    }

    #[test]
    fn test_evaluate_rejects_overshoot_without_partial_consumption() {
        // Growth tier at 998/1000: 3 spans reject, 2 spans fit exactly.
        assert_eq!(evaluate(998, Some(1000), 3), Decision::Reject);
        assert_eq!(evaluate(998, Some(1000), 2), Decision::Consume);
    }

    #[test]
    fn test_evaluate_boundary_cases() {
        assert_eq!(evaluate(0, Some(10), 10), Decision::Consume);
        assert_eq!(evaluate(0, Some(10), 11), Decision::Reject);
        assert_eq!(evaluate(10, Some(10), 0), Decision::Consume);
    }
}

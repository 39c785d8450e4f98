//! User repository: quota counter state
//!
//! The monthly counter is only ever mutated through these functions, inside
//! the ingestion transaction, with the user row locked `FOR UPDATE` so
//! concurrent ingests for the same user serialize instead of racing the
//! read-modify-write.

use sqlx::PgConnection;

use crate::data::error::DataError;
use crate::data::types::{TierKind, UserQuotaRow};

/// Load the user's quota state joined with its subscription tier, taking a
/// row lock on the user that is held until the transaction ends.
pub async fn lock_for_quota(
    conn: &mut PgConnection,
    user_id: &str,
) -> Result<Option<UserQuotaRow>, DataError> {
    let row = sqlx::query_as::<_, (i64, i64, Option<i64>, String)>(
        r#"SELECT u.monthly_counter, u.last_counter_reset, t.monthly_quota, t.tier
           FROM users u
           JOIN subscription_tiers t ON t.id = u.subscription_tier_id
           WHERE u.id = $1
           FOR UPDATE OF u"#,
    )
    .bind(user_id)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(row.map(
        |(monthly_counter, last_counter_reset, monthly_quota, tier)| UserQuotaRow {
            monthly_counter,
            last_counter_reset,
            monthly_quota,
            tier: TierKind::parse(&tier).unwrap_or(TierKind::Free),
        },
    ))
}

/// Zero the monthly counter on calendar rollover.
pub async fn reset_monthly_counter(
    conn: &mut PgConnection,
    user_id: &str,
    now_ms: i64,
) -> Result<(), DataError> {
    sqlx::query(
        "UPDATE users SET monthly_counter = 0, last_counter_reset = $1, updated_at = $1
         WHERE id = $2",
    )
    .bind(now_ms)
    .bind(user_id)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

/// Add consumed credits to the monthly counter; returns the new counter.
pub async fn add_consumed_credits(
    conn: &mut PgConnection,
    user_id: &str,
    credits: i64,
    now_ms: i64,
) -> Result<i64, DataError> {
    let (counter,): (i64,) = sqlx::query_as(
        "UPDATE users SET monthly_counter = monthly_counter + $1, updated_at = $2
         WHERE id = $3
         RETURNING monthly_counter",
    )
    .bind(credits)
    .bind(now_ms)
    .bind(user_id)
    .fetch_one(&mut *conn)
    .await?;
    Ok(counter)
}

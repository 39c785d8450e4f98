//! Ingest token repository
//!
//! Tokens authorize ingestion only while `live`. Revocation is a status
//! flip to `deprecated`, never a delete, so a revoked token simply stops
//! matching here.

use sqlx::PgPool;

use crate::data::error::DataError;
use crate::data::types::{TokenIdentity, TokenStatus};

/// Resolve a presented token to its owning user, exact match on live tokens.
pub async fn find_live(pool: &PgPool, token: &str) -> Result<Option<TokenIdentity>, DataError> {
    let row: Option<(String, String)> =
        sqlx::query_as("SELECT id, user_id FROM ingest_tokens WHERE token = $1 AND status = $2")
            .bind(token)
            .bind(TokenStatus::Live.as_str())
            .fetch_optional(pool)
            .await?;

    Ok(row.map(|(token_id, user_id)| TokenIdentity { token_id, user_id }))
}

//! Ingest token authentication
//!
//! The ingestion endpoint is authorized by a bearer ingest token. Only a
//! `live` token authorizes; revocation flips its status to `deprecated`
//! (never a delete), after which the exact-match lookup stops matching.

use axum::http::{HeaderMap, header};
use sqlx::PgPool;

use crate::data::DataError;
use crate::data::postgres::repositories::ingest_token;
use crate::data::types::TokenIdentity;

/// Extract the token from an `Authorization: Bearer` header.
pub fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty())
}

/// Resolve a presented token to its owning user; `None` means reject.
pub async fn authorize(pool: &PgPool, token: &str) -> Result<Option<TokenIdentity>, DataError> {
    ingest_token::find_live(pool, token).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_bearer_token_extracted() {
        let headers = headers_with("Bearer tg-1a2b3c4d");
        assert_eq!(bearer_token(&headers), Some("tg-1a2b3c4d".to_string()));
    }

    #[test]
    fn test_bearer_token_trims_whitespace() {
        let headers = headers_with("Bearer   tg-1a2b3c4d  ");
        assert_eq!(bearer_token(&headers), Some("tg-1a2b3c4d".to_string()));
    }

    #[test]
    fn test_bearer_token_rejects_other_schemes() {
        assert_eq!(bearer_token(&headers_with("Basic dXNlcjpwYXNz")), None);
        assert_eq!(bearer_token(&headers_with("Bearer ")), None);
        assert_eq!(bearer_token(&HeaderMap::new()), None);
    }
}

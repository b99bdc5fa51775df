use axum::{
    Json,
    extract::{Query, State, rejection::QueryRejection},
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::{error, warn};

use technoid_db::models::MessageRow;
use technoid_types::models::Message;

use crate::error::ApiError;
use crate::state::AppState;

const FETCH_FAILED: &str = "Failed to fetch messages.";

#[derive(Debug, Deserialize)]
pub struct ContactsQuery {
    pub key: Option<String>,
}

/// GET /api/contacts?key=...
///
/// The key is a single shared secret, not a per-user credential.
pub async fn list_contacts(
    State(state): State<AppState>,
    query: Result<Query<ContactsQuery>, QueryRejection>,
) -> Result<Json<Vec<Message>>, ApiError> {
    let given = query.ok().and_then(|Query(q)| q.key).unwrap_or_default();
    let authorized = match state.admin_key.as_deref() {
        Some(expected) if !expected.is_empty() => keys_match(&given, expected),
        _ => false,
    };
    if !authorized {
        warn!("Rejected contact listing: bad or missing key");
        return Err(ApiError::Unauthorized);
    }

    // Run blocking DB query off the async runtime
    let db = state.clone();
    let rows = tokio::task::spawn_blocking(move || db.db.list_messages())
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            ApiError::Internal(FETCH_FAILED)
        })?
        .map_err(|source| ApiError::Persistence {
            public: FETCH_FAILED,
            source,
        })?;

    let messages = rows.into_iter().map(to_message).collect::<Result<Vec<_>, _>>()?;
    Ok(Json(messages))
}

/// Byte comparison whose running time does not depend on where the inputs differ.
fn keys_match(given: &str, expected: &str) -> bool {
    let (a, b) = (given.as_bytes(), expected.as_bytes());
    a.len() == b.len() && a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

fn to_message(row: MessageRow) -> Result<Message, ApiError> {
    let created_at = row.created_at.parse::<DateTime<Utc>>().map_err(|e| {
        error!("Corrupt created_at '{}' on message {}: {}", row.created_at, row.id, e);
        ApiError::Internal(FETCH_FAILED)
    })?;

    Ok(Message {
        id: row.id,
        name: row.name,
        email: row.email,
        message: row.message,
        created_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_match_requires_exact_bytes() {
        assert!(keys_match("s3cret", "s3cret"));
        assert!(!keys_match("s3cre", "s3cret"));
        assert!(!keys_match("s3creT", "s3cret"));
        assert!(!keys_match("", "s3cret"));
    }

    fn row(created_at: &str) -> MessageRow {
        MessageRow {
            id: 7,
            name: "Ada".into(),
            email: "ada@example.com".into(),
            message: "Hello".into(),
            created_at: created_at.into(),
        }
    }

    #[test]
    fn converts_store_timestamps() {
        let Ok(message) = to_message(row("2026-10-18T09:30:15.250Z")) else {
            panic!("store timestamp should parse");
        };
        assert_eq!(message.id, 7);
        assert_eq!(message.created_at.to_rfc3339(), "2026-10-18T09:30:15.250+00:00");
    }

    #[test]
    fn corrupt_timestamp_fails_the_listing() {
        assert!(matches!(
            to_message(row("yesterday")),
            Err(ApiError::Internal(FETCH_FAILED))
        ));
        assert!(matches!(
            to_message(row("2026-10-18 09:30:15")),
            Err(ApiError::Internal(_))
        ));
    }
}

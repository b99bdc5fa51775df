use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A contact-form submission as stored by the backend.
///
/// Messages are write-once: the store assigns `id` and `created_at` at insert
/// and nothing ever updates or deletes a row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

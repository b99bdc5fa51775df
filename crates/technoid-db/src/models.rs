/// Database row types. These map directly to SQLite rows and stay
/// independent of the wire types in technoid-types.

pub struct MessageRow {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub message: String,
    /// RFC 3339, UTC, millisecond precision.
    pub created_at: String,
}

#[derive(Debug)]
pub struct InsertedMessage {
    pub id: i64,
    pub created_at: String,
}

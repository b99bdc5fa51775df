use crate::models::{InsertedMessage, MessageRow};
use crate::{Database, Result};
use rusqlite::Connection;

impl Database {
    // -- Messages --

    /// Insert a contact message. The store assigns `id` and `created_at`.
    pub fn insert_message(&self, name: &str, email: &str, message: &str) -> Result<InsertedMessage> {
        self.with_conn_mut(|conn| {
            let inserted = conn.query_row(
                "INSERT INTO messages (name, email, message) VALUES (?1, ?2, ?3)
                 RETURNING id, created_at",
                (name, email, message),
                |row| {
                    Ok(InsertedMessage {
                        id: row.get(0)?,
                        created_at: row.get(1)?,
                    })
                },
            )?;
            Ok(inserted)
        })
    }

    /// All messages, newest first.
    pub fn list_messages(&self) -> Result<Vec<MessageRow>> {
        self.with_conn(query_messages)
    }

    /// Round-trip a trivial query through a reader connection.
    pub fn ping(&self) -> Result<i64> {
        self.with_conn(|conn| Ok(conn.query_row("SELECT 1 + 1", [], |row| row.get(0))?))
    }
}

fn query_messages(conn: &Connection) -> Result<Vec<MessageRow>> {
    let mut stmt = conn.prepare_cached(
        "SELECT id, name, email, message, created_at
         FROM messages
         ORDER BY id DESC",
    )?;

    let rows = stmt
        .query_map([], |row| {
            Ok(MessageRow {
                id: row.get(0)?,
                name: row.get(1)?,
                email: row.get(2)?,
                message: row.get(3)?,
                created_at: row.get(4)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn open_temp() -> (TempDir, Database) {
        let dir = TempDir::new().expect("temp dir");
        let db = Database::open(&dir.path().join("contact.db"), 2).expect("open db");
        (dir, db)
    }

    #[test]
    fn insert_assigns_increasing_ids_and_timestamps() {
        let (_dir, db) = open_temp();

        let first = db.insert_message("Ada", "ada@example.com", "Hello").unwrap();
        let second = db.insert_message("Grace", "grace@example.com", "Hi there").unwrap();

        assert!(second.id > first.id);
        assert!(first.created_at.ends_with('Z'));
        assert!(!second.created_at.is_empty());
    }

    #[test]
    fn list_returns_newest_first() {
        let (_dir, db) = open_temp();
        for i in 0..5 {
            db.insert_message(&format!("user{}", i), "u@example.com", "body").unwrap();
        }

        let rows = db.list_messages().unwrap();
        assert_eq!(rows.len(), 5);
        assert_eq!(rows[0].name, "user4");
        assert_eq!(rows[4].name, "user0");
        assert!(rows.windows(2).all(|w| w[0].id > w[1].id));
    }

    #[test]
    fn list_is_empty_on_fresh_store() {
        let (_dir, db) = open_temp();
        assert!(db.list_messages().unwrap().is_empty());
    }

    #[test]
    fn empty_fields_violate_table_constraints() {
        let (_dir, db) = open_temp();
        let err = db.insert_message("", "a@example.com", "body").unwrap_err();
        assert!(matches!(err, crate::DbError::Store(_)));
        assert!(db.list_messages().unwrap().is_empty());
    }

    #[test]
    fn readers_rotate_and_all_see_writes() {
        let (_dir, db) = open_temp();
        db.insert_message("Ada", "ada@example.com", "Hello").unwrap();

        for _ in 0..db.reader_count() * 2 {
            assert_eq!(db.list_messages().unwrap().len(), 1);
        }
    }

    #[test]
    fn ping_round_trips() {
        let (_dir, db) = open_temp();
        assert_eq!(db.ping().unwrap(), 2);
    }

    #[test]
    fn reopen_keeps_existing_rows() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("contact.db");
        {
            let db = Database::open(&path, 1).unwrap();
            db.insert_message("Ada", "ada@example.com", "Hello").unwrap();
        }
        let db = Database::open(&path, 1).unwrap();
        let rows = db.list_messages().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].email, "ada@example.com");
    }

    #[test]
    fn open_existing_refuses_missing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("typo.db");

        let result = Database::open_existing(&path, 1);

        assert!(matches!(result, Err(crate::DbError::Unavailable(_))));
        assert!(!path.exists());
    }

    #[test]
    fn open_existing_reads_created_store() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("contact.db");
        Database::open(&path, 1)
            .unwrap()
            .insert_message("Ada", "ada@example.com", "Hello")
            .unwrap();

        let db = Database::open_existing(&path, 1).unwrap();
        assert_eq!(db.ping().unwrap(), 2);
        assert_eq!(db.list_messages().unwrap().len(), 1);
    }
}

//! Database Connection and Setup
//!
//! Manages the SQLite connection and migrations.

use rusqlite::Connection;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Shared connection handle; `None` until initialized or after `close`
pub type SharedConnection = Arc<Mutex<Option<Connection>>>;

/// Database state wrapper
#[derive(Clone, Default)]
pub struct DbState {
    pub conn: SharedConnection,
}

impl DbState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle shared with the repositories
    pub fn connection(&self) -> SharedConnection {
        self.conn.clone()
    }

    /// Drop the connection; repositories report "not initialized" afterwards
    pub async fn close(&self) {
        self.conn.lock().await.take();
    }
}

/// Initialize database with path (":memory:" for an in-memory database)
pub async fn init_db(db_path: &Path) -> Result<DbState, String> {
    let conn = if db_path == Path::new(":memory:") {
        Connection::open_in_memory()
    } else {
        Connection::open(db_path)
    }
    .map_err(|e| format!("Failed to open db: {}", e))?;

    run_migrations(&conn)?;

    let state = DbState::new();
    *state.conn.lock().await = Some(conn);
    Ok(state)
}

/// Check if a column exists in a table
fn column_exists(conn: &Connection, table: &str, column: &str) -> bool {
    let query = format!("PRAGMA table_info({})", table);
    let Ok(mut stmt) = conn.prepare(&query) else {
        return false;
    };
    let Ok(names) = stmt.query_map([], |row| row.get::<_, String>(1)) else {
        return false;
    };
    let found = names.flatten().any(|name| name == column);
    found
}

/// Run database migrations
fn run_migrations(conn: &Connection) -> Result<(), String> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS boards (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL,
            created_at INTEGER
        );
        CREATE TABLE IF NOT EXISTS lists (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            board_id INTEGER NOT NULL,
            title TEXT NOT NULL,
            order_key TEXT NOT NULL
        );
        CREATE TABLE IF NOT EXISTS notes (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            list_id INTEGER NOT NULL,
            content TEXT NOT NULL,
            order_key TEXT NOT NULL
        );",
    )
    .map_err(|e| e.to_string())?;

    // Added after the first schema: last-writer-wins bookkeeping
    for table in ["lists", "notes"] {
        if !column_exists(conn, table, "updated_at") {
            conn.execute(&format!("ALTER TABLE {} ADD COLUMN updated_at INTEGER", table), [])
                .map_err(|e| format!("Failed to add updated_at to {}: {}", table, e))?;
        }
    }

    // Ordered sibling queries
    conn.execute_batch(
        "CREATE INDEX IF NOT EXISTS idx_lists_board ON lists(board_id, order_key);
         CREATE INDEX IF NOT EXISTS idx_notes_list ON notes(list_id, order_key);",
    )
    .map_err(|e| e.to_string())?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_migrations_are_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("board.db");

        let first = init_db(&path).await.expect("first init");
        first.close().await;
        let second = init_db(&path).await.expect("second init");

        let guard = second.conn.lock().await;
        let conn = guard.as_ref().unwrap();
        assert!(column_exists(conn, "notes", "updated_at"));
        assert!(column_exists(conn, "lists", "order_key"));
    }
}

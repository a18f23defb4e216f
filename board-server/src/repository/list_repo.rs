//! List Repository
//!
//! SQLite-backed CRUD for lists. Ordering operations come from the
//! positioning module through `SiblingStore`.

use async_trait::async_trait;
use rusqlite::{params, Row};

use super::db::SharedConnection;
use super::positioning::{self, SiblingStore, SiblingTable};
use super::traits::Repository;
use crate::domain::{DomainError, DomainResult, List};

impl SiblingTable for List {
    const TABLE: &'static str = "lists";
    const PARENT_COLUMN: &'static str = "board_id";
    const PARENT_TABLE: &'static str = "boards";
    const COLUMNS: &'static str = "id, board_id, title, order_key, updated_at";

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(List {
            id: row.get(0)?,
            board_id: row.get(1)?,
            title: row.get(2)?,
            order_key: row.get(3)?,
            updated_at: row.get(4)?,
        })
    }
}

pub struct ListRepository {
    conn: SharedConnection,
    rebalance_threshold: Option<usize>,
}

impl ListRepository {
    pub fn new(conn: SharedConnection) -> Self {
        Self {
            conn,
            rebalance_threshold: None,
        }
    }

    pub fn with_rebalance_threshold(mut self, threshold: Option<usize>) -> Self {
        self.rebalance_threshold = threshold;
        self
    }
}

impl SiblingStore for ListRepository {
    type Item = List;

    fn connection(&self) -> &SharedConnection {
        &self.conn
    }

    fn rebalance_threshold(&self) -> Option<usize> {
        self.rebalance_threshold
    }
}

fn not_initialized() -> DomainError {
    DomainError::Internal("Database not initialized".to_string())
}

#[async_trait]
impl Repository<List> for ListRepository {
    /// Appends the list at the end of its board
    async fn create(&self, entity: &List) -> DomainResult<List> {
        let guard = self.conn.lock().await;
        let conn = guard.as_ref().ok_or_else(not_initialized)?;

        let board_exists: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM boards WHERE id = ?)",
            params![entity.board_id],
            |row| row.get(0),
        )?;
        if !board_exists {
            return Err(DomainError::NotFound(format!("Board {} not found", entity.board_id)));
        }

        let order_key = positioning::next_key::<List>(conn, entity.board_id)?;
        let updated_at = chrono::Utc::now().timestamp_millis();
        conn.execute(
            "INSERT INTO lists (board_id, title, order_key, updated_at) VALUES (?, ?, ?, ?)",
            params![entity.board_id, entity.title, order_key, updated_at],
        )?;
        Ok(List {
            id: conn.last_insert_rowid() as u32,
            board_id: entity.board_id,
            title: entity.title.clone(),
            order_key,
            updated_at: Some(updated_at),
        })
    }

    async fn find_by_id(&self, id: u32) -> DomainResult<Option<List>> {
        let guard = self.conn.lock().await;
        let conn = guard.as_ref().ok_or_else(not_initialized)?;
        positioning::find(conn, id)
    }

    async fn list(&self) -> DomainResult<Vec<List>> {
        let guard = self.conn.lock().await;
        let conn = guard.as_ref().ok_or_else(not_initialized)?;
        let sql = format!("SELECT {} FROM lists ORDER BY board_id, order_key, id", List::COLUMNS);
        let mut stmt = conn.prepare(&sql)?;
        let lists = stmt.query_map([], |row| List::from_row(row))?;
        Ok(lists.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// Updates the title only; moves go through `PositioningOperations`
    async fn update(&self, entity: &List) -> DomainResult<List> {
        let guard = self.conn.lock().await;
        let conn = guard.as_ref().ok_or_else(not_initialized)?;
        let changed = conn.execute(
            "UPDATE lists SET title = ?, updated_at = ? WHERE id = ?",
            params![entity.title, chrono::Utc::now().timestamp_millis(), entity.id],
        )?;
        if changed == 0 {
            return Err(DomainError::NotFound(format!("List {} not found", entity.id)));
        }
        positioning::find(conn, entity.id)?
            .ok_or_else(|| DomainError::NotFound(format!("List {} not found", entity.id)))
    }

    async fn delete(&self, id: u32) -> DomainResult<()> {
        let guard = self.conn.lock().await;
        let conn = guard.as_ref().ok_or_else(not_initialized)?;

        // Manual cascade: the list's notes go first
        let tx = conn.unchecked_transaction()?;
        tx.execute("DELETE FROM notes WHERE list_id = ?", params![id])?;
        tx.execute("DELETE FROM lists WHERE id = ?", params![id])?;
        tx.commit()?;
        Ok(())
    }
}

//! Board Repository
//!
//! SQLite-backed CRUD for boards. Deleting a board deletes its lists and
//! their notes.

use async_trait::async_trait;
use rusqlite::{params, OptionalExtension, Row};

use super::db::SharedConnection;
use super::traits::Repository;
use crate::domain::{Board, DomainError, DomainResult};

pub struct BoardRepository {
    conn: SharedConnection,
}

impl BoardRepository {
    pub fn new(conn: SharedConnection) -> Self {
        Self { conn }
    }
}

fn row_to_board(row: &Row<'_>) -> rusqlite::Result<Board> {
    Ok(Board {
        id: row.get(0)?,
        title: row.get(1)?,
        created_at: row.get(2)?,
    })
}

fn not_initialized() -> DomainError {
    DomainError::Internal("Database not initialized".to_string())
}

#[async_trait]
impl Repository<Board> for BoardRepository {
    async fn create(&self, entity: &Board) -> DomainResult<Board> {
        let guard = self.conn.lock().await;
        let conn = guard.as_ref().ok_or_else(not_initialized)?;

        let created_at = chrono::Utc::now().timestamp_millis();
        conn.execute(
            "INSERT INTO boards (title, created_at) VALUES (?, ?)",
            params![entity.title, created_at],
        )?;
        Ok(Board {
            id: conn.last_insert_rowid() as u32,
            title: entity.title.clone(),
            created_at: Some(created_at),
        })
    }

    async fn find_by_id(&self, id: u32) -> DomainResult<Option<Board>> {
        let guard = self.conn.lock().await;
        let conn = guard.as_ref().ok_or_else(not_initialized)?;
        Ok(conn
            .query_row(
                "SELECT id, title, created_at FROM boards WHERE id = ?",
                params![id],
                row_to_board,
            )
            .optional()?)
    }

    async fn list(&self) -> DomainResult<Vec<Board>> {
        let guard = self.conn.lock().await;
        let conn = guard.as_ref().ok_or_else(not_initialized)?;
        let mut stmt = conn.prepare("SELECT id, title, created_at FROM boards ORDER BY id")?;
        let boards = stmt.query_map([], row_to_board)?;
        Ok(boards.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    async fn update(&self, entity: &Board) -> DomainResult<Board> {
        let guard = self.conn.lock().await;
        let conn = guard.as_ref().ok_or_else(not_initialized)?;
        let changed = conn.execute(
            "UPDATE boards SET title = ? WHERE id = ?",
            params![entity.title, entity.id],
        )?;
        if changed == 0 {
            return Err(DomainError::NotFound(format!("Board {} not found", entity.id)));
        }
        Ok(entity.clone())
    }

    async fn delete(&self, id: u32) -> DomainResult<()> {
        let guard = self.conn.lock().await;
        let conn = guard.as_ref().ok_or_else(not_initialized)?;

        // Manual cascade: notes, then lists, then the board
        let tx = conn.unchecked_transaction()?;
        tx.execute(
            "DELETE FROM notes WHERE list_id IN (SELECT id FROM lists WHERE board_id = ?)",
            params![id],
        )?;
        tx.execute("DELETE FROM lists WHERE board_id = ?", params![id])?;
        tx.execute("DELETE FROM boards WHERE id = ?", params![id])?;
        tx.commit()?;
        Ok(())
    }
}

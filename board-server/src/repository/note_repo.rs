//! Note Repository
//!
//! SQLite-backed CRUD for notes. A note's parent is its list; moving a note
//! to another list is a positioning operation.

use async_trait::async_trait;
use rusqlite::{params, Row};

use super::db::SharedConnection;
use super::positioning::{self, SiblingStore, SiblingTable};
use super::traits::Repository;
use crate::domain::{DomainError, DomainResult, Note};

impl SiblingTable for Note {
    const TABLE: &'static str = "notes";
    const PARENT_COLUMN: &'static str = "list_id";
    const PARENT_TABLE: &'static str = "lists";
    const COLUMNS: &'static str = "id, list_id, content, order_key, updated_at";

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Note {
            id: row.get(0)?,
            list_id: row.get(1)?,
            content: row.get(2)?,
            order_key: row.get(3)?,
            updated_at: row.get(4)?,
        })
    }
}

pub struct NoteRepository {
    conn: SharedConnection,
    rebalance_threshold: Option<usize>,
}

impl NoteRepository {
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

impl SiblingStore for NoteRepository {
    type Item = Note;

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
impl Repository<Note> for NoteRepository {
    /// Appends the note at the end of its list
    async fn create(&self, entity: &Note) -> DomainResult<Note> {
        let guard = self.conn.lock().await;
        let conn = guard.as_ref().ok_or_else(not_initialized)?;

        let list_exists: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM lists WHERE id = ?)",
            params![entity.list_id],
            |row| row.get(0),
        )?;
        if !list_exists {
            return Err(DomainError::NotFound(format!("List {} not found", entity.list_id)));
        }

        let order_key = positioning::next_key::<Note>(conn, entity.list_id)?;
        let updated_at = chrono::Utc::now().timestamp_millis();
        conn.execute(
            "INSERT INTO notes (list_id, content, order_key, updated_at) VALUES (?, ?, ?, ?)",
            params![entity.list_id, entity.content, order_key, updated_at],
        )?;
        Ok(Note {
            id: conn.last_insert_rowid() as u32,
            list_id: entity.list_id,
            content: entity.content.clone(),
            order_key,
            updated_at: Some(updated_at),
        })
    }

    async fn find_by_id(&self, id: u32) -> DomainResult<Option<Note>> {
        let guard = self.conn.lock().await;
        let conn = guard.as_ref().ok_or_else(not_initialized)?;
        positioning::find(conn, id)
    }

    async fn list(&self) -> DomainResult<Vec<Note>> {
        let guard = self.conn.lock().await;
        let conn = guard.as_ref().ok_or_else(not_initialized)?;
        let sql = format!("SELECT {} FROM notes ORDER BY list_id, order_key, id", Note::COLUMNS);
        let mut stmt = conn.prepare(&sql)?;
        let notes = stmt.query_map([], |row| Note::from_row(row))?;
        Ok(notes.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// Updates the content only; moves go through `PositioningOperations`
    async fn update(&self, entity: &Note) -> DomainResult<Note> {
        let guard = self.conn.lock().await;
        let conn = guard.as_ref().ok_or_else(not_initialized)?;
        let changed = conn.execute(
            "UPDATE notes SET content = ?, updated_at = ? WHERE id = ?",
            params![entity.content, chrono::Utc::now().timestamp_millis(), entity.id],
        )?;
        if changed == 0 {
            return Err(DomainError::NotFound(format!("Note {} not found", entity.id)));
        }
        positioning::find(conn, entity.id)?
            .ok_or_else(|| DomainError::NotFound(format!("Note {} not found", entity.id)))
    }

    async fn delete(&self, id: u32) -> DomainResult<()> {
        let guard = self.conn.lock().await;
        let conn = guard.as_ref().ok_or_else(not_initialized)?;
        conn.execute("DELETE FROM notes WHERE id = ?", params![id])?;
        Ok(())
    }
}

//! Positioning Operations
//!
//! Order-key management shared by every ordered table. A move re-derives
//! the key from the authoritative siblings instead of trusting the client's
//! guess, and never touches other siblings' keys (except when rebalancing).

use async_trait::async_trait;
use order_key::{key_beside, mid_key, spread_keys, Placement};
use rusqlite::{params, Connection, OptionalExtension, Row};

use super::db::SharedConnection;
use super::traits::{HierarchyOperations, PositioningOperations};
use crate::domain::{DomainError, DomainResult, MoveRequest, Positioned};

/// Table layout of an ordered entity
pub trait SiblingTable: Positioned + 'static {
    /// Table holding the entities
    const TABLE: &'static str;
    /// Column referencing the parent
    const PARENT_COLUMN: &'static str;
    /// Table holding the parents
    const PARENT_TABLE: &'static str;
    /// Column list matching `from_row`
    const COLUMNS: &'static str;

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self>;
}

/// A repository over one ordered table
pub trait SiblingStore: Send + Sync {
    type Item: SiblingTable;

    fn connection(&self) -> &SharedConnection;

    /// Rebalance a parent after a move whose key grew longer than this
    fn rebalance_threshold(&self) -> Option<usize>;
}

fn not_initialized() -> DomainError {
    DomainError::Internal("Database not initialized".to_string())
}

fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

pub(super) fn find<T: SiblingTable>(conn: &Connection, id: u32) -> DomainResult<Option<T>> {
    let sql = format!("SELECT {} FROM {} WHERE id = ?", T::COLUMNS, T::TABLE);
    Ok(conn.query_row(&sql, params![id], |row| T::from_row(row)).optional()?)
}

pub(super) fn children<T: SiblingTable>(conn: &Connection, parent_id: u32) -> DomainResult<Vec<T>> {
    let sql = format!(
        "SELECT {} FROM {} WHERE {} = ? ORDER BY order_key, id",
        T::COLUMNS,
        T::TABLE,
        T::PARENT_COLUMN
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![parent_id], |row| T::from_row(row))?;
    Ok(rows.collect::<rusqlite::Result<Vec<T>>>()?)
}

fn parent_exists<T: SiblingTable>(conn: &Connection, parent_id: u32) -> DomainResult<bool> {
    let sql = format!("SELECT 1 FROM {} WHERE id = ?", T::PARENT_TABLE);
    Ok(conn.query_row(&sql, params![parent_id], |_| Ok(())).optional()?.is_some())
}

pub(super) fn next_key<T: SiblingTable>(conn: &Connection, parent_id: u32) -> DomainResult<String> {
    let sql = format!(
        "SELECT MAX(order_key) FROM {} WHERE {} = ?",
        T::TABLE,
        T::PARENT_COLUMN
    );
    let last: Option<String> = conn.query_row(&sql, params![parent_id], |row| row.get(0))?;
    Ok(mid_key(last.as_deref().unwrap_or(""), ""))
}

fn set_placement<T: SiblingTable>(
    conn: &Connection,
    id: u32,
    parent_id: u32,
    order_key: &str,
) -> DomainResult<()> {
    let sql = format!(
        "UPDATE {} SET {} = ?, order_key = ?, updated_at = ? WHERE id = ?",
        T::TABLE,
        T::PARENT_COLUMN
    );
    conn.execute(&sql, params![parent_id, order_key, now_millis(), id])?;
    Ok(())
}

/// Rewrite every key under a parent, preserving the current order.
///
/// Runs inside the caller's transaction.
fn rewrite_keys<T: SiblingTable>(conn: &Connection, parent_id: u32) -> DomainResult<usize> {
    let siblings: Vec<T> = children(conn, parent_id)?;
    let keys = spread_keys(siblings.len());

    let sql = format!("UPDATE {} SET order_key = ?, updated_at = ? WHERE id = ?", T::TABLE);
    let now = now_millis();
    for (sibling, key) in siblings.iter().zip(&keys) {
        conn.execute(&sql, params![key, now, sibling.id()])?;
    }

    log::info!("Rebalanced {} {} under {} {}", keys.len(), T::TABLE, T::PARENT_COLUMN, parent_id);
    Ok(keys.len())
}

/// Rewrite every key under a parent in one transaction
pub(super) fn rebalance<T: SiblingTable>(conn: &Connection, parent_id: u32) -> DomainResult<usize> {
    let tx = conn.unchecked_transaction()?;
    let count = rewrite_keys::<T>(&tx, parent_id)?;
    tx.commit()?;
    Ok(count)
}

/// Key for `request`, derived from the persisted siblings.
///
/// Returns `None` if the sibling keys around the anchor are not strictly
/// ordered (duplicates left behind by concurrent writers).
fn derive_key<T: SiblingTable>(
    item: &T,
    request: &MoveRequest,
    siblings: &[T],
) -> DomainResult<Option<String>> {
    let others: Vec<&str> = siblings
        .iter()
        .filter(|s| s.id() != item.id())
        .map(|s| s.order_key())
        .collect();

    let Some(target_id) = request.target_id else {
        let last = others.last().copied().unwrap_or("");
        return Ok(Some(mid_key(last, "")));
    };

    let anchor_full = siblings
        .iter()
        .position(|s| s.id() == target_id)
        .ok_or_else(|| DomainError::NotFound(format!("Anchor {} not found", target_id)))?;
    let source_full = siblings.iter().position(|s| s.id() == item.id());
    let placement = Placement::from_drag(source_full, anchor_full);

    // Index of the anchor once the moved item is taken out
    let anchor = match source_full {
        Some(source) if source < anchor_full => anchor_full - 1,
        _ => anchor_full,
    };
    Ok(key_beside(&others, anchor, placement))
}

/// Move an entity next to its anchor inside one transaction
pub(super) fn move_to<T: SiblingTable>(
    conn: &Connection,
    request: &MoveRequest,
    threshold: Option<usize>,
) -> DomainResult<T> {
    let item: T = find(conn, request.id)?
        .ok_or_else(|| DomainError::NotFound(format!("{} {} not found", T::TABLE, request.id)))?;
    if !parent_exists::<T>(conn, request.parent_id)? {
        return Err(DomainError::NotFound(format!(
            "{} {} not found",
            T::PARENT_TABLE,
            request.parent_id
        )));
    }
    if request.target_id == Some(request.id) {
        return Ok(item);
    }

    let tx = conn.unchecked_transaction()?;
    let siblings: Vec<T> = children(&tx, request.parent_id)?;
    let key = match derive_key(&item, request, &siblings)? {
        Some(key) => key,
        None => {
            log::warn!(
                "Unordered keys under {} {}, rebalancing before move",
                T::PARENT_COLUMN,
                request.parent_id
            );
            rewrite_keys::<T>(&tx, request.parent_id)?;
            let siblings: Vec<T> = children(&tx, request.parent_id)?;
            derive_key(&item, request, &siblings)?
                .ok_or_else(|| DomainError::Conflict("Sibling keys still unordered".to_string()))?
        }
    };

    set_placement::<T>(&tx, item.id(), request.parent_id, &key)?;
    if threshold.is_some_and(|max| key.len() > max) {
        log::info!("Key {:?} exceeds threshold, rebalancing", key);
        rewrite_keys::<T>(&tx, request.parent_id)?;
    }
    tx.commit()?;

    log::debug!(
        "Moved {} {} under {} {} with key {:?}",
        T::TABLE,
        item.id(),
        T::PARENT_COLUMN,
        request.parent_id,
        key
    );
    find(conn, item.id())?
        .ok_or_else(|| DomainError::NotFound(format!("{} {} vanished", T::TABLE, item.id())))
}

#[async_trait]
impl<S: SiblingStore> HierarchyOperations<S::Item> for S {
    async fn get_children(&self, parent_id: u32) -> DomainResult<Vec<S::Item>> {
        let guard = self.connection().lock().await;
        let conn = guard.as_ref().ok_or_else(not_initialized)?;
        children(conn, parent_id)
    }
}

#[async_trait]
impl<S: SiblingStore> PositioningOperations<S::Item> for S {
    async fn next_key(&self, parent_id: u32) -> DomainResult<String> {
        let guard = self.connection().lock().await;
        let conn = guard.as_ref().ok_or_else(not_initialized)?;
        next_key::<S::Item>(conn, parent_id)
    }

    async fn move_to(&self, request: &MoveRequest) -> DomainResult<S::Item> {
        let guard = self.connection().lock().await;
        let conn = guard.as_ref().ok_or_else(not_initialized)?;
        move_to(conn, request, self.rebalance_threshold())
    }

    async fn rebalance(&self, parent_id: u32) -> DomainResult<usize> {
        let guard = self.connection().lock().await;
        let conn = guard.as_ref().ok_or_else(not_initialized)?;
        rebalance::<S::Item>(conn, parent_id)
    }
}

//! Maintenance Commands
//!
//! Rewrite a collection's keys to short, evenly spread values.

use crate::domain::{List, Note};
use crate::repository::PositioningOperations;
use crate::AppState;

/// Rebalance the lists of a board; returns the number of rewritten keys
pub async fn rebalance_lists(state: &AppState, board_id: u32) -> Result<usize, String> {
    PositioningOperations::<List>::rebalance(&state.lists, board_id)
        .await
        .map_err(|e| e.to_string())
}

/// Rebalance the notes of a list; returns the number of rewritten keys
pub async fn rebalance_notes(state: &AppState, list_id: u32) -> Result<usize, String> {
    PositioningOperations::<Note>::rebalance(&state.notes, list_id)
        .await
        .map_err(|e| e.to_string())
}

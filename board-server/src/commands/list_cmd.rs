//! List Commands
//!
//! CRUD plus reordering of the lists on a board.

use crate::domain::{List, MoveRequest};
use crate::repository::{HierarchyOperations, PositioningOperations, Repository};
use crate::AppState;

/// Create a list at the end of a board
pub async fn create_list(state: &AppState, board_id: u32, title: String) -> Result<List, String> {
    state
        .lists
        .create(&List::new(0, board_id, title))
        .await
        .map_err(|e| e.to_string())
}

/// Lists of a board in display order
pub async fn get_board_lists(state: &AppState, board_id: u32) -> Result<Vec<List>, String> {
    state.lists.get_children(board_id).await.map_err(|e| e.to_string())
}

/// Rename a list
pub async fn rename_list(state: &AppState, id: u32, title: String) -> Result<List, String> {
    let mut list = state
        .lists
        .find_by_id(id)
        .await
        .map_err(|e| e.to_string())?
        .ok_or_else(|| format!("List {} not found", id))?;
    list.title = title;
    state.lists.update(&list).await.map_err(|e| e.to_string())
}

/// Move a list next to another list and return the canonical record
pub async fn move_list(state: &AppState, request: MoveRequest) -> Result<List, String> {
    log::info!(
        "move_list: id={}, target={:?}, board={}",
        request.id,
        request.target_id,
        request.parent_id
    );
    state.lists.move_to(&request).await.map_err(|e| {
        log::warn!("move_list {} failed: {}", request.id, e);
        e.to_string()
    })
}

/// Delete a list and its notes
pub async fn delete_list(state: &AppState, id: u32) -> Result<(), String> {
    state.lists.delete(id).await.map_err(|e| e.to_string())
}

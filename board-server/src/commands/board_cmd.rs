//! Board Commands
//!
//! Create and inspect boards.

use crate::domain::Board;
use crate::repository::Repository;
use crate::AppState;

/// Create a new board
pub async fn create_board(state: &AppState, title: String) -> Result<Board, String> {
    state
        .boards
        .create(&Board::new(0, title))
        .await
        .map_err(|e| e.to_string())
}

/// List all boards
pub async fn list_boards(state: &AppState) -> Result<Vec<Board>, String> {
    state.boards.list().await.map_err(|e| e.to_string())
}

/// Delete a board with all of its lists and notes
pub async fn delete_board(state: &AppState, id: u32) -> Result<(), String> {
    state.boards.delete(id).await.map_err(|e| e.to_string())
}

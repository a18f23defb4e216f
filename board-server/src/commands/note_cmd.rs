//! Note Commands
//!
//! CRUD plus reordering of notes, within a list or across lists.

use crate::domain::{MoveRequest, Note};
use crate::repository::{HierarchyOperations, PositioningOperations, Repository};
use crate::AppState;

/// Create a note at the end of a list
pub async fn create_note(state: &AppState, list_id: u32, content: String) -> Result<Note, String> {
    state
        .notes
        .create(&Note::new(0, list_id, content))
        .await
        .map_err(|e| e.to_string())
}

/// Notes of a list in display order
pub async fn get_list_notes(state: &AppState, list_id: u32) -> Result<Vec<Note>, String> {
    state.notes.get_children(list_id).await.map_err(|e| e.to_string())
}

/// Replace a note's content
pub async fn update_note(state: &AppState, id: u32, content: String) -> Result<Note, String> {
    let mut note = state
        .notes
        .find_by_id(id)
        .await
        .map_err(|e| e.to_string())?
        .ok_or_else(|| format!("Note {} not found", id))?;
    note.content = content;
    state.notes.update(&note).await.map_err(|e| e.to_string())
}

/// Move a note next to another note (possibly in another list)
pub async fn move_note(state: &AppState, request: MoveRequest) -> Result<Note, String> {
    log::info!(
        "move_note: id={}, target={:?}, list={}",
        request.id,
        request.target_id,
        request.parent_id
    );
    state.notes.move_to(&request).await.map_err(|e| {
        log::warn!("move_note {} failed: {}", request.id, e);
        e.to_string()
    })
}

/// Delete a note
pub async fn delete_note(state: &AppState, id: u32) -> Result<(), String> {
    state.notes.delete(id).await.map_err(|e| e.to_string())
}

//! Board Context
//!
//! Wires one coordinator per ordered entity kind for a single board.

use std::sync::Arc;

use crate::commands::{MoveRequest, RemoteError, RemoteOrderService};
use crate::config::ClientConfig;
use crate::error::MutationResult;
use crate::models::{List, Note};
use crate::optimistic::Coordinator;

/// Client-side ordering state for one board
pub struct BoardContext {
    board_id: u32,
    pub lists: Coordinator<List>,
    pub notes: Coordinator<Note>,
}

impl BoardContext {
    pub fn new(
        board_id: u32,
        list_remote: Arc<dyn RemoteOrderService<List>>,
        note_remote: Arc<dyn RemoteOrderService<Note>>,
        config: ClientConfig,
    ) -> Self {
        Self {
            board_id,
            lists: Coordinator::new("list", list_remote, config.clone()),
            notes: Coordinator::new("note", note_remote, config),
        }
    }

    pub fn board_id(&self) -> u32 {
        self.board_id
    }

    /// Load the board's lists and every list's notes
    pub async fn load(&self) -> Result<(), RemoteError> {
        let lists = self.lists.load(self.board_id).await?;
        for list in lists.items() {
            self.notes.load(list.id).await?;
        }
        log::info!("Loaded board {} with {} lists", self.board_id, lists.len());
        Ok(())
    }

    /// Reorder a list on this board
    pub async fn move_list(&self, id: u32, target_id: Option<u32>) -> MutationResult<List> {
        self.lists
            .move_item(MoveRequest { id, target_id, parent_id: self.board_id })
            .await
    }

    /// Move a note within or across lists
    pub async fn move_note(&self, id: u32, target_id: Option<u32>, list_id: u32) -> MutationResult<Note> {
        self.notes
            .move_item(MoveRequest { id, target_id, parent_id: list_id })
            .await
    }

    /// Titles of the board's lists in display order
    pub async fn list_titles(&self) -> Vec<String> {
        match self.lists.cache().get(self.board_id).await {
            Some(lists) => lists.items().iter().map(|l| l.title.clone()).collect(),
            None => Vec::new(),
        }
    }
}

//! List Entity
//!
//! A column on a board, ordered among the board's lists by `order_key`.

use serde::{Deserialize, Serialize};
use super::entity::{Entity, Positioned};

/// A list of notes on a board
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct List {
    /// Unique identifier
    pub id: u32,
    /// Owning board
    pub board_id: u32,
    /// Display title
    pub title: String,
    /// Position among the board's lists
    pub order_key: String,
    pub updated_at: Option<i64>,
}

impl List {
    /// Create a new list under a board; the key is assigned on insert
    pub fn new(id: u32, board_id: u32, title: String) -> Self {
        Self {
            id,
            board_id,
            title,
            order_key: String::new(),
            updated_at: None,
        }
    }
}

impl Entity for List {
    type Id = u32;

    fn id(&self) -> Self::Id {
        self.id
    }
}

impl Positioned for List {
    fn parent_id(&self) -> u32 {
        self.board_id
    }

    fn order_key(&self) -> &str {
        &self.order_key
    }
}

//! Note Entity
//!
//! A card inside a list, ordered among the list's notes by `order_key`.

use serde::{Deserialize, Serialize};
use super::entity::{Entity, Positioned};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: u32,
    /// Owning list
    pub list_id: u32,
    /// Note body (Markdown)
    pub content: String,
    /// Position among the list's notes
    pub order_key: String,
    pub updated_at: Option<i64>,
}

impl Note {
    pub fn new(id: u32, list_id: u32, content: String) -> Self {
        Self {
            id,
            list_id,
            content,
            order_key: String::new(),
            updated_at: None,
        }
    }
}

impl Entity for Note {
    type Id = u32;

    fn id(&self) -> Self::Id {
        self.id
    }
}

impl Positioned for Note {
    fn parent_id(&self) -> u32 {
        self.list_id
    }

    fn order_key(&self) -> &str {
        &self.order_key
    }
}

//! Board Entity
//!
//! A board is the container lists are ordered in. Boards themselves are
//! not ordered.

use serde::{Deserialize, Serialize};
use super::entity::Entity;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Board {
    pub id: u32,
    pub title: String,
    pub created_at: Option<i64>,
}

impl Board {
    pub fn new(id: u32, title: String) -> Self {
        Self {
            id,
            title,
            created_at: None,
        }
    }
}

impl Entity for Board {
    type Id = u32;

    fn id(&self) -> Self::Id {
        self.id
    }
}

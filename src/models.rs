//! Client Models
//!
//! Data structures matching backend entities.

use serde::{Deserialize, Serialize};

/// An entity kept in an ordered sibling collection
pub trait Positioned: Clone + Send + Sync + 'static {
    fn id(&self) -> u32;

    /// Id of the owning collection
    fn parent_id(&self) -> u32;

    fn order_key(&self) -> &str;

    /// Re-home the entity under `parent_id` at `order_key`
    fn set_placement(&mut self, parent_id: u32, order_key: String);
}

/// Board data structure (matches backend)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Board {
    pub id: u32,
    pub title: String,
}

/// List data structure (matches backend)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct List {
    pub id: u32,
    pub board_id: u32,
    pub title: String,
    pub order_key: String,
}

/// Note data structure (matches backend)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: u32,
    pub list_id: u32,
    pub content: String,
    pub order_key: String,
}

impl Positioned for List {
    fn id(&self) -> u32 {
        self.id
    }

    fn parent_id(&self) -> u32 {
        self.board_id
    }

    fn order_key(&self) -> &str {
        &self.order_key
    }

    fn set_placement(&mut self, parent_id: u32, order_key: String) {
        self.board_id = parent_id;
        self.order_key = order_key;
    }
}

impl Positioned for Note {
    fn id(&self) -> u32 {
        self.id
    }

    fn parent_id(&self) -> u32 {
        self.list_id
    }

    fn order_key(&self) -> &str {
        &self.order_key
    }

    fn set_placement(&mut self, parent_id: u32, order_key: String) {
        self.list_id = parent_id;
        self.order_key = order_key;
    }
}

//! Move Request
//!
//! The wire shape of a reorder: move `id` next to `target_id` under
//! `parent_id`. The server picks the side of the anchor itself.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveRequest {
    /// Item being moved
    pub id: u32,
    /// Anchor sibling; `None` drops at the end of the parent
    pub target_id: Option<u32>,
    /// Destination parent
    pub parent_id: u32,
}

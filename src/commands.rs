//! Remote Order Service
//!
//! The contract of the authoritative endpoint that persists moves. Any
//! transport can sit behind it; the record it returns is ground truth.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::Positioned;

/// Move `id` next to `target_id` under `parent_id`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveRequest {
    pub id: u32,
    /// Anchor sibling; `None` drops at the end of the parent
    pub target_id: Option<u32>,
    pub parent_id: u32,
}

/// Remote failures. None are retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RemoteError {
    /// The request never got an answer
    #[error("Network error: {0}")]
    Network(String),

    /// The server refused the change
    #[error("Rejected: {0}")]
    Rejected(String),

    /// Item, parent or anchor no longer exists
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Authentication required")]
    Unauthorized,
}

impl RemoteError {
    /// Classify a server error message
    pub fn from_message(message: impl Into<String>) -> Self {
        let message = message.into();
        let lower = message.to_lowercase();
        if lower.contains("not found") {
            RemoteError::NotFound(message)
        } else if lower.contains("unauthorized") {
            RemoteError::Unauthorized
        } else {
            RemoteError::Rejected(message)
        }
    }
}

#[async_trait]
pub trait RemoteOrderService<T: Positioned>: Send + Sync {
    /// Persist a move and return the canonical record
    async fn move_item(&self, request: MoveRequest) -> Result<T, RemoteError>;

    /// Children of a parent in key order
    async fn fetch_children(&self, parent_id: u32) -> Result<Vec<T>, RemoteError>;
}

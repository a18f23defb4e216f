//! Mutation error types

use thiserror::Error;

use crate::collection::CollectionError;
use crate::commands::RemoteError;

/// Why an optimistic mutation did not commit
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MutationError {
    /// The moved item is not in any cached collection
    #[error("Item {0} is not loaded")]
    UnknownItem(u32),

    /// No key could be computed; nothing was applied
    #[error(transparent)]
    Collection(#[from] CollectionError),

    /// The server call failed; the speculative change was rolled back
    #[error(transparent)]
    Remote(#[from] RemoteError),
}

/// Result type for coordinator operations
pub type MutationResult<T> = Result<T, MutationError>;

//! Board Client
//!
//! Client-side ordering state for boards, lists and notes:
//! - models: Entities as the server returns them
//! - collection: Sorted sibling collections and key computation
//! - store: The shared cache of collections
//! - commands: The remote order service contract
//! - optimistic: Speculative moves with commit and rollback
//! - context: Per-board wiring of the coordinators

pub mod models;
pub mod collection;
pub mod store;
pub mod commands;
pub mod error;
pub mod config;
pub mod refetch;
pub mod optimistic;
pub mod context;

pub use collection::{CollectionError, OrderedCollection};
pub use commands::{MoveRequest, RemoteError, RemoteOrderService};
pub use config::ClientConfig;
pub use context::BoardContext;
pub use error::{MutationError, MutationResult};
pub use models::{Board, List, Note, Positioned};
pub use optimistic::{Coordinator, MutationSnapshot, Notice, Phase, Transaction};
pub use store::CollectionCache;

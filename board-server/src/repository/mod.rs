//! Repository Layer
//!
//! Data access abstractions and implementations.

mod traits;
pub(crate) mod db;
mod positioning;
mod board_repo;
mod list_repo;
mod note_repo;

#[cfg(test)]
mod tests;

pub use traits::{HierarchyOperations, PositioningOperations, Repository};
pub use db::{init_db, DbState, SharedConnection};
pub use board_repo::BoardRepository;
pub use list_repo::ListRepository;
pub use note_repo::NoteRepository;

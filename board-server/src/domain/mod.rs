//! Domain Layer
//!
//! Contains all domain entities and core abstractions.

mod entity;
mod board;
mod list;
mod note;
mod move_request;

pub use entity::{Entity, Positioned, DomainError, DomainResult};
pub use board::Board;
pub use list::List;
pub use note::Note;
pub use move_request::MoveRequest;

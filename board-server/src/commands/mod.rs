//! Command Handlers
//!
//! The operations the board service exposes. Transport is left to the host;
//! every handler takes the shared state and returns `Result<_, String>`.

mod board_cmd;
mod list_cmd;
mod note_cmd;
mod maintenance_cmd;

pub use board_cmd::*;
pub use list_cmd::*;
pub use note_cmd::*;
pub use maintenance_cmd::*;

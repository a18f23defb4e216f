//! Board Server
//!
//! Authoritative ordering service for boards, lists and notes.
//!
//! Layered architecture:
//! - domain: Core entities and business rules
//! - repository: Data access abstractions and SQLite implementations
//! - commands: Command handlers exposed to whatever transport hosts them

pub mod config;
pub mod domain;
pub mod repository;
pub mod commands;

use config::ServerConfig;
use repository::{init_db, BoardRepository, DbState, ListRepository, NoteRepository};

/// Application state shared across commands
pub struct AppState {
    pub db_state: DbState,
    pub boards: BoardRepository,
    pub lists: ListRepository,
    pub notes: NoteRepository,
    pub config: ServerConfig,
}

impl AppState {
    /// Open (and migrate) the configured database
    pub async fn open(config: ServerConfig) -> Result<Self, String> {
        log::info!("Opening board database at {}", config.db_path.display());
        let db_state = init_db(&config.db_path).await.map_err(|e| {
            log::error!("DB init failed: {}", e);
            e
        })?;

        let conn = db_state.connection();
        Ok(Self {
            boards: BoardRepository::new(conn.clone()),
            lists: ListRepository::new(conn.clone())
                .with_rebalance_threshold(config.rebalance_threshold),
            notes: NoteRepository::new(conn).with_rebalance_threshold(config.rebalance_threshold),
            db_state,
            config,
        })
    }

    /// Release the database; later commands fail with "not initialized"
    pub async fn close(&self) {
        self.db_state.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands;
    use crate::domain::MoveRequest;

    async fn open() -> AppState {
        AppState::open(ServerConfig::in_memory()).await.expect("open in-memory state")
    }

    #[tokio::test]
    async fn test_commands_round_trip() {
        let state = open().await;
        let board = commands::create_board(&state, "Home".to_string()).await.unwrap();
        let todo = commands::create_list(&state, board.id, "Todo".to_string()).await.unwrap();
        let done = commands::create_list(&state, board.id, "Done".to_string()).await.unwrap();

        let a = commands::create_note(&state, todo.id, "a".to_string()).await.unwrap();
        let b = commands::create_note(&state, todo.id, "b".to_string()).await.unwrap();
        assert!(a.order_key < b.order_key);

        let moved = commands::move_note(
            &state,
            MoveRequest { id: b.id, target_id: None, parent_id: done.id },
        )
        .await
        .unwrap();
        assert_eq!(moved.list_id, done.id);
        assert_eq!(moved.order_key, "n");

        let todo_notes = commands::get_list_notes(&state, todo.id).await.unwrap();
        assert_eq!(todo_notes.iter().map(|n| n.id).collect::<Vec<_>>(), vec![a.id]);

        let lists = commands::move_list(
            &state,
            MoveRequest { id: done.id, target_id: Some(todo.id), parent_id: board.id },
        )
        .await
        .unwrap();
        assert!(lists.order_key < todo.order_key);
        let order: Vec<u32> = commands::get_board_lists(&state, board.id)
            .await
            .unwrap()
            .iter()
            .map(|l| l.id)
            .collect();
        assert_eq!(order, vec![done.id, todo.id]);
    }

    #[tokio::test]
    async fn test_move_errors_are_reported() {
        let state = open().await;
        let board = commands::create_board(&state, "Home".to_string()).await.unwrap();
        let list = commands::create_list(&state, board.id, "Todo".to_string()).await.unwrap();

        let err = commands::move_note(
            &state,
            MoveRequest { id: 99, target_id: None, parent_id: list.id },
        )
        .await
        .unwrap_err();
        assert!(err.contains("not found"), "{}", err);
    }

    #[tokio::test]
    async fn test_closed_state_rejects_commands() {
        let state = open().await;
        state.close().await;
        let err = commands::list_boards(&state).await.unwrap_err();
        assert!(err.contains("not initialized"), "{}", err);
    }

    #[tokio::test]
    async fn test_rebalance_commands() {
        let state = open().await;
        let board = commands::create_board(&state, "Home".to_string()).await.unwrap();
        for title in ["a", "b", "c"] {
            commands::create_list(&state, board.id, title.to_string()).await.unwrap();
        }
        assert_eq!(commands::rebalance_lists(&state, board.id).await.unwrap(), 3);
        let keys: Vec<String> = commands::get_board_lists(&state, board.id)
            .await
            .unwrap()
            .into_iter()
            .map(|l| l.order_key)
            .collect();
        assert_eq!(keys, order_key::spread_keys(3));
    }
}

//! Repository Integration Tests
//!
//! Ordering behavior against an in-memory SQLite database.

#[cfg(test)]
mod tests {
    use crate::domain::{Board, DomainError, List, MoveRequest, Note};
    use crate::repository::{
        init_db, BoardRepository, HierarchyOperations, ListRepository, NoteRepository,
        PositioningOperations, Repository, SharedConnection,
    };
    use std::path::PathBuf;

    struct Repos {
        conn: SharedConnection,
        boards: BoardRepository,
        lists: ListRepository,
        notes: NoteRepository,
    }

    async fn setup_test_db() -> Repos {
        let db_state = init_db(&PathBuf::from(":memory:")).await.expect("Failed to init test DB");
        let conn = db_state.connection();
        Repos {
            boards: BoardRepository::new(conn.clone()),
            lists: ListRepository::new(conn.clone()),
            notes: NoteRepository::new(conn.clone()),
            conn,
        }
    }

    async fn seed_list(repos: &Repos, notes: &[&str]) -> (List, Vec<Note>) {
        let board = repos.boards.create(&Board::new(0, "Board".to_string())).await.unwrap();
        let list = repos.lists.create(&List::new(0, board.id, "Todo".to_string())).await.unwrap();
        let mut created = Vec::new();
        for content in notes {
            created.push(
                repos.notes.create(&Note::new(0, list.id, content.to_string())).await.unwrap(),
            );
        }
        (list, created)
    }

    fn contents(notes: &[Note]) -> Vec<&str> {
        notes.iter().map(|n| n.content.as_str()).collect()
    }

    #[tokio::test]
    async fn test_create_appends_in_key_order() {
        let repos = setup_test_db().await;
        let (list, notes) = seed_list(&repos, &["a", "b", "c"]).await;

        assert_eq!(notes[0].order_key, "n");
        assert!(notes[0].order_key < notes[1].order_key);
        assert!(notes[1].order_key < notes[2].order_key);

        let children = repos.notes.get_children(list.id).await.unwrap();
        assert_eq!(contents(&children), vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_create_under_missing_parent() {
        let repos = setup_test_db().await;
        let result = repos.notes.create(&Note::new(0, 42, "orphan".to_string())).await;
        assert!(matches!(result, Err(DomainError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_move_down_lands_after_anchor() {
        let repos = setup_test_db().await;
        let (list, notes) = seed_list(&repos, &["a", "b", "c"]).await;

        let moved = repos
            .notes
            .move_to(&MoveRequest { id: notes[0].id, target_id: Some(notes[1].id), parent_id: list.id })
            .await
            .unwrap();
        assert!(moved.order_key > notes[1].order_key);
        assert!(moved.order_key < notes[2].order_key);

        let children = repos.notes.get_children(list.id).await.unwrap();
        assert_eq!(contents(&children), vec!["b", "a", "c"]);
    }

    #[tokio::test]
    async fn test_move_up_lands_before_anchor() {
        let repos = setup_test_db().await;
        let (list, notes) = seed_list(&repos, &["a", "b", "c"]).await;

        repos
            .notes
            .move_to(&MoveRequest { id: notes[2].id, target_id: Some(notes[0].id), parent_id: list.id })
            .await
            .unwrap();

        let children = repos.notes.get_children(list.id).await.unwrap();
        assert_eq!(contents(&children), vec!["c", "a", "b"]);
        // Untouched siblings keep their keys
        assert_eq!(children[1].order_key, notes[0].order_key);
        assert_eq!(children[2].order_key, notes[1].order_key);
    }

    #[tokio::test]
    async fn test_move_to_other_list() {
        let repos = setup_test_db().await;
        let (source, notes) = seed_list(&repos, &["a", "b"]).await;
        let dest = repos.lists.create(&List::new(0, source.board_id, "Done".to_string())).await.unwrap();
        let x = repos.notes.create(&Note::new(0, dest.id, "x".to_string())).await.unwrap();

        let moved = repos
            .notes
            .move_to(&MoveRequest { id: notes[1].id, target_id: Some(x.id), parent_id: dest.id })
            .await
            .unwrap();
        assert_eq!(moved.list_id, dest.id);
        assert!(moved.order_key < x.order_key);

        let source_children = repos.notes.get_children(source.id).await.unwrap();
        let dest_children = repos.notes.get_children(dest.id).await.unwrap();
        assert_eq!(contents(&source_children), vec!["a"]);
        assert_eq!(contents(&dest_children), vec!["b", "x"]);
    }

    #[tokio::test]
    async fn test_move_to_tail_of_empty_list() {
        let repos = setup_test_db().await;
        let (source, notes) = seed_list(&repos, &["a"]).await;
        let dest = repos.lists.create(&List::new(0, source.board_id, "Empty".to_string())).await.unwrap();

        let moved = repos
            .notes
            .move_to(&MoveRequest { id: notes[0].id, target_id: None, parent_id: dest.id })
            .await
            .unwrap();
        assert_eq!(moved.list_id, dest.id);
        assert_eq!(moved.order_key, "n");
    }

    #[tokio::test]
    async fn test_move_against_deleted_anchor() {
        let repos = setup_test_db().await;
        let (list, notes) = seed_list(&repos, &["a", "b"]).await;
        repos.notes.delete(notes[1].id).await.unwrap();

        let result = repos
            .notes
            .move_to(&MoveRequest { id: notes[0].id, target_id: Some(notes[1].id), parent_id: list.id })
            .await;
        assert!(matches!(result, Err(DomainError::NotFound(_))));

        // Nothing changed
        let unchanged = repos.notes.find_by_id(notes[0].id).await.unwrap().unwrap();
        assert_eq!(unchanged.order_key, notes[0].order_key);
    }

    #[tokio::test]
    async fn test_move_onto_itself_is_noop() {
        let repos = setup_test_db().await;
        let (list, notes) = seed_list(&repos, &["a", "b"]).await;
        let same = repos
            .notes
            .move_to(&MoveRequest { id: notes[0].id, target_id: Some(notes[0].id), parent_id: list.id })
            .await
            .unwrap();
        assert_eq!(same, notes[0]);
    }

    #[tokio::test]
    async fn test_rebalance_preserves_order() {
        let repos = setup_test_db().await;
        let (list, notes) = seed_list(&repos, &["a", "b", "c", "d", "e"]).await;

        // Pile inserts onto the head to grow the keys
        for note in notes.iter().skip(1).rev() {
            let head = repos.notes.get_children(list.id).await.unwrap()[0].id;
            repos
                .notes
                .move_to(&MoveRequest { id: note.id, target_id: Some(head), parent_id: list.id })
                .await
                .unwrap();
        }
        let before = repos.notes.get_children(list.id).await.unwrap();

        let count = repos.notes.rebalance(list.id).await.unwrap();
        assert_eq!(count, 5);

        let after = repos.notes.get_children(list.id).await.unwrap();
        assert_eq!(contents(&after), contents(&before));
        let keys: Vec<&str> = after.iter().map(|n| n.order_key.as_str()).collect();
        assert_eq!(keys, vec!["e", "j", "n", "r", "w"]);
    }

    #[tokio::test]
    async fn test_threshold_triggers_rebalance() {
        let repos = setup_test_db().await;
        // Keys: n, u, x, z, zn
        let (list, notes) = seed_list(&repos, &["a", "b", "c", "d", "e"]).await;
        let notes_repo = NoteRepository::new(repos.conn.clone()).with_rebalance_threshold(Some(1));

        // Between "z" and "zn" needs a two-letter key, which trips the threshold
        let moved = notes_repo
            .move_to(&MoveRequest { id: notes[0].id, target_id: Some(notes[3].id), parent_id: list.id })
            .await
            .unwrap();
        assert_eq!(moved.order_key, "r");

        let children = notes_repo.get_children(list.id).await.unwrap();
        assert_eq!(contents(&children), vec!["b", "c", "d", "a", "e"]);
        let keys: Vec<&str> = children.iter().map(|n| n.order_key.as_str()).collect();
        assert_eq!(keys, vec!["e", "j", "n", "r", "w"]);
    }

    #[tokio::test]
    async fn test_duplicate_keys_are_repaired_on_move() {
        let repos = setup_test_db().await;
        let (list, notes) = seed_list(&repos, &["a", "b", "c"]).await;
        {
            // A stale writer left "a" with the same key as "b"
            let guard = repos.conn.lock().await;
            guard
                .as_ref()
                .unwrap()
                .execute(
                    "UPDATE notes SET order_key = ? WHERE id = ?",
                    rusqlite::params![notes[1].order_key, notes[0].id],
                )
                .unwrap();
        }

        repos
            .notes
            .move_to(&MoveRequest { id: notes[2].id, target_id: Some(notes[1].id), parent_id: list.id })
            .await
            .unwrap();

        let children = repos.notes.get_children(list.id).await.unwrap();
        let keys: Vec<&String> = children.iter().map(|n| &n.order_key).collect();
        assert!(keys.windows(2).all(|w| w[0] < w[1]), "{:?}", keys);
        assert_eq!(contents(&children), vec!["a", "c", "b"]);
    }

    #[tokio::test]
    async fn test_delete_list_cascades_notes() {
        let repos = setup_test_db().await;
        let (list, notes) = seed_list(&repos, &["a", "b"]).await;
        repos.lists.delete(list.id).await.unwrap();
        assert!(repos.notes.find_by_id(notes[0].id).await.unwrap().is_none());
        assert!(repos.notes.get_children(list.id).await.unwrap().is_empty());
    }
}

//! Background Refetch
//!
//! Tracks the spawned tasks that reload a collection from the server so a
//! mutation can abort them before it speculates.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::task::JoinHandle;

use crate::commands::RemoteOrderService;
use crate::models::Positioned;
use crate::store::CollectionCache;

#[derive(Default)]
pub struct RefetchTracker {
    tasks: Mutex<HashMap<u32, JoinHandle<()>>>,
}

impl RefetchTracker {
    pub fn new() -> Self {
        Self::default()
    }

    fn tasks(&self) -> MutexGuard<'_, HashMap<u32, JoinHandle<()>>> {
        self.tasks.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Reload `parent_id` in the background, replacing any pending reload.
    ///
    /// The result is applied only if nothing wrote the collection after the
    /// reload started.
    pub async fn spawn<T: Positioned>(
        &self,
        parent_id: u32,
        cache: Arc<CollectionCache<T>>,
        remote: Arc<dyn RemoteOrderService<T>>,
    ) {
        let generation = cache.generation(parent_id).await;
        let handle = tokio::spawn(async move {
            match remote.fetch_children(parent_id).await {
                Ok(items) => {
                    if cache.apply_fetched(parent_id, generation, items).await {
                        log::debug!("Refreshed collection {}", parent_id);
                    }
                }
                Err(e) => log::warn!("Background refresh of {} failed: {}", parent_id, e),
            }
        });
        if let Some(previous) = self.tasks().insert(parent_id, handle) {
            previous.abort();
        }
    }

    /// Abort pending reloads of `parents`
    pub fn cancel(&self, parents: &[u32]) {
        let mut tasks = self.tasks();
        for parent in parents {
            if let Some(handle) = tasks.remove(parent) {
                if !handle.is_finished() {
                    log::debug!("Cancelled background refresh of {}", parent);
                }
                handle.abort();
            }
        }
    }

    /// Whether a reload of `parent_id` is still running
    pub fn is_pending(&self, parent_id: u32) -> bool {
        self.tasks().get(&parent_id).is_some_and(|handle| !handle.is_finished())
    }
}

impl Drop for RefetchTracker {
    fn drop(&mut self) {
        for (_, handle) in self.tasks().drain() {
            handle.abort();
        }
    }
}

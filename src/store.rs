//! Collection Cache
//!
//! Client-visible ordered collections keyed by parent id. Every update
//! replaces whole collections under one write lock, so readers never see a
//! half-applied change. Each parent carries a generation that every write
//! bumps; background fetches only land if the generation they started
//! from is still current.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::collection::OrderedCollection;
use crate::models::Positioned;

/// A collection as captured or written; `None` means absent from the cache
pub type CollectionSlot<T> = (u32, Option<Arc<OrderedCollection<T>>>);

struct CacheState<T> {
    collections: HashMap<u32, Arc<OrderedCollection<T>>>,
    generations: HashMap<u32, u64>,
}

impl<T> CacheState<T> {
    fn bump(&mut self, parent_id: u32) {
        *self.generations.entry(parent_id).or_insert(0) += 1;
    }
}

pub struct CollectionCache<T> {
    state: RwLock<CacheState<T>>,
}

impl<T: Positioned> Default for CollectionCache<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Positioned> CollectionCache<T> {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(CacheState {
                collections: HashMap::new(),
                generations: HashMap::new(),
            }),
        }
    }

    pub async fn get(&self, parent_id: u32) -> Option<Arc<OrderedCollection<T>>> {
        self.state.read().await.collections.get(&parent_id).cloned()
    }

    /// Ids under `parent_id` in display order (empty when not loaded)
    pub async fn ids(&self, parent_id: u32) -> Vec<u32> {
        self.get(parent_id).await.map(|c| c.ids()).unwrap_or_default()
    }

    pub async fn generation(&self, parent_id: u32) -> u64 {
        self.state.read().await.generations.get(&parent_id).copied().unwrap_or(0)
    }

    /// Find an item in any loaded collection
    pub async fn locate(&self, id: u32) -> Option<T> {
        let state = self.state.read().await;
        state.collections.values().find_map(|c| c.get(id).cloned())
    }

    /// Capture several collections in one read
    pub async fn read_many(&self, parents: &[u32]) -> Vec<CollectionSlot<T>> {
        let state = self.state.read().await;
        parents
            .iter()
            .map(|&parent| (parent, state.collections.get(&parent).cloned()))
            .collect()
    }

    /// Replace several collections in one write, bumping their generations
    pub async fn replace_many(&self, slots: Vec<CollectionSlot<T>>) {
        let mut state = self.state.write().await;
        for (parent, slot) in slots {
            match slot {
                Some(collection) => {
                    state.collections.insert(parent, collection);
                }
                None => {
                    state.collections.remove(&parent);
                }
            }
            state.bump(parent);
        }
    }

    /// Unconditionally install a freshly fetched collection
    pub async fn populate(&self, parent_id: u32, items: Vec<T>) -> Arc<OrderedCollection<T>> {
        let collection = Arc::new(OrderedCollection::new(parent_id, items));
        self.replace_many(vec![(parent_id, Some(collection.clone()))]).await;
        collection
    }

    /// Install fetched items unless the parent was written since `generation`
    pub async fn apply_fetched(&self, parent_id: u32, generation: u64, items: Vec<T>) -> bool {
        let mut state = self.state.write().await;
        let current = state.generations.get(&parent_id).copied().unwrap_or(0);
        if current != generation {
            log::debug!(
                "Dropping stale fetch for parent {} (generation {} != {})",
                parent_id,
                generation,
                current
            );
            return false;
        }
        state
            .collections
            .insert(parent_id, Arc::new(OrderedCollection::new(parent_id, items)));
        state.bump(parent_id);
        true
    }

    /// Invalidate in-flight fetches for `parents` without changing content
    pub async fn invalidate(&self, parents: &[u32]) {
        let mut state = self.state.write().await;
        for &parent in parents {
            state.bump(parent);
        }
    }

    /// Drop a collection from the cache
    pub async fn evict(&self, parent_id: u32) {
        self.replace_many(vec![(parent_id, None)]).await;
    }
}

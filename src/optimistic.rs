//! Optimistic Mutations
//!
//! A coordinator shows a move in the cache immediately, sends it to the
//! server, then either swaps in the server's canonical record or restores
//! what the cache held before.
//!
//! Each attempt runs through `Phase`:
//! `Idle -> Speculating -> (Committed | RolledBack)`.
//!
//! Mutations on a collection that already has one in flight wait for it:
//! every affected parent is locked (ascending by id) for the whole attempt.
//! Mutations on unrelated collections run side by side.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::{broadcast, OwnedMutexGuard};

use crate::collection::{CollectionError, OrderedCollection};
use crate::commands::{MoveRequest, RemoteError, RemoteOrderService};
use crate::config::ClientConfig;
use crate::error::{MutationError, MutationResult};
use crate::models::Positioned;
use crate::refetch::RefetchTracker;
use crate::store::{CollectionCache, CollectionSlot};

/// Lifecycle of one mutation attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Speculating,
    Committed,
    RolledBack,
}

impl Phase {
    fn can_advance_to(self, next: Phase) -> bool {
        matches!(
            (self, next),
            (Phase::Idle, Phase::Speculating)
                | (Phase::Speculating, Phase::Committed)
                | (Phase::Speculating, Phase::RolledBack)
        )
    }
}

/// The affected collections as they were before speculation
#[derive(Debug, Clone)]
pub struct MutationSnapshot<T> {
    slots: Vec<CollectionSlot<T>>,
}

impl<T: Positioned> MutationSnapshot<T> {
    fn new(slots: Vec<CollectionSlot<T>>) -> Self {
        Self { slots }
    }

    pub fn parents(&self) -> Vec<u32> {
        self.slots.iter().map(|(parent, _)| *parent).collect()
    }

    /// Captured collection; `None` if it was not loaded
    pub fn get(&self, parent_id: u32) -> Option<&Arc<OrderedCollection<T>>> {
        self.slots
            .iter()
            .find(|(parent, _)| *parent == parent_id)
            .and_then(|(_, slot)| slot.as_ref())
    }

    /// Captured collection, or an empty one if it was not loaded
    fn collection(&self, parent_id: u32) -> OrderedCollection<T> {
        self.get(parent_id)
            .map(|c| c.as_ref().clone())
            .unwrap_or_else(|| OrderedCollection::empty(parent_id))
    }

    fn into_slots(self) -> Vec<CollectionSlot<T>> {
        self.slots
    }
}

/// One mutation attempt and the state it can restore
#[derive(Debug)]
pub struct Transaction<T> {
    request: MoveRequest,
    phase: Phase,
    snapshot: Option<MutationSnapshot<T>>,
}

impl<T: Positioned> Transaction<T> {
    pub fn new(request: MoveRequest) -> Self {
        Self { request, phase: Phase::Idle, snapshot: None }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn request(&self) -> &MoveRequest {
        &self.request
    }

    fn advance(&mut self, next: Phase) {
        debug_assert!(
            self.phase.can_advance_to(next),
            "illegal transition {:?} -> {:?}",
            self.phase,
            next
        );
        log::trace!("move {}: {:?} -> {:?}", self.request.id, self.phase, next);
        self.phase = next;
    }

    /// Record the pre-mutation state; must precede any cache write
    fn speculate(&mut self, snapshot: MutationSnapshot<T>) {
        self.snapshot = Some(snapshot);
        self.advance(Phase::Speculating);
    }

    /// Drop the snapshot; the server accepted the move
    fn commit(&mut self) {
        self.snapshot = None;
        self.advance(Phase::Committed);
    }

    /// Hand back the snapshot to restore
    fn roll_back(&mut self) -> Option<MutationSnapshot<T>> {
        self.advance(Phase::RolledBack);
        self.snapshot.take()
    }
}

/// User-visible outcome of a mutation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Moved { id: u32, parent_id: u32 },
    Failed { id: u32, message: String },
    /// A collection's keys grew past `max_key_len`
    NeedsRebalance { parent_id: u32 },
}

/// Applies moves of one entity kind optimistically
pub struct Coordinator<T: Positioned> {
    kind: &'static str,
    cache: Arc<CollectionCache<T>>,
    remote: Arc<dyn RemoteOrderService<T>>,
    locks: Mutex<HashMap<u32, Arc<tokio::sync::Mutex<()>>>>,
    refetches: RefetchTracker,
    notices: broadcast::Sender<Notice>,
    config: ClientConfig,
}

impl<T: Positioned> Coordinator<T> {
    /// `kind` names the entity in log lines
    pub fn new(kind: &'static str, remote: Arc<dyn RemoteOrderService<T>>, config: ClientConfig) -> Self {
        let (notices, _) = broadcast::channel(config.notice_capacity.max(1));
        Self {
            kind,
            cache: Arc::new(CollectionCache::new()),
            remote,
            locks: Mutex::new(HashMap::new()),
            refetches: RefetchTracker::new(),
            notices,
            config,
        }
    }

    pub fn cache(&self) -> &Arc<CollectionCache<T>> {
        &self.cache
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notice> {
        self.notices.subscribe()
    }

    fn notify(&self, notice: Notice) {
        // No subscribers is fine
        self.notices.send(notice).ok();
    }

    /// Fetch a collection and install it in the cache
    pub async fn load(&self, parent_id: u32) -> Result<Arc<OrderedCollection<T>>, RemoteError> {
        let _guards = self.lock_parents(&[parent_id]).await;
        let items = self.remote.fetch_children(parent_id).await?;
        log::debug!("Loaded {} {}s under {}", items.len(), self.kind, parent_id);
        Ok(self.cache.populate(parent_id, items).await)
    }

    /// Reload a collection in the background; a later mutation cancels it
    pub async fn refresh(&self, parent_id: u32) {
        self.refetches
            .spawn(parent_id, self.cache.clone(), self.remote.clone())
            .await;
    }

    pub fn is_refreshing(&self, parent_id: u32) -> bool {
        self.refetches.is_pending(parent_id)
    }

    fn parent_lock(&self, parent_id: u32) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
        locks.entry(parent_id).or_default().clone()
    }

    /// Lock `parents` in ascending order
    async fn lock_parents(&self, parents: &[u32]) -> Vec<OwnedMutexGuard<()>> {
        let mut sorted = parents.to_vec();
        sorted.sort_unstable();
        sorted.dedup();
        let mut guards = Vec::with_capacity(sorted.len());
        for parent in sorted {
            guards.push(self.parent_lock(parent).lock_owned().await);
        }
        guards
    }

    /// Lock the item's current parent and the destination, then return the
    /// item as it stands once no other mutation can touch either
    async fn acquire(&self, request: &MoveRequest) -> MutationResult<(T, Vec<OwnedMutexGuard<()>>)> {
        loop {
            let item = self
                .cache
                .locate(request.id)
                .await
                .ok_or(MutationError::UnknownItem(request.id))?;
            let source = item.parent_id();
            let guards = self.lock_parents(&[source, request.parent_id]).await;

            // A queued mutation ahead of us may have moved the item elsewhere
            match self.cache.locate(request.id).await {
                Some(current) if current.parent_id() == source => return Ok((current, guards)),
                Some(_) => continue,
                None => return Err(MutationError::UnknownItem(request.id)),
            }
        }
    }

    /// Move an item and return the server's canonical record.
    ///
    /// The cache shows the move before the server is called. On failure
    /// every affected collection is restored exactly and a
    /// `Notice::Failed` is published, whichever step failed.
    pub async fn move_item(&self, request: MoveRequest) -> MutationResult<T> {
        let result = self.attempt(request).await;
        if let Err(e) = &result {
            log::warn!("Move of {} {} failed: {}", self.kind, request.id, e);
            self.notify(Notice::Failed { id: request.id, message: e.to_string() });
        }
        result
    }

    async fn attempt(&self, request: MoveRequest) -> MutationResult<T> {
        if request.target_id == Some(request.id) {
            log::debug!("{} {} dropped onto itself", self.kind, request.id);
            return self
                .cache
                .locate(request.id)
                .await
                .ok_or(MutationError::UnknownItem(request.id));
        }

        let (item, _guards) = self.acquire(&request).await?;
        let source = item.parent_id();
        let dest = request.parent_id;
        let parents: Vec<u32> = if source == dest { vec![dest] } else { vec![source, dest] };

        self.refetches.cancel(&parents);
        self.cache.invalidate(&parents).await;

        let mut txn = Transaction::new(request);
        let mut snapshot = MutationSnapshot::new(self.cache.read_many(&parents).await);
        let key = match snapshot.collection(dest).move_item(&item, request.target_id) {
            Err(CollectionError::UnorderedNeighbors(_)) => {
                log::info!("Stale neighbors under {}, refetching before {} move", dest, self.kind);
                let items = self.remote.fetch_children(dest).await?;
                self.cache.populate(dest, items).await;
                snapshot = MutationSnapshot::new(self.cache.read_many(&parents).await);
                snapshot.collection(dest).move_item(&item, request.target_id)?
            }
            other => other?,
        };

        let mut moved = item.clone();
        moved.set_placement(dest, key.clone());
        let speculative = self.placed(&snapshot, &parents, moved);
        txn.speculate(snapshot);
        self.cache.replace_many(speculative).await;

        match self.remote.move_item(request).await {
            Ok(canonical) => {
                self.reconcile(&parents, canonical.clone()).await;
                txn.commit();
                if canonical.order_key() != key || canonical.parent_id() != dest {
                    // The server placed it differently and may have rewritten siblings
                    log::debug!("Server diverged on {} {}, refreshing", self.kind, canonical.id());
                    self.refresh(canonical.parent_id()).await;
                }
                log::info!(
                    "Moved {} {} under {} at {:?}",
                    self.kind,
                    canonical.id(),
                    canonical.parent_id(),
                    canonical.order_key()
                );
                self.notify(Notice::Moved { id: canonical.id(), parent_id: canonical.parent_id() });
                self.report_rebalance(canonical.parent_id()).await;
                Ok(canonical)
            }
            Err(e) => {
                if let Some(snapshot) = txn.roll_back() {
                    self.cache.replace_many(snapshot.into_slots()).await;
                }
                log::debug!("Rolled back {} {}", self.kind, request.id);
                Err(e.into())
            }
        }
    }

    /// Loaded collections of `parents` with `item` placed at its new parent.
    ///
    /// Parents that are not loaded stay absent; a later load fills them.
    fn placed(&self, snapshot: &MutationSnapshot<T>, parents: &[u32], item: T) -> Vec<CollectionSlot<T>> {
        parents
            .iter()
            .filter_map(|&parent| {
                let current = snapshot.get(parent)?.without(item.id());
                let next = if parent == item.parent_id() {
                    current.with_item(item.clone())
                } else {
                    current
                };
                Some((parent, Some(Arc::new(next))))
            })
            .collect()
    }

    /// Replace the speculative record with the canonical one
    async fn reconcile(&self, parents: &[u32], canonical: T) {
        let mut affected = parents.to_vec();
        if !affected.contains(&canonical.parent_id()) {
            affected.push(canonical.parent_id());
        }
        let current = MutationSnapshot::new(self.cache.read_many(&affected).await);
        let slots = self.placed(&current, &affected, canonical);
        self.cache.replace_many(slots).await;
    }

    async fn report_rebalance(&self, parent_id: u32) {
        let Some(collection) = self.cache.get(parent_id).await else {
            return;
        };
        if collection.needs_rebalance(self.config.max_key_len) {
            log::info!("{} keys under {} need a rebalance", self.kind, parent_id);
            self.notify(Notice::NeedsRebalance { parent_id });
        }
    }
}

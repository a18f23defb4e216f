//! Repository Layer - Core Traits
//!
//! Defines the abstract interfaces for data access.

use async_trait::async_trait;
use crate::domain::{DomainResult, Entity, MoveRequest, Positioned};

/// Core repository trait for CRUD operations
///
/// Generic over any Entity type.
/// All operations are async to support various backends.
#[async_trait]
pub trait Repository<T: Entity>: Send + Sync {
    /// Create a new entity
    async fn create(&self, entity: &T) -> DomainResult<T>;

    /// Find entity by ID
    async fn find_by_id(&self, id: T::Id) -> DomainResult<Option<T>>;

    /// List all entities
    async fn list(&self) -> DomainResult<Vec<T>>;

    /// Update an existing entity
    async fn update(&self, entity: &T) -> DomainResult<T>;

    /// Delete entity by ID
    async fn delete(&self, id: T::Id) -> DomainResult<()>;
}

/// Parent-child reads for ordered entities
#[async_trait]
pub trait HierarchyOperations<T: Positioned> {
    /// Children of a parent in key order
    async fn get_children(&self, parent_id: u32) -> DomainResult<Vec<T>>;
}

/// Key management for ordered entities
#[async_trait]
pub trait PositioningOperations<T: Positioned> {
    /// Key for appending a new child at the end of a parent
    async fn next_key(&self, parent_id: u32) -> DomainResult<String>;

    /// Move an entity next to an anchor and return the canonical record
    async fn move_to(&self, request: &MoveRequest) -> DomainResult<T>;

    /// Rewrite all sibling keys to short, evenly spread values
    async fn rebalance(&self, parent_id: u32) -> DomainResult<usize>;
}

//! Entity store layer for Riskboard
//!
//! Resolvers and loaders talk to storage only through the [`RiskStore`] and
//! [`CategoryStore`] traits. Two implementations exist:
//! - [`RiskRepository`] / [`CategoryRepository`]: PostgreSQL via sqlx
//! - [`MemoryStore`]: process-local maps, for development and tests
//!
//! Every store honours the same contract: `find_by_ids` answers each
//! requested id exactly once, `update_by_id`/`delete_by_id` return `None`
//! for absent ids, and `updated_at` never precedes `created_at`.

pub mod category;
pub mod memory;
pub mod risk;
pub mod utils;

pub use category::CategoryRepository;
pub use memory::MemoryStore;
pub use risk::RiskRepository;

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{
    Category, CategoryChanges, CategoryFilter, Lookup, NewCategory, NewRisk, PageRequest, Risk,
    RiskChanges, RiskFilter,
};

/// Errors raised by store implementations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Query failed in the database
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Backend could not be reached
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// A write referenced an entity that does not exist
    #[error("invalid reference: {0}")]
    InvalidReference(String),

    /// A batched lookup came back without an answer for one of its ids
    #[error("store returned no result for {entity} {key}")]
    MissingResult { entity: &'static str, key: String },
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Storage operations for risks
#[async_trait]
pub trait RiskStore: Send + Sync {
    /// One lookup per requested id; order is not significant
    async fn find_by_ids(&self, ids: &[Uuid]) -> StoreResult<Vec<Lookup<Uuid, Risk>>>;

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Risk>>;

    /// Filtered page ordered by creation time
    async fn find(&self, filter: &RiskFilter, page: PageRequest) -> StoreResult<Vec<Risk>>;

    /// Count of all risks matching `filter`, ignoring pagination
    async fn count(&self, filter: &RiskFilter) -> StoreResult<i64>;

    /// Insert a risk; fails with `InvalidReference` for an unknown category
    async fn create(&self, risk: NewRisk) -> StoreResult<Risk>;

    async fn update_by_id(&self, id: Uuid, changes: RiskChanges) -> StoreResult<Option<Risk>>;

    async fn delete_by_id(&self, id: Uuid) -> StoreResult<Option<Risk>>;

    /// Remove every risk, returning how many were deleted
    async fn delete_all(&self) -> StoreResult<u64>;
}

/// Storage operations for categories
#[async_trait]
pub trait CategoryStore: Send + Sync {
    /// One lookup per requested id; order is not significant
    async fn find_by_ids(&self, ids: &[Uuid]) -> StoreResult<Vec<Lookup<Uuid, Category>>>;

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Category>>;

    /// Filtered page ordered by creation time
    async fn find(&self, filter: &CategoryFilter, page: PageRequest)
        -> StoreResult<Vec<Category>>;

    /// Count of all categories matching `filter`, ignoring pagination
    async fn count(&self, filter: &CategoryFilter) -> StoreResult<i64>;

    async fn create(&self, category: NewCategory) -> StoreResult<Category>;

    async fn update_by_id(
        &self,
        id: Uuid,
        changes: CategoryChanges,
    ) -> StoreResult<Option<Category>>;

    /// Delete a category and detach every risk that referenced it
    async fn delete_by_id(&self, id: Uuid) -> StoreResult<Option<Category>>;

    /// Remove every category (detaching risks), returning how many were deleted
    async fn delete_all(&self) -> StoreResult<u64>;
}

/// The pair of stores handed to the schema and the hydration service
#[derive(Clone)]
pub struct Stores {
    pub risks: Arc<dyn RiskStore>,
    pub categories: Arc<dyn CategoryStore>,
}

impl Stores {
    /// PostgreSQL-backed stores sharing one pool
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            risks: Arc::new(RiskRepository::new(pool.clone())),
            categories: Arc::new(CategoryRepository::new(pool)),
        }
    }

    /// Process-local stores sharing one set of maps
    pub fn memory() -> Self {
        Self::from_memory(MemoryStore::new())
    }

    pub fn from_memory(store: MemoryStore) -> Self {
        Self {
            risks: Arc::new(store.clone()),
            categories: Arc::new(store),
        }
    }
}

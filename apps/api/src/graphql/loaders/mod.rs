//! Batched loaders for GraphQL resolvers
//!
//! Relationship fields (a risk's category) and single-entity lookups go
//! through these loaders so that one GraphQL operation touches the store at
//! most once per distinct id. [`Loaders`] is built fresh for every operation
//! and injected into the request data; nothing is cached across requests.

mod batch;
mod category;
mod risk;

pub use batch::{
    BatchConfig, BatchFetch, BatchLoader, LoadError, LoadResult, DEFAULT_BATCH_DELAY,
    DEFAULT_MAX_BATCH_SIZE,
};
pub use category::CategoryFetcher;
pub use risk::RiskFetcher;

use uuid::Uuid;

use crate::repositories::Stores;

/// Loader for categories keyed by id
pub type CategoryLoader = BatchLoader<Uuid, CategoryFetcher>;

/// Loader for risks keyed by id
pub type RiskLoader = BatchLoader<Uuid, RiskFetcher>;

/// Loader bundle scoped to a single GraphQL operation
#[derive(Clone)]
pub struct Loaders {
    pub category: CategoryLoader,
    pub risk: RiskLoader,
}

impl Loaders {
    /// Create fresh, empty loaders over the given stores
    pub fn new(stores: &Stores, config: BatchConfig) -> Self {
        Self {
            category: BatchLoader::with_config(
                CategoryFetcher::new(stores.categories.clone()),
                config,
            ),
            risk: BatchLoader::with_config(RiskFetcher::new(stores.risks.clone()), config),
        }
    }
}

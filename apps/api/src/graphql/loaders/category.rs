//! Category batch source
//!
//! Feeds [`BatchLoader`](super::BatchLoader) from a [`CategoryStore`], so
//! every `Risk.category` resolved in one operation costs a single query.

use std::sync::Arc;

use uuid::Uuid;

use super::batch::BatchFetch;
use crate::models::{Category, Lookup};
use crate::repositories::{CategoryStore, StoreResult};

/// Batch source for categories
#[derive(Clone)]
pub struct CategoryFetcher {
    store: Arc<dyn CategoryStore>,
}

impl CategoryFetcher {
    pub fn new(store: Arc<dyn CategoryStore>) -> Self {
        Self { store }
    }
}

impl BatchFetch<Uuid> for CategoryFetcher {
    type Value = Category;
    const ENTITY: &'static str = "Category";

    async fn fetch_by_ids(&self, keys: &[Uuid]) -> StoreResult<Vec<Lookup<Uuid, Category>>> {
        match keys {
            // Guard against empty keys to avoid an unnecessary query
            [] => Ok(Vec::new()),
            // A lone key takes the primary-key lookup
            [id] => Ok(vec![match self.store.find_by_id(*id).await? {
                Some(category) => Lookup::Found(category),
                None => Lookup::NotFound(*id),
            }]),
            _ => self.store.find_by_ids(keys).await,
        }
    }
}

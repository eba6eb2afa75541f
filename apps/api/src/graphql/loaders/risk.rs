//! Risk batch source

use std::sync::Arc;

use uuid::Uuid;

use super::batch::BatchFetch;
use crate::models::{Lookup, Risk};
use crate::repositories::{RiskStore, StoreResult};

/// Batch source for risks
#[derive(Clone)]
pub struct RiskFetcher {
    store: Arc<dyn RiskStore>,
}

impl RiskFetcher {
    pub fn new(store: Arc<dyn RiskStore>) -> Self {
        Self { store }
    }
}

impl BatchFetch<Uuid> for RiskFetcher {
    type Value = Risk;
    const ENTITY: &'static str = "Risk";

    async fn fetch_by_ids(&self, keys: &[Uuid]) -> StoreResult<Vec<Lookup<Uuid, Risk>>> {
        match keys {
            [] => Ok(Vec::new()),
            [id] => Ok(vec![match self.store.find_by_id(*id).await? {
                Some(risk) => Lookup::Found(risk),
                None => Lookup::NotFound(*id),
            }]),
            _ => self.store.find_by_ids(keys).await,
        }
    }
}

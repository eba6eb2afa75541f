//! GraphQL schema builder for Riskboard

use async_graphql::{EmptySubscription, Request, Schema};

use crate::repositories::Stores;

use super::context::CallerIdentity;
use super::loaders::{BatchConfig, Loaders};
use super::mutation::Mutation;
use super::query::Query;

/// The Riskboard GraphQL schema type
pub type RiskboardSchema = Schema<Query, Mutation, EmptySubscription>;

/// Builder for constructing the GraphQL schema
pub struct SchemaBuilder {
    stores: Option<Stores>,
    batch: BatchConfig,
}

impl SchemaBuilder {
    pub fn new() -> Self {
        Self {
            stores: None,
            batch: BatchConfig::default(),
        }
    }

    /// Set the entity stores
    pub fn stores(mut self, stores: Stores) -> Self {
        self.stores = Some(stores);
        self
    }

    /// Set the batch window used by per-request loaders
    pub fn batch_config(mut self, batch: BatchConfig) -> Self {
        self.batch = batch;
        self
    }

    /// Build the schema
    ///
    /// Falls back to empty in-memory stores when none were configured.
    pub fn build(self) -> RiskboardSchema {
        let stores = self.stores.unwrap_or_else(Stores::memory);

        Schema::build(Query::default(), Mutation::default(), EmptySubscription)
            .data(stores)
            .data(self.batch)
            .finish()
    }
}

impl Default for SchemaBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Create a new GraphQL schema over the given stores
pub fn build_schema(stores: Stores, batch: BatchConfig) -> RiskboardSchema {
    SchemaBuilder::new().stores(stores).batch_config(batch).build()
}

/// Attach the per-operation data every request needs
///
/// Each call builds fresh loaders, so nothing cached while serving one
/// request is visible to another.
pub fn prepare_request(
    request: Request,
    stores: &Stores,
    batch: BatchConfig,
    caller: CallerIdentity,
) -> Request {
    request.data(Loaders::new(stores, batch)).data(caller)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_builder_default() {
        let builder = SchemaBuilder::default();
        assert!(builder.stores.is_none());
        assert_eq!(builder.batch.max_batch_size, BatchConfig::default().max_batch_size);
    }

    #[test]
    fn test_sdl_exposes_operations() {
        let sdl = SchemaBuilder::default().build().sdl();
        for field in [
            "risks(",
            "categories(",
            "createRisk(",
            "updateRisk(",
            "removeRisk(",
            "changeRiskStatus(",
            "createCategory(",
            "updateCategory(",
            "removeCategory(",
            "totalCount",
        ] {
            assert!(sdl.contains(field), "missing {field} in schema");
        }
    }
}

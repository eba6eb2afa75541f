//! GraphQL mutations for Riskboard
//!
//! This module contains all mutation resolvers, organized by entity.

mod category;
mod risk;

pub use category::{CategoryMutation, CreateCategoryInput, UpdateCategoryInput};
pub use risk::{CreateRiskInput, RiskMutation, UpdateRiskInput};

use async_graphql::MergedObject;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::graphql::loaders::{LoadError, Loaders};

/// Root mutation type combining all mutation domains
#[derive(MergedObject, Default)]
pub struct Mutation(RiskMutation, CategoryMutation);

/// Check a referenced category through the per-request loader
///
/// Loading it here also means a `category` selection on the mutation
/// result is answered from the cache.
async fn ensure_category_exists(loaders: &Loaders, category_id: Uuid) -> ApiResult<()> {
    match loaders.category.load(category_id).await {
        Ok(_) => Ok(()),
        Err(LoadError::NotFound { .. }) => Err(ApiError::validation(format!(
            "category {} does not exist",
            category_id
        ))),
        Err(err) => Err(err.into()),
    }
}

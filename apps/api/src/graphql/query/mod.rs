//! GraphQL queries for Riskboard
//!
//! This module contains all query resolvers, organized by entity.

mod category;
mod risk;

pub use category::CategoryQuery;
pub use risk::RiskQuery;

use async_graphql::MergedObject;

/// Root query type combining all query domains
#[derive(MergedObject, Default)]
pub struct Query(RiskQuery, CategoryQuery);

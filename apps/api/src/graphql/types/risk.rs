//! Risk GraphQL type
//!
//! `category` is resolved through the per-request category loader, so a
//! page of risks costs one category query no matter how many rows share a
//! category.

use async_graphql::{Context, ErrorExtensions, InputObject, Object, Result, SimpleObject};
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::ApiError;
use crate::graphql::loaders::{LoadError, Loaders};
use crate::models::{Risk as DbRisk, RiskFilter};

use super::category::Category;

/// Risk exposed via GraphQL
pub struct Risk {
    inner: DbRisk,
}

impl Risk {
    pub fn new(risk: DbRisk) -> Self {
        Self { inner: risk }
    }
}

impl From<DbRisk> for Risk {
    fn from(risk: DbRisk) -> Self {
        Self::new(risk)
    }
}

#[Object]
impl Risk {
    /// Unique risk identifier
    async fn id(&self) -> Uuid {
        self.inner.id
    }

    async fn name(&self) -> &str {
        &self.inner.name
    }

    async fn description(&self) -> &str {
        &self.inner.description
    }

    /// Whether the risk has been resolved
    async fn resolved(&self) -> bool {
        self.inner.resolved
    }

    /// Id of the owning category; null once the category was removed
    async fn category_id(&self) -> Option<Uuid> {
        self.inner.category_id
    }

    /// Owning category (batched through the category loader)
    async fn category(&self, ctx: &Context<'_>) -> Result<Option<Category>> {
        let Some(category_id) = self.inner.category_id else {
            return Ok(None);
        };

        let loaders = ctx.data::<Loaders>()?;
        match loaders.category.load(category_id).await {
            Ok(category) => Ok(Some(Category::from(category))),
            Err(LoadError::NotFound { .. }) => Ok(None),
            Err(err) => Err(ApiError::from(err).extend()),
        }
    }

    /// Identity of the caller that created the risk
    async fn created_by(&self) -> &str {
        &self.inner.created_by
    }

    /// Creation timestamp
    async fn created_at(&self) -> DateTime<Utc> {
        self.inner.created_at
    }

    /// Last update timestamp
    async fn updated_at(&self) -> DateTime<Utc> {
        self.inner.updated_at
    }
}

/// One page of risks
#[derive(SimpleObject)]
pub struct RiskPage {
    pub items: Vec<Risk>,
    /// Number of matching risks, ignoring pagination
    pub total_count: i64,
}

/// Listing filters for `risks`
#[derive(Debug, Clone, Default, InputObject)]
pub struct RiskFilters {
    /// Case-insensitive substring of the name
    pub name_filter: Option<String>,
    /// Case-insensitive substring of the description
    pub description_filter: Option<String>,
    /// Set to false to hide resolved risks
    pub include_resolved: Option<bool>,
}

impl From<RiskFilters> for RiskFilter {
    fn from(filters: RiskFilters) -> Self {
        Self {
            name: filters.name_filter,
            description: filters.description_filter,
            include_resolved: filters.include_resolved,
        }
    }
}

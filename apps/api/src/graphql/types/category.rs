//! Category GraphQL type

use async_graphql::{InputObject, Object, SimpleObject};
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::{Category as DbCategory, CategoryFilter};

/// Risk category exposed via GraphQL
pub struct Category {
    inner: DbCategory,
}

impl Category {
    pub fn new(category: DbCategory) -> Self {
        Self { inner: category }
    }
}

impl From<DbCategory> for Category {
    fn from(category: DbCategory) -> Self {
        Self::new(category)
    }
}

#[Object]
impl Category {
    /// Unique category identifier
    async fn id(&self) -> Uuid {
        self.inner.id
    }

    async fn name(&self) -> &str {
        &self.inner.name
    }

    async fn description(&self) -> &str {
        &self.inner.description
    }

    /// Identity of the caller that created the category
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

/// One page of categories
#[derive(SimpleObject)]
pub struct CategoryPage {
    pub items: Vec<Category>,
    /// Number of matching categories, ignoring pagination
    pub total_count: i64,
}

/// Listing filters for `categories`
#[derive(Debug, Clone, Default, InputObject)]
pub struct CategoryFilters {
    /// Case-insensitive substring of the name
    pub name_filter: Option<String>,
    /// Case-insensitive substring of the description
    pub description_filter: Option<String>,
}

impl From<CategoryFilters> for CategoryFilter {
    fn from(filters: CategoryFilters) -> Self {
        Self {
            name: filters.name_filter,
            description: filters.description_filter,
        }
    }
}

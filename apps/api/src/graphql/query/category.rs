//! Category queries for the Riskboard GraphQL API

use async_graphql::{Context, Object, Result, ID};

use crate::graphql::error::ResultExt;
use crate::graphql::loaders::{LoadError, Loaders};
use crate::graphql::pagination::Pagination;
use crate::graphql::types::{Category, CategoryFilters, CategoryPage};
use crate::graphql::validation::parse_id;
use crate::models::CategoryFilter;
use crate::repositories::Stores;

/// Category-related queries
#[derive(Default)]
pub struct CategoryQuery;

#[Object]
impl CategoryQuery {
    /// List categories ordered by creation time
    async fn categories(
        &self,
        ctx: &Context<'_>,
        filters: Option<CategoryFilters>,
        pagination: Option<Pagination>,
    ) -> Result<CategoryPage> {
        let stores = ctx.data::<Stores>()?;
        let filter = CategoryFilter::from(filters.unwrap_or_default());
        let page = pagination.unwrap_or_default().page_request();

        let (items, total_count) = futures_util::try_join!(
            stores.categories.find(&filter, page),
            stores.categories.count(&filter)
        )
        .extend_err()?;

        Ok(CategoryPage {
            items: items.into_iter().map(Category::from).collect(),
            total_count,
        })
    }

    /// Get a category by id; null when it does not exist
    async fn category(&self, ctx: &Context<'_>, id: ID) -> Result<Option<Category>> {
        let id = parse_id("id", &id).extend_err()?;
        let loaders = ctx.data::<Loaders>()?;

        match loaders.category.load(id).await {
            Ok(category) => Ok(Some(Category::from(category))),
            Err(LoadError::NotFound { .. }) => Ok(None),
            Err(err) => Err(err).extend_err(),
        }
    }
}

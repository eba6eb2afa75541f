//! Category mutations for the Riskboard GraphQL API
//!
//! - createCategory
//! - updateCategory
//! - removeCategory: deletes the category and detaches its risks

use async_graphql::{Context, InputObject, Object, Result, ID};

use crate::error::ApiError;
use crate::graphql::context::require_caller;
use crate::graphql::error::ResultExt;
use crate::graphql::loaders::Loaders;
use crate::graphql::types::Category;
use crate::graphql::validation::{
    optional_text, parse_id, required_text, MAX_DESCRIPTION_LENGTH, MAX_NAME_LENGTH,
};
use crate::models::{Category as DbCategory, CategoryChanges, NewCategory};
use crate::repositories::Stores;

/// Input for creating a new category
#[derive(Debug, InputObject)]
pub struct CreateCategoryInput {
    pub name: String,
    pub description: String,
}

/// Input for updating an existing category; omitted fields are left unchanged
#[derive(Debug, Default, InputObject)]
pub struct UpdateCategoryInput {
    pub name: Option<String>,
    pub description: Option<String>,
}

fn refresh_cache(loaders: &Loaders, category: &DbCategory) {
    loaders.category.clear(&category.id);
    loaders.category.prime(category.id, category.clone());
}

/// Category mutations
#[derive(Default)]
pub struct CategoryMutation;

#[Object]
impl CategoryMutation {
    /// Create a new category
    async fn create_category(
        &self,
        ctx: &Context<'_>,
        input: CreateCategoryInput,
    ) -> Result<Category> {
        let caller = require_caller(ctx).extend_err()?;

        let name = required_text("name", &input.name, MAX_NAME_LENGTH).extend_err()?;
        let description = required_text("description", &input.description, MAX_DESCRIPTION_LENGTH)
            .extend_err()?;

        let stores = ctx.data::<Stores>()?;
        let loaders = ctx.data::<Loaders>()?;

        let category = stores
            .categories
            .create(NewCategory::new(name, description, caller))
            .await
            .extend_err()?;

        refresh_cache(loaders, &category);
        tracing::info!(category_id = %category.id, created_by = caller, "Category created");

        Ok(Category::from(category))
    }

    /// Update an existing category
    ///
    /// At least one field must be provided. Returns null when the category
    /// does not exist.
    async fn update_category(
        &self,
        ctx: &Context<'_>,
        id: ID,
        input: UpdateCategoryInput,
    ) -> Result<Option<Category>> {
        let caller = require_caller(ctx).extend_err()?;
        let category_id = parse_id("id", &id).extend_err()?;

        let changes = CategoryChanges {
            name: optional_text("name", input.name.as_deref(), MAX_NAME_LENGTH).extend_err()?,
            description: optional_text(
                "description",
                input.description.as_deref(),
                MAX_DESCRIPTION_LENGTH,
            )
            .extend_err()?,
        };
        if changes.is_empty() {
            return Err(ApiError::validation("update must change at least one field")).extend_err();
        }

        let stores = ctx.data::<Stores>()?;
        let loaders = ctx.data::<Loaders>()?;

        let updated = stores
            .categories
            .update_by_id(category_id, changes)
            .await
            .extend_err()?;

        match updated {
            Some(category) => {
                refresh_cache(loaders, &category);
                tracing::info!(category_id = %category_id, updated_by = caller, "Category updated");
                Ok(Some(Category::from(category)))
            }
            None => {
                loaders.category.clear(&category_id);
                Ok(None)
            }
        }
    }

    /// Delete a category, returning it as it was before removal
    ///
    /// Risks in the category are kept with a null `categoryId`.
    async fn remove_category(&self, ctx: &Context<'_>, id: ID) -> Result<Option<Category>> {
        let caller = require_caller(ctx).extend_err()?;
        let category_id = parse_id("id", &id).extend_err()?;

        let stores = ctx.data::<Stores>()?;
        let loaders = ctx.data::<Loaders>()?;

        let removed = stores
            .categories
            .delete_by_id(category_id)
            .await
            .extend_err()?;

        loaders.category.clear(&category_id);
        if removed.is_some() {
            // Detached risks changed category_id
            loaders.risk.clear_all();
            tracing::info!(category_id = %category_id, removed_by = caller, "Category removed");
        }

        Ok(removed.map(Category::from))
    }
}

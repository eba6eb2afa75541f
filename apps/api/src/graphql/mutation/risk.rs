//! Risk mutations for the Riskboard GraphQL API
//!
//! - createRisk: create a risk in an existing category
//! - updateRisk: change name, description or category
//! - removeRisk: delete a risk
//! - changeRiskStatus: mark a risk resolved or unresolved
//!
//! Every mutation requires a caller identity. Update, remove and status
//! changes return null when the risk does not exist.

use async_graphql::{Context, InputObject, Object, Result, ID};
use uuid::Uuid;

use crate::error::ApiError;
use crate::graphql::context::require_caller;
use crate::graphql::error::ResultExt;
use crate::graphql::loaders::Loaders;
use crate::graphql::types::Risk;
use crate::graphql::validation::{
    optional_text, parse_id, required_text, MAX_DESCRIPTION_LENGTH, MAX_NAME_LENGTH,
};
use crate::models::{NewRisk, Risk as DbRisk, RiskChanges};
use crate::repositories::Stores;

use super::ensure_category_exists;

/// Input for creating a new risk
#[derive(Debug, InputObject)]
pub struct CreateRiskInput {
    pub name: String,
    pub description: String,
    /// Category the risk belongs to (must exist)
    pub category_id: ID,
}

/// Input for updating an existing risk; omitted fields are left unchanged
#[derive(Debug, Default, InputObject)]
pub struct UpdateRiskInput {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category_id: Option<ID>,
}

/// Replace the cached risk with the value the store just returned
fn refresh_cache(loaders: &Loaders, risk: &DbRisk) {
    loaders.risk.clear(&risk.id);
    loaders.risk.prime(risk.id, risk.clone());
}

/// Risk mutations
#[derive(Default)]
pub struct RiskMutation;

#[Object]
impl RiskMutation {
    /// Create a new risk
    ///
    /// # Errors
    /// - UNAUTHENTICATED without a caller identity
    /// - BAD_USER_INPUT for blank or oversized text, or a malformed or
    ///   unknown category id
    async fn create_risk(&self, ctx: &Context<'_>, input: CreateRiskInput) -> Result<Risk> {
        let caller = require_caller(ctx).extend_err()?;

        let name = required_text("name", &input.name, MAX_NAME_LENGTH).extend_err()?;
        let description = required_text("description", &input.description, MAX_DESCRIPTION_LENGTH)
            .extend_err()?;
        let category_id = parse_id("categoryId", &input.category_id).extend_err()?;

        let loaders = ctx.data::<Loaders>()?;
        ensure_category_exists(loaders, category_id).await.extend_err()?;

        let stores = ctx.data::<Stores>()?;
        let risk = stores
            .risks
            .create(NewRisk::new(name, description, category_id, caller))
            .await
            .extend_err()?;

        refresh_cache(loaders, &risk);
        tracing::info!(risk_id = %risk.id, created_by = caller, "Risk created");

        Ok(Risk::from(risk))
    }

    /// Update an existing risk
    ///
    /// At least one field must be provided.
    async fn update_risk(
        &self,
        ctx: &Context<'_>,
        id: ID,
        input: UpdateRiskInput,
    ) -> Result<Option<Risk>> {
        let caller = require_caller(ctx).extend_err()?;
        let risk_id = parse_id("id", &id).extend_err()?;

        let category_id: Option<Uuid> = input
            .category_id
            .as_ref()
            .map(|id| parse_id("categoryId", id))
            .transpose()
            .extend_err()?;
        let changes = RiskChanges {
            name: optional_text("name", input.name.as_deref(), MAX_NAME_LENGTH).extend_err()?,
            description: optional_text(
                "description",
                input.description.as_deref(),
                MAX_DESCRIPTION_LENGTH,
            )
            .extend_err()?,
            category_id,
            resolved: None,
        };
        if changes.is_empty() {
            return Err(ApiError::validation("update must change at least one field")).extend_err();
        }

        let loaders = ctx.data::<Loaders>()?;
        if let Some(category_id) = category_id {
            ensure_category_exists(loaders, category_id).await.extend_err()?;
        }

        let updated = apply_changes(ctx, loaders, risk_id, changes).await?;
        if updated.is_some() {
            tracing::info!(risk_id = %risk_id, updated_by = caller, "Risk updated");
        }
        Ok(updated)
    }

    /// Delete a risk, returning it as it was before removal
    async fn remove_risk(&self, ctx: &Context<'_>, id: ID) -> Result<Option<Risk>> {
        let caller = require_caller(ctx).extend_err()?;
        let risk_id = parse_id("id", &id).extend_err()?;

        let stores = ctx.data::<Stores>()?;
        let loaders = ctx.data::<Loaders>()?;

        let removed = stores.risks.delete_by_id(risk_id).await.extend_err()?;
        loaders.risk.clear(&risk_id);

        if removed.is_some() {
            tracing::info!(risk_id = %risk_id, removed_by = caller, "Risk removed");
        }
        Ok(removed.map(Risk::from))
    }

    /// Mark a risk resolved or unresolved
    async fn change_risk_status(
        &self,
        ctx: &Context<'_>,
        id: ID,
        resolved: bool,
    ) -> Result<Option<Risk>> {
        let caller = require_caller(ctx).extend_err()?;
        let risk_id = parse_id("id", &id).extend_err()?;
        let loaders = ctx.data::<Loaders>()?;

        let updated = apply_changes(ctx, loaders, risk_id, RiskChanges::status(resolved)).await?;
        if updated.is_some() {
            tracing::info!(
                risk_id = %risk_id,
                resolved = resolved,
                changed_by = caller,
                "Risk status changed"
            );
        }
        Ok(updated)
    }
}

async fn apply_changes(
    ctx: &Context<'_>,
    loaders: &Loaders,
    risk_id: Uuid,
    changes: RiskChanges,
) -> Result<Option<Risk>> {
    let stores = ctx.data::<Stores>()?;
    let updated = stores
        .risks
        .update_by_id(risk_id, changes)
        .await
        .extend_err()?;

    match updated {
        Some(risk) => {
            refresh_cache(loaders, &risk);
            Ok(Some(Risk::from(risk)))
        }
        None => {
            loaders.risk.clear(&risk_id);
            Ok(None)
        }
    }
}

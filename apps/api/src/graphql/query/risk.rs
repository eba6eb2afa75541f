//! Risk queries for the Riskboard GraphQL API
//!
//! - risks: filtered, paginated listing with a total count
//! - risk: a single risk by id

use async_graphql::{Context, Object, Result, ID};

use crate::graphql::error::ResultExt;
use crate::graphql::loaders::{LoadError, Loaders};
use crate::graphql::pagination::Pagination;
use crate::graphql::types::{Risk, RiskFilters, RiskPage};
use crate::graphql::validation::parse_id;
use crate::models::RiskFilter;
use crate::repositories::Stores;

/// Risk-related queries
#[derive(Default)]
pub struct RiskQuery;

#[Object]
impl RiskQuery {
    /// List risks ordered by creation time
    ///
    /// `totalCount` counts every risk matching the filters, regardless of
    /// pagination.
    async fn risks(
        &self,
        ctx: &Context<'_>,
        filters: Option<RiskFilters>,
        pagination: Option<Pagination>,
    ) -> Result<RiskPage> {
        let stores = ctx.data::<Stores>()?;
        let filter = RiskFilter::from(filters.unwrap_or_default());
        let page = pagination.unwrap_or_default().page_request();

        let (items, total_count) = futures_util::try_join!(
            stores.risks.find(&filter, page),
            stores.risks.count(&filter)
        )
        .extend_err()?;

        Ok(RiskPage {
            items: items.into_iter().map(Risk::from).collect(),
            total_count,
        })
    }

    /// Get a risk by id; null when it does not exist
    async fn risk(&self, ctx: &Context<'_>, id: ID) -> Result<Option<Risk>> {
        let id = parse_id("id", &id).extend_err()?;
        let loaders = ctx.data::<Loaders>()?;

        match loaders.risk.load(id).await {
            Ok(risk) => Ok(Some(Risk::from(risk))),
            Err(LoadError::NotFound { .. }) => Ok(None),
            Err(err) => Err(err).extend_err(),
        }
    }
}

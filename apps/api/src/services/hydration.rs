//! Start-up seeding of the entity stores
//!
//! `HYDRATION_MODE` picks what happens before the server starts listening:
//! - `test`: wipe both stores and load the bundled test fixture
//! - `production`: wipe both stores and load the bundled production fixture
//! - `development`: load the test fixture only when a store is empty
//! - anything else: leave the stores alone
//!
//! Fixtures use numeric local ids and Unix-millisecond timestamps encoded as
//! strings. Categories are inserted first so risks can be pointed at the ids
//! the store assigned.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::models::{CategoryFilter, NewCategory, NewRisk, RiskFilter};
use crate::repositories::{StoreError, Stores};

const TEST_FIXTURE: &str = include_str!("../../mocks/test.json");
const PRODUCTION_FIXTURE: &str = include_str!("../../mocks/prod.json");

/// Start-up seeding behaviour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HydrationMode {
    /// Replace all data with the test fixture
    Test,
    /// Replace all data with the production-sized fixture
    Production,
    /// Seed the test fixture into empty stores only
    Development,
    #[default]
    Disabled,
}

impl HydrationMode {
    /// Unknown values disable hydration
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "test" => Self::Test,
            "production" => Self::Production,
            "development" => Self::Development,
            _ => Self::Disabled,
        }
    }
}

#[derive(Debug, Error)]
pub enum HydrationError {
    #[error("invalid fixture: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid timestamp '{0}' in fixture")]
    InvalidTimestamp(String),

    #[error("risk {risk} references unknown category {category}")]
    UnknownCategory { risk: i64, category: i64 },

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type HydrationResult<T> = Result<T, HydrationError>;

/// Seed data as stored in `mocks/*.json`
#[derive(Debug, Clone, Deserialize)]
pub struct Fixture {
    pub categories: Vec<FixtureCategory>,
    pub risks: Vec<FixtureRisk>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FixtureCategory {
    #[serde(rename = "_id")]
    pub id: i64,
    pub name: String,
    pub description: String,
    pub created_by: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FixtureRisk {
    #[serde(rename = "_id")]
    pub id: i64,
    pub name: String,
    pub description: String,
    pub category_id: i64,
    pub resolved: bool,
    pub created_by: String,
    pub created_at: String,
    pub updated_at: String,
}

impl Fixture {
    pub fn parse(json: &str) -> HydrationResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn test() -> HydrationResult<Self> {
        Self::parse(TEST_FIXTURE)
    }

    pub fn production() -> HydrationResult<Self> {
        Self::parse(PRODUCTION_FIXTURE)
    }
}

/// Counts of inserted entities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HydrationReport {
    pub categories: usize,
    pub risks: usize,
}

fn parse_unix_millis(value: &str) -> HydrationResult<DateTime<Utc>> {
    value
        .trim()
        .parse::<i64>()
        .ok()
        .and_then(DateTime::from_timestamp_millis)
        .ok_or_else(|| HydrationError::InvalidTimestamp(value.to_string()))
}

/// Seeds the stores from bundled fixtures
pub struct HydrationService {
    stores: Stores,
}

impl HydrationService {
    pub fn new(stores: Stores) -> Self {
        Self { stores }
    }

    /// Run the seeding selected by `mode`
    ///
    /// Returns `None` when nothing was loaded.
    #[instrument(skip(self))]
    pub async fn hydrate(&self, mode: HydrationMode) -> HydrationResult<Option<HydrationReport>> {
        let fixture = match mode {
            HydrationMode::Disabled => return Ok(None),
            HydrationMode::Test => Fixture::test()?,
            HydrationMode::Production => Fixture::production()?,
            HydrationMode::Development => {
                if !self.any_store_empty().await? {
                    debug!("Stores already populated, skipping development fixture");
                    return Ok(None);
                }
                info!("Empty store found, loading development fixture");
                Fixture::test()?
            }
        };

        let report = self.replace_with(&fixture).await?;
        info!(
            categories = report.categories,
            risks = report.risks,
            "Hydration complete"
        );
        Ok(Some(report))
    }

    async fn any_store_empty(&self) -> HydrationResult<bool> {
        let risk_filter = RiskFilter::default();
        let category_filter = CategoryFilter::default();
        let (risks, categories) = futures_util::try_join!(
            self.stores.risks.count(&risk_filter),
            self.stores.categories.count(&category_filter)
        )?;
        Ok(risks == 0 || categories == 0)
    }

    /// Wipe both stores and insert `fixture`
    pub async fn replace_with(&self, fixture: &Fixture) -> HydrationResult<HydrationReport> {
        // Timestamps and references are checked before anything is deleted
        let categories = fixture
            .categories
            .iter()
            .map(|c| -> HydrationResult<(i64, NewCategory)> {
                Ok((
                    c.id,
                    NewCategory {
                        name: c.name.clone(),
                        description: c.description.clone(),
                        created_by: c.created_by.clone(),
                        created_at: parse_unix_millis(&c.created_at)?,
                        updated_at: parse_unix_millis(&c.updated_at)?,
                    },
                ))
            })
            .collect::<HydrationResult<Vec<_>>>()?;

        let local_ids: HashSet<i64> = categories.iter().map(|(id, _)| *id).collect();
        let risks = fixture
            .risks
            .iter()
            .map(|r| -> HydrationResult<(i64, NewRisk)> {
                if !local_ids.contains(&r.category_id) {
                    return Err(HydrationError::UnknownCategory {
                        risk: r.id,
                        category: r.category_id,
                    });
                }
                Ok((
                    r.category_id,
                    NewRisk {
                        name: r.name.clone(),
                        description: r.description.clone(),
                        category_id: None,
                        resolved: r.resolved,
                        created_by: r.created_by.clone(),
                        created_at: parse_unix_millis(&r.created_at)?,
                        updated_at: parse_unix_millis(&r.updated_at)?,
                    },
                ))
            })
            .collect::<HydrationResult<Vec<_>>>()?;

        let removed_risks = self.stores.risks.delete_all().await?;
        let removed_categories = self.stores.categories.delete_all().await?;
        debug!(
            risks = removed_risks,
            categories = removed_categories,
            "Cleared stores"
        );

        let mut id_mapping: HashMap<i64, Uuid> = HashMap::with_capacity(categories.len());
        for (local_id, category) in categories {
            let created = self.stores.categories.create(category).await?;
            id_mapping.insert(local_id, created.id);
        }

        let mut report = HydrationReport {
            categories: id_mapping.len(),
            risks: 0,
        };
        for (local_category, mut risk) in risks {
            risk.category_id = id_mapping.get(&local_category).copied();
            self.stores.risks.create(risk).await?;
            report.risks += 1;
        }

        Ok(report)
    }
}

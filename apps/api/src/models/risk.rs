//! Risk model for Riskboard
//!
//! A risk optionally belongs to a category and carries a resolved flag that
//! is toggled through its own status mutation.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

use super::{contains_ignore_case, Keyed};

/// Risk record from the risks table
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct Risk {
    /// Unique risk identifier
    pub id: Uuid,

    pub name: String,

    pub description: String,

    /// Owning category; cleared when that category is removed
    pub category_id: Option<Uuid>,

    /// Whether the risk has been dealt with
    pub resolved: bool,

    /// Identity of the caller that created the risk
    pub created_by: String,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp, never earlier than `created_at`
    pub updated_at: DateTime<Utc>,
}

impl Keyed for Risk {
    type Key = Uuid;

    fn key(&self) -> Uuid {
        self.id
    }
}

/// Risk creation input
#[derive(Debug, Clone)]
pub struct NewRisk {
    pub name: String,
    pub description: String,
    pub category_id: Option<Uuid>,
    pub resolved: bool,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl NewRisk {
    /// An unresolved risk stamped with the current time
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        category_id: Uuid,
        created_by: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            name: name.into(),
            description: description.into(),
            category_id: Some(category_id),
            resolved: false,
            created_by: created_by.into(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial risk update; `None` fields are left untouched
#[derive(Debug, Clone, Default)]
pub struct RiskChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category_id: Option<Uuid>,
    pub resolved: Option<bool>,
}

impl RiskChanges {
    /// Changes that only flip the resolved flag
    pub fn status(resolved: bool) -> Self {
        Self {
            resolved: Some(resolved),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.category_id.is_none()
            && self.resolved.is_none()
    }
}

/// Listing filter for risks
#[derive(Debug, Clone, Default)]
pub struct RiskFilter {
    /// Case-insensitive substring of the name
    pub name: Option<String>,
    /// Case-insensitive substring of the description
    pub description: Option<String>,
    /// Only an explicit `false` hides resolved risks
    pub include_resolved: Option<bool>,
}

impl RiskFilter {
    pub fn excludes_resolved(&self) -> bool {
        self.include_resolved == Some(false)
    }

    /// In-process evaluation of the filter
    pub fn matches(&self, risk: &Risk) -> bool {
        if self.excludes_resolved() && risk.resolved {
            return false;
        }
        self.name
            .as_deref()
            .map_or(true, |needle| contains_ignore_case(&risk.name, needle))
            && self
                .description
                .as_deref()
                .map_or(true, |needle| contains_ignore_case(&risk.description, needle))
    }
}

#[cfg(test)]
impl Risk {
    pub(crate) fn sample(name: &str, category_id: Option<Uuid>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
            description: format!("{} description", name),
            category_id,
            resolved: false,
            created_by: "tester".to_string(),
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_risk_starts_unresolved() {
        let category_id = Uuid::new_v4();
        let risk = NewRisk::new("Outage", "Primary region down", category_id, "alice");
        assert!(!risk.resolved);
        assert_eq!(risk.category_id, Some(category_id));
        assert_eq!(risk.created_at, risk.updated_at);
    }

    #[test]
    fn test_status_changes() {
        let changes = RiskChanges::status(true);
        assert_eq!(changes.resolved, Some(true));
        assert!(!changes.is_empty());
        assert!(RiskChanges::default().is_empty());
    }

    #[test]
    fn test_filter_include_resolved_semantics() {
        let mut risk = Risk::sample("Vendor lock-in", None);
        risk.resolved = true;

        assert!(RiskFilter::default().matches(&risk));
        let include = RiskFilter {
            include_resolved: Some(true),
            ..Default::default()
        };
        assert!(include.matches(&risk));
        let exclude = RiskFilter {
            include_resolved: Some(false),
            ..Default::default()
        };
        assert!(!exclude.matches(&risk));
    }

    #[test]
    fn test_filter_by_description() {
        let risk = Risk::sample("Churn", None);
        let filter = RiskFilter {
            description: Some("CHURN desc".to_string()),
            ..Default::default()
        };
        assert!(filter.matches(&risk));
    }
}

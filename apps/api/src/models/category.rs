//! Category model for Riskboard
//!
//! Categories group risks. Deleting a category detaches its risks rather
//! than deleting them.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

use super::{contains_ignore_case, Keyed};

/// Category record from the categories table
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct Category {
    /// Unique category identifier
    pub id: Uuid,

    pub name: String,

    pub description: String,

    /// Identity of the caller that created the category
    pub created_by: String,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp, never earlier than `created_at`
    pub updated_at: DateTime<Utc>,
}

impl Keyed for Category {
    type Key = Uuid;

    fn key(&self) -> Uuid {
        self.id
    }
}

/// Category creation input
#[derive(Debug, Clone)]
pub struct NewCategory {
    pub name: String,
    pub description: String,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl NewCategory {
    /// A category stamped with the current time
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        created_by: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            name: name.into(),
            description: description.into(),
            created_by: created_by.into(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial category update; `None` fields are left untouched
#[derive(Debug, Clone, Default)]
pub struct CategoryChanges {
    pub name: Option<String>,
    pub description: Option<String>,
}

impl CategoryChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none()
    }
}

/// Listing filter for categories
#[derive(Debug, Clone, Default)]
pub struct CategoryFilter {
    /// Case-insensitive substring of the name
    pub name: Option<String>,
    /// Case-insensitive substring of the description
    pub description: Option<String>,
}

impl CategoryFilter {
    /// In-process evaluation of the filter
    pub fn matches(&self, category: &Category) -> bool {
        self.name
            .as_deref()
            .map_or(true, |needle| contains_ignore_case(&category.name, needle))
            && self
                .description
                .as_deref()
                .map_or(true, |needle| contains_ignore_case(&category.description, needle))
    }
}

#[cfg(test)]
impl Category {
    pub(crate) fn sample(name: &str) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
            description: format!("{} risks", name),
            created_by: "tester".to_string(),
            created_at: now,
            updated_at: now,
        }
    }
}

//! Risk repository backed by PostgreSQL

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::utils::{contains_pattern, lookups_for, RISK_COLUMNS};
use super::{RiskStore, StoreError, StoreResult};
use crate::models::{Lookup, NewRisk, PageRequest, Risk, RiskChanges, RiskFilter};

// $3 is true unless the caller explicitly excluded resolved risks
const FILTER_CLAUSE: &str = r#"
    ($1::text IS NULL OR name ILIKE $1)
    AND ($2::text IS NULL OR description ILIKE $2)
    AND ($3 OR resolved = FALSE)
"#;

/// Repository for risk database operations
#[derive(Clone)]
pub struct RiskRepository {
    pool: PgPool,
}

impl RiskRepository {
    /// Create a new RiskRepository instance
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Turn foreign-key violations on `category_id` into a typed error
fn map_write_error(err: sqlx::Error, category_id: Option<Uuid>) -> StoreError {
    match &err {
        sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
            StoreError::InvalidReference(match category_id {
                Some(id) => format!("category {} does not exist", id),
                None => "category does not exist".to_string(),
            })
        }
        _ => StoreError::Database(err),
    }
}

#[async_trait]
impl RiskStore for RiskRepository {
    async fn find_by_ids(&self, ids: &[Uuid]) -> StoreResult<Vec<Lookup<Uuid, Risk>>> {
        let sql = format!("SELECT {} FROM risks WHERE id = ANY($1)", RISK_COLUMNS);
        let rows: Vec<Risk> = sqlx::query_as(&sql)
            .bind(ids)
            .fetch_all(&self.pool)
            .await?;
        Ok(lookups_for(ids, rows))
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Risk>> {
        let sql = format!("SELECT {} FROM risks WHERE id = $1", RISK_COLUMNS);
        let risk = sqlx::query_as::<_, Risk>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(risk)
    }

    async fn find(&self, filter: &RiskFilter, page: PageRequest) -> StoreResult<Vec<Risk>> {
        let sql = format!(
            "SELECT {} FROM risks WHERE {} ORDER BY created_at ASC, id ASC LIMIT $4 OFFSET $5",
            RISK_COLUMNS, FILTER_CLAUSE
        );
        let risks = sqlx::query_as::<_, Risk>(&sql)
            .bind(filter.name.as_deref().map(contains_pattern))
            .bind(filter.description.as_deref().map(contains_pattern))
            .bind(!filter.excludes_resolved())
            .bind(page.limit)
            .bind(page.offset)
            .fetch_all(&self.pool)
            .await?;
        Ok(risks)
    }

    async fn count(&self, filter: &RiskFilter) -> StoreResult<i64> {
        let sql = format!("SELECT COUNT(*) FROM risks WHERE {}", FILTER_CLAUSE);
        let count = sqlx::query_scalar::<_, i64>(&sql)
            .bind(filter.name.as_deref().map(contains_pattern))
            .bind(filter.description.as_deref().map(contains_pattern))
            .bind(!filter.excludes_resolved())
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn create(&self, risk: NewRisk) -> StoreResult<Risk> {
        let sql = format!(
            r#"INSERT INTO risks
                (id, name, description, category_id, resolved, created_by, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {}"#,
            RISK_COLUMNS
        );
        let created = sqlx::query_as::<_, Risk>(&sql)
            .bind(Uuid::new_v4())
            .bind(&risk.name)
            .bind(&risk.description)
            .bind(risk.category_id)
            .bind(risk.resolved)
            .bind(&risk.created_by)
            .bind(risk.created_at)
            .bind(risk.updated_at.max(risk.created_at))
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_write_error(e, risk.category_id))?;

        tracing::debug!(risk_id = %created.id, "Risk created");
        Ok(created)
    }

    async fn update_by_id(&self, id: Uuid, changes: RiskChanges) -> StoreResult<Option<Risk>> {
        let category_id = changes.category_id;
        let sql = format!(
            r#"UPDATE risks SET
                name = COALESCE($2, name),
                description = COALESCE($3, description),
                category_id = COALESCE($4, category_id),
                resolved = COALESCE($5, resolved),
                updated_at = GREATEST(NOW(), created_at)
            WHERE id = $1
            RETURNING {}"#,
            RISK_COLUMNS
        );
        let updated = sqlx::query_as::<_, Risk>(&sql)
            .bind(id)
            .bind(changes.name)
            .bind(changes.description)
            .bind(category_id)
            .bind(changes.resolved)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_write_error(e, category_id))?;
        Ok(updated)
    }

    async fn delete_by_id(&self, id: Uuid) -> StoreResult<Option<Risk>> {
        let sql = format!("DELETE FROM risks WHERE id = $1 RETURNING {}", RISK_COLUMNS);
        let removed = sqlx::query_as::<_, Risk>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(removed)
    }

    async fn delete_all(&self) -> StoreResult<u64> {
        let deleted = sqlx::query("DELETE FROM risks")
            .execute(&self.pool)
            .await?
            .rows_affected();
        Ok(deleted)
    }
}

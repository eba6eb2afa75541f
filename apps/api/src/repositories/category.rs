//! Category repository backed by PostgreSQL
//!
//! All queries select [`CATEGORY_COLUMNS`] so rows map onto [`Category`]
//! through `FromRow`. Optional filters are expressed as nullable binds
//! (`$1::text IS NULL OR ...`) so each operation keeps a single SQL string.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::utils::{contains_pattern, lookups_for, CATEGORY_COLUMNS};
use super::{CategoryStore, StoreResult};
use crate::models::{Category, CategoryChanges, CategoryFilter, Lookup, NewCategory, PageRequest};

const FILTER_CLAUSE: &str = r#"
    ($1::text IS NULL OR name ILIKE $1)
    AND ($2::text IS NULL OR description ILIKE $2)
"#;

/// Repository for category database operations
#[derive(Clone)]
pub struct CategoryRepository {
    pool: PgPool,
}

impl CategoryRepository {
    /// Create a new CategoryRepository instance
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CategoryStore for CategoryRepository {
    async fn find_by_ids(&self, ids: &[Uuid]) -> StoreResult<Vec<Lookup<Uuid, Category>>> {
        let sql = format!(
            "SELECT {} FROM categories WHERE id = ANY($1)",
            CATEGORY_COLUMNS
        );
        let rows: Vec<Category> = sqlx::query_as(&sql)
            .bind(ids)
            .fetch_all(&self.pool)
            .await?;
        Ok(lookups_for(ids, rows))
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Category>> {
        let sql = format!("SELECT {} FROM categories WHERE id = $1", CATEGORY_COLUMNS);
        let category = sqlx::query_as::<_, Category>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(category)
    }

    async fn find(
        &self,
        filter: &CategoryFilter,
        page: PageRequest,
    ) -> StoreResult<Vec<Category>> {
        let sql = format!(
            "SELECT {} FROM categories WHERE {} ORDER BY created_at ASC, id ASC LIMIT $3 OFFSET $4",
            CATEGORY_COLUMNS, FILTER_CLAUSE
        );
        let categories = sqlx::query_as::<_, Category>(&sql)
            .bind(filter.name.as_deref().map(contains_pattern))
            .bind(filter.description.as_deref().map(contains_pattern))
            .bind(page.limit)
            .bind(page.offset)
            .fetch_all(&self.pool)
            .await?;
        Ok(categories)
    }

    async fn count(&self, filter: &CategoryFilter) -> StoreResult<i64> {
        let sql = format!("SELECT COUNT(*) FROM categories WHERE {}", FILTER_CLAUSE);
        let count = sqlx::query_scalar::<_, i64>(&sql)
            .bind(filter.name.as_deref().map(contains_pattern))
            .bind(filter.description.as_deref().map(contains_pattern))
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn create(&self, category: NewCategory) -> StoreResult<Category> {
        let sql = format!(
            r#"INSERT INTO categories (id, name, description, created_by, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {}"#,
            CATEGORY_COLUMNS
        );
        let created = sqlx::query_as::<_, Category>(&sql)
            .bind(Uuid::new_v4())
            .bind(&category.name)
            .bind(&category.description)
            .bind(&category.created_by)
            .bind(category.created_at)
            .bind(category.updated_at.max(category.created_at))
            .fetch_one(&self.pool)
            .await?;

        tracing::debug!(category_id = %created.id, "Category created");
        Ok(created)
    }

    async fn update_by_id(
        &self,
        id: Uuid,
        changes: CategoryChanges,
    ) -> StoreResult<Option<Category>> {
        let sql = format!(
            r#"UPDATE categories SET
                name = COALESCE($2, name),
                description = COALESCE($3, description),
                updated_at = GREATEST(NOW(), created_at)
            WHERE id = $1
            RETURNING {}"#,
            CATEGORY_COLUMNS
        );
        let updated = sqlx::query_as::<_, Category>(&sql)
            .bind(id)
            .bind(changes.name)
            .bind(changes.description)
            .fetch_optional(&self.pool)
            .await?;
        Ok(updated)
    }

    async fn delete_by_id(&self, id: Uuid) -> StoreResult<Option<Category>> {
        let mut tx = self.pool.begin().await?;

        let detached = sqlx::query("UPDATE risks SET category_id = NULL WHERE category_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        let sql = format!(
            "DELETE FROM categories WHERE id = $1 RETURNING {}",
            CATEGORY_COLUMNS
        );
        let removed = sqlx::query_as::<_, Category>(&sql)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;

        // Nothing to delete: dropping the transaction rolls back the detach
        if removed.is_some() {
            tx.commit().await?;
            tracing::debug!(category_id = %id, detached, "Category removed");
        }
        Ok(removed)
    }

    async fn delete_all(&self) -> StoreResult<u64> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("UPDATE risks SET category_id = NULL WHERE category_id IS NOT NULL")
            .execute(&mut *tx)
            .await?;
        let deleted = sqlx::query("DELETE FROM categories")
            .execute(&mut *tx)
            .await?
            .rows_affected();
        tx.commit().await?;
        Ok(deleted)
    }
}

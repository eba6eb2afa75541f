//! Process-local entity store
//!
//! [`MemoryStore`] keeps risks and categories in maps behind a single
//! `RwLock`, so one instance can serve as both [`RiskStore`] and
//! [`CategoryStore`] with the same referential behaviour as PostgreSQL:
//! risks must reference an existing category, and deleting a category
//! detaches its risks.
//!
//! Locks recover from poisoning with `unwrap_or_else(|e| e.into_inner())`;
//! no lock is ever held across an `.await`.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::utils::lookups_for;
use super::{CategoryStore, RiskStore, StoreError, StoreResult};
use crate::models::{
    Category, CategoryChanges, CategoryFilter, Lookup, NewCategory, NewRisk, PageRequest, Risk,
    RiskChanges, RiskFilter,
};

#[derive(Default)]
struct MemoryState {
    categories: HashMap<Uuid, Category>,
    risks: HashMap<Uuid, Risk>,
}

/// In-memory store shared by every clone
#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<RwLock<MemoryState>>,
}

/// Next `updated_at` for a record, never earlier than its creation time
fn touched(created_at: DateTime<Utc>) -> DateTime<Utc> {
    Utc::now().max(created_at)
}

/// Filter then order by creation time (id as tie-breaker)
fn select<T, F>(rows: &HashMap<Uuid, T>, keep: F, created: fn(&T) -> (DateTime<Utc>, Uuid)) -> Vec<T>
where
    T: Clone,
    F: Fn(&T) -> bool,
{
    let mut selected: Vec<T> = rows.values().filter(|row| keep(row)).cloned().collect();
    selected.sort_by_key(created);
    selected
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, MemoryState> {
        self.state.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, MemoryState> {
        self.state.write().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl RiskStore for MemoryStore {
    async fn find_by_ids(&self, ids: &[Uuid]) -> StoreResult<Vec<Lookup<Uuid, Risk>>> {
        let state = self.read();
        let rows = ids
            .iter()
            .filter_map(|id| state.risks.get(id).cloned())
            .collect();
        Ok(lookups_for(ids, rows))
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Risk>> {
        Ok(self.read().risks.get(&id).cloned())
    }

    async fn find(&self, filter: &RiskFilter, page: PageRequest) -> StoreResult<Vec<Risk>> {
        let state = self.read();
        let matching = select(&state.risks, |r| filter.matches(r), |r| (r.created_at, r.id));
        Ok(page.slice(matching))
    }

    async fn count(&self, filter: &RiskFilter) -> StoreResult<i64> {
        let state = self.read();
        Ok(state.risks.values().filter(|r| filter.matches(r)).count() as i64)
    }

    async fn create(&self, risk: NewRisk) -> StoreResult<Risk> {
        let mut state = self.write();
        if let Some(category_id) = risk.category_id {
            if !state.categories.contains_key(&category_id) {
                return Err(StoreError::InvalidReference(format!(
                    "category {} does not exist",
                    category_id
                )));
            }
        }

        let created = Risk {
            id: Uuid::new_v4(),
            name: risk.name,
            description: risk.description,
            category_id: risk.category_id,
            resolved: risk.resolved,
            created_by: risk.created_by,
            created_at: risk.created_at,
            updated_at: risk.updated_at.max(risk.created_at),
        };
        state.risks.insert(created.id, created.clone());
        Ok(created)
    }

    async fn update_by_id(&self, id: Uuid, changes: RiskChanges) -> StoreResult<Option<Risk>> {
        let mut state = self.write();
        if let Some(category_id) = changes.category_id {
            if !state.categories.contains_key(&category_id) {
                return Err(StoreError::InvalidReference(format!(
                    "category {} does not exist",
                    category_id
                )));
            }
        }

        let Some(risk) = state.risks.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(name) = changes.name {
            risk.name = name;
        }
        if let Some(description) = changes.description {
            risk.description = description;
        }
        if let Some(category_id) = changes.category_id {
            risk.category_id = Some(category_id);
        }
        if let Some(resolved) = changes.resolved {
            risk.resolved = resolved;
        }
        risk.updated_at = touched(risk.created_at);
        Ok(Some(risk.clone()))
    }

    async fn delete_by_id(&self, id: Uuid) -> StoreResult<Option<Risk>> {
        Ok(self.write().risks.remove(&id))
    }

    async fn delete_all(&self) -> StoreResult<u64> {
        let mut state = self.write();
        let deleted = state.risks.len() as u64;
        state.risks.clear();
        Ok(deleted)
    }
}

#[async_trait]
impl CategoryStore for MemoryStore {
    async fn find_by_ids(&self, ids: &[Uuid]) -> StoreResult<Vec<Lookup<Uuid, Category>>> {
        let state = self.read();
        let rows = ids
            .iter()
            .filter_map(|id| state.categories.get(id).cloned())
            .collect();
        Ok(lookups_for(ids, rows))
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Category>> {
        Ok(self.read().categories.get(&id).cloned())
    }

    async fn find(
        &self,
        filter: &CategoryFilter,
        page: PageRequest,
    ) -> StoreResult<Vec<Category>> {
        let state = self.read();
        let matching = select(
            &state.categories,
            |c| filter.matches(c),
            |c| (c.created_at, c.id),
        );
        Ok(page.slice(matching))
    }

    async fn count(&self, filter: &CategoryFilter) -> StoreResult<i64> {
        let state = self.read();
        Ok(state.categories.values().filter(|c| filter.matches(c)).count() as i64)
    }

    async fn create(&self, category: NewCategory) -> StoreResult<Category> {
        let created = Category {
            id: Uuid::new_v4(),
            name: category.name,
            description: category.description,
            created_by: category.created_by,
            created_at: category.created_at,
            updated_at: category.updated_at.max(category.created_at),
        };
        self.write().categories.insert(created.id, created.clone());
        Ok(created)
    }

    async fn update_by_id(
        &self,
        id: Uuid,
        changes: CategoryChanges,
    ) -> StoreResult<Option<Category>> {
        let mut state = self.write();
        let Some(category) = state.categories.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(name) = changes.name {
            category.name = name;
        }
        if let Some(description) = changes.description {
            category.description = description;
        }
        category.updated_at = touched(category.created_at);
        Ok(Some(category.clone()))
    }

    async fn delete_by_id(&self, id: Uuid) -> StoreResult<Option<Category>> {
        let mut state = self.write();
        let removed = state.categories.remove(&id);
        if removed.is_some() {
            for risk in state.risks.values_mut() {
                if risk.category_id == Some(id) {
                    risk.category_id = None;
                }
            }
        }
        Ok(removed)
    }

    async fn delete_all(&self) -> StoreResult<u64> {
        let mut state = self.write();
        let deleted = state.categories.len() as u64;
        state.categories.clear();
        for risk in state.risks.values_mut() {
            risk.category_id = None;
        }
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    async fn seeded() -> (MemoryStore, Category) {
        let store = MemoryStore::new();
        let category = CategoryStore::create(
            &store,
            NewCategory::new("Security", "Threats to systems", "alice"),
        )
        .await
        .unwrap();
        (store, category)
    }

    #[tokio::test]
    async fn test_create_risk_requires_existing_category() {
        let store = MemoryStore::new();
        let result = RiskStore::create(
            &store,
            NewRisk::new("Phishing", "Credential theft", Uuid::new_v4(), "alice"),
        )
        .await;
        assert_matches!(result, Err(StoreError::InvalidReference(_)));
    }

    #[tokio::test]
    async fn test_find_by_ids_marks_missing() {
        let (store, category) = seeded().await;
        let missing = Uuid::new_v4();

        let lookups = CategoryStore::find_by_ids(&store, &[missing, category.id])
            .await
            .unwrap();

        assert_eq!(
            lookups,
            vec![Lookup::NotFound(missing), Lookup::Found(category)]
        );
    }

    #[tokio::test]
    async fn test_find_paginates_and_counts_independently() {
        let (store, category) = seeded().await;
        for i in 0..5 {
            let mut risk = NewRisk::new(
                format!("Risk {}", i),
                "Shared description",
                category.id,
                "alice",
            );
            risk.resolved = i % 2 == 0;
            RiskStore::create(&store, risk).await.unwrap();
        }

        let filter = RiskFilter::default();
        let page = RiskStore::find(&store, &filter, PageRequest::new(2, 1))
            .await
            .unwrap();
        assert_eq!(page.len(), 2);
        assert_eq!(RiskStore::count(&store, &filter).await.unwrap(), 5);

        let unresolved = RiskFilter {
            include_resolved: Some(false),
            ..Default::default()
        };
        assert_eq!(RiskStore::count(&store, &unresolved).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_update_keeps_updated_at_after_created_at() {
        let (store, category) = seeded().await;
        let updated = CategoryStore::update_by_id(
            &store,
            category.id,
            CategoryChanges {
                name: Some("Cyber".to_string()),
                description: None,
            },
        )
        .await
        .unwrap()
        .unwrap();

        assert_eq!(updated.name, "Cyber");
        assert_eq!(updated.description, category.description);
        assert!(updated.updated_at >= updated.created_at);
    }

    #[tokio::test]
    async fn test_update_missing_returns_none() {
        let store = MemoryStore::new();
        let result = RiskStore::update_by_id(&store, Uuid::new_v4(), RiskChanges::status(true))
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_delete_category_detaches_risks() {
        let (store, category) = seeded().await;
        let risk = RiskStore::create(
            &store,
            NewRisk::new("Phishing", "Credential theft", category.id, "alice"),
        )
        .await
        .unwrap();

        let removed = CategoryStore::delete_by_id(&store, category.id).await.unwrap();
        assert_eq!(removed.map(|c| c.id), Some(category.id));

        let reloaded = RiskStore::find_by_id(&store, risk.id).await.unwrap().unwrap();
        assert_eq!(reloaded.category_id, None);

        assert!(CategoryStore::delete_by_id(&store, category.id)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_backdated_seed_is_clamped() {
        let store = MemoryStore::new();
        let mut seed = NewCategory::new("Legal", "Contracts", "seed");
        seed.updated_at = seed.created_at - chrono::Duration::days(1);

        let created = CategoryStore::create(&store, seed).await.unwrap();
        assert_eq!(created.updated_at, created.created_at);
    }
}

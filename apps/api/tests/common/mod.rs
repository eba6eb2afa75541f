//! Common test utilities for API integration tests
//!
//! Schemas here run over the in-memory store, so no database is needed.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_graphql::{Request, Response, Variables};
use async_trait::async_trait;
use chrono::{Duration, TimeZone, Utc};
use serde_json::Value;
use uuid::Uuid;

use riskboard_api::graphql::loaders::BatchConfig;
use riskboard_api::graphql::{build_schema, prepare_request, CallerIdentity, RiskboardSchema};
use riskboard_api::models::{
    Category, CategoryChanges, CategoryFilter, Lookup, NewCategory, NewRisk, PageRequest, Risk,
};
use riskboard_api::repositories::{CategoryStore, MemoryStore, RiskStore, StoreResult, Stores};

/// Category store wrapper that counts id lookups (batched or single)
#[derive(Clone)]
pub struct CountingCategories {
    inner: MemoryStore,
    lookup_calls: Arc<AtomicUsize>,
}

impl CountingCategories {
    pub fn lookup_calls(&self) -> usize {
        self.lookup_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CategoryStore for CountingCategories {
    async fn find_by_ids(&self, ids: &[Uuid]) -> StoreResult<Vec<Lookup<Uuid, Category>>> {
        self.lookup_calls.fetch_add(1, Ordering::SeqCst);
        CategoryStore::find_by_ids(&self.inner, ids).await
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Category>> {
        self.lookup_calls.fetch_add(1, Ordering::SeqCst);
        CategoryStore::find_by_id(&self.inner, id).await
    }

    async fn find(&self, filter: &CategoryFilter, page: PageRequest) -> StoreResult<Vec<Category>> {
        CategoryStore::find(&self.inner, filter, page).await
    }

    async fn count(&self, filter: &CategoryFilter) -> StoreResult<i64> {
        CategoryStore::count(&self.inner, filter).await
    }

    async fn create(&self, category: NewCategory) -> StoreResult<Category> {
        CategoryStore::create(&self.inner, category).await
    }

    async fn update_by_id(
        &self,
        id: Uuid,
        changes: CategoryChanges,
    ) -> StoreResult<Option<Category>> {
        CategoryStore::update_by_id(&self.inner, id, changes).await
    }

    async fn delete_by_id(&self, id: Uuid) -> StoreResult<Option<Category>> {
        CategoryStore::delete_by_id(&self.inner, id).await
    }

    async fn delete_all(&self) -> StoreResult<u64> {
        CategoryStore::delete_all(&self.inner).await
    }
}

/// Schema plus direct access to its backing store
pub struct TestApi {
    pub schema: RiskboardSchema,
    pub stores: Stores,
    pub memory: MemoryStore,
    pub categories: CountingCategories,
}

impl TestApi {
    pub fn new() -> Self {
        let memory = MemoryStore::new();
        let categories = CountingCategories {
            inner: memory.clone(),
            lookup_calls: Arc::new(AtomicUsize::new(0)),
        };
        let stores = Stores {
            risks: Arc::new(memory.clone()),
            categories: Arc::new(categories.clone()),
        };
        Self {
            schema: build_schema(stores.clone(), BatchConfig::default()),
            stores,
            memory,
            categories,
        }
    }

    /// Execute one operation as `caller` (anonymous when `None`)
    pub async fn execute(&self, caller: Option<&str>, query: &str, variables: Value) -> Response {
        let identity = caller
            .map(CallerIdentity::named)
            .unwrap_or_else(CallerIdentity::anonymous);
        let request = Request::new(query).variables(Variables::from_json(variables));
        let request = prepare_request(request, &self.stores, BatchConfig::default(), identity);
        self.schema.execute(request).await
    }

    /// Execute and return `data` as JSON, failing on any error
    pub async fn data(&self, caller: Option<&str>, query: &str, variables: Value) -> Value {
        let response = self.execute(caller, query, variables).await;
        assert!(
            response.errors.is_empty(),
            "unexpected errors: {:?}",
            response.errors
        );
        response.data.into_json().expect("data is valid JSON")
    }

    /// Insert a category directly, `minutes` after a fixed epoch
    pub async fn seed_category(&self, name: &str, minutes: i64) -> Category {
        let at = base_time() + Duration::minutes(minutes);
        CategoryStore::create(
            &self.memory,
            NewCategory {
                name: name.to_string(),
                description: format!("{} risks", name),
                created_by: "seed".to_string(),
                created_at: at,
                updated_at: at,
            },
        )
        .await
        .expect("seed category")
    }

    /// Insert a risk directly, `minutes` after a fixed epoch
    pub async fn seed_risk(
        &self,
        name: &str,
        category: Option<Uuid>,
        resolved: bool,
        minutes: i64,
    ) -> Risk {
        let at = base_time() + Duration::minutes(minutes);
        RiskStore::create(
            &self.memory,
            NewRisk {
                name: name.to_string(),
                description: format!("{} description", name),
                category_id: category,
                resolved,
                created_by: "seed".to_string(),
                created_at: at,
                updated_at: at,
            },
        )
        .await
        .expect("seed risk")
    }
}

fn base_time() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
}

/// `extensions.code` of the first error
pub fn first_error_code(response: &Response) -> Option<String> {
    let error = response.errors.first()?;
    let code = error.extensions.as_ref()?.get("code")?;
    match code {
        async_graphql::Value::String(code) => Some(code.clone()),
        _ => None,
    }
}

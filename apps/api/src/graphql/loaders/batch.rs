//! Request-scoped batching loader
//!
//! [`BatchLoader`] coalesces individual `load(key)` calls into one
//! [`BatchFetch::fetch_by_ids`] call per batch window and memoizes every
//! answer for the lifetime of the loader. One loader is built per GraphQL
//! operation, so the cache never outlives the request that filled it.
//!
//! Batching works on a short time window instead of an event-loop turn:
//! the first key of an empty window spawns a task that sleeps for
//! [`BatchConfig::delay`] and then dispatches the window. Every `load`
//! issued before the resolvers yield to the runtime therefore lands in the
//! same window. A window is dispatched early when it reaches
//! [`BatchConfig::max_batch_size`] keys or when [`BatchLoader::flush`] is
//! called.
//!
//! Outcomes per key:
//! - found: cached and returned as `Ok(value)`
//! - not found: cached and returned as [`LoadError::NotFound`]
//! - store failure: every key of the window fails with the same shared
//!   error and nothing is cached, so a later `load` retries

use std::collections::HashMap;
use std::fmt::Display;
use std::future::Future;
use std::hash::Hash;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use futures_util::future::{join_all, BoxFuture, Shared};
use futures_util::FutureExt;
use thiserror::Error;
use tokio::sync::oneshot;

use crate::models::{Keyed, Lookup};
use crate::repositories::{StoreError, StoreResult};

/// Default time a window stays open after its first key
pub const DEFAULT_BATCH_DELAY: Duration = Duration::from_millis(1);

/// Default number of keys that forces an early dispatch
pub const DEFAULT_MAX_BATCH_SIZE: usize = 1000;

/// Per-key failure reported by a [`BatchLoader`]
#[derive(Error, Debug, Clone)]
pub enum LoadError {
    /// The store answered the batch but has no entity for this key
    #[error("{entity} with id {key} not found")]
    NotFound { entity: &'static str, key: String },

    /// The store call for the whole window failed
    #[error("{0}")]
    Store(Arc<StoreError>),

    /// The dispatch task ended without answering
    #[error("batch load of {entity} was interrupted")]
    Interrupted { entity: &'static str },
}

pub type LoadResult<V> = Result<V, LoadError>;

/// Batch source for a [`BatchLoader`]
///
/// Implementations must answer every requested key with exactly one
/// [`Lookup`]; the order of the answers does not matter.
pub trait BatchFetch<K>: Send + Sync + 'static {
    type Value: Keyed<Key = K> + Clone + Send + Sync + 'static;

    /// Entity name used in not-found errors and logs
    const ENTITY: &'static str;

    fn fetch_by_ids(
        &self,
        keys: &[K],
    ) -> impl Future<Output = StoreResult<Vec<Lookup<K, Self::Value>>>> + Send;
}

/// Batching knobs
#[derive(Debug, Clone, Copy)]
pub struct BatchConfig {
    /// How long a window stays open after its first key
    pub delay: Duration,
    /// Window size that triggers an immediate dispatch
    pub max_batch_size: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            delay: DEFAULT_BATCH_DELAY,
            max_batch_size: DEFAULT_MAX_BATCH_SIZE,
        }
    }
}

type PendingResult<V> = Shared<BoxFuture<'static, LoadResult<V>>>;

enum Slot<V> {
    /// Waiting on the window with this id
    Pending { batch: u64, result: PendingResult<V> },
    Ready(LoadResult<V>),
}

/// Keys collected since the last dispatch, in first-seen order
struct Window<K, V> {
    id: u64,
    keys: Vec<K>,
    senders: HashMap<K, oneshot::Sender<LoadResult<V>>>,
    /// One shared result per key, kept even if the cache slot is cleared
    pending: HashMap<K, PendingResult<V>>,
}

impl<K, V> Window<K, V> {
    fn new(id: u64) -> Self {
        Self {
            id,
            keys: Vec::new(),
            senders: HashMap::new(),
            pending: HashMap::new(),
        }
    }
}

struct State<K, V> {
    cache: HashMap<K, Slot<V>>,
    window: Window<K, V>,
}

struct Inner<K, F: BatchFetch<K>> {
    fetcher: F,
    config: BatchConfig,
    state: Mutex<State<K, F::Value>>,
}

/// Per-operation cache and batching dispatcher over a [`BatchFetch`] source
pub struct BatchLoader<K, F: BatchFetch<K>> {
    inner: Arc<Inner<K, F>>,
}

impl<K, F: BatchFetch<K>> Clone for BatchLoader<K, F> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<K, F> BatchLoader<K, F>
where
    K: Eq + Hash + Clone + Display + Send + Sync + 'static,
    F: BatchFetch<K>,
{
    /// Create a loader with the default window settings
    pub fn new(fetcher: F) -> Self {
        Self::with_config(fetcher, BatchConfig::default())
    }

    pub fn with_config(fetcher: F, config: BatchConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                fetcher,
                config: BatchConfig {
                    max_batch_size: config.max_batch_size.max(1),
                    ..config
                },
                state: Mutex::new(State {
                    cache: HashMap::new(),
                    window: Window::new(0),
                }),
            }),
        }
    }

    /// Load one entity, sharing the store round-trip with every other key
    /// requested in the same window
    pub async fn load(&self, key: K) -> LoadResult<F::Value> {
        let (batch, pending) = {
            let mut guard = self.inner.lock();
            let state = &mut *guard;
            match state.cache.get(&key) {
                Some(Slot::Ready(result)) => return result.clone(),
                Some(Slot::Pending { batch, result }) => (*batch, result.clone()),
                None => self.enqueue(state, key.clone()),
            }
        };

        let result = pending.await;
        if matches!(result, Err(LoadError::Interrupted { .. })) {
            self.inner.evict_pending(&key, batch);
        }
        result
    }

    /// Load several entities; results follow the order of `keys`
    pub async fn load_many<I>(&self, keys: I) -> Vec<LoadResult<F::Value>>
    where
        I: IntoIterator<Item = K>,
    {
        join_all(keys.into_iter().map(|key| self.load(key))).await
    }

    /// Forget `key` so the next `load` goes back to the store
    ///
    /// Callers already waiting on an in-flight window still receive its
    /// answer; it is just not cached.
    pub fn clear(&self, key: &K) {
        self.inner.lock().cache.remove(key);
    }

    /// Forget every cached key, ready or pending
    ///
    /// As with [`clear`](Self::clear), in-flight waiters still receive
    /// their window's answer.
    pub fn clear_all(&self) {
        self.inner.lock().cache.clear();
    }

    /// Seed the cache with a value already in hand
    ///
    /// Does nothing when `key` is already cached or pending; call
    /// [`clear`](Self::clear) first to replace an entry.
    pub fn prime(&self, key: K, value: F::Value) {
        self.inner
            .lock()
            .cache
            .entry(key)
            .or_insert(Slot::Ready(Ok(value)));
    }

    /// Dispatch the current window now instead of waiting for its timer
    pub async fn flush(&self) {
        let window = {
            let mut state = self.inner.lock();
            if state.window.keys.is_empty() {
                return;
            }
            self.inner.take_window(&mut state)
        };

        let inner = Arc::clone(&self.inner);
        if let Err(err) = tokio::spawn(inner.dispatch(window)).await {
            tracing::warn!(entity = F::ENTITY, error = %err, "Batch dispatch task failed");
        }
    }

    /// Add `key` to the open window and hand back its pending result
    fn enqueue(
        &self,
        state: &mut State<K, F::Value>,
        key: K,
    ) -> (u64, PendingResult<F::Value>) {
        let batch = state.window.id;

        // Cleared and requested again before its window went out
        if let Some(result) = state.window.pending.get(&key).cloned() {
            state.cache.insert(
                key,
                Slot::Pending {
                    batch,
                    result: result.clone(),
                },
            );
            return (batch, result);
        }

        let (tx, rx) = oneshot::channel();
        let entity = F::ENTITY;
        let result: PendingResult<F::Value> = rx
            .map(move |received| received.unwrap_or(Err(LoadError::Interrupted { entity })))
            .boxed()
            .shared();

        state.cache.insert(
            key.clone(),
            Slot::Pending {
                batch,
                result: result.clone(),
            },
        );
        state.window.senders.insert(key.clone(), tx);
        state.window.pending.insert(key.clone(), result.clone());
        state.window.keys.push(key);

        if state.window.keys.len() >= self.inner.config.max_batch_size {
            let window = self.inner.take_window(state);
            tokio::spawn(Arc::clone(&self.inner).dispatch(window));
        } else if state.window.keys.len() == 1 {
            let inner = Arc::clone(&self.inner);
            tokio::spawn(async move {
                tokio::time::sleep(inner.config.delay).await;
                inner.dispatch_if_open(batch).await;
            });
        }

        (batch, result)
    }
}

impl<K, F> Inner<K, F>
where
    K: Eq + Hash + Clone + Display + Send + Sync + 'static,
    F: BatchFetch<K>,
{
    fn lock(&self) -> MutexGuard<'_, State<K, F::Value>> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Swap in a fresh window and return the one that was open
    fn take_window(&self, state: &mut State<K, F::Value>) -> Window<K, F::Value> {
        let next = Window::new(state.window.id + 1);
        std::mem::replace(&mut state.window, next)
    }

    /// Timer path: dispatch window `batch` unless it already went out
    async fn dispatch_if_open(self: Arc<Self>, batch: u64) {
        let window = {
            let mut state = self.lock();
            if state.window.id != batch || state.window.keys.is_empty() {
                return;
            }
            self.take_window(&mut state)
        };
        self.dispatch(window).await;
    }

    async fn dispatch(self: Arc<Self>, window: Window<K, F::Value>) {
        let Window {
            id,
            keys,
            mut senders,
            ..
        } = window;

        tracing::debug!(
            entity = F::ENTITY,
            batch = id,
            keys = keys.len(),
            "Dispatching batch load"
        );

        let mut answers: HashMap<K, LoadResult<F::Value>> = match self
            .fetcher
            .fetch_by_ids(&keys)
            .await
        {
            Ok(lookups) => {
                let mut answers = HashMap::with_capacity(lookups.len());
                for lookup in lookups {
                    let answer = match lookup {
                        Lookup::Found(value) => (value.key(), Ok(value)),
                        Lookup::NotFound(key) => {
                            let err = LoadError::NotFound {
                                entity: F::ENTITY,
                                key: key.to_string(),
                            };
                            (key, Err(err))
                        }
                    };
                    answers.entry(answer.0).or_insert(answer.1);
                }
                answers
            }
            Err(err) => {
                tracing::warn!(
                    entity = F::ENTITY,
                    batch = id,
                    error = %err,
                    "Batch load failed"
                );
                let err = Arc::new(err);
                keys.iter()
                    .map(|key| (key.clone(), Err(LoadError::Store(Arc::clone(&err)))))
                    .collect()
            }
        };

        let mut state = self.lock();
        for key in &keys {
            let result = answers.remove(key).unwrap_or_else(|| {
                tracing::warn!(entity = F::ENTITY, key = %key, "Store omitted a requested key");
                Err(LoadError::Store(Arc::new(StoreError::MissingResult {
                    entity: F::ENTITY,
                    key: key.to_string(),
                })))
            });

            // Only settle entries that still belong to this window; cleared
            // or re-requested keys are left alone.
            let owned = matches!(
                state.cache.get(key),
                Some(Slot::Pending { batch, .. }) if *batch == id
            );
            if owned {
                if matches!(result, Err(LoadError::Store(_))) {
                    state.cache.remove(key);
                } else {
                    state.cache.insert(key.clone(), Slot::Ready(result.clone()));
                }
            }

            if let Some(sender) = senders.remove(key) {
                // Receiver gone means every waiter was dropped
                let _ = sender.send(result);
            }
        }
    }

    fn evict_pending(&self, key: &K, batch: u64) {
        let mut state = self.lock();
        let stale = matches!(
            state.cache.get(key),
            Some(Slot::Pending { batch: pending, .. }) if *pending == batch
        );
        if stale {
            state.cache.remove(key);
        }
    }
}

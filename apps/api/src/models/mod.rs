//! Domain models for Riskboard
//!
//! This module contains the SQLx row models for risks and categories, the
//! write-side inputs the stores accept, and the listing filters shared by
//! every store implementation.

pub mod category;
pub mod risk;

pub use category::{Category, CategoryChanges, CategoryFilter, NewCategory};
pub use risk::{NewRisk, Risk, RiskChanges, RiskFilter};

/// A record that knows its own lookup key
pub trait Keyed {
    type Key;

    fn key(&self) -> Self::Key;
}

/// Per-id outcome of a batched lookup
///
/// Stores return exactly one `Lookup` for every id they were asked for, so
/// absent rows are reported rather than silently dropped.
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup<K, V> {
    Found(V),
    NotFound(K),
}

impl<K, V> Lookup<K, V>
where
    V: Keyed<Key = K>,
    K: Clone,
{
    /// The id this outcome answers for
    pub fn key(&self) -> K {
        match self {
            Self::Found(value) => value.key(),
            Self::NotFound(key) => key.clone(),
        }
    }
}

/// Offset/limit window applied to list queries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub limit: i64,
    pub offset: i64,
}

impl PageRequest {
    pub fn new(limit: i64, offset: i64) -> Self {
        Self { limit, offset }
    }

    /// Apply the window to an already filtered and ordered sequence
    pub fn slice<T>(&self, items: impl IntoIterator<Item = T>) -> Vec<T> {
        items
            .into_iter()
            .skip(self.offset.max(0) as usize)
            .take(self.limit.max(0) as usize)
            .collect()
    }
}

/// Case-insensitive substring match used by the in-memory filters
pub(crate) fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

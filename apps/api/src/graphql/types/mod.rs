//! GraphQL type definitions for Riskboard
//!
//! Object types wrap the database models; the filter inputs convert into
//! the store-side filters.

mod category;
mod risk;

pub use category::{Category, CategoryFilters, CategoryPage};
pub use risk::{Risk, RiskFilters, RiskPage};

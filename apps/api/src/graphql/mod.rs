//! GraphQL schema and resolvers for Riskboard
//!
//! This module contains the async-graphql schema including:
//! - Query resolvers for listing and fetching risks and categories
//! - Mutation resolvers that create, update and remove them
//! - The request-scoped batch loaders resolvers read through

pub mod context;
pub mod error;
pub mod loaders;
pub mod mutation;
pub mod pagination;
pub mod query;
pub mod schema;
pub mod types;
pub mod validation;

pub use context::CallerIdentity;
pub use loaders::Loaders;
pub use schema::{build_schema, prepare_request, RiskboardSchema, SchemaBuilder};

//! Per-request GraphQL context
//!
//! The HTTP handler attaches a [`CallerIdentity`] and a fresh
//! [`Loaders`](super::loaders::Loaders) bundle to every request; the schema
//! itself only holds the long-lived [`Stores`](crate::repositories::Stores).

use async_graphql::Context;

use crate::error::ApiError;

/// Who issued the current request, taken from the `Authorization` header
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallerIdentity(Option<String>);

impl CallerIdentity {
    pub fn anonymous() -> Self {
        Self(None)
    }

    pub fn named(name: impl Into<String>) -> Self {
        let name: String = name.into();
        Self::from_header(Some(name.as_str()))
    }

    /// Parse a raw header value; blank values count as anonymous
    pub fn from_header(value: Option<&str>) -> Self {
        let name = value
            .map(str::trim)
            .map(|v| {
                v.strip_prefix("Bearer")
                    .filter(|rest| rest.is_empty() || rest.starts_with(char::is_whitespace))
                    .unwrap_or(v)
                    .trim()
            })
            .filter(|v| !v.is_empty())
            .map(str::to_string);
        Self(name)
    }

    pub fn name(&self) -> Option<&str> {
        self.0.as_deref()
    }
}

/// Caller name for a mutation, or `Unauthorized`
pub fn require_caller<'ctx>(ctx: &Context<'ctx>) -> Result<&'ctx str, ApiError> {
    ctx.data_opt::<CallerIdentity>()
        .and_then(CallerIdentity::name)
        .ok_or(ApiError::Unauthorized)
}

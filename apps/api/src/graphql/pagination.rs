//! Shared pagination utilities for GraphQL resolvers
//!
//! List queries accept an optional `Pagination` input; these helpers turn it
//! into the [`PageRequest`] the stores understand.

use async_graphql::InputObject;

use crate::models::PageRequest;

/// Page size used when the client sends no limit (or zero)
pub const DEFAULT_LIMIT: i32 = 250;

/// Maximum items per page for top-level list queries
pub const MAX_LIMIT: i32 = 1000;

/// Offset/limit arguments for list queries
#[derive(Debug, Clone, Copy, Default, InputObject)]
pub struct Pagination {
    /// Maximum number of items (default 250, at most 1000)
    pub limit: Option<i32>,
    /// Number of items to skip (default 0)
    pub offset: Option<i32>,
}

impl Pagination {
    /// Clamp into a store page request
    pub fn page_request(&self) -> PageRequest {
        PageRequest::new(clamp_limit(self.limit, MAX_LIMIT), clamp_offset(self.offset))
    }
}

/// Clamp pagination limit to valid range, treating absent or zero as the default
#[inline]
pub fn clamp_limit(limit: Option<i32>, max: i32) -> i64 {
    match limit {
        None | Some(0) => DEFAULT_LIMIT.min(max) as i64,
        Some(limit) => limit.clamp(1, max) as i64,
    }
}

/// Clamp offset to non-negative
#[inline]
pub fn clamp_offset(offset: Option<i32>) -> i64 {
    offset.unwrap_or(0).max(0) as i64
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(None, 250)]
    #[case(Some(0), 250)]
    #[case(Some(1), 1)]
    #[case(Some(50), 50)]
    #[case(Some(1000), 1000)]
    #[case(Some(1001), 1000)]
    #[case(Some(-5), 1)]
    fn test_clamp_limit(#[case] requested: Option<i32>, #[case] expected: i64) {
        assert_eq!(clamp_limit(requested, MAX_LIMIT), expected);
    }

    #[test]
    fn test_clamp_limit_default_respects_max() {
        assert_eq!(clamp_limit(None, 100), 100);
    }

    #[rstest]
    #[case(None, 0)]
    #[case(Some(10), 10)]
    #[case(Some(-5), 0)]
    fn test_clamp_offset(#[case] requested: Option<i32>, #[case] expected: i64) {
        assert_eq!(clamp_offset(requested), expected);
    }

    #[test]
    fn test_page_request() {
        let pagination = Pagination {
            limit: Some(20),
            offset: Some(40),
        };
        assert_eq!(pagination.page_request(), PageRequest::new(20, 40));
        assert_eq!(Pagination::default().page_request(), PageRequest::new(250, 0));
    }
}

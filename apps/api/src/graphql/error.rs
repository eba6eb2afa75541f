//! Conversion of typed errors into GraphQL errors
//!
//! async-graphql converts anything `Display` into a bare error message, so a
//! plain `?` on an [`ApiError`] would drop its `extensions.code`. Resolvers
//! go through [`ResultExt::extend_err`] instead.

use async_graphql::ErrorExtensions;

use crate::error::ApiError;

pub trait ResultExt<T> {
    /// Map the error through [`ApiError`] and attach its code
    fn extend_err(self) -> async_graphql::Result<T>;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
    E: Into<ApiError>,
{
    fn extend_err(self) -> async_graphql::Result<T> {
        self.map_err(|err| Into::<ApiError>::into(err).extend())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::StoreError;

    fn code(err: &async_graphql::Error) -> Option<async_graphql::Value> {
        err.extensions.as_ref().and_then(|ext| ext.get("code")).cloned()
    }

    #[test]
    fn test_store_error_keeps_code() {
        let result: Result<(), StoreError> =
            Err(StoreError::InvalidReference("category 1".into()));
        let err = result.extend_err().unwrap_err();
        assert_eq!(
            code(&err),
            Some(async_graphql::Value::String("BAD_USER_INPUT".to_string()))
        );
    }

    #[test]
    fn test_internal_details_are_hidden() {
        let result: Result<(), ApiError> = Err(ApiError::Internal("pool exhausted".into()));
        let err = result.extend_err().unwrap_err();
        assert_eq!(err.message, "an unexpected error occurred");
        assert_eq!(
            code(&err),
            Some(async_graphql::Value::String(
                "INTERNAL_SERVER_ERROR".to_string()
            ))
        );
    }
}

//! Argument validation shared by resolvers

use async_graphql::ID;
use uuid::Uuid;

use crate::error::ApiError;

/// Maximum length of a risk or category name
pub const MAX_NAME_LENGTH: usize = 255;

/// Maximum length of a risk or category description
pub const MAX_DESCRIPTION_LENGTH: usize = 4000;

/// Parse a GraphQL id argument
pub fn parse_id(field: &'static str, id: &ID) -> Result<Uuid, ApiError> {
    Uuid::parse_str(id.as_str()).map_err(|_| ApiError::InvalidId {
        field,
        value: id.to_string(),
    })
}

/// Trim a required text argument and enforce its length
pub fn required_text(field: &str, value: &str, max_len: usize) -> Result<String, ApiError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ApiError::validation(format!("{} cannot be empty", field)));
    }
    if value.chars().count() > max_len {
        return Err(ApiError::validation(format!(
            "{} cannot exceed {} characters",
            field, max_len
        )));
    }
    Ok(value.to_string())
}

/// Like [`required_text`], for fields an update may leave out
pub fn optional_text(
    field: &str,
    value: Option<&str>,
    max_len: usize,
) -> Result<Option<String>, ApiError> {
    value.map(|v| required_text(field, v, max_len)).transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use rstest::rstest;

    #[rstest]
    #[case("Supplier outage", "Supplier outage")]
    #[case("  padded  ", "padded")]
    #[case("é", "é")]
    fn test_required_text_accepts(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(required_text("name", input, MAX_NAME_LENGTH).unwrap(), expected);
    }

    #[rstest]
    #[case("", "name cannot be empty")]
    #[case("   ", "name cannot be empty")]
    #[case("\t\n", "name cannot be empty")]
    fn test_required_text_rejects_blank(#[case] input: &str, #[case] message: &str) {
        let err = required_text("name", input, MAX_NAME_LENGTH).unwrap_err();
        assert_eq!(err.to_string(), message);
    }

    #[test]
    fn test_length_limit_counts_characters() {
        let at_limit = "é".repeat(MAX_NAME_LENGTH);
        assert!(required_text("name", &at_limit, MAX_NAME_LENGTH).is_ok());

        let over = "a".repeat(MAX_NAME_LENGTH + 1);
        assert_matches!(
            required_text("name", &over, MAX_NAME_LENGTH),
            Err(ApiError::ValidationError(msg)) if msg.contains("255")
        );
    }

    #[test]
    fn test_optional_text() {
        assert_eq!(optional_text("name", None, MAX_NAME_LENGTH).unwrap(), None);
        assert_eq!(
            optional_text("name", Some(" x "), MAX_NAME_LENGTH).unwrap(),
            Some("x".to_string())
        );
        assert!(optional_text("name", Some(""), MAX_NAME_LENGTH).is_err());
    }

    #[test]
    fn test_parse_id() {
        let id = Uuid::new_v4();
        assert_eq!(parse_id("id", &ID::from(id.to_string())).unwrap(), id);

        assert_matches!(
            parse_id("categoryId", &ID::from("42")),
            Err(ApiError::InvalidId { field: "categoryId", value }) if value == "42"
        );
    }
}

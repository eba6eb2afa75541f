//! Shared helpers for the store implementations

use std::collections::HashMap;

use uuid::Uuid;

use crate::models::{Keyed, Lookup};

/// Escape special characters in ILIKE patterns so user input matches literally.
///
/// # Example
/// ```
/// use riskboard_api::repositories::utils::escape_ilike;
///
/// assert_eq!(escape_ilike("50%_off"), r"50\%\_off");
/// ```
pub fn escape_ilike(pattern: &str) -> String {
    pattern
        .replace('\\', r"\\")
        .replace('%', r"\%")
        .replace('_', r"\_")
}

/// Build a `%term%` ILIKE pattern from raw user input
pub fn contains_pattern(term: &str) -> String {
    format!("%{}%", escape_ilike(term))
}

/// Pair every requested id with its row, or with an explicit not-found marker.
///
/// The result holds exactly one entry per requested id (duplicates included),
/// in request order, whatever order the rows arrived in.
pub fn lookups_for<V>(ids: &[Uuid], rows: Vec<V>) -> Vec<Lookup<Uuid, V>>
where
    V: Keyed<Key = Uuid> + Clone,
{
    let mut by_id: HashMap<Uuid, V> = rows.into_iter().map(|row| (row.key(), row)).collect();
    let mut remaining: HashMap<Uuid, usize> = HashMap::with_capacity(ids.len());
    for id in ids {
        *remaining.entry(*id).or_default() += 1;
    }

    let mut lookups = Vec::with_capacity(ids.len());
    for id in ids {
        let left = remaining.get_mut(id).map(|n| {
            *n -= 1;
            *n
        });
        // The last request for an id takes the row, earlier ones clone it
        let found = if left == Some(0) {
            by_id.remove(id)
        } else {
            by_id.get(id).cloned()
        };
        lookups.push(match found {
            Some(row) => Lookup::Found(row),
            None => Lookup::NotFound(*id),
        });
    }
    lookups
}

// SELECT column lists, kept in one place so every query returns full rows.

/// SQL columns for category queries
pub const CATEGORY_COLUMNS: &str = r#"
    id, name, description, created_by, created_at, updated_at
"#;

/// SQL columns for risk queries
pub const RISK_COLUMNS: &str = r#"
    id, name, description, category_id, resolved,
    created_by, created_at, updated_at
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Category;

    #[test]
    fn test_escape_ilike_no_special_chars() {
        assert_eq!(escape_ilike("supply chain"), "supply chain");
    }

    #[test]
    fn test_escape_ilike_all_special() {
        assert_eq!(escape_ilike(r"100%_\test"), r"100\%\_\\test");
    }

    #[test]
    fn test_contains_pattern_wraps_escaped_term() {
        assert_eq!(contains_pattern("a_b"), r"%a\_b%");
        assert_eq!(contains_pattern(""), "%%");
    }

    #[test]
    fn test_lookups_reports_missing_ids() {
        let first = Category::sample("Legal");
        let second = Category::sample("Security");
        let missing = Uuid::new_v4();

        // Rows come back in a different order than requested
        let lookups = lookups_for(
            &[first.id, missing, second.id],
            vec![second.clone(), first.clone()],
        );

        assert_eq!(
            lookups,
            vec![
                Lookup::Found(first),
                Lookup::NotFound(missing),
                Lookup::Found(second),
            ]
        );
    }

    #[test]
    fn test_lookups_interleaved_duplicates() {
        let first = Category::sample("Legal");
        let second = Category::sample("Security");
        let ids = [first.id, second.id, first.id, second.id, first.id];

        let lookups = lookups_for(&ids, vec![second.clone(), first.clone()]);

        let keys: Vec<Uuid> = lookups.iter().map(Lookup::key).collect();
        assert_eq!(keys, ids);
        assert!(lookups.iter().all(|l| matches!(l, Lookup::Found(_))));
    }

    #[test]
    fn test_lookups_repeats_duplicate_ids() {
        let category = Category::sample("Legal");
        let lookups = lookups_for(&[category.id, category.id], vec![category.clone()]);
        assert_eq!(lookups.len(), 2);
        assert!(lookups.iter().all(|l| *l == Lookup::Found(category.clone())));
    }
}

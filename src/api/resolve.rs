//! Name-to-id resolution for systems and groups

use super::models::ResourceItem;

/// Find the id of the item called `name`.
///
/// Two passes over the same listing: an exact, case-sensitive name match
/// first, then a case-insensitive substring match. Each pass returns the
/// first hit in listing order. So `web` still resolves `web-1` when no item is
/// called exactly `web`.
pub fn find_id_in(items: &[ResourceItem], name: &str) -> Option<u64> {
    if let Some(item) = items.iter().find(|item| item.name == name) {
        return Some(item.id);
    }

    let wanted = name.to_lowercase();
    items
        .iter()
        .find(|item| item.name.to_lowercase().contains(&wanted))
        .map(|item| item.id)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: u64, name: &str) -> ResourceItem {
        ResourceItem {
            id,
            name: name.to_string(),
            query: None,
        }
    }

    #[test]
    fn test_exact_match() {
        let items = vec![item(1, "web-1")];
        assert_eq!(find_id_in(&items, "web-1"), Some(1));
    }

    #[test]
    fn test_substring_fallback() {
        let items = vec![item(1, "web-1")];
        assert_eq!(find_id_in(&items, "web"), Some(1));
        assert_eq!(find_id_in(&items, "WEB"), Some(1));
    }

    #[test]
    fn test_not_found() {
        let items = vec![item(1, "web-1")];
        assert_eq!(find_id_in(&items, "db"), None);
        assert_eq!(find_id_in(&[], "web-1"), None);
    }

    #[test]
    fn test_exact_match_wins_over_earlier_substring() {
        let items = vec![item(1, "web-10"), item(2, "web-1")];
        assert_eq!(find_id_in(&items, "web-1"), Some(2));
    }

    #[test]
    fn test_exact_pass_is_case_sensitive() {
        // "Web" is not an exact match for "web", so the substring pass picks
        // the first item containing it, ignoring case.
        let items = vec![item(1, "Web"), item(2, "web")];
        assert_eq!(find_id_in(&items, "web"), Some(2));
        assert_eq!(find_id_in(&items, "WEB"), Some(1));
    }

    #[test]
    fn test_regex_metacharacters_are_literal() {
        let items = vec![item(1, "app.prod"), item(2, "app(prod)")];
        assert_eq!(find_id_in(&items, "(prod"), Some(2));
        assert_eq!(find_id_in(&items, "a.p"), None);
    }
}

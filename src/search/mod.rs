//! Pagination engine
//!
//! Turns a query string plus a bound set into exactly one search request and
//! hands back the page with its continuation cursors. Looping, sleeping and
//! deciding when to stop belong to the strategies in [`strategies`].

pub mod strategies;

use crate::api::{ApiError, Client, EventId, PageResult};
use chrono::{DateTime, Utc};

pub use strategies::{follow, run_once, scan_time_range, TimeRange};

/// Search endpoint, relative to the API base
const SEARCH_ENDPOINT: &str = "search.json";

/// Parameters of one search call
///
/// `system_id`/`group_id` are resolved from names once, before any page is
/// requested. At most one cursor pair (ids or times) is active: the `with_*`
/// builders clear the other pair.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryBounds {
    pub system_id: Option<u64>,
    pub group_id: Option<u64>,
    /// Exclusive lower id bound
    pub min_id: Option<EventId>,
    /// Exclusive upper id bound
    pub max_id: Option<EventId>,
    pub min_time: Option<DateTime<Utc>>,
    pub max_time: Option<DateTime<Utc>>,
    pub tail: Option<bool>,
}

impl QueryBounds {
    /// Scope-only bounds: no cursors, no mode flag
    pub fn scoped(system_id: Option<u64>, group_id: Option<u64>) -> Self {
        Self {
            system_id,
            group_id,
            ..Self::default()
        }
    }

    /// Same scope, cursored by time from `min_time`
    pub fn with_min_time(&self, min_time: Option<DateTime<Utc>>) -> Self {
        Self {
            min_id: None,
            max_id: None,
            min_time,
            max_time: None,
            ..self.clone()
        }
    }

    /// Same scope, cursored by id after `min_id`
    pub fn with_min_id(&self, min_id: EventId) -> Self {
        Self {
            min_id: Some(min_id),
            max_id: None,
            min_time: None,
            max_time: None,
            ..self.clone()
        }
    }

    pub fn with_tail(&self, tail: bool) -> Self {
        Self {
            tail: Some(tail),
            ..self.clone()
        }
    }

    /// Request parameters for the search endpoint. Unset bounds are `None`
    /// and never reach the query string.
    pub fn to_params(&self, query: &str) -> Vec<(&'static str, Option<String>)> {
        vec![
            ("q", Some(query.to_string())),
            ("system_id", self.system_id.map(|id| id.to_string())),
            ("group_id", self.group_id.map(|id| id.to_string())),
            ("min_id", self.min_id.map(|id| id.to_string())),
            ("max_id", self.max_id.map(|id| id.to_string())),
            ("min_time", self.min_time.map(|t| t.timestamp().to_string())),
            ("max_time", self.max_time.map(|t| t.timestamp().to_string())),
            ("tail", self.tail.map(|t| t.to_string())),
        ]
    }
}

/// Anything that can answer one search request
///
/// The real implementation is [`Client`]; strategies only see this trait.
pub trait SearchBackend {
    /// Perform exactly one search call. Errors are surfaced untranslated.
    fn fetch_page(&self, query: &str, bounds: &QueryBounds) -> Result<PageResult, ApiError>;
}

impl SearchBackend for Client {
    fn fetch_page(&self, query: &str, bounds: &QueryBounds) -> Result<PageResult, ApiError> {
        let body: serde_json::Value = self.get(SEARCH_ENDPOINT, &bounds.to_params(query))?;
        let page = PageResult::from_value(body)?;

        tracing::debug!(
            events = page.events.len(),
            min_id = ?page.min_id,
            max_id = ?page.max_id,
            reached_end = page.reached_end,
            "Fetched search page"
        );

        Ok(page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn param<'a>(params: &'a [(&'static str, Option<String>)], key: &str) -> Option<&'a str> {
        params
            .iter()
            .find(|(k, _)| *k == key)
            .and_then(|(_, v)| v.as_deref())
    }

    #[test]
    fn test_scoped_params_only_carry_scope() {
        let bounds = QueryBounds::scoped(Some(7), None);
        let params = bounds.to_params("nginx -accepted");

        assert_eq!(param(&params, "q"), Some("nginx -accepted"));
        assert_eq!(param(&params, "system_id"), Some("7"));
        for key in ["group_id", "min_id", "max_id", "min_time", "max_time", "tail"] {
            assert_eq!(param(&params, key), None, "{} should be unset", key);
        }
    }

    #[test]
    fn test_min_time_is_unix_seconds() {
        let t = Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap();
        let params = QueryBounds::default()
            .with_min_time(Some(t))
            .with_tail(false)
            .to_params("");

        assert_eq!(param(&params, "min_time"), Some("1705320000"));
        assert_eq!(param(&params, "tail"), Some("false"));
    }

    #[test]
    fn test_id_cursor_replaces_time_cursor() {
        let t = Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap();
        let bounds = QueryBounds::scoped(None, Some(3))
            .with_min_time(Some(t))
            .with_min_id(EventId(900));

        assert_eq!(bounds.min_id, Some(EventId(900)));
        assert_eq!(bounds.min_time, None);
        assert_eq!(bounds.group_id, Some(3));

        let back = bounds.with_min_time(Some(t));
        assert_eq!(back.min_id, None);
        assert_eq!(back.min_time, Some(t));
    }
}

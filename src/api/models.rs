// Data models for the log service's JSON API
//
// Only the fields the retrieval engine needs are typed. Every event and page
// also keeps its original payload so raw JSON output reproduces exactly what
// the service sent, including fields we never look at.

use super::ApiError;
use chrono::{DateTime, FixedOffset, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Server-assigned event id
///
/// Opaque to us except for ordering: ids increase monotonically within a
/// source's timeline. The service sends them as JSON strings, older
/// deployments as numbers; both decode here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct EventId(pub u64);

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl<'de> Deserialize<'de> for EventId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Number(u64),
            Text(String),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Number(n) => Ok(EventId(n)),
            Repr::Text(s) => s
                .trim()
                .parse()
                .map(EventId)
                .map_err(|_| serde::de::Error::custom(format!("invalid event id {:?}", s))),
        }
    }
}

/// One log line as returned by the search endpoint
#[derive(Debug, Clone)]
pub struct Event {
    pub id: EventId,
    pub received_at: DateTime<FixedOffset>,
    pub source_name: String,
    /// Program label, falling back to the syslog facility
    pub program: String,
    pub message: String,
    /// Full original payload (for raw JSON output)
    pub data: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct EventFields {
    id: EventId,
    received_at: DateTime<FixedOffset>,
    #[serde(default)]
    source_name: Option<String>,
    #[serde(default)]
    program: Option<String>,
    #[serde(default)]
    facility: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl Event {
    /// Build an event from its JSON payload, keeping the payload intact
    pub fn from_value(data: serde_json::Value) -> Result<Self, ApiError> {
        let fields: EventFields = serde_json::from_value(data.clone())
            .map_err(|e| ApiError::Decode(format!("event: {}", e)))?;

        Ok(Self {
            id: fields.id,
            received_at: fields.received_at,
            source_name: fields.source_name.unwrap_or_default(),
            program: fields.program.or(fields.facility).unwrap_or_default(),
            message: fields.message.unwrap_or_default(),
            data,
        })
    }

    /// Receive time normalised to UTC for bound comparisons
    pub fn received_at_utc(&self) -> DateTime<Utc> {
        self.received_at.with_timezone(&Utc)
    }
}

/// Rendered form: `<received_at> <source_name> <program>: <message>`
///
/// The timestamp uses the syslog shape (`Jan  5 14:03:09`) so the bundled
/// log formats can match rendered lines.
impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}: {}",
            self.received_at.format("%b %e %H:%M:%S"),
            self.source_name,
            self.program,
            self.message
        )
    }
}

/// Response to one search call
#[derive(Debug, Clone)]
pub struct PageResult {
    /// Events in ascending id order
    pub events: Vec<Event>,
    /// Id of the first event in this page
    pub min_id: Option<EventId>,
    /// Id of the last event in this page; primes the next page's lower bound
    pub max_id: Option<EventId>,
    /// Latest time the service has indexed, may be past the last returned event
    pub max_time_at: Option<DateTime<FixedOffset>>,
    /// No more historical data exists for the current bound set
    pub reached_end: bool,
    /// Full original response body
    pub data: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct PageFields {
    #[serde(default)]
    events: Vec<serde_json::Value>,
    #[serde(default)]
    min_id: Option<EventId>,
    #[serde(default)]
    max_id: Option<EventId>,
    #[serde(default)]
    max_time_at: Option<DateTime<FixedOffset>>,
    #[serde(default)]
    reached_end: bool,
}

impl PageResult {
    /// Build a page from the search response body
    ///
    /// Events are sorted by id so callers can rely on ascending order even if
    /// the service ever hands them back shuffled.
    pub fn from_value(data: serde_json::Value) -> Result<Self, ApiError> {
        let fields: PageFields = serde_json::from_value(data.clone())
            .map_err(|e| ApiError::Decode(format!("search page: {}", e)))?;

        let mut events = fields
            .events
            .into_iter()
            .map(Event::from_value)
            .collect::<Result<Vec<_>, _>>()?;
        events.sort_by_key(|e| e.id);

        Ok(Self {
            events,
            min_id: fields.min_id,
            max_id: fields.max_id,
            max_time_at: fields.max_time_at,
            reached_end: fields.reached_end,
            data,
        })
    }

    /// `max_time_at` normalised to UTC
    pub fn max_time_at_utc(&self) -> Option<DateTime<Utc>> {
        self.max_time_at.map(|t| t.with_timezone(&Utc))
    }
}

/// A system, group or saved search from a listing endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct ResourceItem {
    pub id: u64,
    pub name: String,
    /// Only saved searches carry a query
    #[serde(default)]
    pub query: Option<String>,
}

/// JSON body decoding settings
///
/// Passed to each parse call instead of being configured process-wide.
#[derive(Debug, Clone, Copy)]
pub struct JsonDecoder {
    /// Replace invalid UTF-8 sequences instead of rejecting the body
    pub lossy_utf8: bool,
}

impl Default for JsonDecoder {
    fn default() -> Self {
        Self { lossy_utf8: true }
    }
}

impl JsonDecoder {
    pub fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T, ApiError> {
        let result = if self.lossy_utf8 {
            serde_json::from_str(&String::from_utf8_lossy(bytes))
        } else {
            serde_json::from_slice(bytes)
        };
        result.map_err(|e| ApiError::Decode(e.to_string()))
    }
}

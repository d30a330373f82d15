//! Domain-event envelope published to the message broker.
//!
//! Events are fire-and-forget: the publishing workflow never waits for a
//! consumer and a publish failure never fails the business operation. The
//! envelope carries a generated id so consumers can deduplicate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Kind of domain event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventType {
    /// An entity was created
    Created,
}

/// Envelope wrapping a domain-event payload.
///
/// Serialized as JSON on the wire:
///
/// ```json
/// {"id":"...","date":"...","type":"CREATED","data":{...}}
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event<T> {
    /// Generated, unique event id
    pub id: Uuid,
    /// When the event was emitted
    pub date: DateTime<Utc>,
    /// Event kind tag
    #[serde(rename = "type")]
    pub event_type: EventType,
    /// Domain payload
    pub data: T,
}

impl<T> Event<T> {
    /// Wraps `data` in a `CREATED` envelope with a fresh id and the current
    /// timestamp.
    #[must_use]
    pub fn created(data: T) -> Self {
        Self {
            id: Uuid::new_v4(),
            date: Utc::now(),
            event_type: EventType::Created,
            data,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn envelope_serializes_type_tag() {
        let event = Event::created(serde_json::json!({"amount": "10.00"}));
        let value = serde_json::to_value(&event).unwrap();

        assert_eq!(value["type"], "CREATED");
        assert!(value["id"].is_string());
        assert_eq!(value["data"]["amount"], "10.00");
    }

    #[test]
    fn fresh_envelopes_get_distinct_ids() {
        let a = Event::created(1);
        let b = Event::created(1);
        assert_ne!(a.id, b.id);
    }
}

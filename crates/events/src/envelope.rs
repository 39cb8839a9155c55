use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use fruitcart_core::AggregateId;

use crate::event::Event;

/// Envelope for an event, containing stream metadata.
///
/// This is the unit appended to an aggregate's journal.
///
/// Notes:
/// - **Append-only**: `sequence_number` starts at 1 and increases by one per
///   event within a stream.
/// - `payload` is the domain event itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventEnvelope<E> {
    event_id: Uuid,

    aggregate_id: AggregateId,
    aggregate_type: String,

    /// Monotonically increasing position in the aggregate stream.
    sequence_number: u64,

    payload: E,
}

impl<E> EventEnvelope<E> {
    pub fn new(
        event_id: Uuid,
        aggregate_id: AggregateId,
        aggregate_type: impl Into<String>,
        sequence_number: u64,
        payload: E,
    ) -> Self {
        Self {
            event_id,
            aggregate_id,
            aggregate_type: aggregate_type.into(),
            sequence_number,
            payload,
        }
    }

    /// Wrap `payload` with a fresh time-ordered event id.
    pub fn record(
        aggregate_id: AggregateId,
        aggregate_type: impl Into<String>,
        sequence_number: u64,
        payload: E,
    ) -> Self {
        Self::new(
            Uuid::now_v7(),
            aggregate_id,
            aggregate_type,
            sequence_number,
            payload,
        )
    }

    pub fn event_id(&self) -> Uuid {
        self.event_id
    }

    pub fn aggregate_id(&self) -> AggregateId {
        self.aggregate_id
    }

    pub fn aggregate_type(&self) -> &str {
        &self.aggregate_type
    }

    pub fn sequence_number(&self) -> u64 {
        self.sequence_number
    }

    pub fn payload(&self) -> &E {
        &self.payload
    }

    pub fn into_payload(self) -> E {
        self.payload
    }
}

impl<E: Event> EventEnvelope<E> {
    pub fn event_type(&self) -> &'static str {
        self.payload.event_type()
    }

    pub fn occurred_at(&self) -> DateTime<Utc> {
        self.payload.occurred_at()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    struct Pinged {
        at: DateTime<Utc>,
    }

    impl Event for Pinged {
        fn event_type(&self) -> &'static str {
            "test.pinged"
        }

        fn occurred_at(&self) -> DateTime<Utc> {
            self.at
        }
    }

    #[test]
    fn record_assigns_distinct_event_ids() {
        let aggregate_id = AggregateId::new();
        let at = Utc::now();
        let first = EventEnvelope::record(aggregate_id, "test", 1, Pinged { at });
        let second = EventEnvelope::record(aggregate_id, "test", 2, Pinged { at });

        assert_ne!(first.event_id(), second.event_id());
        assert_eq!(first.aggregate_id(), second.aggregate_id());
        assert_eq!(first.sequence_number(), 1);
        assert_eq!(second.sequence_number(), 2);
    }

    #[test]
    fn exposes_payload_metadata() {
        let at = Utc::now();
        let envelope = EventEnvelope::record(AggregateId::new(), "test", 1, Pinged { at });

        assert_eq!(envelope.aggregate_type(), "test");
        assert_eq!(envelope.event_type(), "test.pinged");
        assert_eq!(envelope.occurred_at(), at);
        assert_eq!(envelope.into_payload(), Pinged { at });
    }

    #[test]
    fn serializes_with_payload() {
        let payload = Pinged { at: Utc::now() };
        let envelope = EventEnvelope::record(AggregateId::new(), "test", 7, payload);
        let json = serde_json::to_value(&envelope).unwrap();
        assert_eq!(json["sequence_number"], 7);
        assert_eq!(json["aggregate_type"], "test");

        let back: EventEnvelope<Pinged> = serde_json::from_value(json).unwrap();
        assert_eq!(back, envelope);
    }
}

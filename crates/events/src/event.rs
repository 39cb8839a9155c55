use chrono::{DateTime, Utc};

/// A fact recorded by an aggregate.
///
/// Payloads are never edited after they are emitted; a correction is a new
/// event. `event_type` names are dotted and stable (`"cart.line_added"`) since
/// they outlive the Rust type names.
pub trait Event: Clone + core::fmt::Debug + Send + Sync + 'static {
    fn event_type(&self) -> &'static str;

    /// Payload schema revision. Bump when a field changes meaning.
    fn schema_version(&self) -> u32 {
        1
    }

    /// Business time of the change, not the time it was journaled.
    fn occurred_at(&self) -> DateTime<Utc>;
}

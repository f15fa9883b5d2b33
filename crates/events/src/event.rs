use chrono::{DateTime, Utc};

/// A domain event.
///
/// Events are facts: immutable, versioned, and produced only by an
/// aggregate's `handle`.
pub trait Event: Clone + core::fmt::Debug + Send + Sync + 'static {
    /// Stable event name (e.g. "custody.invoice.settled").
    fn event_type(&self) -> &'static str;

    /// Schema version for this event type.
    fn version(&self) -> u32;

    /// When the event occurred (business time).
    fn occurred_at(&self) -> DateTime<Utc>;
}

use chrono::{DateTime, Utc};
use serde_json::Value;

// ============================================================================
// Record - the unit stored in a command or event log
// ============================================================================
//
// A record kind (Command, Event, ...) is a closed enum of variants. Each
// variant wraps a plain payload struct. The store never looks inside the
// payload; it only needs the tag, the logical timestamp and the payload
// fields as a JSON object.
//
// ============================================================================

/// A record kind that can be persisted in a log.
///
/// Implementors are usually enums whose variants each wrap a payload struct.
/// The tag returned by [`Record::type_tag`] must match the tag the variant was
/// registered under in its [`Codec`](super::Codec).
pub trait Record: Clone + Send + Sync + 'static {
    /// Stable name of the concrete variant, e.g. `"PlaceBid"`.
    fn type_tag(&self) -> &'static str;

    /// Logical timestamp of the record, the primary ordering key.
    fn timestamp(&self) -> DateTime<Utc>;

    /// The variant's payload fields, serialized as a flat JSON object.
    fn encode_payload(&self) -> serde_json::Result<Value>;
}

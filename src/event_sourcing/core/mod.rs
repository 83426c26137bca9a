// ============================================================================
// Event Sourcing Core - Records and the Record Codec
// ============================================================================
//
// Key Principles:
// - No domain-specific code (no Auction, Bid, ...)
// - Record kinds are closed enums; the codec is an explicit tag registry
// - Envelopes are flat JSON objects carrying a reserved "$type" field
//
// ============================================================================

pub mod codec;
pub mod record;

pub use codec::{split_envelope, Codec, CodecBuilder, CodecError, Envelope, TAG_FIELD};
pub use record::Record;

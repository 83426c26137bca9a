// ============================================================================
// Event Sourcing Infrastructure
// ============================================================================
//
// Generic, reusable persistence for command and event logs.
// Domain-specific record types live in src/domain/
//
// ============================================================================

// Core abstractions (GENERIC - works with any record kind)
pub mod core;
pub mod store;

// Re-export core infrastructure
pub use self::core::*;
pub use self::store::*;

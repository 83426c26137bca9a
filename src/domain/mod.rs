// ============================================================================
// Domain Layer - Record Definitions
// ============================================================================
//
// Each domain has its own subdirectory with:
// - Value objects
// - Commands
// - Events
//
// This layer is completely separate from the event sourcing infrastructure.
//
// ============================================================================

pub mod auction;

// ============================================================================
// Auction Domain - Record Types for the Auction Site
// ============================================================================
//
// This module contains the auction-specific record kinds:
// - Value objects (Auction, Amount, Currency)
// - Commands (AddAuction, PlaceBid)
// - Events (AuctionAdded, BidAccepted)
//
// Validation and command handling live with the application; this module
// only defines what gets persisted and how each kind registers its codec.
//
// ============================================================================

pub mod commands;
pub mod events;
pub mod value_objects;

// Re-export for convenience
pub use commands::*;
pub use events::*;
pub use value_objects::*;

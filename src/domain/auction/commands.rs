use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::value_objects::{Amount, Auction, AuctionId, UserId};
use crate::event_sourcing::core::{Codec, CodecError, Record};

// ============================================================================
// Auction Commands - Represent user intent
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    AddAuction(AddAuction),
    PlaceBid(PlaceBid),
}

/// Seller asks for a new auction to be opened.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddAuction {
    pub at: DateTime<Utc>,
    pub auction: Auction,
}

/// Buyer offers an amount on an auction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceBid {
    pub at: DateTime<Utc>,
    pub auction_id: AuctionId,
    pub bidder: UserId,
    pub amount: Amount,
}

impl Command {
    /// Codec registering every command variant.
    pub fn codec() -> Result<Codec<Command>, CodecError> {
        Ok(Codec::builder()
            .register("AddAuction", Command::AddAuction)?
            .register("PlaceBid", Command::PlaceBid)?
            .build())
    }
}

impl Record for Command {
    fn type_tag(&self) -> &'static str {
        match self {
            Command::AddAuction(_) => "AddAuction",
            Command::PlaceBid(_) => "PlaceBid",
        }
    }

    fn timestamp(&self) -> DateTime<Utc> {
        match self {
            Command::AddAuction(c) => c.at,
            Command::PlaceBid(c) => c.at,
        }
    }

    fn encode_payload(&self) -> serde_json::Result<Value> {
        match self {
            Command::AddAuction(c) => serde_json::to_value(c),
            Command::PlaceBid(c) => serde_json::to_value(c),
        }
    }
}

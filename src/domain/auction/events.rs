use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::value_objects::{Amount, Auction, AuctionId, UserId};
use crate::event_sourcing::core::{Codec, CodecError, Record};

// ============================================================================
// Auction Events - Facts produced by applying commands
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    AuctionAdded(AuctionAdded),
    BidAccepted(BidAccepted),
}

/// Auction Added - the auction is open for bidding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuctionAdded {
    pub at: DateTime<Utc>,
    pub auction: Auction,
}

/// Bid Accepted - the bid passed validation against the auction state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BidAccepted {
    pub at: DateTime<Utc>,
    pub auction_id: AuctionId,
    pub bidder: UserId,
    pub amount: Amount,
}

impl Event {
    /// Codec registering every event variant.
    pub fn codec() -> Result<Codec<Event>, CodecError> {
        Ok(Codec::builder()
            .register("AuctionAdded", Event::AuctionAdded)?
            .register("BidAccepted", Event::BidAccepted)?
            .build())
    }
}

impl Record for Event {
    fn type_tag(&self) -> &'static str {
        match self {
            Event::AuctionAdded(_) => "AuctionAdded",
            Event::BidAccepted(_) => "BidAccepted",
        }
    }

    fn timestamp(&self) -> DateTime<Utc> {
        match self {
            Event::AuctionAdded(e) => e.at,
            Event::BidAccepted(e) => e.at,
        }
    }

    fn encode_payload(&self) -> serde_json::Result<Value> {
        match self {
            Event::AuctionAdded(e) => serde_json::to_value(e),
            Event::BidAccepted(e) => serde_json::to_value(e),
        }
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::auction::{AddAuction, Command, Currency, PlaceBid};
    use chrono::TimeZone;
    use uuid::Uuid;

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 6, 1, hour, 0, 0).unwrap()
    }

    fn auction() -> Auction {
        Auction {
            id: 1,
            title: "Vintage lamp".to_string(),
            seller: Uuid::new_v4(),
            currency: Currency::Sek,
            starts_at: at(8),
            ends_at: at(20),
        }
    }

    #[test]
    fn test_every_command_variant_round_trips() {
        let codec = Command::codec().unwrap();
        let commands = vec![
            Command::AddAuction(AddAuction {
                at: at(7),
                auction: auction(),
            }),
            Command::PlaceBid(PlaceBid {
                at: at(9),
                auction_id: 1,
                bidder: Uuid::new_v4(),
                amount: Amount::new(Currency::Sek, 100),
            }),
        ];

        for command in commands {
            let bytes = codec.encode(&command).unwrap();
            assert_eq!(codec.decode_bytes(&bytes).unwrap(), command);
        }
    }

    #[test]
    fn test_every_event_variant_round_trips() {
        let codec = Event::codec().unwrap();
        let events = vec![
            Event::AuctionAdded(AuctionAdded {
                at: at(7),
                auction: auction(),
            }),
            Event::BidAccepted(BidAccepted {
                at: at(9),
                auction_id: 1,
                bidder: Uuid::new_v4(),
                amount: Amount::new(Currency::Sek, 100),
            }),
        ];

        for event in events {
            let bytes = codec.encode(&event).unwrap();
            assert_eq!(codec.decode_bytes(&bytes).unwrap(), event);
        }
    }

    #[test]
    fn test_tags_match_registration() {
        let codec = Event::codec().unwrap();
        let mut tags: Vec<_> = codec.tags().collect();
        tags.sort();

        assert_eq!(tags, vec!["AuctionAdded", "BidAccepted"]);
    }

    #[test]
    fn test_timestamp_comes_from_payload() {
        let event = Event::BidAccepted(BidAccepted {
            at: at(11),
            auction_id: 1,
            bidder: Uuid::nil(),
            amount: Amount::new(Currency::Vac, 5),
        });

        assert_eq!(event.timestamp(), at(11));
        assert_eq!(event.type_tag(), "BidAccepted");
    }

    #[test]
    fn test_command_tag_is_not_an_event_tag() {
        let codec = Event::codec().unwrap();
        let result = codec.decode("PlaceBid", br#"{"at": "2026-06-01T09:00:00Z"}"#);

        assert!(matches!(result, Err(CodecError::UnknownVariant(_))));
    }
}

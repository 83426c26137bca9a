#![allow(dead_code)]

use auction_store::{Codec, Record};
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const OVERSIZED_TAG: &str =
    "BidWithATagNameFarTooLongForTheVarchar50TypeColumnOfTheLogTables";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bid {
    pub at: DateTime<Utc>,
    pub amount: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TestCommand {
    Bid(Bid),
    Oversized(Bid),
}

#[derive(Debug, Clone, PartialEq)]
pub enum TestEvent {
    BidAccepted(Bid),
}

impl Record for TestCommand {
    fn type_tag(&self) -> &'static str {
        match self {
            TestCommand::Bid(_) => "Bid",
            TestCommand::Oversized(_) => OVERSIZED_TAG,
        }
    }

    fn timestamp(&self) -> DateTime<Utc> {
        match self {
            TestCommand::Bid(bid) | TestCommand::Oversized(bid) => bid.at,
        }
    }

    fn encode_payload(&self) -> serde_json::Result<Value> {
        match self {
            TestCommand::Bid(bid) | TestCommand::Oversized(bid) => serde_json::to_value(bid),
        }
    }
}

impl Record for TestEvent {
    fn type_tag(&self) -> &'static str {
        "BidAccepted"
    }

    fn timestamp(&self) -> DateTime<Utc> {
        match self {
            TestEvent::BidAccepted(bid) => bid.at,
        }
    }

    fn encode_payload(&self) -> serde_json::Result<Value> {
        match self {
            TestEvent::BidAccepted(bid) => serde_json::to_value(bid),
        }
    }
}

pub fn command_codec() -> Codec<TestCommand> {
    Codec::builder()
        .register("Bid", TestCommand::Bid)
        .unwrap()
        .register(OVERSIZED_TAG, TestCommand::Oversized)
        .unwrap()
        .build()
}

pub fn event_codec() -> Codec<TestEvent> {
    Codec::builder()
        .register("BidAccepted", TestEvent::BidAccepted)
        .unwrap()
        .build()
}

pub fn at(minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 9, 1, 12, minute, 0).unwrap()
}

pub fn bid(minute: u32, amount: i64) -> TestCommand {
    TestCommand::Bid(Bid {
        at: at(minute),
        amount,
    })
}

pub fn accepted(minute: u32, amount: i64) -> TestEvent {
    TestEvent::BidAccepted(Bid {
        at: at(minute),
        amount,
    })
}

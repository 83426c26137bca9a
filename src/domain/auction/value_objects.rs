use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// Auction Value Objects
// ============================================================================

pub type AuctionId = i64;

pub type UserId = Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Vac,
    Sek,
    Dkk,
}

/// A sum of money in minor units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Amount {
    pub currency: Currency,
    pub value: i64,
}

impl Amount {
    pub fn new(currency: Currency, value: i64) -> Self {
        Self { currency, value }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Auction {
    pub id: AuctionId,
    pub title: String,
    pub seller: UserId,
    pub currency: Currency,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_currency_serializes_uppercase() {
        assert_eq!(serde_json::to_string(&Currency::Sek).unwrap(), r#""SEK""#);
        assert_eq!(
            serde_json::from_str::<Currency>(r#""DKK""#).unwrap(),
            Currency::Dkk
        );
    }

    #[test]
    fn test_amount_serialization() {
        let amount = Amount::new(Currency::Vac, 250);
        let json = serde_json::to_string(&amount).unwrap();

        assert_eq!(json, r#"{"currency":"VAC","value":250}"#);
        assert_eq!(serde_json::from_str::<Amount>(&json).unwrap(), amount);
    }
}

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A date-ranged price override for a specific room.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SpecialPrice {
    pub id: i64,
    #[serde(rename = "specialPrice")]
    pub price: i64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default = "default_active")]
    pub is_active: bool,
    pub updated_at: DateTime<Utc>,
}

fn default_active() -> bool {
    true
}

impl fmt::Display for SpecialPrice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#{} {} ({} to {}){}",
            self.id,
            self.price,
            self.start_date,
            self.end_date,
            if self.is_active { "" } else { " [inactive]" }
        )
    }
}

/// A room together with its special prices, as returned by
/// `GET /special-price/all/{propertyId}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RoomSpecialPrices {
    pub id: i64,
    pub name: String,
    // Wire name kept as the backend spells it.
    #[serde(rename = "Special_prices", default)]
    pub special_prices: Vec<SpecialPrice>,
}

impl RoomSpecialPrices {
    /// Orders the overrides most recently updated first, the way the
    /// management screens list them.
    pub fn sort_recent_first(&mut self) {
        self.special_prices
            .sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
    }
}

/// Payload for `POST /special-price/create`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewSpecialPrice {
    pub room_id: i64,
    #[serde(rename = "specialPrice")]
    pub price: i64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// Payload for `PATCH /special-price/edit/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SpecialPriceUpdate {
    #[serde(rename = "specialPrice")]
    pub price: i64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub is_active: bool,
}

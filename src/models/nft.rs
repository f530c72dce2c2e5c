use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Ownership token bound one-to-one with a paragraph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Nft {
    pub id: i64,
    pub paragraph_id: i64,
    pub owner_id: i64,
    pub mint_date: DateTime<Utc>,
    pub revenue_share: Decimal,
}

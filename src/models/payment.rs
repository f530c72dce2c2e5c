use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A single unlock payment attempt. Never mutated after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    pub id: i64,
    pub reader_id: i64,
    pub paragraph_id: i64,
    pub amount: Decimal,
    pub payment_date: DateTime<Utc>,
    pub successful: bool,
}

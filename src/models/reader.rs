use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A reader account, keyed by email. The custodial wallet is provisioned
/// externally during login; an account without a wallet is rolled back.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reader {
    pub id: i64,
    pub email: String,
    pub wallet_address: String,
    pub wallet_chain: String,
    pub created_at: DateTime<Utc>,
}

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A provisioned custodial wallet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletInfo {
    pub address: String,
    /// Chain identifier as reported by the custody service, e.g. "evm-smart-wallet".
    pub wallet_type: String,
}

/// A collection a token can be minted into.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionInfo {
    pub id: String,
}

/// Descriptor of a minted token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MintReceipt {
    pub id: String,
}

/// Custody-side operations the core delegates out: wallet provisioning at
/// login and token minting for owned paragraphs. Calls are awaited inline
/// and never retried here.
#[async_trait]
pub trait WalletClient: Send + Sync {
    async fn create_wallet(&self) -> Result<WalletInfo>;

    async fn create_collection(&self) -> Result<CollectionInfo>;

    async fn mint_nft(&self, collection_id: &str, recipient: &str) -> Result<MintReceipt>;
}

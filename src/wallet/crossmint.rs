use crate::config::Config;
use crate::error::Result;
use crate::wallet::provider::{CollectionInfo, MintReceipt, WalletClient, WalletInfo};
use crate::StoryError;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;

#[derive(Debug, Serialize)]
struct SignerConfig {
    #[serde(rename = "type")]
    signer_type: String,
    address: String,
}

#[derive(Debug, Deserialize)]
struct WalletResponse {
    address: String,
    #[serde(rename = "type")]
    wallet_type: String,
}

#[derive(Debug, Deserialize)]
struct CollectionResponse {
    id: String,
}

#[derive(Debug, Deserialize)]
struct MintResponse {
    id: String,
}

/// Crossmint custody client: wallet provisioning, collections, and NFT
/// minting against the staging or production REST API.
pub struct CrossmintClient {
    client: Client,
    api_key: String,
    env: String,
    chain: String,
    signer_public_key: Option<String>,
}

impl CrossmintClient {
    pub fn new(config: &Config) -> Result<Self> {
        let api_key = config.crossmint_api_key.clone().ok_or_else(|| {
            StoryError::Internal("Crossmint API key is not configured".to_string())
        })?;

        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| StoryError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(CrossmintClient {
            client,
            api_key,
            env: config.crossmint_env.clone(),
            chain: config.crossmint_chain.clone(),
            signer_public_key: config.signer_public_key.clone(),
        })
    }

    fn base_url(&self) -> String {
        format!("https://{}.crossmint.com", self.env)
    }

    async fn post_json<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        body: serde_json::Value,
    ) -> Result<T> {
        let response = self
            .client
            .post(url)
            .header("X-API-KEY", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| StoryError::Wallet(format!("Failed to send request: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(StoryError::Wallet(format!(
                "Crossmint API error ({}): {}",
                status, error_text
            )));
        }

        response
            .json()
            .await
            .map_err(|e| StoryError::Wallet(format!("Failed to parse response: {}", e)))
    }
}

#[async_trait]
impl WalletClient for CrossmintClient {
    async fn create_wallet(&self) -> Result<WalletInfo> {
        let signer = self.signer_public_key.clone().ok_or_else(|| {
            StoryError::Wallet("Signer public key is not configured".to_string())
        })?;

        let url = format!("{}/api/v1-alpha2/wallets", self.base_url());
        let body = json!({
            "type": "evm-smart-wallet",
            "config": {
                "signer": SignerConfig {
                    signer_type: "evm-keypair".to_string(),
                    address: signer,
                }
            }
        });

        let wallet: WalletResponse = self.post_json(&url, body).await?;
        Ok(WalletInfo {
            address: wallet.address,
            wallet_type: wallet.wallet_type,
        })
    }

    async fn create_collection(&self) -> Result<CollectionInfo> {
        let url = format!("{}/api/2022-06-09/collections/", self.base_url());
        let body = json!({
            "chain": self.chain,
            "metadata": {
                "name": "Storyline Paragraphs",
                "description": "Ownership tokens for unlocked story paragraphs"
            },
            "fungibility": "non-fungible",
            "transferable": true,
            "reuploadLinkedFiles": true
        });

        let collection: CollectionResponse = self.post_json(&url, body).await?;
        Ok(CollectionInfo { id: collection.id })
    }

    async fn mint_nft(&self, collection_id: &str, recipient: &str) -> Result<MintReceipt> {
        let url = format!(
            "{}/api/2022-06-09/collections/{}/nfts",
            self.base_url(),
            collection_id
        );
        let body = json!({
            "metadata": {
                "name": "Storyline Paragraph",
                "description": "Proof of unlock for a story paragraph"
            },
            "recipient": recipient,
            "sendNotification": true,
            "reuploadLinkedFiles": true,
            // Solana mints go through the compressed path
            "compressed": self.chain == "solana"
        });

        let mint: MintResponse = self.post_json(&url, body).await?;
        Ok(MintReceipt { id: mint.id })
    }
}

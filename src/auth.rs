use crate::database::readers;
use crate::error::{Result, StoryError};
use crate::wallet::WalletClient;
use rusqlite::Connection;
use serde::Serialize;
use tracing::{error, info};

#[derive(Debug, Clone, Serialize)]
pub struct LoginOutcome {
    pub email: String,
    pub is_new_reader: bool,
    pub wallet_address: String,
}

/// Email-keyed get-or-create login.
///
/// A brand-new reader only becomes valid once the custodial wallet is
/// provisioned; when provisioning fails the freshly inserted row is
/// deleted so the email stays re-attemptable as a new reader.
pub async fn login(conn: &Connection, wallet: &dyn WalletClient, email: &str) -> Result<LoginOutcome> {
    let email = email.trim();
    if email.is_empty() {
        return Err(StoryError::Validation("Email is required".to_string()));
    }

    if let Some(reader) = readers::get_by_email(conn, email)? {
        info!("Existing reader logged in: {}", email);
        return Ok(LoginOutcome {
            email: reader.email,
            is_new_reader: false,
            wallet_address: reader.wallet_address,
        });
    }

    let reader = readers::insert(conn, email)?;
    info!("New reader created with email: {}", email);

    match wallet.create_wallet().await {
        Ok(info) => {
            readers::set_wallet(conn, reader.id, &info.address, &info.wallet_type)?;
            info!("Wallet created for reader {}: {}", email, info.address);
            Ok(LoginOutcome {
                email: reader.email,
                is_new_reader: true,
                wallet_address: info.address,
            })
        }
        Err(e) => {
            error!("Wallet creation failed for reader {}: {}", email, e);
            readers::delete(conn, reader.id)?;
            Err(e)
        }
    }
}

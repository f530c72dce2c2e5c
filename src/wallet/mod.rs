pub mod crossmint;
pub mod provider;

pub use crossmint::CrossmintClient;
pub use provider::{CollectionInfo, MintReceipt, WalletClient, WalletInfo};

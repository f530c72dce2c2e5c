use crate::config::Config;
use crate::database::{nfts, paragraphs, payments, readers};
use crate::error::{Result, StoryError};
use crate::models::{Nft, Paragraph};
use crate::wallet::WalletClient;
use rust_decimal::Decimal;
use rusqlite::{Connection, Transaction, TransactionBehavior};
use tracing::info;

/// Default revenue share granted to a freshly minted paragraph token.
const DEFAULT_REVENUE_SHARE: &str = "10.00";

/// Whether a paragraph's text may be shown to a reader.
pub fn is_visible(paragraph: &Paragraph) -> bool {
    !paragraph.is_locked
}

/// Unlocks a paragraph by processing a payment.
///
/// The payment row is written before the lock flag flips, inside one
/// immediate transaction; a crash between the two steps leaves the
/// paragraph locked with a recorded payment, never the reverse. The
/// already-unlocked check runs under the same transaction so a racing
/// second unlock cannot double-charge.
pub fn unlock(
    conn: &Connection,
    reader_id: i64,
    paragraph_id: i64,
    amount: Option<Decimal>,
) -> Result<Paragraph> {
    let tx = Transaction::new_unchecked(conn, TransactionBehavior::Immediate)?;

    let mut paragraph = paragraphs::get(&tx, paragraph_id)?
        .ok_or_else(|| StoryError::NotFound(format!("Paragraph {} not found", paragraph_id)))?;

    if !paragraph.is_locked {
        return Err(StoryError::Conflict("Paragraph already unlocked".to_string()));
    }

    let amount = amount.ok_or_else(|| StoryError::Validation("Amount required".to_string()))?;
    if amount <= Decimal::ZERO {
        return Err(StoryError::Validation(
            "Amount must be positive".to_string(),
        ));
    }

    // Payment bookkeeping first, then the lock transition
    payments::insert(&tx, reader_id, paragraph_id, amount, true)?;
    paragraphs::set_unlocked(&tx, paragraph_id)?;

    tx.commit()?;

    info!(
        "Paragraph {} unlocked by reader {} for {}",
        paragraph_id, reader_id, amount
    );

    paragraph.is_locked = false;
    Ok(paragraph)
}

/// Mints the ownership token for an unlocked paragraph.
///
/// Minting is a separate operation layered on top of a successful unlock;
/// it is never chained automatically from the unlock path. The external
/// mint call happens before any rows are written, so an upstream failure
/// leaves no local state behind.
pub async fn mint_nft(
    conn: &Connection,
    wallet: &dyn WalletClient,
    config: &Config,
    reader_id: i64,
    paragraph_id: i64,
) -> Result<Nft> {
    let paragraph = paragraphs::get(conn, paragraph_id)?
        .ok_or_else(|| StoryError::NotFound(format!("Paragraph {} not found", paragraph_id)))?;

    if paragraph.is_locked {
        return Err(StoryError::Validation(
            "Paragraph must be unlocked before minting".to_string(),
        ));
    }

    if nfts::get_by_paragraph(conn, paragraph_id)?.is_some() {
        return Err(StoryError::Conflict(
            "Paragraph already has an owner token".to_string(),
        ));
    }

    let reader = readers::get(conn, reader_id)?
        .ok_or_else(|| StoryError::NotFound(format!("Reader {} not found", reader_id)))?;

    let collection_id = match &config.crossmint_collection_id {
        Some(id) => id.clone(),
        None => {
            let collection = wallet.create_collection().await?;
            info!("Created mint collection {}", collection.id);
            collection.id
        }
    };

    let recipient = format!("{}:{}", config.crossmint_chain, reader.wallet_address);
    let receipt = wallet.mint_nft(&collection_id, &recipient).await?;
    info!(
        "Minted token {} for paragraph {} to reader {}",
        receipt.id, paragraph_id, reader_id
    );

    let share: Decimal = DEFAULT_REVENUE_SHARE
        .parse()
        .map_err(|_| StoryError::Internal("Bad default revenue share".to_string()))?;

    let tx = conn.unchecked_transaction()?;
    let nft = nfts::insert(&tx, paragraph_id, reader_id, share)?;
    paragraphs::set_nft_owner(&tx, paragraph_id, reader_id)?;
    tx.commit()?;

    Ok(nft)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::test_support::{seed_story, test_conn};
    use crate::database::{paragraphs, payments};
    use crate::wallet::test_support::StubWallet;

    fn locked_paragraph(conn: &Connection) -> (i64, i64) {
        let (_, chapter_id, reader_id) = seed_story(conn);
        let p = paragraphs::insert(conn, chapter_id, "secret", 1, 1, true).unwrap();
        (p.id, reader_id)
    }

    #[test]
    fn test_unlock_records_payment_then_unlocks() {
        let conn = test_conn();
        let (paragraph_id, reader_id) = locked_paragraph(&conn);

        let amount: Decimal = "0.50".parse().unwrap();
        let unlocked = unlock(&conn, reader_id, paragraph_id, Some(amount)).unwrap();
        assert!(!unlocked.is_locked);

        let stored = paragraphs::get(&conn, paragraph_id).unwrap().unwrap();
        assert!(!stored.is_locked);
        let history = payments::list_by_reader(&conn, reader_id).unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].amount, amount);
        assert!(history[0].successful);
    }

    #[test]
    fn test_unlock_twice_conflicts_without_new_payment() {
        let conn = test_conn();
        let (paragraph_id, reader_id) = locked_paragraph(&conn);

        unlock(&conn, reader_id, paragraph_id, Some("1.00".parse().unwrap())).unwrap();
        let err = unlock(&conn, reader_id, paragraph_id, Some("1.00".parse().unwrap()));
        assert!(matches!(err, Err(StoryError::Conflict(_))));
        assert_eq!(payments::count_for_paragraph(&conn, paragraph_id).unwrap(), 1);
    }

    #[test]
    fn test_unlock_requires_positive_amount() {
        let conn = test_conn();
        let (paragraph_id, reader_id) = locked_paragraph(&conn);

        for amount in [None, Some(Decimal::ZERO), Some("-1".parse().unwrap())] {
            let err = unlock(&conn, reader_id, paragraph_id, amount);
            assert!(matches!(err, Err(StoryError::Validation(_))));
        }

        // Nothing mutated
        assert!(paragraphs::get(&conn, paragraph_id).unwrap().unwrap().is_locked);
        assert_eq!(payments::count_for_paragraph(&conn, paragraph_id).unwrap(), 0);
    }

    #[test]
    fn test_unlock_missing_paragraph() {
        let conn = test_conn();
        seed_story(&conn);
        let err = unlock(&conn, 1, 404, Some("1.00".parse().unwrap()));
        assert!(matches!(err, Err(StoryError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_mint_requires_unlocked_paragraph() {
        let conn = test_conn();
        let (paragraph_id, reader_id) = locked_paragraph(&conn);
        let wallet = StubWallet::default();

        let err = mint_nft(&conn, &wallet, &Config::default(), reader_id, paragraph_id).await;
        assert!(matches!(err, Err(StoryError::Validation(_))));
    }

    #[tokio::test]
    async fn test_mint_once_per_paragraph() {
        let conn = test_conn();
        let (paragraph_id, reader_id) = locked_paragraph(&conn);
        unlock(&conn, reader_id, paragraph_id, Some("1.00".parse().unwrap())).unwrap();

        let wallet = StubWallet::default();
        let config = Config {
            crossmint_collection_id: Some("col-1".to_string()),
            ..Config::default()
        };

        let nft = mint_nft(&conn, &wallet, &config, reader_id, paragraph_id)
            .await
            .unwrap();
        assert_eq!(nft.paragraph_id, paragraph_id);
        assert_eq!(nft.revenue_share, "10.00".parse::<Decimal>().unwrap());

        let owner = paragraphs::get(&conn, paragraph_id).unwrap().unwrap();
        assert_eq!(owner.nft_owner_id, Some(reader_id));

        let err = mint_nft(&conn, &wallet, &config, reader_id, paragraph_id).await;
        assert!(matches!(err, Err(StoryError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_mint_failure_leaves_no_rows() {
        let conn = test_conn();
        let (paragraph_id, reader_id) = locked_paragraph(&conn);
        unlock(&conn, reader_id, paragraph_id, Some("1.00".parse().unwrap())).unwrap();

        let wallet = StubWallet::failing();
        let config = Config {
            crossmint_collection_id: Some("col-1".to_string()),
            ..Config::default()
        };

        let err = mint_nft(&conn, &wallet, &config, reader_id, paragraph_id).await;
        assert!(matches!(err, Err(StoryError::Wallet(_))));
        assert!(crate::database::nfts::get_by_paragraph(&conn, paragraph_id)
            .unwrap()
            .is_none());
    }
}

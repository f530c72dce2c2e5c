use crate::models::Payment;
use chrono::Utc;
use rust_decimal::Decimal;
use rusqlite::types::Type;
use rusqlite::{params, Connection, Row};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PaymentStoreError {
    #[error("Stored amount is not a decimal: {0}")]
    BadAmount(String),
    #[error("Database error: {0}")]
    DatabaseError(#[from] rusqlite::Error),
}

// Amounts are persisted as TEXT so sums stay exact.
fn decimal_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<Decimal> {
    let raw: String = row.get(idx)?;
    raw.parse::<Decimal>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn from_row(row: &Row<'_>) -> rusqlite::Result<Payment> {
    Ok(Payment {
        id: row.get(0)?,
        reader_id: row.get(1)?,
        paragraph_id: row.get(2)?,
        amount: decimal_column(row, 3)?,
        payment_date: row.get(4)?,
        successful: row.get(5)?,
    })
}

/// Records one payment attempt. Payment rows are never mutated.
pub fn insert(
    conn: &Connection,
    reader_id: i64,
    paragraph_id: i64,
    amount: Decimal,
    successful: bool,
) -> Result<Payment, PaymentStoreError> {
    let now = Utc::now();

    conn.execute(
        "INSERT INTO payments (reader_id, paragraph_id, amount, payment_date, successful)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![reader_id, paragraph_id, amount.to_string(), now, successful],
    )?;

    Ok(Payment {
        id: conn.last_insert_rowid(),
        reader_id,
        paragraph_id,
        amount,
        payment_date: now,
        successful,
    })
}

/// A reader's payment history, newest first.
pub fn list_by_reader(
    conn: &Connection,
    reader_id: i64,
) -> Result<Vec<Payment>, PaymentStoreError> {
    let mut stmt = conn.prepare(
        "SELECT id, reader_id, paragraph_id, amount, payment_date, successful
         FROM payments
         WHERE reader_id = ?1
         ORDER BY payment_date DESC, id DESC",
    )?;

    let payments = stmt
        .query_map(params![reader_id], from_row)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(payments)
}

/// Exact sum of successful payment amounts against a paragraph.
///
/// Summed in Rust over the TEXT column rather than with SQL SUM, which
/// would coerce to float.
pub fn sum_successful_for_paragraph(
    conn: &Connection,
    paragraph_id: i64,
) -> Result<Decimal, PaymentStoreError> {
    let mut stmt = conn.prepare(
        "SELECT amount FROM payments WHERE paragraph_id = ?1 AND successful = 1",
    )?;

    let mut total = Decimal::ZERO;
    let rows = stmt.query_map(params![paragraph_id], |row| row.get::<_, String>(0))?;
    for raw in rows {
        let raw = raw?;
        let amount = raw
            .parse::<Decimal>()
            .map_err(|_| PaymentStoreError::BadAmount(raw))?;
        total += amount;
    }

    Ok(total)
}

/// Whether any payment rows exist for a paragraph.
pub fn count_for_paragraph(
    conn: &Connection,
    paragraph_id: i64,
) -> Result<u32, PaymentStoreError> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM payments WHERE paragraph_id = ?1",
        params![paragraph_id],
        |row| row.get(0),
    )?;

    Ok(count)
}

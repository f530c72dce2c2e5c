pub mod chapters;
pub mod nfts;
pub mod paragraphs;
pub mod payments;
pub mod progress;
pub mod readers;
mod schema;
pub mod stories;
pub mod visits;

use rusqlite::{Connection, Result};
use std::path::Path;
use tracing::{error, info};

pub use schema::create_tables;

pub use chapters::ChapterStoreError;
pub use nfts::NftStoreError;
pub use paragraphs::ParagraphStoreError;
pub use payments::PaymentStoreError;
pub use progress::ProgressStoreError;
pub use readers::ReaderStoreError;
pub use stories::StoryStoreError;
pub use visits::VisitStoreError;

// Convert StoryStoreError to StoryError
impl From<StoryStoreError> for crate::StoryError {
    fn from(err: StoryStoreError) -> Self {
        match err {
            StoryStoreError::NotFound => crate::StoryError::NotFound("Story not found".to_string()),
            StoryStoreError::DatabaseError(e) => crate::StoryError::Database(e),
        }
    }
}

// Convert ChapterStoreError to StoryError
impl From<ChapterStoreError> for crate::StoryError {
    fn from(err: ChapterStoreError) -> Self {
        match err {
            ChapterStoreError::NotFound => {
                crate::StoryError::NotFound("Chapter not found".to_string())
            }
            ChapterStoreError::DatabaseError(e) => crate::StoryError::Database(e),
        }
    }
}

// Convert ParagraphStoreError to StoryError
impl From<ParagraphStoreError> for crate::StoryError {
    fn from(err: ParagraphStoreError) -> Self {
        match err {
            ParagraphStoreError::NotFound => {
                crate::StoryError::NotFound("Paragraph not found".to_string())
            }
            ParagraphStoreError::DatabaseError(e) => crate::StoryError::Database(e),
        }
    }
}

// Convert ProgressStoreError to StoryError
impl From<ProgressStoreError> for crate::StoryError {
    fn from(err: ProgressStoreError) -> Self {
        match err {
            ProgressStoreError::NotFound => {
                crate::StoryError::NotFound("Reading progress not found".to_string())
            }
            ProgressStoreError::DatabaseError(e) => crate::StoryError::Database(e),
        }
    }
}

// Convert PaymentStoreError to StoryError
impl From<PaymentStoreError> for crate::StoryError {
    fn from(err: PaymentStoreError) -> Self {
        match err {
            PaymentStoreError::BadAmount(raw) => {
                crate::StoryError::Internal(format!("Stored payment amount is not decimal: {}", raw))
            }
            PaymentStoreError::DatabaseError(e) => crate::StoryError::Database(e),
        }
    }
}

// Convert NftStoreError to StoryError
impl From<NftStoreError> for crate::StoryError {
    fn from(err: NftStoreError) -> Self {
        match err {
            NftStoreError::NotFound => crate::StoryError::NotFound("NFT not found".to_string()),
            NftStoreError::BadShare(raw) => {
                crate::StoryError::Internal(format!("Stored revenue share is not decimal: {}", raw))
            }
            NftStoreError::DatabaseError(e) => crate::StoryError::Database(e),
        }
    }
}

// Convert ReaderStoreError to StoryError
impl From<ReaderStoreError> for crate::StoryError {
    fn from(err: ReaderStoreError) -> Self {
        match err {
            ReaderStoreError::NotFound => {
                crate::StoryError::NotFound("Reader not found".to_string())
            }
            ReaderStoreError::DatabaseError(e) => crate::StoryError::Database(e),
        }
    }
}

// Convert VisitStoreError to StoryError
impl From<VisitStoreError> for crate::StoryError {
    fn from(err: VisitStoreError) -> Self {
        match err {
            VisitStoreError::DatabaseError(e) => crate::StoryError::Database(e),
        }
    }
}

/// Opens a connection to the SQLite database
///
/// Enables WAL mode for better concurrency and performance
pub fn open_connection(db_path: &Path) -> Result<Connection> {
    info!("Opening database connection: {:?}", db_path);

    let conn = Connection::open(db_path)?;

    // Enable WAL mode for better concurrency
    // Note: journal_mode returns a value, so we use query_row
    let _journal_mode = conn.query_row("PRAGMA journal_mode = WAL", [], |row| {
        row.get::<_, String>(0)
    })?;

    // Set busy timeout to 5 seconds
    conn.busy_timeout(std::time::Duration::from_secs(5))?;

    conn.execute("PRAGMA foreign_keys = ON", [])?;

    Ok(conn)
}

/// Initializes the database schema
///
/// Creates all tables and indexes if they don't exist
pub fn init_db(db_path: &Path) -> Result<()> {
    info!("Initializing database");

    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            error!("Failed to create database directory: {}", e);
            rusqlite::Error::InvalidPath(db_path.to_path_buf())
        })?;
    }

    let conn = open_connection(db_path)?;

    create_tables(&conn).map_err(|e| {
        error!("Failed to create database tables: {}", e);
        e
    })?;

    info!("Database initialized successfully");
    Ok(())
}

#[cfg(test)]
pub(crate) mod test_support {
    use rusqlite::Connection;

    /// In-memory database with the full schema applied.
    pub fn test_conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        super::create_tables(&conn).unwrap();
        conn
    }

    /// Minimal content fixture: one story, one chapter, one reader.
    /// Returns (story_id, chapter_id, reader_id).
    pub fn seed_story(conn: &Connection) -> (i64, i64, i64) {
        let story = super::stories::insert(conn, "Ash Archive", "a serial", "ault").unwrap();
        let chapter = super::chapters::insert(conn, story.id, "Chapter One", 1).unwrap();
        let reader = super::readers::insert(conn, "r1@example.com").unwrap();
        (story.id, chapter.id, reader.id)
    }
}

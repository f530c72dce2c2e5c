use rusqlite::{Connection, Result};
use tracing::info;

/// Creates all tables and indexes for the storyline database
///
/// Sets up the content tree (stories, chapters, paragraphs), the per-reader
/// tracking tables (reading_progress, viewed_paragraphs, paragraph_views),
/// the monetization tables (payments, nfts) and reader accounts.
pub fn create_tables(conn: &Connection) -> Result<()> {
    info!("Creating database schema");

    // Enable foreign keys
    conn.execute("PRAGMA foreign_keys = ON", [])?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS stories (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL,
            description TEXT NOT NULL DEFAULT '',
            author TEXT NOT NULL DEFAULT '',
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS chapters (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            story_id INTEGER NOT NULL,
            title TEXT NOT NULL,
            chapter_number INTEGER NOT NULL,
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            FOREIGN KEY (story_id) REFERENCES stories(id) ON DELETE CASCADE,
            UNIQUE (story_id, chapter_number)
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS paragraphs (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            chapter_id INTEGER NOT NULL,
            text TEXT NOT NULL,
            paragraph_number INTEGER NOT NULL,
            page INTEGER NOT NULL DEFAULT 1,
            is_locked INTEGER NOT NULL DEFAULT 1,
            nft_owner_id INTEGER,
            text_with_links TEXT,
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            FOREIGN KEY (chapter_id) REFERENCES chapters(id) ON DELETE CASCADE,
            FOREIGN KEY (nft_owner_id) REFERENCES readers(id) ON DELETE SET NULL,
            UNIQUE (chapter_id, paragraph_number, page)
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS readers (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            email TEXT NOT NULL UNIQUE,
            wallet_address TEXT NOT NULL DEFAULT '',
            wallet_chain TEXT NOT NULL DEFAULT '',
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS reading_progress (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            reader_id INTEGER NOT NULL,
            story_id INTEGER NOT NULL,
            last_accessed TEXT NOT NULL DEFAULT (datetime('now')),
            FOREIGN KEY (reader_id) REFERENCES readers(id) ON DELETE CASCADE,
            FOREIGN KEY (story_id) REFERENCES stories(id) ON DELETE CASCADE,
            UNIQUE (reader_id, story_id)
        )",
        [],
    )?;

    // Membership table backing the idempotent viewed set
    conn.execute(
        "CREATE TABLE IF NOT EXISTS viewed_paragraphs (
            progress_id INTEGER NOT NULL,
            paragraph_id INTEGER NOT NULL,
            FOREIGN KEY (progress_id) REFERENCES reading_progress(id) ON DELETE CASCADE,
            FOREIGN KEY (paragraph_id) REFERENCES paragraphs(id) ON DELETE CASCADE,
            UNIQUE (progress_id, paragraph_id)
        )",
        [],
    )?;

    // Append-only visit log; view_order is a per-reader total order
    conn.execute(
        "CREATE TABLE IF NOT EXISTS paragraph_views (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            reader_id INTEGER NOT NULL,
            story_id INTEGER NOT NULL,
            chapter_id INTEGER NOT NULL,
            paragraph_id INTEGER NOT NULL,
            viewed_at TEXT NOT NULL DEFAULT (datetime('now')),
            view_order INTEGER NOT NULL,
            FOREIGN KEY (reader_id) REFERENCES readers(id) ON DELETE CASCADE,
            FOREIGN KEY (story_id) REFERENCES stories(id) ON DELETE CASCADE,
            FOREIGN KEY (chapter_id) REFERENCES chapters(id) ON DELETE CASCADE,
            FOREIGN KEY (paragraph_id) REFERENCES paragraphs(id) ON DELETE CASCADE,
            UNIQUE (reader_id, view_order)
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS payments (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            reader_id INTEGER NOT NULL,
            paragraph_id INTEGER NOT NULL,
            amount TEXT NOT NULL,
            payment_date TEXT NOT NULL DEFAULT (datetime('now')),
            successful INTEGER NOT NULL DEFAULT 1,
            FOREIGN KEY (reader_id) REFERENCES readers(id) ON DELETE CASCADE,
            FOREIGN KEY (paragraph_id) REFERENCES paragraphs(id) ON DELETE CASCADE
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS nfts (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            paragraph_id INTEGER NOT NULL UNIQUE,
            owner_id INTEGER NOT NULL,
            mint_date TEXT NOT NULL DEFAULT (datetime('now')),
            revenue_share TEXT NOT NULL DEFAULT '10.00',
            FOREIGN KEY (paragraph_id) REFERENCES paragraphs(id) ON DELETE CASCADE,
            FOREIGN KEY (owner_id) REFERENCES readers(id) ON DELETE CASCADE
        )",
        [],
    )?;

    // Indexes for the hot read paths
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_chapters_story_id ON chapters(story_id)",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_paragraphs_chapter_page
         ON paragraphs(chapter_id, page, paragraph_number)",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_paragraph_views_reader_story
         ON paragraph_views(reader_id, story_id, view_order)",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_payments_paragraph_id ON payments(paragraph_id)",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_payments_reader_id ON payments(reader_id)",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_nfts_owner_id ON nfts(owner_id)",
        [],
    )?;

    info!("Database schema created successfully");
    Ok(())
}

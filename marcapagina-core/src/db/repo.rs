//! Database repository layer
//!
//! Query and write operations for books, reading sessions, highlights and
//! goals. Writes that touch more than one row run inside a transaction.

use crate::clock::Clock;
use crate::error::{Error, Result};
use crate::types::*;
use chrono::{DateTime, Utc};
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, Type, ValueRef};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

/// Result of logging pages against a book.
#[derive(Debug, Clone)]
pub struct LoggedSession {
    /// The session that was stored
    pub session: ReadingSession,
    /// The book after its page was advanced
    pub book: Book,
    /// Whether this session reached the last page
    pub finished: bool,
}

impl ToSql for BookStatus {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for BookStatus {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|e: Error| FromSqlError::Other(Box::new(e)))
    }
}

/// Read an RFC 3339 column, failing the row when the text is corrupt.
fn timestamp_column(row: &Row, column: &str) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(column)?;
    parse_timestamp(row, column, &raw)
}

fn optional_timestamp_column(
    row: &Row,
    column: &str,
) -> rusqlite::Result<Option<DateTime<Utc>>> {
    let raw: Option<String> = row.get(column)?;
    raw.map(|s| parse_timestamp(row, column, &s)).transpose()
}

fn parse_timestamp(row: &Row, column: &str, raw: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            let index = row.as_ref().column_index(column).unwrap_or_default();
            rusqlite::Error::FromSqlConversionFailure(index, Type::Text, Box::new(e))
        })
}

/// Database handle (single connection behind a mutex)
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open or create a database at the given path
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA foreign_keys = ON;
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            ",
        )?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute("PRAGMA foreign_keys = ON", [])?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Run migrations on this database
    pub fn migrate(&self) -> Result<()> {
        let conn = self.conn()?;
        super::schema::run_migrations(&conn)
    }

    /// Get the underlying connection (for advanced use)
    pub fn connection(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn()
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| Error::LockPoisoned)
    }

    // ============================================
    // Book operations
    // ============================================

    /// Add a book to the shelf
    pub fn add_book(&self, new: &NewBook, clock: &Clock) -> Result<Book> {
        new.validate()?;

        let now = clock.now_utc();
        let book = Book {
            id: uuid::Uuid::new_v4().to_string(),
            title: new.title.trim().to_string(),
            author: new
                .author
                .as_deref()
                .map(str::trim)
                .filter(|a| !a.is_empty())
                .map(String::from),
            status: new.status,
            // A book added as finished sits on its last page
            current_page: if new.status == BookStatus::Finished {
                new.total_pages
            } else {
                new.current_page
            },
            total_pages: new.total_pages,
            created_at: now,
            updated_at: now,
        };

        let conn = self.conn()?;
        conn.execute(
            r#"
            INSERT INTO books (id, title, author, status, total_pages, current_page, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
            params![
                book.id,
                book.title,
                book.author,
                book.status,
                book.total_pages,
                book.current_page,
                book.created_at.to_rfc3339(),
                book.updated_at.to_rfc3339(),
            ],
        )?;

        tracing::info!(book_id = %book.id, title = %book.title, status = %book.status, "Added book");
        Ok(book)
    }

    /// Get a book by ID
    pub fn get_book(&self, id: &str) -> Result<Option<Book>> {
        let conn = self.conn()?;
        Self::get_book_with(&conn, id)
    }

    fn get_book_with(conn: &Connection, id: &str) -> Result<Option<Book>> {
        conn.query_row("SELECT * FROM books WHERE id = ?", [id], Self::row_to_book)
            .optional()
            .map_err(Error::from)
    }

    /// Find a book by full ID or by a unique ID prefix
    pub fn find_book(&self, id_or_prefix: &str) -> Result<Book> {
        let needle = id_or_prefix.trim();
        if needle.is_empty() {
            return Err(Error::Validation("book id must not be empty".to_string()));
        }

        if let Some(book) = self.get_book(needle)? {
            return Ok(book);
        }

        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT * FROM books WHERE substr(id, 1, length(?1)) = ?1 ORDER BY created_at LIMIT 2",
        )?;
        let mut matches = stmt
            .query_map([needle], Self::row_to_book)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        match matches.len() {
            0 => Err(Error::BookNotFound(needle.to_string())),
            1 => Ok(matches.remove(0)),
            _ => Err(Error::Validation(format!(
                "book id prefix '{}' matches more than one book",
                needle
            ))),
        }
    }

    /// List books, books in progress first, then newest first
    pub fn list_books(&self, status: Option<BookStatus>) -> Result<Vec<Book>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT * FROM books
            WHERE ?1 IS NULL OR status = ?1
            ORDER BY CASE status WHEN 'reading' THEN 0 ELSE 1 END,
                     created_at DESC,
                     rowid DESC
            "#,
        )?;

        let books = stmt
            .query_map([status], Self::row_to_book)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(books)
    }

    /// Move a book between shelves (e.g. start reading a wishlist book).
    ///
    /// Finishing goes through [`Database::finish_book`] so the remaining
    /// pages are logged.
    pub fn set_book_status(&self, id: &str, status: BookStatus, clock: &Clock) -> Result<Book> {
        if status == BookStatus::Finished {
            return Err(Error::Validation(
                "use finish to mark a book as finished".to_string(),
            ));
        }

        let conn = self.conn()?;
        let updated = conn.execute(
            "UPDATE books SET status = ?1, updated_at = ?2 WHERE id = ?3",
            params![status, clock.now_utc().to_rfc3339(), id],
        )?;
        if updated == 0 {
            return Err(Error::BookNotFound(id.to_string()));
        }

        tracing::info!(book_id = %id, status = %status, "Changed book status");
        Self::get_book_with(&conn, id)?.ok_or_else(|| Error::BookNotFound(id.to_string()))
    }

    fn row_to_book(row: &Row) -> rusqlite::Result<Book> {

        Ok(Book {
            id: row.get("id")?,
            title: row.get("title")?,
            author: row.get("author")?,
            status: row.get("status")?,
            total_pages: row.get("total_pages")?,
            current_page: row.get("current_page")?,
            created_at: timestamp_column(row, "created_at")?,
            updated_at: timestamp_column(row, "updated_at")?,
        })
    }

    // ============================================
    // Reading session operations
    // ============================================

    /// Log pages read in a book today.
    ///
    /// Stores the session and advances the book's page (clamped to the last
    /// page) in one transaction. Reaching the last page finishes the book.
    pub fn log_session(
        &self,
        book_id: &str,
        pages: u32,
        duration_minutes: Option<u32>,
        clock: &Clock,
    ) -> Result<LoggedSession> {
        if pages < 1 {
            return Err(Error::Validation(
                "pages read must be at least 1".to_string(),
            ));
        }

        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        let mut book = Self::get_book_with(&tx, book_id)?
            .ok_or_else(|| Error::BookNotFound(book_id.to_string()))?;
        if book.is_finished() {
            return Err(Error::Validation(format!(
                "\"{}\" is already finished",
                book.title
            )));
        }

        let session = Self::insert_session(&tx, &book.id, pages, duration_minutes, clock)?;

        book.current_page = book.total_pages.min(book.current_page.saturating_add(pages));
        let finished = book.current_page == book.total_pages;
        if finished {
            book.status = BookStatus::Finished;
        }
        book.updated_at = clock.now_utc();
        Self::update_progress(&tx, &book)?;

        tx.commit()?;

        tracing::info!(
            book_id = %book.id,
            pages,
            current_page = book.current_page,
            finished,
            "Logged reading session"
        );

        Ok(LoggedSession {
            session,
            book,
            finished,
        })
    }

    /// Mark a book finished, logging whatever pages were left as today's session.
    pub fn finish_book(&self, id: &str, clock: &Clock) -> Result<LoggedSession> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        let mut book =
            Self::get_book_with(&tx, id)?.ok_or_else(|| Error::BookNotFound(id.to_string()))?;
        if book.is_finished() {
            return Err(Error::Validation(format!(
                "\"{}\" is already finished",
                book.title
            )));
        }

        let remaining = book.remaining_pages();
        let session = if remaining > 0 {
            Self::insert_session(&tx, &book.id, remaining, None, clock)?
        } else {
            // Nothing left to read: report an empty session without storing it
            ReadingSession::new(clock.today(), 0).with_book(book.id.clone())
        };

        book.current_page = book.total_pages;
        book.status = BookStatus::Finished;
        book.updated_at = clock.now_utc();
        Self::update_progress(&tx, &book)?;

        tx.commit()?;

        tracing::info!(book_id = %book.id, logged_pages = remaining, "Finished book");

        Ok(LoggedSession {
            session,
            book,
            finished: true,
        })
    }

    fn insert_session(
        conn: &Connection,
        book_id: &str,
        pages: u32,
        duration_minutes: Option<u32>,
        clock: &Clock,
    ) -> Result<ReadingSession> {
        let session = ReadingSession {
            id: Some(uuid::Uuid::new_v4().to_string()),
            book_id: Some(book_id.to_string()),
            date: clock.today().format(DATE_FORMAT).to_string(),
            pages_read: pages,
            duration_minutes,
            created_at: Some(clock.now_utc()),
        };

        conn.execute(
            r#"
            INSERT INTO reading_sessions (id, book_id, date, pages_read, duration_minutes, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                session.id,
                session.book_id,
                session.date,
                session.pages_read,
                session.duration_minutes,
                session.created_at.map(|t| t.to_rfc3339()),
            ],
        )?;

        Ok(session)
    }

    fn update_progress(conn: &Connection, book: &Book) -> Result<()> {
        conn.execute(
            "UPDATE books SET current_page = ?1, status = ?2, updated_at = ?3 WHERE id = ?4",
            params![
                book.current_page,
                book.status,
                book.updated_at.to_rfc3339(),
                book.id
            ],
        )?;
        Ok(())
    }

    /// All reading sessions, most recent day first
    pub fn list_sessions(&self) -> Result<Vec<ReadingSession>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT * FROM reading_sessions ORDER BY date DESC, created_at DESC, rowid DESC",
        )?;
        let sessions = stmt
            .query_map([], Self::row_to_session)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(sessions)
    }

    /// Reading sessions for one book, most recent day first
    pub fn list_book_sessions(&self, book_id: &str) -> Result<Vec<ReadingSession>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT * FROM reading_sessions
            WHERE book_id = ?1
            ORDER BY date DESC, created_at DESC, rowid DESC
            "#,
        )?;
        let sessions = stmt
            .query_map([book_id], Self::row_to_session)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(sessions)
    }

    fn row_to_session(row: &Row) -> rusqlite::Result<ReadingSession> {

        Ok(ReadingSession {
            id: row.get("id")?,
            book_id: row.get("book_id")?,
            date: row.get("date")?,
            pages_read: row.get("pages_read")?,
            duration_minutes: row.get("duration_minutes")?,
            created_at: optional_timestamp_column(row, "created_at")?,
        })
    }

    // ============================================
    // Highlight operations
    // ============================================

    /// Save a passage from a book
    pub fn add_highlight(
        &self,
        book_id: &str,
        content: &str,
        page: Option<u32>,
        clock: &Clock,
    ) -> Result<Highlight> {
        let content = content.trim();
        if content.is_empty() {
            return Err(Error::Validation(
                "highlight must not be empty".to_string(),
            ));
        }

        let conn = self.conn()?;
        if Self::get_book_with(&conn, book_id)?.is_none() {
            return Err(Error::BookNotFound(book_id.to_string()));
        }

        let highlight = Highlight {
            id: uuid::Uuid::new_v4().to_string(),
            book_id: book_id.to_string(),
            content: content.to_string(),
            page,
            created_at: clock.now_utc(),
        };

        conn.execute(
            "INSERT INTO highlights (id, book_id, content, page, created_at) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                highlight.id,
                highlight.book_id,
                highlight.content,
                highlight.page,
                highlight.created_at.to_rfc3339(),
            ],
        )?;

        tracing::info!(highlight_id = %highlight.id, book_id = %book_id, "Saved highlight");
        Ok(highlight)
    }

    /// Highlights for a book, newest first
    pub fn list_highlights(&self, book_id: &str) -> Result<Vec<Highlight>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT * FROM highlights WHERE book_id = ?1 ORDER BY created_at DESC, rowid DESC",
        )?;
        let highlights = stmt
            .query_map([book_id], Self::row_to_highlight)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(highlights)
    }

    /// Every highlight across all books, newest first
    pub fn list_all_highlights(&self) -> Result<Vec<Highlight>> {
        let conn = self.conn()?;
        let mut stmt =
            conn.prepare("SELECT * FROM highlights ORDER BY created_at DESC, rowid DESC")?;
        let highlights = stmt
            .query_map([], Self::row_to_highlight)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(highlights)
    }

    /// Delete a highlight
    pub fn delete_highlight(&self, id: &str) -> Result<()> {
        let conn = self.conn()?;
        let deleted = conn.execute("DELETE FROM highlights WHERE id = ?1", [id])?;
        if deleted == 0 {
            return Err(Error::HighlightNotFound(id.to_string()));
        }
        tracing::info!(highlight_id = %id, "Deleted highlight");
        Ok(())
    }

    fn row_to_highlight(row: &Row) -> rusqlite::Result<Highlight> {

        Ok(Highlight {
            id: row.get("id")?,
            book_id: row.get("book_id")?,
            content: row.get("content")?,
            page: row.get("page")?,
            created_at: timestamp_column(row, "created_at")?,
        })
    }

    // ============================================
    // Goal operations
    // ============================================

    /// The goal currently in effect, if any
    pub fn active_goal(&self) -> Result<Option<Goal>> {
        let conn = self.conn()?;
        conn.query_row(
            "SELECT * FROM goals WHERE active = 1",
            [],
            Self::row_to_goal,
        )
        .optional()
        .map_err(Error::from)
    }

    /// Every goal ever applied, newest first
    pub fn list_goals(&self) -> Result<Vec<Goal>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare("SELECT * FROM goals ORDER BY id DESC")?;
        let goals = stmt
            .query_map([], Self::row_to_goal)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(goals)
    }

    /// Make `new` the only active goal.
    ///
    /// Deactivating the previous goal and inserting the new one happen in a
    /// single transaction, so there is never a moment with zero or two
    /// active goals.
    pub fn apply_goal(&self, new: &NewGoal, clock: &Clock) -> Result<Goal> {
        if new.daily_pages == 0 || new.monthly_pages == 0 {
            return Err(Error::Validation(
                "goal values must be numbers greater than zero".to_string(),
            ));
        }

        let created_at = clock.now_utc();
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        let deactivated = tx.execute("UPDATE goals SET active = 0 WHERE active = 1", [])?;
        tx.execute(
            r#"
            INSERT INTO goals (daily_pages, monthly_pages, suggested_daily_pages,
                               suggested_monthly_pages, suggested_reason, active, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, 1, ?6)
            "#,
            params![
                new.daily_pages,
                new.monthly_pages,
                new.suggested_daily_pages,
                new.suggested_monthly_pages,
                new.suggested_reason,
                created_at.to_rfc3339(),
            ],
        )?;
        let id = tx.last_insert_rowid();

        tx.commit()?;

        tracing::info!(
            goal_id = id,
            daily_pages = new.daily_pages,
            monthly_pages = new.monthly_pages,
            deactivated,
            "Applied goal"
        );

        Ok(Goal {
            id,
            daily_pages: new.daily_pages,
            monthly_pages: new.monthly_pages,
            suggested_daily_pages: new.suggested_daily_pages,
            suggested_monthly_pages: new.suggested_monthly_pages,
            suggested_reason: new.suggested_reason.clone(),
            active: true,
            created_at,
        })
    }

    fn row_to_goal(row: &Row) -> rusqlite::Result<Goal> {

        Ok(Goal {
            id: row.get("id")?,
            daily_pages: row.get("daily_pages")?,
            monthly_pages: row.get("monthly_pages")?,
            suggested_daily_pages: row.get("suggested_daily_pages")?,
            suggested_monthly_pages: row.get("suggested_monthly_pages")?,
            suggested_reason: row.get("suggested_reason")?,
            active: row.get("active")?,
            created_at: timestamp_column(row, "created_at")?,
        })
    }
}

//! Core domain types for marcapagina
//!
//! These are the records the store persists and the calculators read.
//!
//! | Term | Definition |
//! |------|------------|
//! | **Book** | Something on the reader's shelf, with a status and page progress |
//! | **ReadingSession** | One logged reading event: a page count on a calendar day |
//! | **Highlight** | A passage or note saved from a book |
//! | **Goal** | Daily/monthly page targets; exactly one is active at a time |

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Format of `ReadingSession::date`.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

// ============================================
// Reading sessions
// ============================================

/// One logged reading event.
///
/// `date` is the reader's calendar day as a `YYYY-MM-DD` string. It is kept as
/// text so a malformed value coming out of storage does not abort a whole
/// calculation; such rows are simply excluded from date-bucketed metrics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadingSession {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub book_id: Option<String>,
    /// Calendar day (`YYYY-MM-DD`)
    pub date: String,
    pub pages_read: u32,
    /// Minutes spent, when the reader timed the session
    #[serde(default)]
    pub duration_minutes: Option<u32>,
    /// Exact instant the session was recorded (used for time-of-day insights)
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl ReadingSession {
    /// A bare session on `date`, without id or timestamp.
    pub fn new(date: NaiveDate, pages_read: u32) -> Self {
        Self {
            id: None,
            book_id: None,
            date: date.format(DATE_FORMAT).to_string(),
            pages_read,
            duration_minutes: None,
            created_at: None,
        }
    }

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }

    pub fn with_book(mut self, book_id: impl Into<String>) -> Self {
        self.book_id = Some(book_id.into());
        self
    }

    /// Parsed calendar day, or `None` unless `date` is exactly `YYYY-MM-DD`.
    ///
    /// chrono accepts unpadded fields ("2024-6-4"), so the parsed day must
    /// format back to the stored text.
    pub fn day(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(&self.date, DATE_FORMAT)
            .ok()
            .filter(|day| day.format(DATE_FORMAT).to_string() == self.date)
    }
}

// ============================================
// Books
// ============================================

/// Where a book sits on the reader's shelf.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookStatus {
    Reading,
    Paused,
    Finished,
    Wishlist,
    Next,
}

impl BookStatus {
    pub const ALL: [BookStatus; 5] = [
        BookStatus::Reading,
        BookStatus::Paused,
        BookStatus::Finished,
        BookStatus::Wishlist,
        BookStatus::Next,
    ];

    /// Returns the identifier used in database storage
    pub fn as_str(&self) -> &'static str {
        match self {
            BookStatus::Reading => "reading",
            BookStatus::Paused => "paused",
            BookStatus::Finished => "finished",
            BookStatus::Wishlist => "wishlist",
            BookStatus::Next => "next",
        }
    }

    /// Returns the label shown to the reader
    pub fn label(&self) -> &'static str {
        match self {
            BookStatus::Reading => "Lendo",
            BookStatus::Paused => "Pausado",
            BookStatus::Finished => "Finalizado",
            BookStatus::Wishlist => "Lista de Desejos",
            BookStatus::Next => "Próximo",
        }
    }

    /// Whether page progress is meaningful for this status.
    pub fn tracks_progress(&self) -> bool {
        matches!(
            self,
            BookStatus::Reading | BookStatus::Paused | BookStatus::Finished
        )
    }
}

impl std::fmt::Display for BookStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for BookStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "reading" => Ok(BookStatus::Reading),
            "paused" => Ok(BookStatus::Paused),
            "finished" => Ok(BookStatus::Finished),
            "wishlist" => Ok(BookStatus::Wishlist),
            "next" => Ok(BookStatus::Next),
            _ => Err(Error::InvalidStatus(s.to_string())),
        }
    }
}

/// A book on the shelf.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub id: String,
    pub title: String,
    pub author: Option<String>,
    pub status: BookStatus,
    pub total_pages: u32,
    /// Last page read; always `<= total_pages`
    pub current_page: u32,
    pub created_at: DateTime<Utc>,
    /// Bumped whenever progress or status changes
    pub updated_at: DateTime<Utc>,
}

impl Book {
    /// Progress through the book, 0-100.
    pub fn progress_percent(&self) -> u32 {
        if self.total_pages == 0 {
            return 0;
        }
        ((self.current_page as f64 / self.total_pages as f64) * 100.0).round() as u32
    }

    pub fn remaining_pages(&self) -> u32 {
        self.total_pages.saturating_sub(self.current_page)
    }

    pub fn is_finished(&self) -> bool {
        self.status == BookStatus::Finished
    }
}

/// Input for adding a book.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBook {
    pub title: String,
    pub author: Option<String>,
    pub total_pages: u32,
    pub current_page: u32,
    pub status: BookStatus,
}

impl NewBook {
    /// A book the reader starts reading from page zero.
    pub fn new(title: impl Into<String>, total_pages: u32) -> Self {
        Self {
            title: title.into(),
            author: None,
            total_pages,
            current_page: 0,
            status: BookStatus::Reading,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(Error::Validation("book title must not be empty".to_string()));
        }
        if self.total_pages == 0 {
            return Err(Error::Validation(
                "total pages must be greater than 0".to_string(),
            ));
        }
        if self.current_page > self.total_pages {
            return Err(Error::Validation(format!(
                "current page {} is past the last page {}",
                self.current_page, self.total_pages
            )));
        }
        Ok(())
    }
}

// ============================================
// Highlights
// ============================================

/// A saved passage or note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Highlight {
    pub id: String,
    pub book_id: String,
    pub content: String,
    /// Page the passage is on; `None` for free-form notes
    pub page: Option<u32>,
    pub created_at: DateTime<Utc>,
}

// ============================================
// Goals
// ============================================

/// Daily and monthly page targets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    pub id: i64,
    pub daily_pages: u32,
    pub monthly_pages: u32,
    /// Set when the goal came from the suggestion engine
    pub suggested_daily_pages: Option<u32>,
    pub suggested_monthly_pages: Option<u32>,
    pub suggested_reason: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

/// Input for applying a new goal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewGoal {
    pub daily_pages: u32,
    pub monthly_pages: u32,
    pub suggested_daily_pages: Option<u32>,
    pub suggested_monthly_pages: Option<u32>,
    pub suggested_reason: Option<String>,
}

impl NewGoal {
    /// A goal typed in by the reader. Both targets must be positive.
    pub fn manual(daily_pages: i64, monthly_pages: i64) -> Result<Self> {
        if daily_pages <= 0 || monthly_pages <= 0 {
            return Err(Error::Validation(
                "goal values must be numbers greater than zero".to_string(),
            ));
        }
        let to_pages = |value: i64| {
            u32::try_from(value)
                .map_err(|_| Error::Validation(format!("goal value {} is too large", value)))
        };
        Ok(Self {
            daily_pages: to_pages(daily_pages)?,
            monthly_pages: to_pages(monthly_pages)?,
            suggested_daily_pages: None,
            suggested_monthly_pages: None,
            suggested_reason: None,
        })
    }
}

//! JSON export of everything in the reader's log.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::clock::Clock;
use crate::db::Database;
use crate::error::Result;
use crate::types::{Book, Goal, Highlight, ReadingSession};

/// Full copy of the stored data at one instant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportSnapshot {
    pub exported_at: DateTime<Utc>,
    pub books: Vec<Book>,
    pub reading_sessions: Vec<ReadingSession>,
    pub highlights: Vec<Highlight>,
    pub goals: Vec<Goal>,
}

/// Read every table into a snapshot.
pub fn export_snapshot(db: &Database, clock: &Clock) -> Result<ExportSnapshot> {
    let snapshot = ExportSnapshot {
        exported_at: clock.now_utc(),
        books: db.list_books(None)?,
        reading_sessions: db.list_sessions()?,
        highlights: db.list_all_highlights()?,
        goals: db.list_goals()?,
    };

    tracing::info!(
        books = snapshot.books.len(),
        sessions = snapshot.reading_sessions.len(),
        highlights = snapshot.highlights.len(),
        goals = snapshot.goals.len(),
        "Built export snapshot"
    );

    Ok(snapshot)
}

/// Default file name, e.g. `marcapagina-export-2024-06-15.json`.
pub fn default_export_file_name(clock: &Clock) -> String {
    format!("marcapagina-export-{}.json", clock.today().format("%Y-%m-%d"))
}

impl ExportSnapshot {
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the snapshot as pretty JSON.
    pub fn write_to(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_json_pretty()?)?;
        tracing::info!(path = %path.display(), "Wrote export");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{NewBook, NewGoal};
    use chrono::{FixedOffset, TimeZone};

    fn clock() -> Clock {
        let offset = FixedOffset::west_opt(3 * 3600).unwrap();
        Clock::at(offset.with_ymd_and_hms(2024, 6, 15, 22, 0, 0).unwrap())
    }

    #[test]
    fn test_default_file_name_uses_local_day() {
        // 22:00 in UTC-3 is already June 16th in UTC
        assert_eq!(
            default_export_file_name(&clock()),
            "marcapagina-export-2024-06-15.json"
        );
    }

    #[test]
    fn test_export_snapshot() {
        let db = Database::open_in_memory().unwrap();
        db.migrate().unwrap();
        let c = clock();

        let book = db.add_book(&NewBook::new("Vidas Secas", 176), &c).unwrap();
        db.log_session(&book.id, 12, None, &c).unwrap();
        db.add_highlight(&book.id, "Fabiano, você é um homem", Some(18), &c)
            .unwrap();
        db.apply_goal(&NewGoal::manual(10, 300).unwrap(), &c).unwrap();

        let snapshot = export_snapshot(&db, &c).unwrap();
        assert_eq!(snapshot.exported_at, c.now_utc());
        assert_eq!(snapshot.books.len(), 1);
        assert_eq!(snapshot.books[0].current_page, 12);
        assert_eq!(snapshot.reading_sessions.len(), 1);
        assert_eq!(snapshot.highlights.len(), 1);
        assert_eq!(snapshot.goals.len(), 1);

        let json = snapshot.to_json_pretty().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["books"][0]["status"], "reading");
        assert_eq!(value["reading_sessions"][0]["date"], "2024-06-15");

        let back: ExportSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back, snapshot);
    }
}

//! Database schema and migrations
//!
//! Uses SQLite with embedded migrations managed via PRAGMA user_version.

use rusqlite::Connection;

/// Current schema version
pub const SCHEMA_VERSION: i32 = 2;

/// SQL migrations, indexed by version number
const MIGRATIONS: &[&str] = &[
    // Version 1: books, reading sessions, goals
    r#"
    CREATE TABLE IF NOT EXISTS books (
        id               TEXT PRIMARY KEY,
        title            TEXT NOT NULL,
        author           TEXT,
        status           TEXT NOT NULL
                         CHECK (status IN ('reading', 'paused', 'finished', 'wishlist', 'next')),
        total_pages      INTEGER NOT NULL CHECK (total_pages > 0),
        current_page     INTEGER NOT NULL DEFAULT 0
                         CHECK (current_page >= 0 AND current_page <= total_pages),
        created_at       DATETIME NOT NULL,
        updated_at       DATETIME NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_books_status ON books(status);

    -- `date` is the reader's calendar day (YYYY-MM-DD);
    -- `created_at` is the instant the session was logged
    CREATE TABLE IF NOT EXISTS reading_sessions (
        id               TEXT PRIMARY KEY,
        book_id          TEXT REFERENCES books(id) ON DELETE SET NULL,
        date             TEXT NOT NULL,
        pages_read       INTEGER NOT NULL CHECK (pages_read >= 0),
        duration_minutes INTEGER,
        created_at       DATETIME
    );

    CREATE INDEX IF NOT EXISTS idx_reading_sessions_date ON reading_sessions(date);
    CREATE INDEX IF NOT EXISTS idx_reading_sessions_book ON reading_sessions(book_id);

    CREATE TABLE IF NOT EXISTS goals (
        id                      INTEGER PRIMARY KEY AUTOINCREMENT,
        daily_pages             INTEGER NOT NULL CHECK (daily_pages > 0),
        monthly_pages           INTEGER NOT NULL CHECK (monthly_pages > 0),
        suggested_daily_pages   INTEGER,
        suggested_monthly_pages INTEGER,
        suggested_reason        TEXT,
        active                  INTEGER NOT NULL DEFAULT 1,
        created_at              DATETIME NOT NULL
    );
    "#,
    // Version 2: highlights, single active goal
    r#"
    CREATE TABLE IF NOT EXISTS highlights (
        id               TEXT PRIMARY KEY,
        book_id          TEXT NOT NULL REFERENCES books(id) ON DELETE CASCADE,
        content          TEXT NOT NULL,
        page             INTEGER,
        created_at       DATETIME NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_highlights_book ON highlights(book_id, created_at);

    -- Keep only the newest active goal from any earlier, unguarded writes
    UPDATE goals SET active = 0
    WHERE active = 1 AND id <> (SELECT MAX(id) FROM goals WHERE active = 1);

    CREATE UNIQUE INDEX IF NOT EXISTS idx_goals_single_active
        ON goals(active) WHERE active = 1;
    "#,
];

/// Run all pending migrations
pub fn run_migrations(conn: &Connection) -> crate::error::Result<()> {
    let current_version: i32 = conn
        .query_row("PRAGMA user_version", [], |r| r.get(0))
        .unwrap_or(0);

    tracing::info!(
        current_version,
        target_version = SCHEMA_VERSION,
        "Checking database migrations"
    );

    for (i, migration) in MIGRATIONS.iter().enumerate() {
        let version = (i + 1) as i32;
        if version > current_version {
            tracing::info!(version, "Running migration");
            conn.execute_batch(migration)?;
            conn.execute_batch(&format!("PRAGMA user_version = {}", version))?;
        }
    }

    if current_version < SCHEMA_VERSION {
        tracing::info!(
            from = current_version,
            to = SCHEMA_VERSION,
            "Migrations complete"
        );
    }

    Ok(())
}

/// Get current schema version
pub fn get_schema_version(conn: &Connection) -> crate::error::Result<i32> {
    let version: i32 = conn.query_row("PRAGMA user_version", [], |r| r.get(0))?;
    Ok(version)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrations_idempotent() {
        let conn = Connection::open_in_memory().unwrap();

        run_migrations(&conn).unwrap();
        run_migrations(&conn).unwrap();

        let version = get_schema_version(&conn).unwrap();
        assert_eq!(version, SCHEMA_VERSION);
    }

    #[test]
    fn test_tables_created() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();

        for table in ["books", "reading_sessions", "highlights", "goals"] {
            let exists: i32 = conn
                .query_row(
                    "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name=?",
                    [table],
                    |r| r.get(0),
                )
                .unwrap();
            assert_eq!(exists, 1, "Table {} should exist", table);
        }
    }

    #[test]
    fn test_single_active_goal_index() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();

        let insert = "INSERT INTO goals (daily_pages, monthly_pages, active, created_at)
                      VALUES (10, 300, ?1, '2024-06-01T00:00:00+00:00')";
        conn.execute(insert, [1]).unwrap();
        conn.execute(insert, [0]).unwrap();
        assert!(conn.execute(insert, [1]).is_err());
    }

    #[test]
    fn test_unknown_status_rejected() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();

        let result = conn.execute(
            "INSERT INTO books (id, title, status, total_pages, current_page, created_at, updated_at)
             VALUES ('b1', 'Livro', 'completed', 100, 0, 'x', 'x')",
            [],
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_version_two_keeps_newest_active_goal() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(MIGRATIONS[0]).unwrap();
        conn.execute_batch("PRAGMA user_version = 1").unwrap();

        // Two active goals left behind by a half-finished apply
        for daily in [10, 20] {
            conn.execute(
                "INSERT INTO goals (daily_pages, monthly_pages, active, created_at)
                 VALUES (?1, 300, 1, '2024-06-01T00:00:00+00:00')",
                [daily],
            )
            .unwrap();
        }

        run_migrations(&conn).unwrap();

        let active: Vec<i64> = conn
            .prepare("SELECT daily_pages FROM goals WHERE active = 1")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .filter_map(|r| r.ok())
            .collect();
        assert_eq!(active, vec![20]);
    }
}

//! The monthly reading "story".
//!
//! A narrative summary of the month: pages against last month, the reader's
//! strongest weekday and time of day, how many days they showed up, and how
//! many books they have finished.

use std::collections::HashSet;

use chrono::{Datelike, Timelike, Weekday};
use serde::Serialize;

use super::insights::DayPeriod;
use super::metrics::{self, pages_in_month};
use super::{first_max, round_half_up};
use crate::clock::Clock;
use crate::format::{weekday_from_sunday, weekday_name};
use crate::types::{Book, BookStatus, ReadingSession};

/// Shown when no weekday has any pages.
pub const NO_BEST_DAY: &str = "nenhum";
/// Shown when no session has a timestamp with pages.
pub const NO_BEST_TIME: &str = "indefinido";

/// Everything the story view needs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoryData {
    pub current_month_pages: u64,
    pub last_month_pages: u64,
    /// Change against last month; 0 when last month is empty
    pub month_comparison_percent: i64,
    pub best_day: Option<Weekday>,
    pub best_day_name: &'static str,
    pub best_time: Option<DayPeriod>,
    pub best_time_name: &'static str,
    pub unique_days_read_this_month: u32,
    pub days_passed_in_month: u32,
    pub finished_books_count: u32,
    pub current_streak: u32,
    pub longest_streak: u32,
}

/// Build the story for the clock's current month.
pub fn generate_story(sessions: &[ReadingSession], books: &[Book], clock: &Clock) -> StoryData {
    let today = clock.today();
    let current_month_pages = pages_in_month(sessions, today.year(), today.month());
    let (last_year, last_month) = clock.previous_month();
    let last_month_pages = pages_in_month(sessions, last_year, last_month);

    let month_comparison_percent = if last_month_pages > 0 {
        round_half_up(
            (current_month_pages as f64 - last_month_pages as f64) / last_month_pages as f64
                * 100.0,
        )
    } else {
        0
    };

    // Pages per weekday across the whole history, Sunday first
    let mut by_weekday = [0u64; 7];
    for session in sessions {
        if let Some(day) = session.day() {
            by_weekday[day.weekday().num_days_from_sunday() as usize] +=
                u64::from(session.pages_read);
        }
    }
    let best_day = first_max(&by_weekday)
        .filter(|&(_, pages)| pages > 0)
        .map(|(index, _)| weekday_from_sunday(index));

    // Pages per part of the day, by local timestamp
    let mut by_period = [0u64; 4];
    for session in sessions {
        if let Some(created_at) = session.created_at {
            let period = DayPeriod::from_hour(clock.to_local(created_at).hour());
            by_period[period.index()] += u64::from(session.pages_read);
        }
    }
    let best_time = first_max(&by_period)
        .filter(|&(_, pages)| pages > 0)
        .map(|(index, _)| DayPeriod::ALL[index]);

    let unique_days_read_this_month = sessions
        .iter()
        .filter_map(ReadingSession::day)
        .filter(|day| day.year() == today.year() && day.month() == today.month())
        .collect::<HashSet<_>>()
        .len() as u32;

    let finished_books_count = books
        .iter()
        .filter(|b| b.status == BookStatus::Finished)
        .count() as u32;

    StoryData {
        current_month_pages,
        last_month_pages,
        month_comparison_percent,
        best_day,
        best_day_name: best_day.map(weekday_name).unwrap_or(NO_BEST_DAY),
        best_time,
        best_time_name: best_time.map(|p| p.name()).unwrap_or(NO_BEST_TIME),
        unique_days_read_this_month,
        days_passed_in_month: clock.day_of_month(),
        finished_books_count,
        current_streak: metrics::streak(sessions, clock),
        longest_streak: metrics::longest_streak(sessions),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::testing::{at, book, clock, date, local, on, raw};

    #[test]
    fn test_empty_story() {
        let c = clock(2024, 6, 15, 20);
        let story = generate_story(&[], &[], &c);
        assert_eq!(story.best_day_name, "nenhum");
        assert_eq!(story.best_day, None);
        assert_eq!(story.best_time_name, "indefinido");
        assert_eq!(story.best_time, None);
        assert_eq!(story.month_comparison_percent, 0);
        assert_eq!(story.current_month_pages, 0);
        assert_eq!(story.days_passed_in_month, 15);
        assert_eq!(story.finished_books_count, 0);
    }

    #[test]
    fn test_month_comparison() {
        let c = clock(2024, 6, 15, 20);
        let sessions = vec![
            on(date(2024, 6, 2), 60),
            on(date(2024, 6, 3), 60),
            on(date(2024, 5, 20), 100),
            on(date(2024, 4, 20), 999),
        ];
        let story = generate_story(&sessions, &[], &c);
        assert_eq!(story.current_month_pages, 120);
        assert_eq!(story.last_month_pages, 100);
        assert_eq!(story.month_comparison_percent, 20);

        // Negative changes round half up
        let sessions = vec![on(date(2024, 6, 2), 35), on(date(2024, 5, 20), 40)];
        let story = generate_story(&sessions, &[], &c);
        assert_eq!(story.month_comparison_percent, -12);
    }

    #[test]
    fn test_previous_month_crosses_year() {
        let c = clock(2024, 1, 10, 20);
        let sessions = vec![on(date(2024, 1, 5), 30), on(date(2023, 12, 31), 60)];
        let story = generate_story(&sessions, &[], &c);
        assert_eq!(story.last_month_pages, 60);
        assert_eq!(story.month_comparison_percent, -50);
    }

    #[test]
    fn test_best_day_and_time() {
        let c = clock(2024, 6, 15, 20);
        let sessions = vec![
            // Saturday, morning
            at(local(2024, 6, 8, 9), 40),
            // Wednesday, night
            at(local(2024, 6, 12, 22), 25),
            at(local(2024, 6, 5, 21), 25),
            // No timestamp: counts for the weekday only
            on(date(2024, 6, 1), 1),
        ];
        let story = generate_story(&sessions, &[], &c);
        assert_eq!(story.best_day, Some(Weekday::Wed));
        assert_eq!(story.best_day_name, "quarta-feira");
        assert_eq!(story.best_time, Some(DayPeriod::Noite));
        assert_eq!(story.best_time_name, "noite");
    }

    #[test]
    fn test_best_day_tie_goes_to_sunday_first() {
        let c = clock(2024, 6, 15, 20);
        // June 2 is a Sunday, June 3 a Monday
        let sessions = vec![on(date(2024, 6, 3), 10), on(date(2024, 6, 2), 10)];
        let story = generate_story(&sessions, &[], &c);
        assert_eq!(story.best_day_name, "domingo");
    }

    #[test]
    fn test_best_day_skips_non_canonical_dates() {
        let c = clock(2024, 6, 15, 20);
        // June 3 is a Monday, June 4 a Tuesday
        let sessions = vec![
            on(date(2024, 6, 3), 10),
            raw("2024-6-4", 100),
            raw("2024-06-04 ", 100),
            raw("+2024-06-04", 100),
        ];
        let story = generate_story(&sessions, &[], &c);
        assert_eq!(story.best_day, Some(Weekday::Mon));
        assert_eq!(story.best_day_name, "segunda-feira");
        assert_eq!(story.current_month_pages, 10);
        assert_eq!(story.unique_days_read_this_month, 1);
    }

    #[test]
    fn test_unique_days_and_finished_books() {
        let c = clock(2024, 6, 15, 20);
        let now = c.now_utc();
        let mut broken = on(date(2024, 6, 4), 10);
        broken.date = "2024-6-4".to_string();
        let sessions = vec![
            on(date(2024, 6, 2), 10),
            on(date(2024, 6, 2), 5),
            on(date(2024, 6, 3), 5),
            on(date(2024, 5, 30), 5),
            broken,
        ];
        let books = vec![
            book("a", BookStatus::Finished, now),
            book("b", BookStatus::Finished, now),
            book("c", BookStatus::Reading, now),
        ];
        let story = generate_story(&sessions, &books, &c);
        assert_eq!(story.unique_days_read_this_month, 2);
        assert_eq!(story.current_month_pages, 20);
        assert_eq!(story.finished_books_count, 2);
    }

    #[test]
    fn test_story_is_idempotent() {
        let c = clock(2024, 6, 15, 20);
        let sessions = vec![at(local(2024, 6, 14, 7), 12), on(date(2024, 6, 15), 3)];
        assert_eq!(
            generate_story(&sessions, &[], &c),
            generate_story(&sessions, &[], &c)
        );
    }
}

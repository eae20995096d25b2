//! Streaks, daily/monthly totals and pace.

use std::collections::{BTreeMap, HashMap};

use chrono::{Datelike, NaiveDate};

use super::round_one_decimal;
use crate::clock::Clock;
use crate::types::ReadingSession;

/// Pages read per calendar day. Sessions with malformed dates are skipped.
pub fn daily_totals(sessions: &[ReadingSession]) -> HashMap<NaiveDate, u64> {
    let mut totals = HashMap::new();
    for session in sessions {
        if let Some(day) = session.day() {
            *totals.entry(day).or_insert(0) += u64::from(session.pages_read);
        }
    }
    totals
}

/// Consecutive reading days ending today.
///
/// A day counts when its summed pages are positive. If nothing has been read
/// yet today the walk starts from yesterday, so an unfinished day does not
/// break the streak.
pub fn streak(sessions: &[ReadingSession], clock: &Clock) -> u32 {
    if sessions.is_empty() {
        return 0;
    }

    let totals = daily_totals(sessions);
    let pages_on = |day: NaiveDate| totals.get(&day).copied().unwrap_or(0);

    let mut day = clock.today();
    if pages_on(day) == 0 {
        match day.pred_opt() {
            Some(yesterday) => day = yesterday,
            None => return 0,
        }
    }

    let mut streak = 0;
    while pages_on(day) > 0 {
        streak += 1;
        match day.pred_opt() {
            Some(prev) => day = prev,
            None => break,
        }
    }
    streak
}

/// Longest run of consecutive reading days anywhere in the history.
pub fn longest_streak(sessions: &[ReadingSession]) -> u32 {
    let active: BTreeMap<NaiveDate, u64> = daily_totals(sessions)
        .into_iter()
        .filter(|(_, pages)| *pages > 0)
        .collect();

    let mut longest = 0u32;
    let mut current = 0u32;
    let mut prev: Option<NaiveDate> = None;

    for day in active.keys() {
        current = match prev {
            Some(p) if p.succ_opt() == Some(*day) => current + 1,
            _ => 1,
        };
        longest = longest.max(current);
        prev = Some(*day);
    }

    longest
}

/// Pages logged on today's calendar date.
pub fn today_pages(sessions: &[ReadingSession], clock: &Clock) -> u64 {
    let today = clock.today();
    sessions
        .iter()
        .filter(|s| s.day() == Some(today))
        .map(|s| u64::from(s.pages_read))
        .sum()
}

/// Pages logged on or after the first day of the current month.
pub fn month_pages(sessions: &[ReadingSession], clock: &Clock) -> u64 {
    let start = clock.first_of_month();
    sessions
        .iter()
        .filter(|s| s.day().is_some_and(|day| day >= start))
        .map(|s| u64::from(s.pages_read))
        .sum()
}

/// Pages logged in a given calendar month.
pub fn pages_in_month(sessions: &[ReadingSession], year: i32, month: u32) -> u64 {
    sessions
        .iter()
        .filter(|s| {
            s.day()
                .is_some_and(|day| day.year() == year && day.month() == month)
        })
        .map(|s| u64::from(s.pages_read))
        .sum()
}

/// Average pages per day so far this month, one decimal.
pub fn month_pace(month_pages: u64, clock: &Clock) -> f64 {
    round_one_decimal(month_pages as f64 / f64::from(clock.day_of_month()))
}

/// Percentage of the daily goal reached today, capped at 100.
pub fn daily_goal_progress(today_pages: u64, goal: Option<u32>) -> u32 {
    goal_progress(today_pages, goal)
}

/// Percentage of the monthly goal reached so far, capped at 100.
pub fn monthly_goal_progress(month_pages: u64, goal: Option<u32>) -> u32 {
    goal_progress(month_pages, goal)
}

fn goal_progress(pages: u64, goal: Option<u32>) -> u32 {
    match goal {
        Some(goal) if goal > 0 => {
            let percent = (pages as f64 / f64::from(goal) * 100.0).round();
            percent.min(100.0) as u32
        }
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::testing::{clock, date, on, raw};

    #[test]
    fn test_streak_empty() {
        assert_eq!(streak(&[], &clock(2024, 6, 15, 20)), 0);
    }

    #[test]
    fn test_streak_counts_back_from_today() {
        let c = clock(2024, 6, 15, 20);
        let sessions = vec![
            on(date(2024, 6, 15), 10),
            on(date(2024, 6, 14), 10),
            on(date(2024, 6, 13), 10),
            // gap on the 12th
            on(date(2024, 6, 11), 10),
        ];
        assert_eq!(streak(&sessions, &c), 3);
    }

    #[test]
    fn test_streak_tolerates_empty_today() {
        let c = clock(2024, 6, 15, 8);
        let sessions = vec![
            on(date(2024, 6, 14), 10),
            on(date(2024, 6, 13), 10),
            on(date(2024, 6, 12), 10),
        ];
        assert_eq!(streak(&sessions, &c), 3);
    }

    #[test]
    fn test_streak_zero_page_session_is_no_reading() {
        let c = clock(2024, 6, 15, 20);
        let sessions = vec![
            on(date(2024, 6, 15), 5),
            on(date(2024, 6, 14), 0),
            on(date(2024, 6, 13), 10),
        ];
        assert_eq!(streak(&sessions, &c), 1);

        // Two days ago does not rescue a missing yesterday
        let sessions = vec![on(date(2024, 6, 13), 10)];
        assert_eq!(streak(&sessions, &c), 0);
    }

    #[test]
    fn test_streak_aggregates_same_day_sessions() {
        let c = clock(2024, 6, 15, 20);
        let sessions = vec![
            on(date(2024, 6, 15), 0),
            on(date(2024, 6, 15), 3),
            on(date(2024, 6, 14), 2),
        ];
        assert_eq!(streak(&sessions, &c), 2);
    }

    #[test]
    fn test_longest_streak() {
        let sessions = vec![
            on(date(2024, 5, 1), 10),
            on(date(2024, 5, 2), 10),
            on(date(2024, 5, 3), 10),
            on(date(2024, 5, 4), 0),
            on(date(2024, 5, 10), 10),
            on(date(2024, 5, 11), 10),
        ];
        assert_eq!(longest_streak(&sessions), 3);
        assert_eq!(longest_streak(&[]), 0);
    }

    #[test]
    fn test_today_and_month_pages() {
        let c = clock(2024, 6, 15, 20);
        let mut sessions = vec![
            on(date(2024, 6, 15), 12),
            on(date(2024, 6, 15), 8),
            on(date(2024, 6, 1), 30),
            on(date(2024, 5, 31), 100),
        ];
        let mut broken = on(date(2024, 6, 2), 50);
        broken.date = "not-a-date".to_string();
        sessions.push(broken);

        assert_eq!(today_pages(&sessions, &c), 20);
        assert_eq!(month_pages(&sessions, &c), 50);

        // Order does not matter
        sessions.reverse();
        assert_eq!(month_pages(&sessions, &c), 50);
    }

    #[test]
    fn test_non_canonical_dates_never_match() {
        let c = clock(2024, 6, 15, 20);
        for text in ["2024-6-15", "2024-06-15 ", "+2024-06-15", "2024-06-5"] {
            let sessions = vec![raw(text, 40), on(date(2024, 6, 14), 10)];
            assert_eq!(today_pages(&sessions, &c), 0, "{text:?}");
            assert_eq!(month_pages(&sessions, &c), 10, "{text:?}");
            assert_eq!(pages_in_month(&sessions, 2024, 6), 10, "{text:?}");
            // Yesterday alone: today's unpadded row does not extend it
            assert_eq!(streak(&sessions, &c), 1, "{text:?}");
            assert_eq!(daily_totals(&sessions).len(), 1, "{text:?}");
        }

        let sessions = vec![raw("2024-6-15", 10), raw("2024-6-14", 10)];
        assert_eq!(streak(&sessions, &c), 0);
        assert_eq!(longest_streak(&sessions), 0);
    }

    #[test]
    fn test_pages_in_month() {
        let sessions = vec![
            on(date(2024, 6, 15), 12),
            on(date(2024, 5, 31), 100),
            on(date(2023, 5, 31), 7),
        ];
        assert_eq!(pages_in_month(&sessions, 2024, 5), 100);
        assert_eq!(pages_in_month(&sessions, 2024, 6), 12);
    }

    #[test]
    fn test_month_pace() {
        let c = clock(2024, 6, 7, 20);
        assert_eq!(month_pace(100, &c), 14.3);
        assert_eq!(month_pace(0, &c), 0.0);
        assert_eq!(month_pace(31, &clock(2024, 6, 1, 9)), 31.0);
    }

    #[test]
    fn test_goal_progress() {
        assert_eq!(daily_goal_progress(10, Some(20)), 50);
        assert_eq!(daily_goal_progress(45, Some(20)), 100);
        assert_eq!(daily_goal_progress(10, None), 0);
        assert_eq!(daily_goal_progress(10, Some(0)), 0);
        assert_eq!(daily_goal_progress(1, Some(3)), 33);
        assert_eq!(monthly_goal_progress(250, Some(500)), 50);
    }

    #[test]
    fn test_metrics_are_idempotent() {
        let c = clock(2024, 6, 15, 20);
        let sessions = vec![on(date(2024, 6, 15), 12), on(date(2024, 6, 14), 8)];
        assert_eq!(streak(&sessions, &c), streak(&sessions, &c));
        assert_eq!(month_pages(&sessions, &c), month_pages(&sessions, &c));
        assert_eq!(
            month_pace(month_pages(&sessions, &c), &c).to_bits(),
            month_pace(month_pages(&sessions, &c), &c).to_bits()
        );
    }
}

//! Dashboard analytics for the home screen.
//!
//! Bundles the headline numbers (today, month, pace, streak, goal progress)
//! and the per-day series behind the month-to-date bar chart.

use chrono::Datelike;
use chrono::NaiveDate;
use serde::Serialize;

use super::metrics::{self, daily_totals};
use crate::clock::Clock;
use crate::types::{Goal, ReadingSession};

/// Headline reading numbers.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DashboardStats {
    /// Pages read today
    pub today_pages: u64,
    /// Pages read since the first of the month
    pub month_pages: u64,
    /// Average pages per day this month
    pub pace: f64,
    /// Current consecutive reading days
    pub streak: u32,
    /// Today's progress toward the active daily goal (0-100)
    pub daily_goal_progress: u32,
    /// Month's progress toward the active monthly goal (0-100)
    pub monthly_goal_progress: u32,
}

impl DashboardStats {
    pub fn compute(sessions: &[ReadingSession], goal: Option<&Goal>, clock: &Clock) -> Self {
        let today_pages = metrics::today_pages(sessions, clock);
        let month_pages = metrics::month_pages(sessions, clock);

        Self {
            today_pages,
            month_pages,
            pace: metrics::month_pace(month_pages, clock),
            streak: metrics::streak(sessions, clock),
            daily_goal_progress: metrics::daily_goal_progress(
                today_pages,
                goal.map(|g| g.daily_pages),
            ),
            monthly_goal_progress: metrics::monthly_goal_progress(
                month_pages,
                goal.map(|g| g.monthly_pages),
            ),
        }
    }
}

/// Pages read on one day of the current month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayPages {
    pub date: NaiveDate,
    /// Day of month (1-31)
    pub day: u32,
    pub pages: u64,
    pub is_today: bool,
}

/// One entry per day of the current month, first to last.
pub fn month_daily_series(sessions: &[ReadingSession], clock: &Clock) -> Vec<DayPages> {
    let totals = daily_totals(sessions);
    let today = clock.today();

    clock
        .first_of_month()
        .iter_days()
        .take(clock.days_in_month() as usize)
        .map(|date| DayPages {
            date,
            day: date.day(),
            pages: totals.get(&date).copied().unwrap_or(0),
            is_today: date == today,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::testing::{clock, date, on};
    use chrono::Utc;

    fn goal(daily: u32, monthly: u32) -> Goal {
        Goal {
            id: 1,
            daily_pages: daily,
            monthly_pages: monthly,
            suggested_daily_pages: None,
            suggested_monthly_pages: None,
            suggested_reason: None,
            active: true,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_compute_dashboard() {
        let c = clock(2024, 6, 10, 21);
        let sessions = vec![
            on(date(2024, 6, 10), 15),
            on(date(2024, 6, 9), 20),
            on(date(2024, 6, 8), 15),
            on(date(2024, 5, 30), 40),
        ];

        let stats = DashboardStats::compute(&sessions, Some(&goal(30, 500)), &c);
        assert_eq!(stats.today_pages, 15);
        assert_eq!(stats.month_pages, 50);
        assert_eq!(stats.pace, 5.0);
        assert_eq!(stats.streak, 3);
        assert_eq!(stats.daily_goal_progress, 50);
        assert_eq!(stats.monthly_goal_progress, 10);
    }

    #[test]
    fn test_compute_without_goal() {
        let c = clock(2024, 6, 10, 21);
        let stats = DashboardStats::compute(&[], None, &c);
        assert_eq!(stats, DashboardStats::default());
    }

    #[test]
    fn test_month_daily_series() {
        let c = clock(2024, 2, 10, 21);
        let sessions = vec![
            on(date(2024, 2, 10), 7),
            on(date(2024, 2, 10), 3),
            on(date(2024, 2, 1), 4),
            on(date(2024, 1, 31), 99),
        ];

        let series = month_daily_series(&sessions, &c);
        assert_eq!(series.len(), 29);
        assert_eq!(series[0].day, 1);
        assert_eq!(series[0].pages, 4);
        assert_eq!(series[9].pages, 10);
        assert!(series[9].is_today);
        assert_eq!(series.iter().filter(|d| d.is_today).count(), 1);
        assert_eq!(series[28].date, date(2024, 2, 29));
    }
}

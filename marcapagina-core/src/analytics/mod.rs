//! Reading metrics and insights
//!
//! Stateless calculators over a snapshot of the reader's log:
//! - Streaks, today/month totals and pace ([`metrics`])
//! - Dashboard bundle and the month-to-date chart series ([`dashboard`])
//! - Time-of-day, weekday and weekly trend insights ([`insights`])
//! - Habit and book recommendations ([`recommendations`])
//! - Goal suggestions from the last 14 days ([`goals`])
//! - The monthly narrative "story" ([`story`])
//!
//! Every function takes the sessions/books it needs plus a [`Clock`](crate::Clock)
//! and never touches storage, so the same snapshot always yields the same result.

pub mod dashboard;
pub mod goals;
pub mod insights;
pub mod metrics;
pub mod recommendations;
pub mod story;

pub use dashboard::{month_daily_series, DashboardStats, DayPages};
pub use goals::{calculate_goal_suggestion, GoalSuggestion, SuggestionTier};
pub use insights::{
    all_insights, consistency_insight, time_insight, trend_insight, DayPeriod, Insight,
    InsightIcon, InsightKind, InsightSignal,
};
pub use metrics::{
    daily_goal_progress, longest_streak, month_pace, month_pages, monthly_goal_progress, streak,
    today_pages,
};
pub use recommendations::{
    all_recommendations, book_recommendations, habit_recommendations, Recommendation,
    RecommendationAction,
};
pub use story::{generate_story, StoryData};

/// Round half up, matching how percentages are shown elsewhere in the app
/// (-12.5 becomes -12, 12.5 becomes 13).
pub(crate) fn round_half_up(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}

/// Round to one decimal place.
pub(crate) fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Index and value of the largest entry; the earliest one wins ties.
pub(crate) fn first_max<T: PartialOrd + Copy>(values: &[T]) -> Option<(usize, T)> {
    let mut best: Option<(usize, T)> = None;
    for (i, &value) in values.iter().enumerate() {
        match best {
            Some((_, current)) if value <= current => {}
            _ => best = Some((i, value)),
        }
    }
    best
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_half_up() {
        assert_eq!(round_half_up(12.5), 13);
        assert_eq!(round_half_up(-12.5), -12);
        assert_eq!(round_half_up(-12.6), -13);
        assert_eq!(round_half_up(0.0), 0);
    }

    #[test]
    fn test_first_max_prefers_earliest() {
        assert_eq!(first_max(&[1, 4, 4, 2]), Some((1, 4)));
        assert_eq!(first_max(&[0u32, 0, 0]), Some((0, 0)));
        assert_eq!(first_max::<u32>(&[]), None);
    }

    #[test]
    fn test_round_one_decimal() {
        assert_eq!(round_one_decimal(14.2857), 14.3);
        assert_eq!(round_one_decimal(10.0), 10.0);
    }
}

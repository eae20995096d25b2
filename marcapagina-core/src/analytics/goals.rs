//! Goal suggestions from the last two weeks of reading.
//!
//! The daily suggestion scales the 14-day average by how many of those days
//! had any reading at all. The monthly suggestion projects the daily one over
//! the rest of the month, with a ceiling so one huge day early in the month
//! does not produce an absurd target.

use chrono::Duration;
use serde::Serialize;

use super::metrics::daily_totals;
use super::round_one_decimal;
use crate::clock::Clock;
use crate::types::{NewGoal, ReadingSession};

const WINDOW_DAYS: i64 = 14;
const MIN_DAILY_PAGES: u32 = 3;
const MIN_PROJECTED_MONTHLY: f64 = 30.0;

/// How ambitious the suggestion is, based on consistency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionTier {
    /// 8+ reading days in the window: +15%
    StrongPace,
    /// 4-7 reading days: +5%
    GoodConsistency,
    /// Fewer than 4: back to basics
    Rebuild,
}

impl SuggestionTier {
    fn from_consistency(reading_days: u32) -> Self {
        match reading_days {
            8.. => SuggestionTier::StrongPace,
            4..=7 => SuggestionTier::GoodConsistency,
            _ => SuggestionTier::Rebuild,
        }
    }

    pub fn reason(&self) -> &'static str {
        match self {
            SuggestionTier::StrongPace => "Ritmo forte! Aumentamos 15% para te desafiar.",
            SuggestionTier::GoodConsistency => {
                "Boa consistência. Um leve aumento de 5% para crescer."
            }
            SuggestionTier::Rebuild => "Vamos retomar o hábito com uma meta mais realista.",
        }
    }

    fn daily_from_average(&self, average: f64) -> u32 {
        match self {
            SuggestionTier::StrongPace => (average * 1.15).ceil() as u32,
            SuggestionTier::GoodConsistency => (average * 1.05).ceil() as u32,
            SuggestionTier::Rebuild => (average.ceil() as u32).max(MIN_DAILY_PAGES),
        }
    }
}

/// Suggested daily and monthly targets.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GoalSuggestion {
    pub suggested_daily: u32,
    pub suggested_monthly: u64,
    pub tier: SuggestionTier,
    pub reason: String,
    /// Days with reading in the last 14
    pub consistency: u32,
    /// Average pages per day over the last 14, one decimal
    pub average: f64,
}

/// Suggest goals from the trailing 14 days (today inclusive).
///
/// The average always divides by 14, so an inactive stretch pulls it down.
pub fn calculate_goal_suggestion(
    sessions: &[ReadingSession],
    current_month_pages: u64,
    clock: &Clock,
) -> GoalSuggestion {
    let totals = daily_totals(sessions);
    let today = clock.today();

    let mut total = 0u64;
    let mut consistency = 0u32;
    for offset in 0..WINDOW_DAYS {
        let Some(day) = today.checked_sub_signed(Duration::days(offset)) else {
            break;
        };
        let pages = totals.get(&day).copied().unwrap_or(0);
        total += pages;
        if pages > 0 {
            consistency += 1;
        }
    }

    let average = total as f64 / WINDOW_DAYS as f64;
    let tier = SuggestionTier::from_consistency(consistency);
    let suggested_daily = tier.daily_from_average(average);

    let mut suggested_monthly = current_month_pages
        + u64::from(suggested_daily) * u64::from(clock.days_remaining_in_month());

    // Never clamp below what has already been read
    let max_projected = MIN_PROJECTED_MONTHLY.max(average * 30.0 * 1.5);
    if suggested_monthly as f64 > max_projected && (current_month_pages as f64) < max_projected {
        suggested_monthly = max_projected.ceil() as u64;
    }

    GoalSuggestion {
        suggested_daily,
        suggested_monthly,
        tier,
        reason: tier.reason().to_string(),
        consistency,
        average: round_one_decimal(average),
    }
}

impl NewGoal {
    /// Goal that adopts a suggestion and remembers where it came from.
    pub fn from_suggestion(suggestion: &GoalSuggestion) -> Self {
        let monthly = u32::try_from(suggestion.suggested_monthly).unwrap_or(u32::MAX);
        Self {
            daily_pages: suggestion.suggested_daily,
            monthly_pages: monthly,
            suggested_daily_pages: Some(suggestion.suggested_daily),
            suggested_monthly_pages: Some(monthly),
            suggested_reason: Some(suggestion.reason.clone()),
        }
    }
}

impl From<&GoalSuggestion> for NewGoal {
    fn from(suggestion: &GoalSuggestion) -> Self {
        NewGoal::from_suggestion(suggestion)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::testing::{clock, date, on, raw};

    /// `pages` on each of the `days` most recent days ending on June 20th.
    fn recent(days: u32, pages: u32) -> Vec<ReadingSession> {
        (0..days).map(|i| on(date(2024, 6, 20 - i), pages)).collect()
    }

    #[test]
    fn test_no_reading_floors_at_three() {
        let c = clock(2024, 6, 20, 12);
        let suggestion = calculate_goal_suggestion(&[], 0, &c);
        assert_eq!(suggestion.suggested_daily, 3);
        assert_eq!(suggestion.consistency, 0);
        assert_eq!(suggestion.average, 0.0);
        assert_eq!(suggestion.tier, SuggestionTier::Rebuild);
        // 3 x 11 remaining days = 33, clamped to the 30 page floor
        assert_eq!(suggestion.suggested_monthly, 30);
    }

    #[test]
    fn test_strong_pace() {
        let c = clock(2024, 6, 20, 12);
        // 10 days x 28 pages = 280 over 14 days, average 20
        let sessions = recent(10, 28);

        let suggestion = calculate_goal_suggestion(&sessions, 280, &c);
        assert_eq!(suggestion.suggested_daily, 23);
        assert_eq!(suggestion.tier, SuggestionTier::StrongPace);
        assert_eq!(suggestion.reason, "Ritmo forte! Aumentamos 15% para te desafiar.");
        assert_eq!(suggestion.consistency, 10);
        assert_eq!(suggestion.average, 20.0);
        // 280 + 23 x 11
        assert_eq!(suggestion.suggested_monthly, 533);
    }

    #[test]
    fn test_good_consistency() {
        let c = clock(2024, 6, 20, 12);
        let sessions = recent(5, 28);

        let suggestion = calculate_goal_suggestion(&sessions, 140, &c);
        assert_eq!(suggestion.tier, SuggestionTier::GoodConsistency);
        assert_eq!(suggestion.consistency, 5);
        // average 10, x1.05 = 10.5
        assert_eq!(suggestion.suggested_daily, 11);
        assert_eq!(suggestion.average, 10.0);
    }

    #[test]
    fn test_non_canonical_dates_add_no_consistency() {
        let c = clock(2024, 6, 20, 12);
        let sessions = vec![
            raw("2024-6-20", 50),
            raw("2024-06-19 ", 50),
            raw("+2024-06-18", 50),
            on(date(2024, 6, 17), 14),
        ];
        let suggestion = calculate_goal_suggestion(&sessions, 14, &c);
        assert_eq!(suggestion.consistency, 1);
        assert_eq!(suggestion.average, 1.0);
        assert_eq!(suggestion.tier, SuggestionTier::Rebuild);
        assert_eq!(suggestion.suggested_daily, 3);
    }

    #[test]
    fn test_window_ignores_older_sessions() {
        let c = clock(2024, 6, 20, 12);
        let sessions = vec![on(date(2024, 6, 6), 500), on(date(2024, 6, 7), 14)];
        let suggestion = calculate_goal_suggestion(&sessions, 514, &c);
        assert_eq!(suggestion.consistency, 1);
        assert_eq!(suggestion.average, 1.0);
    }

    #[test]
    fn test_monthly_clamped_to_projection() {
        let c = clock(2024, 6, 20, 12);
        let sessions = recent(10, 28);

        // 800 + 253 exceeds 20 x 30 x 1.5 = 900
        let suggestion = calculate_goal_suggestion(&sessions, 800, &c);
        assert_eq!(suggestion.suggested_monthly, 900);

        // Already past the ceiling: no clamp
        let suggestion = calculate_goal_suggestion(&sessions, 950, &c);
        assert_eq!(suggestion.suggested_monthly, 950 + 23 * 11);
    }

    #[test]
    fn test_new_goal_from_suggestion() {
        let c = clock(2024, 6, 20, 12);
        let suggestion = calculate_goal_suggestion(&recent(10, 28), 280, &c);
        let goal = NewGoal::from(&suggestion);
        assert_eq!(goal.daily_pages, 23);
        assert_eq!(goal.monthly_pages, 533);
        assert_eq!(goal.suggested_daily_pages, Some(23));
        assert_eq!(goal.suggested_monthly_pages, Some(533));
        assert_eq!(goal.suggested_reason.as_deref(), Some(suggestion.reason.as_str()));
    }

    #[test]
    fn test_suggestion_is_idempotent() {
        let c = clock(2024, 6, 20, 12);
        let sessions = recent(6, 17);
        assert_eq!(
            calculate_goal_suggestion(&sessions, 102, &c),
            calculate_goal_suggestion(&sessions, 102, &c)
        );
    }
}

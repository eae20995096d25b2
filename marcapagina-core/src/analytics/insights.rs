//! Reading-pattern insights.
//!
//! Three independent detectors, each producing at most one [`Insight`]:
//! favourite time of day, most consistent weekday, and a week-over-week
//! increase. They only ever encourage; a slowing pace produces nothing.

use chrono::{Datelike, Duration, Timelike, Weekday};
use serde::{Deserialize, Serialize};

use super::{first_max, round_half_up};
use crate::clock::Clock;
use crate::format::{weekday_from_sunday, weekday_plural};
use crate::types::ReadingSession;

const MIN_SESSIONS_TIME: usize = 3;
const MIN_SESSIONS_CONSISTENCY: usize = 10;
const MIN_SESSIONS_TREND: usize = 5;

/// Part of the day a session was logged in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayPeriod {
    /// 00:00-05:59
    Madrugada,
    /// 06:00-11:59
    Manha,
    /// 12:00-17:59
    Tarde,
    /// 18:00-23:59
    Noite,
}

impl DayPeriod {
    /// Declared order; earlier periods win ties.
    pub const ALL: [DayPeriod; 4] = [
        DayPeriod::Madrugada,
        DayPeriod::Manha,
        DayPeriod::Tarde,
        DayPeriod::Noite,
    ];

    pub fn from_hour(hour: u32) -> Self {
        match hour {
            0..=5 => DayPeriod::Madrugada,
            6..=11 => DayPeriod::Manha,
            12..=17 => DayPeriod::Tarde,
            _ => DayPeriod::Noite,
        }
    }

    /// Bare name ("manhã").
    pub fn name(&self) -> &'static str {
        match self {
            DayPeriod::Madrugada => "madrugada",
            DayPeriod::Manha => "manhã",
            DayPeriod::Tarde => "tarde",
            DayPeriod::Noite => "noite",
        }
    }

    /// Adverbial phrase ("pela manhã").
    pub fn phrase(&self) -> &'static str {
        match self {
            DayPeriod::Madrugada => "na madrugada",
            DayPeriod::Manha => "pela manhã",
            DayPeriod::Tarde => "durante a tarde",
            DayPeriod::Noite => "à noite",
        }
    }

    pub fn is_dark(&self) -> bool {
        matches!(self, DayPeriod::Madrugada | DayPeriod::Noite)
    }

    pub(crate) fn index(&self) -> usize {
        match self {
            DayPeriod::Madrugada => 0,
            DayPeriod::Manha => 1,
            DayPeriod::Tarde => 2,
            DayPeriod::Noite => 3,
        }
    }
}

/// Which detector produced an insight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightKind {
    Time,
    Consistency,
    Trend,
}

impl InsightKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            InsightKind::Time => "time",
            InsightKind::Consistency => "consistency",
            InsightKind::Trend => "trend",
        }
    }
}

/// Icon tag rendered next to an insight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum InsightIcon {
    Moon,
    Sun,
    Calendar,
    TrendingUp,
}

impl InsightIcon {
    pub fn as_str(&self) -> &'static str {
        match self {
            InsightIcon::Moon => "Moon",
            InsightIcon::Sun => "Sun",
            InsightIcon::Calendar => "Calendar",
            InsightIcon::TrendingUp => "TrendingUp",
        }
    }
}

/// The observation behind an insight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InsightSignal {
    /// Most sessions fall in this part of the day
    Time { period: DayPeriod },
    /// Most sessions fall on this weekday
    Consistency { weekday: Weekday, weekend: bool },
    /// This week's pages beat last week's by this much
    Trend { increase_percent: i64 },
}

/// A derived observation shown to encourage the habit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Insight {
    #[serde(flatten)]
    pub signal: InsightSignal,
    pub title: String,
    pub description: String,
    pub icon: InsightIcon,
}

impl Insight {
    pub fn kind(&self) -> InsightKind {
        match self.signal {
            InsightSignal::Time { .. } => InsightKind::Time,
            InsightSignal::Consistency { .. } => InsightKind::Consistency,
            InsightSignal::Trend { .. } => InsightKind::Trend,
        }
    }
}

/// Part of the day with the most sessions (needs 3+ sessions).
pub fn time_insight(sessions: &[ReadingSession], clock: &Clock) -> Option<Insight> {
    if sessions.len() < MIN_SESSIONS_TIME {
        return None;
    }

    let mut counts = [0u32; 4];
    for created_at in sessions.iter().filter_map(|s| s.created_at) {
        let hour = clock.to_local(created_at).hour();
        counts[DayPeriod::from_hour(hour).index()] += 1;
    }

    let (best, count) = first_max(&counts)?;
    if count == 0 {
        return None;
    }

    let period = DayPeriod::ALL[best];
    Some(Insight {
        signal: InsightSignal::Time { period },
        title: format!("Leitor {}", period.phrase()),
        description: format!(
            "Seu horário mais produtivo é {}. Tente proteger esse tempo!",
            period.phrase()
        ),
        icon: if period.is_dark() {
            InsightIcon::Moon
        } else {
            InsightIcon::Sun
        },
    })
}

/// Weekday with the most sessions (needs 10+ sessions over 2+ weekdays).
pub fn consistency_insight(sessions: &[ReadingSession], clock: &Clock) -> Option<Insight> {
    if sessions.len() < MIN_SESSIONS_CONSISTENCY {
        return None;
    }

    let mut counts = [0u32; 7];
    for created_at in sessions.iter().filter_map(|s| s.created_at) {
        let weekday = clock.to_local(created_at).weekday();
        counts[weekday.num_days_from_sunday() as usize] += 1;
    }

    // A single weekday says nothing about consistency
    if counts.iter().filter(|&&c| c > 0).count() < 2 {
        return None;
    }

    let (best, _) = first_max(&counts)?;
    let weekday = weekday_from_sunday(best);
    let weekend = matches!(weekday, Weekday::Sat | Weekday::Sun);

    Some(Insight {
        signal: InsightSignal::Consistency { weekday, weekend },
        title: if weekend {
            "Foco no final de semana".to_string()
        } else {
            "Foco nos dias úteis".to_string()
        },
        description: format!(
            "{} costumam ser seus dias mais consistentes de leitura.",
            weekday_plural(weekday)
        ),
        icon: InsightIcon::Calendar,
    })
}

/// Week-over-week page increase (needs 5+ sessions and a non-empty last week).
pub fn trend_insight(sessions: &[ReadingSession], clock: &Clock) -> Option<Insight> {
    if sessions.len() < MIN_SESSIONS_TREND {
        return None;
    }

    let now = clock.now_utc();
    let week = Duration::days(7);
    let mut this_week = 0u64;
    let mut last_week = 0u64;

    for session in sessions {
        let Some(created_at) = session.created_at else {
            continue;
        };
        let age = now - created_at;
        if age <= week {
            this_week += u64::from(session.pages_read);
        } else if age <= week * 2 {
            last_week += u64::from(session.pages_read);
        }
    }

    if this_week <= last_week || last_week == 0 {
        return None;
    }

    let increase_percent =
        round_half_up((this_week - last_week) as f64 / last_week as f64 * 100.0);

    Some(Insight {
        signal: InsightSignal::Trend { increase_percent },
        title: "Ritmo em alta".to_string(),
        description: format!(
            "Você leu {}% mais páginas esta semana em comparação com a anterior.",
            increase_percent
        ),
        icon: InsightIcon::TrendingUp,
    })
}

/// All insights, in the order time, consistency, trend.
pub fn all_insights(sessions: &[ReadingSession], clock: &Clock) -> Vec<Insight> {
    [
        time_insight(sessions, clock),
        consistency_insight(sessions, clock),
        trend_insight(sessions, clock),
    ]
    .into_iter()
    .flatten()
    .collect()
}

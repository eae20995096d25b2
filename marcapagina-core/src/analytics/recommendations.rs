//! Habit and book recommendations.
//!
//! Each source yields at most one recommendation. Habit tips come from the
//! insights; book tips nudge the reader back to a book in progress.

use chrono::Duration;
use serde::Serialize;

use super::insights::{DayPeriod, Insight, InsightSignal};
use crate::clock::Clock;
use crate::types::{Book, BookStatus};

/// Days without an update before a book in progress counts as stalled.
const STALE_BOOK_DAYS: i64 = 10;

/// An actionable suggestion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Recommendation {
    pub title: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<RecommendationAction>,
}

/// Pointer to the book a recommendation is about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecommendationAction {
    pub label: String,
    pub book_id: String,
}

impl RecommendationAction {
    fn open_book(book: &Book) -> Self {
        Self {
            label: "Ver livro".to_string(),
            book_id: book.id.clone(),
        }
    }
}

fn habit_for(insight: &Insight) -> Option<Recommendation> {
    let (title, description) = match insight.signal {
        InsightSignal::Time {
            period: DayPeriod::Noite,
        } => (
            "Proteja seus 15 min",
            "Já que você lê melhor à noite, tente colocar um lembrete para as 21:30.",
        ),
        InsightSignal::Time {
            period: DayPeriod::Manha,
        } => (
            "Café com leitura",
            "Aproveite seu café para avançar pelo menos 5 páginas.",
        ),
        InsightSignal::Consistency { weekend: true, .. } => (
            "Doses diárias",
            "Tente ler apenas 5 páginas na segunda-feira para manter o hábito vivo após o domingo.",
        ),
        _ => return None,
    };

    Some(Recommendation {
        title: title.to_string(),
        description: description.to_string(),
        action: None,
    })
}

/// First habit tip matching the insights, in insight order.
pub fn habit_recommendations(insights: &[Insight]) -> Vec<Recommendation> {
    insights.iter().filter_map(habit_for).take(1).collect()
}

/// A stalled book in progress, or else the first book in progress.
pub fn book_recommendations(books: &[Book], clock: &Clock) -> Vec<Recommendation> {
    let now = clock.now_utc();
    let stale_after = Duration::days(STALE_BOOK_DAYS);
    let mut reading = books.iter().filter(|b| b.status == BookStatus::Reading);

    if let Some(book) = reading
        .clone()
        .find(|b| now - b.updated_at > stale_after)
    {
        return vec![Recommendation {
            title: "Vamos retomar?".to_string(),
            description: format!(
                "\"{}\" está na mesma página há {} dias. Tente ler só 2 páginas hoje.",
                book.title, STALE_BOOK_DAYS
            ),
            action: Some(RecommendationAction::open_book(book)),
        }];
    }

    reading
        .next()
        .map(|book| Recommendation {
            title: "Meta de curto prazo".to_string(),
            description: "Que tal tentar terminar este capítulo ainda hoje?".to_string(),
            action: Some(RecommendationAction::open_book(book)),
        })
        .into_iter()
        .collect()
}

/// Habit recommendations followed by book recommendations.
pub fn all_recommendations(
    insights: &[Insight],
    books: &[Book],
    clock: &Clock,
) -> Vec<Recommendation> {
    let mut recommendations = habit_recommendations(insights);
    recommendations.extend(book_recommendations(books, clock));
    recommendations
}

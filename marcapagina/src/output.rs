//! Terminal and JSON rendering for the CLI.

use anyhow::{Context, Result};
use marcapagina_core::analytics::{
    DashboardStats, DayPages, GoalSuggestion, Insight, InsightIcon, Recommendation, StoryData,
};
use marcapagina_core::format::{capitalize_first, format_delta, progress_bar};
use marcapagina_core::{Book, Goal, Highlight, LoggedSession, ReadingSession};
use serde::Serialize;

const BAR_WIDTH: usize = 20;
const CHART_WIDTH: u64 = 30;

/// Everything the dashboard shows.
#[derive(Debug, Serialize)]
pub struct DashboardReport {
    pub stats: DashboardStats,
    pub daily_goal: Option<u32>,
    pub month: Vec<DayPages>,
    pub insights: Vec<Insight>,
    pub recommendations: Vec<Recommendation>,
    pub reading: Vec<Book>,
}

/// The goals screen: current goal, progress and a fresh suggestion.
#[derive(Debug, Serialize)]
pub struct GoalsReport {
    pub goal: Option<Goal>,
    pub stats: DashboardStats,
    pub suggestion: GoalSuggestion,
}

pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("failed to serialize output")?;
    println!("{}", json);
    Ok(())
}

/// First 8 characters of an id, enough for prefix lookups.
pub fn short_id(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}

fn plural<'a>(n: u64, one: &'a str, many: &'a str) -> &'a str {
    if n == 1 {
        one
    } else {
        many
    }
}

fn pages(n: u64) -> String {
    format!("{} {}", n, plural(n, "página", "páginas"))
}

fn days(n: u64) -> String {
    format!("{} {}", n, plural(n, "dia", "dias"))
}

fn icon_glyph(icon: InsightIcon) -> &'static str {
    match icon {
        InsightIcon::Moon => "🌙",
        InsightIcon::Sun => "☀️",
        InsightIcon::Calendar => "📅",
        InsightIcon::TrendingUp => "📈",
    }
}

pub fn print_logged(logged: &LoggedSession) {
    let book = &logged.book;
    println!(
        "Sessão registrada: +{} em \"{}\" (pág {} de {})",
        pages(u64::from(logged.session.pages_read)),
        book.title,
        book.current_page,
        book.total_pages
    );
    if let Some(minutes) = logged.session.duration_minutes {
        println!("Tempo de leitura: {} min", minutes);
    }
    if logged.finished {
        println!("Parabéns! Você terminou \"{}\"!", book.title);
    }
}

fn book_line(book: &Book) -> String {
    let author = book
        .author
        .as_deref()
        .map(|a| format!(" ({})", a))
        .unwrap_or_default();
    let progress = if book.status.tracks_progress() {
        format!(
            "  pág {} de {} ({}%)",
            book.current_page,
            book.total_pages,
            book.progress_percent()
        )
    } else {
        format!("  {}", pages(u64::from(book.total_pages)))
    };
    format!(
        "[{}] {}{}  {}{}",
        short_id(&book.id),
        book.title,
        author,
        book.status.label(),
        progress
    )
}

pub fn print_book_list(books: &[Book]) {
    if books.is_empty() {
        println!("Nenhum livro na estante ainda.");
        return;
    }
    for book in books {
        println!("{}", book_line(book));
    }
}

pub fn print_book_detail(book: &Book, sessions: &[ReadingSession], highlights: &[Highlight]) {
    println!("{}", book.title);
    if let Some(author) = &book.author {
        println!("{}", author);
    }
    println!("Status: {}", book.status.label());
    println!("ID: {}", book.id);

    if book.status.tracks_progress() {
        println!();
        println!(
            "{} {}%",
            progress_bar(book.progress_percent(), BAR_WIDTH),
            book.progress_percent()
        );
        println!("Página {} de {}", book.current_page, book.total_pages);
    }

    println!();
    println!("Sessões");
    if sessions.is_empty() {
        println!("  Nenhuma sessão registrada para este livro.");
    }
    for session in sessions {
        let minutes = session
            .duration_minutes
            .map(|m| format!(" em {} min", m))
            .unwrap_or_default();
        println!(
            "  {}  {}{}",
            session.date,
            pages(u64::from(session.pages_read)),
            minutes
        );
    }

    println!();
    print_highlights(highlights);
}

pub fn print_highlights(highlights: &[Highlight]) {
    println!("Trechos");
    if highlights.is_empty() {
        println!("  Nenhum trecho salvo.");
        return;
    }
    for highlight in highlights {
        let page = highlight
            .page
            .map(|p| format!(" (pág {})", p))
            .unwrap_or_default();
        println!(
            "  [{}] \"{}\"{}",
            short_id(&highlight.id),
            highlight.content,
            page
        );
    }
}

pub fn print_dashboard(report: &DashboardReport) {
    let stats = &report.stats;

    println!("Pronto para mais um capítulo?");
    println!();
    println!("  Hoje:        {}", pages(stats.today_pages));
    println!("  Mensal:      {}", pages(stats.month_pages));
    println!("  Págs / Dia:  {:.1}", stats.pace);
    println!("  Sequência:   {}", days(u64::from(stats.streak)));
    println!();

    println!("Foco Diário");
    match report.daily_goal {
        Some(goal) => println!(
            "  {} {}%  ({} / {})",
            progress_bar(stats.daily_goal_progress, BAR_WIDTH),
            stats.daily_goal_progress,
            stats.today_pages,
            pages(u64::from(goal))
        ),
        None => println!("  Nenhuma meta definida. Use `marcapagina goals` para criar uma."),
    }
    println!();

    print_month_chart(&report.month);

    if !report.reading.is_empty() {
        println!("Lendo agora");
        for book in &report.reading {
            println!("  {}", book_line(book));
        }
        println!();
    }

    if !report.insights.is_empty() || !report.recommendations.is_empty() {
        println!("Insights & Dicas");
        for insight in &report.insights {
            println!("  {} {}", icon_glyph(insight.icon), insight.title);
            println!("     {}", insight.description);
        }
        for rec in &report.recommendations {
            println!("  💡 {}", rec.title);
            println!("     {}", rec.description);
            if let Some(action) = &rec.action {
                println!("     {}: marcapagina book show {}", action.label, short_id(&action.book_id));
            }
        }
    }
}

fn print_month_chart(month: &[DayPages]) {
    let max = month.iter().map(|d| d.pages).max().unwrap_or(0);
    if max == 0 {
        return;
    }

    println!("Este mês");
    for day in month {
        let width = ((day.pages * CHART_WIDTH + max - 1) / max) as usize;
        let marker = if day.is_today { " ← hoje" } else { "" };
        println!("  {:>2} {} {}{}", day.day, "▇".repeat(width), day.pages, marker);
    }
    println!();
}

pub fn print_goals(report: &GoalsReport) {
    let stats = &report.stats;

    println!("Progresso Atual");
    match &report.goal {
        Some(goal) => {
            println!(
                "  Meta Diária:  {:<14} {} {}%",
                pages(u64::from(goal.daily_pages)),
                progress_bar(stats.daily_goal_progress, BAR_WIDTH),
                stats.daily_goal_progress
            );
            println!(
                "  Meta Mensal:  {:<14} {} {}%",
                pages(u64::from(goal.monthly_pages)),
                progress_bar(stats.monthly_goal_progress, BAR_WIDTH),
                stats.monthly_goal_progress
            );
        }
        None => println!("  Nenhuma meta definida."),
    }
    println!();

    let suggestion = &report.suggestion;
    println!("Sugestão Inteligente");
    println!("  Diária: {}", pages(u64::from(suggestion.suggested_daily)));
    println!("  Mensal: {}", pages(suggestion.suggested_monthly));
    println!("  {}", suggestion.reason);
    println!(
        "  ({} de 14 dias com leitura, média de {:.1} págs/dia)",
        suggestion.consistency, suggestion.average
    );
    println!();
    println!("Use `marcapagina goals apply` para aplicar a sugestão.");
}

pub fn print_story(story: &StoryData) {
    println!("Sua História 📖");
    println!();

    let comparison = if story.last_month_pages > 0 {
        format!(
            " ({} vs. mês anterior)",
            format_delta(story.month_comparison_percent)
        )
    } else {
        String::new()
    };
    card(
        "Resumo do Mês",
        &format!("{}{}", pages(story.current_month_pages), comparison),
        "Neste mês você construiu mais um capítulo do seu hábito de leitura.",
    );

    card(
        "Sua Consistência",
        &days(u64::from(story.unique_days_read_this_month)),
        &format!(
            "Dias de leitura registrados nos primeiros {} dias do mês.",
            story.days_passed_in_month
        ),
    );

    card(
        "O Dia Favorito",
        &capitalize_first(story.best_day_name),
        "Seu desempenho máximo tende a acontecer com mais frequência neste dia.",
    );

    card(
        "Horário Forte",
        &capitalize_first(story.best_time_name),
        &format!(
            "Os dados mostram que você constrói o hábito melhor no período da {}.",
            story.best_time_name
        ),
    );

    card(
        "Maior Sequência",
        &format!(
            "{} (recorde: {})",
            days(u64::from(story.current_streak)),
            days(u64::from(story.longest_streak))
        ),
        "A sua persistência e vontade de prosseguir em chamas.",
    );

    card(
        "Livros Finalizados",
        &story.finished_books_count.to_string(),
        "Histórias concluídas com sucesso. Quantas vidas mais você quer viver dentro das páginas?",
    );
}

fn card(title: &str, value: &str, description: &str) {
    println!("{}", title);
    println!("  {}", value);
    println!("  {}", description);
    println!();
}

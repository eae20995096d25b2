//! marcapagina - reading habit tracker CLI
//!
//! Log reading sessions, keep a shelf of books and highlights, and see
//! streaks, pace, insights, goal suggestions and the monthly story.

mod output;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use marcapagina_core::analytics::{
    all_insights, all_recommendations, calculate_goal_suggestion, generate_story,
    month_daily_series, DashboardStats,
};
use marcapagina_core::export::{default_export_file_name, export_snapshot};
use marcapagina_core::{BookStatus, Clock, Config, Database, NewBook, NewGoal};

#[derive(Parser, Debug)]
#[command(name = "marcapagina")]
#[command(about = "Acompanhe seu hábito de leitura")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Manage books on the shelf
    #[command(subcommand)]
    Book(BookCommand),

    /// Log pages read today
    Log {
        /// Book ID (a unique prefix is enough)
        book: String,
        /// Pages read in this session
        pages: u32,
        /// Minutes spent reading
        #[arg(short, long)]
        minutes: Option<u32>,
    },

    /// Save and browse highlights
    #[command(subcommand)]
    Highlight(HighlightCommand),

    /// Today, this month, streak and insights
    Dashboard(FormatArgs),

    /// Reading goals and suggestions
    Goals {
        #[command(subcommand)]
        command: Option<GoalsCommand>,
    },

    /// The story of your reading month
    Story(FormatArgs),

    /// Export all data as JSON
    Export {
        /// Output file (default: marcapagina-export-YYYY-MM-DD.json)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand, Debug)]
enum BookCommand {
    /// Add a book
    Add {
        /// Book title
        title: String,
        /// Total number of pages
        #[arg(short, long)]
        pages: u32,
        /// Author name
        #[arg(short, long)]
        author: Option<String>,
        /// Page you are on
        #[arg(long, default_value_t = 0)]
        current: u32,
        /// reading, paused, finished, wishlist or next
        #[arg(long, default_value = "reading")]
        status: String,
    },

    /// List books, books in progress first
    List {
        /// Only books with this status
        #[arg(long)]
        status: Option<String>,
    },

    /// Show a book with its sessions and highlights
    Show {
        /// Book ID (a unique prefix is enough)
        book: String,
    },

    /// Change a book's status (e.g. start reading a wishlist book)
    Status {
        /// Book ID (a unique prefix is enough)
        book: String,
        /// reading, paused, wishlist or next
        status: String,
    },

    /// Mark a book finished, logging the pages that were left
    Finish {
        /// Book ID (a unique prefix is enough)
        book: String,
    },
}

#[derive(Subcommand, Debug)]
enum HighlightCommand {
    /// Save a passage from a book
    Add {
        /// Book ID (a unique prefix is enough)
        book: String,
        /// The passage or note
        content: String,
        /// Page the passage is on
        #[arg(short, long)]
        page: Option<u32>,
    },

    /// List a book's highlights, newest first
    List {
        /// Book ID (a unique prefix is enough)
        book: String,
    },

    /// Delete a highlight
    Delete {
        /// Highlight ID
        id: String,
    },
}

#[derive(Subcommand, Debug)]
enum GoalsCommand {
    /// Show the active goal, progress and a suggestion (default)
    Show(FormatArgs),

    /// Adopt the current suggestion as the active goal
    Apply,

    /// Set the goal manually
    Set {
        /// Pages per day
        #[arg(long, allow_negative_numbers = true)]
        daily: i64,
        /// Pages per month
        #[arg(long, allow_negative_numbers = true)]
        monthly: i64,
    },
}

#[derive(Args, Debug, Default, Clone, Copy)]
struct FormatArgs {
    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

#[derive(ValueEnum, Debug, Default, Clone, Copy, PartialEq, Eq)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl Command {
    fn name(&self) -> &'static str {
        match self {
            Command::Book(_) => "book",
            Command::Log { .. } => "log",
            Command::Highlight(_) => "highlight",
            Command::Dashboard(_) => "dashboard",
            Command::Goals { .. } => "goals",
            Command::Story(_) => "story",
            Command::Export { .. } => "export",
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::load().context("failed to load configuration")?;
    let _log_guard = marcapagina_core::logging::init(&config.logging).ok();
    let clock = config.clock().context("invalid calendar configuration")?;

    let db_path = config.resolved_database_path();
    let db = Database::open(&db_path)
        .with_context(|| format!("failed to open database at {}", db_path.display()))?;
    db.migrate().context("failed to run database migrations")?;

    tracing::info!(command = cli.command.name(), "Running command");

    match cli.command {
        Command::Book(command) => run_book(&db, &clock, command),
        Command::Log {
            book,
            pages,
            minutes,
        } => {
            let book = db.find_book(&book)?;
            let logged = db
                .log_session(&book.id, pages, minutes, &clock)
                .context("failed to save reading session")?;
            output::print_logged(&logged);
            Ok(())
        }
        Command::Highlight(command) => run_highlight(&db, &clock, command),
        Command::Dashboard(args) => run_dashboard(&db, &clock, args.format),
        Command::Goals { command } => {
            run_goals(&db, &clock, command.unwrap_or(GoalsCommand::Show(FormatArgs::default())))
        }
        Command::Story(args) => run_story(&db, &clock, args.format),
        Command::Export { output } => {
            let snapshot = export_snapshot(&db, &clock).context("failed to read data")?;
            let path = output.unwrap_or_else(|| PathBuf::from(default_export_file_name(&clock)));
            snapshot
                .write_to(&path)
                .with_context(|| format!("failed to write {}", path.display()))?;
            println!("Exportado para {}", path.display());
            Ok(())
        }
    }
}

fn run_book(db: &Database, clock: &Clock, command: BookCommand) -> Result<()> {
    match command {
        BookCommand::Add {
            title,
            pages,
            author,
            current,
            status,
        } => {
            let new = NewBook {
                title,
                author,
                total_pages: pages,
                current_page: current,
                status: status.parse()?,
            };
            let book = db.add_book(&new, clock).context("failed to add book")?;
            println!("Livro adicionado: {} [{}]", book.title, output::short_id(&book.id));
        }
        BookCommand::List { status } => {
            let status = status.as_deref().map(str::parse::<BookStatus>).transpose()?;
            let books = db.list_books(status).context("failed to list books")?;
            output::print_book_list(&books);
        }
        BookCommand::Show { book } => {
            let book = db.find_book(&book)?;
            let sessions = db.list_book_sessions(&book.id)?;
            let highlights = db.list_highlights(&book.id)?;
            output::print_book_detail(&book, &sessions, &highlights);
        }
        BookCommand::Status { book, status } => {
            let status: BookStatus = status.parse()?;
            let book = db.find_book(&book)?;
            let book = db
                .set_book_status(&book.id, status, clock)
                .context("failed to update book")?;
            println!("\"{}\" agora está em: {}", book.title, book.status.label());
        }
        BookCommand::Finish { book } => {
            let book = db.find_book(&book)?;
            let finished = db
                .finish_book(&book.id, clock)
                .context("failed to finish book")?;
            println!("Parabéns! Livro finalizado com sucesso!");
            if finished.session.pages_read > 0 {
                println!(
                    "{} páginas restantes registradas hoje.",
                    finished.session.pages_read
                );
            }
        }
    }
    Ok(())
}

fn run_highlight(db: &Database, clock: &Clock, command: HighlightCommand) -> Result<()> {
    match command {
        HighlightCommand::Add {
            book,
            content,
            page,
        } => {
            let book = db.find_book(&book)?;
            let highlight = db
                .add_highlight(&book.id, &content, page, clock)
                .context("failed to save highlight")?;
            println!("Trecho salvo! [{}]", output::short_id(&highlight.id));
        }
        HighlightCommand::List { book } => {
            let book = db.find_book(&book)?;
            let highlights = db.list_highlights(&book.id)?;
            output::print_highlights(&highlights);
        }
        HighlightCommand::Delete { id } => {
            db.delete_highlight(&id)?;
            println!("Trecho removido.");
        }
    }
    Ok(())
}

fn run_dashboard(db: &Database, clock: &Clock, format: OutputFormat) -> Result<()> {
    let sessions = db.list_sessions().context("failed to read sessions")?;
    let books = db.list_books(None).context("failed to read books")?;
    let goal = db.active_goal().context("failed to read goal")?;

    let insights = all_insights(&sessions, clock);
    let report = output::DashboardReport {
        stats: DashboardStats::compute(&sessions, goal.as_ref(), clock),
        daily_goal: goal.as_ref().map(|g| g.daily_pages),
        month: month_daily_series(&sessions, clock),
        recommendations: all_recommendations(&insights, &books, clock),
        insights,
        reading: books
            .into_iter()
            .filter(|b| b.status == BookStatus::Reading)
            .collect(),
    };

    match format {
        OutputFormat::Json => output::print_json(&report),
        OutputFormat::Text => {
            output::print_dashboard(&report);
            Ok(())
        }
    }
}

fn run_goals(db: &Database, clock: &Clock, command: GoalsCommand) -> Result<()> {
    let sessions = db.list_sessions().context("failed to read sessions")?;
    let month_pages = marcapagina_core::analytics::month_pages(&sessions, clock);
    let suggestion = calculate_goal_suggestion(&sessions, month_pages, clock);

    match command {
        GoalsCommand::Show(args) => {
            let goal = db.active_goal().context("failed to read goal")?;
            let report = output::GoalsReport {
                stats: DashboardStats::compute(&sessions, goal.as_ref(), clock),
                goal,
                suggestion,
            };
            match args.format {
                OutputFormat::Json => output::print_json(&report)?,
                OutputFormat::Text => output::print_goals(&report),
            }
        }
        GoalsCommand::Apply => {
            let goal = db
                .apply_goal(&NewGoal::from_suggestion(&suggestion), clock)
                .context("failed to apply goal")?;
            println!(
                "Meta aplicada: {} páginas por dia, {} por mês.",
                goal.daily_pages, goal.monthly_pages
            );
        }
        GoalsCommand::Set { daily, monthly } => {
            let new = NewGoal::manual(daily, monthly)?;
            let goal = db.apply_goal(&new, clock).context("failed to save goal")?;
            println!(
                "Meta atualizada: {} páginas por dia, {} por mês.",
                goal.daily_pages, goal.monthly_pages
            );
        }
    }
    Ok(())
}

fn run_story(db: &Database, clock: &Clock, format: OutputFormat) -> Result<()> {
    let sessions = db.list_sessions().context("failed to read sessions")?;
    let books = db.list_books(None).context("failed to read books")?;
    let story = generate_story(&sessions, &books, clock);

    match format {
        OutputFormat::Json => output::print_json(&story),
        OutputFormat::Text => {
            output::print_story(&story);
            Ok(())
        }
    }
}

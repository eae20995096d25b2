//! Formatting helpers shared by the calculators and the CLI.
//!
//! Reader-facing text is Brazilian Portuguese.

use chrono::Weekday;

/// Lowercase weekday name (e.g., "segunda-feira").
pub fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Sun => "domingo",
        Weekday::Mon => "segunda-feira",
        Weekday::Tue => "terça-feira",
        Weekday::Wed => "quarta-feira",
        Weekday::Thu => "quinta-feira",
        Weekday::Fri => "sexta-feira",
        Weekday::Sat => "sábado",
    }
}

/// Capitalized plural weekday (e.g., "Segundas"), as in "Segundas costumam...".
pub fn weekday_plural(day: Weekday) -> &'static str {
    match day {
        Weekday::Sun => "Domingos",
        Weekday::Mon => "Segundas",
        Weekday::Tue => "Terças",
        Weekday::Wed => "Quartas",
        Weekday::Thu => "Quintas",
        Weekday::Fri => "Sextas",
        Weekday::Sat => "Sábados",
    }
}

/// Weekday from a 0-based index where 0 is Sunday.
pub fn weekday_from_sunday(index: usize) -> Weekday {
    match index % 7 {
        0 => Weekday::Sun,
        1 => Weekday::Mon,
        2 => Weekday::Tue,
        3 => Weekday::Wed,
        4 => Weekday::Thu,
        5 => Weekday::Fri,
        _ => Weekday::Sat,
    }
}

/// Uppercase the first character ("domingo" -> "Domingo").
pub fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Format a percentage delta for display (e.g., "+23%" or "-15%").
pub fn format_delta(percent: i64) -> String {
    if percent > 0 {
        format!("+{}%", percent)
    } else {
        format!("{}%", percent)
    }
}

/// Text progress bar, `width` cells wide, for a 0-100 value.
pub fn progress_bar(percent: u32, width: usize) -> String {
    let filled = (percent.min(100) as usize * width + 50) / 100;
    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
}

// src/services/itinerary.rs
use serde::{Deserialize, Serialize};

const DAY_MARKER: &str = "**Dia ";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    pub period: String,
    pub activity: String,
    pub details: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Day {
    pub day_title: String,
    pub activities: Vec<Activity>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Itinerary {
    pub days: Vec<Day>,
}

/// Reads the per-day Markdown tables the itinerary prompt asks for.
/// Returns `None` when the text holds no `**Dia ` block.
pub fn parse_itinerary(markdown: &str) -> Option<Itinerary> {
    let days: Vec<Day> = markdown.split(DAY_MARKER).skip(1).map(parse_day).collect();

    if days.is_empty() {
        return None;
    }
    Some(Itinerary { days })
}

fn parse_day(block: &str) -> Day {
    let mut lines = block.trim().lines();
    let title = lines.next().unwrap_or_default().trim().replace("**", "");

    let rows: Vec<&str> = lines
        .map(str::trim)
        .filter(|row| row.starts_with('|'))
        .collect();

    // A header is only dropped when it looks like one; headerless tables
    // keep their first row.
    let has_header = rows.first().is_some_and(|first| is_header(first))
        || rows.get(1).is_some_and(|second| is_separator(second));
    let body = if has_header { &rows[1..] } else { &rows[..] };

    let activities = body
        .iter()
        .filter(|row| !is_separator(row))
        .filter_map(|row| parse_row(row))
        .collect();

    Day {
        day_title: format!("Dia {}", title),
        activities,
    }
}

fn cells(row: &str) -> impl Iterator<Item = &str> {
    row.trim_matches('|').split('|').map(str::trim)
}

// `|---|`, `| --- |`, `| :--- | ---: |`
fn is_separator(row: &str) -> bool {
    let mut filled = cells(row).filter(|cell| !cell.is_empty()).peekable();
    filled.peek().is_some()
        && filled.all(|cell| cell.contains('-') && cell.chars().all(|c| c == '-' || c == ':'))
}

fn is_header(row: &str) -> bool {
    cells(row).next().is_some_and(|first| {
        let first = first.to_lowercase();
        first == "período" || first == "periodo"
    })
}

fn parse_row(row: &str) -> Option<Activity> {
    let cells: Vec<&str> = row.split('|').map(str::trim).collect();
    if cells.len() <= 3 {
        return None;
    }
    let (period, activity, details) = (cells[1], cells[2], cells[3]);
    if period.is_empty() || activity.is_empty() || details.is_empty() {
        return None;
    }
    Some(Activity {
        period: period.to_string(),
        activity: activity.to_string(),
        details: details.to_string(),
    })
}

use std::fmt::Write;

use crate::models::{Column, FieldValue, Intern, Person, COLUMNS};
use crate::view::Stats;

fn cell(intern: &Intern, column: Column) -> String {
    match intern.field(column.key) {
        Some(FieldValue::Text(text)) if text.is_empty() => "-".to_string(),
        Some(FieldValue::Int(0)) if column.key == "performance_rating" => "-".to_string(),
        Some(value) => value.display(),
        None => "-".to_string(),
    }
}

/// Render the visible rows under the visible columns as an aligned text
/// table.
pub fn table(interns: &[&Intern], columns: &[Column]) -> String {
    let mut widths: Vec<usize> = columns.iter().map(|column| column.label.len()).collect();
    let rows: Vec<Vec<String>> = interns
        .iter()
        .map(|intern| {
            columns
                .iter()
                .enumerate()
                .map(|(index, column)| {
                    let text = cell(intern, *column);
                    widths[index] = widths[index].max(text.len());
                    text
                })
                .collect()
        })
        .collect();

    let mut output = String::new();
    let header = columns
        .iter()
        .enumerate()
        .map(|(index, column)| format!("{:width$}", column.label, width = widths[index]))
        .collect::<Vec<_>>()
        .join("  ");
    let _ = writeln!(output, "{}", header.trim_end());
    let rule = widths
        .iter()
        .map(|width| "-".repeat(*width))
        .collect::<Vec<_>>()
        .join("  ");
    let _ = writeln!(output, "{rule}");

    for row in rows {
        let line = row
            .iter()
            .enumerate()
            .map(|(index, text)| format!("{:width$}", text, width = widths[index]))
            .collect::<Vec<_>>()
            .join("  ");
        let _ = writeln!(output, "{}", line.trim_end());
    }

    output
}

/// Full record detail, every display column plus timestamps.
pub fn detail(intern: &Intern) -> String {
    let mut output = String::new();
    for column in COLUMNS.iter() {
        let _ = writeln!(output, "{}: {}", column.label, cell(intern, *column));
    }
    let _ = writeln!(output, "Created: {}", intern.created_at);
    let _ = writeln!(output, "Updated: {}", intern.updated_at);
    output
}

pub fn stats_line(stats: &Stats) -> String {
    format!(
        "Showing {} of {} interns | {} ongoing | {} converted to full-time",
        stats.shown, stats.total, stats.ongoing, stats.converted
    )
}

pub fn person_list(persons: &[&Person]) -> String {
    let mut output = String::new();
    for person in persons {
        let _ = writeln!(output, "{}  {}", person.id, person.name);
    }
    output
}

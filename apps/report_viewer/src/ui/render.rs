use std::fmt::Write as _;

use client_core::{Catalog, SessionState, ViewState};
use serde_json::Value;
use shared::domain::{ColumnSpec, ReportRow};

use crate::controller::events::UiError;

const MAX_CELL_WIDTH: usize = 40;
const ELLIPSIS: &str = "...";

pub const HELP: &str = "\
Enter a report number or id to run it.
  <empty>   clear the selection
  r         refresh the report catalog
  x         export the current result as JSON
  q         quit";

pub fn render_catalog(catalog: &Catalog) -> String {
    if let Some(message) = catalog.error_message() {
        return format!("Error loading reports: {message}");
    }
    if catalog.options().is_empty() {
        return "No reports available.".to_string();
    }

    let mut out = String::from("Available reports:");
    for (position, option) in catalog.options().iter().enumerate() {
        let _ = write!(out, "\n  {:>2}) {} [{}]", position + 1, option.label, option.value);
    }
    out
}

pub fn render_session(session: &SessionState) -> String {
    let title = if session.selected_report_name().is_empty() {
        session.selected_report_id()
    } else {
        session.selected_report_name()
    };

    match session.view_state() {
        ViewState::Idle => "No report selected.".to_string(),
        ViewState::Loading => format!("Loading {title}..."),
        ViewState::Failed => format!(
            "Error loading report data: {}",
            session.error_message().unwrap_or_default()
        ),
        ViewState::Empty => session
            .error_message()
            .unwrap_or(client_core::NO_DATA_MESSAGE)
            .to_string(),
        ViewState::Populated => format!(
            "{title}: showing {} of {} records\n{}",
            session.report_data().len(),
            session.total_records(),
            render_table(session.table_columns(), session.report_data())
        ),
    }
}

pub fn render_failure(error: &UiError) -> String {
    format!("Error: {}", error.message())
}

pub fn render_table(columns: &[ColumnSpec], rows: &[ReportRow]) -> String {
    let headers: Vec<String> = columns
        .iter()
        .map(|column| {
            let label = if column.label.is_empty() {
                &column.field_name
            } else {
                &column.label
            };
            clip(label)
        })
        .collect();
    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|row| {
            columns
                .iter()
                .map(|column| clip(&cell_text(row.get(&column.field_name))))
                .collect()
        })
        .collect();

    let widths: Vec<usize> = headers
        .iter()
        .enumerate()
        .map(|(index, header)| {
            cells
                .iter()
                .map(|line| line[index].chars().count())
                .chain(std::iter::once(header.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut out = String::new();
    push_line(&mut out, &headers, &widths);
    let rule: Vec<String> = widths.iter().map(|width| "-".repeat(*width)).collect();
    out.push('\n');
    out.push_str(&rule.join("-+-"));
    for line in &cells {
        out.push('\n');
        push_line(&mut out, line, &widths);
    }
    out
}

fn push_line(out: &mut String, cells: &[String], widths: &[usize]) {
    let padded: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, &width)| format!("{cell:<width$}"))
        .collect();
    out.push_str(padded.join(" | ").trim_end());
}

fn cell_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(text)) => text.clone(),
        Some(other) => other.to_string(),
    }
}

fn clip(text: &str) -> String {
    let single_line = text.replace(['\n', '\r'], " ");
    if single_line.chars().count() <= MAX_CELL_WIDTH {
        return single_line;
    }
    let kept: String = single_line
        .chars()
        .take(MAX_CELL_WIDTH - ELLIPSIS.len())
        .collect();
    format!("{kept}{ELLIPSIS}")
}

#[cfg(test)]
#[path = "tests/render_tests.rs"]
mod tests;

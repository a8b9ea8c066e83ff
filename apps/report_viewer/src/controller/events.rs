//! UI/backend events and error modeling for the report viewer controller.

use client_core::{Catalog, CatalogUpdate, CompletedFetch};

pub enum UiEvent {
    Info(String),
    Error(UiError),
    Catalog(CatalogUpdate),
    ReportCompleted(CompletedFetch),
    Input(String),
    InputClosed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorContext {
    BackendStartup,
    CommandQueue,
}

#[derive(Debug, Clone)]
pub struct UiError {
    context: UiErrorContext,
    message: String,
}

impl UiError {
    pub fn from_message(context: UiErrorContext, message: impl Into<String>) -> Self {
        Self {
            context,
            message: message.into(),
        }
    }

    pub fn context(&self) -> UiErrorContext {
        self.context
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// What a line typed at the prompt asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserIntent {
    /// Empty id clears the selection.
    Select(String),
    RefreshCatalog,
    Export,
    Help,
    Quit,
}

/// Reads one prompt line. A number picks the n-th catalog option (1-based);
/// anything unrecognized is taken as a report id.
pub fn parse_input(line: &str, catalog: &Catalog) -> UserIntent {
    let input = line.trim();
    match input {
        "" => return UserIntent::Select(String::new()),
        "q" | "quit" | "exit" => return UserIntent::Quit,
        "r" | "refresh" => return UserIntent::RefreshCatalog,
        "x" | "export" => return UserIntent::Export,
        "?" | "h" | "help" => return UserIntent::Help,
        _ => {}
    }

    if let Ok(position) = input.parse::<usize>() {
        if let Some(option) = position
            .checked_sub(1)
            .and_then(|index| catalog.options().get(index))
        {
            return UserIntent::Select(option.value.clone());
        }
    }

    UserIntent::Select(input.to_string())
}

#[cfg(test)]
#[path = "tests/events_tests.rs"]
mod tests;

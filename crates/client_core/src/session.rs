//! Session state for the report viewer: selection, fetched table, and the
//! flags a renderer derives from them.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use shared::{
    domain::{ColumnSpec, ReportResult, ReportRow, ReportSnapshot},
    error::ReportFailure,
};
use tracing::{debug, info, warn};

use crate::catalog::Catalog;

pub const NO_DATA_MESSAGE: &str = "No data available for this report.";

/// Result of one execution call as seen by the session.
pub type FetchOutcome = Result<Option<ReportResult>, ReportFailure>;

/// Message slot of the session. `NoData` is informational, not a failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionMessage {
    NoData,
    Error(String),
}

impl SessionMessage {
    pub fn text(&self) -> &str {
        match self {
            Self::NoData => NO_DATA_MESSAGE,
            Self::Error(message) => message,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewState {
    Idle,
    Loading,
    Populated,
    Empty,
    Failed,
}

/// What to do with a response whose fetch was superseded by a newer selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StaleResponsePolicy {
    #[default]
    Discard,
    /// Last processed response wins, whatever selection it was issued for.
    Apply,
}

/// Tag attached to each execution call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    seq: u64,
    report_id: String,
}

impl FetchTicket {
    pub fn report_id(&self) -> &str {
        &self.report_id
    }

    pub fn seq(&self) -> u64 {
        self.seq
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchDisposition {
    Applied,
    AppliedStale,
    Discarded,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct NormalizedTable {
    pub columns: Vec<ColumnSpec>,
    pub rows: Vec<ReportRow>,
    pub total_records: u64,
}

/// Converts a backend result into the renderable column/row model.
///
/// Rows get `row-<index>` ids from their position in the payload. Columns
/// repeating an earlier `field_name` are dropped.
pub fn normalize_result(result: ReportResult) -> NormalizedTable {
    let mut seen = HashSet::new();
    let columns = result
        .columns
        .into_iter()
        .filter(|column| {
            let fresh = seen.insert(column.field_name.clone());
            if !fresh {
                warn!(field_name = %column.field_name, "dropping duplicate report column");
            }
            fresh
        })
        .collect();

    let rows = result
        .rows
        .unwrap_or_default()
        .into_iter()
        .enumerate()
        .map(|(index, raw)| ReportRow::from_raw(index, raw))
        .collect();

    NormalizedTable {
        columns,
        rows,
        total_records: result.total_records,
    }
}

#[derive(Debug, Clone, Default)]
pub struct SessionState {
    selected_report_id: String,
    selected_report_name: String,
    report_data: Vec<ReportRow>,
    table_columns: Vec<ColumnSpec>,
    total_records: u64,
    message: Option<SessionMessage>,
    is_loading: bool,
    latest_seq: u64,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a selection change. Returns the ticket for the fetch to issue,
    /// or `None` when the selection was cleared.
    pub fn select(&mut self, report_id: &str, catalog: &Catalog) -> Option<FetchTicket> {
        self.selected_report_id = report_id.to_string();
        self.selected_report_name = catalog.label_for(report_id).unwrap_or_default().to_string();
        // Any fetch still in flight now belongs to an older selection.
        self.latest_seq += 1;

        if report_id.is_empty() {
            debug!("report selection cleared");
            self.clear_results();
            self.message = None;
            self.is_loading = false;
            return None;
        }

        info!(
            report_id,
            report_name = %self.selected_report_name,
            "report selected"
        );
        self.is_loading = true;
        self.message = None;
        Some(FetchTicket {
            seq: self.latest_seq,
            report_id: report_id.to_string(),
        })
    }

    pub fn is_current(&self, ticket: &FetchTicket) -> bool {
        ticket.seq == self.latest_seq
    }

    pub fn complete(
        &mut self,
        ticket: &FetchTicket,
        outcome: FetchOutcome,
        policy: StaleResponsePolicy,
    ) -> FetchDisposition {
        let stale = !self.is_current(ticket);
        if stale && policy == StaleResponsePolicy::Discard {
            debug!(
                report_id = %ticket.report_id,
                selected = %self.selected_report_id,
                "discarding stale report response"
            );
            return FetchDisposition::Discarded;
        }

        match outcome {
            Ok(Some(result)) if result.has_rows() => {
                let table = normalize_result(result);
                info!(
                    report_id = %ticket.report_id,
                    rows = table.rows.len(),
                    total_records = table.total_records,
                    "report data received"
                );
                self.table_columns = table.columns;
                self.report_data = table.rows;
                self.total_records = table.total_records;
                self.message = None;
            }
            Ok(_) => {
                info!(report_id = %ticket.report_id, "report returned no rows");
                self.clear_results();
                self.message = Some(SessionMessage::NoData);
            }
            Err(failure) => {
                let message = failure.display_message();
                warn!(report_id = %ticket.report_id, error = %message, "report execution failed");
                self.clear_results();
                self.message = Some(SessionMessage::Error(message));
            }
        }
        self.is_loading = false;

        if stale {
            FetchDisposition::AppliedStale
        } else {
            FetchDisposition::Applied
        }
    }

    fn clear_results(&mut self) {
        self.report_data.clear();
        self.table_columns.clear();
        self.total_records = 0;
    }

    pub fn selected_report_id(&self) -> &str {
        &self.selected_report_id
    }

    pub fn selected_report_name(&self) -> &str {
        &self.selected_report_name
    }

    pub fn report_data(&self) -> &[ReportRow] {
        &self.report_data
    }

    pub fn table_columns(&self) -> &[ColumnSpec] {
        &self.table_columns
    }

    pub fn total_records(&self) -> u64 {
        self.total_records
    }

    pub fn message(&self) -> Option<&SessionMessage> {
        self.message.as_ref()
    }

    pub fn error_message(&self) -> Option<&str> {
        self.message.as_ref().map(SessionMessage::text)
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn show_table(&self) -> bool {
        !self.is_loading && !self.report_data.is_empty()
    }

    pub fn show_no_data(&self) -> bool {
        !self.is_loading
            && !self.selected_report_id.is_empty()
            && self.report_data.is_empty()
            && !self.message.as_ref().is_some_and(SessionMessage::is_error)
    }

    pub fn view_state(&self) -> ViewState {
        if self.is_loading {
            ViewState::Loading
        } else if !self.report_data.is_empty() {
            ViewState::Populated
        } else if self.message.as_ref().is_some_and(SessionMessage::is_error) {
            ViewState::Failed
        } else if self.selected_report_id.is_empty() {
            ViewState::Idle
        } else {
            ViewState::Empty
        }
    }

    pub fn snapshot(&self) -> ReportSnapshot {
        ReportSnapshot {
            report_id: self.selected_report_id.clone(),
            report_name: self.selected_report_name.clone(),
            data: self.report_data.clone(),
            columns: self.table_columns.clone(),
            total_records: self.total_records,
        }
    }
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;

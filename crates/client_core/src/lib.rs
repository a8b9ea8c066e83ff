use async_trait::async_trait;
use shared::{
    domain::{ReportDescriptor, ReportResult},
    error::ReportFailure,
};

pub mod catalog;
pub mod controller;
pub mod session;
pub mod transport;

pub use catalog::{spawn_catalog_refresh, Catalog, CatalogFeed, CatalogSubscription, CatalogUpdate};
pub use controller::{CompletedFetch, PendingFetch, ReportSessionController};
pub use session::{
    normalize_result, FetchDisposition, FetchOutcome, FetchTicket, NormalizedTable,
    SessionMessage, SessionState, StaleResponsePolicy, ViewState, NO_DATA_MESSAGE,
};
pub use transport::{HttpReportService, TransportError};

/// Remote report backend: the catalog listing and report execution calls.
///
/// `execute_report` must be safe to repeat for the same id. `Ok(None)` means
/// the backend answered without a result body.
#[async_trait]
pub trait ReportService: Send + Sync {
    async fn list_reports(&self) -> Result<Vec<ReportDescriptor>, ReportFailure>;
    async fn execute_report(&self, report_id: &str) -> Result<Option<ReportResult>, ReportFailure>;
}

/// Stand-in used when no backend is configured; every call fails.
pub struct MissingReportService;

#[async_trait]
impl ReportService for MissingReportService {
    async fn list_reports(&self) -> Result<Vec<ReportDescriptor>, ReportFailure> {
        Err(ReportFailure::message(
            "report backend unavailable: no base url configured",
        ))
    }

    async fn execute_report(&self, report_id: &str) -> Result<Option<ReportResult>, ReportFailure> {
        Err(ReportFailure::message(format!(
            "report backend unavailable: cannot run report {report_id}"
        )))
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;

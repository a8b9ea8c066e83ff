//! Backend commands queued from UI to backend worker.

use client_core::PendingFetch;

pub enum BackendCommand {
    RefreshCatalog,
    RunReport(PendingFetch),
    Shutdown,
}

impl BackendCommand {
    pub fn name(&self) -> &'static str {
        match self {
            Self::RefreshCatalog => "refresh_catalog",
            Self::RunReport(_) => "run_report",
            Self::Shutdown => "shutdown",
        }
    }
}

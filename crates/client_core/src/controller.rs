//! Report session controller: ties the catalog, the session state and the
//! report backend together.

use std::sync::Arc;

use shared::domain::ReportSnapshot;

use crate::{
    catalog::{Catalog, CatalogUpdate},
    session::{FetchDisposition, FetchOutcome, FetchTicket, SessionState, StaleResponsePolicy},
    ReportService,
};

/// An execution call that has been decided but not yet issued.
///
/// It owns a handle to the backend so it can be moved to whichever task or
/// thread runs the call.
pub struct PendingFetch {
    ticket: FetchTicket,
    service: Arc<dyn ReportService>,
}

impl PendingFetch {
    pub fn ticket(&self) -> &FetchTicket {
        &self.ticket
    }

    pub async fn run(self) -> CompletedFetch {
        let outcome = self.service.execute_report(self.ticket.report_id()).await;
        CompletedFetch {
            ticket: self.ticket,
            outcome,
        }
    }
}

#[derive(Debug)]
pub struct CompletedFetch {
    pub ticket: FetchTicket,
    pub outcome: FetchOutcome,
}

pub struct ReportSessionController {
    service: Arc<dyn ReportService>,
    catalog: Catalog,
    session: SessionState,
    stale_policy: StaleResponsePolicy,
}

impl ReportSessionController {
    pub fn new(service: Arc<dyn ReportService>) -> Self {
        Self {
            service,
            catalog: Catalog::default(),
            session: SessionState::new(),
            stale_policy: StaleResponsePolicy::default(),
        }
    }

    pub fn with_stale_policy(mut self, stale_policy: StaleResponsePolicy) -> Self {
        self.stale_policy = stale_policy;
        self
    }

    pub fn stale_policy(&self) -> StaleResponsePolicy {
        self.stale_policy
    }

    pub fn service(&self) -> Arc<dyn ReportService> {
        Arc::clone(&self.service)
    }

    pub fn apply_catalog_update(&mut self, update: &CatalogUpdate) {
        self.catalog.apply(update);
    }

    /// Synchronous half of a selection change. An empty id returns the
    /// session to idle and yields no fetch.
    pub fn prepare_selection(&mut self, report_id: &str) -> Option<PendingFetch> {
        self.session
            .select(report_id, &self.catalog)
            .map(|ticket| PendingFetch {
                ticket,
                service: Arc::clone(&self.service),
            })
    }

    pub fn complete(&mut self, completed: CompletedFetch) -> FetchDisposition {
        self.session
            .complete(&completed.ticket, completed.outcome, self.stale_policy)
    }

    /// Selects a report and waits for its result. `None` when the selection
    /// was cleared and no call was issued.
    pub async fn select_report(&mut self, report_id: &str) -> Option<FetchDisposition> {
        let pending = self.prepare_selection(report_id)?;
        let completed = pending.run().await;
        Some(self.complete(completed))
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    pub fn snapshot(&self) -> ReportSnapshot {
        self.session.snapshot()
    }
}

//! Report catalog: the option list fed by a push-style subscription.

use std::{sync::Arc, time::Duration};

use shared::{
    domain::{ReportDescriptor, ReportOption},
    error::ReportFailure,
};
use tokio::{
    sync::broadcast::{self, error::RecvError, error::TryRecvError},
    task::JoinHandle,
};
use tracing::{debug, info, warn};

use crate::ReportService;

const CATALOG_FEED_CAPACITY: usize = 16;

/// One push from the report-listing source.
pub type CatalogUpdate = Result<Vec<ReportDescriptor>, ReportFailure>;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    options: Vec<ReportOption>,
    error_message: Option<String>,
}

impl Catalog {
    /// Builds the catalog a single push leads to, independent of prior state.
    pub fn reduce(update: &CatalogUpdate) -> Self {
        match update {
            Ok(descriptors) => Self {
                options: descriptors.iter().map(ReportOption::from).collect(),
                error_message: None,
            },
            Err(failure) => Self {
                options: Vec::new(),
                error_message: Some(failure.display_message()),
            },
        }
    }

    pub fn apply(&mut self, update: &CatalogUpdate) {
        *self = Self::reduce(update);
        match &self.error_message {
            Some(message) => warn!(error = %message, "report catalog unavailable"),
            None => debug!(options = self.options.len(), "report catalog replaced"),
        }
    }

    pub fn options(&self) -> &[ReportOption] {
        &self.options
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    pub fn label_for(&self, report_id: &str) -> Option<&str> {
        self.options
            .iter()
            .find(|option| option.value == report_id)
            .map(|option| option.label.as_str())
    }
}

/// Fan-out point for catalog pushes.
#[derive(Clone)]
pub struct CatalogFeed {
    tx: broadcast::Sender<CatalogUpdate>,
}

impl Default for CatalogFeed {
    fn default() -> Self {
        Self::new()
    }
}

impl CatalogFeed {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(CATALOG_FEED_CAPACITY);
        Self { tx }
    }

    /// Returns how many subscribers received the update.
    pub fn publish(&self, update: CatalogUpdate) -> usize {
        self.tx.send(update).unwrap_or(0)
    }

    pub fn subscribe(&self) -> CatalogSubscription {
        CatalogSubscription {
            rx: self.tx.subscribe(),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

pub struct CatalogSubscription {
    rx: broadcast::Receiver<CatalogUpdate>,
}

impl CatalogSubscription {
    /// Waits for the next push. `None` once every feed handle is gone.
    pub async fn next(&mut self) -> Option<CatalogUpdate> {
        loop {
            match self.rx.recv().await {
                Ok(update) => return Some(update),
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "catalog subscriber lagged; older pushes dropped");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// Non-blocking variant for hosts polling from a UI loop.
    pub fn try_next(&mut self) -> Option<CatalogUpdate> {
        loop {
            match self.rx.try_recv() {
                Ok(update) => return Some(update),
                Err(TryRecvError::Lagged(skipped)) => {
                    warn!(skipped, "catalog subscriber lagged; older pushes dropped");
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => return None,
            }
        }
    }

    pub fn unsubscribe(self) {}
}

/// Loads the catalog now and then on every `every` tick, publishing each
/// outcome to `feed`. With `every = None` it loads once and exits.
pub fn spawn_catalog_refresh(
    service: Arc<dyn ReportService>,
    feed: CatalogFeed,
    every: Option<Duration>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            let update = service.list_reports().await;
            match &update {
                Ok(descriptors) => info!(reports = descriptors.len(), "report catalog loaded"),
                Err(failure) => {
                    warn!(error = %failure.display_message(), "report catalog load failed")
                }
            }
            feed.publish(update);

            let Some(every) = every else {
                break;
            };
            tokio::time::sleep(every).await;
        }
    })
}

#[cfg(test)]
#[path = "tests/catalog_tests.rs"]
mod tests;

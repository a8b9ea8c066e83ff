//! Runtime bridge between UI command queue and backend event intake.

use std::{sync::Arc, thread, time::Duration};

use client_core::{spawn_catalog_refresh, CatalogFeed, ReportService};
use crossbeam_channel::{Receiver, Sender};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::{UiError, UiErrorContext, UiEvent};

/// Starts the backend worker thread. It owns the tokio runtime, keeps the
/// catalog subscription alive and runs each queued report fetch as its own
/// task so responses may arrive out of order.
pub fn launch(
    cmd_rx: Receiver<BackendCommand>,
    ui_tx: Sender<UiEvent>,
    service: Arc<dyn ReportService>,
    catalog_refresh: Option<Duration>,
) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        let runtime = match tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(err) => {
                let _ = ui_tx.send(UiEvent::Error(UiError::from_message(
                    UiErrorContext::BackendStartup,
                    format!("backend worker startup failure: failed to build runtime: {err}"),
                )));
                tracing::error!("failed to build backend runtime: {err}");
                return;
            }
        };

        runtime.block_on(async move {
            let feed = CatalogFeed::new();
            let mut subscription = feed.subscribe();
            let catalog_tx = ui_tx.clone();
            let forwarder = tokio::spawn(async move {
                while let Some(update) = subscription.next().await {
                    if catalog_tx.send(UiEvent::Catalog(update)).is_err() {
                        break;
                    }
                }
            });

            let mut refresh = spawn_catalog_refresh(service.clone(), feed.clone(), catalog_refresh);
            let _ = ui_tx.send(UiEvent::Info("Backend worker ready".to_string()));

            while let Ok(cmd) = cmd_rx.recv() {
                match cmd {
                    BackendCommand::RefreshCatalog => {
                        refresh.abort();
                        refresh =
                            spawn_catalog_refresh(service.clone(), feed.clone(), catalog_refresh);
                    }
                    BackendCommand::RunReport(pending) => {
                        let report_tx = ui_tx.clone();
                        tokio::spawn(async move {
                            let completed = pending.run().await;
                            let _ = report_tx.send(UiEvent::ReportCompleted(completed));
                        });
                    }
                    BackendCommand::Shutdown => break,
                }
            }

            refresh.abort();
            forwarder.abort();
            tracing::debug!("backend worker stopped");
        });
    })
}

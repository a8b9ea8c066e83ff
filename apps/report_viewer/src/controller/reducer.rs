//! Applies UI events to the report session and decides what to redraw.

use client_core::{CompletedFetch, FetchDisposition, ReportSessionController};
use crossbeam_channel::Sender;
use shared::{domain::ReportSnapshot, error::ReportFailure};

use crate::{
    backend_bridge::commands::BackendCommand,
    controller::{
        events::{parse_input, UiError, UiErrorContext, UiEvent, UserIntent},
        orchestration::{dispatch_backend_command, DispatchFailure},
    },
};

#[derive(Debug)]
pub enum Reaction {
    Nothing,
    CatalogChanged,
    SessionChanged,
    Notice(String),
    Failure(UiError),
    Help,
    Export(ReportSnapshot),
    Quit,
}

pub struct ViewerApp {
    controller: ReportSessionController,
    cmd_tx: Sender<BackendCommand>,
}

impl ViewerApp {
    pub fn new(controller: ReportSessionController, cmd_tx: Sender<BackendCommand>) -> Self {
        Self { controller, cmd_tx }
    }

    pub fn controller(&self) -> &ReportSessionController {
        &self.controller
    }

    pub fn handle_event(&mut self, event: UiEvent) -> Reaction {
        match event {
            UiEvent::Info(message) => Reaction::Notice(message),
            UiEvent::Error(error) => {
                tracing::error!(context = ?error.context(), "{}", error.message());
                Reaction::Failure(error)
            }
            UiEvent::Catalog(update) => {
                self.controller.apply_catalog_update(&update);
                Reaction::CatalogChanged
            }
            UiEvent::ReportCompleted(completed) => match self.controller.complete(completed) {
                FetchDisposition::Discarded => Reaction::Nothing,
                FetchDisposition::Applied | FetchDisposition::AppliedStale => {
                    Reaction::SessionChanged
                }
            },
            UiEvent::Input(line) => {
                let intent = parse_input(&line, self.controller.catalog());
                self.handle_intent(intent)
            }
            UiEvent::InputClosed => self.handle_intent(UserIntent::Quit),
        }
    }

    fn handle_intent(&mut self, intent: UserIntent) -> Reaction {
        match intent {
            UserIntent::Select(report_id) => {
                if let Some(pending) = self.controller.prepare_selection(&report_id) {
                    if let Err(failure) =
                        dispatch_backend_command(&self.cmd_tx, BackendCommand::RunReport(pending))
                    {
                        self.fail_dispatched_fetch(failure);
                    }
                }
                Reaction::SessionChanged
            }
            UserIntent::RefreshCatalog => {
                match dispatch_backend_command(&self.cmd_tx, BackendCommand::RefreshCatalog) {
                    Ok(()) => Reaction::Notice("Refreshing report catalog...".to_string()),
                    Err(failure) => Reaction::Failure(UiError::from_message(
                        UiErrorContext::CommandQueue,
                        failure.reason,
                    )),
                }
            }
            UserIntent::Export => Reaction::Export(self.controller.snapshot()),
            UserIntent::Help => Reaction::Help,
            UserIntent::Quit => {
                // The worker may already be gone; quitting proceeds regardless.
                let _ = dispatch_backend_command(&self.cmd_tx, BackendCommand::Shutdown);
                Reaction::Quit
            }
        }
    }

    /// A fetch that never reached the worker would leave the session loading,
    /// so it is completed here as a failed execution.
    fn fail_dispatched_fetch(&mut self, failure: DispatchFailure) {
        if let BackendCommand::RunReport(pending) = failure.command {
            self.controller.complete(CompletedFetch {
                ticket: pending.ticket().clone(),
                outcome: Err(ReportFailure::message(failure.reason)),
            });
        }
    }
}

#[cfg(test)]
#[path = "tests/reducer_tests.rs"]
mod tests;

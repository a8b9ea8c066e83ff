use std::{
    io::{self, BufRead, Write},
    path::PathBuf,
    sync::Arc,
    thread,
};

mod backend_bridge;
mod controller;
mod settings;
mod ui;

use anyhow::{bail, Context, Result};
use clap::Parser;
use client_core::{
    HttpReportService, MissingReportService, ReportService, ReportSessionController,
    StaleResponsePolicy, ViewState,
};
use crossbeam_channel::{bounded, unbounded, Sender};
use tracing_subscriber::EnvFilter;

use crate::{
    controller::{
        events::UiEvent,
        reducer::{Reaction, ViewerApp},
    },
    settings::{load_settings, Settings},
};

const DEFAULT_LOG_FILTER: &str = "report_viewer=info,client_core=info";
const COMMAND_QUEUE_CAPACITY: usize = 64;

#[derive(Parser, Debug)]
#[command(about = "Pick a report, run it against the report backend and view the result")]
struct Args {
    /// Report backend base url; overrides the settings file and environment.
    #[arg(long)]
    base_url: Option<String>,
    /// Settings file (defaults to ./report_viewer.toml when present).
    #[arg(long)]
    config: Option<PathBuf>,
    /// Run this report once and exit instead of starting the prompt.
    #[arg(long)]
    report: Option<String>,
    /// With --report, print the result snapshot as JSON.
    #[arg(long, requires = "report")]
    json: bool,
    /// Catalog refresh period in seconds; 0 loads it once.
    #[arg(long)]
    refresh_secs: Option<u64>,
    /// Let a late response for an older selection overwrite the view.
    #[arg(long)]
    apply_stale_responses: bool,
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose, args.report.is_none());

    let mut settings = load_settings(args.config.as_deref())?;
    apply_overrides(&mut settings, &args);
    let service = build_service(&settings)?;

    match args.report.as_deref() {
        Some(report_id) => run_once(service, &settings, report_id, args.json),
        None => run_interactive(service, &settings),
    }
}

fn init_tracing(verbose: bool, interactive: bool) {
    // Logs go to stderr so table and JSON output on stdout stay clean.
    let filter = if verbose {
        EnvFilter::new("report_viewer=debug,client_core=debug")
    } else if interactive {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn apply_overrides(settings: &mut Settings, args: &Args) {
    if let Some(base_url) = &args.base_url {
        settings.base_url = Some(base_url.clone());
    }
    if let Some(refresh_secs) = args.refresh_secs {
        settings.catalog_refresh_secs = refresh_secs;
    }
    if args.apply_stale_responses {
        settings.stale_responses = StaleResponsePolicy::Apply;
    }
}

fn build_service(settings: &Settings) -> Result<Arc<dyn ReportService>> {
    match settings.base_url() {
        Some(base_url) => {
            let service = HttpReportService::new(base_url, settings.request_timeout())
                .context("failed to set up report backend client")?;
            tracing::info!(base_url = %service.base_url(), "using report backend");
            Ok(Arc::new(service))
        }
        None => {
            tracing::warn!("no report backend configured; set --base-url or REPORT_VIEWER_BASE_URL");
            Ok(Arc::new(MissingReportService))
        }
    }
}

fn run_once(
    service: Arc<dyn ReportService>,
    settings: &Settings,
    report_id: &str,
    json: bool,
) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to build async runtime")?;

    let controller = runtime.block_on(async {
        let mut controller = ReportSessionController::new(service.clone())
            .with_stale_policy(settings.stale_responses);
        controller.apply_catalog_update(&service.list_reports().await);
        controller.select_report(report_id).await;
        controller
    });

    let mut stdout = io::stdout().lock();
    if json {
        serde_json::to_writer_pretty(&mut stdout, &controller.snapshot())
            .context("failed to write report snapshot")?;
        writeln!(stdout)?;
    } else {
        writeln!(stdout, "{}", ui::render::render_session(controller.session()))?;
    }

    if controller.session().view_state() == ViewState::Failed {
        bail!(
            "report {report_id} failed: {}",
            controller.session().error_message().unwrap_or_default()
        );
    }
    Ok(())
}

fn run_interactive(service: Arc<dyn ReportService>, settings: &Settings) -> Result<()> {
    let (cmd_tx, cmd_rx) = bounded(COMMAND_QUEUE_CAPACITY);
    let (ui_tx, ui_rx) = unbounded();

    let worker = backend_bridge::runtime::launch(
        cmd_rx,
        ui_tx.clone(),
        service.clone(),
        settings.catalog_refresh(),
    );
    spawn_input_reader(ui_tx);

    let controller =
        ReportSessionController::new(service).with_stale_policy(settings.stale_responses);
    let mut app = ViewerApp::new(controller, cmd_tx);

    let mut stdout = io::stdout();
    writeln!(stdout, "{}", ui::render::HELP)?;
    write!(stdout, "> ")?;
    stdout.flush()?;
    for event in ui_rx.iter() {
        let output = match app.handle_event(event) {
            Reaction::Nothing => continue,
            Reaction::Quit => break,
            Reaction::CatalogChanged => ui::render::render_catalog(app.controller().catalog()),
            Reaction::SessionChanged => ui::render::render_session(app.controller().session()),
            Reaction::Notice(message) => message,
            Reaction::Failure(error) => ui::render::render_failure(&error),
            Reaction::Help => ui::render::HELP.to_string(),
            Reaction::Export(snapshot) => serde_json::to_string_pretty(&snapshot)
                .context("failed to encode report snapshot")?,
        };
        writeln!(stdout, "{output}")?;
        write!(stdout, "> ")?;
        stdout.flush()?;
    }

    // Dropping the app closes the command queue, which also stops the worker.
    drop(app);
    if worker.join().is_err() {
        tracing::error!("backend worker panicked");
    }
    Ok(())
}

fn spawn_input_reader(ui_tx: Sender<UiEvent>) {
    thread::spawn(move || {
        forward_input_lines(io::stdin().lock(), &ui_tx);
        let _ = ui_tx.send(UiEvent::InputClosed);
    });
}

/// Sends each input line to the UI until EOF. Lines that are not valid UTF-8
/// are skipped.
fn forward_input_lines(mut input: impl BufRead, ui_tx: &Sender<UiEvent>) {
    let mut buf = Vec::new();
    loop {
        buf.clear();
        match input.read_until(b'\n', &mut buf) {
            Ok(0) => return,
            Ok(_) => {}
            Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(err) => {
                tracing::warn!("stopped reading input: {err}");
                return;
            }
        }
        let Ok(line) = std::str::from_utf8(&buf) else {
            tracing::warn!("skipping input line that is not valid UTF-8");
            continue;
        };
        let line = line.trim_end_matches(['\n', '\r']).to_string();
        if ui_tx.send(UiEvent::Input(line)).is_err() {
            return;
        }
    }
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;

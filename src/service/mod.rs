//! Background run service
//!
//! [`ScrapeService`] is what an outer surface (CLI, HTTP handler, scheduler)
//! talks to. It starts at most one traversal at a time on a tokio task and
//! exposes the run's progress and its CSV artifact while the caller stays
//! responsive.

mod guard;

pub use crate::driver::DriverFactory;
pub use guard::{RunGuard, RunPermit};

use crate::config::Config;
use crate::crawler::Coordinator;
use crate::output::{build_handlers, csv_path, OutputHandler, RunSummary};
use crate::state::{ProgressReporter, ProgressState};
use crate::GemError;
use chrono::Utc;
use serde::Serialize;
use std::path::{Component, Path, PathBuf};
use std::sync::{Arc, Mutex};
use tokio::task::JoinHandle;

/// Answer to a trigger request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerStatus {
    Started,
    AlreadyRunning,
}

impl TriggerStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Started => "started",
            Self::AlreadyRunning => "already_running",
        }
    }
}

type RunHandle = JoinHandle<Result<RunSummary, GemError>>;

/// Starts traversals in the background and reports on them
pub struct ScrapeService<F: DriverFactory> {
    factory: Arc<F>,
    config: Arc<Config>,
    config_hash: String,
    progress: ProgressReporter,
    guard: Arc<RunGuard>,
    last_run: Mutex<Option<RunHandle>>,
}

impl<F: DriverFactory> ScrapeService<F> {
    /// Creates an idle service
    ///
    /// # Arguments
    ///
    /// * `factory` - Opens one driver session per run
    /// * `config` - Configuration shared by every run
    /// * `config_hash` - Hash recorded with stored runs
    pub fn new(factory: F, config: Config, config_hash: impl Into<String>) -> Self {
        Self {
            factory: Arc::new(factory),
            config: Arc::new(config),
            config_hash: config_hash.into(),
            progress: ProgressReporter::new(),
            guard: Arc::new(RunGuard::new()),
            last_run: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Starts a run unless one is already in flight
    ///
    /// Must be called from within a tokio runtime. A rejected trigger is not
    /// queued.
    pub fn start(&self) -> TriggerStatus {
        let Some(permit) = self.guard.try_acquire() else {
            tracing::info!("Run requested while another is in progress");
            return TriggerStatus::AlreadyRunning;
        };

        self.progress.start();

        let factory = Arc::clone(&self.factory);
        let config = Arc::clone(&self.config);
        let config_hash = self.config_hash.clone();
        let progress = self.progress.clone();

        let handle = tokio::spawn(run_once(factory, config, config_hash, progress, permit));

        *self.last_run.lock().unwrap() = Some(handle);
        TriggerStatus::Started
    }

    /// Snapshot of the current (or last) run's progress
    pub fn progress(&self) -> ProgressState {
        self.progress.snapshot()
    }

    /// Handle for observers that want change notifications
    pub fn progress_reporter(&self) -> &ProgressReporter {
        &self.progress
    }

    pub fn is_running(&self) -> bool {
        self.guard.is_running()
    }

    /// Waits for the most recently started run and returns its outcome
    ///
    /// Returns `None` if no run was started since the last call.
    pub async fn wait(&self) -> Option<Result<RunSummary, GemError>> {
        let handle = self.last_run.lock().unwrap().take()?;
        Some(match handle.await {
            Ok(result) => result,
            Err(e) => Err(GemError::Task(e.to_string())),
        })
    }

    /// Resolves a plain file name inside the output directory
    ///
    /// Names with any path component other than a single file name are
    /// rejected, as are files that do not exist.
    pub fn artifact(&self, name: &str) -> Option<PathBuf> {
        let mut components = Path::new(name).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(_)), None) => {}
            _ => {
                tracing::warn!("Rejected artifact request for '{}'", name);
                return None;
            }
        }

        let path = Path::new(&self.config.output.directory).join(name);
        path.is_file().then_some(path)
    }
}

async fn run_once<F: DriverFactory>(
    factory: Arc<F>,
    config: Arc<Config>,
    config_hash: String,
    progress: ProgressReporter,
    permit: RunPermit,
) -> Result<RunSummary, GemError> {
    let started_at = Utc::now();

    let mut handlers = match build_handlers(&config, &config_hash) {
        Ok(handlers) => handlers,
        Err(e) => {
            progress.fail(&e);
            return Err(e);
        }
    };
    for handler in handlers.iter_mut() {
        if let Err(e) = handler.begin(config.traversal.direction) {
            let e = GemError::from(e);
            progress.fail(&e);
            return Err(e);
        }
    }

    let driver = match factory.open().await {
        Ok(driver) => driver,
        Err(e) => {
            let e = GemError::from(e);
            tracing::error!("Failed to open driver: {}", e);
            abort_handlers(&mut handlers, &e);
            progress.fail(&e);
            return Err(e);
        }
    };

    let mut coordinator = Coordinator::new(driver, Arc::clone(&config), progress.clone());
    let report = match coordinator.run().await {
        Ok(report) => report,
        Err(e) => {
            abort_handlers(&mut handlers, &e);
            progress.fail(&e);
            return Err(e);
        }
    };

    for handler in handlers.iter_mut() {
        if let Err(e) = handler.write_report(&report) {
            tracing::error!("{} output failed: {}", handler.name(), e);
            let e = GemError::from(e);
            progress.fail(&e);
            return Err(e);
        }
    }

    // Artifacts are in place before observers are told the run is over
    progress.complete();
    drop(permit);

    Ok(RunSummary::from_report(
        &report,
        started_at,
        csv_path(&config.output, &report),
    ))
}

fn abort_handlers(handlers: &mut [Box<dyn OutputHandler + Send>], error: &GemError) {
    let message = error.to_string();
    for handler in handlers.iter_mut() {
        if let Err(e) = handler.abort(&message) {
            tracing::warn!("{} output could not record the failure: {}", handler.name(), e);
        }
    }
}

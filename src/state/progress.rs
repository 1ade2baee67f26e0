//! Shared progress reporting
//!
//! A single writer (the traversal) publishes `{current, total, message}`
//! snapshots; any number of observers read them without blocking the writer.

use serde::Serialize;
use std::sync::Arc;
use tokio::sync::watch;

pub const NOT_STARTED_MESSAGE: &str = "Not started";
pub const STARTING_MESSAGE: &str = "Starting...";
pub const COMPLETED_MESSAGE: &str = "Scraping completed.";

/// Point-in-time view of a run's progress
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgressState {
    pub current: u32,
    pub total: u32,
    pub message: String,
}

impl ProgressState {
    /// Returns true once a run has published its completion message
    pub fn is_complete(&self) -> bool {
        self.message == COMPLETED_MESSAGE
    }
}

impl Default for ProgressState {
    fn default() -> Self {
        Self {
            current: 0,
            total: 0,
            message: NOT_STARTED_MESSAGE.to_string(),
        }
    }
}

/// Cloneable handle to the progress cell
///
/// The last published state persists after a run ends; it is only replaced
/// when the next run calls [`ProgressReporter::start`].
#[derive(Debug, Clone)]
pub struct ProgressReporter {
    tx: Arc<watch::Sender<ProgressState>>,
}

impl ProgressReporter {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(ProgressState::default());
        Self { tx: Arc::new(tx) }
    }

    /// Returns a copy of the current progress
    pub fn snapshot(&self) -> ProgressState {
        self.tx.borrow().clone()
    }

    /// Subscribes to progress changes
    pub fn subscribe(&self) -> watch::Receiver<ProgressState> {
        self.tx.subscribe()
    }

    /// Resets the cell for a new run
    pub fn start(&self) {
        self.tx.send_replace(ProgressState {
            current: 0,
            total: 0,
            message: STARTING_MESSAGE.to_string(),
        });
    }

    pub fn set_message(&self, message: impl Into<String>) {
        let message = message.into();
        self.tx.send_modify(|state| state.message = message);
    }

    pub fn set_total(&self, total: u32) {
        self.tx.send_modify(|state| state.total = total);
    }

    /// Publishes that `page_no` is about to be extracted
    pub fn page(&self, page_no: u32) {
        self.tx.send_modify(|state| {
            state.current = page_no;
            state.message = format!("Scraping page {}...", page_no);
        });
    }

    pub fn complete(&self) {
        self.set_message(COMPLETED_MESSAGE);
    }

    pub fn fail(&self, error: &dyn std::fmt::Display) {
        self.set_message(format!("Scraping failed: {}", error));
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state() {
        let progress = ProgressReporter::new();
        let snapshot = progress.snapshot();
        assert_eq!(snapshot.current, 0);
        assert_eq!(snapshot.total, 0);
        assert_eq!(snapshot.message, "Not started");
        assert!(!snapshot.is_complete());
    }

    #[test]
    fn test_run_lifecycle_messages() {
        let progress = ProgressReporter::new();

        progress.start();
        assert_eq!(progress.snapshot().message, "Starting...");

        progress.set_total(4);
        progress.page(3);
        let snapshot = progress.snapshot();
        assert_eq!(snapshot.current, 3);
        assert_eq!(snapshot.total, 4);
        assert_eq!(snapshot.message, "Scraping page 3...");

        progress.complete();
        let snapshot = progress.snapshot();
        assert!(snapshot.is_complete());
        assert_eq!(snapshot.current, 3);
    }

    #[test]
    fn test_completion_persists_until_next_start() {
        let progress = ProgressReporter::new();
        progress.start();
        progress.set_total(2);
        progress.page(2);
        progress.complete();

        let observer = progress.clone();
        assert!(observer.snapshot().is_complete());

        progress.start();
        let snapshot = observer.snapshot();
        assert_eq!(snapshot.current, 0);
        assert_eq!(snapshot.total, 0);
        assert_eq!(snapshot.message, "Starting...");
    }

    #[test]
    fn test_fail_message() {
        let progress = ProgressReporter::new();
        progress.fail(&"browser went away");
        assert_eq!(
            progress.snapshot().message,
            "Scraping failed: browser went away"
        );
    }

    #[tokio::test]
    async fn test_subscriber_sees_updates() {
        let progress = ProgressReporter::new();
        let mut rx = progress.subscribe();

        let writer = progress.clone();
        tokio::spawn(async move {
            writer.start();
            writer.set_total(1);
            writer.page(1);
            writer.complete();
        });

        let state = rx.wait_for(|state| state.is_complete()).await.unwrap();
        assert_eq!(state.total, 1);
    }
}

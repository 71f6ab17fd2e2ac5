//! Events crossing task boundaries, and the timed status line.
//!
//! The edit loop is single threaded. Everything that happens elsewhere
//! (terminal resizes, status timeouts, background saves) reaches it as an
//! `Event` on a bounded channel of `EVENT_CHANNEL_CAP`.

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::mpsc::Sender;
use tokio::task::JoinHandle;
use tracing::{debug, trace};

pub const EVENT_CHANNEL_CAP: usize = 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// The terminal now has this many columns and rows of text area.
    Resize { cols: usize, rows: usize },
    /// The last outstanding status message timed out.
    StatusCleared,
    JobFinished(JobReport),
    Shutdown,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobOutcome {
    Saved { bytes: usize },
    Failed(String),
}

/// Result of a background job, sent back to the edit loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobReport {
    pub job: &'static str,
    pub path: PathBuf,
    pub outcome: JobOutcome,
}

impl JobReport {
    pub fn is_ok(&self) -> bool {
        !matches!(self.outcome, JobOutcome::Failed(_))
    }

    /// Text suitable for the status line.
    pub fn summary(&self) -> String {
        match &self.outcome {
            JobOutcome::Saved { bytes } => format!("wrote {} ({bytes} bytes)", self.path.display()),
            JobOutcome::Failed(err) => format!("{} failed: {err}", self.job),
        }
    }
}

#[derive(Debug, Default)]
struct StatusInner {
    message: Mutex<Option<String>>,
    outstanding: AtomicUsize,
}

/// Shared status message with timed expiry.
///
/// Every `flash` bumps an outstanding counter and starts its own timer. A
/// timer only clears the message when it brings the counter back to zero,
/// so a newer message is never wiped by an older timer.
#[derive(Debug, Clone, Default)]
pub struct StatusLine {
    inner: Arc<StatusInner>,
    notify: Option<Sender<Event>>,
}

impl StatusLine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Send `Event::StatusCleared` on `tx` whenever a timeout clears the line.
    pub fn with_notify(tx: Sender<Event>) -> Self {
        Self {
            inner: Arc::default(),
            notify: Some(tx),
        }
    }

    fn message(&self) -> MutexGuard<'_, Option<String>> {
        self.inner
            .message
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Show `msg` until replaced or cleared.
    pub fn set(&self, msg: impl Into<String>) {
        let msg = msg.into();
        trace!(target: "events.status", %msg, "status_set");
        *self.message() = Some(msg);
    }

    pub fn clear(&self) {
        *self.message() = None;
    }

    pub fn current(&self) -> Option<String> {
        self.message().clone()
    }

    /// Timers still running.
    pub fn outstanding(&self) -> usize {
        self.inner.outstanding.load(Ordering::Acquire)
    }

    /// Show `msg` for `ttl`. Returns the timer task, or `None` when called
    /// outside a tokio runtime, in which case the message stays until
    /// replaced.
    pub fn flash(&self, msg: impl Into<String>, ttl: Duration) -> Option<JoinHandle<()>> {
        self.set(msg);
        let Ok(handle) = Handle::try_current() else {
            debug!(target: "events.status", "status_flash_without_runtime");
            return None;
        };
        let pending = self.inner.outstanding.fetch_add(1, Ordering::AcqRel) + 1;
        trace!(target: "events.status", pending, ttl_ms = ttl.as_millis() as u64, "status_timer_started");
        let line = self.clone();
        Some(handle.spawn(async move {
            tokio::time::sleep(ttl).await;
            line.expire().await;
        }))
    }

    async fn expire(&self) {
        let remaining = self.inner.outstanding.fetch_sub(1, Ordering::AcqRel) - 1;
        if remaining > 0 {
            trace!(target: "events.status", remaining, "status_timer_superseded");
            return;
        }
        self.clear();
        debug!(target: "events.status", "status_cleared");
        if let Some(tx) = &self.notify
            && tx.send(Event::StatusCleared).await.is_err()
        {
            trace!(target: "events.status", "status_notify_closed");
        }
    }
}

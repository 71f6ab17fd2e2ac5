//! Background jobs that must not stall the edit loop.

use core_events::{Event, JobOutcome, JobReport, StatusLine};
use core_text::{SaveOptions, TextBuffer};
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::mpsc::Sender;
use tokio::task::JoinHandle;
use tracing::{error, info};

/// Write `buffer` to `path` on the blocking pool.
///
/// The buffer is a snapshot; edits made after the call are not included.
/// The outcome is flashed on `status` for `ttl` and sent as
/// `Event::JobFinished` when `tx` is given.
pub fn spawn_save(
    buffer: TextBuffer,
    path: PathBuf,
    opts: SaveOptions,
    status: StatusLine,
    tx: Option<Sender<Event>>,
    ttl: Duration,
) -> JoinHandle<JobReport> {
    tokio::spawn(async move {
        let target = path.clone();
        let written = tokio::task::spawn_blocking(move || buffer.save(&target, opts)).await;
        let outcome = match written {
            Ok(Ok(bytes)) => {
                info!(target: "jobs", file = %path.display(), bytes, "save_job_done");
                JobOutcome::Saved { bytes }
            }
            Ok(Err(e)) => {
                error!(target: "jobs", file = %path.display(), ?e, "save_job_failed");
                JobOutcome::Failed(e.to_string())
            }
            Err(join_err) => {
                error!(target: "jobs", file = %path.display(), ?join_err, "save_job_panicked");
                JobOutcome::Failed(join_err.to_string())
            }
        };
        let report = JobReport {
            job: "save",
            path,
            outcome,
        };
        status.flash(report.summary(), ttl);
        if let Some(tx) = tx
            && tx.send(Event::JobFinished(report.clone())).await.is_err()
        {
            error!(target: "jobs", "job_report_channel_closed");
        }
        report
    })
}

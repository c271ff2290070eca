//! Follows a job until the backend reports a terminal state.
//!
//! The poller runs as a tokio task that only queries the backend and forwards what it learns
//! as [`PollEvent`]s. It never touches session state; the owner of the receiving end applies
//! the events, so poll results and user actions are handled one at a time.
use std::sync::Arc;
use std::time::Duration;

use jobs_api::models::job::JobStatusReport;
use log::{debug, info, warn};
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant};

use super::JobBackend;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
    /// Give up after this long, `None` polls until the job finishes
    pub max_duration: Option<Duration>,
}

impl Default for PollPolicy {
    fn default() -> Self {
        PollPolicy {
            interval: DEFAULT_POLL_INTERVAL,
            max_duration: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PollEvent {
    Report(JobStatusReport),
    /// The policy's `max_duration` passed before the job finished
    TimedOut { job_id: String },
}

/// The running poll task of one job. Dropping the handle stops the task.
#[derive(Debug)]
pub struct PollHandle {
    job_id: String,
    task: Option<JoinHandle<()>>,
}

impl PollHandle {
    #[must_use]
    pub fn job_id(&self) -> &str {
        &self.job_id
    }

    /// Whether the task is still querying the backend
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }

    /// Stops the task. Calling this more than once is harmless.
    pub fn cancel(&mut self) {
        if let Some(task) = self.task.take() {
            debug!("Cancelling poller of job {}", self.job_id);
            task.abort();
        }
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Starts polling `job_id`. The first query happens one interval after the call.
///
/// Transport failures are logged and the next tick goes ahead as normal. The task ends by
/// itself after forwarding a terminal report, after a timeout, or when the receiver is gone.
///
/// Must be called from within a tokio runtime.
pub fn spawn(
    backend: Arc<dyn JobBackend>,
    job_id: String,
    policy: PollPolicy,
    events: UnboundedSender<PollEvent>,
) -> PollHandle {
    info!("Polling job {job_id} every {:?}", policy.interval);
    let task_job_id = job_id.clone();
    let task = tokio::spawn(async move {
        let job_id = task_job_id;
        let started = Instant::now();
        loop {
            time::sleep(policy.interval).await;

            match backend.job_status(&job_id).await {
                Ok(report) => {
                    let terminal = report.status.is_terminal();
                    debug!(
                        "Job {job_id}: {} ({}/{})",
                        report.status, report.processed, report.total
                    );
                    if events.send(PollEvent::Report(report)).is_err() || terminal {
                        break;
                    }
                }
                Err(err) => warn!("Unable to fetch status of job {job_id}: {err}"),
            }

            if let Some(max) = policy.max_duration {
                if started.elapsed() >= max {
                    info!("Stopped polling job {job_id} after {max:?}");
                    let _ = events.send(PollEvent::TimedOut { job_id });
                    break;
                }
            }
        }
    });

    PollHandle {
        job_id,
        task: Some(task),
    }
}

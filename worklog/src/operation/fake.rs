// Scripted job backend for tests which run the poller on a real tokio task, where a failed
// mock expectation would only panic the task and go unnoticed.
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use jobs_api::models::job::{
    CreateJobRequest, CreateJobResponse, JobStatus, JobStatusReport, TaskError,
};
use jobs_api::{ApiError, StatusCode};

use super::JobBackend;

pub enum Reply {
    Status(JobStatusReport),
    Unreachable,
}

pub struct ScriptedBackend {
    script: Mutex<VecDeque<Reply>>,
    repeat: Option<JobStatusReport>,
    created: Mutex<Vec<CreateJobRequest>>,
    status_calls: AtomicUsize,
    create_fails: bool,
}

impl ScriptedBackend {
    pub fn new(script: Vec<Reply>) -> Self {
        ScriptedBackend {
            script: Mutex::new(script.into()),
            repeat: None,
            created: Mutex::new(vec![]),
            status_calls: AtomicUsize::new(0),
            create_fails: false,
        }
    }

    /// Answers every status query with `report`
    pub fn repeating(report: JobStatusReport) -> Self {
        ScriptedBackend {
            repeat: Some(report),
            ..Self::new(vec![])
        }
    }

    pub fn failing_creation() -> Self {
        ScriptedBackend {
            create_fails: true,
            ..Self::new(vec![])
        }
    }

    pub fn status_calls(&self) -> usize {
        self.status_calls.load(Ordering::SeqCst)
    }

    pub fn created(&self) -> Vec<CreateJobRequest> {
        self.created.lock().unwrap().clone()
    }
}

#[async_trait]
impl JobBackend for ScriptedBackend {
    async fn create_job(
        &self,
        _token: &str,
        batch: &CreateJobRequest,
    ) -> Result<CreateJobResponse, ApiError> {
        if self.create_fails {
            return Err(ApiError::Fault {
                code: StatusCode::BAD_GATEWAY,
                message: None,
            });
        }
        self.created.lock().unwrap().push(batch.clone());
        #[allow(clippy::cast_possible_truncation)]
        let dates = batch.dates.split(',').count() as u32;
        #[allow(clippy::cast_possible_truncation)]
        let tickets = batch.tickets.len() as u32;
        Ok(CreateJobResponse {
            job_id: "job-1".to_string(),
            total: tickets * dates,
            message: "Job created".to_string(),
        })
    }

    async fn job_status(&self, _job_id: &str) -> Result<JobStatusReport, ApiError> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(report) = &self.repeat {
            return Ok(report.clone());
        }
        match self.script.lock().unwrap().pop_front() {
            Some(Reply::Status(report)) => Ok(report),
            Some(Reply::Unreachable) | None => Err(ApiError::Fault {
                code: StatusCode::SERVICE_UNAVAILABLE,
                message: None,
            }),
        }
    }
}

/// Status report of `job-1` with 4 tasks
pub fn report(status: JobStatus, processed: u32, failed: u32) -> JobStatusReport {
    let errors = (0..failed)
        .map(|n| TaskError {
            ticket_id: format!("ABC-{n}"),
            date: "20/Aug/25".to_string(),
            error: "Issue does not exist".to_string(),
        })
        .collect();
    JobStatusReport {
        job_id: "job-1".to_string(),
        total: 4,
        processed,
        failed,
        status,
        progress: f64::from(processed) * 25.0,
        errors: Some(errors),
        created_at: None,
        updated_at: None,
    }
}

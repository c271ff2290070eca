use std::fmt::{self, Formatter};

use serde::{Deserialize, Serialize};

/// Every successful response from the backend wraps its payload in a `data` field
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Envelope<T> {
    pub data: T,
}

/// Body of a failed request, `{ "message": "..." }`
#[derive(Debug, Serialize, Deserialize, Default)]
pub struct ErrorBody {
    pub message: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CreateJobRequest {
    /// Comma separated list of dates, i.e. `20/Aug/25, 21/Aug/25`
    pub dates: String,
    pub jira_instance: String,
    pub username: String,
    pub tickets: Vec<TicketPayload>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TicketPayload {
    pub ticket_id: String,
    /// Hours, sent as text, i.e. `"1"` or `"2.25"`
    pub time_spend: String,
    pub description: String,
    pub type_of_work: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CreateJobResponse {
    pub job_id: String,
    /// Number of tasks, one per ticket and date
    pub total: u32,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum JobStatus {
    InProgress,
    Completed,
    Failed,
}

impl JobStatus {
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            JobStatus::InProgress => write!(f, "in-progress"),
            JobStatus::Completed => write!(f, "completed"),
            JobStatus::Failed => write!(f, "failed"),
        }
    }
}

/// A single task (ticket on a date) the backend could not register
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TaskError {
    pub ticket_id: String,
    pub date: String,
    pub error: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct JobStatusReport {
    pub job_id: String,
    pub total: u32,
    pub processed: u32,
    pub failed: u32,
    pub status: JobStatus,
    /// Percentage, 0 to 100
    pub progress: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<TaskError>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

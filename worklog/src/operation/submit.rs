//! Turns a prepared batch into a processing job on the backend.
//!
//! The batch is sanitized and validated once more before anything is sent; an invalid batch
//! never reaches the network. There is no automatic retry, a failed creation is reported back
//! to the user who decides what to do.
use jobs_api::models::job::{CreateJobRequest, CreateJobResponse, TicketPayload};
use log::{debug, info};
use thiserror::Error;

use super::JobBackend;
use crate::sanitize;
use crate::types::WorkEntry;
use crate::validate::{self, BatchCandidate, ValidationErrors};

pub const CREATE_JOB_FALLBACK: &str =
    "Error creating job. Please check your connection and try again.";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubmitError {
    #[error("The batch is not valid: {0}")]
    Invalid(ValidationErrors),
    /// The job could not be created, holds the message to show the user
    #[error("{0}")]
    Transport(String),
}

/// Sanitizes every field of the batch again, so nothing unsanitized slips through if the
/// caller bypassed the input handlers
fn resanitize(batch: &BatchCandidate<'_>) -> (String, String, String, Vec<WorkEntry>) {
    let entries = batch
        .entries
        .iter()
        .map(|e| WorkEntry {
            ticket_id: sanitize::sanitize_ticket_id(&e.ticket_id),
            description: sanitize::sanitize_description(&e.description),
            time_spend: sanitize::clamp_hours(e.time_spend),
            ..e.clone()
        })
        .collect();
    (
        sanitize::sanitize_account(batch.username),
        sanitize::sanitize_token(batch.token),
        sanitize::sanitize_dates(batch.dates),
        entries,
    )
}

/// The wire representation of a valid batch. Text fields are trimmed and hours are rendered
/// in their shortest form, `1` rather than `1.0`.
#[must_use]
pub fn build_request(batch: &BatchCandidate<'_>) -> CreateJobRequest {
    CreateJobRequest {
        dates: batch.dates.trim().to_string(),
        jira_instance: batch.jira_instance.to_string(),
        username: batch.username.trim().to_string(),
        tickets: batch
            .entries
            .iter()
            .map(|e| TicketPayload {
                ticket_id: e.ticket_id.trim().to_string(),
                time_spend: e.time_spend.to_string(),
                description: e.description.trim().to_string(),
                type_of_work: e.type_of_work.to_string(),
            })
            .collect(),
    }
}

/// Validates the batch and creates a job for it.
///
/// # Errors
/// `SubmitError::Invalid` without any network traffic if the batch does not validate,
/// `SubmitError::Transport` if the backend could not create the job
pub async fn execute(
    backend: &dyn JobBackend,
    batch: &BatchCandidate<'_>,
) -> Result<CreateJobResponse, SubmitError> {
    let (username, token, dates, entries) = resanitize(batch);
    let sanitized = BatchCandidate {
        username: &username,
        token: &token,
        dates: &dates,
        jira_instance: batch.jira_instance,
        entries: &entries,
    };
    validate::validate_batch(&sanitized).map_err(SubmitError::Invalid)?;

    let request = build_request(&sanitized);
    debug!("Creating job for {} tickets on '{}'", request.tickets.len(), request.dates);

    match backend.create_job(token.trim(), &request).await {
        Ok(created) => {
            info!("Job {} created with {} tasks", created.job_id, created.total);
            Ok(created)
        }
        Err(err) => {
            info!("Job creation failed: {err}");
            Err(SubmitError::Transport(err.user_message(CREATE_JOB_FALLBACK)))
        }
    }
}

//! Routes relaying the browser's job requests to the job backend.
//!
//! Upstream payloads are passed back untouched; only failures are rewritten into
//! `{"message": ...}` bodies.
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::{header::AUTHORIZATION, HeaderMap},
    Json,
};
use jobs_api::{
    models::job::{CreateJobRequest, TicketPayload},
    JobsApi,
};
use log::{debug, info};
use serde::Deserialize;
use serde_json::Value;

use crate::error::RelayError;

pub const CREATE_JOB_FALLBACK: &str =
    "Error creating job. Please check your connection and try again.";
pub const JOB_STATUS_FALLBACK: &str = "Error fetching job status. Please try again.";

#[derive(Clone)]
pub struct AppState {
    pub api: Arc<JobsApi>,
}

/// Job creation request as sent by the browser: the backend payload plus the token
#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct RelayJobRequest {
    pub dates: Option<String>,
    pub jira_instance: Option<String>,
    pub username: Option<String>,
    pub token: Option<String>,
    pub tickets: Option<Vec<RelayTicket>>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct RelayTicket {
    pub ticket_id: String,
    /// A number or a string, the backend wants a string
    pub time_spend: Value,
    pub description: String,
    pub type_of_work: String,
}

/// Renders `timeSpend` the way the backend expects it; `1.0` becomes `"1"`
#[must_use]
pub fn time_spend_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n
            .as_f64()
            .map_or_else(|| n.to_string(), |hours| hours.to_string()),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn present(value: Option<&String>) -> Option<&str> {
    value.map(String::as_str).filter(|v| !v.is_empty())
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
}

/// `POST /timesheet/jobs`
pub async fn create_job(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Value>, RelayError> {
    let payload: RelayJobRequest = serde_json::from_slice(&body)
        .map_err(|e| RelayError::Internal(format!("Unreadable request body: {e}")))?;

    let token = present(payload.token.as_ref())
        .map(str::to_string)
        .or_else(|| bearer_token(&headers));
    let (Some(dates), Some(jira_instance), Some(username), Some(token)) = (
        present(payload.dates.as_ref()),
        present(payload.jira_instance.as_ref()),
        present(payload.username.as_ref()),
        token,
    ) else {
        return Err(RelayError::BadRequest("Missing required fields"));
    };

    let request = CreateJobRequest {
        dates: dates.to_string(),
        jira_instance: jira_instance.to_string(),
        username: username.to_string(),
        tickets: payload
            .tickets
            .unwrap_or_default()
            .into_iter()
            .map(|t| TicketPayload {
                time_spend: time_spend_text(&t.time_spend),
                ticket_id: t.ticket_id,
                description: t.description,
                type_of_work: t.type_of_work,
            })
            .collect(),
    };
    info!(
        "Relaying job for {} with {} tickets",
        request.username,
        request.tickets.len()
    );

    let created = state
        .api
        .create_job_raw::<Value>(&token, &request)
        .await
        .map_err(|e| RelayError::from_api(&e, CREATE_JOB_FALLBACK))?;
    Ok(Json(created))
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct StatusQuery {
    pub job_id: Option<String>,
}

/// `GET /timesheet/jobs/status?jobId=...`
pub async fn job_status(
    State(state): State<AppState>,
    Query(query): Query<StatusQuery>,
) -> Result<Json<Value>, RelayError> {
    let Some(job_id) = present(query.job_id.as_ref()) else {
        return Err(RelayError::BadRequest("Job ID is required"));
    };
    debug!("Relaying status query for job {job_id}");

    let report = state
        .api
        .job_status_raw::<Value>(job_id)
        .await
        .map_err(|e| RelayError::from_api(&e, JOB_STATUS_FALLBACK))?;
    Ok(Json(report))
}

//!
//! `jobs_api` is a small client for the timesheet job backend.
//!
//! The backend accepts a batch of work log entries, turns it into an asynchronous job and
//! reports the progress of that job. The types in [`models::job`] mirror the JSON exchanged
//! with the backend and are hence not generic.
use std::{
    error::Error,
    fmt::{self, Formatter},
};

use log::debug;
use models::job::{CreateJobRequest, CreateJobResponse, Envelope, ErrorBody, JobStatusReport};
use reqwest::{
    header::{ACCEPT, CONTENT_TYPE},
    Client, Method, RequestBuilder,
};
use serde::{de::DeserializeOwned, Serialize};
use url::{ParseError, Url};

pub mod builder;
pub mod models;

pub use reqwest::StatusCode;

type Result<T> = std::result::Result<T, ApiError>;

#[derive(Debug)]
pub enum ApiError {
    /// The backend answered with a non-2xx status, optionally explaining why
    Fault {
        code: StatusCode,
        message: Option<String>,
    },
    RequiredParameter(String),
    RequestError(reqwest::Error),
    SerializationError(serde_json::error::Error),
    ParseError(ParseError),
}

impl ApiError {
    /// The message to show a user: the one supplied by the backend if there is one,
    /// `fallback` otherwise.
    #[must_use]
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            ApiError::Fault {
                message: Some(message),
                ..
            } if !message.trim().is_empty() => message.clone(),
            _ => fallback.to_string(),
        }
    }

    /// Status code returned by the backend, if we got that far
    #[must_use]
    pub fn status_code(&self) -> Option<StatusCode> {
        match self {
            ApiError::Fault { code, .. } => Some(*code),
            ApiError::RequestError(e) => e.status(),
            _ => None,
        }
    }
}

#[allow(clippy::enum_glob_use)]
impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        use crate::ApiError::*;

        match self {
            Fault { code, message } => match message {
                Some(message) => write!(f, "Job backend error ({code}): {message}"),
                None => write!(f, "Job backend error ({code})"),
            },
            RequiredParameter(param_name) => {
                write!(f, "Parameter '{param_name}' must contain a value")
            }
            RequestError(e) => write!(f, "Unable to reach the job backend: {e}"),
            SerializationError(e) => write!(f, "Could not serialize/deserialize: {e}"),
            ParseError(e) => write!(f, "Invalid job backend url: {e}"),
        }
    }
}

impl Error for ApiError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ApiError::RequestError(e) => Some(e),
            ApiError::SerializationError(e) => Some(e),
            ApiError::ParseError(e) => Some(e),
            ApiError::Fault { .. } | ApiError::RequiredParameter(_) => None,
        }
    }
}

impl From<ParseError> for ApiError {
    fn from(error: ParseError) -> ApiError {
        ApiError::ParseError(error)
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(error: reqwest::Error) -> ApiError {
        ApiError::RequestError(error)
    }
}

impl From<serde_json::error::Error> for ApiError {
    fn from(error: serde_json::error::Error) -> ApiError {
        ApiError::SerializationError(error)
    }
}

#[derive(Clone, Debug)]
pub enum Credentials {
    Anonymous,
    Bearer(String),
}

impl Credentials {
    fn apply(&self, request: RequestBuilder) -> RequestBuilder {
        match self {
            Credentials::Anonymous => request,
            Credentials::Bearer(ref token) => request.bearer_auth(token.to_owned()),
        }
    }
}

#[derive(Clone, Debug)]
pub struct JobsApi {
    base: Url,
    pub client: Client,
}

impl JobsApi {
    #[allow(clippy::missing_errors_doc)]
    pub fn new<B>(base: B) -> Result<JobsApi>
    where
        B: Into<String>,
    {
        JobsApi::with_client(base, Client::new())
    }

    #[allow(clippy::missing_errors_doc)]
    pub fn with_client<B>(base: B, client: Client) -> Result<JobsApi>
    where
        B: Into<String>,
    {
        let base = Url::parse(&base.into())?;
        Ok(JobsApi { base, client })
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Resources are appended to the base url as-is, so a base of `https://host/api` and
    /// the resource `/jobs` gives `https://host/api/jobs`.
    fn resource_url(&self, endpoint: &str) -> Result<Url> {
        let base = self.base.as_str().trim_end_matches('/');
        Ok(Url::parse(&format!("{base}{endpoint}"))?)
    }

    async fn request<D>(
        &self,
        method: Method,
        endpoint: &str,
        credentials: &Credentials,
        body: Option<Vec<u8>>,
    ) -> Result<D>
    where
        D: DeserializeOwned,
    {
        let url = self.resource_url(endpoint)?;

        let mut request = self
            .client
            .request(method, url)
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json");

        request = credentials.apply(request);

        if let Some(body) = body {
            request = request.body(body);
        }
        debug!("request '{:?}'", request);

        let response = request.send().await?;

        let status = response.status();
        let body = &response.text().await?;
        debug!("status {:?} body '{:?}'", status, body);
        if status.is_success() {
            let data = if body.is_empty() { "null" } else { body };
            Ok(serde_json::from_str::<D>(data)?)
        } else {
            Err(ApiError::Fault {
                code: status,
                message: serde_json::from_str::<ErrorBody>(body)
                    .ok()
                    .and_then(|e| e.message),
            })
        }
    }

    #[allow(clippy::missing_errors_doc)]
    pub async fn get<D>(&self, endpoint: &str, credentials: &Credentials) -> Result<D>
    where
        D: DeserializeOwned,
    {
        self.request::<D>(Method::GET, endpoint, credentials, None)
            .await
    }

    #[allow(clippy::missing_errors_doc)]
    pub async fn post<D, S>(&self, endpoint: &str, credentials: &Credentials, body: &S) -> Result<D>
    where
        D: DeserializeOwned,
        S: Serialize,
    {
        let data = serde_json::to_string::<S>(body)?;
        self.request::<D>(Method::POST, endpoint, credentials, Some(data.into_bytes()))
            .await
    }

    /// Creates a new processing job for the supplied batch. The `token` is sent as a bearer
    /// credential, never in the body.
    #[allow(clippy::missing_errors_doc)]
    pub async fn create_job(
        &self,
        token: &str,
        batch: &CreateJobRequest,
    ) -> Result<CreateJobResponse> {
        let envelope = self.create_job_raw::<Envelope<CreateJobResponse>>(token, batch).await?;
        Ok(envelope.data)
    }

    /// Same as [`JobsApi::create_job`], but leaves the decoding of the response to the caller
    #[allow(clippy::missing_errors_doc)]
    pub async fn create_job_raw<D>(&self, token: &str, batch: &CreateJobRequest) -> Result<D>
    where
        D: DeserializeOwned,
    {
        if token.is_empty() {
            return Err(ApiError::RequiredParameter("token".to_string()));
        }
        self.post::<D, CreateJobRequest>(
            Self::jobs_resource(),
            &Credentials::Bearer(token.to_string()),
            batch,
        )
        .await
    }

    #[allow(clippy::missing_errors_doc)]
    pub async fn job_status(&self, job_id: &str) -> Result<JobStatusReport> {
        let envelope = self.job_status_raw::<Envelope<JobStatusReport>>(job_id).await?;
        Ok(envelope.data)
    }

    #[allow(clippy::missing_errors_doc)]
    pub async fn job_status_raw<D>(&self, job_id: &str) -> Result<D>
    where
        D: DeserializeOwned,
    {
        if job_id.is_empty() {
            return Err(ApiError::RequiredParameter("jobId".to_string()));
        }
        self.get::<D>(&Self::job_status_resource(job_id), &Credentials::Anonymous)
            .await
    }

    // -----------------------
    // Static methods
    fn jobs_resource() -> &'static str {
        "/jobs"
    }

    fn job_status_resource(job_id: &str) -> String {
        format!("/jobs/status?jobId={}", urlencoding::encode(job_id))
    }
}

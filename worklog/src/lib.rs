//! Client side of the timesheet batch submission.
//!
//! User input is sanitized ([`sanitize`]), validated ([`validate`]) and collected into a batch
//! ([`tickets`]). A [`flow::Session`] drives the batch through its steps, submits it as a job
//! ([`operation::submit`]) and follows the job until it is done ([`operation::poll`]).
use std::sync::Arc;

use crate::error::WorklogError;
use config::AppConfiguration;
use flow::Session;
use jobs_api::models::job::JobStatusReport;
use jobs_api::JobsApi;
use log::debug;
use operation::JobBackend;

pub mod config;
pub mod error;
pub mod flow;
pub mod operation;
pub mod sanitize;
pub mod tickets;
pub mod types;
pub mod validate;

pub struct ApplicationRuntime {
    config: AppConfiguration,
    client: Arc<JobsApi>,
}

impl ApplicationRuntime {
    /// Creates a new instance of `ApplicationRuntime` from the configuration file.
    ///
    /// # Errors
    ///
    /// - Returns an error if the configuration fails to load.
    /// - Returns an error if the creation of the job backend client fails.
    pub fn new() -> Result<Self, WorklogError> {
        let config = config::load()?;
        Self::from_config(config)
    }

    /// Creates the runtime for an explicit configuration. The `TIMESHEET_API_URL` and
    /// `TIMESHEET_API_TIMEOUT` environment variables override the configured values.
    ///
    /// # Errors
    ///
    /// Returns an error if the job backend client cannot be created
    pub fn from_config(config: AppConfiguration) -> Result<Self, WorklogError> {
        let client = JobsApi::builder()
            .base_url(config.api.url.clone())
            .from_env()
            .build()?;
        debug!("Job backend at {}", client.base_url());

        Ok(ApplicationRuntime {
            config,
            client: Arc::new(client),
        })
    }

    #[must_use]
    pub fn config(&self) -> &AppConfiguration {
        &self.config
    }

    #[must_use]
    pub fn jobs_api(&self) -> &JobsApi {
        &self.client
    }

    /// A fresh session on the setup step, using the configured Jira instance and poll policy
    #[must_use]
    pub fn new_session(&self) -> Session {
        let backend: Arc<dyn JobBackend> = self.client.clone();
        let mut session = Session::new(backend, self.config.submission.poll_policy());
        session.set_jira_instance(self.config.submission.jira_instance);
        session
    }

    /// One off status query of an existing job
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be reached or does not know the job
    pub async fn job_status(&self, job_id: &str) -> Result<JobStatusReport, WorklogError> {
        Ok(self.client.job_status(job_id.trim()).await?)
    }
}

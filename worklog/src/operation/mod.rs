/// This module represents the two use cases of the job backend, submitting a batch and
/// following the resulting job, with a submodule for each of them.
use async_trait::async_trait;
use jobs_api::{
    models::job::{CreateJobRequest, CreateJobResponse, JobStatusReport},
    ApiError, JobsApi,
};

pub mod poll;
pub mod submit;

#[cfg(test)]
pub(crate) mod fake;

// Job backend operations needed by the submission and polling use cases
#[async_trait]
pub trait JobBackend: Send + Sync {
    async fn create_job(
        &self,
        token: &str,
        batch: &CreateJobRequest,
    ) -> Result<CreateJobResponse, ApiError>;
    async fn job_status(&self, job_id: &str) -> Result<JobStatusReport, ApiError>;
}

#[async_trait]
impl JobBackend for JobsApi {
    async fn create_job(
        &self,
        token: &str,
        batch: &CreateJobRequest,
    ) -> Result<CreateJobResponse, ApiError> {
        self.create_job(token, batch).await
    }

    async fn job_status(&self, job_id: &str) -> Result<JobStatusReport, ApiError> {
        self.job_status(job_id).await
    }
}

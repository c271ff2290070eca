use std::{io, path::PathBuf};

use jobs_api::{builder::ApiBuilderError, ApiError};
use thiserror::Error;
use url::ParseError;

use crate::flow::FlowError;

#[allow(clippy::module_name_repetitions)]
#[derive(Error, Debug)]
pub enum WorklogError {
    #[error("Unable to load the application configuration file {path:?}")]
    ApplicationConfig { path: PathBuf, source: io::Error },
    #[error("Unable to parse contents of {path}")]
    TomlParse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("Unable to create configuration file {path}")]
    ConfigFileCreation { path: PathBuf },
    #[error("Unable to determine the configuration directory")]
    NoConfigDirectory,
    #[error("Job backend error: {0}")]
    Api(String),
    #[error("Unable to create the job backend client: {0}")]
    ApiClient(String),
    #[error("Could not make sense of input: {0}")]
    BadInput(String),
    #[error("Unable to parse the url: {0}")]
    InvalidUrl(ParseError),
    #[error("{0}")]
    Flow(#[from] FlowError),
    #[error("Job {job_id} failed, {failed} of its tasks could not be logged")]
    JobFailed { job_id: String, failed: u32 },
}

impl From<ApiError> for WorklogError {
    fn from(err: ApiError) -> Self {
        WorklogError::Api(format!("{err}"))
    }
}

impl From<ApiBuilderError> for WorklogError {
    fn from(err: ApiBuilderError) -> Self {
        WorklogError::ApiClient(format!("{err}"))
    }
}

impl From<ParseError> for WorklogError {
    fn from(value: ParseError) -> Self {
        WorklogError::InvalidUrl(value)
    }
}

//!
//! ```rust,ignore
//! // 1. Using the builder with explicit configuration
//! let api = JobsApi::builder()
//!     .base_url("https://timesheet.example.com/api")
//!     .timeout(30)
//!     .build()
//!     .expect("Failed to create job backend client");
//!
//! // 2. Using environment variables
//! let api = JobsApi::builder()
//!     .from_env()
//!     .build()
//!     .expect("Failed to create job backend client");
//!
//! // 3. Direct shortcut for environment variables
//! let api = ApiBuilder::create_from_env()
//!     .expect("Failed to create job backend client");
//! ```
use crate::JobsApi;
use log::debug;
use reqwest::Client;
use std::env;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Error type for `ApiBuilder` operations
#[derive(Error, Debug)]
pub enum ApiBuilderError {
    #[error("Environment variable {0} not set")]
    EnvVarNotSet(String),

    #[error("URL parsing error: {0}")]
    UrlParseError(#[from] url::ParseError),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("HTTP client initialization error: {0}")]
    ClientInitError(String),

    #[error("Timeout must be positive")]
    InvalidTimeout,
}

/// Names of the environment variables used to configure the client
pub struct ApiEnvVars;

impl ApiEnvVars {
    pub const URL: &'static str = "TIMESHEET_API_URL";
    pub const TIMEOUT: &'static str = "TIMESHEET_API_TIMEOUT";
}

/// Builder for creating `JobsApi` instances with flexible configuration options
#[derive(Default)]
pub struct ApiBuilder {
    base_url: Option<String>,
    timeout: Option<Duration>,
    invalid_timeout: bool,
}

impl ApiBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the base url of the job backend, i.e. `https://timesheet.example.com/api`
    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Sets a request timeout in seconds
    #[must_use]
    pub fn timeout(mut self, seconds: u64) -> Self {
        if seconds == 0 {
            self.invalid_timeout = true;
        } else {
            self.timeout = Some(Duration::from_secs(seconds));
        }
        self
    }

    /// Picks up whatever is available from the environment; explicit settings made
    /// after this call take precedence.
    #[must_use]
    pub fn from_env(self) -> Self {
        let mut builder = self;

        if let Ok(url) = env::var(ApiEnvVars::URL) {
            builder = builder.base_url(url);
        }

        if let Ok(timeout) = env::var(ApiEnvVars::TIMEOUT) {
            match timeout.trim().parse::<u64>() {
                Ok(seconds) => builder = builder.timeout(seconds),
                Err(_) => builder.invalid_timeout = true,
            }
        }

        builder
    }

    /// Builds the client
    ///
    /// # Errors
    /// If the base url is missing or malformed, the timeout is not positive, or the http
    /// client cannot be created.
    pub fn build(self) -> Result<JobsApi, ApiBuilderError> {
        if self.invalid_timeout {
            return Err(ApiBuilderError::InvalidTimeout);
        }

        let base_url = self
            .base_url
            .ok_or_else(|| ApiBuilderError::EnvVarNotSet(ApiEnvVars::URL.to_string()))?;

        let url = Url::parse(&base_url)?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ApiBuilderError::InvalidUrl(base_url));
        }

        let mut client_builder = Client::builder();
        if let Some(timeout) = self.timeout {
            client_builder = client_builder.timeout(timeout);
        }

        let client = client_builder
            .build()
            .map_err(|e| ApiBuilderError::ClientInitError(e.to_string()))?;

        let api = JobsApi::with_client(url.as_str(), client)
            .map_err(|e| ApiBuilderError::InvalidUrl(e.to_string()))?;
        debug!("Created job backend client: {:?}", api.base_url());

        Ok(api)
    }

    /// Convenience method to create a client from environment variables
    ///
    /// # Errors
    /// See [`ApiBuilder::build`]
    pub fn create_from_env() -> Result<JobsApi, ApiBuilderError> {
        Self::new().from_env().build()
    }
}

impl JobsApi {
    #[must_use]
    pub fn builder() -> ApiBuilder {
        ApiBuilder::new()
    }
}

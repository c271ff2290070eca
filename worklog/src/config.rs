use crate::error::WorklogError;
use crate::operation::poll::{PollPolicy, DEFAULT_POLL_INTERVAL};
use crate::types::JiraInstance;
use anyhow::{Context, Result};
use directories::ProjectDirs;
use log::debug;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Application configuration struct
/// Holds where the job backend lives and how submissions are followed up
#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
pub struct AppConfiguration {
    pub api: ApiConfiguration,

    /// Older files have no `submission` section, the defaults are used for those
    #[serde(default)]
    pub submission: SubmissionSettings,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
pub struct ApiConfiguration {
    /// Base url of the job backend, e.g. `https://timesheet.example.com/api`
    pub url: String,
}

/// Holds the configuration for the `submission` section of the Toml file
#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
pub struct SubmissionSettings {
    #[serde(default)]
    pub jira_instance: JiraInstance,
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
    /// Stop following a job after this many seconds, follow it forever if missing
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_poll_secs: Option<u64>,
}

impl Default for SubmissionSettings {
    fn default() -> Self {
        SubmissionSettings {
            jira_instance: JiraInstance::default(),
            poll_interval_secs: default_poll_interval_secs(),
            max_poll_secs: None,
        }
    }
}

impl SubmissionSettings {
    #[must_use]
    pub fn poll_policy(&self) -> PollPolicy {
        PollPolicy {
            interval: Duration::from_secs(self.poll_interval_secs.max(1)),
            max_duration: self.max_poll_secs.map(Duration::from_secs),
        }
    }
}

fn default_poll_interval_secs() -> u64 {
    DEFAULT_POLL_INTERVAL.as_secs()
}

/// Filename holding the application configuration parameters
///
/// # Errors
/// If no home directory can be found for the current user
pub fn configuration_file() -> Result<PathBuf, WorklogError> {
    Ok(project_dirs()?.preference_dir().join("config.toml"))
}

#[allow(clippy::missing_errors_doc)]
pub fn load() -> Result<AppConfiguration, WorklogError> {
    let config_path = configuration_file()?;
    debug!("Loading configuration from {}", config_path.display());
    read(&config_path)
}

#[allow(clippy::missing_errors_doc)]
pub fn save(cfg: &AppConfiguration) -> Result<()> {
    create_configuration_file(cfg, &configuration_file()?)
}

#[allow(clippy::missing_errors_doc)]
pub fn remove() -> io::Result<()> {
    let path = configuration_file().map_err(|e| io::Error::new(io::ErrorKind::NotFound, e))?;
    fs::remove_file(path.as_path())
}

#[allow(clippy::missing_errors_doc)]
pub fn application_config_to_string(cfg: &AppConfiguration) -> Result<String> {
    Ok(toml::to_string::<AppConfiguration>(cfg)?)
}

fn project_dirs() -> Result<ProjectDirs, WorklogError> {
    ProjectDirs::from("com", "norn", "timesheet").ok_or(WorklogError::NoConfigDirectory)
}

/// Reads the `Application` configuration struct from the supplied TOML file
fn read(path: &Path) -> Result<AppConfiguration, WorklogError> {
    let mut file = File::open(path).map_err(|source| WorklogError::ApplicationConfig {
        path: path.into(),
        source,
    })?;
    let mut contents = String::new();
    file.read_to_string(&mut contents)
        .map_err(|source| WorklogError::ApplicationConfig {
            path: path.into(),
            source,
        })?;
    toml::from_str::<AppConfiguration>(&contents).map_err(|source| WorklogError::TomlParse {
        path: path.into(),
        source,
    })
}

fn create_configuration_file(cfg: &AppConfiguration, path: &Path) -> Result<()> {
    let directory = path
        .parent()
        .with_context(|| format!("{} has no parent directory", path.display()))?;
    if !directory.try_exists()? {
        fs::create_dir_all(directory)?;
    }

    let mut file = File::create(path)
        .map_err(|_src_err| WorklogError::ConfigFileCreation { path: path.into() })?;
    let toml = application_config_to_string(cfg)?;
    file.write_all(toml.as_bytes())?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toml_parsing() {
        let toml_str = r#"
        [api]
        url = "https://timesheet.example.com/api"

        [submission]
        jira_instance = "jiradc"
        poll_interval_secs = 5
        max_poll_secs = 600
        "#;

        let app_config: AppConfiguration = toml::from_str(toml_str).unwrap();
        assert_eq!(app_config.submission.jira_instance, JiraInstance::JiraDc);
        assert_eq!(
            app_config.submission.poll_policy(),
            PollPolicy {
                interval: Duration::from_secs(5),
                max_duration: Some(Duration::from_secs(600)),
            }
        );
    }

    /// Verifies that the `submission` section gets reasonable defaults even if it does not
    /// exist in the configuration file on disk
    #[test]
    fn test_toml_parsing_with_defaults_generated() {
        let toml_str = r#"
        [api]
        url = "http://localhost:3000"
        "#;

        let app_config: AppConfiguration = toml::from_str(toml_str).unwrap();
        assert_eq!(app_config.submission, SubmissionSettings::default());
        assert_eq!(app_config.submission.poll_policy(), PollPolicy::default());
    }

    #[test]
    fn test_write_and_read_toml_file() -> Result<()> {
        let tmp_config_file = std::env::temp_dir()
            .join("timesheet-config-test")
            .join("test-config.toml");

        let cfg = AppConfiguration {
            api: ApiConfiguration {
                url: "http://localhost:3000/api".to_string(),
            },
            submission: SubmissionSettings {
                jira_instance: JiraInstance::Jira9,
                poll_interval_secs: 3,
                max_poll_secs: Some(120),
            },
        };

        create_configuration_file(&cfg, &tmp_config_file)?;
        let result = read(&tmp_config_file)?;
        assert_eq!(cfg, result);
        fs::remove_file(&tmp_config_file)?;

        Ok(())
    }
}

use std::fmt::{self, Formatter};

use clap::{Args, Parser, Subcommand, ValueEnum};
use worklog::types::JiraInstance;

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug)]
pub(crate) enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Warn => write!(f, "warn"),
            LogLevel::Error => write!(f, "error"),
        }
    }
}

#[derive(Parser)]
/// Timesheet batch utility - submit work log entries for a list of dates and follow the job
///
/// Dates are given as a comma separated list like `20/Aug/25, 21/Aug/25`. Every ticket is
/// logged on every date, and the hours of all tickets may not exceed 8 per day.
///
/// Hours are decimal numbers with at most two decimals, i.e. 0.25, 1.5 or 8.
#[command(author, version, about)] // Read from Cargo.toml
pub(crate) struct Opts {
    #[command(subcommand)]
    pub cmd: Command,

    #[arg(global = true, short, long)]
    pub verbosity: Option<LogLevel>,
}

#[derive(Subcommand)]
pub(crate) enum Command {
    /// Submit a batch of work log entries and wait for the job to finish
    Submit(Submit),
    /// Get the status of a submitted job
    Status(Status),
    /// Subcommands for configuration
    Config(Config),
}

#[derive(Args)]
pub(crate) struct Submit {
    /// Your Jira user name
    #[arg(short, long)]
    pub user: String,
    /// The Jira access token. Read from TIMESHEET_TOKEN if not given
    #[arg(short, long)]
    pub token: Option<String>,
    /// Dates to log the work on: --dates "20/Aug/25, 21/Aug/25"
    #[arg(short, long)]
    pub dates: String,
    /// Jira installation to write to, defaults to the configured one
    #[arg(short, long, value_parser = parse_jira_instance)]
    pub jira_instance: Option<JiraInstance>,
    /// One or more entries given as KEY:TYPE:HOURS:DESCRIPTION, separated by spaces:
    ///     --ticket "TIME-147:Create:2.5:Parser" "TIME-148:Review:1:Code review"
    ///
    /// TYPE is one of Create, Review, Study, Correct, Translate or Test
    #[arg(long = "ticket", num_args(1..), required = true)]
    pub tickets: Vec<String>,
    /// Return once the job has been created, without waiting for it to finish
    #[arg(long)]
    pub no_wait: bool,
}

#[derive(Args)]
pub(crate) struct Status {
    /// Id of the job as reported by `submit`
    #[arg(short, long, required = true)]
    pub job_id: String,
}

#[derive(Args)]
pub(crate) struct Config {
    #[command(subcommand)]
    pub cmd: ConfigCommand,
}

/// Create, modify or list the configuration file.
#[derive(Subcommand, Clone)]
pub(crate) enum ConfigCommand {
    /// Update the configuration file, creating it if needed
    Update(UpdateConfiguration),
    /// write current configuration to standard output
    List,
    /// Remove the current configuration
    Remove,
}

#[derive(Args, Clone)]
pub(crate) struct UpdateConfiguration {
    /// The base url of the job backend, typically <https://timesheet.yourcompany.com/api>.
    /// Required when there is no configuration file yet
    #[arg(long)]
    pub url: Option<String>,
    /// Default Jira installation, jira9 or jiradc
    #[arg(long, value_parser = parse_jira_instance)]
    pub jira_instance: Option<JiraInstance>,
    /// Seconds between two status queries of a running job
    #[arg(long)]
    pub poll_interval_secs: Option<u64>,
    /// Stop waiting for a job after this many seconds
    #[arg(long)]
    pub max_poll_secs: Option<u64>,
}

fn parse_jira_instance(s: &str) -> Result<JiraInstance, String> {
    s.parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn submit_arguments() {
        let opts = Opts::try_parse_from([
            "timesheet-cli",
            "submit",
            "-u",
            "thaolnp5",
            "-d",
            "20/Aug/25, 21/Aug/25",
            "-j",
            "jiradc",
            "--ticket",
            "TIME-147:Create:2.5:Parser",
            "TIME-148:Review:1:Code review",
        ])
        .unwrap();

        match opts.cmd {
            Command::Submit(submit) => {
                assert_eq!(submit.user, "thaolnp5");
                assert_eq!(submit.jira_instance, Some(JiraInstance::JiraDc));
                assert_eq!(submit.tickets.len(), 2);
                assert!(submit.token.is_none());
                assert!(!submit.no_wait);
            }
            _ => panic!("Expected the submit command"),
        }
    }

    #[test]
    fn unknown_jira_instance_is_refused() {
        let result = Opts::try_parse_from([
            "timesheet-cli",
            "config",
            "update",
            "--jira-instance",
            "jira7",
        ]);
        assert!(result.is_err());
    }
}

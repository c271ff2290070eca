//! # The Timesheet Command Line Utility
//!
//! A command-line tool for submitting a batch of work log entries to the timesheet job
//! backend and following the resulting job until every entry has been logged in Jira.
//!
//! ## Configuration
//! Before using the tool, tell it where the job backend lives:
//! ```bash
//! timesheet-cli config update --url https://timesheet.yourcompany.com/api --jira-instance jira9
//! ```
//!
//! ## Usage Examples
//!
//! ### Submitting a batch
//! Log two tickets on three days, the token is read from `TIMESHEET_TOKEN` when `-t` is left out:
//! ```bash
//! timesheet-cli submit -u your.name -d "20/Aug/25, 21/Aug/25, 22/Aug/25" \
//!     --ticket "TIME-147:Create:4:Implemented feature X" "TIME-148:Review:2.5:Code review"
//! ```
//!
//! ### Following up on a job
//! ```bash
//! timesheet-cli status --job-id 8f2c1e
//! ```
use clap::Parser;
use cli::{Command, LogLevel, Opts};
use commands::{configuration, status, submit};
use env_logger::Env;
use log::debug;
use std::env;
use std::fs::File;
use std::process::exit;

use worklog::{error::WorklogError, ApplicationRuntime};

mod cli;
mod commands;
mod table_report_job;

#[tokio::main]
async fn main() -> Result<(), WorklogError> {
    let opts: Opts = Opts::parse();

    configure_logging(&opts); // Handles the -v option

    match opts.cmd {
        Command::Submit(submit_cmd) => {
            submit::execute(&get_runtime(), submit_cmd).await?;
        }

        Command::Status(status) => {
            status::execute(status).await?;
        }

        Command::Config(config) => {
            configuration::execute(config.cmd);
        } // end Config
    }

    Ok(())
}

/// Creates the runtime from the application configuration file
fn get_runtime() -> ApplicationRuntime {
    match ApplicationRuntime::new() {
        Ok(runtime) => runtime,
        Err(err) => {
            match err {
                WorklogError::ApplicationConfig { .. } => {
                    eprintln!(
                        "Configuration file not found. Use 'timesheet-cli config update' to create it"
                    );
                }
                _ => {
                    eprintln!("Failed to create runtime: '{err}'");
                }
            }

            exit(1);
        }
    }
}

fn configure_logging(opts: &Opts) {
    let mut tmp_dir = env::temp_dir();
    tmp_dir.push("timesheet.log");

    if opts.verbosity.is_some() {
        println!("Logging to {}", &tmp_dir.to_string_lossy());
    }

    // If nothing else was specified in RUST_LOG, use 'warn'
    let level = opts.verbosity.unwrap_or(LogLevel::Warn).to_string();
    let mut builder = env_logger::Builder::from_env(Env::default().default_filter_or(level));

    match File::create(&tmp_dir) {
        Ok(file) => {
            builder.target(env_logger::Target::Pipe(Box::new(file)));
        }
        Err(err) => {
            eprintln!("Unable to log to {}: {err}", tmp_dir.to_string_lossy());
        }
    }
    builder.init();
    debug!("Logging started");
}

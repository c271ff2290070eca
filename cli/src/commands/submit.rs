use std::env;

use jobs_api::models::job::JobStatus;
use log::{debug, info};
use worklog::error::WorklogError;
use worklog::flow::{FlowError, Session};
use worklog::types::{EntryDraft, Job, Notification};
use worklog::ApplicationRuntime;

use crate::cli::Submit;
use crate::table_report_job::{progress_line, table_report_job_errors};

pub const TOKEN_VAR: &str = "TIMESHEET_TOKEN";

/// Splits `KEY:TYPE:HOURS:DESCRIPTION`. The description is everything after the third colon,
/// so it may contain colons itself.
pub fn parse_ticket(spec: &str) -> Result<EntryDraft, WorklogError> {
    let parts: Vec<&str> = spec.splitn(4, ':').collect();
    match parts.as_slice() {
        [key, type_of_work, hours, description] => Ok(EntryDraft::new(
            key.trim(),
            type_of_work.trim(),
            hours.trim(),
            description,
        )),
        _ => Err(WorklogError::BadInput(format!(
            "'{spec}' should look like KEY:TYPE:HOURS:DESCRIPTION"
        ))),
    }
}

fn print_notifications(session: &mut Session) {
    for notification in session.drain_notifications() {
        match notification {
            Notification::Error(message) => eprintln!("{message}"),
            other => println!("{other}"),
        }
    }
}

/// Prints the field errors and the daily cap message, if any, and hands the error back
fn report(session: &mut Session, err: FlowError) -> WorklogError {
    for (field, message) in session.errors().iter() {
        eprintln!("{field}: {message}");
    }
    if let Some(message) = session.hours_error() {
        eprintln!("{message}");
    }
    print_notifications(session);
    WorklogError::from(err)
}

/// A job which ended as failed makes the command fail
fn outcome(job: &Job) -> Result<(), WorklogError> {
    match job.status {
        JobStatus::Failed => Err(WorklogError::JobFailed {
            job_id: job.job_id.clone(),
            failed: job.failed,
        }),
        JobStatus::Completed | JobStatus::InProgress => Ok(()),
    }
}

pub async fn execute(runtime: &ApplicationRuntime, submit: Submit) -> Result<(), WorklogError> {
    let token = submit
        .token
        .or_else(|| env::var(TOKEN_VAR).ok())
        .unwrap_or_default();

    let mut session = runtime.new_session();
    session.set_username(&submit.user);
    session.set_token(&token);
    if let Some(jira_instance) = submit.jira_instance {
        session.set_jira_instance(jira_instance);
    }
    session.next().map_err(|e| report(&mut session, e))?;

    for spec in &submit.tickets {
        session.set_draft(parse_ticket(spec)?);
        if let Err(err) = session.add_ticket() {
            eprintln!("Ticket '{spec}' was not added");
            return Err(report(&mut session, err));
        }
        debug!("Added '{spec}', total {} hours", session.total_hours());
    }

    session.set_dates(&submit.dates);
    session.next().map_err(|e| report(&mut session, e))?;

    println!(
        "Submitting {} tickets ({} hours) for {} on {}",
        session.entries().len(),
        session.total_hours(),
        session.username(),
        session.dates()
    );
    session
        .submit()
        .await
        .map_err(|e| report(&mut session, e))?;
    print_notifications(&mut session);

    if submit.no_wait {
        if let Some(job) = session.job() {
            println!("Follow up with: timesheet-cli status --job-id {}", job.job_id);
        }
        return Ok(());
    }

    while let Some(job) = session.next_update().await {
        println!("{}", progress_line(job));
    }
    print_notifications(&mut session);

    if let Some(job) = session.job() {
        table_report_job_errors(&job.errors);
        if job.is_in_progress() {
            info!("Gave up waiting for job {}", job.job_id);
            println!("Follow up with: timesheet-cli status --job-id {}", job.job_id);
        }
        outcome(job)?;
    }
    Ok(())
}

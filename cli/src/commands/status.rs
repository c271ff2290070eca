use jobs_api::models::job::JobStatus;
use worklog::error::WorklogError;
use worklog::flow::{failure_message, JOB_COMPLETED_MESSAGE};
use worklog::types::Job;

use crate::{
    cli::Status,
    get_runtime,
    table_report_job::{progress_line, table_report_job_errors},
};

pub async fn execute(status: Status) -> Result<(), WorklogError> {
    let runtime = get_runtime();
    let report = runtime.job_status(&status.job_id).await?;

    let mut job = Job::started(report.job_id.clone(), report.total);
    job.apply(&report);
    println!("{}", progress_line(&job));
    if let Some(created_at) = &report.created_at {
        println!("Created at {created_at}");
    }

    match job.status {
        JobStatus::Completed => println!("{JOB_COMPLETED_MESSAGE}"),
        JobStatus::Failed => eprintln!("{}", failure_message(job.failed)),
        JobStatus::InProgress => {}
    }
    table_report_job_errors(&job.errors);
    Ok(())
}

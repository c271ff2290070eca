use jobs_api::models::job::TaskError;
use log::debug;
use worklog::types::Job;

/// One line summary of a job, i.e. `job-9: in-progress 50% (2/4, 0 failed)`
pub fn progress_line(job: &Job) -> String {
    format!(
        "{}: {} {:.0}% ({}/{}, {} failed)",
        job.job_id, job.status, job.progress, job.processed, job.total, job.failed
    )
}

/// Prints the tasks which could not be logged, one row per ticket and date
pub fn table_report_job_errors(errors: &[TaskError]) {
    if errors.is_empty() {
        return;
    }
    debug!("table_report_job_errors() :- {:?}", errors);

    let key_width = errors
        .iter()
        .map(|e| e.ticket_id.chars().count())
        .max()
        .unwrap_or(0)
        .max("Ticket".len());

    println!("{:key_width$} {:10} Error", "Ticket", "Date");
    println!("{:-<key_width$} {:-<10} {:-<40}", "", "", "");
    for error in errors {
        println!("{:key_width$} {:10} {}", error.ticket_id, error.date, error.error);
    }
}

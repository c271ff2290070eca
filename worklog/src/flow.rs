//! The view model of one batch submission.
//!
//! A [`Session`] walks the user through four steps:
//!
//! ```text
//! Setup -> Entry -> Review -> Result
//! ```
//!
//! It owns all state of the batch; a front end renders the getters, forwards user input to the
//! setters and drains the [`Notification`]s. Polling results arrive over a channel and are
//! applied by the session itself, either through [`Session::next_update`] or
//! [`Session::process_pending_events`].
use std::collections::VecDeque;
use std::fmt::{self, Formatter};
use std::sync::Arc;

use jobs_api::models::job::JobStatus;
use log::{debug, info};
use thiserror::Error;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::operation::poll::{self, PollEvent, PollHandle, PollPolicy};
use crate::operation::submit::{self, SubmitError};
use crate::operation::JobBackend;
use crate::sanitize;
use crate::tickets::{EntryRejection, TicketCollection};
use crate::types::{
    EntryDraft, EntryField, Field, FieldErrors, FieldIssue, JiraInstance, Job, LocalId,
    Notification, WorkEntry,
};
use crate::validate::{self, BatchCandidate, ValidationErrors};

pub const JOB_CREATED_MESSAGE: &str = "Job created! Processing your timesheets...";
pub const JOB_COMPLETED_MESSAGE: &str = "All timesheets submitted successfully!";
pub const JOB_FAILED_MESSAGE: &str = "Job failed. Please try again.";
pub const JOB_STILL_RUNNING_MESSAGE: &str =
    "The job is still processing. Resume tracking to see the final result.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Setup,
    Entry,
    Review,
    Result,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let name = match self {
            Step::Setup => "setup",
            Step::Entry => "entry",
            Step::Review => "review",
            Step::Result => "result",
        };
        write!(f, "{name}")
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FlowError {
    #[error("Not possible on the {0} step")]
    WrongStep(Step),
    #[error("A job is in progress")]
    JobInProgress,
    #[error("No job is being tracked")]
    NoJob,
    #[error("Please correct the highlighted fields")]
    Invalid(ValidationErrors),
    #[error("{0}")]
    Rejected(EntryRejection),
    #[error("{0}")]
    HoursExceeded(String),
    #[error("{0}")]
    Submit(String),
}

/// Message shown when a job ended in the `failed` state
#[must_use]
pub fn failure_message(failed: u32) -> String {
    if failed > 0 {
        format!(
            "Job completed with {failed} failed tasks. Check the details for more information."
        )
    } else {
        JOB_FAILED_MESSAGE.to_string()
    }
}

pub struct Session {
    backend: Arc<dyn JobBackend>,
    policy: PollPolicy,
    step: Step,
    username: String,
    token: String,
    dates: String,
    jira_instance: JiraInstance,
    tickets: TicketCollection,
    draft: EntryDraft,
    errors: FieldErrors,
    hours_error: Option<String>,
    job: Option<Job>,
    poller: Option<PollHandle>,
    events_tx: UnboundedSender<PollEvent>,
    events_rx: UnboundedReceiver<PollEvent>,
    notifications: VecDeque<Notification>,
}

impl Session {
    #[must_use]
    pub fn new(backend: Arc<dyn JobBackend>, policy: PollPolicy) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Session {
            backend,
            policy,
            step: Step::Setup,
            username: String::new(),
            token: String::new(),
            dates: String::new(),
            jira_instance: JiraInstance::default(),
            tickets: TicketCollection::new(),
            draft: EntryDraft::default(),
            errors: FieldErrors::new(),
            hours_error: None,
            job: None,
            poller: None,
            events_tx,
            events_rx,
            notifications: VecDeque::new(),
        }
    }

    // -----------------------
    // Getters

    #[must_use]
    pub fn step(&self) -> Step {
        self.step
    }

    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    #[must_use]
    pub fn token(&self) -> &str {
        &self.token
    }

    #[must_use]
    pub fn dates(&self) -> &str {
        &self.dates
    }

    #[must_use]
    pub fn jira_instance(&self) -> JiraInstance {
        self.jira_instance
    }

    #[must_use]
    pub fn entries(&self) -> &[WorkEntry] {
        self.tickets.entries()
    }

    #[must_use]
    pub fn total_hours(&self) -> f64 {
        self.tickets.total_hours()
    }

    #[must_use]
    pub fn draft(&self) -> &EntryDraft {
        &self.draft
    }

    #[must_use]
    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    /// The daily cap message, while the last entry change was refused because of it
    #[must_use]
    pub fn hours_error(&self) -> Option<&str> {
        self.hours_error.as_deref()
    }

    #[must_use]
    pub fn job(&self) -> Option<&Job> {
        self.job.as_ref()
    }

    #[must_use]
    pub fn is_job_in_progress(&self) -> bool {
        self.job.as_ref().is_some_and(Job::is_in_progress)
    }

    /// Whether a poll task is following the current job
    #[must_use]
    pub fn is_polling(&self) -> bool {
        self.poller.is_some() && self.is_job_in_progress()
    }

    pub fn drain_notifications(&mut self) -> Vec<Notification> {
        self.notifications.drain(..).collect()
    }

    // -----------------------
    // Input handlers, each sanitizes its input and clears the error of its field

    pub fn set_username(&mut self, value: &str) {
        self.username = sanitize::sanitize_account(value);
        self.errors = self.errors.clear(&[Field::Username]);
    }

    pub fn set_token(&mut self, value: &str) {
        self.token = sanitize::sanitize_token(value);
        self.errors = self.errors.clear(&[Field::Token]);
    }

    pub fn set_dates(&mut self, value: &str) {
        self.dates = sanitize::sanitize_dates(value);
        self.errors = self.errors.clear(&[Field::Dates]);
    }

    pub fn set_jira_instance(&mut self, value: JiraInstance) {
        self.jira_instance = value;
    }

    /// Changes a field of the entry being typed in. The draft holds raw text, it is
    /// sanitized when the entry is added.
    pub fn set_draft_field(&mut self, change: &EntryField) {
        change.apply_to(&mut self.draft);
        self.errors = self.errors.clear(&[change.field()]);
    }

    pub fn set_draft(&mut self, draft: EntryDraft) {
        self.draft = draft;
        self.errors = self.errors.clear(&Field::ENTRY_FIELDS);
    }

    // -----------------------
    // Navigation

    /// Moves to the next step if the current one is complete. Returns the new step.
    ///
    /// # Errors
    /// If the current step does not validate, or if it is left automatically
    pub fn next(&mut self) -> Result<Step, FlowError> {
        match self.step {
            Step::Setup => {
                let result = validate::validate_account(&self.username, &self.token);
                self.errors = self
                    .errors
                    .patch(&Field::SETUP_FIELDS, issues_of(&result));
                result.map_err(FlowError::Invalid)?;
                self.step = Step::Entry;
            }
            Step::Entry => {
                if !self.tickets.is_empty() {
                    if let Some(message) = &self.hours_error {
                        return Err(FlowError::HoursExceeded(message.clone()));
                    }
                    let result = validate::validate_dates(&self.dates);
                    self.errors = self.errors.patch(&[Field::Dates], issues_of(&result));
                    self.dates = result.map_err(FlowError::Invalid)?;
                }
                self.step = Step::Review;
            }
            step @ (Step::Review | Step::Result) => return Err(FlowError::WrongStep(step)),
        }
        debug!("Moved to the {} step", self.step);
        Ok(self.step)
    }

    /// Moves back one step. Not possible while a job is in progress.
    ///
    /// # Errors
    /// On the first step, on the result step and while a job is in progress
    pub fn back(&mut self) -> Result<Step, FlowError> {
        if self.is_job_in_progress() {
            return Err(FlowError::JobInProgress);
        }
        self.step = match self.step {
            Step::Entry => Step::Setup,
            Step::Review => Step::Entry,
            step @ (Step::Setup | Step::Result) => return Err(FlowError::WrongStep(step)),
        };
        Ok(self.step)
    }

    /// Starts another batch for the same account from the result step. The entries are
    /// kept, the dates and the finished job are not.
    ///
    /// # Errors
    /// Outside the result step
    pub fn add_more(&mut self) -> Result<(), FlowError> {
        if self.step != Step::Result {
            return Err(FlowError::WrongStep(self.step));
        }
        self.stop_polling();
        self.dates.clear();
        self.job = None;
        self.errors = FieldErrors::new();
        self.hours_error = None;
        self.step = Step::Entry;
        Ok(())
    }

    /// Forgets everything and starts over on the setup step
    pub fn start_new_batch(&mut self) {
        self.stop_polling();
        self.username.clear();
        self.token.clear();
        self.dates.clear();
        self.jira_instance = JiraInstance::default();
        self.tickets.clear();
        self.draft = EntryDraft::default();
        self.errors = FieldErrors::new();
        self.hours_error = None;
        self.job = None;
        self.notifications.clear();
        self.step = Step::Setup;
    }

    // -----------------------
    // Entries

    fn ensure_entries_editable(&self) -> Result<(), FlowError> {
        if self.is_job_in_progress() {
            return Err(FlowError::JobInProgress);
        }
        match self.step {
            Step::Entry | Step::Review => Ok(()),
            step => Err(FlowError::WrongStep(step)),
        }
    }

    /// Adds the current draft as a new entry. On success the draft is reset, keeping only
    /// the ticket id.
    ///
    /// # Errors
    /// The draft is invalid or would exceed the daily cap
    pub fn add_ticket(&mut self) -> Result<LocalId, FlowError> {
        self.ensure_entries_editable()?;
        self.hours_error = None;
        match self.tickets.add(&self.draft) {
            Ok(entry) => {
                let local_id = entry.local_id;
                self.errors = self.errors.clear(&Field::ENTRY_FIELDS);
                self.draft = self.draft.follow_up();
                Ok(local_id)
            }
            Err(rejection) => Err(self.reject(rejection)),
        }
    }

    /// # Errors
    /// Unknown entry, invalid result or daily cap exceeded
    pub fn edit_ticket(&mut self, local_id: LocalId, change: &EntryField) -> Result<(), FlowError> {
        self.ensure_entries_editable()?;
        self.hours_error = None;
        match self.tickets.edit(local_id, change) {
            Ok(_) => {
                self.errors = self.errors.clear(&Field::ENTRY_FIELDS);
                Ok(())
            }
            Err(rejection) => Err(self.reject(rejection)),
        }
    }

    /// Removes the entry. Removing an unknown entry does nothing.
    ///
    /// # Errors
    /// While a job is in progress or outside the entry and review steps
    pub fn remove_ticket(&mut self, local_id: LocalId) -> Result<Option<WorkEntry>, FlowError> {
        self.ensure_entries_editable()?;
        self.hours_error = None;
        Ok(self.tickets.remove(local_id))
    }

    fn reject(&mut self, rejection: EntryRejection) -> FlowError {
        match &rejection {
            EntryRejection::Invalid(issues) => {
                self.errors = self.errors.patch(&Field::ENTRY_FIELDS, issues);
            }
            EntryRejection::DailyCapExceeded { .. } => {
                self.hours_error = Some(rejection.to_string());
            }
            EntryRejection::UnknownEntry(_) => {}
        }
        FlowError::Rejected(rejection)
    }

    // -----------------------
    // Submission and polling

    /// Submits the batch from the review step and starts following the created job.
    ///
    /// # Errors
    /// Outside the review step, while a job is in progress, when the batch is invalid or when
    /// the job could not be created. The batch itself is left untouched in all cases.
    pub async fn submit(&mut self) -> Result<(), FlowError> {
        if self.is_job_in_progress() {
            return Err(FlowError::JobInProgress);
        }
        if self.step != Step::Review {
            return Err(FlowError::WrongStep(self.step));
        }

        let backend = Arc::clone(&self.backend);
        let batch = BatchCandidate {
            username: &self.username,
            token: &self.token,
            dates: &self.dates,
            jira_instance: self.jira_instance,
            entries: self.tickets.entries(),
        };
        let result = submit::execute(backend.as_ref(), &batch).await;

        match result {
            Ok(created) => {
                info!("Tracking job {} with {} tasks", created.job_id, created.total);
                self.errors = self.errors.clear(&Field::BATCH_FIELDS);
                self.job = Some(Job::started(created.job_id, created.total));
                self.notifications
                    .push_back(Notification::Info(JOB_CREATED_MESSAGE.to_string()));
                self.start_polling();
                Ok(())
            }
            Err(SubmitError::Invalid(issues)) => {
                self.errors = self.errors.patch(&Field::BATCH_FIELDS, &issues);
                Err(FlowError::Invalid(issues))
            }
            Err(SubmitError::Transport(message)) => {
                self.notifications
                    .push_back(Notification::Error(message.clone()));
                Err(FlowError::Submit(message))
            }
        }
    }

    /// Arms a fresh poller for the current job, replacing any previous one
    fn start_polling(&mut self) {
        self.stop_polling();
        if let Some(job) = self.job.as_ref().filter(|j| j.is_in_progress()) {
            self.poller = Some(poll::spawn(
                Arc::clone(&self.backend),
                job.job_id.clone(),
                self.policy,
                self.events_tx.clone(),
            ));
        }
    }

    fn stop_polling(&mut self) {
        if let Some(mut poller) = self.poller.take() {
            poller.cancel();
        }
        // Whatever the old poller already sent is stale now
        while self.events_rx.try_recv().is_ok() {}
    }

    /// Starts tracking the current job again after the poller gave up on it
    ///
    /// # Errors
    /// If there is no job in progress
    pub fn resume_polling(&mut self) -> Result<(), FlowError> {
        if !self.is_job_in_progress() {
            return Err(FlowError::NoJob);
        }
        self.start_polling();
        Ok(())
    }

    /// Folds one poll result into the session
    pub fn apply_event(&mut self, event: PollEvent) {
        let Some(job) = self.job.as_mut() else {
            return;
        };
        match event {
            PollEvent::Report(report) => {
                if report.job_id != job.job_id || !job.is_in_progress() {
                    debug!("Ignoring stale report for job {}", report.job_id);
                    return;
                }
                job.apply(&report);
                match job.status {
                    JobStatus::Completed => {
                        self.notifications.push_back(Notification::Success {
                            title: "Success".to_string(),
                            message: JOB_COMPLETED_MESSAGE.to_string(),
                        });
                    }
                    JobStatus::Failed => {
                        self.notifications
                            .push_back(Notification::Error(failure_message(job.failed)));
                    }
                    JobStatus::InProgress => return,
                }
                info!("Job {} finished as {}", job.job_id, job.status);
                self.poller = None;
                self.step = Step::Result;
            }
            PollEvent::TimedOut { job_id } => {
                if job_id == job.job_id && job.is_in_progress() {
                    self.poller = None;
                    self.notifications
                        .push_back(Notification::Info(JOB_STILL_RUNNING_MESSAGE.to_string()));
                }
            }
        }
    }

    /// Applies every poll result received so far without waiting. Returns how many there were.
    pub fn process_pending_events(&mut self) -> usize {
        let mut count = 0;
        while let Ok(event) = self.events_rx.try_recv() {
            self.apply_event(event);
            count += 1;
        }
        count
    }

    /// Waits for the next poll result and applies it. `None` once nothing is being polled.
    pub async fn next_update(&mut self) -> Option<&Job> {
        if !self.is_polling() {
            return None;
        }
        let event = self.events_rx.recv().await?;
        self.apply_event(event);
        self.job.as_ref()
    }

    /// Waits until the job reaches a terminal state or the poller gives up
    pub async fn wait_for_terminal(&mut self) -> Option<&Job> {
        while self.next_update().await.is_some() {}
        self.job.as_ref()
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if let Some(mut poller) = self.poller.take() {
            poller.cancel();
        }
    }
}

fn issues_of<T>(result: &Result<T, ValidationErrors>) -> &[FieldIssue] {
    match result {
        Ok(_) => &[],
        Err(errors) => errors.issues(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operation::fake::{report, Reply, ScriptedBackend};
    use std::time::Duration;

    fn fast() -> PollPolicy {
        PollPolicy {
            interval: Duration::from_millis(5),
            max_duration: None,
        }
    }

    fn session(backend: &Arc<ScriptedBackend>) -> Session {
        let backend: Arc<dyn JobBackend> = backend.clone();
        Session::new(backend, fast())
    }

    fn entry_step(session: &mut Session) {
        session.set_username("thaolnp5");
        session.set_token("secret");
        session.next().unwrap();
    }

    fn add(session: &mut Session, ticket: &str, hours: &str) -> Result<LocalId, FlowError> {
        session.set_draft(EntryDraft::new(ticket, "Create", hours, "x"));
        session.add_ticket()
    }

    async fn submitted(backend: &Arc<ScriptedBackend>) -> Session {
        submitted_with(backend, fast()).await
    }

    #[test]
    fn setup_requires_account() {
        let backend = Arc::new(ScriptedBackend::new(vec![]));
        let mut session = session(&backend);

        assert!(matches!(session.next(), Err(FlowError::Invalid(_))));
        assert_eq!(session.step(), Step::Setup);
        assert_eq!(session.errors().get(Field::Username), Some("Username is required"));
        assert_eq!(session.errors().get(Field::Token), Some("Jira Token is required"));

        session.set_username("Thao LNP5");
        assert_eq!(session.username(), "ThaoLNP5");
        assert_eq!(session.errors().get(Field::Username), None);
        assert!(session.errors().get(Field::Token).is_some());

        session.set_token("secret");
        assert_eq!(session.next(), Ok(Step::Entry));
        assert!(session.errors().is_empty());
    }

    #[test]
    fn entry_to_review_validates_dates_only_with_entries() {
        let backend = Arc::new(ScriptedBackend::new(vec![]));
        let mut session = session(&backend);
        entry_step(&mut session);

        // Skipping ahead without entries does not look at the dates
        assert_eq!(session.next(), Ok(Step::Review));
        assert_eq!(session.back(), Ok(Step::Entry));

        add(&mut session, "ABC-1", "1").unwrap();
        session.set_dates("20/Aug/25, 20/Aug/25");
        assert!(session.next().is_err());
        assert_eq!(
            session.errors().get(Field::Dates),
            Some("Duplicate dates are not allowed")
        );

        session.set_dates("20/Aug/25 ,21/Aug/25");
        assert_eq!(session.next(), Ok(Step::Review));
        assert_eq!(session.dates(), "20/Aug/25, 21/Aug/25");
    }

    #[test]
    fn adding_keeps_ticket_id_in_draft() {
        let backend = Arc::new(ScriptedBackend::new(vec![]));
        let mut session = session(&backend);
        entry_step(&mut session);

        session.set_draft_field(&EntryField::TicketId("abc-7".to_string()));
        session.set_draft_field(&EntryField::Description("Reviewed PR".to_string()));
        session.set_draft_field(&EntryField::TimeSpend("2".to_string()));
        session.add_ticket().unwrap();

        assert_eq!(session.entries()[0].ticket_id, "ABC-7");
        assert_eq!(session.draft().ticket_id, "abc-7");
        assert_eq!(session.draft().description, "");
        assert_eq!(session.draft().time_spend, "0.25");
    }

    #[test]
    fn invalid_entry_sets_field_errors() {
        let backend = Arc::new(ScriptedBackend::new(vec![]));
        let mut session = session(&backend);
        entry_step(&mut session);

        session.set_draft(EntryDraft::new("abc123", "Create", "1", ""));
        assert!(session.add_ticket().is_err());
        assert!(session.errors().get(Field::TicketId).is_some());
        assert_eq!(
            session.errors().get(Field::Description),
            Some("Description is required")
        );
        assert!(session.entries().is_empty());

        session.set_draft_field(&EntryField::Description("x".to_string()));
        assert_eq!(session.errors().get(Field::Description), None);
    }

    #[test]
    fn daily_cap_blocks_review_until_resolved() {
        let backend = Arc::new(ScriptedBackend::new(vec![]));
        let mut session = session(&backend);
        entry_step(&mut session);
        session.set_dates("20/Aug/25");

        add(&mut session, "ABC-1", "7.5").unwrap();
        assert!(matches!(
            add(&mut session, "ABC-2", "1"),
            Err(FlowError::Rejected(EntryRejection::DailyCapExceeded { .. }))
        ));
        assert_eq!(session.entries().len(), 1);
        assert!(session.hours_error().is_some());
        assert!(matches!(session.next(), Err(FlowError::HoursExceeded(_))));

        add(&mut session, "ABC-2", "0.5").unwrap();
        assert_eq!(session.hours_error(), None);
        assert_eq!(session.next(), Ok(Step::Review));
    }

    #[tokio::test]
    async fn submit_without_entries_is_refused() {
        let backend = Arc::new(ScriptedBackend::new(vec![]));
        let mut session = session(&backend);
        entry_step(&mut session);
        session.next().unwrap();

        assert!(matches!(session.submit().await, Err(FlowError::Invalid(_))));
        assert_eq!(
            session.errors().get(Field::Tickets),
            Some("Please add at least one ticket")
        );
        assert!(backend.created().is_empty());
    }

    #[tokio::test]
    async fn completed_job_moves_to_result() {
        let backend = Arc::new(ScriptedBackend::new(vec![
            Reply::Status(report(JobStatus::InProgress, 2, 0)),
            Reply::Status(report(JobStatus::Completed, 4, 0)),
        ]));
        let mut session = submitted(&backend).await;

        assert_eq!(backend.created()[0].tickets[0].time_spend, "1");
        assert_eq!(
            session.drain_notifications(),
            vec![Notification::Info(JOB_CREATED_MESSAGE.to_string())]
        );
        assert_eq!(session.back(), Err(FlowError::JobInProgress));

        let job = session.wait_for_terminal().await.unwrap().clone();
        assert_eq!(job.status, JobStatus::Completed);
        assert_eq!(session.step(), Step::Result);
        assert_eq!(
            session.drain_notifications(),
            vec![Notification::Success {
                title: "Success".to_string(),
                message: JOB_COMPLETED_MESSAGE.to_string()
            }]
        );

        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(backend.status_calls(), 2);
    }

    #[tokio::test]
    async fn failed_job_keeps_task_errors() {
        let backend = Arc::new(ScriptedBackend::new(vec![Reply::Status(report(
            JobStatus::Failed,
            4,
            3,
        ))]));
        let mut session = submitted(&backend).await;
        session.drain_notifications();

        session.wait_for_terminal().await;
        assert_eq!(session.step(), Step::Result);
        assert_eq!(session.job().map(|j| j.errors.len()), Some(3));
        match session.drain_notifications().as_slice() {
            [Notification::Error(message)] => assert!(message.contains('3')),
            other => panic!("Expected one error notification, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn outright_failure_message() {
        let backend = Arc::new(ScriptedBackend::new(vec![Reply::Status(report(
            JobStatus::Failed,
            0,
            0,
        ))]));
        let mut session = submitted(&backend).await;
        session.drain_notifications();

        session.wait_for_terminal().await;
        assert_eq!(
            session.drain_notifications(),
            vec![Notification::Error(JOB_FAILED_MESSAGE.to_string())]
        );
    }

    #[tokio::test]
    async fn poll_failure_keeps_status() {
        let backend = Arc::new(ScriptedBackend::new(vec![
            Reply::Status(report(JobStatus::InProgress, 1, 0)),
            Reply::Unreachable,
            Reply::Status(report(JobStatus::InProgress, 3, 0)),
            Reply::Status(report(JobStatus::Completed, 4, 0)),
        ]));
        let mut session = submitted(&backend).await;

        let mut seen = vec![];
        while let Some(job) = session.next_update().await {
            seen.push(job.processed);
        }
        assert_eq!(seen, vec![1, 3, 4]);
        assert_eq!(session.step(), Step::Result);
    }

    #[tokio::test]
    async fn transport_failure_keeps_batch() {
        let backend = Arc::new(ScriptedBackend::failing_creation());
        let mut session = session(&backend);
        entry_step(&mut session);
        add(&mut session, "ABC-123", "1").unwrap();
        session.set_dates("20/Aug/25");
        session.next().unwrap();

        assert_eq!(
            session.submit().await,
            Err(FlowError::Submit(submit::CREATE_JOB_FALLBACK.to_string()))
        );
        assert_eq!(session.step(), Step::Review);
        assert_eq!(session.entries().len(), 1);
        assert!(session.job().is_none());
        assert_eq!(
            session.drain_notifications(),
            vec![Notification::Error(submit::CREATE_JOB_FALLBACK.to_string())]
        );
    }

    #[tokio::test]
    async fn timed_out_poller_can_be_resumed() {
        let backend = Arc::new(ScriptedBackend::repeating(report(JobStatus::InProgress, 1, 0)));
        let mut session = submitted_with(
            &backend,
            PollPolicy {
                interval: Duration::from_millis(5),
                max_duration: Some(Duration::from_millis(15)),
            },
        )
        .await;
        session.drain_notifications();

        session.wait_for_terminal().await;
        assert!(session.is_job_in_progress());
        assert!(!session.is_polling());
        assert_eq!(session.step(), Step::Review);
        assert_eq!(
            session.drain_notifications(),
            vec![Notification::Info(JOB_STILL_RUNNING_MESSAGE.to_string())]
        );

        session.resume_polling().unwrap();
        assert!(session.is_polling());
    }

    #[tokio::test]
    async fn add_more_keeps_account_and_entries() {
        let backend = Arc::new(ScriptedBackend::new(vec![Reply::Status(report(
            JobStatus::Completed,
            4,
            0,
        ))]));
        let mut session = submitted(&backend).await;
        session.wait_for_terminal().await;

        session.add_more().unwrap();
        assert_eq!(session.step(), Step::Entry);
        assert_eq!(session.dates(), "");
        assert!(session.job().is_none());
        assert_eq!(session.username(), "thaolnp5");
        assert_eq!(session.token(), "secret");
        assert_eq!(session.entries().len(), 1);

        session.start_new_batch();
        assert_eq!(session.step(), Step::Setup);
        assert!(session.entries().is_empty());
        assert_eq!(session.username(), "");
    }

    async fn submitted_with(backend: &Arc<ScriptedBackend>, policy: PollPolicy) -> Session {
        let dyn_backend: Arc<dyn JobBackend> = backend.clone();
        let mut session = Session::new(dyn_backend, policy);
        entry_step(&mut session);
        add(&mut session, "ABC-123", "1").unwrap();
        session.set_dates("20/Aug/25");
        session.next().unwrap();
        session.submit().await.unwrap();
        session
    }

    #[tokio::test]
    async fn resuming_replaces_the_running_poller() {
        let backend = Arc::new(ScriptedBackend::repeating(report(JobStatus::InProgress, 1, 0)));
        let mut session = submitted_with(
            &backend,
            PollPolicy {
                interval: Duration::from_millis(20),
                max_duration: None,
            },
        )
        .await;

        for _ in 0..5 {
            session.resume_polling().unwrap();
        }
        assert!(session.is_polling());

        tokio::time::sleep(Duration::from_millis(110)).await;
        // One timer ticks about five times in this window, five timers would tick ~25 times
        let calls = backend.status_calls();
        assert!((1..=7).contains(&calls), "{calls} status queries");
    }

    #[tokio::test]
    async fn starting_over_stops_polling() {
        let backend = Arc::new(ScriptedBackend::repeating(report(JobStatus::InProgress, 1, 0)));
        let mut session = submitted(&backend).await;
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(session.is_job_in_progress());

        session.start_new_batch();
        assert!(!session.is_polling());
        assert!(session.job().is_none());

        let calls = backend.status_calls();
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(backend.status_calls(), calls);
        assert_eq!(session.process_pending_events(), 0);
    }

    #[tokio::test]
    async fn dropping_the_session_stops_polling() {
        let backend = Arc::new(ScriptedBackend::repeating(report(JobStatus::InProgress, 1, 0)));
        let session = submitted(&backend).await;
        drop(session);

        tokio::time::sleep(Duration::from_millis(10)).await;
        let calls = backend.status_calls();
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(backend.status_calls(), calls);
    }
}

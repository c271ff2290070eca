use std::collections::BTreeMap;
use std::fmt::{self, Formatter};
use std::str::FromStr;

use chrono::Utc;
use jobs_api::models::job::{JobStatus, JobStatusReport, TaskError};
use serde::{Deserialize, Serialize};

/// Kind of work an entry represents, as understood by the backend
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TypeOfWork {
    #[default]
    Create,
    Review,
    Study,
    Correct,
    Translate,
    Test,
}

impl TypeOfWork {
    pub const ALL: [TypeOfWork; 6] = [
        TypeOfWork::Create,
        TypeOfWork::Review,
        TypeOfWork::Study,
        TypeOfWork::Correct,
        TypeOfWork::Translate,
        TypeOfWork::Test,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            TypeOfWork::Create => "Create",
            TypeOfWork::Review => "Review",
            TypeOfWork::Study => "Study",
            TypeOfWork::Correct => "Correct",
            TypeOfWork::Translate => "Translate",
            TypeOfWork::Test => "Test",
        }
    }
}

impl fmt::Display for TypeOfWork {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TypeOfWork {
    type Err = String;

    /// Exact match on the names the backend expects
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TypeOfWork::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("Unknown type of work '{s}'"))
    }
}

/// Selects which Jira installation the backend should write to
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
pub enum JiraInstance {
    #[default]
    #[serde(rename = "jira9")]
    Jira9,
    #[serde(rename = "jiradc")]
    JiraDc,
}

impl JiraInstance {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            JiraInstance::Jira9 => "jira9",
            JiraInstance::JiraDc => "jiradc",
        }
    }
}

impl fmt::Display for JiraInstance {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for JiraInstance {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "jira9" => Ok(JiraInstance::Jira9),
            "jiradc" => Ok(JiraInstance::JiraDc),
            other => Err(format!("Unknown Jira instance '{other}', use jira9 or jiradc")),
        }
    }
}

/// Session unique identifier of an entry, derived from the wall clock in milliseconds
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LocalId(i64);

impl LocalId {
    #[must_use]
    pub fn value(self) -> i64 {
        self.0
    }
}

impl fmt::Display for LocalId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for LocalId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(LocalId(s.trim().parse()?))
    }
}

/// Mints `LocalId`s. Ids are never handed out twice, even if the clock stands still or
/// moves backwards.
#[derive(Debug, Default)]
pub struct LocalIdGenerator {
    last: Option<i64>,
}

impl LocalIdGenerator {
    pub fn next_id(&mut self) -> LocalId {
        self.next_at(Utc::now().timestamp_millis())
    }

    fn next_at(&mut self, now_millis: i64) -> LocalId {
        let id = match self.last {
            Some(last) if now_millis <= last => last + 1,
            _ => now_millis,
        };
        self.last = Some(id);
        LocalId(id)
    }
}

/// One unit of logged work
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct WorkEntry {
    pub local_id: LocalId,
    pub ticket_id: String,
    pub type_of_work: TypeOfWork,
    pub description: String,
    pub time_spend: f64,
}

impl WorkEntry {
    /// Hours as whole hundredths, exact for values with at most two decimals
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn hundredths(&self) -> i64 {
        (self.time_spend * 100.0).round() as i64
    }
}

/// Raw, unsanitized input for a work entry, exactly as typed by the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryDraft {
    pub ticket_id: String,
    pub type_of_work: String,
    pub description: String,
    pub time_spend: String,
}

impl Default for EntryDraft {
    fn default() -> Self {
        EntryDraft {
            ticket_id: String::new(),
            type_of_work: TypeOfWork::Create.to_string(),
            description: String::new(),
            time_spend: "0.25".to_string(),
        }
    }
}

impl EntryDraft {
    #[must_use]
    pub fn new(ticket_id: &str, type_of_work: &str, time_spend: &str, description: &str) -> Self {
        EntryDraft {
            ticket_id: ticket_id.to_string(),
            type_of_work: type_of_work.to_string(),
            description: description.to_string(),
            time_spend: time_spend.to_string(),
        }
    }

    /// The draft for the next entry after `self` has been added: same ticket, defaults
    /// for everything else
    #[must_use]
    pub fn follow_up(&self) -> Self {
        EntryDraft {
            ticket_id: self.ticket_id.clone(),
            ..EntryDraft::default()
        }
    }
}

impl From<&WorkEntry> for EntryDraft {
    fn from(entry: &WorkEntry) -> Self {
        EntryDraft {
            ticket_id: entry.ticket_id.clone(),
            type_of_work: entry.type_of_work.to_string(),
            description: entry.description.clone(),
            time_spend: entry.time_spend.to_string(),
        }
    }
}

/// Fields a user may change on an entry already in the collection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryField {
    TicketId(String),
    TypeOfWork(String),
    Description(String),
    TimeSpend(String),
}

impl EntryField {
    #[must_use]
    pub fn field(&self) -> Field {
        match self {
            EntryField::TicketId(_) => Field::TicketId,
            EntryField::TypeOfWork(_) => Field::TypeOfWork,
            EntryField::Description(_) => Field::Description,
            EntryField::TimeSpend(_) => Field::TimeSpend,
        }
    }

    pub(crate) fn apply_to(&self, draft: &mut EntryDraft) {
        match self {
            EntryField::TicketId(v) => draft.ticket_id.clone_from(v),
            EntryField::TypeOfWork(v) => draft.type_of_work.clone_from(v),
            EntryField::Description(v) => draft.description.clone_from(v),
            EntryField::TimeSpend(v) => draft.time_spend.clone_from(v),
        }
    }
}

/// Keys of the field error map
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    Username,
    Token,
    Dates,
    TicketId,
    Description,
    TimeSpend,
    TypeOfWork,
    Tickets,
}

impl Field {
    pub const ENTRY_FIELDS: [Field; 4] = [
        Field::TicketId,
        Field::Description,
        Field::TimeSpend,
        Field::TypeOfWork,
    ];
    pub const SETUP_FIELDS: [Field; 2] = [Field::Username, Field::Token];
    pub const BATCH_FIELDS: [Field; 4] = [Field::Username, Field::Token, Field::Dates, Field::Tickets];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Field::Username => "username",
            Field::Token => "token",
            Field::Dates => "dates",
            Field::TicketId => "ticketId",
            Field::Description => "description",
            Field::TimeSpend => "timeSpend",
            Field::TypeOfWork => "typeOfWork",
            Field::Tickets => "tickets",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Field keyed error messages shown next to the inputs.
///
/// The map is never edited in place by callers; [`FieldErrors::patch`] returns the next
/// version of the map.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<Field, String>);

impl FieldErrors {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes every key in `revalidated`, then inserts the `issues`. When several issues
    /// name the same field the first one wins.
    #[must_use]
    pub fn patch<'a>(
        &self,
        revalidated: &[Field],
        issues: impl IntoIterator<Item = &'a FieldIssue>,
    ) -> FieldErrors {
        let mut next = self.0.clone();
        for field in revalidated {
            next.remove(field);
        }
        let mut fresh: BTreeMap<Field, String> = BTreeMap::new();
        for issue in issues {
            fresh
                .entry(issue.field)
                .or_insert_with(|| issue.message.clone());
        }
        next.extend(fresh);
        FieldErrors(next)
    }

    /// Same as `patch` without any new issues
    #[must_use]
    pub fn clear(&self, fields: &[Field]) -> FieldErrors {
        self.patch(fields, std::iter::empty())
    }

    #[must_use]
    pub fn get(&self, field: Field) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, &str)> {
        self.0.iter().map(|(k, v)| (*k, v.as_str()))
    }
}

/// A single validation failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldIssue {
    pub field: Field,
    pub message: String,
}

impl FieldIssue {
    #[must_use]
    pub fn new(field: Field, message: impl Into<String>) -> Self {
        FieldIssue {
            field,
            message: message.into(),
        }
    }
}

/// A submission job as tracked on the client
#[derive(Debug, Clone, PartialEq)]
pub struct Job {
    pub job_id: String,
    pub total: u32,
    pub processed: u32,
    pub failed: u32,
    /// Percentage, 0 to 100
    pub progress: f64,
    pub status: JobStatus,
    pub errors: Vec<TaskError>,
}

impl Job {
    /// A freshly created job which has not been polled yet
    #[must_use]
    pub fn started(job_id: String, total: u32) -> Self {
        Job {
            job_id,
            total,
            processed: 0,
            failed: 0,
            progress: 0.0,
            status: JobStatus::InProgress,
            errors: vec![],
        }
    }

    /// Folds a status report into the job. A reported error list replaces the one we have,
    /// an absent or empty list leaves it alone.
    pub fn apply(&mut self, report: &JobStatusReport) {
        self.total = report.total;
        self.processed = report.processed;
        self.failed = report.failed;
        self.progress = if report.progress.is_nan() {
            0.0
        } else {
            report.progress.clamp(0.0, 100.0)
        };
        self.status = report.status;
        if let Some(errors) = report.errors.as_ref().filter(|e| !e.is_empty()) {
            self.errors.clone_from(errors);
        }
    }

    #[must_use]
    pub fn is_in_progress(&self) -> bool {
        self.status == JobStatus::InProgress
    }
}

/// One shot messages for the user, i.e. a toast or a dialog
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    Success { title: String, message: String },
    Info(String),
    Error(String),
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Notification::Success { title, message } => write!(f, "{title}: {message}"),
            Notification::Info(message) | Notification::Error(message) => write!(f, "{message}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_ids_are_never_reused() {
        let mut generator = LocalIdGenerator::default();
        let a = generator.next_at(1_000);
        let b = generator.next_at(1_000);
        let c = generator.next_at(999);
        let d = generator.next_at(5_000);
        assert_eq!(a.value(), 1_000);
        assert_eq!(b.value(), 1_001);
        assert_eq!(c.value(), 1_002);
        assert_eq!(d.value(), 5_000);
    }

    #[test]
    fn type_of_work_parsing_is_exact() {
        assert_eq!("Translate".parse::<TypeOfWork>(), Ok(TypeOfWork::Translate));
        assert!("translate".parse::<TypeOfWork>().is_err());
        assert!("Deploy".parse::<TypeOfWork>().is_err());
    }

    #[test]
    fn jira_instance_serializes_lowercase() {
        assert_eq!(JiraInstance::JiraDc.to_string(), "jiradc");
        assert_eq!("JIRA9".parse::<JiraInstance>(), Ok(JiraInstance::Jira9));
    }

    #[test]
    fn patch_replaces_only_revalidated_keys() {
        let errors = FieldErrors::new().patch(
            &[Field::Username, Field::Dates],
            &[
                FieldIssue::new(Field::Username, "Username is required"),
                FieldIssue::new(Field::Dates, "Dates are required"),
            ],
        );
        let next = errors.patch(&[Field::Username], &[]);
        assert_eq!(next.get(Field::Username), None);
        assert_eq!(next.get(Field::Dates), Some("Dates are required"));
        // The original map is untouched
        assert_eq!(errors.get(Field::Username), Some("Username is required"));
    }

    #[test]
    fn patch_keeps_first_issue_per_field() {
        let errors = FieldErrors::new().patch(
            &Field::ENTRY_FIELDS,
            &[
                FieldIssue::new(Field::TicketId, "Ticket ID is required"),
                FieldIssue::new(Field::TicketId, "Ticket ID must match format ABC-123"),
            ],
        );
        assert_eq!(errors.get(Field::TicketId), Some("Ticket ID is required"));
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn job_apply_keeps_errors_when_report_has_none() {
        let mut job = Job::started("j".to_string(), 4);
        let mut report = JobStatusReport {
            job_id: "j".to_string(),
            total: 4,
            processed: 2,
            failed: 1,
            status: JobStatus::InProgress,
            progress: 50.0,
            errors: Some(vec![TaskError {
                ticket_id: "ABC-1".to_string(),
                date: "20/Aug/25".to_string(),
                error: "Issue does not exist".to_string(),
            }]),
            created_at: None,
            updated_at: None,
        };
        job.apply(&report);
        assert_eq!(job.errors.len(), 1);

        report.errors = None;
        report.processed = 3;
        job.apply(&report);
        assert_eq!(job.processed, 3);
        assert_eq!(job.errors.len(), 1);

        report.progress = 140.0;
        job.apply(&report);
        assert!((job.progress - 100.0).abs() < f64::EPSILON);
    }
}

//! Structural and semantic checks of sanitized input.
//!
//! A validation pass never stops at the first problem; all issues are collected into a
//! [`ValidationErrors`] so the user can fix everything in one go.
use std::collections::HashSet;
use std::fmt::{self, Formatter};

use lazy_static::lazy_static;
use regex::Regex;

use crate::sanitize::{
    self, MAX_ACCOUNT_LEN, MAX_DESCRIPTION_LEN, MAX_HOURS, MAX_TICKET_ID_LEN, MAX_TOKEN_LEN,
    MIN_HOURS,
};
use crate::types::{Field, FieldIssue, JiraInstance, LocalId, TypeOfWork, WorkEntry};

const MONTHS: &str = "(Jan|Feb|Mar|Apr|May|Jun|Jul|Aug|Sep|Oct|Nov|Dec)";

lazy_static! {
    /// Jira ticket format: uppercase alphanumerics, dash and a number, e.g. `C99KBBATC2025-37`
    static ref TICKET_ID: Regex = Regex::new(r"^[A-Z0-9]+-\d+$").unwrap();
    static ref DATES_LIST: Regex = Regex::new(&format!(
        r"(?i)^\d{{1,2}}/{MONTHS}/\d{{2}}(, \d{{1,2}}/{MONTHS}/\d{{2}})*$"
    ))
    .unwrap();
    static ref TWO_DECIMALS: Regex = Regex::new(r"^\d+(\.\d{1,2})?$").unwrap();
}

/// All issues found by one validation pass
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValidationErrors(Vec<FieldIssue>);

impl ValidationErrors {
    #[must_use]
    pub fn issues(&self) -> &[FieldIssue] {
        &self.0
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// First message reported for `field`
    #[must_use]
    pub fn message_for(&self, field: Field) -> Option<&str> {
        self.0
            .iter()
            .find(|i| i.field == field)
            .map(|i| i.message.as_str())
    }

    fn push(&mut self, field: Field, message: impl Into<String>) {
        self.0.push(FieldIssue::new(field, message));
    }

    fn extend(&mut self, other: ValidationErrors) {
        self.0.extend(other.0);
    }

    /// `Ok(value)` if nothing was reported
    fn into_result<T>(self, value: T) -> Result<T, ValidationErrors> {
        if self.0.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let messages: Vec<String> = self
            .0
            .iter()
            .map(|i| format!("{}: {}", i.field, i.message))
            .collect();
        write!(f, "{}", messages.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

impl<'a> IntoIterator for &'a ValidationErrors {
    type Item = &'a FieldIssue;
    type IntoIter = std::slice::Iter<'a, FieldIssue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

fn check_length(
    errors: &mut ValidationErrors,
    field: Field,
    value: &str,
    max: usize,
    required: &str,
    too_long: &str,
) {
    let len = value.chars().count();
    if len == 0 {
        errors.push(field, required);
    } else if len > max {
        errors.push(field, too_long);
    }
}

/// Username and token, as entered on the setup step
///
/// # Errors
/// One issue per offending field
pub fn validate_account(username: &str, token: &str) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();
    check_length(
        &mut errors,
        Field::Username,
        username,
        MAX_ACCOUNT_LEN,
        "Username is required",
        "Username too long",
    );
    check_length(
        &mut errors,
        Field::Token,
        token,
        MAX_TOKEN_LEN,
        "Jira Token is required",
        "Token too long",
    );
    errors.into_result(())
}

/// Comma separated list of dates like `20/Aug/25, 21/Aug/25`. Returns the trimmed list.
///
/// # Errors
/// When the list is empty, malformed or holds the same date twice
pub fn validate_dates(dates: &str) -> Result<String, ValidationErrors> {
    let mut errors = ValidationErrors::default();
    if dates.is_empty() {
        errors.push(Field::Dates, "Dates are required");
        return Err(errors);
    }

    let trimmed = dates.trim();
    if !DATES_LIST.is_match(&sanitize::sanitize_dates(trimmed)) {
        errors.push(
            Field::Dates,
            "Dates must be in format: 20/Aug/25, 21/Aug/25, 22/Aug/25",
        );
    }
    if has_duplicate_dates(trimmed) {
        errors.push(Field::Dates, "Duplicate dates are not allowed");
    }
    errors.into_result(trimmed.to_string())
}

fn has_duplicate_dates(dates: &str) -> bool {
    let parts: Vec<String> = date_tokens(dates).map(str::to_uppercase).collect();
    let unique: HashSet<&String> = parts.iter().collect();
    unique.len() != parts.len()
}

/// The individual, non-empty dates of a list
pub fn date_tokens(dates: &str) -> impl Iterator<Item = &str> {
    dates.split(',').map(str::trim).filter(|p| !p.is_empty())
}

/// Hours must be in range and have at most two decimals. The decimals are checked on the
/// shortest text rendering of the number, `1` or `2.25`.
fn validate_time_spend(errors: &mut ValidationErrors, hours: f64) {
    if hours.is_nan() || hours < MIN_HOURS {
        errors.push(Field::TimeSpend, "Minimum 0.01 hours");
    } else if hours > MAX_HOURS {
        errors.push(Field::TimeSpend, "Max 8 hours");
    }
    if !hours.is_nan() && !TWO_DECIMALS.is_match(&hours.to_string()) {
        errors.push(Field::TimeSpend, "Max 2 decimal places");
    }
}

/// A sanitized entry, before it has been given an id
#[derive(Debug, Clone, PartialEq)]
pub struct EntryCandidate<'a> {
    pub ticket_id: &'a str,
    pub type_of_work: &'a str,
    pub description: &'a str,
    pub time_spend: f64,
}

/// Validated fields of an entry, ready to be stored under an id
#[derive(Debug, Clone, PartialEq)]
pub struct ValidEntry {
    pub ticket_id: String,
    pub type_of_work: TypeOfWork,
    pub description: String,
    pub time_spend: f64,
}

impl ValidEntry {
    #[must_use]
    pub fn into_work_entry(self, local_id: LocalId) -> WorkEntry {
        WorkEntry {
            local_id,
            ticket_id: self.ticket_id,
            type_of_work: self.type_of_work,
            description: self.description,
            time_spend: self.time_spend,
        }
    }
}

/// Validates a single work entry
///
/// # Errors
/// Every rule the entry breaks, keyed by the entry field
pub fn validate_entry(candidate: &EntryCandidate<'_>) -> Result<ValidEntry, ValidationErrors> {
    let mut errors = ValidationErrors::default();

    let type_of_work = match candidate.type_of_work.parse::<TypeOfWork>() {
        Ok(t) => Some(t),
        Err(_) => {
            errors.push(Field::TypeOfWork, "Invalid option");
            None
        }
    };

    let description_len = candidate.description.chars().count();
    if description_len == 0 {
        errors.push(Field::Description, "Description is required");
    } else if description_len > MAX_DESCRIPTION_LEN {
        errors.push(Field::Description, "Description too long");
    }

    validate_time_spend(&mut errors, candidate.time_spend);

    check_length(
        &mut errors,
        Field::TicketId,
        candidate.ticket_id,
        MAX_TICKET_ID_LEN,
        "Ticket ID is required",
        "Ticket ID too long",
    );
    if !TICKET_ID.is_match(candidate.ticket_id) {
        errors.push(
            Field::TicketId,
            "Ticket ID must match format ABC-123 (e.g., C99KBBATC2025-37)",
        );
    }

    match type_of_work {
        Some(type_of_work) if errors.is_empty() => Ok(ValidEntry {
            ticket_id: candidate.ticket_id.to_string(),
            type_of_work,
            description: candidate.description.to_string(),
            time_spend: candidate.time_spend,
        }),
        _ => Err(errors),
    }
}

/// Sanitized batch as it is about to be submitted
#[derive(Debug, Clone, PartialEq)]
pub struct BatchCandidate<'a> {
    pub username: &'a str,
    pub token: &'a str,
    pub dates: &'a str,
    pub jira_instance: JiraInstance,
    pub entries: &'a [WorkEntry],
}

/// Validates a whole batch. Problems with individual entries are reported under the
/// `tickets` key, prefixed with the position of the entry.
///
/// # Errors
/// Every rule the batch breaks
pub fn validate_batch(batch: &BatchCandidate<'_>) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();

    if let Err(e) = validate_account(batch.username, batch.token) {
        errors.extend(e);
    }
    if let Err(e) = validate_dates(batch.dates) {
        errors.extend(e);
    }

    if batch.entries.is_empty() {
        errors.push(Field::Tickets, "Please add at least one ticket");
    }
    for (n, entry) in batch.entries.iter().enumerate() {
        let candidate = EntryCandidate {
            ticket_id: &entry.ticket_id,
            type_of_work: entry.type_of_work.as_str(),
            description: &entry.description,
            time_spend: entry.time_spend,
        };
        if let Err(e) = validate_entry(&candidate) {
            for issue in e.issues() {
                errors.push(Field::Tickets, format!("Ticket #{}: {}", n + 1, issue.message));
            }
        }
    }

    errors.into_result(())
}

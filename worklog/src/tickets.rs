//! The entries of the batch being prepared.
//!
//! Every mutation sanitizes and validates its input first and is rejected without side effects
//! if the entry is invalid or if the batch would exceed the daily cap of 8 hours.
use log::debug;
use thiserror::Error;

use crate::sanitize;
use crate::types::{EntryDraft, EntryField, LocalId, LocalIdGenerator, WorkEntry};
use crate::validate::{self, EntryCandidate, ValidEntry, ValidationErrors};

/// Daily cap in hundredths of an hour
pub const DAILY_CAP_HUNDREDTHS: i64 = 800;

pub const DAILY_CAP_MESSAGE: &str =
    "Total hours per day cannot exceed 8.0 hrs. Please adjust your entries.";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EntryRejection {
    #[error("Invalid entry: {0}")]
    Invalid(ValidationErrors),
    #[error("Total hours per day cannot exceed 8.0 hrs. Please adjust your entries.")]
    DailyCapExceeded { requested_hundredths: i64 },
    #[error("No entry with id {0}")]
    UnknownEntry(LocalId),
}

/// Sanitizes every field of the draft and validates the result
///
/// # Errors
/// The validation issues of the sanitized draft
pub fn validate_draft(draft: &EntryDraft) -> Result<ValidEntry, ValidationErrors> {
    let ticket_id = sanitize::sanitize_ticket_id(&draft.ticket_id);
    let description = sanitize::sanitize_description(&draft.description);
    let time_spend = sanitize::sanitize_hours(&draft.time_spend);
    validate::validate_entry(&EntryCandidate {
        ticket_id: &ticket_id,
        type_of_work: draft.type_of_work.trim(),
        description: &description,
        time_spend,
    })
}

#[derive(Debug, Default)]
pub struct TicketCollection {
    entries: Vec<WorkEntry>,
    ids: LocalIdGenerator,
}

impl TicketCollection {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn entries(&self) -> &[WorkEntry] {
        &self.entries
    }

    #[must_use]
    pub fn get(&self, local_id: LocalId) -> Option<&WorkEntry> {
        self.entries.iter().find(|e| e.local_id == local_id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of all hours, in hundredths
    #[must_use]
    pub fn total_hundredths(&self) -> i64 {
        self.entries.iter().map(WorkEntry::hundredths).sum()
    }

    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn total_hours(&self) -> f64 {
        self.total_hundredths() as f64 / 100.0
    }

    /// Appends a new entry built from `draft`.
    ///
    /// # Errors
    /// If the draft is invalid or the new total would exceed the daily cap
    pub fn add(&mut self, draft: &EntryDraft) -> Result<&WorkEntry, EntryRejection> {
        let valid = validate_draft(draft).map_err(EntryRejection::Invalid)?;
        let requested = self.total_hundredths() + hundredths(valid.time_spend);
        if requested > DAILY_CAP_HUNDREDTHS {
            debug!("Rejecting {}: {requested} hundredths of an hour", valid.ticket_id);
            return Err(EntryRejection::DailyCapExceeded {
                requested_hundredths: requested,
            });
        }

        let entry = valid.into_work_entry(self.ids.next_id());
        debug!("Added entry {entry:?}");
        self.entries.push(entry);
        let last = self.entries.len() - 1;
        Ok(&self.entries[last])
    }

    /// Removes the entry, if it is there. Returns the removed entry.
    pub fn remove(&mut self, local_id: LocalId) -> Option<WorkEntry> {
        let position = self.entries.iter().position(|e| e.local_id == local_id)?;
        Some(self.entries.remove(position))
    }

    /// Changes one field of an existing entry. The whole entry is re-validated and the cap is
    /// checked including the new value; if either fails the stored entry is left as it was.
    ///
    /// # Errors
    /// Unknown id, invalid result or daily cap exceeded
    pub fn edit(
        &mut self,
        local_id: LocalId,
        change: &EntryField,
    ) -> Result<&WorkEntry, EntryRejection> {
        let position = self
            .entries
            .iter()
            .position(|e| e.local_id == local_id)
            .ok_or(EntryRejection::UnknownEntry(local_id))?;

        let mut draft = EntryDraft::from(&self.entries[position]);
        change.apply_to(&mut draft);
        let valid = validate_draft(&draft).map_err(EntryRejection::Invalid)?;

        let others: i64 = self
            .entries
            .iter()
            .filter(|e| e.local_id != local_id)
            .map(WorkEntry::hundredths)
            .sum();
        let requested = others + hundredths(valid.time_spend);
        if requested > DAILY_CAP_HUNDREDTHS {
            return Err(EntryRejection::DailyCapExceeded {
                requested_hundredths: requested,
            });
        }

        self.entries[position] = valid.into_work_entry(local_id);
        Ok(&self.entries[position])
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[allow(clippy::cast_possible_truncation)]
fn hundredths(hours: f64) -> i64 {
    (hours * 100.0).round() as i64
}

//! Client-side narrowing of displayed records.
//!
//! Search matches are case-insensitive partial matches on the display name,
//! its individual parts, and the EPIC number. Gender and religion are exact
//! matches; `None` means "All". Whether a filter narrows only the loaded
//! page or the whole snapshot is chosen by [`FilterScope`] — see the
//! controller module for the scope discussion.

use crate::record::VoterRecord;

/// Which records a filter is applied over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterScope {
    /// Narrow only the currently loaded page. This mirrors the source
    /// system's behavior and is the default.
    #[default]
    CurrentPage,

    /// Scan every page of the snapshot. Flagged for product confirmation;
    /// kept behind this explicit switch rather than silently replacing the
    /// page-scoped behavior.
    Snapshot,
}

/// Search and demographic filter criteria.
#[derive(Debug, Clone, Default)]
pub struct PageFilter {
    /// Free-text search over name and EPIC number.
    pub search: Option<String>,

    /// Exact gender match; `None` means all genders.
    pub gender: Option<String>,

    /// Exact religion match; `None` means all religions.
    pub religion: Option<String>,
}

impl PageFilter {
    /// A filter matching everything (the "clear filters" action).
    pub fn clear() -> Self {
        PageFilter::default()
    }

    /// Whether the record passes all criteria.
    pub fn matches(&self, record: &VoterRecord) -> bool {
        self.matches_search(record) && self.matches_gender(record) && self.matches_religion(record)
    }

    /// The subset of `records` passing all criteria, in input order.
    pub fn apply(&self, records: &[VoterRecord]) -> Vec<VoterRecord> {
        records
            .iter()
            .filter(|r| self.matches(r))
            .cloned()
            .collect()
    }

    fn matches_search(&self, record: &VoterRecord) -> bool {
        let Some(term) = self.search.as_deref() else {
            return true;
        };
        let term = term.trim().to_lowercase();
        if term.is_empty() {
            return true;
        }

        let name = record.display_name().to_lowercase();
        if name.contains(&term) {
            return true;
        }
        if name.split_whitespace().any(|part| part.contains(&term)) {
            return true;
        }

        record
            .epic_number
            .as_deref()
            .is_some_and(|epic| epic.to_lowercase().contains(&term))
    }

    fn matches_gender(&self, record: &VoterRecord) -> bool {
        match self.gender.as_deref() {
            None => true,
            Some(gender) => record.gender.as_deref() == Some(gender),
        }
    }

    fn matches_religion(&self, record: &VoterRecord) -> bool {
        match self.religion.as_deref() {
            None => true,
            Some(religion) => record.religion.as_deref() == Some(religion),
        }
    }
}

/// Distinct non-empty gender values in first-seen order, for dropdown
/// population.
pub fn distinct_genders(records: &[VoterRecord]) -> Vec<String> {
    distinct_values(records, |r| r.gender.as_deref())
}

/// Distinct non-empty religion values in first-seen order.
pub fn distinct_religions(records: &[VoterRecord]) -> Vec<String> {
    distinct_values(records, |r| r.religion.as_deref())
}

fn distinct_values<F>(records: &[VoterRecord], field: F) -> Vec<String>
where
    F: Fn(&VoterRecord) -> Option<&str>,
{
    let mut values: Vec<String> = Vec::new();
    for record in records {
        if let Some(value) = field(record) {
            if !value.is_empty() && !values.iter().any(|v| v == value) {
                values.push(value.to_string());
            }
        }
    }
    values
}

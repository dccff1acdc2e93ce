//! Voter record data model.
//!
//! A [`VoterRecord`] is a flat, immutable row of the current dataset
//! snapshot. The identity key is `voter_id`, falling back to `epic_number`;
//! a record carrying neither is rejected when the dataset is parsed.

use serde::{Deserialize, Serialize};

use crate::error::{Result, VoterRollError};

/// A single voter-roll entry.
///
/// Field names follow the bulk dataset payload exactly. All fields are
/// optional in the wire format; [`VoterRecord::identity_key`] is the only
/// hard requirement, enforced by [`validate_dataset`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VoterRecord {
    /// Primary identity key within a snapshot.
    pub voter_id: Option<String>,

    /// Electoral photo identity card number; identity fallback.
    pub epic_number: Option<String>,

    /// Pre-joined full name, when the source provides one.
    pub voter_full_name: Option<String>,

    /// First and middle name, used when no full name is present.
    pub voter_first_middle_name: Option<String>,

    /// Last name, used when no full name is present.
    pub voter_last_name: Option<String>,

    /// Gender as reported by the roll.
    pub gender: Option<String>,

    /// Age in years.
    pub age: Option<u32>,

    /// Religion as reported by the roll.
    pub religion: Option<String>,

    /// Full name of the registered relation.
    pub relation_full_name: Option<String>,

    /// Relation type (father, mother, husband, ...).
    pub relation_type: Option<String>,

    /// House number portion of the address.
    pub house_number: Option<String>,
}

impl VoterRecord {
    /// The key this record is stored under: `voter_id`, else `epic_number`.
    pub fn identity_key(&self) -> Option<&str> {
        self.voter_id
            .as_deref()
            .filter(|id| !id.is_empty())
            .or_else(|| self.epic_number.as_deref().filter(|id| !id.is_empty()))
    }

    /// Display name: the pre-joined full name when present, otherwise
    /// first/middle and last name joined with a space. Always trimmed.
    pub fn display_name(&self) -> String {
        if let Some(full) = &self.voter_full_name {
            let trimmed = full.trim();
            if !trimmed.is_empty() {
                return trimmed.to_string();
            }
        }

        let first = self.voter_first_middle_name.as_deref().unwrap_or("").trim();
        let last = self.voter_last_name.as_deref().unwrap_or("").trim();
        format!("{first} {last}").trim().to_string()
    }
}

/// Additional per-voter details returned by the drill-down endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VoterDetails {
    /// Date of birth.
    pub dob: Option<String>,

    /// Polling booth identifier.
    pub booth_id: Option<String>,

    /// Ward identifier.
    pub ward_id: Option<String>,

    /// Assembly constituency identifier.
    pub assembly_id: Option<String>,

    /// Section number within the booth.
    pub section_number: Option<String>,

    /// District name.
    pub district: Option<String>,

    /// State name.
    pub state: Option<String>,

    /// Postal PIN code.
    pub pin_code: Option<String>,

    /// First address line.
    pub address_line_1: Option<String>,

    /// Second address line.
    pub address_line_2: Option<String>,
}

/// Validate a freshly parsed dataset: every record must carry an identity
/// key. Returns a parse error naming the first offending index.
pub fn validate_dataset(records: &[VoterRecord]) -> Result<()> {
    for (index, record) in records.iter().enumerate() {
        if record.identity_key().is_none() {
            return Err(VoterRollError::parse(format!(
                "record at index {index} has neither voter_id nor epic_number"
            )));
        }
    }
    Ok(())
}

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum InternshipStatus {
    #[default]
    Applied,
    Interviewed,
    Accepted,
    Rejected,
    Ongoing,
    Completed,
}

impl InternshipStatus {
    pub const ALL: [InternshipStatus; 6] = [
        InternshipStatus::Applied,
        InternshipStatus::Interviewed,
        InternshipStatus::Accepted,
        InternshipStatus::Rejected,
        InternshipStatus::Ongoing,
        InternshipStatus::Completed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            InternshipStatus::Applied => "Applied",
            InternshipStatus::Interviewed => "Interviewed",
            InternshipStatus::Accepted => "Accepted",
            InternshipStatus::Rejected => "Rejected",
            InternshipStatus::Ongoing => "Ongoing",
            InternshipStatus::Completed => "Completed",
        }
    }
}

impl fmt::Display for InternshipStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InternshipStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown internship status: {s}"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum InternshipType {
    #[default]
    Remote,
    Onsite,
    Hybrid,
    Paid,
    Unpaid,
}

impl InternshipType {
    pub const ALL: [InternshipType; 5] = [
        InternshipType::Remote,
        InternshipType::Onsite,
        InternshipType::Hybrid,
        InternshipType::Paid,
        InternshipType::Unpaid,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            InternshipType::Remote => "Remote",
            InternshipType::Onsite => "Onsite",
            InternshipType::Hybrid => "Hybrid",
            InternshipType::Paid => "Paid",
            InternshipType::Unpaid => "Unpaid",
        }
    }
}

impl fmt::Display for InternshipType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InternshipType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown internship type: {s}"))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Person {
    pub id: Uuid,
    pub name: String,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Intern {
    pub id: Uuid,
    pub sr_no: i32,
    pub intern_name: String,
    pub email: String,
    pub phone_number: String,
    pub internship_status: InternshipStatus,
    pub date_applied: String,
    pub interviewer: String,
    pub internship_type: InternshipType,
    pub joining_date: String,
    pub duration: String,
    pub accepted_offer_letter: bool,
    pub notes: String,
    pub performance_rating: i32,
    pub full_time_conversion: bool,
    pub person_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Partial record produced by the CSV reader. Fields missing from the
/// file's header set stay `None`; defaults are applied once, at commit
/// time, by [`Intern::from_draft`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InternDraft {
    pub intern_name: Option<String>,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub internship_status: Option<String>,
    pub date_applied: Option<String>,
    pub interviewer: Option<String>,
    pub internship_type: Option<String>,
    pub joining_date: Option<String>,
    pub duration: Option<String>,
    pub accepted_offer_letter: Option<bool>,
    pub notes: Option<String>,
    pub performance_rating: Option<i32>,
    pub full_time_conversion: Option<bool>,
    /// Columns that map to no canonical field; kept for preview, ignored
    /// by the merge.
    pub extra: BTreeMap<String, String>,
}

/// Partial update applied to an existing record.
#[derive(Debug, Clone, Default)]
pub struct InternPatch {
    pub sr_no: Option<i32>,
    pub intern_name: Option<String>,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub internship_status: Option<InternshipStatus>,
    pub date_applied: Option<String>,
    pub interviewer: Option<String>,
    pub internship_type: Option<InternshipType>,
    pub joining_date: Option<String>,
    pub duration: Option<String>,
    pub accepted_offer_letter: Option<bool>,
    pub notes: Option<String>,
    pub performance_rating: Option<i32>,
    pub full_time_conversion: Option<bool>,
}

impl InternPatch {
    pub fn is_empty(&self) -> bool {
        self.sr_no.is_none()
            && self.intern_name.is_none()
            && self.email.is_none()
            && self.phone_number.is_none()
            && self.internship_status.is_none()
            && self.date_applied.is_none()
            && self.interviewer.is_none()
            && self.internship_type.is_none()
            && self.joining_date.is_none()
            && self.duration.is_none()
            && self.accepted_offer_letter.is_none()
            && self.notes.is_none()
            && self.performance_rating.is_none()
            && self.full_time_conversion.is_none()
    }

    pub fn apply(&self, intern: &mut Intern, now: DateTime<Utc>) {
        if let Some(value) = self.sr_no {
            intern.sr_no = value;
        }
        if let Some(value) = &self.intern_name {
            intern.intern_name = value.clone();
        }
        if let Some(value) = &self.email {
            intern.email = value.clone();
        }
        if let Some(value) = &self.phone_number {
            intern.phone_number = value.clone();
        }
        if let Some(value) = self.internship_status {
            intern.internship_status = value;
        }
        if let Some(value) = &self.date_applied {
            intern.date_applied = value.clone();
        }
        if let Some(value) = &self.interviewer {
            intern.interviewer = value.clone();
        }
        if let Some(value) = self.internship_type {
            intern.internship_type = value;
        }
        if let Some(value) = &self.joining_date {
            intern.joining_date = value.clone();
        }
        if let Some(value) = &self.duration {
            intern.duration = value.clone();
        }
        if let Some(value) = self.accepted_offer_letter {
            intern.accepted_offer_letter = value;
        }
        if let Some(value) = &self.notes {
            intern.notes = value.clone();
        }
        if let Some(value) = self.performance_rating {
            intern.performance_rating = value;
        }
        if let Some(value) = self.full_time_conversion {
            intern.full_time_conversion = value;
        }
        intern.updated_at = now;
    }
}

impl Intern {
    /// Merge a draft with defaults for every canonical field and stamp
    /// identity, ownership, and timestamps.
    pub fn from_draft(draft: InternDraft, person_id: Uuid, sr_no: i32, now: DateTime<Utc>) -> Self {
        Intern {
            id: Uuid::new_v4(),
            sr_no,
            intern_name: draft.intern_name.unwrap_or_default(),
            email: draft.email.unwrap_or_default(),
            phone_number: draft.phone_number.unwrap_or_default(),
            internship_status: draft
                .internship_status
                .and_then(|s| s.parse().ok())
                .unwrap_or_default(),
            date_applied: draft
                .date_applied
                .unwrap_or_else(|| now.date_naive().to_string()),
            interviewer: draft.interviewer.unwrap_or_default(),
            internship_type: draft
                .internship_type
                .and_then(|s| s.parse().ok())
                .unwrap_or_default(),
            joining_date: draft.joining_date.unwrap_or_default(),
            duration: draft.duration.unwrap_or_default(),
            accepted_offer_letter: draft.accepted_offer_letter.unwrap_or(false),
            notes: draft.notes.unwrap_or_default(),
            performance_rating: draft.performance_rating.unwrap_or(0),
            full_time_conversion: draft.full_time_conversion.unwrap_or(false),
            person_id,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn field(&self, key: &str) -> Option<FieldValue> {
        let value = match key {
            "sr_no" => FieldValue::Int(self.sr_no),
            "intern_name" => FieldValue::Text(self.intern_name.clone()),
            "email" => FieldValue::Text(self.email.clone()),
            "phone_number" => FieldValue::Text(self.phone_number.clone()),
            "internship_status" => FieldValue::Text(self.internship_status.to_string()),
            "date_applied" => FieldValue::Text(self.date_applied.clone()),
            "interviewer" => FieldValue::Text(self.interviewer.clone()),
            "internship_type" => FieldValue::Text(self.internship_type.to_string()),
            "joining_date" => FieldValue::Text(self.joining_date.clone()),
            "duration" => FieldValue::Text(self.duration.clone()),
            "accepted_offer_letter" => FieldValue::Bool(self.accepted_offer_letter),
            "performance_rating" => FieldValue::Int(self.performance_rating),
            "full_time_conversion" => FieldValue::Bool(self.full_time_conversion),
            "notes" => FieldValue::Text(self.notes.clone()),
            _ => return None,
        };
        Some(value)
    }
}

/// A single cell, typed just enough for rendering and filtering.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Int(i32),
    Bool(bool),
}

impl FieldValue {
    /// String form used by filters, choice lists, and the exporter.
    /// Booleans render as "Yes"/"No".
    pub fn display(&self) -> String {
        match self {
            FieldValue::Text(s) => s.clone(),
            FieldValue::Int(n) => n.to_string(),
            FieldValue::Bool(true) => "Yes".to_string(),
            FieldValue::Bool(false) => "No".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub key: &'static str,
    pub label: &'static str,
}

pub const COLUMNS: [Column; 14] = [
    Column { key: "sr_no", label: "Sr No." },
    Column { key: "intern_name", label: "Intern Name" },
    Column { key: "email", label: "Email" },
    Column { key: "phone_number", label: "Phone" },
    Column { key: "internship_status", label: "Status" },
    Column { key: "date_applied", label: "Date Applied" },
    Column { key: "interviewer", label: "Interviewer" },
    Column { key: "internship_type", label: "Type" },
    Column { key: "joining_date", label: "Joining Date" },
    Column { key: "duration", label: "Duration" },
    Column { key: "accepted_offer_letter", label: "Offer Accepted" },
    Column { key: "performance_rating", label: "Rating" },
    Column { key: "full_time_conversion", label: "Full-Time" },
    Column { key: "notes", label: "Notes" },
];

pub const DEFAULT_VISIBLE: [&str; 8] = [
    "sr_no",
    "intern_name",
    "email",
    "phone_number",
    "internship_status",
    "internship_type",
    "joining_date",
    "performance_rating",
];

pub const BOOL_COLUMNS: [&str; 2] = ["accepted_offer_letter", "full_time_conversion"];

pub fn column_by_key(key: &str) -> Option<Column> {
    COLUMNS.iter().copied().find(|column| column.key == key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_parse_accepts_canonical_spellings() {
        assert_eq!(
            "Interviewed".parse::<InternshipStatus>().unwrap(),
            InternshipStatus::Interviewed
        );
        assert_eq!(
            "ongoing".parse::<InternshipStatus>().unwrap(),
            InternshipStatus::Ongoing
        );
        assert!("Abandoned".parse::<InternshipStatus>().is_err());
    }

    #[test]
    fn draft_merge_applies_defaults_once() {
        let now = Utc::now();
        let person_id = Uuid::new_v4();
        let draft = InternDraft {
            intern_name: Some("John Smith".to_string()),
            performance_rating: Some(4),
            ..InternDraft::default()
        };

        let intern = Intern::from_draft(draft, person_id, 7, now);
        assert_eq!(intern.sr_no, 7);
        assert_eq!(intern.intern_name, "John Smith");
        assert_eq!(intern.email, "");
        assert_eq!(intern.internship_status, InternshipStatus::Applied);
        assert_eq!(intern.internship_type, InternshipType::Remote);
        assert_eq!(intern.date_applied, now.date_naive().to_string());
        assert_eq!(intern.performance_rating, 4);
        assert!(!intern.accepted_offer_letter);
        assert_eq!(intern.person_id, person_id);
    }

    #[test]
    fn unknown_status_in_draft_falls_back_to_default() {
        let draft = InternDraft {
            intern_name: Some("A".to_string()),
            internship_status: Some("OnSite???".to_string()),
            internship_type: Some("Hybrid".to_string()),
            ..InternDraft::default()
        };
        let intern = Intern::from_draft(draft, Uuid::new_v4(), 1, Utc::now());
        assert_eq!(intern.internship_status, InternshipStatus::Applied);
        assert_eq!(intern.internship_type, InternshipType::Hybrid);
    }
}

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Raised when an inbound identifier does not have the document-id shape.
/// Distinct from a lookup miss: a malformed id is a caller error (400), a
/// well-formed id with no record behind it is not-found (404).
#[derive(Debug, thiserror::Error)]
#[error("malformed identifier '{raw}': expected 24 lowercase hex characters")]
pub struct IdentifierError {
    pub raw: String,
}

fn parse_document_id(raw: &str) -> Result<String, IdentifierError> {
    let trimmed = raw.trim();
    let well_formed = trimmed.len() == 24
        && trimmed
            .chars()
            .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c));
    if well_formed {
        Ok(trimmed.to_string())
    } else {
        Err(IdentifierError {
            raw: raw.to_string(),
        })
    }
}

macro_rules! document_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn parse(raw: &str) -> Result<Self, IdentifierError> {
                parse_document_id(raw).map(Self)
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }
    };
}

document_id!(
    /// Identifier of a registered student.
    UserId
);
document_id!(
    /// Identifier of a job posting.
    JobId
);
document_id!(
    /// Identifier of a stored application record.
    ApplicationId
);
document_id!(
    /// Identifier of a placement tracking record.
    TrackingId
);
document_id!(
    /// Identifier of a scheduled interview.
    InterviewId
);
document_id!(
    /// Identifier of a notification record.
    NotificationId
);

/// A registered student as the placement cell sees them. The profile fields
/// (cgpa, year, attendance) are free-form self-reported strings, not
/// validated numerically.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentRecord {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub registration_number: String,
    pub department: String,
    pub fee_paid: bool,
    #[serde(default)]
    pub cgpa: String,
    #[serde(default)]
    pub academic_year: String,
    #[serde(default)]
    pub backlogs: u32,
    #[serde(default)]
    pub attendance: String,
}

/// Lifecycle of a posting as stored on the job document. Operationally
/// unused today (every job keeps the default) but preserved on the schema.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobStatus {
    #[default]
    #[serde(rename = "Pending")]
    Pending,
    #[serde(rename = "Interview Scheduled")]
    InterviewScheduled,
}

/// An admin-posted opening.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    pub title: String,
    pub company: String,
    pub location: String,
    pub package: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description_file: Option<String>,
    pub requirements: Vec<String>,
    pub department: String,
    pub duration: String,
    pub deadline: NaiveDate,
    #[serde(default)]
    pub status: JobStatus,
}

/// Payload for creating a posting. Every field except the description file
/// is required; validation lives in [`super::catalog`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobDraft {
    pub title: String,
    pub company: String,
    pub location: String,
    pub package: String,
    pub description: String,
    #[serde(default)]
    pub description_file: Option<String>,
    pub requirements: Vec<String>,
    pub department: String,
    pub duration: String,
    pub deadline: NaiveDate,
}

/// Partial update for a posting; absent fields keep their stored value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobPatch {
    pub title: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    pub package: Option<String>,
    pub description: Option<String>,
    pub requirements: Option<Vec<String>>,
    pub department: Option<String>,
    pub duration: Option<String>,
    pub deadline: Option<NaiveDate>,
}

/// Input kind of a form field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Text,
    Number,
    File,
    Choice,
}

/// One field of an admin-defined application form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub label: String,
    pub kind: FieldKind,
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(default = "default_required")]
    pub required: bool,
}

fn default_required() -> bool {
    true
}

/// The per-job application form. Field labels are the answer keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobForm {
    pub job_id: JobId,
    pub fields: Vec<FieldSpec>,
}

/// A submitted answer, tagged by kind so storage never holds fully untyped
/// payloads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AnswerValue {
    Text(String),
    Number(f64),
    FileReference(String),
    Choice(String),
}

impl AnswerValue {
    pub const fn kind(&self) -> FieldKind {
        match self {
            AnswerValue::Text(_) => FieldKind::Text,
            AnswerValue::Number(_) => FieldKind::Number,
            AnswerValue::FileReference(_) => FieldKind::File,
            AnswerValue::Choice(_) => FieldKind::Choice,
        }
    }
}

/// Submission payload before the store stamps an id, the default status,
/// and the timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationDraft {
    pub user_id: UserId,
    pub job_id: JobId,
    pub job_title: String,
    pub company_name: String,
    pub answers: BTreeMap<String, AnswerValue>,
}

/// A form-driven submission record. Job title and company are a snapshot
/// taken at submission time and are never re-synchronized with later job
/// edits. The status field stays at its default; the tracking record is the
/// one the lifecycle advances.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationRecord {
    pub id: ApplicationId,
    pub user_id: UserId,
    pub job_id: JobId,
    pub job_title: String,
    pub company_name: String,
    pub answers: BTreeMap<String, AnswerValue>,
    pub status: PlacementStatus,
    pub submitted_at: DateTime<Utc>,
}

/// Per (student, job) status driving the student-facing tracker view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlacementStatus {
    #[serde(rename = "Pending")]
    Pending,
    #[serde(rename = "Interview Scheduled")]
    InterviewScheduled,
    #[serde(rename = "1st Round Scheduled")]
    FirstRoundScheduled,
    #[serde(rename = "2nd Round Scheduled")]
    SecondRoundScheduled,
    #[serde(rename = "Final Round Scheduled")]
    FinalRoundScheduled,
    #[serde(rename = "Selected")]
    Selected,
    #[serde(rename = "Rejected")]
    Rejected,
    #[serde(rename = "Completed")]
    Completed,
}

impl PlacementStatus {
    pub const fn label(self) -> &'static str {
        match self {
            PlacementStatus::Pending => "Pending",
            PlacementStatus::InterviewScheduled => "Interview Scheduled",
            PlacementStatus::FirstRoundScheduled => "1st Round Scheduled",
            PlacementStatus::SecondRoundScheduled => "2nd Round Scheduled",
            PlacementStatus::FinalRoundScheduled => "Final Round Scheduled",
            PlacementStatus::Selected => "Selected",
            PlacementStatus::Rejected => "Rejected",
            PlacementStatus::Completed => "Completed",
        }
    }
}

/// The authoritative per (student, job) status record. At most one exists
/// per pair; the stores enforce that with atomic upsert semantics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackingRecord {
    pub id: TrackingId,
    pub user_id: UserId,
    pub job_id: JobId,
    pub job_title: String,
    pub company_name: String,
    pub status: PlacementStatus,
}

/// Interview payload before the store stamps an id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterviewDraft {
    pub job_id: JobId,
    pub interviewer_email: String,
    pub date: NaiveDate,
    pub time: String,
    pub location: String,
    pub link: Option<String>,
    pub attachment: Option<String>,
}

/// A scheduled interview event. Job-scoped, never tied to one student: its
/// existence is what advances every applicant of the job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interview {
    pub id: InterviewId,
    pub job_id: JobId,
    pub interviewer_email: String,
    pub date: NaiveDate,
    pub time: String,
    pub location: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attachment: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NotificationKind {
    Interview,
    General,
}

/// A one-way message to a student (or to everyone, when `user_id` is None).
/// Never mutated after creation; the client has no read/unread state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: NotificationId,
    pub user_id: Option<UserId>,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attachment: Option<String>,
    pub kind: NotificationKind,
    pub created_at: DateTime<Utc>,
}

/// Notification payload before the store stamps an id and timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationDraft {
    pub user_id: Option<UserId>,
    pub message: String,
    pub link: Option<String>,
    pub attachment: Option<String>,
    pub kind: NotificationKind,
}

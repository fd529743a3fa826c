//! Placement lifecycle: application intake, per-job status tracking, and
//! notification fan-out.
//!
//! A student's path through the portal is a small state machine keyed by
//! (student, job): applying creates a Pending tracking record, scheduling an
//! interview for the job bulk-advances every Pending record and notifies the
//! affected students, and a read-triggered sweep completes records once the
//! interview date has passed. The service facade in [`service`] owns those
//! transitions; [`catalog`] carries the admin surface around them (job
//! postings, student directory, dashboard counts).

pub mod catalog;
pub mod domain;
pub mod forms;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use catalog::{CatalogError, CatalogService, DashboardStats, JobDraftError};
pub use domain::{
    AnswerValue, ApplicationDraft, ApplicationId, ApplicationRecord, FieldKind, FieldSpec,
    IdentifierError, Interview, InterviewDraft, InterviewId, Job, JobDraft, JobForm, JobId,
    JobPatch, JobStatus, Notification, NotificationDraft, NotificationId, NotificationKind,
    PlacementStatus, StudentRecord, TrackingId, TrackingRecord, UserId,
};
pub use forms::FormViolation;
pub use repository::{
    ApplicationStore, FormStore, InterviewStore, JobStore, NotificationStore, PlacementStore,
    RepositoryError, StatusBroadcast, StudentDirectory, TrackingStore, TrackingUpsert,
    UpsertSignal,
};
pub use router::placement_router;
pub use service::{
    ApplicationReportRow, ApplicationWithJob, InterviewRequest, PlacementLifecycleService,
    PlacementServiceError, ScheduleOutcome, SubmissionRequest,
};

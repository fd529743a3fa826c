use super::domain::{
    ApplicationDraft, ApplicationRecord, FieldSpec, Interview, InterviewDraft, Job, JobDraft,
    JobForm, JobId, JobPatch, Notification, NotificationDraft, PlacementStatus, StudentRecord,
    TrackingId, TrackingRecord, UserId,
};

/// Error enumeration for storage failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Outcome of the atomic tracking upsert.
#[derive(Debug, Clone, PartialEq)]
pub enum TrackingUpsert {
    Created(TrackingRecord),
    Existing(TrackingRecord),
}

impl TrackingUpsert {
    pub fn record(&self) -> &TrackingRecord {
        match self {
            TrackingUpsert::Created(record) | TrackingUpsert::Existing(record) => record,
        }
    }
}

/// Optional signal carried into the upsert: `InterviewRemoved` force-sets an
/// existing record to Completed (administrative override); `None` leaves an
/// existing record untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertSignal {
    None,
    InterviewRemoved,
}

/// Job posting collection.
pub trait JobStore: Send + Sync {
    fn insert_job(&self, draft: JobDraft) -> Result<Job, RepositoryError>;
    fn fetch_job(&self, id: &JobId) -> Result<Option<Job>, RepositoryError>;
    fn update_job(&self, id: &JobId, patch: JobPatch) -> Result<Job, RepositoryError>;
    fn delete_job(&self, id: &JobId) -> Result<(), RepositoryError>;
    fn list_jobs(&self) -> Result<Vec<Job>, RepositoryError>;
    fn count_jobs(&self) -> Result<u64, RepositoryError>;
}

/// Application-form collection. No uniqueness is enforced per job; a second
/// definition is stored alongside the first and `form_for_job` returns the
/// earliest one.
pub trait FormStore: Send + Sync {
    fn insert_form(&self, job_id: JobId, fields: Vec<FieldSpec>) -> Result<JobForm, RepositoryError>;
    fn form_for_job(&self, job_id: &JobId) -> Result<Option<JobForm>, RepositoryError>;
}

/// Submission-record collection. `insert_application` is the enforcement
/// point for the at-most-one-per-(user, job) invariant: implementations must
/// reject a duplicate pair with `Conflict` atomically, so two concurrent
/// identical submissions yield exactly one success.
pub trait ApplicationStore: Send + Sync {
    fn insert_application(
        &self,
        draft: ApplicationDraft,
    ) -> Result<ApplicationRecord, RepositoryError>;
    fn applications_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<ApplicationRecord>, RepositoryError>;
    fn list_applications(&self) -> Result<Vec<ApplicationRecord>, RepositoryError>;
    fn count_applications(&self) -> Result<u64, RepositoryError>;
}

/// Tracking-record collection. `upsert_tracking` must be a single atomic
/// find-and-update-or-insert on the (user, job) key, never a separate
/// existence check followed by an insert. The bulk methods are single
/// set-based updates returning the number of records they touched.
pub trait TrackingStore: Send + Sync {
    fn upsert_tracking(
        &self,
        user_id: &UserId,
        job_id: &JobId,
        job_title: &str,
        company_name: &str,
        signal: UpsertSignal,
    ) -> Result<TrackingUpsert, RepositoryError>;

    /// Pending -> Interview Scheduled for every record of the job.
    fn advance_pending(&self, job_id: &JobId) -> Result<u64, RepositoryError>;

    /// Everything not already Completed -> Completed across the given jobs.
    fn complete_trackings_for_jobs(&self, job_ids: &[JobId]) -> Result<u64, RepositoryError>;

    fn set_tracking_status(
        &self,
        id: &TrackingId,
        status: PlacementStatus,
    ) -> Result<TrackingRecord, RepositoryError>;

    fn trackings_for_user(&self, user_id: &UserId) -> Result<Vec<TrackingRecord>, RepositoryError>;

    fn trackings_for_job_with_status(
        &self,
        job_id: &JobId,
        status: PlacementStatus,
    ) -> Result<Vec<TrackingRecord>, RepositoryError>;
}

/// Interview collection.
pub trait InterviewStore: Send + Sync {
    fn insert_interview(&self, draft: InterviewDraft) -> Result<Interview, RepositoryError>;
    fn interviews_for_jobs(&self, job_ids: &[JobId]) -> Result<Vec<Interview>, RepositoryError>;
    fn list_interviews(&self) -> Result<Vec<Interview>, RepositoryError>;
}

/// Notification collection. `notifications_for` returns the union of
/// records addressed to the user and broadcast records (no addressee),
/// newest first.
pub trait NotificationStore: Send + Sync {
    fn insert_notification(&self, draft: NotificationDraft)
        -> Result<Notification, RepositoryError>;
    fn notifications_for(&self, user_id: &UserId) -> Result<Vec<Notification>, RepositoryError>;
}

/// The whole document store behind the placement workflows.
pub trait PlacementStore:
    JobStore + FormStore + ApplicationStore + TrackingStore + InterviewStore + NotificationStore
{
}

impl<T> PlacementStore for T where
    T: JobStore + FormStore + ApplicationStore + TrackingStore + InterviewStore + NotificationStore
{
}

/// Student lookups backing fan-out and the admin directory.
pub trait StudentDirectory: Send + Sync {
    fn find_student(&self, id: &UserId) -> Result<Option<StudentRecord>, RepositoryError>;
    fn list_students(&self) -> Result<Vec<StudentRecord>, RepositoryError>;
    fn toggle_fee_paid(&self, id: &UserId) -> Result<bool, RepositoryError>;
    fn count_students(&self) -> Result<u64, RepositoryError>;
}

/// Best-effort push channel toward connected clients, injected rather than
/// held as process-global state. Delivery is at-most-once; no connected
/// consumer is a no-op, never an error.
pub trait StatusBroadcast: Send + Sync {
    fn notify(&self, event: &str, payload: serde_json::Value);
}

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::warn;

use super::domain::{
    AnswerValue, ApplicationDraft, ApplicationRecord, FieldSpec, IdentifierError, Interview,
    InterviewDraft, Job, JobForm, JobId, Notification, NotificationDraft, NotificationKind,
    PlacementStatus, StudentRecord, TrackingId, TrackingRecord, UserId,
};
use super::forms::{self, FormViolation};
use super::repository::{
    PlacementStore, RepositoryError, StatusBroadcast, StudentDirectory, TrackingUpsert,
    UpsertSignal,
};

/// Push event emitted whenever tracking records advance in bulk, so
/// connected clients can refresh without polling.
pub const STATUS_EVENT: &str = "placement-status";

/// Inbound form-driven submission. Identifiers arrive as raw strings from
/// the HTTP surface and are validated here; title and company are trusted
/// caller-supplied snapshots, not re-derived from the job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionRequest {
    pub user_id: String,
    pub job_id: String,
    pub job_title: String,
    pub company_name: String,
    #[serde(default)]
    pub answers: BTreeMap<String, AnswerValue>,
}

/// Inbound interview-scheduling request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterviewRequest {
    pub job_id: String,
    pub interviewer_email: String,
    pub date: NaiveDate,
    pub time: String,
    pub location: String,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub attachment: Option<String>,
}

/// Result of scheduling an interview: the stored event plus how many
/// tracking records the bulk advance touched and how many notifications
/// were actually delivered.
#[derive(Debug, Clone, Serialize)]
pub struct ScheduleOutcome {
    pub interview: Interview,
    pub advanced: u64,
    pub notified: u64,
}

/// A student's application joined with its posting (gone postings yield
/// `None`, the snapshot fields on the application still render).
#[derive(Debug, Clone, Serialize)]
pub struct ApplicationWithJob {
    pub application: ApplicationRecord,
    pub job: Option<Job>,
}

/// Admin reporting row: application joined with student and posting.
#[derive(Debug, Clone, Serialize)]
pub struct ApplicationReportRow {
    pub application: ApplicationRecord,
    pub student: Option<StudentRecord>,
    pub job: Option<Job>,
}

/// Error raised by the lifecycle service.
#[derive(Debug, thiserror::Error)]
pub enum PlacementServiceError {
    #[error("an application for this job is already on file")]
    DuplicateApplication,
    #[error(transparent)]
    Validation(#[from] FormViolation),
    #[error(transparent)]
    Identifier(#[from] IdentifierError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Facade over the placement lifecycle: intake, status transitions, and
/// notification fan-out. Generic over the document store, the student
/// directory, and the push channel so hosts and tests can swap adapters.
pub struct PlacementLifecycleService<S, D, B> {
    store: Arc<S>,
    directory: Arc<D>,
    broadcast: Arc<B>,
}

impl<S, D, B> PlacementLifecycleService<S, D, B>
where
    S: PlacementStore + 'static,
    D: StudentDirectory + 'static,
    B: StatusBroadcast + 'static,
{
    pub fn new(store: Arc<S>, directory: Arc<D>, broadcast: Arc<B>) -> Self {
        Self {
            store,
            directory,
            broadcast,
        }
    }

    /// Form-driven submission: validate the answers, record the
    /// application exactly once, and make sure a tracking record exists.
    ///
    /// The two writes are not transactional. A failure after the
    /// application insert leaves it in place (no rollback); the status read
    /// path never depends on the application, so the record is still
    /// serviceable.
    pub fn submit_application(
        &self,
        request: SubmissionRequest,
    ) -> Result<ApplicationRecord, PlacementServiceError> {
        let user_id = UserId::parse(&request.user_id)?;
        let job_id = JobId::parse(&request.job_id)?;

        match self.store.form_for_job(&job_id)? {
            Some(form) => forms::validate_answers(&form, &request.answers)?,
            None => forms::validate_formless_answers(&request.answers)?,
        }

        let stored = match self.store.insert_application(ApplicationDraft {
            user_id: user_id.clone(),
            job_id: job_id.clone(),
            job_title: request.job_title.clone(),
            company_name: request.company_name.clone(),
            answers: request.answers,
        }) {
            Ok(record) => record,
            Err(RepositoryError::Conflict) => {
                return Err(PlacementServiceError::DuplicateApplication)
            }
            Err(other) => return Err(other.into()),
        };

        self.store.upsert_tracking(
            &user_id,
            &job_id,
            &request.job_title,
            &request.company_name,
            UpsertSignal::None,
        )?;

        Ok(stored)
    }

    /// Direct apply (no custom form): creates the tracking record only. An
    /// existing record for the pair means the student already applied.
    pub fn apply_direct(
        &self,
        user_id: &str,
        job_id: &str,
        job_title: &str,
        company_name: &str,
    ) -> Result<TrackingRecord, PlacementServiceError> {
        let user_id = UserId::parse(user_id)?;
        let job_id = JobId::parse(job_id)?;

        match self.store.upsert_tracking(
            &user_id,
            &job_id,
            job_title,
            company_name,
            UpsertSignal::None,
        )? {
            TrackingUpsert::Created(record) => Ok(record),
            TrackingUpsert::Existing(_) => Err(PlacementServiceError::DuplicateApplication),
        }
    }

    /// Find-or-create for a tracking record. With `InterviewRemoved`, an
    /// existing record is force-set to Completed (administrative override);
    /// otherwise an existing record is left untouched.
    pub fn upsert_tracking(
        &self,
        user_id: &str,
        job_id: &str,
        job_title: &str,
        company_name: &str,
        signal: UpsertSignal,
    ) -> Result<TrackingRecord, PlacementServiceError> {
        let user_id = UserId::parse(user_id)?;
        let job_id = JobId::parse(job_id)?;
        let outcome =
            self.store
                .upsert_tracking(&user_id, &job_id, job_title, company_name, signal)?;
        Ok(outcome.record().clone())
    }

    /// Store an admin-defined application form for a job.
    pub fn define_form(
        &self,
        job_id: &str,
        fields: Vec<FieldSpec>,
    ) -> Result<JobForm, PlacementServiceError> {
        let job_id = JobId::parse(job_id)?;
        forms::validate_fields(&fields)?;
        Ok(self.store.insert_form(job_id, fields)?)
    }

    pub fn form_for_job(&self, job_id: &str) -> Result<JobForm, PlacementServiceError> {
        let job_id = JobId::parse(job_id)?;
        self.store
            .form_for_job(&job_id)?
            .ok_or_else(|| RepositoryError::NotFound.into())
    }

    /// Schedule an interview for a job: store the event, bulk-advance every
    /// Pending tracking record, emit the push event, then notify each
    /// affected student. Notification failures are isolated per student;
    /// one bad recipient never blocks the rest.
    pub fn schedule_interview(
        &self,
        request: InterviewRequest,
    ) -> Result<ScheduleOutcome, PlacementServiceError> {
        let job_id = JobId::parse(&request.job_id)?;
        let job = self
            .store
            .fetch_job(&job_id)?
            .ok_or(RepositoryError::NotFound)?;

        let interview = self.store.insert_interview(InterviewDraft {
            job_id: job_id.clone(),
            interviewer_email: request.interviewer_email,
            date: request.date,
            time: request.time,
            location: request.location,
            link: request.link,
            attachment: request.attachment,
        })?;

        let advanced = self.store.advance_pending(&job_id)?;
        self.broadcast
            .notify(STATUS_EVENT, json!({ "jobId": job_id }));

        let affected = self
            .store
            .trackings_for_job_with_status(&job_id, PlacementStatus::InterviewScheduled)?;
        let notified = self.fan_out_interview_notices(&job, &interview, &affected);

        Ok(ScheduleOutcome {
            interview,
            advanced,
            notified,
        })
    }

    fn fan_out_interview_notices(
        &self,
        job: &Job,
        interview: &Interview,
        affected: &[TrackingRecord],
    ) -> u64 {
        let mut delivered = 0;
        for tracking in affected {
            let student = match self.directory.find_student(&tracking.user_id) {
                Ok(Some(student)) => student,
                Ok(None) => {
                    warn!(
                        user = tracking.user_id.as_str(),
                        "skipping interview notice: student not in directory"
                    );
                    continue;
                }
                Err(err) => {
                    warn!(
                        user = tracking.user_id.as_str(),
                        error = %err,
                        "skipping interview notice: directory lookup failed"
                    );
                    continue;
                }
            };

            let message = format!(
                "Interview scheduled for \"{}\" at \"{}\". Date: {}, Time: {}, Location: {}.",
                job.title, job.company, interview.date, interview.time, interview.location
            );

            let draft = NotificationDraft {
                user_id: Some(student.id.clone()),
                message,
                link: interview.link.clone(),
                attachment: interview.attachment.clone(),
                kind: NotificationKind::Interview,
            };

            match self.store.insert_notification(draft) {
                Ok(_) => delivered += 1,
                Err(err) => {
                    warn!(
                        user = student.id.as_str(),
                        error = %err,
                        "interview notice not delivered"
                    );
                }
            }
        }
        delivered
    }

    /// Single-record variant of the bulk advance, for ad hoc corrections.
    pub fn mark_interview_scheduled(
        &self,
        tracking_id: &str,
    ) -> Result<TrackingRecord, PlacementServiceError> {
        let id = TrackingId::parse(tracking_id)?;
        let record = self
            .store
            .set_tracking_status(&id, PlacementStatus::InterviewScheduled)?;
        self.broadcast
            .notify(STATUS_EVENT, json!({ "jobId": record.job_id }));
        Ok(record)
    }

    /// The student-facing tracker read. Runs the completion sweep first:
    /// any interview dated strictly before `today` (date-only comparison)
    /// completes every non-Completed tracking record of its job. The sweep
    /// is read-triggered, so staleness is bounded by how often a student
    /// checks their status.
    pub fn placement_status(
        &self,
        user_id: &str,
        today: NaiveDate,
    ) -> Result<Vec<TrackingRecord>, PlacementServiceError> {
        let user_id = UserId::parse(user_id)?;
        let trackings = self.store.trackings_for_user(&user_id)?;
        if trackings.is_empty() {
            return Err(RepositoryError::NotFound.into());
        }

        let completed = self.sweep_elapsed_interviews(&trackings, today)?;
        if completed == 0 {
            return Ok(trackings);
        }
        Ok(self.store.trackings_for_user(&user_id)?)
    }

    fn sweep_elapsed_interviews(
        &self,
        trackings: &[TrackingRecord],
        today: NaiveDate,
    ) -> Result<u64, PlacementServiceError> {
        let mut job_ids: Vec<JobId> = trackings
            .iter()
            .map(|tracking| tracking.job_id.clone())
            .collect();
        job_ids.sort();
        job_ids.dedup();

        let interviews = self.store.interviews_for_jobs(&job_ids)?;
        let mut elapsed: Vec<JobId> = interviews
            .into_iter()
            .filter(|interview| interview.date < today)
            .map(|interview| interview.job_id)
            .collect();
        elapsed.sort();
        elapsed.dedup();

        if elapsed.is_empty() {
            return Ok(0);
        }
        Ok(self.store.complete_trackings_for_jobs(&elapsed)?)
    }

    /// Notifications addressed to the student plus broadcasts, newest
    /// first. An empty feed is reported as not-found; the portal treats
    /// "nothing yet" as a distinct signal rather than an empty page.
    pub fn notifications_for(
        &self,
        user_id: &str,
    ) -> Result<Vec<Notification>, PlacementServiceError> {
        let user_id = UserId::parse(user_id)?;
        let notifications = self.store.notifications_for(&user_id)?;
        if notifications.is_empty() {
            return Err(RepositoryError::NotFound.into());
        }
        Ok(notifications)
    }

    /// A student's applications, each joined with its posting. An empty
    /// list is a valid answer here, not an error.
    pub fn applications_for_user(
        &self,
        user_id: &str,
    ) -> Result<Vec<ApplicationWithJob>, PlacementServiceError> {
        let user_id = UserId::parse(user_id)?;
        self.store
            .applications_for_user(&user_id)?
            .into_iter()
            .map(|application| {
                let job = self.store.fetch_job(&application.job_id)?;
                Ok(ApplicationWithJob { application, job })
            })
            .collect()
    }

    /// Every application joined with student and posting, for admin
    /// reporting.
    pub fn all_applications(&self) -> Result<Vec<ApplicationReportRow>, PlacementServiceError> {
        self.store
            .list_applications()?
            .into_iter()
            .map(|application| {
                let student = self.directory.find_student(&application.user_id)?;
                let job = self.store.fetch_job(&application.job_id)?;
                Ok(ApplicationReportRow {
                    application,
                    student,
                    job,
                })
            })
            .collect()
    }
}

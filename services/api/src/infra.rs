use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

use chrono::Utc;
use metrics_exporter_prometheus::PrometheusHandle;
use tracing::debug;

use placement_cell::workflows::placement::{
    ApplicationDraft, ApplicationId, ApplicationRecord, ApplicationStore, FieldSpec, FormStore,
    Interview, InterviewDraft, InterviewId, InterviewStore, Job, JobDraft, JobForm, JobId,
    JobPatch, JobStatus, JobStore, Notification, NotificationDraft, NotificationId,
    NotificationStore, PlacementStatus, RepositoryError, StatusBroadcast, StudentDirectory,
    StudentRecord, TrackingId, TrackingRecord, TrackingStore, TrackingUpsert, UpsertSignal,
    UserId,
};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Default)]
struct StoreInner {
    seq: u64,
    jobs: Vec<Job>,
    forms: Vec<JobForm>,
    applications: Vec<ApplicationRecord>,
    trackings: Vec<TrackingRecord>,
    interviews: Vec<Interview>,
    notifications: Vec<(u64, Notification)>,
}

impl StoreInner {
    fn next_id(&mut self) -> String {
        self.seq += 1;
        format!("{:024x}", self.seq)
    }
}

/// Single-process document store. One mutex guards every collection, which
/// is what makes the upsert and the bulk updates atomic here; a deployment
/// against a real document store gets the same guarantees from conditional
/// updates and update-many filters.
#[derive(Default)]
pub(crate) struct InMemoryPlacementStore {
    inner: Mutex<StoreInner>,
}

impl JobStore for InMemoryPlacementStore {
    fn insert_job(&self, draft: JobDraft) -> Result<Job, RepositoryError> {
        let mut inner = self.inner.lock().expect("store mutex poisoned");
        let job = Job {
            id: JobId(inner.next_id()),
            title: draft.title,
            company: draft.company,
            location: draft.location,
            package: draft.package,
            description: draft.description,
            description_file: draft.description_file,
            requirements: draft.requirements,
            department: draft.department,
            duration: draft.duration,
            deadline: draft.deadline,
            status: JobStatus::default(),
        };
        inner.jobs.push(job.clone());
        Ok(job)
    }

    fn fetch_job(&self, id: &JobId) -> Result<Option<Job>, RepositoryError> {
        let inner = self.inner.lock().expect("store mutex poisoned");
        Ok(inner.jobs.iter().find(|job| job.id == *id).cloned())
    }

    fn update_job(&self, id: &JobId, patch: JobPatch) -> Result<Job, RepositoryError> {
        let mut inner = self.inner.lock().expect("store mutex poisoned");
        let job = inner
            .jobs
            .iter_mut()
            .find(|job| job.id == *id)
            .ok_or(RepositoryError::NotFound)?;
        if let Some(title) = patch.title {
            job.title = title;
        }
        if let Some(company) = patch.company {
            job.company = company;
        }
        if let Some(location) = patch.location {
            job.location = location;
        }
        if let Some(package) = patch.package {
            job.package = package;
        }
        if let Some(description) = patch.description {
            job.description = description;
        }
        if let Some(requirements) = patch.requirements {
            job.requirements = requirements;
        }
        if let Some(department) = patch.department {
            job.department = department;
        }
        if let Some(duration) = patch.duration {
            job.duration = duration;
        }
        if let Some(deadline) = patch.deadline {
            job.deadline = deadline;
        }
        Ok(job.clone())
    }

    fn delete_job(&self, id: &JobId) -> Result<(), RepositoryError> {
        let mut inner = self.inner.lock().expect("store mutex poisoned");
        let before = inner.jobs.len();
        inner.jobs.retain(|job| job.id != *id);
        if inner.jobs.len() == before {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    fn list_jobs(&self) -> Result<Vec<Job>, RepositoryError> {
        Ok(self.inner.lock().expect("store mutex poisoned").jobs.clone())
    }

    fn count_jobs(&self) -> Result<u64, RepositoryError> {
        Ok(self.inner.lock().expect("store mutex poisoned").jobs.len() as u64)
    }
}

impl FormStore for InMemoryPlacementStore {
    fn insert_form(
        &self,
        job_id: JobId,
        fields: Vec<FieldSpec>,
    ) -> Result<JobForm, RepositoryError> {
        let mut inner = self.inner.lock().expect("store mutex poisoned");
        let form = JobForm { job_id, fields };
        inner.forms.push(form.clone());
        Ok(form)
    }

    fn form_for_job(&self, job_id: &JobId) -> Result<Option<JobForm>, RepositoryError> {
        let inner = self.inner.lock().expect("store mutex poisoned");
        Ok(inner
            .forms
            .iter()
            .find(|form| form.job_id == *job_id)
            .cloned())
    }
}

impl ApplicationStore for InMemoryPlacementStore {
    fn insert_application(
        &self,
        draft: ApplicationDraft,
    ) -> Result<ApplicationRecord, RepositoryError> {
        let mut inner = self.inner.lock().expect("store mutex poisoned");
        let duplicate = inner
            .applications
            .iter()
            .any(|record| record.user_id == draft.user_id && record.job_id == draft.job_id);
        if duplicate {
            return Err(RepositoryError::Conflict);
        }
        let record = ApplicationRecord {
            id: ApplicationId(inner.next_id()),
            user_id: draft.user_id,
            job_id: draft.job_id,
            job_title: draft.job_title,
            company_name: draft.company_name,
            answers: draft.answers,
            status: PlacementStatus::Pending,
            submitted_at: Utc::now(),
        };
        inner.applications.push(record.clone());
        Ok(record)
    }

    fn applications_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<ApplicationRecord>, RepositoryError> {
        let inner = self.inner.lock().expect("store mutex poisoned");
        Ok(inner
            .applications
            .iter()
            .filter(|record| record.user_id == *user_id)
            .cloned()
            .collect())
    }

    fn list_applications(&self) -> Result<Vec<ApplicationRecord>, RepositoryError> {
        Ok(self
            .inner
            .lock()
            .expect("store mutex poisoned")
            .applications
            .clone())
    }

    fn count_applications(&self) -> Result<u64, RepositoryError> {
        Ok(self
            .inner
            .lock()
            .expect("store mutex poisoned")
            .applications
            .len() as u64)
    }
}

impl TrackingStore for InMemoryPlacementStore {
    fn upsert_tracking(
        &self,
        user_id: &UserId,
        job_id: &JobId,
        job_title: &str,
        company_name: &str,
        signal: UpsertSignal,
    ) -> Result<TrackingUpsert, RepositoryError> {
        let mut inner = self.inner.lock().expect("store mutex poisoned");
        if let Some(existing) = inner
            .trackings
            .iter_mut()
            .find(|tracking| tracking.user_id == *user_id && tracking.job_id == *job_id)
        {
            if signal == UpsertSignal::InterviewRemoved {
                existing.status = PlacementStatus::Completed;
            }
            return Ok(TrackingUpsert::Existing(existing.clone()));
        }
        let record = TrackingRecord {
            id: TrackingId(inner.next_id()),
            user_id: user_id.clone(),
            job_id: job_id.clone(),
            job_title: job_title.to_string(),
            company_name: company_name.to_string(),
            status: PlacementStatus::Pending,
        };
        inner.trackings.push(record.clone());
        Ok(TrackingUpsert::Created(record))
    }

    fn advance_pending(&self, job_id: &JobId) -> Result<u64, RepositoryError> {
        let mut inner = self.inner.lock().expect("store mutex poisoned");
        let mut advanced = 0;
        for tracking in inner
            .trackings
            .iter_mut()
            .filter(|tracking| tracking.job_id == *job_id)
        {
            if tracking.status == PlacementStatus::Pending {
                tracking.status = PlacementStatus::InterviewScheduled;
                advanced += 1;
            }
        }
        Ok(advanced)
    }

    fn complete_trackings_for_jobs(&self, job_ids: &[JobId]) -> Result<u64, RepositoryError> {
        let mut inner = self.inner.lock().expect("store mutex poisoned");
        let mut completed = 0;
        for tracking in inner
            .trackings
            .iter_mut()
            .filter(|tracking| job_ids.contains(&tracking.job_id))
        {
            if tracking.status != PlacementStatus::Completed {
                tracking.status = PlacementStatus::Completed;
                completed += 1;
            }
        }
        Ok(completed)
    }

    fn set_tracking_status(
        &self,
        id: &TrackingId,
        status: PlacementStatus,
    ) -> Result<TrackingRecord, RepositoryError> {
        let mut inner = self.inner.lock().expect("store mutex poisoned");
        let tracking = inner
            .trackings
            .iter_mut()
            .find(|tracking| tracking.id == *id)
            .ok_or(RepositoryError::NotFound)?;
        tracking.status = status;
        Ok(tracking.clone())
    }

    fn trackings_for_user(&self, user_id: &UserId) -> Result<Vec<TrackingRecord>, RepositoryError> {
        let inner = self.inner.lock().expect("store mutex poisoned");
        Ok(inner
            .trackings
            .iter()
            .filter(|tracking| tracking.user_id == *user_id)
            .cloned()
            .collect())
    }

    fn trackings_for_job_with_status(
        &self,
        job_id: &JobId,
        status: PlacementStatus,
    ) -> Result<Vec<TrackingRecord>, RepositoryError> {
        let inner = self.inner.lock().expect("store mutex poisoned");
        Ok(inner
            .trackings
            .iter()
            .filter(|tracking| tracking.job_id == *job_id && tracking.status == status)
            .cloned()
            .collect())
    }
}

impl InterviewStore for InMemoryPlacementStore {
    fn insert_interview(&self, draft: InterviewDraft) -> Result<Interview, RepositoryError> {
        let mut inner = self.inner.lock().expect("store mutex poisoned");
        let interview = Interview {
            id: InterviewId(inner.next_id()),
            job_id: draft.job_id,
            interviewer_email: draft.interviewer_email,
            date: draft.date,
            time: draft.time,
            location: draft.location,
            link: draft.link,
            attachment: draft.attachment,
        };
        inner.interviews.push(interview.clone());
        Ok(interview)
    }

    fn interviews_for_jobs(&self, job_ids: &[JobId]) -> Result<Vec<Interview>, RepositoryError> {
        let inner = self.inner.lock().expect("store mutex poisoned");
        Ok(inner
            .interviews
            .iter()
            .filter(|interview| job_ids.contains(&interview.job_id))
            .cloned()
            .collect())
    }

    fn list_interviews(&self) -> Result<Vec<Interview>, RepositoryError> {
        Ok(self
            .inner
            .lock()
            .expect("store mutex poisoned")
            .interviews
            .clone())
    }
}

impl NotificationStore for InMemoryPlacementStore {
    fn insert_notification(
        &self,
        draft: NotificationDraft,
    ) -> Result<Notification, RepositoryError> {
        let mut inner = self.inner.lock().expect("store mutex poisoned");
        let seq = {
            inner.seq += 1;
            inner.seq
        };
        let notification = Notification {
            id: NotificationId(format!("{seq:024x}")),
            user_id: draft.user_id,
            message: draft.message,
            link: draft.link,
            attachment: draft.attachment,
            kind: draft.kind,
            created_at: Utc::now(),
        };
        inner.notifications.push((seq, notification.clone()));
        Ok(notification)
    }

    fn notifications_for(&self, user_id: &UserId) -> Result<Vec<Notification>, RepositoryError> {
        let inner = self.inner.lock().expect("store mutex poisoned");
        let mut matching: Vec<(u64, Notification)> = inner
            .notifications
            .iter()
            .filter(|(_, notification)| {
                notification.user_id.is_none() || notification.user_id.as_ref() == Some(user_id)
            })
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.0.cmp(&a.0));
        Ok(matching
            .into_iter()
            .map(|(_, notification)| notification)
            .collect())
    }
}

/// Student registry. Registration itself (credentials, verification mail)
/// lives with the identity collaborator; this directory only carries what
/// the placement workflows read and the one flag the admin panel flips.
#[derive(Default)]
pub(crate) struct InMemoryStudentDirectory {
    students: Mutex<Vec<StudentRecord>>,
}

impl InMemoryStudentDirectory {
    pub(crate) fn seed(&self, student: StudentRecord) {
        let mut students = self.students.lock().expect("directory mutex poisoned");
        if !students.iter().any(|existing| existing.id == student.id) {
            students.push(student);
        }
    }
}

impl StudentDirectory for InMemoryStudentDirectory {
    fn find_student(&self, id: &UserId) -> Result<Option<StudentRecord>, RepositoryError> {
        let students = self.students.lock().expect("directory mutex poisoned");
        Ok(students.iter().find(|student| student.id == *id).cloned())
    }

    fn list_students(&self) -> Result<Vec<StudentRecord>, RepositoryError> {
        Ok(self
            .students
            .lock()
            .expect("directory mutex poisoned")
            .clone())
    }

    fn toggle_fee_paid(&self, id: &UserId) -> Result<bool, RepositoryError> {
        let mut students = self.students.lock().expect("directory mutex poisoned");
        let student = students
            .iter_mut()
            .find(|student| student.id == *id)
            .ok_or(RepositoryError::NotFound)?;
        student.fee_paid = !student.fee_paid;
        Ok(student.fee_paid)
    }

    fn count_students(&self) -> Result<u64, RepositoryError> {
        Ok(self.students.lock().expect("directory mutex poisoned").len() as u64)
    }
}

/// Push-channel adapter. Events are logged and kept in a short ring so the
/// demo command can show them; a deployment would bridge these to its
/// realtime transport. Losing an event only costs a client one refresh.
#[derive(Default)]
pub(crate) struct LoggingBroadcast {
    recent: Mutex<Vec<(String, serde_json::Value)>>,
}

const RECENT_EVENT_CAP: usize = 64;

impl LoggingBroadcast {
    pub(crate) fn recent(&self) -> Vec<(String, serde_json::Value)> {
        self.recent.lock().expect("broadcast mutex poisoned").clone()
    }
}

impl StatusBroadcast for LoggingBroadcast {
    fn notify(&self, event: &str, payload: serde_json::Value) {
        debug!(event, %payload, "status broadcast");
        let mut recent = self.recent.lock().expect("broadcast mutex poisoned");
        if recent.len() == RECENT_EVENT_CAP {
            recent.remove(0);
        }
        recent.push((event.to_string(), payload));
    }
}

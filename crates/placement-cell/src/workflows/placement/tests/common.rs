use std::collections::{BTreeMap, HashSet};
use std::sync::{Arc, Mutex};

use chrono::{NaiveDate, Utc};

use crate::workflows::placement::catalog::CatalogService;
use crate::workflows::placement::domain::{
    AnswerValue, ApplicationDraft, ApplicationId, ApplicationRecord, FieldKind, FieldSpec,
    Interview, InterviewDraft, InterviewId, Job, JobDraft, JobForm, JobId, JobPatch, JobStatus,
    Notification, NotificationDraft, NotificationId, PlacementStatus, StudentRecord, TrackingId,
    TrackingRecord, UserId,
};
use crate::workflows::placement::repository::{
    ApplicationStore, FormStore, InterviewStore, JobStore, NotificationStore, RepositoryError,
    StatusBroadcast, StudentDirectory, TrackingStore, TrackingUpsert, UpsertSignal,
};
use crate::workflows::placement::service::PlacementLifecycleService;

/// Deterministic 24-hex student ids for fixtures, offset so they never
/// collide with store-stamped ids.
pub(super) fn student_id(n: u64) -> String {
    format!("{:024x}", 0x1000 + n)
}

pub(super) fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
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
    fail_notifications_for: HashSet<UserId>,
}

impl StoreInner {
    fn next_id(&mut self) -> String {
        self.seq += 1;
        format!("{:024x}", self.seq)
    }
}

/// In-memory document store. Every operation takes the single lock, which
/// gives the upsert and bulk updates the atomicity the trait contracts ask
/// for. Notification writes can be forced to fail per user so fan-out
/// isolation is testable.
#[derive(Default)]
pub(super) struct MemoryStore {
    inner: Mutex<StoreInner>,
}

impl MemoryStore {
    pub(super) fn fail_notifications_for(&self, user_id: &UserId) {
        self.inner
            .lock()
            .expect("store mutex poisoned")
            .fail_notifications_for
            .insert(user_id.clone());
    }

    pub(super) fn all_notifications(&self) -> Vec<Notification> {
        self.inner
            .lock()
            .expect("store mutex poisoned")
            .notifications
            .iter()
            .map(|(_, notification)| notification.clone())
            .collect()
    }

    pub(super) fn tracking_for(&self, user_id: &UserId, job_id: &JobId) -> Option<TrackingRecord> {
        self.inner
            .lock()
            .expect("store mutex poisoned")
            .trackings
            .iter()
            .find(|tracking| tracking.user_id == *user_id && tracking.job_id == *job_id)
            .cloned()
    }

    pub(super) fn tracking_count(&self) -> usize {
        self.inner.lock().expect("store mutex poisoned").trackings.len()
    }
}

impl JobStore for MemoryStore {
    fn insert_job(&self, draft: JobDraft) -> Result<Job, RepositoryError> {
        let mut inner = self.inner.lock().expect("store mutex poisoned");
        let id = JobId(inner.next_id());
        let job = Job {
            id,
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

impl FormStore for MemoryStore {
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

impl ApplicationStore for MemoryStore {
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

impl TrackingStore for MemoryStore {
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

impl InterviewStore for MemoryStore {
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

impl NotificationStore for MemoryStore {
    fn insert_notification(
        &self,
        draft: NotificationDraft,
    ) -> Result<Notification, RepositoryError> {
        let mut inner = self.inner.lock().expect("store mutex poisoned");
        if let Some(user_id) = &draft.user_id {
            if inner.fail_notifications_for.contains(user_id) {
                return Err(RepositoryError::Unavailable(
                    "notification collection offline".to_string(),
                ));
            }
        }
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

#[derive(Default)]
pub(super) struct MemoryDirectory {
    students: Mutex<Vec<StudentRecord>>,
}

impl MemoryDirectory {
    pub(super) fn seed(&self, student: StudentRecord) {
        self.students
            .lock()
            .expect("directory mutex poisoned")
            .push(student);
    }
}

impl StudentDirectory for MemoryDirectory {
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

#[derive(Default)]
pub(super) struct RecordingBroadcast {
    events: Mutex<Vec<(String, serde_json::Value)>>,
}

impl RecordingBroadcast {
    pub(super) fn events(&self) -> Vec<(String, serde_json::Value)> {
        self.events.lock().expect("broadcast mutex poisoned").clone()
    }
}

impl StatusBroadcast for RecordingBroadcast {
    fn notify(&self, event: &str, payload: serde_json::Value) {
        self.events
            .lock()
            .expect("broadcast mutex poisoned")
            .push((event.to_string(), payload));
    }
}

pub(super) type TestService =
    PlacementLifecycleService<MemoryStore, MemoryDirectory, RecordingBroadcast>;
pub(super) type TestCatalog = CatalogService<MemoryStore, MemoryDirectory>;

pub(super) fn build_service() -> (
    TestService,
    Arc<MemoryStore>,
    Arc<MemoryDirectory>,
    Arc<RecordingBroadcast>,
) {
    let store = Arc::new(MemoryStore::default());
    let directory = Arc::new(MemoryDirectory::default());
    let broadcast = Arc::new(RecordingBroadcast::default());
    let service =
        PlacementLifecycleService::new(store.clone(), directory.clone(), broadcast.clone());
    (service, store, directory, broadcast)
}

pub(super) fn build_catalog() -> (TestCatalog, Arc<MemoryStore>, Arc<MemoryDirectory>) {
    let store = Arc::new(MemoryStore::default());
    let directory = Arc::new(MemoryDirectory::default());
    let catalog = CatalogService::new(store.clone(), directory.clone());
    (catalog, store, directory)
}

pub(super) fn student(n: u64, name: &str) -> StudentRecord {
    StudentRecord {
        id: UserId(student_id(n)),
        name: name.to_string(),
        email: format!("{}@college.example.edu", name.to_ascii_lowercase()),
        registration_number: format!("PU2021{n:04}"),
        department: "Computer Science".to_string(),
        fee_paid: true,
        cgpa: "8.1".to_string(),
        academic_year: "Final".to_string(),
        backlogs: 0,
        attendance: "92%".to_string(),
    }
}

pub(super) fn job_draft() -> JobDraft {
    JobDraft {
        title: "Graduate Software Engineer".to_string(),
        company: "Cobalt Systems".to_string(),
        location: "Jaipur".to_string(),
        package: "6.5 LPA".to_string(),
        description: "Backend development on the billing platform.".to_string(),
        description_file: None,
        requirements: vec!["Rust or Go".to_string(), "No active backlogs".to_string()],
        department: "Computer Science".to_string(),
        duration: "Full time".to_string(),
        deadline: date(2025, 6, 30),
    }
}

pub(super) fn seed_job(store: &MemoryStore) -> Job {
    store.insert_job(job_draft()).expect("job stored")
}

pub(super) fn form_fields() -> Vec<FieldSpec> {
    vec![
        FieldSpec {
            label: "Resume".to_string(),
            kind: FieldKind::File,
            options: Vec::new(),
            required: true,
        },
        FieldSpec {
            label: "CGPA".to_string(),
            kind: FieldKind::Number,
            options: Vec::new(),
            required: true,
        },
        FieldSpec {
            label: "Preferred location".to_string(),
            kind: FieldKind::Choice,
            options: vec!["Jaipur".to_string(), "Remote".to_string()],
            required: false,
        },
    ]
}

pub(super) fn answers() -> BTreeMap<String, AnswerValue> {
    BTreeMap::from([
        (
            "Resume".to_string(),
            AnswerValue::FileReference("/uploads/resume-1042.pdf".to_string()),
        ),
        ("CGPA".to_string(), AnswerValue::Number(8.1)),
        (
            "Preferred location".to_string(),
            AnswerValue::Choice("Jaipur".to_string()),
        ),
    ])
}

pub(super) fn submission(user: u64, job: &Job) -> crate::workflows::placement::SubmissionRequest {
    crate::workflows::placement::SubmissionRequest {
        user_id: student_id(user),
        job_id: job.id.0.clone(),
        job_title: job.title.clone(),
        company_name: job.company.clone(),
        answers: answers(),
    }
}

use std::sync::Arc;

use serde::Serialize;
use tracing::warn;

use super::domain::{
    IdentifierError, Interview, Job, JobDraft, JobId, JobPatch, NotificationDraft,
    NotificationKind, StudentRecord, UserId,
};
use super::repository::{PlacementStore, RepositoryError, StudentDirectory};

/// Validation errors for job postings.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum JobDraftError {
    #[error("missing required field: {0}")]
    MissingField(&'static str),
    #[error("a posting needs at least one requirement")]
    EmptyRequirements,
}

/// Error raised by the catalog service.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error(transparent)]
    Validation(#[from] JobDraftError),
    #[error(transparent)]
    Identifier(#[from] IdentifierError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Counters for the admin dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DashboardStats {
    pub total_students: u64,
    pub total_jobs: u64,
    pub total_applications: u64,
}

/// Admin surface around the lifecycle: postings, the student directory, and
/// dashboard counters.
pub struct CatalogService<S, D> {
    store: Arc<S>,
    directory: Arc<D>,
}

fn required<'a>(value: &'a str, field: &'static str) -> Result<&'a str, JobDraftError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(JobDraftError::MissingField(field))
    } else {
        Ok(trimmed)
    }
}

impl<S, D> CatalogService<S, D>
where
    S: PlacementStore + 'static,
    D: StudentDirectory + 'static,
{
    pub fn new(store: Arc<S>, directory: Arc<D>) -> Self {
        Self { store, directory }
    }

    /// Create a posting. Every textual field is required; the description
    /// file stays an opaque reference string. A broadcast notification
    /// announces the opening to every student (the portal's in-model
    /// replacement for mailing the whole directory).
    pub fn post_job(&self, draft: JobDraft) -> Result<Job, CatalogError> {
        required(&draft.title, "title")?;
        required(&draft.company, "company")?;
        required(&draft.location, "location")?;
        required(&draft.package, "package")?;
        required(&draft.description, "description")?;
        required(&draft.department, "department")?;
        required(&draft.duration, "duration")?;
        if draft.requirements.iter().all(|req| req.trim().is_empty()) {
            return Err(JobDraftError::EmptyRequirements.into());
        }

        let job = self.store.insert_job(draft)?;

        let announcement = NotificationDraft {
            user_id: None,
            message: format!(
                "New opening: {} at {}. Apply before {}.",
                job.title, job.company, job.deadline
            ),
            link: None,
            attachment: job.description_file.clone(),
            kind: NotificationKind::General,
        };
        if let Err(err) = self.store.insert_notification(announcement) {
            warn!(job = job.id.as_str(), error = %err, "posting announcement not recorded");
        }

        Ok(job)
    }

    pub fn list_jobs(&self) -> Result<Vec<Job>, CatalogError> {
        Ok(self.store.list_jobs()?)
    }

    pub fn get_job(&self, job_id: &str) -> Result<Job, CatalogError> {
        let job_id = JobId::parse(job_id)?;
        self.store
            .fetch_job(&job_id)?
            .ok_or_else(|| RepositoryError::NotFound.into())
    }

    /// Partial update. Snapshot fields already copied onto applications and
    /// tracking records are deliberately left stale.
    pub fn edit_job(&self, job_id: &str, patch: JobPatch) -> Result<Job, CatalogError> {
        let job_id = JobId::parse(job_id)?;
        Ok(self.store.update_job(&job_id, patch)?)
    }

    pub fn delete_job(&self, job_id: &str) -> Result<(), CatalogError> {
        let job_id = JobId::parse(job_id)?;
        Ok(self.store.delete_job(&job_id)?)
    }

    pub fn scheduled_interviews(&self) -> Result<Vec<Interview>, CatalogError> {
        Ok(self.store.list_interviews()?)
    }

    pub fn list_students(&self) -> Result<Vec<StudentRecord>, CatalogError> {
        Ok(self.directory.list_students()?)
    }

    /// Flip the fee-paid flag (it gates apply eligibility on the client)
    /// and return the new value.
    pub fn toggle_fee_paid(&self, user_id: &str) -> Result<bool, CatalogError> {
        let user_id = UserId::parse(user_id)?;
        Ok(self.directory.toggle_fee_paid(&user_id)?)
    }

    pub fn dashboard_stats(&self) -> Result<DashboardStats, CatalogError> {
        Ok(DashboardStats {
            total_students: self.directory.count_students()?,
            total_jobs: self.store.count_jobs()?,
            total_applications: self.store.count_applications()?,
        })
    }
}

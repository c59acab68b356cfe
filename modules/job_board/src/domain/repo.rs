use crate::contract::model::{
    Application, ApplicationPatch, ApplicationWithJob, Company, CompanyPatch, Job, JobFilter,
    JobPatch, JobWithCompany, NewApplication, NewCompany, NewJob, NewUser, User, UserPatch,
};
use async_trait::async_trait;
use uuid::Uuid;

/// Stored account: the public user plus its password hash.
#[derive(Debug, Clone, PartialEq)]
pub struct UserAccount {
    pub user: User,
    pub password_hash: String,
}

/// Port for the domain layer: persistence operations the domain needs.
/// Object-safe and async-friendly via `async_trait`.
///
/// "Not found" is always `Ok(None)` (or `false`); the store itself never
/// raises domain errors. `create_*` assigns the id, the creation time and the
/// defaults. `update_*` shallow-merges the patch and returns the merged record.
#[async_trait]
pub trait JobBoardRepository: Send + Sync {
    async fn get_user(&self, id: Uuid) -> anyhow::Result<Option<UserAccount>>;
    /// Exact (case-sensitive) email lookup.
    async fn get_user_by_email(&self, email: &str) -> anyhow::Result<Option<UserAccount>>;
    /// `new.password` must already hold the hash.
    async fn create_user(&self, new: NewUser) -> anyhow::Result<UserAccount>;
    async fn update_user(&self, id: Uuid, patch: UserPatch)
        -> anyhow::Result<Option<UserAccount>>;

    async fn get_company(&self, id: Uuid) -> anyhow::Result<Option<Company>>;
    async fn get_companies_by_employer(&self, employer_id: Uuid) -> anyhow::Result<Vec<Company>>;
    async fn create_company(&self, employer_id: Uuid, new: NewCompany) -> anyhow::Result<Company>;
    async fn update_company(&self, id: Uuid, patch: CompanyPatch)
        -> anyhow::Result<Option<Company>>;

    async fn get_job(&self, id: Uuid) -> anyhow::Result<Option<Job>>;
    /// Absent when either the job or its company is missing.
    async fn get_job_with_company(&self, id: Uuid) -> anyhow::Result<Option<JobWithCompany>>;
    /// Active jobs matching `filter`, joined with their company, newest first.
    async fn get_jobs(&self, filter: &JobFilter) -> anyhow::Result<Vec<JobWithCompany>>;
    /// All of an employer's jobs (active or not), joined, newest first.
    async fn get_jobs_by_employer(&self, employer_id: Uuid)
        -> anyhow::Result<Vec<JobWithCompany>>;
    async fn create_job(&self, employer_id: Uuid, new: NewJob) -> anyhow::Result<Job>;
    async fn update_job(&self, id: Uuid, patch: JobPatch) -> anyhow::Result<Option<Job>>;
    /// Returns true if a job was removed.
    async fn delete_job(&self, id: Uuid) -> anyhow::Result<bool>;

    async fn get_application(&self, id: Uuid) -> anyhow::Result<Option<Application>>;
    async fn get_applications_by_applicant(
        &self,
        applicant_id: Uuid,
    ) -> anyhow::Result<Vec<ApplicationWithJob>>;
    /// Un-joined rows, newest first.
    async fn get_applications_by_job(&self, job_id: Uuid) -> anyhow::Result<Vec<Application>>;
    async fn get_applications_by_employer(
        &self,
        employer_id: Uuid,
    ) -> anyhow::Result<Vec<ApplicationWithJob>>;
    async fn create_application(&self, new: NewApplication) -> anyhow::Result<Application>;
    async fn update_application(
        &self,
        id: Uuid,
        patch: ApplicationPatch,
    ) -> anyhow::Result<Option<Application>>;
    async fn get_application_by_job_and_applicant(
        &self,
        job_id: Uuid,
        applicant_id: Uuid,
    ) -> anyhow::Result<Option<Application>>;
}

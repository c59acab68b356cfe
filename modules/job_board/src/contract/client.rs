use async_trait::async_trait;
use uuid::Uuid;

use crate::contract::{
    error::JobBoardError,
    model::{
        Application, ApplicationPatch, ApplicationWithJob, AuthSession, Company, CompanyPatch,
        Job, JobFilter, JobPatch, JobWithCompany, NewCompany, NewJob, NewUser, Principal, User,
        UserPatch,
    },
};

/// Public API trait for the job_board module that other modules can use.
///
/// Calls that act on behalf of a user take the [`Principal`] obtained from
/// [`JobBoardApi::authenticate`].
#[async_trait]
pub trait JobBoardApi: Send + Sync {
    /// Create an account and return it with a fresh token
    async fn register(&self, new_user: NewUser) -> Result<AuthSession, JobBoardError>;

    async fn login(&self, email: &str, password: &str) -> Result<AuthSession, JobBoardError>;

    /// Decode and verify a bearer token
    fn authenticate(&self, token: &str) -> Result<Principal, JobBoardError>;

    async fn current_user(&self, principal: &Principal) -> Result<User, JobBoardError>;

    async fn update_profile(
        &self,
        principal: &Principal,
        patch: UserPatch,
    ) -> Result<User, JobBoardError>;

    async fn create_company(
        &self,
        principal: &Principal,
        new_company: NewCompany,
    ) -> Result<Company, JobBoardError>;

    async fn update_company(
        &self,
        principal: &Principal,
        id: Uuid,
        patch: CompanyPatch,
    ) -> Result<Company, JobBoardError>;

    async fn list_my_companies(&self, principal: &Principal)
        -> Result<Vec<Company>, JobBoardError>;

    /// Active jobs matching `filter`, newest first
    async fn search_jobs(&self, filter: JobFilter) -> Result<Vec<JobWithCompany>, JobBoardError>;

    async fn get_job(&self, id: Uuid) -> Result<JobWithCompany, JobBoardError>;

    async fn create_job(&self, principal: &Principal, new_job: NewJob)
        -> Result<Job, JobBoardError>;

    async fn update_job(
        &self,
        principal: &Principal,
        id: Uuid,
        patch: JobPatch,
    ) -> Result<Job, JobBoardError>;

    async fn delete_job(&self, principal: &Principal, id: Uuid) -> Result<(), JobBoardError>;

    async fn list_employer_jobs(
        &self,
        principal: &Principal,
    ) -> Result<Vec<JobWithCompany>, JobBoardError>;

    async fn apply(
        &self,
        principal: &Principal,
        job_id: Uuid,
        cover_letter: Option<String>,
    ) -> Result<Application, JobBoardError>;

    async fn list_my_applications(
        &self,
        principal: &Principal,
    ) -> Result<Vec<ApplicationWithJob>, JobBoardError>;

    async fn list_employer_applications(
        &self,
        principal: &Principal,
    ) -> Result<Vec<ApplicationWithJob>, JobBoardError>;

    async fn list_job_applications(
        &self,
        principal: &Principal,
        job_id: Uuid,
    ) -> Result<Vec<Application>, JobBoardError>;

    async fn update_application(
        &self,
        principal: &Principal,
        id: Uuid,
        patch: ApplicationPatch,
    ) -> Result<Application, JobBoardError>;
}

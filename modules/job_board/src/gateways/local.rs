use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::contract::{
    client::JobBoardApi,
    error::JobBoardError,
    model::{
        Application, ApplicationPatch, ApplicationWithJob, AuthSession, Company, CompanyPatch,
        Job, JobFilter, JobPatch, JobWithCompany, NewCompany, NewJob, NewUser, Principal, User,
        UserPatch,
    },
};
use crate::domain::service::Service;

/// Local implementation of the JobBoardApi trait that delegates to the domain service
pub struct JobBoardLocalClient {
    service: Arc<Service>,
}

impl JobBoardLocalClient {
    pub fn new(service: Arc<Service>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl JobBoardApi for JobBoardLocalClient {
    async fn register(&self, new_user: NewUser) -> Result<AuthSession, JobBoardError> {
        self.service.register(new_user).await.map_err(Into::into)
    }

    async fn login(&self, email: &str, password: &str) -> Result<AuthSession, JobBoardError> {
        self.service.login(email, password).await.map_err(Into::into)
    }

    fn authenticate(&self, token: &str) -> Result<Principal, JobBoardError> {
        self.service.authenticate(token).map_err(Into::into)
    }

    async fn current_user(&self, principal: &Principal) -> Result<User, JobBoardError> {
        self.service.current_user(principal).await.map_err(Into::into)
    }

    async fn update_profile(
        &self,
        principal: &Principal,
        patch: UserPatch,
    ) -> Result<User, JobBoardError> {
        self.service
            .update_profile(principal, patch)
            .await
            .map_err(Into::into)
    }

    async fn create_company(
        &self,
        principal: &Principal,
        new_company: NewCompany,
    ) -> Result<Company, JobBoardError> {
        self.service
            .create_company(principal, new_company)
            .await
            .map_err(Into::into)
    }

    async fn update_company(
        &self,
        principal: &Principal,
        id: Uuid,
        patch: CompanyPatch,
    ) -> Result<Company, JobBoardError> {
        self.service
            .update_company(principal, id, patch)
            .await
            .map_err(Into::into)
    }

    async fn list_my_companies(
        &self,
        principal: &Principal,
    ) -> Result<Vec<Company>, JobBoardError> {
        self.service
            .list_my_companies(principal)
            .await
            .map_err(Into::into)
    }

    async fn search_jobs(&self, filter: JobFilter) -> Result<Vec<JobWithCompany>, JobBoardError> {
        self.service.search_jobs(filter).await.map_err(Into::into)
    }

    async fn get_job(&self, id: Uuid) -> Result<JobWithCompany, JobBoardError> {
        self.service.get_job(id).await.map_err(Into::into)
    }

    async fn create_job(
        &self,
        principal: &Principal,
        new_job: NewJob,
    ) -> Result<Job, JobBoardError> {
        self.service
            .create_job(principal, new_job)
            .await
            .map_err(Into::into)
    }

    async fn update_job(
        &self,
        principal: &Principal,
        id: Uuid,
        patch: JobPatch,
    ) -> Result<Job, JobBoardError> {
        self.service
            .update_job(principal, id, patch)
            .await
            .map_err(Into::into)
    }

    async fn delete_job(&self, principal: &Principal, id: Uuid) -> Result<(), JobBoardError> {
        self.service
            .delete_job(principal, id)
            .await
            .map_err(Into::into)
    }

    async fn list_employer_jobs(
        &self,
        principal: &Principal,
    ) -> Result<Vec<JobWithCompany>, JobBoardError> {
        self.service
            .list_employer_jobs(principal)
            .await
            .map_err(Into::into)
    }

    async fn apply(
        &self,
        principal: &Principal,
        job_id: Uuid,
        cover_letter: Option<String>,
    ) -> Result<Application, JobBoardError> {
        self.service
            .apply(principal, job_id, cover_letter)
            .await
            .map_err(Into::into)
    }

    async fn list_my_applications(
        &self,
        principal: &Principal,
    ) -> Result<Vec<ApplicationWithJob>, JobBoardError> {
        self.service
            .list_my_applications(principal)
            .await
            .map_err(Into::into)
    }

    async fn list_employer_applications(
        &self,
        principal: &Principal,
    ) -> Result<Vec<ApplicationWithJob>, JobBoardError> {
        self.service
            .list_employer_applications(principal)
            .await
            .map_err(Into::into)
    }

    async fn list_job_applications(
        &self,
        principal: &Principal,
        job_id: Uuid,
    ) -> Result<Vec<Application>, JobBoardError> {
        self.service
            .list_job_applications(principal, job_id)
            .await
            .map_err(Into::into)
    }

    async fn update_application(
        &self,
        principal: &Principal,
        id: Uuid,
        patch: ApplicationPatch,
    ) -> Result<Application, JobBoardError> {
        self.service
            .update_application(principal, id, patch)
            .await
            .map_err(Into::into)
    }
}

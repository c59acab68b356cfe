use std::time::Duration;

use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use crate::api::rest::dto::{
    ApplicationDto, ApplicationWithJobDto, ApplyReq, AuthResponse, CompanyDto, CreateCompanyReq,
    CreateJobReq, JobDto, JobSearchQuery, JobWithCompanyDto, LoginReq, RegisterReq,
    UpdateApplicationReq, UpdateCompanyReq, UpdateJobReq, UpdateProfileReq, UserDto,
};
use crate::contract::model::{
    Application, ApplicationPatch, ApplicationWithJob, AuthSession, Company, CompanyPatch, Job,
    JobFilter, JobPatch, JobWithCompany, NewCompany, NewJob, NewUser, User, UserPatch,
};
use crate::gateways::session::{FileSessionStore, Session};

#[derive(Debug, Error)]
pub enum RemoteError {
    /// Non-success answer; `message` comes from the server's error body.
    #[error("{message}")]
    Api { status: StatusCode, message: String },

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("not signed in")]
    NotAuthenticated,

    #[error("session store error: {0:#}")]
    Session(anyhow::Error),
}

impl RemoteError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            RemoteError::Api { status, .. } => Some(*status),
            RemoteError::Transport(e) => e.status(),
            RemoteError::NotAuthenticated | RemoteError::Session(_) => None,
        }
    }
}

#[derive(serde::Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// HTTP client for the job board API. Keeps the signed-in session in a
/// [`FileSessionStore`] and attaches its token to authenticated calls.
pub struct JobBoardHttpClient {
    http: reqwest::Client,
    base_url: String,
    session: FileSessionStore,
}

impl JobBoardHttpClient {
    pub fn new(
        base_url: impl Into<String>,
        session: FileSessionStore,
    ) -> Result<Self, RemoteError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            session,
        })
    }

    pub fn session(&self) -> &FileSessionStore {
        &self.session
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    // --- auth ---

    #[instrument(name = "job_board.client.login", skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthSession, RemoteError> {
        let body = LoginReq {
            email: email.to_string(),
            password: password.to_string(),
        };
        let resp: AuthResponse = self
            .send(self.request(Method::POST, "/api/auth/login").json(&body))
            .await?;
        self.remember(resp.into())
    }

    #[instrument(name = "job_board.client.register", skip_all, fields(email = %new_user.email))]
    pub async fn register(&self, new_user: NewUser) -> Result<AuthSession, RemoteError> {
        let body = RegisterReq::from(new_user);
        let resp: AuthResponse = self
            .send(self.request(Method::POST, "/api/auth/register").json(&body))
            .await?;
        self.remember(resp.into())
    }

    pub fn logout(&self) -> Result<(), RemoteError> {
        self.session.clear().map_err(RemoteError::Session)
    }

    /// Ask the server who the token belongs to. Any failure signs the client
    /// out and yields `None`.
    #[instrument(name = "job_board.client.current_user", skip(self))]
    pub async fn current_user(&self) -> Option<User> {
        self.session.token()?;

        let result = async {
            let dto: UserDto = self
                .send(self.authed(Method::GET, "/api/auth/me")?)
                .await?;
            Ok::<User, RemoteError>(dto.into())
        }
        .await;

        match result {
            Ok(user) => {
                if let Err(e) = self.session.update_user(user.clone()) {
                    warn!("Failed to persist refreshed user: {e:#}");
                }
                Some(user)
            }
            Err(e) => {
                debug!("Current user lookup failed, signing out: {e}");
                if let Err(e) = self.session.clear() {
                    warn!("Failed to clear session: {e:#}");
                }
                None
            }
        }
    }

    pub async fn update_profile(&self, patch: UserPatch) -> Result<User, RemoteError> {
        let body = UpdateProfileReq::from(patch);
        let dto: UserDto = self
            .send(self.authed(Method::PATCH, "/api/profile")?.json(&body))
            .await?;
        let user = User::from(dto);
        self.session
            .update_user(user.clone())
            .map_err(RemoteError::Session)?;
        Ok(user)
    }

    // --- jobs ---

    pub async fn search_jobs(
        &self,
        filter: &JobFilter,
    ) -> Result<Vec<JobWithCompany>, RemoteError> {
        let query = JobSearchQuery::from(filter);
        let rows: Vec<JobWithCompanyDto> = self
            .send(self.request(Method::GET, "/api/jobs").query(&query))
            .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    pub async fn get_job(&self, id: Uuid) -> Result<JobWithCompany, RemoteError> {
        let row: JobWithCompanyDto = self
            .send(self.request(Method::GET, &format!("/api/jobs/{id}")))
            .await?;
        Ok(row.into())
    }

    pub async fn create_job(&self, new_job: NewJob) -> Result<Job, RemoteError> {
        let body = CreateJobReq::from(new_job);
        let dto: JobDto = self
            .send(self.authed(Method::POST, "/api/jobs")?.json(&body))
            .await?;
        Ok(dto.into())
    }

    pub async fn update_job(&self, id: Uuid, patch: JobPatch) -> Result<Job, RemoteError> {
        let body = UpdateJobReq::from(patch);
        let dto: JobDto = self
            .send(self.authed(Method::PATCH, &format!("/api/jobs/{id}"))?.json(&body))
            .await?;
        Ok(dto.into())
    }

    pub async fn delete_job(&self, id: Uuid) -> Result<(), RemoteError> {
        self.send_empty(self.authed(Method::DELETE, &format!("/api/jobs/{id}"))?)
            .await
    }

    pub async fn employer_jobs(&self) -> Result<Vec<JobWithCompany>, RemoteError> {
        let rows: Vec<JobWithCompanyDto> = self
            .send(self.authed(Method::GET, "/api/employer/jobs")?)
            .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    // --- applications ---

    pub async fn apply(
        &self,
        job_id: Uuid,
        cover_letter: Option<String>,
    ) -> Result<Application, RemoteError> {
        let body = ApplyReq { cover_letter };
        let dto: ApplicationDto = self
            .send(
                self.authed(Method::POST, &format!("/api/jobs/{job_id}/apply"))?
                    .json(&body),
            )
            .await?;
        Ok(dto.into())
    }

    pub async fn my_applications(&self) -> Result<Vec<ApplicationWithJob>, RemoteError> {
        let rows: Vec<ApplicationWithJobDto> = self
            .send(self.authed(Method::GET, "/api/my-applications")?)
            .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    pub async fn employer_applications(&self) -> Result<Vec<ApplicationWithJob>, RemoteError> {
        let rows: Vec<ApplicationWithJobDto> = self
            .send(self.authed(Method::GET, "/api/employer/applications")?)
            .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    pub async fn job_applications(&self, job_id: Uuid) -> Result<Vec<Application>, RemoteError> {
        let rows: Vec<ApplicationDto> = self
            .send(self.authed(Method::GET, &format!("/api/jobs/{job_id}/applications"))?)
            .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    pub async fn update_application(
        &self,
        id: Uuid,
        patch: ApplicationPatch,
    ) -> Result<Application, RemoteError> {
        let body = UpdateApplicationReq::from(patch);
        let dto: ApplicationDto = self
            .send(
                self.authed(Method::PATCH, &format!("/api/applications/{id}"))?
                    .json(&body),
            )
            .await?;
        Ok(dto.into())
    }

    // --- companies ---

    pub async fn create_company(&self, new_company: NewCompany) -> Result<Company, RemoteError> {
        let body = CreateCompanyReq::from(new_company);
        let dto: CompanyDto = self
            .send(self.authed(Method::POST, "/api/companies")?.json(&body))
            .await?;
        Ok(dto.into())
    }

    pub async fn update_company(
        &self,
        id: Uuid,
        patch: CompanyPatch,
    ) -> Result<Company, RemoteError> {
        let body = UpdateCompanyReq::from(patch);
        let dto: CompanyDto = self
            .send(
                self.authed(Method::PATCH, &format!("/api/companies/{id}"))?
                    .json(&body),
            )
            .await?;
        Ok(dto.into())
    }

    pub async fn my_companies(&self) -> Result<Vec<Company>, RemoteError> {
        let rows: Vec<CompanyDto> = self
            .send(self.authed(Method::GET, "/api/my-companies")?)
            .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    // --- plumbing ---

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http.request(method, format!("{}{}", self.base_url, path))
    }

    fn authed(&self, method: Method, path: &str) -> Result<RequestBuilder, RemoteError> {
        let token = self.session.token().ok_or(RemoteError::NotAuthenticated)?;
        Ok(self.request(method, path).bearer_auth(token))
    }

    fn remember(&self, session: AuthSession) -> Result<AuthSession, RemoteError> {
        self.session
            .store(Session {
                user: session.user.clone(),
                token: session.token.clone(),
            })
            .map_err(RemoteError::Session)?;
        Ok(session)
    }

    async fn send<T: DeserializeOwned>(&self, req: RequestBuilder) -> Result<T, RemoteError> {
        let resp = check(req.send().await?).await?;
        Ok(resp.json::<T>().await?)
    }

    async fn send_empty(&self, req: RequestBuilder) -> Result<(), RemoteError> {
        check(req.send().await?).await?;
        Ok(())
    }
}

/// Turn non-success answers into [`RemoteError::Api`] using the `message`
/// field of the error body when there is one.
async fn check(resp: Response) -> Result<Response, RemoteError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let message = resp
        .json::<ErrorBody>()
        .await
        .ok()
        .and_then(|b| b.message)
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string()
        });
    Err(RemoteError::Api { status, message })
}

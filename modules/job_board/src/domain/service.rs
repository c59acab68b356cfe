use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;
use validator::ValidateEmail;

use crate::contract::model::{
    Application, ApplicationPatch, ApplicationWithJob, AuthSession, Company, CompanyPatch, Job,
    JobFilter, JobPatch, JobWithCompany, NewApplication, NewCompany, NewJob, NewUser, Principal,
    User, UserPatch,
};
use crate::domain::error::DomainError;
use crate::domain::ports::{CredentialHasher, TokenService};
use crate::domain::repo::JobBoardRepository;

/// Login only rejects passwords shorter than this, whatever the current
/// registration policy is.
const LOGIN_MIN_PASSWORD_LEN: usize = 6;

/// Domain service with the job board's business rules.
/// Depends only on ports, not on infra types.
pub struct Service {
    repo: Arc<dyn JobBoardRepository>,
    hasher: Arc<dyn CredentialHasher>,
    tokens: Arc<dyn TokenService>,
    config: ServiceConfig,
    // Serializes check-then-create sequences (email uniqueness, one application per job)
    unique_guard: Mutex<()>,
}

/// Configuration for the domain service
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub min_password_len: usize,
    pub enforce_company_ownership: bool,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            min_password_len: 6,
            enforce_company_ownership: true,
        }
    }
}

fn db(e: anyhow::Error) -> DomainError {
    DomainError::database(format!("{e:#}"))
}

impl Service {
    /// Create a service with dependencies.
    pub fn new(
        repo: Arc<dyn JobBoardRepository>,
        hasher: Arc<dyn CredentialHasher>,
        tokens: Arc<dyn TokenService>,
        config: ServiceConfig,
    ) -> Self {
        Self {
            repo,
            hasher,
            tokens,
            config,
            unique_guard: Mutex::new(()),
        }
    }

    // --- auth & profile ---

    #[instrument(
        name = "job_board.service.register",
        skip(self, new_user),
        fields(email = %new_user.email, user_type = %new_user.user_type)
    )]
    pub async fn register(&self, mut new_user: NewUser) -> Result<AuthSession, DomainError> {
        info!("Registering new user");

        self.validate_new_user(&new_user)?;

        new_user.password = self
            .hasher
            .hash(&new_user.password)
            .await
            .map_err(|e| DomainError::internal(format!("password hashing failed: {e}")))?;

        let account = {
            let _guard = self.unique_guard.lock().await;
            if self
                .repo
                .get_user_by_email(&new_user.email)
                .await
                .map_err(db)?
                .is_some()
            {
                return Err(DomainError::email_already_exists(new_user.email));
            }
            self.repo.create_user(new_user).await.map_err(db)?
        };

        let token = self.issue_token(&account.user)?;
        info!(user_id = %account.user.id, "Successfully registered user");
        Ok(AuthSession {
            user: account.user,
            token,
        })
    }

    #[instrument(name = "job_board.service.login", skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthSession, DomainError> {
        debug!("Login attempt");

        validate_email(email)?;
        validate_password(password, LOGIN_MIN_PASSWORD_LEN)?;

        let Some(account) = self.repo.get_user_by_email(email).await.map_err(db)? else {
            debug!("Unknown email");
            return Err(DomainError::InvalidCredentials);
        };

        let valid = self
            .hasher
            .verify(password, &account.password_hash)
            .await
            .map_err(|e| DomainError::internal(format!("password verification failed: {e}")))?;
        if !valid {
            debug!(user_id = %account.user.id, "Password mismatch");
            return Err(DomainError::InvalidCredentials);
        }

        let token = self.issue_token(&account.user)?;
        info!(user_id = %account.user.id, "User logged in");
        Ok(AuthSession {
            user: account.user,
            token,
        })
    }

    /// Verify a bearer token. The role is taken from the token as issued.
    pub fn authenticate(&self, token: &str) -> Result<Principal, DomainError> {
        if token.trim().is_empty() {
            return Err(DomainError::MissingToken);
        }
        self.tokens.verify(token).map_err(|e| {
            debug!("Token rejected: {e:#}");
            DomainError::InvalidToken
        })
    }

    #[instrument(name = "job_board.service.current_user", skip(self, principal), fields(user_id = %principal.user_id))]
    pub async fn current_user(&self, principal: &Principal) -> Result<User, DomainError> {
        debug!("Loading current user");
        self.repo
            .get_user(principal.user_id)
            .await
            .map_err(db)?
            .map(|account| account.user)
            .ok_or_else(|| DomainError::user_not_found(principal.user_id))
    }

    #[instrument(name = "job_board.service.update_profile", skip(self, principal, patch), fields(user_id = %principal.user_id))]
    pub async fn update_profile(
        &self,
        principal: &Principal,
        patch: UserPatch,
    ) -> Result<User, DomainError> {
        info!("Updating profile");

        let _guard = self.unique_guard.lock().await;

        let mut merged = self.current_user(principal).await?;
        let previous_email = merged.email.clone();
        patch.apply_to(&mut merged);
        self.validate_user(&merged)?;

        if merged.email != previous_email {
            if let Some(other) = self
                .repo
                .get_user_by_email(&merged.email)
                .await
                .map_err(db)?
            {
                if other.user.id != principal.user_id {
                    return Err(DomainError::email_already_exists(merged.email));
                }
            }
        }

        let account = self
            .repo
            .update_user(principal.user_id, patch)
            .await
            .map_err(db)?
            .ok_or_else(|| DomainError::user_not_found(principal.user_id))?;

        info!("Successfully updated profile");
        Ok(account.user)
    }

    // --- companies ---

    #[instrument(name = "job_board.service.create_company", skip(self, principal, new_company), fields(employer_id = %principal.user_id))]
    pub async fn create_company(
        &self,
        principal: &Principal,
        new_company: NewCompany,
    ) -> Result<Company, DomainError> {
        require_employer(principal, "Only employers can create companies")?;
        require_non_empty("name", &new_company.name)?;

        let company = self
            .repo
            .create_company(principal.user_id, new_company)
            .await
            .map_err(db)?;
        info!(company_id = %company.id, "Created company");
        Ok(company)
    }

    #[instrument(name = "job_board.service.update_company", skip(self, patch), fields(company_id = %id))]
    pub async fn update_company(
        &self,
        principal: &Principal,
        id: Uuid,
        patch: CompanyPatch,
    ) -> Result<Company, DomainError> {
        require_employer(principal, "Access denied")?;

        let mut merged = self
            .repo
            .get_company(id)
            .await
            .map_err(db)?
            .ok_or_else(|| DomainError::company_not_found(id))?;
        if merged.employer_id != principal.user_id {
            return Err(DomainError::forbidden("Access denied"));
        }

        patch.apply_to(&mut merged);
        require_non_empty("name", &merged.name)?;

        let company = self
            .repo
            .update_company(id, patch)
            .await
            .map_err(db)?
            .ok_or_else(|| DomainError::company_not_found(id))?;
        info!("Updated company");
        Ok(company)
    }

    #[instrument(name = "job_board.service.list_my_companies", skip(self, principal), fields(employer_id = %principal.user_id))]
    pub async fn list_my_companies(
        &self,
        principal: &Principal,
    ) -> Result<Vec<Company>, DomainError> {
        require_employer(principal, "Access denied")?;
        self.repo
            .get_companies_by_employer(principal.user_id)
            .await
            .map_err(db)
    }

    // --- jobs ---

    #[instrument(name = "job_board.service.search_jobs", skip(self))]
    pub async fn search_jobs(&self, filter: JobFilter) -> Result<Vec<JobWithCompany>, DomainError> {
        let jobs = self.repo.get_jobs(&filter).await.map_err(db)?;
        debug!("Search returned {} jobs", jobs.len());
        Ok(jobs)
    }

    #[instrument(name = "job_board.service.get_job", skip(self), fields(job_id = %id))]
    pub async fn get_job(&self, id: Uuid) -> Result<JobWithCompany, DomainError> {
        self.repo
            .get_job_with_company(id)
            .await
            .map_err(db)?
            .ok_or_else(|| DomainError::job_not_found(id))
    }

    #[instrument(
        name = "job_board.service.create_job",
        skip(self, principal, new_job),
        fields(employer_id = %principal.user_id, company_id = %new_job.company_id)
    )]
    pub async fn create_job(
        &self,
        principal: &Principal,
        new_job: NewJob,
    ) -> Result<Job, DomainError> {
        info!("Creating job");
        require_employer(principal, "Only employers can create jobs")?;

        require_non_empty("title", &new_job.title)?;
        require_non_empty("description", &new_job.description)?;
        require_non_empty("location", &new_job.location)?;
        validate_salary_range(new_job.min_salary, new_job.max_salary)?;

        if self.config.enforce_company_ownership {
            let company = self
                .repo
                .get_company(new_job.company_id)
                .await
                .map_err(db)?
                .ok_or_else(|| DomainError::company_not_found(new_job.company_id))?;
            if company.employer_id != principal.user_id {
                return Err(DomainError::forbidden("Company belongs to another employer"));
            }
        }

        let job = self
            .repo
            .create_job(principal.user_id, new_job)
            .await
            .map_err(db)?;
        info!(job_id = %job.id, "Created job");
        Ok(job)
    }

    #[instrument(name = "job_board.service.update_job", skip(self, patch), fields(job_id = %id))]
    pub async fn update_job(
        &self,
        principal: &Principal,
        id: Uuid,
        patch: JobPatch,
    ) -> Result<Job, DomainError> {
        info!("Updating job");
        let mut merged = self.owned_job(principal, id).await?;

        patch.apply_to(&mut merged);
        require_non_empty("title", &merged.title)?;
        require_non_empty("description", &merged.description)?;
        require_non_empty("location", &merged.location)?;
        validate_salary_range(merged.min_salary, merged.max_salary)?;

        let job = self
            .repo
            .update_job(id, patch)
            .await
            .map_err(db)?
            .ok_or_else(|| DomainError::job_not_found(id))?;
        info!(is_active = job.is_active, "Updated job");
        Ok(job)
    }

    #[instrument(name = "job_board.service.delete_job", skip(self), fields(job_id = %id))]
    pub async fn delete_job(&self, principal: &Principal, id: Uuid) -> Result<(), DomainError> {
        info!("Deleting job");
        self.owned_job(principal, id).await?;

        if !self.repo.delete_job(id).await.map_err(db)? {
            return Err(DomainError::job_not_found(id));
        }
        info!("Deleted job");
        Ok(())
    }

    #[instrument(name = "job_board.service.list_employer_jobs", skip(self, principal), fields(employer_id = %principal.user_id))]
    pub async fn list_employer_jobs(
        &self,
        principal: &Principal,
    ) -> Result<Vec<JobWithCompany>, DomainError> {
        require_employer(principal, "Access denied")?;
        self.repo
            .get_jobs_by_employer(principal.user_id)
            .await
            .map_err(db)
    }

    // --- applications ---

    #[instrument(
        name = "job_board.service.apply",
        skip(self, principal, cover_letter),
        fields(applicant_id = %principal.user_id)
    )]
    pub async fn apply(
        &self,
        principal: &Principal,
        job_id: Uuid,
        cover_letter: Option<String>,
    ) -> Result<Application, DomainError> {
        info!("Applying to job");
        if !principal.is_job_seeker() {
            return Err(DomainError::forbidden("Only job seekers can apply"));
        }

        let _guard = self.unique_guard.lock().await;

        let job = self
            .repo
            .get_job(job_id)
            .await
            .map_err(db)?
            .ok_or_else(|| DomainError::job_not_found(job_id))?;
        if !job.is_active {
            return Err(DomainError::job_closed(job_id));
        }

        if self
            .repo
            .get_application_by_job_and_applicant(job_id, principal.user_id)
            .await
            .map_err(db)?
            .is_some()
        {
            warn!("Duplicate application rejected");
            return Err(DomainError::already_applied(job_id));
        }

        let application = self
            .repo
            .create_application(NewApplication {
                job_id,
                applicant_id: principal.user_id,
                cover_letter,
            })
            .await
            .map_err(db)?;
        info!(application_id = %application.id, "Application submitted");
        Ok(application)
    }

    #[instrument(name = "job_board.service.list_my_applications", skip(self, principal), fields(applicant_id = %principal.user_id))]
    pub async fn list_my_applications(
        &self,
        principal: &Principal,
    ) -> Result<Vec<ApplicationWithJob>, DomainError> {
        if !principal.is_job_seeker() {
            return Err(DomainError::forbidden("Access denied"));
        }
        self.repo
            .get_applications_by_applicant(principal.user_id)
            .await
            .map_err(db)
    }

    #[instrument(name = "job_board.service.list_employer_applications", skip(self, principal), fields(employer_id = %principal.user_id))]
    pub async fn list_employer_applications(
        &self,
        principal: &Principal,
    ) -> Result<Vec<ApplicationWithJob>, DomainError> {
        require_employer(principal, "Access denied")?;
        self.repo
            .get_applications_by_employer(principal.user_id)
            .await
            .map_err(db)
    }

    #[instrument(name = "job_board.service.list_job_applications", skip(self, principal))]
    pub async fn list_job_applications(
        &self,
        principal: &Principal,
        job_id: Uuid,
    ) -> Result<Vec<Application>, DomainError> {
        self.owned_job(principal, job_id).await?;
        self.repo.get_applications_by_job(job_id).await.map_err(db)
    }

    /// The job's employer may change status and cover letter; the applicant
    /// only the cover letter.
    #[instrument(name = "job_board.service.update_application", skip(self, patch), fields(application_id = %id))]
    pub async fn update_application(
        &self,
        principal: &Principal,
        id: Uuid,
        patch: ApplicationPatch,
    ) -> Result<Application, DomainError> {
        info!("Updating application");

        let application = self
            .repo
            .get_application(id)
            .await
            .map_err(db)?
            .ok_or_else(|| DomainError::application_not_found(id))?;

        let is_owner = self
            .repo
            .get_job(application.job_id)
            .await
            .map_err(db)?
            .is_some_and(|job| job.employer_id == principal.user_id);
        let is_applicant = application.applicant_id == principal.user_id;

        if !is_owner && !is_applicant {
            return Err(DomainError::forbidden("Access denied"));
        }
        if patch.status.is_some() && !is_owner {
            return Err(DomainError::forbidden("Only the employer can change application status"));
        }

        let updated = self
            .repo
            .update_application(id, patch)
            .await
            .map_err(db)?
            .ok_or_else(|| DomainError::application_not_found(id))?;
        info!(status = %updated.status, "Updated application");
        Ok(updated)
    }

    // --- helpers ---

    fn issue_token(&self, user: &User) -> Result<String, DomainError> {
        self.tokens
            .issue(&Principal {
                user_id: user.id,
                user_type: user.user_type,
            })
            .map_err(|e| DomainError::internal(format!("token signing failed: {e}")))
    }

    /// Load a job and check that `principal` is the employer who posted it.
    async fn owned_job(&self, principal: &Principal, id: Uuid) -> Result<Job, DomainError> {
        require_employer(principal, "Access denied")?;
        let job = self
            .repo
            .get_job(id)
            .await
            .map_err(db)?
            .ok_or_else(|| DomainError::job_not_found(id))?;
        if job.employer_id != principal.user_id {
            return Err(DomainError::forbidden("Access denied"));
        }
        Ok(job)
    }

    fn validate_new_user(&self, new_user: &NewUser) -> Result<(), DomainError> {
        validate_email(&new_user.email)?;
        validate_password(&new_user.password, self.config.min_password_len)?;
        require_non_empty("firstName", &new_user.first_name)?;
        require_non_empty("lastName", &new_user.last_name)?;
        Ok(())
    }

    fn validate_user(&self, user: &User) -> Result<(), DomainError> {
        validate_email(&user.email)?;
        require_non_empty("firstName", &user.first_name)?;
        require_non_empty("lastName", &user.last_name)?;
        Ok(())
    }
}

fn require_employer(principal: &Principal, message: &str) -> Result<(), DomainError> {
    if principal.is_employer() {
        Ok(())
    } else {
        Err(DomainError::forbidden(message))
    }
}

fn require_non_empty(field: &str, value: &str) -> Result<(), DomainError> {
    if value.trim().is_empty() {
        return Err(DomainError::validation(field, "must not be empty"));
    }
    Ok(())
}

fn validate_email(email: &str) -> Result<(), DomainError> {
    if !email.validate_email() {
        return Err(DomainError::validation("email", "must be a valid email"));
    }
    Ok(())
}

fn validate_password(password: &str, min: usize) -> Result<(), DomainError> {
    if password.chars().count() < min {
        return Err(DomainError::validation(
            "password",
            format!("must be at least {min} characters"),
        ));
    }
    Ok(())
}

fn validate_salary_range(min: Option<u32>, max: Option<u32>) -> Result<(), DomainError> {
    if let (Some(min), Some(max)) = (min, max) {
        if min > max {
            return Err(DomainError::validation(
                "maxSalary",
                "must be greater than or equal to minSalary",
            ));
        }
    }
    Ok(())
}

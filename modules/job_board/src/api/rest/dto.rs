use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use api_ingress::AppError;

use crate::contract::model::{
    Application, ApplicationPatch, ApplicationStatus, ApplicationWithJob, AuthSession, Company,
    CompanyPatch, ExperienceLevel, Job, JobFilter, JobPatch, JobType, JobWithCompany, NewCompany,
    NewJob, NewUser, User, UserPatch, UserType,
};

// Wire mirrors of the contract enums. The contract stays free of serde.
macro_rules! dto_enum {
    ($dto:ident <=> $model:ident { $($variant:ident),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
        #[serde(rename_all = "snake_case")]
        pub enum $dto {
            $($variant),+
        }

        impl From<$model> for $dto {
            fn from(v: $model) -> Self {
                match v {
                    $($model::$variant => $dto::$variant),+
                }
            }
        }

        impl From<$dto> for $model {
            fn from(v: $dto) -> Self {
                match v {
                    $($dto::$variant => $model::$variant),+
                }
            }
        }
    };
}

dto_enum!(UserTypeDto <=> UserType { JobSeeker, Employer });
dto_enum!(JobTypeDto <=> JobType { FullTime, PartTime, Remote, Freelance });
dto_enum!(ExperienceLevelDto <=> ExperienceLevel { Entry, Junior, Mid, Senior });
dto_enum!(ApplicationStatusDto <=> ApplicationStatus {
    Pending,
    Reviewing,
    Interview,
    Accepted,
    Rejected,
});

// --- users & auth ---

/// REST DTO for user representation. Never carries the password.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserDto {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub user_type: UserTypeDto,
    pub resume_url: Option<String>,
    #[schema(value_type = Option<Object>)]
    pub profile_data: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthResponse {
    pub user: UserDto,
    pub token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterReq {
    #[validate(email(message = "must be a valid email"))]
    pub email: String,
    pub password: String,
    #[validate(length(min = 1, message = "must not be empty"))]
    pub first_name: String,
    #[validate(length(min = 1, message = "must not be empty"))]
    pub last_name: String,
    #[serde(default)]
    pub user_type: Option<UserTypeDto>,
    #[serde(default)]
    pub resume_url: Option<String>,
    #[serde(default)]
    #[schema(value_type = Option<Object>)]
    pub profile_data: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate)]
pub struct LoginReq {
    #[validate(email(message = "must be a valid email"))]
    pub email: String,
    pub password: String,
}

/// Profile update. Keys other than these (password, userType, ...) are ignored.
/// `null` clears `resumeUrl` and `profileData`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileReq {
    #[validate(email(message = "must be a valid email"))]
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub resume_url: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub profile_data: Option<Option<serde_json::Value>>,
}

// --- companies ---

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CompanyDto {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub industry: Option<String>,
    pub website: Option<String>,
    pub logo_url: Option<String>,
    pub employer_id: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate, Default)]
#[serde(rename_all = "camelCase")]
pub struct CreateCompanyReq {
    #[validate(length(min = 1, message = "must not be empty"))]
    pub name: String,
    pub description: Option<String>,
    pub industry: Option<String>,
    pub website: Option<String>,
    pub logo_url: Option<String>,
}

/// Company update. `null` clears any field except `name`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCompanyReq {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub industry: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub website: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub logo_url: Option<Option<String>>,
}

// --- jobs ---

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct JobDto {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub location: String,
    pub job_type: JobTypeDto,
    pub experience_level: ExperienceLevelDto,
    pub min_salary: Option<u32>,
    pub max_salary: Option<u32>,
    pub skills: Option<Vec<String>>,
    pub company_id: Uuid,
    pub employer_id: Uuid,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Job fields at the top level plus the owning company.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct JobWithCompanyDto {
    #[serde(flatten)]
    pub job: JobDto,
    pub company: CompanyDto,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateJobReq {
    #[validate(length(min = 1, message = "must not be empty"))]
    pub title: String,
    #[validate(length(min = 1, message = "must not be empty"))]
    pub description: String,
    #[validate(length(min = 1, message = "must not be empty"))]
    pub location: String,
    pub job_type: JobTypeDto,
    pub experience_level: ExperienceLevelDto,
    pub min_salary: Option<u32>,
    pub max_salary: Option<u32>,
    pub skills: Option<Vec<String>>,
    pub company_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateJobReq {
    pub title: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub job_type: Option<JobTypeDto>,
    pub experience_level: Option<ExperienceLevelDto>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<u32>)]
    pub min_salary: Option<Option<u32>>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<u32>)]
    pub max_salary: Option<Option<u32>>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Vec<String>>)]
    pub skills: Option<Option<Vec<String>>>,
    pub is_active: Option<bool>,
}

/// Search query for `GET /api/jobs`. Values arrive as raw strings; empty
/// strings count as absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct JobSearchQuery {
    /// Case-insensitive match on title or description
    pub search: Option<String>,
    /// Case-insensitive substring of the location
    pub location: Option<String>,
    /// One of full_time, part_time, remote, freelance
    pub job_type: Option<String>,
    /// One of entry, junior, mid, senior
    pub experience_level: Option<String>,
    /// Jobs whose minimum salary is at least this
    pub min_salary: Option<String>,
    /// Jobs whose maximum salary is at most this
    pub max_salary: Option<String>,
    /// Comma-separated; a job matches when any skill matches
    pub skills: Option<String>,
}

// --- applications ---

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationDto {
    pub id: Uuid,
    pub job_id: Uuid,
    pub applicant_id: Uuid,
    pub cover_letter: Option<String>,
    pub status: ApplicationStatusDto,
    pub applied_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApplicationWithJobDto {
    #[serde(flatten)]
    pub application: ApplicationDto,
    pub job: JobWithCompanyDto,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct ApplyReq {
    pub cover_letter: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateApplicationReq {
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub cover_letter: Option<Option<String>>,
    pub status: Option<ApplicationStatusDto>,
}

// Conversion implementations between REST DTOs and contract models

impl From<User> for UserDto {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            user_type: user.user_type.into(),
            resume_url: user.resume_url,
            profile_data: user.profile_data,
            created_at: user.created_at,
        }
    }
}

impl From<UserDto> for User {
    fn from(dto: UserDto) -> Self {
        Self {
            id: dto.id,
            email: dto.email,
            first_name: dto.first_name,
            last_name: dto.last_name,
            user_type: dto.user_type.into(),
            resume_url: dto.resume_url,
            profile_data: dto.profile_data,
            created_at: dto.created_at,
        }
    }
}

impl From<AuthSession> for AuthResponse {
    fn from(session: AuthSession) -> Self {
        Self {
            user: session.user.into(),
            token: session.token,
        }
    }
}

impl From<AuthResponse> for AuthSession {
    fn from(resp: AuthResponse) -> Self {
        Self {
            user: resp.user.into(),
            token: resp.token,
        }
    }
}

impl From<RegisterReq> for NewUser {
    fn from(req: RegisterReq) -> Self {
        Self {
            email: req.email,
            password: req.password,
            first_name: req.first_name,
            last_name: req.last_name,
            user_type: req.user_type.map(Into::into).unwrap_or_default(),
            resume_url: req.resume_url,
            profile_data: req.profile_data,
        }
    }
}

impl From<NewUser> for RegisterReq {
    fn from(new: NewUser) -> Self {
        Self {
            email: new.email,
            password: new.password,
            first_name: new.first_name,
            last_name: new.last_name,
            user_type: Some(new.user_type.into()),
            resume_url: new.resume_url,
            profile_data: new.profile_data,
        }
    }
}

impl From<UpdateProfileReq> for UserPatch {
    fn from(req: UpdateProfileReq) -> Self {
        Self {
            email: req.email,
            first_name: req.first_name,
            last_name: req.last_name,
            resume_url: req.resume_url,
            profile_data: req.profile_data,
        }
    }
}

impl From<UserPatch> for UpdateProfileReq {
    fn from(patch: UserPatch) -> Self {
        Self {
            email: patch.email,
            first_name: patch.first_name,
            last_name: patch.last_name,
            resume_url: patch.resume_url,
            profile_data: patch.profile_data,
        }
    }
}

impl From<Company> for CompanyDto {
    fn from(c: Company) -> Self {
        Self {
            id: c.id,
            name: c.name,
            description: c.description,
            industry: c.industry,
            website: c.website,
            logo_url: c.logo_url,
            employer_id: c.employer_id,
            created_at: c.created_at,
        }
    }
}

impl From<CompanyDto> for Company {
    fn from(dto: CompanyDto) -> Self {
        Self {
            id: dto.id,
            name: dto.name,
            description: dto.description,
            industry: dto.industry,
            website: dto.website,
            logo_url: dto.logo_url,
            employer_id: dto.employer_id,
            created_at: dto.created_at,
        }
    }
}

impl From<CreateCompanyReq> for NewCompany {
    fn from(req: CreateCompanyReq) -> Self {
        Self {
            name: req.name,
            description: req.description,
            industry: req.industry,
            website: req.website,
            logo_url: req.logo_url,
        }
    }
}

impl From<NewCompany> for CreateCompanyReq {
    fn from(new: NewCompany) -> Self {
        Self {
            name: new.name,
            description: new.description,
            industry: new.industry,
            website: new.website,
            logo_url: new.logo_url,
        }
    }
}

impl From<CompanyPatch> for UpdateCompanyReq {
    fn from(patch: CompanyPatch) -> Self {
        Self {
            name: patch.name,
            description: patch.description,
            industry: patch.industry,
            website: patch.website,
            logo_url: patch.logo_url,
        }
    }
}

impl From<UpdateCompanyReq> for CompanyPatch {
    fn from(req: UpdateCompanyReq) -> Self {
        Self {
            name: req.name,
            description: req.description,
            industry: req.industry,
            website: req.website,
            logo_url: req.logo_url,
        }
    }
}

impl From<JobPatch> for UpdateJobReq {
    fn from(patch: JobPatch) -> Self {
        Self {
            title: patch.title,
            description: patch.description,
            location: patch.location,
            job_type: patch.job_type.map(Into::into),
            experience_level: patch.experience_level.map(Into::into),
            min_salary: patch.min_salary,
            max_salary: patch.max_salary,
            skills: patch.skills,
            is_active: patch.is_active,
        }
    }
}

impl From<Job> for JobDto {
    fn from(job: Job) -> Self {
        Self {
            id: job.id,
            title: job.title,
            description: job.description,
            location: job.location,
            job_type: job.job_type.into(),
            experience_level: job.experience_level.into(),
            min_salary: job.min_salary,
            max_salary: job.max_salary,
            skills: job.skills,
            company_id: job.company_id,
            employer_id: job.employer_id,
            is_active: job.is_active,
            created_at: job.created_at,
        }
    }
}

impl From<JobDto> for Job {
    fn from(dto: JobDto) -> Self {
        Self {
            id: dto.id,
            title: dto.title,
            description: dto.description,
            location: dto.location,
            job_type: dto.job_type.into(),
            experience_level: dto.experience_level.into(),
            min_salary: dto.min_salary,
            max_salary: dto.max_salary,
            skills: dto.skills,
            company_id: dto.company_id,
            employer_id: dto.employer_id,
            is_active: dto.is_active,
            created_at: dto.created_at,
        }
    }
}

impl From<JobWithCompany> for JobWithCompanyDto {
    fn from(row: JobWithCompany) -> Self {
        Self {
            job: row.job.into(),
            company: row.company.into(),
        }
    }
}

impl From<JobWithCompanyDto> for JobWithCompany {
    fn from(dto: JobWithCompanyDto) -> Self {
        Self {
            job: dto.job.into(),
            company: dto.company.into(),
        }
    }
}

impl From<CreateJobReq> for NewJob {
    fn from(req: CreateJobReq) -> Self {
        Self {
            title: req.title,
            description: req.description,
            location: req.location,
            job_type: req.job_type.into(),
            experience_level: req.experience_level.into(),
            min_salary: req.min_salary,
            max_salary: req.max_salary,
            skills: req.skills,
            company_id: req.company_id,
        }
    }
}

impl From<NewJob> for CreateJobReq {
    fn from(new: NewJob) -> Self {
        Self {
            title: new.title,
            description: new.description,
            location: new.location,
            job_type: new.job_type.into(),
            experience_level: new.experience_level.into(),
            min_salary: new.min_salary,
            max_salary: new.max_salary,
            skills: new.skills,
            company_id: new.company_id,
        }
    }
}

impl From<UpdateJobReq> for JobPatch {
    fn from(req: UpdateJobReq) -> Self {
        Self {
            title: req.title,
            description: req.description,
            location: req.location,
            job_type: req.job_type.map(Into::into),
            experience_level: req.experience_level.map(Into::into),
            min_salary: req.min_salary,
            max_salary: req.max_salary,
            skills: req.skills,
            is_active: req.is_active,
        }
    }
}

impl From<Application> for ApplicationDto {
    fn from(app: Application) -> Self {
        Self {
            id: app.id,
            job_id: app.job_id,
            applicant_id: app.applicant_id,
            cover_letter: app.cover_letter,
            status: app.status.into(),
            applied_at: app.applied_at,
        }
    }
}

impl From<ApplicationDto> for Application {
    fn from(dto: ApplicationDto) -> Self {
        Self {
            id: dto.id,
            job_id: dto.job_id,
            applicant_id: dto.applicant_id,
            cover_letter: dto.cover_letter,
            status: dto.status.into(),
            applied_at: dto.applied_at,
        }
    }
}

impl From<ApplicationWithJob> for ApplicationWithJobDto {
    fn from(row: ApplicationWithJob) -> Self {
        Self {
            application: row.application.into(),
            job: row.job.into(),
        }
    }
}

impl From<ApplicationWithJobDto> for ApplicationWithJob {
    fn from(dto: ApplicationWithJobDto) -> Self {
        Self {
            application: dto.application.into(),
            job: dto.job.into(),
        }
    }
}

impl From<UpdateApplicationReq> for ApplicationPatch {
    fn from(req: UpdateApplicationReq) -> Self {
        Self {
            cover_letter: req.cover_letter,
            status: req.status.map(Into::into),
        }
    }
}

impl From<ApplicationPatch> for UpdateApplicationReq {
    fn from(patch: ApplicationPatch) -> Self {
        Self {
            cover_letter: patch.cover_letter,
            status: patch.status.map(Into::into),
        }
    }
}

/// Keeps an explicit `null` apart from a missing key: missing stays `None`
/// through `#[serde(default)]`, `null` becomes `Some(None)`.
fn nullable<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: serde::Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

fn present(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_salary(field: &str, value: Option<String>) -> Result<Option<u32>, AppError> {
    present(value)
        .map(|v| {
            v.parse::<u32>()
                .map_err(|_| AppError::invalid_field(field, "must be a non-negative integer"))
        })
        .transpose()
}

fn parse_enum<T>(field: &str, value: Option<String>) -> Result<Option<T>, AppError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    present(value)
        .map(|v| v.parse::<T>().map_err(|e| AppError::invalid_field(field, e.to_string())))
        .transpose()
}

impl TryFrom<JobSearchQuery> for JobFilter {
    type Error = AppError;

    fn try_from(q: JobSearchQuery) -> Result<Self, Self::Error> {
        Ok(Self {
            search: present(q.search),
            location: present(q.location),
            job_type: parse_enum("jobType", q.job_type)?,
            experience_level: parse_enum("experienceLevel", q.experience_level)?,
            min_salary: parse_salary("minSalary", q.min_salary)?,
            max_salary: parse_salary("maxSalary", q.max_salary)?,
            skills: q
                .skills
                .map(|s| {
                    s.split(',')
                        .map(str::trim)
                        .filter(|s| !s.is_empty())
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default(),
        })
    }
}

impl From<&JobFilter> for JobSearchQuery {
    fn from(f: &JobFilter) -> Self {
        Self {
            search: f.search.clone(),
            location: f.location.clone(),
            job_type: f.job_type.map(|t| t.as_str().to_string()),
            experience_level: f.experience_level.map(|l| l.as_str().to_string()),
            min_salary: f.min_salary.map(|v| v.to_string()),
            max_salary: f.max_salary.map(|v| v.to_string()),
            skills: (!f.skills.is_empty()).then(|| f.skills.join(",")),
        }
    }
}

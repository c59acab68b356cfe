use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, Query},
    http::StatusCode,
    Extension, Json,
};
use tracing::{debug, info};
use uuid::Uuid;

use api_ingress::AppError;

use crate::api::rest::dto::{
    ApplicationDto, ApplicationWithJobDto, ApplyReq, AuthResponse, CompanyDto, CreateCompanyReq,
    CreateJobReq, JobDto, JobSearchQuery, JobWithCompanyDto, LoginReq, RegisterReq,
    UpdateApplicationReq, UpdateCompanyReq, UpdateJobReq, UpdateProfileReq, UserDto,
};
use crate::api::rest::error::map_domain_error;
use crate::api::rest::extract::{parse_id, AuthUser, ValidatedJson};
use crate::contract::model::JobFilter;
use crate::domain::error::DomainError;
use crate::domain::service::Service;

type Svc = Extension<Arc<Service>>;

// --- auth & profile ---

/// Register a new account
#[utoipa::path(
    post,
    path = "/api/auth/register",
    tag = "auth",
    request_body = RegisterReq,
    responses(
        (status = 200, description = "Account created", body = AuthResponse),
        (status = 400, description = "Invalid input"),
        (status = 409, description = "User already exists"),
    )
)]
pub async fn register(
    Extension(svc): Svc,
    ValidatedJson(req): ValidatedJson<RegisterReq>,
) -> Result<Json<AuthResponse>, AppError> {
    info!("Registering user: {}", req.email);
    let session = svc.register(req.into()).await.map_err(map_domain_error)?;
    Ok(Json(session.into()))
}

/// Exchange credentials for a token
#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "auth",
    request_body = LoginReq,
    responses(
        (status = 200, description = "Logged in", body = AuthResponse),
        (status = 400, description = "Invalid input"),
        (status = 401, description = "Invalid credentials"),
    )
)]
pub async fn login(
    Extension(svc): Svc,
    ValidatedJson(req): ValidatedJson<LoginReq>,
) -> Result<Json<AuthResponse>, AppError> {
    let session = svc
        .login(&req.email, &req.password)
        .await
        .map_err(map_domain_error)?;
    Ok(Json(session.into()))
}

/// Current user
#[utoipa::path(
    get,
    path = "/api/auth/me",
    tag = "auth",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current user", body = UserDto),
        (status = 401, description = "Missing or invalid token"),
        (status = 404, description = "User not found"),
    )
)]
pub async fn me(
    Extension(svc): Svc,
    AuthUser(principal): AuthUser,
) -> Result<Json<UserDto>, AppError> {
    let user = svc
        .current_user(&principal)
        .await
        .map_err(map_domain_error)?;
    Ok(Json(user.into()))
}

/// Update the caller's profile
#[utoipa::path(
    patch,
    path = "/api/profile",
    tag = "auth",
    security(("bearer_auth" = [])),
    request_body = UpdateProfileReq,
    responses(
        (status = 200, description = "Updated user", body = UserDto),
        (status = 400, description = "Invalid input"),
        (status = 401, description = "Missing or invalid token"),
        (status = 409, description = "Email already in use"),
    )
)]
pub async fn update_profile(
    Extension(svc): Svc,
    AuthUser(principal): AuthUser,
    ValidatedJson(req): ValidatedJson<UpdateProfileReq>,
) -> Result<Json<UserDto>, AppError> {
    let user = svc
        .update_profile(&principal, req.into())
        .await
        .map_err(map_domain_error)?;
    Ok(Json(user.into()))
}

// --- jobs ---

/// Search active jobs, newest first
#[utoipa::path(
    get,
    path = "/api/jobs",
    tag = "jobs",
    params(JobSearchQuery),
    responses(
        (status = 200, description = "Matching jobs", body = [JobWithCompanyDto]),
        (status = 400, description = "Invalid filter value"),
    )
)]
pub async fn list_jobs(
    Extension(svc): Svc,
    Query(query): Query<JobSearchQuery>,
) -> Result<Json<Vec<JobWithCompanyDto>>, AppError> {
    debug!("Searching jobs with query: {:?}", query);
    let filter = JobFilter::try_from(query)?;
    let jobs = svc.search_jobs(filter).await.map_err(map_domain_error)?;
    Ok(Json(jobs.into_iter().map(Into::into).collect()))
}

/// Get a job with its company
#[utoipa::path(
    get,
    path = "/api/jobs/{id}",
    tag = "jobs",
    params(("id" = Uuid, Path, description = "Job id")),
    responses(
        (status = 200, description = "Job found", body = JobWithCompanyDto),
        (status = 404, description = "Job not found"),
    )
)]
pub async fn get_job(
    Extension(svc): Svc,
    Path(id): Path<String>,
) -> Result<Json<JobWithCompanyDto>, AppError> {
    let id = parse_id(&id, DomainError::job_not_found)?;
    let job = svc.get_job(id).await.map_err(map_domain_error)?;
    Ok(Json(job.into()))
}

/// Post a job
#[utoipa::path(
    post,
    path = "/api/jobs",
    tag = "jobs",
    security(("bearer_auth" = [])),
    request_body = CreateJobReq,
    responses(
        (status = 201, description = "Created job", body = JobDto),
        (status = 400, description = "Invalid input"),
        (status = 403, description = "Not an employer, or not the company owner"),
        (status = 404, description = "Company not found"),
    )
)]
pub async fn create_job(
    Extension(svc): Svc,
    AuthUser(principal): AuthUser,
    ValidatedJson(req): ValidatedJson<CreateJobReq>,
) -> Result<(StatusCode, Json<JobDto>), AppError> {
    info!("Creating job: {}", req.title);
    let job = svc
        .create_job(&principal, req.into())
        .await
        .map_err(map_domain_error)?;
    Ok((StatusCode::CREATED, Json(job.into())))
}

/// Update or deactivate an owned job
#[utoipa::path(
    patch,
    path = "/api/jobs/{id}",
    tag = "jobs",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Job id")),
    request_body = UpdateJobReq,
    responses(
        (status = 200, description = "Updated job", body = JobDto),
        (status = 400, description = "Invalid input"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Job not found"),
    )
)]
pub async fn update_job(
    Extension(svc): Svc,
    AuthUser(principal): AuthUser,
    Path(id): Path<String>,
    ValidatedJson(req): ValidatedJson<UpdateJobReq>,
) -> Result<Json<JobDto>, AppError> {
    let id = parse_id(&id, DomainError::job_not_found)?;
    let job = svc
        .update_job(&principal, id, req.into())
        .await
        .map_err(map_domain_error)?;
    Ok(Json(job.into()))
}

/// Delete an owned job
#[utoipa::path(
    delete,
    path = "/api/jobs/{id}",
    tag = "jobs",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Job id")),
    responses(
        (status = 204, description = "Job deleted"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Job not found"),
    )
)]
pub async fn delete_job(
    Extension(svc): Svc,
    AuthUser(principal): AuthUser,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let id = parse_id(&id, DomainError::job_not_found)?;
    info!("Deleting job: {}", id);
    svc.delete_job(&principal, id)
        .await
        .map_err(map_domain_error)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Jobs posted by the caller, including inactive ones
#[utoipa::path(
    get,
    path = "/api/employer/jobs",
    tag = "jobs",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Own jobs", body = [JobWithCompanyDto]),
        (status = 403, description = "Not an employer"),
    )
)]
pub async fn employer_jobs(
    Extension(svc): Svc,
    AuthUser(principal): AuthUser,
) -> Result<Json<Vec<JobWithCompanyDto>>, AppError> {
    let jobs = svc
        .list_employer_jobs(&principal)
        .await
        .map_err(map_domain_error)?;
    Ok(Json(jobs.into_iter().map(Into::into).collect()))
}

// --- applications ---

/// Apply to a job. The body is optional.
#[utoipa::path(
    post,
    path = "/api/jobs/{id}/apply",
    tag = "applications",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Job id")),
    request_body(content = ApplyReq, description = "Optional cover letter"),
    responses(
        (status = 201, description = "Application submitted", body = ApplicationDto),
        (status = 403, description = "Not a job seeker"),
        (status = 404, description = "Job not found"),
        (status = 409, description = "Already applied, or job closed"),
    )
)]
pub async fn apply(
    Extension(svc): Svc,
    AuthUser(principal): AuthUser,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<(StatusCode, Json<ApplicationDto>), AppError> {
    let job_id = parse_id(&id, DomainError::job_not_found)?;
    let req = if body.iter().all(u8::is_ascii_whitespace) {
        ApplyReq::default()
    } else {
        serde_json::from_slice::<ApplyReq>(&body)
            .map_err(|e| AppError::invalid_field("body", e.to_string()))?
    };

    let application = svc
        .apply(&principal, job_id, req.cover_letter)
        .await
        .map_err(map_domain_error)?;
    Ok((StatusCode::CREATED, Json(application.into())))
}

/// Applications submitted by the caller
#[utoipa::path(
    get,
    path = "/api/my-applications",
    tag = "applications",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Own applications", body = [ApplicationWithJobDto]),
        (status = 403, description = "Not a job seeker"),
    )
)]
pub async fn my_applications(
    Extension(svc): Svc,
    AuthUser(principal): AuthUser,
) -> Result<Json<Vec<ApplicationWithJobDto>>, AppError> {
    let apps = svc
        .list_my_applications(&principal)
        .await
        .map_err(map_domain_error)?;
    Ok(Json(apps.into_iter().map(Into::into).collect()))
}

/// Applications to any of the caller's jobs
#[utoipa::path(
    get,
    path = "/api/employer/applications",
    tag = "applications",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Applications received", body = [ApplicationWithJobDto]),
        (status = 403, description = "Not an employer"),
    )
)]
pub async fn employer_applications(
    Extension(svc): Svc,
    AuthUser(principal): AuthUser,
) -> Result<Json<Vec<ApplicationWithJobDto>>, AppError> {
    let apps = svc
        .list_employer_applications(&principal)
        .await
        .map_err(map_domain_error)?;
    Ok(Json(apps.into_iter().map(Into::into).collect()))
}

/// Applications to one owned job
#[utoipa::path(
    get,
    path = "/api/jobs/{id}/applications",
    tag = "applications",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Job id")),
    responses(
        (status = 200, description = "Applications", body = [ApplicationDto]),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Job not found"),
    )
)]
pub async fn job_applications(
    Extension(svc): Svc,
    AuthUser(principal): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Vec<ApplicationDto>>, AppError> {
    let job_id = parse_id(&id, DomainError::job_not_found)?;
    let apps = svc
        .list_job_applications(&principal, job_id)
        .await
        .map_err(map_domain_error)?;
    Ok(Json(apps.into_iter().map(Into::into).collect()))
}

/// Update an application
#[utoipa::path(
    patch,
    path = "/api/applications/{id}",
    tag = "applications",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Application id")),
    request_body = UpdateApplicationReq,
    responses(
        (status = 200, description = "Updated application", body = ApplicationDto),
        (status = 403, description = "Neither job owner nor applicant"),
        (status = 404, description = "Application not found"),
    )
)]
pub async fn update_application(
    Extension(svc): Svc,
    AuthUser(principal): AuthUser,
    Path(id): Path<String>,
    ValidatedJson(req): ValidatedJson<UpdateApplicationReq>,
) -> Result<Json<ApplicationDto>, AppError> {
    let id = parse_id(&id, DomainError::application_not_found)?;
    let app = svc
        .update_application(&principal, id, req.into())
        .await
        .map_err(map_domain_error)?;
    Ok(Json(app.into()))
}

// --- companies ---

/// Create a company owned by the caller
#[utoipa::path(
    post,
    path = "/api/companies",
    tag = "companies",
    security(("bearer_auth" = [])),
    request_body = CreateCompanyReq,
    responses(
        (status = 201, description = "Created company", body = CompanyDto),
        (status = 400, description = "Invalid input"),
        (status = 403, description = "Not an employer"),
    )
)]
pub async fn create_company(
    Extension(svc): Svc,
    AuthUser(principal): AuthUser,
    ValidatedJson(req): ValidatedJson<CreateCompanyReq>,
) -> Result<(StatusCode, Json<CompanyDto>), AppError> {
    info!("Creating company: {}", req.name);
    let company = svc
        .create_company(&principal, req.into())
        .await
        .map_err(map_domain_error)?;
    Ok((StatusCode::CREATED, Json(company.into())))
}

/// Update an owned company
#[utoipa::path(
    patch,
    path = "/api/companies/{id}",
    tag = "companies",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Company id")),
    request_body = UpdateCompanyReq,
    responses(
        (status = 200, description = "Updated company", body = CompanyDto),
        (status = 400, description = "Invalid input"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Company not found"),
    )
)]
pub async fn update_company(
    Extension(svc): Svc,
    AuthUser(principal): AuthUser,
    Path(id): Path<String>,
    ValidatedJson(req): ValidatedJson<UpdateCompanyReq>,
) -> Result<Json<CompanyDto>, AppError> {
    let id: Uuid = parse_id(&id, DomainError::company_not_found)?;
    let company = svc
        .update_company(&principal, id, req.into())
        .await
        .map_err(map_domain_error)?;
    Ok(Json(company.into()))
}

/// Companies owned by the caller
#[utoipa::path(
    get,
    path = "/api/my-companies",
    tag = "companies",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Own companies", body = [CompanyDto]),
        (status = 403, description = "Not an employer"),
    )
)]
pub async fn my_companies(
    Extension(svc): Svc,
    AuthUser(principal): AuthUser,
) -> Result<Json<Vec<CompanyDto>>, AppError> {
    let companies = svc
        .list_my_companies(&principal)
        .await
        .map_err(map_domain_error)?;
    Ok(Json(companies.into_iter().map(Into::into).collect()))
}

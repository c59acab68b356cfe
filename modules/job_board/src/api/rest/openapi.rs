use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::api::rest::{dto, handlers};

/// OpenAPI fragment for the job board routes
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::register,
        handlers::login,
        handlers::me,
        handlers::update_profile,
        handlers::list_jobs,
        handlers::get_job,
        handlers::create_job,
        handlers::update_job,
        handlers::delete_job,
        handlers::employer_jobs,
        handlers::apply,
        handlers::my_applications,
        handlers::employer_applications,
        handlers::job_applications,
        handlers::update_application,
        handlers::create_company,
        handlers::update_company,
        handlers::my_companies,
    ),
    components(schemas(
        dto::UserTypeDto,
        dto::JobTypeDto,
        dto::ExperienceLevelDto,
        dto::ApplicationStatusDto,
        dto::UserDto,
        dto::AuthResponse,
        dto::RegisterReq,
        dto::LoginReq,
        dto::UpdateProfileReq,
        dto::CompanyDto,
        dto::CreateCompanyReq,
        dto::UpdateCompanyReq,
        dto::JobDto,
        dto::JobWithCompanyDto,
        dto::CreateJobReq,
        dto::UpdateJobReq,
        dto::ApplicationDto,
        dto::ApplicationWithJobDto,
        dto::ApplyReq,
        dto::UpdateApplicationReq,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "auth", description = "Registration, login and profile"),
        (name = "jobs", description = "Job postings and search"),
        (name = "applications", description = "Job applications"),
        (name = "companies", description = "Employer companies"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

use std::sync::Arc;

use axum::{
    routing::{get, patch, post},
    Extension, Router,
};

use crate::api::rest::handlers;
use crate::domain::service::Service;

/// Mount the job board routes on `router`. The service reaches handlers and
/// the auth extractor through a request extension.
pub fn register_routes(router: Router, service: Arc<Service>) -> anyhow::Result<Router> {
    let routes = Router::new()
        // auth & profile
        .route("/api/auth/register", post(handlers::register))
        .route("/api/auth/login", post(handlers::login))
        .route("/api/auth/me", get(handlers::me))
        .route("/api/profile", patch(handlers::update_profile))
        // jobs
        .route("/api/jobs", get(handlers::list_jobs).post(handlers::create_job))
        .route(
            "/api/jobs/{id}",
            get(handlers::get_job)
                .patch(handlers::update_job)
                .delete(handlers::delete_job),
        )
        .route("/api/jobs/{id}/apply", post(handlers::apply))
        .route(
            "/api/jobs/{id}/applications",
            get(handlers::job_applications),
        )
        .route("/api/employer/jobs", get(handlers::employer_jobs))
        // applications
        .route("/api/my-applications", get(handlers::my_applications))
        .route(
            "/api/employer/applications",
            get(handlers::employer_applications),
        )
        .route("/api/applications/{id}", patch(handlers::update_application))
        // companies
        .route("/api/companies", post(handlers::create_company))
        .route("/api/companies/{id}", patch(handlers::update_company))
        .route("/api/my-companies", get(handlers::my_companies))
        .layer(Extension(service));

    Ok(router.merge(routes))
}

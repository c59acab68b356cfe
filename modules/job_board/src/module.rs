use std::sync::Arc;

use api_ingress::RestfulModule;
use tracing::{debug, info, warn};
use utoipa::OpenApi;

use crate::api::rest::{openapi::ApiDoc, routes};
use crate::config::JobBoardConfig;
use crate::contract::client::JobBoardApi;
use crate::domain::repo::JobBoardRepository;
use crate::domain::service::{Service, ServiceConfig};
use crate::gateways::local::JobBoardLocalClient;
use crate::infra::auth::{Argon2Hasher, JwtTokens};
use crate::infra::storage::InMemoryRepository;

/// The job board module: wires storage and credential adapters to the domain
/// service and exposes it over REST and as an in-process client.
#[derive(Clone)]
pub struct JobBoard {
    service: Arc<Service>,
}

impl JobBoard {
    /// Build the module with a fresh in-memory store.
    pub fn from_config(cfg: &JobBoardConfig) -> anyhow::Result<Self> {
        Self::with_repository(cfg, Arc::new(InMemoryRepository::new()))
    }

    pub fn with_repository(
        cfg: &JobBoardConfig,
        repo: Arc<dyn JobBoardRepository>,
    ) -> anyhow::Result<Self> {
        info!("Initializing job_board module");
        debug!(
            "Loaded job_board config: token_ttl_secs={}, min_password_len={}, enforce_company_ownership={}",
            cfg.token_ttl_secs, cfg.min_password_len, cfg.enforce_company_ownership
        );
        if cfg.uses_default_secret() {
            warn!("job_board.jwt_secret is not set; tokens are signed with the built-in development secret");
        }

        let hasher = Argon2Hasher::new(&cfg.password_hash)?;
        let tokens = JwtTokens::new(&cfg.jwt_secret, cfg.token_ttl_secs)?;
        let service_config = ServiceConfig {
            min_password_len: cfg.min_password_len,
            enforce_company_ownership: cfg.enforce_company_ownership,
        };
        let service = Service::new(repo, Arc::new(hasher), Arc::new(tokens), service_config);

        Ok(Self {
            service: Arc::new(service),
        })
    }

    pub fn service(&self) -> Arc<Service> {
        self.service.clone()
    }

    /// In-process client for other modules
    pub fn client(&self) -> Arc<dyn JobBoardApi> {
        Arc::new(JobBoardLocalClient::new(self.service.clone()))
    }
}

impl RestfulModule for JobBoard {
    fn name(&self) -> &'static str {
        "job_board"
    }

    fn register_rest(&self, router: axum::Router) -> anyhow::Result<axum::Router> {
        info!("Registering job_board REST routes");
        let router = routes::register_routes(router, self.service.clone())?;
        info!("Job board REST routes registered successfully");
        Ok(router)
    }

    fn openapi(&self) -> Option<utoipa::openapi::OpenApi> {
        Some(ApiDoc::openapi())
    }
}

//! HTTP host. Collects REST modules into one axum router behind the shared
//! middleware stack, publishes the merged OpenAPI document and serves until
//! cancelled.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use axum::{http::header, middleware::from_fn, response::IntoResponse, routing::get, Json, Router};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::{
    cors::CorsLayer,
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
};
use utoipa::openapi::{Info, OpenApi, OpenApiBuilder};

mod config;
pub mod error;
pub mod request_id;
mod web;

pub use config::ApiIngressConfig;
pub use error::{AppError, FieldError};

/// A module that contributes routes (and optionally an OpenAPI fragment) to
/// the host router.
pub trait RestfulModule: Send + Sync {
    fn name(&self) -> &'static str;

    fn register_rest(&self, router: Router) -> Result<Router>;

    fn openapi(&self) -> Option<OpenApi> {
        None
    }
}

/// Owns the HTTP server and the set of registered REST modules.
#[derive(Default)]
pub struct ApiIngress {
    config: ApiIngressConfig,
    modules: Vec<Arc<dyn RestfulModule>>,
}

impl ApiIngress {
    pub fn new(config: ApiIngressConfig) -> Self {
        Self {
            config,
            modules: Vec::new(),
        }
    }

    pub fn with_module(mut self, module: Arc<dyn RestfulModule>) -> Self {
        self.modules.push(module);
        self
    }

    /// Base document with every module's fragment merged in.
    pub fn build_openapi(&self) -> OpenApi {
        let mut info = Info::new("Job Board API", env!("CARGO_PKG_VERSION"));
        info.description = Some("Job board server REST API".to_string());
        let mut doc = OpenApiBuilder::new().info(info).build();

        for module in &self.modules {
            if let Some(fragment) = module.openapi() {
                doc.merge(fragment);
            }
        }

        tracing::info!(paths = doc.paths.paths.len(), "Built OpenAPI document");
        doc
    }

    /// Build the HTTP router from registered modules.
    pub fn build_router(&self) -> Result<Router> {
        let mut router = Router::new().route("/health", get(web::health_check));

        let mut seen = HashSet::new();
        for module in &self.modules {
            if !seen.insert(module.name()) {
                bail!("REST module '{}' registered twice", module.name());
            }
            router = module
                .register_rest(router)
                .with_context(|| format!("registering routes of '{}'", module.name()))?;
            tracing::debug!(module = module.name(), "Registered REST module");
        }

        if self.config.enable_docs {
            // Serialized once, served as static JSON
            let doc = Arc::new(serde_json::to_value(self.build_openapi())?);
            router = router
                .route(
                    "/openapi.json",
                    get(move || {
                        let v = doc.clone();
                        async move {
                            ([(header::CACHE_CONTROL, "no-store")], Json((*v).clone()))
                                .into_response()
                        }
                    }),
                )
                .route("/docs", get(web::serve_docs));
        }

        router = router.fallback(web::not_found);

        // Last layer added runs first. Request order: SetRequestId, PropagateRequestId,
        // Trace, request id extension, Timeout, CORS, BodyLimit.
        router = router.layer(RequestBodyLimitLayer::new(self.config.body_limit_bytes));

        if self.config.cors_enabled {
            router = router.layer(CorsLayer::permissive());
        }

        router = router.layer(TimeoutLayer::new(Duration::from_secs(
            self.config.request_timeout_secs,
        )));

        router = router.layer(from_fn(request_id::push_req_id_to_extensions));
        router = router.layer(request_id::create_trace_layer());

        let x_request_id = request_id::header();
        router = router.layer(PropagateRequestIdLayer::new(x_request_id.clone()));
        router = router.layer(SetRequestIdLayer::new(x_request_id, request_id::MakeReqId));

        Ok(router)
    }

    /// Serve on an already bound listener until `cancel` fires.
    pub async fn serve_on(&self, listener: TcpListener, cancel: CancellationToken) -> Result<()> {
        let router = self.build_router()?;
        let addr = listener.local_addr()?;
        tracing::info!("HTTP server bound on {}", addr);

        let shutdown = async move {
            cancel.cancelled().await;
            tracing::info!("HTTP server shutting down gracefully (cancellation)");
        };

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| anyhow::anyhow!(e))
    }
}

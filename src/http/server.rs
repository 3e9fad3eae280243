//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum Router with the loader route and SPA fallback
//! - Stack the gate stages in order: assets → headers → filters
//! - Wire up transport middleware (request ID, tracing, CORS, compression,
//!   timeout, body limit)
//! - Serve on a listener with graceful shutdown

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    http::HeaderValue,
    middleware,
    routing::get,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    services::ServeFile,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::validation::validate_config;
use crate::config::{ConfigError, GateConfig};
use crate::http::assets::{static_assets_middleware, StaticAssets};
use crate::http::handlers::{frontend_loader, not_found, spa_fallback};
use crate::http::request::{make_span, MakeRequestUuidV4, X_REQUEST_ID};
use crate::lifecycle::shutdown::wait_for;
use crate::security::{gate_middleware, security_headers_middleware, Gate, SecurityHeaders};

/// Application state injected into handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    pub index: ServeFile,
    pub index_cache_control: Option<HeaderValue>,
    pub loader_no_store: bool,
}

/// HTTP server for the edge gate.
#[derive(Debug)]
pub struct HttpServer {
    router: Router,
    config: Arc<GateConfig>,
}

impl HttpServer {
    /// Validate `config` and build the request pipeline.
    pub fn new(config: GateConfig) -> Result<Self, ConfigError> {
        validate_config(&config).map_err(ConfigError::Validation)?;
        let router = Self::build_router(&config)?;
        Ok(Self {
            router,
            config: Arc::new(config),
        })
    }

    /// Build the Axum router with all middleware layers.
    /// The last layer added is the first to see a request.
    #[allow(deprecated)]
    fn build_router(config: &GateConfig) -> Result<Router, ConfigError> {
        let state = AppState {
            index: ServeFile::new(Path::new(&config.assets.public_root).join(&config.assets.index_file)),
            index_cache_control: config
                .assets
                .index_cache_control
                .as_deref()
                .map(HeaderValue::from_str)
                .transpose()?,
            loader_no_store: config.loader.no_store,
        };

        let gate = Arc::new(Gate::from_config(config)?);
        let headers = Arc::new(SecurityHeaders::from_config(&config.headers)?);
        let assets = Arc::new(StaticAssets::from_config(&config.assets)?);

        let mut router = Router::new()
            .route(&config.loader.path, get(frontend_loader).fallback(not_found))
            .fallback(spa_fallback)
            .with_state(state)
            .layer(middleware::from_fn_with_state(gate, gate_middleware))
            .layer(middleware::from_fn_with_state(headers, security_headers_middleware))
            .layer(middleware::from_fn_with_state(assets, static_assets_middleware))
            .layer(RequestBodyLimitLayer::new(config.http.max_body_bytes))
            .layer(TimeoutLayer::new(Duration::from_secs(config.http.request_timeout_secs)));

        if config.http.compression {
            router = router.layer(CompressionLayer::new());
        }
        if config.http.cors_any_origin {
            router = router.layer(
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods(Any)
                    .allow_headers(Any),
            );
        }

        Ok(router
            .layer(PropagateRequestIdLayer::new(X_REQUEST_ID))
            .layer(TraceLayer::new_for_http().make_span_with(make_span))
            .layer(SetRequestIdLayer::new(X_REQUEST_ID, MakeRequestUuidV4)))
    }

    /// The fully layered router, for in-process use.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &GateConfig {
        &self.config
    }

    /// Run the server until `shutdown` fires, then drain in-flight requests.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            public_root = %self.config.assets.public_root,
            allowed_origin = %self.config.origin.allowed_origin,
            geo_enabled = self.config.geo.enabled,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(wait_for(shutdown))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Router, middleware,
    routing::{get, post},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use pacientes_db_memory::InMemoryStore;
use pacientes_storage::PacienteStore;

use crate::{
    config::AppConfig, handlers, handlers::AppState, middleware as app_middleware,
    service::PacienteService, uploads::FileIntake,
};

pub struct PacientesServer {
    addr: SocketAddr,
    app: Router,
}

/// Builds the application router over a fresh in-memory store.
pub fn build_app(cfg: &AppConfig) -> Router {
    build_app_with_store(cfg, Arc::new(InMemoryStore::new()))
}

/// Builds the application router over an explicitly constructed store
/// handle. The upload intake is constructed here as well; no ambient state.
pub fn build_app_with_store(cfg: &AppConfig, store: Arc<dyn PacienteStore>) -> Router {
    let state = AppState {
        service: PacienteService::new(store),
        intake: FileIntake::new(&cfg.uploads.dir, cfg.uploads.max_file_bytes),
    };

    Router::new()
        // Health and info endpoints
        .route("/", get(handlers::root))
        .route("/healthz", get(handlers::healthz))
        // Record CRUD and search
        .route(
            "/pacientes",
            get(handlers::list_pacientes).post(handlers::create_paciente),
        )
        .route("/pacientes/search", get(handlers::search_pacientes))
        .route(
            "/pacientes/{id}",
            get(handlers::get_paciente)
                .put(handlers::update_paciente)
                .delete(handlers::delete_paciente),
        )
        // Photo upload and retrieval
        .route("/pacientes/{id}/photo", post(handlers::attach_foto))
        .route("/photos/{filename}", get(handlers::get_foto))
        // Middleware stack (order: request id -> cors -> trace -> body limit)
        .layer(middleware::from_fn(app_middleware::request_id))
        .layer(CorsLayer::permissive())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    let method = req.method().clone();
                    let uri = req.uri().clone();
                    let req_id = req
                        .extensions()
                        .get::<axum::http::HeaderValue>()
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or("")
                        .to_string();
                    tracing::info_span!(
                        "http.request",
                        http.method = %method,
                        http.target = %uri,
                        request_id = %req_id
                    )
                })
                .on_response(
                    |res: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     _span: &tracing::Span| {
                        tracing::info!(
                            http.status = %res.status().as_u16(),
                            elapsed_ms = %latency.as_millis(),
                            "request handled"
                        );
                    },
                ),
        )
        .layer(axum::extract::DefaultBodyLimit::max(
            cfg.server.body_limit_bytes,
        ))
        .with_state(state)
}

pub struct ServerBuilder {
    addr: SocketAddr,
    config: AppConfig,
}

impl ServerBuilder {
    pub fn new() -> Self {
        let cfg = AppConfig::default();
        Self {
            addr: cfg.addr(),
            config: cfg,
        }
    }

    pub fn with_addr(mut self, addr: SocketAddr) -> Self {
        self.addr = addr;
        self
    }

    pub fn with_config(mut self, cfg: AppConfig) -> Self {
        self.addr = cfg.addr();
        self.config = cfg;
        self
    }

    pub fn build(self) -> PacientesServer {
        let app = build_app(&self.config);

        PacientesServer {
            addr: self.addr,
            app,
        }
    }
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PacientesServer {
    pub async fn run(self) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(self.addr).await?;
        tracing::info!("listening on {}", self.addr);
        axum::serve(listener, self.app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;
        Ok(())
    }
}

async fn shutdown_signal() {
    // Wait for Ctrl+C
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("shutdown signal received");
}

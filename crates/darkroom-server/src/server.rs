use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::extract::DefaultBodyLimit;
use axum::http::HeaderValue;
use axum::routing::{get, post};
use axum::Router;
use darkroom_core::decode::DecodeOptions;
use darkroom_core::PixelBackend;
use tokio::sync::oneshot;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::ServerConfig;
use crate::http;
use crate::registry::SessionRegistry;
use crate::ws;

/// Shared application state passed to Axum handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub registry: Arc<SessionRegistry>,
    pub backend: Arc<PixelBackend>,
    pub started: Instant,
}

impl AppState {
    pub fn new(config: ServerConfig) -> Self {
        let mut backend = PixelBackend::new(DecodeOptions {
            auto_orient: config.auto_orient,
        });
        backend.interpolation = config.rotate_interpolation;
        Self {
            registry: Arc::new(SessionRegistry::new(config.send_queue_capacity)),
            backend: Arc::new(backend),
            config: Arc::new(config),
            started: Instant::now(),
        }
    }
}

/// Build the Axum router with all routes.
pub fn build_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.cors_origins);
    let body_limit = DefaultBodyLimit::max(state.config.max_body_bytes);

    let image_routes = Router::new()
        .route("/upload", post(http::upload))
        .route("/crop", post(http::crop))
        .route("/rotate", post(http::rotate))
        .route("/flip", post(http::flip))
        .route("/apply-filters", post(http::filters))
        .route("/resize", post(http::resize))
        .route("/convert", post(http::convert))
        .route("/equalize", post(http::equalize))
        .route("/stretch", post(http::stretch))
        .route("/threshold", post(http::threshold))
        .route("/blur", post(http::blur))
        .route("/edges", post(http::edges))
        .route("/histogram", post(http::histogram));

    Router::new()
        .route("/", get(http::root))
        .route("/health", get(http::health))
        .route("/ws", get(ws::ws_handler))
        .nest("/api/image", image_routes)
        .with_state(state)
        .layer(body_limit)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

/// Allow the configured origins with credentials. Methods and headers are
/// mirrored from the preflight since wildcards cannot be combined with
/// credentials.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "invalid CORS origin, ignoring");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}

/// Bind and start serving. Returns a handle to shut it down.
pub async fn start(config: ServerConfig) -> Result<ServerHandle, std::io::Error> {
    let listener = tokio::net::TcpListener::bind((config.host.as_str(), config.port)).await?;
    let state = AppState::new(config);
    let registry = Arc::clone(&state.registry);
    let router = build_router(state);

    let local_addr = listener.local_addr()?;

    tracing::info!(addr = %local_addr, "darkroom server started");

    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
    let server = tokio::spawn(async move {
        let result = axum::serve(listener, router)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
            })
            .await;
        if let Err(err) = result {
            tracing::error!(error = %err, "server stopped with error");
        }
    });

    Ok(ServerHandle {
        addr: local_addr,
        registry,
        shutdown: Some(shutdown_tx),
        server,
    })
}

/// Handle returned by `start()`: keeps the server task alive.
pub struct ServerHandle {
    pub addr: SocketAddr,
    pub registry: Arc<SessionRegistry>,
    shutdown: Option<oneshot::Sender<()>>,
    server: tokio::task::JoinHandle<()>,
}

impl ServerHandle {
    pub fn port(&self) -> u16 {
        self.addr.port()
    }

    /// Stop accepting connections and wait for in-flight requests.
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        let _ = (&mut self.server).await;
        tracing::info!("darkroom server stopped");
    }
}

//! HTTP host for browser-delivered pointer input.
//!
//! A page forwards its pointer-move samples to this server, which runs them
//! through a single lock controller and reports the resulting lock state.
//!
//! # Architecture
//!
//! ```text
//! Browser page ──→ POST /pointer ──→ LockController ──→ lock state
//!      ↑                                   │
//!      └──────── GET /lock, POST /unlock ──┘
//! ```

use crate::core::{LockController, LockEvent, LockState, ShakeDetectorConfig};
use crate::stats::{create_shared_log, ActivityStats, SharedActivityLog};
use axum::{
    extract::State,
    http::{HeaderValue, StatusCode},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::RwLock;
use tower_http::cors::{Any, CorsLayer};

/// Largest sample batch accepted in one request.
const MAX_BATCH: usize = 4096;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Port to bind to (0 for random)
    pub port: u16,
    /// Detector tuning for the hosted controller
    pub detector: ShakeDetectorConfig,
    /// Whether shake-to-lock starts armed
    pub shake_enabled: bool,
}

impl ServerConfig {
    pub fn new(port: u16, detector: ShakeDetectorConfig, shake_enabled: bool) -> Self {
        Self {
            port,
            detector,
            shake_enabled,
        }
    }
}

/// Shared server state
pub struct ServerState {
    /// The one controller all requests go through
    controller: RwLock<LockController>,
    activity: SharedActivityLog,
}

impl ServerState {
    pub fn new(config: &ServerConfig) -> anyhow::Result<Self> {
        let activity = create_shared_log();
        let controller = LockController::new(config.detector, config.shake_enabled)?
            .with_activity_log(activity.clone());

        Ok(Self {
            controller: RwLock::new(controller),
            activity,
        })
    }
}

/// One pointer sample from the page
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SampleInput {
    pub x: f64,
    pub timestamp_ms: f64,
}

/// POST /pointer body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PointerBatch {
    pub samples: Vec<SampleInput>,
}

/// POST /pointer response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PointerResponse {
    pub state: LockState,
    pub events: Vec<LockEvent>,
}

/// POST /lock and POST /unlock response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransitionResponse {
    pub state: LockState,
    pub transitioned: bool,
}

/// GET /lock response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LockStatusResponse {
    pub state: LockState,
    pub shake_enabled: bool,
}

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Error response
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

/// GET /health
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// POST /pointer
///
/// Feeds a batch of samples in order. Events produced by the batch are
/// returned alongside the resulting state.
async fn pointer(
    State(state): State<Arc<ServerState>>,
    Json(batch): Json<PointerBatch>,
) -> Result<Json<PointerResponse>, (StatusCode, Json<ErrorResponse>)> {
    if batch.samples.len() > MAX_BATCH {
        return Err((
            StatusCode::PAYLOAD_TOO_LARGE,
            Json(ErrorResponse {
                error: format!("At most {MAX_BATCH} samples per request"),
                code: "BATCH_TOO_LARGE".to_string(),
            }),
        ));
    }

    let mut controller = state.controller.write().await;
    let events: Vec<LockEvent> = batch
        .samples
        .iter()
        .filter_map(|s| controller.pointer_moved(s.x, s.timestamp_ms))
        .collect();

    Ok(Json(PointerResponse {
        state: controller.current_state(),
        events,
    }))
}

/// POST /lock
async fn lock(State(state): State<Arc<ServerState>>) -> Json<TransitionResponse> {
    let mut controller = state.controller.write().await;
    let transitioned = controller.lock_now().is_some();
    Json(TransitionResponse {
        state: controller.current_state(),
        transitioned,
    })
}

/// POST /unlock
async fn unlock(State(state): State<Arc<ServerState>>) -> Json<TransitionResponse> {
    let mut controller = state.controller.write().await;
    let transitioned = controller.unlock_input().is_some();
    Json(TransitionResponse {
        state: controller.current_state(),
        transitioned,
    })
}

/// GET /lock
async fn lock_status(State(state): State<Arc<ServerState>>) -> Json<LockStatusResponse> {
    let controller = state.controller.read().await;
    Json(LockStatusResponse {
        state: controller.current_state(),
        shake_enabled: controller.shake_enabled(),
    })
}

/// GET /stats
async fn stats(State(state): State<Arc<ServerState>>) -> Json<ActivityStats> {
    Json(state.activity.stats())
}

/// GET /quote
#[cfg(feature = "quote")]
async fn quote() -> Json<crate::quote::Quote> {
    let quote = match crate::quote::HitokotoClient::new() {
        Ok(client) => client.fetch_or_fallback().await,
        Err(e) => {
            tracing::warn!("Quote client unavailable: {}", e);
            crate::quote::Quote::fallback()
        }
    };
    Json(quote)
}

/// Build the router around existing state.
pub fn router(state: Arc<ServerState>) -> Router {
    let router = Router::new()
        .route("/health", get(health))
        .route("/pointer", post(pointer))
        .route("/lock", get(lock_status).post(lock))
        .route("/unlock", post(unlock))
        .route("/stats", get(stats));

    #[cfg(feature = "quote")]
    let router = router.route("/quote", get(quote));

    router
        .layer(
            CorsLayer::new()
                .allow_origin([
                    HeaderValue::from_static("http://localhost"),
                    HeaderValue::from_static("http://127.0.0.1"),
                ])
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

/// Run the HTTP server
pub async fn run(
    config: ServerConfig,
) -> anyhow::Result<(SocketAddr, tokio::sync::oneshot::Sender<()>)> {
    let state = Arc::new(ServerState::new(&config)?);
    let app = router(state);

    let addr = SocketAddr::from(([127, 0, 0, 1], config.port));
    let listener = TcpListener::bind(addr).await?;
    let actual_addr = listener.local_addr()?;

    tracing::info!("shakelock server listening on http://{}", actual_addr);

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
                tracing::info!("Server shutdown signal received");
            })
            .await
        {
            tracing::error!("Server error: {}", e);
        }
    });

    Ok((actual_addr, shutdown_tx))
}

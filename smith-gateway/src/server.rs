use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use smith_core::{Answer, ErrorKind, Question, User};
use tracing::{info, warn};

use crate::state::AppState;

/// Question from the web agent
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AskRequest {
    #[serde(default)]
    pub session_id: Option<String>,
    pub question: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AskResponse {
    pub session_id: String,
    pub answers: Vec<Answer>,
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub base: String,
}

/// Error response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub session_id: String,
    pub error: String,
    pub kind: ErrorKind,
}

/// Run the HTTP server
pub async fn run(state: Arc<AppState>, bind_addr: String) -> std::io::Result<()> {
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!("Web agent listening on {}", bind_addr);

    axum::serve(listener, app).await?;
    info!("Web agent stopped");
    Ok(())
}

/// Create the router with all routes
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/agentsmith", post(ask_handler))
        .with_state(state)
        .layer(tower_http::trace::TraceLayer::new_for_http())
}

async fn health_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        base: state.registry.current_base_name(),
    })
}

fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::Validation => StatusCode::BAD_REQUEST,
        ErrorKind::Lookup => StatusCode::NOT_FOUND,
        ErrorKind::Vector => StatusCode::UNPROCESSABLE_ENTITY,
        ErrorKind::ExternalService => StatusCode::BAD_GATEWAY,
        ErrorKind::Persistence => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// POST /agentsmith
async fn ask_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<AskRequest>,
) -> impl IntoResponse {
    let session_id = request
        .session_id
        .filter(|id| !id.trim().is_empty())
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
    let user = User::new(session_id.clone(), "WebUser", "WebUser");

    match state.ask(&user, &Question::new(request.question)).await {
        Ok(answers) => (
            StatusCode::OK,
            Json(AskResponse {
                session_id,
                answers,
            }),
        )
            .into_response(),
        Err(err) => {
            warn!(session = %session_id, error = %err, "web question failed");
            let kind = err.kind();
            (
                status_for(kind),
                Json(ErrorResponse {
                    session_id,
                    error: err.to_string(),
                    kind,
                }),
            )
                .into_response()
        }
    }
}

use axum::{
    Json, Router,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use cutlist::Error;
use cutlist::api::{self, OptimizeRequest, OptimizeResponse};
use serde_json::json;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

enum ApiError {
    Solver(Error),
    Internal(String),
}

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        ApiError::Solver(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            ApiError::Solver(e) => {
                let (status, code) = match e {
                    Error::InvalidInput(_) => (StatusCode::BAD_REQUEST, "INVALID_INPUT"),
                    Error::NoFeasiblePlacement { .. } => {
                        (StatusCode::UNPROCESSABLE_ENTITY, "NO_FEASIBLE_PLACEMENT")
                    }
                };
                tracing::warn!(code, "{e}");
                (status, code, e.to_string())
            }
            ApiError::Internal(msg) => {
                tracing::error!("internal error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));
        (status, body).into_response()
    }
}

async fn optimize(Json(req): Json<OptimizeRequest>) -> Result<Json<OptimizeResponse>, ApiError> {
    tracing::info!(
        body = serde_json::to_string(&req).unwrap_or_default(),
        "POST /optimize"
    );

    // The search is CPU-bound for up to its time limit.
    let response = tokio::task::spawn_blocking(move || api::optimize(req))
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))??;

    tracing::info!(
        status = ?response.status,
        sheets = response.sheets.len(),
        exhaustive = response.exhaustive,
        elapsed_ms = response.elapsed_ms,
        "optimized"
    );
    Ok(Json(response))
}

#[tokio::main]
async fn main() {
    let log_path = std::env::var("LOG_FILE").unwrap_or_else(|_| "development.log".to_string());
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .unwrap_or_else(|e| panic!("failed to open {log_path}: {e}"));

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_target(false)
        .with_ansi(false)
        .with_max_level(Level::INFO)
        .init();

    // DSN is read from SENTRY_DSN; without it the client stays disabled.
    let _sentry = sentry::init(sentry::ClientOptions {
        release: sentry::release_name!(),
        ..Default::default()
    });

    let port = std::env::var("PORT").unwrap_or_else(|_| "3001".to_string());
    let addr = format!("0.0.0.0:{port}");

    let app = Router::new()
        .route("/up", get(|| async { "ok" }))
        .route("/optimize", post(optimize))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        );

    let listener = tokio::net::TcpListener::bind(&addr).await.unwrap();
    eprintln!("Listening on {addr}");
    tracing::info!("listening on {addr}");
    axum::serve(listener, app).await.unwrap();
}

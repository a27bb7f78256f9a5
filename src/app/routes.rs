use axum::Router;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use serde::Deserialize;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::app::model::{ArticlePreview, QuizRecord};
use crate::app::service::QuizService;
use crate::error::QuizError;

pub fn router(service: QuizService) -> Router {
    Router::new()
        .route("/healthz", get(|| async { "ok\n" }))
        .route("/preview", get(preview_handler))
        .route("/generate", post(generate_handler))
        .route("/history", get(history_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(service)
}

#[derive(Debug, Deserialize)]
struct UrlQuery {
    /// Absent is reported as an invalid url rather than a query rejection.
    #[serde(default)]
    url: String,
}

async fn preview_handler(
    State(service): State<QuizService>,
    Query(q): Query<UrlQuery>,
) -> Result<Json<ArticlePreview>, ApiError> {
    Ok(Json(service.preview(&q.url).await?))
}

async fn generate_handler(
    State(service): State<QuizService>,
    Query(q): Query<UrlQuery>,
) -> Result<Json<QuizRecord>, ApiError> {
    Ok(Json(service.generate(&q.url).await?))
}

async fn history_handler(
    State(service): State<QuizService>,
) -> Result<Json<Vec<QuizRecord>>, ApiError> {
    Ok(Json(service.history().await?))
}

struct ApiError(QuizError);

impl From<QuizError> for ApiError {
    fn from(err: QuizError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            QuizError::InvalidUrl { .. } => StatusCode::BAD_REQUEST,
            err if err.is_upstream() => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            tracing::error!(err = %self.0, "request failed");
        }
        let body = serde_json::json!({ "error": self.0.to_string() });
        (status, Json(body)).into_response()
    }
}

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::state::AppState;

/// GET / - service description
pub async fn root() -> Json<Value> {
    Json(json!({
        "name": "Places API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "users": "/api/users, /api/users/signup, /api/users/login",
            "places": "/api/places/:pid, /api/places/user/:uid (public reads)",
            "protected": "POST /api/places, PATCH|DELETE /api/places/:pid (Bearer token)",
            "images": "/uploads/images/*"
        }
    }))
}

/// GET /health - 503 when the database is unreachable
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.users.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "timestamp": now,
                "database": "ok"
            })),
        )
            .into_response(),
        Err(e) => {
            tracing::warn!("Health check failed: {}", e);
            ApiError::service_unavailable("Database unavailable").into_response()
        }
    }
}

/// Fallback for unknown routes
pub async fn not_found() -> ApiError {
    ApiError::not_found("Could not find this route.")
}

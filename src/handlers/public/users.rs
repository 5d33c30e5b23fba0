use axum::{
    extract::{multipart::MultipartRejection, rejection::JsonRejection, Multipart, State},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::handlers::UploadForm;
use crate::middleware::{reject_with_upload, ApiResponse, ApiResult};
use crate::services::{AuthSession, Login, Signup};
use crate::state::AppState;

/// GET /api/users
pub async fn list_users(State(state): State<AppState>) -> ApiResult<Value> {
    let users = state.users.list_all().await?;

    Ok(ApiResponse::success(json!({ "users": users })))
}

/// POST /api/users/signup - multipart form with name, email, password and image
pub async fn signup(State(state): State<AppState>, multipart: Result<Multipart, MultipartRejection>) -> Response {
    let multipart = match multipart {
        Ok(multipart) => multipart,
        Err(rejection) => return ApiError::from(rejection).into_response(),
    };

    let mut form = match UploadForm::read(multipart, &state.images).await {
        Ok(form) => form,
        Err(response) => return response,
    };

    let input = Signup {
        name: form.take("name"),
        email: form.take("email"),
        password: form.take("password"),
    };
    let image = form.image.clone();

    match state.users.signup(input, form.image).await {
        Ok(session) => ApiResponse::created(session).into_response(),
        Err(e) => reject_with_upload(e, image.as_deref()),
    }
}

/// POST /api/users/login
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<Login>, JsonRejection>,
) -> ApiResult<AuthSession> {
    let Json(input) = payload?;
    let session = state.users.login(input).await?;

    Ok(ApiResponse::success(session))
}

use axum::{
    extract::{multipart::MultipartRejection, rejection::JsonRejection, Multipart, Path, State},
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::handlers::{parse_id, UploadForm};
use crate::middleware::{reject_with_upload, ApiResponse, ApiResult, AuthUser};
use crate::services::{NewPlace, PlaceUpdate};
use crate::state::AppState;

/// POST /api/places - multipart form with title, description, address and image
pub async fn create_place(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Response {
    let multipart = match multipart {
        Ok(multipart) => multipart,
        Err(rejection) => return ApiError::from(rejection).into_response(),
    };

    let mut form = match UploadForm::read(multipart, &state.images).await {
        Ok(form) => form,
        Err(response) => return response,
    };

    let input = NewPlace {
        title: form.take("title"),
        description: form.take("description"),
        address: form.take("address"),
    };
    let image = form.image.clone();

    match state.places.create(input, form.image, user.user_id).await {
        Ok(place) => ApiResponse::created(json!({ "place": place })).into_response(),
        Err(e) => reject_with_upload(e, image.as_deref()),
    }
}

/// PATCH /api/places/:pid - title and description only
pub async fn update_place(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(pid): Path<String>,
    payload: Result<Json<PlaceUpdate>, JsonRejection>,
) -> ApiResult<Value> {
    let Json(input) = payload?;
    let id = parse_id(&pid, "Could not find a place for the provided id.")?;

    let place = state.places.update(id, input, user.user_id).await?;

    Ok(ApiResponse::success(json!({ "place": place })))
}

/// DELETE /api/places/:pid
pub async fn delete_place(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(pid): Path<String>,
) -> ApiResult<Value> {
    let id = parse_id(&pid, "Could not find place for this id.")?;

    state.places.delete(id, user.user_id).await?;

    Ok(ApiResponse::success(json!({ "message": "Deleted place." })))
}

use axum::extract::{Path, State};
use serde_json::{json, Value};

use crate::handlers::parse_id;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

/// GET /api/places/:pid
pub async fn get_place(State(state): State<AppState>, Path(pid): Path<String>) -> ApiResult<Value> {
    let id = parse_id(&pid, "Could not find a place for the provided id.")?;
    let place = state.places.get_by_id(id).await?;

    Ok(ApiResponse::success(json!({ "place": place })))
}

/// GET /api/places/user/:uid - 404 when the user has no places
pub async fn list_user_places(State(state): State<AppState>, Path(uid): Path<String>) -> ApiResult<Value> {
    let user_id = parse_id(&uid, "Could not find a place for the provided user.")?;
    let places = state.places.list_by_user(user_id).await?;

    Ok(ApiResponse::success(json!({ "places": places })))
}

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::error::ApiError;
use crate::state::AppState;

/// Path of an image stored while handling the request. Handlers attach it to
/// error responses so the upload does not outlive a failed request.
#[derive(Clone, Debug)]
pub struct UploadedFile(pub String);

/// Builds an error response that carries the stored upload, if any.
pub fn reject_with_upload(err: impl Into<ApiError>, upload: Option<&str>) -> Response {
    let mut response = err.into().into_response();
    if let Some(path) = upload {
        response.extensions_mut().insert(UploadedFile(path.to_string()));
    }
    response
}

/// Deletes the uploaded file of any request that did not succeed.
pub async fn discard_failed_uploads(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let response = next.run(request).await;

    if !response.status().is_success() {
        if let Some(UploadedFile(path)) = response.extensions().get::<UploadedFile>() {
            tracing::debug!("Discarding upload {} of failed request ({})", path, response.status());
            state.images.remove(path).await;
        }
    }

    response
}

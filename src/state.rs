//! Shared application state, injected into handlers via the `State` extractor.

use std::sync::Arc;

use crate::auth::Credentials;
use crate::services::{PlaceService, UserService};
use crate::storage::ImageStore;

/// Clone is required by Axum; every field is Arc-wrapped.
#[derive(Clone)]
pub struct AppState {
    pub places: Arc<PlaceService>,
    pub users: Arc<UserService>,
    pub credentials: Arc<Credentials>,
    pub images: Arc<ImageStore>,
}

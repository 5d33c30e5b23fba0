pub mod auth;
pub mod config;
pub mod database;
pub mod error;
pub mod geocoding;
pub mod handlers;
pub mod middleware;
pub mod server;
pub mod services;
pub mod state;
pub mod storage;

#[cfg(test)]
pub mod testing;

use std::sync::Arc;

use sqlx::PgPool;

use crate::auth::{AuthError, Credentials};
use crate::config::AppConfig;
use crate::database::{PgPlaceRepository, PgUserRepository};
use crate::geocoding::Geocoder;
use crate::services::{PlaceService, UserService};
use crate::state::AppState;
use crate::storage::ImageStore;

/// Wires the Postgres repositories and the given geocoder into the shared state.
pub fn build_state(config: &AppConfig, pool: PgPool, geocoder: Arc<dyn Geocoder>) -> Result<AppState, AuthError> {
    let credentials = Arc::new(Credentials::new(&config.security)?);
    let images = Arc::new(ImageStore::new(&config.uploads));

    let users = Arc::new(PgUserRepository::new(pool.clone()));
    let places = Arc::new(PgPlaceRepository::new(pool));

    Ok(AppState {
        places: Arc::new(PlaceService::new(places, users.clone(), geocoder, images.clone())),
        users: Arc::new(UserService::new(users, credentials.clone())),
        credentials,
        images,
    })
}

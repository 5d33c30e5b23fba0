//! Router assembly: routes, auth gate and global middleware.

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderName, HeaderValue, Method},
    middleware::from_fn_with_state,
    routing::{get, patch, post},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

use crate::config::ServerConfig;
use crate::handlers::{protected, public, system};
use crate::middleware::{discard_failed_uploads, jwt_auth_middleware};
use crate::state::AppState;

pub fn app(state: AppState, config: &ServerConfig) -> Router {
    let api = Router::new()
        .merge(user_routes())
        .merge(public_place_routes())
        .merge(protected_place_routes(state.clone()))
        .layer(from_fn_with_state(state.clone(), discard_failed_uploads));

    Router::new()
        .route("/", get(system::root))
        .route("/health", get(system::health))
        .merge(api)
        .nest_service("/uploads/images", ServeDir::new(state.images.dir()))
        .fallback(system::not_found)
        .layer(DefaultBodyLimit::max(config.max_request_size_bytes))
        .layer(cors_layer(&config.cors_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/api/users", get(public::list_users))
        .route("/api/users/signup", post(public::signup))
        .route("/api/users/login", post(public::login))
}

fn public_place_routes() -> Router<AppState> {
    Router::new()
        .route("/api/places/user/:uid", get(public::list_user_places))
        .route("/api/places/:pid", get(public::get_place))
}

// Same paths as the public reads, merged per method
fn protected_place_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/api/places", post(protected::create_place))
        .route(
            "/api/places/:pid",
            patch(protected::update_place).delete(protected::delete_place),
        )
        .route_layer(from_fn_with_state(state, jwt_auth_middleware))
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
        .allow_headers([
            header::ORIGIN,
            HeaderName::from_static("x-requested-with"),
            header::CONTENT_TYPE,
            header::ACCEPT,
            header::AUTHORIZATION,
        ]);

    if origins.is_empty() || origins.iter().any(|o| o == "*") {
        return layer.allow_origin(Any);
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin {:?}", origin);
                None
            }
        })
        .collect();

    layer.allow_origin(AllowOrigin::list(allowed))
}

pub mod auth;
pub mod response;
pub mod routes;
pub mod state;

use axum::{
    Router,
    http::header::{CONTENT_TYPE, SET_COOKIE},
    middleware::from_fn,
};
use tower_http::cors::CorsLayer;

use crate::auth::middleware::log_request;
use crate::state::AppState;

/// The complete HTTP application: `/api` routes, request logging and CORS.
pub fn app(app_state: AppState) -> Router {
    let cors = CorsLayer::very_permissive().expose_headers([CONTENT_TYPE, SET_COOKIE]);

    Router::new()
        .nest("/api", routes::routes(app_state.clone()))
        .layer(from_fn(log_request))
        .layer(cors)
        .with_state(app_state)
}

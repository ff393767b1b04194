use axum::{Router, middleware::from_fn_with_state, routing::get};

use crate::auth::guards::allow_admin;
use crate::state::AppState;

pub mod get;
pub mod put;

/// `/api/system`: runtime settings, admin only.
pub fn system_routes(app_state: AppState) -> Router<AppState> {
    Router::new()
        .route("/logging", get(get::get_logging).put(put::set_logging))
        .route_layer(from_fn_with_state(app_state, allow_admin))
}

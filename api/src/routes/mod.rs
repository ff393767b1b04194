//! HTTP routes under `/api`.
//!
//! - `/health` → liveness probe (public)
//! - `/ouvidoria` → ombudsman tickets (signed-in staff; role checked by the service)
//! - `/system` → runtime settings (admin only)

use axum::{Router, middleware::from_fn_with_state};

use crate::auth::guards::allow_authenticated;
use crate::routes::{
    health::health_routes, ombudsman::ombudsman_routes, system::system_routes,
};
use crate::state::AppState;

pub mod health;
pub mod ombudsman;
pub mod system;

pub fn routes(app_state: AppState) -> Router<AppState> {
    Router::new()
        .nest("/health", health_routes())
        .nest(
            "/ouvidoria",
            ombudsman_routes().route_layer(from_fn_with_state(app_state.clone(), allow_authenticated)),
        )
        .nest("/system", system_routes(app_state))
}

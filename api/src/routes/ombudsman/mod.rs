//! `/api/ouvidoria`: ombudsman ticket handling.
//!
//! - `GET /` lists tickets, `GET /?id=` returns one
//! - `PATCH /?id=` partially updates status, responsible and reply
//! - `POST /start?id=` marks a ticket as being handled by the caller
//!
//! Reads never change a ticket; the first-view assignment is the explicit
//! `POST /start` call.

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

pub mod common;
pub mod get;
pub mod patch;
pub mod post;

pub fn ombudsman_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(get::get_tickets).patch(patch::update_ticket))
        .route("/start", post(post::start_handling))
}

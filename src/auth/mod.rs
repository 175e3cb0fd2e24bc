use axum::{routing::post, Router};

use crate::state::AppState;

mod dto;
pub mod handlers;
pub mod repo;
pub mod services;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/auth/registration", post(handlers::register))
        .route("/auth/login", post(handlers::login))
}

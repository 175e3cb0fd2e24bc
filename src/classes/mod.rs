use axum::{
    routing::{get, post},
    Router,
};

use crate::state::AppState;

mod dto;
pub mod handlers;
pub mod repo;

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/classes",
            get(handlers::list_classes).post(handlers::create_class),
        )
        .route(
            "/classes/:id",
            get(handlers::get_class)
                .put(handlers::update_class)
                .delete(handlers::delete_class),
        )
        .route("/classes/:id/join", post(handlers::join_class))
}

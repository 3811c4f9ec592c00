pub mod attempts;
pub mod mailings;
pub mod messages;
pub mod recipients;
pub mod users;

use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use tower_http::trace::TraceLayer;

use crate::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/users/register", post(users::register))
        .route("/users/login", post(users::login))
        .route(
            "/recipients",
            get(recipients::list).post(recipients::create),
        )
        .route(
            "/recipients/:id",
            get(recipients::get_one)
                .patch(recipients::update)
                .delete(recipients::delete_one),
        )
        .route("/messages", get(messages::list).post(messages::create))
        .route(
            "/messages/:id",
            get(messages::get_one)
                .patch(messages::update)
                .delete(messages::delete_one),
        )
        .route("/mailings", get(mailings::list).post(mailings::create))
        .route("/mailings/send", post(mailings::send_by_status))
        .route(
            "/mailings/:id",
            get(mailings::get_one)
                .patch(mailings::update)
                .delete(mailings::delete_one),
        )
        .route("/mailings/:id/send", post(mailings::send))
        .route("/mailings/:id/finish", post(mailings::finish))
        .route("/attempts", get(attempts::list))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

use std::sync::Arc;

use axum::{middleware, routing::get, Extension, Json, Router};
use serde_json::json;
use tower_http::trace::TraceLayer;

use crate::{
    handler::{
        auth::auth_handler,
        clients::clients_handler,
        missions::missions_handler,
        notifications::notifications_handler,
        payments::payments_handler,
        ratings::{ratings_handler, users_handler},
        workers::workers_handler,
    },
    middleware::auth,
    AppState,
};

async fn health_check() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "message": "Server is running"
    }))
}

pub fn create_router(app_state: Arc<AppState>) -> Router {
    let api_route = Router::new()
        .nest("/auth", auth_handler())
        .nest("/missions", missions_handler())
        .nest("/users", users_handler())
        .nest(
            "/workers",
            workers_handler().layer(middleware::from_fn(auth)),
        )
        .nest(
            "/clients",
            clients_handler().layer(middleware::from_fn(auth)),
        )
        .nest(
            "/ratings",
            ratings_handler().layer(middleware::from_fn(auth)),
        )
        .nest(
            "/payments",
            payments_handler().layer(middleware::from_fn(auth)),
        )
        .nest(
            "/notifications",
            notifications_handler().layer(middleware::from_fn(auth)),
        )
        .layer(TraceLayer::new_for_http())
        .layer(Extension(app_state));

    Router::new()
        .route("/health", get(health_check))
        .nest("/api", api_route)
}

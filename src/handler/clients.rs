use std::sync::Arc;

use axum::{response::IntoResponse, routing::get, Extension, Json, Router};

use crate::{error::HttpError, middleware::SessionContext, AppState};

pub fn clients_handler() -> Router {
    Router::new()
        .route("/missions", get(get_missions))
        .route("/payments", get(get_payments))
}

pub async fn get_missions(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(session): Extension<SessionContext>,
) -> Result<impl IntoResponse, HttpError> {
    let client_id = session.require_client()?;

    let missions = app_state.mission_service.missions_for_client(client_id).await?;

    Ok(Json(missions))
}

pub async fn get_payments(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(session): Extension<SessionContext>,
) -> Result<impl IntoResponse, HttpError> {
    let client_id = session.require_client()?;

    let payments = app_state.payment_service.payments_for_client(client_id).await?;

    Ok(Json(payments))
}

use std::sync::Arc;

use axum::{
    extract::Path,
    response::IntoResponse,
    routing::{get, put},
    Extension, Json, Router,
};
use axum_extra::extract::WithRejection;
use uuid::Uuid;
use validator::Validate;

use crate::{
    dtos::paymentdtos::UpdatePaymentStatusDto,
    error::HttpError,
    middleware::SessionContext,
    AppState,
};

pub fn payments_handler() -> Router {
    Router::new()
        .route("/:payment_id", get(get_payment))
        .route("/:payment_id/status", put(update_payment_status))
}

pub async fn get_payment(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(session): Extension<SessionContext>,
    Path(payment_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let payment = app_state
        .payment_service
        .get_payment(session.principal, payment_id)
        .await?;

    Ok(Json(payment))
}

pub async fn update_payment_status(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(session): Extension<SessionContext>,
    Path(payment_id): Path<Uuid>,
    WithRejection(Json(body), _): WithRejection<Json<UpdatePaymentStatusDto>, HttpError>,
) -> Result<impl IntoResponse, HttpError> {
    let client_id = session.require_client()?;

    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let payment = app_state
        .payment_service
        .update_status(client_id, payment_id, body)
        .await?;

    Ok(Json(payment))
}

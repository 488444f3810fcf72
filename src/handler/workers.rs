use std::sync::Arc;

use axum::{
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Extension, Json, Router,
};
use axum_extra::extract::WithRejection;
use validator::Validate;

use crate::{
    dtos::subscriptiondtos::CreateSubscriptionDto,
    error::HttpError,
    middleware::SessionContext,
    AppState,
};

pub fn workers_handler() -> Router {
    Router::new()
        .route("/assignments", get(get_assignments))
        .route("/payments", get(get_payments))
        .route("/subscription", get(get_subscription).post(create_subscription))
}

pub async fn get_assignments(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(session): Extension<SessionContext>,
) -> Result<impl IntoResponse, HttpError> {
    let worker_id = session.require_worker()?;

    let assignments = app_state
        .mission_service
        .assignments_for_worker(worker_id)
        .await?;

    Ok(Json(assignments))
}

pub async fn get_payments(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(session): Extension<SessionContext>,
) -> Result<impl IntoResponse, HttpError> {
    let worker_id = session.require_worker()?;

    let payments = app_state.payment_service.payments_for_worker(worker_id).await?;

    Ok(Json(payments))
}

pub async fn get_subscription(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(session): Extension<SessionContext>,
) -> Result<impl IntoResponse, HttpError> {
    let worker_id = session.require_worker()?;

    let subscription = app_state
        .subscription_service
        .current_subscription(worker_id)
        .await?;

    Ok(Json(subscription))
}

pub async fn create_subscription(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(session): Extension<SessionContext>,
    WithRejection(Json(body), _): WithRejection<Json<CreateSubscriptionDto>, HttpError>,
) -> Result<impl IntoResponse, HttpError> {
    let worker_id = session.require_worker()?;

    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let subscription = app_state
        .subscription_service
        .subscribe(worker_id, body)
        .await?;

    Ok((StatusCode::CREATED, Json(subscription)))
}

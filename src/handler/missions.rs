use std::sync::Arc;

use axum::{
    extract::{Path, Query},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use axum_extra::extract::WithRejection;
use uuid::Uuid;
use validator::Validate;

use crate::{
    dtos::missiondtos::*,
    error::HttpError,
    middleware::{auth, SessionContext},
    models::missionmodel::MissionFilter,
    AppState,
};

pub fn missions_handler() -> Router {
    let protected = Router::new()
        .route("/:mission_id/accept", post(accept_mission))
        .route("/:mission_id/start", post(start_mission))
        .route("/:mission_id/complete", post(complete_mission))
        .route("/:mission_id/cancel", post(cancel_mission))
        .route_layer(middleware::from_fn(auth));

    Router::new()
        .route(
            "/",
            get(list_missions).merge(post(create_mission).layer(middleware::from_fn(auth))),
        )
        .route("/:mission_id", get(get_mission))
        .route("/:mission_id/ratings", get(get_mission_ratings))
        .merge(protected)
}

pub async fn list_missions(
    Extension(app_state): Extension<Arc<AppState>>,
    WithRejection(Query(query), _): WithRejection<Query<MissionQueryDto>, HttpError>,
) -> Result<impl IntoResponse, HttpError> {
    let filter = MissionFilter::from(query);
    let missions = app_state.mission_service.list_missions(&filter).await?;

    Ok(Json(missions))
}

pub async fn get_mission(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(mission_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let detail = app_state.mission_service.get_mission_detail(mission_id).await?;

    Ok(Json(detail))
}

pub async fn create_mission(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(session): Extension<SessionContext>,
    WithRejection(Json(body), _): WithRejection<Json<CreateMissionDto>, HttpError>,
) -> Result<impl IntoResponse, HttpError> {
    let client_id = session.require_client()?;

    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let mission = app_state
        .mission_service
        .create_mission(client_id, body)
        .await?;

    Ok((StatusCode::CREATED, Json(mission)))
}

pub async fn accept_mission(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(session): Extension<SessionContext>,
    Path(mission_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let worker_id = session.require_worker()?;

    let assignment = app_state
        .mission_service
        .accept_mission(mission_id, worker_id)
        .await?;

    Ok((StatusCode::CREATED, Json(assignment)))
}

pub async fn start_mission(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(session): Extension<SessionContext>,
    Path(mission_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let worker_id = session.require_worker()?;

    let started = app_state
        .mission_service
        .start_mission(mission_id, worker_id)
        .await?;

    Ok(Json(started.assignment))
}

pub async fn complete_mission(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(session): Extension<SessionContext>,
    Path(mission_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let worker_id = session.require_worker()?;

    let completed = app_state
        .mission_service
        .complete_mission(mission_id, worker_id)
        .await?;

    Ok(Json(MissionCompletedDto {
        message: "Mission completed".to_string(),
        mission: completed.mission,
        assignment: completed.assignment,
        payment: completed.payment,
    }))
}

pub async fn cancel_mission(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(session): Extension<SessionContext>,
    Path(mission_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let client_id = session.require_client()?;

    let cancelled = app_state
        .mission_service
        .cancel_mission(mission_id, client_id)
        .await?;

    Ok(Json(cancelled.mission))
}

pub async fn get_mission_ratings(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(mission_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let ratings = app_state.rating_service.ratings_for_mission(mission_id).await?;

    Ok(Json(ratings))
}

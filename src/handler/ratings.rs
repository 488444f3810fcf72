use std::sync::Arc;

use axum::{
    extract::Path,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use axum_extra::extract::WithRejection;
use uuid::Uuid;
use validator::Validate;

use crate::{
    dtos::ratingdtos::CreateRatingDto,
    error::HttpError,
    middleware::SessionContext,
    AppState,
};

/// Mounted behind the session middleware.
pub fn ratings_handler() -> Router {
    Router::new().route("/", post(create_rating))
}

pub fn users_handler() -> Router {
    Router::new().route("/:user_id/ratings", get(get_user_ratings))
}

pub async fn create_rating(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(session): Extension<SessionContext>,
    WithRejection(Json(body), _): WithRejection<Json<CreateRatingDto>, HttpError>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let rating = app_state
        .rating_service
        .submit_rating(session.principal, body)
        .await?;

    Ok((StatusCode::CREATED, Json(rating)))
}

pub async fn get_user_ratings(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(user_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let ratings = app_state.rating_service.ratings_for_user(user_id).await?;

    Ok(Json(ratings))
}

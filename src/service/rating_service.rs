// service/rating_service.rs
use std::sync::Arc;

use uuid::Uuid;

use crate::{
    db::{
        db::DBClient,
        missiondb::MissionExt,
        ratingdb::{NewRating, RatingExt},
    },
    dtos::ratingdtos::CreateRatingDto,
    models::{
        accountmodel::Principal,
        ratingmodel::{Rating, MAX_STARS, MIN_STARS},
    },
    service::error::ServiceError,
};

#[derive(Debug, Clone)]
pub struct RatingService {
    db_client: Arc<DBClient>,
}

impl RatingService {
    pub fn new(db_client: Arc<DBClient>) -> Self {
        Self { db_client }
    }

    /// Stores the rating and, for a worker target, recomputes their mean
    /// over every rating they have received in the same transaction.
    pub async fn submit_rating(
        &self,
        rater: Principal,
        body: CreateRatingDto,
    ) -> Result<Rating, ServiceError> {
        if !(MIN_STARS..=MAX_STARS).contains(&body.stars) {
            return Err(ServiceError::Validation(format!(
                "Stars must be between {} and {}",
                MIN_STARS, MAX_STARS
            )));
        }

        if body.rated_user_id == rater.id() {
            return Err(ServiceError::Validation("You cannot rate yourself".to_string()));
        }

        if self.db_client.get_mission(body.mission_id).await?.is_none() {
            return Err(ServiceError::MissionNotFound(body.mission_id));
        }

        let rated_role = self
            .db_client
            .find_party(body.rated_user_id)
            .await?
            .ok_or(ServiceError::UserNotFound(body.rated_user_id))?;
        let rated = Principal::from_parts(rated_role, body.rated_user_id);

        let submitted = self
            .db_client
            .submit_rating(NewRating {
                mission_id: body.mission_id,
                rater,
                rated,
                stars: body.stars,
                comment: body.comment.as_deref().map(str::trim).filter(|c| !c.is_empty()),
            })
            .await?;

        let rated = submitted.rating.rated();
        let rater = submitted.rating.rater();
        match submitted.aggregate {
            Some(aggregate) => tracing::info!(
                "worker {} rated {} by {}, mean now {:.2} over {} ratings",
                rated.id(),
                body.stars,
                rater.id(),
                aggregate.mean(),
                aggregate.count
            ),
            None => tracing::info!(
                "{} {} rated {} by {}",
                rated.role().to_str(),
                rated.id(),
                body.stars,
                rater.id()
            ),
        }

        Ok(submitted.rating)
    }

    pub async fn ratings_for_user(&self, user_id: Uuid) -> Result<Vec<Rating>, ServiceError> {
        Ok(self.db_client.get_ratings_for_user(user_id).await?)
    }

    pub async fn ratings_for_mission(&self, mission_id: Uuid) -> Result<Vec<Rating>, ServiceError> {
        Ok(self.db_client.get_ratings_for_mission(mission_id).await?)
    }
}

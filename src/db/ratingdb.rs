// db/ratingdb.rs
use async_trait::async_trait;
use uuid::Uuid;

use super::db::DBClient;
use crate::models::{
    accountmodel::{PartyRole, Principal},
    ratingmodel::{Rating, RatingAggregate},
};

pub struct NewRating<'a> {
    pub mission_id: Uuid,
    pub rater: Principal,
    pub rated: Principal,
    pub stars: i32,
    pub comment: Option<&'a str>,
}

#[derive(Debug, Clone)]
pub struct SubmittedRating {
    pub rating: Rating,
    /// Recomputed aggregate, present when the rated party is a worker.
    pub aggregate: Option<RatingAggregate>,
}

#[async_trait]
pub trait RatingExt {
    /// Which account table holds `party_id`, workers checked first.
    async fn find_party(&self, party_id: Uuid) -> Result<Option<PartyRole>, sqlx::Error>;

    async fn submit_rating(&self, rating: NewRating<'_>) -> Result<SubmittedRating, sqlx::Error>;

    async fn get_ratings_for_user(&self, user_id: Uuid) -> Result<Vec<Rating>, sqlx::Error>;

    async fn get_ratings_for_mission(&self, mission_id: Uuid) -> Result<Vec<Rating>, sqlx::Error>;
}

#[async_trait]
impl RatingExt for DBClient {
    async fn find_party(&self, party_id: Uuid) -> Result<Option<PartyRole>, sqlx::Error> {
        sqlx::query_scalar::<_, PartyRole>(
            r#"
            SELECT role FROM (
                SELECT 'worker'::party_role AS role, 1 AS priority FROM workers WHERE id = $1
                UNION ALL
                SELECT 'client'::party_role AS role, 2 AS priority FROM clients WHERE id = $1
            ) parties
            ORDER BY priority
            LIMIT 1
            "#,
        )
        .bind(party_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn submit_rating(&self, rating: NewRating<'_>) -> Result<SubmittedRating, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        // Serializes concurrent raters of the same worker.
        if let Principal::Worker(worker_id) = rating.rated {
            sqlx::query("SELECT id FROM workers WHERE id = $1 FOR UPDATE")
                .bind(worker_id)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or(sqlx::Error::RowNotFound)?;
        }

        let inserted = sqlx::query_as::<_, Rating>(
            r#"
            INSERT INTO ratings
            (mission_id, rater_id, rater_role, rated_user_id, rated_role, stars, comment)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(rating.mission_id)
        .bind(rating.rater.id())
        .bind(rating.rater.role())
        .bind(rating.rated.id())
        .bind(rating.rated.role())
        .bind(rating.stars)
        .bind(rating.comment)
        .fetch_one(&mut *tx)
        .await?;

        let aggregate = match rating.rated {
            Principal::Worker(worker_id) => {
                let aggregate = sqlx::query_as::<_, RatingAggregate>(
                    r#"
                    SELECT COUNT(*) AS count, COALESCE(SUM(stars), 0)::BIGINT AS total_stars
                    FROM ratings
                    WHERE rated_user_id = $1 AND rated_role = 'worker'::party_role
                    "#,
                )
                .bind(worker_id)
                .fetch_one(&mut *tx)
                .await?;

                sqlx::query("UPDATE workers SET rating = $2 WHERE id = $1")
                    .bind(worker_id)
                    .bind(aggregate.mean())
                    .execute(&mut *tx)
                    .await?;

                Some(aggregate)
            }
            Principal::Client(_) => None,
        };

        tx.commit().await?;

        Ok(SubmittedRating {
            rating: inserted,
            aggregate,
        })
    }

    async fn get_ratings_for_user(&self, user_id: Uuid) -> Result<Vec<Rating>, sqlx::Error> {
        sqlx::query_as::<_, Rating>(
            "SELECT * FROM ratings WHERE rated_user_id = $1 ORDER BY created_at DESC, id DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn get_ratings_for_mission(&self, mission_id: Uuid) -> Result<Vec<Rating>, sqlx::Error> {
        sqlx::query_as::<_, Rating>(
            "SELECT * FROM ratings WHERE mission_id = $1 ORDER BY created_at DESC, id DESC",
        )
        .bind(mission_id)
        .fetch_all(&self.pool)
        .await
    }
}

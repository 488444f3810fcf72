// db/subscriptiondb.rs
use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use super::db::DBClient;
use crate::models::subscriptionmodels::{PremiumSubscription, SubscriptionPlan};

#[derive(Debug)]
pub enum SubscriptionOutcome {
    Created(PremiumSubscription),
    AlreadyActive(PremiumSubscription),
    WorkerNotFound,
}

#[async_trait]
pub trait SubscriptionExt {
    async fn get_active_subscription(
        &self,
        worker_id: Uuid,
    ) -> Result<Option<PremiumSubscription>, sqlx::Error>;

    async fn create_subscription(
        &self,
        worker_id: Uuid,
        plan: SubscriptionPlan,
        provider_transaction_id: Option<&str>,
    ) -> Result<SubscriptionOutcome, sqlx::Error>;
}

#[async_trait]
impl SubscriptionExt for DBClient {
    async fn get_active_subscription(
        &self,
        worker_id: Uuid,
    ) -> Result<Option<PremiumSubscription>, sqlx::Error> {
        sqlx::query_as::<_, PremiumSubscription>(
            r#"
            SELECT * FROM premium_subscriptions
            WHERE worker_id = $1
              AND status = 'active'::subscription_status
              AND (ends_at IS NULL OR ends_at > NOW())
            ORDER BY started_at DESC
            LIMIT 1
            "#,
        )
        .bind(worker_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn create_subscription(
        &self,
        worker_id: Uuid,
        plan: SubscriptionPlan,
        provider_transaction_id: Option<&str>,
    ) -> Result<SubscriptionOutcome, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        let worker = sqlx::query("SELECT id FROM workers WHERE id = $1 FOR UPDATE")
            .bind(worker_id)
            .fetch_optional(&mut *tx)
            .await?;

        if worker.is_none() {
            return Ok(SubscriptionOutcome::WorkerNotFound);
        }

        sqlx::query(
            r#"
            UPDATE premium_subscriptions
            SET status = 'expired'::subscription_status
            WHERE worker_id = $1
              AND status = 'active'::subscription_status
              AND ends_at IS NOT NULL AND ends_at <= NOW()
            "#,
        )
        .bind(worker_id)
        .execute(&mut *tx)
        .await?;

        let current = sqlx::query_as::<_, PremiumSubscription>(
            r#"
            SELECT * FROM premium_subscriptions
            WHERE worker_id = $1 AND status = 'active'::subscription_status
            LIMIT 1
            "#,
        )
        .bind(worker_id)
        .fetch_optional(&mut *tx)
        .await?;

        if let Some(current) = current {
            return Ok(SubscriptionOutcome::AlreadyActive(current));
        }

        let started_at = Utc::now();
        let subscription = sqlx::query_as::<_, PremiumSubscription>(
            r#"
            INSERT INTO premium_subscriptions
            (worker_id, plan, status, started_at, ends_at, provider_transaction_id)
            VALUES ($1, $2, 'active'::subscription_status, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(worker_id)
        .bind(plan)
        .bind(started_at)
        .bind(started_at + plan.duration())
        .bind(provider_transaction_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(SubscriptionOutcome::Created(subscription))
    }
}

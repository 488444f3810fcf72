// service/subscription_service.rs
use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::{
    db::{
        db::DBClient,
        subscriptiondb::{SubscriptionExt, SubscriptionOutcome},
    },
    dtos::subscriptiondtos::CreateSubscriptionDto,
    models::subscriptionmodels::PremiumSubscription,
    service::error::ServiceError,
};

#[derive(Debug, Clone)]
pub struct SubscriptionService {
    db_client: Arc<DBClient>,
}

impl SubscriptionService {
    pub fn new(db_client: Arc<DBClient>) -> Self {
        Self { db_client }
    }

    pub async fn subscribe(
        &self,
        worker_id: Uuid,
        body: CreateSubscriptionDto,
    ) -> Result<PremiumSubscription, ServiceError> {
        let outcome = self
            .db_client
            .create_subscription(worker_id, body.plan, body.provider_transaction_id.as_deref())
            .await?;

        match outcome {
            SubscriptionOutcome::Created(subscription) => {
                tracing::info!(
                    "worker {} subscribed to {} premium until {:?}",
                    worker_id,
                    subscription.plan.to_str(),
                    subscription.ends_at
                );
                Ok(subscription)
            }
            SubscriptionOutcome::AlreadyActive(current) => {
                tracing::warn!(
                    "worker {} already has active subscription {}",
                    worker_id,
                    current.id
                );
                Err(ServiceError::SubscriptionAlreadyActive)
            }
            SubscriptionOutcome::WorkerNotFound => Err(ServiceError::UserNotFound(worker_id)),
        }
    }

    pub async fn current_subscription(
        &self,
        worker_id: Uuid,
    ) -> Result<Option<PremiumSubscription>, ServiceError> {
        let subscription = self.db_client.get_active_subscription(worker_id).await?;

        Ok(subscription.filter(|s| s.is_current(Utc::now())))
    }
}

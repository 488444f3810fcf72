// service/payment_service.rs
use std::sync::Arc;

use uuid::Uuid;

use crate::{
    db::{
        db::DBClient,
        paymentdb::{PaymentExt, PaymentUpdate},
    },
    dtos::paymentdtos::UpdatePaymentStatusDto,
    models::{accountmodel::Principal, paymentmodel::Payment},
    service::{error::ServiceError, notification_service::NotificationService},
};

#[derive(Debug, Clone)]
pub struct PaymentService {
    db_client: Arc<DBClient>,
    notification_service: Arc<NotificationService>,
}

impl PaymentService {
    pub fn new(db_client: Arc<DBClient>, notification_service: Arc<NotificationService>) -> Self {
        Self {
            db_client,
            notification_service,
        }
    }

    pub async fn payments_for_worker(&self, worker_id: Uuid) -> Result<Vec<Payment>, ServiceError> {
        Ok(self.db_client.get_payments_by_worker(worker_id).await?)
    }

    pub async fn payments_for_client(&self, client_id: Uuid) -> Result<Vec<Payment>, ServiceError> {
        Ok(self.db_client.get_payments_by_client(client_id).await?)
    }

    /// A single payment, visible to the client who owes it and the worker it pays.
    pub async fn get_payment(
        &self,
        principal: Principal,
        payment_id: Uuid,
    ) -> Result<Payment, ServiceError> {
        let payment = self
            .db_client
            .get_payment(payment_id)
            .await?
            .ok_or(ServiceError::PaymentNotFound(payment_id))?;

        let is_party = match principal {
            Principal::Client(id) => payment.client_id == id,
            Principal::Worker(id) => payment.worker_id == id,
        };
        if !is_party {
            return Err(ServiceError::NotPaymentOwner(principal.id(), payment_id));
        }

        Ok(payment)
    }

    pub async fn update_status(
        &self,
        client_id: Uuid,
        payment_id: Uuid,
        body: UpdatePaymentStatusDto,
    ) -> Result<Payment, ServiceError> {
        let update = self
            .db_client
            .update_payment_status(payment_id, client_id, body.status, body.transaction_id.as_deref())
            .await?;

        let payment = match update {
            PaymentUpdate::Applied(payment) => payment,
            PaymentUpdate::NotFound => return Err(ServiceError::PaymentNotFound(payment_id)),
            PaymentUpdate::NotOwner => {
                tracing::warn!("client {} tried to settle foreign payment {}", client_id, payment_id);
                return Err(ServiceError::NotPaymentOwner(client_id, payment_id));
            }
            PaymentUpdate::InvalidTransition(current) => {
                tracing::warn!(
                    "rejected payment {} transition {} -> {}",
                    payment_id,
                    current.to_str(),
                    body.status.to_str()
                );
                return Err(ServiceError::InvalidPaymentTransition(payment_id, current, body.status));
            }
        };

        tracing::info!("payment {} is now {}", payment.id, payment.status.to_str());

        self.notification_service.notify_payment_updated(&payment).await;

        Ok(payment)
    }
}

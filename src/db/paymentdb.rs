// db/paymentdb.rs
use async_trait::async_trait;
use uuid::Uuid;

use super::db::DBClient;
use crate::models::paymentmodel::{Payment, PaymentStatus};

#[derive(Debug)]
pub enum PaymentUpdate {
    Applied(Payment),
    NotFound,
    NotOwner,
    InvalidTransition(PaymentStatus),
}

#[async_trait]
pub trait PaymentExt {
    async fn get_payment(&self, payment_id: Uuid) -> Result<Option<Payment>, sqlx::Error>;

    async fn get_payments_by_worker(&self, worker_id: Uuid) -> Result<Vec<Payment>, sqlx::Error>;

    async fn get_payments_by_client(&self, client_id: Uuid) -> Result<Vec<Payment>, sqlx::Error>;

    async fn update_payment_status(
        &self,
        payment_id: Uuid,
        client_id: Uuid,
        status: PaymentStatus,
        transaction_id: Option<&str>,
    ) -> Result<PaymentUpdate, sqlx::Error>;
}

#[async_trait]
impl PaymentExt for DBClient {
    async fn get_payment(&self, payment_id: Uuid) -> Result<Option<Payment>, sqlx::Error> {
        sqlx::query_as::<_, Payment>("SELECT * FROM payments WHERE id = $1")
            .bind(payment_id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn get_payments_by_worker(&self, worker_id: Uuid) -> Result<Vec<Payment>, sqlx::Error> {
        sqlx::query_as::<_, Payment>(
            "SELECT * FROM payments WHERE worker_id = $1 ORDER BY created_at DESC, id DESC",
        )
        .bind(worker_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn get_payments_by_client(&self, client_id: Uuid) -> Result<Vec<Payment>, sqlx::Error> {
        sqlx::query_as::<_, Payment>(
            "SELECT * FROM payments WHERE client_id = $1 ORDER BY created_at DESC, id DESC",
        )
        .bind(client_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn update_payment_status(
        &self,
        payment_id: Uuid,
        client_id: Uuid,
        status: PaymentStatus,
        transaction_id: Option<&str>,
    ) -> Result<PaymentUpdate, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        let current = sqlx::query_as::<_, Payment>("SELECT * FROM payments WHERE id = $1 FOR UPDATE")
            .bind(payment_id)
            .fetch_optional(&mut *tx)
            .await?;

        let Some(current) = current else {
            return Ok(PaymentUpdate::NotFound);
        };

        if current.client_id != client_id {
            return Ok(PaymentUpdate::NotOwner);
        }

        if !current.status.can_transition_to(status) {
            return Ok(PaymentUpdate::InvalidTransition(current.status));
        }

        let payment = sqlx::query_as::<_, Payment>(
            r#"
            UPDATE payments
            SET status = $2, transaction_id = COALESCE($3, transaction_id)
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(payment_id)
        .bind(status)
        .bind(transaction_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(PaymentUpdate::Applied(payment))
    }
}

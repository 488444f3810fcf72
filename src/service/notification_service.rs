// service/notification_service.rs
use std::sync::Arc;

use serde_json::json;
use uuid::Uuid;

use crate::{
    db::{db::DBClient, missiondb::{AssignedMission, CancelledMission, CompletedMission}, notificationdb::NotificationExt},
    models::{
        accountmodel::Principal,
        notificationmodel::{Notification, NotificationKind},
        paymentmodel::Payment,
    },
    service::error::ServiceError,
};

#[derive(Debug, Clone)]
pub struct NotificationService {
    db_client: Arc<DBClient>,
}

impl NotificationService {
    pub fn new(db_client: Arc<DBClient>) -> Self {
        Self { db_client }
    }

    /// Best effort: runs after the transition has committed, so a failure is
    /// logged and swallowed.
    async fn notify(&self, recipient: Principal, kind: NotificationKind, payload: serde_json::Value) {
        match self
            .db_client
            .create_notification(recipient, kind, payload)
            .await
        {
            Ok(notification) => tracing::debug!(
                "notification {} ({}) stored for {} {}",
                notification.id,
                kind.to_str(),
                recipient.role().to_str(),
                recipient.id()
            ),
            Err(e) => tracing::warn!(
                "failed to store {} notification for {}: {}",
                kind.to_str(),
                recipient.id(),
                e
            ),
        }
    }

    pub async fn notify_mission_accepted(&self, accepted: &AssignedMission) {
        self.notify(
            Principal::Client(accepted.mission.client_id),
            NotificationKind::MissionAccepted,
            json!({
                "missionId": accepted.mission.id,
                "missionTitle": accepted.mission.title,
                "workerId": accepted.assignment.worker_id,
            }),
        )
        .await
    }

    pub async fn notify_mission_started(&self, started: &AssignedMission) {
        self.notify(
            Principal::Client(started.mission.client_id),
            NotificationKind::MissionStarted,
            json!({
                "missionId": started.mission.id,
                "missionTitle": started.mission.title,
                "workerId": started.assignment.worker_id,
            }),
        )
        .await
    }

    pub async fn notify_mission_completed(&self, completed: &CompletedMission) {
        self.notify(
            Principal::Worker(completed.assignment.worker_id),
            NotificationKind::PaymentPending,
            json!({
                "missionId": completed.mission.id,
                "paymentId": completed.payment.id,
                "amountToWorker": completed.payment.amount_to_worker.to_string(),
            }),
        )
        .await;

        self.notify(
            Principal::Client(completed.mission.client_id),
            NotificationKind::MissionCompleted,
            json!({
                "missionId": completed.mission.id,
                "missionTitle": completed.mission.title,
                "paymentId": completed.payment.id,
                "amountTotal": completed.payment.amount_total.to_string(),
            }),
        )
        .await
    }

    pub async fn notify_mission_cancelled(&self, cancelled: &CancelledMission) {
        let Some(assignment) = &cancelled.assignment else {
            return;
        };

        self.notify(
            Principal::Worker(assignment.worker_id),
            NotificationKind::MissionCancelled,
            json!({
                "missionId": cancelled.mission.id,
                "missionTitle": cancelled.mission.title,
            }),
        )
        .await
    }

    pub async fn notify_payment_updated(&self, payment: &Payment) {
        self.notify(
            Principal::Worker(payment.worker_id),
            NotificationKind::PaymentUpdated,
            json!({
                "paymentId": payment.id,
                "missionId": payment.mission_id,
                "status": payment.status.to_str(),
            }),
        )
        .await
    }

    pub async fn get_notifications(
        &self,
        recipient: Principal,
    ) -> Result<Vec<Notification>, ServiceError> {
        Ok(self.db_client.get_notifications(recipient).await?)
    }

    pub async fn mark_read(
        &self,
        recipient: Principal,
        notification_id: Uuid,
    ) -> Result<Notification, ServiceError> {
        let notification = self
            .db_client
            .get_notification(notification_id)
            .await?
            .ok_or(ServiceError::NotificationNotFound(notification_id))?;

        if notification.recipient_id != recipient.id() || notification.recipient_role != recipient.role() {
            return Err(ServiceError::NotNotificationOwner(recipient.id(), notification_id));
        }

        if notification.is_read {
            return Ok(notification);
        }

        Ok(self.db_client.mark_notification_read(notification_id).await?)
    }
}

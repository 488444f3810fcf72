// db/notificationdb.rs
use async_trait::async_trait;
use sqlx::types::Json;
use uuid::Uuid;

use super::db::DBClient;
use crate::models::{
    accountmodel::Principal,
    notificationmodel::{Notification, NotificationKind},
};

#[async_trait]
pub trait NotificationExt {
    async fn create_notification(
        &self,
        recipient: Principal,
        kind: NotificationKind,
        payload: serde_json::Value,
    ) -> Result<Notification, sqlx::Error>;

    async fn get_notifications(&self, recipient: Principal) -> Result<Vec<Notification>, sqlx::Error>;

    async fn get_notification(&self, notification_id: Uuid) -> Result<Option<Notification>, sqlx::Error>;

    async fn mark_notification_read(&self, notification_id: Uuid) -> Result<Notification, sqlx::Error>;
}

#[async_trait]
impl NotificationExt for DBClient {
    async fn create_notification(
        &self,
        recipient: Principal,
        kind: NotificationKind,
        payload: serde_json::Value,
    ) -> Result<Notification, sqlx::Error> {
        sqlx::query_as::<_, Notification>(
            r#"
            INSERT INTO notifications (recipient_id, recipient_role, type, payload)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(recipient.id())
        .bind(recipient.role())
        .bind(kind.to_str())
        .bind(Json(payload))
        .fetch_one(&self.pool)
        .await
    }

    async fn get_notifications(&self, recipient: Principal) -> Result<Vec<Notification>, sqlx::Error> {
        sqlx::query_as::<_, Notification>(
            r#"
            SELECT * FROM notifications
            WHERE recipient_id = $1 AND recipient_role = $2
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(recipient.id())
        .bind(recipient.role())
        .fetch_all(&self.pool)
        .await
    }

    async fn get_notification(&self, notification_id: Uuid) -> Result<Option<Notification>, sqlx::Error> {
        sqlx::query_as::<_, Notification>("SELECT * FROM notifications WHERE id = $1")
            .bind(notification_id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn mark_notification_read(&self, notification_id: Uuid) -> Result<Notification, sqlx::Error> {
        sqlx::query_as::<_, Notification>(
            "UPDATE notifications SET is_read = TRUE WHERE id = $1 RETURNING *",
        )
        .bind(notification_id)
        .fetch_one(&self.pool)
        .await
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use uuid::Uuid;

use super::accountmodel::PartyRole;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    MissionAccepted,
    MissionStarted,
    MissionCompleted,
    MissionCancelled,
    PaymentPending,
    PaymentUpdated,
}

impl NotificationKind {
    pub fn to_str(&self) -> &str {
        match self {
            NotificationKind::MissionAccepted => "mission_accepted",
            NotificationKind::MissionStarted => "mission_started",
            NotificationKind::MissionCompleted => "mission_completed",
            NotificationKind::MissionCancelled => "mission_cancelled",
            NotificationKind::PaymentPending => "payment_pending",
            NotificationKind::PaymentUpdated => "payment_updated",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: Uuid,
    pub recipient_id: Uuid,
    pub recipient_role: PartyRole,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub kind: String,
    pub payload: Json<serde_json::Value>,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

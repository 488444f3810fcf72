use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::accountmodel::{PartyRole, Principal};

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Session {
    pub id: Uuid,
    pub worker_id: Option<Uuid>,
    pub client_id: Option<Uuid>,
    pub role: PartyRole,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    /// The identity this session carries. Exactly one id must be set and it
    /// must agree with the role tag, anything else is unauthenticated.
    pub fn principal(&self) -> Option<Principal> {
        match (self.role, self.worker_id, self.client_id) {
            (PartyRole::Worker, Some(id), None) => Some(Principal::Worker(id)),
            (PartyRole::Client, None, Some(id)) => Some(Principal::Client(id)),
            _ => None,
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

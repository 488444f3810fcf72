use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::accountmodel::{PartyRole, Principal};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Rating {
    pub id: Uuid,
    pub mission_id: Uuid,
    pub rater_id: Uuid,
    pub rater_role: PartyRole,
    pub rated_user_id: Uuid,
    pub rated_role: PartyRole,
    pub stars: i32,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Rating {
    pub fn rater(&self) -> Principal {
        Principal::from_parts(self.rater_role, self.rater_id)
    }

    pub fn rated(&self) -> Principal {
        Principal::from_parts(self.rated_role, self.rated_user_id)
    }
}

pub const MIN_STARS: i32 = 1;
pub const MAX_STARS: i32 = 5;

/// Running totals over every rating a party has received.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, sqlx::FromRow)]
pub struct RatingAggregate {
    pub count: i64,
    pub total_stars: i64,
}

impl RatingAggregate {
    /// Unweighted arithmetic mean; 0 when nothing has been received.
    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        self.total_stars as f64 / self.count as f64
    }
}

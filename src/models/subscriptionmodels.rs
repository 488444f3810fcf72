use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "subscription_plan", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionPlan {
    Monthly,
    Yearly,
}

impl SubscriptionPlan {
    pub fn to_str(&self) -> &str {
        match self {
            SubscriptionPlan::Monthly => "monthly",
            SubscriptionPlan::Yearly => "yearly",
        }
    }

    pub fn duration(&self) -> Duration {
        match self {
            SubscriptionPlan::Monthly => Duration::days(30),
            SubscriptionPlan::Yearly => Duration::days(365),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "subscription_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    Active,
    Cancelled,
    Expired,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct PremiumSubscription {
    pub id: Uuid,
    pub worker_id: Uuid,
    pub plan: SubscriptionPlan,
    pub status: SubscriptionStatus,
    pub started_at: DateTime<Utc>,
    pub ends_at: Option<DateTime<Utc>>,
    pub provider_transaction_id: Option<String>,
}

impl PremiumSubscription {
    pub fn is_current(&self, now: DateTime<Utc>) -> bool {
        self.status == SubscriptionStatus::Active && self.ends_at.map_or(true, |ends| ends > now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plan_durations() {
        assert_eq!(SubscriptionPlan::Monthly.duration(), Duration::days(30));
        assert_eq!(SubscriptionPlan::Yearly.duration(), Duration::days(365));
    }

    #[test]
    fn lapsed_or_cancelled_subscriptions_are_not_current() {
        let now = Utc::now();
        let mut sub = PremiumSubscription {
            id: Uuid::new_v4(),
            worker_id: Uuid::new_v4(),
            plan: SubscriptionPlan::Monthly,
            status: SubscriptionStatus::Active,
            started_at: now - Duration::days(1),
            ends_at: Some(now + Duration::days(29)),
            provider_transaction_id: None,
        };
        assert!(sub.is_current(now));

        sub.ends_at = Some(now - Duration::seconds(1));
        assert!(!sub.is_current(now));

        sub.ends_at = None;
        sub.status = SubscriptionStatus::Cancelled;
        assert!(!sub.is_current(now));
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::BigDecimal;
use uuid::Uuid;

use crate::utils::currency::round_to_cents;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "payment_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Held,
    Released,
    Refunded,
}

impl PaymentStatus {
    pub fn to_str(&self) -> &str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Held => "held",
            PaymentStatus::Released => "released",
            PaymentStatus::Refunded => "refunded",
        }
    }

    /// Settlement edges: funds are held first, then either released to the
    /// worker or refunded to the client.
    pub fn can_transition_to(&self, next: PaymentStatus) -> bool {
        matches!(
            (self, next),
            (PaymentStatus::Pending, PaymentStatus::Held)
                | (PaymentStatus::Held, PaymentStatus::Released)
                | (PaymentStatus::Held, PaymentStatus::Refunded)
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub id: Uuid,
    pub mission_id: Uuid,
    pub client_id: Uuid,
    pub worker_id: Uuid,
    pub amount_total: BigDecimal,
    pub amount_to_worker: BigDecimal,
    pub platform_fee: BigDecimal,
    pub payment_provider: String,
    pub transaction_id: Option<String>,
    pub status: PaymentStatus,
    pub created_at: DateTime<Utc>,
}

/// How a mission price is divided between the worker and the platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentSplit {
    pub amount_total: BigDecimal,
    pub amount_to_worker: BigDecimal,
    pub platform_fee: BigDecimal,
}

impl PaymentSplit {
    /// The fee is rounded half-up to the cent and the worker receives the
    /// remainder, so the two parts always add back to the total exactly.
    pub fn compute(price: &BigDecimal, fee_rate: &BigDecimal) -> Self {
        let amount_total = round_to_cents(price);
        let platform_fee = round_to_cents(&(&amount_total * fee_rate));
        let amount_to_worker = &amount_total - &platform_fee;

        PaymentSplit {
            amount_total,
            amount_to_worker,
            platform_fee,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).unwrap()
    }

    #[test]
    fn split_always_balances() {
        let rate = dec("0.15");
        for price in ["15", "30", "33.33", "19.99", "0.01", "0.07", "1234567.89", "45.50"] {
            let split = PaymentSplit::compute(&dec(price), &rate);
            assert_eq!(
                &split.amount_to_worker + &split.platform_fee,
                split.amount_total,
                "price {}",
                price
            );
            assert_eq!(split.platform_fee, round_to_cents(&(&dec(price) * &rate)));
        }
    }

    #[test]
    fn split_matches_known_amounts() {
        let rate = dec("0.15");

        let split = PaymentSplit::compute(&dec("15"), &rate);
        assert_eq!(split.platform_fee, dec("2.25"));
        assert_eq!(split.amount_to_worker, dec("12.75"));

        // 33.33 * 0.15 = 4.9995, rounds up
        let split = PaymentSplit::compute(&dec("33.33"), &rate);
        assert_eq!(split.platform_fee, dec("5.00"));
        assert_eq!(split.amount_to_worker, dec("28.33"));

        // 0.03 * 0.15 = 0.0045, rounds down
        let split = PaymentSplit::compute(&dec("0.03"), &rate);
        assert_eq!(split.platform_fee, dec("0.00"));
        assert_eq!(split.amount_to_worker, dec("0.03"));
    }

    #[test]
    fn zero_rate_pays_everything_to_worker() {
        let split = PaymentSplit::compute(&dec("40"), &dec("0"));
        assert_eq!(split.platform_fee, dec("0"));
        assert_eq!(split.amount_to_worker, dec("40"));
    }

    #[test]
    fn settlement_transitions() {
        use PaymentStatus::*;

        assert!(Pending.can_transition_to(Held));
        assert!(Held.can_transition_to(Released));
        assert!(Held.can_transition_to(Refunded));

        assert!(!Pending.can_transition_to(Released));
        assert!(!Pending.can_transition_to(Refunded));
        assert!(!Released.can_transition_to(Refunded));
        assert!(!Refunded.can_transition_to(Held));
        assert!(!Held.can_transition_to(Held));
    }
}

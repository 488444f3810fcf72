use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::subscriptionmodels::SubscriptionPlan;

#[derive(Validate, Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSubscriptionDto {
    pub plan: SubscriptionPlan,

    #[validate(length(min = 1, max = 255, message = "Transaction id must be between 1 and 255 characters"))]
    pub provider_transaction_id: Option<String>,
}

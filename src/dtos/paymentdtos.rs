use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::paymentmodel::PaymentStatus;

#[derive(Validate, Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePaymentStatusDto {
    pub status: PaymentStatus,

    #[validate(length(min = 1, max = 255, message = "Transaction id must be between 1 and 255 characters"))]
    pub transaction_id: Option<String>,
}

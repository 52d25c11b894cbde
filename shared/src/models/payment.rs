//! Payment Model
//!
//! Payloads of the online payment flow (事前決済). The provider itself sits
//! behind the server's payment gateway; amounts are JPY without minor unit.

use serde::{Deserialize, Serialize};

/// Start online payment for a reservation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentIntentCreate {
    pub reservation_id: i64,
}

/// Intent handed back to the client to complete payment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentIntentResponse {
    pub reservation_id: i64,
    pub payment_intent_id: String,
    pub client_secret: String,
    pub amount: i64,
    pub currency: String,
}

/// Client return after checkout; the server re-checks the intent with the provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentConfirm {
    pub payment_intent_id: String,
}

/// Reply to a provider webhook
///
/// `success = false` with no reservation means the intent is unknown here;
/// the provider should not retry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentWebhookAck {
    pub success: bool,
    pub reservation_id: Option<i64>,
    pub message: String,
}

/// Refund a paid reservation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefundCreate {
    pub reservation_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefundResponse {
    pub reservation_id: i64,
    pub refund_id: String,
    pub amount: i64,
}

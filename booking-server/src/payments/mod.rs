//! Payments
//!
//! Online pre-payment (事前決済) for reservations. The provider is an external
//! collaborator behind [`PaymentGateway`]; [`LocalPaymentGateway`] keeps
//! intents in memory and signs webhooks with HMAC-SHA256 for development and
//! tests.
//!
//! ```text
//! create_intent ─▶ (client pays at provider) ─▶ webhook / confirm ─▶ paid ─▶ refund ─▶ refunded
//! ```
//!
//! A reservation only becomes `paid` after the provider reports the intent as
//! succeeded: either through a signed webhook or through `confirm`, which
//! re-reads the intent from the provider.
//!
//! Payment state never gates seat capacity: a confirmed reservation keeps its
//! seats while `payment_status` is still `pending`.

use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use ring::hmac;
use shared::models::{
    PaymentIntentResponse, PaymentMethod, PaymentStatus, PaymentWebhookAck, RefundResponse,
    Reservation, ReservationStatus,
};
use thiserror::Error;

use crate::booking::{BookingCoordinator, BookingError, BookingResult};
use crate::ledger::ReservationLedger;

pub const CURRENCY: &str = "jpy";

/// Header carrying the hex HMAC-SHA256 of the raw webhook body
pub const SIGNATURE_HEADER: &str = "payment-signature";

/// Webhook event type that settles a reservation
pub const INTENT_SUCCEEDED: &str = "payment_intent.succeeded";

/// Errors reported by a payment provider
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("payment declined: {0}")]
    Declined(String),

    #[error("payment provider unavailable: {0}")]
    Unavailable(String),

    #[error("unknown payment intent: {0}")]
    UnknownIntent(String),

    #[error("webhook signature mismatch")]
    InvalidSignature,

    #[error("malformed webhook payload: {0}")]
    InvalidPayload(String),
}

impl From<GatewayError> for BookingError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::UnknownIntent(id) => BookingError::PaymentIntentNotFound(id),
            GatewayError::InvalidSignature => BookingError::InvalidSignature,
            GatewayError::InvalidPayload(msg) => {
                BookingError::validation(format!("Malformed webhook payload: {}", msg))
            }
            other => BookingError::PaymentGateway(other.to_string()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct GatewayIntent {
    pub id: String,
    pub client_secret: String,
}

#[derive(Debug, Clone)]
pub struct GatewayRefund {
    pub id: String,
}

/// Provider-side state of an intent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntentStatus {
    RequiresPayment,
    Succeeded,
    Refunded,
}

/// Verified webhook event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookEvent {
    pub event_type: String,
    pub intent_id: Option<String>,
}

impl WebhookEvent {
    /// Parse `{"type": ..., "data": {"object": {"id": ...}}}`
    pub fn parse(payload: &[u8]) -> Result<Self, GatewayError> {
        let value: serde_json::Value = serde_json::from_slice(payload)
            .map_err(|e| GatewayError::InvalidPayload(e.to_string()))?;
        let event_type = value["type"]
            .as_str()
            .ok_or_else(|| GatewayError::InvalidPayload("missing type".into()))?
            .to_string();
        let intent_id = value["data"]["object"]["id"].as_str().map(str::to_string);
        Ok(Self {
            event_type,
            intent_id,
        })
    }
}

/// Payment provider seam
#[async_trait]
pub trait PaymentGateway: Send + Sync + Debug {
    async fn create_intent(
        &self,
        reservation_id: i64,
        amount: i64,
        currency: &str,
    ) -> Result<GatewayIntent, GatewayError>;

    /// Current provider-side status of an intent
    async fn retrieve_intent(&self, intent_id: &str) -> Result<IntentStatus, GatewayError>;

    async fn refund(&self, intent_id: &str, amount: i64) -> Result<GatewayRefund, GatewayError>;

    /// Check `signature` against the raw body and parse the event
    fn verify_webhook(&self, payload: &[u8], signature: &str) -> Result<WebhookEvent, GatewayError>;
}

#[derive(Debug, Clone, Copy)]
struct LocalIntent {
    reservation_id: i64,
    amount: i64,
    status: IntentStatus,
}

/// In-process gateway
///
/// Intents start as `RequiresPayment`; [`settle`](Self::settle) stands in for
/// the customer finishing checkout at the provider.
#[derive(Debug, Clone)]
pub struct LocalPaymentGateway {
    intents: Arc<DashMap<String, LocalIntent>>,
    webhook_key: hmac::Key,
}

impl LocalPaymentGateway {
    pub fn new(webhook_secret: &[u8]) -> Self {
        Self {
            intents: Arc::new(DashMap::new()),
            webhook_key: hmac::Key::new(hmac::HMAC_SHA256, webhook_secret),
        }
    }

    /// Mark an intent as paid by the customer
    pub fn settle(&self, intent_id: &str) -> Result<(), GatewayError> {
        let mut intent = self
            .intents
            .get_mut(intent_id)
            .ok_or_else(|| GatewayError::UnknownIntent(intent_id.to_string()))?;
        if intent.status != IntentStatus::RequiresPayment {
            return Err(GatewayError::Declined(format!("intent {} already settled", intent_id)));
        }
        intent.status = IntentStatus::Succeeded;
        tracing::debug!(
            intent_id,
            reservation_id = intent.reservation_id,
            amount = intent.amount,
            "Local payment intent settled"
        );
        Ok(())
    }

    /// Signature header value for `payload`
    pub fn sign(&self, payload: &[u8]) -> String {
        hex::encode(hmac::sign(&self.webhook_key, payload))
    }
}

#[async_trait]
impl PaymentGateway for LocalPaymentGateway {
    async fn create_intent(
        &self,
        reservation_id: i64,
        amount: i64,
        currency: &str,
    ) -> Result<GatewayIntent, GatewayError> {
        let id = format!("pi_{}", uuid::Uuid::new_v4().simple());
        let client_secret = format!("{}_secret_{}", id, uuid::Uuid::new_v4().simple());
        self.intents.insert(
            id.clone(),
            LocalIntent {
                reservation_id,
                amount,
                status: IntentStatus::RequiresPayment,
            },
        );
        tracing::debug!(reservation_id, amount, currency, intent_id = %id, "Local payment intent created");
        Ok(GatewayIntent { id, client_secret })
    }

    async fn retrieve_intent(&self, intent_id: &str) -> Result<IntentStatus, GatewayError> {
        self.intents
            .get(intent_id)
            .map(|intent| intent.status)
            .ok_or_else(|| GatewayError::UnknownIntent(intent_id.to_string()))
    }

    async fn refund(&self, intent_id: &str, amount: i64) -> Result<GatewayRefund, GatewayError> {
        let mut intent = self
            .intents
            .get_mut(intent_id)
            .ok_or_else(|| GatewayError::UnknownIntent(intent_id.to_string()))?;
        if intent.status != IntentStatus::Succeeded {
            return Err(GatewayError::Declined(format!("intent {} is not paid", intent_id)));
        }
        intent.status = IntentStatus::Refunded;
        let id = format!("re_{}", uuid::Uuid::new_v4().simple());
        tracing::debug!(intent_id, amount, refund_id = %id, "Local refund issued");
        Ok(GatewayRefund { id })
    }

    fn verify_webhook(&self, payload: &[u8], signature: &str) -> Result<WebhookEvent, GatewayError> {
        let tag = hex::decode(signature.trim()).map_err(|_| GatewayError::InvalidSignature)?;
        hmac::verify(&self.webhook_key, payload, &tag).map_err(|_| GatewayError::InvalidSignature)?;
        WebhookEvent::parse(payload)
    }
}

#[derive(Debug, Clone)]
pub struct PaymentService {
    ledger: ReservationLedger,
    coordinator: Arc<BookingCoordinator>,
    gateway: Arc<dyn PaymentGateway>,
}

impl PaymentService {
    pub fn new(
        ledger: ReservationLedger,
        coordinator: Arc<BookingCoordinator>,
        gateway: Arc<dyn PaymentGateway>,
    ) -> Self {
        Self {
            ledger,
            coordinator,
            gateway,
        }
    }

    /// Open a provider intent for an online, unpaid, confirmed reservation
    pub async fn create_intent(&self, reservation: &Reservation) -> BookingResult<PaymentIntentResponse> {
        if reservation.payment_method != PaymentMethod::Online {
            return Err(BookingError::InvalidPaymentMethod);
        }
        match reservation.payment_status {
            PaymentStatus::Paid => return Err(BookingError::AlreadyPaid(reservation.id)),
            PaymentStatus::Refunded => return Err(BookingError::AlreadyRefunded(reservation.id)),
            PaymentStatus::Pending => {}
        }
        if reservation.status != ReservationStatus::Confirmed {
            return Err(BookingError::InvalidTransition {
                from: reservation.status.as_str(),
                to: PaymentStatus::Paid.as_str(),
            });
        }
        if reservation.amount <= 0 {
            return Err(BookingError::validation("Reservation has no amount to pay"));
        }

        let intent = self
            .gateway
            .create_intent(reservation.id, reservation.amount, CURRENCY)
            .await?;
        self.coordinator
            .attach_payment_intent(reservation.id, &intent.id)
            .await?;

        tracing::info!(
            reservation_id = reservation.id,
            intent_id = %intent.id,
            amount = reservation.amount,
            "Payment intent created"
        );
        Ok(PaymentIntentResponse {
            reservation_id: reservation.id,
            payment_intent_id: intent.id,
            client_secret: intent.client_secret,
            amount: reservation.amount,
            currency: CURRENCY.to_string(),
        })
    }

    /// Mark the intent's reservation paid once the provider reports success.
    /// Repeated confirmations are no-ops.
    pub async fn confirm(&self, payment_intent_id: &str) -> BookingResult<Reservation> {
        let reservation = self.ledger.find_by_payment_intent(payment_intent_id)?;
        if reservation.payment_status == PaymentStatus::Paid {
            return Ok(reservation);
        }

        let status = self.gateway.retrieve_intent(payment_intent_id).await?;
        if status != IntentStatus::Succeeded {
            tracing::warn!(
                reservation_id = reservation.id,
                intent_id = payment_intent_id,
                status = ?status,
                "Payment confirmation refused, provider has not settled the intent"
            );
            return Err(BookingError::NotPaid(reservation.id));
        }

        self.coordinator
            .record_payment(
                reservation.id,
                PaymentStatus::Paid,
                Some(payment_intent_id.to_string()),
            )
            .await
    }

    /// Apply a signed provider callback
    ///
    /// Only `payment_intent.succeeded` changes state; other events are
    /// acknowledged and logged.
    pub async fn handle_webhook(
        &self,
        payload: &[u8],
        signature: &str,
    ) -> BookingResult<PaymentWebhookAck> {
        let event = self.gateway.verify_webhook(payload, signature).map_err(|e| {
            tracing::warn!(error = %e, "Payment webhook rejected");
            BookingError::from(e)
        })?;

        if event.event_type != INTENT_SUCCEEDED {
            tracing::info!(event_type = %event.event_type, "Payment webhook received");
            return Ok(PaymentWebhookAck {
                success: true,
                reservation_id: None,
                message: format!("Event {} received", event.event_type),
            });
        }

        let intent_id = event
            .intent_id
            .ok_or_else(|| BookingError::validation("Webhook event has no payment intent id"))?;
        match self.confirm(&intent_id).await {
            Ok(reservation) => {
                tracing::info!(
                    reservation_id = reservation.id,
                    intent_id = %intent_id,
                    "Payment confirmed by webhook"
                );
                Ok(PaymentWebhookAck {
                    success: true,
                    reservation_id: Some(reservation.id),
                    message: "Payment confirmed".to_string(),
                })
            }
            Err(BookingError::PaymentIntentNotFound(_)) => {
                tracing::warn!(intent_id = %intent_id, "Webhook for unknown payment intent");
                Ok(PaymentWebhookAck {
                    success: false,
                    reservation_id: None,
                    message: "No reservation for this payment intent".to_string(),
                })
            }
            Err(e) => Err(e),
        }
    }

    /// Refund a paid online reservation in full
    pub async fn refund(&self, reservation: &Reservation) -> BookingResult<(Reservation, RefundResponse)> {
        if reservation.payment_method != PaymentMethod::Online {
            return Err(BookingError::InvalidPaymentMethod);
        }
        match reservation.payment_status {
            PaymentStatus::Refunded => return Err(BookingError::AlreadyRefunded(reservation.id)),
            PaymentStatus::Pending => return Err(BookingError::NotPaid(reservation.id)),
            PaymentStatus::Paid => {}
        }
        let intent_id = reservation
            .payment_intent_id
            .as_deref()
            .ok_or(BookingError::NotPaid(reservation.id))?;

        let refund = self.gateway.refund(intent_id, reservation.amount).await?;
        let updated = self
            .coordinator
            .record_payment(reservation.id, PaymentStatus::Refunded, None)
            .await?;

        tracing::info!(
            reservation_id = reservation.id,
            refund_id = %refund.id,
            amount = reservation.amount,
            "Reservation refunded"
        );
        let response = RefundResponse {
            reservation_id: reservation.id,
            refund_id: refund.id,
            amount: reservation.amount,
        };
        Ok((updated, response))
    }
}

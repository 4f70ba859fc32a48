use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::card;

/// Parameters carried on the redirect into the payment screen. Missing
/// values are filled from `PaymentConfig` defaults by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentRequest {
    pub amount: f64,
    pub currency: String,
    pub merchant_name: String,
    pub merchant_id: String,
    pub order_id: String,
    pub return_url: Option<String>,
    pub cancel_url: Option<String>,
}

/// Lifecycle of a gateway transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    Pending,
    Processing,
    Success,
    Failed,
}

impl TransactionStatus {
    pub const fn label(self) -> &'static str {
        match self {
            TransactionStatus::Pending => "pending",
            TransactionStatus::Processing => "processing",
            TransactionStatus::Success => "success",
            TransactionStatus::Failed => "failed",
        }
    }
}

/// Gateway-side record of one payment attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    pub amount: f64,
    pub currency: String,
    pub merchant_name: String,
    pub merchant_id: String,
    pub order_id: String,
    pub timestamp: DateTime<Utc>,
    pub status: TransactionStatus,
}

/// Payment instruments accepted by the gateway screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Card,
    Qr,
}

/// Card details are transient: they travel inside this value and are never
/// written to the application record.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CardDetails {
    pub card_number: String,
    pub expiry_date: String,
    pub cvv: String,
    pub cardholder_name: String,
}

impl CardDetails {
    /// Form-level validation applied before the gateway is invoked.
    pub fn validate(&self, today: chrono::NaiveDate) -> Result<(), PaymentError> {
        if !card::validate_card_number(&self.card_number) {
            return Err(PaymentError::InvalidCard("card number failed validation"));
        }
        if !card::validate_expiry_date(&self.expiry_date, today) {
            return Err(PaymentError::InvalidCard("expiry date invalid or past"));
        }
        if !card::validate_cvv(&self.cvv) {
            return Err(PaymentError::InvalidCard("cvv must be 3-4 digits"));
        }
        if self.cardholder_name.trim().is_empty() {
            return Err(PaymentError::InvalidCard("cardholder name required"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum PaymentInstrument {
    Card(CardDetails),
    Qr,
}

impl PaymentInstrument {
    pub fn method(&self) -> PaymentMethod {
        match self {
            PaymentInstrument::Card(_) => PaymentMethod::Card,
            PaymentInstrument::Qr => PaymentMethod::Qr,
        }
    }
}

/// Terminal result of one `process` call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaymentOutcome {
    pub success: bool,
    pub transaction_id: String,
    pub status: TransactionStatus,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub remediation_hints: Vec<&'static str>,
}

impl PaymentOutcome {
    pub(crate) fn settled(transaction: &Transaction) -> Self {
        let success = transaction.status == TransactionStatus::Success;
        Self {
            success,
            transaction_id: transaction.id.clone(),
            status: transaction.status,
            remediation_hints: if success {
                Vec::new()
            } else {
                vec![
                    "check the card details and try again",
                    "confirm the account has sufficient funds",
                    "try another payment method",
                ]
            },
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PaymentError {
    #[error("no active transaction")]
    NoActiveTransaction,
    #[error("invalid card: {0}")]
    InvalidCard(&'static str),
    #[error("gateway unavailable: {0}")]
    Unavailable(String),
}

/// Processor abstraction so the wizard never depends on the demo gateway.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Builds a pending transaction from the caller-supplied request.
    fn initialize(&self, request: PaymentRequest) -> Transaction;

    /// Drives a pending transaction to a terminal status.
    async fn process(
        &self,
        transaction: &mut Transaction,
        instrument: &PaymentInstrument,
    ) -> Result<PaymentOutcome, PaymentError>;
}

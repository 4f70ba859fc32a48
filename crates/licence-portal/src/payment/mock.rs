use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use rand::distributions::Alphanumeric;
use rand::Rng;

use super::gateway::{
    PaymentError, PaymentGateway, PaymentInstrument, PaymentOutcome, PaymentRequest, Transaction,
    TransactionStatus,
};

/// Demo stand-in for the real processor: a fixed settlement delay followed
/// by a success coin-flip. Rate and delay are constructor parameters so
/// tests can pin the outcome.
#[derive(Debug, Clone)]
pub struct MockPaymentGateway {
    success_rate: f64,
    settlement_delay: Duration,
}

impl Default for MockPaymentGateway {
    fn default() -> Self {
        Self {
            success_rate: 0.8,
            settlement_delay: Duration::from_secs(3),
        }
    }
}

impl MockPaymentGateway {
    pub fn new(success_rate: f64, settlement_delay: Duration) -> Self {
        Self {
            success_rate: success_rate.clamp(0.0, 1.0),
            settlement_delay,
        }
    }

    /// Always settles successfully without waiting. For demos and tests.
    pub fn always_approving() -> Self {
        Self::new(1.0, Duration::ZERO)
    }

    /// Always declines without waiting.
    pub fn always_declining() -> Self {
        Self::new(0.0, Duration::ZERO)
    }
}

fn transaction_id() -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(9)
        .map(|b| (b as char).to_ascii_lowercase())
        .collect();
    format!("TXN-{}-{}", Utc::now().timestamp_millis(), suffix)
}

#[async_trait]
impl PaymentGateway for MockPaymentGateway {
    fn initialize(&self, request: PaymentRequest) -> Transaction {
        Transaction {
            id: transaction_id(),
            amount: request.amount,
            currency: request.currency,
            merchant_name: request.merchant_name,
            merchant_id: request.merchant_id,
            order_id: request.order_id,
            timestamp: Utc::now(),
            status: TransactionStatus::Pending,
        }
    }

    async fn process(
        &self,
        transaction: &mut Transaction,
        _instrument: &PaymentInstrument,
    ) -> Result<PaymentOutcome, PaymentError> {
        transaction.status = TransactionStatus::Processing;

        if !self.settlement_delay.is_zero() {
            tokio::time::sleep(self.settlement_delay).await;
        }

        let approved = rand::thread_rng().gen_bool(self.success_rate);
        transaction.status = if approved {
            TransactionStatus::Success
        } else {
            TransactionStatus::Failed
        };

        Ok(PaymentOutcome::settled(transaction))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> PaymentRequest {
        PaymentRequest {
            amount: 99.99,
            currency: "LKR".to_string(),
            merchant_name: "Department of Motor Traffic".to_string(),
            merchant_id: "DMT".to_string(),
            order_id: "ORDER-1".to_string(),
            return_url: None,
            cancel_url: None,
        }
    }

    #[test]
    fn initialize_builds_pending_transaction() {
        let gateway = MockPaymentGateway::always_approving();
        let transaction = gateway.initialize(request());
        assert_eq!(transaction.status, TransactionStatus::Pending);
        assert!(transaction.id.starts_with("TXN-"));
        assert_eq!(transaction.order_id, "ORDER-1");
    }

    #[tokio::test]
    async fn approving_gateway_settles_success() {
        let gateway = MockPaymentGateway::always_approving();
        let mut transaction = gateway.initialize(request());
        let outcome = gateway
            .process(&mut transaction, &PaymentInstrument::Qr)
            .await
            .expect("mock gateway settles");
        assert!(outcome.success);
        assert_eq!(transaction.status, TransactionStatus::Success);
        assert!(outcome.remediation_hints.is_empty());
    }

    #[tokio::test]
    async fn declining_gateway_reports_hints() {
        let gateway = MockPaymentGateway::always_declining();
        let mut transaction = gateway.initialize(request());
        let outcome = gateway
            .process(&mut transaction, &PaymentInstrument::Qr)
            .await
            .expect("mock gateway settles");
        assert!(!outcome.success);
        assert_eq!(transaction.status, TransactionStatus::Failed);
        assert!(!outcome.remediation_hints.is_empty());
    }
}

//! Payment screen support: card validation/formatting, the gateway
//! abstraction, and the demo gateway used until a real processor lands.

pub mod card;
pub mod gateway;
pub mod mock;

pub use card::{
    card_type, format_card_number, format_expiry_date, validate_card_number, validate_cvv,
    validate_expiry_date, CardType,
};
pub use gateway::{
    CardDetails, PaymentError, PaymentGateway, PaymentInstrument, PaymentMethod, PaymentOutcome,
    PaymentRequest, Transaction, TransactionStatus,
};
pub use mock::MockPaymentGateway;

pub mod config;
pub mod error;
pub mod identity;
pub mod payment;
pub mod telemetry;
pub mod wizard;

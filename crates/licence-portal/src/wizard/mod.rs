//! The application wizard: the accumulating record, the step controller,
//! the record fetchers, category selection, and the service tying them to
//! the identity hand-off and the payment gateway.

pub mod categories;
pub mod client;
pub mod controller;
pub mod domain;
pub mod records;
pub mod router;
pub mod service;
pub mod session;

#[cfg(test)]
mod tests;

pub use categories::{standard_catalogue, LicenceCategory};
pub use client::HttpRecordsClient;
pub use controller::{WizardController, WizardError, WizardStep, TOTAL_STEPS};
pub use domain::{
    ApplicationId, ApplicationPhase, ApplicationRecord, ApplicationSession, ApplicantIdentity,
    FieldValue, MedicalCertificate, TestResult, DEFAULT_AVATAR,
};
pub use records::{
    FetchState, RecordSlice, RecordsClient, RecordsError, RecordsProgress, PRACTICAL_PASS_MARK,
    WRITTEN_PASS_MARK,
};
pub use router::application_router;
pub use service::{LicenceApplicationService, PaymentParams, ServiceError};
pub use session::{SessionError, SessionRepository, SessionView};

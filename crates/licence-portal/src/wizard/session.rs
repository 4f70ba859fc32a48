use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use super::controller::TOTAL_STEPS;
use super::domain::{
    ApplicationId, ApplicationSession, ApplicantIdentity, FieldValue, MedicalCertificate,
    TestResult,
};
use super::records::{RecordsProgress, PRACTICAL_PASS_MARK, WRITTEN_PASS_MARK};
use crate::payment::Transaction;

/// Storage abstraction so the service module can be exercised in isolation.
pub trait SessionRepository: Send + Sync {
    fn insert(&self, session: ApplicationSession) -> Result<ApplicationSession, SessionError>;
    fn update(&self, session: ApplicationSession) -> Result<(), SessionError>;
    fn fetch(&self, id: &ApplicationId) -> Result<Option<ApplicationSession>, SessionError>;
}

/// Error enumeration for session storage failures.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("application already exists")]
    Conflict,
    #[error("application not found")]
    NotFound,
    #[error("session store unavailable: {0}")]
    Unavailable(String),
}

/// Sanitized representation of a session for API responses. Card data never
/// appears here; only the gateway transaction summary does.
#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    pub application_id: ApplicationId,
    pub phase: &'static str,
    pub current_step: u8,
    pub step_label: &'static str,
    pub total_steps: u8,
    pub applicant: ApplicantIdentity,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub medical: Option<MedicalCertificate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub written_test: Option<TestResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub written_passed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub practical_test: Option<TestResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub practical_passed: Option<bool>,
    pub selected_categories: BTreeSet<String>,
    pub details: BTreeMap<String, FieldValue>,
    pub records: RecordsProgress,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction: Option<Transaction>,
}

impl SessionView {
    pub fn from_session(session: &ApplicationSession) -> Self {
        let record = session.wizard.record();
        let step = session.wizard.current_step();

        Self {
            application_id: session.application_id.clone(),
            phase: session.phase.label(),
            current_step: step.index(),
            step_label: step.label(),
            total_steps: TOTAL_STEPS,
            applicant: record.applicant.clone(),
            medical: record.medical.clone(),
            written_test: record.written_test.clone(),
            written_passed: record
                .written_test
                .as_ref()
                .map(|test| test.passed_with_mark(WRITTEN_PASS_MARK)),
            practical_test: record.practical_test.clone(),
            practical_passed: record
                .practical_test
                .as_ref()
                .map(|test| test.passed_with_mark(PRACTICAL_PASS_MARK)),
            selected_categories: record.selected_categories.clone(),
            details: record.details.clone(),
            records: session.progress.clone(),
            transaction: session.transaction.clone(),
        }
    }
}

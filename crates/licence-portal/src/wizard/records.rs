use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::categories::LicenceCategory;
use super::domain::{MedicalCertificate, TestResult};

/// Pass marks applied when the backend omits an explicit `passed` flag.
pub const WRITTEN_PASS_MARK: u8 = 75;
pub const PRACTICAL_PASS_MARK: u8 = 80;

/// The three independently fetched record slices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordSlice {
    Medical,
    WrittenTest,
    PracticalTest,
}

impl RecordSlice {
    pub const fn label(self) -> &'static str {
        match self {
            RecordSlice::Medical => "medical certificate",
            RecordSlice::WrittenTest => "written test results",
            RecordSlice::PracticalTest => "practical test results",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "medical" => Some(RecordSlice::Medical),
            "written-test" | "written_test" => Some(RecordSlice::WrittenTest),
            "practical-test" | "practical_test" => Some(RecordSlice::PracticalTest),
            _ => None,
        }
    }
}

/// Tri-state of one slice's fetch. Failures carry the message shown inline
/// next to the affected section; they never block the other slices.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "state", content = "detail")]
pub enum FetchState {
    #[default]
    Idle,
    Loading,
    Fetched,
    Failed(String),
}

impl FetchState {
    pub fn is_fetched(&self) -> bool {
        matches!(self, FetchState::Fetched)
    }
}

/// Per-session fetch progress, one state per slice.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordsProgress {
    pub medical: FetchState,
    pub written_test: FetchState,
    pub practical_test: FetchState,
}

impl RecordsProgress {
    pub fn slot(&self, slice: RecordSlice) -> &FetchState {
        match slice {
            RecordSlice::Medical => &self.medical,
            RecordSlice::WrittenTest => &self.written_test,
            RecordSlice::PracticalTest => &self.practical_test,
        }
    }

    pub fn slot_mut(&mut self, slice: RecordSlice) -> &mut FetchState {
        match slice {
            RecordSlice::Medical => &mut self.medical,
            RecordSlice::WrittenTest => &mut self.written_test,
            RecordSlice::PracticalTest => &mut self.practical_test,
        }
    }

    pub fn all_fetched(&self) -> bool {
        self.medical.is_fetched()
            && self.written_test.is_fetched()
            && self.practical_test.is_fetched()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RecordsError {
    #[error("records service returned status {0}")]
    Status(u16),
    #[error("records transport failure: {0}")]
    Transport(String),
    #[error("records payload malformed: {0}")]
    Malformed(String),
}

/// Backend seam for the department's record lookups, keyed by the identity
/// subject. One method per slice so each can be retried on its own.
#[async_trait]
pub trait RecordsClient: Send + Sync {
    async fn medical_certificate(&self, sub: &str) -> Result<MedicalCertificate, RecordsError>;
    async fn written_test(&self, sub: &str) -> Result<TestResult, RecordsError>;
    async fn practical_test(&self, sub: &str) -> Result<TestResult, RecordsError>;
    async fn licence_categories(&self) -> Result<Vec<LicenceCategory>, RecordsError>;
}

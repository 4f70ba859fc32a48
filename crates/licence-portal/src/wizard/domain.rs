use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::identity::IdentityClaims;
use crate::payment::Transaction;

/// Identifier wrapper for licence applications.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ApplicationId(pub String);

/// Shown when the provider supplies no photo claim.
pub const DEFAULT_AVATAR: &str = "/default-avatar.png";

/// Identity slice of the record, seeded once from provider claims (or the
/// demo NIC login) and read-only afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicantIdentity {
    pub full_name: String,
    pub sub: String,
    pub nic: Option<String>,
    pub date_of_birth: Option<String>,
    pub gender: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub photo_url: String,
}

impl ApplicantIdentity {
    pub fn from_claims(claims: &IdentityClaims) -> Self {
        Self {
            full_name: claims.name.clone(),
            sub: claims.sub.clone(),
            nic: None,
            date_of_birth: claims.birthdate.clone(),
            gender: claims.gender.clone(),
            phone: claims.phone_number.clone(),
            email: claims.email.clone(),
            photo_url: claims
                .picture
                .clone()
                .unwrap_or_else(|| DEFAULT_AVATAR.to_string()),
        }
    }
}

/// Medical certificate slice, absent until its fetch completes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicalCertificate {
    pub certificate_id: String,
    pub issued_date: String,
    pub expiry_date: String,
    pub doctor_name: String,
    pub hospital: String,
    pub is_fit_to_drive: bool,
    #[serde(default)]
    pub remarks: Option<String>,
}

/// One test outcome slice (written or practical).
///
/// `passed` is optional on the wire; when the backend omits it, the badge
/// derives from the score and the policy pass mark.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestResult {
    pub score: u8,
    #[serde(default)]
    pub passed: Option<bool>,
    #[serde(default)]
    pub test_date: Option<String>,
    #[serde(default)]
    pub examiner_name: Option<String>,
    #[serde(default)]
    pub test_center: Option<String>,
    #[serde(default)]
    pub remarks: Option<String>,
}

impl TestResult {
    /// Explicit flag wins; otherwise the score is measured against the mark.
    pub fn passed_with_mark(&self, pass_mark: u8) -> bool {
        match self.passed {
            Some(flag) => flag,
            None => self.score >= pass_mark,
        }
    }
}

/// Free-form wizard inputs merged one key at a time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Flag(bool),
    Text(String),
}

/// The single accumulating record threaded through the wizard.
///
/// Append-only across steps: later steps add slices, earlier fields are
/// never cleared until an explicit reset replaces the whole record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApplicationRecord {
    pub applicant: ApplicantIdentity,
    pub medical: Option<MedicalCertificate>,
    pub written_test: Option<TestResult>,
    pub practical_test: Option<TestResult>,
    pub selected_categories: BTreeSet<String>,
    pub details: BTreeMap<String, FieldValue>,
}

impl ApplicationRecord {
    pub fn seeded(applicant: ApplicantIdentity) -> Self {
        Self {
            applicant,
            ..Self::default()
        }
    }

    /// Merges one field; existing keys for other fields are untouched.
    pub fn merge_field(&mut self, key: impl Into<String>, value: FieldValue) {
        self.details.insert(key.into(), value);
    }

    /// Idempotent per id: toggling twice restores the original selection.
    pub fn toggle_category(&mut self, id: &str) {
        if !self.selected_categories.remove(id) {
            self.selected_categories.insert(id.to_string());
        }
    }
}

/// Where the application sits relative to wizard control.
///
/// Review, payment, and confirmation are not wizard steps; they are
/// reached only through explicit submit/payment callbacks and cannot be
/// re-entered from one another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationPhase {
    Drafting,
    InReview,
    AwaitingPayment,
    Confirmed,
}

impl ApplicationPhase {
    pub const fn label(self) -> &'static str {
        match self {
            ApplicationPhase::Drafting => "drafting",
            ApplicationPhase::InReview => "in_review",
            ApplicationPhase::AwaitingPayment => "awaiting_payment",
            ApplicationPhase::Confirmed => "confirmed",
        }
    }
}

/// Session state persisted per application: the wizard position, the
/// record, the fetch progress, and the last payment transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationSession {
    pub application_id: ApplicationId,
    pub phase: ApplicationPhase,
    pub wizard: super::controller::WizardController,
    pub progress: super::records::RecordsProgress,
    pub transaction: Option<Transaction>,
}

impl ApplicationSession {
    pub fn new(application_id: ApplicationId, applicant: ApplicantIdentity) -> Self {
        Self {
            application_id,
            phase: ApplicationPhase::Drafting,
            wizard: super::controller::WizardController::new(ApplicationRecord::seeded(applicant)),
            progress: super::records::RecordsProgress::default(),
            transaction: None,
        }
    }

    /// Replaces the record with an empty one and rewinds to step 1.
    pub fn reset(&mut self) {
        self.phase = ApplicationPhase::Drafting;
        self.wizard = super::controller::WizardController::new(ApplicationRecord::default());
        self.progress = super::records::RecordsProgress::default();
        self.transaction = None;
    }
}

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::response::Response;
use serde_json::Value;

use crate::config::{IdentityConfig, PaymentConfig, WizardPolicy};
use crate::identity::{
    ClaimsExchangeRequest, ClaimsExchanger, IdentityClaims, IdentityError,
};
use crate::payment::MockPaymentGateway;
use crate::wizard::categories::{standard_catalogue, LicenceCategory};
use crate::wizard::domain::{ApplicationId, ApplicationSession, MedicalCertificate, TestResult};
use crate::wizard::records::{RecordsClient, RecordsError};
use crate::wizard::service::LicenceApplicationService;
use crate::wizard::session::{SessionError, SessionRepository};

pub(super) fn identity_config() -> IdentityConfig {
    IdentityConfig {
        ui_base_url: "https://idp.example".to_string(),
        authorize_endpoint: "/authorize".to_string(),
        relying_party_url: "http://localhost:8888".to_string(),
        redirect_uri: "http://localhost:5000/userprofile".to_string(),
        client_id: "client-1".to_string(),
        scope: "openid profile resident-service".to_string(),
        acr_values: "acr".to_string(),
        claims_request: serde_json::json!({}),
        claims_locales: "en".to_string(),
        display: "page".to_string(),
        prompt: "consent".to_string(),
        max_age: 21,
        ui_locales: "en".to_string(),
        nonce: "nonce".to_string(),
        state: "state".to_string(),
    }
}

pub(super) fn payment_config() -> PaymentConfig {
    PaymentConfig {
        amount: 99.99,
        currency: "LKR".to_string(),
        merchant_name: "Department of Motor Traffic".to_string(),
        merchant_id: "DMT".to_string(),
    }
}

pub(super) fn claims() -> IdentityClaims {
    IdentityClaims {
        name: "Kasun Asanka Silva".to_string(),
        sub: "sub-123".to_string(),
        birthdate: Some("1999-09-15".to_string()),
        phone_number: Some("0771234567".to_string()),
        email: Some("kasun.silva@email.com".to_string()),
        gender: Some("Male".to_string()),
        picture: None,
    }
}

pub(super) fn medical_certificate() -> MedicalCertificate {
    MedicalCertificate {
        certificate_id: "med-1".to_string(),
        issued_date: "2023-01-12".to_string(),
        expiry_date: "2027-01-12".to_string(),
        doctor_name: "Dr. Sampath".to_string(),
        hospital: "IDH".to_string(),
        is_fit_to_drive: true,
        remarks: None,
    }
}

pub(super) fn written_result() -> TestResult {
    TestResult {
        score: 82,
        passed: None,
        test_date: Some("2025-03-02".to_string()),
        examiner_name: Some("N. Perera".to_string()),
        test_center: Some("Werahera".to_string()),
        remarks: None,
    }
}

pub(super) fn practical_result() -> TestResult {
    TestResult {
        score: 85,
        passed: Some(true),
        test_date: Some("2025-04-18".to_string()),
        examiner_name: Some("S. Fernando".to_string()),
        test_center: Some("Werahera".to_string()),
        remarks: Some("Clean run".to_string()),
    }
}

#[derive(Default, Clone)]
pub(super) struct MemorySessions {
    records: Arc<Mutex<HashMap<ApplicationId, ApplicationSession>>>,
}

impl SessionRepository for MemorySessions {
    fn insert(&self, session: ApplicationSession) -> Result<ApplicationSession, SessionError> {
        let mut guard = self.records.lock().expect("session mutex poisoned");
        if guard.contains_key(&session.application_id) {
            return Err(SessionError::Conflict);
        }
        guard.insert(session.application_id.clone(), session.clone());
        Ok(session)
    }

    fn update(&self, session: ApplicationSession) -> Result<(), SessionError> {
        let mut guard = self.records.lock().expect("session mutex poisoned");
        if guard.contains_key(&session.application_id) {
            guard.insert(session.application_id.clone(), session);
            Ok(())
        } else {
            Err(SessionError::NotFound)
        }
    }

    fn fetch(&self, id: &ApplicationId) -> Result<Option<ApplicationSession>, SessionError> {
        let guard = self.records.lock().expect("session mutex poisoned");
        Ok(guard.get(id).cloned())
    }
}

#[derive(Default)]
pub(super) struct StubRecords {
    pub(super) fail_medical: AtomicBool,
    pub(super) fail_written: AtomicBool,
    pub(super) fail_practical: AtomicBool,
}

#[async_trait]
impl RecordsClient for StubRecords {
    async fn medical_certificate(&self, _sub: &str) -> Result<MedicalCertificate, RecordsError> {
        if self.fail_medical.load(Ordering::SeqCst) {
            return Err(RecordsError::Status(503));
        }
        Ok(medical_certificate())
    }

    async fn written_test(&self, _sub: &str) -> Result<TestResult, RecordsError> {
        if self.fail_written.load(Ordering::SeqCst) {
            return Err(RecordsError::Status(503));
        }
        Ok(written_result())
    }

    async fn practical_test(&self, _sub: &str) -> Result<TestResult, RecordsError> {
        if self.fail_practical.load(Ordering::SeqCst) {
            return Err(RecordsError::Status(503));
        }
        Ok(practical_result())
    }

    async fn licence_categories(&self) -> Result<Vec<LicenceCategory>, RecordsError> {
        Ok(standard_catalogue())
    }
}

#[derive(Default)]
pub(super) struct StubExchanger {
    pub(super) calls: AtomicUsize,
    pub(super) fail: AtomicBool,
}

#[async_trait]
impl ClaimsExchanger for StubExchanger {
    async fn exchange(
        &self,
        _request: &ClaimsExchangeRequest,
    ) -> Result<IdentityClaims, IdentityError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(IdentityError::ExchangeStatus(502));
        }
        Ok(claims())
    }
}

pub(super) type TestService =
    LicenceApplicationService<MemorySessions, StubRecords, StubExchanger, MockPaymentGateway>;

pub(super) struct TestHarness {
    pub(super) service: Arc<TestService>,
    pub(super) records: Arc<StubRecords>,
    pub(super) exchanger: Arc<StubExchanger>,
}

pub(super) fn harness() -> TestHarness {
    harness_with(WizardPolicy::default(), MockPaymentGateway::always_approving())
}

pub(super) fn harness_with(policy: WizardPolicy, gateway: MockPaymentGateway) -> TestHarness {
    let sessions = Arc::new(MemorySessions::default());
    let records = Arc::new(StubRecords::default());
    let exchanger = Arc::new(StubExchanger::default());
    let service = Arc::new(LicenceApplicationService::new(
        sessions,
        records.clone(),
        exchanger.clone(),
        Arc::new(gateway),
        identity_config(),
        policy,
        payment_config(),
    ));

    TestHarness {
        service,
        records,
        exchanger,
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

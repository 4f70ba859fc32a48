use async_trait::async_trait;
use licence_portal::identity::{
    ClaimsExchangeRequest, ClaimsExchanger, IdentityClaims, IdentityError,
};
use licence_portal::wizard::{
    standard_catalogue, ApplicationId, ApplicationSession, LicenceCategory, MedicalCertificate,
    RecordsClient, RecordsError, SessionError, SessionRepository, TestResult,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Default, Clone)]
pub(crate) struct InMemorySessionRepository {
    sessions: Arc<Mutex<HashMap<ApplicationId, ApplicationSession>>>,
}

impl SessionRepository for InMemorySessionRepository {
    fn insert(&self, session: ApplicationSession) -> Result<ApplicationSession, SessionError> {
        let mut guard = self.sessions.lock().expect("session mutex poisoned");
        if guard.contains_key(&session.application_id) {
            return Err(SessionError::Conflict);
        }
        guard.insert(session.application_id.clone(), session.clone());
        Ok(session)
    }

    fn update(&self, session: ApplicationSession) -> Result<(), SessionError> {
        let mut guard = self.sessions.lock().expect("session mutex poisoned");
        if guard.contains_key(&session.application_id) {
            guard.insert(session.application_id.clone(), session);
            Ok(())
        } else {
            Err(SessionError::NotFound)
        }
    }

    fn fetch(&self, id: &ApplicationId) -> Result<Option<ApplicationSession>, SessionError> {
        let guard = self.sessions.lock().expect("session mutex poisoned");
        Ok(guard.get(id).cloned())
    }
}

/// Canned department records for demos and route tests.
#[derive(Default, Clone)]
pub(crate) struct StubRecordsClient;

#[async_trait]
impl RecordsClient for StubRecordsClient {
    async fn medical_certificate(&self, _sub: &str) -> Result<MedicalCertificate, RecordsError> {
        Ok(MedicalCertificate {
            certificate_id: "med-1".to_string(),
            issued_date: "2023-01-12".to_string(),
            expiry_date: "2027-01-12".to_string(),
            doctor_name: "Dr. Sampath".to_string(),
            hospital: "IDH".to_string(),
            is_fit_to_drive: true,
            remarks: None,
        })
    }

    async fn written_test(&self, _sub: &str) -> Result<TestResult, RecordsError> {
        Ok(TestResult {
            score: 82,
            passed: None,
            test_date: Some("2025-03-02".to_string()),
            examiner_name: Some("N. Perera".to_string()),
            test_center: Some("Werahera".to_string()),
            remarks: None,
        })
    }

    async fn practical_test(&self, _sub: &str) -> Result<TestResult, RecordsError> {
        Ok(TestResult {
            score: 85,
            passed: Some(true),
            test_date: Some("2025-04-18".to_string()),
            examiner_name: Some("S. Fernando".to_string()),
            test_center: Some("Werahera".to_string()),
            remarks: Some("Clean run".to_string()),
        })
    }

    async fn licence_categories(&self) -> Result<Vec<LicenceCategory>, RecordsError> {
        Ok(standard_catalogue())
    }
}

/// Exchanger that accepts any code; the demo never leaves the machine.
#[derive(Default, Clone)]
pub(crate) struct StubClaimsExchanger;

#[async_trait]
impl ClaimsExchanger for StubClaimsExchanger {
    async fn exchange(
        &self,
        _request: &ClaimsExchangeRequest,
    ) -> Result<IdentityClaims, IdentityError> {
        Ok(IdentityClaims {
            name: "Kasun Asanka Silva".to_string(),
            sub: "sub-123".to_string(),
            birthdate: Some("1999-09-15".to_string()),
            phone_number: Some("0771234567".to_string()),
            email: Some("kasun.silva@email.com".to_string()),
            gender: Some("Male".to_string()),
            picture: None,
        })
    }
}

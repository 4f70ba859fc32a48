use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use super::categories::LicenceCategory;
use super::controller::{WizardError, WizardStep};
use super::domain::{
    ApplicationId, ApplicationPhase, ApplicationRecord, ApplicationSession, ApplicantIdentity,
    FieldValue,
};
use super::records::{FetchState, RecordSlice, RecordsClient, RecordsError};
use super::session::{SessionError, SessionRepository, SessionView};
use crate::config::{IdentityConfig, PaymentConfig, WizardPolicy};
use crate::identity::{self, CallbackParams, ClaimsExchanger, HandoffState};
use crate::payment::{
    PaymentError, PaymentGateway, PaymentInstrument, PaymentOutcome, PaymentRequest,
};

static APPLICATION_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_application_id() -> ApplicationId {
    let id = APPLICATION_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    ApplicationId(format!("dla-{id:06}"))
}

/// Merchant parameters read from the payment redirect's query string.
/// Anything absent falls back to the configured defaults.
#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct PaymentParams {
    pub amount: Option<f64>,
    pub currency: Option<String>,
    pub merchant: Option<String>,
    pub merchant_id: Option<String>,
    pub order_id: Option<String>,
    pub return_url: Option<String>,
    pub cancel_url: Option<String>,
}

/// Service composing the session store, the records client, the claims
/// exchanger, and the payment gateway.
pub struct LicenceApplicationService<R, C, X, G> {
    sessions: Arc<R>,
    records: Arc<C>,
    exchanger: Arc<X>,
    gateway: Arc<G>,
    identity: IdentityConfig,
    policy: WizardPolicy,
    payment: PaymentConfig,
}

impl<R, C, X, G> LicenceApplicationService<R, C, X, G>
where
    R: SessionRepository + 'static,
    C: RecordsClient + 'static,
    X: ClaimsExchanger + 'static,
    G: PaymentGateway + 'static,
{
    pub fn new(
        sessions: Arc<R>,
        records: Arc<C>,
        exchanger: Arc<X>,
        gateway: Arc<G>,
        identity: IdentityConfig,
        policy: WizardPolicy,
        payment: PaymentConfig,
    ) -> Self {
        Self {
            sessions,
            records,
            exchanger,
            gateway,
            identity,
            policy,
            payment,
        }
    }

    pub fn identity_config(&self) -> &IdentityConfig {
        &self.identity
    }

    /// Resolves the provider redirect and, on loaded claims, opens a new
    /// application session seeded with the applicant's identity.
    pub async fn begin_with_callback(
        &self,
        params: &CallbackParams,
    ) -> Result<SessionView, ServiceError> {
        let state = identity::resolve(params, &self.identity, self.exchanger.as_ref()).await;
        match state {
            HandoffState::Loaded(claims) => {
                let applicant = ApplicantIdentity::from_claims(&claims);
                self.open_session(applicant)
            }
            HandoffState::Failed { code, message } => {
                warn!(%code, "identity hand-off failed");
                Err(ServiceError::Handoff { code, message })
            }
            HandoffState::Loading | HandoffState::Authenticating => Err(ServiceError::Handoff {
                code: "handoff_incomplete".to_string(),
                message: "identity hand-off did not reach a terminal state".to_string(),
            }),
        }
    }

    /// Demo login path: seeds a session from a NIC number with canned
    /// identity data, mirroring the portal's offline login form.
    pub fn begin_with_nic(&self, nic: &str) -> Result<SessionView, ServiceError> {
        let applicant = ApplicantIdentity {
            full_name: "Kasun Asanka Silva".to_string(),
            sub: format!("nic-{nic}"),
            nic: Some(nic.to_string()),
            date_of_birth: Some("1999-09-15".to_string()),
            gender: Some("Male".to_string()),
            phone: Some("0771234567".to_string()),
            email: Some("kasun.silva@email.com".to_string()),
            photo_url: "/person1.jpeg".to_string(),
        };
        self.open_session(applicant)
    }

    fn open_session(&self, applicant: ApplicantIdentity) -> Result<SessionView, ServiceError> {
        let session = ApplicationSession::new(next_application_id(), applicant);
        let stored = self.sessions.insert(session)?;
        info!(application_id = %stored.application_id.0, "application session opened");
        Ok(SessionView::from_session(&stored))
    }

    pub fn get(&self, id: &ApplicationId) -> Result<SessionView, ServiceError> {
        let session = self.load(id)?;
        Ok(SessionView::from_session(&session))
    }

    pub fn next(&self, id: &ApplicationId) -> Result<SessionView, ServiceError> {
        let mut session = self.load_drafting(id)?;

        if self.policy.gate_on_records
            && session.wizard.current_step() == WizardStep::SupportingRecords
            && !session.progress.all_fetched()
        {
            return Err(ServiceError::Wizard(WizardError::RecordsOutstanding));
        }

        session.wizard.next();
        self.store(session)
    }

    pub fn back(&self, id: &ApplicationId) -> Result<SessionView, ServiceError> {
        let mut session = self.load_drafting(id)?;
        session.wizard.back();
        self.store(session)
    }

    pub fn update_field(
        &self,
        id: &ApplicationId,
        key: &str,
        value: FieldValue,
    ) -> Result<SessionView, ServiceError> {
        let mut session = self.load_drafting(id)?;
        session.wizard.update_field(key, value);
        self.store(session)
    }

    pub fn toggle_category(
        &self,
        id: &ApplicationId,
        category_id: &str,
    ) -> Result<SessionView, ServiceError> {
        let mut session = self.load_drafting(id)?;
        session.wizard.toggle_category(category_id);
        self.store(session)
    }

    /// Fetches one record slice. A failure lands on the slice's own state
    /// with a retry hint; the other slices and navigation are unaffected.
    pub async fn fetch_slice(
        &self,
        id: &ApplicationId,
        slice: RecordSlice,
    ) -> Result<SessionView, ServiceError> {
        let mut session = self.load_drafting(id)?;
        let sub = session.wizard.record().applicant.sub.clone();

        *session.progress.slot_mut(slice) = FetchState::Loading;
        self.sessions.update(session.clone())?;

        let outcome = match slice {
            RecordSlice::Medical => self
                .records
                .medical_certificate(&sub)
                .await
                .map(|certificate| {
                    session.wizard.record_mut().medical = Some(certificate);
                }),
            RecordSlice::WrittenTest => self.records.written_test(&sub).await.map(|result| {
                session.wizard.record_mut().written_test = Some(result);
            }),
            RecordSlice::PracticalTest => self.records.practical_test(&sub).await.map(|result| {
                session.wizard.record_mut().practical_test = Some(result);
            }),
        };

        *session.progress.slot_mut(slice) = match outcome {
            Ok(()) => FetchState::Fetched,
            Err(err) => {
                warn!(slice = slice.label(), error = %err, "record fetch failed");
                FetchState::Failed(err.to_string())
            }
        };

        self.store(session)
    }

    pub async fn licence_categories(&self) -> Result<Vec<LicenceCategory>, ServiceError> {
        Ok(self.records.licence_categories().await?)
    }

    /// Hands the record to review unchanged and closes wizard control.
    pub fn submit(&self, id: &ApplicationId) -> Result<ApplicationRecord, ServiceError> {
        let mut session = self.load_drafting(id)?;
        let record = session.wizard.submit()?;
        session.phase = ApplicationPhase::InReview;
        self.sessions.update(session)?;
        info!(application_id = %id.0, "application submitted for review");
        Ok(record)
    }

    /// Initializes and settles one payment attempt. Card details are
    /// validated up front and discarded with the call; a declined attempt
    /// leaves the application awaiting payment so it can be retried.
    pub async fn pay(
        &self,
        id: &ApplicationId,
        params: PaymentParams,
        instrument: PaymentInstrument,
    ) -> Result<PaymentOutcome, ServiceError> {
        let mut session = self.load(id)?;
        match session.phase {
            ApplicationPhase::InReview | ApplicationPhase::AwaitingPayment => {}
            other => {
                return Err(ServiceError::WrongPhase {
                    phase: other.label(),
                })
            }
        }

        if let PaymentInstrument::Card(card) = &instrument {
            card.validate(Utc::now().date_naive())?;
        }

        let request = self.payment_request(params);
        let mut transaction = self.gateway.initialize(request);

        session.phase = ApplicationPhase::AwaitingPayment;
        session.transaction = Some(transaction.clone());
        self.sessions.update(session.clone())?;

        let outcome = self.gateway.process(&mut transaction, &instrument).await?;

        if outcome.success {
            session.phase = ApplicationPhase::Confirmed;
        }
        session.transaction = Some(transaction);
        self.sessions.update(session)?;

        info!(
            application_id = %id.0,
            transaction_id = %outcome.transaction_id,
            status = outcome.status.label(),
            "payment settled"
        );
        Ok(outcome)
    }

    /// Discards the record and returns the wizard to step 1.
    pub fn reset(&self, id: &ApplicationId) -> Result<SessionView, ServiceError> {
        let mut session = self.load(id)?;
        session.reset();
        self.store(session)
    }

    fn payment_request(&self, params: PaymentParams) -> PaymentRequest {
        PaymentRequest {
            amount: params.amount.unwrap_or(self.payment.amount),
            currency: params
                .currency
                .unwrap_or_else(|| self.payment.currency.clone()),
            merchant_name: params
                .merchant
                .unwrap_or_else(|| self.payment.merchant_name.clone()),
            merchant_id: params
                .merchant_id
                .unwrap_or_else(|| self.payment.merchant_id.clone()),
            order_id: params
                .order_id
                .unwrap_or_else(|| format!("ORDER-{}", Utc::now().timestamp_millis())),
            return_url: params.return_url,
            cancel_url: params.cancel_url,
        }
    }

    fn load(&self, id: &ApplicationId) -> Result<ApplicationSession, ServiceError> {
        let session = self.sessions.fetch(id)?.ok_or(SessionError::NotFound)?;
        Ok(session)
    }

    fn load_drafting(&self, id: &ApplicationId) -> Result<ApplicationSession, ServiceError> {
        let session = self.load(id)?;
        if session.phase != ApplicationPhase::Drafting {
            return Err(ServiceError::WrongPhase {
                phase: session.phase.label(),
            });
        }
        Ok(session)
    }

    fn store(&self, session: ApplicationSession) -> Result<SessionView, ServiceError> {
        let view = SessionView::from_session(&session);
        self.sessions.update(session)?;
        Ok(view)
    }
}

/// Error raised by the application service.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("identity hand-off failed ({code}): {message}")]
    Handoff { code: String, message: String },
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Wizard(#[from] WizardError),
    #[error(transparent)]
    Records(#[from] RecordsError),
    #[error(transparent)]
    Payment(#[from] PaymentError),
    #[error("operation not available while the application is {phase}")]
    WrongPhase { phase: &'static str },
}

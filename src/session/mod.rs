pub mod events;
pub mod timeline;
pub mod view;

use log::{ debug, error, info, warn };
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc::UnboundedSender;
use uuid::Uuid;

use crate::client::{ ClientError, PharmacyClient };
use crate::dashboard::DashboardSynchronizer;
use crate::models::auth::{ Session, User };
use crate::models::chat::ChatOrderRequest;
use crate::models::dashboard::{ DashboardSnapshot, DatabaseSnapshot, RefillAlert };
use crate::store::SessionStore;
use crate::voice::{ ListenState, RecognitionUpdate, SpeechOutput, VoiceError, VoiceInput };

pub use self::events::SessionEvent;
pub use self::timeline::{ Timeline, TimelineEvent };
pub use self::view::{ ApiStatus, AuthMode, Tab, ViewState };

pub const EMAIL_SAVED_NOTICE: &str = "✅ Email saved! You will now receive refill alerts here.";
pub const EMAIL_FAILED_NOTICE: &str = "Failed to save email.";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("Username and password are required")]
    MissingCredentials,

    #[error("An email address is required to register")]
    MissingEmail,

    /// The server's `detail`, shown to the user as-is.
    #[error("{0}")]
    Rejected(String),

    #[error("Connection error")]
    Connection,
}

impl From<ClientError> for AuthError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Status { detail, .. } =>
                AuthError::Rejected(detail.unwrap_or_else(|| "Auth failed".to_string())),
            _ => AuthError::Connection,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Nothing was sent: blank text, no session, or a reply still pending.
    Ignored,
    /// The server answered and its reply was appended.
    Delivered,
    /// The request failed in transport; the apology was appended.
    Failed,
}

/// Owns the conversation and everything derived from it for one patient.
pub struct SessionController {
    client_session_id: Uuid,
    client: Arc<dyn PharmacyClient>,
    store: Arc<dyn SessionStore>,
    dashboard_sync: DashboardSynchronizer,
    voice: VoiceInput,
    speech: SpeechOutput,
    events: UnboundedSender<SessionEvent>,
    session: Option<Session>,
    timeline: Timeline,
    pending: bool,
    pending_note: Option<String>,
    dashboard: DashboardSnapshot,
    database: DatabaseSnapshot,
    view: ViewState,
}

impl SessionController {
    pub fn new(
        client: Arc<dyn PharmacyClient>,
        store: Arc<dyn SessionStore>,
        voice: VoiceInput,
        speech: SpeechOutput,
        events: UnboundedSender<SessionEvent>
    ) -> Self {
        let client_session_id = Uuid::new_v4();
        info!("Client session {} created", client_session_id);
        Self {
            client_session_id,
            dashboard_sync: DashboardSynchronizer::new(Arc::clone(&client)),
            client,
            store,
            voice,
            speech,
            events,
            session: None,
            timeline: Timeline::new(),
            pending: false,
            pending_note: None,
            dashboard: DashboardSnapshot::default(),
            database: DatabaseSnapshot::default(),
            view: ViewState::default(),
        }
    }

    pub fn client_session_id(&self) -> Uuid {
        self.client_session_id
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.as_ref().map_or(false, |s| s.authenticated)
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    pub fn pending_note(&self) -> Option<&str> {
        self.pending_note.as_deref()
    }

    pub fn dashboard(&self) -> &DashboardSnapshot {
        &self.dashboard
    }

    pub fn database_snapshot(&self) -> &DatabaseSnapshot {
        &self.database
    }

    pub fn listen_state(&self) -> ListenState {
        self.voice.state()
    }

    pub fn view(&self) -> ViewState {
        ViewState {
            auth_gate_open: !self.is_authenticated(),
            typing: self.pending,
            listening: self.voice.state() == ListenState::Listening,
            ..self.view.clone()
        }
    }

    fn emit(&self, event: SessionEvent) {
        if self.events.send(event).is_err() {
            debug!("[{}] No presentation listener attached", self.client_session_id);
        }
    }

    fn emit_view(&self) {
        self.emit(SessionEvent::ViewChanged(self.view()));
    }

    fn notice(&self, text: impl Into<String>) {
        self.emit(SessionEvent::Notice(text.into()));
    }

    fn set_pending(&mut self, pending: bool) {
        self.pending = pending;
        self.emit(SessionEvent::PendingChanged(pending));
    }

    fn apply(&mut self, event: TimelineEvent) {
        let current = std::mem::replace(&mut self.timeline, Timeline::empty());
        self.timeline = timeline::reduce(current, event);
        if let Some(message) = self.timeline.last() {
            self.emit(SessionEvent::MessageAppended(message.clone()));
        }
    }

    // --- Session lifecycle ---

    /// Rehydrates the persisted user, if any, and checks backend health.
    pub async fn restore(&mut self) -> bool {
        let restored = match self.store.load().await {
            Ok(Some(user)) => {
                info!("[{}] Restoring session for '{}'", self.client_session_id, user.username);
                self.start_session(user, false).await;
                true
            }
            Ok(None) => false,
            Err(e) => {
                warn!("[{}] Could not read stored session: {}", self.client_session_id, e);
                false
            }
        };
        if !restored {
            self.check_health().await;
        }
        restored
    }

    pub async fn login(&mut self, username: &str, password: &str) -> Result<(), AuthError> {
        if username.trim().is_empty() || password.is_empty() {
            return self.auth_failed(AuthError::MissingCredentials);
        }
        match self.client.login(username.trim(), password).await {
            Ok(user) => {
                self.start_session(user, true).await;
                Ok(())
            }
            Err(e) => self.auth_failed(e.into()),
        }
    }

    pub async fn register(
        &mut self,
        username: &str,
        password: &str,
        email: &str
    ) -> Result<(), AuthError> {
        if username.trim().is_empty() || password.is_empty() {
            return self.auth_failed(AuthError::MissingCredentials);
        }
        if email.trim().is_empty() {
            return self.auth_failed(AuthError::MissingEmail);
        }
        match self.client.register(username.trim(), password, email.trim()).await {
            Ok(user) => {
                self.start_session(user, true).await;
                Ok(())
            }
            Err(e) => self.auth_failed(e.into()),
        }
    }

    fn auth_failed(&self, err: AuthError) -> Result<(), AuthError> {
        warn!("[{}] Authentication failed: {}", self.client_session_id, err);
        self.notice(err.to_string());
        Err(err)
    }

    async fn start_session(&mut self, user: User, persist: bool) {
        if persist {
            if let Err(e) = self.store.save(&user).await {
                warn!("[{}] Could not persist session: {}", self.client_session_id, e);
            }
        }
        let session = Session::from(user);
        info!(
            "[{}] Session started for patient {}",
            self.client_session_id,
            session.user_id
        );
        self.session = Some(session.clone());
        self.emit(SessionEvent::SessionStarted(session));
        self.emit_view();

        self.refresh_dashboard().await;
        self.check_health().await;
    }

    /// Drops the session and starts a fresh conversation.
    pub async fn logout(&mut self) {
        if let Err(e) = self.store.clear().await {
            warn!("[{}] Could not clear stored session: {}", self.client_session_id, e);
        }
        if let Some(session) = self.session.take() {
            info!("[{}] Session ended for patient {}", self.client_session_id, session.user_id);
        }
        self.timeline = Timeline::new();
        self.pending_note = None;
        self.dashboard = DashboardSnapshot::default();
        self.database = DatabaseSnapshot::default();
        self.view = ViewState {
            auth_mode: self.view.auth_mode,
            api_status: self.view.api_status,
            email_service_live: self.view.email_service_live,
            ..ViewState::default()
        };
        self.emit(SessionEvent::SessionEnded);
        self.emit_view();
    }

    pub fn toggle_auth_mode(&mut self) {
        self.view.auth_mode = self.view.auth_mode.toggled();
        self.emit_view();
    }

    // --- Composer and prescription note ---

    pub fn set_composer(&mut self, text: impl Into<String>) {
        self.view.composer = text.into();
    }

    pub fn toggle_attachment_panel(&mut self) {
        self.view.attachment_panel_open = !self.view.attachment_panel_open;
        self.emit_view();
    }

    /// Attaches a prescription note to the next order. Blank text detaches.
    pub fn attach_prescription(&mut self, note: impl Into<String>) {
        let note = note.into();
        self.pending_note = if note.trim().is_empty() { None } else { Some(note) };
    }

    pub fn discard_prescription(&mut self) {
        self.pending_note = None;
        self.view.attachment_panel_open = false;
        self.emit_view();
    }

    /// Seeds the composer from a refill alert. The alert itself stays.
    pub fn draft_refill(&mut self, alert: &RefillAlert) {
        self.view.composer = alert.refill_request();
        self.view.active_tab = Tab::Consultation;
        self.emit_view();
    }

    /// Sends whatever is in the composer.
    pub async fn send_composer(&mut self) -> SubmitOutcome {
        let text = self.view.composer.clone();
        self.submit(&text, None).await
    }

    // --- Ordering ---

    /// Sends one utterance as an order request and appends the reply.
    ///
    /// The user message is appended before the request goes out. The
    /// prescription note (the explicit one, else the attached one) rides on
    /// this request only and is cleared whatever the outcome.
    pub async fn submit(&mut self, raw_text: &str, attached_note: Option<String>) -> SubmitOutcome {
        if raw_text.trim().is_empty() {
            return SubmitOutcome::Ignored;
        }
        let Some(patient_id) = self.session
            .as_ref()
            .filter(|s| s.authenticated)
            .map(|s| s.user_id.clone()) else {
            debug!("[{}] Ignoring submit without a session", self.client_session_id);
            return SubmitOutcome::Ignored;
        };
        if self.pending {
            warn!("[{}] Ignoring submit while a reply is pending", self.client_session_id);
            return SubmitOutcome::Ignored;
        }

        self.apply(TimelineEvent::UserSubmitted(raw_text.to_string()));
        self.view.composer.clear();
        self.view.attachment_panel_open = false;
        self.set_pending(true);

        let prescription_data = attached_note
            .or_else(|| self.pending_note.take())
            .filter(|note| !note.trim().is_empty());
        self.pending_note = None;

        let request = ChatOrderRequest {
            patient_id,
            text: raw_text.to_string(),
            prescription_data,
        };
        info!(
            "[{}] Sending order for patient {} (prescription attached: {})",
            self.client_session_id,
            request.patient_id,
            request.prescription_data.is_some()
        );

        let outcome = match self.client.send_order(&request).await {
            Ok(reply) => {
                self.apply(TimelineEvent::OrderReplied(reply));
                SubmitOutcome::Delivered
            }
            Err(e) => {
                error!("[{}] Order request failed: {}", self.client_session_id, e);
                self.apply(TimelineEvent::OrderFailed);
                SubmitOutcome::Failed
            }
        };
        self.set_pending(false);
        self.emit_view();

        if let Some(reply) = self.timeline.last() {
            self.speech.speak(&reply.content);
        }
        if outcome == SubmitOutcome::Delivered {
            self.refresh_dashboard().await;
        }
        outcome
    }

    // --- Voice ---

    /// Starts one recognition session. Unsupported platforms get a notice.
    pub fn start_listening(&mut self) -> Result<(), VoiceError> {
        match self.voice.start_listening() {
            Ok(()) => {
                self.emit_view();
                Ok(())
            }
            Err(VoiceError::AlreadyListening) => {
                debug!("[{}] Already listening", self.client_session_id);
                Err(VoiceError::AlreadyListening)
            }
            Err(e) => {
                self.notice(e.to_string());
                Err(e)
            }
        }
    }

    /// Feeds a recognizer event back in. A transcript is submitted as-is.
    pub async fn handle_recognition(&mut self, update: RecognitionUpdate) -> Option<SubmitOutcome> {
        let was_listening = self.voice.state() == ListenState::Listening;
        let transcript = self.voice.finish(update);
        if was_listening && self.voice.state() == ListenState::Idle {
            self.emit_view();
        }
        match transcript {
            Some(text) => Some(self.submit(&text, None).await),
            None => None,
        }
    }

    // --- Dashboard and views ---

    pub async fn refresh_dashboard(&mut self) {
        let Some(user_id) = self.session.as_ref().map(|s| s.user_id.clone()) else {
            return;
        };
        self.dashboard = self.dashboard_sync.refresh(&user_id).await;
        self.emit(SessionEvent::DashboardUpdated(self.dashboard.clone()));
    }

    pub async fn refresh_database_snapshot(&mut self) {
        match self.client.fetch_database_snapshot().await {
            Ok(snapshot) => {
                self.database = snapshot;
                self.emit(SessionEvent::DatabaseUpdated(self.database.clone()));
            }
            Err(e) => error!("[{}] DB snapshot fetch error: {}", self.client_session_id, e),
        }
    }

    pub async fn switch_tab(&mut self, tab: Tab) {
        self.view.active_tab = tab;
        self.emit_view();
        if !self.is_authenticated() {
            return;
        }
        if tab.uses_dashboard() {
            self.refresh_dashboard().await;
        }
        if tab == Tab::Database {
            self.refresh_database_snapshot().await;
        }
        self.check_health().await;
    }

    pub async fn check_health(&mut self) {
        self.view.api_status = ApiStatus::Checking;
        match self.client.check_health().await {
            Ok(health) => {
                self.view.api_status = ApiStatus::Connected;
                self.view.email_service_live = health.live;
            }
            Err(e) => {
                debug!("[{}] Health check failed: {}", self.client_session_id, e);
                self.view.api_status = ApiStatus::Failed;
                self.view.email_service_live = false;
            }
        }
        self.emit_view();
    }

    /// Saves a new notification address for the signed-in user.
    pub async fn update_email(&mut self, email: &str) -> bool {
        let email = email.trim();
        let Some(username) = self.session.as_ref().map(|s| s.username.clone()) else {
            return false;
        };
        if email.is_empty() {
            self.notice(EMAIL_FAILED_NOTICE);
            return false;
        }
        match self.client.update_email(&username, email).await {
            Ok(()) => {
                if let Some(session) = self.session.as_mut() {
                    session.display_email = Some(email.to_string());
                    let user = session.to_user();
                    if let Err(e) = self.store.save(&user).await {
                        warn!("[{}] Could not persist new email: {}", self.client_session_id, e);
                    }
                }
                self.notice(EMAIL_SAVED_NOTICE);
                true
            }
            Err(e) => {
                warn!("[{}] Email update failed: {}", self.client_session_id, e);
                self.notice(EMAIL_FAILED_NOTICE);
                false
            }
        }
    }
}

//! In-crate fakes for the backend client and the speech capabilities.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{ AtomicUsize, Ordering };
use std::sync::{ Mutex, MutexGuard };

use crate::client::{ ClientError, PharmacyClient };
use crate::models::auth::{ HealthStatus, User };
use crate::models::chat::{ ChatOrderRequest, ChatOrderResponse, Trace };
use crate::models::dashboard::{ DatabaseSnapshot, InventoryItem, Order, RefillAlert };
use crate::voice::{
    RecognitionEvent,
    RecognitionSink,
    SpeechRecognizer,
    SpeechSynthesizer,
    Utterance,
    VoiceError,
};

pub fn patient() -> User {
    User {
        username: "asha".into(),
        patient_id: "PAT001".into(),
        email: Some("asha@example.com".into()),
    }
}

struct FakeState {
    login: Result<User, ClientError>,
    register: Result<User, ClientError>,
    order_replies: VecDeque<Result<ChatOrderResponse, ClientError>>,
    sent_orders: Vec<ChatOrderRequest>,
    orders: Result<Vec<Order>, ClientError>,
    traces: Result<Vec<Trace>, ClientError>,
    low_stock: Result<Vec<InventoryItem>, ClientError>,
    refill_alerts: Result<Vec<RefillAlert>, ClientError>,
    dashboard_patients: Vec<String>,
    update_email: Result<(), ClientError>,
    email_updates: Vec<(String, String)>,
    snapshot: Result<DatabaseSnapshot, ClientError>,
    health: Result<HealthStatus, ClientError>,
}

/// Scripted `PharmacyClient`. Order replies are consumed in order; an empty
/// queue answers like an unreachable server.
pub struct FakePharmacyClient {
    state: Mutex<FakeState>,
    order_fetches: AtomicUsize,
}

impl FakePharmacyClient {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(FakeState {
                login: Ok(patient()),
                register: Ok(patient()),
                order_replies: VecDeque::new(),
                sent_orders: Vec::new(),
                orders: Ok(Vec::new()),
                traces: Ok(Vec::new()),
                low_stock: Ok(Vec::new()),
                refill_alerts: Ok(Vec::new()),
                dashboard_patients: Vec::new(),
                update_email: Ok(()),
                email_updates: Vec::new(),
                snapshot: Ok(DatabaseSnapshot::default()),
                health: Ok(HealthStatus { live: true }),
            }),
            order_fetches: AtomicUsize::new(0),
        }
    }

    fn state(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap()
    }

    pub fn set_login(&self, result: Result<User, ClientError>) {
        self.state().login = result;
    }

    pub fn set_register(&self, result: Result<User, ClientError>) {
        self.state().register = result;
    }

    pub fn reply_with(&self, reply: ChatOrderResponse) {
        self.state().order_replies.push_back(Ok(reply));
    }

    pub fn reply_with_json(&self, body: serde_json::Value) {
        let reply = serde_json::from_value(body).unwrap();
        self.reply_with(reply);
    }

    pub fn fail_next_order(&self, err: ClientError) {
        self.state().order_replies.push_back(Err(err));
    }

    pub fn sent_orders(&self) -> Vec<ChatOrderRequest> {
        self.state().sent_orders.clone()
    }

    pub fn set_orders(&self, orders: Vec<Order>) {
        self.state().orders = Ok(orders);
    }

    pub fn fail_orders(&self, err: ClientError) {
        self.state().orders = Err(err);
    }

    pub fn fail_traces(&self, err: ClientError) {
        self.state().traces = Err(err);
    }

    pub fn set_low_stock(&self, items: Vec<InventoryItem>) {
        self.state().low_stock = Ok(items);
    }

    pub fn set_refill_alerts(&self, alerts: Vec<RefillAlert>) {
        self.state().refill_alerts = Ok(alerts);
    }

    pub fn fail_refills(&self, err: ClientError) {
        self.state().refill_alerts = Err(err);
    }

    pub fn dashboard_patients(&self) -> Vec<String> {
        self.state().dashboard_patients.clone()
    }

    /// How many dashboard refreshes reached the backend.
    pub fn refreshes(&self) -> usize {
        self.order_fetches.load(Ordering::SeqCst)
    }

    pub fn set_update_email(&self, result: Result<(), ClientError>) {
        self.state().update_email = result;
    }

    pub fn email_updates(&self) -> Vec<(String, String)> {
        self.state().email_updates.clone()
    }

    pub fn set_snapshot(&self, result: Result<DatabaseSnapshot, ClientError>) {
        self.state().snapshot = result;
    }

    pub fn set_health(&self, result: Result<HealthStatus, ClientError>) {
        self.state().health = result;
    }
}

#[async_trait]
impl PharmacyClient for FakePharmacyClient {
    async fn login(&self, _username: &str, _password: &str) -> Result<User, ClientError> {
        self.state().login.clone()
    }

    async fn register(
        &self,
        _username: &str,
        _password: &str,
        _email: &str
    ) -> Result<User, ClientError> {
        self.state().register.clone()
    }

    async fn send_order(&self, request: &ChatOrderRequest) -> Result<ChatOrderResponse, ClientError> {
        let mut state = self.state();
        state.sent_orders.push(request.clone());
        state.order_replies
            .pop_front()
            .unwrap_or_else(|| Err(ClientError::Transport("connection refused".into())))
    }

    async fn fetch_orders(&self, patient_id: &str) -> Result<Vec<Order>, ClientError> {
        self.order_fetches.fetch_add(1, Ordering::SeqCst);
        let mut state = self.state();
        state.dashboard_patients.push(patient_id.to_string());
        state.orders.clone()
    }

    async fn fetch_traces(&self, patient_id: &str) -> Result<Vec<Trace>, ClientError> {
        let mut state = self.state();
        state.dashboard_patients.push(patient_id.to_string());
        state.traces.clone()
    }

    async fn fetch_low_stock(&self) -> Result<Vec<InventoryItem>, ClientError> {
        self.state().low_stock.clone()
    }

    async fn fetch_refill_alerts(&self, patient_id: &str) -> Result<Vec<RefillAlert>, ClientError> {
        let mut state = self.state();
        state.dashboard_patients.push(patient_id.to_string());
        state.refill_alerts.clone()
    }

    async fn update_email(&self, username: &str, email: &str) -> Result<(), ClientError> {
        let mut state = self.state();
        state.email_updates.push((username.to_string(), email.to_string()));
        state.update_email.clone()
    }

    async fn fetch_database_snapshot(&self) -> Result<DatabaseSnapshot, ClientError> {
        self.state().snapshot.clone()
    }

    async fn check_health(&self) -> Result<HealthStatus, ClientError> {
        self.state().health.clone()
    }
}

/// Tracks which utterances were started and which one is still audible.
#[derive(Default)]
pub struct RecordingSynthesizer {
    spoken: Mutex<Vec<Utterance>>,
    playing: Mutex<Option<Utterance>>,
}

impl RecordingSynthesizer {
    pub fn spoken(&self) -> Vec<Utterance> {
        self.spoken.lock().unwrap().clone()
    }

    pub fn audible(&self) -> Vec<Utterance> {
        self.playing.lock().unwrap().iter().cloned().collect()
    }
}

impl SpeechSynthesizer for RecordingSynthesizer {
    fn cancel(&self) {
        self.playing.lock().unwrap().take();
    }

    fn speak(&self, utterance: Utterance) -> Result<(), VoiceError> {
        self.spoken.lock().unwrap().push(utterance.clone());
        let mut playing = self.playing.lock().unwrap();
        if playing.is_some() {
            return Err(VoiceError::Synthesis("overlapping utterance".into()));
        }
        *playing = Some(utterance);
        Ok(())
    }
}

/// Delivers a fixed result followed by `End` as soon as it is started.
pub struct ScriptedRecognizer {
    result: RecognitionEvent,
    starts: AtomicUsize,
}

impl ScriptedRecognizer {
    pub fn transcript(text: &str) -> Self {
        Self { result: RecognitionEvent::Transcript(text.to_string()), starts: AtomicUsize::new(0) }
    }

    pub fn error(message: &str) -> Self {
        Self { result: RecognitionEvent::Error(message.to_string()), starts: AtomicUsize::new(0) }
    }

    pub fn starts(&self) -> usize {
        self.starts.load(Ordering::SeqCst)
    }
}

impl SpeechRecognizer for ScriptedRecognizer {
    fn start(&self, sink: RecognitionSink) -> Result<(), VoiceError> {
        self.starts.fetch_add(1, Ordering::SeqCst);
        sink.send(self.result.clone());
        sink.send(RecognitionEvent::End);
        Ok(())
    }
}

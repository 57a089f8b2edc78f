pub mod http;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::auth::{ HealthStatus, User };
use crate::models::chat::{ ChatOrderRequest, ChatOrderResponse, Trace };
use crate::models::dashboard::{ DatabaseSnapshot, InventoryItem, Order, RefillAlert };

pub use self::http::HttpPharmacyClient;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Transport(String),

    #[error("server answered {status}{}", detail_suffix(.detail))]
    Status {
        status: u16,
        detail: Option<String>,
    },

    #[error("could not decode response: {0}")]
    Decode(String),

    #[error("expected a JSON array from {endpoint}, got {found}")]
    NotASequence {
        endpoint: String,
        found: &'static str,
    },
}

fn detail_suffix(detail: &Option<String>) -> String {
    detail.as_deref().map(|d| format!(": {}", d)).unwrap_or_default()
}

impl ClientError {
    /// The server-provided `detail`, if this failure carried one.
    pub fn detail(&self) -> Option<&str> {
        match self {
            ClientError::Status { detail, .. } => detail.as_deref(),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ClientError::Decode(err.to_string())
        } else {
            ClientError::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::Decode(err.to_string())
    }
}

/// Every backend call the ordering session needs. Implementations return a
/// determinate outcome for each call and never panic on bad input.
#[async_trait]
pub trait PharmacyClient: Send + Sync {
    async fn login(&self, username: &str, password: &str) -> Result<User, ClientError>;

    async fn register(
        &self,
        username: &str,
        password: &str,
        email: &str
    ) -> Result<User, ClientError>;

    async fn send_order(&self, request: &ChatOrderRequest) -> Result<ChatOrderResponse, ClientError>;

    async fn fetch_orders(&self, patient_id: &str) -> Result<Vec<Order>, ClientError>;

    async fn fetch_traces(&self, patient_id: &str) -> Result<Vec<Trace>, ClientError>;

    async fn fetch_low_stock(&self) -> Result<Vec<InventoryItem>, ClientError>;

    async fn fetch_refill_alerts(&self, patient_id: &str) -> Result<Vec<RefillAlert>, ClientError>;

    async fn update_email(&self, username: &str, email: &str) -> Result<(), ClientError>;

    async fn fetch_database_snapshot(&self) -> Result<DatabaseSnapshot, ClientError>;

    async fn check_health(&self) -> Result<HealthStatus, ClientError>;
}

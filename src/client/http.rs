use async_trait::async_trait;
use log::{ debug, warn };
use reqwest::{ Client as HttpClient, Response };
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value as JsonValue;
use std::time::Duration;

use super::{ ClientError, PharmacyClient };
use crate::config::ClientConfig;
use crate::models::auth::{
    AuthResponse,
    ErrorDetail,
    HealthStatus,
    LoginRequest,
    RegisterRequest,
    UpdateEmailRequest,
    User,
};
use crate::models::chat::{ ChatOrderRequest, ChatOrderResponse, Trace };
use crate::models::dashboard::{ DatabaseSnapshot, InventoryItem, Order, RefillAlert };

const ROUTE_HEALTH: &str = "/health/email";
const ROUTE_LOGIN: &str = "/auth/login";
const ROUTE_REGISTER: &str = "/auth/register";
const ROUTE_UPDATE_EMAIL: &str = "/auth/update-email";
const ROUTE_CHAT_ORDER: &str = "/chat-order";
const ROUTE_ORDERS: &str = "/orders";
const ROUTE_TRACES: &str = "/admin/traces";
const ROUTE_LOW_STOCK: &str = "/admin/low-stock";
const ROUTE_REFILLS: &str = "/admin/refills";
const ROUTE_DB_SNAPSHOT: &str = "/admin/database-snapshot";

#[derive(Debug, Clone)]
pub struct HttpPharmacyClient {
    http: HttpClient,
    base_url: String,
}

impl HttpPharmacyClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ClientError> {
        let http = HttpClient::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::Transport(e.to_string()))?;
        let base_url: String = base_url.into();

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self, ClientError> {
        Self::new(config.base_url.as_str(), config.request_timeout)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, route: &str) -> String {
        format!("{}{}", self.base_url, route)
    }

    async fn post_auth<B: Serialize + ?Sized>(
        &self,
        route: &str,
        body: &B
    ) -> Result<User, ClientError> {
        let resp = self.http.post(self.endpoint(route)).json(body).send().await?;
        let resp = ensure_success(resp).await?;
        let auth = resp.json::<AuthResponse>().await?;
        Ok(auth.user)
    }

    async fn fetch_list<T: DeserializeOwned>(
        &self,
        route: &str,
        query: &[(&str, &str)]
    ) -> Result<Vec<T>, ClientError> {
        let resp = self.http.get(self.endpoint(route)).query(query).send().await?;
        let resp = ensure_success(resp).await?;
        let body = resp.json::<JsonValue>().await?;
        match body {
            JsonValue::Array(_) => Ok(serde_json::from_value(body)?),
            other =>
                Err(ClientError::NotASequence {
                    endpoint: route.to_string(),
                    found: json_kind(&other),
                }),
        }
    }
}

/// Turns a non-2xx response into `ClientError::Status`, keeping the
/// server's `detail` message when the body has one.
async fn ensure_success(resp: Response) -> Result<Response, ClientError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    let detail = serde_json
        ::from_str::<ErrorDetail>(&body)
        .ok()
        .and_then(|d| d.detail);
    debug!("Request failed with status {}: {}", status, body);
    Err(ClientError::Status { status: status.as_u16(), detail })
}

fn json_kind(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "a boolean",
        JsonValue::Number(_) => "a number",
        JsonValue::String(_) => "a string",
        JsonValue::Array(_) => "an array",
        JsonValue::Object(_) => "an object",
    }
}

#[async_trait]
impl PharmacyClient for HttpPharmacyClient {
    async fn login(&self, username: &str, password: &str) -> Result<User, ClientError> {
        let req = LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        };
        self.post_auth(ROUTE_LOGIN, &req).await
    }

    async fn register(
        &self,
        username: &str,
        password: &str,
        email: &str
    ) -> Result<User, ClientError> {
        let req = RegisterRequest {
            username: username.to_string(),
            password: password.to_string(),
            email: email.to_string(),
        };
        self.post_auth(ROUTE_REGISTER, &req).await
    }

    async fn send_order(&self, request: &ChatOrderRequest) -> Result<ChatOrderResponse, ClientError> {
        let resp = self.http.post(self.endpoint(ROUTE_CHAT_ORDER)).json(request).send().await?;
        let status = resp.status();
        if !status.is_success() {
            warn!("Chat order answered with status {}", status);
        }
        // Error bodies are still JSON objects and are rendered like any reply.
        let reply = resp.json::<ChatOrderResponse>().await?;
        Ok(reply)
    }

    async fn fetch_orders(&self, patient_id: &str) -> Result<Vec<Order>, ClientError> {
        self.fetch_list(ROUTE_ORDERS, &[("patient_id", patient_id)]).await
    }

    async fn fetch_traces(&self, patient_id: &str) -> Result<Vec<Trace>, ClientError> {
        self.fetch_list(ROUTE_TRACES, &[("patient_id", patient_id)]).await
    }

    async fn fetch_low_stock(&self) -> Result<Vec<InventoryItem>, ClientError> {
        self.fetch_list(ROUTE_LOW_STOCK, &[]).await
    }

    async fn fetch_refill_alerts(&self, patient_id: &str) -> Result<Vec<RefillAlert>, ClientError> {
        self.fetch_list(ROUTE_REFILLS, &[("patient_id", patient_id)]).await
    }

    async fn update_email(&self, username: &str, email: &str) -> Result<(), ClientError> {
        let req = UpdateEmailRequest {
            username: username.to_string(),
            email: email.to_string(),
        };
        let resp = self.http.post(self.endpoint(ROUTE_UPDATE_EMAIL)).json(&req).send().await?;
        ensure_success(resp).await?;
        Ok(())
    }

    async fn fetch_database_snapshot(&self) -> Result<DatabaseSnapshot, ClientError> {
        let resp = self.http.get(self.endpoint(ROUTE_DB_SNAPSHOT)).send().await?;
        let resp = ensure_success(resp).await?;
        Ok(resp.json::<DatabaseSnapshot>().await?)
    }

    async fn check_health(&self) -> Result<HealthStatus, ClientError> {
        let resp = self.http.get(self.endpoint(ROUTE_HEALTH)).send().await?;
        let resp = ensure_success(resp).await?;
        Ok(resp.json::<HealthStatus>().await?)
    }
}

use chrono::{ DateTime, NaiveDateTime, Utc };
use serde::{ Serialize, Deserialize };
use serde_json::Value as JsonValue;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One entry of the conversation timeline. Never edited after it is appended.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub traces: Vec<Trace>,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: content.into(), traces: Vec::new() }
    }

    pub fn assistant(content: impl Into<String>, traces: Vec<Trace>) -> Self {
        Self { role: Role::Assistant, content: content.into(), traces }
    }
}

/// A reasoning step recorded by one of the backend agents.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Trace {
    #[serde(rename = "_id", default)]
    pub id: String,
    #[serde(default)]
    pub agent_name: String,
    #[serde(default)]
    pub reasoning: String,
    #[serde(default)]
    pub decision: String,
    #[serde(default)]
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<JsonValue>,
}

impl Trace {
    /// The backend writes naive UTC timestamps; RFC 3339 is accepted too.
    pub fn recorded_at(&self) -> Option<DateTime<Utc>> {
        if let Ok(ts) = DateTime::parse_from_rfc3339(&self.timestamp) {
            return Some(ts.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(&self.timestamp, "%Y-%m-%dT%H:%M:%S%.f")
            .ok()
            .map(|naive| naive.and_utc())
    }

    /// Last six characters of the id, upper-cased, as shown in the traces view.
    pub fn short_id(&self) -> String {
        let chars: Vec<char> = self.id.chars().collect();
        let start = chars.len().saturating_sub(6);
        chars[start..].iter().collect::<String>().to_uppercase()
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct ChatOrderRequest {
    pub patient_id: String,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prescription_data: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct OrderAction {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub order_id: Option<String>,
}

/// Reply of `POST /chat-order`. Every field is optional on the wire.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct ChatOrderResponse {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub response: Option<String>,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub action: Option<OrderAction>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub traces: Vec<Trace>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub refill_alerts: Vec<super::dashboard::RefillAlert>,
}

pub const ORDER_PROCESSED_STATUS: &str = "Order Processed";

impl ChatOrderResponse {
    pub fn order_processed(&self) -> bool {
        self.success.unwrap_or(false) &&
            self.action
                .as_ref()
                .and_then(|a| a.status.as_deref())
                .map_or(false, |status| status == ORDER_PROCESSED_STATUS)
    }
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
    where D: serde::Deserializer<'de>, T: Deserialize<'de>
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

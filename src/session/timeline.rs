//! Append-only conversation timeline and the reducer that grows it.

use crate::models::chat::{ ChatMessage, ChatOrderResponse };

pub const WELCOME_MESSAGE: &str =
    "👋 Welcome to RxGenie AI. I'm your premium digital pharmacist. How can I assist you with your health today?";
pub const FALLBACK_REPLY: &str = "I've processed your request.";
pub const CONFIRMATION_SUFFIX: &str = "\n\n✅ Order confirmed and saved to your records!";
pub const REFILL_REMINDER_PREFIX: &str = "\n🔔 Refill reminder: ";
pub const DEFAULT_REFILL_REASON: &str = "Check your stock soon.";
pub const CONNECTION_APOLOGY: &str =
    "I'm having trouble connecting to the medical nexus. Please try again.";

#[derive(Debug, Clone)]
pub enum TimelineEvent {
    UserSubmitted(String),
    OrderReplied(ChatOrderResponse),
    OrderFailed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Timeline {
    messages: Vec<ChatMessage>,
}

impl Timeline {
    /// A fresh conversation, opened by the assistant's greeting.
    pub fn new() -> Self {
        Self { messages: vec![ChatMessage::assistant(WELCOME_MESSAGE, Vec::new())] }
    }

    pub fn empty() -> Self {
        Self { messages: Vec::new() }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }
}

impl Default for Timeline {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies one event. Each event appends exactly one message; earlier
/// entries are never touched.
pub fn reduce(mut timeline: Timeline, event: TimelineEvent) -> Timeline {
    let message = match event {
        TimelineEvent::UserSubmitted(text) => ChatMessage::user(text),
        TimelineEvent::OrderReplied(reply) => {
            let content = compose_reply(&reply);
            ChatMessage::assistant(content, reply.traces)
        }
        TimelineEvent::OrderFailed => ChatMessage::assistant(CONNECTION_APOLOGY, Vec::new()),
    };
    timeline.messages.push(message);
    timeline
}

/// Display text for a chat-order reply: `message`, else `response`, else
/// `reason`, else the fallback, plus the confirmation and refill suffixes
/// when the order went through.
pub fn compose_reply(reply: &ChatOrderResponse) -> String {
    let mut content = [&reply.message, &reply.response, &reply.reason]
        .into_iter()
        .filter_map(|field| field.as_deref())
        .find(|text| !text.is_empty())
        .unwrap_or(FALLBACK_REPLY)
        .to_string();

    if reply.order_processed() {
        content.push_str(CONFIRMATION_SUFFIX);
        // Only the first alert is quoted.
        if let Some(alert) = reply.refill_alerts.first() {
            content.push_str(REFILL_REMINDER_PREFIX);
            content.push_str(
                alert.reason.as_deref().filter(|r| !r.is_empty()).unwrap_or(DEFAULT_REFILL_REASON)
            );
        }
    }
    content
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn reply(body: serde_json::Value) -> ChatOrderResponse {
        serde_json::from_value(body).unwrap()
    }

    #[test]
    fn picks_first_non_empty_field() {
        assert_eq!(compose_reply(&reply(json!({ "message": "m", "response": "r" }))), "m");
        assert_eq!(compose_reply(&reply(json!({ "message": "", "response": "r" }))), "r");
        assert_eq!(compose_reply(&reply(json!({ "reason": "why" }))), "why");
        assert_eq!(compose_reply(&reply(json!({ "detail": "boom" }))), FALLBACK_REPLY);
    }

    #[test]
    fn processed_order_gets_confirmation() {
        let content = compose_reply(&reply(json!({
            "message": "Order placed",
            "success": true,
            "action": { "status": "Order Processed" }
        })));
        assert_eq!(content, format!("Order placed{}", CONFIRMATION_SUFFIX));
    }

    #[test]
    fn refill_reminder_quotes_first_alert_only() {
        let content = compose_reply(&reply(json!({
            "message": "Done",
            "success": true,
            "action": { "status": "Order Processed" },
            "refill_alerts": [{ "reason": "low stock" }, { "reason": "second" }]
        })));
        assert!(content.contains(CONFIRMATION_SUFFIX));
        assert!(content.ends_with("🔔 Refill reminder: low stock"));
        assert!(!content.contains("second"));
    }

    #[test]
    fn reasonless_alert_uses_default_line() {
        let content = compose_reply(&reply(json!({
            "success": true,
            "action": { "status": "Order Processed" },
            "refill_alerts": [{ "medicine": "Ibuprofen" }]
        })));
        assert!(content.starts_with(FALLBACK_REPLY));
        assert!(content.ends_with(DEFAULT_REFILL_REASON));
    }

    #[test]
    fn unsuccessful_reply_has_no_suffixes() {
        let content = compose_reply(&reply(json!({
            "message": "Needs a prescription",
            "success": false,
            "action": { "status": "Order Processed" },
            "refill_alerts": [{ "reason": "low stock" }]
        })));
        assert_eq!(content, "Needs a prescription");
    }

    #[test]
    fn reduce_only_appends() {
        let start = Timeline::new();
        let first = start.messages()[0].clone();

        let timeline = reduce(start, TimelineEvent::UserSubmitted("I need paracetamol".into()));
        let timeline = reduce(timeline, TimelineEvent::OrderReplied(reply(json!({
            "message": "Order placed",
            "traces": [{ "_id": "t1", "agent_name": "Ordering Agent" }]
        }))));
        let timeline = reduce(timeline, TimelineEvent::OrderFailed);

        assert_eq!(timeline.len(), 4);
        assert_eq!(timeline.messages()[0], first);
        assert_eq!(timeline.messages()[1], ChatMessage::user("I need paracetamol"));
        assert_eq!(timeline.messages()[2].traces.len(), 1);
        assert_eq!(timeline.last().unwrap().content, CONNECTION_APOLOGY);
    }
}

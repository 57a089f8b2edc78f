use crate::models::chat::{ ChatMessage, Role, Trace };
use crate::models::dashboard::{ DashboardSnapshot, DatabaseSnapshot, InventoryItem, Order };
use crate::session::{ SessionEvent, Tab };

pub fn message(message: &ChatMessage) -> String {
    match message.role {
        Role::User => format!("you> {}", message.content),
        Role::Assistant if message.traces.is_empty() => format!("rxgenie> {}", message.content),
        Role::Assistant =>
            format!(
                "rxgenie> {}\n         ({} reasoning steps, see /tab traces)",
                message.content,
                message.traces.len()
            ),
    }
}

fn trace(trace: &Trace) -> String {
    let when = trace
        .recorded_at()
        .map(|t| t.format("%H:%M:%S").to_string())
        .unwrap_or_else(|| trace.timestamp.clone());
    let mut line = format!(
        "  [{}] {} {}: {}\n      {}",
        trace.short_id(),
        when,
        trace.agent_name,
        trace.decision,
        trace.reasoning
    );
    if let Some(output) = &trace.output {
        line.push_str(&format!("\n      output: {}", output));
    }
    line
}

fn order(order: &Order) -> String {
    format!(
        "  {} x{} | {:.2} | {} | {}",
        order.product_name(),
        order.quantity.unwrap_or(1.0),
        order.total_price.unwrap_or_default(),
        order.dosage(),
        order.purchase_date.as_deref().unwrap_or("-")
    )
}

fn low_stock(item: &InventoryItem) -> String {
    let stock = item.stock.map_or_else(|| "?".to_string(), |s| s.to_string());
    format!("  {} ({} left)", item.name.as_deref().unwrap_or("Unknown product"), stock)
}

pub fn dashboard(snapshot: &DashboardSnapshot) -> String {
    let mut out = vec![format!("Orders ({})", snapshot.orders.len())];
    out.extend(snapshot.orders.iter().map(order));

    out.push(format!("Refill alerts ({})", snapshot.refill_alerts.len()));
    for (i, alert) in snapshot.refill_alerts.iter().enumerate() {
        let days = alert.days_remaining.map_or_else(|| "?".to_string(), |d| d.to_string());
        out.push(
            format!(
                "  {}. {} | {} days | {}   (/refill {})",
                i + 1,
                alert.medicine.as_deref().unwrap_or("Unknown medicine"),
                days,
                alert.reason.as_deref().unwrap_or(""),
                i + 1
            )
        );
    }

    out.push(format!("Low stock ({})", snapshot.low_stock.len()));
    out.extend(snapshot.low_stock.iter().map(low_stock));
    out.join("\n")
}

pub fn traces(snapshot: &DashboardSnapshot) -> String {
    let mut out = vec![format!("Reasoning traces ({})", snapshot.traces.len())];
    out.extend(snapshot.traces.iter().map(trace));
    out.join("\n")
}

pub fn database(snapshot: &DatabaseSnapshot) -> String {
    let docs = |docs: &[serde_json::Value]| {
        docs.iter()
            .map(|d| format!("  {}", d))
            .collect::<Vec<_>>()
            .join("\n")
    };
    format!(
        "orders ({})\n{}\ninventory ({})\n{}",
        snapshot.orders.len(),
        docs(&snapshot.orders),
        snapshot.inventory.len(),
        docs(&snapshot.inventory)
    )
}

/// Text for one controller event, given the tab on screen.
pub fn event(event: &SessionEvent, tab: Tab) -> Option<String> {
    match event {
        SessionEvent::SessionStarted(session) => {
            let email = session.display_email.as_deref().unwrap_or("no email on file");
            Some(format!("Signed in as {} ({}, {})", session.username, session.user_id, email))
        }
        SessionEvent::SessionEnded => Some("Signed out.".to_string()),
        SessionEvent::MessageAppended(m) => Some(message(m)),
        SessionEvent::PendingChanged(true) => Some("rxgenie is typing...".to_string()),
        SessionEvent::PendingChanged(false) => None,
        SessionEvent::DashboardUpdated(snapshot) =>
            match tab {
                Tab::Dashboard => Some(dashboard(snapshot)),
                Tab::Traces => Some(traces(snapshot)),
                _ => None,
            }
        SessionEvent::DatabaseUpdated(snapshot) if tab == Tab::Database => Some(database(snapshot)),
        SessionEvent::DatabaseUpdated(_) => None,
        SessionEvent::ViewChanged(_) => None,
        SessionEvent::Notice(text) => Some(format!("! {}", text)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::dashboard::RefillAlert;

    #[test]
    fn assistant_message_mentions_traces() {
        let trace: Trace = serde_json::from_value(
            serde_json::json!({
            "_id": "abc123def456", "agent_name": "Pharmacist",
            "reasoning": "r", "decision": "d", "timestamp": "2024-01-01T10:00:00"
        })
        ).unwrap();
        let text = message(&ChatMessage::assistant("Done", vec![trace]));
        assert!(text.starts_with("rxgenie> Done"));
        assert!(text.contains("1 reasoning steps"));
    }

    #[test]
    fn dashboard_numbers_refill_alerts() {
        let snapshot = DashboardSnapshot {
            refill_alerts: vec![RefillAlert {
                medicine: Some("Metformin".into()),
                days_remaining: Some(3.0),
                reason: Some("Running low".into()),
            }],
            ..Default::default()
        };
        let text = dashboard(&snapshot);
        assert!(text.contains("1. Metformin | 3 days | Running low"));
        assert!(text.contains("(/refill 1)"));
    }

    #[test]
    fn fractional_quantity_renders_plainly() {
        let order: Order = serde_json::from_value(
            serde_json::json!({ "product": { "name": "Paracetamol" }, "quantity": 2.0, "total_price": 5 })
        ).unwrap();
        assert_eq!(super::order(&order), "  Paracetamol x2 | 5.00 | As directed | -");
    }

    #[test]
    fn dashboard_updates_only_show_on_their_tabs() {
        let update = SessionEvent::DashboardUpdated(DashboardSnapshot::default());
        assert!(event(&update, Tab::Consultation).is_none());
        assert!(event(&update, Tab::Dashboard).unwrap().starts_with("Orders (0)"));
        assert!(event(&update, Tab::Traces).unwrap().starts_with("Reasoning traces (0)"));
    }
}

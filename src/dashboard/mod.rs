use log::{ info, warn };
use std::future::Future;
use std::sync::Arc;

use crate::client::{ ClientError, PharmacyClient };
use crate::models::dashboard::DashboardSnapshot;

/// Awaits one fallible collection fetch and degrades any failure to an
/// empty collection. The failure is logged, never returned.
pub async fn fetch_or_empty<T, F>(label: &str, fetch: F) -> Vec<T>
    where F: Future<Output = Result<Vec<T>, ClientError>>
{
    match fetch.await {
        Ok(items) => items,
        Err(e) => {
            warn!("Dashboard {} unavailable, showing none: {}", label, e);
            Vec::new()
        }
    }
}

/// Rebuilds the per-patient dashboard collections from the backend.
#[derive(Clone)]
pub struct DashboardSynchronizer {
    client: Arc<dyn PharmacyClient>,
}

impl DashboardSynchronizer {
    pub fn new(client: Arc<dyn PharmacyClient>) -> Self {
        Self { client }
    }

    /// Runs the four fetches concurrently. Never fails: each collection
    /// that could not be fetched comes back empty.
    pub async fn refresh(&self, user_id: &str) -> DashboardSnapshot {
        let client = &self.client;
        let (orders, traces, low_stock, refill_alerts) = tokio::join!(
            fetch_or_empty("orders", client.fetch_orders(user_id)),
            fetch_or_empty("traces", client.fetch_traces(user_id)),
            fetch_or_empty("low-stock", client.fetch_low_stock()),
            fetch_or_empty("refill alerts", client.fetch_refill_alerts(user_id))
        );

        info!(
            "Dashboard refreshed for {}: {} orders, {} traces, {} low-stock, {} refill alerts",
            user_id,
            orders.len(),
            traces.len(),
            low_stock.len(),
            refill_alerts.len()
        );

        DashboardSnapshot { orders, traces, low_stock, refill_alerts }
    }
}

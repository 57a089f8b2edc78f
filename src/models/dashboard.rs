use serde::{ Serialize, Deserialize };
use serde_json::Value as JsonValue;

use super::chat::Trace;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderPatient {
    #[serde(default)]
    pub id: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderProduct {
    #[serde(default)]
    pub product_id: Option<JsonValue>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub price: Option<JsonValue>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Order {
    #[serde(rename = "_id", default)]
    pub id: Option<String>,
    #[serde(default)]
    pub patient: Option<OrderPatient>,
    #[serde(default)]
    pub product: Option<OrderProduct>,
    #[serde(default)]
    pub quantity: Option<f64>,
    #[serde(default)]
    pub total_price: Option<f64>,
    #[serde(default)]
    pub dosage_frequency: Option<String>,
    #[serde(default)]
    pub purchase_date: Option<String>,
}

impl Order {
    pub fn product_name(&self) -> &str {
        self.product
            .as_ref()
            .and_then(|p| p.name.as_deref())
            .unwrap_or("Unknown product")
    }

    pub fn dosage(&self) -> &str {
        self.dosage_frequency.as_deref().filter(|d| !d.is_empty()).unwrap_or("As directed")
    }
}

/// Inventory document as stored by the backend (keys contain spaces).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct InventoryItem {
    #[serde(rename = "_id", default)]
    pub id: Option<String>,
    #[serde(rename = "product id", default)]
    pub product_id: Option<JsonValue>,
    #[serde(rename = "product name", default)]
    pub name: Option<String>,
    #[serde(rename = "price rec", default)]
    pub price: Option<JsonValue>,
    #[serde(default)]
    pub stock: Option<f64>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RefillAlert {
    #[serde(default)]
    pub medicine: Option<String>,
    #[serde(rename = "days", default)]
    pub days_remaining: Option<f64>,
    #[serde(default)]
    pub reason: Option<String>,
}

impl RefillAlert {
    pub fn refill_request(&self) -> String {
        format!("I need a refill for {}", self.medicine.as_deref().unwrap_or("my medicine"))
    }
}

/// Latest copy of the per-patient collections. Replaced whole on refresh.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DashboardSnapshot {
    pub orders: Vec<Order>,
    pub traces: Vec<Trace>,
    pub low_stock: Vec<InventoryItem>,
    pub refill_alerts: Vec<RefillAlert>,
}

/// Raw documents for the database viewer.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DatabaseSnapshot {
    #[serde(default)]
    pub orders: Vec<JsonValue>,
    #[serde(default)]
    pub inventory: Vec<JsonValue>,
}

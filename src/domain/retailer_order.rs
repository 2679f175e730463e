use serde::{Deserialize, Serialize};

/// Raw email handed to the order parsers.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct EmailMessage {
    #[serde(default)]
    pub message_id: Option<String>,
    pub sender: String,
    pub subject: String,
    pub html: String,
}

/// Line item of a retailer order confirmation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OrderItem {
    /// Retailer product code, matched against a lead's `unique_id`.
    pub unique_id: String,
    pub size: String,
    pub quantity: i32,
    pub product_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ParsedOrder {
    pub retailer: String,
    pub order_number: String,
    pub items: Vec<OrderItem>,
}

/// Line of a warehouse inbound notification.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InboundItem {
    pub item_name: String,
    pub asin: String,
    pub size: Option<String>,
    /// Negative for items removed from the shipment.
    pub quantity: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InboundShipment {
    pub order_number: String,
    pub items: Vec<InboundItem>,
}

/// Result of turning one order email into purchases.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct OrderProcessingResult {
    pub success: bool,
    pub retailer: Option<String>,
    pub order_number: Option<String>,
    pub items_count: usize,
    pub created: usize,
    pub skipped: usize,
    pub duplicate: bool,
    pub error: Option<String>,
}

impl OrderProcessingResult {
    pub fn failed(order: Option<&ParsedOrder>, error: impl Into<String>) -> Self {
        Self {
            success: false,
            retailer: order.map(|o| o.retailer.clone()),
            order_number: order.map(|o| o.order_number.clone()),
            items_count: order.map(|o| o.items.len()).unwrap_or_default(),
            error: Some(error.into()),
            ..Self::default()
        }
    }

    pub fn duplicate(order: &ParsedOrder) -> Self {
        Self {
            success: true,
            retailer: Some(order.retailer.clone()),
            order_number: Some(order.order_number.clone()),
            items_count: order.items.len(),
            duplicate: true,
            ..Self::default()
        }
    }
}

/// Result of turning one inbound email into check-ins.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct InboundProcessingResult {
    pub order_number: String,
    pub items_count: usize,
    pub created: usize,
    /// Lines already checked in by an earlier email or repeated in this one.
    pub skipped: usize,
    pub asins_created: usize,
}

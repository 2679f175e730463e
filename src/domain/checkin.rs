use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::pagination::PageRequest;

/// Lead identifier given to ASIN bank rows created by a check-in without an order.
pub const CHECKIN_LEAD_ID: &str = "CHECKIN";

/// Items of an order received at the warehouse.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Checkin {
    pub id: i32,
    pub order_number: Option<String>,
    pub item_name: Option<String>,
    pub asin_bank_id: Option<i32>,
    /// Resolved from the ASIN bank row, when it still exists.
    pub asin: Option<String>,
    pub size: Option<String>,
    pub quantity: i32,
    pub checked_in_at: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCheckin {
    pub order_number: Option<String>,
    pub item_name: Option<String>,
    pub asin_bank_id: Option<i32>,
    pub quantity: i32,
    pub checked_in_at: NaiveDateTime,
}

impl NewCheckin {
    pub fn new(order_number: impl Into<String>, quantity: i32, checked_in_at: NaiveDateTime) -> Self {
        Self {
            order_number: Some(order_number.into()),
            item_name: None,
            asin_bank_id: None,
            quantity,
            checked_in_at,
        }
    }

    pub fn with_item_name(mut self, item_name: impl Into<String>) -> Self {
        self.item_name = Some(item_name.into());
        self
    }

    pub fn with_asin(mut self, asin_bank_id: i32) -> Self {
        self.asin_bank_id = Some(asin_bank_id);
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateCheckin {
    pub order_number: Option<String>,
    pub item_name: Option<String>,
    pub asin_bank_id: Option<i32>,
    pub quantity: Option<i32>,
    pub checked_in_at: Option<NaiveDateTime>,
}

impl UpdateCheckin {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// Filters accepted when listing check-ins.
#[derive(Debug, Clone, Default)]
pub struct CheckinListQuery {
    /// Order number fragment.
    pub order_number: Option<String>,
    /// ASIN fragment, matched through the ASIN bank.
    pub asin: Option<String>,
    /// First day included.
    pub start_date: Option<NaiveDate>,
    /// Last day included.
    pub end_date: Option<NaiveDate>,
    pub pagination: Option<PageRequest>,
}

impl CheckinListQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn order_number(mut self, order_number: impl Into<String>) -> Self {
        self.order_number = Some(order_number.into());
        self
    }

    pub fn asin(mut self, asin: impl Into<String>) -> Self {
        self.asin = Some(asin.into());
        self
    }

    pub fn between(mut self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        self.start_date = start;
        self.end_date = end;
        self
    }

    pub fn paginate(mut self, page: PageRequest) -> Self {
        self.pagination = Some(page);
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OrderCheckinTotal {
    pub order_number: String,
    pub total_quantity: i64,
    pub checkin_count: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CheckinSummary {
    pub total_checkins: i64,
    pub total_quantity_checked_in: i64,
    pub checkins_today: i64,
    /// Ten orders with the most units checked in.
    pub top_orders: Vec<OrderCheckinTotal>,
}

/// Counts from recording one inbound shipment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InboundRecord {
    pub created: usize,
    /// Lines already checked in for the order.
    pub skipped: usize,
    pub asins_created: usize,
}

/// Every check-in of one order, newest first.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OrderCheckins {
    pub order_number: String,
    pub total_quantity: i64,
    pub checkin_count: usize,
    pub checkins: Vec<Checkin>,
}

impl OrderCheckins {
    pub fn new(order_number: impl Into<String>, checkins: Vec<Checkin>) -> Self {
        Self {
            order_number: order_number.into(),
            total_quantity: checkins.iter().map(|c| i64::from(c.quantity)).sum(),
            checkin_count: checkins.len(),
            checkins,
        }
    }
}

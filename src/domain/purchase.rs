use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::asin_bank::AsinBankEntry;
use crate::pagination::PageRequest;

/// Platform recorded for purchases placed to restock Amazon inventory.
pub const DEFAULT_PLATFORM: &str = "AMZ";

/// Status of a purchase created from an order confirmation.
pub const STATUS_ORDERED: &str = "Ordered";

/// A purchase placed against a lead, with the lead and ASIN it resolves to.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Purchase {
    pub id: i32,
    pub oa_sourcing_id: i32,
    pub asin_bank_id: Option<i32>,
    pub lead_id: Option<String>,
    pub purchase_date: Option<NaiveDate>,
    pub platform: Option<String>,
    pub order_number: Option<String>,
    pub og_qty: Option<i32>,
    pub final_qty: Option<i32>,
    /// Selling price when it differs from the lead's planned price.
    pub rsp: Option<f64>,
    pub address: Option<String>,
    /// Fulfilment stage markers: ordinal numbers, not flags.
    pub shipped_to_pw: Option<i32>,
    pub arrived: Option<i32>,
    pub checked_in: Option<i32>,
    pub shipped_out: Option<i32>,
    pub delivery_date: Option<NaiveDate>,
    pub status: Option<String>,
    pub location: Option<String>,
    pub in_bound: Option<bool>,
    pub tracking: Option<String>,
    pub outbound_name: Option<String>,
    pub fba_shipment: Option<String>,
    pub fba_msku: Option<String>,
    pub audited: bool,
    pub cancelled_qty: Option<i32>,
    pub amt_of_cancelled_qty_credit_card: Option<f64>,
    pub amt_of_cancelled_qty_gift_card: Option<f64>,
    pub expected_refund_amount: Option<f64>,
    pub amount_refunded: Option<f64>,
    pub refund_status: Option<String>,
    pub refund_method: Option<String>,
    pub date_of_refund: Option<NaiveDate>,
    pub notes: Option<String>,
    pub lead: Option<PurchaseLead>,
    pub asin: Option<AsinBankEntry>,
}

/// Lead columns a purchase reads through its foreign key.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct PurchaseLead {
    pub product_name: Option<String>,
    pub product_sku: Option<String>,
    pub submitted_by: Option<String>,
    pub ppu: Option<f64>,
    pub rsp: Option<f64>,
    pub retailer_name: Option<String>,
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

impl Purchase {
    /// Planned price per unit, taken from the lead.
    pub fn ppu(&self) -> Option<f64> {
        self.lead.as_ref().and_then(|lead| lead.ppu)
    }

    /// Selling price of this purchase, falling back to the lead's.
    pub fn effective_rsp(&self) -> Option<f64> {
        self.rsp
            .filter(|rsp| *rsp != 0.0)
            .or_else(|| self.lead.as_ref().and_then(|lead| lead.rsp))
    }

    fn quantity(&self) -> Option<f64> {
        self.final_qty.filter(|qty| *qty != 0).map(f64::from)
    }

    /// `ppu * final_qty`, or zero when either is missing.
    pub fn total_spend(&self) -> f64 {
        match (self.ppu().filter(|ppu| *ppu != 0.0), self.quantity()) {
            (Some(ppu), Some(qty)) => round2(ppu * qty),
            _ => 0.0,
        }
    }

    /// `(rsp - ppu) * final_qty`, or zero when any input is missing.
    pub fn profit(&self) -> f64 {
        match (
            self.effective_rsp(),
            self.ppu().filter(|ppu| *ppu != 0.0),
            self.quantity(),
        ) {
            (Some(rsp), Some(ppu), Some(qty)) => round2((rsp - ppu) * qty),
            _ => 0.0,
        }
    }

    /// Margin over the selling price in percent.
    pub fn margin_percent(&self) -> f64 {
        match (self.effective_rsp(), self.ppu().filter(|ppu| *ppu != 0.0)) {
            (Some(rsp), Some(ppu)) if rsp > 0.0 => round2((rsp - ppu) / rsp * 100.0),
            _ => 0.0,
        }
    }

    pub fn supplier(&self) -> Option<&str> {
        self.lead
            .as_ref()
            .and_then(|lead| lead.retailer_name.as_deref())
    }
}

/// Payload required to insert a purchase.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NewPurchase {
    pub oa_sourcing_id: i32,
    pub asin_bank_id: Option<i32>,
    pub lead_id: Option<String>,
    pub purchase_date: Option<NaiveDate>,
    pub platform: Option<String>,
    pub order_number: Option<String>,
    pub og_qty: Option<i32>,
    pub final_qty: Option<i32>,
    pub rsp: Option<f64>,
    pub status: Option<String>,
    pub fba_msku: Option<String>,
    pub audited: bool,
}

impl NewPurchase {
    /// Purchase of `quantity` units placed on `order_number` for a lead.
    pub fn ordered(
        oa_sourcing_id: i32,
        lead_id: impl Into<String>,
        order_number: impl Into<String>,
        quantity: i32,
        purchase_date: NaiveDate,
    ) -> Self {
        Self {
            oa_sourcing_id,
            lead_id: Some(lead_id.into()),
            order_number: Some(order_number.into()),
            og_qty: Some(quantity),
            final_qty: Some(quantity),
            purchase_date: Some(purchase_date),
            platform: Some(DEFAULT_PLATFORM.to_string()),
            status: Some(STATUS_ORDERED.to_string()),
            ..Self::default()
        }
    }

    pub fn with_asin(mut self, asin_bank_id: i32) -> Self {
        self.asin_bank_id = Some(asin_bank_id);
        self
    }

    pub fn with_rsp(mut self, rsp: Option<f64>) -> Self {
        self.rsp = rsp;
        self
    }

    pub fn with_msku(mut self, fba_msku: impl Into<String>) -> Self {
        self.fba_msku = Some(fba_msku.into());
        self
    }
}

/// Fulfilment and refund fields that can be patched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdatePurchase {
    pub final_qty: Option<i32>,
    pub rsp: Option<f64>,
    pub address: Option<String>,
    pub shipped_to_pw: Option<i32>,
    pub arrived: Option<i32>,
    pub checked_in: Option<i32>,
    pub shipped_out: Option<i32>,
    pub delivery_date: Option<NaiveDate>,
    pub status: Option<String>,
    pub location: Option<String>,
    pub in_bound: Option<bool>,
    pub tracking: Option<String>,
    pub outbound_name: Option<String>,
    pub fba_shipment: Option<String>,
    pub fba_msku: Option<String>,
    pub audited: Option<bool>,
    pub cancelled_qty: Option<i32>,
    pub amt_of_cancelled_qty_credit_card: Option<f64>,
    pub amt_of_cancelled_qty_gift_card: Option<f64>,
    pub expected_refund_amount: Option<f64>,
    pub amount_refunded: Option<f64>,
    pub refund_status: Option<String>,
    pub refund_method: Option<String>,
    pub date_of_refund: Option<NaiveDate>,
    pub notes: Option<String>,
}

impl UpdatePurchase {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// Filters accepted when listing purchases.
#[derive(Debug, Clone, Default)]
pub struct PurchaseListQuery {
    /// Platform fragment.
    pub platform: Option<String>,
    /// Exact status.
    pub status: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    /// Exact lead identifier.
    pub lead_id: Option<String>,
    pub pagination: Option<PageRequest>,
}

impl PurchaseListQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn platform(mut self, platform: impl Into<String>) -> Self {
        self.platform = Some(platform.into());
        self
    }

    pub fn status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    pub fn between(mut self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        self.start_date = start;
        self.end_date = end;
        self
    }

    pub fn lead_id(mut self, lead_id: impl Into<String>) -> Self {
        self.lead_id = Some(lead_id.into());
        self
    }

    pub fn paginate(mut self, page: PageRequest) -> Self {
        self.pagination = Some(page);
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlatformCount {
    pub platform: String,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BrandCount {
    pub brand: String,
    pub count: i64,
}

/// Totals shown on the purchase tracker dashboard.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct PurchaseStatistics {
    pub total_leads: i64,
    pub total_purchases: i64,
    pub total_asins_in_bank: i64,
    pub total_spend: f64,
    pub average_ppu: f64,
    pub top_platforms: Vec<PlatformCount>,
    pub top_brands: Vec<BrandCount>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn purchase(ppu: Option<f64>, lead_rsp: Option<f64>, rsp: Option<f64>, qty: i32) -> Purchase {
        Purchase {
            final_qty: Some(qty),
            rsp,
            lead: Some(PurchaseLead {
                ppu,
                rsp: lead_rsp,
                retailer_name: Some("Foot Locker".to_string()),
                ..PurchaseLead::default()
            }),
            ..Purchase::default()
        }
    }

    #[test]
    fn money_fields_derive_from_lead() {
        let p = purchase(Some(60.0), Some(100.0), None, 3);
        assert_eq!(p.total_spend(), 180.0);
        assert_eq!(p.profit(), 120.0);
        assert_eq!(p.margin_percent(), 40.0);
        assert_eq!(p.supplier(), Some("Foot Locker"));
    }

    #[test]
    fn purchase_rsp_overrides_lead_rsp() {
        let p = purchase(Some(60.0), Some(100.0), Some(80.0), 2);
        assert_eq!(p.profit(), 40.0);
        assert_eq!(p.margin_percent(), 25.0);
    }

    #[test]
    fn missing_inputs_yield_zero() {
        let p = purchase(None, Some(100.0), None, 2);
        assert_eq!(p.total_spend(), 0.0);
        assert_eq!(p.profit(), 0.0);
        assert_eq!(p.margin_percent(), 0.0);

        let orphan = Purchase::default();
        assert_eq!(orphan.total_spend(), 0.0);
        assert_eq!(orphan.supplier(), None);
    }

    #[test]
    fn spend_is_rounded_to_cents() {
        let p = purchase(Some(19.999), None, None, 3);
        assert_eq!(p.total_spend(), 60.0);
    }
}

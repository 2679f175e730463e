use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::pagination::PageRequest;

/// Most ASINs a single lead can carry.
pub const MAX_ASINS_PER_LEAD: usize = 15;

/// A sourcing lead ("OA sourcing" row) with its resolved ASIN slots.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Lead {
    pub id: i32,
    pub lead_id: String,
    pub submitted_at: Option<NaiveDateTime>,
    pub submitted_by: Option<String>,
    /// Initials of the submitter.
    pub sourcer: Option<String>,
    pub retailer_id: Option<i32>,
    pub retailer_name: Option<String>,
    pub product_name: Option<String>,
    pub product_sku: Option<String>,
    pub retailer_link: Option<String>,
    pub amazon_link: Option<String>,
    pub unique_id: Option<String>,
    pub purchased: Option<String>,
    pub purchase_more_if_available: Option<String>,
    pub pros: Option<String>,
    pub cons: Option<String>,
    pub other_notes_concerns: Option<String>,
    pub head_of_product_review_notes: Option<String>,
    pub feedback_and_notes_on_quantity: Option<String>,
    pub suggested_total_qty: Option<i32>,
    pub pairs_per_lead_id: Option<i32>,
    pub pairs_per_sku: Option<i32>,
    /// Price per unit including shipping.
    pub ppu: Option<f64>,
    pub rsp: Option<f64>,
    pub margin: Option<f64>,
    pub promo_code: Option<String>,
    pub sales_rank: Option<String>,
    pub asin1_buy_box: Option<f64>,
    pub asin1_new_price: Option<f64>,
    pub pick_pack_fee: Option<f64>,
    pub referral_fee: Option<f64>,
    pub total_fee: Option<f64>,
    pub margin_using_rsp: Option<f64>,
    pub monitored: Option<bool>,
    pub asins: Vec<LeadAsin>,
}

/// ASIN attached to a lead slot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LeadAsin {
    pub slot: i32,
    pub asin_bank_id: i32,
    pub asin: String,
    pub size: Option<String>,
    pub recommended_quantity: i32,
}

/// Scalar columns of a lead about to be inserted.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NewLead {
    pub lead_id: String,
    pub submitted_at: Option<NaiveDateTime>,
    pub submitted_by: Option<String>,
    pub sourcer: Option<String>,
    pub retailer_id: Option<i32>,
    pub product_name: Option<String>,
    pub product_sku: Option<String>,
    pub retailer_link: Option<String>,
    pub amazon_link: Option<String>,
    pub unique_id: Option<String>,
    pub pros: Option<String>,
    pub cons: Option<String>,
    pub other_notes_concerns: Option<String>,
    pub suggested_total_qty: Option<i32>,
    pub ppu: Option<f64>,
    pub rsp: Option<f64>,
    pub margin: Option<f64>,
    pub promo_code: Option<String>,
}

impl NewLead {
    pub fn new(lead_id: impl Into<String>) -> Self {
        Self {
            lead_id: lead_id.into(),
            ..Self::default()
        }
    }

    pub fn with_retailer(mut self, retailer_id: i32) -> Self {
        self.retailer_id = Some(retailer_id);
        self
    }
}

/// ASIN row submitted with a new lead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLeadAsin {
    pub asin: String,
    pub size: Option<String>,
    pub recommended_quantity: i32,
}

/// Outcome of persisting a lead together with its ASINs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LeadSubmission {
    pub lead_id: String,
    pub id: i32,
    pub asins_created: usize,
    pub asins_reused: usize,
    pub total_asins: usize,
    pub total_suggested_qty: i32,
}

/// Review fields that can be patched after submission.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateLead {
    pub product_name: Option<String>,
    pub retailer_link: Option<String>,
    pub amazon_link: Option<String>,
    pub unique_id: Option<String>,
    pub purchased: Option<String>,
    pub purchase_more_if_available: Option<String>,
    pub monitored: Option<bool>,
    pub pros: Option<String>,
    pub cons: Option<String>,
    pub other_notes_concerns: Option<String>,
    pub head_of_product_review_notes: Option<String>,
    pub feedback_and_notes_on_quantity: Option<String>,
    pub pairs_per_lead_id: Option<i32>,
    pub pairs_per_sku: Option<i32>,
    pub sales_rank: Option<String>,
    pub asin1_buy_box: Option<f64>,
    pub asin1_new_price: Option<f64>,
    pub pick_pack_fee: Option<f64>,
    pub referral_fee: Option<f64>,
    pub total_fee: Option<f64>,
    pub promo_code: Option<String>,
}

impl UpdateLead {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// Filters accepted when listing leads.
#[derive(Debug, Clone, Default)]
pub struct LeadListQuery {
    /// Retailer name fragment.
    pub retailer: Option<String>,
    /// Exact sourcer initials.
    pub sourcer: Option<String>,
    pub pagination: Option<PageRequest>,
}

impl LeadListQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn retailer(mut self, retailer: impl Into<String>) -> Self {
        self.retailer = Some(retailer.into());
        self
    }

    pub fn sourcer(mut self, sourcer: impl Into<String>) -> Self {
        self.sourcer = Some(sourcer.into());
        self
    }

    pub fn paginate(mut self, page: PageRequest) -> Self {
        self.pagination = Some(page);
        self
    }
}

/// Lead aggregates of one retailer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RetailerLeadStats {
    pub retailer_id: i32,
    pub retailer: String,
    pub lead_count: i64,
    pub avg_ppu: Option<f64>,
    pub avg_margin: Option<f64>,
}

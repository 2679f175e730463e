use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::lead::{
    Lead as DomainLead, NewLead as DomainNewLead, UpdateLead as DomainUpdateLead,
};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::oa_sourcing)]
pub struct Lead {
    pub id: i32,
    pub submitted_at: Option<NaiveDateTime>,
    pub submitted_by: Option<String>,
    pub lead_id: String,
    pub retailer_id: Option<i32>,
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
    pub ppu_including_ship: Option<f64>,
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
    pub sourcer: Option<String>,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::oa_sourcing)]
pub struct NewLead<'a> {
    pub submitted_at: Option<NaiveDateTime>,
    pub submitted_by: Option<&'a str>,
    pub lead_id: &'a str,
    pub retailer_id: Option<i32>,
    pub product_name: Option<&'a str>,
    pub product_sku: Option<&'a str>,
    pub retailer_link: Option<&'a str>,
    pub amazon_link: Option<&'a str>,
    pub unique_id: Option<&'a str>,
    pub pros: Option<&'a str>,
    pub cons: Option<&'a str>,
    pub other_notes_concerns: Option<&'a str>,
    pub suggested_total_qty: Option<i32>,
    pub ppu_including_ship: Option<f64>,
    pub rsp: Option<f64>,
    pub margin: Option<f64>,
    pub promo_code: Option<&'a str>,
    pub sourcer: Option<&'a str>,
}

#[derive(AsChangeset)]
#[diesel(table_name = crate::schema::oa_sourcing)]
pub struct UpdateLead<'a> {
    pub product_name: Option<&'a str>,
    pub retailer_link: Option<&'a str>,
    pub amazon_link: Option<&'a str>,
    pub unique_id: Option<&'a str>,
    pub purchased: Option<&'a str>,
    pub purchase_more_if_available: Option<&'a str>,
    pub monitored: Option<bool>,
    pub pros: Option<&'a str>,
    pub cons: Option<&'a str>,
    pub other_notes_concerns: Option<&'a str>,
    pub head_of_product_review_notes: Option<&'a str>,
    pub feedback_and_notes_on_quantity: Option<&'a str>,
    pub pairs_per_lead_id: Option<i32>,
    pub pairs_per_sku: Option<i32>,
    pub sales_rank: Option<&'a str>,
    pub asin1_buy_box: Option<f64>,
    pub asin1_new_price: Option<f64>,
    pub pick_pack_fee: Option<f64>,
    pub referral_fee: Option<f64>,
    pub total_fee: Option<f64>,
    pub promo_code: Option<&'a str>,
}

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::oa_sourcing_asins)]
pub struct LeadAsinSlot {
    pub id: i32,
    pub oa_sourcing_id: i32,
    pub slot: i32,
    pub asin_bank_id: i32,
    pub recommended_quantity: Option<i32>,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::oa_sourcing_asins)]
pub struct NewLeadAsinSlot {
    pub oa_sourcing_id: i32,
    pub slot: i32,
    pub asin_bank_id: i32,
    pub recommended_quantity: Option<i32>,
}

impl From<Lead> for DomainLead {
    fn from(value: Lead) -> Self {
        Self {
            id: value.id,
            lead_id: value.lead_id,
            submitted_at: value.submitted_at,
            submitted_by: value.submitted_by,
            sourcer: value.sourcer,
            retailer_id: value.retailer_id,
            retailer_name: None,
            product_name: value.product_name,
            product_sku: value.product_sku,
            retailer_link: value.retailer_link,
            amazon_link: value.amazon_link,
            unique_id: value.unique_id,
            purchased: value.purchased,
            purchase_more_if_available: value.purchase_more_if_available,
            pros: value.pros,
            cons: value.cons,
            other_notes_concerns: value.other_notes_concerns,
            head_of_product_review_notes: value.head_of_product_review_notes,
            feedback_and_notes_on_quantity: value.feedback_and_notes_on_quantity,
            suggested_total_qty: value.suggested_total_qty,
            pairs_per_lead_id: value.pairs_per_lead_id,
            pairs_per_sku: value.pairs_per_sku,
            ppu: value.ppu_including_ship,
            rsp: value.rsp,
            margin: value.margin,
            promo_code: value.promo_code,
            sales_rank: value.sales_rank,
            asin1_buy_box: value.asin1_buy_box,
            asin1_new_price: value.asin1_new_price,
            pick_pack_fee: value.pick_pack_fee,
            referral_fee: value.referral_fee,
            total_fee: value.total_fee,
            margin_using_rsp: value.margin_using_rsp,
            monitored: value.monitored,
            asins: Vec::new(),
        }
    }
}

impl<'a> From<&'a DomainNewLead> for NewLead<'a> {
    fn from(value: &'a DomainNewLead) -> Self {
        Self {
            submitted_at: value.submitted_at,
            submitted_by: value.submitted_by.as_deref(),
            lead_id: value.lead_id.as_str(),
            retailer_id: value.retailer_id,
            product_name: value.product_name.as_deref(),
            product_sku: value.product_sku.as_deref(),
            retailer_link: value.retailer_link.as_deref(),
            amazon_link: value.amazon_link.as_deref(),
            unique_id: value.unique_id.as_deref(),
            pros: value.pros.as_deref(),
            cons: value.cons.as_deref(),
            other_notes_concerns: value.other_notes_concerns.as_deref(),
            suggested_total_qty: value.suggested_total_qty,
            ppu_including_ship: value.ppu,
            rsp: value.rsp,
            margin: value.margin,
            promo_code: value.promo_code.as_deref(),
            sourcer: value.sourcer.as_deref(),
        }
    }
}

impl<'a> From<&'a DomainUpdateLead> for UpdateLead<'a> {
    fn from(value: &'a DomainUpdateLead) -> Self {
        Self {
            product_name: value.product_name.as_deref(),
            retailer_link: value.retailer_link.as_deref(),
            amazon_link: value.amazon_link.as_deref(),
            unique_id: value.unique_id.as_deref(),
            purchased: value.purchased.as_deref(),
            purchase_more_if_available: value.purchase_more_if_available.as_deref(),
            monitored: value.monitored,
            pros: value.pros.as_deref(),
            cons: value.cons.as_deref(),
            other_notes_concerns: value.other_notes_concerns.as_deref(),
            head_of_product_review_notes: value.head_of_product_review_notes.as_deref(),
            feedback_and_notes_on_quantity: value.feedback_and_notes_on_quantity.as_deref(),
            pairs_per_lead_id: value.pairs_per_lead_id,
            pairs_per_sku: value.pairs_per_sku,
            sales_rank: value.sales_rank.as_deref(),
            asin1_buy_box: value.asin1_buy_box,
            asin1_new_price: value.asin1_new_price,
            pick_pack_fee: value.pick_pack_fee,
            referral_fee: value.referral_fee,
            total_fee: value.total_fee,
            promo_code: value.promo_code.as_deref(),
        }
    }
}

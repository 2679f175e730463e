use chrono::NaiveDate;
use diesel::prelude::*;

use crate::domain::purchase::{
    NewPurchase as DomainNewPurchase, Purchase as DomainPurchase,
    UpdatePurchase as DomainUpdatePurchase,
};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::purchase_tracker)]
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
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::purchase_tracker)]
pub struct NewPurchase<'a> {
    pub oa_sourcing_id: i32,
    pub asin_bank_id: Option<i32>,
    pub lead_id: Option<&'a str>,
    pub purchase_date: Option<NaiveDate>,
    pub platform: Option<&'a str>,
    pub order_number: Option<&'a str>,
    pub og_qty: Option<i32>,
    pub final_qty: Option<i32>,
    pub rsp: Option<f64>,
    pub status: Option<&'a str>,
    pub fba_msku: Option<&'a str>,
    pub audited: bool,
}

#[derive(AsChangeset)]
#[diesel(table_name = crate::schema::purchase_tracker)]
pub struct UpdatePurchase<'a> {
    pub final_qty: Option<i32>,
    pub rsp: Option<f64>,
    pub address: Option<&'a str>,
    pub shipped_to_pw: Option<i32>,
    pub arrived: Option<i32>,
    pub checked_in: Option<i32>,
    pub shipped_out: Option<i32>,
    pub delivery_date: Option<NaiveDate>,
    pub status: Option<&'a str>,
    pub location: Option<&'a str>,
    pub in_bound: Option<bool>,
    pub tracking: Option<&'a str>,
    pub outbound_name: Option<&'a str>,
    pub fba_shipment: Option<&'a str>,
    pub fba_msku: Option<&'a str>,
    pub audited: Option<bool>,
    pub cancelled_qty: Option<i32>,
    pub amt_of_cancelled_qty_credit_card: Option<f64>,
    pub amt_of_cancelled_qty_gift_card: Option<f64>,
    pub expected_refund_amount: Option<f64>,
    pub amount_refunded: Option<f64>,
    pub refund_status: Option<&'a str>,
    pub refund_method: Option<&'a str>,
    pub date_of_refund: Option<NaiveDate>,
    pub notes: Option<&'a str>,
}

impl From<Purchase> for DomainPurchase {
    fn from(value: Purchase) -> Self {
        Self {
            id: value.id,
            oa_sourcing_id: value.oa_sourcing_id,
            asin_bank_id: value.asin_bank_id,
            lead_id: value.lead_id,
            purchase_date: value.purchase_date,
            platform: value.platform,
            order_number: value.order_number,
            og_qty: value.og_qty,
            final_qty: value.final_qty,
            rsp: value.rsp,
            address: value.address,
            shipped_to_pw: value.shipped_to_pw,
            arrived: value.arrived,
            checked_in: value.checked_in,
            shipped_out: value.shipped_out,
            delivery_date: value.delivery_date,
            status: value.status,
            location: value.location,
            in_bound: value.in_bound,
            tracking: value.tracking,
            outbound_name: value.outbound_name,
            fba_shipment: value.fba_shipment,
            fba_msku: value.fba_msku,
            audited: value.audited,
            cancelled_qty: value.cancelled_qty,
            amt_of_cancelled_qty_credit_card: value.amt_of_cancelled_qty_credit_card,
            amt_of_cancelled_qty_gift_card: value.amt_of_cancelled_qty_gift_card,
            expected_refund_amount: value.expected_refund_amount,
            amount_refunded: value.amount_refunded,
            refund_status: value.refund_status,
            refund_method: value.refund_method,
            date_of_refund: value.date_of_refund,
            notes: value.notes,
            lead: None,
            asin: None,
        }
    }
}

impl<'a> From<&'a DomainNewPurchase> for NewPurchase<'a> {
    fn from(value: &'a DomainNewPurchase) -> Self {
        Self {
            oa_sourcing_id: value.oa_sourcing_id,
            asin_bank_id: value.asin_bank_id,
            lead_id: value.lead_id.as_deref(),
            purchase_date: value.purchase_date,
            platform: value.platform.as_deref(),
            order_number: value.order_number.as_deref(),
            og_qty: value.og_qty,
            final_qty: value.final_qty,
            rsp: value.rsp,
            status: value.status.as_deref(),
            fba_msku: value.fba_msku.as_deref(),
            audited: value.audited,
        }
    }
}

impl<'a> From<&'a DomainUpdatePurchase> for UpdatePurchase<'a> {
    fn from(value: &'a DomainUpdatePurchase) -> Self {
        Self {
            final_qty: value.final_qty,
            rsp: value.rsp,
            address: value.address.as_deref(),
            shipped_to_pw: value.shipped_to_pw,
            arrived: value.arrived,
            checked_in: value.checked_in,
            shipped_out: value.shipped_out,
            delivery_date: value.delivery_date,
            status: value.status.as_deref(),
            location: value.location.as_deref(),
            in_bound: value.in_bound,
            tracking: value.tracking.as_deref(),
            outbound_name: value.outbound_name.as_deref(),
            fba_shipment: value.fba_shipment.as_deref(),
            fba_msku: value.fba_msku.as_deref(),
            audited: value.audited,
            cancelled_qty: value.cancelled_qty,
            amt_of_cancelled_qty_credit_card: value.amt_of_cancelled_qty_credit_card,
            amt_of_cancelled_qty_gift_card: value.amt_of_cancelled_qty_gift_card,
            expected_refund_amount: value.expected_refund_amount,
            amount_refunded: value.amount_refunded,
            refund_status: value.refund_status.as_deref(),
            refund_method: value.refund_method.as_deref(),
            date_of_refund: value.date_of_refund,
            notes: value.notes.as_deref(),
        }
    }
}

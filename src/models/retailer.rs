use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::retailer::{
    NewRetailer as DomainNewRetailer, Retailer as DomainRetailer,
    UpdateRetailer as DomainUpdateRetailer,
};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::retailers)]
pub struct Retailer {
    pub id: i32,
    pub name: String,
    pub link: Option<String>,
    pub wholesale: Option<String>,
    pub cancel_for_bulk: bool,
    pub location: Option<String>,
    pub shopify: bool,
    pub total_spend: f64,
    pub total_qty_of_items_ordered: i32,
    pub percent_of_cancelled_qty: f64,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::retailers)]
pub struct NewRetailer<'a> {
    pub name: &'a str,
    pub link: Option<&'a str>,
    pub wholesale: Option<&'a str>,
    pub cancel_for_bulk: bool,
    pub location: Option<&'a str>,
    pub shopify: bool,
    pub total_spend: f64,
    pub total_qty_of_items_ordered: i32,
    pub percent_of_cancelled_qty: f64,
}

#[derive(AsChangeset)]
#[diesel(table_name = crate::schema::retailers)]
pub struct UpdateRetailer<'a> {
    pub name: Option<&'a str>,
    pub link: Option<Option<&'a str>>,
    pub wholesale: Option<Option<&'a str>>,
    pub cancel_for_bulk: Option<bool>,
    pub location: Option<Option<&'a str>>,
    pub shopify: Option<bool>,
    pub total_spend: Option<f64>,
    pub total_qty_of_items_ordered: Option<i32>,
    pub percent_of_cancelled_qty: Option<f64>,
}

impl From<Retailer> for DomainRetailer {
    fn from(value: Retailer) -> Self {
        Self {
            id: value.id,
            name: value.name,
            link: value.link,
            wholesale: value.wholesale.and_then(|v| v.parse().ok()),
            cancel_for_bulk: value.cancel_for_bulk,
            location: value.location.and_then(|v| v.parse().ok()),
            shopify: value.shopify,
            total_spend: value.total_spend,
            total_qty_of_items_ordered: value.total_qty_of_items_ordered,
            percent_of_cancelled_qty: value.percent_of_cancelled_qty,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

impl<'a> From<&'a DomainNewRetailer> for NewRetailer<'a> {
    fn from(value: &'a DomainNewRetailer) -> Self {
        Self {
            name: value.name.as_str(),
            link: value.link.as_deref(),
            wholesale: value.wholesale.map(|w| w.as_str()),
            cancel_for_bulk: value.cancel_for_bulk,
            location: value.location.map(|l| l.as_str()),
            shopify: value.shopify,
            total_spend: value.total_spend,
            total_qty_of_items_ordered: value.total_qty_of_items_ordered,
            percent_of_cancelled_qty: value.percent_of_cancelled_qty,
        }
    }
}

impl<'a> From<&'a DomainUpdateRetailer> for UpdateRetailer<'a> {
    fn from(value: &'a DomainUpdateRetailer) -> Self {
        Self {
            name: value.name.as_deref(),
            link: value.link.as_ref().map(|link| link.as_deref()),
            wholesale: value.wholesale.map(|w| w.map(|w| w.as_str())),
            cancel_for_bulk: value.cancel_for_bulk,
            location: value.location.map(|l| l.map(|l| l.as_str())),
            shopify: value.shopify,
            total_spend: value.total_spend,
            total_qty_of_items_ordered: value.total_qty_of_items_ordered,
            percent_of_cancelled_qty: value.percent_of_cancelled_qty,
        }
    }
}

use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::checkin::{
    Checkin as DomainCheckin, NewCheckin as DomainNewCheckin, UpdateCheckin as DomainUpdateCheckin,
};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::checkin)]
pub struct Checkin {
    pub id: i32,
    pub order_number: Option<String>,
    pub item_name: Option<String>,
    pub asin_bank_id: Option<i32>,
    pub quantity: i32,
    pub checked_in_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::checkin)]
pub struct NewCheckin<'a> {
    pub order_number: Option<&'a str>,
    pub item_name: Option<&'a str>,
    pub asin_bank_id: Option<i32>,
    pub quantity: i32,
    pub checked_in_at: NaiveDateTime,
}

#[derive(AsChangeset)]
#[diesel(table_name = crate::schema::checkin)]
pub struct UpdateCheckin<'a> {
    pub order_number: Option<&'a str>,
    pub item_name: Option<&'a str>,
    pub asin_bank_id: Option<i32>,
    pub quantity: Option<i32>,
    pub checked_in_at: Option<NaiveDateTime>,
}

impl From<Checkin> for DomainCheckin {
    fn from(value: Checkin) -> Self {
        Self {
            id: value.id,
            order_number: value.order_number,
            item_name: value.item_name,
            asin_bank_id: value.asin_bank_id,
            asin: None,
            size: None,
            quantity: value.quantity,
            checked_in_at: value.checked_in_at,
        }
    }
}

impl<'a> From<&'a DomainNewCheckin> for NewCheckin<'a> {
    fn from(value: &'a DomainNewCheckin) -> Self {
        Self {
            order_number: value.order_number.as_deref(),
            item_name: value.item_name.as_deref(),
            asin_bank_id: value.asin_bank_id,
            quantity: value.quantity,
            checked_in_at: value.checked_in_at,
        }
    }
}

impl<'a> From<&'a DomainUpdateCheckin> for UpdateCheckin<'a> {
    fn from(value: &'a DomainUpdateCheckin) -> Self {
        Self {
            order_number: value.order_number.as_deref(),
            item_name: value.item_name.as_deref(),
            asin_bank_id: value.asin_bank_id,
            quantity: value.quantity,
            checked_in_at: value.checked_in_at,
        }
    }
}

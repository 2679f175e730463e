use diesel::prelude::*;

use crate::domain::asin_bank::{
    AsinBankEntry as DomainAsinBankEntry, NewAsinBankEntry as DomainNewAsinBankEntry,
};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::asin_bank)]
pub struct AsinBankEntry {
    pub id: i32,
    pub lead_id: String,
    pub size: Option<String>,
    pub asin: String,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::asin_bank)]
pub struct NewAsinBankEntry<'a> {
    pub lead_id: &'a str,
    pub size: Option<&'a str>,
    pub asin: &'a str,
}

impl From<AsinBankEntry> for DomainAsinBankEntry {
    fn from(value: AsinBankEntry) -> Self {
        Self {
            id: value.id,
            lead_id: value.lead_id,
            size: value.size,
            asin: value.asin,
        }
    }
}

impl<'a> From<&'a DomainNewAsinBankEntry> for NewAsinBankEntry<'a> {
    fn from(value: &'a DomainNewAsinBankEntry) -> Self {
        Self {
            lead_id: value.lead_id.as_str(),
            size: value.size.as_deref(),
            asin: value.asin.as_str(),
        }
    }
}

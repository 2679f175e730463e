use serde::{Deserialize, Serialize};

use crate::pagination::PageRequest;

/// One (lead_id, size, asin) tuple of the shared ASIN pool.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AsinBankEntry {
    pub id: i32,
    /// Lead that first introduced the ASIN. Free text, not a foreign key.
    pub lead_id: String,
    pub size: Option<String>,
    pub asin: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAsinBankEntry {
    pub lead_id: String,
    pub size: Option<String>,
    pub asin: String,
}

impl NewAsinBankEntry {
    pub fn new(lead_id: impl Into<String>, asin: impl Into<String>, size: Option<String>) -> Self {
        Self {
            lead_id: lead_id.into(),
            size,
            asin: asin.into(),
        }
    }
}

/// Filters accepted when listing the ASIN bank.
#[derive(Debug, Clone, Default)]
pub struct AsinBankListQuery {
    /// Exact lead identifier.
    pub lead_id: Option<String>,
    /// ASIN fragment.
    pub asin: Option<String>,
    /// Size fragment.
    pub size: Option<String>,
    pub pagination: Option<PageRequest>,
}

impl AsinBankListQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lead_id(mut self, lead_id: impl Into<String>) -> Self {
        self.lead_id = Some(lead_id.into());
        self
    }

    pub fn asin(mut self, asin: impl Into<String>) -> Self {
        self.asin = Some(asin.into());
        self
    }

    pub fn size(mut self, size: impl Into<String>) -> Self {
        self.size = Some(size.into());
        self
    }

    pub fn paginate(mut self, page: PageRequest) -> Self {
        self.pagination = Some(page);
        self
    }
}

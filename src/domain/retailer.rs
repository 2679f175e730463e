use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::pagination::PageRequest;

/// Whether a retailer sells wholesale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Wholesale {
    #[serde(rename = "yes")]
    Yes,
    #[serde(rename = "no")]
    No,
    #[serde(rename = "n/a")]
    NotApplicable,
}

impl Wholesale {
    pub fn as_str(&self) -> &'static str {
        match self {
            Wholesale::Yes => "yes",
            Wholesale::No => "no",
            Wholesale::NotApplicable => "n/a",
        }
    }
}

impl FromStr for Wholesale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "yes" | "y" | "true" => Ok(Wholesale::Yes),
            "no" | "n" | "false" => Ok(Wholesale::No),
            "n/a" | "na" => Ok(Wholesale::NotApplicable),
            other => Err(other.to_string()),
        }
    }
}

impl fmt::Display for Wholesale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Market a retailer ships from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Location {
    Eu,
    Usa,
    Canada,
    Au,
    Uk,
    Sa,
}

impl Location {
    pub fn as_str(&self) -> &'static str {
        match self {
            Location::Eu => "EU",
            Location::Usa => "USA",
            Location::Canada => "CANADA",
            Location::Au => "AU",
            Location::Uk => "UK",
            Location::Sa => "SA",
        }
    }
}

impl FromStr for Location {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "EU" => Ok(Location::Eu),
            "USA" | "US" => Ok(Location::Usa),
            "CANADA" | "CA" => Ok(Location::Canada),
            "AU" => Ok(Location::Au),
            "UK" => Ok(Location::Uk),
            "SA" => Ok(Location::Sa),
            other => Err(other.to_string()),
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A store leads are sourced from.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Retailer {
    pub id: i32,
    pub name: String,
    pub link: Option<String>,
    pub wholesale: Option<Wholesale>,
    pub cancel_for_bulk: bool,
    pub location: Option<Location>,
    pub shopify: bool,
    /// Rolling totals, recomputed outside of this service.
    pub total_spend: f64,
    pub total_qty_of_items_ordered: i32,
    pub percent_of_cancelled_qty: f64,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Payload required to insert a new retailer.
#[derive(Debug, Clone, PartialEq)]
pub struct NewRetailer {
    pub name: String,
    pub link: Option<String>,
    pub wholesale: Option<Wholesale>,
    pub cancel_for_bulk: bool,
    pub location: Option<Location>,
    pub shopify: bool,
    pub total_spend: f64,
    pub total_qty_of_items_ordered: i32,
    pub percent_of_cancelled_qty: f64,
}

impl NewRetailer {
    /// Build a retailer payload with only the name set.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            link: None,
            wholesale: None,
            cancel_for_bulk: false,
            location: None,
            shopify: false,
            total_spend: 0.0,
            total_qty_of_items_ordered: 0,
            percent_of_cancelled_qty: 0.0,
        }
    }

    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.link = Some(link.into());
        self
    }

    pub fn with_wholesale(mut self, wholesale: Wholesale) -> Self {
        self.wholesale = Some(wholesale);
        self
    }

    pub fn with_location(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    pub fn with_flags(mut self, cancel_for_bulk: bool, shopify: bool) -> Self {
        self.cancel_for_bulk = cancel_for_bulk;
        self.shopify = shopify;
        self
    }

    /// Seed the rolling totals, used by bulk imports.
    pub fn with_stats(mut self, total_spend: f64, total_qty: i32, percent_cancelled: f64) -> Self {
        self.total_spend = total_spend;
        self.total_qty_of_items_ordered = total_qty;
        self.percent_of_cancelled_qty = percent_cancelled;
        self
    }
}

/// Partial update of a retailer; `None` leaves a column untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateRetailer {
    pub name: Option<String>,
    pub link: Option<Option<String>>,
    pub wholesale: Option<Option<Wholesale>>,
    pub cancel_for_bulk: Option<bool>,
    pub location: Option<Option<Location>>,
    pub shopify: Option<bool>,
    pub total_spend: Option<f64>,
    pub total_qty_of_items_ordered: Option<i32>,
    pub percent_of_cancelled_qty: Option<f64>,
}

impl UpdateRetailer {
    /// True when the patch would not change any column.
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// Filters accepted when listing retailers.
#[derive(Debug, Clone, Default)]
pub struct RetailerListQuery {
    pub location: Option<Location>,
    pub wholesale: Option<Wholesale>,
    pub shopify: Option<bool>,
    /// Case-insensitive name fragment.
    pub search: Option<String>,
    pub pagination: Option<PageRequest>,
}

impl RetailerListQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn location(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    pub fn wholesale(mut self, wholesale: Wholesale) -> Self {
        self.wholesale = Some(wholesale);
        self
    }

    pub fn shopify(mut self, shopify: bool) -> Self {
        self.shopify = Some(shopify);
        self
    }

    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }

    pub fn paginate(mut self, page: PageRequest) -> Self {
        self.pagination = Some(page);
        self
    }
}

/// Aggregates shown on the retailers dashboard.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RetailerSummary {
    pub total_retailers: usize,
    pub total_spend: f64,
    pub total_items_ordered: i64,
    pub by_location: BTreeMap<String, usize>,
    pub by_wholesale: BTreeMap<String, usize>,
    pub shopify_count: usize,
}

impl RetailerSummary {
    /// Fold the summary out of every stored retailer.
    pub fn from_retailers(retailers: &[Retailer]) -> Self {
        let mut summary = Self {
            total_retailers: retailers.len(),
            ..Self::default()
        };
        for retailer in retailers {
            summary.total_spend += retailer.total_spend;
            summary.total_items_ordered += i64::from(retailer.total_qty_of_items_ordered);
            if let Some(location) = retailer.location {
                *summary
                    .by_location
                    .entry(location.as_str().to_string())
                    .or_default() += 1;
            }
            if let Some(wholesale) = retailer.wholesale {
                *summary
                    .by_wholesale
                    .entry(wholesale.as_str().to_string())
                    .or_default() += 1;
            }
            if retailer.shopify {
                summary.shopify_count += 1;
            }
        }
        summary.total_spend = (summary.total_spend * 100.0).round() / 100.0;
        summary
    }
}

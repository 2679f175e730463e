use std::io::{Read, Seek};

use actix_multipart::form::{MultipartForm, tempfile::TempFile};
use csv::{StringRecord, Trim};
use serde::Deserialize;
use thiserror::Error;
use validator::{Validate, ValidationErrors};

use crate::domain::retailer::{Location, NewRetailer, UpdateRetailer, Wholesale};
use crate::forms::{parse_bool, parse_money, sanitize_inline_text};

const NAME_MAX_LEN: u64 = 255;
const LINK_MAX_LEN: u64 = 2048;

pub type RetailerFormResult<T> = Result<T, RetailerFormError>;

#[derive(Debug, Error)]
pub enum RetailerFormError {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationErrors),
    #[error("retailer name cannot be empty")]
    EmptyName,
    #[error("invalid wholesale value `{0}`")]
    InvalidWholesale(String),
    #[error("invalid location `{0}`")]
    InvalidLocation(String),
    #[error("upload is missing the required `name` header")]
    MissingNameHeader,
    #[error("row {row} has invalid `{column}` value `{value}`")]
    InvalidCell {
        row: usize,
        column: &'static str,
        value: String,
    },
    #[error("upload contains no retailers")]
    EmptyUpload,
    #[error("failed to read upload: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse CSV: {0}")]
    Csv(#[from] csv::Error),
}

fn parse_wholesale(value: &str) -> RetailerFormResult<Option<Wholesale>> {
    if value.trim().is_empty() {
        return Ok(None);
    }
    value
        .parse()
        .map(Some)
        .map_err(|_| RetailerFormError::InvalidWholesale(value.to_string()))
}

fn parse_location(value: &str) -> RetailerFormResult<Option<Location>> {
    if value.trim().is_empty() {
        return Ok(None);
    }
    value
        .parse()
        .map(Some)
        .map_err(|_| RetailerFormError::InvalidLocation(value.to_string()))
}

/// Payload of the "Add retailer" dialog.
#[derive(Debug, Deserialize, Validate)]
pub struct AddRetailerForm {
    #[validate(length(min = 1, max = NAME_MAX_LEN))]
    pub name: String,
    #[validate(length(max = LINK_MAX_LEN))]
    pub link: Option<String>,
    pub wholesale: Option<String>,
    #[serde(default)]
    pub cancel_for_bulk: bool,
    pub location: Option<String>,
    #[serde(default)]
    pub shopify: bool,
}

impl AddRetailerForm {
    pub fn into_new_retailer(self) -> RetailerFormResult<NewRetailer> {
        self.validate()?;

        let name = sanitize_inline_text(&self.name);
        if name.is_empty() {
            return Err(RetailerFormError::EmptyName);
        }

        let mut retailer = NewRetailer::new(name).with_flags(self.cancel_for_bulk, self.shopify);
        if let Some(link) = self.link.as_deref().map(str::trim).filter(|l| !l.is_empty()) {
            retailer = retailer.with_link(link);
        }
        if let Some(wholesale) = parse_wholesale(self.wholesale.as_deref().unwrap_or(""))? {
            retailer = retailer.with_wholesale(wholesale);
        }
        if let Some(location) = parse_location(self.location.as_deref().unwrap_or(""))? {
            retailer = retailer.with_location(location);
        }
        Ok(retailer)
    }
}

/// Partial edit of a retailer. Empty strings clear optional columns.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct EditRetailerForm {
    #[validate(length(min = 1, max = NAME_MAX_LEN))]
    pub name: Option<String>,
    #[validate(length(max = LINK_MAX_LEN))]
    pub link: Option<String>,
    pub wholesale: Option<String>,
    pub cancel_for_bulk: Option<bool>,
    pub location: Option<String>,
    pub shopify: Option<bool>,
    pub total_spend: Option<f64>,
    pub total_qty_of_items_ordered: Option<i32>,
    pub percent_of_cancelled_qty: Option<f64>,
}

impl EditRetailerForm {
    pub fn into_update_retailer(self) -> RetailerFormResult<UpdateRetailer> {
        self.validate()?;

        let name = match self.name {
            Some(name) => {
                let name = sanitize_inline_text(&name);
                if name.is_empty() {
                    return Err(RetailerFormError::EmptyName);
                }
                Some(name)
            }
            None => None,
        };

        Ok(UpdateRetailer {
            name,
            link: self
                .link
                .map(|link| Some(link.trim().to_string()).filter(|l| !l.is_empty())),
            wholesale: self.wholesale.as_deref().map(parse_wholesale).transpose()?,
            cancel_for_bulk: self.cancel_for_bulk,
            location: self.location.as_deref().map(parse_location).transpose()?,
            shopify: self.shopify,
            total_spend: self.total_spend,
            total_qty_of_items_ordered: self.total_qty_of_items_ordered,
            percent_of_cancelled_qty: self.percent_of_cancelled_qty,
        })
    }
}

#[derive(MultipartForm)]
/// Multipart form for uploading a CSV file of retailers.
pub struct UploadRetailersForm {
    #[multipart(limit = "10MB")]
    pub csv: TempFile,
}

impl UploadRetailersForm {
    pub fn parse(&mut self) -> RetailerFormResult<Vec<NewRetailer>> {
        self.csv.file.rewind()?;
        parse_retailers(self.csv.file.by_ref())
    }
}

struct RetailerHeaders {
    name: usize,
    link: Option<usize>,
    wholesale: Option<usize>,
    cancel_for_bulk: Option<usize>,
    location: Option<usize>,
    shopify: Option<usize>,
    total_spend: Option<usize>,
    total_qty: Option<usize>,
    percent_cancelled: Option<usize>,
}

fn locate_header(headers: &StringRecord, expected: &[&str]) -> Option<usize> {
    headers.iter().position(|header| {
        let header = header.trim().replace(' ', "_");
        expected.iter().any(|name| header.eq_ignore_ascii_case(name))
    })
}

fn locate_retailer_headers(headers: &StringRecord) -> RetailerFormResult<RetailerHeaders> {
    Ok(RetailerHeaders {
        name: locate_header(headers, &["name", "retailer"])
            .ok_or(RetailerFormError::MissingNameHeader)?,
        link: locate_header(headers, &["link", "url"]),
        wholesale: locate_header(headers, &["wholesale"]),
        cancel_for_bulk: locate_header(headers, &["cancel_for_bulk"]),
        location: locate_header(headers, &["location"]),
        shopify: locate_header(headers, &["shopify"]),
        total_spend: locate_header(headers, &["total_spend"]),
        total_qty: locate_header(headers, &["total_qty_of_items_ordered", "total_qty"]),
        percent_cancelled: locate_header(headers, &["percent_of_cancelled_qty"]),
    })
}

/// Parse a retailers CSV. Rows without a name are skipped.
pub fn parse_retailers<R: Read>(reader: R) -> RetailerFormResult<Vec<NewRetailer>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .flexible(true)
        .from_reader(reader);

    let headers = locate_retailer_headers(reader.headers()?)?;
    let mut retailers = Vec::new();

    for (index, row) in reader.records().enumerate() {
        let row_number = index + 2;
        let record = row?;
        let cell = |position: Option<usize>| position.and_then(|p| record.get(p)).unwrap_or("");
        let invalid = |column: &'static str, value: &str| RetailerFormError::InvalidCell {
            row: row_number,
            column,
            value: value.to_string(),
        };

        let name = sanitize_inline_text(cell(Some(headers.name)));
        if name.is_empty() {
            continue;
        }

        let mut retailer = NewRetailer::new(name);
        let link = cell(headers.link);
        if !link.is_empty() {
            retailer = retailer.with_link(link);
        }

        let wholesale = cell(headers.wholesale);
        if let Some(value) = parse_wholesale(wholesale).map_err(|_| invalid("wholesale", wholesale))? {
            retailer = retailer.with_wholesale(value);
        }

        let location = cell(headers.location);
        if let Some(value) = parse_location(location).map_err(|_| invalid("location", location))? {
            retailer = retailer.with_location(value);
        }

        let cancel_raw = cell(headers.cancel_for_bulk);
        let cancel_for_bulk =
            parse_bool(cancel_raw).ok_or_else(|| invalid("cancel_for_bulk", cancel_raw))?;
        let shopify_raw = cell(headers.shopify);
        let shopify = parse_bool(shopify_raw).ok_or_else(|| invalid("shopify", shopify_raw))?;
        retailer = retailer.with_flags(cancel_for_bulk, shopify);

        let spend_raw = cell(headers.total_spend);
        let total_spend = parse_money(spend_raw).map_err(|_| invalid("total_spend", spend_raw))?;
        let qty_raw = cell(headers.total_qty);
        let total_qty = if qty_raw.is_empty() {
            0
        } else {
            qty_raw
                .parse::<i32>()
                .map_err(|_| invalid("total_qty_of_items_ordered", qty_raw))?
        };
        let percent_raw = cell(headers.percent_cancelled);
        let percent_cancelled =
            parse_money(percent_raw).map_err(|_| invalid("percent_of_cancelled_qty", percent_raw))?;
        retailer = retailer.with_stats(
            total_spend.unwrap_or(0.0),
            total_qty,
            percent_cancelled.unwrap_or(0.0),
        );

        retailers.push(retailer);
    }

    if retailers.is_empty() {
        return Err(RetailerFormError::EmptyUpload);
    }

    Ok(retailers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn add_form_converts_enums() {
        let form = AddRetailerForm {
            name: "  Foot   Locker ".to_string(),
            link: Some("https://www.footlocker.com".to_string()),
            wholesale: Some("no".to_string()),
            cancel_for_bulk: true,
            location: Some("usa".to_string()),
            shopify: false,
        };

        let retailer = form.into_new_retailer().expect("valid form");

        assert_eq!(retailer.name, "Foot Locker");
        assert_eq!(retailer.wholesale, Some(Wholesale::No));
        assert_eq!(retailer.location, Some(Location::Usa));
        assert!(retailer.cancel_for_bulk);
    }

    #[test]
    fn add_form_rejects_unknown_location() {
        let form = AddRetailerForm {
            name: "Snipes".to_string(),
            link: None,
            wholesale: None,
            cancel_for_bulk: false,
            location: Some("Mars".to_string()),
            shopify: false,
        };

        assert!(matches!(
            form.into_new_retailer(),
            Err(RetailerFormError::InvalidLocation(value)) if value == "Mars"
        ));
    }

    #[test]
    fn edit_form_clears_link_with_empty_string() {
        let form = EditRetailerForm {
            link: Some("  ".to_string()),
            location: Some(String::new()),
            shopify: Some(true),
            ..EditRetailerForm::default()
        };

        let updates = form.into_update_retailer().expect("valid form");

        assert_eq!(updates.link, Some(None));
        assert_eq!(updates.location, Some(None));
        assert_eq!(updates.shopify, Some(true));
        assert_eq!(updates.name, None);
    }

    #[test]
    fn parses_csv_rows() {
        let csv = "Name,Link,Wholesale,Location,Shopify,Total Spend\n\
                   Champs,https://www.champssports.com,no,USA,false,\"$1,200.50\"\n\
                   ,,,,,\n\
                   Kith,,yes,,yes,\n";
        let retailers = parse_retailers(Cursor::new(csv)).expect("should parse");

        assert_eq!(retailers.len(), 2);
        assert_eq!(retailers[0].name, "Champs");
        assert_eq!(retailers[0].total_spend, 1200.5);
        assert_eq!(retailers[1].wholesale, Some(Wholesale::Yes));
        assert!(retailers[1].shopify);
        assert_eq!(retailers[1].link, None);
    }

    #[test]
    fn csv_without_name_header_is_rejected() {
        let csv = "link,location\nhttps://example.com,USA\n";
        assert!(matches!(
            parse_retailers(Cursor::new(csv)),
            Err(RetailerFormError::MissingNameHeader)
        ));
    }

    #[test]
    fn csv_reports_invalid_cells_with_row_number() {
        let csv = "name,shopify\nKith,maybe\n";
        assert!(matches!(
            parse_retailers(Cursor::new(csv)),
            Err(RetailerFormError::InvalidCell { row: 2, column: "shopify", .. })
        ));
    }
}

//! Lead submittal form: validation, unique ID derivation and the editable draft.

use chrono::NaiveDateTime;
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use validator::{Validate, ValidationErrors};

use crate::amazon::message::ExtensionMessage;
use crate::domain::lead::{MAX_ASINS_PER_LEAD, NewLead, NewLeadAsin, UpdateLead};
use crate::forms::{non_empty, parse_money, sanitize_inline_text};

const TEXT_MAX_LEN: u64 = 255;
const LINK_MAX_LEN: u64 = 2048;

/// Quantity recommended for an ASIN row that does not specify one.
pub const DEFAULT_RECOMMENDED_QUANTITY: i32 = 0;

lazy_static! {
    static ref FOOTLOCKER_LINK: Regex = Regex::new(
        r"(?i)(?:footlocker|champssports)\.[a-z.]+/(?:[a-z]{2}/)?product/(?:[^/?#]+/)*([A-Z0-9]+)\.html"
    )
    .expect("footlocker link pattern");
    static ref FINISHLINE_LINK: Regex = Regex::new(
        r"(?i)finishline\.com/(?:store/)?pdp/(?:[^/?#]+/)*?([A-Z0-9]{5,10})/(\d{3})(?:[/?#]|$)"
    )
    .expect("finishline link pattern");
    static ref FINISHLINE_QUERY: Regex =
        Regex::new(r"(?i)finishline\.com/.*[?&]styleId=([A-Z0-9]+)&colorId=(\d{3})")
            .expect("finishline query pattern");
    static ref HIBBETT_LINK: Regex =
        Regex::new(r"(?i)hibbett\.com/(?:[^/?#]+/)*([A-Z0-9]{4,8})\.html")
            .expect("hibbett link pattern");
    static ref ASIN: Regex = Regex::new(r"^[A-Z0-9]{10}$").expect("asin pattern");
}

/// Retailer product code found in a product link, or `""` when no pattern matches.
///
/// The code is the identifier the retailer's order emails carry, so purchases
/// can be matched back to the lead.
pub fn derive_unique_id(link: &str) -> String {
    let link = link.trim();
    if let Some(caps) = FOOTLOCKER_LINK.captures(link) {
        return caps[1].to_uppercase();
    }
    if let Some(caps) = FINISHLINE_LINK
        .captures(link)
        .or_else(|| FINISHLINE_QUERY.captures(link))
    {
        return format!("{}_{}", caps[1].to_uppercase(), &caps[2]);
    }
    if let Some(caps) = HIBBETT_LINK.captures(link) {
        return caps[1].to_uppercase();
    }
    String::new()
}

/// First and last letter of the alphabetic part of a name, upper-cased.
pub fn sourcer_initials(name: &str) -> String {
    let letters: Vec<char> = name.chars().filter(|ch| ch.is_ascii_alphabetic()).collect();
    match (letters.first(), letters.last()) {
        (Some(first), Some(last)) => format!("{first}{last}").to_ascii_uppercase(),
        _ => "XX".to_string(),
    }
}

/// `YYMMDDHHMMSS` followed by the sourcer initials.
pub fn generate_lead_id(now: NaiveDateTime, initials: &str) -> String {
    format!("{}{initials}", now.format("%y%m%d%H%M%S"))
}

/// Lead ID used when [`generate_lead_id`] is already taken.
pub fn generate_unique_lead_id(now: NaiveDateTime, initials: &str) -> String {
    format!("{}{}", generate_lead_id(now, initials), now.format("%6f"))
}

pub type LeadFormResult<T> = Result<T, LeadFormError>;

#[derive(Debug, Error)]
pub enum LeadFormError {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationErrors),
    #[error("`{field}` is not a valid amount: `{value}`")]
    InvalidAmount { field: &'static str, value: String },
    #[error("ASIN row {row} has invalid ASIN `{value}`")]
    InvalidAsin { row: usize, value: String },
    #[error("ASIN row {row} has a negative quantity")]
    NegativeQuantity { row: usize },
    #[error("a lead holds at most {max} ASINs, got {count}")]
    TooManyAsins { count: usize, max: usize },
}

/// Free text entered either as a single string or as a list of entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TextList {
    Single(String),
    Many(Vec<String>),
}

impl Default for TextList {
    fn default() -> Self {
        TextList::Single(String::new())
    }
}

impl TextList {
    /// Entries joined with `", "`, empty ones included.
    pub fn joined(&self) -> String {
        match self {
            TextList::Single(text) => text.trim().to_string(),
            TextList::Many(items) => items.join(", "),
        }
    }
}

/// Amount entered as a JSON number or as text such as `"$129.99"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Amount {
    Number(f64),
    Text(String),
}

impl Amount {
    fn parse(&self, field: &'static str) -> LeadFormResult<Option<f64>> {
        match self {
            Amount::Number(value) => Ok(Some(*value)),
            Amount::Text(text) => parse_money(text).map_err(|_| LeadFormError::InvalidAmount {
                field,
                value: text.clone(),
            }),
        }
    }
}

fn parse_amount(amount: &Option<Amount>, field: &'static str) -> LeadFormResult<Option<f64>> {
    match amount {
        Some(amount) => amount.parse(field),
        None => Ok(None),
    }
}

/// One ASIN row of the form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AsinRow {
    #[serde(default)]
    pub asin: String,
    #[serde(default)]
    pub size: String,
    #[serde(default)]
    pub recommended_quantity: Option<i32>,
}

impl AsinRow {
    pub fn new(asin: impl Into<String>, size: impl Into<String>, quantity: i32) -> Self {
        Self {
            asin: asin.into(),
            size: size.into(),
            recommended_quantity: Some(quantity),
        }
    }

    /// No ASIN was entered; size and quantity alone do not make a row.
    pub fn is_empty(&self) -> bool {
        self.asin.trim().is_empty()
    }

    fn into_new_lead_asin(self, row: usize) -> LeadFormResult<NewLeadAsin> {
        let asin = self.asin.trim().to_ascii_uppercase();
        if !ASIN.is_match(&asin) {
            return Err(LeadFormError::InvalidAsin { row, value: asin });
        }
        let recommended_quantity = self
            .recommended_quantity
            .unwrap_or(DEFAULT_RECOMMENDED_QUANTITY);
        if recommended_quantity < 0 {
            return Err(LeadFormError::NegativeQuantity { row });
        }
        let size = self.size.trim();
        Ok(NewLeadAsin {
            asin,
            size: (!size.is_empty()).then(|| size.to_string()),
            recommended_quantity,
        })
    }
}

/// Drop rows without an ASIN and convert the rest, keeping their order.
pub fn collect_asins(rows: Vec<AsinRow>) -> LeadFormResult<Vec<NewLeadAsin>> {
    let asins = rows
        .into_iter()
        .enumerate()
        .filter(|(_, row)| !row.is_empty())
        .map(|(index, row)| row.into_new_lead_asin(index + 1))
        .collect::<LeadFormResult<Vec<_>>>()?;

    if asins.len() > MAX_ASINS_PER_LEAD {
        return Err(LeadFormError::TooManyAsins {
            count: asins.len(),
            max: MAX_ASINS_PER_LEAD,
        });
    }
    Ok(asins)
}

/// Payload posted by the lead submittal page.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LeadSubmittalForm {
    #[validate(length(min = 1, max = TEXT_MAX_LEN))]
    pub submitted_by: String,
    #[validate(length(min = 1, max = TEXT_MAX_LEN))]
    pub product_name: String,
    #[validate(length(min = 1, max = TEXT_MAX_LEN))]
    pub product_sku: String,
    #[validate(length(min = 1, max = TEXT_MAX_LEN))]
    pub retailer_name: String,
    #[serde(default)]
    #[validate(length(max = LINK_MAX_LEN))]
    pub retailer_link: String,
    #[serde(default)]
    #[validate(length(max = LINK_MAX_LEN))]
    pub amazon_link: String,
    #[serde(default)]
    #[validate(length(max = TEXT_MAX_LEN))]
    pub unique_id: String,
    pub ppu: Option<Amount>,
    pub rsp: Option<Amount>,
    pub margin: Option<Amount>,
    #[serde(default)]
    pub pros: TextList,
    #[serde(default)]
    pub cons: TextList,
    #[serde(default)]
    pub other_notes: String,
    #[serde(default)]
    pub promo_code: String,
    #[serde(default)]
    pub asins: Vec<AsinRow>,
}

/// Validated lead submittal, waiting for an ID and a retailer.
#[derive(Debug, Clone, PartialEq)]
pub struct LeadSubmittal {
    pub retailer_name: String,
    pub lead: NewLead,
    pub asins: Vec<NewLeadAsin>,
}

impl LeadSubmittal {
    pub fn suggested_total_qty(&self) -> i32 {
        self.asins.iter().map(|asin| asin.recommended_quantity).sum()
    }
}

impl LeadSubmittalForm {
    /// Validate the payload. The lead ID, sourcer and retailer are filled in later.
    pub fn into_submittal(self) -> LeadFormResult<LeadSubmittal> {
        self.validate()?;

        let asins = collect_asins(self.asins)?;
        let unique_id = match self.unique_id.trim() {
            "" => derive_unique_id(&self.retailer_link),
            entered => entered.to_string(),
        };

        let lead = NewLead {
            submitted_by: Some(sanitize_inline_text(&self.submitted_by)),
            product_name: Some(sanitize_inline_text(&self.product_name)),
            product_sku: Some(sanitize_inline_text(&self.product_sku)),
            retailer_link: non_empty(Some(self.retailer_link.as_str())),
            amazon_link: non_empty(Some(self.amazon_link.as_str())),
            unique_id: Some(unique_id).filter(|id| !id.is_empty()),
            pros: Some(self.pros.joined()).filter(|text| !text.is_empty()),
            cons: Some(self.cons.joined()).filter(|text| !text.is_empty()),
            other_notes_concerns: non_empty(Some(self.other_notes.as_str())),
            ppu: parse_amount(&self.ppu, "ppu")?,
            rsp: parse_amount(&self.rsp, "rsp")?,
            margin: parse_amount(&self.margin, "margin")?,
            promo_code: non_empty(Some(self.promo_code.as_str())),
            ..NewLead::default()
        };

        let mut submittal = LeadSubmittal {
            retailer_name: sanitize_inline_text(&self.retailer_name),
            lead,
            asins,
        };
        submittal.lead.suggested_total_qty = Some(submittal.suggested_total_qty());
        Ok(submittal)
    }
}

/// Review fields patched after submission.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct EditLeadForm {
    #[validate(length(min = 1, max = TEXT_MAX_LEN))]
    pub product_name: Option<String>,
    #[validate(length(max = LINK_MAX_LEN))]
    pub retailer_link: Option<String>,
    #[validate(length(max = LINK_MAX_LEN))]
    pub amazon_link: Option<String>,
    pub unique_id: Option<String>,
    pub purchased: Option<String>,
    pub purchase_more_if_available: Option<String>,
    pub monitored: Option<bool>,
    pub pros: Option<TextList>,
    pub cons: Option<TextList>,
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

impl EditLeadForm {
    pub fn into_update_lead(self) -> LeadFormResult<UpdateLead> {
        self.validate()?;

        let trim = |value: Option<String>| value.map(|v| v.trim().to_string());
        Ok(UpdateLead {
            product_name: self.product_name.as_deref().map(sanitize_inline_text),
            retailer_link: trim(self.retailer_link),
            amazon_link: trim(self.amazon_link),
            unique_id: trim(self.unique_id),
            purchased: trim(self.purchased),
            purchase_more_if_available: trim(self.purchase_more_if_available),
            monitored: self.monitored,
            pros: self.pros.as_ref().map(TextList::joined),
            cons: self.cons.as_ref().map(TextList::joined),
            other_notes_concerns: trim(self.other_notes_concerns),
            head_of_product_review_notes: trim(self.head_of_product_review_notes),
            feedback_and_notes_on_quantity: trim(self.feedback_and_notes_on_quantity),
            pairs_per_lead_id: self.pairs_per_lead_id,
            pairs_per_sku: self.pairs_per_sku,
            sales_rank: trim(self.sales_rank),
            asin1_buy_box: self.asin1_buy_box,
            asin1_new_price: self.asin1_new_price,
            pick_pack_fee: self.pick_pack_fee,
            referral_fee: self.referral_fee,
            total_fee: self.total_fee,
            promo_code: trim(self.promo_code),
        })
    }
}

/// Editable list of ASIN rows. Removing a row shifts the later ones up.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AsinRows(Vec<AsinRow>);

impl AsinRows {
    /// `count` empty rows.
    pub fn with_count(count: usize) -> Self {
        let mut rows = Self::default();
        rows.resize(count);
        rows
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn rows(&self) -> &[AsinRow] {
        &self.0
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut AsinRow> {
        self.0.get_mut(index)
    }

    pub fn push(&mut self, row: AsinRow) {
        self.0.push(row);
    }

    /// Grow with empty rows or cut trailing rows until `count` remain.
    pub fn resize(&mut self, count: usize) {
        self.0.resize_with(count, AsinRow::default);
    }

    /// Remove the row at `index`, returning it.
    pub fn remove(&mut self, index: usize) -> Option<AsinRow> {
        (index < self.0.len()).then(|| self.0.remove(index))
    }

    pub fn into_rows(self) -> Vec<AsinRow> {
        self.0
    }
}

/// Lead form state while the operator fills it in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadDraft {
    pub retailer_link: String,
    pub amazon_link: String,
    pub unique_id: String,
    pub asins: AsinRows,
}

impl LeadDraft {
    /// Set the retailer link, replacing the unique ID with the one derived from it.
    pub fn set_retailer_link(&mut self, link: impl Into<String>) {
        self.retailer_link = link.into();
        self.unique_id = derive_unique_id(&self.retailer_link);
    }

    /// Manual edit of the unique ID, kept until the link changes again.
    pub fn set_unique_id(&mut self, unique_id: impl Into<String>) {
        self.unique_id = unique_id.into();
    }

    /// Fill the draft with what the browser extension scraped.
    pub fn apply_extension_message(&mut self, message: &ExtensionMessage) {
        if !message.retailer_link.trim().is_empty() {
            self.set_retailer_link(message.retailer_link.trim());
        }
        if !message.amazon_link.trim().is_empty() {
            self.amazon_link = message.amazon_link.trim().to_string();
        }
        if !message.asins.is_empty() {
            self.asins = AsinRows(
                message
                    .asins
                    .iter()
                    .map(|item| AsinRow::new(item.asin.clone(), item.size.clone(), item.quantity))
                    .collect(),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::amazon::message::{ExtensionAsin, MESSAGE_TYPE};

    fn form() -> LeadSubmittalForm {
        LeadSubmittalForm {
            submitted_by: "John".to_string(),
            product_name: "Nike Dunk Low".to_string(),
            product_sku: "DD1391-100".to_string(),
            retailer_name: "Foot Locker".to_string(),
            retailer_link: "https://www.footlocker.com/product/~/HJ7395.html".to_string(),
            ..LeadSubmittalForm::default()
        }
    }

    #[test]
    fn derives_unique_id_per_retailer() {
        assert_eq!(
            derive_unique_id("https://www.footlocker.com/product/~/HJ7395.html"),
            "HJ7395"
        );
        assert_eq!(
            derive_unique_id("https://www.champssports.com/product/nike-dunk-low/DD1391100.html"),
            "DD1391100"
        );
        assert_eq!(
            derive_unique_id(
                "https://www.finishline.com/pdp/mens-nike-air-force-1/prod796340/DV0833/104"
            ),
            "DV0833_104"
        );
        assert_eq!(
            derive_unique_id("https://www.hibbett.com/nike-dunk-low/4M178.html?dwvar_4M178_color=0100"),
            "4M178"
        );
        assert_eq!(derive_unique_id("https://www.nike.com/t/dunk-low"), "");
        assert_eq!(derive_unique_id(""), "");
    }

    #[test]
    fn lead_id_uses_timestamp_and_initials() {
        let now = NaiveDate::from_ymd_opt(2025, 10, 13)
            .unwrap()
            .and_hms_micro_opt(14, 30, 45, 123456)
            .unwrap();

        assert_eq!(generate_lead_id(now, &sourcer_initials("John")), "251013143045JN");
        assert_eq!(
            generate_unique_lead_id(now, "JN"),
            "251013143045JN123456"
        );
    }

    #[test]
    fn initials_fall_back() {
        assert_eq!(sourcer_initials("a"), "AA");
        assert_eq!(sourcer_initials("Mary-Jane 2"), "ME");
        assert_eq!(sourcer_initials("42"), "XX");
    }

    #[test]
    fn empty_asin_rows_are_dropped() {
        let mut form = form();
        form.asins = vec![
            AsinRow::new("B0CHILD008", "8", 2),
            AsinRow::default(),
            AsinRow::new("b0child009", " 9 ", 3),
            AsinRow {
                asin: "  ".to_string(),
                size: "10".to_string(),
                recommended_quantity: Some(4),
            },
            AsinRow::new("B0CHILD010", "", 1),
        ];

        let submittal = form.into_submittal().expect("valid form");

        assert_eq!(submittal.asins.len(), 3);
        assert_eq!(submittal.asins[1].asin, "B0CHILD009");
        assert_eq!(submittal.asins[1].size.as_deref(), Some("9"));
        assert_eq!(submittal.asins[2].size, None);
        assert_eq!(submittal.lead.suggested_total_qty, Some(6));
    }

    #[test]
    fn blank_quantity_counts_as_zero() {
        let mut form = form();
        form.asins = vec![
            AsinRow::new("B0CHILD008", "8", 2),
            AsinRow {
                asin: "B0CHILD009".to_string(),
                size: "9".to_string(),
                recommended_quantity: None,
            },
        ];

        let submittal = form.into_submittal().expect("valid form");

        assert_eq!(submittal.asins[1].recommended_quantity, 0);
        assert_eq!(submittal.lead.suggested_total_qty, Some(2));
    }

    #[test]
    fn more_than_fifteen_asins_are_rejected() {
        let mut form = form();
        form.asins = (0..16)
            .map(|n| AsinRow::new(format!("B0CHILD{n:03}"), n.to_string(), 1))
            .collect();

        assert!(matches!(
            form.into_submittal(),
            Err(LeadFormError::TooManyAsins { count: 16, max: 15 })
        ));
    }

    #[test]
    fn pros_and_cons_are_joined() {
        let mut form = form();
        form.pros = TextList::Many(vec!["Fast seller".to_string(), "Low price".to_string()]);
        form.cons = TextList::Single("Big size run".to_string());
        form.ppu = Some(Amount::Text("$1,049.50".to_string()));
        form.margin = Some(Amount::Number(22.5));

        let submittal = form.into_submittal().expect("valid form");

        assert_eq!(submittal.lead.pros.as_deref(), Some("Fast seller, Low price"));
        assert_eq!(submittal.lead.cons.as_deref(), Some("Big size run"));
        assert_eq!(submittal.lead.ppu, Some(1049.5));
        assert_eq!(submittal.lead.margin, Some(22.5));
        assert_eq!(submittal.lead.unique_id.as_deref(), Some("HJ7395"));
        assert_eq!(submittal.retailer_name, "Foot Locker");
    }

    #[test]
    fn camel_case_payload_deserializes() {
        let form: LeadSubmittalForm = serde_json::from_str(
            r#"{
                "submittedBy": "John",
                "productName": "Dunk",
                "productSku": "DD1391",
                "retailerName": "Hibbett",
                "retailerLink": "https://www.hibbett.com/dunk/4M178.html",
                "uniqueId": "CUSTOM1",
                "rsp": "149.99",
                "pros": ["a", "", "b"],
                "asins": [{"asin": "B0CHILD008", "size": "8", "recommendedQuantity": 4}]
            }"#,
        )
        .unwrap();

        let submittal = form.into_submittal().unwrap();

        assert_eq!(submittal.lead.unique_id.as_deref(), Some("CUSTOM1"));
        assert_eq!(submittal.lead.rsp, Some(149.99));
        assert_eq!(submittal.lead.pros.as_deref(), Some("a, , b"));
        assert_eq!(submittal.asins[0].recommended_quantity, 4);
    }

    #[test]
    fn missing_required_fields_fail_validation() {
        let mut form = form();
        form.product_sku = String::new();
        assert!(matches!(form.into_submittal(), Err(LeadFormError::Validation(_))));
    }

    #[test]
    fn invalid_amount_is_reported() {
        let mut form = form();
        form.rsp = Some(Amount::Text("twelve".to_string()));
        assert!(matches!(
            form.into_submittal(),
            Err(LeadFormError::InvalidAmount { field: "rsp", .. })
        ));
    }

    #[test]
    fn removing_middle_row_shifts_later_rows() {
        let mut rows = AsinRows::with_count(4);
        for (index, asin) in ["B000000001", "B000000002", "B000000003", "B000000004"]
            .iter()
            .enumerate()
        {
            if let Some(row) = rows.get_mut(index) {
                row.asin = asin.to_string();
            }
        }

        let removed = rows.remove(1);

        assert_eq!(removed.map(|row| row.asin).as_deref(), Some("B000000002"));
        assert_eq!(rows.len(), 3);
        let asins: Vec<&str> = rows.rows().iter().map(|row| row.asin.as_str()).collect();
        assert_eq!(asins, vec!["B000000001", "B000000003", "B000000004"]);
        assert!(rows.remove(3).is_none());
    }

    #[test]
    fn retailer_link_overwrites_manual_unique_id() {
        let mut draft = LeadDraft::default();
        draft.set_retailer_link("https://www.footlocker.com/product/~/HJ7395.html");
        assert_eq!(draft.unique_id, "HJ7395");

        draft.set_unique_id("MANUAL");
        assert_eq!(draft.unique_id, "MANUAL");

        draft.set_retailer_link("https://www.example.com/shoe");
        assert_eq!(draft.unique_id, "");
    }

    #[test]
    fn extension_message_fills_draft() {
        let message = ExtensionMessage {
            kind: MESSAGE_TYPE.to_string(),
            retailer_link: "https://www.footlocker.com/product/~/HJ7395.html".to_string(),
            amazon_link: "https://www.amazon.com/dp/B0PARENT01".to_string(),
            asins: vec![ExtensionAsin {
                asin: "B0CHILD009".to_string(),
                size: "9".to_string(),
                quantity: 2,
            }],
        };
        let mut draft = LeadDraft {
            asins: AsinRows::with_count(3),
            ..LeadDraft::default()
        };

        draft.apply_extension_message(&message);

        assert_eq!(draft.unique_id, "HJ7395");
        assert_eq!(draft.asins.len(), 1);
        assert_eq!(draft.asins.rows()[0].recommended_quantity, Some(2));
    }
}

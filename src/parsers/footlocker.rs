use lazy_static::lazy_static;
use regex::Regex;

use crate::domain::retailer_order::{EmailMessage, OrderItem, ParsedOrder};
use crate::html;
use crate::parsers::OrderEmailParser;
use crate::parsers::sizes::{clean_size, is_valid_size, parse_quantity};

lazy_static! {
    static ref PRODUCT_IMAGE: Regex = Regex::new(r"/EBFL2/([A-Z0-9]+)").expect("image pattern");
    static ref SIZE: Regex = Regex::new(r"(?i)\bSize\s*:?\s*([0-9A-Za-z.]+)").expect("size pattern");
    static ref QTY: Regex = Regex::new(r"(?i)\bQty\s*:?\s*(\d+)").expect("qty pattern");
    static ref FOOTLOCKER_ORDER: Regex =
        Regex::new(r"(?i)Order[:#\s]+(P\d{19})\b").expect("order pattern");
    static ref FOOTLOCKER_BARE_ORDER: Regex = Regex::new(r"\bP\d{19}\b").expect("order pattern");
    static ref CHAMPS_ORDER: Regex =
        Regex::new(r"(?i)Order[:#\s]+([A-Z0-9]{8,20})\b").expect("order pattern");
    static ref THANK_YOU: Regex = Regex::new(r"(?i)thank you for your order").expect("subject pattern");
}

/// Foot Locker family order confirmations, shared by Foot Locker and Champs.
///
/// Product images carry the style code after `/EBFL2/`; sizes and quantities
/// appear in document order as `Size 07.0` / `Qty 1` and are paired with the
/// images in the same order.
pub struct FootLockerParser {
    key: &'static str,
    retailer: &'static str,
    sender: &'static str,
    sender_marker: &'static str,
    order_number: &'static Regex,
    bare_order_number: Option<&'static Regex>,
}

impl FootLockerParser {
    pub fn footlocker() -> Self {
        Self {
            key: "footlocker",
            retailer: "Foot Locker",
            sender: "accountservices@em.footlocker.com",
            sender_marker: "footlocker",
            order_number: &*FOOTLOCKER_ORDER,
            bare_order_number: Some(&*FOOTLOCKER_BARE_ORDER),
        }
    }

    pub fn champs() -> Self {
        Self {
            key: "champs",
            retailer: "Champs",
            sender: "accountservices@em.champssports.com",
            sender_marker: "champs",
            order_number: &*CHAMPS_ORDER,
            bare_order_number: None,
        }
    }

    fn extract_order_number(&self, text: &str) -> Option<String> {
        if let Some(caps) = self.order_number.captures(text) {
            return Some(caps[1].to_string());
        }
        self.bare_order_number
            .and_then(|pattern| pattern.find(text))
            .map(|found| found.as_str().to_string())
    }
}

impl OrderEmailParser for FootLockerParser {
    fn key(&self) -> &'static str {
        self.key
    }

    fn retailer(&self) -> &'static str {
        self.retailer
    }

    fn can_parse(&self, email: &EmailMessage) -> bool {
        let sender = email.sender.to_lowercase();
        let from_retailer = sender.contains(self.sender) || sender.contains(self.sender_marker);
        from_retailer && THANK_YOU.is_match(&email.subject)
    }

    fn parse(&self, email: &EmailMessage) -> Option<ParsedOrder> {
        if email.html.trim().is_empty() {
            log::error!("{} email has no HTML content", self.retailer);
            return None;
        }

        let text = html::text(&email.html);
        let Some(order_number) = self.extract_order_number(&text) else {
            log::error!("Failed to extract order number from {} email", self.retailer);
            return None;
        };

        let sizes: Vec<String> = SIZE
            .captures_iter(&text)
            .map(|caps| caps[1].to_string())
            .filter(|size| is_valid_size(size))
            .collect();
        let quantities: Vec<i32> = QTY
            .captures_iter(&text)
            .filter_map(|caps| parse_quantity(&caps[1]))
            .collect();

        let images: Vec<(String, Option<String>)> = html::find_all(&email.html, "img")
            .into_iter()
            .filter_map(|img| {
                let src = img.attr("src")?;
                let unique_id = PRODUCT_IMAGE.captures(src)?[1].to_string();
                let name = img
                    .attr("alt")
                    .map(html::normalize_ws)
                    .filter(|alt| alt.len() > 5);
                Some((unique_id, name))
            })
            .collect();

        let mut items = Vec::with_capacity(images.len());
        for (index, (unique_id, product_name)) in images.into_iter().enumerate() {
            match (sizes.get(index), quantities.get(index)) {
                (Some(size), Some(quantity)) => items.push(OrderItem {
                    unique_id,
                    size: clean_size(size),
                    quantity: *quantity,
                    product_name,
                }),
                _ => log::warn!(
                    "Missing size or quantity for {} item {unique_id}",
                    self.retailer
                ),
            }
        }

        if items.is_empty() {
            log::error!(
                "Failed to extract any items from {} order {order_number}",
                self.retailer
            );
            return None;
        }

        log::info!(
            "Extracted {} items from {} order {order_number}",
            items.len(),
            self.retailer
        );
        Some(ParsedOrder {
            retailer: self.retailer.to_string(),
            order_number,
            items,
        })
    }
}

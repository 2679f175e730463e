use lazy_static::lazy_static;
use regex::Regex;

use crate::domain::retailer_order::{EmailMessage, OrderItem, ParsedOrder};
use crate::html;
use crate::parsers::OrderEmailParser;
use crate::parsers::sizes::{clean_size, parse_quantity};

const SENDER: &str = "hibbett@email.hibbett.com";
const SUBJECT: &str = "Confirmation of your Order";

lazy_static! {
    static ref PRODUCT_IMAGE: Regex = Regex::new(r"hibbett/([A-Z0-9]+)_").expect("image pattern");
    static ref ORDER_HASH: Regex = Regex::new(r"#(\d{13,15})\b").expect("order pattern");
    static ref ORDER_LABEL: Regex =
        Regex::new(r"(?i)Order\s*#?\s*(\d{13,15})\b").expect("order pattern");
    static ref SIZE: Regex = Regex::new(r"(?i)SIZE[:\s]+(\d+(?:\.\d+)?)").expect("size pattern");
    static ref QTY: Regex = Regex::new(r"(?i)QTY[:\s]+(\d+)").expect("qty pattern");
}

/// Hibbett order confirmations.
///
/// Each product row holds an image named `hibbett/<ID>_...` followed by
/// `SIZE:` and `QTY:` labels before the next product image.
pub struct HibbettParser;

impl OrderEmailParser for HibbettParser {
    fn key(&self) -> &'static str {
        "hibbett"
    }

    fn retailer(&self) -> &'static str {
        "Hibbett"
    }

    fn can_parse(&self, email: &EmailMessage) -> bool {
        email.sender.to_lowercase().contains(SENDER) && email.subject.contains(SUBJECT)
    }

    fn parse(&self, email: &EmailMessage) -> Option<ParsedOrder> {
        let text = html::text(&email.html);
        let order_number = ORDER_HASH
            .captures(&email.subject)
            .or_else(|| ORDER_HASH.captures(&text))
            .or_else(|| ORDER_LABEL.captures(&text))
            .map(|caps| caps[1].to_string());
        let Some(order_number) = order_number else {
            log::error!("Failed to extract order number from Hibbett email");
            return None;
        };

        let images: Vec<(usize, String, Option<String>)> = html::find_all(&email.html, "img")
            .into_iter()
            .filter_map(|img| {
                let unique_id = PRODUCT_IMAGE.captures(img.attr("src")?)?[1].to_string();
                let name = img.attr("alt").map(html::normalize_ws).filter(|alt| !alt.is_empty());
                Some((img.start, unique_id, name))
            })
            .collect();

        let mut items = Vec::new();
        for (index, (start, unique_id, product_name)) in images.iter().enumerate() {
            let end = images
                .get(index + 1)
                .map(|(next, _, _)| *next)
                .unwrap_or(email.html.len());
            let row = html::text(&email.html[*start..end]);

            let size = SIZE.captures(&row).map(|caps| clean_size(&caps[1]));
            let quantity = QTY.captures(&row).and_then(|caps| parse_quantity(&caps[1]));

            match (size, quantity) {
                (Some(size), Some(quantity)) => items.push(OrderItem {
                    unique_id: unique_id.clone(),
                    size,
                    quantity,
                    product_name: product_name.clone(),
                }),
                _ => log::warn!("Missing size or quantity for Hibbett item {unique_id}"),
            }
        }

        if items.is_empty() {
            log::error!("Failed to extract any items from Hibbett order {order_number}");
            return None;
        }

        Some(ParsedOrder {
            retailer: self.retailer().to_string(),
            order_number,
            items,
        })
    }
}

use std::collections::HashSet;

use lazy_static::lazy_static;
use regex::Regex;

use crate::domain::retailer_order::{EmailMessage, OrderItem, ParsedOrder};
use crate::html;
use crate::parsers::OrderEmailParser;
use crate::parsers::sizes::clean_size;

const SENDER: &str = "no-reply@snipesusa.com";
const SUBJECT: &str = "confirmation of your snipes order";
const IMAGE_CELL_CLASS: &str = "tablecell-image-wrapper";

lazy_static! {
    static ref ORDER: Regex = Regex::new(r"(?i)Order\s+#(SNP\d+)").expect("order pattern");
    static ref SKU: Regex = Regex::new(r"(?i)SKU:\s*(\d+)").expect("sku pattern");
    static ref SIZE: Regex =
        Regex::new(r"(?i)(?:Unisex|Men['’]?s?|Women['’]?s?|Kids?['’]?s?)\s*/\s*([^\s<]+)")
            .expect("size pattern");
    static ref QUANTITY: Regex = Regex::new(r"(?i)Quantity:\s*(\d+)").expect("qty pattern");
}

/// Snipes order confirmations.
///
/// Every product row has a `tablecell-image-wrapper` cell, a bold name, a
/// numeric `SKU:` used as the unique ID and a `Gender / Size` line.
pub struct SnipesParser;

/// Item of one product row, `None` when the name, SKU or size is missing.
fn row_item(row: &html::Element<'_>) -> Option<OrderItem> {
    let product_name = row
        .find_all("p")
        .into_iter()
        .find(|p| {
            p.attr("style")
                .map(|style| style.contains("font-weight: bold"))
                .unwrap_or(false)
        })
        .map(|p| p.text())
        .filter(|name| !name.is_empty())?;

    let text = row.text();
    let unique_id = SKU.captures(&text)?[1].to_string();
    let size = SIZE.captures(&text)?[1].to_string();
    let quantity = QUANTITY
        .captures(&text)
        .and_then(|caps| caps[1].parse::<i32>().ok())
        .unwrap_or(1);

    Some(OrderItem {
        unique_id,
        size: clean_size(&size),
        quantity,
        product_name: Some(product_name),
    })
}

impl OrderEmailParser for SnipesParser {
    fn key(&self) -> &'static str {
        "snipes"
    }

    fn retailer(&self) -> &'static str {
        "Snipes"
    }

    fn can_parse(&self, email: &EmailMessage) -> bool {
        email.sender.to_lowercase().contains(SENDER)
            && email.subject.to_lowercase().contains(SUBJECT)
    }

    fn parse(&self, email: &EmailMessage) -> Option<ParsedOrder> {
        if email.html.trim().is_empty() {
            log::error!("Snipes email has no HTML content");
            return None;
        }

        let Some(order_number) = ORDER.captures(&email.subject).map(|caps| caps[1].to_string())
        else {
            log::error!(
                "Failed to extract order number from Snipes subject: {}",
                email.subject
            );
            return None;
        };

        let mut seen = HashSet::new();
        let mut items = Vec::new();
        let image_cells = html::find_all(&email.html, "td")
            .into_iter()
            .filter(|cell| cell.has_class(IMAGE_CELL_CLASS));
        for cell in image_cells {
            let Some(row) = html::enclosing(&email.html, "tr", cell.start) else {
                continue;
            };
            let Some(item) = row_item(&row) else {
                log::warn!("Snipes product row without name, SKU or size");
                continue;
            };
            if seen.insert((item.unique_id.clone(), item.size.clone())) {
                items.push(item);
            }
        }

        if items.is_empty() {
            log::error!("Failed to extract any items from Snipes order {order_number}");
            return None;
        }

        log::info!(
            "Extracted {} items from Snipes order {order_number}",
            items.len()
        );
        Some(ParsedOrder {
            retailer: self.retailer().to_string(),
            order_number,
            items,
        })
    }
}

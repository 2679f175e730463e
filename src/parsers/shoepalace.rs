use std::collections::HashSet;

use lazy_static::lazy_static;
use regex::Regex;

use crate::domain::retailer_order::{EmailMessage, OrderItem, ParsedOrder};
use crate::html;
use crate::parsers::OrderEmailParser;
use crate::parsers::sizes::clean_size;

const SENDER: &str = "store+8523376@t.shopifyemail.com";
const SUBJECT: &str = "confirmed";
const PRODUCT_IMAGE_PATH: &str = "cdn.shopify.com/s/files/1/0852/3376/files/";
const PRODUCT_IMAGE_SUFFIX: &str = "_1024x1024.jpg";
const NOT_PRODUCT: [&str; 8] = [
    "logo",
    "icon",
    "fb.png",
    "tw.png",
    "in.png",
    "pi.png",
    "preview-full",
    "sp_stacked",
];

lazy_static! {
    static ref ORDER: Regex = Regex::new(r"(?i)Order\s+#SP(\d+)").expect("order pattern");
    static ref COLOR: Regex = Regex::new(r"\s*\([^)]*\)\s*").expect("color pattern");
    // Also matches the `Quantitiy` misspelling in the template.
    static ref QUANTITY: Regex =
        Regex::new(r"(?i)Quantit[iy]{1,2}\s*:\s*(\d+)").expect("qty pattern");
}

/// Shoe Palace (Shopify) order confirmations.
///
/// Product rows pair a Shopify CDN image with a title cell reading
/// `Name (Color) - Size`. Titles carry no style code, so the unique ID is
/// `SP-` followed by the name without color or `Final Sale`.
pub struct ShoePalaceParser;

fn is_product_image(src: &str) -> bool {
    let lower = src.to_lowercase();
    src.contains(PRODUCT_IMAGE_PATH)
        && src.contains(PRODUCT_IMAGE_SUFFIX)
        && !NOT_PRODUCT.iter().any(|marker| lower.contains(marker))
}

fn is_title_cell(cell: &html::Element<'_>) -> bool {
    cell.attr("style")
        .map(|style| style.contains("Josefin Sans") && style.contains("font-size: 18px"))
        .unwrap_or(false)
}

/// `(unique_id, size, product_name)` from a `Name (Color) - Size` title.
pub fn split_title(title: &str) -> Option<(String, String, String)> {
    let (name, size) = title.rsplit_once(" - ")?;
    let (name, size) = (name.trim(), size.trim());
    if name.is_empty() || size.is_empty() {
        return None;
    }

    let base = COLOR.replace_all(name, " ").replace(" Final Sale", "");
    let base = html::normalize_ws(&base);
    Some((format!("SP-{base}"), size.to_string(), name.to_string()))
}

impl OrderEmailParser for ShoePalaceParser {
    fn key(&self) -> &'static str {
        "shoepalace"
    }

    fn retailer(&self) -> &'static str {
        "Shoe Palace"
    }

    fn can_parse(&self, email: &EmailMessage) -> bool {
        email.sender.to_lowercase().contains(SENDER)
            && email.subject.to_lowercase().contains(SUBJECT)
    }

    fn parse(&self, email: &EmailMessage) -> Option<ParsedOrder> {
        if email.html.trim().is_empty() {
            log::error!("Shoe Palace email has no HTML content");
            return None;
        }

        let Some(order_number) = ORDER.captures(&email.subject).map(|caps| caps[1].to_string())
        else {
            log::error!(
                "Failed to extract order number from Shoe Palace subject: {}",
                email.subject
            );
            return None;
        };

        let mut seen = HashSet::new();
        let mut items = Vec::new();
        for img in html::find_all(&email.html, "img") {
            if !img.attr("src").map(is_product_image).unwrap_or(false) {
                continue;
            }
            let Some(row) = html::enclosing(&email.html, "tr", img.start) else {
                continue;
            };

            let title = row
                .find_all("td")
                .into_iter()
                .find(is_title_cell)
                .map(|cell| cell.text());
            let Some((unique_id, size, product_name)) = title.as_deref().and_then(split_title)
            else {
                log::warn!("Shoe Palace product row without a `Name - Size` title");
                continue;
            };
            if !seen.insert((unique_id.clone(), size.clone())) {
                continue;
            }

            let quantity = QUANTITY
                .captures(&row.text())
                .and_then(|caps| caps[1].parse::<i32>().ok())
                .unwrap_or(1);
            items.push(OrderItem {
                unique_id,
                size: clean_size(&size),
                quantity,
                product_name: Some(product_name),
            });
        }

        if items.is_empty() {
            log::error!("Failed to extract any items from Shoe Palace order {order_number}");
            return None;
        }

        log::info!(
            "Extracted {} items from Shoe Palace order {order_number}",
            items.len()
        );
        Some(ParsedOrder {
            retailer: self.retailer().to_string(),
            order_number,
            items,
        })
    }
}

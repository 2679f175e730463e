use std::collections::HashSet;

use lazy_static::lazy_static;
use regex::Regex;

use crate::domain::retailer_order::{EmailMessage, OrderItem, ParsedOrder};
use crate::html;
use crate::parsers::OrderEmailParser;
use crate::parsers::sizes::clean_size;

const SENDER: &str = "onlinesupport@shopsimon.com";
const SUBJECT: &str = "your shopsimon order is confirmed";
const ITEM_ROW_CLASS: &str = "order-list__item";
const ITEM_TITLE_CLASS: &str = "order-list__item-title";

lazy_static! {
    static ref SUBJECT_ORDER: Regex = Regex::new(r"(?i)-\s*(SPO\d+)").expect("order pattern");
    static ref BODY_ORDER: Regex =
        Regex::new(r"(?i)Order\s+(?:Number|#)\s*:?\s*(SPO\d+)").expect("order pattern");
    static ref BARE_ORDER: Regex = Regex::new(r"(?i)\b(SPO\d{8,})\b").expect("order pattern");
    static ref NAME: Regex = Regex::new(r"(?i)^(.+?)\s*-\s*US\s+").expect("name pattern");
    static ref US_SIZE: Regex =
        Regex::new(r"(?i)US\s+([0-9.]+(?:\s*[A-Z])?)").expect("size pattern");
    static ref BARE_SIZE: Regex =
        Regex::new(r"\b([0-9]{1,2}(?:\.[05])?)\b").expect("size pattern");
    static ref MULTIPLIER: Regex = Regex::new(r"×\s*(\d+)").expect("multiplier pattern");
    static ref NOT_SLUG: Regex = Regex::new(r"[^\w\s-]").expect("slug pattern");
    static ref SLUG_GAPS: Regex = Regex::new(r"[-\s]+").expect("slug pattern");
}

/// ShopSimon order confirmations.
///
/// Each `order-list__item` row has a title such as
/// `Men's adidas Adilette 22 Slides - US 7 / crystal white × 3`. The unique ID
/// is the slug of the name followed by the `×` number, and every row counts as
/// one unit.
pub struct ShopSimonParser;

fn order_number(email: &EmailMessage) -> Option<String> {
    if let Some(caps) = SUBJECT_ORDER.captures(&email.subject) {
        return Some(caps[1].to_string());
    }
    let text = html::text(&email.html);
    BODY_ORDER
        .captures(&text)
        .or_else(|| BARE_ORDER.captures(&text))
        .map(|caps| caps[1].to_string())
}

/// Lower-case words of `name` joined by hyphens, punctuation dropped.
pub fn slug(name: &str) -> String {
    let lower = name.to_lowercase();
    let cleaned = NOT_SLUG.replace_all(&lower, "");
    SLUG_GAPS
        .replace_all(&cleaned, "-")
        .trim_matches('-')
        .to_string()
}

/// Item described by a row title, `None` without a name or size.
pub fn title_item(title: &str) -> Option<OrderItem> {
    let product_name = match NAME.captures(title) {
        Some(caps) => caps[1].trim().to_string(),
        None => title.split(" - ").next().unwrap_or_default().trim().to_string(),
    };
    if product_name.is_empty() {
        return None;
    }

    let size = US_SIZE
        .captures(title)
        .or_else(|| BARE_SIZE.captures(title))
        .map(|caps| caps[1].trim().to_string())?;

    let mut unique_id = slug(&product_name);
    if let Some(caps) = MULTIPLIER.captures(title) {
        unique_id = format!("{unique_id}-{}", &caps[1]);
    }
    if unique_id.is_empty() {
        return None;
    }

    Some(OrderItem {
        unique_id,
        size: clean_size(&size),
        quantity: 1,
        product_name: Some(product_name),
    })
}

/// Item rows by class, else the rows around item titles.
fn item_rows(email_html: &str) -> Vec<html::Element<'_>> {
    let rows: Vec<_> = html::find_all(email_html, "tr")
        .into_iter()
        .filter(|row| row.has_class(ITEM_ROW_CLASS))
        .collect();
    if !rows.is_empty() {
        return rows;
    }

    let mut rows: Vec<html::Element<'_>> = Vec::new();
    for title in html::find_all(email_html, "span") {
        if !title.has_class(ITEM_TITLE_CLASS) {
            continue;
        }
        if let Some(row) = html::enclosing(email_html, "tr", title.start) {
            if !rows.iter().any(|known| known.start == row.start) {
                rows.push(row);
            }
        }
    }
    rows
}

impl OrderEmailParser for ShopSimonParser {
    fn key(&self) -> &'static str {
        "shopsimon"
    }

    fn retailer(&self) -> &'static str {
        "ShopSimon"
    }

    fn can_parse(&self, email: &EmailMessage) -> bool {
        email.sender.to_lowercase().contains(SENDER)
            && email.subject.to_lowercase().contains(SUBJECT)
    }

    fn parse(&self, email: &EmailMessage) -> Option<ParsedOrder> {
        if email.html.trim().is_empty() {
            log::error!("ShopSimon email has no HTML content");
            return None;
        }

        let Some(order_number) = order_number(email) else {
            log::error!("Failed to extract order number from ShopSimon email");
            return None;
        };

        let mut seen = HashSet::new();
        let mut items = Vec::new();
        for row in item_rows(&email.html) {
            let title = row
                .find_all("span")
                .into_iter()
                .find(|span| span.has_class(ITEM_TITLE_CLASS))
                .map(|span| span.text());
            let Some(item) = title.as_deref().and_then(title_item) else {
                log::warn!("ShopSimon item row without a usable title");
                continue;
            };
            if seen.insert((item.unique_id.clone(), item.size.clone())) {
                items.push(item);
            }
        }

        if items.is_empty() {
            log::error!("Failed to extract any items from ShopSimon order {order_number}");
            return None;
        }

        log::info!(
            "Extracted {} items from ShopSimon order {order_number}",
            items.len()
        );
        Some(ParsedOrder {
            retailer: self.retailer().to_string(),
            order_number,
            items,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_gives_slug_size_and_single_unit() {
        let item = title_item(
            "Men's adidas Adilette 22 Slides - US 7 / crystal white / crystal white / core bla× 3",
        )
        .expect("item");

        assert_eq!(item.unique_id, "mens-adidas-adilette-22-slides-3");
        assert_eq!(item.size, "7");
        assert_eq!(item.quantity, 1);
        assert_eq!(item.product_name.as_deref(), Some("Men's adidas Adilette 22 Slides"));

        // Titles without a numeric size are skipped.
        assert!(title_item("Tote Bag - One Size").is_none());
    }

    #[test]
    fn parses_item_rows_with_order_from_subject() {
        let html = r#"
            <table>
              <tr class="order-list__item order-list__item--single">
                <td><span class="order-list__item-title">Men's adidas Adilette 22 Slides - US 7 / crystal white&nbsp;&times;&nbsp;3</span></td>
              </tr>
              <tr class="order-list__item">
                <td><span class="order-list__item-title">Women's Nike Air Max 90 - US 8.5 / white&nbsp;&times;&nbsp;1</span></td>
              </tr>
            </table>"#;
        let email = EmailMessage {
            message_id: None,
            sender: "Shop Simon <onlinesupport@shopsimon.com>".to_string(),
            subject: "Your ShopSimon Order Is Confirmed - SPO414108538".to_string(),
            html: html.to_string(),
        };

        assert!(ShopSimonParser.can_parse(&email));
        let order = ShopSimonParser.parse(&email).expect("order parsed");

        assert_eq!(order.order_number, "SPO414108538");
        assert_eq!(order.items.len(), 2);
        assert_eq!(order.items[0].unique_id, "mens-adidas-adilette-22-slides-3");
        assert_eq!(order.items[1].unique_id, "womens-nike-air-max-90-1");
        assert_eq!(order.items[1].size, "8.5");
    }

    #[test]
    fn finds_rows_around_titles_and_order_in_body() {
        let html = r#"
            <p>Order Number: SPO414108539</p>
            <table><tr><td><span class="order-list__item-title">Puma Suede - US 10 / black</span></td></tr></table>"#;
        let email = EmailMessage {
            message_id: None,
            sender: "onlinesupport@shopsimon.com".to_string(),
            subject: "Your ShopSimon order is confirmed".to_string(),
            html: html.to_string(),
        };

        let order = ShopSimonParser.parse(&email).expect("order parsed");

        assert_eq!(order.order_number, "SPO414108539");
        assert_eq!(order.items[0].unique_id, "puma-suede");
        assert_eq!(order.items[0].size, "10");
    }
}

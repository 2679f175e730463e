use lazy_static::lazy_static;
use regex::Regex;

use crate::domain::retailer_order::{EmailMessage, OrderItem, ParsedOrder};
use crate::html;
use crate::parsers::OrderEmailParser;
use crate::parsers::sizes::{clean_size, is_valid_size};

const SENDER: &str = "finishline@notifications.finishline.com";
const SUBJECT: &str = "your order is official!";

lazy_static! {
    static ref PRODUCT_IMAGE: Regex =
        Regex::new(r"/finishline/([A-Za-z0-9_-]+)\?").expect("image pattern");
    static ref ORDER_NUMBER: Regex =
        Regex::new(r"(?i)Order\s+Number\s*:?\s*(\d{8,})").expect("order pattern");
    static ref ORDER_HASH: Regex =
        Regex::new(r"(?i)Order\s*#\s*:?\s*([A-Z0-9-]+)").expect("order pattern");
    static ref SIZE: Regex = Regex::new(r"(?i)\bSize\s*:\s*([0-9A-Za-z.]+)").expect("size pattern");
    static ref QTY: Regex = Regex::new(r"(?i)\b(?:Qty|Quantity)\s*:\s*(\d+)").expect("qty pattern");
}

/// Finish Line order confirmations.
///
/// Product images are named `/finishline/<STYLE_COLOR>?...`; the details cells
/// after each image read `Size: 12.0` and `Quantity: 2` (quantity defaults to 1).
pub struct FinishLineParser;

impl OrderEmailParser for FinishLineParser {
    fn key(&self) -> &'static str {
        "finishline"
    }

    fn retailer(&self) -> &'static str {
        "Finish Line"
    }

    fn can_parse(&self, email: &EmailMessage) -> bool {
        email.sender.to_lowercase().contains(SENDER)
            && email.subject.to_lowercase().contains(SUBJECT)
    }

    fn parse(&self, email: &EmailMessage) -> Option<ParsedOrder> {
        let text = html::text(&email.html);
        let order_number = ORDER_NUMBER
            .captures(&text)
            .or_else(|| ORDER_HASH.captures(&text))
            .map(|caps| caps[1].to_string());
        let Some(order_number) = order_number else {
            log::error!("Failed to extract order number from Finish Line email");
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
            let details = html::text(&email.html[*start..end]);

            let Some(size) = SIZE
                .captures(&details)
                .map(|caps| caps[1].to_string())
                .filter(|size| is_valid_size(size))
            else {
                log::warn!("Missing size for Finish Line item {unique_id}");
                continue;
            };
            let quantity = QTY
                .captures(&details)
                .and_then(|caps| caps[1].parse::<i32>().ok())
                .unwrap_or(1);

            items.push(OrderItem {
                unique_id: unique_id.clone(),
                size: clean_size(&size),
                quantity,
                product_name: product_name.clone(),
            });
        }

        if items.is_empty() {
            log::error!("Failed to extract any items from Finish Line order {order_number}");
            return None;
        }

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
    fn parses_style_color_and_details() {
        let html = r#"
            <p>Order Number: 60012345678</p>
            <table>
              <tr><td><img src="https://media.finishline.com/s/finishline/DV0833_104?$default$"></td>
                  <td class="orderDetails bold">Nike Air Force 1</td>
                  <td class="orderDetails">Size: 12.0</td>
                  <td class="orderDetails">Quantity: 2</td></tr>
              <tr><td><img src="https://media.finishline.com/s/finishline/FZ5808_001?$default$"></td>
                  <td class="orderDetails">Size: 9.5</td></tr>
            </table>"#;
        let email = EmailMessage {
            message_id: None,
            sender: "Finish Line <finishline@notifications.finishline.com>".to_string(),
            subject: "Your order is official!".to_string(),
            html: html.to_string(),
        };

        assert!(FinishLineParser.can_parse(&email));
        let order = FinishLineParser.parse(&email).expect("order parsed");

        assert_eq!(order.order_number, "60012345678");
        assert_eq!(order.items.len(), 2);
        assert_eq!(order.items[0].unique_id, "DV0833_104");
        assert_eq!(order.items[0].size, "12");
        assert_eq!(order.items[0].quantity, 2);
        assert_eq!(order.items[1].unique_id, "FZ5808_001");
        assert_eq!(order.items[1].quantity, 1);
    }
}

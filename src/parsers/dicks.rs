use lazy_static::lazy_static;
use regex::Regex;

use crate::domain::retailer_order::{EmailMessage, OrderItem, ParsedOrder};
use crate::html;
use crate::parsers::OrderEmailParser;
use crate::parsers::sizes::clean_size;

const SENDER: &str = "from@notifications.dcsg.com";
const ORDER_LINK_HOST: &str = "notifications.dcsg.com";
const PRODUCT_IMAGE_HOST: &str = "dks.scene7.com/is/image/dkscdn/";

lazy_static! {
    static ref SENDER_MARKER: Regex = Regex::new(r"(?i)dicks|dcsg").expect("sender pattern");
    static ref THANK_YOU: Regex =
        Regex::new(r"(?i)thank you for your order").expect("subject pattern");
    static ref PRODUCT_IMAGE: Regex = Regex::new(r"dkscdn/([A-Z0-9]+)_").expect("image pattern");
    static ref LINKED_ORDER: Regex = Regex::new(r"^\d{8,15}$").expect("order pattern");
    static ref BARE_ORDER: Regex = Regex::new(r"\b(\d{8,15})\b").expect("order pattern");
    static ref SHOE_SIZE: Regex = Regex::new(r"Shoe\s+Size[:\s]+([\d.]+)").expect("size pattern");
    static ref NON_NUMERIC: Regex = Regex::new(r"[^\d.]").expect("size pattern");
}

/// Dick's Sporting Goods order confirmations.
///
/// The order number is the text of a link back to the notification host.
/// Each product image `dkscdn/<ID>_...` sits in a table row that also holds
/// the bold product name and a `Shoe Size` label. Quantities are not shown,
/// every line counts as one unit.
pub struct DicksParser;

fn is_shoe_size(size: &str) -> bool {
    NON_NUMERIC
        .replace_all(size, "")
        .parse::<f64>()
        .map(|value| (2.0..=20.0).contains(&value))
        .unwrap_or(false)
}

fn order_number(email_html: &str) -> Option<String> {
    let linked = html::find_all(email_html, "a")
        .into_iter()
        .filter(|link| {
            link.attr("href")
                .map(|href| href.contains(ORDER_LINK_HOST))
                .unwrap_or(false)
        })
        .map(|link| link.text())
        .find(|text| LINKED_ORDER.is_match(text));
    if linked.is_some() {
        return linked;
    }

    BARE_ORDER
        .captures(&html::text(email_html))
        .map(|caps| caps[1].to_string())
}

/// Bold text of the row, preferring bold text inside a link.
fn product_name(row: &html::Element<'_>) -> Option<String> {
    let linked = row
        .find_all("a")
        .into_iter()
        .find_map(|link| link.find_all("b").into_iter().next())
        .map(|bold| bold.text());
    linked
        .or_else(|| {
            row.find_all("b")
                .into_iter()
                .map(|bold| bold.text())
                .find(|text| text.len() > 5)
        })
        .filter(|name| !name.is_empty())
}

impl OrderEmailParser for DicksParser {
    fn key(&self) -> &'static str {
        "dicks"
    }

    fn retailer(&self) -> &'static str {
        "Dick's Sporting Goods"
    }

    fn can_parse(&self, email: &EmailMessage) -> bool {
        let sender = email.sender.to_lowercase();
        let from_retailer = sender.contains(SENDER) || SENDER_MARKER.is_match(&sender);
        from_retailer && THANK_YOU.is_match(&email.subject)
    }

    fn parse(&self, email: &EmailMessage) -> Option<ParsedOrder> {
        if email.html.trim().is_empty() {
            log::error!("Dick's email has no HTML content");
            return None;
        }

        let Some(order_number) = order_number(&email.html) else {
            log::error!("Failed to extract order number from Dick's email");
            return None;
        };

        let mut items = Vec::new();
        for img in html::find_all(&email.html, "img") {
            let Some(src) = img.attr("src").filter(|src| src.contains(PRODUCT_IMAGE_HOST)) else {
                continue;
            };
            let Some(unique_id) = PRODUCT_IMAGE.captures(src).map(|caps| caps[1].to_string())
            else {
                log::warn!("Could not extract unique ID from Dick's image {src}");
                continue;
            };
            let Some(row) = html::enclosing(&email.html, "tr", img.start) else {
                log::warn!("No product row around Dick's image {src}");
                continue;
            };

            let size = SHOE_SIZE
                .captures(&row.text())
                .map(|caps| caps[1].to_string())
                .filter(|size| is_shoe_size(size));
            match size {
                Some(size) => items.push(OrderItem {
                    unique_id,
                    size: clean_size(&size),
                    quantity: 1,
                    product_name: product_name(&row),
                }),
                None => log::warn!("Missing or invalid size for Dick's item {unique_id}"),
            }
        }

        if items.is_empty() {
            log::error!("Failed to extract any items from Dick's order {order_number}");
            return None;
        }

        log::info!(
            "Extracted {} items from Dick's order {order_number}",
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

    fn email(html: &str) -> EmailMessage {
        EmailMessage {
            message_id: None,
            sender: "DICK'S Sporting Goods <from@notifications.dcsg.com>".to_string(),
            subject: "Thank you for your order!".to_string(),
            html: html.to_string(),
        }
    }

    #[test]
    fn reads_linked_order_number_and_rows() {
        let html = r#"
            <p>Order <a href="https://notifications.dcsg.com/track?o=1">10234567890</a></p>
            <table>
              <tr>
                <td><img src="https://dks.scene7.com/is/image/dkscdn/22MAZWCLDMNSTRCLVFTW_White_Flame?wid=150"></td>
                <td><a href="https://www.dickssportinggoods.com/p/1"><b>Nike Men's
                    Dunk Low Shoes</b></a><p>Shoe Size: 08.0</p></td>
              </tr>
              <tr>
                <td><img src="https://dks.scene7.com/is/image/dkscdn/20NIKMDNKLWRTRXXXFTW_Black"></td>
                <td><b>Nike Air Max</b><p>Shoe Size 10.5</p></td>
              </tr>
              <tr>
                <td><img src="https://dks.scene7.com/is/image/dkscdn/21ADIUSLTRBSTXXXXAPP_Red"></td>
                <td><b>adidas Hoodie</b><p>Size: M</p></td>
              </tr>
            </table>"#;

        let order = DicksParser.parse(&email(html)).expect("order parsed");

        assert_eq!(order.retailer, "Dick's Sporting Goods");
        assert_eq!(order.order_number, "10234567890");
        assert_eq!(order.items.len(), 2);
        assert_eq!(order.items[0].unique_id, "22MAZWCLDMNSTRCLVFTW");
        assert_eq!(order.items[0].size, "8");
        assert_eq!(order.items[0].quantity, 1);
        assert_eq!(
            order.items[0].product_name.as_deref(),
            Some("Nike Men's Dunk Low Shoes")
        );
        assert_eq!(order.items[1].unique_id, "20NIKMDNKLWRTRXXXFTW");
        assert_eq!(order.items[1].size, "10.5");
        assert_eq!(order.items[1].product_name.as_deref(), Some("Nike Air Max"));
    }

    #[test]
    fn falls_back_to_number_in_text() {
        let html = r#"<p>Order #: 99887766</p><table><tr>
            <td><img src="https://dks.scene7.com/is/image/dkscdn/19JRDMRTRXXXXXXXXFTW_Blue"></td>
            <td><b>Jordan Retro</b> Shoe Size: 9</td></tr></table>"#;

        let order = DicksParser.parse(&email(html)).expect("order parsed");

        assert_eq!(order.order_number, "99887766");
        assert_eq!(order.items[0].size, "9");
    }

    #[test]
    fn recognises_sender_and_subject() {
        assert!(DicksParser.can_parse(&email("")));
        let other = EmailMessage {
            sender: "accountservices@em.footlocker.com".to_string(),
            ..email("")
        };
        assert!(!DicksParser.can_parse(&other));
    }
}

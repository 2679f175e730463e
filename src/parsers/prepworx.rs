//! PrepWorx warehouse "Inbound ... has been processed" notifications.

use lazy_static::lazy_static;
use regex::Regex;

use crate::domain::retailer_order::{EmailMessage, InboundItem, InboundShipment};
use crate::html;

const SENDER: &str = "beta@prepworx.io";

lazy_static! {
    static ref SUBJECT: Regex =
        Regex::new(r"(?i)Inbound.*has been processed").expect("subject pattern");
    static ref SHIPMENT: Regex =
        Regex::new(r"(?i)Inbound\s+([A-Z0-9\s-]+?)\s+has\s+been\s+processed")
            .expect("shipment pattern");
    static ref SHIPMENT_FALLBACK: Regex =
        Regex::new(r"(?i)Inbound\s+([A-Z0-9-]+)").expect("shipment pattern");
    static ref ITEM_ASIN: Regex =
        Regex::new(r"^(.*?)\s+-\s*(B[A-Z0-9]{9})\s*$").expect("item pattern");
    static ref SIZE_TOKEN: Regex = Regex::new(r"^\d{1,2}(?:\.\d{1,2})?$").expect("size pattern");
    static ref TOKEN_SPLIT: Regex = Regex::new(r"[\s-]+").expect("split pattern");
}

pub fn can_parse(email: &EmailMessage) -> bool {
    let sender = email.sender.to_lowercase();
    (sender.contains(SENDER) || sender.contains("prepworx")) && SUBJECT.is_match(&email.subject)
}

/// Shipment number quoted in the subject.
pub fn shipment_number(subject: &str) -> Option<String> {
    SHIPMENT
        .captures(subject)
        .or_else(|| SHIPMENT_FALLBACK.captures(subject))
        .map(|caps| caps[1].trim().to_string())
        .filter(|number| !number.is_empty())
}

/// Shoe size near the end of an item name, between 2 and 15.
///
/// The last four tokens are searched from the end so trailing product codes
/// like `943345-037` are skipped.
pub fn size_from_item_name(item_name: &str) -> Option<String> {
    let tokens: Vec<&str> = TOKEN_SPLIT
        .split(item_name.trim())
        .filter(|token| !token.is_empty())
        .collect();

    tokens
        .iter()
        .enumerate()
        .rev()
        .take(4)
        .filter(|(index, _)| *index > 0)
        .map(|(_, token)| *token)
        .find(|token| {
            SIZE_TOKEN.is_match(token)
                && token
                    .parse::<f64>()
                    .map(|value| (2.0..=15.0).contains(&value))
                    .unwrap_or(false)
        })
        .map(str::to_string)
}

/// Item row `"<name> - <ASIN>"` with its quantity cell.
fn parse_item(item_text: &str, quantity_text: &str) -> Option<InboundItem> {
    let caps = ITEM_ASIN.captures(item_text.trim())?;
    let item_name = caps[1].trim().to_string();
    if item_name.is_empty() {
        return None;
    }
    let quantity = match quantity_text.trim().parse::<i32>() {
        Ok(quantity) => quantity,
        Err(_) => {
            log::warn!("Invalid PrepWorx quantity: {quantity_text}");
            return None;
        }
    };

    Some(InboundItem {
        size: size_from_item_name(&item_name),
        asin: caps[2].to_string(),
        item_name,
        quantity,
    })
}

/// Extract the shipment and its item rows, `None` when nothing matched.
pub fn parse(email: &EmailMessage) -> Option<InboundShipment> {
    let Some(order_number) = shipment_number(&email.subject) else {
        log::error!("Failed to extract shipment number from subject: {}", email.subject);
        return None;
    };

    let items: Vec<InboundItem> = html::find_all(&email.html, "tr")
        .into_iter()
        .filter_map(|row| {
            let cells = row.find_all("td");
            if cells.len() != 2 {
                return None;
            }
            parse_item(&cells[0].text(), &cells[1].text())
        })
        .collect();

    if items.is_empty() {
        log::error!("No items found in PrepWorx inbound {order_number}");
        return None;
    }

    log::info!(
        "Extracted {} items from PrepWorx inbound {order_number}",
        items.len()
    );
    Some(InboundShipment {
        order_number,
        items,
    })
}

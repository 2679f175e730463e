//! Parsers turning retailer and warehouse emails into orders and shipments.

use crate::domain::retailer_order::{EmailMessage, ParsedOrder};

pub mod dicks;
pub mod finishline;
pub mod footlocker;
pub mod hibbett;
pub mod prepworx;
pub mod shoepalace;
pub mod shopsimon;
pub mod sizes;
pub mod snipes;

/// Parser of one retailer's order confirmation emails.
pub trait OrderEmailParser: Send + Sync {
    /// Lower-case key used to address the parser, e.g. `"footlocker"`.
    fn key(&self) -> &'static str;

    /// Display name stored on the parsed order.
    fn retailer(&self) -> &'static str;

    /// Whether the sender and subject identify an order confirmation.
    fn can_parse(&self, email: &EmailMessage) -> bool;

    /// Extract the order, `None` when the markup does not match.
    fn parse(&self, email: &EmailMessage) -> Option<ParsedOrder>;
}

/// Every known order parser, in matching order.
pub fn order_parsers() -> Vec<Box<dyn OrderEmailParser>> {
    vec![
        Box::new(footlocker::FootLockerParser::footlocker()),
        Box::new(footlocker::FootLockerParser::champs()),
        Box::new(dicks::DicksParser),
        Box::new(hibbett::HibbettParser),
        Box::new(shoepalace::ShoePalaceParser),
        Box::new(snipes::SnipesParser),
        Box::new(finishline::FinishLineParser),
        Box::new(shopsimon::ShopSimonParser),
    ]
}

/// Parser registered under `key`, compared case-insensitively.
pub fn parser_for(key: &str) -> Option<Box<dyn OrderEmailParser>> {
    let key = key.trim().to_ascii_lowercase().replace([' ', '-', '_'], "");
    order_parsers()
        .into_iter()
        .find(|parser| parser.key() == key)
}

/// First parser recognising the email.
pub fn detect_parser(email: &EmailMessage) -> Option<Box<dyn OrderEmailParser>> {
    order_parsers()
        .into_iter()
        .find(|parser| parser.can_parse(email))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_parsers_by_key() {
        assert_eq!(parser_for("FootLocker").map(|p| p.retailer()), Some("Foot Locker"));
        assert_eq!(parser_for("finish-line").map(|p| p.key()), Some("finishline"));
        assert_eq!(parser_for("Snipes").map(|p| p.retailer()), Some("Snipes"));
        assert_eq!(parser_for("shoe_palace").map(|p| p.key()), Some("shoepalace"));
        assert_eq!(parser_for("shopsimon").map(|p| p.retailer()), Some("ShopSimon"));
        assert_eq!(parser_for("dicks").map(|p| p.key()), Some("dicks"));
        assert!(parser_for("nike").is_none());
    }

    #[test]
    fn detects_parser_from_sender_and_subject() {
        let email = EmailMessage {
            message_id: None,
            sender: "Hibbett <hibbett@email.hibbett.com>".to_string(),
            subject: "Confirmation of your Order #1234567890123".to_string(),
            html: String::new(),
        };
        assert_eq!(detect_parser(&email).map(|p| p.key()), Some("hibbett"));

        let unrelated = EmailMessage {
            sender: "news@example.com".to_string(),
            subject: "Weekly deals".to_string(),
            ..email
        };
        assert!(detect_parser(&unrelated).is_none());
    }
}

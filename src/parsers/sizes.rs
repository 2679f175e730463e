use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref DECIMAL: Regex = Regex::new(r"^\d{1,2}\.\d$").expect("decimal size pattern");
    static ref WHOLE: Regex = Regex::new(r"^\d{1,2}$").expect("whole size pattern");
    static ref SUFFIXED: Regex =
        Regex::new(r"(?i)^\d{1,2}(\.\d)?[YW]$|^\d{1,2}[TC]$").expect("suffixed size pattern");
    static ref LETTER: Regex = Regex::new(r"(?i)^[SMLX]+$|^OS(FM)?$").expect("letter size pattern");
    static ref QUANTITY: Regex = Regex::new(r"^\d+$").expect("quantity pattern");
}

/// Largest quantity a single order line is expected to carry.
pub const MAX_LINE_QUANTITY: i32 = 20;

/// Whether `size` looks like a shoe or apparel size.
pub fn is_valid_size(size: &str) -> bool {
    let size = size.trim();
    if DECIMAL.is_match(size) || SUFFIXED.is_match(size) || LETTER.is_match(size) {
        return true;
    }
    if WHOLE.is_match(size) {
        return size
            .parse::<u32>()
            .map(|n| (4..=18).contains(&n))
            .unwrap_or(false);
    }
    false
}

/// Parse a line quantity, accepting 1 through [`MAX_LINE_QUANTITY`].
pub fn parse_quantity(quantity: &str) -> Option<i32> {
    let quantity = quantity.trim();
    if !QUANTITY.is_match(quantity) {
        return None;
    }
    quantity
        .parse::<i32>()
        .ok()
        .filter(|n| (1..=MAX_LINE_QUANTITY).contains(n))
}

/// Drop zero padding and a trailing `.0`: `"07.0"` becomes `"7"`, `"09.5"` becomes `"9.5"`.
pub fn clean_size(size: &str) -> String {
    let size = size.trim();
    if !DECIMAL.is_match(size) {
        return size.to_string();
    }
    match size.parse::<f64>() {
        Ok(value) if value.fract() == 0.0 => format!("{}", value as i64),
        Ok(value) => format!("{value}"),
        Err(_) => size.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cleans_padded_sizes() {
        assert_eq!(clean_size("07.0"), "7");
        assert_eq!(clean_size("09.5"), "9.5");
        assert_eq!(clean_size("14.0"), "14");
        assert_eq!(clean_size("10.5Y"), "10.5Y");
    }

    #[test]
    fn validates_sizes() {
        for size in ["8", "18", "10.5", "5Y", "13.5Y", "10T", "5C", "11.5W", "XL", "OSFM"] {
            assert!(is_valid_size(size), "{size} should be valid");
        }
        for size in ["3", "19", "Guide", "", "123"] {
            assert!(!is_valid_size(size), "{size} should be invalid");
        }
    }

    #[test]
    fn validates_quantities() {
        assert_eq!(parse_quantity("1"), Some(1));
        assert_eq!(parse_quantity(" 20 "), Some(20));
        assert_eq!(parse_quantity("0"), None);
        assert_eq!(parse_quantity("21"), None);
        assert_eq!(parse_quantity("-1"), None);
    }
}

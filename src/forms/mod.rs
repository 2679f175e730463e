use std::num::ParseFloatError;

pub mod checkins;
pub mod leads;
pub mod purchases;
pub mod retailers;
pub mod users;

/// Collapse whitespace runs and drop control characters.
pub(crate) fn sanitize_inline_text(input: &str) -> String {
    let mut sanitized = String::with_capacity(input.len());
    let mut previous_whitespace = false;

    for ch in input.trim().chars() {
        if ch.is_whitespace() {
            if !previous_whitespace {
                sanitized.push(' ');
                previous_whitespace = true;
            }
        } else if ch.is_control() {
            continue;
        } else {
            sanitized.push(ch);
            previous_whitespace = false;
        }
    }

    sanitized
}

/// Sanitize each line, trimming blank lines at both ends and squashing repeated ones.
pub(crate) fn sanitize_multiline_text(input: &str) -> String {
    let mut result: Vec<String> = Vec::new();
    let mut previous_empty = true;

    for line in input.lines().map(sanitize_inline_text) {
        if line.is_empty() {
            if !previous_empty {
                result.push(String::new());
            }
            previous_empty = true;
        } else {
            result.push(line);
            previous_empty = false;
        }
    }

    while matches!(result.last(), Some(line) if line.is_empty()) {
        result.pop();
    }

    result.join("\n")
}

/// Trimmed text, `None` when blank.
pub(crate) fn non_empty(input: Option<&str>) -> Option<String> {
    input
        .map(sanitize_multiline_text)
        .filter(|value| !value.is_empty())
}

/// Parse an amount typed by a person: `$1,299.99`, `35%`, `12`.
pub(crate) fn parse_money(input: &str) -> Result<Option<f64>, ParseFloatError> {
    let cleaned: String = input
        .chars()
        .filter(|ch| !matches!(ch, '$' | ',' | '%') && !ch.is_whitespace())
        .collect();
    if cleaned.is_empty() {
        return Ok(None);
    }
    cleaned.parse().map(Some)
}

/// Spreadsheet-style booleans; blank reads as `false`.
pub(crate) fn parse_bool(input: &str) -> Option<bool> {
    match input.trim().to_ascii_lowercase().as_str() {
        "" | "false" | "no" | "n" | "0" => Some(false),
        "true" | "yes" | "y" | "1" | "x" => Some(true),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn money_accepts_currency_formatting() {
        assert_eq!(parse_money("$1,299.99"), Ok(Some(1299.99)));
        assert_eq!(parse_money(" 35% "), Ok(Some(35.0)));
        assert_eq!(parse_money(""), Ok(None));
        assert!(parse_money("abc").is_err());
    }

    #[test]
    fn multiline_text_is_normalised() {
        assert_eq!(
            sanitize_multiline_text("\n  First   line.\n\n\n Second line.  \n\n"),
            "First line.\n\nSecond line."
        );
    }
}

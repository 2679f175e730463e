//! Visual availability heuristic for size options.
//!
//! Amazon renders sizes that are out of stock in a light grey, sometimes faded
//! or struck through. An option is considered available when its label is dark
//! enough, opaque enough and not crossed out.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Effective brightness at or above which a label reads as greyed out.
pub const BRIGHTNESS_THRESHOLD: f64 = 150.0;

/// Opacity at or below which a label reads as faded.
pub const MIN_OPACITY: f64 = 0.8;

#[derive(Debug, Error, PartialEq)]
pub enum ColorError {
    #[error("unsupported colour `{0}`")]
    Unsupported(String),
    #[error("invalid colour component in `{0}`")]
    Component(String),
    #[error("invalid opacity `{0}`")]
    Opacity(String),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f64,
}

impl Rgba {
    const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Perceived luminance `0.299R + 0.587G + 0.114B`.
    pub fn luminance(&self) -> f64 {
        0.299 * f64::from(self.r) + 0.587 * f64::from(self.g) + 0.114 * f64::from(self.b)
    }
}

/// Computed style of an option label as reported by the browser.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionStyle {
    pub color: String,
    #[serde(default = "default_opacity")]
    pub opacity: String,
    #[serde(default)]
    pub text_decoration: String,
}

fn default_opacity() -> String {
    "1".to_string()
}

impl OptionStyle {
    pub fn new(color: impl Into<String>) -> Self {
        Self {
            color: color.into(),
            opacity: default_opacity(),
            text_decoration: String::new(),
        }
    }

    pub fn with_opacity(mut self, opacity: impl Into<String>) -> Self {
        self.opacity = opacity.into();
        self
    }

    pub fn with_text_decoration(mut self, decoration: impl Into<String>) -> Self {
        self.text_decoration = decoration.into();
        self
    }

    /// Read `color`, `opacity` and `text-decoration` from an inline `style` attribute.
    pub fn from_inline(style: &str) -> Option<Self> {
        let mut parsed: Option<Self> = None;
        let mut opacity = None;
        let mut decoration = None;

        for declaration in style.split(';') {
            let Some((property, value)) = declaration.split_once(':') else {
                continue;
            };
            let value = value.trim().to_string();
            match property.trim().to_ascii_lowercase().as_str() {
                "color" => parsed = Some(Self::new(value)),
                "opacity" => opacity = Some(value),
                "text-decoration" | "text-decoration-line" => decoration = Some(value),
                _ => {}
            }
        }

        let mut style = parsed?;
        if let Some(opacity) = opacity {
            style.opacity = opacity;
        }
        if let Some(decoration) = decoration {
            style.text_decoration = decoration;
        }
        Some(style)
    }
}

/// Parse a CSS colour: `rgb()`, `rgba()`, `#rgb`, `#rrggbb` or a basic name.
pub fn parse_color(value: &str) -> Result<Rgba, ColorError> {
    let value = value.trim().to_ascii_lowercase();

    if let Some(hex) = value.strip_prefix('#') {
        return parse_hex(hex).ok_or_else(|| ColorError::Component(value.clone()));
    }

    if let Some(args) = value
        .strip_prefix("rgba(")
        .or_else(|| value.strip_prefix("rgb("))
        .and_then(|rest| rest.strip_suffix(')'))
    {
        return parse_functional(args).ok_or_else(|| ColorError::Component(value.clone()));
    }

    named_color(&value).ok_or(ColorError::Unsupported(value))
}

fn parse_hex(hex: &str) -> Option<Rgba> {
    let channel = |s: &str| u8::from_str_radix(s, 16).ok();
    match hex.len() {
        3 => {
            let mut digits = hex.chars().map(|c| channel(&c.to_string()).map(|v| v * 17));
            Some(Rgba::opaque(digits.next()??, digits.next()??, digits.next()??))
        }
        6 => Some(Rgba::opaque(
            channel(&hex[0..2])?,
            channel(&hex[2..4])?,
            channel(&hex[4..6])?,
        )),
        _ => None,
    }
}

fn parse_functional(args: &str) -> Option<Rgba> {
    let parts: Vec<&str> = args
        .split([',', '/', ' '])
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect();
    if parts.len() != 3 && parts.len() != 4 {
        return None;
    }

    let channel = |s: &str| -> Option<u8> {
        let value: f64 = s.parse().ok()?;
        Some(value.clamp(0.0, 255.0).round() as u8)
    };
    let alpha = match parts.get(3) {
        Some(raw) => parse_alpha(raw)?,
        None => 1.0,
    };

    Some(Rgba {
        r: channel(parts[0])?,
        g: channel(parts[1])?,
        b: channel(parts[2])?,
        a: alpha,
    })
}

fn parse_alpha(raw: &str) -> Option<f64> {
    let value = match raw.strip_suffix('%') {
        Some(percent) => percent.parse::<f64>().ok()? / 100.0,
        None => raw.parse::<f64>().ok()?,
    };
    Some(value.clamp(0.0, 1.0))
}

fn named_color(name: &str) -> Option<Rgba> {
    let color = match name {
        "black" => Rgba::opaque(0, 0, 0),
        "white" => Rgba::opaque(255, 255, 255),
        "gray" | "grey" => Rgba::opaque(128, 128, 128),
        "darkgray" | "darkgrey" => Rgba::opaque(169, 169, 169),
        "lightgray" | "lightgrey" => Rgba::opaque(211, 211, 211),
        "silver" => Rgba::opaque(192, 192, 192),
        "red" => Rgba::opaque(255, 0, 0),
        "green" => Rgba::opaque(0, 128, 0),
        "blue" => Rgba::opaque(0, 0, 255),
        "transparent" => Rgba {
            r: 0,
            g: 0,
            b: 0,
            a: 0.0,
        },
        _ => return None,
    };
    Some(color)
}

/// Brightness of the label blended over a white background.
pub fn effective_brightness(color: &Rgba, opacity: f64) -> f64 {
    let alpha = (color.a * opacity).clamp(0.0, 1.0);
    color.luminance() * alpha + 255.0 * (1.0 - alpha)
}

/// Strict classification, failing on styles that cannot be parsed.
pub fn analyze(style: &OptionStyle) -> Result<bool, ColorError> {
    let color = parse_color(&style.color)?;
    let opacity_raw = style.opacity.trim();
    let opacity = if opacity_raw.is_empty() {
        1.0
    } else {
        opacity_raw
            .parse::<f64>()
            .map_err(|_| ColorError::Opacity(style.opacity.clone()))?
    };
    let struck = style
        .text_decoration
        .to_ascii_lowercase()
        .contains("line-through");

    Ok(effective_brightness(&color, opacity) < BRIGHTNESS_THRESHOLD
        && opacity > MIN_OPACITY
        && !struck)
}

/// Whether the option looks purchasable. Unreadable styles count as available.
pub fn is_available(style: &OptionStyle) -> bool {
    analyze(style).unwrap_or_else(|err| {
        log::debug!("Visual analysis failed, assuming available: {err}");
        true
    })
}

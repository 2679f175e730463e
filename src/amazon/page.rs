//! [`PageDriver`] over a product page captured by the browser extension.
//!
//! The extension inlines each option's computed `color`, `opacity` and
//! `text-decoration` into its `style` attribute before sending the snapshot,
//! so the availability heuristic sees what the shopper saw. Selecting an option
//! switches the page to the ASIN its markup points at.

use std::time::Duration;

use lazy_static::lazy_static;
use regex::Regex;
use serde::Deserialize;

use crate::amazon::color::OptionStyle;
use crate::amazon::variants::{
    DriverError, PageDriver, SizeOption, SizeSelector, asin_from_url, is_asin,
};
use crate::html::{self, Element};

/// Label colour Amazon uses for regular text.
const DEFAULT_TEXT_COLOR: &str = "#0f1111";

const DROPDOWN_IDS: [&str; 2] = ["native_dropdown_selected_size_name", "dropdown_selected_size_name"];
const TWISTER_MARKERS: [&str; 3] = ["inline-twister-row-size_name", "variation_size_name", "tp-inline-twister"];

lazy_static! {
    static ref DP_SEGMENT: Regex = Regex::new(r"/dp/[A-Z0-9]{10}").expect("dp pattern");
    static ref SELECT_PREFIX: Regex = Regex::new(r"(?i)^click to select\s+").expect("title pattern");
}

/// Page snapshot sent by the extension.
#[derive(Debug, Clone, Deserialize)]
pub struct PageSnapshot {
    pub url: String,
    pub html: String,
}

#[derive(Debug, Clone)]
struct ParsedOption {
    option: SizeOption,
    asin: Option<String>,
}

#[derive(Debug, Clone)]
pub struct HtmlProductPage {
    url: String,
    hidden_asin: Option<String>,
    selector: Option<SizeSelector>,
    options: Vec<ParsedOption>,
    waited: Duration,
}

impl HtmlProductPage {
    pub fn new(snapshot: PageSnapshot) -> Self {
        let hidden_asin = html::find_all(&snapshot.html, "input")
            .into_iter()
            .find(|input| {
                input.attr("id") == Some("ASIN")
                    || input.attr("name").is_some_and(|name| name.eq_ignore_ascii_case("asin"))
            })
            .and_then(|input| input.attr("value").map(str::to_string))
            .filter(|asin| is_asin(asin));

        let (selector, options) = match dropdown_options(&snapshot.html) {
            Some(options) => (Some(SizeSelector::Dropdown), options),
            None => match twister_options(&snapshot.html) {
                Some(options) => (Some(SizeSelector::InlineTwister), options),
                None => (None, Vec::new()),
            },
        };

        Self {
            url: snapshot.url,
            hidden_asin,
            selector,
            options,
            waited: Duration::ZERO,
        }
    }

    /// Total time the detector asked to wait.
    pub fn waited(&self) -> Duration {
        self.waited
    }
}

fn dropdown_options(page: &str) -> Option<Vec<ParsedOption>> {
    let select = html::find_all(page, "select").into_iter().find(|select| {
        select
            .attr("id")
            .is_some_and(|id| DROPDOWN_IDS.contains(&id))
            || select.attr("name").is_some_and(|name| name.contains("size"))
    })?;

    let options = select
        .find_all("option")
        .into_iter()
        .filter(|option| option.attr("value") != Some("-1"))
        .map(|option| {
            let asin = option
                .attr("value")
                .and_then(|value| value.rsplit(',').next())
                .map(str::trim)
                .filter(|asin| is_asin(asin))
                .map(str::to_string);
            let label = option
                .attr("data-a-html-content")
                .map(html::normalize_ws)
                .filter(|label| !label.is_empty())
                .unwrap_or_else(|| option.text());
            (label, style_of(&option), option.has_attr("selected"), asin)
        })
        .enumerate()
        .map(|(index, (label, style, selected, asin))| ParsedOption {
            option: SizeOption {
                index,
                label,
                style,
                selected,
                asin: asin.clone(),
            },
            asin,
        })
        .collect();
    Some(options)
}

fn twister_options(page: &str) -> Option<Vec<ParsedOption>> {
    let container = ["div", "ul"].iter().find_map(|tag| {
        html::find_all(page, tag).into_iter().find(|element| {
            element
                .attr("id")
                .is_some_and(|id| TWISTER_MARKERS.iter().any(|marker| id.contains(marker)))
        })
    })?;

    let tiles: Vec<ParsedOption> = container
        .find_all("li")
        .into_iter()
        .filter_map(|tile| {
            let asin = tile_asin(&tile);
            let label = tile_label(&tile)?;
            Some((tile, label, asin))
        })
        .enumerate()
        .map(|(index, (tile, label, asin))| ParsedOption {
            option: SizeOption {
                index,
                label,
                style: style_of(&tile),
                selected: tile.has_class("swatchSelect")
                    || tile.has_class("selected")
                    || tile.attr("aria-checked") == Some("true"),
                asin: asin.clone(),
            },
            asin,
        })
        .collect();
    Some(tiles)
}

fn tile_asin(tile: &Element<'_>) -> Option<String> {
    ["data-defaultasin", "data-asin", "data-csa-c-item-id"]
        .iter()
        .filter_map(|name| tile.attr(name))
        .map(str::trim)
        .find(|asin| is_asin(asin))
        .map(str::to_string)
        .or_else(|| tile.attr("data-dp-url").and_then(asin_from_url))
}

fn tile_label(tile: &Element<'_>) -> Option<String> {
    let text = tile.text();
    if !text.is_empty() {
        return Some(text);
    }
    tile.attr("title")
        .map(|title| SELECT_PREFIX.replace(title.trim(), "").to_string())
        .filter(|label| !label.is_empty())
}

fn style_of(element: &Element<'_>) -> OptionStyle {
    element
        .attr("style")
        .and_then(OptionStyle::from_inline)
        .unwrap_or_else(|| OptionStyle::new(DEFAULT_TEXT_COLOR))
}

impl PageDriver for HtmlProductPage {
    fn url(&self) -> String {
        self.url.clone()
    }

    fn hidden_asin(&self) -> Option<String> {
        self.hidden_asin.clone()
    }

    fn size_selector(&self) -> Option<SizeSelector> {
        self.selector
    }

    fn size_options(&self, selector: SizeSelector) -> Vec<SizeOption> {
        if self.selector != Some(selector) {
            return Vec::new();
        }
        self.options.iter().map(|parsed| parsed.option.clone()).collect()
    }

    fn select_option(&mut self, selector: SizeSelector, index: usize) -> Result<(), DriverError> {
        if self.selector != Some(selector) {
            return Err(DriverError::Rejected("selector not present".to_string()));
        }
        let asin = self
            .options
            .get(index)
            .ok_or(DriverError::NoSuchOption(index))?
            .asin
            .clone()
            .ok_or_else(|| DriverError::Rejected(format!("option {index} has no ASIN")))?;

        for (position, parsed) in self.options.iter_mut().enumerate() {
            parsed.option.selected = position == index;
        }
        self.url = DP_SEGMENT
            .replace(&self.url, format!("/dp/{asin}").as_str())
            .to_string();
        self.hidden_asin = Some(asin);
        Ok(())
    }

    fn wait(&mut self, duration: Duration) {
        self.waited += duration;
    }
}

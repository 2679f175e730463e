//! ASIN/size variant detection.
//!
//! Callers only see [`VariantSource`]; the catalog lookup and the live
//! page-driving heuristic are interchangeable behind it.

use std::collections::HashSet;
use std::time::Duration;

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::amazon::catalog::KnownProducts;
use crate::amazon::color::{OptionStyle, is_available};

/// Rounds spent waiting for the ASIN to change after a selection.
pub const POLL_ROUNDS: usize = 10;

/// Delay between two polling rounds.
pub const POLL_INTERVAL: Duration = Duration::from_millis(600);

lazy_static! {
    static ref URL_ASIN: Regex =
        Regex::new(r"/(?:dp|gp/product)/([A-Z0-9]{10})(?:[/?#]|$)").expect("url asin pattern");
    static ref ASIN: Regex = Regex::new(r"^[A-Z0-9]{10}$").expect("asin pattern");
}

/// ASIN found in an Amazon product URL.
pub fn asin_from_url(url: &str) -> Option<String> {
    URL_ASIN.captures(url).map(|caps| caps[1].to_string())
}

pub fn is_asin(value: &str) -> bool {
    ASIN.is_match(value)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VariantSourceKind {
    KnownProduct,
    Dropdown,
    InlineTwister,
}

/// One size of a product together with its ASIN.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantObservation {
    pub asin: String,
    pub size: String,
    pub available: bool,
    pub source: VariantSourceKind,
}

/// Anything able to list the size variants of the product shown by a page.
pub trait VariantSource {
    fn detect(&self, page: &mut dyn PageDriver) -> Vec<VariantObservation>;
}

/// Kind of size selector present on the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeSelector {
    Dropdown,
    InlineTwister,
}

impl From<SizeSelector> for VariantSourceKind {
    fn from(selector: SizeSelector) -> Self {
        match selector {
            SizeSelector::Dropdown => VariantSourceKind::Dropdown,
            SizeSelector::InlineTwister => VariantSourceKind::InlineTwister,
        }
    }
}

/// One entry of the size selector.
#[derive(Debug, Clone, PartialEq)]
pub struct SizeOption {
    pub index: usize,
    pub label: String,
    pub style: OptionStyle,
    pub selected: bool,
    /// ASIN exposed by the markup without selecting the option, if any.
    pub asin: Option<String>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DriverError {
    #[error("option {0} does not exist")]
    NoSuchOption(usize),
    #[error("selection rejected: {0}")]
    Rejected(String),
}

/// Interaction with a product page: read state, select options, wait.
pub trait PageDriver {
    fn url(&self) -> String;

    /// Value of the hidden `ASIN` input.
    fn hidden_asin(&self) -> Option<String>;

    fn size_selector(&self) -> Option<SizeSelector>;

    fn size_options(&self, selector: SizeSelector) -> Vec<SizeOption>;

    /// Select the option and fire the events the page listens to.
    fn select_option(&mut self, selector: SizeSelector, index: usize) -> Result<(), DriverError>;

    fn wait(&mut self, duration: Duration);

    /// ASIN the page currently shows, hidden input first.
    fn current_asin(&self) -> Option<String> {
        self.hidden_asin()
            .filter(|asin| is_asin(asin))
            .or_else(|| asin_from_url(&self.url()))
    }
}

/// Detects variants by driving the size selector of the page.
#[derive(Debug, Clone)]
pub struct LiveDetector {
    pub poll_rounds: usize,
    pub poll_interval: Duration,
}

impl Default for LiveDetector {
    fn default() -> Self {
        Self {
            poll_rounds: POLL_ROUNDS,
            poll_interval: POLL_INTERVAL,
        }
    }
}

impl LiveDetector {
    /// Select `option` and wait for the page to report its ASIN.
    ///
    /// `current` is the option the page has selected right now and is moved to
    /// `option` once the selection went through.
    fn resolve_asin(
        &self,
        page: &mut dyn PageDriver,
        selector: SizeSelector,
        option: &SizeOption,
        current: &mut Option<usize>,
    ) -> Option<String> {
        let before = page.current_asin();
        let already_selected = *current == Some(option.index);
        if let Err(err) = page.select_option(selector, option.index) {
            log::warn!("Could not select size {}: {err}", option.label);
            return None;
        }
        *current = Some(option.index);

        for _ in 0..self.poll_rounds {
            page.wait(self.poll_interval);
            let Some(asin) = page.current_asin() else {
                continue;
            };
            let settled = match option.asin.as_deref() {
                Some(expected) => asin == expected,
                None => already_selected || before.as_deref() != Some(asin.as_str()),
            };
            if settled {
                return Some(asin);
            }
        }

        log::warn!("ASIN did not settle after selecting size {}", option.label);
        None
    }
}

impl VariantSource for LiveDetector {
    fn detect(&self, page: &mut dyn PageDriver) -> Vec<VariantObservation> {
        let Some(selector) = page.size_selector() else {
            log::info!("No size dropdown or inline twister found on {}", page.url());
            return Vec::new();
        };

        let options = page.size_options(selector);
        let original = options.iter().find(|option| option.selected).map(|o| o.index);
        let mut current = original;
        let mut seen = HashSet::new();
        let mut observations = Vec::new();

        for option in &options {
            if option.label.is_empty() || seen.contains(&option.label) {
                continue;
            }

            let available = is_available(&option.style);
            let asin = if available {
                self.resolve_asin(page, selector, option, &mut current)
            } else {
                option.asin.clone()
            };

            let Some(asin) = asin else {
                continue;
            };
            seen.insert(option.label.clone());
            observations.push(VariantObservation {
                asin,
                size: option.label.clone(),
                available,
                source: selector.into(),
            });
        }

        match original {
            Some(index) => {
                if let Err(err) = page.select_option(selector, index) {
                    log::warn!("Could not restore the original size selection: {err}");
                }
            }
            None => log::debug!("No size was selected before detection"),
        }

        log::info!("Detected {} size variants", observations.len());
        observations
    }
}

/// Known products first, live detection otherwise.
#[derive(Debug, Clone, Default)]
pub struct VariantDetector {
    pub catalog: KnownProducts,
    pub live: LiveDetector,
}

impl VariantDetector {
    pub fn new(catalog: KnownProducts) -> Self {
        Self {
            catalog,
            live: LiveDetector::default(),
        }
    }
}

impl VariantSource for VariantDetector {
    fn detect(&self, page: &mut dyn PageDriver) -> Vec<VariantObservation> {
        let known = self.catalog.detect(page);
        if !known.is_empty() {
            return known;
        }
        self.live.detect(page)
    }
}

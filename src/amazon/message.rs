//! Message the browser extension posts into the lead-submittal page.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::amazon::variants::VariantObservation;

pub const MESSAGE_TYPE: &str = "ASIN_DATA_FROM_EXTENSION";

/// Extension storage key holding the scraped product.
pub const EXTENSION_DATA_KEY: &str = "extensionData";

/// Extension storage key holding the last form state.
pub const FORM_DATA_KEY: &str = "formData";

/// Only pages whose path contains this segment accept the message.
pub const LEAD_SUBMITTAL_PATH: &str = "lead-submittal";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MessageError {
    #[error("unexpected message type `{0}`")]
    UnexpectedType(String),
    #[error("page `{0}` does not accept extension data")]
    WrongPage(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtensionAsin {
    pub asin: String,
    #[serde(default)]
    pub size: String,
    #[serde(default = "default_quantity")]
    pub quantity: i32,
}

fn default_quantity() -> i32 {
    1
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtensionMessage {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub retailer_link: String,
    #[serde(default)]
    pub amazon_link: String,
    #[serde(default)]
    pub asins: Vec<ExtensionAsin>,
}

impl ExtensionMessage {
    /// Message carrying the available variants, one unit each.
    pub fn from_observations(
        retailer_link: impl Into<String>,
        amazon_link: impl Into<String>,
        observations: &[VariantObservation],
    ) -> Self {
        Self {
            kind: MESSAGE_TYPE.to_string(),
            retailer_link: retailer_link.into(),
            amazon_link: amazon_link.into(),
            asins: observations
                .iter()
                .filter(|observation| observation.available)
                .map(|observation| ExtensionAsin {
                    asin: observation.asin.clone(),
                    size: observation.size.clone(),
                    quantity: default_quantity(),
                })
                .collect(),
        }
    }

    /// Check the message is meant for the page at `page_path`.
    pub fn accept(self, page_path: &str) -> Result<Self, MessageError> {
        if !page_path.contains(LEAD_SUBMITTAL_PATH) {
            return Err(MessageError::WrongPage(page_path.to_string()));
        }
        if self.kind != MESSAGE_TYPE {
            return Err(MessageError::UnexpectedType(self.kind));
        }
        Ok(self)
    }
}

//! Products whose size variants are already known.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::amazon::variants::{
    PageDriver, VariantObservation, VariantSource, VariantSourceKind, asin_from_url,
};

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read catalog: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid catalog: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnownVariant {
    pub size: String,
    pub asin: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnownProduct {
    pub parent_asin: String,
    #[serde(default)]
    pub name: Option<String>,
    pub variants: Vec<KnownVariant>,
}

/// In-memory catalog addressed by the parent ASIN or any child ASIN.
#[derive(Debug, Clone, Default)]
pub struct KnownProducts {
    products: Vec<KnownProduct>,
    index: HashMap<String, usize>,
}

impl KnownProducts {
    pub fn new(products: Vec<KnownProduct>) -> Self {
        let mut index = HashMap::new();
        for (position, product) in products.iter().enumerate() {
            index.insert(product.parent_asin.clone(), position);
            for variant in &product.variants {
                index.entry(variant.asin.clone()).or_insert(position);
            }
        }
        Self { products, index }
    }

    /// Parse a JSON array of products.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let products: Vec<KnownProduct> = serde_json::from_str(json)?;
        Ok(Self::new(products))
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    pub fn get(&self, asin: &str) -> Option<&KnownProduct> {
        self.index.get(asin).map(|position| &self.products[*position])
    }

    /// Variants of the product a URL points to.
    pub fn lookup_url(&self, url: &str) -> Vec<VariantObservation> {
        let Some(product) = asin_from_url(url).and_then(|asin| self.get(&asin)) else {
            return Vec::new();
        };

        log::info!(
            "Using {} known variants for {}",
            product.variants.len(),
            product.parent_asin
        );
        product
            .variants
            .iter()
            .map(|variant| VariantObservation {
                asin: variant.asin.clone(),
                size: variant.size.clone(),
                available: true,
                source: VariantSourceKind::KnownProduct,
            })
            .collect()
    }
}

impl VariantSource for KnownProducts {
    fn detect(&self, page: &mut dyn PageDriver) -> Vec<VariantObservation> {
        self.lookup_url(&page.url())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CATALOG: &str = r#"[
        {
            "parent_asin": "B0PARENT01",
            "name": "Nike Dunk Low",
            "variants": [
                {"size": "9", "asin": "B0CHILD009"},
                {"size": "10", "asin": "B0CHILD010"}
            ]
        }
    ]"#;

    #[test]
    fn answers_for_parent_and_child_urls() {
        let catalog = KnownProducts::from_json(CATALOG).unwrap();
        assert_eq!(catalog.len(), 1);

        let by_parent = catalog.lookup_url("https://www.amazon.com/dp/B0PARENT01");
        assert_eq!(by_parent.len(), 2);
        assert_eq!(by_parent[1].asin, "B0CHILD010");
        assert_eq!(by_parent[1].source, VariantSourceKind::KnownProduct);

        let by_child = catalog.lookup_url("https://www.amazon.com/x/dp/B0CHILD009?psc=1");
        assert_eq!(by_child, by_parent);
    }

    #[test]
    fn unknown_product_yields_nothing() {
        let catalog = KnownProducts::from_json(CATALOG).unwrap();
        assert!(catalog.lookup_url("https://www.amazon.com/dp/B0UNKNOWN1").is_empty());
        assert!(catalog.lookup_url("not a url").is_empty());
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(matches!(
            KnownProducts::from_json("{\"parent_asin\": 1}"),
            Err(CatalogError::Json(_))
        ));
    }
}

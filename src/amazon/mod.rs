//! Amazon size-variant scraping and the extension message contract.

pub mod catalog;
pub mod color;
pub mod message;
pub mod page;
pub mod variants;

pub use catalog::KnownProducts;
pub use message::ExtensionMessage;
pub use page::{HtmlProductPage, PageSnapshot};
pub use variants::{LiveDetector, VariantDetector, VariantObservation, VariantSource};

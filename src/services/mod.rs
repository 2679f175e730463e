pub use pushkind_common::services::errors::{ServiceError, ServiceResult};

pub mod asin_bank;
pub mod checkins;
pub mod extension;
pub mod leads;
pub mod purchases;
pub mod retailer_orders;
pub mod retailers;
pub mod users;

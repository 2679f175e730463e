pub mod asin_bank;
pub mod checkin;
pub mod lead;
pub mod purchase;
pub mod retailer;
pub mod retailer_order;
pub mod user;

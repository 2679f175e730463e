pub mod amazon;
pub mod config;
pub mod domain;
pub mod forms;
pub mod html;
pub mod models;
pub mod pagination;
pub mod parsers;
pub mod repository;
pub mod routes;
pub mod schema;
pub mod services;

pub const SERVICE_ACCESS_ROLE: &str = "admin";

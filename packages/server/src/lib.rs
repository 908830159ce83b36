// Universal E-commerce Scraper - API gateway
//
// Exposes the out-of-process product image scraper over HTTP.
// Job supervision lives in the scrape-job crate; this crate is routing,
// configuration, and response rendering.

pub mod config;
pub mod server;

pub use config::*;

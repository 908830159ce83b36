// HTTP routes
pub mod health;
pub mod index;
pub mod scrape;

pub use health::*;
pub use index::*;
pub use scrape::*;

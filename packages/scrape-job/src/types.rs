//! Request and payload types exchanged with the scrape job.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A request to scrape one page.
///
/// The URL is expected to be validated (absolute, `http`/`https`) before it
/// reaches the runner; the runner passes it to the job untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrapeRequest {
    pub url: String,
}

/// Payload the job prints on success.
///
/// Fields the job adds beyond the documented ones (`source_url`, `note`, ...)
/// are kept in `extra` and serialized back unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScrapeResult {
    pub product_images: Vec<String>,
    #[serde(default)]
    pub total_images: usize,
    #[serde(default)]
    pub strategy_used: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ScrapeResult {
    pub fn new(product_images: Vec<String>, strategy_used: Option<String>) -> Self {
        let total_images = product_images.len();
        Self {
            product_images,
            total_images,
            strategy_used,
            extra: Map::new(),
        }
    }

    /// Force `total_images` to match `product_images`.
    ///
    /// Returns the count the job reported when it disagreed.
    pub fn normalize_total(&mut self) -> Option<usize> {
        let actual = self.product_images.len();
        if self.total_images == actual {
            return None;
        }
        let reported = self.total_images;
        self.total_images = actual;
        Some(reported)
    }
}

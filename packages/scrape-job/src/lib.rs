//! Supervised execution of the product image scraper.
//!
//! The scraper is an external program (`<python> <script> <url>`) that
//! prints one JSON document. This crate launches it, drains its output
//! streams concurrently, enforces a hard deadline, and classifies whatever
//! happened into exactly one [`Outcome`].
//!
//! # Usage
//!
//! ```rust,ignore
//! use scrape_job::{JobCommand, JobConfig, JobRunner, Outcome};
//!
//! let config = JobConfig::with_command(JobCommand::new("python", "scraper/scraper.py"));
//! let runner = JobRunner::new(config);
//!
//! match runner.run("https://example.com/shop/item").await {
//!     Outcome::Success(result) => println!("{} images", result.total_images),
//!     other => eprintln!("scrape failed: {}", other.kind()),
//! }
//! ```
//!
//! # Modules
//!
//! - [`launcher`] - spawns the job in its own process group
//! - [`collector`] - concurrent, size-capped stdout/stderr drains
//! - [`deadline`] - completion vs. deadline race, kill + reap on expiry
//! - [`outcome`] - classification and response bodies
//! - [`runner`] - wires the above together per request

pub mod collector;
pub mod config;
pub mod deadline;
pub mod error;
pub mod launcher;
pub mod outcome;
pub mod runner;
pub mod types;

// Re-export core types at crate root
pub use collector::{OutputBuffer, StreamCollector};
pub use config::{JobCommand, JobConfig};
pub use deadline::{DeadlineState, DeadlineSupervisor, Termination};
pub use error::{JobError, Result};
pub use launcher::{launch, JobHandle};
pub use outcome::{
    excerpt, ErrorCode, ErrorResponse, JobFailure, Outcome, OutcomeClassifier, ResponseBody,
};
pub use runner::JobRunner;
pub use types::{ScrapeRequest, ScrapeResult};

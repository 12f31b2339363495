//! # litreview
//!
//! Client for an AI literature review backend. A research question goes in;
//! the backend produces an abstract, a PubMed search string, a result count
//! and a list of candidate papers with availability information. This crate
//! holds that state, validates input before it is sent, splits papers by
//! availability and pages through them, and writes the export and bulk
//! download files.
//!
//! ## Architecture
//!
//! - [`models`]: Paper wire format and request/response bodies
//! - [`backend`]: The [`Backend`] trait and its HTTP implementation
//! - [`session`]: Review state, request orchestration, pagination, export
//! - [`ui`]: Terminal rendering
//! - [`repl`]: Interactive session loop
//! - [`utils`]: HTTP client, validation and display helpers
//! - [`config`]: Configuration management
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use litreview::{HttpBackend, ReviewController};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let backend = Arc::new(HttpBackend::local()?);
//! let mut review = ReviewController::new(backend);
//! review.run_pipeline("What is the effect of dupilumab on eczema?").await?;
//! println!("{} papers", review.state().papers.len());
//! # Ok(())
//! # }
//! ```

pub mod backend;
pub mod config;
pub mod models;
pub mod repl;
pub mod session;
pub mod ui;
pub mod utils;

// Re-export commonly used types
pub use backend::{Backend, BackendError, HttpBackend};
pub use models::Paper;
pub use session::{ReviewController, ReviewState};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

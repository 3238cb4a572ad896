//! Leadmap Scraper - the bounded concurrent extraction pipeline.
//!
//! This crate coordinates lead discovery and extraction against a map-search
//! UI through the capability traits in `leadmap-core`. One producer drives a
//! tab through an incremental scroll/collect loop, streaming newly found
//! place links into a shared work queue, while a fixed-size pool of
//! long-lived worker tabs drains that queue. Each worker phase (navigate,
//! wait-for-ready) runs under slice-based timeout supervision so a stuck
//! remote operation can never stall a worker past its budget, and shutdown
//! is signalled by one queue sentinel per worker.
//!
//! # Example
//!
//! ```rust,ignore
//! use leadmap_scraper::{scrape_with, ScrapeOptions};
//!
//! let session = /* any `leadmap_core::Browse` implementation */;
//! let leads = scrape_with(&session, "coffee roasters in Portland",
//!     &ScrapeOptions::new(25, 4)).await?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod discovery;
pub mod error;
pub mod pipeline;
pub mod pool;
pub mod queue;
#[allow(missing_docs)]
pub mod scripts;
pub mod testing;
pub mod timeout;
pub mod worker;

// Re-export commonly used types
pub use discovery::{discover, discover_with, DiscoverOptions};
pub use error::{Result, ScrapeError};
pub use pipeline::{scrape_with, ScrapeOptions};
pub use pool::{effective_worker_count, run_pool, run_pool_with};
pub use queue::{LeadSink, Task, WorkQueue};
pub use timeout::{sliced, sliced_with, WAIT_SLICE};
pub use worker::{extract_lead, run_worker, ExtractBudgets, ItemFailure};

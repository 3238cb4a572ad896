//! Leadmap Core - Foundation crate for the leadmap scraping pipeline.
//!
//! This crate provides shared types, error handling, configuration management,
//! and the browser capability traits that all other leadmap crates depend on.
//!
//! # Modules
//!
//! - [`error`] - Central error types using thiserror
//! - [`config`] - TOML-based configuration with XDG paths and env overrides
//! - [`types`] - Shared record types (`Lead`)
//! - [`capabilities`] - Browser/tab capability traits that decouple the
//!   scraping core from any particular automation engine
//!
//! # Example
//!
//! ```rust
//! use leadmap_core::AppConfig;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AppConfig::default();
//! assert!(config.browser.headless);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod capabilities;
pub mod config;
pub mod error;
pub mod types;

// Re-export commonly used types
pub use capabilities::{
    Browse, ResourceKind, ResourcePolicy, TabError, TabHandle, TabResult, Viewport,
};
pub use config::{AppConfig, BrowserConfig, OutputConfig, ScraperConfig};
pub use error::{ConfigError, ConfigResult, LeadmapError, Result};
pub use types::{Lead, NOT_AVAILABLE};

//! Scraper error types.
//!
//! Per-item extraction failures never surface here; they are contained in
//! the worker loop (see [`crate::worker::ItemFailure`]). `ScrapeError` covers
//! only the setup failures that abort a whole run, such as not being able to
//! create the worker tabs.

use leadmap_core::TabError;
use thiserror::Error;

/// Errors that abort a scraping run.
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// Creating or preparing a worker tab failed
    #[error("tab setup failed: {0}")]
    TabSetup(#[from] TabError),
}

/// Result alias for scraper operations.
pub type Result<T> = std::result::Result<T, ScrapeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ScrapeError::TabSetup(TabError::Closed("session gone".to_string()));
        assert_eq!(err.to_string(), "tab setup failed: tab closed: session gone");
    }
}

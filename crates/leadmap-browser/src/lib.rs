//! Chromium automation engine for the lead pipeline.
//!
//! Implements the `leadmap-core` capability traits on top of chromiumoxide:
//! [`BrowserSession`] launches and owns the browser process, and every tab it
//! opens is a [`ChromiumTab`]. The scraping core stays engine-agnostic; this
//! crate is the only place that speaks the devtools protocol.

pub mod engine;
pub mod error;
pub mod tab;

pub use engine::BrowserSession;
pub use error::{BrowserError, Result};
pub use tab::ChromiumTab;

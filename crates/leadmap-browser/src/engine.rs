use crate::error::{BrowserError, Result};
use crate::tab::ChromiumTab;
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig as ChromiumConfig};
use futures_util::stream::StreamExt;
use leadmap_core::{Browse, TabError, TabResult, Viewport};
use tokio::task::JoinHandle;

/// A running Chromium instance plus its event loop task.
///
/// One session is shared by the discovery producer and every extraction
/// worker; each of them gets its own tab through [`Browse::open_tab`].
pub struct BrowserSession {
    browser: Browser,
    handler: JoinHandle<()>,
}

impl BrowserSession {
    /// Launch Chromium according to the application config.
    pub async fn launch(config: &leadmap_core::BrowserConfig) -> Result<Self> {
        let mut builder = ChromiumConfig::builder()
            .no_sandbox()
            .window_size(config.viewport_width, config.viewport_height);
        if !config.headless {
            builder = builder.with_head();
        }
        let chromium_config = builder.build().map_err(BrowserError::LaunchError)?;

        let (browser, mut events) = Browser::launch(chromium_config)
            .await
            .map_err(|e| BrowserError::LaunchError(e.to_string()))?;

        // The handler stream must be polled for the whole browser lifetime.
        let handler = tokio::spawn(async move {
            while let Some(event) = events.next().await {
                if let Err(e) = event {
                    tracing::debug!("browser event error: {}", e);
                }
            }
        });

        tracing::info!(headless = config.headless, "browser launched");
        Ok(Self { browser, handler })
    }

    /// Shut the browser down and stop the event loop.
    pub async fn close(mut self) -> Result<()> {
        self.browser
            .close()
            .await
            .map_err(|e| BrowserError::ChromiumError(e.to_string()))?;
        if let Err(e) = self.browser.wait().await {
            tracing::debug!("browser wait after close failed: {}", e);
        }
        self.handler.abort();
        Ok(())
    }
}

#[async_trait]
impl Browse for BrowserSession {
    type Tab = ChromiumTab;

    async fn open_tab(&self, viewport: Viewport) -> TabResult<Self::Tab> {
        let page = self
            .browser
            .new_page("about:blank")
            .await
            .map_err(|e| TabError::Closed(e.to_string()))?;
        let tab = ChromiumTab::new(page);
        tab.set_viewport(viewport).await?;
        Ok(tab)
    }
}

use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::emulation::SetDeviceMetricsOverrideParams;
use chromiumoxide::cdp::browser_protocol::fetch::{
    ContinueRequestParams, EnableParams, EventRequestPaused, FailRequestParams,
};
use chromiumoxide::cdp::browser_protocol::network::{ErrorReason, ResourceType};
use chromiumoxide::cdp::browser_protocol::page::StopLoadingParams;
use chromiumoxide::Page;
use futures_util::stream::StreamExt;
use leadmap_core::{ResourceKind, ResourcePolicy, TabError, TabHandle, TabResult, Viewport};
use serde_json::Value;
use std::time::Duration;

const SELECTOR_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// One Chromium tab exposed through the [`TabHandle`] capability.
///
/// Cloning shares the underlying page, so an orchestrator can keep a
/// teardown handle while a worker drives the tab.
#[derive(Clone)]
pub struct ChromiumTab {
    page: Page,
}

impl ChromiumTab {
    pub(crate) fn new(page: Page) -> Self {
        Self { page }
    }

    pub(crate) async fn set_viewport(&self, viewport: Viewport) -> TabResult<()> {
        let params = SetDeviceMetricsOverrideParams::builder()
            .width(i64::from(viewport.width))
            .height(i64::from(viewport.height))
            .device_scale_factor(1.0)
            .mobile(false)
            .build()
            .map_err(TabError::Evaluation)?;
        self.page
            .execute(params)
            .await
            .map_err(|e| TabError::Evaluation(e.to_string()))?;
        Ok(())
    }
}

fn kind_of(resource: &ResourceType) -> ResourceKind {
    match resource {
        ResourceType::Document => ResourceKind::Document,
        ResourceType::Stylesheet => ResourceKind::Stylesheet,
        ResourceType::Script => ResourceKind::Script,
        ResourceType::Image => ResourceKind::Image,
        ResourceType::Media => ResourceKind::Media,
        ResourceType::Font => ResourceKind::Font,
        ResourceType::Xhr | ResourceType::Fetch => ResourceKind::Xhr,
        ResourceType::Ping => ResourceKind::Ping,
        ResourceType::WebSocket => ResourceKind::WebSocket,
        _ => ResourceKind::Other,
    }
}

#[async_trait]
impl TabHandle for ChromiumTab {
    async fn navigate(&self, url: &str) -> TabResult<()> {
        self.page
            .goto(url)
            .await
            .map_err(|e| TabError::Navigation(e.to_string()))?;
        self.page
            .wait_for_navigation()
            .await
            .map_err(|e| TabError::Navigation(e.to_string()))?;
        Ok(())
    }

    async fn wait_for(&self, selector: &str) -> TabResult<()> {
        // Polls until the element exists. The caller owns the budget.
        loop {
            if self.page.find_element(selector).await.is_ok() {
                return Ok(());
            }
            tokio::time::sleep(SELECTOR_POLL_INTERVAL).await;
        }
    }

    async fn evaluate(&self, script: &str) -> TabResult<Value> {
        let result = self
            .page
            .evaluate_function(script)
            .await
            .map_err(|e| TabError::Evaluation(e.to_string()))?;
        result
            .into_value()
            .map_err(|e| TabError::Evaluation(e.to_string()))
    }

    async fn install_request_filter(&self, policy: ResourcePolicy) -> TabResult<()> {
        self.page
            .execute(EnableParams::default())
            .await
            .map_err(|e| TabError::Evaluation(e.to_string()))?;
        let mut paused = self
            .page
            .event_listener::<EventRequestPaused>()
            .await
            .map_err(|e| TabError::Evaluation(e.to_string()))?;

        // Once interception is enabled every request stalls until a verdict,
        // so this task must keep dispatching for the life of the tab. It
        // exits when the tab closes and its event stream ends.
        let page = self.page.clone();
        tokio::spawn(async move {
            while let Some(event) = paused.next().await {
                let request_id = event.request_id.clone();
                let verdict = if policy.should_block(kind_of(&event.resource_type)) {
                    page.execute(FailRequestParams::new(request_id, ErrorReason::Aborted))
                        .await
                        .map(|_| ())
                } else {
                    page.execute(ContinueRequestParams::new(request_id))
                        .await
                        .map(|_| ())
                };
                if let Err(e) = verdict {
                    tracing::trace!("request verdict failed: {}", e);
                }
            }
        });
        Ok(())
    }

    async fn stop_loading(&self) -> TabResult<()> {
        self.page
            .execute(StopLoadingParams::default())
            .await
            .map_err(|e| TabError::Navigation(e.to_string()))?;
        Ok(())
    }

    async fn close(&self) -> TabResult<()> {
        self.page
            .clone()
            .close()
            .await
            .map_err(|e| TabError::Closed(e.to_string()))
    }
}

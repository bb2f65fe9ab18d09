use std::thread;

use async_trait::async_trait;
use headless_chrome::{Browser, LaunchOptions};
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::error::{Result, WatchError};
use crate::scrapers::traits::ListingSource;
use crate::scrapers::types::ScrapeParams;

/// Result of the in-page row collection script.
#[derive(Debug, Deserialize)]
struct RowTexts {
    selector: Option<String>,
    blocks: Vec<String>,
}

/// Browser-based source for the JS-rendered listing page using headless Chrome
pub struct BrowserSource {
    params: ScrapeParams,
}

impl BrowserSource {
    pub fn new(params: ScrapeParams) -> Self {
        Self { params }
    }

    /// Launch Chrome, load the page and collect row texts. Blocking.
    fn scrape_rows(params: &ScrapeParams) -> Result<Vec<String>> {
        info!("Launching headless Chrome...");

        let options = LaunchOptions::default_builder()
            .headless(params.headless)
            .window_size(Some((1920, 1080)))
            .build()
            .map_err(WatchError::browser)?;

        let browser = Browser::new(options).map_err(WatchError::browser)?;
        let tab = browser.new_tab().map_err(WatchError::browser)?;

        tab.set_user_agent(&params.user_agent, None, None)
            .map_err(WatchError::browser)?;

        info!("Opening listing page {}", params.target_url);
        tab.navigate_to(&params.target_url)
            .map_err(WatchError::browser)?;
        tab.wait_until_navigated().map_err(WatchError::browser)?;

        // Rows are rendered client side after a "Loading data..." placeholder
        let any_row = params.selectors.join(", ");
        match tab.wait_for_element_with_custom_timeout(&any_row, params.content_timeout) {
            Ok(_) => info!("Apartment elements detected"),
            Err(e) => warn!("Timeout waiting for content, proceeding anyway: {}", e),
        }
        thread::sleep(params.load_wait);

        let script = row_script(&params.selectors, params.min_text_len)?;
        let result = tab.evaluate(&script, false).map_err(WatchError::browser)?;

        let raw = result
            .value
            .as_ref()
            .and_then(|v| v.as_str())
            .ok_or_else(|| WatchError::browser("row script returned no value"))?;
        let rows: RowTexts = serde_json::from_str(raw)?;

        match &rows.selector {
            Some(selector) => info!(
                "Found {} apartments using selector: {}",
                rows.blocks.len(),
                selector
            ),
            None => warn!("No apartment elements found with any selector"),
        }

        Ok(rows.blocks)
    }
}

#[async_trait]
impl ListingSource for BrowserSource {
    async fn fetch_blocks(&self) -> Result<Vec<String>> {
        let params = self.params.clone();
        let blocks = tokio::task::spawn_blocking(move || Self::scrape_rows(&params))
            .await
            .map_err(WatchError::browser)??;

        debug!("Browser returned {} row texts", blocks.len());
        if blocks.is_empty() {
            return Err(WatchError::EmptyPage {
                url: self.params.target_url.clone(),
            });
        }
        Ok(blocks)
    }

    fn source_name(&self) -> &'static str {
        "browser"
    }
}

/// In-page script returning `{selector, blocks}` as a JSON string for the first
/// selector whose rows have enough text.
fn row_script(selectors: &[String], min_text_len: usize) -> Result<String> {
    let selectors = serde_json::to_string(selectors)?;
    Ok(format!(
        r#"(() => {{
    const selectors = {selectors};
    for (const sel of selectors) {{
        let nodes;
        try {{ nodes = Array.from(document.querySelectorAll(sel)); }} catch (e) {{ continue; }}
        const blocks = nodes
            .map(n => (n.innerText || "").trim())
            .filter(t => Array.from(t).length > {min_text_len});
        if (blocks.length > 0) return JSON.stringify({{ selector: sel, blocks }});
    }}
    return JSON.stringify({{ selector: null, blocks: [] }});
}})()"#
    ))
}

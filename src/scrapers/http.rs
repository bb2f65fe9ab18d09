use async_trait::async_trait;
use reqwest::Client;
use scraper::{ElementRef, Html, Node, Selector};
use tracing::{debug, info, warn};

use crate::error::{Result, WatchError};
use crate::scrapers::traits::ListingSource;
use crate::scrapers::types::{is_listing_text, ScrapeParams};

/// Elements that start a new line in rendered text.
const BLOCK_TAGS: &[&str] = &[
    "address", "article", "aside", "blockquote", "dd", "div", "dl", "dt", "footer", "form", "h1",
    "h2", "h3", "h4", "h5", "h6", "header", "hr", "li", "main", "nav", "ol", "p", "pre",
    "section", "table", "tbody", "tfoot", "thead", "tr", "ul",
];

/// Fetches a server-rendered listing page with a plain HTTP GET.
pub struct HttpSource {
    client: Client,
    params: ScrapeParams,
}

impl HttpSource {
    pub fn new(params: ScrapeParams) -> Result<Self> {
        let client = Client::builder()
            .timeout(params.content_timeout)
            .user_agent(params.user_agent.as_str())
            .build()?;

        Ok(Self { client, params })
    }
}

#[async_trait]
impl ListingSource for HttpSource {
    async fn fetch_blocks(&self) -> Result<Vec<String>> {
        let url = &self.params.target_url;
        debug!("Fetching URL: {}", url);

        let response = self.client.get(url).send().await?;
        if let Err(e) = response.error_for_status_ref() {
            warn!("Listing page returned status: {}", response.status());
            return Err(e.into());
        }

        let html = response.text().await?;
        debug!("Downloaded {} bytes of HTML", html.len());

        let blocks = extract_blocks(&html, &self.params.selectors, self.params.min_text_len)?;
        if blocks.is_empty() {
            return Err(WatchError::EmptyPage { url: url.clone() });
        }

        info!("Found {} listing rows", blocks.len());
        Ok(blocks)
    }

    fn source_name(&self) -> &'static str {
        "http"
    }
}

/// Text of the rows matched by the first selector that finds any listing.
pub fn extract_blocks(html: &str, selectors: &[String], min_text_len: usize) -> Result<Vec<String>> {
    let document = Html::parse_document(html);

    for raw in selectors {
        let selector = Selector::parse(raw).map_err(|e| WatchError::selector(raw, format!("{:?}", e)))?;

        let blocks: Vec<String> = document
            .select(&selector)
            .map(inner_text)
            .filter(|text| is_listing_text(text, min_text_len))
            .collect();

        if !blocks.is_empty() {
            info!("Found {} apartments using selector: {}", blocks.len(), raw);
            return Ok(blocks);
        }
    }

    warn!("No apartment elements found with any selector");
    Ok(Vec::new())
}

/// Rough equivalent of the DOM `innerText`: block elements and `<br>` break
/// lines, table cells are separated by a space, other whitespace collapses.
pub fn inner_text(element: ElementRef<'_>) -> String {
    let mut out = String::new();
    push_text(element, &mut out);

    out.lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn push_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => {
                let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
                if text.starts_with(char::is_whitespace) {
                    out.push(' ');
                }
                out.push_str(&collapsed);
                if text.ends_with(char::is_whitespace) {
                    out.push(' ');
                }
            }
            Node::Element(el) => {
                let name = el.name();
                if name == "br" {
                    out.push('\n');
                    continue;
                }
                if matches!(name, "script" | "style" | "template") {
                    continue;
                }
                let Some(child_element) = ElementRef::wrap(child) else {
                    continue;
                };

                let block = BLOCK_TAGS.contains(&name);
                if block {
                    out.push('\n');
                }
                push_text(child_element, out);
                if block {
                    out.push('\n');
                } else if matches!(name, "td" | "th") {
                    out.push(' ');
                }
            }
            _ => {}
        }
    }
}

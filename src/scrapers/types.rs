use std::time::Duration;

/// CSS selectors tried in order until one yields listing rows.
pub const DEFAULT_SELECTORS: [&str; 6] = [
    "tr[data-apartment]",
    ".apartment-row",
    "tbody tr",
    "table tr",
    ".apartment",
    "[class*=\"apartment\"]",
];

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Where and how to fetch the listing page
#[derive(Debug, Clone)]
pub struct ScrapeParams {
    /// Page with the listing table
    pub target_url: String,
    /// Row selectors, most specific first
    pub selectors: Vec<String>,
    /// Rows whose trimmed text is not longer than this are header or filler rows
    pub min_text_len: usize,
    /// Extra settle time after the rows appear
    pub load_wait: Duration,
    /// How long to wait for any row selector to appear
    pub content_timeout: Duration,
    pub headless: bool,
    pub user_agent: String,
}

impl Default for ScrapeParams {
    fn default() -> Self {
        Self {
            target_url: "https://www.apartments-hn.de/en/book-apartment".to_string(),
            selectors: DEFAULT_SELECTORS.iter().map(|s| s.to_string()).collect(),
            min_text_len: 20,
            load_wait: Duration::from_secs(3),
            content_timeout: Duration::from_secs(30),
            headless: true,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// Whether a row's text is substantial enough to be a listing.
pub fn is_listing_text(text: &str, min_text_len: usize) -> bool {
    text.trim().chars().count() > min_text_len
}

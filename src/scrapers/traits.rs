use crate::error::Result;
use async_trait::async_trait;

/// Supplies the visible text of each listing row on the page.
/// Parsing happens elsewhere, so a source only has to find rows.
#[async_trait]
pub trait ListingSource: Send + Sync {
    /// One string per listing row, in page order.
    async fn fetch_blocks(&self) -> Result<Vec<String>>;

    /// Get the name of the source
    fn source_name(&self) -> &'static str;
}

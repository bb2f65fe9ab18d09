pub mod browser;
pub mod http;
pub mod traits;
pub mod types;

pub use browser::BrowserSource;
pub use http::HttpSource;
pub use traits::ListingSource;
pub use types::ScrapeParams;

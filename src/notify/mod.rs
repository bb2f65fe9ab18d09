//! Delivery of change events.

pub mod log;
pub mod render;
pub mod webhook;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::ChangeEvent;

pub use log::LogSink;
pub use render::{render_body, render_subject};
pub use webhook::WebhookSink;

/// Destination for change events.
///
/// Implementations must treat an empty slice as a no-op. The monitor only calls
/// `notify` when there is something to report.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn notify(&self, events: &[ChangeEvent]) -> Result<()>;

    /// One-off message to check that delivery works end to end.
    async fn send_test(&self) -> Result<()>;

    fn sink_name(&self) -> &'static str;
}

use async_trait::async_trait;
use tracing::info;

use crate::error::Result;
use crate::models::ChangeEvent;
use crate::notify::render::{render_body, render_subject};
use crate::notify::NotificationSink;

/// Writes the rendered notification to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl LogSink {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl NotificationSink for LogSink {
    async fn notify(&self, events: &[ChangeEvent]) -> Result<()> {
        if events.is_empty() {
            return Ok(());
        }

        info!("📬 {}", render_subject(events));
        for line in render_body(events).lines() {
            info!("{}", line);
        }
        Ok(())
    }

    async fn send_test(&self) -> Result<()> {
        info!("🧪 Test notification: log delivery is working");
        Ok(())
    }

    fn sink_name(&self) -> &'static str {
        "log"
    }
}

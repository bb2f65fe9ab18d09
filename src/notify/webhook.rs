use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::{Result, WatchError};
use crate::models::ChangeEvent;
use crate::notify::render::{render_body, render_subject};
use crate::notify::NotificationSink;

/// Request body posted to the webhook.
#[derive(Debug, Serialize)]
pub struct WebhookPayload<'a> {
    pub subject: String,
    pub text: String,
    pub events: &'a [ChangeEvent],
}

impl<'a> WebhookPayload<'a> {
    pub fn for_events(events: &'a [ChangeEvent]) -> Self {
        Self {
            subject: render_subject(events),
            text: render_body(events),
            events,
        }
    }
}

/// Posts change events as JSON to a configured URL.
pub struct WebhookSink {
    client: Client,
    url: String,
}

impl WebhookSink {
    pub fn new(url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            url: url.into(),
        })
    }

    async fn post(&self, payload: &WebhookPayload<'_>) -> Result<()> {
        debug!("Posting notification to {}", self.url);

        let response = self.client.post(&self.url).json(payload).send().await?;

        if !response.status().is_success() {
            warn!("Webhook returned status: {}", response.status());
            return Err(WatchError::Notification(format!(
                "webhook {} returned {}",
                self.url,
                response.status()
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl NotificationSink for WebhookSink {
    async fn notify(&self, events: &[ChangeEvent]) -> Result<()> {
        if events.is_empty() {
            info!("No changes to report, skipping notification");
            return Ok(());
        }

        self.post(&WebhookPayload::for_events(events)).await?;
        info!("Sent notification for {} changes", events.len());
        Ok(())
    }

    async fn send_test(&self) -> Result<()> {
        let payload = WebhookPayload {
            subject: "🧪 Test notification".to_string(),
            text: "Webhook delivery is working.".to_string(),
            events: &[],
        };
        self.post(&payload).await?;
        info!("Test notification sent successfully");
        Ok(())
    }

    fn sink_name(&self) -> &'static str {
        "webhook"
    }
}

//! Delivery adapters.
//!
//! The dispatcher only knows the `DeliverySink` seam; this module provides
//! the production adapter that hands messages to recipients' webhook
//! addresses. Every transport or platform problem is folded into a
//! `SendFailure` so it can be counted instead of aborting the job.
use async_trait::async_trait;
use serde_json::json;

use crate::dispatch::Recipient;
use crate::ports::{DeliverySink, SendFailure};

/// Posts `{recipient, message}` JSON to each recipient's address.
#[derive(Clone, Debug, Default)]
pub struct WebhookSink {
    client: reqwest::Client,
}

impl WebhookSink {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DeliverySink for WebhookSink {
    async fn deliver(
        &self,
        recipient: &Recipient,
        message: &str,
    ) -> std::result::Result<(), SendFailure> {
        let payload = json!({
            "recipient": recipient.id,
            "message": message,
        });
        match self
            .client
            .post(&recipient.address)
            .json(&payload)
            .send()
            .await
        {
            Ok(response) if response.status().is_success() => Ok(()),
            Ok(response) => Err(SendFailure::new(format!(
                "delivery endpoint returned {}",
                response.status()
            ))),
            Err(err) => Err(SendFailure::new(err.to_string())),
        }
    }
}

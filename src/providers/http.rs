/*!
 * Channel to a background translation service.
 *
 * The service receives the `TranslateMessage` JSON as is and answers with the
 * success or error payload of the message protocol.
 */

use std::time::Duration;
use async_trait::async_trait;
use log::{debug, error};
use reqwest::Client;
use url::Url;

use crate::errors::{ChannelError, ProviderError};
use crate::translation::channel::{TranslateMessage, TranslateReply, TranslationChannel};

/// Translation channel posting messages to an HTTP endpoint
#[derive(Debug, Clone)]
pub struct HttpChannel {
    client: Client,
    endpoint: Url,
}

impl HttpChannel {
    pub fn new(endpoint: &str, timeout_secs: u64) -> Result<Self, ProviderError> {
        let endpoint = Url::parse(endpoint)
            .map_err(|e| ProviderError::ConnectionError(format!("Invalid service endpoint '{}': {}", endpoint, e)))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs.max(1)))
            .build()
            .map_err(|e| ProviderError::ConnectionError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, endpoint })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl TranslationChannel for HttpChannel {
    async fn translate(&self, message: TranslateMessage) -> Result<TranslateReply, ChannelError> {
        let response = self.client.post(self.endpoint.clone())
            .json(&message)
            .send()
            .await
            .map_err(|e| ChannelError::Transport(e.to_string()))?;

        let status = response.status();
        let body: serde_json::Value = response.json().await
            .map_err(|e| ChannelError::MalformedReply(format!("{} ({})", e, status)))?;

        // Error payloads may come with a non-2xx status; the body decides
        let reply = TranslateReply::from_value(body)?;
        match &reply {
            TranslateReply::Success(_) => debug!("Translation service answered cue at {:.3}s", message.cue_start),
            TranslateReply::Failure(failure) => error!("Translation service error ({}): {}", status, failure.error),
        }
        Ok(reply)
    }
}

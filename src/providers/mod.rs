/*!
 * Provider implementations for different translation services.
 *
 * This module contains client implementations for the translation backends
 * and the channels the translation queue talks to:
 * - Ollama: Local LLM server
 * - Anthropic: Anthropic API integration
 * - Http: Background translation service speaking the message protocol
 * - Mock: Scripted channel for tests
 */

use std::sync::Arc;
use async_trait::async_trait;
use log::{debug, error};
use std::fmt::Debug;

use crate::app_config::{ChannelBackend, ChannelConfig};
use crate::errors::{ChannelError, ProviderError};
use crate::language_utils;
use crate::subtitle_processor::TranslationFailure;
use crate::translation::channel::{TranslateMessage, TranslateReply, TranslationChannel};

use self::anthropic::{Anthropic, AnthropicRequest};
use self::http::HttpChannel;
use self::ollama::{GenerationRequest, Ollama};

/// Upper bound on generated tokens for a single subtitle line
const MAX_LINE_TOKENS: u32 = 512;

/// Common trait for all LLM providers
///
/// This trait defines the interface that all provider implementations must follow,
/// allowing them to be used interchangeably behind a translation channel.
#[async_trait]
pub trait Provider: Send + Sync + Debug {
    /// The request type for this provider
    type Request: Send + Sync;

    /// The response type for this provider
    type Response: Send + Sync;

    /// Complete a request using this provider
    async fn complete(&self, request: Self::Request) -> Result<Self::Response, ProviderError>;

    /// Test the connection to the provider
    async fn test_connection(&self) -> Result<(), ProviderError>;

    /// Extract text from the provider response
    fn extract_text(response: &Self::Response) -> String;
}

/// LLM client behind a `ProviderChannel`
#[derive(Debug)]
enum ProviderBackend {
    Ollama { client: Ollama, model: String },
    Anthropic { client: Anthropic, model: String },
}

/// Translation channel answering messages with an LLM provider
#[derive(Debug)]
pub struct ProviderChannel {
    backend: ProviderBackend,
    system_prompt: String,
    temperature: f32,
}

impl ProviderChannel {
    /// Build the channel for an LLM backend
    pub fn from_config(config: &ChannelConfig) -> Result<Self, ProviderError> {
        let backend = match config.backend {
            ChannelBackend::Ollama => ProviderBackend::Ollama {
                client: Ollama::new_with_config(
                    &config.get_endpoint(),
                    config.timeout_secs,
                    config.retry_count,
                    config.retry_backoff_ms,
                )?,
                model: config.get_model(),
            },
            ChannelBackend::Anthropic => ProviderBackend::Anthropic {
                client: Anthropic::new(config.api_key.clone(), config.get_endpoint(), config.timeout_secs)?,
                model: config.get_model(),
            },
            ChannelBackend::Http => {
                return Err(ProviderError::RequestFailed(
                    "The HTTP backend is not an LLM provider".to_string(),
                ));
            }
        };

        Ok(Self {
            backend,
            system_prompt: config.system_prompt.clone(),
            temperature: config.temperature,
        })
    }

    /// Check that the backend answers
    pub async fn test_connection(&self) -> Result<(), ProviderError> {
        match &self.backend {
            ProviderBackend::Ollama { client, .. } => client.test_connection().await,
            ProviderBackend::Anthropic { client, .. } => client.test_connection().await,
        }
    }

    async fn complete(&self, text: &str, target_language: &str) -> Result<String, ProviderError> {
        let system = render_system_prompt(&self.system_prompt, target_language);

        let translated = match &self.backend {
            ProviderBackend::Ollama { client, model } => {
                let request = GenerationRequest::new(model.as_str(), text)
                    .system(system)
                    .temperature(self.temperature)
                    .num_predict(MAX_LINE_TOKENS);
                Ollama::extract_text(&client.complete(request).await?)
            }
            ProviderBackend::Anthropic { client, model } => {
                let request = AnthropicRequest::new(model.as_str(), MAX_LINE_TOKENS)
                    .system(system)
                    .temperature(self.temperature)
                    .add_message("user", text);
                Anthropic::extract_text(&client.complete(request).await?)
            }
        };

        if translated.is_empty() {
            return Err(ProviderError::ParseError("Provider returned an empty translation".to_string()));
        }
        Ok(translated)
    }
}

#[async_trait]
impl TranslationChannel for ProviderChannel {
    async fn translate(&self, message: TranslateMessage) -> Result<TranslateReply, ChannelError> {
        match self.complete(&message.text, &message.target_lang).await {
            Ok(translated) => Ok(TranslateReply::success_for(&message, translated)),
            Err(e) => {
                error!("Translation provider failed: {}", e);
                provider_failure_reply(e)
            }
        }
    }
}

/// Turn a provider error into the reply a translation service would send.
///
/// Transport and decoding problems stay errors. When the backend answered,
/// `errorType` is the placeholder category `PROVIDER_ERROR`; the provider's own
/// classification (e.g. `RATE_LIMITED`) prefixes `error` and the raw message
/// goes to `details`.
pub fn provider_failure_reply(error: ProviderError) -> Result<TranslateReply, ChannelError> {
    match ChannelError::from(error) {
        ChannelError::Provider { message, error_type } => {
            let summary = match &error_type {
                Some(kind) => format!("{}: {}", kind, message),
                None => message.clone(),
            };
            Ok(TranslateReply::failure_with_details(
                summary,
                Some(TranslationFailure::ProviderError.category().to_string()),
                Some(message),
            ))
        }
        other => Err(other),
    }
}

/// Build the configured translation channel
pub fn build_channel(config: &ChannelConfig) -> Result<Arc<dyn TranslationChannel>, ProviderError> {
    debug!("Using {} translation backend", config.backend.display_name());
    match config.backend {
        ChannelBackend::Http => Ok(Arc::new(HttpChannel::new(&config.endpoint, config.timeout_secs)?)),
        _ => Ok(Arc::new(ProviderChannel::from_config(config)?)),
    }
}

/// Fill the `{target_language}` placeholder with the language name
pub fn render_system_prompt(template: &str, target_language: &str) -> String {
    let language = language_utils::get_language_name(target_language)
        .unwrap_or_else(|_| target_language.to_string());
    template.replace("{target_language}", &language)
}

pub mod anthropic;
pub mod http;
pub mod mock;
pub mod ollama;

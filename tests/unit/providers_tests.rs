/*!
 * Tests for translation backends
 */

use dualsub::app_config::{ChannelBackend, ChannelConfig};
use dualsub::errors::ProviderError;
use dualsub::errors::ChannelError;
use dualsub::providers::{ProviderChannel, build_channel, provider_failure_reply, render_system_prompt};
use dualsub::providers::ollama::GenerationRequest;
use dualsub::translation::channel::{TranslateMessage, TranslateReply};

#[test]
fn test_render_system_prompt_withLanguageCode_shouldUseLanguageName() {
    let prompt = render_system_prompt("Translate to {target_language}.", "es");
    assert_eq!(prompt, "Translate to Spanish.");

    let prompt = render_system_prompt("Translate to {target_language}.", "klingon");
    assert_eq!(prompt, "Translate to klingon.");
}

#[test]
fn test_build_channel_withHttpBackend_shouldRequireValidUrl() {
    let mut config = ChannelConfig {
        backend: ChannelBackend::Http,
        endpoint: "http://localhost:9000/translate".to_string(),
        ..ChannelConfig::default()
    };
    assert!(build_channel(&config).is_ok());

    config.endpoint = "not a url".to_string();
    assert!(matches!(build_channel(&config), Err(ProviderError::ConnectionError(_))));
}

#[test]
fn test_provider_channel_withHttpBackend_shouldRefuse() {
    let config = ChannelConfig {
        backend: ChannelBackend::Http,
        endpoint: "http://localhost:9000".to_string(),
        ..ChannelConfig::default()
    };

    assert!(ProviderChannel::from_config(&config).is_err());
}

#[test]
fn test_provider_channel_withLlmBackends_shouldBuild() {
    let ollama = ChannelConfig::default();
    assert!(ProviderChannel::from_config(&ollama).is_ok());

    let anthropic = ChannelConfig {
        backend: ChannelBackend::Anthropic,
        api_key: "test-key".to_string(),
        ..ChannelConfig::default()
    };
    assert!(ProviderChannel::from_config(&anthropic).is_ok());
}

#[test]
fn test_provider_failure_reply_withRateLimit_shouldKeepCategoryAndMessage() {
    let reply = provider_failure_reply(ProviderError::RateLimitExceeded("slow down".into())).unwrap();

    match reply {
        TranslateReply::Failure(failure) => {
            assert_eq!(failure.error, "RATE_LIMITED: slow down");
            assert_eq!(failure.error_type.as_deref(), Some("PROVIDER_ERROR"));
            assert_eq!(failure.details.as_deref(), Some("slow down"));
        }
        other => panic!("expected failure reply, got {:?}", other),
    }
}

#[test]
fn test_provider_failure_reply_withConnectionError_shouldStayTransport() {
    let result = provider_failure_reply(ProviderError::ConnectionError("refused".into()));
    assert!(matches!(result, Err(ChannelError::Transport(_))));
}

#[test]
fn test_generation_request_builder_shouldSetOptions() {
    let request = GenerationRequest::new("llama2", "Hello")
        .system("sys")
        .temperature(0.2)
        .num_predict(64);
    let json = serde_json::to_value(&request).unwrap();

    assert_eq!(json["model"], "llama2");
    assert_eq!(json["prompt"], "Hello");
    assert_eq!(json["system"], "sys");
    assert_eq!(json["stream"], false);
}

#[tokio::test]
#[ignore] // Requires a running Ollama server
async fn test_provider_channel_withLiveOllama_shouldTranslate() {
    crate::common::init_logging();
    let channel = ProviderChannel::from_config(&ChannelConfig::default()).unwrap();
    channel.test_connection().await.unwrap();

    let message = TranslateMessage::new("Good morning", "es", 1.0, "live");
    let reply = dualsub::TranslationChannel::translate(&channel, message).await.unwrap();
    assert!(matches!(reply, TranslateReply::Success(_)));
}

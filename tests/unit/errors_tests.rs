/*!
 * Tests for error types and their conversions
 */

use dualsub::errors::{AppError, ChannelError, ProviderError, SubtitleError};
use dualsub::subtitle_processor::TranslationFailure;

#[test]
fn test_channel_error_failure_kind_shouldMapEachVariant() {
    assert_eq!(ChannelError::Transport("down".into()).failure_kind(), TranslationFailure::RequestTransport);
    assert_eq!(
        ChannelError::Provider { message: "quota".into(), error_type: None }.failure_kind(),
        TranslationFailure::ProviderError
    );
    assert_eq!(ChannelError::MalformedReply("?".into()).failure_kind(), TranslationFailure::Generic);
}

#[test]
fn test_channel_error_from_provider_error_shouldSeparateTransport() {
    assert!(matches!(
        ChannelError::from(ProviderError::ConnectionError("refused".into())),
        ChannelError::Transport(_)
    ));
    assert!(matches!(
        ChannelError::from(ProviderError::ParseError("bad json".into())),
        ChannelError::MalformedReply(_)
    ));

    match ChannelError::from(ProviderError::RateLimitExceeded("slow down".into())) {
        ChannelError::Provider { message, error_type } => {
            assert_eq!(message, "slow down");
            assert_eq!(error_type.as_deref(), Some("RATE_LIMITED"));
        }
        other => panic!("unexpected conversion: {:?}", other),
    }

    match ChannelError::from(ProviderError::ApiError { status_code: 500, message: "boom".into() }) {
        ChannelError::Provider { message, .. } => assert!(message.contains("500")),
        other => panic!("unexpected conversion: {:?}", other),
    }
}

#[test]
fn test_error_display_shouldIncludeDetails() {
    assert_eq!(SubtitleError::MissingHeader.to_string(), "Missing WEBVTT header");
    assert!(SubtitleError::InvalidTimestamp("aa".into()).to_string().contains("aa"));
    assert!(ProviderError::AuthenticationError("bad key".into()).to_string().contains("bad key"));
}

#[test]
fn test_app_error_from_sources_shouldWrap() {
    let error: AppError = ChannelError::Transport("x".into()).into();
    assert!(matches!(error, AppError::Channel(_)));

    let error: AppError = std::io::Error::new(std::io::ErrorKind::NotFound, "missing").into();
    assert!(error.to_string().contains("missing"));

    let error: AppError = anyhow::anyhow!("odd").into();
    assert!(error.to_string().contains("odd"));
}

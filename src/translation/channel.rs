/*!
 * Translation channel interface.
 *
 * The queue never talks to a translation backend directly: it sends a
 * `TranslateMessage` over a `TranslationChannel` and waits for the single
 * reply. The wire shapes mirror the messages exchanged with the background
 * translation service.
 */

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::ChannelError;

/// Action name carried by every translation request
pub const TRANSLATE_ACTION: &str = "translate";

/// Request for one cue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslateMessage {
    /// Always `"translate"`
    pub action: String,
    /// Original cue text
    pub text: String,
    /// Target language code
    pub target_lang: String,
    /// Start of the cue, echoed back for correlation
    pub cue_start: f64,
    /// Session of the cue, echoed back for correlation
    pub cue_video_id: String,
}

impl TranslateMessage {
    pub fn new(text: impl Into<String>, target_lang: impl Into<String>, cue_start: f64, cue_video_id: impl Into<String>) -> Self {
        Self {
            action: TRANSLATE_ACTION.to_string(),
            text: text.into(),
            target_lang: target_lang.into(),
            cue_start,
            cue_video_id: cue_video_id.into(),
        }
    }
}

/// Successful reply
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslateSuccess {
    pub translated_text: String,
    pub cue_start: f64,
    pub cue_video_id: String,
    pub original_text: String,
}

/// Error payload sent back by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslateFailure {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Reply to a `TranslateMessage`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TranslateReply {
    Success(TranslateSuccess),
    Failure(TranslateFailure),
}

impl TranslateReply {
    /// Successful reply echoing the correlation data of `message`
    pub fn success_for(message: &TranslateMessage, translated_text: impl Into<String>) -> Self {
        Self::Success(TranslateSuccess {
            translated_text: translated_text.into(),
            cue_start: message.cue_start,
            cue_video_id: message.cue_video_id.clone(),
            original_text: message.text.clone(),
        })
    }

    /// Error reply
    pub fn failure(error: impl Into<String>, error_type: Option<String>) -> Self {
        Self::Failure(TranslateFailure {
            error: error.into(),
            error_type,
            details: None,
        })
    }

    /// Error reply carrying extra provider details
    pub fn failure_with_details(error: impl Into<String>, error_type: Option<String>, details: Option<String>) -> Self {
        Self::Failure(TranslateFailure {
            error: error.into(),
            error_type,
            details,
        })
    }

    /// Decode a raw JSON reply.
    ///
    /// Anything that is neither a success nor an error payload is reported as
    /// a malformed reply.
    pub fn from_value(value: serde_json::Value) -> Result<Self, ChannelError> {
        serde_json::from_value(value)
            .map_err(|e| ChannelError::MalformedReply(e.to_string()))
    }
}

/// Request/response channel to a translation backend
#[async_trait]
pub trait TranslationChannel: Send + Sync {
    /// Send one translation request and wait for its reply.
    ///
    /// `Err` means no usable reply came back. An `Ok(TranslateReply::Failure)`
    /// is an explicit error payload from the backend.
    async fn translate(&self, message: TranslateMessage) -> Result<TranslateReply, ChannelError>;
}

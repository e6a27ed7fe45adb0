/*!
 * Mock translation channel for testing.
 *
 * This module provides a scripted channel that simulates different backends:
 * - `MockChannel::working()` - Always answers with a tagged translation
 * - `MockChannel::intermittent(n)` - Every Nth request fails in transport
 * - `MockChannel::transport_failure()` - Requests never get through
 * - `MockChannel::provider_failure(msg)` - The backend answers with an error payload
 */

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::errors::ChannelError;
use crate::subtitle_processor::TranslationFailure;
use crate::translation::channel::{TranslateMessage, TranslateReply, TranslationChannel};

/// Behavior mode for the mock channel
#[derive(Debug, Clone, PartialEq)]
pub enum MockBehavior {
    /// Always succeeds with `"[<target>] <text>"`
    Working,
    /// Fails intermittently (every Nth request)
    Intermittent { fail_every: usize },
    /// The request never reaches the backend
    TransportFailure,
    /// The backend answers with an error payload
    ProviderFailure { message: String },
    /// The backend answers with something that is not a reply
    Malformed,
    /// Success reply echoing the wrong cue start
    Mismatched,
    /// Simulates slow response
    Slow { delay_ms: u64 },
}

/// Callback run before each reply is produced
pub type RequestHook = Arc<dyn Fn(&TranslateMessage) + Send + Sync>;

/// Mock channel for testing translation behavior
pub struct MockChannel {
    /// Behavior mode
    behavior: MockBehavior,
    /// Request counter for intermittent failures
    request_count: Arc<AtomicUsize>,
    /// Every message received so far
    requests: Mutex<Vec<TranslateMessage>>,
    /// Optional callback, e.g. to change the session mid-batch
    hook: Option<RequestHook>,
}

impl MockChannel {
    /// Create a new mock channel with the specified behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            request_count: Arc::new(AtomicUsize::new(0)),
            requests: Mutex::new(Vec::new()),
            hook: None,
        }
    }

    /// Create a working mock channel that always succeeds
    pub fn working() -> Self {
        Self::new(MockBehavior::Working)
    }

    /// Create an intermittently failing mock channel
    pub fn intermittent(fail_every: usize) -> Self {
        Self::new(MockBehavior::Intermittent { fail_every })
    }

    pub fn transport_failure() -> Self {
        Self::new(MockBehavior::TransportFailure)
    }

    pub fn provider_failure(message: impl Into<String>) -> Self {
        Self::new(MockBehavior::ProviderFailure { message: message.into() })
    }

    pub fn malformed() -> Self {
        Self::new(MockBehavior::Malformed)
    }

    pub fn mismatched() -> Self {
        Self::new(MockBehavior::Mismatched)
    }

    pub fn slow(delay_ms: u64) -> Self {
        Self::new(MockBehavior::Slow { delay_ms })
    }

    /// Run `hook` on every request before replying
    pub fn with_hook(mut self, hook: impl Fn(&TranslateMessage) + Send + Sync + 'static) -> Self {
        self.hook = Some(Arc::new(hook));
        self
    }

    /// Get the number of requests made
    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    /// Copy of every message received so far
    pub fn requests(&self) -> Vec<TranslateMessage> {
        self.requests.lock().clone()
    }

    /// Texts of every message received so far
    pub fn requested_texts(&self) -> Vec<String> {
        self.requests.lock().iter().map(|m| m.text.clone()).collect()
    }

    /// Translation produced by the working behavior
    pub fn translated_text(message: &TranslateMessage) -> String {
        format!("[{}] {}", message.target_lang, message.text)
    }
}

#[async_trait]
impl TranslationChannel for MockChannel {
    async fn translate(&self, message: TranslateMessage) -> Result<TranslateReply, ChannelError> {
        let count = self.request_count.fetch_add(1, Ordering::SeqCst) + 1;
        self.requests.lock().push(message.clone());

        if let Some(hook) = &self.hook {
            hook(&message);
        }

        match &self.behavior {
            MockBehavior::Working => Ok(TranslateReply::success_for(&message, Self::translated_text(&message))),
            MockBehavior::Intermittent { fail_every } => {
                if *fail_every > 0 && count % fail_every == 0 {
                    Err(ChannelError::Transport(format!("Simulated failure on request {}", count)))
                } else {
                    Ok(TranslateReply::success_for(&message, Self::translated_text(&message)))
                }
            }
            MockBehavior::TransportFailure => {
                Err(ChannelError::Transport("Could not establish connection".to_string()))
            }
            MockBehavior::ProviderFailure { message: error } => Ok(TranslateReply::failure(
                error.clone(),
                Some(TranslationFailure::ProviderError.category().to_string()),
            )),
            MockBehavior::Malformed => TranslateReply::from_value(json!({ "unexpected": true })),
            MockBehavior::Mismatched => {
                let mut reply = TranslateReply::success_for(&message, Self::translated_text(&message));
                if let TranslateReply::Success(success) = &mut reply {
                    success.cue_start += 1.0;
                }
                Ok(reply)
            }
            MockBehavior::Slow { delay_ms } => {
                tokio::time::sleep(Duration::from_millis(*delay_ms)).await;
                Ok(TranslateReply::success_for(&message, Self::translated_text(&message)))
            }
        }
    }
}

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::default::Default;

use crate::translation::official::TranslationSource;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Target language code (ISO)
    #[serde(default = "default_target_language")]
    pub target_language: String,

    /// Language of the interface, used for failure placeholders
    #[serde(default = "default_ui_language")]
    pub ui_language: String,

    /// Whether dual subtitles are shown at all
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Seconds added to the playback time before cue lookup
    #[serde(default)]
    pub time_offset_secs: f64,

    /// Official track or API only
    #[serde(default)]
    pub translation_source: TranslationSource,

    /// Queue pacing
    #[serde(default)]
    pub queue: QueueConfig,

    /// Official track matching
    #[serde(default)]
    pub matching: MatchingConfig,

    /// Translation backend
    #[serde(default)]
    pub channel: ChannelConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Translation queue pacing
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct QueueConfig {
    // @field: Cues translated per tick
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    // @field: Pause between two requests of a tick
    #[serde(default = "default_item_delay_ms")]
    pub item_delay_ms: u64,

    // @field: Pause before a rescheduled tick
    #[serde(default = "default_reschedule_delay_ms")]
    pub reschedule_delay_ms: u64,

    // @field: Playback polling period of the controller
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            item_delay_ms: default_item_delay_ms(),
            reschedule_delay_ms: default_reschedule_delay_ms(),
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

/// Official track matching settings
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct MatchingConfig {
    /// Maximum start/end difference for an exact timing match
    #[serde(default = "default_timing_tolerance_ms")]
    pub timing_tolerance_ms: u64,

    /// Minimum overlap relative to the original cue's duration (0.0 to 1.0)
    #[serde(default = "default_min_overlap_ratio")]
    pub min_overlap_ratio: f64,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            timing_tolerance_ms: default_timing_tolerance_ms(),
            min_overlap_ratio: default_min_overlap_ratio(),
        }
    }
}

/// Translation backend type
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ChannelBackend {
    // @backend: Local Ollama server
    #[default]
    Ollama,
    // @backend: Anthropic messages API
    Anthropic,
    // @backend: Background translation service speaking the message protocol
    Http,
}

impl ChannelBackend {
    // @returns: Capitalized backend name
    pub fn display_name(&self) -> &str {
        match self {
            Self::Ollama => "Ollama",
            Self::Anthropic => "Anthropic",
            Self::Http => "HTTP service",
        }
    }

    // @returns: Lowercase backend identifier
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ollama => "ollama",
            Self::Anthropic => "anthropic",
            Self::Http => "http",
        }
    }

    fn default_model(&self) -> String {
        match self {
            Self::Ollama => "llama2".to_string(),
            Self::Anthropic => "claude-3-haiku-20240307".to_string(),
            Self::Http => String::new(),
        }
    }

    fn default_endpoint(&self) -> String {
        match self {
            Self::Ollama => "http://localhost:11434".to_string(),
            Self::Anthropic => "https://api.anthropic.com".to_string(),
            Self::Http => String::new(),
        }
    }
}

impl std::fmt::Display for ChannelBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ChannelBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "ollama" => Ok(Self::Ollama),
            "anthropic" => Ok(Self::Anthropic),
            "http" => Ok(Self::Http),
            _ => Err(anyhow!("Invalid backend type: {}", s)),
        }
    }
}

/// Translation channel configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ChannelConfig {
    // @field: Backend answering translate messages
    #[serde(default)]
    pub backend: ChannelBackend,

    // @field: Model name, empty for the backend default
    #[serde(default = "String::new")]
    pub model: String,

    // @field: API key
    #[serde(default = "String::new")]
    pub api_key: String,

    // @field: Service URL, empty for the backend default
    #[serde(default = "String::new")]
    pub endpoint: String,

    // @field: Timeout seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Retry count for failed requests
    #[serde(default = "default_retry_count")]
    pub retry_count: u32,

    /// Backoff multiplier for retries (in milliseconds)
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,

    /// System prompt template for translation
    /// Placeholder: {target_language}
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,

    /// Temperature parameter for text generation (0.0 to 1.0)
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Whether repeated lines are served from the translation cache
    #[serde(default = "default_true")]
    pub cache_enabled: bool,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            backend: ChannelBackend::default(),
            model: String::new(),
            api_key: String::new(),
            endpoint: String::new(),
            timeout_secs: default_timeout_secs(),
            retry_count: default_retry_count(),
            retry_backoff_ms: default_retry_backoff_ms(),
            system_prompt: default_system_prompt(),
            temperature: default_temperature(),
            cache_enabled: true,
        }
    }
}

impl ChannelConfig {
    /// Get the model, falling back to the backend default
    pub fn get_model(&self) -> String {
        if self.model.is_empty() {
            self.backend.default_model()
        } else {
            self.model.clone()
        }
    }

    /// Get the endpoint, falling back to the backend default
    pub fn get_endpoint(&self) -> String {
        if self.endpoint.is_empty() {
            self.backend.default_endpoint()
        } else {
            self.endpoint.clone()
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

fn default_target_language() -> String {
    "fr".to_string()
}

fn default_ui_language() -> String {
    "en".to_string()
}

fn default_batch_size() -> usize {
    3
}

fn default_item_delay_ms() -> u64 {
    150
}

fn default_reschedule_delay_ms() -> u64 {
    50
}

fn default_poll_interval_ms() -> u64 {
    250
}

fn default_timing_tolerance_ms() -> u64 {
    100
}

fn default_min_overlap_ratio() -> f64 {
    0.5
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_retry_count() -> u32 {
    3
}

fn default_retry_backoff_ms() -> u64 {
    1000 // doubled on each retry
}

fn default_temperature() -> f32 {
    0.3
}

fn default_true() -> bool {
    true
}

fn default_system_prompt() -> String {
    "You are a professional subtitle translator. Translate the following subtitle line to {target_language}. Reply with the translation only, keep it short and preserve the tone.".to_string()
}

impl Config {
    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        let _target_name = crate::language_utils::get_language_name(&self.target_language)?;
        let _ui_name = crate::language_utils::get_language_name(&self.ui_language)?;

        if self.queue.batch_size == 0 {
            return Err(anyhow!("Queue batch size must be at least 1"));
        }

        if !self.time_offset_secs.is_finite() {
            return Err(anyhow!("Time offset must be a finite number of seconds"));
        }

        if !(0.0..=1.0).contains(&self.matching.min_overlap_ratio) {
            return Err(anyhow!("Minimum overlap ratio must be between 0.0 and 1.0, got {}",
                               self.matching.min_overlap_ratio));
        }

        match self.channel.backend {
            ChannelBackend::Anthropic if self.channel.api_key.is_empty() => {
                return Err(anyhow!("Translation API key is required for Anthropic backend"));
            }
            ChannelBackend::Http if self.channel.endpoint.is_empty() => {
                return Err(anyhow!("An endpoint is required for the HTTP backend"));
            }
            _ => {}
        }

        Ok(())
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            target_language: default_target_language(),
            ui_language: default_ui_language(),
            enabled: true,
            time_offset_secs: 0.0,
            translation_source: TranslationSource::default(),
            queue: QueueConfig::default(),
            matching: MatchingConfig::default(),
            channel: ChannelConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}

use std::fmt;
use std::fmt::Write as _;
use regex::Regex;
use once_cell::sync::Lazy;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::errors::SubtitleError;
use crate::translation::messages;

// @module: Subtitle track parsing and the cue data model

// @const: Blank-line block separator
static BLOCK_SEPARATOR_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\n[ \t]*\n\s*").unwrap()
});

// @const: HTML-like markup tags (<b>, <c.yellow>, <00:00:01.000>, ...)
static TAG_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"<[^>]*>").unwrap()
});

// @const: Runs of whitespace
static WHITESPACE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\s+").unwrap()
});

/// Separator between start and end timestamps on a timing line
const TIMING_SEPARATOR: &str = " --> ";

/// Why a cue could not be translated.
///
/// Serialized with the category names the translation channel uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TranslationFailure {
    /// Unknown failure or a reply that could not be understood
    Generic,
    /// The request never reached the translation backend
    RequestTransport,
    /// The backend answered with an error payload
    ProviderError,
}

impl TranslationFailure {
    /// Wire category name
    pub fn category(&self) -> &'static str {
        match self {
            Self::Generic => "GENERIC",
            Self::RequestTransport => "REQUEST_TRANSPORT",
            Self::ProviderError => "PROVIDER_ERROR",
        }
    }

    /// Parse a wire category name, `None` for unrecognized categories
    pub fn from_category(category: &str) -> Option<Self> {
        match category.trim().to_ascii_uppercase().as_str() {
            "GENERIC" => Some(Self::Generic),
            "REQUEST_TRANSPORT" => Some(Self::RequestTransport),
            "PROVIDER_ERROR" => Some(Self::ProviderError),
            _ => None,
        }
    }
}

impl fmt::Display for TranslationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.category())
    }
}

/// Translation state of a cue
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "state", content = "value", rename_all = "lowercase")]
pub enum CueTranslation {
    /// Not translated yet
    #[default]
    Pending,
    /// Translated text
    Translated(String),
    /// Translation failed permanently for this cue
    Failed(TranslationFailure),
}

impl CueTranslation {
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }

    pub fn is_translated(&self) -> bool {
        matches!(self, Self::Translated(_))
    }
}

// @struct: Single timed subtitle cue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cue {
    // @field: Start time in seconds
    pub start: f64,

    // @field: End time in seconds
    pub end: f64,

    // @field: Sanitized original text
    pub original: String,

    // @field: Translation state
    #[serde(default)]
    pub translation: CueTranslation,

    // @field: Playback session the cue belongs to
    #[serde(default)]
    pub session_id: String,
}

/// Identity of a cue, used to find it again after an await point
#[derive(Debug, Clone, PartialEq)]
pub struct CueKey {
    pub session_id: String,
    pub start: f64,
    pub end: f64,
    pub original: String,
}

impl CueKey {
    /// Whether `cue` is the cue this key was taken from
    pub fn matches(&self, cue: &Cue) -> bool {
        cue.session_id == self.session_id
            && cue.start == self.start
            && cue.end == self.end
            && cue.original == self.original
    }
}

impl Cue {
    /// Creates a pending cue that is not attached to a session yet
    pub fn new(start: f64, end: f64, original: impl Into<String>) -> Self {
        Self {
            start,
            end,
            original: original.into(),
            translation: CueTranslation::Pending,
            session_id: String::new(),
        }
    }

    /// Attach the cue to a session
    pub fn with_session(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = session_id.into();
        self
    }

    /// Identity key of this cue
    pub fn key(&self) -> CueKey {
        CueKey {
            session_id: self.session_id.clone(),
            start: self.start,
            end: self.end,
            original: self.original.clone(),
        }
    }

    /// Whether `time` falls inside the cue, both bounds inclusive
    pub fn contains(&self, time: f64) -> bool {
        self.start <= time && time <= self.end
    }

    /// Text to show in the translated region, `None` while pending
    pub fn display_translation(&self, ui_language: &str) -> Option<String> {
        match &self.translation {
            CueTranslation::Pending => None,
            CueTranslation::Translated(text) => Some(text.clone()),
            CueTranslation::Failed(kind) => Some(messages::failure_message(*kind, ui_language).to_string()),
        }
    }
}

impl fmt::Display for Cue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "{} --> {}", format_timestamp(self.start), format_timestamp(self.end))?;
        writeln!(f, "{}", self.original)
    }
}

/// Subtitle formats understood by the parser
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubtitleFormat {
    WebVtt,
    Srt,
    Unknown,
}

impl SubtitleFormat {
    /// Guess the format of a subtitle track from its first lines
    pub fn detect(text: &str) -> Self {
        let trimmed = strip_bom(text).trim();
        if has_webvtt_header(trimmed) {
            return Self::WebVtt;
        }

        let mut lines = trimmed.lines().map(str::trim);
        match (lines.next(), lines.next()) {
            (Some(first), Some(second))
                if first.chars().all(|c| c.is_ascii_digit()) && second.contains("-->") => Self::Srt,
            (Some(first), _) if first.contains("-->") => Self::Srt,
            _ => Self::Unknown,
        }
    }
}

/// Parse a subtitle track of any supported format
pub fn parse_subtitle_track(text: &str) -> Vec<Cue> {
    match SubtitleFormat::detect(text) {
        SubtitleFormat::WebVtt => parse_vtt(text),
        SubtitleFormat::Srt => parse_srt(text),
        SubtitleFormat::Unknown => {
            debug!("Unrecognized subtitle format, ignoring track");
            Vec::new()
        }
    }
}

/// Parse a WebVTT document into cues.
///
/// Never fails: a missing header yields an empty list and malformed blocks
/// are skipped. Cues keep the order in which they appear in the document.
pub fn parse_vtt(text: &str) -> Vec<Cue> {
    let trimmed = strip_bom(text).trim();
    if !has_webvtt_header(trimmed) {
        debug!("{}", SubtitleError::MissingHeader);
        return Vec::new();
    }
    parse_blocks(trimmed)
}

/// Parse an SRT document into cues.
///
/// Uses the same block grammar as WebVTT: the numeric index of each block is
/// an identifier line and comma decimal separators are accepted.
pub fn parse_srt(text: &str) -> Vec<Cue> {
    parse_blocks(strip_bom(text).trim())
}

fn parse_blocks(text: &str) -> Vec<Cue> {
    let normalized = text.replace("\r\n", "\n").replace('\r', "\n");
    let mut cues = Vec::new();

    for block in BLOCK_SEPARATOR_REGEX.split(&normalized) {
        if !block.contains("-->") {
            continue;
        }

        match parse_block(block) {
            Ok(cue) => {
                if cue.start >= cue.end {
                    warn!("Cue at {:.3}s ends at {:.3}s, keeping it anyway", cue.start, cue.end);
                }
                cues.push(cue);
            }
            Err(e) => debug!("Skipping cue block: {}", e),
        }
    }

    cues
}

fn parse_block(block: &str) -> Result<Cue, SubtitleError> {
    let lines: Vec<&str> = block.lines().collect();
    let timing_index = lines.iter()
        .position(|line| line.contains("-->"))
        .ok_or_else(|| SubtitleError::MalformedBlock("no timing line".to_string()))?;

    let timing = lines[timing_index];
    let mut parts = timing.split(TIMING_SEPARATOR);
    let start_token = parts.next().unwrap_or_default().trim();
    let end_token = parts.next()
        .and_then(|rest| rest.split_whitespace().next())
        .ok_or_else(|| SubtitleError::MalformedBlock(format!("bad timing line '{}'", timing.trim())))?;

    let start = parse_timestamp(start_token)
        .ok_or_else(|| SubtitleError::InvalidTimestamp(start_token.to_string()))?;
    let end = parse_timestamp(end_token)
        .ok_or_else(|| SubtitleError::InvalidTimestamp(end_token.to_string()))?;

    let raw_text = lines[timing_index + 1..].join(" ");
    let text = sanitize_text(&raw_text);
    if text.is_empty() {
        return Err(SubtitleError::MalformedBlock(format!("empty text at {}", start_token)));
    }

    Ok(Cue::new(start, end, text))
}

/// Parse a `[HH:]MM:SS(.|,)mmm` timestamp into seconds.
///
/// Each colon-delimited group that is not a number counts as zero. Returns
/// `None` when the token does not have one to three groups.
pub fn parse_timestamp(token: &str) -> Option<f64> {
    let normalized = token.trim().replace(',', ".");
    let values: Vec<f64> = normalized.split(':')
        .map(|group| group.trim().parse::<f64>().ok().filter(|v| v.is_finite()).unwrap_or(0.0))
        .collect();

    match values.as_slice() {
        [seconds] => Some(*seconds),
        [minutes, seconds] => Some(minutes * 60.0 + seconds),
        [hours, minutes, seconds] => Some(hours * 3600.0 + minutes * 60.0 + seconds),
        _ => None,
    }
}

/// Format seconds as a WebVTT timestamp (HH:MM:SS.mmm)
pub fn format_timestamp(seconds: f64) -> String {
    let total_ms = if seconds.is_finite() && seconds > 0.0 {
        (seconds * 1000.0).round() as u64
    } else {
        0
    };
    let hours = total_ms / 3_600_000;
    let minutes = (total_ms % 3_600_000) / 60_000;
    let secs = (total_ms % 60_000) / 1_000;
    let millis = total_ms % 1_000;

    format!("{:02}:{:02}:{:02}.{:03}", hours, minutes, secs, millis)
}

/// Strip markup tags and collapse whitespace
pub fn sanitize_text(raw: &str) -> String {
    let without_tags = TAG_REGEX.replace_all(raw, "");
    WHITESPACE_REGEX.replace_all(&without_tags, " ").trim().to_string()
}

/// Render cues as a WebVTT document with the translation under each original line
pub fn write_dual_vtt(cues: &[Cue], ui_language: &str) -> String {
    let mut output = String::from("WEBVTT\n");
    for cue in cues {
        let _ = write!(output, "\n{} --> {}\n{}\n",
            format_timestamp(cue.start),
            format_timestamp(cue.end),
            cue.original);
        if let Some(translated) = cue.display_translation(ui_language) {
            let _ = writeln!(output, "{}", translated);
        }
    }
    output
}

fn strip_bom(text: &str) -> &str {
    text.trim_start_matches('\u{feff}')
}

fn has_webvtt_header(trimmed: &str) -> bool {
    trimmed.get(..6).is_some_and(|head| head.eq_ignore_ascii_case("WEBVTT"))
}

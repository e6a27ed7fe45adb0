/*!
 * # dualsub - Dual-language subtitles
 *
 * A Rust library that shows every subtitle line of a video together with its
 * translation, translating lines just ahead of the playhead.
 *
 * ## Features
 *
 * - WebVTT and SRT parsing into a time-indexed cue timeline
 * - Session isolation: cues of a previous video never leak into the current one
 * - Playback time from a scrubber or the media clock, with a user offset
 * - Single-flight, sequential translation of upcoming cues through:
 *   - Ollama (local LLM)
 *   - Anthropic API
 *   - A background HTTP translation service
 * - Official translation tracks preferred over API translations
 * - Localized placeholders for failed translations
 * - Diff-guarded rendering of the original and translated regions
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `subtitle_processor`: Cue model and subtitle track parsing
 * - `timeline`: Cue storage per session
 * - `time_source`: Playback time resolution
 * - `translation`: Translation of pending cues:
 *   - `translation::queue`: Single-flight batch processor
 *   - `translation::channel`: Request/reply interface to backends
 *   - `translation::cache`: Caching of repeated lines
 *   - `translation::messages`: Localized failure placeholders
 *   - `translation::official`: Official track matching
 * - `display`: Subtitle region reconciliation
 * - `app_controller`: Wiring for one playback page
 * - `playback`: Simulated media player
 * - `language_utils`: ISO language code utilities
 * - `providers`: Translation backends and channels
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod display;
pub mod errors;
pub mod language_utils;
pub mod playback;
pub mod providers;
pub mod subtitle_processor;
pub mod time_source;
pub mod timeline;
pub mod translation;

// Re-export main types for easier usage
pub use app_config::Config;
pub use app_controller::DualSubtitleController;
pub use display::{DisplayReconciler, MemorySurface, SubtitleSurface};
pub use subtitle_processor::{Cue, CueTranslation, TranslationFailure};
pub use timeline::{CueTimeline, SharedTimeline};
pub use time_source::{PlaybackTimeSource, TimeSource};
pub use translation::{TranslationChannel, TranslationQueue};
pub use language_utils::{language_codes_match, normalize_to_part2t, get_language_name};
pub use errors::{AppError, ChannelError, ProviderError, SubtitleError};

/*!
 * Cue translation.
 *
 * This module contains everything between a pending cue and its translated
 * text. It is split into several submodules:
 *
 * - `queue`: Single-flight batch processor filling in translations
 * - `channel`: Request/reply interface to a translation backend
 * - `cache`: Caching of repeated lines
 * - `messages`: Localized placeholders for failed translations
 * - `official`: Pairing of original cues with an official translation track
 */

// Re-export main types for easier usage
pub use self::channel::{TranslateMessage, TranslateReply, TranslationChannel};
pub use self::official::{CueMatcher, TranslationSource};
pub use self::queue::{QueueSettings, TickOutcome, TranslationQueue};

// Submodules
pub mod cache;
pub mod channel;
pub mod messages;
pub mod official;
pub mod queue;

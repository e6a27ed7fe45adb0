/*!
 * Official translation tracks.
 *
 * Streaming platforms often publish a subtitle track in the target language.
 * When the user prefers it, each original cue is paired with an official cue,
 * either by (near) identical timing or by the largest time overlap, and only
 * the cues left unpaired go through the translation channel.
 */

use serde::{Deserialize, Serialize};

use crate::app_config::MatchingConfig;
use crate::subtitle_processor::Cue;

/// Where translations come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TranslationSource {
    /// Prefer an official track, translate the rest through the channel
    #[default]
    Official,
    /// Ignore official tracks
    Api,
}

/// Pairs original cues with official cues
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CueMatcher {
    /// Maximum start/end difference for an exact timing match, in seconds
    pub timing_tolerance: f64,

    /// Minimum overlap, relative to the original cue's duration
    pub min_overlap_ratio: f64,
}

impl Default for CueMatcher {
    fn default() -> Self {
        Self::from_config(&MatchingConfig::default())
    }
}

impl CueMatcher {
    pub fn from_config(config: &MatchingConfig) -> Self {
        Self {
            timing_tolerance: config.timing_tolerance_ms as f64 / 1000.0,
            min_overlap_ratio: config.min_overlap_ratio,
        }
    }

    /// Official cue best matching `original`, if any
    pub fn find_match<'a>(&self, original: &Cue, official: &'a [Cue]) -> Option<&'a Cue> {
        if let Some(exact) = official.iter().find(|candidate| self.is_exact_match(original, candidate)) {
            return Some(exact);
        }

        let duration = original.end - original.start;
        if duration <= 0.0 {
            return None;
        }

        official.iter()
            .map(|candidate| (candidate, overlap(original, candidate)))
            .filter(|(_, shared)| *shared > 0.0 && shared / duration >= self.min_overlap_ratio)
            .max_by(|(_, a), (_, b)| a.total_cmp(b))
            .map(|(candidate, _)| candidate)
    }

    fn is_exact_match(&self, original: &Cue, candidate: &Cue) -> bool {
        (original.start - candidate.start).abs() <= self.timing_tolerance
            && (original.end - candidate.end).abs() <= self.timing_tolerance
    }
}

/// Length of the time span covered by both cues
fn overlap(a: &Cue, b: &Cue) -> f64 {
    (a.end.min(b.end) - a.start.max(b.start)).max(0.0)
}

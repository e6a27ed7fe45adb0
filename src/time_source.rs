/*!
 * Playback time resolution.
 *
 * Two independent signals can report where playback is: the media element's
 * own clock and a scrubber control exposing `valuenow`/`valuemax` attributes.
 * `PlaybackTimeSource` reconciles them into one value and applies the user's
 * time offset.
 */

use std::sync::Arc;
use parking_lot::RwLock;

/// Native clock of a media element
pub trait MediaClock: Send + Sync {
    /// Current playback position in seconds
    fn position(&self) -> Option<f64>;

    /// Media duration in seconds, if known
    fn duration(&self) -> Option<f64>;
}

/// Scrubber-like control exposing its position as numeric attributes
pub trait ScrubberControl: Send + Sync {
    /// The `valuenow` attribute
    fn value_now(&self) -> Option<f64>;

    /// The `valuemax` attribute
    fn value_max(&self) -> Option<f64>;
}

/// Anything that can tell the current playback time
pub trait TimeSource: Send + Sync {
    /// Current time in seconds, `None` when no valid time is available
    fn resolve_current_time(&self) -> Option<f64>;
}

/// Which producer a `PlaybackTimeSource` was set up with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeSignal {
    /// Scrubber position, falling back to the media clock
    Scrubber,
    /// Media clock only
    MediaClock,
}

/// Reconciled playback time with a user offset
pub struct PlaybackTimeSource {
    media: Arc<dyn MediaClock>,
    scrubber: Option<Arc<dyn ScrubberControl>>,
    offset_secs: RwLock<f64>,
}

impl PlaybackTimeSource {
    /// Create a time source.
    ///
    /// The producer is chosen once here: with a scrubber attached the
    /// scrubber is preferred, otherwise only the media clock is consulted.
    pub fn new(media: Arc<dyn MediaClock>, scrubber: Option<Arc<dyn ScrubberControl>>, offset_secs: f64) -> Self {
        Self {
            media,
            scrubber,
            offset_secs: RwLock::new(sanitize_offset(offset_secs)),
        }
    }

    /// Producer selected at construction
    pub fn signal(&self) -> TimeSignal {
        if self.scrubber.is_some() {
            TimeSignal::Scrubber
        } else {
            TimeSignal::MediaClock
        }
    }

    /// Change the user time offset
    pub fn set_offset(&self, offset_secs: f64) {
        *self.offset_secs.write() = sanitize_offset(offset_secs);
    }

    pub fn offset(&self) -> f64 {
        *self.offset_secs.read()
    }

    /// Position derived from the scrubber, if it reports usable attributes
    fn scrubber_time(&self) -> Option<f64> {
        let scrubber = self.scrubber.as_ref()?;
        let now = scrubber.value_now().filter(|v| v.is_finite())?;
        let max = scrubber.value_max().filter(|v| v.is_finite() && *v > 0.0)?;
        let duration = self.media.duration().filter(|d| d.is_finite() && *d > 0.0)?;
        Some((now / max) * duration)
    }

    fn media_time(&self) -> Option<f64> {
        self.media.position().filter(|t| t.is_finite())
    }
}

impl TimeSource for PlaybackTimeSource {
    fn resolve_current_time(&self) -> Option<f64> {
        let base = match self.signal() {
            TimeSignal::Scrubber => self.scrubber_time().or_else(|| self.media_time()),
            TimeSignal::MediaClock => self.media_time(),
        }?;
        Some(base + self.offset()).filter(|t| t.is_finite())
    }
}

/// Time source pinned to a fixed position
#[derive(Debug, Clone, Copy)]
pub struct FixedTime(pub f64);

impl TimeSource for FixedTime {
    fn resolve_current_time(&self) -> Option<f64> {
        Some(self.0).filter(|t| t.is_finite())
    }
}

fn sanitize_offset(offset_secs: f64) -> f64 {
    if offset_secs.is_finite() { offset_secs } else { 0.0 }
}

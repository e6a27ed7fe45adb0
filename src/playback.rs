/*!
 * Simulated media player.
 *
 * Stands in for the page's media element and scrubber when the library runs
 * outside a browser: the CLI drives it with wall-clock time and tests move it
 * around explicitly.
 */

use parking_lot::Mutex;

use crate::time_source::{MediaClock, ScrubberControl};

#[derive(Debug, Clone)]
struct PlayerState {
    position: f64,
    duration: Option<f64>,
    scrubber_max: Option<f64>,
    scrubber_visible: bool,
    speed: f64,
}

/// In-memory media element with an optional scrubber
#[derive(Debug)]
pub struct SimulatedPlayer {
    state: Mutex<PlayerState>,
}

impl SimulatedPlayer {
    /// Player of a media with the given duration, without scrubber
    pub fn new(duration: Option<f64>) -> Self {
        Self {
            state: Mutex::new(PlayerState {
                position: 0.0,
                duration,
                scrubber_max: None,
                scrubber_visible: false,
                speed: 1.0,
            }),
        }
    }

    /// Attach a scrubber whose `valuemax` is `value_max`
    pub fn with_scrubber(self, value_max: f64) -> Self {
        {
            let mut state = self.state.lock();
            state.scrubber_max = Some(value_max);
            state.scrubber_visible = true;
        }
        self
    }

    /// Playback speed multiplier used by `advance`
    pub fn with_speed(self, speed: f64) -> Self {
        self.state.lock().speed = if speed.is_finite() && speed > 0.0 { speed } else { 1.0 };
        self
    }

    /// Move the playhead forward by `elapsed_secs` of wall-clock time
    pub fn advance(&self, elapsed_secs: f64) -> f64 {
        let mut state = self.state.lock();
        state.position += elapsed_secs * state.speed;
        if let Some(duration) = state.duration {
            state.position = state.position.min(duration);
        }
        state.position
    }

    /// Jump to `position` seconds
    pub fn seek(&self, position: f64) {
        self.state.lock().position = position.max(0.0);
    }

    /// Hide or show the scrubber; a hidden scrubber reports no attributes
    pub fn set_scrubber_visible(&self, visible: bool) {
        self.state.lock().scrubber_visible = visible;
    }

    /// Whether the playhead reached the end of the media
    pub fn is_finished(&self) -> bool {
        let state = self.state.lock();
        state.duration.is_some_and(|duration| state.position >= duration)
    }
}

impl MediaClock for SimulatedPlayer {
    fn position(&self) -> Option<f64> {
        Some(self.state.lock().position)
    }

    fn duration(&self) -> Option<f64> {
        self.state.lock().duration
    }
}

impl ScrubberControl for SimulatedPlayer {
    fn value_now(&self) -> Option<f64> {
        let state = self.state.lock();
        if !state.scrubber_visible {
            return None;
        }
        let max = state.scrubber_max?;
        let duration = state.duration.filter(|d| *d > 0.0)?;
        Some(state.position / duration * max)
    }

    fn value_max(&self) -> Option<f64> {
        let state = self.state.lock();
        state.scrubber_max.filter(|_| state.scrubber_visible)
    }
}

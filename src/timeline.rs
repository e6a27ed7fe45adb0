/*!
 * Cue timeline store.
 *
 * The timeline exclusively owns every cue. It is kept sorted by start time,
 * scoped by playback session, and only ever mutated wholesale (replace, clear)
 * or through the single `translation` field of a cue.
 */

use std::sync::Arc;
use parking_lot::Mutex;
use log::debug;

use crate::subtitle_processor::{Cue, CueKey, CueTranslation};
use crate::translation::official::CueMatcher;

/// Timeline shared between the controller, the queue and the display
pub type SharedTimeline = Arc<Mutex<CueTimeline>>;

/// Result of writing a translation back into the timeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// The cue was found and updated
    Applied,
    /// The cue's session is no longer active, or was re-activated since
    SessionChanged,
    /// No cue with this identity exists anymore
    NotFound,
    /// The cue already holds a successful translation
    AlreadyTranslated,
}

/// Time-indexed cue collection
#[derive(Debug, Default)]
pub struct CueTimeline {
    /// Cues of all loaded sessions, sorted by start time
    cues: Vec<Cue>,

    /// Session currently being played
    active_session: Option<String>,

    /// Bumped whenever the active session is replaced or cleared
    generation: u64,
}

impl CueTimeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a timeline wrapped for sharing
    pub fn shared() -> SharedTimeline {
        Arc::new(Mutex::new(Self::new()))
    }

    /// Replace every cue of `session_id` with `cues`.
    ///
    /// Cues with empty text are dropped, the rest are stamped with the session
    /// id and merged into the store, which stays sorted by start time.
    /// Returns the number of cues stored for the session.
    pub fn replace_cues_for_session(&mut self, session_id: &str, cues: Vec<Cue>) -> usize {
        self.cues.retain(|cue| cue.session_id != session_id);

        let before = self.cues.len();
        self.cues.extend(
            cues.into_iter()
                .filter(|cue| !cue.original.trim().is_empty())
                .map(|cue| cue.with_session(session_id)),
        );
        let inserted = self.cues.len() - before;

        // Stable sort keeps document order for cues starting together
        self.cues.sort_by(|a, b| a.start.total_cmp(&b.start));

        debug!("Stored {} cues for session {}", inserted, session_id);
        inserted
    }

    /// Make `session_id` the active session and purge every other session.
    ///
    /// Returns `true` when the active session changed.
    pub fn activate_session(&mut self, session_id: &str) -> bool {
        if self.active_session.as_deref() == Some(session_id) {
            return false;
        }

        let before = self.cues.len();
        self.cues.retain(|cue| cue.session_id == session_id);
        debug!("Switched to session {} ({} stale cues purged)", session_id, before - self.cues.len());

        self.active_session = Some(session_id.to_string());
        self.generation += 1;
        true
    }

    /// Session currently being played, if any
    pub fn active_session(&self) -> Option<&str> {
        self.active_session.as_deref()
    }

    /// Activation counter of the current session.
    ///
    /// Switching away and back to the same session id yields a new value.
    pub fn session_generation(&self) -> u64 {
        self.generation
    }

    /// Whether `session_id` is still the session activated at `generation`
    pub fn is_current(&self, session_id: &str, generation: u64) -> bool {
        self.generation == generation && self.active_session.as_deref() == Some(session_id)
    }

    /// First cue of `session_id`, in start order, that covers `time`
    pub fn active_cue_at(&self, time: f64, session_id: &str) -> Option<&Cue> {
        self.cues.iter()
            .find(|cue| cue.session_id == session_id && cue.contains(time))
    }

    /// Untranslated cues of `session_id` that have not fully elapsed at `time`.
    ///
    /// Earliest first, at most `limit` of them.
    pub fn pending_translation_cues(&self, time: f64, session_id: &str, limit: usize) -> Vec<Cue> {
        self.cues.iter()
            .filter(|cue| {
                cue.session_id == session_id
                    && !cue.original.trim().is_empty()
                    && cue.translation.is_pending()
                    && cue.end >= time
            })
            .take(limit)
            .cloned()
            .collect()
    }

    /// Write a translation result back into the cue identified by `key`.
    ///
    /// The cue is looked up again instead of trusting a stale reference, and
    /// the write only happens while its session has stayed active since the
    /// request was sent.
    pub fn apply_translation(&mut self, key: &CueKey, generation: u64, translation: CueTranslation) -> ApplyOutcome {
        if !self.is_current(&key.session_id, generation) {
            return ApplyOutcome::SessionChanged;
        }

        let Some(cue) = self.cues.iter_mut().find(|cue| key.matches(cue)) else {
            return ApplyOutcome::NotFound;
        };

        if cue.translation.is_translated() {
            return ApplyOutcome::AlreadyTranslated;
        }

        cue.translation = translation;
        ApplyOutcome::Applied
    }

    /// Fill pending cues of `session_id` from an official translation track.
    ///
    /// Returns the number of cues that received an official translation.
    pub fn apply_official_translations(&mut self, session_id: &str, official: &[Cue], matcher: &CueMatcher) -> usize {
        let mut applied = 0;
        for cue in self.cues.iter_mut()
            .filter(|cue| cue.session_id == session_id && cue.translation.is_pending())
        {
            if let Some(matched) = matcher.find_match(cue, official) {
                cue.translation = CueTranslation::Translated(matched.original.clone());
                applied += 1;
            }
        }
        debug!("Applied {} official translations to session {}", applied, session_id);
        applied
    }

    /// Remove every cue of `session_id`
    pub fn clear_session(&mut self, session_id: &str) {
        self.cues.retain(|cue| cue.session_id != session_id);
    }

    /// Remove every cue and forget the active session
    pub fn clear_all(&mut self) {
        self.cues.clear();
        self.active_session = None;
        self.generation += 1;
    }

    /// Cues of `session_id` in start order
    pub fn cues_for_session<'a>(&'a self, session_id: &'a str) -> impl Iterator<Item = &'a Cue> + 'a {
        self.cues.iter().filter(move |cue| cue.session_id == session_id)
    }

    /// Number of cues of `session_id` that are still pending
    pub fn pending_count(&self, session_id: &str) -> usize {
        self.cues_for_session(session_id)
            .filter(|cue| cue.translation.is_pending())
            .count()
    }

    /// Total number of cues across sessions
    pub fn len(&self) -> usize {
        self.cues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cues.is_empty()
    }
}

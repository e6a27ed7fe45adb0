/*!
 * Translation queue processor.
 *
 * Each tick picks the earliest untranslated cues that are still relevant at
 * the current playback time, translates them one after the other through the
 * translation channel and writes the results back into the timeline. A tick
 * that leaves a backlog asks to be rescheduled shortly after.
 *
 * Only one tick runs at a time. The latch is a plain flag: a trigger that
 * finds it set does nothing and relies on the next trigger.
 */

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;
use log::{debug, warn};
use parking_lot::RwLock;
use tokio::task::JoinHandle;

use crate::app_config::Config;
use crate::errors::ChannelError;
use crate::subtitle_processor::{Cue, CueTranslation, TranslationFailure};
use crate::time_source::TimeSource;
use crate::timeline::{ApplyOutcome, SharedTimeline};

use super::cache::TranslationCache;
use super::channel::{TranslateMessage, TranslateReply, TranslateSuccess, TranslationChannel};

/// Tolerance when comparing the echoed cue start with the requested one
const CUE_START_EPSILON: f64 = 1e-6;

/// Settings read at the start of every tick
#[derive(Debug, Clone, PartialEq)]
pub struct QueueSettings {
    /// Target language code
    pub target_language: String,
    /// Maximum number of cues per tick
    pub batch_size: usize,
    /// Pause between two requests of the same tick
    pub item_delay: Duration,
    /// Pause before a rescheduled tick
    pub reschedule_delay: Duration,
    /// Whether subtitles are enabled at all
    pub enabled: bool,
}

impl QueueSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            target_language: config.target_language.clone(),
            batch_size: config.queue.batch_size.max(1),
            item_delay: Duration::from_millis(config.queue.item_delay_ms),
            reschedule_delay: Duration::from_millis(config.queue.reschedule_delay_ms),
            enabled: config.enabled,
        }
    }
}

/// Why a tick did nothing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Another tick is walking a batch
    AlreadyProcessing,
    /// Subtitles are disabled
    Disabled,
    /// No session is active
    NoSession,
    /// The time source has no valid time
    NoTime,
}

/// Result of one processing tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Entry conditions not met
    Skipped(SkipReason),
    /// Nothing pending
    Idle,
    /// Batch walked, no backlog left
    Drained { processed: usize },
    /// Batch walked, more cues are pending
    Reschedule { processed: usize },
}

impl TickOutcome {
    pub fn should_reschedule(&self) -> bool {
        matches!(self, Self::Reschedule { .. })
    }
}

/// Counters describing the queue's work so far
#[derive(Debug, Default)]
struct QueueStats {
    requested: AtomicUsize,
    translated: AtomicUsize,
    failed: AtomicUsize,
    discarded: AtomicUsize,
    cache_hits: AtomicUsize,
}

/// Point-in-time copy of the queue counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct QueueStatsSnapshot {
    /// Requests sent over the channel
    pub requested: usize,
    /// Cues that received a translation
    pub translated: usize,
    /// Cues that received a failure placeholder
    pub failed: usize,
    /// Results dropped because their cue or session was gone
    pub discarded: usize,
    /// Translations served from the cache
    pub cache_hits: usize,
}

/// Holds the processing flag for the lifetime of a tick
struct ProcessingLatch<'a>(&'a AtomicBool);

impl<'a> ProcessingLatch<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for ProcessingLatch<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Translates pending cues of the active session
pub struct TranslationQueue {
    timeline: SharedTimeline,
    channel: Arc<dyn TranslationChannel>,
    time_source: Arc<dyn TimeSource>,
    settings: RwLock<QueueSettings>,
    cache: TranslationCache,
    processing: AtomicBool,
    stats: QueueStats,
}

impl TranslationQueue {
    pub fn new(
        timeline: SharedTimeline,
        channel: Arc<dyn TranslationChannel>,
        time_source: Arc<dyn TimeSource>,
        settings: QueueSettings,
        cache: TranslationCache,
    ) -> Self {
        Self {
            timeline,
            channel,
            time_source,
            settings: RwLock::new(settings),
            cache,
            processing: AtomicBool::new(false),
            stats: QueueStats::default(),
        }
    }

    /// Replace the settings; the next tick picks them up
    pub fn update_settings(&self, settings: QueueSettings) {
        *self.settings.write() = settings;
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.settings.write().enabled = enabled;
    }

    pub fn settings(&self) -> QueueSettings {
        self.settings.read().clone()
    }

    /// Whether a tick is currently walking a batch
    pub fn is_processing(&self) -> bool {
        self.processing.load(Ordering::Acquire)
    }

    pub fn cache(&self) -> &TranslationCache {
        &self.cache
    }

    pub fn stats(&self) -> QueueStatsSnapshot {
        QueueStatsSnapshot {
            requested: self.stats.requested.load(Ordering::Relaxed),
            translated: self.stats.translated.load(Ordering::Relaxed),
            failed: self.stats.failed.load(Ordering::Relaxed),
            discarded: self.stats.discarded.load(Ordering::Relaxed),
            cache_hits: self.stats.cache_hits.load(Ordering::Relaxed),
        }
    }

    /// Run one processing tick
    pub async fn process_tick(&self) -> TickOutcome {
        let Some(latch) = ProcessingLatch::acquire(&self.processing) else {
            return TickOutcome::Skipped(SkipReason::AlreadyProcessing);
        };

        let settings = self.settings();
        if !settings.enabled {
            return TickOutcome::Skipped(SkipReason::Disabled);
        }

        let (session, generation) = {
            let timeline = self.timeline.lock();
            (timeline.active_session().map(str::to_string), timeline.session_generation())
        };
        let Some(session_id) = session else {
            return TickOutcome::Skipped(SkipReason::NoSession);
        };

        let Some(time) = self.time_source.resolve_current_time() else {
            return TickOutcome::Skipped(SkipReason::NoTime);
        };

        let batch = self.timeline.lock().pending_translation_cues(time, &session_id, settings.batch_size.max(1));
        if batch.is_empty() {
            return TickOutcome::Idle;
        }

        debug!("Translating {} cues of session {} at {:.3}s", batch.len(), session_id, time);

        let mut processed = 0;
        for (index, cue) in batch.iter().enumerate() {
            if index > 0 && !settings.item_delay.is_zero() {
                tokio::time::sleep(settings.item_delay).await;
            }

            if !self.timeline.lock().is_current(&session_id, generation) {
                debug!("Session {} is no longer active, abandoning batch", session_id);
                break;
            }

            let translation = self.translate_cue(cue, &settings.target_language).await;
            self.write_back(cue, generation, translation);
            processed += 1;
        }

        drop(latch);

        // Backlog is judged at the time captured when the tick started
        let backlog = !self.timeline.lock().pending_translation_cues(time, &session_id, 1).is_empty();
        if backlog {
            TickOutcome::Reschedule { processed }
        } else {
            TickOutcome::Drained { processed }
        }
    }

    /// Run ticks until no backlog remains, pausing between rescheduled ticks.
    ///
    /// Returns the number of cues processed.
    pub async fn drain(&self) -> usize {
        let mut total = 0;
        loop {
            match self.process_tick().await {
                TickOutcome::Reschedule { processed } => {
                    total += processed;
                    let delay = self.settings.read().reschedule_delay;
                    tokio::time::sleep(delay).await;
                }
                TickOutcome::Drained { processed } => {
                    total += processed;
                    break;
                }
                TickOutcome::Idle | TickOutcome::Skipped(_) => break,
            }
        }
        total
    }

    /// Drain on a background task
    pub fn spawn_drain(self: &Arc<Self>) -> JoinHandle<usize> {
        let queue = Arc::clone(self);
        tokio::spawn(async move { queue.drain().await })
    }

    async fn translate_cue(&self, cue: &Cue, target_language: &str) -> CueTranslation {
        if let Some(cached) = self.cache.get(&cue.original, target_language) {
            self.stats.cache_hits.fetch_add(1, Ordering::Relaxed);
            return CueTranslation::Translated(cached);
        }

        let message = TranslateMessage::new(&cue.original, target_language, cue.start, &cue.session_id);
        self.stats.requested.fetch_add(1, Ordering::Relaxed);

        match self.channel.translate(message).await {
            Ok(TranslateReply::Success(reply)) => match validate_reply(cue, reply) {
                Ok(text) => {
                    self.cache.store(&cue.original, target_language, &text);
                    CueTranslation::Translated(text)
                }
                Err(e) => {
                    warn!("Unusable translation reply for cue at {:.3}s: {}", cue.start, e);
                    CueTranslation::Failed(e.failure_kind())
                }
            },
            Ok(TranslateReply::Failure(failure)) => {
                warn!("Translation provider error for cue at {:.3}s: {}{}",
                      cue.start,
                      failure.error,
                      failure.details.as_deref().map(|d| format!(" ({})", d)).unwrap_or_default());
                let kind = failure.error_type.as_deref()
                    .and_then(TranslationFailure::from_category)
                    .unwrap_or(TranslationFailure::ProviderError);
                CueTranslation::Failed(kind)
            }
            Err(e) => {
                warn!("Translation request for cue at {:.3}s failed: {}", cue.start, e);
                CueTranslation::Failed(e.failure_kind())
            }
        }
    }

    fn write_back(&self, cue: &Cue, generation: u64, translation: CueTranslation) {
        let failed = matches!(translation, CueTranslation::Failed(_));
        let outcome = self.timeline.lock().apply_translation(&cue.key(), generation, translation);

        match outcome {
            ApplyOutcome::Applied if failed => {
                self.stats.failed.fetch_add(1, Ordering::Relaxed);
            }
            ApplyOutcome::Applied => {
                self.stats.translated.fetch_add(1, Ordering::Relaxed);
            }
            ApplyOutcome::SessionChanged | ApplyOutcome::NotFound => {
                self.stats.discarded.fetch_add(1, Ordering::Relaxed);
                debug!("Discarding translation for cue at {:.3}s of session {}: {:?}",
                       cue.start, cue.session_id, outcome);
            }
            ApplyOutcome::AlreadyTranslated => {
                debug!("Cue at {:.3}s was translated meanwhile, keeping it", cue.start);
            }
        }
    }
}

/// Check that a success reply belongs to `cue` and carries text
fn validate_reply(cue: &Cue, reply: TranslateSuccess) -> Result<String, ChannelError> {
    if reply.cue_video_id != cue.session_id || (reply.cue_start - cue.start).abs() > CUE_START_EPSILON {
        return Err(ChannelError::MalformedReply(format!(
            "reply for cue {}@{:.3} does not match request {}@{:.3}",
            reply.cue_video_id, reply.cue_start, cue.session_id, cue.start
        )));
    }

    let text = reply.translated_text.trim();
    if text.is_empty() {
        return Err(ChannelError::MalformedReply("empty translated text".to_string()));
    }

    Ok(text.to_string())
}

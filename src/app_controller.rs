use anyhow::Result;
use log::{debug, info, warn};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

use crate::app_config::Config;
use crate::display::{DisplayReconciler, RenderOutcome, SubtitleSurface};
use crate::subtitle_processor::parse_subtitle_track;
use crate::time_source::{PlaybackTimeSource, TimeSource};
use crate::timeline::{CueTimeline, SharedTimeline};
use crate::translation::cache::TranslationCache;
use crate::translation::channel::TranslationChannel;
use crate::translation::official::{CueMatcher, TranslationSource};
use crate::translation::queue::{QueueSettings, TranslationQueue};

// @module: Dual subtitle controller for one playback page

/// Wires the timeline, translation queue, time source and display together
pub struct DualSubtitleController<S: SubtitleSurface> {
    // @field: App configuration
    config: Config,

    // @field: Cues of the active session
    timeline: SharedTimeline,

    // @field: Single-flight translation processor
    queue: Arc<TranslationQueue>,

    // @field: Subtitle regions
    display: DisplayReconciler<S>,

    // @field: Playback time producer
    time_source: Arc<PlaybackTimeSource>,

    // @field: Official track matcher
    matcher: CueMatcher,

    // @field: Background drain, if one was started
    drain_task: Option<JoinHandle<usize>>,
}

impl<S: SubtitleSurface> DualSubtitleController<S> {
    // @method: Create a controller with the given configuration
    pub fn new(
        config: Config,
        channel: Arc<dyn TranslationChannel>,
        time_source: Arc<PlaybackTimeSource>,
        surface: S,
    ) -> Self {
        let timeline = CueTimeline::shared();
        time_source.set_offset(config.time_offset_secs);

        let queue = Arc::new(TranslationQueue::new(
            Arc::clone(&timeline),
            channel,
            Arc::clone(&time_source) as Arc<dyn TimeSource>,
            QueueSettings::from_config(&config),
            TranslationCache::new(config.channel.cache_enabled),
        ));

        Self {
            display: DisplayReconciler::new(surface, config.ui_language.clone()),
            matcher: CueMatcher::from_config(&config.matching),
            config,
            timeline,
            queue,
            time_source,
            drain_task: None,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn timeline(&self) -> &SharedTimeline {
        &self.timeline
    }

    pub fn queue(&self) -> &Arc<TranslationQueue> {
        &self.queue
    }

    pub fn display(&self) -> &DisplayReconciler<S> {
        &self.display
    }

    pub fn display_mut(&mut self) -> &mut DisplayReconciler<S> {
        &mut self.display
    }

    pub fn time_source(&self) -> &Arc<PlaybackTimeSource> {
        &self.time_source
    }

    /// Load the original track of `session_id` and start translating it.
    ///
    /// Returns the number of cues stored.
    pub fn load_track(&mut self, session_id: &str, text: &str) -> usize {
        self.load_tracks(session_id, text, None)
    }

    /// Load the original track and, optionally, an official translation track.
    ///
    /// Official translations are applied before the queue starts, so matched
    /// cues are never sent over the channel.
    pub fn load_tracks(&mut self, session_id: &str, original: &str, official: Option<&str>) -> usize {
        let cues = parse_subtitle_track(original);
        if cues.is_empty() {
            warn!("No cues found in subtitle track for session {}", session_id);
        }

        let stored = {
            let mut timeline = self.timeline.lock();
            if timeline.activate_session(session_id) {
                debug!("Session changed to {}", session_id);
            }
            timeline.replace_cues_for_session(session_id, cues)
        };
        info!("Loaded {} cues for session {}", stored, session_id);

        if let Some(official) = official {
            self.load_official_track(session_id, official);
        }

        self.trigger_translation();
        stored
    }

    /// Fill cues of `session_id` from an official translation track.
    ///
    /// Does nothing when translations come from the API only. Returns the
    /// number of cues that received an official translation.
    pub fn load_official_track(&mut self, session_id: &str, text: &str) -> usize {
        if self.config.translation_source != TranslationSource::Official {
            debug!("Ignoring official track, translations come from the API");
            return 0;
        }

        let official = parse_subtitle_track(text);
        let applied = self.timeline.lock().apply_official_translations(session_id, &official, &self.matcher);
        info!("Matched {} cues with the official track", applied);
        applied
    }

    /// Switch to another session, dropping the cues of every other one.
    ///
    /// Returns `true` when the active session actually changed.
    pub fn change_session(&mut self, session_id: &str) -> bool {
        let changed = self.timeline.lock().activate_session(session_id);
        if changed {
            info!("Session changed to {}", session_id);
            self.display.clear();
        }
        changed
    }

    /// Turn dual subtitles on or off.
    ///
    /// Turning them off drops every cue and clears the regions.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.config.enabled = enabled;
        self.queue.set_enabled(enabled);

        if !enabled {
            self.timeline.lock().clear_all();
            self.display.clear();
            info!("Dual subtitles disabled");
        } else {
            info!("Dual subtitles enabled");
        }
    }

    pub fn set_time_offset(&mut self, offset_secs: f64) {
        self.config.time_offset_secs = offset_secs;
        self.time_source.set_offset(offset_secs);
    }

    /// Render the cue at the current playback time and keep the queue busy
    pub fn on_time_update(&mut self) -> RenderOutcome {
        if !self.config.enabled {
            return RenderOutcome::Skipped;
        }

        let time = self.time_source.resolve_current_time();
        let outcome = {
            let timeline = self.timeline.lock();
            let session = timeline.active_session().map(str::to_string);
            self.display.render(time, session.as_deref(), &timeline)
        };

        self.trigger_translation();
        outcome
    }

    /// Start a background drain unless one is already running.
    ///
    /// Returns `true` when a new drain was started.
    pub fn trigger_translation(&mut self) -> bool {
        if !self.config.enabled || self.queue.is_processing() {
            return false;
        }

        if self.drain_task.as_ref().is_some_and(|task| !task.is_finished()) {
            return false;
        }

        if self.timeline.lock().active_session().is_none() {
            return false;
        }

        if tokio::runtime::Handle::try_current().is_err() {
            warn!("No async runtime available, translations are not started");
            return false;
        }

        self.drain_task = Some(self.queue.spawn_drain());
        true
    }

    /// Wait for the current drain to finish.
    ///
    /// Returns the number of cues it processed.
    pub async fn wait_for_translations(&mut self) -> usize {
        match self.drain_task.take() {
            Some(task) => task.await.unwrap_or_else(|e| {
                warn!("Translation task ended abnormally: {}", e);
                0
            }),
            None => 0,
        }
    }

    /// Poll the playback time until `stop` completes.
    ///
    /// Returns the number of polls.
    pub async fn run_until<F>(&mut self, stop: F) -> usize
    where
        F: Future<Output = ()>,
    {
        let period = Duration::from_millis(self.config.queue.poll_interval_ms.max(1));
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        tokio::pin!(stop);
        let mut polls = 0;

        loop {
            tokio::select! {
                _ = &mut stop => break,
                _ = interval.tick() => {
                    self.on_time_update();
                    polls += 1;
                }
            }
        }

        debug!("Stopped polling after {} updates", polls);
        polls
    }

    /// Stop translating and remove the subtitle regions
    pub async fn shutdown(&mut self) -> Result<()> {
        self.queue.set_enabled(false);

        if let Some(task) = self.drain_task.take() {
            task.abort();
            // Aborted tasks report a cancellation error
            let _ = task.await;
        }

        self.display.teardown();
        self.queue.cache().clear();

        let stats = self.queue.stats();
        info!("Translation stats: {} requested, {} translated, {} failed, {} discarded, {} from cache",
              stats.requested, stats.translated, stats.failed, stats.discarded, stats.cache_hits);
        Ok(())
    }
}

/*!
 * Controller driven by a simulated player
 */

use std::sync::Arc;
use std::time::Duration;

use dualsub::app_config::Config;
use dualsub::display::{MemorySurface, Region, RenderOutcome, SubtitleSurface};
use dualsub::playback::SimulatedPlayer;
use dualsub::providers::mock::MockChannel;
use dualsub::subtitle_processor::TranslationFailure;
use dualsub::time_source::{MediaClock, PlaybackTimeSource, TimeSource};
use dualsub::translation::channel::TranslationChannel;
use dualsub::translation::messages::failure_message;
use dualsub::translation::official::TranslationSource;
use dualsub::DualSubtitleController;
use crate::common::{self, SESSION};

type Controller = DualSubtitleController<MemorySurface>;

fn test_config() -> Config {
    let mut config = Config::default();
    config.target_language = "es".to_string();
    config.queue.item_delay_ms = 0;
    config.queue.reschedule_delay_ms = 0;
    config.queue.poll_interval_ms = 10;
    config
}

fn setup(config: Config, channel: Arc<MockChannel>, surface: MemorySurface) -> (Controller, Arc<SimulatedPlayer>) {
    common::init_logging();
    let player = Arc::new(SimulatedPlayer::new(Some(10.0)));
    let time_source = Arc::new(PlaybackTimeSource::new(
        Arc::clone(&player) as Arc<dyn MediaClock>,
        None,
        0.0,
    ));
    let controller = DualSubtitleController::new(
        config,
        channel as Arc<dyn TranslationChannel>,
        time_source,
        surface,
    );
    (controller, player)
}

fn shown(controller: &Controller) -> (String, String) {
    let surface = controller.display().surface();
    (surface.text(Region::Original), surface.text(Region::Translated))
}

#[tokio::test]
async fn test_load_track_thenPlay_shouldRenderBothLines() {
    let channel = Arc::new(MockChannel::working());
    let (mut controller, player) = setup(test_config(), Arc::clone(&channel), MemorySurface::new());

    assert_eq!(controller.load_track(SESSION, common::SAMPLE_VTT), 3);
    assert_eq!(controller.wait_for_translations().await, 3);
    assert_eq!(channel.request_count(), 3);

    player.seek(1.5);
    assert_eq!(controller.on_time_update(), RenderOutcome::Shown);
    assert_eq!(shown(&controller), ("Hello world".to_string(), "[es] Hello world".to_string()));

    player.seek(7.5);
    controller.on_time_update();
    assert_eq!(shown(&controller).0, "See you &amp; goodbye");
    assert!(controller.display().surface().is_visible(Region::Translated));

    player.seek(3.5);
    assert_eq!(controller.on_time_update(), RenderOutcome::Cleared);
    assert_eq!(shown(&controller), (String::new(), String::new()));
    assert!(!controller.display().surface().is_visible(Region::Original));
}

#[tokio::test]
async fn test_render_withUnchangedCue_shouldNotRewriteRegions() {
    let (mut controller, player) = setup(test_config(), Arc::new(MockChannel::working()), MemorySurface::new());
    controller.load_track(SESSION, common::SAMPLE_VTT);
    controller.wait_for_translations().await;

    player.seek(1.5);
    controller.on_time_update();
    let writes = controller.display().surface().writes();

    player.seek(2.0);
    controller.on_time_update();
    assert_eq!(controller.display().surface().writes(), writes);
}

#[tokio::test]
async fn test_change_session_midBatch_shouldDiscardStaleResults() {
    let channel = Arc::new(MockChannel::slow(50));
    let (mut controller, _player) = setup(test_config(), Arc::clone(&channel), MemorySurface::new());

    controller.load_track(SESSION, common::SAMPLE_VTT);
    tokio::time::sleep(Duration::from_millis(10)).await;

    assert!(controller.change_session("video-2"));
    assert_eq!(controller.wait_for_translations().await, 1);
    assert_eq!(controller.queue().stats().discarded, 1);
    assert_eq!(controller.timeline().lock().len(), 0);

    assert_eq!(controller.load_track("video-2", common::SAMPLE_SRT), 3);
    assert_eq!(controller.wait_for_translations().await, 3);
    assert_eq!(controller.timeline().lock().pending_count("video-2"), 0);
    assert_eq!(channel.request_count(), 4);
}

#[tokio::test]
async fn test_set_enabled_false_shouldClearEverything() {
    let (mut controller, player) = setup(test_config(), Arc::new(MockChannel::working()), MemorySurface::new());
    controller.load_track(SESSION, common::SAMPLE_VTT);
    controller.wait_for_translations().await;

    player.seek(4.5);
    assert_eq!(controller.on_time_update(), RenderOutcome::Shown);

    controller.set_enabled(false);
    assert_eq!(shown(&controller), (String::new(), String::new()));
    assert!(controller.timeline().lock().is_empty());
    assert_eq!(controller.on_time_update(), RenderOutcome::Skipped);
    assert!(!controller.trigger_translation());

    controller.set_enabled(true);
    controller.load_track(SESSION, common::SAMPLE_VTT);
    assert_eq!(controller.wait_for_translations().await, 3);
}

#[tokio::test]
async fn test_time_offset_shouldShiftActiveCue() {
    let (mut controller, player) = setup(test_config(), Arc::new(MockChannel::working()), MemorySurface::new());
    controller.load_track(SESSION, common::SAMPLE_VTT);
    controller.wait_for_translations().await;

    player.seek(2.0);
    controller.set_time_offset(2.5);
    assert_eq!(controller.time_source().offset(), 2.5);
    assert_eq!(controller.time_source().resolve_current_time(), Some(4.5));

    controller.on_time_update();
    assert_eq!(shown(&controller), ("How are you?".to_string(), "[es] How are you?".to_string()));
}

#[tokio::test]
async fn test_load_tracks_withOfficialSource_shouldOnlyRequestUnmatchedCues() {
    let channel = Arc::new(MockChannel::working());
    let (mut controller, player) = setup(test_config(), Arc::clone(&channel), MemorySurface::new());

    controller.load_tracks(SESSION, common::SAMPLE_VTT, Some(common::OFFICIAL_VTT));
    assert_eq!(controller.wait_for_translations().await, 1);
    assert_eq!(channel.requested_texts(), vec!["See you & goodbye".to_string()]);

    player.seek(5.0);
    controller.on_time_update();
    assert_eq!(shown(&controller).1, "¿Cómo estás?");
}

#[tokio::test]
async fn test_load_tracks_withApiSource_shouldIgnoreOfficialTrack() {
    let channel = Arc::new(MockChannel::working());
    let mut config = test_config();
    config.translation_source = TranslationSource::Api;
    let (mut controller, _player) = setup(config, Arc::clone(&channel), MemorySurface::new());

    controller.load_tracks(SESSION, common::SAMPLE_VTT, Some(common::OFFICIAL_VTT));
    assert_eq!(controller.wait_for_translations().await, 3);
    assert_eq!(channel.request_count(), 3);
}

#[tokio::test]
async fn test_transport_failure_shouldShowLocalizedPlaceholder() {
    let mut config = test_config();
    config.ui_language = "es".to_string();
    let (mut controller, player) = setup(config, Arc::new(MockChannel::transport_failure()), MemorySurface::new());

    controller.load_track(SESSION, common::SAMPLE_VTT);
    controller.wait_for_translations().await;
    assert_eq!(controller.queue().stats().failed, 3);

    player.seek(1.0);
    controller.on_time_update();
    assert_eq!(shown(&controller).1, failure_message(TranslationFailure::RequestTransport, "es"));
}

#[tokio::test]
async fn test_detached_surface_shouldRenderOnceAttached() {
    let (mut controller, player) = setup(test_config(), Arc::new(MockChannel::working()), MemorySurface::detached());
    controller.load_track(SESSION, common::SAMPLE_VTT);
    controller.wait_for_translations().await;

    player.seek(1.5);
    assert_eq!(controller.on_time_update(), RenderOutcome::NoSurface);

    controller.display_mut().surface_mut().attach();
    assert_eq!(controller.on_time_update(), RenderOutcome::Shown);
}

#[tokio::test]
async fn test_run_until_withStopTimer_shouldPollAndTranslate() {
    let (mut controller, player) = setup(test_config(), Arc::new(MockChannel::working()), MemorySurface::new());
    {
        let mut timeline = controller.timeline().lock();
        timeline.activate_session(SESSION);
        timeline.replace_cues_for_session(SESSION, dualsub::subtitle_processor::parse_vtt(common::SAMPLE_VTT));
    }
    player.seek(1.5);

    let polls = controller.run_until(tokio::time::sleep(Duration::from_millis(60))).await;
    assert!(polls >= 1);

    controller.wait_for_translations().await;
    assert_eq!(controller.timeline().lock().pending_count(SESSION), 0);
    assert_eq!(controller.on_time_update(), RenderOutcome::Shown);
    assert_eq!(shown(&controller).1, "[es] Hello world");
}

#[tokio::test]
async fn test_shutdown_shouldStopQueueAndRemoveRegions() {
    let (mut controller, player) = setup(test_config(), Arc::new(MockChannel::slow(200)), MemorySurface::new());
    controller.load_track(SESSION, common::SAMPLE_VTT);

    player.seek(1.5);
    controller.on_time_update();
    assert!(controller.display().surface().has_regions());

    controller.shutdown().await.unwrap();

    assert!(!controller.display().surface().has_regions());
    assert!(!controller.queue().settings().enabled);
    assert!(!controller.queue().is_processing());
    assert_eq!(controller.wait_for_translations().await, 0);
}

#[test]
fn test_load_track_withoutRuntime_shouldStoreCuesWithoutTranslating() {
    let channel = Arc::new(MockChannel::working());
    let (mut controller, player) = setup(test_config(), Arc::clone(&channel), MemorySurface::new());

    assert_eq!(controller.load_track(SESSION, common::SAMPLE_VTT), 3);
    assert!(!controller.trigger_translation());
    assert_eq!(controller.timeline().lock().pending_count(SESSION), 3);

    player.seek(1.5);
    assert_eq!(controller.on_time_update(), RenderOutcome::Shown);
    assert_eq!(shown(&controller), ("Hello world".to_string(), String::new()));
    assert_eq!(channel.request_count(), 0);
}

#[tokio::test]
async fn test_shutdown_shouldClearTranslationCache() {
    let (mut controller, _player) = setup(test_config(), Arc::new(MockChannel::working()), MemorySurface::new());
    controller.load_track(SESSION, common::SAMPLE_VTT);
    controller.wait_for_translations().await;
    assert_eq!(controller.queue().cache().len(), 3);

    controller.shutdown().await.unwrap();

    assert!(controller.queue().cache().is_empty());
}

/*!
 * Tests for playback time resolution
 */

use std::sync::Arc;

use dualsub::playback::SimulatedPlayer;
use dualsub::time_source::{FixedTime, MediaClock, PlaybackTimeSource, ScrubberControl, TimeSignal, TimeSource};

fn with_scrubber(player: &Arc<SimulatedPlayer>, offset: f64) -> PlaybackTimeSource {
    PlaybackTimeSource::new(
        Arc::clone(player) as Arc<dyn MediaClock>,
        Some(Arc::clone(player) as Arc<dyn ScrubberControl>),
        offset,
    )
}

#[test]
fn test_resolve_withScrubber_shouldScaleToDuration() {
    let player = Arc::new(SimulatedPlayer::new(Some(200.0)).with_scrubber(1000.0));
    player.seek(50.0);
    let source = with_scrubber(&player, 0.0);

    assert_eq!(source.signal(), TimeSignal::Scrubber);
    let time = source.resolve_current_time().unwrap();
    assert!((time - 50.0).abs() < 1e-9);
}

#[test]
fn test_resolve_withHiddenScrubber_shouldFallBackToMediaClock() {
    let player = Arc::new(SimulatedPlayer::new(Some(100.0)).with_scrubber(100.0));
    player.seek(12.5);
    player.set_scrubber_visible(false);
    let source = with_scrubber(&player, 0.0);

    assert_eq!(source.resolve_current_time(), Some(12.5));
}

#[test]
fn test_resolve_withUnknownDuration_shouldUseMediaClock() {
    let player = Arc::new(SimulatedPlayer::new(None).with_scrubber(100.0));
    player.seek(7.0);
    let source = with_scrubber(&player, 0.0);

    assert_eq!(source.resolve_current_time(), Some(7.0));
}

#[test]
fn test_resolve_withOffset_shouldAddIt() {
    let player = Arc::new(SimulatedPlayer::new(Some(100.0)));
    player.seek(10.0);
    let source = PlaybackTimeSource::new(Arc::clone(&player) as Arc<dyn MediaClock>, None, -1.5);

    assert_eq!(source.resolve_current_time(), Some(8.5));

    source.set_offset(2.0);
    assert_eq!(source.offset(), 2.0);
    assert_eq!(source.resolve_current_time(), Some(12.0));
}

#[test]
fn test_simulated_player_advance_withSpeed_shouldClampToDuration() {
    let player = SimulatedPlayer::new(Some(10.0)).with_speed(2.0);

    assert_eq!(player.advance(3.0), 6.0);
    assert!(!player.is_finished());
    assert_eq!(player.advance(5.0), 10.0);
    assert!(player.is_finished());
}

#[test]
fn test_fixed_time_withNonFiniteValue_shouldReportNoTime() {
    assert_eq!(FixedTime(4.0).resolve_current_time(), Some(4.0));
    assert_eq!(FixedTime(f64::INFINITY).resolve_current_time(), None);
}

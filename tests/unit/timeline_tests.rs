/*!
 * Tests for the session-scoped cue timeline
 */

use dualsub::subtitle_processor::{Cue, CueTranslation, TranslationFailure};
use dualsub::timeline::{ApplyOutcome, CueTimeline};
use dualsub::translation::official::CueMatcher;

fn cues() -> Vec<Cue> {
    vec![
        Cue::new(7.0, 9.0, "third"),
        Cue::new(1.0, 3.0, "first"),
        Cue::new(4.0, 6.0, "second"),
    ]
}

fn timeline_for(session: &str) -> CueTimeline {
    let mut timeline = CueTimeline::new();
    timeline.activate_session(session);
    timeline.replace_cues_for_session(session, cues());
    timeline
}

#[test]
fn test_replace_cues_withUnsortedInput_shouldSortAndStampSession() {
    let timeline = timeline_for("a");
    let stored: Vec<&Cue> = timeline.cues_for_session("a").collect();

    assert_eq!(stored.len(), 3);
    assert_eq!(stored[0].original, "first");
    assert_eq!(stored[2].original, "third");
    assert!(stored.iter().all(|cue| cue.session_id == "a"));
}

#[test]
fn test_replace_cues_withEmptyText_shouldDropThem() {
    let mut timeline = CueTimeline::new();
    timeline.activate_session("a");
    let stored = timeline.replace_cues_for_session("a", vec![Cue::new(0.0, 1.0, "  "), Cue::new(1.0, 2.0, "ok")]);

    assert_eq!(stored, 1);
    assert_eq!(timeline.len(), 1);
}

#[test]
fn test_replace_cues_twice_shouldReplaceNotAppend() {
    let mut timeline = timeline_for("a");
    timeline.replace_cues_for_session("a", vec![Cue::new(0.0, 1.0, "only")]);

    assert_eq!(timeline.len(), 1);
    assert_eq!(timeline.pending_count("a"), 1);
}

#[test]
fn test_activate_session_withNewSession_shouldPurgeOthers() {
    let mut timeline = timeline_for("a");

    assert!(!timeline.activate_session("a"));
    assert!(timeline.activate_session("b"));
    assert_eq!(timeline.active_session(), Some("b"));
    assert!(timeline.is_empty());
    assert!(timeline.active_cue_at(2.0, "a").is_none());
}

#[test]
fn test_active_cue_at_withBoundaries_shouldBeInclusive() {
    let timeline = timeline_for("a");

    assert_eq!(timeline.active_cue_at(1.0, "a").map(|c| c.original.as_str()), Some("first"));
    assert_eq!(timeline.active_cue_at(3.0, "a").map(|c| c.original.as_str()), Some("first"));
    assert!(timeline.active_cue_at(3.5, "a").is_none());
    assert!(timeline.active_cue_at(2.0, "other").is_none());
}

#[test]
fn test_active_cue_at_withOverlappingCues_shouldReturnEarliest() {
    let mut timeline = CueTimeline::new();
    timeline.activate_session("a");
    timeline.replace_cues_for_session("a", vec![Cue::new(2.0, 5.0, "late"), Cue::new(1.0, 4.0, "early")]);

    assert_eq!(timeline.active_cue_at(3.0, "a").unwrap().original, "early");
}

#[test]
fn test_pending_translation_cues_withElapsedCues_shouldSkipThem() {
    let timeline = timeline_for("a");

    let pending = timeline.pending_translation_cues(5.0, "a", 10);
    let texts: Vec<&str> = pending.iter().map(|c| c.original.as_str()).collect();
    assert_eq!(texts, vec!["second", "third"]);

    assert_eq!(timeline.pending_translation_cues(0.0, "a", 2).len(), 2);
    assert!(timeline.pending_translation_cues(0.0, "a", 0).is_empty());
    assert!(timeline.pending_translation_cues(9.5, "a", 10).is_empty());
}

#[test]
fn test_pending_translation_cues_withProcessedCues_shouldSkipThem() {
    let mut timeline = timeline_for("a");
    let first = timeline.cues_for_session("a").next().unwrap().key();
    let generation = timeline.session_generation();
    timeline.apply_translation(&first, generation, CueTranslation::Failed(TranslationFailure::Generic));

    let pending = timeline.pending_translation_cues(0.0, "a", 10);
    assert_eq!(pending.len(), 2);
    assert_eq!(pending[0].original, "second");
}

#[test]
fn test_apply_translation_withActiveSession_shouldUpdateCue() {
    let mut timeline = timeline_for("a");
    let key = timeline.cues_for_session("a").next().unwrap().key();
    let generation = timeline.session_generation();

    let outcome = timeline.apply_translation(&key, generation, CueTranslation::Translated("premier".into()));

    assert_eq!(outcome, ApplyOutcome::Applied);
    assert_eq!(timeline.active_cue_at(2.0, "a").unwrap().translation,
               CueTranslation::Translated("premier".into()));
    assert_eq!(timeline.pending_count("a"), 2);
}

#[test]
fn test_apply_translation_afterSessionChange_shouldLeaveStoreUnchanged() {
    let mut timeline = timeline_for("a");
    let stale_key = timeline.cues_for_session("a").next().unwrap().key();
    let generation = timeline.session_generation();

    timeline.activate_session("b");
    timeline.replace_cues_for_session("b", cues());

    let outcome = timeline.apply_translation(&stale_key, generation, CueTranslation::Translated("stale".into()));

    assert_eq!(outcome, ApplyOutcome::SessionChanged);
    assert_eq!(timeline.pending_count("b"), 3);
}

#[test]
fn test_apply_translation_afterReplace_shouldReportNotFound() {
    let mut timeline = timeline_for("a");
    let key = timeline.cues_for_session("a").next().unwrap().key();
    let generation = timeline.session_generation();

    timeline.replace_cues_for_session("a", vec![Cue::new(1.0, 3.0, "first, edited")]);

    assert_eq!(timeline.apply_translation(&key, generation, CueTranslation::Translated("x".into())), ApplyOutcome::NotFound);
}

#[test]
fn test_apply_translation_onTranslatedCue_shouldNotOverwrite() {
    let mut timeline = timeline_for("a");
    let key = timeline.cues_for_session("a").next().unwrap().key();
    let generation = timeline.session_generation();

    timeline.apply_translation(&key, generation, CueTranslation::Translated("good".into()));
    let outcome = timeline.apply_translation(&key, generation, CueTranslation::Failed(TranslationFailure::RequestTransport));

    assert_eq!(outcome, ApplyOutcome::AlreadyTranslated);
    assert_eq!(timeline.active_cue_at(1.5, "a").unwrap().translation, CueTranslation::Translated("good".into()));
}

#[test]
fn test_apply_official_translations_withMatchingTrack_shouldFillPending() {
    let mut timeline = timeline_for("a");
    let official = vec![Cue::new(1.02, 2.98, "premier"), Cue::new(4.5, 6.2, "deuxième")];

    let applied = timeline.apply_official_translations("a", &official, &CueMatcher::default());

    assert_eq!(applied, 2);
    assert_eq!(timeline.pending_count("a"), 1);
    assert_eq!(timeline.active_cue_at(5.0, "a").unwrap().translation, CueTranslation::Translated("deuxième".into()));
}

#[test]
fn test_clear_all_shouldForgetActiveSession() {
    let mut timeline = timeline_for("a");
    timeline.clear_all();

    assert!(timeline.is_empty());
    assert_eq!(timeline.active_session(), None);
}

#[test]
fn test_clear_session_shouldOnlyRemoveThatSession() {
    let mut timeline = timeline_for("a");
    timeline.replace_cues_for_session("b", vec![Cue::new(0.0, 1.0, "other")]);
    timeline.clear_session("a");

    assert_eq!(timeline.len(), 1);
    assert_eq!(timeline.active_session(), Some("a"));
}

#[test]
fn test_apply_translation_afterSwitchingAwayAndBack_shouldReportSessionChanged() {
    let mut timeline = timeline_for("a");
    let key = timeline.cues_for_session("a").next().unwrap().key();
    let generation = timeline.session_generation();

    timeline.activate_session("b");
    timeline.activate_session("a");
    timeline.replace_cues_for_session("a", cues());
    assert!(!timeline.is_current("a", generation));

    let outcome = timeline.apply_translation(&key, generation, CueTranslation::Translated("stale".into()));

    assert_eq!(outcome, ApplyOutcome::SessionChanged);
    assert_eq!(timeline.pending_count("a"), 3);
}

#[test]
fn test_session_generation_shouldAdvanceOnActivationAndClear() {
    let mut timeline = CueTimeline::new();
    let initial = timeline.session_generation();

    timeline.activate_session("a");
    let first = timeline.session_generation();
    assert_ne!(first, initial);

    assert!(!timeline.activate_session("a"));
    assert_eq!(timeline.session_generation(), first);

    timeline.clear_all();
    assert_ne!(timeline.session_generation(), first);
    assert!(!timeline.is_current("a", first));
}

#[test]
fn test_queries_withTwoLoadedSessions_shouldStayScoped() {
    let mut timeline = CueTimeline::new();
    timeline.activate_session("A");
    timeline.replace_cues_for_session("A", vec![Cue::new(1.0, 3.0, "A")]);
    timeline.replace_cues_for_session("B", vec![Cue::new(1.0, 3.0, "B"), Cue::new(4.0, 6.0, "B later")]);
    assert_eq!(timeline.len(), 3);

    let pending_a: Vec<String> = timeline.pending_translation_cues(0.0, "A", 10)
        .into_iter().map(|cue| cue.original).collect();
    assert_eq!(pending_a, vec!["A"]);
    assert_eq!(timeline.active_cue_at(2.0, "A").map(|c| c.original.as_str()), Some("A"));
    assert!(timeline.active_cue_at(5.0, "A").is_none());

    let pending_b: Vec<String> = timeline.pending_translation_cues(0.0, "B", 10)
        .into_iter().map(|cue| cue.original).collect();
    assert_eq!(pending_b, vec!["B", "B later"]);
    assert_eq!(timeline.active_cue_at(2.0, "B").map(|c| c.original.as_str()), Some("B"));
    assert!(timeline.pending_translation_cues(0.0, "B", 10).iter().all(|cue| cue.session_id == "B"));
}

#[test]
fn test_active_cue_at_withDegenerateTiming_shouldMatchInclusiveBounds() {
    let mut timeline = CueTimeline::new();
    timeline.activate_session("a");
    timeline.replace_cues_for_session("a", vec![
        Cue::new(2.0, 2.0, "instant"),
        Cue::new(6.0, 5.0, "inverted"),
    ]);
    assert_eq!(timeline.len(), 2);

    assert_eq!(timeline.active_cue_at(2.0, "a").map(|c| c.original.as_str()), Some("instant"));
    assert!(timeline.active_cue_at(2.001, "a").is_none());
    assert!(timeline.active_cue_at(5.0, "a").is_none());
    assert!(timeline.active_cue_at(5.5, "a").is_none());
    assert!(timeline.active_cue_at(6.0, "a").is_none());
}

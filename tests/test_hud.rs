use apple_basket::entities::*;
use apple_basket::events::{dispatch, AudioCue, AudioSink, GameEvent, Presentation};
use apple_basket::hud::*;

fn timed_hud(secs: f32) -> Hud {
    let mut hud = Hud::new();
    hud.on_timer_initialized(SessionLength::Timed(secs));
    hud
}

#[derive(Default)]
struct Recorder {
    cues: Vec<AudioCue>,
}

impl AudioSink for Recorder {
    fn play(&mut self, cue: AudioCue) {
        self.cues.push(cue);
    }
}

// ── floating text ─────────────────────────────────────────────────────────────

#[test]
fn floating_text_labels_carry_sign() {
    assert_eq!(FloatingText::new(75, Vec2::default()).label, "+75");
    assert_eq!(FloatingText::new(-30, Vec2::default()).label, "-30");
    assert!(FloatingText::new(75, Vec2::default()).positive);
    assert!(!FloatingText::new(-30, Vec2::default()).positive);
}

#[test]
fn floating_text_spawns_above_catch_point() {
    let text = FloatingText::new(50, Vec2::new(1.0, -6.0));
    assert_eq!(text.position, Vec2::new(1.0, -6.0 + FLOAT_SPAWN_OFFSET));
}

#[test]
fn floating_text_fades_after_delay() {
    let mut text = FloatingText::new(50, Vec2::default());
    assert_eq!(text.alpha(), 1.0);
    text.age = FLOAT_FADE_DELAY;
    assert_eq!(text.alpha(), 1.0);
    text.age = 1.25;
    assert!((text.alpha() - 0.5).abs() < 1e-5);
    text.age = FLOAT_DURATION;
    assert_eq!(text.alpha(), 0.0);
    assert!(text.is_expired());
}

#[test]
fn hud_tick_drifts_and_expires_texts() {
    let mut hud = timed_hud(30.0);
    hud.on_score_delta(50, Vec2::new(0.0, 0.0));
    hud.tick(0.5);
    assert_eq!(hud.floating.len(), 1);
    assert!((hud.floating[0].position.y - (FLOAT_SPAWN_OFFSET + 0.5 * FLOAT_SPEED)).abs() < 1e-5);
    hud.tick(FLOAT_DURATION);
    assert!(hud.floating.is_empty());
}

// ── labels ────────────────────────────────────────────────────────────────────

#[test]
fn timer_label_rounds_up() {
    let mut hud = timed_hud(30.0);
    assert_eq!(hud.timer_label().as_deref(), Some("Time left: 30"));
    hud.on_timer_changed(29.2);
    assert_eq!(hud.timer_label().as_deref(), Some("Time left: 30"));
    hud.on_timer_changed(0.4);
    assert_eq!(hud.timer_label().as_deref(), Some("Time left: 1"));
}

#[test]
fn timer_label_hidden_at_zero() {
    let mut hud = timed_hud(30.0);
    hud.on_timer_changed(0.0);
    assert_eq!(hud.timer_label(), None);
}

#[test]
fn timer_label_endless() {
    let mut hud = Hud::new();
    hud.on_timer_initialized(SessionLength::Endless);
    assert_eq!(hud.timer_label().as_deref(), Some("Time left: ∞"));
}

#[test]
fn countdown_hidden_at_zero() {
    let mut hud = timed_hud(30.0);
    assert_eq!(hud.countdown_label(), None);
    hud.on_countdown(2);
    assert_eq!(hud.countdown_label().as_deref(), Some("2"));
    hud.on_countdown(0);
    assert_eq!(hud.countdown_label(), None);
}

#[test]
fn combo_label_shown_from_two() {
    let mut hud = timed_hud(30.0);
    hud.on_combo_changed(1);
    assert_eq!(hud.combo_label(), None);
    hud.on_combo_changed(3);
    assert_eq!(hud.combo_label().as_deref(), Some("x3"));
}

#[test]
fn format_timer_values() {
    assert_eq!(format_timer(SessionLength::Timed(60.0)), "60");
    assert_eq!(format_timer(SessionLength::Endless), "∞");
}

#[test]
fn timer_initialized_clears_previous_session() {
    let mut hud = timed_hud(30.0);
    hud.on_score_changed(500);
    hud.on_score_delta(50, Vec2::default());
    hud.on_session_ended(&SessionSummary {
        score: 500,
        good_caught: 10,
        bad_caught: 0,
        good_missed: 2,
        highest_combo: 6,
        elapsed: 30.0,
    });
    assert!(hud.is_finished());

    hud.on_timer_initialized(SessionLength::Timed(60.0));
    assert!(!hud.is_finished());
    assert_eq!(hud.score, 0);
    assert!(hud.floating.is_empty());
    assert_eq!(hud.timer_label().as_deref(), Some("Time left: 60"));
}

// ── dispatch ──────────────────────────────────────────────────────────────────

#[test]
fn dispatch_routes_audio_and_presentation_separately() {
    let mut hud = timed_hud(30.0);
    let mut audio = Recorder::default();

    dispatch(&GameEvent::ScoreChanged(120), Some(&mut hud), Some(&mut audio));
    dispatch(&GameEvent::Audio(AudioCue::CatchGood), Some(&mut hud), Some(&mut audio));

    assert_eq!(hud.score, 120);
    assert_eq!(audio.cues, vec![AudioCue::CatchGood]);
}

#[test]
fn dispatch_without_sinks_is_noop() {
    dispatch(&GameEvent::ScoreChanged(10), None, None);
    dispatch(&GameEvent::Audio(AudioCue::SessionEnd), None, None);
}

use apple_basket::config::SessionConfig;
use apple_basket::entities::*;
use apple_basket::events::{AudioCue, GameEvent};
use apple_basket::session::{ComboUpdate, SessionController};

fn make_session(length: SessionLength) -> SessionController {
    SessionController::new(SessionConfig::default(), length)
}

/// Tick through the countdown into `Playing`, discarding its events.
fn playing(length: SessionLength) -> SessionController {
    let mut s = make_session(length);
    while s.phase() == Phase::Countdown {
        s.tick(0.5, 0);
    }
    s.events().drain();
    s
}

fn countdowns(events: &[GameEvent]) -> Vec<u32> {
    events
        .iter()
        .filter_map(|e| match e {
            GameEvent::Countdown(n) => Some(*n),
            _ => None,
        })
        .collect()
}

// ── countdown ─────────────────────────────────────────────────────────────────

#[test]
fn new_session_starts_in_countdown() {
    let mut s = make_session(SessionLength::Timed(30.0));
    assert_eq!(s.phase(), Phase::Countdown);
    let events = s.events().drain();
    assert_eq!(events[0], GameEvent::TimerInitialized(SessionLength::Timed(30.0)));
    assert!(events.contains(&GameEvent::ScoreChanged(0)));
    assert!(events.contains(&GameEvent::ComboChanged(0)));
}

#[test]
fn countdown_emits_three_two_one_zero() {
    let mut s = make_session(SessionLength::Timed(30.0));
    let mut events = s.events().drain();
    let mut entered = None;
    for _ in 0..6 {
        if let Some(phase) = s.tick(0.5, 0) {
            entered = Some(phase);
        }
        events.extend(s.events().drain());
    }
    assert_eq!(countdowns(&events), vec![3, 2, 1, 0]);
    assert_eq!(entered, Some(Phase::Playing));
    assert_eq!(s.phase(), Phase::Playing);
    assert!(events.contains(&GameEvent::Audio(AudioCue::CountdownGo)));
    assert!(events.contains(&GameEvent::Audio(AudioCue::MusicStart)));
}

#[test]
fn countdown_waits_a_full_step_per_number() {
    let mut s = make_session(SessionLength::Timed(30.0));
    s.events().drain();
    s.tick(0.5, 0);
    assert!(countdowns(s.events().peek()).is_empty());
    s.tick(0.5, 0);
    assert_eq!(countdowns(s.events().peek()), vec![2]);
}

#[test]
fn zero_start_shows_zero_once_then_plays() {
    let config = SessionConfig {
        countdown_start: 0,
        ..SessionConfig::default()
    };
    let mut s = SessionController::new(config, SessionLength::Timed(30.0));
    let mut events = s.events().drain();
    assert_eq!(s.tick(0.1, 0), Some(Phase::Playing));
    for _ in 0..4 {
        s.tick(0.5, 0);
    }
    events.extend(s.events().drain());
    assert_eq!(countdowns(&events), vec![0]);
    assert_eq!(s.phase(), Phase::Playing);
}

// ── scoring ───────────────────────────────────────────────────────────────────

#[test]
fn combo_bonus_applies_to_good_catch() {
    let mut s = playing(SessionLength::Timed(30.0));
    s.register_combo(ComboUpdate::Increment);
    s.register_combo(ComboUpdate::Increment);
    let amount = s.register_catch(50, Vec2::new(0.0, -6.0));
    assert_eq!(amount, 75);
    assert_eq!(s.session().score, 75);
}

#[test]
fn bad_catch_ignores_combo() {
    let mut s = playing(SessionLength::Timed(30.0));
    for _ in 0..4 {
        s.register_combo(ComboUpdate::Increment);
    }
    assert_eq!(s.register_catch(-30, Vec2::default()), -30);
    s.register_combo(ComboUpdate::Reset);
    assert_eq!(s.session().combo, 0);
    assert_eq!(s.session().highest_combo, 4);
    assert_eq!(s.session().score, -30);
}

#[test]
fn catch_emits_delta_and_total() {
    let mut s = playing(SessionLength::Timed(30.0));
    let at = Vec2::new(1.0, -6.0);
    s.register_catch(50, at);
    let events = s.events().drain();
    assert!(events.contains(&GameEvent::ScoreDelta { amount: 50, position: at }));
    assert!(events.contains(&GameEvent::ScoreChanged(50)));
    assert!(events.contains(&GameEvent::Audio(AudioCue::CatchGood)));
}

#[test]
fn missed_good_apple_breaks_combo() {
    let mut s = playing(SessionLength::Timed(30.0));
    s.register_combo(ComboUpdate::Increment);
    s.register_miss(AppleKind::Good);
    assert_eq!(s.session().good_missed, 1);
    assert_eq!(s.session().combo, 0);
    s.register_miss(AppleKind::Bad);
    assert_eq!(s.session().good_missed, 1);
}

// ── timed play ────────────────────────────────────────────────────────────────

#[test]
fn timer_counts_down_and_reports() {
    let mut s = playing(SessionLength::Timed(30.0));
    s.tick(0.5, 0);
    assert_eq!(s.session().remaining_time, Some(29.5));
    assert!(s.events().peek().contains(&GameEvent::TimerChanged(29.5)));
}

#[test]
fn timed_session_reaches_ending() {
    let mut s = playing(SessionLength::Timed(30.0));
    let mut ticks = 0;
    while s.phase() == Phase::Playing {
        s.tick(0.5, 0);
        ticks += 1;
        assert!(ticks <= 60);
    }
    assert_eq!(ticks, 60);
    assert_eq!(s.phase(), Phase::Ending);
    assert_eq!(s.session().remaining_time, Some(0.0));
}

#[test]
fn timer_never_goes_negative() {
    let mut s = playing(SessionLength::Timed(30.0));
    s.tick(100.0, 0);
    assert_eq!(s.session().remaining_time, Some(0.0));
    assert_eq!(s.phase(), Phase::Ending);
}

// ── endless play ──────────────────────────────────────────────────────────────

#[test]
fn endless_speed_ramps_with_elapsed_time() {
    let mut s = playing(SessionLength::Endless);
    for _ in 0..8 {
        s.tick(0.5, 0);
    }
    let rate = s.config().speed_mod_increase_rate;
    assert!((s.speed_multiplier() - (1.0 + 4.0 * rate)).abs() < 1e-5);
    assert_eq!(s.session().remaining_time, None);
}

#[test]
fn endless_ends_on_next_tick_after_allowed_misses() {
    let mut s = playing(SessionLength::Endless);
    s.register_catch(-30, Vec2::default());
    s.register_miss(AppleKind::Good);
    assert_eq!(s.tick(0.5, 0), None);
    s.register_catch(-30, Vec2::default());
    assert_eq!(s.session().misses(), 3);
    assert_eq!(s.phase(), Phase::Playing);
    assert_eq!(s.tick(0.5, 0), Some(Phase::Ending));
}

// ── ending ────────────────────────────────────────────────────────────────────

#[test]
fn ending_waits_for_field_to_clear() {
    let mut s = playing(SessionLength::Timed(1.0));
    s.tick(1.0, 0);
    assert_eq!(s.phase(), Phase::Ending);
    for _ in 0..20 {
        assert_eq!(s.tick(0.5, 2), None);
    }
    assert_eq!(s.phase(), Phase::Ending);
    s.tick(0.5, 0);
    assert_eq!(s.phase(), Phase::Ending);
    assert_eq!(s.tick(0.5, 0), Some(Phase::Finished));
}

#[test]
fn live_apple_restarts_settle_delay() {
    let mut s = playing(SessionLength::Timed(1.0));
    s.tick(1.0, 0);
    s.tick(0.5, 0);
    s.tick(0.5, 1);
    s.tick(0.5, 0);
    assert_eq!(s.phase(), Phase::Ending);
    s.tick(0.5, 0);
    assert_eq!(s.phase(), Phase::Finished);
}

#[test]
fn finish_emits_summary() {
    let mut s = playing(SessionLength::Timed(1.0));
    s.register_catch(50, Vec2::default());
    s.tick(1.0, 0);
    s.tick(1.0, 0);
    assert_eq!(s.phase(), Phase::Finished);
    let events = s.events().drain();
    let summary = events.iter().find_map(|e| match e {
        GameEvent::SessionEnded(summary) => Some(summary.clone()),
        _ => None,
    });
    let summary = summary.expect("no summary emitted");
    assert_eq!(summary.score, 50);
    assert_eq!(summary.good_caught, 1);
    assert!(events.contains(&GameEvent::Audio(AudioCue::SessionEnd)));
}

#[test]
fn finished_session_ignores_scoring() {
    let mut s = playing(SessionLength::Timed(1.0));
    s.tick(1.0, 0);
    s.tick(1.0, 0);
    assert_eq!(s.register_catch(50, Vec2::default()), 0);
    s.register_miss(AppleKind::Good);
    assert_eq!(s.session().score, 0);
    assert_eq!(s.session().good_missed, 0);
    assert_eq!(s.tick(1.0, 0), None);
}

// ── restart ───────────────────────────────────────────────────────────────────

#[test]
fn restart_only_from_finished() {
    let mut s = playing(SessionLength::Timed(1.0));
    assert!(!s.restart(SessionLength::Endless));
    assert_eq!(s.phase(), Phase::Playing);

    s.tick(1.0, 0);
    assert!(!s.restart(SessionLength::Endless));
    s.tick(1.0, 0);
    assert!(s.restart(SessionLength::Endless));
    assert_eq!(s.phase(), Phase::Countdown);
    assert_eq!(s.length(), SessionLength::Endless);
    assert_eq!(s.session().score, 0);
}

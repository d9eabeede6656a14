use apple_basket::config::{AppleConfig, SessionConfig};
use apple_basket::entities::*;
use apple_basket::session::SessionController;

use rand::rngs::StdRng;
use rand::SeedableRng;

fn seeded_rng() -> StdRng {
    StdRng::seed_from_u64(42)
}

fn make_session() -> SessionController {
    SessionController::new(SessionConfig::default(), SessionLength::Timed(30.0))
}

fn make_apple(kind: AppleKind) -> Apple {
    Apple::spawn(kind, 0.0, 1.0, &AppleConfig::default(), &mut seeded_rng())
}

// ── spawn ─────────────────────────────────────────────────────────────────────

#[test]
fn spawn_places_apple_on_spawn_line() {
    let cfg = AppleConfig::default();
    let apple = Apple::spawn(AppleKind::Good, 3.5, 1.0, &cfg, &mut seeded_rng());
    assert_eq!(apple.position, Vec2::new(3.5, cfg.spawn_height));
    assert_eq!(apple.vertical_speed, 0.0);
    assert!(!apple.locked);
}

#[test]
fn spawn_point_value_follows_kind() {
    let cfg = AppleConfig::default();
    assert_eq!(make_apple(AppleKind::Good).point_value, cfg.good_points);
    assert_eq!(make_apple(AppleKind::Bad).point_value, cfg.bad_points);
}

#[test]
fn spawn_terminal_speed_within_bounds() {
    let cfg = AppleConfig::default();
    let mut rng = seeded_rng();
    for _ in 0..200 {
        let apple = Apple::spawn(AppleKind::Good, 0.0, 1.0, &cfg, &mut rng);
        let v = apple.terminal_speed();
        assert!(v >= cfg.min_fall_speed - 1e-4 && v <= cfg.max_fall_speed + 1e-4, "{v}");
    }
}

#[test]
fn spawn_speed_scale_multiplies_terminal_speed() {
    let cfg = AppleConfig::default();
    let mut rng = seeded_rng();
    for _ in 0..200 {
        let apple = Apple::spawn(AppleKind::Good, 0.0, 2.0, &cfg, &mut rng);
        let v = apple.terminal_speed();
        assert!(v >= 2.0 * cfg.min_fall_speed - 1e-3 && v <= 2.0 * cfg.max_fall_speed + 1e-3, "{v}");
    }
}

#[test]
fn spawn_rotation_and_spin_within_bounds() {
    let cfg = AppleConfig::default();
    let mut rng = seeded_rng();
    for _ in 0..200 {
        let apple = Apple::spawn(AppleKind::Bad, 0.0, 1.0, &cfg, &mut rng);
        assert!((0.0..360.0).contains(&apple.rotation));
        let spin = apple.angular_velocity.abs();
        assert!(spin >= cfg.min_angular_velocity && spin <= cfg.max_angular_velocity);
    }
}

// ── tick ──────────────────────────────────────────────────────────────────────

#[test]
fn tick_speed_never_decreases_nor_exceeds_terminal() {
    let mut apple = make_apple(AppleKind::Good);
    let terminal = apple.terminal_speed();
    let mut last_speed = apple.vertical_speed;
    let mut last_y = apple.position.y;
    for _ in 0..120 {
        apple.tick(0.05);
        assert!(apple.vertical_speed >= last_speed);
        assert!(apple.vertical_speed <= terminal + 1e-5);
        assert!(apple.position.y <= last_y);
        last_speed = apple.vertical_speed;
        last_y = apple.position.y;
    }
    assert!((apple.vertical_speed - terminal).abs() < 1e-4);
}

#[test]
fn tick_first_step_accelerates_from_rest() {
    let mut apple = make_apple(AppleKind::Good);
    apple.tick(0.1);
    let expected = (apple.acceleration * 0.1).min(apple.terminal_speed());
    assert!((apple.vertical_speed - expected).abs() < 1e-5);
}

#[test]
fn tick_locked_apple_does_not_move() {
    let mut apple = make_apple(AppleKind::Good);
    apple.locked = true;
    let before = apple.clone();
    for _ in 0..10 {
        apple.tick(0.1);
    }
    assert_eq!(apple, before);
}

#[test]
fn tick_rotation_stays_in_range() {
    let mut apple = make_apple(AppleKind::Good);
    apple.angular_velocity = -170.0;
    for _ in 0..100 {
        apple.tick(0.1);
        assert!((0.0..360.0).contains(&apple.rotation));
    }
}

#[test]
fn is_offscreen_below_threshold() {
    let mut apple = make_apple(AppleKind::Good);
    apple.position.y = -8.5;
    assert!(apple.is_offscreen(-8.0));
    apple.position.y = -7.5;
    assert!(!apple.is_offscreen(-8.0));
}

// ── leaving the field ─────────────────────────────────────────────────────────

#[test]
fn good_contact_scores_and_builds_combo() {
    let mut session = make_session();
    make_apple(AppleKind::Good).on_basket_contact(&mut session);
    assert_eq!(session.session().score, 50);
    assert_eq!(session.session().combo, 1);
    assert_eq!(session.session().good_caught, 1);
}

#[test]
fn bad_contact_loses_points_and_resets_combo() {
    let mut session = make_session();
    make_apple(AppleKind::Good).on_basket_contact(&mut session);
    make_apple(AppleKind::Bad).on_basket_contact(&mut session);
    assert_eq!(session.session().score, 20);
    assert_eq!(session.session().combo, 0);
    assert_eq!(session.session().bad_caught, 1);
    assert_eq!(session.session().highest_combo, 1);
}

#[test]
fn offscreen_good_counts_as_miss() {
    let mut session = make_session();
    make_apple(AppleKind::Good).on_basket_contact(&mut session);
    make_apple(AppleKind::Good).on_offscreen(&mut session);
    assert_eq!(session.session().good_missed, 1);
    assert_eq!(session.session().combo, 0);
    assert_eq!(session.session().score, 50);
}

#[test]
fn offscreen_bad_is_silent() {
    let mut session = make_session();
    make_apple(AppleKind::Good).on_basket_contact(&mut session);
    make_apple(AppleKind::Bad).on_offscreen(&mut session);
    assert_eq!(session.session().good_missed, 0);
    assert_eq!(session.session().combo, 1);
}

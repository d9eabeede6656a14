/// Session state machine: countdown, play, settle, results.
///
/// Waits are explicit remaining-time values advanced by [`SessionController::tick`];
/// nothing here sleeps or yields. All counter mutation goes through the
/// scoring/combo/miss methods so every score change is logged.
use tracing::{debug, info, warn};

use crate::config::SessionConfig;
use crate::entities::{AppleKind, Phase, Session, SessionLength, Vec2};
use crate::events::{AudioCue, EventBus, GameEvent};

/// How a catch affects the combo streak.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ComboUpdate {
    Increment,
    Reset,
}

/// Points actually awarded for a catch worth `base_points` at the given
/// combo. Only positive catches earn a combo bonus.
pub fn effective_points(base_points: i32, combo: u32, combo_modifier: f32) -> i64 {
    let base = i64::from(base_points);
    if base_points > 0 {
        let bonus = (f64::from(combo) * f64::from(combo_modifier) * base as f64).floor();
        base + bonus as i64
    } else {
        base
    }
}

pub struct SessionController {
    config: SessionConfig,
    length: SessionLength,
    session: Session,
    /// Number currently shown by the countdown.
    countdown: u32,
    /// Time until the next countdown number.
    countdown_left: f32,
    /// `None` until the field is clear during `Ending`.
    settle_left: Option<f32>,
    bus: EventBus,
}

impl SessionController {
    /// Build a fresh session already in `Countdown`, with the first count
    /// queued for presentation.
    pub fn new(config: SessionConfig, length: SessionLength) -> Self {
        let mut controller = Self {
            countdown: config.countdown_start,
            countdown_left: config.countdown_step,
            session: Session::new(length),
            settle_left: None,
            bus: EventBus::new(),
            config,
            length,
        };
        controller.announce_start();
        controller
    }

    fn announce_start(&mut self) {
        info!(length = ?self.length, "session countdown started");
        self.bus.emit(GameEvent::TimerInitialized(self.length));
        self.bus.emit(GameEvent::ScoreChanged(0));
        self.bus.emit(GameEvent::ComboChanged(0));
        self.emit_countdown();
    }

    // ── Queries ──────────────────────────────────────────────────────────────

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn phase(&self) -> Phase {
        self.session.phase
    }

    pub fn length(&self) -> SessionLength {
        self.length
    }

    pub fn speed_multiplier(&self) -> f32 {
        self.session.speed_multiplier
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn events(&mut self) -> &mut EventBus {
        &mut self.bus
    }

    // ── Tick ─────────────────────────────────────────────────────────────────

    /// Advance the state machine by `dt` seconds. `live_apples` is the
    /// number of apples still on the field. Returns the phase entered on
    /// this tick, if any.
    pub fn tick(&mut self, dt: f32, live_apples: usize) -> Option<Phase> {
        match self.session.phase {
            Phase::Countdown => self.tick_countdown(dt),
            Phase::Playing => self.tick_playing(dt),
            Phase::Ending => self.tick_ending(dt, live_apples),
            Phase::Finished => None,
        }
    }

    fn tick_countdown(&mut self, dt: f32) -> Option<Phase> {
        // A countdown that starts at 0 has already shown its only number.
        if self.countdown == 0 {
            return Some(self.start_playing());
        }
        self.countdown_left -= dt;
        if self.countdown_left > 0.0 {
            return None;
        }
        self.countdown -= 1;
        self.emit_countdown();
        if self.countdown == 0 {
            Some(self.start_playing())
        } else {
            self.countdown_left += self.config.countdown_step;
            None
        }
    }

    fn start_playing(&mut self) -> Phase {
        self.enter(Phase::Playing);
        self.bus.emit(GameEvent::Audio(AudioCue::MusicStart));
        Phase::Playing
    }

    fn emit_countdown(&mut self) {
        self.bus.emit(GameEvent::Countdown(self.countdown));
        let cue = if self.countdown == 0 {
            AudioCue::CountdownGo
        } else {
            AudioCue::CountdownTick
        };
        self.bus.emit(GameEvent::Audio(cue));
    }

    fn tick_playing(&mut self, dt: f32) -> Option<Phase> {
        match self.session.remaining_time {
            Some(remaining) => {
                let remaining = (remaining - dt).max(0.0);
                self.session.remaining_time = Some(remaining);
                self.session.elapsed += dt;
                self.bus.emit(GameEvent::TimerChanged(remaining));
                if remaining <= 0.0 {
                    self.enter(Phase::Ending);
                    return Some(Phase::Ending);
                }
                None
            }
            None => {
                if self.session.misses() >= self.config.allowed_misses {
                    self.enter(Phase::Ending);
                    return Some(Phase::Ending);
                }
                self.session.elapsed += dt;
                self.session.speed_multiplier =
                    1.0 + self.session.elapsed * self.config.speed_mod_increase_rate;
                None
            }
        }
    }

    fn tick_ending(&mut self, dt: f32, live_apples: usize) -> Option<Phase> {
        if live_apples > 0 {
            self.settle_left = None;
            return None;
        }
        let left = self.settle_left.get_or_insert(self.config.settle_delay);
        *left -= dt;
        if *left > 0.0 {
            return None;
        }
        self.enter(Phase::Finished);
        let summary = self.session.summary();
        info!(
            score = summary.score,
            good = summary.good_caught,
            bad = summary.bad_caught,
            missed = summary.good_missed,
            highest_combo = summary.highest_combo,
            "session finished"
        );
        self.bus.emit(GameEvent::ScoreChanged(summary.score));
        self.bus.emit(GameEvent::SessionEnded(summary));
        self.bus.emit(GameEvent::Audio(AudioCue::SessionEnd));
        Some(Phase::Finished)
    }

    fn enter(&mut self, next: Phase) {
        info!(from = ?self.session.phase, to = ?next, "session phase change");
        self.session.phase = next;
    }

    // ── Scoring ──────────────────────────────────────────────────────────────

    /// Add the combo-adjusted value of a catch to the score and return it.
    pub fn register_catch(&mut self, base_points: i32, position: Vec2) -> i64 {
        if self.session.phase == Phase::Finished {
            warn!(base_points, "catch after session finished, ignoring");
            return 0;
        }
        let amount = effective_points(base_points, self.session.combo, self.config.combo_modifier);
        self.session.score += amount;
        debug!(
            base_points,
            amount,
            combo = self.session.combo,
            total = self.session.score,
            "score increment"
        );

        if base_points > 0 {
            self.session.good_caught += 1;
            self.bus.emit(GameEvent::Audio(AudioCue::CatchGood));
        } else {
            self.session.bad_caught += 1;
            self.bus.emit(GameEvent::Audio(AudioCue::CatchBad));
        }
        self.bus.emit(GameEvent::ScoreDelta { amount, position });
        self.bus.emit(GameEvent::ScoreChanged(self.session.score));
        amount
    }

    pub fn register_combo(&mut self, update: ComboUpdate) {
        if self.session.phase == Phase::Finished {
            return;
        }
        match update {
            ComboUpdate::Increment => {
                self.session.combo += 1;
                self.session.highest_combo = self.session.highest_combo.max(self.session.combo);
            }
            ComboUpdate::Reset => self.session.combo = 0,
        }
        self.bus.emit(GameEvent::ComboChanged(self.session.combo));
    }

    /// An apple left the field without being caught. Good apples count as
    /// a miss and break the combo; bad ones are ignored.
    pub fn register_miss(&mut self, kind: AppleKind) {
        if kind == AppleKind::Bad || self.session.phase == Phase::Finished {
            return;
        }
        self.session.good_missed += 1;
        debug!(missed = self.session.good_missed, "good apple missed");
        self.register_combo(ComboUpdate::Reset);
    }

    // ── Restart ──────────────────────────────────────────────────────────────

    /// Start over from `Countdown`. Only legal once the session has finished;
    /// returns whether the restart happened.
    pub fn restart(&mut self, length: SessionLength) -> bool {
        if self.session.phase != Phase::Finished {
            warn!(phase = ?self.session.phase, "restart ignored, session still running");
            return false;
        }
        *self = Self::new(self.config.clone(), length);
        true
    }
}

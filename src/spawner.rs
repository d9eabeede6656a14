/// Apple spawning on a randomized timer.
///
/// The spawner never creates apples itself; each tick may return a
/// [`SpawnRequest`] that the game turns into a live `Apple`.
use rand::Rng;
use tracing::{debug, trace};

use crate::config::SpawnerConfig;
use crate::entities::{AppleKind, Level, RateDifficulty, SpawnRequest, SpeedDifficulty};
use crate::random::{self, GenerationType};

/// Session-dependent inputs to the spawn timing and apple speed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpawnContext {
    pub endless: bool,
    /// Endless-mode ramp from the session (1.0 when timed).
    pub speed_multiplier: f32,
    /// Speed modifier of the active movement scheme.
    pub scheme_speed_modifier: f32,
}

impl Default for SpawnContext {
    fn default() -> Self {
        Self {
            endless: false,
            speed_multiplier: 1.0,
            scheme_speed_modifier: 1.0,
        }
    }
}

/// Timing cursor and difficulty selection.
#[derive(Clone, Debug, PartialEq)]
pub struct SpawnSchedule {
    pub next_spawn_delay: f32,
    pub last_spawn_x: f32,
    pub rate_difficulty: RateDifficulty,
    pub speed_difficulty: SpeedDifficulty,
    pub good_apple_portion: f32,
}

pub struct Spawner {
    config: SpawnerConfig,
    schedule: SpawnSchedule,
    running: bool,
}

impl Spawner {
    pub fn new(config: SpawnerConfig, level: Level) -> Self {
        let schedule = SpawnSchedule {
            next_spawn_delay: 0.0,
            last_spawn_x: 0.0,
            rate_difficulty: level.into(),
            speed_difficulty: level.into(),
            good_apple_portion: config.good_apple_portion,
        };
        Self {
            config,
            schedule,
            running: false,
        }
    }

    pub fn schedule(&self) -> &SpawnSchedule {
        &self.schedule
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Set both rate and speed difficulty from the menu level.
    pub fn set_level(&mut self, level: Level) {
        self.schedule.rate_difficulty = level.into();
        self.schedule.speed_difficulty = level.into();
    }

    pub fn set_difficulty(&mut self, rate: RateDifficulty, speed: SpeedDifficulty) {
        self.schedule.rate_difficulty = rate;
        self.schedule.speed_difficulty = speed;
    }

    /// Begin the spawn loop. Does nothing if it is already running.
    pub fn start(&mut self, ctx: &SpawnContext, rng: &mut impl Rng) {
        if self.running {
            return;
        }
        self.running = true;
        self.schedule.next_spawn_delay = self.spawn_delay(ctx, rng);
        debug!(first_delay = self.schedule.next_spawn_delay, "spawner started");
    }

    /// Stop the spawn loop; the pending wait is discarded.
    pub fn stop(&mut self) {
        if !self.running {
            return;
        }
        self.running = false;
        self.schedule.next_spawn_delay = 0.0;
        debug!("spawner stopped");
    }

    /// Back to the state of a freshly built spawner, keeping difficulty.
    pub fn reset(&mut self) {
        self.running = false;
        self.schedule.next_spawn_delay = 0.0;
        self.schedule.last_spawn_x = 0.0;
    }

    /// Advance the wait by `dt`. Returns a spawn when the wait runs out.
    pub fn tick(&mut self, dt: f32, ctx: &SpawnContext, rng: &mut impl Rng) -> Option<SpawnRequest> {
        if !self.running {
            return None;
        }
        self.schedule.next_spawn_delay -= dt;
        if self.schedule.next_spawn_delay > 0.0 {
            return None;
        }

        let request = SpawnRequest {
            kind: self.select_kind(rng),
            x: self.next_spawn_x(rng),
            speed_scale: self.speed_scale(ctx),
        };
        self.schedule.next_spawn_delay = self.spawn_delay(ctx, rng);
        trace!(?request, next = self.schedule.next_spawn_delay, "spawn");
        Some(request)
    }

    /// Randomized wait before the next spawn.  In endless mode, schemes that
    /// are harder to play (lower modifier) get proportionally longer waits.
    pub fn spawn_delay(&self, ctx: &SpawnContext, rng: &mut impl Rng) -> f32 {
        let base = random::generate(
            rng,
            self.config.min_time_between_spawns,
            self.config.max_time_between_spawns,
            self.config.time_between_spawns_generation,
        );
        let rate_mod = self.config.spawn_rate_modifiers[self.schedule.rate_difficulty.index()];
        let scheme_mod = if ctx.endless {
            ctx.scheme_speed_modifier
        } else {
            1.0
        };
        base * rate_mod / scheme_mod
    }

    pub fn speed_scale(&self, ctx: &SpawnContext) -> f32 {
        let difficulty = self.config.apple_speed_modifiers[self.schedule.speed_difficulty.index()];
        difficulty * ctx.speed_multiplier
    }

    pub fn select_kind(&self, rng: &mut impl Rng) -> AppleKind {
        if rng.gen::<f32>() < self.schedule.good_apple_portion {
            AppleKind::Good
        } else {
            AppleKind::Bad
        }
    }

    /// Random x within the spawn radius, pulled back toward the previous
    /// spawn when it would land too far from it.
    pub fn next_spawn_x(&mut self, rng: &mut impl Rng) -> f32 {
        let max_dist = self.config.max_spawn_dist;
        let mut x = random::generate(rng, -max_dist, max_dist, GenerationType::Uniform);

        let last = self.schedule.last_spawn_x;
        let apart = self.config.max_spawn_apart_distance;
        if (x - last).abs() > apart {
            x = x.clamp(last - apart, last + apart);
        }

        self.schedule.last_spawn_x = x;
        x
    }
}

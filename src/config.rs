/// Tuning values for the whole game, loadable from TOML.
///
/// Every section is `#[serde(default)]`, so a config file only needs the
/// values it wants to override.  Validation is eager: [`GameConfig::load`]
/// and [`GameConfig::from_toml_str`] refuse anything that would misbehave
/// at runtime, and `Game::new` validates again for configs built in code.
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::info;

use crate::random::GenerationType;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("{field}: min {min} is greater than max {max}")]
    InvertedRange {
        field: &'static str,
        min: f32,
        max: f32,
    },
    #[error("{field} must be greater than zero, got {value}")]
    NonPositive { field: &'static str, value: f32 },
    #[error("{field} must not be negative, got {value}")]
    Negative { field: &'static str, value: f32 },
    #[error("{field} must be within [0, 1], got {value}")]
    OutOfUnitRange { field: &'static str, value: f32 },
    #[error("{field} must be {expected}, got {value}")]
    PointSign {
        field: &'static str,
        expected: &'static str,
        value: i32,
    },
    #[error("{field} must be at least 1")]
    Zero { field: &'static str },
}

// ── Sections ─────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub session: SessionConfig,
    pub spawner: SpawnerConfig,
    pub apple: AppleConfig,
    pub basket: BasketConfig,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Bonus fraction of the base points per combo step.
    pub combo_modifier: f32,
    /// Timer options in seconds for slots 0..=2 (slot 3 is endless).
    pub timers: [f32; 3],
    /// Pause after the last apple is gone before results are shown.
    pub settle_delay: f32,
    /// Endless mode: speed multiplier gained per second of play.
    pub speed_mod_increase_rate: f32,
    /// Endless mode: bad catches + missed good apples before the game ends.
    pub allowed_misses: u32,
    /// First number shown by the pre-game countdown.
    pub countdown_start: u32,
    /// Seconds between countdown numbers.
    pub countdown_step: f32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            combo_modifier: 0.25,
            timers: [30.0, 60.0, 120.0],
            settle_delay: 1.0,
            speed_mod_increase_rate: 0.25,
            allowed_misses: 3,
            countdown_start: 3,
            countdown_step: 1.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct SpawnerConfig {
    /// Max distance from the centre an apple may spawn.
    pub max_spawn_dist: f32,
    /// Max horizontal distance between two consecutive spawns.
    pub max_spawn_apart_distance: f32,
    /// Probability that a spawned apple is good.
    pub good_apple_portion: f32,
    pub min_time_between_spawns: f32,
    pub max_time_between_spawns: f32,
    pub time_between_spawns_generation: GenerationType,
    /// Multiplied into the wait between spawns, indexed Slow/Medium/Fast.
    pub spawn_rate_modifiers: [f32; 3],
    /// Multiplied into apple fall speed, indexed Slow/Medium/Fast.
    pub apple_speed_modifiers: [f32; 3],
}

impl Default for SpawnerConfig {
    fn default() -> Self {
        Self {
            max_spawn_dist: 8.0,
            max_spawn_apart_distance: 8.0,
            good_apple_portion: 0.8,
            min_time_between_spawns: 0.4,
            max_time_between_spawns: 1.0,
            time_between_spawns_generation: GenerationType::Uniform,
            spawn_rate_modifiers: [1.1, 1.0, 0.9],
            apple_speed_modifiers: [0.9, 1.0, 1.1],
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppleConfig {
    pub good_points: i32,
    pub bad_points: i32,
    pub min_fall_speed: f32,
    pub max_fall_speed: f32,
    pub fall_speed_generation: GenerationType,
    pub acceleration: f32,
    /// Degrees per second.
    pub min_angular_velocity: f32,
    pub max_angular_velocity: f32,
    pub angular_velocity_generation: GenerationType,
    /// Height apples appear at.
    pub spawn_height: f32,
    /// Apples below this height are removed.
    pub offscreen_y: f32,
}

impl Default for AppleConfig {
    fn default() -> Self {
        Self {
            good_points: 50,
            bad_points: -30,
            min_fall_speed: 3.0,
            max_fall_speed: 6.0,
            fall_speed_generation: GenerationType::Biased,
            acceleration: 9.8,
            min_angular_velocity: 30.0,
            max_angular_velocity: 180.0,
            angular_velocity_generation: GenerationType::Uniform,
            spawn_height: 8.0,
            offscreen_y: -8.0,
        }
    }
}

/// Per-scheme values for the three body-driven schemes.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
pub struct PerScheme {
    pub lean: f32,
    #[serde(rename = "move")]
    pub move_: f32,
    pub catch: f32,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct BasketConfig {
    /// Furthest the basket travels from the centre.
    pub max_pos: f32,
    /// Spine angle (degrees) for full travel, indexed Easy/Medium/Hard.
    pub lean_bounds: [f32; 3],
    /// Hip offset (metres) for full travel.
    pub move_bounds: [f32; 3],
    /// Average hand angle (degrees) for full travel.
    pub catch_bounds: [f32; 3],
    /// Higher means snappier movement.
    pub smoothing: PerScheme,
    /// Spawn-rate compensation in endless mode; spawn waits are divided by it.
    pub speed_modifiers: PerScheme,
    /// Sideways offset added to the spine vector to cancel sensor tilt.
    pub lean_calibration: f32,
    /// Height of the basket's catch zone centre.
    pub basket_y: f32,
    pub half_width: f32,
    /// Vertical half-extent of the catch zone.
    pub catch_depth: f32,
}

impl Default for BasketConfig {
    fn default() -> Self {
        Self {
            max_pos: 8.0,
            lean_bounds: [3.0, 6.0, 9.0],
            move_bounds: [0.5, 1.0, 2.0],
            catch_bounds: [20.0, 35.0, 50.0],
            smoothing: PerScheme {
                lean: 10.0,
                move_: 10.0,
                catch: 10.0,
            },
            speed_modifiers: PerScheme {
                lean: 0.9,
                move_: 1.0,
                catch: 0.8,
            },
            lean_calibration: 0.02,
            basket_y: -6.0,
            half_width: 1.0,
            catch_depth: 0.6,
        }
    }
}

// ── Loading & validation ─────────────────────────────────────────────────────

impl GameConfig {
    pub fn load(path: &Path) -> Result<GameConfig, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&text)?;
        info!(path = %path.display(), "loaded game config");
        Ok(config)
    }

    pub fn from_toml_str(text: &str) -> Result<GameConfig, ConfigError> {
        let config: GameConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let s = &self.session;
        non_negative("session.combo_modifier", s.combo_modifier)?;
        for t in s.timers {
            positive("session.timers", t)?;
        }
        non_negative("session.settle_delay", s.settle_delay)?;
        non_negative("session.speed_mod_increase_rate", s.speed_mod_increase_rate)?;
        positive("session.countdown_step", s.countdown_step)?;
        if s.countdown_start == 0 {
            return Err(ConfigError::Zero {
                field: "session.countdown_start",
            });
        }

        let sp = &self.spawner;
        non_negative("spawner.max_spawn_dist", sp.max_spawn_dist)?;
        non_negative("spawner.max_spawn_apart_distance", sp.max_spawn_apart_distance)?;
        unit_range("spawner.good_apple_portion", sp.good_apple_portion)?;
        positive("spawner.min_time_between_spawns", sp.min_time_between_spawns)?;
        ordered(
            "spawner.time_between_spawns",
            sp.min_time_between_spawns,
            sp.max_time_between_spawns,
        )?;
        for m in sp.spawn_rate_modifiers {
            positive("spawner.spawn_rate_modifiers", m)?;
        }
        for m in sp.apple_speed_modifiers {
            positive("spawner.apple_speed_modifiers", m)?;
        }

        let a = &self.apple;
        // Catches are classified by the sign of their points.
        if a.good_points <= 0 {
            return Err(ConfigError::PointSign {
                field: "apple.good_points",
                expected: "positive",
                value: a.good_points,
            });
        }
        if a.bad_points > 0 {
            return Err(ConfigError::PointSign {
                field: "apple.bad_points",
                expected: "zero or negative",
                value: a.bad_points,
            });
        }
        positive("apple.min_fall_speed", a.min_fall_speed)?;
        ordered("apple.fall_speed", a.min_fall_speed, a.max_fall_speed)?;
        positive("apple.acceleration", a.acceleration)?;
        non_negative("apple.min_angular_velocity", a.min_angular_velocity)?;
        ordered(
            "apple.angular_velocity",
            a.min_angular_velocity,
            a.max_angular_velocity,
        )?;
        ordered("apple.height", a.offscreen_y, a.spawn_height)?;

        let b = &self.basket;
        positive("basket.max_pos", b.max_pos)?;
        for bound in b.lean_bounds {
            positive("basket.lean_bounds", bound)?;
        }
        for bound in b.move_bounds {
            positive("basket.move_bounds", bound)?;
        }
        for bound in b.catch_bounds {
            positive("basket.catch_bounds", bound)?;
        }
        for value in [b.smoothing.lean, b.smoothing.move_, b.smoothing.catch] {
            positive("basket.smoothing", value)?;
        }
        for value in [
            b.speed_modifiers.lean,
            b.speed_modifiers.move_,
            b.speed_modifiers.catch,
        ] {
            positive("basket.speed_modifiers", value)?;
        }
        positive("basket.half_width", b.half_width)?;
        positive("basket.catch_depth", b.catch_depth)?;
        Ok(())
    }
}

// NaN fails every comparison, so the checks are written to reject it too.

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NonPositive { field, value })
    }
}

fn non_negative(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value >= 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::Negative { field, value })
    }
}

fn unit_range(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::OutOfUnitRange { field, value })
    }
}

fn ordered(field: &'static str, min: f32, max: f32) -> Result<(), ConfigError> {
    if min <= max {
        Ok(())
    } else {
        Err(ConfigError::InvertedRange { field, min, max })
    }
}

/// Game entity types: pure data, no logic.
use serde::Deserialize;

// ── Geometry ──────────────────────────────────────────────────────────────────

/// A point in play-field space.  `x` grows rightward, `y` grows upward.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// A joint position in body-tracking sensor space (metres).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

// ── Difficulty & settings enums ───────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AppleKind {
    Good,
    Bad,
}

/// Overall game difficulty as picked in the menu.  Drives both the spawn
/// rate and the fall speed of apples.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Level {
    Easy,
    #[default]
    Medium,
    Hard,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RateDifficulty {
    Slow,
    #[default]
    Medium,
    Fast,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SpeedDifficulty {
    Slow,
    #[default]
    Medium,
    Fast,
}

impl RateDifficulty {
    pub fn index(self) -> usize {
        match self {
            RateDifficulty::Slow => 0,
            RateDifficulty::Medium => 1,
            RateDifficulty::Fast => 2,
        }
    }
}

impl SpeedDifficulty {
    pub fn index(self) -> usize {
        match self {
            SpeedDifficulty::Slow => 0,
            SpeedDifficulty::Medium => 1,
            SpeedDifficulty::Fast => 2,
        }
    }
}

impl From<Level> for RateDifficulty {
    fn from(level: Level) -> Self {
        match level {
            Level::Easy => RateDifficulty::Slow,
            Level::Medium => RateDifficulty::Medium,
            Level::Hard => RateDifficulty::Fast,
        }
    }
}

impl From<Level> for SpeedDifficulty {
    fn from(level: Level) -> Self {
        match level {
            Level::Easy => SpeedDifficulty::Slow,
            Level::Medium => SpeedDifficulty::Medium,
            Level::Hard => SpeedDifficulty::Fast,
        }
    }
}

/// How the player's body drives the basket.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementScheme {
    /// Tilt of the spine away from vertical.
    #[default]
    Lean,
    /// Sideways step of the hips relative to the sensor.
    Move,
    /// Sweep of both hands to one side.
    Catch,
    /// Basket pinned to the centre; no joint processing.
    Locked,
}

/// How much body movement is needed to reach the edge of the field.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementDifficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl MovementDifficulty {
    pub fn index(self) -> usize {
        match self {
            MovementDifficulty::Easy => 0,
            MovementDifficulty::Medium => 1,
            MovementDifficulty::Hard => 2,
        }
    }
}

/// Length of one play-through.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SessionLength {
    /// Fixed number of seconds.
    Timed(f32),
    /// No timer; ends after too many misses while the speed keeps ramping.
    Endless,
}

impl SessionLength {
    /// The slot used by the settings menu: 0..=2 pick one of `timers`,
    /// 3 is endless.  Anything else is rejected.
    pub fn from_slot(slot: usize, timers: &[f32; 3]) -> Option<SessionLength> {
        match slot {
            0..=2 => Some(SessionLength::Timed(timers[slot])),
            3 => Some(SessionLength::Endless),
            _ => None,
        }
    }

    pub fn is_endless(self) -> bool {
        matches!(self, SessionLength::Endless)
    }
}

/// In-memory player selections (settings menu).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Settings {
    pub length: SessionLength,
    pub scheme: MovementScheme,
    pub movement_difficulty: MovementDifficulty,
    pub level: Level,
    /// Master switch for every audio cue.
    pub audio_enabled: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            length: SessionLength::Timed(60.0),
            scheme: MovementScheme::Lean,
            movement_difficulty: MovementDifficulty::Medium,
            level: Level::Medium,
            audio_enabled: true,
        }
    }
}

// ── Session ───────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Countdown,
    Playing,
    Ending,
    Finished,
}

/// Counters for one play-through.  Only `SessionController` mutates these.
#[derive(Clone, Debug, PartialEq)]
pub struct Session {
    pub score: i64,
    pub combo: u32,
    pub highest_combo: u32,
    pub good_caught: u32,
    pub bad_caught: u32,
    pub good_missed: u32,
    /// Seconds left on the timer; `None` in endless mode.
    pub remaining_time: Option<f32>,
    /// Seconds spent in `Playing`.
    pub elapsed: f32,
    /// Endless-mode fall-speed ramp, starts at 1.0.
    pub speed_multiplier: f32,
    pub phase: Phase,
}

impl Session {
    pub fn new(length: SessionLength) -> Self {
        Self {
            score: 0,
            combo: 0,
            highest_combo: 0,
            good_caught: 0,
            bad_caught: 0,
            good_missed: 0,
            remaining_time: match length {
                SessionLength::Timed(secs) => Some(secs),
                SessionLength::Endless => None,
            },
            elapsed: 0.0,
            speed_multiplier: 1.0,
            phase: Phase::Countdown,
        }
    }

    /// Misses counted against the endless-mode allowance.
    pub fn misses(&self) -> u32 {
        self.bad_caught + self.good_missed
    }

    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            score: self.score,
            good_caught: self.good_caught,
            bad_caught: self.bad_caught,
            good_missed: self.good_missed,
            highest_combo: self.highest_combo,
            elapsed: self.elapsed,
        }
    }
}

/// Final results shown on the end screen.
#[derive(Clone, Debug, PartialEq)]
pub struct SessionSummary {
    pub score: i64,
    pub good_caught: u32,
    pub bad_caught: u32,
    pub good_missed: u32,
    pub highest_combo: u32,
    pub elapsed: f32,
}

// ── Apples ────────────────────────────────────────────────────────────────────

/// One falling apple.
#[derive(Clone, Debug, PartialEq)]
pub struct Apple {
    pub kind: AppleKind,
    /// Points reported on basket contact; negative for bad apples.
    pub point_value: i32,
    pub position: Vec2,
    /// Downward speed (always >= 0).
    pub vertical_speed: f32,
    /// Squared terminal speed, compared against `vertical_speed²` each tick.
    pub terminal_speed_sq: f32,
    /// Speed gained per second until terminal speed is reached.
    pub acceleration: f32,
    /// Heading in degrees, [0, 360).
    pub rotation: f32,
    /// Degrees per second, signed.
    pub angular_velocity: f32,
    /// Frozen apples ignore physics ticks (tutorial/demo).
    pub locked: bool,
}

/// What the spawner asks the game to create.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpawnRequest {
    pub kind: AppleKind,
    pub x: f32,
    pub speed_scale: f32,
}

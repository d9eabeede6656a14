/// Body-tracking input to basket position.
///
/// Each tick the body nearest the sensor's centre line is reduced to one raw
/// signal by the active [`MovementScheme`], normalized against the
/// difficulty bound, and the basket eases toward the resulting target.
use std::collections::BTreeMap;

use tracing::debug;

use crate::config::BasketConfig;
use crate::entities::{MovementDifficulty, MovementScheme, Vec3};

// ── Sensor frame types ───────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum JointType {
    SpineBase,
    SpineShoulder,
    WristLeft,
    WristRight,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct TrackedBody {
    pub id: u64,
    pub is_tracked: bool,
    pub joints: BTreeMap<JointType, Vec3>,
}

impl TrackedBody {
    pub fn new(id: u64) -> Self {
        Self {
            id,
            is_tracked: true,
            joints: BTreeMap::new(),
        }
    }

    pub fn with_joint(mut self, joint: JointType, position: Vec3) -> Self {
        self.joints.insert(joint, position);
        self
    }

    pub fn joint(&self, joint: JointType) -> Option<Vec3> {
        self.joints.get(&joint).copied()
    }
}

/// Everything the sensor reported for one tick.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BodyFrame {
    pub bodies: Vec<TrackedBody>,
}

/// The tracked body whose spine base is closest to the sensor's centre line.
/// Equal distances go to the lowest tracking id.
pub fn select_center_body(frame: &BodyFrame) -> Option<&TrackedBody> {
    frame
        .bodies
        .iter()
        .filter(|b| b.is_tracked)
        .filter_map(|b| b.joint(JointType::SpineBase).map(|base| (base.x.abs(), b)))
        .min_by(|(da, a), (db, b)| da.total_cmp(db).then(a.id.cmp(&b.id)))
        .map(|(_, b)| b)
}

// ── Math helpers ─────────────────────────────────────────────────────────────

pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t.clamp(0.0, 1.0)
}

/// Where `value` sits between `a` and `b`, clamped to [0, 1].
pub fn inverse_lerp(a: f32, b: f32, value: f32) -> f32 {
    if a == b {
        return 0.0;
    }
    ((value - a) / (b - a)).clamp(0.0, 1.0)
}

/// Signed angle in degrees of `(x, y)` away from the `+y` axis; positive
/// toward `+x`.
fn signed_angle_from_axis(x: f32, y: f32) -> f32 {
    x.atan2(y).to_degrees()
}

// ── Schemes ──────────────────────────────────────────────────────────────────

impl MovementScheme {
    /// Reduce one body to the scheme's raw signal. `None` when a needed
    /// joint is missing, or for `Locked`.
    pub fn compute_raw_signal(self, body: &TrackedBody, config: &BasketConfig) -> Option<f32> {
        match self {
            MovementScheme::Lean => {
                let base = body.joint(JointType::SpineBase)?;
                let shoulder = body.joint(JointType::SpineShoulder)?;
                let dx = shoulder.x - base.x + config.lean_calibration;
                let dy = shoulder.y - base.y;
                Some(signed_angle_from_axis(dx, dy))
            }
            MovementScheme::Move => body.joint(JointType::SpineBase).map(|base| base.x),
            MovementScheme::Catch => {
                let base = body.joint(JointType::SpineBase)?;
                let left = body.joint(JointType::WristLeft)?;
                let right = body.joint(JointType::WristRight)?;
                // Angle on the floor plane, measured from the direction the
                // player faces (toward the sensor, -z).
                let hand_angle =
                    |hand: Vec3| signed_angle_from_axis(hand.x - base.x, base.z - hand.z);
                Some((hand_angle(left) + hand_angle(right)) / 2.0)
            }
            MovementScheme::Locked => None,
        }
    }

    /// Raw signal that maps to the edge of the field.
    pub fn bound(self, config: &BasketConfig, difficulty: MovementDifficulty) -> f32 {
        let i = difficulty.index();
        match self {
            MovementScheme::Lean => config.lean_bounds[i],
            MovementScheme::Move => config.move_bounds[i],
            MovementScheme::Catch => config.catch_bounds[i],
            MovementScheme::Locked => 1.0,
        }
    }

    pub fn smoothing(self, config: &BasketConfig) -> f32 {
        match self {
            MovementScheme::Lean => config.smoothing.lean,
            MovementScheme::Move => config.smoothing.move_,
            MovementScheme::Catch => config.smoothing.catch,
            MovementScheme::Locked => 0.0,
        }
    }

    pub fn speed_modifier(self, config: &BasketConfig) -> f32 {
        match self {
            MovementScheme::Lean => config.speed_modifiers.lean,
            MovementScheme::Move => config.speed_modifiers.move_,
            MovementScheme::Catch => config.speed_modifiers.catch,
            MovementScheme::Locked => 1.0,
        }
    }
}

// ── Input mapper ─────────────────────────────────────────────────────────────

pub struct BasketInput {
    config: BasketConfig,
    scheme: MovementScheme,
    difficulty: MovementDifficulty,
    target_position_lerp: f32,
    basket_x: f32,
}

impl BasketInput {
    pub fn new(config: BasketConfig, scheme: MovementScheme, difficulty: MovementDifficulty) -> Self {
        Self {
            config,
            scheme,
            difficulty,
            target_position_lerp: 0.5,
            basket_x: 0.0,
        }
    }

    pub fn basket_x(&self) -> f32 {
        self.basket_x
    }

    pub fn target_position_lerp(&self) -> f32 {
        self.target_position_lerp
    }

    pub fn scheme(&self) -> MovementScheme {
        self.scheme
    }

    pub fn difficulty(&self) -> MovementDifficulty {
        self.difficulty
    }

    pub fn config(&self) -> &BasketConfig {
        &self.config
    }

    pub fn set_scheme(&mut self, scheme: MovementScheme) {
        debug!(?scheme, "movement scheme changed");
        self.scheme = scheme;
        if scheme == MovementScheme::Locked {
            self.pin_to_center();
        }
    }

    pub fn set_difficulty(&mut self, difficulty: MovementDifficulty) {
        self.difficulty = difficulty;
    }

    /// Pin the basket to the centre and stop reading the body.
    pub fn lock_movement(&mut self) {
        self.set_scheme(MovementScheme::Locked);
    }

    fn pin_to_center(&mut self) {
        self.basket_x = 0.0;
        self.target_position_lerp = 0.5;
    }

    /// Spawn-rate modifier for the active scheme.
    pub fn speed_game_mod(&self) -> f32 {
        self.scheme.speed_modifier(&self.config)
    }

    /// Ease the basket toward the position implied by `frame`. A missing
    /// frame or body leaves the basket where it is.
    pub fn update(&mut self, frame: Option<&BodyFrame>, dt: f32) -> f32 {
        if self.scheme == MovementScheme::Locked {
            self.pin_to_center();
            return self.basket_x;
        }

        let Some(body) = frame.and_then(select_center_body) else {
            return self.basket_x;
        };
        let Some(raw) = self.scheme.compute_raw_signal(body, &self.config) else {
            return self.basket_x;
        };

        let bound = self.scheme.bound(&self.config, self.difficulty);
        self.target_position_lerp = inverse_lerp(-bound, bound, raw);
        let target = lerp(-self.config.max_pos, self.config.max_pos, self.target_position_lerp);

        // Capped at 1 so a long tick lands on the target instead of past it.
        let step = (self.scheme.smoothing(&self.config) * dt).min(1.0);
        self.basket_x += (target - self.basket_x) * step;
        self.basket_x
    }
}

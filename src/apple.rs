/// Falling-apple behaviour: spawn kinematics, per-tick fall, and the two
/// ways an apple leaves the field.
///
/// Leaving the field consumes the `Apple`, so an apple can only ever be
/// scored (or missed) once.
use rand::Rng;
use tracing::trace;

use crate::config::AppleConfig;
use crate::entities::{Apple, AppleKind, Vec2};
use crate::random::{self, GenerationType};
use crate::session::{ComboUpdate, SessionController};

impl Apple {
    /// Create an apple at `x` on the spawn line with randomized rotation
    /// and terminal speed. `speed_scale` multiplies the terminal speed.
    pub fn spawn(
        kind: AppleKind,
        x: f32,
        speed_scale: f32,
        config: &AppleConfig,
        rng: &mut impl Rng,
    ) -> Apple {
        let rotation = random::generate(rng, 0.0, 360.0, GenerationType::Uniform) % 360.0;
        let angular_velocity = random::generate(
            rng,
            config.min_angular_velocity,
            config.max_angular_velocity,
            config.angular_velocity_generation,
        ) * random::sign(rng);

        // Drawn between the squared bounds; `speed_scale` is squared to match.
        let base_sq = random::generate(
            rng,
            config.min_fall_speed * config.min_fall_speed,
            config.max_fall_speed * config.max_fall_speed,
            config.fall_speed_generation,
        );
        let terminal_speed_sq = base_sq * speed_scale * speed_scale;

        let point_value = match kind {
            AppleKind::Good => config.good_points,
            AppleKind::Bad => config.bad_points,
        };

        trace!(?kind, x, terminal_speed = terminal_speed_sq.sqrt(), "apple spawned");

        Apple {
            kind,
            point_value,
            position: Vec2::new(x, config.spawn_height),
            vertical_speed: 0.0,
            terminal_speed_sq,
            acceleration: config.acceleration,
            rotation,
            angular_velocity,
            locked: false,
        }
    }

    pub fn terminal_speed(&self) -> f32 {
        self.terminal_speed_sq.sqrt()
    }

    /// Accelerate toward terminal speed, then fall and spin for `dt` seconds.
    pub fn tick(&mut self, dt: f32) {
        if self.locked {
            return;
        }

        let terminal = self.terminal_speed();
        if self.vertical_speed * self.vertical_speed < self.terminal_speed_sq {
            self.vertical_speed = (self.vertical_speed + self.acceleration * dt).min(terminal);
        } else {
            self.vertical_speed = terminal;
        }

        self.position.y -= self.vertical_speed * dt;
        self.rotation = (self.rotation + self.angular_velocity * dt).rem_euclid(360.0);
    }

    pub fn is_offscreen(&self, threshold_y: f32) -> bool {
        self.position.y < threshold_y
    }

    /// The apple landed in the basket.
    pub fn on_basket_contact(self, session: &mut SessionController) {
        session.register_catch(self.point_value, self.position);
        let update = match self.kind {
            AppleKind::Good => ComboUpdate::Increment,
            AppleKind::Bad => ComboUpdate::Reset,
        };
        session.register_combo(update);
    }

    /// The apple fell past the bottom of the field.
    pub fn on_offscreen(self, session: &mut SessionController) {
        session.register_miss(self.kind);
    }
}

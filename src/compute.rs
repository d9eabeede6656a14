/// The game context: one instance of every component, wired together and
/// advanced by a fixed-timestep [`Game::tick`].
///
/// Components never reach each other through globals; the `Game` passes
/// what each needs on every tick.  All randomness comes through the `rng`
/// argument so callers control determinism (seeded RNG in tests).
use rand::Rng;
use tracing::{debug, warn};

use crate::basket::{BasketInput, BodyFrame};
use crate::config::{ConfigError, GameConfig};
use crate::entities::{Apple, AppleKind, Phase, Session, Settings};
use crate::events::{self, AudioSink, GameEvent, Presentation};
use crate::session::SessionController;
use crate::spawner::{SpawnContext, Spawner};

pub struct Game {
    config: GameConfig,
    settings: Settings,
    session: SessionController,
    spawner: Spawner,
    basket: BasketInput,
    apples: Vec<Apple>,
}

impl Game {
    /// Validate `config` and start a session in `Countdown`.
    pub fn new(config: GameConfig, settings: Settings) -> Result<Game, ConfigError> {
        config.validate()?;
        let session = SessionController::new(config.session.clone(), settings.length);
        let spawner = Spawner::new(config.spawner.clone(), settings.level);
        let basket = BasketInput::new(
            config.basket.clone(),
            settings.scheme,
            settings.movement_difficulty,
        );
        Ok(Game {
            config,
            settings,
            session,
            spawner,
            basket,
            apples: Vec::new(),
        })
    }

    // ── Queries ──────────────────────────────────────────────────────────────

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn session(&self) -> &Session {
        self.session.session()
    }

    pub fn phase(&self) -> Phase {
        self.session.phase()
    }

    pub fn apples(&self) -> &[Apple] {
        &self.apples
    }

    pub fn basket_x(&self) -> f32 {
        self.basket.basket_x()
    }

    pub fn spawner(&self) -> &Spawner {
        &self.spawner
    }

    pub fn basket(&self) -> &BasketInput {
        &self.basket
    }

    fn spawn_context(&self) -> SpawnContext {
        SpawnContext {
            endless: self.session.length().is_endless(),
            speed_multiplier: self.session.speed_multiplier(),
            scheme_speed_modifier: self.basket.speed_game_mod(),
        }
    }

    // ── Per-frame tick ───────────────────────────────────────────────────────

    /// Advance everything by `dt` seconds.  Order: basket input, session
    /// state machine, spawner, apple physics, then catches and misses.
    pub fn tick(&mut self, dt: f32, frame: Option<&BodyFrame>, rng: &mut impl Rng) {
        // ── 1. Basket ────────────────────────────────────────────────────────
        self.basket.update(frame, dt);

        // ── 2. Session ───────────────────────────────────────────────────────
        match self.session.tick(dt, self.apples.len()) {
            Some(Phase::Playing) => {
                let ctx = self.spawn_context();
                self.spawner.start(&ctx, rng);
            }
            Some(Phase::Ending) => self.spawner.stop(),
            _ => {}
        }

        // ── 3. Spawn ─────────────────────────────────────────────────────────
        let ctx = self.spawn_context();
        if let Some(request) = self.spawner.tick(dt, &ctx, rng) {
            self.apples.push(Apple::spawn(
                request.kind,
                request.x,
                request.speed_scale,
                &self.config.apple,
                rng,
            ));
        }

        // ── 4. Fall ──────────────────────────────────────────────────────────
        for apple in &mut self.apples {
            apple.tick(dt);
        }

        // ── 5. Catches & misses ──────────────────────────────────────────────
        self.resolve_apples();
    }

    /// Remove every apple that reached the basket or left the field.  An
    /// apple that does both on the same tick counts as caught.
    fn resolve_apples(&mut self) {
        let basket_x = self.basket.basket_x();
        let offscreen_y = self.config.apple.offscreen_y;
        let mut remaining = Vec::with_capacity(self.apples.len());

        for apple in std::mem::take(&mut self.apples) {
            if self.in_catch_zone(&apple, basket_x) {
                apple.on_basket_contact(&mut self.session);
            } else if apple.is_offscreen(offscreen_y) {
                apple.on_offscreen(&mut self.session);
            } else {
                remaining.push(apple);
            }
        }

        self.apples = remaining;
    }

    fn in_catch_zone(&self, apple: &Apple, basket_x: f32) -> bool {
        let b = &self.config.basket;
        (apple.position.x - basket_x).abs() <= b.half_width
            && (apple.position.y - b.basket_y).abs() <= b.catch_depth
    }

    /// The nearest apple falling toward the basket, if any.  Drives the
    /// "what's coming" indicator above the basket.
    pub fn apple_above_basket(&self) -> Option<AppleKind> {
        let basket_x = self.basket.basket_x();
        let b = &self.config.basket;
        self.apples
            .iter()
            .filter(|a| (a.position.x - basket_x).abs() <= b.half_width && a.position.y > b.basket_y)
            .min_by(|lhs, rhs| lhs.position.y.total_cmp(&rhs.position.y))
            .map(|a| a.kind)
    }

    // ── Presentation ─────────────────────────────────────────────────────────

    /// Events emitted since the last call, without dispatching them.
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        self.session.events().drain()
    }

    /// Hand pending events to whichever collaborators are bound.  Audio
    /// cues are dropped while audio is disabled in the settings.
    pub fn dispatch_events(
        &mut self,
        mut presentation: Option<&mut dyn Presentation>,
        audio: Option<&mut dyn AudioSink>,
    ) {
        let mut audio = audio.filter(|_| self.settings.audio_enabled);
        for event in self.drain_events() {
            events::dispatch(&event, presentation.as_deref_mut(), audio.as_deref_mut());
        }
    }

    // ── Settings, tutorial, restart ──────────────────────────────────────────

    /// Movement and difficulty apply immediately; session length applies on
    /// the next restart.
    pub fn apply_settings(&mut self, settings: Settings) {
        self.basket.set_scheme(settings.scheme);
        self.basket.set_difficulty(settings.movement_difficulty);
        self.spawner.set_level(settings.level);
        self.settings = settings;
        debug!(?settings, "settings applied");
    }

    pub fn lock_movement(&mut self) {
        self.basket.lock_movement();
    }

    /// Drop one apple at the centre outside the spawn loop.  A locked apple
    /// hangs in place until [`Game::release_locked`].
    pub fn spawn_single(&mut self, kind: AppleKind, locked: bool, rng: &mut impl Rng) {
        self.spawn_at(kind, 0.0, locked, rng);
    }

    /// Drop a pair of apples at both edges of the spawn area, so a player
    /// has to reach each side once.
    pub fn spawn_side_apples(&mut self, kind: AppleKind, locked: bool, rng: &mut impl Rng) {
        let edge = self.config.spawner.max_spawn_dist;
        self.spawn_at(kind, -edge, locked, rng);
        self.spawn_at(kind, edge, locked, rng);
    }

    fn spawn_at(&mut self, kind: AppleKind, x: f32, locked: bool, rng: &mut impl Rng) {
        let ctx = self.spawn_context();
        let mut apple = Apple::spawn(kind, x, self.spawner.speed_scale(&ctx), &self.config.apple, rng);
        apple.locked = locked;
        self.apples.push(apple);
    }

    pub fn release_locked(&mut self) {
        for apple in &mut self.apples {
            apple.locked = false;
        }
    }

    /// Rebuild the session from scratch and return to `Countdown`.  Only
    /// allowed once the current session has finished.
    pub fn restart(&mut self) -> bool {
        if self.session.phase() != Phase::Finished {
            warn!(phase = ?self.session.phase(), "restart requested before session finished");
            return false;
        }
        self.session.restart(self.settings.length);
        self.spawner.reset();
        self.apples.clear();
        self.basket = BasketInput::new(
            self.config.basket.clone(),
            self.settings.scheme,
            self.settings.movement_difficulty,
        );
        true
    }
}

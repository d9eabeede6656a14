/// In-memory presentation sink: the labels a HUD shows, the floating
/// "+75" texts, and the end-screen summary.  Renderers read from it; the
/// game writes to it only through [`Presentation`].
use crate::entities::{SessionLength, SessionSummary, Vec2};
use crate::events::Presentation;

// ── Floating score text tuning ───────────────────────────────────────────────

/// Height above the catch point a floating text appears at.
pub const FLOAT_SPAWN_OFFSET: f32 = 2.0;
/// Upward drift in field units per second.
pub const FLOAT_SPEED: f32 = 2.0;
/// Seconds a floating text lives.
pub const FLOAT_DURATION: f32 = 2.0;
/// Seconds before the fade-out starts.
pub const FLOAT_FADE_DELAY: f32 = 0.5;

/// Label for a timer setting as shown in the settings menu.
pub fn format_timer(length: SessionLength) -> String {
    match length {
        SessionLength::Timed(secs) => format!("{}", secs.round() as i64),
        SessionLength::Endless => "∞".to_string(),
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct FloatingText {
    pub label: String,
    pub position: Vec2,
    pub age: f32,
    /// Points were gained (drawn in the "good" colour).
    pub positive: bool,
}

impl FloatingText {
    pub fn new(amount: i64, at: Vec2) -> Self {
        let label = if amount > 0 {
            format!("+{amount}")
        } else {
            amount.to_string()
        };
        Self {
            label,
            position: Vec2::new(at.x, at.y + FLOAT_SPAWN_OFFSET),
            age: 0.0,
            positive: amount > 0,
        }
    }

    /// Opacity in [0, 1]: solid until the fade delay, then linear to zero.
    pub fn alpha(&self) -> f32 {
        if self.age <= FLOAT_FADE_DELAY {
            return 1.0;
        }
        let fade = (self.age - FLOAT_FADE_DELAY) / (FLOAT_DURATION - FLOAT_FADE_DELAY);
        (1.0 - fade).clamp(0.0, 1.0)
    }

    pub fn is_expired(&self) -> bool {
        self.age >= FLOAT_DURATION
    }
}

#[derive(Clone, Debug, Default)]
pub struct Hud {
    pub score: i64,
    pub combo: u32,
    countdown: Option<u32>,
    length: Option<SessionLength>,
    remaining: Option<f32>,
    pub floating: Vec<FloatingText>,
    pub summary: Option<SessionSummary>,
}

impl Hud {
    pub fn new() -> Self {
        Self::default()
    }

    /// Age and drift the floating texts, dropping expired ones.
    pub fn tick(&mut self, dt: f32) {
        for text in &mut self.floating {
            text.age += dt;
            text.position.y += FLOAT_SPEED * dt;
        }
        self.floating.retain(|t| !t.is_expired());
    }

    pub fn score_label(&self) -> String {
        self.score.to_string()
    }

    pub fn combo_label(&self) -> Option<String> {
        (self.combo > 1).then(|| format!("x{}", self.combo))
    }

    /// Visible while counting; hidden once the count reaches zero.
    pub fn countdown_label(&self) -> Option<String> {
        match self.countdown {
            Some(n) if n != 0 => Some(n.to_string()),
            _ => None,
        }
    }

    pub fn timer_label(&self) -> Option<String> {
        match (self.length?, self.remaining) {
            (SessionLength::Endless, _) => Some("Time left: ∞".to_string()),
            (SessionLength::Timed(_), Some(t)) if t <= 0.0 => None,
            (SessionLength::Timed(total), remaining) => {
                let secs = remaining.unwrap_or(total).ceil() as i64;
                Some(format!("Time left: {secs}"))
            }
        }
    }

    pub fn is_finished(&self) -> bool {
        self.summary.is_some()
    }
}

impl Presentation for Hud {
    fn on_score_changed(&mut self, total: i64) {
        self.score = total;
    }

    fn on_combo_changed(&mut self, combo: u32) {
        self.combo = combo;
    }

    fn on_countdown(&mut self, count: u32) {
        self.countdown = Some(count);
    }

    fn on_timer_initialized(&mut self, length: SessionLength) {
        // A new session: clear everything from the last one.
        *self = Hud {
            length: Some(length),
            ..Hud::default()
        };
    }

    fn on_timer_changed(&mut self, remaining: f32) {
        self.remaining = Some(remaining);
    }

    fn on_score_delta(&mut self, amount: i64, position: Vec2) {
        self.floating.push(FloatingText::new(amount, position));
    }

    fn on_session_ended(&mut self, summary: &SessionSummary) {
        self.summary = Some(summary.clone());
    }
}

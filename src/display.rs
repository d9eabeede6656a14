/// Rendering layer. All terminal I/O lives here.
///
/// Each function receives a mutable writer and an immutable view of the
/// game and HUD.  No game logic is performed; this module only translates
/// state into terminal commands.
use std::io::Write;

use crossterm::{
    cursor,
    style::{self, Color, Print},
    terminal, QueueableCommand,
};

use apple_basket::entities::{Apple, AppleKind, Level, MovementScheme, Phase, SessionLength, Vec2};
use apple_basket::hud::{format_timer, FloatingText, Hud};
use apple_basket::Game;

// ── Colour palette ────────────────────────────────────────────────────────────

const C_BORDER: Color = Color::DarkBlue;
const C_HUD_SCORE: Color = Color::Yellow;
const C_HUD_COMBO: Color = Color::Magenta;
const C_HUD_TIMER: Color = Color::White;
const C_BASKET: Color = Color::DarkYellow;
const C_APPLE_GOOD: Color = Color::Red;
const C_APPLE_BAD: Color = Color::DarkGreen;
const C_TEXT_GOOD: Color = Color::Green;
const C_TEXT_BAD: Color = Color::Red;
const C_COUNTDOWN: Color = Color::Cyan;
const C_HINT: Color = Color::DarkGrey;

// ── Field → screen mapping ───────────────────────────────────────────────────

/// Maps play-field coordinates onto the terminal's play area
/// (rows 2..height-2, columns 1..width-1).
pub struct Viewport {
    pub width: u16,
    pub height: u16,
    pub half_width: f32,
    pub top: f32,
    pub bottom: f32,
}

impl Viewport {
    pub fn for_game(game: &Game, width: u16, height: u16) -> Self {
        let cfg = game.config();
        let half_width =
            cfg.spawner.max_spawn_dist.max(cfg.basket.max_pos) + cfg.basket.half_width;
        Self {
            width,
            height,
            half_width,
            top: cfg.apple.spawn_height,
            bottom: cfg.apple.offscreen_y,
        }
    }

    /// Terminal cell for a field point, or `None` when it falls outside.
    pub fn to_cell(&self, p: Vec2) -> Option<(u16, u16)> {
        let left = 1.0;
        let right = self.width.saturating_sub(2) as f32;
        let top_row = 2.0;
        let bottom_row = self.height.saturating_sub(3) as f32;

        let tx = (p.x + self.half_width) / (2.0 * self.half_width);
        let ty = (self.top - p.y) / (self.top - self.bottom);
        if !(0.0..=1.0).contains(&tx) || !(0.0..=1.0).contains(&ty) {
            return None;
        }
        let col = left + tx * (right - left);
        let row = top_row + ty * (bottom_row - top_row);
        Some((col.round() as u16, row.round() as u16))
    }

    /// Number of columns one field unit spans.
    pub fn cols_per_unit(&self) -> f32 {
        self.width.saturating_sub(3) as f32 / (2.0 * self.half_width)
    }
}

// ── Public entry point ────────────────────────────────────────────────────────

/// Render one complete frame.
pub fn render<W: Write>(
    out: &mut W,
    game: &Game,
    hud: &Hud,
    width: u16,
    height: u16,
) -> std::io::Result<()> {
    let view = Viewport::for_game(game, width, height);
    out.queue(terminal::Clear(terminal::ClearType::All))?;

    draw_border(out, &view)?;
    draw_hud(out, game, hud, &view)?;

    for apple in game.apples() {
        draw_apple(out, apple, &view)?;
    }
    draw_basket(out, game, &view)?;
    for text in &hud.floating {
        draw_floating_text(out, text, &view)?;
    }

    if let Some(label) = hud.countdown_label() {
        draw_centered(out, &view, view.height / 2, &label, C_COUNTDOWN)?;
    }
    draw_controls_hint(out, game, &view)?;

    if game.phase() == Phase::Finished {
        draw_end_screen(out, hud, &view)?;
    }

    // Park cursor in a harmless spot and flush
    out.queue(style::ResetColor)?;
    out.queue(cursor::MoveTo(0, height.saturating_sub(1)))?;
    out.flush()?;
    Ok(())
}

// ── Border ────────────────────────────────────────────────────────────────────

fn draw_border<W: Write>(out: &mut W, view: &Viewport) -> std::io::Result<()> {
    let w = view.width as usize;
    let h = view.height;

    out.queue(style::SetForegroundColor(C_BORDER))?;

    out.queue(cursor::MoveTo(0, 1))?;
    out.queue(Print(format!("┌{}┐", "─".repeat(w.saturating_sub(2)))))?;

    out.queue(cursor::MoveTo(0, h.saturating_sub(2)))?;
    out.queue(Print(format!("└{}┘", "─".repeat(w.saturating_sub(2)))))?;

    for row in 2..h.saturating_sub(2) {
        out.queue(cursor::MoveTo(0, row))?;
        out.queue(Print("│"))?;
        out.queue(cursor::MoveTo(view.width.saturating_sub(1), row))?;
        out.queue(Print("│"))?;
    }

    Ok(())
}

// ── HUD (row 0) ───────────────────────────────────────────────────────────────

fn draw_hud<W: Write>(out: &mut W, game: &Game, hud: &Hud, view: &Viewport) -> std::io::Result<()> {
    // Score and combo, left
    out.queue(cursor::MoveTo(1, 0))?;
    out.queue(style::SetForegroundColor(C_HUD_SCORE))?;
    out.queue(Print(format!("Score:{:>6}", hud.score_label())))?;
    if let Some(combo) = hud.combo_label() {
        out.queue(style::SetForegroundColor(C_HUD_COMBO))?;
        out.queue(Print(format!("  Combo {combo}")))?;
    }

    // Level, centre
    let (level_str, level_color) = match game.settings().level {
        Level::Easy => ("[ EASY ]", Color::Green),
        Level::Medium => ("[ MEDIUM ]", Color::Yellow),
        Level::Hard => ("[ HARD ]", Color::Red),
    };
    let lx = (view.width / 2).saturating_sub(level_str.len() as u16 / 2);
    out.queue(cursor::MoveTo(lx, 0))?;
    out.queue(style::SetForegroundColor(level_color))?;
    out.queue(Print(level_str))?;

    // Timer or misses left, right
    let right_str = if game.settings().length.is_endless() {
        let allowed = game.config().session.allowed_misses;
        let left = allowed.saturating_sub(game.session().misses());
        format!("Speed x{:.2}  Misses left:{left}", game.session().speed_multiplier)
    } else {
        hud.timer_label().unwrap_or_default()
    };
    let rx = view
        .width
        .saturating_sub(right_str.chars().count() as u16 + 1);
    out.queue(cursor::MoveTo(rx, 0))?;
    out.queue(style::SetForegroundColor(C_HUD_TIMER))?;
    out.queue(Print(&right_str))?;

    Ok(())
}

// ── Entities ──────────────────────────────────────────────────────────────────

fn draw_apple<W: Write>(out: &mut W, apple: &Apple, view: &Viewport) -> std::io::Result<()> {
    let Some((col, row)) = view.to_cell(apple.position) else {
        return Ok(());
    };
    let (glyph, color) = match apple.kind {
        AppleKind::Good => ("●", C_APPLE_GOOD),
        AppleKind::Bad => ("◆", C_APPLE_BAD),
    };
    out.queue(cursor::MoveTo(col, row))?;
    out.queue(style::SetForegroundColor(color))?;
    out.queue(Print(glyph))?;
    Ok(())
}

fn draw_basket<W: Write>(out: &mut W, game: &Game, view: &Viewport) -> std::io::Result<()> {
    let cfg = &game.config().basket;
    let centre = Vec2::new(game.basket_x(), cfg.basket_y);
    let Some((col, row)) = view.to_cell(centre) else {
        return Ok(());
    };

    // Basket spans its catch width:  \____/
    let half_cols = (cfg.half_width * view.cols_per_unit()).round().max(1.0) as u16;
    let inner = "_".repeat((half_cols * 2).saturating_sub(1) as usize);
    out.queue(cursor::MoveTo(col.saturating_sub(half_cols), row))?;
    out.queue(style::SetForegroundColor(C_BASKET))?;
    out.queue(Print(format!("\\{inner}/")))?;

    // Indicator light: what the basket is about to receive
    let light = match game.apple_above_basket() {
        Some(AppleKind::Good) => Some(Color::Green),
        Some(AppleKind::Bad) => Some(Color::Red),
        None => None,
    };
    if let Some(color) = light {
        out.queue(cursor::MoveTo(col, row + 1))?;
        out.queue(style::SetForegroundColor(color))?;
        out.queue(Print("▲"))?;
    }
    Ok(())
}

fn draw_floating_text<W: Write>(
    out: &mut W,
    text: &FloatingText,
    view: &Viewport,
) -> std::io::Result<()> {
    let Some((col, row)) = view.to_cell(text.position) else {
        return Ok(());
    };
    // Terminals have no alpha; fade by dimming, then hiding.
    let alpha = text.alpha();
    if alpha < 0.2 {
        return Ok(());
    }
    let color = match (text.positive, alpha > 0.6) {
        (true, true) => C_TEXT_GOOD,
        (true, false) => Color::DarkGreen,
        (false, true) => C_TEXT_BAD,
        (false, false) => Color::DarkRed,
    };
    let half = text.label.chars().count() as u16 / 2;
    out.queue(cursor::MoveTo(col.saturating_sub(half), row))?;
    out.queue(style::SetForegroundColor(color))?;
    out.queue(Print(&text.label))?;
    Ok(())
}

// ── Controls hint (last row) ──────────────────────────────────────────────────

fn draw_controls_hint<W: Write>(out: &mut W, game: &Game, view: &Viewport) -> std::io::Result<()> {
    let verb = match game.basket().scheme() {
        MovementScheme::Lean => "Lean",
        MovementScheme::Move => "Step",
        MovementScheme::Catch => "Reach",
        MovementScheme::Locked => "Locked",
    };
    out.queue(cursor::MoveTo(1, view.height.saturating_sub(1)))?;
    out.queue(style::SetForegroundColor(C_HINT))?;
    out.queue(Print(format!("← → / A D : {verb}   Q : Quit")))?;
    Ok(())
}

fn draw_centered<W: Write>(
    out: &mut W,
    view: &Viewport,
    row: u16,
    msg: &str,
    color: Color,
) -> std::io::Result<()> {
    let col = (view.width / 2).saturating_sub(msg.chars().count() as u16 / 2);
    out.queue(cursor::MoveTo(col, row))?;
    out.queue(style::SetForegroundColor(color))?;
    out.queue(Print(msg))?;
    Ok(())
}

// ── End screen ────────────────────────────────────────────────────────────────

fn draw_end_screen<W: Write>(out: &mut W, hud: &Hud, view: &Viewport) -> std::io::Result<()> {
    let Some(summary) = &hud.summary else {
        return Ok(());
    };

    let lines: Vec<(String, Color)> = vec![
        ("╔════════════════════╗".to_string(), Color::Yellow),
        ("║     GAME OVER!     ║".to_string(), Color::Yellow),
        ("╚════════════════════╝".to_string(), Color::Yellow),
        (format!("Final Score: {:>6}", summary.score), Color::Yellow),
        (
            format!("Good apples: {:>3}   Bad apples: {:>3}", summary.good_caught, summary.bad_caught),
            Color::White,
        ),
        (format!("Missed: {:>3}   Best combo: {:>3}", summary.good_missed, summary.highest_combo), Color::White),
        ("R - Play Again  B - Menu  Q - Quit".to_string(), Color::White),
    ];

    let start_row = (view.height / 2).saturating_sub(lines.len() as u16 / 2);
    for (i, (msg, color)) in lines.iter().enumerate() {
        draw_centered(out, view, start_row + i as u16, msg, *color)?;
    }
    Ok(())
}

/// Settings line shown under the menu.
pub fn settings_line(game_length: SessionLength, scheme: MovementScheme) -> String {
    format!("Timer: {:<4}  Input: {:?}", format_timer(game_length), scheme)
}

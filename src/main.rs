mod display;

use std::collections::HashMap;
use std::io::{stdout, BufWriter, Write};
use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use clap::{Parser, ValueEnum};
use crossterm::{
    cursor,
    event::{
        self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, KeyboardEnhancementFlags,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    style::{self, Color, Print},
    terminal, ExecutableCommand, QueueableCommand,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

use apple_basket::basket::{BodyFrame, JointType, TrackedBody};
use apple_basket::config::BasketConfig;
use apple_basket::entities::{
    Level, MovementDifficulty, MovementScheme, Phase, SessionLength, Settings, Vec3,
};
use apple_basket::events::{AudioCue, AudioSink};
use apple_basket::{Game, GameConfig, Hud};

const FRAME: Duration = Duration::from_millis(33); // ≈30 FPS
const DT: f32 = 0.033;

// ── Simulated body tracking ──────────────────────────────────────────────────

/// A key is considered "held" if its last press/repeat event arrived within
/// this many frames.  Covers terminals that don't emit key-release events.
const HOLD_WINDOW: u64 = 4;

/// How fast the simulated body sways toward a held direction (per second).
const SWAY_RATE: f32 = 2.5;

/// Returns true if `key` was seen within the last `HOLD_WINDOW` frames.
fn is_held(key_frame: &HashMap<KeyCode, u64>, key: &KeyCode, frame: u64) -> bool {
    key_frame
        .get(key)
        .map(|&last| frame.saturating_sub(last) <= HOLD_WINDOW)
        .unwrap_or(false)
}

/// Build the sensor frame of one player swayed by `sway` ∈ [-1, 1].  At
/// ±1 every scheme reads past its hardest bound.
fn simulated_body(sway: f32, basket: &BasketConfig) -> BodyFrame {
    let base = Vec3::new(sway * basket.move_bounds[2], 0.0, 2.0);

    let lean = (sway * basket.lean_bounds[2] * 1.2).to_radians();
    let shoulder = Vec3::new(
        base.x + 0.5 * lean.sin() - basket.lean_calibration,
        base.y + 0.5 * lean.cos(),
        base.z,
    );

    let reach = (sway * basket.catch_bounds[2] * 1.2).to_radians();
    let wrist = Vec3::new(base.x + 0.6 * reach.sin(), 0.2, base.z - 0.6 * reach.cos());

    let body = TrackedBody::new(1)
        .with_joint(JointType::SpineBase, base)
        .with_joint(JointType::SpineShoulder, shoulder)
        .with_joint(JointType::WristLeft, wrist)
        .with_joint(JointType::WristRight, wrist);
    BodyFrame { bodies: vec![body] }
}

// ── Audio ─────────────────────────────────────────────────────────────────────

/// The only speaker a terminal has.
#[derive(Default)]
struct Bell {
    ring: bool,
}

impl AudioSink for Bell {
    fn play(&mut self, cue: AudioCue) {
        if matches!(cue, AudioCue::CatchBad | AudioCue::SessionEnd) {
            self.ring = true;
        }
    }
}

// ── Command line ─────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, ValueEnum)]
enum SchemeArg {
    Lean,
    Move,
    Catch,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum DifficultyArg {
    Easy,
    Medium,
    Hard,
}

#[derive(Debug, Parser)]
#[command(about = "Catch the good apples, dodge the bad ones")]
struct Args {
    /// TOML file overriding the default tuning
    #[arg(long)]
    config: Option<PathBuf>,
    /// Seed for a reproducible session
    #[arg(long)]
    seed: Option<u64>,
    /// 0 = 30s, 1 = 60s, 2 = 120s, 3 = endless
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u8).range(0..=3))]
    timer_slot: u8,
    #[arg(long, value_enum, default_value_t = SchemeArg::Lean)]
    scheme: SchemeArg,
    #[arg(long, value_enum, default_value_t = DifficultyArg::Medium)]
    movement_difficulty: DifficultyArg,
    /// Start with the terminal bell silenced
    #[arg(long)]
    mute: bool,
}

impl From<SchemeArg> for MovementScheme {
    fn from(arg: SchemeArg) -> Self {
        match arg {
            SchemeArg::Lean => MovementScheme::Lean,
            SchemeArg::Move => MovementScheme::Move,
            SchemeArg::Catch => MovementScheme::Catch,
        }
    }
}

impl From<DifficultyArg> for MovementDifficulty {
    fn from(arg: DifficultyArg) -> Self {
        match arg {
            DifficultyArg::Easy => MovementDifficulty::Easy,
            DifficultyArg::Medium => MovementDifficulty::Medium,
            DifficultyArg::Hard => MovementDifficulty::Hard,
        }
    }
}

// ── Menu ──────────────────────────────────────────────────────────────────────

enum MenuResult {
    Start(Level),
    Quit,
}

fn next_scheme(scheme: MovementScheme) -> MovementScheme {
    match scheme {
        MovementScheme::Lean => MovementScheme::Move,
        MovementScheme::Move => MovementScheme::Catch,
        MovementScheme::Catch | MovementScheme::Locked => MovementScheme::Lean,
    }
}

fn show_menu<W: Write>(
    out: &mut W,
    rx: &mpsc::Receiver<Event>,
    settings: &mut Settings,
    timer_slot: &mut usize,
    timers: &[f32; 3],
) -> std::io::Result<MenuResult> {
    loop {
        out.queue(terminal::Clear(terminal::ClearType::All))?;

        let (width, height) = terminal::size()?;
        let cx = width / 2;
        let cy = height / 2;

        let title = "●  APPLE  BASKET  ●";
        out.queue(cursor::MoveTo(
            cx.saturating_sub(title.chars().count() as u16 / 2),
            cy.saturating_sub(6),
        ))?;
        out.queue(style::SetForegroundColor(Color::Red))?;
        out.queue(Print(title))?;

        out.queue(cursor::MoveTo(cx.saturating_sub(10), cy.saturating_sub(3)))?;
        out.queue(style::SetForegroundColor(Color::White))?;
        out.queue(Print("Select difficulty:"))?;

        let options: &[(&str, &str, Color, &str)] = &[
            ("1", "Easy  ", Color::Green, "Slow apples, relaxed pace"),
            ("2", "Medium", Color::Yellow, "Balanced challenge"),
            ("3", "Hard  ", Color::Red, "Fast and relentless!"),
        ];

        for (i, (key, label, color, desc)) in options.iter().enumerate() {
            let row = cy.saturating_sub(1) + i as u16;
            out.queue(cursor::MoveTo(cx.saturating_sub(10), row))?;
            out.queue(style::SetForegroundColor(Color::DarkGrey))?;
            out.queue(Print(format!("[{}] ", key)))?;
            out.queue(style::SetForegroundColor(*color))?;
            out.queue(Print(format!("{:<8}", label)))?;
            out.queue(style::SetForegroundColor(Color::DarkGrey))?;
            out.queue(Print(format!(" - {}", desc)))?;
        }

        out.queue(cursor::MoveTo(cx.saturating_sub(10), cy + 3))?;
        out.queue(style::SetForegroundColor(Color::Cyan))?;
        out.queue(Print(display::settings_line(settings.length, settings.scheme)))?;
        out.queue(Print(format!("  Movement: {:?}", settings.movement_difficulty)))?;
        out.queue(Print(format!("  Sound: {}", if settings.audio_enabled { "on" } else { "off" })))?;

        out.queue(cursor::MoveTo(cx.saturating_sub(10), cy + 5))?;
        out.queue(style::SetForegroundColor(Color::DarkGrey))?;
        out.queue(Print("T : Timer   I : Input   M : Movement   S : Sound   Q : Quit"))?;

        out.queue(style::ResetColor)?;
        out.flush()?;

        // Block until the user makes a choice
        if let Ok(Event::Key(KeyEvent { code, kind, .. })) = rx.recv() {
            if kind == KeyEventKind::Release {
                continue;
            }
            match code {
                KeyCode::Char('1') => return Ok(MenuResult::Start(Level::Easy)),
                KeyCode::Char('2') => return Ok(MenuResult::Start(Level::Medium)),
                KeyCode::Char('3') => return Ok(MenuResult::Start(Level::Hard)),
                KeyCode::Char('t') | KeyCode::Char('T') => {
                    *timer_slot = (*timer_slot + 1) % 4;
                    if let Some(length) = SessionLength::from_slot(*timer_slot, timers) {
                        settings.length = length;
                    }
                }
                KeyCode::Char('i') | KeyCode::Char('I') => {
                    settings.scheme = next_scheme(settings.scheme);
                }
                KeyCode::Char('m') | KeyCode::Char('M') => {
                    settings.movement_difficulty = match settings.movement_difficulty {
                        MovementDifficulty::Easy => MovementDifficulty::Medium,
                        MovementDifficulty::Medium => MovementDifficulty::Hard,
                        MovementDifficulty::Hard => MovementDifficulty::Easy,
                    };
                }
                KeyCode::Char('s') | KeyCode::Char('S') => {
                    settings.audio_enabled = !settings.audio_enabled;
                }
                KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                    return Ok(MenuResult::Quit);
                }
                _ => {}
            }
        }
    }
}

// ── Game loop ─────────────────────────────────────────────────────────────────

/// Returns `true` → quit program,  `false` → back to menu.
///
/// Held arrow keys sway a simulated player; the resulting body frame goes
/// through the same input mapping a real sensor frame would.
fn game_loop<W: Write>(
    out: &mut W,
    game: &mut Game,
    rx: &mpsc::Receiver<Event>,
    rng: &mut StdRng,
) -> std::io::Result<bool> {
    let mut hud = Hud::new();
    let mut bell = Bell::default();
    let mut key_frame: HashMap<KeyCode, u64> = HashMap::new();
    let mut sway: f32 = 0.0;
    let mut frame: u64 = 0;

    loop {
        let frame_start = Instant::now();
        frame += 1;

        // ── Drain all pending input events (non-blocking) ─────────────────────
        while let Ok(Event::Key(KeyEvent { code, kind, modifiers, .. })) = rx.try_recv() {
            match kind {
                KeyEventKind::Press => {
                    key_frame.insert(code.clone(), frame);
                    match code {
                        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                            return Ok(true);
                        }
                        KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                            return Ok(true);
                        }
                        KeyCode::Char('r') | KeyCode::Char('R') if game.phase() == Phase::Finished => {
                            game.restart();
                            sway = 0.0;
                        }
                        KeyCode::Char('b') | KeyCode::Char('B') if game.phase() == Phase::Finished => {
                            return Ok(false);
                        }
                        _ => {}
                    }
                }
                KeyEventKind::Repeat => {
                    key_frame.insert(code.clone(), frame);
                }
                KeyEventKind::Release => {
                    key_frame.remove(&code);
                }
            }
        }

        // ── Sway toward the held direction, relax to upright otherwise ───────
        let left = is_held(&key_frame, &KeyCode::Left, frame)
            || is_held(&key_frame, &KeyCode::Char('a'), frame)
            || is_held(&key_frame, &KeyCode::Char('A'), frame);
        let right = is_held(&key_frame, &KeyCode::Right, frame)
            || is_held(&key_frame, &KeyCode::Char('d'), frame)
            || is_held(&key_frame, &KeyCode::Char('D'), frame);
        let target = match (left, right) {
            (true, false) => -1.0,
            (false, true) => 1.0,
            _ => 0.0,
        };
        sway += (target - sway) * (SWAY_RATE * DT).min(1.0);

        let body = simulated_body(sway, &game.config().basket);
        game.tick(DT, Some(&body), rng);
        game.dispatch_events(Some(&mut hud), Some(&mut bell));
        hud.tick(DT);

        if bell.ring {
            out.queue(Print('\u{7}'))?;
            bell.ring = false;
        }

        let (width, height) = terminal::size()?;
        display::render(out, game, &hud, width, height)?;

        let elapsed = frame_start.elapsed();
        if elapsed < FRAME {
            std::thread::sleep(FRAME - elapsed);
        }
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Bad tuning is rejected before the terminal is touched.
    let config = match &args.config {
        Some(path) => GameConfig::load(path)?,
        None => GameConfig::default(),
    };

    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let raw_out = stdout();
    let mut out = BufWriter::new(raw_out);

    terminal::enable_raw_mode()?;
    out.execute(terminal::EnterAlternateScreen)?;
    out.execute(cursor::Hide)?;

    // Request key-release (and key-repeat) events from the terminal.
    let keyboard_enhanced = out
        .execute(PushKeyboardEnhancementFlags(
            KeyboardEnhancementFlags::REPORT_EVENT_TYPES,
        ))
        .is_ok();

    // Dedicate a thread exclusively to blocking event reads, sending them
    // through a channel so the game loop never has to block on I/O.
    let (tx, rx) = mpsc::channel::<Event>();
    thread::spawn(move || loop {
        match event::read() {
            Ok(ev) => {
                if tx.send(ev).is_err() {
                    break; // receiver dropped → program exiting
                }
            }
            Err(_) => break,
        }
    });

    let result = run(&mut out, &rx, &args, config, &mut rng);

    // Always restore the terminal
    if keyboard_enhanced {
        let _ = out.execute(PopKeyboardEnhancementFlags);
    }
    let _ = out.execute(cursor::Show);
    let _ = out.execute(terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();

    result
}

fn run<W: Write>(
    out: &mut W,
    rx: &mpsc::Receiver<Event>,
    args: &Args,
    config: GameConfig,
    rng: &mut StdRng,
) -> anyhow::Result<()> {
    let mut timer_slot = args.timer_slot as usize;
    let mut settings = Settings {
        length: SessionLength::from_slot(timer_slot, &config.session.timers)
            .unwrap_or(SessionLength::Endless),
        scheme: args.scheme.into(),
        movement_difficulty: args.movement_difficulty.into(),
        level: Level::Medium,
        audio_enabled: !args.mute,
    };

    loop {
        let timers = config.session.timers;
        match show_menu(out, rx, &mut settings, &mut timer_slot, &timers)? {
            MenuResult::Quit => break,
            MenuResult::Start(level) => {
                settings.level = level;
                let mut game = Game::new(config.clone(), settings)?;
                if game_loop(out, &mut game, rx, rng)? {
                    break;
                }
            }
        }
    }
    Ok(())
}

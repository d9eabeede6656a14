/// One-way notifications from the session to whatever presents it.
///
/// The session never talks to a display or speaker directly. It emits
/// [`GameEvent`]s into an [`EventBus`]; the owner drains the bus and hands
/// each event to the bound collaborators. An unbound collaborator simply
/// misses the event.
use crate::entities::{SessionLength, SessionSummary, Vec2};

/// Fire-and-forget sound triggers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AudioCue {
    CountdownTick,
    CountdownGo,
    MusicStart,
    CatchGood,
    CatchBad,
    SessionEnd,
}

#[derive(Clone, Debug, PartialEq)]
pub enum GameEvent {
    ScoreChanged(i64),
    ComboChanged(u32),
    Countdown(u32),
    TimerInitialized(SessionLength),
    TimerChanged(f32),
    ScoreDelta { amount: i64, position: Vec2 },
    SessionEnded(SessionSummary),
    Audio(AudioCue),
}

/// Presentation layer. Every method defaults to doing nothing so a sink
/// only implements what it shows.
pub trait Presentation {
    fn on_score_changed(&mut self, _total: i64) {}
    fn on_combo_changed(&mut self, _combo: u32) {}
    fn on_countdown(&mut self, _count: u32) {}
    fn on_timer_initialized(&mut self, _length: SessionLength) {}
    fn on_timer_changed(&mut self, _remaining: f32) {}
    fn on_score_delta(&mut self, _amount: i64, _position: Vec2) {}
    fn on_session_ended(&mut self, _summary: &SessionSummary) {}
}

pub trait AudioSink {
    fn play(&mut self, cue: AudioCue);
}

/// Route one event to whichever collaborators are bound.
pub fn dispatch<'p, 'a>(
    event: &GameEvent,
    presentation: Option<&mut (dyn Presentation + 'p)>,
    audio: Option<&mut (dyn AudioSink + 'a)>,
) {
    match event {
        GameEvent::Audio(cue) => {
            if let Some(audio) = audio {
                audio.play(*cue);
            }
        }
        other => {
            if let Some(p) = presentation {
                present(other, p);
            }
        }
    }
}

fn present(event: &GameEvent, p: &mut dyn Presentation) {
    match event {
        GameEvent::ScoreChanged(total) => p.on_score_changed(*total),
        GameEvent::ComboChanged(combo) => p.on_combo_changed(*combo),
        GameEvent::Countdown(count) => p.on_countdown(*count),
        GameEvent::TimerInitialized(length) => p.on_timer_initialized(*length),
        GameEvent::TimerChanged(remaining) => p.on_timer_changed(*remaining),
        GameEvent::ScoreDelta { amount, position } => p.on_score_delta(*amount, *position),
        GameEvent::SessionEnded(summary) => p.on_session_ended(summary),
        GameEvent::Audio(_) => {}
    }
}

/// Queue of events emitted since the last drain.
#[derive(Debug, Default)]
pub struct EventBus {
    pending: Vec<GameEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(&mut self, event: GameEvent) {
        self.pending.push(event);
    }

    pub fn peek(&self) -> &[GameEvent] {
        &self.pending
    }

    pub fn drain(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.pending)
    }
}

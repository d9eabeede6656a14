//! Apple Basket - catch falling apples with body-tracked movement.
//!
//! The crate is the game core only: session state machine, spawner, apple
//! fall logic and body-to-basket input mapping. Rendering, audio and the
//! body-tracking sensor are collaborators supplied by the caller.

pub mod apple;
pub mod basket;
pub mod compute;
pub mod config;
pub mod entities;
pub mod events;
pub mod hud;
pub mod random;
pub mod session;
pub mod spawner;

pub use basket::{BasketInput, BodyFrame, JointType, TrackedBody};
pub use compute::Game;
pub use config::{ConfigError, GameConfig};
pub use entities::{
    Apple, AppleKind, Level, MovementDifficulty, MovementScheme, Phase, Session, SessionLength,
    SessionSummary, Settings, Vec2, Vec3,
};
pub use events::{AudioCue, AudioSink, GameEvent, Presentation};
pub use hud::Hud;
pub use session::{ComboUpdate, SessionController};
pub use spawner::{SpawnContext, Spawner};

mod actor;
mod config;
mod effects;
mod hud;
mod level;
mod player;
mod session;

pub(crate) use config::{ConfigError, GameConfig};
pub(crate) use level::demo_level;
pub(crate) use session::{GameSession, PlatformerScene, SessionError};

use std::fs;
use std::path::{Path, PathBuf};

use engine::fixed::to_fixed_f32;
use engine::Scroll;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub(crate) enum ConfigError {
    #[error("failed to read config '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{0}")]
    Parse(String),
    #[error("invalid config value at {path}: expected {expected}, got {actual}")]
    Invalid {
        path: &'static str,
        expected: &'static str,
        actual: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct GameConfig {
    pub(crate) registry_capacity: usize,
    pub(crate) sprite_capacity: usize,
    pub(crate) viewport: ViewportConfig,
    pub(crate) initial_scroll: Scroll,
    pub(crate) player: PlayerTuning,
    pub(crate) effects: EffectsConfig,
    pub(crate) hud: HudConfig,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            registry_capacity: 40,
            sprite_capacity: 64,
            viewport: ViewportConfig::default(),
            initial_scroll: Scroll { x: 0, y: 48 },
            player: PlayerTuning::default(),
            effects: EffectsConfig::default(),
            hud: HudConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct ViewportConfig {
    pub(crate) width: i32,
    pub(crate) height: i32,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            width: 400,
            height: 240,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct PlayerTuning {
    pub(crate) spawn_x: i32,
    pub(crate) spawn_y: i32,
    pub(crate) run_speed_px: f32,
    pub(crate) jump_speed_px: f32,
    pub(crate) fall_speed_px: f32,
    pub(crate) time_move: u32,
    pub(crate) time_jump: u32,
    pub(crate) time_fall: u32,
    pub(crate) camera_forward_margin: i32,
    pub(crate) camera_back_margin: i32,
}

impl Default for PlayerTuning {
    fn default() -> Self {
        Self {
            spawn_x: 16,
            spawn_y: 16,
            run_speed_px: 3.0,
            jump_speed_px: 3.7,
            fall_speed_px: 7.0,
            time_move: 15,
            time_jump: 12,
            time_fall: 30,
            camera_forward_margin: 160,
            camera_back_margin: 120,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct EffectsConfig {
    pub(crate) bumped_tile_index: u16,
    pub(crate) bump_picture: u16,
    pub(crate) collect_first_picture: u16,
    pub(crate) bump_score: u32,
}

impl Default for EffectsConfig {
    fn default() -> Self {
        Self {
            bumped_tile_index: 51,
            bump_picture: 0,
            collect_first_picture: 4,
            bump_score: 10,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct HudConfig {
    pub(crate) lives: u32,
    pub(crate) time: u32,
    pub(crate) frames_per_time_unit: u32,
}

impl Default for HudConfig {
    fn default() -> Self {
        Self {
            lives: 5,
            time: 255,
            frames_per_time_unit: 30,
        }
    }
}

impl GameConfig {
    pub(crate) fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&raw)
    }

    pub(crate) fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let mut deserializer = serde_json::Deserializer::from_str(raw);
        let config: Self = match serde_path_to_error::deserialize(&mut deserializer) {
            Ok(config) => config,
            Err(error) => {
                let path = error.path().to_string();
                let source = error.into_inner();
                return Err(if path.is_empty() || path == "." {
                    ConfigError::Parse(format!("parse config json: {source}"))
                } else {
                    ConfigError::Parse(format!("parse config json at {path}: {source}"))
                });
            }
        };
        config.validate()?;
        Ok(config)
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        require_positive("registry_capacity", self.registry_capacity as i64)?;
        require_positive("sprite_capacity", self.sprite_capacity as i64)?;
        require_positive("viewport.width", i64::from(self.viewport.width))?;
        require_positive("viewport.height", i64::from(self.viewport.height))?;
        require_positive("player.time_move", i64::from(self.player.time_move))?;
        require_positive("player.time_jump", i64::from(self.player.time_jump))?;
        require_positive("player.time_fall", i64::from(self.player.time_fall))?;
        require_positive(
            "hud.frames_per_time_unit",
            i64::from(self.hud.frames_per_time_unit),
        )?;
        require_speed("player.run_speed_px", self.player.run_speed_px)?;
        require_speed("player.jump_speed_px", self.player.jump_speed_px)?;
        require_speed("player.fall_speed_px", self.player.fall_speed_px)?;
        require_step(
            "player.time_move",
            self.player.run_speed_px,
            self.player.time_move,
        )?;
        require_step(
            "player.time_fall",
            self.player.fall_speed_px,
            self.player.time_fall,
        )?;
        if self.player.camera_forward_margin < 0 || self.player.camera_back_margin < 0 {
            return Err(ConfigError::Invalid {
                path: "player.camera_*_margin",
                expected: "non-negative margins",
                actual: format!(
                    "forward {} back {}",
                    self.player.camera_forward_margin, self.player.camera_back_margin
                ),
            });
        }
        Ok(())
    }
}

fn require_positive(path: &'static str, value: i64) -> Result<(), ConfigError> {
    if value > 0 {
        return Ok(());
    }
    Err(ConfigError::Invalid {
        path,
        expected: "a value greater than zero",
        actual: value.to_string(),
    })
}

fn require_speed(path: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        return Ok(());
    }
    Err(ConfigError::Invalid {
        path,
        expected: "a finite speed greater than zero",
        actual: value.to_string(),
    })
}

fn require_step(path: &'static str, speed_px: f32, frames: u32) -> Result<(), ConfigError> {
    let speed = i64::from(to_fixed_f32(speed_px));
    if speed / i64::from(frames) > 0 {
        return Ok(());
    }
    Err(ConfigError::Invalid {
        path,
        expected: "at most one frame per fixed-point unit of speed",
        actual: format!("{frames} frames for speed {speed}"),
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn empty_object_yields_defaults() {
        let config = GameConfig::from_json_str("{}").expect("defaults");
        assert_eq!(config, GameConfig::default());
        assert_eq!(config.effects.bumped_tile_index, 51);
        assert_eq!(config.initial_scroll, Scroll { x: 0, y: 48 });
    }

    #[test]
    fn bundled_config_matches_defaults() {
        let raw = include_str!("../../../../../assets/config/game.json");
        let config = GameConfig::from_json_str(raw).expect("bundled config");
        assert_eq!(config, GameConfig::default());
    }

    #[test]
    fn partial_sections_keep_remaining_defaults() {
        let raw = json!({
            "registry_capacity": 8,
            "player": { "time_jump": 20 }
        })
        .to_string();
        let config = GameConfig::from_json_str(&raw).expect("parse");
        assert_eq!(config.registry_capacity, 8);
        assert_eq!(config.player.time_jump, 20);
        assert_eq!(config.player.time_move, 15);
        assert_eq!(config.hud.time, 255);
    }

    #[test]
    fn parse_error_reports_field_path() {
        let raw = json!({ "player": { "time_fall": "slow" } }).to_string();
        let error = GameConfig::from_json_str(&raw).expect_err("type mismatch");
        assert!(
            error.to_string().contains("player.time_fall"),
            "unexpected error: {error}"
        );
    }

    #[test]
    fn unknown_field_is_rejected() {
        let raw = json!({ "hud": { "continues": 3 } }).to_string();
        let error = GameConfig::from_json_str(&raw).expect_err("unknown field");
        assert!(error.to_string().contains("hud"));
    }

    #[test]
    fn zero_capacity_fails_validation() {
        let raw = json!({ "registry_capacity": 0 }).to_string();
        let error = GameConfig::from_json_str(&raw).expect_err("zero capacity");
        assert!(matches!(
            error,
            ConfigError::Invalid {
                path: "registry_capacity",
                ..
            }
        ));
    }

    #[test]
    fn zero_timing_divisor_fails_validation() {
        let mut config = GameConfig::default();
        config.player.time_move = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid {
                path: "player.time_move",
                ..
            })
        ));
    }

    #[test]
    fn zero_derived_accel_fails_validation() {
        let raw = json!({ "player": { "time_move": 4000 } }).to_string();
        let error = GameConfig::from_json_str(&raw).expect_err("accel truncates to zero");
        assert!(matches!(
            error,
            ConfigError::Invalid {
                path: "player.time_move",
                ..
            }
        ));

        let raw = json!({ "player": { "time_fall": 8000 } }).to_string();
        let error = GameConfig::from_json_str(&raw).expect_err("gravity truncates to zero");
        assert!(matches!(
            error,
            ConfigError::Invalid {
                path: "player.time_fall",
                ..
            }
        ));

        let raw = json!({ "player": { "run_speed_px": 1.0, "time_move": 1024 } }).to_string();
        let config = GameConfig::from_json_str(&raw).expect("one unit per frame");
        assert_eq!(config.player.time_move, 1024);
    }

    #[test]
    fn load_reads_config_from_disk() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("game.json");
        fs::write(&path, json!({ "sprite_capacity": 12 }).to_string()).expect("write");

        let config = GameConfig::load(&path).expect("load");
        assert_eq!(config.sprite_capacity, 12);

        let missing = GameConfig::load(&dir.path().join("missing.json")).expect_err("missing");
        assert!(matches!(missing, ConfigError::Read { .. }));
    }
}

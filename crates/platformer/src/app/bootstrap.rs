use std::env;
use std::path::{Path, PathBuf};

use engine::{
    resolve_app_paths, InputAction, InputScript, InputScriptError, InputStep, LoopConfig, Scene,
    ScriptedInput, TileGridError,
};
use thiserror::Error;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use super::gameplay::{self, ConfigError, GameConfig, GameSession, PlatformerScene, SessionError};

const CONFIG_ENV_VAR: &str = "PLATFORMER_CONFIG";
const INPUT_SCRIPT_ENV_VAR: &str = "PLATFORMER_INPUT_SCRIPT";
const MAX_TICKS_ENV_VAR: &str = "PLATFORMER_MAX_TICKS";
const REALTIME_ENV_VAR: &str = "PLATFORMER_REALTIME";
const CONFIG_FILE: &str = "game.json";
const DEMO_SCRIPT_FILE: &str = "demo.json";

#[derive(Debug, Error)]
pub(crate) enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Script(#[from] InputScriptError),
    #[error("demo level is malformed: {0}")]
    Level(#[from] TileGridError),
    #[error(transparent)]
    Session(#[from] SessionError),
}

pub(crate) struct AppWiring {
    pub(crate) config: LoopConfig,
    pub(crate) scene: Box<dyn Scene>,
    pub(crate) input: ScriptedInput,
}

pub(crate) fn build_app() -> Result<AppWiring, BootstrapError> {
    init_tracing();
    info!("=== Platformer Startup ===");

    let (config_dir, scripts_dir) = match resolve_app_paths() {
        Ok(paths) => {
            info!(root = %paths.root.display(), "app_root_resolved");
            (Some(paths.config_dir), Some(paths.scripts_dir))
        }
        Err(err) => {
            warn!(error = %err, "app_root_unresolved_using_builtin_assets");
            (None, None)
        }
    };

    let game_config = load_game_config(config_dir.as_deref())?;
    let script = load_input_script(scripts_dir.as_deref())?;
    info!(
        steps = script.steps.len(),
        total_frames = script.total_frames(),
        "input_script_ready"
    );

    let session = GameSession::new(&game_config, gameplay::demo_level()?)?;
    let config = LoopConfig {
        realtime: parse_realtime_from_env(),
        max_ticks: parse_max_ticks_from_env(),
        ..LoopConfig::default()
    };

    Ok(AppWiring {
        config,
        scene: Box::new(PlatformerScene::new(session)),
        input: ScriptedInput::new(script),
    })
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .compact()
        .init();
}

fn load_game_config(config_dir: Option<&Path>) -> Result<GameConfig, ConfigError> {
    if let Some(path) = env::var_os(CONFIG_ENV_VAR).map(PathBuf::from) {
        info!(path = %path.display(), "game_config_from_env");
        return GameConfig::load(&path);
    }
    match config_dir.map(|dir| dir.join(CONFIG_FILE)) {
        Some(path) if path.is_file() => {
            info!(path = %path.display(), "game_config_loaded");
            GameConfig::load(&path)
        }
        _ => {
            info!("game_config_defaults");
            Ok(GameConfig::default())
        }
    }
}

fn load_input_script(scripts_dir: Option<&Path>) -> Result<InputScript, InputScriptError> {
    if let Some(path) = env::var_os(INPUT_SCRIPT_ENV_VAR).map(PathBuf::from) {
        info!(path = %path.display(), "input_script_from_env");
        return InputScript::load(&path);
    }
    match scripts_dir.map(|dir| dir.join(DEMO_SCRIPT_FILE)) {
        Some(path) if path.is_file() => {
            info!(path = %path.display(), "input_script_loaded");
            InputScript::load(&path)
        }
        _ => {
            info!("input_script_builtin");
            Ok(builtin_demo_script())
        }
    }
}

fn builtin_demo_script() -> InputScript {
    let step = |frames: u32, actions: &[InputAction]| InputStep {
        frames,
        actions: actions.to_vec(),
    };
    InputScript {
        steps: vec![
            step(60, &[]),
            step(50, &[InputAction::MoveRight]),
            step(20, &[InputAction::Jump]),
            step(30, &[]),
            step(20, &[InputAction::MoveRight, InputAction::Jump]),
            step(240, &[InputAction::MoveRight, InputAction::Run]),
            step(30, &[InputAction::MoveLeft]),
            step(60, &[]),
        ],
    }
}

fn parse_max_ticks_from_env() -> Option<u64> {
    let raw = env::var(MAX_TICKS_ENV_VAR).ok()?;
    match raw.trim().parse::<u64>() {
        Ok(limit) if limit > 0 => Some(limit),
        _ => {
            warn!(var = MAX_TICKS_ENV_VAR, value = %raw, "ignoring_invalid_tick_limit");
            None
        }
    }
}

fn parse_realtime_from_env() -> bool {
    env::var(REALTIME_ENV_VAR)
        .map(|raw| is_truthy(&raw))
        .unwrap_or(false)
}

fn is_truthy(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_script_is_playable() {
        let script = builtin_demo_script();
        assert!(script.total_frames() > 0);
        let raw = serde_json::to_string(&script).expect("serialize");
        assert_eq!(InputScript::from_json_str(&raw).expect("parse"), script);
    }

    #[test]
    fn bundled_demo_script_matches_builtin() {
        let raw = include_str!("../../../../assets/scripts/demo.json");
        let script = InputScript::from_json_str(raw).expect("bundled script");
        assert_eq!(script, builtin_demo_script());
    }

    #[test]
    fn truthy_values() {
        assert!(is_truthy("1"));
        assert!(is_truthy(" TRUE "));
        assert!(!is_truthy("0"));
        assert!(!is_truthy(""));
    }

    #[test]
    fn missing_config_dir_uses_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        if env::var_os(CONFIG_ENV_VAR).is_some() {
            return;
        }
        let config = load_game_config(Some(dir.path())).expect("defaults");
        assert_eq!(config, GameConfig::default());
    }

    #[test]
    fn config_in_config_dir_is_loaded() {
        if env::var_os(CONFIG_ENV_VAR).is_some() {
            return;
        }
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join(CONFIG_FILE), r#"{ "registry_capacity": 9 }"#)
            .expect("write");
        let config = load_game_config(Some(dir.path())).expect("load");
        assert_eq!(config.registry_capacity, 9);
    }

    #[test]
    fn missing_script_dir_uses_builtin() {
        if env::var_os(INPUT_SCRIPT_ENV_VAR).is_some() {
            return;
        }
        let script = load_input_script(None).expect("builtin");
        assert_eq!(script, builtin_demo_script());
    }
}

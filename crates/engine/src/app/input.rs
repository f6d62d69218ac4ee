use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputAction {
    MoveLeft,
    MoveRight,
    Jump,
    Run,
    Quit,
}

const ACTION_COUNT: usize = 5;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct ActionStates {
    down: [bool; ACTION_COUNT],
}

impl ActionStates {
    pub(crate) fn set(&mut self, action: InputAction, is_down: bool) {
        self.down[action.index()] = is_down;
    }

    pub(crate) fn is_down(&self, action: InputAction) -> bool {
        self.down[action.index()]
    }
}

impl InputAction {
    const fn index(self) -> usize {
        match self {
            InputAction::MoveLeft => 0,
            InputAction::MoveRight => 1,
            InputAction::Jump => 2,
            InputAction::Run => 3,
            InputAction::Quit => 4,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputSnapshot {
    quit_requested: bool,
    actions: ActionStates,
}

impl InputSnapshot {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_actions(actions: &[InputAction]) -> Self {
        actions
            .iter()
            .fold(Self::empty(), |snapshot, action| {
                snapshot.with_action_down(*action, true)
            })
    }

    pub fn quit_requested(&self) -> bool {
        self.quit_requested || self.actions.is_down(InputAction::Quit)
    }

    pub fn is_down(&self, action: InputAction) -> bool {
        self.actions.is_down(action)
    }

    pub fn with_action_down(mut self, action: InputAction, is_down: bool) -> Self {
        self.actions.set(action, is_down);
        self
    }

    pub fn with_quit_requested(mut self, quit_requested: bool) -> Self {
        self.quit_requested = quit_requested;
        self
    }
}

pub trait InputSource {
    fn snapshot_for_tick(&mut self) -> InputSnapshot;
}

#[derive(Debug, Error)]
pub enum InputScriptError {
    #[error("failed to read input script '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("parse input script json at {path}: {message}")]
    Parse { path: String, message: String },
    #[error("input script has no frames")]
    Empty,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InputStep {
    pub frames: u32,
    #[serde(default)]
    pub actions: Vec<InputAction>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InputScript {
    pub steps: Vec<InputStep>,
}

impl InputScript {
    pub fn load(path: &Path) -> Result<Self, InputScriptError> {
        let raw = fs::read_to_string(path).map_err(|source| InputScriptError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&raw)
    }

    pub fn from_json_str(raw: &str) -> Result<Self, InputScriptError> {
        let mut deserializer = serde_json::Deserializer::from_str(raw);
        let script: Self = serde_path_to_error::deserialize(&mut deserializer).map_err(|error| {
            let path = error.path().to_string();
            InputScriptError::Parse {
                path,
                message: error.into_inner().to_string(),
            }
        })?;
        if script.total_frames() == 0 {
            return Err(InputScriptError::Empty);
        }
        Ok(script)
    }

    pub fn total_frames(&self) -> u64 {
        self.steps.iter().map(|step| u64::from(step.frames)).sum()
    }
}

#[derive(Debug, Clone)]
pub struct ScriptedInput {
    script: InputScript,
    step_index: usize,
    frames_into_step: u32,
}

impl ScriptedInput {
    pub fn new(script: InputScript) -> Self {
        Self {
            script,
            step_index: 0,
            frames_into_step: 0,
        }
    }

    pub fn is_exhausted(&self) -> bool {
        let remaining_in_step = self
            .script
            .steps
            .get(self.step_index)
            .map(|step| step.frames.saturating_sub(self.frames_into_step))
            .unwrap_or(0);
        remaining_in_step == 0
            && self
                .script
                .steps
                .iter()
                .skip(self.step_index + 1)
                .all(|step| step.frames == 0)
    }
}

impl InputSource for ScriptedInput {
    fn snapshot_for_tick(&mut self) -> InputSnapshot {
        while let Some(step) = self.script.steps.get(self.step_index) {
            if self.frames_into_step < step.frames {
                self.frames_into_step += 1;
                return InputSnapshot::from_actions(&step.actions);
            }
            self.step_index += 1;
            self.frames_into_step = 0;
        }
        InputSnapshot::empty().with_quit_requested(true)
    }
}

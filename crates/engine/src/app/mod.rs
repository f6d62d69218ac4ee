mod input;
mod loop_runner;
mod metrics;
mod scene;
mod sprites;
mod tiles;

pub use input::{
    InputAction, InputScript, InputScriptError, InputSnapshot, InputSource, InputStep,
    ScriptedInput,
};
pub use loop_runner::{run_app, AppError, LoopConfig, LoopSummary, StopReason};
pub use metrics::LoopMetricsSnapshot;
pub use scene::{Scene, SceneCommand};
pub use sprites::{
    SpriteFlags, SpriteId, SpritePool, SpriteState, SpritesetError, SpritesetId, SpritesetInfo,
};
pub use tiles::{
    Scroll, TileGrid, TileGridError, TileInfo, TileType, TileTypeTable, TileWorld, TILE_SIZE,
};

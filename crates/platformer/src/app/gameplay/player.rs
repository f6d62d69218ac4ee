use engine::fixed::{from_fixed, to_fixed, to_fixed_f32};
use engine::{
    InputAction, InputSnapshot, SpriteFlags, SpriteId, SpritePool, SpritesetId, TileInfo,
    TileType, TileWorld, TILE_SIZE,
};
use tracing::{debug, trace};

use super::actor::{Actor, ActorBase, ActorStatus, FrameContext};
use super::config::{EffectsConfig, PlayerTuning};
use super::effects::{Bumper, Collect, EffectAssets};

const TILE_MASK: i32 = !(TILE_SIZE - 1);

const PROBE_X_OFFSETS: [i32; 2] = [4, 12];
const PROBE_Y_OFFSETS: [i32; 5] = [0, 8, 16, 24, 31];

const WALK_ACCEL_DIVISOR: u32 = 6;
const RUN_ACCEL_DIVISOR: u32 = 4;

const PICTURE_IDLE: u16 = 0;
const PICTURE_JUMP: u16 = 7;
const PICTURE_FALL: u16 = 8;
const PICTURE_BRAKE: u16 = 9;
const RUN_CYCLE_PICTURES: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Orientation {
    Right,
    Left,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PlayerPhysics {
    pub(crate) run_speed: i32,
    pub(crate) jump_speed: i32,
    pub(crate) fall_speed: i32,
    pub(crate) accel: i32,
    pub(crate) gravity: i32,
    pub(crate) jump_frames: u32,
}

impl PlayerPhysics {
    pub(crate) fn from_tuning(tuning: &PlayerTuning) -> Self {
        let run_speed = to_fixed_f32(tuning.run_speed_px);
        let fall_speed = to_fixed_f32(tuning.fall_speed_px);
        Self {
            run_speed,
            jump_speed: to_fixed_f32(tuning.jump_speed_px),
            fall_speed,
            accel: run_speed / tuning.time_move.max(1) as i32,
            gravity: fall_speed / tuning.time_fall.max(1) as i32,
            jump_frames: tuning.time_jump,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct CameraRule {
    pub(crate) forward_margin: i32,
    pub(crate) back_margin: i32,
    pub(crate) viewport_width: i32,
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct PlayerSetup {
    pub(crate) spriteset: SpritesetId,
    pub(crate) spawn_x: i32,
    pub(crate) spawn_y: i32,
    pub(crate) physics: PlayerPhysics,
    pub(crate) camera: CameraRule,
    pub(crate) effects: EffectsConfig,
    pub(crate) effect_assets: EffectAssets,
}

#[derive(Debug)]
pub(crate) struct Player {
    base: ActorBase,
    x: i32,
    y: i32,
    x_speed: i32,
    y_speed: i32,
    target_speed: i32,
    accel_divisor: u32,
    orientation: Orientation,
    on_ground: bool,
    jumping: bool,
    jump_start_frame: u32,
    width: i32,
    height: i32,
    sprite: SpriteId,
    flags: SpriteFlags,
    physics: PlayerPhysics,
    camera: CameraRule,
    effects: EffectsConfig,
    effect_assets: EffectAssets,
}

impl Player {
    pub(crate) fn spawn(sprites: &mut SpritePool, setup: PlayerSetup) -> Option<Self> {
        let (width, height) = sprites
            .spriteset(setup.spriteset)
            .map(|info| (info.picture_width, info.picture_height))?;
        let sprite = sprites.acquire()?;
        let flags = SpriteFlags::default();
        sprites.setup(sprite, setup.spriteset, flags);
        sprites.set_position(sprite, setup.spawn_x, setup.spawn_y);
        Some(Self {
            base: ActorBase::at(setup.spawn_x, setup.spawn_y),
            x: to_fixed(setup.spawn_x),
            y: to_fixed(setup.spawn_y),
            x_speed: 0,
            y_speed: 0,
            target_speed: 0,
            accel_divisor: WALK_ACCEL_DIVISOR,
            orientation: Orientation::Right,
            on_ground: true,
            jumping: false,
            jump_start_frame: 0,
            width,
            height,
            sprite,
            flags,
            physics: setup.physics,
            camera: setup.camera,
            effects: setup.effects,
            effect_assets: setup.effect_assets,
        })
    }

    pub(crate) fn base(&self) -> &ActorBase {
        &self.base
    }

    pub(crate) fn x_speed(&self) -> i32 {
        self.x_speed
    }

    pub(crate) fn y_speed(&self) -> i32 {
        self.y_speed
    }

    pub(crate) fn on_ground(&self) -> bool {
        self.on_ground
    }

    #[cfg(test)]
    pub(crate) fn jumping(&self) -> bool {
        self.jumping
    }

    #[cfg(test)]
    pub(crate) fn jump_start_frame(&self) -> u32 {
        self.jump_start_frame
    }

    #[cfg(test)]
    pub(crate) fn orientation(&self) -> Orientation {
        self.orientation
    }

    #[cfg(test)]
    pub(crate) fn sprite(&self) -> SpriteId {
        self.sprite
    }

    pub(crate) fn update(&mut self, ctx: &mut FrameContext<'_>) -> ActorStatus {
        self.base.advance_frame();
        let input = *ctx.input;
        self.steer(&input);
        self.jump_or_fall(&input);

        let old_x = from_fixed(self.x);
        let old_y = from_fixed(self.y);
        self.x += self.x_speed;
        self.y += self.y_speed;
        let moved_x = from_fixed(self.x);
        let moved_y = from_fixed(self.y);

        let x = self.clamp_to_world(moved_x, ctx.world.width());
        let y = self.resolve_vertical(ctx, x, moved_y, old_y);
        let x = self.resolve_horizontal(ctx, x, y, old_x);

        if x != moved_x {
            self.x = to_fixed(x);
        }
        if y != moved_y {
            self.y = to_fixed(y);
        }
        self.base.x = x;
        self.base.y = y;

        self.follow_with_camera(ctx.world, x);
        self.present(ctx, x, y);
        ActorStatus::Alive
    }

    pub(crate) fn on_remove(&mut self, sprites: &mut SpritePool) {
        sprites.disable(self.sprite);
    }

    fn steer(&mut self, input: &InputSnapshot) {
        if self.on_ground {
            if input.is_down(InputAction::Run) {
                self.target_speed = self.physics.run_speed;
                self.accel_divisor = RUN_ACCEL_DIVISOR;
            } else {
                self.target_speed = self.physics.run_speed / 2;
                self.accel_divisor = WALK_ACCEL_DIVISOR;
            }
        }

        let accel = self.physics.accel;
        if input.is_down(InputAction::MoveRight) {
            self.orientation = Orientation::Right;
            self.x_speed = (self.x_speed + accel).min(self.target_speed);
        } else if input.is_down(InputAction::MoveLeft) {
            self.orientation = Orientation::Left;
            self.x_speed = (self.x_speed - accel).max(-self.target_speed);
        } else if self.on_ground {
            if self.x_speed > 0 {
                self.x_speed = (self.x_speed - accel).max(0);
            } else if self.x_speed < 0 {
                self.x_speed = (self.x_speed + accel).min(0);
            }
        }
    }

    fn jump_or_fall(&mut self, input: &InputSnapshot) {
        let frame = self.base.frame;
        if input.is_down(InputAction::Jump) {
            if !self.jumping && self.on_ground {
                self.jumping = true;
                self.jump_start_frame = frame;
                trace!(frame, "jump_started");
            }
        } else {
            self.jumping = false;
        }

        if self.jumping && frame.wrapping_sub(self.jump_start_frame) < self.physics.jump_frames {
            self.y_speed = -self.physics.jump_speed;
        } else if !self.on_ground {
            self.y_speed = (self.y_speed + self.physics.gravity).min(self.physics.fall_speed);
        }
    }

    fn clamp_to_world(&mut self, x: i32, world_width: i32) -> i32 {
        let max_x = world_width - self.width;
        if x < 0 {
            self.x_speed = 0;
            0
        } else if x > max_x {
            self.x_speed = 0;
            max_x
        } else {
            x
        }
    }

    // Head probes while rising, feet probes otherwise. Each probe sees the
    // position left by the one before it.
    fn resolve_vertical(
        &mut self,
        ctx: &mut FrameContext<'_>,
        x: i32,
        mut y: i32,
        old_y: i32,
    ) -> i32 {
        self.on_ground = false;
        if y < old_y {
            for offset in PROBE_X_OFFSETS {
                let tile = ctx.world.tile_at(x + offset, y);
                match tile.tile_type {
                    TileType::Solid | TileType::Question => {
                        y = (y + TILE_SIZE) & TILE_MASK;
                        self.y_speed = 0;
                        self.jump_start_frame = 0;
                        if tile.tile_type == TileType::Question {
                            self.bump_block(ctx, tile);
                        }
                    }
                    TileType::Coin => self.collect_coin(ctx, tile),
                    _ => {}
                }
            }
        } else {
            for offset in PROBE_X_OFFSETS {
                let tile = ctx.world.tile_at(x + offset, y + self.height);
                match tile.tile_type {
                    TileType::Solid | TileType::OneWay | TileType::Question => {
                        y &= TILE_MASK;
                        self.on_ground = true;
                        self.y_speed = 0;
                    }
                    TileType::Coin => self.collect_coin(ctx, tile),
                    _ => {}
                }
            }
        }
        y
    }

    fn resolve_horizontal(
        &mut self,
        ctx: &mut FrameContext<'_>,
        mut x: i32,
        y: i32,
        old_x: i32,
    ) -> i32 {
        if x < old_x {
            for offset in PROBE_Y_OFFSETS {
                let tile = ctx.world.tile_at(x, y + offset);
                match tile.tile_type {
                    TileType::Solid | TileType::Question => {
                        x = (x + TILE_SIZE) & TILE_MASK;
                        self.x_speed = 0;
                    }
                    TileType::Coin => self.collect_coin(ctx, tile),
                    _ => {}
                }
            }
        } else if x > old_x {
            for offset in PROBE_Y_OFFSETS {
                let tile = ctx.world.tile_at(x + self.width, y + offset);
                match tile.tile_type {
                    TileType::Solid | TileType::Question => {
                        x &= TILE_MASK;
                        self.x_speed = 0;
                    }
                    TileType::Coin => self.collect_coin(ctx, tile),
                    _ => {}
                }
            }
        }
        x
    }

    fn bump_block(&self, ctx: &mut FrameContext<'_>, tile: TileInfo) {
        let resting = self.effects.bumped_tile_index;
        ctx.world.set_tile(tile.row, tile.col, resting);
        ctx.score.award_score(self.effects.bump_score);
        debug!(row = tile.row, col = tile.col, "question_block_bumped");
        match Bumper::spawn(ctx, &self.effect_assets, tile.row, tile.col, resting) {
            Some(bumper) => ctx.spawn(Actor::Bumper(bumper)),
            None => trace!(row = tile.row, col = tile.col, "bumper_dropped_no_sprite"),
        }
    }

    fn collect_coin(&self, ctx: &mut FrameContext<'_>, tile: TileInfo) {
        ctx.world.clear_tile(tile.row, tile.col);
        ctx.score.award_coin();
        debug!(row = tile.row, col = tile.col, "coin_collected");
        let (x, y) = (tile.col * TILE_SIZE, tile.row * TILE_SIZE);
        match Collect::spawn(ctx, &self.effect_assets, x, y) {
            Some(collect) => ctx.spawn(Actor::Collect(collect)),
            None => trace!(row = tile.row, col = tile.col, "collect_dropped_no_sprite"),
        }
    }

    fn follow_with_camera(&self, world: &mut dyn TileWorld, x: i32) {
        let mut scroll = world.scroll();
        if self.x_speed > 0 {
            if x - scroll.x > self.camera.forward_margin {
                scroll.x = x - self.camera.forward_margin;
            }
            let max_scroll = world.width() - self.camera.viewport_width;
            if scroll.x > max_scroll {
                scroll.x = max_scroll;
            }
        } else if self.x_speed < 0 {
            if x - scroll.x < self.camera.back_margin {
                scroll.x = x - self.camera.back_margin;
            }
            if scroll.x < 0 {
                scroll.x = 0;
            }
        }
        world.set_scroll(scroll);
    }

    fn present(&mut self, ctx: &mut FrameContext<'_>, x: i32, y: i32) {
        match self.orientation {
            Orientation::Right => self.flags.flip_x = false,
            Orientation::Left => self.flags.flip_x = true,
        }
        let scroll = ctx.world.scroll();
        ctx.sprites.set_flags(self.sprite, self.flags);
        ctx.sprites.set_position(self.sprite, x - scroll.x, y - scroll.y);
        ctx.sprites.set_picture(self.sprite, self.picture());
    }

    fn picture(&self) -> u16 {
        if self.x_speed == 0 && self.y_speed == 0 {
            return PICTURE_IDLE;
        }
        if self.y_speed < 0 {
            return PICTURE_JUMP;
        }
        if self.y_speed > 0 {
            return PICTURE_FALL;
        }
        let with_motion = match self.orientation {
            Orientation::Right => self.x_speed > 0,
            Orientation::Left => self.x_speed < 0,
        };
        if with_motion {
            ((self.base.frame / self.accel_divisor) % RUN_CYCLE_PICTURES) as u16
        } else {
            PICTURE_BRAKE
        }
    }
}

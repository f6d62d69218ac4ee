use engine::{Scroll, SpriteFlags, SpriteId, SpritePool, SpritesetId, TILE_SIZE};

use super::actor::{ActorBase, ActorStatus, FrameContext};

const BUMP_OFFSETS: [i32; 7] = [1, 2, 3, 4, 3, 2, 1];
pub(crate) const BUMP_FRAMES: u32 = BUMP_OFFSETS.len() as u32;
pub(crate) const COLLECT_FRAMES: u32 = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct EffectAssets {
    pub(crate) spriteset: SpritesetId,
    pub(crate) bump_picture: u16,
    pub(crate) collect_first_picture: u16,
}

fn acquire_effect_sprite(sprites: &mut SpritePool, spriteset: SpritesetId) -> Option<SpriteId> {
    let sprite = sprites.acquire()?;
    sprites.setup(sprite, spriteset, SpriteFlags::default());
    Some(sprite)
}

#[derive(Debug)]
pub(crate) struct Bumper {
    base: ActorBase,
    row: i32,
    col: i32,
    resting_index: u16,
    sprite: SpriteId,
}

impl Bumper {
    pub(crate) fn spawn(
        ctx: &mut FrameContext<'_>,
        assets: &EffectAssets,
        row: i32,
        col: i32,
        resting_index: u16,
    ) -> Option<Self> {
        let scroll = ctx.world.scroll();
        Self::with_sprite(ctx.sprites, assets, row, col, resting_index, scroll)
    }

    pub(crate) fn with_sprite(
        sprites: &mut SpritePool,
        assets: &EffectAssets,
        row: i32,
        col: i32,
        resting_index: u16,
        scroll: Scroll,
    ) -> Option<Self> {
        let sprite = acquire_effect_sprite(sprites, assets.spriteset)?;
        sprites.set_picture(sprite, assets.bump_picture);
        let bumper = Self {
            base: ActorBase::at(col * TILE_SIZE, row * TILE_SIZE),
            row,
            col,
            resting_index,
            sprite,
        };
        bumper.place(sprites, scroll);
        Some(bumper)
    }

    #[cfg(test)]
    pub(crate) fn base(&self) -> &ActorBase {
        &self.base
    }

    #[cfg(test)]
    pub(crate) fn sprite(&self) -> SpriteId {
        self.sprite
    }

    pub(crate) fn update(&mut self, ctx: &mut FrameContext<'_>) -> ActorStatus {
        self.base.advance_frame();
        if self.base.frame < BUMP_FRAMES {
            self.place(ctx.sprites, ctx.world.scroll());
            return ActorStatus::Alive;
        }
        ctx.world.set_tile(self.row, self.col, self.resting_index);
        ActorStatus::Finished
    }

    pub(crate) fn on_remove(&mut self, sprites: &mut SpritePool) {
        sprites.disable(self.sprite);
    }

    fn place(&self, sprites: &mut SpritePool, scroll: Scroll) {
        let lift = BUMP_OFFSETS[self.base.frame as usize % BUMP_OFFSETS.len()];
        sprites.set_position(
            self.sprite,
            self.base.x - scroll.x,
            self.base.y - lift - scroll.y,
        );
    }
}

#[derive(Debug)]
pub(crate) struct Collect {
    base: ActorBase,
    first_picture: u16,
    sprite: SpriteId,
}

impl Collect {
    pub(crate) fn spawn(
        ctx: &mut FrameContext<'_>,
        assets: &EffectAssets,
        x: i32,
        y: i32,
    ) -> Option<Self> {
        let scroll = ctx.world.scroll();
        Self::with_sprite(ctx.sprites, assets, x, y, scroll)
    }

    pub(crate) fn with_sprite(
        sprites: &mut SpritePool,
        assets: &EffectAssets,
        x: i32,
        y: i32,
        scroll: Scroll,
    ) -> Option<Self> {
        let sprite = acquire_effect_sprite(sprites, assets.spriteset)?;
        let collect = Self {
            base: ActorBase::at(x, y),
            first_picture: assets.collect_first_picture,
            sprite,
        };
        collect.place(sprites, scroll);
        Some(collect)
    }

    #[cfg(test)]
    pub(crate) fn base(&self) -> &ActorBase {
        &self.base
    }

    #[cfg(test)]
    pub(crate) fn sprite(&self) -> SpriteId {
        self.sprite
    }

    pub(crate) fn update(&mut self, ctx: &mut FrameContext<'_>) -> ActorStatus {
        self.base.advance_frame();
        if self.base.frame < COLLECT_FRAMES {
            self.place(ctx.sprites, ctx.world.scroll());
            return ActorStatus::Alive;
        }
        ActorStatus::Finished
    }

    pub(crate) fn on_remove(&mut self, sprites: &mut SpritePool) {
        sprites.disable(self.sprite);
    }

    fn place(&self, sprites: &mut SpritePool, scroll: Scroll) {
        sprites.set_picture(self.sprite, self.first_picture + (self.base.frame >> 2) as u16);
        sprites.set_position(self.sprite, self.base.x - scroll.x, self.base.y - scroll.y);
    }
}

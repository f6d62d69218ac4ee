use engine::{
    InputSnapshot, Scene, SceneCommand, Scroll, SpritePool, SpritesetError, TileGrid, TileWorld,
};
use thiserror::Error;
use tracing::{info, warn};

use super::actor::{Actor, ActorId, ActorKind, ActorRegistry, FrameContext, RegistryError};
use super::config::{GameConfig, HudConfig};
use super::effects::EffectAssets;
use super::hud::Hud;
use super::player::{CameraRule, Player, PlayerPhysics, PlayerSetup};

const PLAYER_SPRITESET: &str = "mario";
const OBJECTS_SPRITESET: &str = "objects";
const PLAYER_PICTURE_SIZE: (i32, i32) = (16, 32);
const PLAYER_PICTURE_COUNT: u16 = 10;
const OBJECT_PICTURE_SIZE: (i32, i32) = (16, 16);
const OBJECT_PICTURE_COUNT: u16 = 12;
const BACKGROUND_SCROLL_Y: i32 = 80;

#[derive(Debug, Error)]
pub(crate) enum SessionError {
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error(transparent)]
    Spriteset(#[from] SpritesetError),
    #[error("no sprite available for the player")]
    PlayerSprite,
    #[error("actor registry has no slot for the player")]
    PlayerSlot,
}

#[derive(Debug)]
pub(crate) struct GameSession {
    world: TileGrid,
    stage: TileGrid,
    sprites: SpritePool,
    registry: ActorRegistry,
    hud: Hud,
    hud_config: HudConfig,
    player_setup: PlayerSetup,
    player_id: ActorId,
    initial_scroll: Scroll,
    background_scroll: Scroll,
    frame: u64,
}

impl GameSession {
    pub(crate) fn new(config: &GameConfig, mut world: TileGrid) -> Result<Self, SessionError> {
        let mut sprites = SpritePool::new(config.sprite_capacity);
        let player_set = sprites.register_spriteset(
            PLAYER_SPRITESET,
            PLAYER_PICTURE_SIZE.0,
            PLAYER_PICTURE_SIZE.1,
            PLAYER_PICTURE_COUNT,
        )?;
        let objects_set = sprites.register_spriteset(
            OBJECTS_SPRITESET,
            OBJECT_PICTURE_SIZE.0,
            OBJECT_PICTURE_SIZE.1,
            OBJECT_PICTURE_COUNT,
        )?;
        let mut registry = ActorRegistry::new(config.registry_capacity)?;
        world.set_scroll(config.initial_scroll);

        let setup = PlayerSetup {
            spriteset: player_set,
            spawn_x: config.player.spawn_x,
            spawn_y: config.player.spawn_y,
            physics: PlayerPhysics::from_tuning(&config.player),
            camera: CameraRule {
                forward_margin: config.player.camera_forward_margin,
                back_margin: config.player.camera_back_margin,
                viewport_width: config.viewport.width,
            },
            effects: config.effects,
            effect_assets: EffectAssets {
                spriteset: objects_set,
                bump_picture: config.effects.bump_picture,
                collect_first_picture: config.effects.collect_first_picture,
            },
        };
        let player_id = spawn_player(&mut registry, &mut sprites, setup)?;

        info!(
            world_width = world.width(),
            world_height = world.height(),
            registry_capacity = registry.capacity(),
            sprite_capacity = sprites.capacity(),
            "session_started"
        );

        Ok(Self {
            stage: world.clone(),
            world,
            sprites,
            registry,
            hud: Hud::new(&config.hud),
            hud_config: config.hud,
            player_setup: setup,
            player_id,
            initial_scroll: config.initial_scroll,
            background_scroll: background_for(config.initial_scroll),
            frame: 0,
        })
    }

    pub(crate) fn is_running(&self) -> bool {
        self.registry.is_active()
    }

    pub(crate) fn restart(&mut self) -> Result<(), SessionError> {
        let capacity = self.registry.capacity();
        self.registry.recreate(capacity)?;
        self.world = self.stage.clone();
        self.world.set_scroll(self.initial_scroll);
        self.hud = Hud::new(&self.hud_config);
        self.background_scroll = background_for(self.initial_scroll);
        self.frame = 0;
        self.player_id = spawn_player(&mut self.registry, &mut self.sprites, self.player_setup)?;
        info!(registry_capacity = capacity, "session_restarted");
        Ok(())
    }

    pub(crate) fn update(&mut self, input: &InputSnapshot) {
        self.frame += 1;
        self.hud.tick();
        self.background_scroll = background_for(self.world.scroll());

        let mut ctx = FrameContext::new(&mut self.world, &mut self.sprites, input, &mut self.hud);
        self.registry.update_all(&mut ctx);
    }

    pub(crate) fn shutdown(&mut self) {
        if self.registry.is_active() {
            self.registry.teardown_all(&mut self.sprites);
        }
    }

    pub(crate) fn frame(&self) -> u64 {
        self.frame
    }

    #[cfg(test)]
    pub(crate) fn world(&self) -> &TileGrid {
        &self.world
    }

    pub(crate) fn sprites(&self) -> &SpritePool {
        &self.sprites
    }

    #[cfg(test)]
    pub(crate) fn registry(&self) -> &ActorRegistry {
        &self.registry
    }

    pub(crate) fn hud(&self) -> &Hud {
        &self.hud
    }

    #[cfg(test)]
    pub(crate) fn background_scroll(&self) -> Scroll {
        self.background_scroll
    }

    pub(crate) fn player(&self) -> Option<&Player> {
        self.registry.get(self.player_id).and_then(Actor::as_player)
    }

    fn log_summary(&self) {
        let (player_x, player_y, on_ground) = self
            .player()
            .map(|player| (player.base().x, player.base().y, player.on_ground()))
            .unwrap_or_default();
        let live_effects = self
            .registry
            .iter()
            .filter(|(_, actor)| actor.kind() != ActorKind::Player)
            .count();
        info!(
            frames = self.frame,
            coins = self.hud.coins(),
            score = self.hud.score(),
            time = self.hud.time(),
            lives = self.hud.lives(),
            player_x,
            player_y,
            on_ground,
            live_actors = self.registry.live_count(),
            live_effects,
            background_x = self.background_scroll.x,
            active_sprites = self.sprites.active_count(),
            "session_summary"
        );
    }
}

fn spawn_player(
    registry: &mut ActorRegistry,
    sprites: &mut SpritePool,
    setup: PlayerSetup,
) -> Result<ActorId, SessionError> {
    let player = Player::spawn(sprites, setup).ok_or(SessionError::PlayerSprite)?;
    match registry.register(Actor::Player(player)) {
        Ok(id) => Ok(id),
        Err(mut rejected) => {
            rejected.on_remove(sprites);
            Err(SessionError::PlayerSlot)
        }
    }
}

fn background_for(scroll: Scroll) -> Scroll {
    Scroll {
        x: scroll.x / 2,
        y: BACKGROUND_SCROLL_Y,
    }
}

pub(crate) struct PlatformerScene {
    session: GameSession,
}

impl PlatformerScene {
    pub(crate) fn new(session: GameSession) -> Self {
        Self { session }
    }
}

impl Scene for PlatformerScene {
    fn load(&mut self) {
        if !self.session.is_running() {
            if let Err(err) = self.session.restart() {
                warn!(error = %err, "platformer_scene_restart_failed");
            }
        }
        info!(frame = self.session.frame(), "platformer_scene_loaded");
    }

    fn update(&mut self, input: &InputSnapshot) -> SceneCommand {
        self.session.update(input);
        SceneCommand::None
    }

    fn unload(&mut self) {
        self.session.log_summary();
        self.session.shutdown();
        info!(
            active_sprites = self.session.sprites().active_count(),
            "platformer_scene_unloaded"
        );
    }

    fn debug_title(&self) -> Option<String> {
        let hud = self.session.hud();
        Some(format!(
            "coins {} | score {} | time {}",
            hud.coins(),
            hud.score(),
            hud.time()
        ))
    }
}

use std::mem;

use engine::{InputSnapshot, SpritePool, TileWorld};
use thiserror::Error;
use tracing::{info, trace};

use super::effects::{Bumper, Collect};
use super::hud::ScoreSink;
use super::player::Player;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct ActorId {
    slot: u32,
    generation: u32,
}

impl ActorId {
    pub(crate) fn slot(self) -> usize {
        self.slot as usize
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct ActorBase {
    pub(crate) frame: u32,
    pub(crate) x: i32,
    pub(crate) y: i32,
}

impl ActorBase {
    pub(crate) fn at(x: i32, y: i32) -> Self {
        Self { frame: 0, x, y }
    }

    pub(crate) fn advance_frame(&mut self) {
        self.frame = self.frame.wrapping_add(1);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ActorStatus {
    Alive,
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ActorKind {
    Player,
    Bumper,
    Collect,
}

#[derive(Debug)]
pub(crate) enum Actor {
    Player(Player),
    Bumper(Bumper),
    Collect(Collect),
}

impl Actor {
    pub(crate) fn kind(&self) -> ActorKind {
        match self {
            Self::Player(_) => ActorKind::Player,
            Self::Bumper(_) => ActorKind::Bumper,
            Self::Collect(_) => ActorKind::Collect,
        }
    }

    #[cfg(test)]
    pub(crate) fn base(&self) -> &ActorBase {
        match self {
            Self::Player(player) => player.base(),
            Self::Bumper(bumper) => bumper.base(),
            Self::Collect(collect) => collect.base(),
        }
    }

    pub(crate) fn as_player(&self) -> Option<&Player> {
        match self {
            Self::Player(player) => Some(player),
            _ => None,
        }
    }

    fn update(&mut self, ctx: &mut FrameContext<'_>) -> ActorStatus {
        match self {
            Self::Player(player) => player.update(ctx),
            Self::Bumper(bumper) => bumper.update(ctx),
            Self::Collect(collect) => collect.update(ctx),
        }
    }

    pub(crate) fn on_remove(&mut self, sprites: &mut SpritePool) {
        match self {
            Self::Player(player) => player.on_remove(sprites),
            Self::Bumper(bumper) => bumper.on_remove(sprites),
            Self::Collect(collect) => collect.on_remove(sprites),
        }
    }
}

pub(crate) struct FrameContext<'a> {
    pub(crate) world: &'a mut dyn TileWorld,
    pub(crate) sprites: &'a mut SpritePool,
    pub(crate) input: &'a InputSnapshot,
    pub(crate) score: &'a mut dyn ScoreSink,
    spawns: Vec<Actor>,
}

impl<'a> FrameContext<'a> {
    pub(crate) fn new(
        world: &'a mut dyn TileWorld,
        sprites: &'a mut SpritePool,
        input: &'a InputSnapshot,
        score: &'a mut dyn ScoreSink,
    ) -> Self {
        Self {
            world,
            sprites,
            input,
            score,
            spawns: Vec::new(),
        }
    }

    pub(crate) fn spawn(&mut self, actor: Actor) {
        self.spawns.push(actor);
    }

    #[cfg(test)]
    pub(crate) fn take_spawns(&mut self) -> Vec<Actor> {
        mem::take(&mut self.spawns)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub(crate) enum RegistryError {
    #[error("actor registry capacity must be greater than zero")]
    ZeroCapacity,
    #[error("actor registry is still active with {live} live actors; tear it down first")]
    StillActive { live: usize },
}

#[derive(Debug)]
enum SlotState {
    Free,
    Occupied(Actor),
    // Freed during the current pass; reclaimed before the pass returns.
    Tombstone,
}

#[derive(Debug)]
struct Slot {
    generation: u32,
    state: SlotState,
}

impl Slot {
    fn free() -> Self {
        Self {
            generation: 0,
            state: SlotState::Free,
        }
    }
}

#[derive(Debug)]
pub(crate) struct ActorRegistry {
    slots: Vec<Slot>,
    active: bool,
}

impl ActorRegistry {
    pub(crate) fn new(capacity: usize) -> Result<Self, RegistryError> {
        if capacity == 0 {
            return Err(RegistryError::ZeroCapacity);
        }
        Ok(Self {
            slots: (0..capacity).map(|_| Slot::free()).collect(),
            active: true,
        })
    }

    pub(crate) fn recreate(&mut self, capacity: usize) -> Result<(), RegistryError> {
        if self.active {
            return Err(RegistryError::StillActive {
                live: self.live_count(),
            });
        }
        *self = Self::new(capacity)?;
        Ok(())
    }

    pub(crate) fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub(crate) fn is_active(&self) -> bool {
        self.active
    }

    pub(crate) fn live_count(&self) -> usize {
        self.slots
            .iter()
            .filter(|slot| matches!(slot.state, SlotState::Occupied(_)))
            .count()
    }

    pub(crate) fn register(&mut self, actor: Actor) -> Result<ActorId, Actor> {
        if !self.active {
            return Err(actor);
        }
        let Some(index) = self
            .slots
            .iter()
            .position(|slot| matches!(slot.state, SlotState::Free))
        else {
            return Err(actor);
        };
        let slot = &mut self.slots[index];
        slot.state = SlotState::Occupied(actor);
        Ok(ActorId {
            slot: index as u32,
            generation: slot.generation,
        })
    }

    pub(crate) fn deregister(&mut self, id: ActorId, sprites: &mut SpritePool) -> bool {
        let Some(slot) = self.slots.get_mut(id.slot()) else {
            return false;
        };
        if slot.generation != id.generation || !matches!(slot.state, SlotState::Occupied(_)) {
            return false;
        }
        if let SlotState::Occupied(mut actor) = mem::replace(&mut slot.state, SlotState::Free) {
            actor.on_remove(sprites);
        }
        slot.generation = slot.generation.wrapping_add(1);
        true
    }

    pub(crate) fn get(&self, id: ActorId) -> Option<&Actor> {
        let slot = self.slots.get(id.slot())?;
        match &slot.state {
            SlotState::Occupied(actor) if slot.generation == id.generation => Some(actor),
            _ => None,
        }
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (ActorId, &Actor)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| match &slot.state {
                SlotState::Occupied(actor) => Some((
                    ActorId {
                        slot: index as u32,
                        generation: slot.generation,
                    },
                    actor,
                )),
                _ => None,
            })
    }

    pub(crate) fn update_all(&mut self, ctx: &mut FrameContext<'_>) {
        for (index, slot) in self.slots.iter_mut().enumerate() {
            let SlotState::Occupied(actor) = &mut slot.state else {
                continue;
            };
            if actor.update(ctx) == ActorStatus::Alive {
                continue;
            }
            if let SlotState::Occupied(mut actor) =
                mem::replace(&mut slot.state, SlotState::Tombstone)
            {
                trace!(slot = index, kind = ?actor.kind(), "actor_finished");
                actor.on_remove(ctx.sprites);
            }
            slot.generation = slot.generation.wrapping_add(1);
        }

        self.reclaim_tombstones();

        for actor in mem::take(&mut ctx.spawns) {
            let kind = actor.kind();
            match self.register(actor) {
                Ok(id) => trace!(slot = id.slot(), kind = ?kind, "actor_spawned"),
                Err(mut rejected) => {
                    trace!(kind = ?kind, "actor_spawn_dropped_registry_full");
                    rejected.on_remove(ctx.sprites);
                }
            }
        }
    }

    pub(crate) fn teardown_all(&mut self, sprites: &mut SpritePool) {
        let live: Vec<ActorId> = self.iter().map(|(id, _)| id).collect();
        let released = live
            .into_iter()
            .filter(|&id| self.deregister(id, sprites))
            .count();
        self.active = false;
        info!(released, "actor_registry_teardown");
    }

    fn reclaim_tombstones(&mut self) {
        for slot in &mut self.slots {
            if matches!(slot.state, SlotState::Tombstone) {
                slot.state = SlotState::Free;
            }
        }
    }
}

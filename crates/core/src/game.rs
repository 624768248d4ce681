//! Top-level simulation driver.
//! This module exists to own the world, the turn schedule and the random source together.
//! It does not own per-system rules; those live in the submodules and take the world explicitly.

use crate::config::SimConfig;
use crate::dice::{Dice, SeededDice};
use crate::snapshot::{SNAPSHOT_FORMAT_VERSION, Snapshot};
use crate::state::{Actor, AiRecord, DeathPolicy, Fighter, Item, Map, World};
use crate::types::*;

mod advance;
pub mod ai;
mod bootstrap;
pub mod combat;
pub mod effects;
mod hash;
pub mod items;
pub mod noise;
pub mod pathfinding;
pub mod perception;
mod player;
pub mod schedule;
#[cfg(test)]
pub(crate) mod test_support;

pub use schedule::{BucketReport, Schedule, TurnResult};

pub struct Game {
    seed: u64,
    dice: SeededDice,
    world: World,
    schedule: Schedule<EntityId>,
    // Set when the scheduler yielded on the player; cleared by `player_act`.
    awaiting_player: bool,
}

impl Game {
    pub fn new(seed: u64, map: Map, config: SimConfig) -> Self {
        Self {
            seed,
            dice: SeededDice::new(seed),
            world: World::new(map, config),
            schedule: Schedule::new(),
            awaiting_player: false,
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn current_tick(&self) -> u64 {
        self.schedule.now()
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    /// Direct access for tools and tests that set up scenarios by hand.
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn schedule(&self) -> &Schedule<EntityId> {
        &self.schedule
    }

    pub fn player_id(&self) -> Option<EntityId> {
        self.world.player_id
    }

    pub fn outcome(&self) -> Option<RunOutcome> {
        self.world.outcome
    }

    pub fn is_awaiting_player(&self) -> bool {
        self.awaiting_player
    }

    pub fn log(&self) -> &[LogEvent] {
        &self.world.events
    }

    pub fn messages(&self) -> &[Narration] {
        self.world.messages.entries()
    }

    pub fn drain_messages(&mut self) -> Vec<Narration> {
        self.world.messages.drain()
    }

    pub fn actor(&self, id: EntityId) -> Result<&Actor, GameError> {
        self.world.actors.get(id).ok_or(GameError::UnknownActor)
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            format_version: SNAPSHOT_FORMAT_VERSION,
            seed: self.seed,
            dice_draws: self.dice.draws(),
            awaiting_player: self.awaiting_player,
            world: self.world.clone(),
            schedule: self.schedule.clone(),
        }
    }

    /// Rebuilds a game from a snapshot, resuming the random stream where it stopped.
    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        let mut world = snapshot.world;
        world.recompute_combat_cache();
        Self {
            seed: snapshot.seed,
            dice: SeededDice::resume(snapshot.seed, snapshot.dice_draws),
            world,
            schedule: snapshot.schedule,
            awaiting_player: snapshot.awaiting_player,
        }
    }

    fn refresh_player_fov(&mut self) {
        let Some(player) = self.world.player() else {
            return;
        };
        let origin = player.pos;
        let radius = self.world.config.fov_radius;
        perception::compute_fov(&mut self.world.map, origin, radius);
    }
}

//! Shared test fixtures for the `game` submodule test suites.
//! This module exists to avoid repeating map and actor setup across many tests.
//! It does not own production gameplay logic.

use super::*;
use crate::content::{
    PLAYER_NAME, PLAYER_STATS, archetype_behavior, archetype_stats, archetype_title,
    archetype_weapon,
};

pub(crate) fn open_world(width: usize, height: usize) -> World {
    World::new(Map::new(width, height), SimConfig::default())
}

pub(crate) fn ascii_world(rows: &[&str]) -> World {
    World::new(Map::from_ascii(rows), SimConfig::default())
}

pub(crate) fn add_fighter(world: &mut World, pos: Pos, fighter: Fighter) -> EntityId {
    insert_actor(world, "fighter", ActorKind::Monster(Archetype::Warrior), pos, Some(fighter), None)
}

pub(crate) fn add_player(world: &mut World, pos: Pos) -> EntityId {
    let stats = PLAYER_STATS;
    let fighter = Fighter::new(stats.hp, stats.power, stats.defense, stats.speed, DeathPolicy::Player);
    let id = insert_actor(world, PLAYER_NAME, ActorKind::Player, pos, Some(fighter), None);
    world.player_id = Some(id);
    id
}

pub(crate) fn add_monster(world: &mut World, archetype: Archetype, pos: Pos) -> EntityId {
    let stats = archetype_stats(archetype);
    let mut fighter =
        Fighter::new(stats.hp, stats.power, stats.defense, stats.speed, DeathPolicy::Monster);
    if let Some(weapon) = archetype_weapon(archetype) {
        fighter.equip(weapon);
    }
    let ai = AiRecord::new(archetype_behavior(archetype));
    let id = insert_actor(
        world,
        archetype_title(archetype),
        ActorKind::Monster(archetype),
        pos,
        Some(fighter),
        Some(ai),
    );
    world.actors[id].vision = stats.vision;
    id
}

pub(crate) fn set_state(world: &mut World, id: EntityId, state: AiState) {
    if let Some(ai) = world.actors[id].ai.as_mut() {
        ai.transition(state);
    }
}

pub(crate) fn ai_of(world: &World, id: EntityId) -> &AiRecord {
    world.actors[id].ai.as_ref().expect("actor has an AI record")
}

pub(crate) fn ai_mut(world: &mut World, id: EntityId) -> &mut AiRecord {
    world.actors[id].ai.as_mut().expect("actor has an AI record")
}

pub(crate) fn hp_of(world: &World, id: EntityId) -> i32 {
    world.actors[id].fighter.as_ref().map_or(0, |fighter| fighter.hp)
}

/// A straight east-west corridor one tile high at `y = 2`.
pub(crate) fn corridor_world(length: usize) -> World {
    let wall = "#".repeat(length + 2);
    let floor = format!("#{}#", ".".repeat(length));
    ascii_world(&[&wall, &wall, &floor, &wall, &wall])
}

fn insert_actor(
    world: &mut World,
    name: &str,
    kind: ActorKind,
    pos: Pos,
    fighter: Option<Fighter>,
    ai: Option<AiRecord>,
) -> EntityId {
    let id = world.actors.insert(Actor {
        id: EntityId::default(),
        name: name.to_string(),
        kind,
        pos,
        blocks: true,
        vision: 8,
        fighter,
        ai,
    });
    world.actors[id].id = id;
    id
}

//! Actor spawning and the built-in arena.
//! This module exists to isolate initialization details from runtime simulation flow.
//! It does not own tick advancement once a run has started.

use super::*;
use crate::content::{
    PLAYER_NAME, PLAYER_STATS, archetype_behavior, archetype_stats, archetype_title,
    archetype_weapon, barbarian_name,
};
use crate::game::items::place_item;

const ARENA: [&str; 17] = [
    "##########################################",
    "#.....!..#...............#...............#",
    "#........#..?............#.......a.......#",
    "#...@....#.......w.......#...............#",
    "#........................................#",
    "#........#...............#.......s.......#",
    "#........#...............#...............#",
    "#####.######.....b.......#######.#########",
    "#........#...............#............%..#",
    "#........#...............#...............#",
    "#........#...#######.....#.......H.......#",
    "#...w....................................#",
    "#........#..........*....#...............#",
    "#........#.......b.......#.......a.......#",
    "#.!......#...............#...............#",
    "#........#...............#...............#",
    "##########################################",
];

impl Game {
    /// A fixed two-wing hall with one player, a band of every archetype and a few consumables.
    pub fn new_arena(seed: u64, config: SimConfig) -> Self {
        let mut game = Self::new(seed, Map::from_ascii(&ARENA), config);
        for (y, row) in (0_i32..).zip(ARENA) {
            for (x, glyph) in (0_i32..).zip(row.chars()) {
                let pos = Pos::new(x, y);
                match glyph {
                    '@' => {
                        game.spawn_player(pos);
                    }
                    glyph => {
                        if let Some(archetype) = archetype_for_glyph(glyph) {
                            game.spawn_monster(archetype, pos);
                        } else if let Some(effect) = effect_for_glyph(glyph) {
                            place_item(&mut game.world, effect, pos);
                        }
                    }
                }
            }
        }
        game.refresh_player_fov();
        game.world.recompute_combat_cache();
        game
    }

    pub fn spawn_player(&mut self, pos: Pos) -> EntityId {
        let stats = PLAYER_STATS;
        let fighter =
            Fighter::new(stats.hp, stats.power, stats.defense, stats.speed, DeathPolicy::Player);
        let id = self.insert_actor(Actor {
            id: EntityId::default(),
            name: PLAYER_NAME.to_string(),
            kind: ActorKind::Player,
            pos,
            blocks: true,
            vision: stats.vision,
            fighter: Some(fighter),
            ai: None,
        });
        self.world.player_id = Some(id);
        self.register(id, stats.speed);
        id
    }

    pub fn spawn_monster(&mut self, archetype: Archetype, pos: Pos) -> EntityId {
        let stats = archetype_stats(archetype);
        let mut fighter =
            Fighter::new(stats.hp, stats.power, stats.defense, stats.speed, DeathPolicy::Monster);
        if let Some(weapon) = archetype_weapon(archetype) {
            fighter.equip(weapon);
        }
        let name = format!("{} the {}", barbarian_name(&mut self.dice), archetype_title(archetype));
        let id = self.insert_actor(Actor {
            id: EntityId::default(),
            name,
            kind: ActorKind::Monster(archetype),
            pos,
            blocks: true,
            vision: stats.vision,
            fighter: Some(fighter),
            ai: Some(AiRecord::new(archetype_behavior(archetype))),
        });
        self.register(id, stats.speed);
        id
    }

    fn insert_actor(&mut self, actor: Actor) -> EntityId {
        let id = self.world.actors.insert(actor);
        self.world.actors[id].id = id;
        id
    }

    // First turn lands at base speed plus up to `spawn_jitter` extra ticks.
    fn register(&mut self, id: EntityId, speed: u32) {
        let jitter = self.dice.roll(0, i32::try_from(self.world.config.spawn_jitter).unwrap_or(0));
        let delay = u64::from(speed) + u64::try_from(jitter).unwrap_or(0);
        self.schedule.schedule(delay, id);
        let tick = self.schedule.now() + delay;
        self.world.events.push(LogEvent::Spawned { actor: id, tick });
        tracing::debug!(?id, tick, "actor spawned");
    }
}

fn archetype_for_glyph(glyph: char) -> Option<Archetype> {
    match glyph {
        'w' => Some(Archetype::Warrior),
        'b' => Some(Archetype::Berserker),
        's' => Some(Archetype::Skald),
        'a' => Some(Archetype::Archer),
        'H' => Some(Archetype::Hero),
        _ => None,
    }
}

fn effect_for_glyph(glyph: char) -> Option<Effect> {
    match glyph {
        '!' => Some(Effect::Heal),
        '?' => Some(Effect::Lightning),
        '*' => Some(Effect::Fireball),
        '%' => Some(Effect::Confuse),
        _ => None,
    }
}

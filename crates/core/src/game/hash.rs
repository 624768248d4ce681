//! Stable snapshot hashing for deterministic verification.
//! This module exists to keep hashing concerns separate from simulation control code.
//! It does not own snapshot persistence; see `snapshot_file`.

use std::hash::Hasher;

use slotmap::Key;
use xxhash_rust::xxh3::Xxh3;

use super::*;

impl Game {
    pub fn snapshot_hash(&self) -> u64 {
        let mut hasher = Xxh3::new();
        hasher.write_u64(self.seed);
        hasher.write_u64(self.schedule.now());
        hasher.write_u64(self.dice.draws());
        hasher.write_u8(u8::from(self.awaiting_player));
        hasher.write_u8(match self.world.outcome {
            None => 0,
            Some(RunOutcome::Victory) => 1,
            Some(RunOutcome::Defeat) => 2,
        });

        for (id, actor) in &self.world.actors {
            hasher.write_u64(id.data().as_ffi());
            hasher.write_i32(actor.pos.x);
            hasher.write_i32(actor.pos.y);
            hasher.write_u8(u8::from(actor.blocks));
            if let Some(fighter) = &actor.fighter {
                hasher.write_i32(fighter.hp);
                hasher.write_i32(fighter.max_hp);
                hasher.write_u8(u8::from(fighter.died));
            }
            if let Some(ai) = &actor.ai {
                hasher.write_u8(ai.state as u8);
                hasher.write_u32(ai.state_turns);
                hasher.write_u32(ai.turns_away);
                hasher.write_u32(ai.confused_turns);
                if let Some(target) = ai.move_target {
                    hasher.write_i32(target.x);
                    hasher.write_i32(target.y);
                }
            }
        }

        for (id, item) in &self.world.items {
            hasher.write_u64(id.data().as_ffi());
            hasher.write_u8(item.effect as u8);
            hasher.write_i32(item.pos.x);
            hasher.write_i32(item.pos.y);
        }
        for item in &self.world.inventory {
            hasher.write_u8(item.effect as u8);
        }

        for (tick, id) in self.schedule.pending() {
            hasher.write_u64(tick);
            hasher.write_u64(id.data().as_ffi());
        }
        hasher.finish()
    }
}

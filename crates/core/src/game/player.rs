//! Player action resolution.
//! This module exists to apply one player action while the scheduler is parked on the player.
//! It does not own choosing the action; tools and front-ends submit it.

use super::*;
use crate::game::noise::make_noise;
use crate::game::pathfinding::try_step;

impl Game {
    /// Resolves `action` for the player and hands the turn back to the scheduler.
    /// Cancelled effects, empty pick-ups and bad inventory slots keep the player's turn open.
    pub fn player_act(&mut self, action: PlayerAction) -> Result<ActionResult, GameError> {
        if self.world.outcome.is_some() {
            return Err(GameError::Finished);
        }
        if !self.awaiting_player {
            return Err(GameError::NotPlayersTurn);
        }
        let player = self
            .world
            .player_id
            .filter(|id| self.world.actors.get(*id).is_some_and(Actor::is_alive))
            .ok_or(GameError::UnknownActor)?;
        let actor = self.actor(player)?;
        let pos = actor.pos;
        let (move_cost, attack_cost) = actor
            .fighter
            .as_ref()
            .map(|fighter| (u64::from(fighter.move_speed()), u64::from(fighter.attack_speed())))
            .ok_or(GameError::UnknownActor)?;

        let Self { world, dice, .. } = self;
        let cost = match action {
            PlayerAction::Step { dx, dy } => {
                if dx.abs() > 1 || dy.abs() > 1 || (dx, dy) == (0, 0) {
                    return Err(GameError::InvalidStep { dx, dy });
                }
                match world.fighter_at(pos.offset(dx, dy)) {
                    Some(enemy) if enemy != player => {
                        combat::attack(world, &mut *dice, player, enemy);
                        let volume = world.config.attack_volume;
                        make_noise(world, &mut *dice, Some(player), pos, volume);
                        attack_cost
                    }
                    _ => {
                        // Bumping a wall still spends the move.
                        try_step(world, player, dx, dy);
                        move_cost
                    }
                }
            }
            PlayerAction::Wait => move_cost,
            PlayerAction::PickUp => {
                if !items::pick_up(world, player) {
                    return Ok(ActionResult::Cancelled);
                }
                move_cost
            }
            PlayerAction::Drop { slot } => {
                items::drop_item(world, player, slot)?;
                move_cost
            }
            PlayerAction::Use { slot, target } => {
                match items::use_item(world, player, slot, target)? {
                    EffectOutcome::Applied => move_cost,
                    EffectOutcome::Cancelled => return Ok(ActionResult::Cancelled),
                }
            }
        };

        self.awaiting_player = false;
        self.schedule.remove(player);
        if self.world.actors.get(player).is_some_and(Actor::is_alive) {
            self.schedule.schedule(cost, player);
        }
        self.refresh_player_fov();
        self.world.recompute_combat_cache();
        tracing::trace!(?action, cost, tick = self.schedule.now(), "player acted");
        Ok(ActionResult::Acted { cost })
    }
}

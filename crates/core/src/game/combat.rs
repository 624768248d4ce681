//! Damage resolution and death handling.
//! This module exists so every source of harm goes through one guarded path.
//! It does not own targeting or when an attack is worth making; AI and player code decide that.

use super::*;
use crate::state::DamageOutcome;

/// Resolves one attack and returns the damage dealt (0 when it had no effect).
pub fn attack(world: &mut World, dice: &mut dyn Dice, attacker: EntityId, target: EntityId) -> i32 {
    let (Some(attacker_actor), Some(target_actor)) =
        (world.actors.get(attacker), world.actors.get(target))
    else {
        return 0;
    };
    let (Some(offense), Some(defense)) = (&attacker_actor.fighter, &target_actor.fighter) else {
        return 0;
    };
    if offense.is_dead() || defense.is_dead() {
        return 0;
    }

    let raw = match &offense.weapon {
        Some(weapon) => {
            dice.roll(weapon.damage_min, weapon.damage_max) + dice.roll(0, offense.power / 2)
        }
        None => dice.roll(1, offense.power.max(1)),
    };
    let damage = raw - defense.defense;

    let verb = offense
        .weapon
        .as_ref()
        .and_then(|weapon| dice.pick_index(weapon.verbs.len()).map(|i| weapon.verbs[i].clone()))
        .unwrap_or_else(|| "attacks".to_string());
    let attacker_name = capitalize(&attacker_actor.name);
    let target_name = target_actor.name.clone();
    let color =
        if target_actor.kind == ActorKind::Player { ColorTag::Orange } else { ColorTag::White };

    world.events.push(LogEvent::Attacked { attacker, target, damage: damage.max(0) });
    if damage <= 0 {
        world.narrate(
            &format!("{attacker_name} {verb} {target_name} but it has no effect!"),
            color,
        );
        return 0;
    }
    world.narrate(&format!("{attacker_name} {verb} {target_name} for {damage} hit points."), color);
    take_damage(world, target, damage);
    damage
}

/// Applies damage to a fighter. Fighters that already died ignore it entirely.
pub fn take_damage(world: &mut World, target: EntityId, amount: i32) -> DamageOutcome {
    let Some(fighter) = world.actors.get_mut(target).and_then(|actor| actor.fighter.as_mut())
    else {
        return DamageOutcome::Ignored;
    };
    let outcome = fighter.apply_damage(amount);
    if outcome == DamageOutcome::Killed {
        let policy = fighter.death;
        run_death_policy(world, target, policy);
    }
    outcome
}

pub fn heal(world: &mut World, target: EntityId, amount: i32) {
    if let Some(fighter) = world.actors.get_mut(target).and_then(|actor| actor.fighter.as_mut()) {
        fighter.heal(amount);
    }
}

fn run_death_policy(world: &mut World, id: EntityId, policy: DeathPolicy) {
    world.events.push(LogEvent::Died { actor: id });
    match policy {
        DeathPolicy::Player => {
            world.narrate("You died!", ColorTag::Crimson);
            world.outcome = Some(RunOutcome::Defeat);
            tracing::debug!(?id, "player died");
        }
        DeathPolicy::Monster => {
            let Some(actor) = world.actors.get_mut(id) else {
                return;
            };
            let name = capitalize(&actor.name);
            actor.fighter = None;
            actor.ai = None;
            actor.blocks = false;
            actor.name = format!("remains of {}", actor.name);
            world.narrate(&format!("{name} is dead!"), ColorTag::Orange);
            tracing::debug!(?id, "monster died");
            if world.outcome.is_none() && no_monsters_left(world) {
                world.outcome = Some(RunOutcome::Victory);
            }
        }
    }
}

fn no_monsters_left(world: &World) -> bool {
    let player_alive = world.player().is_some_and(Actor::is_alive);
    player_alive
        && !world
            .actors
            .values()
            .any(|actor| matches!(actor.kind, ActorKind::Monster(_)) && actor.is_alive())
}

pub(crate) fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

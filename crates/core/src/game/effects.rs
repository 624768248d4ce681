//! Item effects resolved from plain data.
//! This module exists so every usable effect is a value looked up in `content::effect_spec`.
//! It does not own inventories or how an effect was obtained.

use super::*;
use crate::content::effect_spec;
use crate::game::combat::{self, capitalize};
use crate::game::perception::can_see;

/// Applies `effect` on behalf of `caster`. Cancelled effects change nothing.
pub fn apply_effect(
    world: &mut World,
    caster: EntityId,
    effect: Effect,
    target: Option<Pos>,
) -> EffectOutcome {
    let outcome = match effect {
        Effect::Heal => heal(world, caster),
        Effect::Lightning => lightning(world, caster),
        Effect::Fireball => fireball(world, caster, target),
        Effect::Confuse => confuse(world, caster),
    };
    world.events.push(LogEvent::EffectUsed {
        effect,
        outcome_applied: outcome == EffectOutcome::Applied,
    });
    outcome
}

fn heal(world: &mut World, caster: EntityId) -> EffectOutcome {
    let Some(fighter) = world.actors.get(caster).and_then(|actor| actor.fighter.as_ref()) else {
        return EffectOutcome::Cancelled;
    };
    if fighter.hp >= fighter.max_hp {
        world.narrate("You are already at full health.", ColorTag::Red);
        return EffectOutcome::Cancelled;
    }
    combat::heal(world, caster, effect_spec(Effect::Heal).amount);
    world.narrate("Your wounds start to feel better!", ColorTag::Violet);
    EffectOutcome::Applied
}

fn lightning(world: &mut World, caster: EntityId) -> EffectOutcome {
    let spec = effect_spec(Effect::Lightning);
    let Some(target) = closest_visible_monster(world, caster, spec.range) else {
        world.narrate("No enemy is close enough to strike.", ColorTag::Red);
        return EffectOutcome::Cancelled;
    };
    let name = world.display_name(target);
    world.narrate(
        &format!(
            "A lightning bolt strikes the {name} with a loud thunder! The damage is {} hit points.",
            spec.amount
        ),
        ColorTag::LightBlue,
    );
    combat::take_damage(world, target, spec.amount);
    EffectOutcome::Applied
}

fn fireball(world: &mut World, caster: EntityId, target: Option<Pos>) -> EffectOutcome {
    let spec = effect_spec(Effect::Fireball);
    let Some(caster_actor) = world.actors.get(caster) else {
        return EffectOutcome::Cancelled;
    };
    let Some(center) = target.filter(|p| {
        !world.map.is_wall(*p) && can_see(&world.map, caster_actor.pos, caster_actor.vision, *p)
    }) else {
        world.narrate("There is nothing to aim at there.", ColorTag::Red);
        return EffectOutcome::Cancelled;
    };

    world.narrate(
        &format!("The fireball explodes, burning everything within {} tiles!", spec.radius),
        ColorTag::Orange,
    );
    let caught: Vec<EntityId> = world
        .actors
        .iter()
        .filter(|(_, actor)| actor.is_alive() && actor.pos.distance(center) <= spec.radius)
        .map(|(id, _)| id)
        .collect();
    for id in caught {
        let name = capitalize(&world.display_name(id));
        world.narrate(
            &format!("{name} gets burned for {} hit points.", spec.amount),
            ColorTag::Orange,
        );
        combat::take_damage(world, id, spec.amount);
    }
    EffectOutcome::Applied
}

fn confuse(world: &mut World, caster: EntityId) -> EffectOutcome {
    let spec = effect_spec(Effect::Confuse);
    let Some(target) = closest_visible_monster(world, caster, spec.range) else {
        world.narrate("No enemy is close enough to confuse.", ColorTag::Red);
        return EffectOutcome::Cancelled;
    };
    if let Some(ai) = world.actors.get_mut(target).and_then(|actor| actor.ai.as_mut()) {
        ai.confused_turns = spec.turns;
    }
    let name = world.display_name(target);
    world.narrate(
        &format!("The eyes of the {name} look vacant, as they start to stumble around!"),
        ColorTag::LightBlue,
    );
    EffectOutcome::Applied
}

/// Nearest living AI actor that `caster` can see within `range`.
pub fn closest_visible_monster(world: &World, caster: EntityId, range: f64) -> Option<EntityId> {
    let origin = world.actors.get(caster)?.pos;
    let sight = world.actors.get(caster)?.vision;
    world
        .actors
        .iter()
        .filter(|(id, actor)| {
            *id != caster
                && actor.ai.is_some()
                && actor.is_alive()
                && origin.distance(actor.pos) <= range
                && can_see(&world.map, origin, sight, actor.pos)
        })
        .min_by(|(_, a), (_, b)| origin.distance(a.pos).total_cmp(&origin.distance(b.pos)))
        .map(|(id, _)| id)
}

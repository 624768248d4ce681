//! Sound events and how AI actors react to them.
//! This module exists so taunts, songs and fights can alert actors that cannot see the source.
//! It does not own state evaluation on an actor's own turn; see `ai`.

use super::*;
use crate::game::ai::{change_state, record_mut};

/// Offers a sound at `origin` to every AI-bearing actor except `emitter`.
pub fn make_noise(
    world: &mut World,
    dice: &mut dyn Dice,
    emitter: Option<EntityId>,
    origin: Pos,
    volume: i32,
) {
    world.events.push(LogEvent::NoiseMade { origin, volume });
    let listeners: Vec<EntityId> = world
        .actors
        .iter()
        .filter(|(id, actor)| Some(*id) != emitter && actor.ai.is_some())
        .map(|(id, _)| id)
        .collect();
    for listener in listeners {
        hear_noise(world, dice, listener, origin, volume);
    }
}

/// Rolls whether `listener` notices the sound and reacts by state. Returns whether it was heard.
pub fn hear_noise(
    world: &mut World,
    dice: &mut dyn Dice,
    listener: EntityId,
    origin: Pos,
    volume: i32,
) -> bool {
    let Some(actor) = world.actors.get(listener) else {
        return false;
    };
    let Some(ai) = actor.ai.as_ref() else {
        return false;
    };
    if volume <= 0 || !actor.is_alive() {
        return false;
    }
    let distance = actor.pos.distance(origin);
    let loudness = f64::from(volume);
    if distance > loudness {
        return false;
    }
    let probability = ai.behavior.hearing * (1.0 - distance / loudness);
    if !dice.chance(probability) {
        return false;
    }

    let state = ai.state;
    let pos = actor.pos;
    world.events.push(LogEvent::NoiseHeard { actor: listener, origin });
    tracing::trace!(?listener, ?origin, %state, "noise heard");

    match state {
        AiState::Sleep => {
            if distance <= loudness / 2.0 {
                change_state(world, listener, AiState::Fight);
                if let Some(ai) = record_mut(world, listener) {
                    ai.last_target_pos = Some(origin);
                }
            } else {
                change_state(world, listener, AiState::Wander);
                if let Some(ai) = record_mut(world, listener) {
                    ai.move_target = Some(origin);
                }
            }
        }
        AiState::Wander => {
            if let Some(ai) = record_mut(world, listener) {
                let closer = ai.move_target.is_none_or(|target| distance < pos.distance(target));
                if closer {
                    ai.move_target = Some(origin);
                }
            }
        }
        AiState::Flee => {
            if let Some(ai) = record_mut(world, listener) {
                let closer =
                    ai.last_target_pos.is_none_or(|danger| distance < pos.distance(danger));
                if closer {
                    ai.last_target_pos = Some(origin);
                }
            }
        }
        AiState::Fight => {}
    }
    true
}

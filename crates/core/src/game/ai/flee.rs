//! Flee state: pick the most open escape ray, else run to a stronger ally, else stand cornered.

use super::*;
use crate::game::combat;
use crate::game::pathfinding::{direction_index, direction_toward, move_astar, rotate};

// Straight away first, then widening alternately, ending with a step toward the danger.
const RAY_TURNS: [i32; 8] = [0, 1, -1, 2, -2, 3, -3, 4];

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EscapeRay {
    pub dir: (i32, i32),
    pub open_run: i32,
    pub score: f64,
    /// Last open tile along the ray; becomes the movement target.
    pub furthest: Pos,
}

/// Scores one ray cast from `from` in `dir`. `None` when the first tile is already blocked.
pub fn score_escape_ray(
    world: &World,
    from: Pos,
    dir: (i32, i32),
    danger: Pos,
) -> Option<EscapeRay> {
    let lookahead = world.config.flee_lookahead.max(1);
    let mut open_run = 0;
    let mut furthest = from;
    for step in 1..=lookahead {
        let p = from.offset(dir.0 * step, dir.1 * step);
        if world.is_blocked(p) {
            break;
        }
        open_run = step;
        furthest = p;
    }
    if open_run == 0 {
        return None;
    }

    let mut score = f64::from(open_run);
    let beyond = from.offset(dir.0 * (lookahead + 1), dir.1 * (lookahead + 1));
    if open_run == lookahead && !world.is_blocked(beyond) {
        score += world.config.flee_ahead_bonus;
    }
    let start = from.offset(dir.0, dir.1);
    let gain = start.distance(danger) / from.distance(danger).max(1.0);
    Some(EscapeRay { dir, open_run, score: score * gain, furthest })
}

/// Best ray scoring at least `flee_min_score`; earlier rays win ties.
pub fn best_escape(world: &World, from: Pos, danger: Pos) -> Option<EscapeRay> {
    let heading = direction_index(direction_toward(danger, from)).unwrap_or(2);
    let mut best: Option<EscapeRay> = None;
    for turn in RAY_TURNS {
        let dir = rotate(heading, turn);
        if let Some(ray) = score_escape_ray(world, from, dir, danger)
            && ray.score >= world.config.flee_min_score
            && best.is_none_or(|current| ray.score > current.score)
        {
            best = Some(ray);
        }
    }
    best
}

pub(super) fn act(
    world: &mut World,
    dice: &mut dyn Dice,
    id: EntityId,
    sighting: &Sighting,
) -> u64 {
    let Some(actor) = world.actors.get(id) else {
        return 1;
    };
    let (Some(fighter), Some(ai)) = (&actor.fighter, &actor.ai) else {
        return 1;
    };
    let pos = actor.pos;
    let move_cost = u64::from(fighter.move_speed());
    let attack_cost = u64::from(fighter.attack_speed());
    let Some(danger) = ai.last_target_pos else {
        return move_cost;
    };

    if let Some(ray) = best_escape(world, pos, danger) {
        if let Some(ai) = record_mut(world, id) {
            ai.move_target = Some(ray.furthest);
        }
        move_astar(world, id, ray.furthest);
        return move_cost;
    }

    if let Some(ally) = nearest_stronger_ally(world, id) {
        tracing::trace!(?id, ?ally, "fleeing toward an ally");
        if let Some(ai) = record_mut(world, id) {
            ai.move_target = Some(ally);
        }
        move_astar(world, id, ally);
        return move_cost;
    }

    if sighting.visible
        && let (Some(target), Some(target_pos)) = (sighting.target, sighting.target_pos)
        && pos.is_adjacent(target_pos)
    {
        let name = capitalize(&world.display_name(id));
        world.narrate(&format!("{name} is cornered and lashes out!"), ColorTag::Orange);
        combat::attack(world, dice, id, target);
        return attack_cost;
    }
    move_cost
}

/// Closest living AI ally within `flee_ally_radius` with more hit points than `id`.
fn nearest_stronger_ally(world: &World, id: EntityId) -> Option<Pos> {
    let actor = world.actors.get(id)?;
    let own_hp = actor.fighter.as_ref()?.hp;
    let radius = world.config.flee_ally_radius;
    world
        .actors
        .iter()
        .filter(|(other, ally)| {
            *other != id
                && ally.ai.is_some()
                && ally.fighter.as_ref().is_some_and(|f| !f.is_dead() && f.hp > own_hp)
                && actor.pos.distance(ally.pos) <= radius
        })
        .map(|(_, ally)| ally.pos)
        .min_by(|a, b| actor.pos.distance(*a).total_cmp(&actor.pos.distance(*b)))
}

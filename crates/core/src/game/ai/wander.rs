//! Wander state: patrol toward a point in the opposite quadrant of the map.

use super::*;
use crate::game::pathfinding::move_astar;

pub(super) fn act(world: &mut World, dice: &mut dyn Dice, id: EntityId, move_cost: u64) -> u64 {
    let Some(actor) = world.actors.get(id) else {
        return move_cost;
    };
    let Some(ai) = &actor.ai else {
        return move_cost;
    };
    let pos = actor.pos;
    let stuck_limit = world.config.wander_stuck_limit;
    let mut goal = ai.move_target;
    if goal.is_none_or(|target| target == pos) || ai.stuck_turns >= stuck_limit {
        goal = pick_patrol_point(world, dice, pos);
        if let Some(ai) = record_mut(world, id) {
            ai.move_target = goal;
            ai.stuck_turns = 0;
        }
    }
    let Some(goal) = goal else {
        return move_cost;
    };

    let moved = move_astar(world, id, goal);
    if let Some(ai) = record_mut(world, id) {
        ai.stuck_turns = if moved { 0 } else { ai.stuck_turns.saturating_add(1) };
    }
    move_cost
}

/// Samples an open tile in the quadrant diagonally opposite `from`, then any open tile.
pub fn pick_patrol_point(world: &World, dice: &mut dyn Dice, from: Pos) -> Option<Pos> {
    let (width, height) = (world.map.width(), world.map.height());
    let (mid_x, mid_y) = (width / 2, height / 2);
    let (x_lo, x_hi) = if from.x < mid_x { (mid_x, width - 1) } else { (0, mid_x - 1) };
    let (y_lo, y_hi) = if from.y < mid_y { (mid_y, height - 1) } else { (0, mid_y - 1) };

    for _ in 0..world.config.wander_samples {
        let p = Pos { y: dice.roll(y_lo, y_hi), x: dice.roll(x_lo, x_hi) };
        if p != from && !world.is_blocked(p) {
            return Some(p);
        }
    }

    let open: Vec<Pos> =
        world.map.floor_tiles().filter(|p| *p != from && !world.is_blocked(*p)).collect();
    dice.pick_index(open.len()).map(|i| open[i])
}

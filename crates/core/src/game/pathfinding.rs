//! Deterministic movement primitives and shortest-path helpers.
//! This module exists so navigation rules are reusable across AI states and player movement.
//! It does not own where an actor wants to go; callers pick the goal.

use std::collections::{BTreeMap, BTreeSet};

use super::*;

/// Eight compass steps in clockwise order, starting north.
pub const DIRECTIONS: [(i32, i32); 8] =
    [(0, -1), (1, -1), (1, 0), (1, 1), (0, 1), (-1, 1), (-1, 0), (-1, -1)];

// Rotation offsets tried by the greedy fallback: straight, then alternating wider turns.
const FALLBACK_TURNS: [i32; 8] = [0, 1, -1, 2, -2, 3, -3, 4];

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
struct OpenNode {
    f: u32,
    h: u32,
    y: i32,
    x: i32,
}

/// Steps `mover` one tile toward `goal` along an A* route, falling back to greedy stepping.
/// Returns whether the actor moved.
pub fn move_astar(world: &mut World, mover: EntityId, goal: Pos) -> bool {
    let Some(start) = world.actors.get(mover).map(|actor| actor.pos) else {
        return false;
    };
    if start == goal {
        return false;
    }
    let blocked = blocking_positions(world, mover, goal);
    if let Some(path) = astar_path(&world.map, &blocked, start, goal)
        && path.len() < world.config.max_path_len
        && let Some(next) = path.first().copied()
        && !world.is_blocked(next)
    {
        world.actors[mover].pos = next;
        return true;
    }
    move_towards(world, mover, goal)
}

/// Greedy step along the rounded direction to `goal`, rotating by 45 degrees until a tile is open.
pub fn move_towards(world: &mut World, mover: EntityId, goal: Pos) -> bool {
    let Some(start) = world.actors.get(mover).map(|actor| actor.pos) else {
        return false;
    };
    let Some(heading) = direction_index(direction_toward(start, goal)) else {
        return false;
    };
    for turn in FALLBACK_TURNS {
        let (dx, dy) = rotate(heading, turn);
        if try_step(world, mover, dx, dy) {
            return true;
        }
    }
    false
}

/// Moves by one step if the destination is free.
pub fn try_step(world: &mut World, mover: EntityId, dx: i32, dy: i32) -> bool {
    let Some(from) = world.actors.get(mover).map(|actor| actor.pos) else {
        return false;
    };
    let to = from.offset(dx, dy);
    if to == from || world.is_blocked(to) {
        return false;
    }
    world.actors[mover].pos = to;
    true
}

/// Unit grid vector pointing from `from` toward `to`; `(0, 0)` when they coincide.
pub fn direction_toward(from: Pos, to: Pos) -> (i32, i32) {
    let dx = f64::from(to.x - from.x);
    let dy = f64::from(to.y - from.y);
    let length = (dx * dx + dy * dy).sqrt();
    if length == 0.0 {
        return (0, 0);
    }
    ((dx / length).round() as i32, (dy / length).round() as i32)
}

pub fn direction_index(dir: (i32, i32)) -> Option<usize> {
    DIRECTIONS.iter().position(|candidate| *candidate == dir)
}

/// Direction `steps` eighth-turns clockwise (negative is counter-clockwise) from `index`.
pub fn rotate(index: usize, steps: i32) -> (i32, i32) {
    let len = DIRECTIONS.len() as i32;
    let turned = (index as i32 + steps).rem_euclid(len);
    DIRECTIONS[turned as usize]
}

/// Cells held by blocking actors, minus the mover and the declared goal.
pub(super) fn blocking_positions(world: &World, mover: EntityId, goal: Pos) -> BTreeSet<Pos> {
    world
        .actors
        .iter()
        .filter(|(id, actor)| *id != mover && actor.blocks && actor.pos != goal)
        .map(|(_, actor)| actor.pos)
        .collect()
}

pub fn astar_path(map: &Map, blocked: &BTreeSet<Pos>, start: Pos, goal: Pos) -> Option<Vec<Pos>> {
    if map.is_wall(goal) || map.is_wall(start) {
        return None;
    }
    if start == goal {
        return Some(vec![]);
    }
    let mut open_set = BTreeSet::new();
    let mut g_score = BTreeMap::new();
    let mut came_from = BTreeMap::new();
    let h = start.chebyshev(goal);
    open_set.insert(OpenNode { f: h, h, y: start.y, x: start.x });
    g_score.insert(start, 0u32);
    while let Some(curr) = open_set.pop_first() {
        let p = Pos { y: curr.y, x: curr.x };
        if p == goal {
            return reconstruct_path(&came_from, start, goal);
        }
        let Some(cur_g) = g_score.get(&p).copied() else {
            continue;
        };
        for n in neighbors(p) {
            if map.is_wall(n) || (n != goal && blocked.contains(&n)) {
                continue;
            }
            let tg = cur_g + 1;
            if tg < *g_score.get(&n).unwrap_or(&u32::MAX) {
                came_from.insert(n, p);
                g_score.insert(n, tg);
                let h = n.chebyshev(goal);
                open_set.insert(OpenNode { f: tg + h, h, y: n.y, x: n.x });
            }
        }
    }
    None
}

fn reconstruct_path(came: &BTreeMap<Pos, Pos>, start: Pos, goal: Pos) -> Option<Vec<Pos>> {
    let mut p = goal;
    let mut result = vec![p];
    while p != start {
        p = *came.get(&p)?;
        result.push(p);
    }
    result.reverse();
    result.remove(0);
    Some(result)
}

pub fn neighbors(p: Pos) -> [Pos; 8] {
    DIRECTIONS.map(|(dx, dy)| p.offset(dx, dy))
}

//! Field-of-view and line-of-sight calculations.
//! This module exists to keep sight rules deterministic and shared by the player and monsters.
//! It does not own what an actor does with what it sees.

use std::collections::BTreeSet;

use super::*;

fn transform_octant(orig: Pos, x: i32, y: i32, oct: u8) -> Pos {
    match oct {
        0 => Pos { y: orig.y - y, x: orig.x + x },
        1 => Pos { y: orig.y - x, x: orig.x + y },
        2 => Pos { y: orig.y - x, x: orig.x - y },
        3 => Pos { y: orig.y - y, x: orig.x - x },
        4 => Pos { y: orig.y + y, x: orig.x - x },
        5 => Pos { y: orig.y + x, x: orig.x - y },
        6 => Pos { y: orig.y + x, x: orig.x + y },
        7 => Pos { y: orig.y + y, x: orig.x + x },
        _ => orig,
    }
}

/// Tiles visible from `origin` within a circular `range`, walls included.
pub fn field_of_view(map: &Map, origin: Pos, range: i32) -> BTreeSet<Pos> {
    let mut seen = BTreeSet::new();
    if !map.in_bounds(origin) || range < 0 {
        return seen;
    }
    seen.insert(origin);
    for octant in 0..8 {
        scan_octant(map, &mut seen, origin, range, 1, Slope::new(1, 1), Slope::new(0, 1), octant);
    }
    seen.retain(|p| *p == origin || line_of_sight(map, origin, *p));
    seen
}

/// Recomputes the map's visible layer from `origin` and marks those tiles explored.
pub fn compute_fov(map: &mut Map, origin: Pos, range: i32) {
    let seen = field_of_view(map, origin, range);
    map.clear_visible();
    for p in seen {
        map.set_visible(p, true);
    }
}

/// Whether `viewer` with sight `range` can see `target`.
pub fn can_see(map: &Map, viewer: Pos, range: i32, target: Pos) -> bool {
    viewer.distance(target) <= f64::from(range) && line_of_sight(map, viewer, target)
}

#[derive(Clone, Copy)]
struct Slope {
    y: i32,
    x: i32,
}

impl Slope {
    fn new(y: i32, x: i32) -> Self {
        Self { y, x }
    }

    fn greater_or_equal(&self, other: &Slope) -> bool {
        self.y * other.x >= other.y * self.x
    }

    fn greater_than(&self, other: &Slope) -> bool {
        self.y * other.x > other.y * self.x
    }
}

#[allow(clippy::too_many_arguments)]
fn scan_octant(
    map: &Map,
    seen: &mut BTreeSet<Pos>,
    orig: Pos,
    range: i32,
    dist: i32,
    start: Slope,
    end: Slope,
    oct: u8,
) {
    if dist > range {
        return;
    }
    let mut blocked = false;
    let mut cur_start = start;
    for y in (0..=dist).rev() {
        let top = Slope::new(2 * y + 1, 2 * dist - 1);
        let bot = Slope::new(2 * y - 1, 2 * dist + 1);
        if cur_start.greater_or_equal(&bot) && top.greater_than(&end) {
            let p = transform_octant(orig, dist, y, oct);
            if map.in_bounds(p) && orig.distance(p) <= f64::from(range) {
                seen.insert(p);
            }
            if map.is_opaque(p) {
                if !blocked {
                    scan_octant(map, seen, orig, range, dist + 1, cur_start, top, oct);
                    blocked = true;
                }
                cur_start = bot;
            } else if blocked {
                blocked = false;
            }
        }
    }
    if !blocked {
        scan_octant(map, seen, orig, range, dist + 1, cur_start, end, oct);
    }
}

/// Bresenham-style walk that fails on the first opaque tile strictly between the endpoints.
pub fn line_of_sight(map: &Map, origin: Pos, target: Pos) -> bool {
    let dx = target.x - origin.x;
    let dy = target.y - origin.y;
    let sx = dx.signum();
    let sy = dy.signum();
    let total_dist_x = dx.abs();
    let total_dist_y = dy.abs();

    let mut x = origin.x;
    let mut y = origin.y;
    let mut current_step_x = 0;
    let mut current_step_y = 0;

    while current_step_x < total_dist_x || current_step_y < total_dist_y {
        let lhs = (1 + 2 * current_step_x) * total_dist_y;
        let rhs = (1 + 2 * current_step_y) * total_dist_x;

        if lhs == rhs {
            x += sx;
            y += sy;
            current_step_x += 1;
            current_step_y += 1;
        } else if lhs < rhs {
            x += sx;
            current_step_x += 1;
        } else {
            y += sy;
            current_step_y += 1;
        }

        if x == target.x && y == target.y {
            break;
        }
        if map.is_opaque(Pos { y, x }) {
            return false;
        }
    }
    true
}

/// Text dump of the map for assertion messages: glyph, visible flag, explored flag.
#[cfg(test)]
pub(crate) fn draw_map_diag(map: &Map, marker: Pos) -> String {
    let mut text = String::new();
    for y in 0..map.height() {
        for x in 0..map.width() {
            let p = Pos { y, x };
            let c = if p == marker {
                '@'
            } else if map.is_wall(p) {
                '#'
            } else {
                '.'
            };
            let v = if map.is_visible(p) { 'v' } else { 'h' };
            let d = if map.is_explored(p) { 'd' } else { 'u' };
            text.push_str(&format!("{c}{v}{d} "));
        }
        text.push('\n');
    }
    text
}

//! Area-of-effect geometry
//!
//! Pure functions turning a source, a target and a size into the set of
//! affected cells. Walls stop the area unless `ignore_walls` is set.

use std::collections::BTreeSet;

use crate::world::{Tripoint, WorldView, calc_ray_end, coord_to_angle, line_to, rl_dist};

/// Cells within Chebyshev `radius` of `target` that the blast can reach.
///
/// A cell is cut off when any cell between it and the target is
/// impassable. The target itself is always included.
pub fn blast(
    target: Tripoint,
    radius: i32,
    ignore_walls: bool,
    world: &dyn WorldView,
) -> BTreeSet<Tripoint> {
    let mut cells = BTreeSet::new();
    cells.insert(target);
    let radius = radius.max(0);

    for dx in -radius..=radius {
        for dy in -radius..=radius {
            let p = target.offset(dx, dy);
            if p == target || rl_dist(target, p) > radius {
                continue;
            }
            if ignore_walls || !is_cut_off(target, p, world) {
                cells.insert(p);
            }
        }
    }
    cells
}

/// Any impassable cell strictly between `from` and `to`
fn is_cut_off(from: Tripoint, to: Tripoint, world: &dyn WorldView) -> bool {
    let line = line_to(from, to);
    line.split_last()
        .is_some_and(|(_, between)| between.iter().any(|c| !world.is_passable(*c)))
}

/// Walk a path, collecting cells up to the first wall
fn trace(
    cells: &mut BTreeSet<Tripoint>,
    path: impl IntoIterator<Item = Tripoint>,
    ignore_walls: bool,
    world: &dyn WorldView,
) {
    for p in path {
        if !ignore_walls && !world.is_passable(p) {
            break;
        }
        cells.insert(p);
    }
}

/// Cells swept by a fan of rays from `source` towards `target`.
///
/// The fan is `aoe` degrees wide, centered on the source-to-target bearing,
/// and reaches `range + 1` cells. The source cell is never part of the cone.
pub fn cone(
    source: Tripoint,
    target: Tripoint,
    range: i32,
    aoe: i32,
    ignore_walls: bool,
    world: &dyn WorldView,
) -> BTreeSet<Tripoint> {
    let mut cells = BTreeSet::new();
    if source == target {
        cells.insert(target);
        return cells;
    }

    let reach = range.max(0) + 1;
    let aoe = aoe.max(0);
    let initial_angle = coord_to_angle(source, target);
    let start_angle = initial_angle - aoe / 2;
    let end_angle = initial_angle + (aoe + 1) / 2;
    for angle in start_angle..=end_angle {
        let end = calc_ray_end(angle, reach, source);
        trace(&mut cells, line_to(source, end), ignore_walls, world);
    }

    cells.remove(&source);
    cells
}

/// Cells along the source-to-target line, widened perpendicular to it.
///
/// `aoe / 2` (rounded down) extra lanes run on the clockwise side and
/// `aoe / 2` (rounded up) on the other. The source cell is never included.
pub fn line(
    source: Tripoint,
    target: Tripoint,
    aoe: i32,
    ignore_walls: bool,
    world: &dyn WorldView,
) -> BTreeSet<Tripoint> {
    let mut cells = BTreeSet::new();
    if source == target {
        cells.insert(target);
        return cells;
    }

    let aoe = aoe.max(0);
    let angle = coord_to_angle(source, target);
    let clockwise = (0..=aoe / 2).map(|k| calc_ray_end(angle - 90, k, Tripoint::default()));
    let counter = (1..=(aoe + 1) / 2).map(|k| calc_ray_end(angle + 90, k, Tripoint::default()));

    for offset in clockwise.chain(counter) {
        let start = source + offset;
        let end = target + offset;
        let lane = std::iter::once(start).chain(line_to(start, end));
        trace(&mut cells, lane, ignore_walls, world);
    }

    cells.remove(&source);
    cells
}

/// Where a projectile fired from `source` at `target` comes to rest:
/// the last passable cell before an obstruction, or the target.
pub fn projectile_impact(source: Tripoint, target: Tripoint, world: &dyn WorldView) -> Tripoint {
    let mut last = source;
    for p in line_to(source, target) {
        if !world.is_passable(p) {
            return last;
        }
        last = p;
    }
    target
}

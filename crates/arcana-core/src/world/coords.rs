//! Grid coordinates and line geometry
//!
//! Distances are Chebyshev (8-direction moves), lines are Bresenham.

use core::fmt;
use core::ops::Add;

use serde::{Deserialize, Serialize};

/// A cell on the world grid (x, y, z-level)
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct Tripoint {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl Tripoint {
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Same z-level, shifted horizontally
    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy, self.z)
    }
}

impl Add for Tripoint {
    type Output = Tripoint;

    fn add(self, rhs: Tripoint) -> Tripoint {
        Tripoint::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl fmt::Display for Tripoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

/// Chebyshev distance between two cells, z-levels included
pub fn rl_dist(a: Tripoint, b: Tripoint) -> i32 {
    let dx = (a.x - b.x).abs();
    let dy = (a.y - b.y).abs();
    let dz = (a.z - b.z).abs();
    dx.max(dy).max(dz)
}

/// Cells on the line from `from` to `to`, excluding `from` and including `to`.
///
/// Returns an empty vector when both ends are the same cell.
pub fn line_to(from: Tripoint, to: Tripoint) -> Vec<Tripoint> {
    let dx = to.x - from.x;
    let dy = to.y - from.y;
    let dz = to.z - from.z;
    let ax = dx.abs();
    let ay = dy.abs();
    let steps = ax.max(ay).max(dz.abs());
    let mut line = Vec::with_capacity(steps as usize);
    if steps == 0 {
        return line;
    }

    let sx = dx.signum();
    let sy = dy.signum();
    let mut x = from.x;
    let mut y = from.y;
    let mut err = ax - ay;
    for step in 1..=steps {
        if x != to.x || y != to.y {
            let e2 = 2 * err;
            if e2 > -ay {
                err -= ay;
                x += sx;
            }
            if e2 < ax {
                err += ax;
                y += sy;
            }
        }
        // z moves linearly, rounded to the nearest level
        let z = from.z + ((dz * step) as f32 / steps as f32).round() as i32;
        line.push(Tripoint::new(x, y, z));
    }
    line
}

/// Bearing from `a` to `b` in whole degrees, `0..360`, 0 pointing along +x
pub fn coord_to_angle(a: Tripoint, b: Tripoint) -> i32 {
    let dx = (b.x - a.x) as f64;
    let dy = (b.y - a.y) as f64;
    let degrees = dy.atan2(dx).to_degrees().round() as i32;
    degrees.rem_euclid(360)
}

/// End point of a ray of length `range` cast from `p` at `angle` degrees
pub fn calc_ray_end(angle: i32, range: i32, p: Tripoint) -> Tripoint {
    let rad = (angle as f64).to_radians();
    Tripoint::new(
        p.x + (range as f64 * rad.cos()).round() as i32,
        p.y + (range as f64 * rad.sin()).round() as i32,
        p.z,
    )
}

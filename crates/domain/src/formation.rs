//! Formation layout - where each card sits in the grid or on the sphere
//!
//! Pure functions of the card count and layout parameters. Targets are
//! recomputed from scratch whenever the roster or parameters change, so there
//! is no cached state to invalidate.

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

use crate::value_objects::{CardSize, Transform, Vec3};

/// Default radius of the sphere formation in world units.
pub const DEFAULT_SPHERE_RADIUS: f64 = 800.0;

/// A named card arrangement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Formation {
    /// Flat, centered table with `row_count` cards per row.
    Grid { row_count: usize, card_size: CardSize },
    /// Cards spread over a sphere, each facing outward.
    Sphere { radius: f64 },
}

impl Formation {
    pub fn grid(row_count: usize, card_size: CardSize) -> Self {
        Self::Grid {
            row_count,
            card_size,
        }
    }

    pub fn sphere(radius: f64) -> Self {
        Self::Sphere { radius }
    }

    pub fn is_sphere(&self) -> bool {
        matches!(self, Self::Sphere { .. })
    }

    /// One target per card index.
    pub fn targets(&self, count: usize) -> Vec<Transform> {
        match *self {
            Self::Grid {
                row_count,
                card_size,
            } => compute_grid_targets(count, row_count, card_size),
            Self::Sphere { radius } => compute_sphere_targets_with_radius(count, radius),
        }
    }
}

/// Row-major grid centered on the origin, every card facing the camera.
///
/// A `row_count` of zero is treated as one column.
pub fn compute_grid_targets(count: usize, row_count: usize, card_size: CardSize) -> Vec<Transform> {
    if count == 0 {
        return Vec::new();
    }
    let columns = row_count.max(1).min(count);
    let rows = count.div_ceil(columns);
    let x_offset = (columns as f64 - 1.0) / 2.0;
    let y_offset = (rows as f64 - 1.0) / 2.0;

    (0..count)
        .map(|index| {
            let column = (index % columns) as f64;
            let row = (index / columns) as f64;
            Transform::at(Vec3::new(
                (column - x_offset) * card_size.width,
                (y_offset - row) * card_size.height,
                0.0,
            ))
        })
        .collect()
}

/// Sphere formation with the default radius.
pub fn compute_sphere_targets(count: usize) -> Vec<Transform> {
    compute_sphere_targets_with_radius(count, DEFAULT_SPHERE_RADIUS)
}

/// Spiral over the sphere surface with roughly equal area per card.
///
/// Card `i` of `n` sits at polar angle `acos(-1 + 2i/n)` and azimuth
/// `sqrt(n * PI) * polar`; its rotation turns the card face away from the
/// center.
pub fn compute_sphere_targets_with_radius(count: usize, radius: f64) -> Vec<Transform> {
    if count == 0 {
        return Vec::new();
    }
    let n = count as f64;
    let winding = (n * PI).sqrt();

    (0..count)
        .map(|index| {
            let phi = (-1.0 + 2.0 * index as f64 / n).clamp(-1.0, 1.0).acos();
            let theta = winding * phi;
            let position = Vec3::new(
                radius * phi.sin() * theta.sin(),
                radius * phi.cos(),
                radius * phi.sin() * theta.cos(),
            );
            Transform::new(position, outward_rotation(position))
        })
        .collect()
}

/// Euler XYZ rotation that points a card's +Z axis along `position`.
///
/// Same basis construction as a scene-graph `lookAt(2 * position)` with +Y as
/// the up vector, including the nudge applied when the direction is parallel
/// to up.
fn outward_rotation(position: Vec3) -> Vec3 {
    let up = Vec3::new(0.0, 1.0, 0.0);
    let mut z = position.normalized();
    if z == Vec3::ZERO {
        z = Vec3::new(0.0, 0.0, 1.0);
    }
    let mut x = up.cross(z);
    if x.length() == 0.0 {
        z.z += 0.0001;
        z = z.normalized();
        x = up.cross(z);
    }
    let x = x.normalized();
    let y = z.cross(x);

    // Column-major basis: m11 = x.x, m12 = y.x, m13 = z.x, ...
    let (m11, m12, m13) = (x.x, y.x, z.x);
    let (m22, m23) = (y.y, z.y);
    let (m32, m33) = (y.z, z.z);

    let ry = m13.clamp(-1.0, 1.0).asin();
    let (rx, rz) = if m13.abs() < 0.999_999_9 {
        ((-m23).atan2(m33), (-m12).atan2(m11))
    } else {
        (m32.atan2(m22), 0.0)
    };
    Vec3::new(rx, ry, rz)
}

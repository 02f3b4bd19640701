//! Painter shapes with SDF evaluation
//!
//! Shapes live in the unit cube `[-1, 1]^3`; a [`Box4`](crate::math::Box4) places, scales and
//! orients them in voxel space.

use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

/// Paintable primitive shapes
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Shape {
    /// Unit sphere
    #[default]
    Sphere,
    /// The full unit cube
    Cube,
    /// Unit-radius cylinder along local z
    Cylinder,
}

impl Shape {
    /// Signed distance in unit space (negative = inside)
    pub fn sdf(&self, local_point: Vec3) -> f32 {
        match self {
            Shape::Sphere => local_point.length() - 1.0,
            Shape::Cube => {
                let q = local_point.abs() - Vec3::ONE;
                q.max(Vec3::ZERO).length() + q.x.max(q.y.max(q.z)).min(0.0)
            }
            Shape::Cylinder => {
                let d_radial = local_point.truncate().length() - 1.0;
                let d_height = local_point.z.abs() - 1.0;
                let outside = Vec3::new(d_radial.max(0.0), d_height.max(0.0), 0.0).length();
                let inside = d_radial.max(d_height).min(0.0);
                outside + inside
            }
        }
    }

    /// Check if a unit-space point is inside the shape (SDF <= 0)
    pub fn contains_point(&self, local_point: Vec3) -> bool {
        self.sdf(local_point) <= 0.0
    }

    /// Approximate signed distance in voxel units.
    ///
    /// `inverse` maps voxel space back to the unit cube. Distances are
    /// scaled by the smallest half extent, which is exact for uniformly
    /// scaled boxes and conservative otherwise.
    pub fn world_sdf(&self, inverse: &Mat4, min_half_extent: f32, world_point: Vec3) -> f32 {
        self.sdf(inverse.transform_point3(world_point)) * min_half_extent
    }
}

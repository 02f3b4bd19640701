//! Voxel data type

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

/// Single RGBA voxel - exactly 4 bytes.
///
/// Alpha 0 means "no voxel": iteration, selection, meshing and height
/// queries all treat such a voxel as absent regardless of its RGB bytes.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Pod, Zeroable, Serialize, Deserialize)]
#[serde(from = "[u8; 4]", into = "[u8; 4]")]
pub struct Voxel {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Voxel {
    /// Empty/air voxel
    pub const EMPTY: Voxel = Voxel { r: 0, g: 0, b: 0, a: 0 };

    /// Opaque white, used to mark selections.
    pub const WHITE: Voxel = Voxel { r: 255, g: 255, b: 255, a: 255 };

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Fully opaque voxel.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Check if voxel is empty (alpha 0)
    pub fn is_empty(&self) -> bool {
        self.a == 0
    }

    /// Same color, different alpha.
    pub fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }

    /// RGB from `other`, alpha kept.
    pub fn with_rgb_of(self, other: Voxel) -> Self {
        Self { r: other.r, g: other.g, b: other.b, a: self.a }
    }

    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// Normalized 0..1 float channels.
    pub fn to_f32(self) -> [f32; 4] {
        [
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
            self.a as f32 / 255.0,
        ]
    }

    /// Largest per-channel RGB difference.
    pub fn rgb_distance(self, other: Voxel) -> u8 {
        self.r.abs_diff(other.r)
            .max(self.g.abs_diff(other.g))
            .max(self.b.abs_diff(other.b))
    }
}

impl From<[u8; 4]> for Voxel {
    fn from(c: [u8; 4]) -> Self {
        Self::new(c[0], c[1], c[2], c[3])
    }
}

impl From<Voxel> for [u8; 4] {
    fn from(v: Voxel) -> Self {
        v.to_array()
    }
}

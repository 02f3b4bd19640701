//! Painter: one edit intent (shape, blend mode, color, symmetry, noise)

use std::ops::BitOr;

use glam::{IVec3, Mat4, Vec3};
use serde::{Deserialize, Serialize};

use crate::math::Box4;
use crate::voxel::blend::BlendMode;
use crate::voxel::voxel::Voxel;
use super::raster::Rasterizer;
use super::shape::Shape;

/// Deterministic 3D hash used for per-voxel noise
pub(crate) fn hash_3d(x: i32, y: i32, z: i32, seed: u32) -> u32 {
    let mut h = seed;
    h ^= x as u32;
    h = h.wrapping_mul(0x45d9f3b);
    h ^= h >> 16;
    h ^= y as u32;
    h = h.wrapping_mul(0x45d9f3b);
    h ^= h >> 16;
    h ^= z as u32;
    h = h.wrapping_mul(0x45d9f3b);
    h ^= h >> 16;
    h
}

/// Where the painted color comes from
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorBlend {
    /// The painter color
    #[default]
    User,
    /// The first voxel found below the painted position
    Inherited,
    /// Average of the painter color and the inherited one
    MidpointInherited,
    /// Saturating sum of the painter color and the inherited one
    AddInherited,
}

impl ColorBlend {
    /// Color to paint given the user color and the inherited one (if any).
    /// Alpha always comes from the user color.
    pub fn resolve(self, user: Voxel, inherited: Option<Voxel>) -> Voxel {
        let Some(below) = inherited else {
            return user;
        };
        match self {
            ColorBlend::User => user,
            ColorBlend::Inherited => user.with_rgb_of(below),
            ColorBlend::MidpointInherited => Voxel::new(
                ((user.r as u16 + below.r as u16) / 2) as u8,
                ((user.g as u16 + below.g as u16) / 2) as u8,
                ((user.b as u16 + below.b as u16) / 2) as u8,
                user.a,
            ),
            ColorBlend::AddInherited => Voxel::new(
                user.r.saturating_add(below.r),
                user.g.saturating_add(below.g),
                user.b.saturating_add(below.b),
                user.a,
            ),
        }
    }
}

/// Mirror axes bitmask
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Symmetry(pub u8);

impl Symmetry {
    pub const NONE: Symmetry = Symmetry(0);
    pub const X: Symmetry = Symmetry(1);
    pub const Y: Symmetry = Symmetry(2);
    pub const Z: Symmetry = Symmetry(4);

    pub const fn contains(self, other: Symmetry) -> bool {
        self.0 & other.0 == other.0
    }

    /// Scale vectors for every mirror image, identity first.
    pub fn mirror_scales(self) -> impl Iterator<Item = Vec3> {
        let mask = self.0 & 7;
        (0u8..8).filter(move |s| s & !mask == 0).map(|s| {
            Vec3::new(
                if s & 1 != 0 { -1.0 } else { 1.0 },
                if s & 2 != 0 { -1.0 } else { 1.0 },
                if s & 4 != 0 { -1.0 } else { 1.0 },
            )
        })
    }
}

impl BitOr for Symmetry {
    type Output = Symmetry;

    fn bitor(self, rhs: Symmetry) -> Symmetry {
        Symmetry(self.0 | rhs.0)
    }
}

/// Per-voxel pseudo random color perturbation
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorNoise {
    /// Brightness jitter amplitude (0..=255)
    pub intensity: u8,
    /// Per-channel jitter amplitude (0..=255)
    pub saturation: u8,
    /// Percentage of voxels affected (0..=100)
    pub coverage: u8,
    pub seed: u32,
}

impl Default for ColorNoise {
    fn default() -> Self {
        Self {
            intensity: 32,
            saturation: 0,
            coverage: 100,
            seed: 0,
        }
    }
}

impl ColorNoise {
    /// Perturb the RGB of `color` at `pos`. Deterministic; alpha is kept.
    pub fn apply(&self, pos: IVec3, color: Voxel) -> Voxel {
        let h = hash_3d(pos.x, pos.y, pos.z, self.seed);
        if h % 100 >= self.coverage as u32 {
            return color;
        }
        let signed = |bits: u32| (bits & 0xff) as i32 - 128;
        let brightness = signed(h >> 8) * self.intensity as i32 / 128;
        let jitter = |channel: u32| {
            let hc = hash_3d(pos.x, pos.y, pos.z, self.seed ^ (channel + 1).wrapping_mul(0x9e37_79b9));
            signed(hc) * self.saturation as i32 / 128
        };
        let shift = |c: u8, channel: u32| (c as i32 + brightness + jitter(channel)).clamp(0, 255) as u8;
        Voxel::new(shift(color.r, 0), shift(color.g, 1), shift(color.b, 2), color.a)
    }
}

/// Immutable description of one paint operation
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Painter {
    pub mode: BlendMode,
    pub shape: Shape,
    pub color: Voxel,
    pub color_blend: ColorBlend,
    /// Width of the soft edge band in voxels (0 = hard edge)
    pub smoothness: f32,
    pub symmetry: Symmetry,
    pub symmetry_origin: Vec3,
    /// Voxels outside this box are never touched
    pub clip: Option<Box4>,
    pub noise: Option<ColorNoise>,
}

impl Default for Painter {
    fn default() -> Self {
        Self {
            mode: BlendMode::Over,
            shape: Shape::Sphere,
            color: Voxel::WHITE,
            color_blend: ColorBlend::User,
            smoothness: 0.0,
            symmetry: Symmetry::NONE,
            symmetry_origin: Vec3::ZERO,
            clip: None,
            noise: None,
        }
    }
}

impl Painter {
    pub fn new(mode: BlendMode, shape: Shape, color: Voxel) -> Self {
        Self {
            mode,
            shape,
            color,
            ..Default::default()
        }
    }

    pub fn with_mode(mut self, mode: BlendMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_color_blend(mut self, color_blend: ColorBlend) -> Self {
        self.color_blend = color_blend;
        self
    }

    pub fn with_smoothness(mut self, smoothness: f32) -> Self {
        self.smoothness = smoothness;
        self
    }

    pub fn with_symmetry(mut self, symmetry: Symmetry, origin: Vec3) -> Self {
        self.symmetry = symmetry;
        self.symmetry_origin = origin;
        self
    }

    pub fn with_clip(mut self, clip: Box4) -> Self {
        self.clip = if clip.is_null() { None } else { Some(clip) };
        self
    }

    pub fn with_noise(mut self, noise: ColorNoise) -> Self {
        self.noise = Some(noise);
        self
    }

    /// `placement` and its mirror images about `symmetry_origin`.
    pub fn placements(&self, placement: &Box4) -> Vec<Box4> {
        let origin = self.symmetry_origin;
        self.symmetry
            .mirror_scales()
            .map(|scale| {
                let mirror = Mat4::from_translation(origin)
                    * Mat4::from_scale(scale)
                    * Mat4::from_translation(-origin);
                placement.transformed(&mirror)
            })
            .collect()
    }

    /// One rasterizer per placement; degenerate placements are dropped.
    pub fn rasterizers(&self, placement: &Box4) -> Vec<Rasterizer> {
        self.placements(placement)
            .iter()
            .filter_map(|p| Rasterizer::new(self.shape, p, self.smoothness, self.clip.as_ref()))
            .collect()
    }

    /// Source voxel written at `pos` for the given coverage.
    pub fn source_voxel(&self, pos: IVec3, coverage: f32, inherited: Option<Voxel>) -> Voxel {
        let mut color = self.color_blend.resolve(self.color, inherited);
        if let Some(noise) = &self.noise {
            color = noise.apply(pos, color);
        }
        let alpha = (color.a as f32 * coverage.clamp(0.0, 1.0)).round() as u8;
        color.with_alpha(alpha)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_blend() {
        let user = Voxel::new(100, 100, 100, 200);
        let below = Voxel::rgb(200, 0, 50);
        assert_eq!(ColorBlend::User.resolve(user, Some(below)), user);
        assert_eq!(ColorBlend::Inherited.resolve(user, Some(below)), Voxel::new(200, 0, 50, 200));
        assert_eq!(ColorBlend::MidpointInherited.resolve(user, Some(below)), Voxel::new(150, 50, 75, 200));
        assert_eq!(ColorBlend::AddInherited.resolve(user, Some(below)), Voxel::new(255, 100, 150, 200));
        assert_eq!(ColorBlend::Inherited.resolve(user, None), user);
    }

    #[test]
    fn test_mirror_scales() {
        assert_eq!(Symmetry::NONE.mirror_scales().count(), 1);
        let xz: Vec<_> = (Symmetry::X | Symmetry::Z).mirror_scales().collect();
        assert_eq!(xz.len(), 4);
        assert_eq!(xz[0], Vec3::ONE);
        assert!(xz.contains(&Vec3::new(-1.0, 1.0, -1.0)));
    }

    #[test]
    fn test_placements_mirror_about_origin() {
        let painter = Painter::default().with_symmetry(Symmetry::X, Vec3::new(10.0, 0.0, 0.0));
        let b = Box4::from_center_half_extent(Vec3::new(4.0, 2.0, 2.0), Vec3::ONE);
        let placements = painter.placements(&b);
        assert_eq!(placements.len(), 2);
        assert!((placements[1].center() - Vec3::new(16.0, 2.0, 2.0)).length() < 1e-5);
    }

    #[test]
    fn test_noise_is_deterministic_and_keeps_alpha() {
        let noise = ColorNoise { intensity: 64, saturation: 64, coverage: 100, seed: 7 };
        let c = Voxel::new(128, 128, 128, 90);
        let a = noise.apply(IVec3::new(1, 2, 3), c);
        assert_eq!(a, noise.apply(IVec3::new(1, 2, 3), c));
        assert_eq!(a.a, 90);

        let off = ColorNoise { coverage: 0, ..noise };
        assert_eq!(off.apply(IVec3::new(1, 2, 3), c), c);
    }

    #[test]
    fn test_source_voxel_scales_alpha() {
        let painter = Painter::new(BlendMode::Over, Shape::Cube, Voxel::rgb(1, 2, 3));
        assert_eq!(painter.source_voxel(IVec3::ZERO, 1.0, None), Voxel::rgb(1, 2, 3));
        assert_eq!(painter.source_voxel(IVec3::ZERO, 0.5, None).a, 128);
        assert!(painter.source_voxel(IVec3::ZERO, 0.0, None).is_empty());
    }

    #[test]
    fn test_serde_defaults() {
        let painter: Painter = serde_json::from_str(r#"{"mode":"sub","color":[1,2,3,255]}"#).unwrap();
        assert_eq!(painter.mode, BlendMode::Sub);
        assert_eq!(painter.shape, Shape::Sphere);
        assert_eq!(painter.smoothness, 0.0);
        assert!(painter.clip.is_none());
    }
}

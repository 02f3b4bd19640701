//! Blend algebra: how an incoming voxel combines with the one already stored

use serde::{Deserialize, Serialize};

use super::voxel::Voxel;

/// Rule combining an existing voxel (`dst`) with a new one (`src`)
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlendMode {
    /// `src` replaces `dst` wherever `src` is present
    #[default]
    Over,
    /// Alpha subtraction, color kept
    Sub,
    /// Alpha limited to the inverse of `src` alpha
    SubClamp,
    /// Recolor present voxels, alpha kept
    Paint,
    /// Keep whichever voxel has the higher alpha
    Max,
    /// Alpha minimum, color kept
    Intersect,
    /// Alpha minimum, color from `src`
    IntersectFill,
    /// Scale color by `src` alpha
    MultAlpha,
    /// `src` unconditionally
    Replace,
    /// Saturating channel sum
    Add,
    /// Channel average
    Midpoint,
}

impl BlendMode {
    pub const ALL: [BlendMode; 11] = [
        BlendMode::Over,
        BlendMode::Sub,
        BlendMode::SubClamp,
        BlendMode::Paint,
        BlendMode::Max,
        BlendMode::Intersect,
        BlendMode::IntersectFill,
        BlendMode::MultAlpha,
        BlendMode::Replace,
        BlendMode::Add,
        BlendMode::Midpoint,
    ];

    /// Combine `src` onto `dst`.
    pub fn apply(self, dst: Voxel, src: Voxel) -> Voxel {
        combine(dst, src, self)
    }

    /// Modes that change voxels where the source is absent: they behave as if
    /// a transparent `src` were applied everywhere outside it.
    pub fn affects_outside_source(self) -> bool {
        matches!(self, BlendMode::Intersect | BlendMode::IntersectFill)
    }

    /// Modes that can turn an empty voxel into a present one
    pub fn creates_voxels(self) -> bool {
        matches!(
            self,
            BlendMode::Over | BlendMode::Max | BlendMode::Replace | BlendMode::Add | BlendMode::Midpoint
        )
    }

    /// Modes that can only lower alpha; tiles they touch may become empty.
    pub fn is_subtractive(self) -> bool {
        matches!(
            self,
            BlendMode::Sub | BlendMode::SubClamp | BlendMode::Intersect | BlendMode::IntersectFill
        )
    }
}

fn scale(c: u8, a: u8) -> u8 {
    ((c as u16 * a as u16 + 127) / 255) as u8
}

fn average(a: u8, b: u8) -> u8 {
    ((a as u16 + b as u16) / 2) as u8
}

/// The blend table. Pure and total.
pub fn combine(dst: Voxel, src: Voxel, mode: BlendMode) -> Voxel {
    match mode {
        BlendMode::Over => {
            if src.a > 0 { src } else { dst }
        }
        BlendMode::Sub => dst.with_alpha(dst.a.saturating_sub(src.a)),
        BlendMode::SubClamp => dst.with_alpha(dst.a.min(255 - src.a)),
        BlendMode::Paint => {
            if dst.a > 0 && src.a > 0 { dst.with_rgb_of(src) } else { dst }
        }
        BlendMode::Max => {
            if src.a >= dst.a { src } else { dst }
        }
        BlendMode::Intersect => dst.with_alpha(dst.a.min(src.a)),
        BlendMode::IntersectFill => src.with_alpha(dst.a.min(src.a)),
        BlendMode::MultAlpha => Voxel::new(
            scale(dst.r, src.a),
            scale(dst.g, src.a),
            scale(dst.b, src.a),
            dst.a,
        ),
        BlendMode::Replace => src,
        BlendMode::Add => Voxel::new(
            dst.r.saturating_add(src.r),
            dst.g.saturating_add(src.g),
            dst.b.saturating_add(src.b),
            dst.a.saturating_add(src.a),
        ),
        BlendMode::Midpoint => Voxel::new(
            average(dst.r, src.r),
            average(dst.g, src.g),
            average(dst.b, src.b),
            average(dst.a, src.a),
        ),
    }
}

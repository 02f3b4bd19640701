//! Flood-fill selection

use std::collections::{HashSet, VecDeque};

use glam::IVec3;

use crate::voxel::iter::Accessor;
use crate::voxel::voxel::Voxel;
use crate::voxel::volume::Volume;

const NEIGHBORS: [IVec3; 6] = [
    IVec3::new(1, 0, 0),
    IVec3::new(-1, 0, 0),
    IVec3::new(0, 1, 0),
    IVec3::new(0, -1, 0),
    IVec3::new(0, 0, 1),
    IVec3::new(0, 0, -1),
];

/// Read access handed to selection predicates
pub struct SelectContext<'a> {
    volume: &'a Volume,
    acc: Accessor,
}

impl SelectContext<'_> {
    pub fn volume(&self) -> &Volume {
        self.volume
    }

    /// Voxel at `pos` (cached tile lookup)
    pub fn get(&mut self, pos: IVec3) -> Voxel {
        self.volume.get_at(pos, &mut self.acc)
    }
}

impl Volume {
    /// Flood fill from `start` through 6-connected neighbors.
    ///
    /// `cond(ctx, base, candidate)` decides whether `candidate`, adjacent to
    /// the already selected `base`, joins the selection. `start` is always
    /// selected. The fill never leaves this volume's tile box grown by one
    /// voxel. Selected positions are written opaque white into `selection`;
    /// returns how many were selected.
    pub fn select<F>(&self, start: IVec3, mut cond: F, selection: &mut Volume) -> usize
    where
        F: FnMut(&mut SelectContext<'_>, IVec3, IVec3) -> bool,
    {
        let limits = self.bounds(false).expanded(1);
        let mut ctx = SelectContext {
            volume: self,
            acc: Accessor::new(),
        };
        let mut selected = HashSet::from([start]);
        let mut queue = VecDeque::from([start]);
        let mut out = Accessor::new();
        selection.set_at(start, Voxel::WHITE, &mut out);

        while let Some(base) = queue.pop_front() {
            for offset in NEIGHBORS {
                let candidate = base + offset;
                if !limits.contains(candidate) || selected.contains(&candidate) {
                    continue;
                }
                if cond(&mut ctx, base, candidate) {
                    selected.insert(candidate);
                    selection.set_at(candidate, Voxel::WHITE, &mut out);
                    queue.push_back(candidate);
                }
            }
        }
        log::debug!("select: {} voxels from {}", selected.len(), start);
        selected.len()
    }

    /// Select the connected component of voxels sharing the color of `start`.
    pub fn select_same_color(&self, start: IVec3, selection: &mut Volume) -> usize {
        self.select(
            start,
            |ctx, base, candidate| {
                let c = ctx.get(candidate);
                !c.is_empty() && c == ctx.get(base)
            },
            selection,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const C: Voxel = Voxel::rgb(40, 80, 120);

    #[test]
    fn test_same_color_square() {
        let mut v = Volume::new();
        for (x, y) in [(0, 0), (1, 0), (0, 1), (1, 1)] {
            v.set(IVec3::new(x, y, 0), C);
        }
        // Different color touching the square is not selected
        v.set(IVec3::new(2, 0, 0), Voxel::rgb(1, 1, 1));

        let mut selection = Volume::new();
        assert_eq!(v.select_same_color(IVec3::ZERO, &mut selection), 4);
        assert_eq!(selection.voxel_count(), 4);
        assert_eq!(selection.get(IVec3::new(1, 1, 0)), Voxel::WHITE);
        assert!(selection.get(IVec3::new(2, 0, 0)).is_empty());
    }

    #[test]
    fn test_start_always_selected() {
        let v = Volume::new();
        let mut selection = Volume::new();
        assert_eq!(v.select_same_color(IVec3::new(3, 3, 3), &mut selection), 1);
        assert_eq!(selection.get(IVec3::new(3, 3, 3)), Voxel::WHITE);
    }

    #[test]
    fn test_fill_empty_space_is_bounded() {
        let mut v = Volume::new();
        v.set(IVec3::ZERO, C);
        let mut selection = Volume::new();
        let n = v.select(
            IVec3::new(1, 0, 0),
            |ctx, _, candidate| ctx.get(candidate).is_empty(),
            &mut selection,
        );
        // Whole tile box grown by one, minus the single occupied voxel
        assert_eq!(n, 18 * 18 * 18 - 1);
    }
}

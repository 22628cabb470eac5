// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Spatial indices for tolerance-based point lookup.
//!
//! A locator only stores point ids; coordinates live in the output
//! [`PointBuffer`] owned by the merger and are read back for distance tests.

use nalgebra::Point3;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use std::fmt;
use xfem_clip_core::{Bounds, PointBuffer};

/// Pluggable spatial index used by [`crate::PointMerger`]
pub trait PointLocator: fmt::Debug {
    /// Prepare for a run over points inside `bounds`
    fn initialize(&mut self, bounds: &Bounds, tolerance: f64, expected_points: usize);

    /// Find a stored point within tolerance of `point`
    ///
    /// When several stored points qualify, the lowest id is returned.
    fn find(&self, point: &Point3<f64>, points: &PointBuffer) -> Option<usize>;

    /// Register point `id`, stored at `point`
    fn insert(&mut self, id: usize, point: &Point3<f64>);

    /// Drop all entries and release working memory
    fn release(&mut self);

    /// Short name, used in logs
    fn name(&self) -> &'static str;
}

/// Points per grid bucket aimed for when sizing the grid
const POINTS_PER_BUCKET: usize = 3;

/// Upper bound on grid divisions along the bounding diagonal
const MAX_DIVISIONS: usize = 256;

/// A spatial hash grid for fast tolerance-based point lookup.
///
/// The grid divides 3D space into cubic cells whose side is derived from the
/// bounding diagonal and never smaller than the tolerance. Lookups check the
/// 27 neighboring cells (3x3x3 neighborhood), or only the point's own cell
/// when the tolerance is zero.
#[derive(Debug, Default)]
pub struct GridLocator {
    cell_size: f64,
    tolerance: f64,
    grid: FxHashMap<(i64, i64, i64), SmallVec<[usize; 4]>>,
}

impl GridLocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Side length of a grid cell after [`PointLocator::initialize`]
    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    /// Number of occupied grid cells
    pub fn occupied_cells(&self) -> usize {
        self.grid.len()
    }

    fn cell_coords(&self, point: &Point3<f64>) -> (i64, i64, i64) {
        (
            (point.x / self.cell_size).floor() as i64,
            (point.y / self.cell_size).floor() as i64,
            (point.z / self.cell_size).floor() as i64,
        )
    }
}

impl PointLocator for GridLocator {
    fn initialize(&mut self, bounds: &Bounds, tolerance: f64, expected_points: usize) {
        self.grid.clear();
        self.tolerance = tolerance.max(0.0);

        let divisions = ((expected_points / POINTS_PER_BUCKET).max(1) as f64)
            .cbrt()
            .ceil()
            .clamp(1.0, MAX_DIVISIONS as f64);
        let diagonal = bounds.diagonal();
        self.cell_size = if diagonal > 0.0 {
            (diagonal / divisions).max(self.tolerance)
        } else {
            self.tolerance.max(1.0)
        };
    }

    fn find(&self, point: &Point3<f64>, points: &PointBuffer) -> Option<usize> {
        let (cx, cy, cz) = self.cell_coords(point);
        let reach: i64 = if self.tolerance > 0.0 { 1 } else { 0 };
        let tol_sq = self.tolerance * self.tolerance;
        let mut best: Option<usize> = None;

        for dx in -reach..=reach {
            for dy in -reach..=reach {
                for dz in -reach..=reach {
                    let Some(ids) = self.grid.get(&(cx + dx, cy + dy, cz + dz)) else {
                        continue;
                    };
                    for &id in ids {
                        let p = points.get(id);
                        let dist_sq = (p[0] - point.x).powi(2)
                            + (p[1] - point.y).powi(2)
                            + (p[2] - point.z).powi(2);
                        if dist_sq <= tol_sq && best.map_or(true, |b| id < b) {
                            best = Some(id);
                        }
                    }
                }
            }
        }

        best
    }

    fn insert(&mut self, id: usize, point: &Point3<f64>) {
        let cell = self.cell_coords(point);
        self.grid.entry(cell).or_default().push(id);
    }

    fn release(&mut self) {
        self.grid = FxHashMap::default();
    }

    fn name(&self) -> &'static str {
        "grid"
    }
}

/// Locator that merges only bit-identical coordinates
///
/// Ignores the tolerance. Signed zeros are treated as equal.
#[derive(Debug, Default)]
pub struct ExactLocator {
    index: FxHashMap<[u64; 3], usize>,
}

impl ExactLocator {
    pub fn new() -> Self {
        Self::default()
    }

    fn key(point: &Point3<f64>) -> [u64; 3] {
        [point.x, point.y, point.z].map(|c| if c == 0.0 { 0 } else { c.to_bits() })
    }
}

impl PointLocator for ExactLocator {
    fn initialize(&mut self, _bounds: &Bounds, _tolerance: f64, expected_points: usize) {
        self.index.clear();
        self.index.reserve(expected_points);
    }

    fn find(&self, point: &Point3<f64>, _points: &PointBuffer) -> Option<usize> {
        self.index.get(&Self::key(point)).copied()
    }

    fn insert(&mut self, id: usize, point: &Point3<f64>) {
        self.index.entry(Self::key(point)).or_insert(id);
    }

    fn release(&mut self) {
        self.index = FxHashMap::default();
    }

    fn name(&self) -> &'static str {
        "exact"
    }
}

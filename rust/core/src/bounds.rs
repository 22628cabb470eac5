// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Axis-aligned bounds in f64 precision
//!
//! Used to size the point-merge grid and to turn relative merge tolerances
//! into absolute distances.

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    /// Minimum corner
    pub min: [f64; 3],
    /// Maximum corner
    pub max: [f64; 3],
    /// Number of points added
    pub sample_count: usize,
}

impl Bounds {
    /// Create new bounds initialized to invalid state
    pub fn new() -> Self {
        Self {
            min: [f64::MAX; 3],
            max: [f64::MIN; 3],
            sample_count: 0,
        }
    }

    /// Build bounds from a sequence of points
    pub fn from_points(points: impl IntoIterator<Item = [f64; 3]>) -> Self {
        let mut bounds = Self::new();
        for p in points {
            bounds.expand(p);
        }
        bounds
    }

    /// Check if bounds are valid (at least one point added)
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.sample_count > 0
    }

    /// Expand bounds to include a point
    #[inline]
    pub fn expand(&mut self, p: [f64; 3]) {
        for axis in 0..3 {
            self.min[axis] = self.min[axis].min(p[axis]);
            self.max[axis] = self.max[axis].max(p[axis]);
        }
        self.sample_count += 1;
    }

    /// Edge lengths of the box
    #[inline]
    pub fn extent(&self) -> [f64; 3] {
        if !self.is_valid() {
            return [0.0; 3];
        }
        [
            self.max[0] - self.min[0],
            self.max[1] - self.min[1],
            self.max[2] - self.min[2],
        ]
    }

    /// Length of the box diagonal, 0 for invalid or single-point bounds
    #[inline]
    pub fn diagonal(&self) -> f64 {
        let [dx, dy, dz] = self.extent();
        (dx * dx + dy * dy + dz * dz).sqrt()
    }

    /// Center of the box
    #[inline]
    pub fn center(&self) -> [f64; 3] {
        if !self.is_valid() {
            return [0.0; 3];
        }
        [
            (self.min[0] + self.max[0]) / 2.0,
            (self.min[1] + self.max[1]) / 2.0,
            (self.min[2] + self.max[2]) / 2.0,
        ]
    }
}

impl Default for Bounds {
    fn default() -> Self {
        Self::new()
    }
}

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Cutting plane

use nalgebra::{Point3, Vector3};

/// Smallest normal length that still defines a plane
pub const NORMAL_TOLERANCE: f64 = 1e-15;

/// Plane in point-normal form
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    /// Point on the plane
    pub point: Point3<f64>,
    /// Unit normal
    pub normal: Vector3<f64>,
}

impl Plane {
    /// Create a plane, normalizing `normal`
    ///
    /// Returns `None` when the normal is too short to normalize.
    pub fn new(point: Point3<f64>, normal: Vector3<f64>) -> Option<Self> {
        let length = normal.norm();
        if length <= NORMAL_TOLERANCE {
            return None;
        }
        Some(Self {
            point,
            normal: normal / length,
        })
    }

    /// Plane of a per-element cut, whose stored normal points away from the
    /// retained side
    pub fn from_cut(origin: [f64; 3], normal: [f64; 3]) -> Option<Self> {
        Self::new(Point3::from(origin), -Vector3::from(normal))
    }

    /// Signed distance from point to plane
    /// Positive = in front, Negative = behind
    #[inline]
    pub fn signed_distance(&self, point: &Point3<f64>) -> f64 {
        (point - self.point).dot(&self.normal)
    }
}

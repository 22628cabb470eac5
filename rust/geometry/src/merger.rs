// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Output point deduplication.
//!
//! Every output point, reused original or new crossing, passes through
//! [`PointMerger::insert`]. Points landing within tolerance of an earlier
//! point resolve to that point's id, which is what makes independently
//! clipped neighbours share their boundary points.

use crate::clip::CutPoint;
use crate::interpolate::{allocate_like, copy_tuple, interpolate_tuple};
use crate::locator::{GridLocator, PointLocator};
use nalgebra::Point3;
use std::mem;
use xfem_clip_core::{round_to_precision, AttributeSet, Bounds, Mesh, PointBuffer, Precision};

/// Growing output point set with merge-on-insert
#[derive(Debug)]
pub struct PointMerger {
    locator: Box<dyn PointLocator>,
    points: PointBuffer,
    point_data: AttributeSet,
    precision: Precision,
    merged: usize,
}

impl PointMerger {
    pub fn new(locator: Box<dyn PointLocator>) -> Self {
        Self {
            locator,
            points: PointBuffer::new(Precision::Double),
            point_data: AttributeSet::new(),
            precision: Precision::Double,
            merged: 0,
        }
    }

    /// Swap in a different spatial index
    pub fn set_locator(&mut self, locator: Box<dyn PointLocator>) {
        self.locator = locator;
    }

    pub fn locator(&self) -> &dyn PointLocator {
        self.locator.as_ref()
    }

    /// Reset for a new run
    ///
    /// `schema` is the input point data; output arrays are allocated with
    /// the same names and shapes before any point is inserted.
    pub fn initialize(
        &mut self,
        bounds: &Bounds,
        schema: &AttributeSet,
        precision: Precision,
        tolerance: f64,
        capacity: usize,
    ) {
        self.precision = precision;
        self.points = PointBuffer::with_capacity(precision, capacity);
        self.point_data = allocate_like(schema, capacity);
        self.merged = 0;
        self.locator.initialize(bounds, tolerance, capacity);
    }

    /// Resolve `candidate` to an output point id
    ///
    /// Returns the id of an existing point within tolerance, leaving its
    /// attributes untouched; otherwise appends the point with copied or
    /// interpolated attributes from `input`.
    pub fn insert(&mut self, candidate: &CutPoint, input: &Mesh) -> usize {
        let p = candidate.position(&input.points);
        let p = Point3::from(round_to_precision([p.x, p.y, p.z], self.precision));

        if let Some(id) = self.locator.find(&p, &self.points) {
            self.merged += 1;
            return id;
        }

        let id = self.points.len();
        self.points.push([p.x, p.y, p.z]);
        self.locator.insert(id, &p);
        match *candidate {
            CutPoint::Original(source) => {
                copy_tuple(&input.point_data, source, &mut self.point_data)
            }
            CutPoint::Edge { p0, p1, t } => {
                interpolate_tuple(&input.point_data, p0, p1, t, &mut self.point_data)
            }
        }
        id
    }

    /// Number of distinct output points so far
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Number of inserts answered by an existing point
    pub fn merged_count(&self) -> usize {
        self.merged
    }

    pub fn points(&self) -> &PointBuffer {
        &self.points
    }

    pub fn point_data(&self) -> &AttributeSet {
        &self.point_data
    }

    /// Hand over the accumulated points and release the spatial index
    pub fn finish(&mut self) -> (PointBuffer, AttributeSet) {
        let mut points = mem::replace(&mut self.points, PointBuffer::new(self.precision));
        let mut point_data = mem::take(&mut self.point_data);
        points.shrink_to_fit();
        point_data.shrink_to_fit();
        self.locator.release();
        (points, point_data)
    }
}

impl Default for PointMerger {
    fn default() -> Self {
        Self::new(Box::new(GridLocator::new()))
    }
}
